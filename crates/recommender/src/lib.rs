//! # Recommender Crate
//!
//! Collaborative-filtering movie recommendations over the MovieLens ratings.
//!
//! ## Components
//!
//! ### Rating Matrix
//! Sparse user × title matrix restricted to popular titles
//! (more than `min_rating_count` ratings).
//!
//! ### User-Based Recommender
//! "Users who rate like you loved these":
//! - Find users who watched most of what you watched
//! - Keep those whose ratings correlate with yours (Pearson)
//! - Average their correlation-weighted ratings per movie
//!
//! ### Item-Based Recommender
//! "Because you loved X":
//! - Take your most recent 5-star movie
//! - Rank every other title by how its ratings correlate with X's
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use recommender::{Recommender, RecommenderConfig};
//! use std::sync::Arc;
//!
//! let dataset = Arc::new(Dataset::load_from_dir(Path::new("datasets/movie_lens_dataset"))?);
//! let recommender = Recommender::new(dataset, RecommenderConfig::default())?;
//!
//! let by_users = recommender.user_based(108170)?;
//! let by_items = recommender.item_based(108170)?;
//! ```

pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod item_based;
pub mod matrix;
pub mod similarity;
pub mod user_based;

use data_loader::MovieId;
use serde::Serialize;

// Re-export commonly used types
pub use config::RecommenderConfig;
pub use engine::{HybridRecommendations, MatrixStats, Recommender};
pub use error::{RecommendError, Result};
pub use item_based::recommend_item_based;
pub use matrix::UserMovieMatrix;
pub use similarity::{find_similar_users, SimilarUser, UserOverlap};
pub use user_based::recommend_user_based;

/// One recommended title with the score it was ranked by.
///
/// For user-based results the score is the mean weighted rating; for
/// item-based results it is the correlation with the favorite movie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// `None` only when a matrix title has no movie record
    pub movie_id: Option<MovieId>,
    pub title: String,
    pub score: f64,
}

/// Titles of a recommendation list, in rank order
pub fn titles(recommendations: &[Recommendation]) -> Vec<&str> {
    recommendations.iter().map(|r| r.title.as_str()).collect()
}
