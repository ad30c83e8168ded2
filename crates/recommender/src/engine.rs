//! # Recommender
//!
//! Ties the pieces of the pipeline together:
//! 1. Validate the configuration
//! 2. Build the rating matrix once from the dataset
//! 3. Serve user-based, item-based or both recommendation lists per user
//!
//! The dataset and the matrix are read-only after construction and shared
//! through `Arc`, so a `Recommender` can be cloned into as many threads as
//! needed without locking.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use data_loader::{Dataset, UserId};

use crate::config::RecommenderConfig;
use crate::error::Result;
use crate::item_based::recommend_item_based;
use crate::matrix::UserMovieMatrix;
use crate::similarity::{find_similar_users, SimilarUser};
use crate::user_based::recommend_user_based;
use crate::Recommendation;

/// Both recommendation lists for one user; each side fails independently
#[derive(Debug, Clone)]
pub struct HybridRecommendations {
    pub user_id: UserId,
    pub user_based: Result<Vec<Recommendation>>,
    pub item_based: Result<Vec<Recommendation>>,
}

/// Size summary of the loaded data and the matrix built from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatrixStats {
    pub users: usize,
    pub movies: usize,
    pub ratings: usize,
    pub matrix_users: usize,
    pub matrix_titles: usize,
    pub matrix_cells: usize,
}

#[derive(Debug, Clone)]
pub struct Recommender {
    dataset: Arc<Dataset>,
    matrix: Arc<UserMovieMatrix>,
    config: RecommenderConfig,
}

impl Recommender {
    /// Validate `config` and build the rating matrix from `dataset`
    pub fn new(dataset: Arc<Dataset>, config: RecommenderConfig) -> Result<Self> {
        config.validate()?;

        let start = Instant::now();
        let matrix = UserMovieMatrix::from_dataset(&dataset, config.min_rating_count);
        info!(
            "Rating matrix ready in {:.2?}: {} users x {} titles",
            start.elapsed(),
            matrix.n_users(),
            matrix.n_titles()
        );
        if matrix.is_empty() {
            warn!(
                "No title has more than {} ratings; every request will come back empty",
                config.min_rating_count
            );
        }

        Ok(Self {
            dataset,
            matrix: Arc::new(matrix),
            config,
        })
    }

    /// Reuse an already built matrix (e.g. across several configs)
    pub fn from_parts(
        dataset: Arc<Dataset>,
        matrix: Arc<UserMovieMatrix>,
        config: RecommenderConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dataset,
            matrix,
            config,
        })
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn matrix(&self) -> &UserMovieMatrix {
        &self.matrix
    }

    pub fn stats(&self) -> MatrixStats {
        let (users, movies, ratings) = self.dataset.counts();
        MatrixStats {
            users,
            movies,
            ratings,
            matrix_users: self.matrix.n_users(),
            matrix_titles: self.matrix.n_titles(),
            matrix_cells: (0..self.matrix.n_titles())
                .map(|c| self.matrix.column_at(c).len())
                .sum(),
        }
    }

    /// Users most correlated with `user_id`, best first
    pub fn similar_users(&self, user_id: UserId) -> Result<Vec<SimilarUser>> {
        find_similar_users(&self.matrix, user_id, &self.config)
    }

    pub fn user_based(&self, user_id: UserId) -> Result<Vec<Recommendation>> {
        recommend_user_based(user_id, &self.matrix, &self.dataset, &self.config)
    }

    pub fn item_based(&self, user_id: UserId) -> Result<Vec<Recommendation>> {
        recommend_item_based(user_id, &self.dataset, &self.matrix, &self.config)
    }

    /// Run both recommenders for one user
    #[instrument(skip(self))]
    pub fn hybrid(&self, user_id: UserId) -> HybridRecommendations {
        let start = Instant::now();

        let (user_based, item_based) =
            rayon::join(|| self.user_based(user_id), || self.item_based(user_id));

        log_outcome("user-based", user_id, &user_based);
        log_outcome("item-based", user_id, &item_based);
        info!(
            "Total time to get recommendations for user {}: {:.2?}",
            user_id,
            start.elapsed()
        );

        HybridRecommendations {
            user_id,
            user_based,
            item_based,
        }
    }
}

fn log_outcome(kind: &str, user_id: UserId, outcome: &Result<Vec<Recommendation>>) {
    match outcome {
        Ok(recs) => info!("{} recommendations for user {}: {}", kind, user_id, recs.len()),
        Err(e) => info!("No {} recommendations for user {}: {}", kind, user_id, e),
    }
}
