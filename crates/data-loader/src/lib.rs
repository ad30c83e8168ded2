//! # Data Loader Crate
//!
//! This crate handles loading the MovieLens CSV dataset (`movie.csv` and
//! `rating.csv`) into memory.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, JoinedRating, Dataset)
//! - **parser**: Parse the CSV files into Rust structs
//! - **index**: Build and validate the `Dataset`
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_dir(Path::new("datasets/movie_lens_dataset"))?;
//!
//! let movie = dataset.get_movie(1).unwrap();
//! let ratings = dataset.get_user_ratings(1);
//! let joined = dataset.joined();
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{MAX_RATING, MIN_RATING};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    // Core types
    Movie,
    Rating,
    JoinedRating,
    Dataset,
    // Enums
    Genre,
};
