//! Error types for the recommender crate.
//!
//! Every condition under which no recommendation can be produced at all is a
//! typed failure. A run that completes but finds nothing above the cutoffs
//! returns an empty list instead.

use data_loader::{MovieId, UserId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Target user is not a row of the rating matrix
    #[error("User {user_id} not found in rating matrix")]
    UserNotFound { user_id: UserId },

    /// Target user has not rated any of the popular movies
    #[error("User {user_id} has no ratings among popular movies")]
    NoRatings { user_id: UserId },

    /// Nobody passed the overlap and correlation thresholds
    #[error("No users similar enough to user {user_id}")]
    InsufficientSimilarUsers { user_id: UserId },

    /// Item-based flow needs at least one top rating to anchor on
    #[error("User {user_id} has no favorite (top-rated) movie")]
    NoFavoriteMovie { user_id: UserId },

    #[error("Movie {movie_id} not found in movie table")]
    MovieNotFound { movie_id: MovieId },

    /// The anchor movie was filtered out as unpopular
    #[error("Movie '{title}' is not a column of the rating matrix")]
    MovieNotInMatrix { title: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;
