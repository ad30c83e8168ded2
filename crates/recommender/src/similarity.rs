//! User Similarity Finder
//!
//! Finds the users whose tastes follow the target user's.
//!
//! ## Algorithm
//! 1. Take the titles the target rated among the popular ones ("watched")
//! 2. Keep users who rated more than `floor(watched * min_similarity_ratio)`
//!    of those titles
//! 3. Correlate each kept user with the target over the watched titles
//! 4. Keep correlations at or above the threshold, best first

use crate::config::RecommenderConfig;
use crate::correlation::{overlap, pearson};
use crate::error::{RecommendError, Result};
use crate::matrix::UserMovieMatrix;
use data_loader::UserId;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// A user that shares enough watched movies with the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserOverlap {
    pub user_id: UserId,
    pub shared_movies: usize,
}

/// A user correlated with the target above the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarUser {
    pub user_id: UserId,
    pub correlation: f64,
    pub shared_movies: usize,
}

/// Run the whole similarity search for `target_user_id`.
///
/// Returns an empty list (not an error) when nobody qualifies.
#[instrument(skip(matrix, config))]
pub fn find_similar_users(
    matrix: &UserMovieMatrix,
    target_user_id: UserId,
    config: &RecommenderConfig,
) -> Result<Vec<SimilarUser>> {
    let overlapping =
        users_with_shared_movies(matrix, target_user_id, config.min_similarity_ratio)?;
    top_correlated_users(matrix, target_user_id, &overlapping, config)
}

/// Users (the target included) who rated strictly more than
/// `floor(watched * min_similarity_ratio)` of the target's watched titles.
///
/// Fails with `UserNotFound` if the target has no row and with `NoRatings`
/// if the row is empty.
pub fn users_with_shared_movies(
    matrix: &UserMovieMatrix,
    target_user_id: UserId,
    min_similarity_ratio: f64,
) -> Result<Vec<UserOverlap>> {
    let target_row = matrix
        .user_row(target_user_id)
        .ok_or(RecommendError::UserNotFound { user_id: target_user_id })?;
    if target_row.is_empty() {
        return Err(RecommendError::NoRatings { user_id: target_user_id });
    }

    let movies_watched = target_row.len();
    let min_movies = (movies_watched as f64 * min_similarity_ratio).floor() as usize;

    // Every cell of the target row is a watched title, so the overlap with the
    // target row is the count of non-missing entries within the watched columns.
    let users: Vec<UserOverlap> = (0..matrix.n_users())
        .into_par_iter()
        .filter_map(|r| {
            let shared_movies = overlap(target_row, matrix.row_at(r));
            (shared_movies > min_movies).then(|| UserOverlap {
                user_id: matrix.user_id_at(r),
                shared_movies,
            })
        })
        .collect();

    debug!(
        "User {} watched {} popular titles; {} users rated more than {} of them",
        target_user_id,
        movies_watched,
        users.len(),
        min_movies
    );
    Ok(users)
}

/// Correlate the target with each overlapping user and keep the best.
///
/// Correlations are computed over the target's watched titles only. Users
/// whose correlation is undefined (too little overlap, constant ratings) are
/// skipped. The result is sorted by correlation descending, ties by user id.
pub fn top_correlated_users(
    matrix: &UserMovieMatrix,
    target_user_id: UserId,
    overlapping: &[UserOverlap],
    config: &RecommenderConfig,
) -> Result<Vec<SimilarUser>> {
    let target_row = matrix
        .user_row(target_user_id)
        .ok_or(RecommendError::UserNotFound { user_id: target_user_id })?;

    let mut similar: Vec<SimilarUser> = overlapping
        .par_iter()
        .filter(|u| u.user_id != target_user_id)
        .filter_map(|u| {
            let row = matrix.user_row(u.user_id)?;
            let correlation = pearson(target_row, row, config.min_overlap)?;
            (correlation >= config.correlation_threshold).then_some(SimilarUser {
                user_id: u.user_id,
                correlation,
                shared_movies: u.shared_movies,
            })
        })
        .collect();

    similar.sort_by(|a, b| {
        b.correlation
            .partial_cmp(&a.correlation)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    debug!(
        "{} users correlate with user {} at >= {}",
        similar.len(),
        target_user_id,
        config.correlation_threshold
    );
    Ok(similar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::JoinedRating;

    fn joined(rows: &[(UserId, &'static str, f32)]) -> Vec<JoinedRating<'static>> {
        rows.iter()
            .map(|&(user_id, title, rating)| JoinedRating {
                user_id,
                movie_id: 0,
                title,
                rating,
                timestamp: 0,
            })
            .collect()
    }

    fn matrix() -> UserMovieMatrix {
        #[rustfmt::skip]
        let rows = joined(&[
            (1, "A", 5.0), (1, "B", 3.0), (1, "C", 4.0), (1, "D", 1.0),
            (2, "A", 5.0), (2, "B", 2.0), (2, "C", 4.0), (2, "D", 2.0),
            (3, "A", 1.0), (3, "B", 5.0), (3, "C", 2.0), (3, "D", 5.0),
            // User 4 shares only two of user 1's four titles
            (4, "A", 5.0), (4, "B", 3.0),
            // User 5 mirrors user 1 exactly
            (5, "A", 5.0), (5, "B", 3.0), (5, "C", 4.0), (5, "D", 1.0),
        ]);
        UserMovieMatrix::build(&rows, 0)
    }

    fn config() -> RecommenderConfig {
        RecommenderConfig::default().with_min_rating_count(0)
    }

    #[test]
    fn test_overlap_filter_is_strict() {
        let users = users_with_shared_movies(&matrix(), 1, 0.6).unwrap();
        let ids: Vec<UserId> = users.iter().map(|u| u.user_id).collect();

        // floor(4 * 0.6) = 2; user 4 has exactly 2 and is dropped
        assert_eq!(ids, vec![1, 2, 3, 5]);
        assert!(users.iter().all(|u| u.shared_movies == 4));
    }

    #[test]
    fn test_similar_users_sorted_and_thresholded() {
        let similar = find_similar_users(&matrix(), 1, &config()).unwrap();
        let ids: Vec<UserId> = similar.iter().map(|u| u.user_id).collect();

        // user 5 (r = 1.0) before user 2 (r ~ 0.878); user 3 is anti-correlated
        assert_eq!(ids, vec![5, 2]);
        assert!((similar[0].correlation - 1.0).abs() < 1e-12);
        assert!(similar.windows(2).all(|w| w[0].correlation >= w[1].correlation));
        assert!(similar.iter().all(|u| u.correlation >= 0.65));
    }

    #[test]
    fn test_target_is_excluded() {
        let similar = find_similar_users(&matrix(), 1, &config()).unwrap();
        assert!(similar.iter().all(|u| u.user_id != 1));
    }

    #[test]
    fn test_no_similar_users_is_empty_not_error() {
        let similar = find_similar_users(&matrix(), 3, &config()).unwrap();
        assert!(similar.is_empty());
    }

    #[test]
    fn test_unknown_user() {
        let err = find_similar_users(&matrix(), 42, &config()).unwrap_err();
        assert_eq!(err, RecommendError::UserNotFound { user_id: 42 });
    }

    #[test]
    fn test_user_without_popular_ratings() {
        let mut rows = joined(&[(1, "A", 4.0), (2, "A", 3.0)]);
        rows.extend(joined(&[(3, "Obscure", 5.0)]));
        let matrix = UserMovieMatrix::build(&rows, 1);

        let err = find_similar_users(&matrix, 3, &config()).unwrap_err();
        assert_eq!(err, RecommendError::NoRatings { user_id: 3 });
    }

    #[test]
    fn test_ties_broken_by_user_id() {
        #[rustfmt::skip]
        let rows = joined(&[
            (1, "A", 1.0), (1, "B", 2.0), (1, "C", 3.0),
            (7, "A", 2.0), (7, "B", 4.0), (7, "C", 6.0),
            (3, "A", 3.0), (3, "B", 4.0), (3, "C", 5.0),
        ]);
        let matrix = UserMovieMatrix::build(&rows, 0);

        let first = find_similar_users(&matrix, 1, &config()).unwrap();
        let second = find_similar_users(&matrix, 1, &config()).unwrap();
        let ids: Vec<UserId> = first.iter().map(|u| u.user_id).collect();

        assert_eq!(ids, vec![3, 7]);
        assert_eq!(first, second);
    }
}
