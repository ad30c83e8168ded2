//! User-Based Recommender
//!
//! "Users who rate like you loved these movies."
//!
//! ## Algorithm
//! 1. Find the users most correlated with the target (see `similarity`)
//! 2. Walk each similar user's full rating history, all movies included,
//!    weighting every rating by that user's correlation
//! 3. Average the weighted ratings per movie
//! 4. Keep movies whose mean beats the cutoff, best first, ties by movie id
//! 5. Resolve titles and return the top N

use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::matrix::UserMovieMatrix;
use crate::similarity::{find_similar_users, SimilarUser};
use crate::Recommendation;
use data_loader::{Dataset, MovieId, UserId};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Recommend movies to `target_user_id` from the ratings of similar users.
///
/// Fails with `InsufficientSimilarUsers` when no user passes the overlap and
/// correlation thresholds. Returns fewer than `top_n` titles (possibly none)
/// when not enough movies clear the weighted-rating cutoff.
#[instrument(skip(matrix, dataset, config))]
pub fn recommend_user_based(
    target_user_id: UserId,
    matrix: &UserMovieMatrix,
    dataset: &Dataset,
    config: &RecommenderConfig,
) -> Result<Vec<Recommendation>> {
    let similar_users = find_similar_users(matrix, target_user_id, config)?;
    if similar_users.is_empty() {
        return Err(RecommendError::InsufficientSimilarUsers {
            user_id: target_user_id,
        });
    }

    let scores = weighted_movie_scores(target_user_id, &similar_users, dataset);
    debug!(
        "Scored {} candidate movies from {} similar users",
        scores.len(),
        similar_users.len()
    );

    let ranked = rank_scores(scores, config.weighted_rating_cutoff);

    let recommendations: Vec<Recommendation> = ranked
        .into_iter()
        .filter_map(|(movie_id, score)| {
            let movie = dataset.get_movie(movie_id)?;
            Some(Recommendation {
                movie_id: Some(movie_id),
                title: movie.title.clone(),
                score,
            })
        })
        .take(config.top_n)
        .collect();

    debug!("Returning {} user-based recommendations", recommendations.len());
    Ok(recommendations)
}

/// Mean correlation-weighted rating per movie over the similar users' histories.
///
/// Rows belonging to the target never contribute.
fn weighted_movie_scores(
    target_user_id: UserId,
    similar_users: &[SimilarUser],
    dataset: &Dataset,
) -> HashMap<MovieId, f64> {
    let mut sums: HashMap<MovieId, (f64, u32)> = HashMap::new();

    for similar in similar_users.iter().filter(|u| u.user_id != target_user_id) {
        for rating in dataset.get_user_ratings(similar.user_id) {
            let weighted = similar.correlation * f64::from(rating.rating);
            let entry = sums.entry(rating.movie_id).or_insert((0.0, 0));
            entry.0 += weighted;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(movie_id, (sum, count))| (movie_id, sum / f64::from(count)))
        .collect()
}

/// Drop scores at or below `cutoff`; sort the rest descending, ties by movie id.
fn rank_scores(scores: HashMap<MovieId, f64>, cutoff: f64) -> Vec<(MovieId, f64)> {
    let mut ranked: Vec<(MovieId, f64)> = scores
        .into_iter()
        .filter(|&(_, score)| score > cutoff)
        .collect();

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}
