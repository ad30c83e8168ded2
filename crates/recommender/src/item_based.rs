//! Item-Based Recommender
//!
//! Anchors on the user's most recent favorite movie and returns the titles
//! whose rating pattern across all users follows it most closely.

use crate::config::RecommenderConfig;
use crate::correlation::pearson;
use crate::error::{RecommendError, Result};
use crate::matrix::UserMovieMatrix;
use crate::Recommendation;
use data_loader::{Dataset, Rating, UserId};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Recommend titles correlated with the user's latest favorite.
///
/// Fails with:
/// - `NoFavoriteMovie` if the user never gave `favorite_rating`
/// - `MovieNotFound` if the favorite has no movie record
/// - `MovieNotInMatrix` if the favorite was filtered out as unpopular
#[instrument(skip(dataset, matrix, config))]
pub fn recommend_item_based(
    user_id: UserId,
    dataset: &Dataset,
    matrix: &UserMovieMatrix,
    config: &RecommenderConfig,
) -> Result<Vec<Recommendation>> {
    let favorite = latest_favorite(dataset, user_id, config.favorite_rating)?;

    let movie = dataset
        .get_movie(favorite.movie_id)
        .ok_or(RecommendError::MovieNotFound {
            movie_id: favorite.movie_id,
        })?;
    debug!("Latest favorite of user {} is '{}'", user_id, movie.title);

    let favorite_col = matrix
        .title_position(&movie.title)
        .ok_or_else(|| RecommendError::MovieNotInMatrix {
            title: movie.title.clone(),
        })?;
    let favorite_ratings = matrix.column_at(favorite_col);

    let mut correlated: Vec<(usize, f64)> = (0..matrix.n_titles())
        .into_par_iter()
        .filter(|&col| col != favorite_col)
        .filter_map(|col| {
            pearson(favorite_ratings, matrix.column_at(col), config.min_overlap)
                .map(|r| (col, r))
        })
        .collect();

    // Columns are in title order, so ties fall back to the title
    correlated.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    debug!("{} titles have a defined correlation with the favorite", correlated.len());

    Ok(correlated
        .into_iter()
        .take(config.top_n)
        .map(|(col, score)| {
            let title = matrix.title_at(col);
            Recommendation {
                movie_id: movie_id_for_title(dataset, title),
                title: title.to_string(),
                score,
            }
        })
        .collect())
}

/// The user's most recent rating equal to `favorite_rating`.
///
/// Equal timestamps resolve to the largest movie id.
pub fn latest_favorite(
    dataset: &Dataset,
    user_id: UserId,
    favorite_rating: f32,
) -> Result<Rating> {
    dataset
        .get_user_ratings(user_id)
        .iter()
        .filter(|r| r.rating == favorite_rating)
        .max_by_key(|r| (r.timestamp, r.movie_id))
        .copied()
        .ok_or(RecommendError::NoFavoriteMovie { user_id })
}

/// Smallest movie id carrying `title`; titles are the matrix keys and may be
/// shared by several movie records.
fn movie_id_for_title(dataset: &Dataset, title: &str) -> Option<data_loader::MovieId> {
    dataset
        .movies()
        .filter(|m| m.title == title)
        .map(|m| m.id)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(user_id: UserId, movie_id: u32, rating: f32, timestamp: i64) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp,
        }
    }

    #[test]
    fn test_latest_favorite_picks_newest_five_star() {
        let mut dataset = Dataset::new();
        dataset.insert_rating(rating(1, 10, 5.0, 100));
        dataset.insert_rating(rating(1, 11, 5.0, 300));
        dataset.insert_rating(rating(1, 12, 4.5, 900));

        let favorite = latest_favorite(&dataset, 1, 5.0).unwrap();
        assert_eq!(favorite.movie_id, 11);
    }

    #[test]
    fn test_latest_favorite_tie_takes_largest_movie_id() {
        let mut dataset = Dataset::new();
        dataset.insert_rating(rating(1, 30, 5.0, 500));
        dataset.insert_rating(rating(1, 20, 5.0, 500));

        let favorite = latest_favorite(&dataset, 1, 5.0).unwrap();
        assert_eq!(favorite.movie_id, 30);
    }

    #[test]
    fn test_no_favorite() {
        let mut dataset = Dataset::new();
        dataset.insert_rating(rating(1, 10, 4.5, 100));

        let err = latest_favorite(&dataset, 1, 5.0).unwrap_err();
        assert_eq!(err, RecommendError::NoFavoriteMovie { user_id: 1 });
        assert!(latest_favorite(&dataset, 2, 5.0).is_err());
    }

    #[test]
    fn test_favorite_without_movie_record() {
        let mut dataset = Dataset::new();
        dataset.insert_rating(rating(1, 10, 5.0, 100));
        let matrix = UserMovieMatrix::from_dataset(&dataset, 0);

        let err = recommend_item_based(1, &dataset, &matrix, &RecommenderConfig::default())
            .unwrap_err();
        assert_eq!(err, RecommendError::MovieNotFound { movie_id: 10 });
    }
}
