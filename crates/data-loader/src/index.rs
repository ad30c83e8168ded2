//! Dataset building and validation.
//!
//! This module builds the `Dataset` from parsed data:
//! - Parse both CSV files in parallel
//! - Insert movies and ratings (which also fills the per-user index)
//! - Validate data integrity before anything downstream sees it

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Lowest and highest rating values a MovieLens file may contain
pub const MIN_RATING: f32 = 0.5;
pub const MAX_RATING: f32 = 5.0;

impl Dataset {
    /// Load `movie.csv` and `rating.csv` from a directory
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        Self::load_from_files(&data_dir.join("movie.csv"), &data_dir.join("rating.csv"))
    }

    /// Load the dataset from an explicit movies file and ratings file
    ///
    /// This is the main entry point for loading data.
    ///
    /// Steps:
    /// 1. Parse both files (in parallel)
    /// 2. Build the movie table and rating indices
    /// 3. Validate data integrity
    pub fn load_from_files(movies_path: &Path, ratings_path: &Path) -> Result<Self> {
        info!(
            "Loading MovieLens dataset from {:?} and {:?}",
            movies_path, ratings_path
        );

        // Rayon's `join` runs both parsers in parallel
        let (movies, ratings) = rayon::join(
            || parser::parse_movies(movies_path),
            || parser::parse_ratings(ratings_path),
        );
        let movies = movies?;
        let ratings = ratings?;

        info!("Parsed {} movies, {} ratings", movies.len(), ratings.len());

        let dataset = Self::from_parts(movies, ratings)?;
        let (users, movies, ratings) = dataset.counts();
        info!(
            "Dataset built and validated: {} users, {} movies, {} ratings",
            users, movies, ratings
        );
        Ok(dataset)
    }

    /// Build a validated dataset from already parsed records
    pub fn from_parts(movies: Vec<Movie>, ratings: Vec<Rating>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(movies.len());
        for movie in &movies {
            if !seen.insert(movie.id) {
                return Err(DataLoadError::ValidationError(format!(
                    "duplicate movieId {}",
                    movie.id
                )));
            }
        }

        let mut dataset = Dataset::new();
        for movie in movies {
            dataset.insert_movie(movie);
        }
        for rating in ratings {
            dataset.insert_rating(rating);
        }

        dataset.validate()?;
        Ok(dataset)
    }

    /// Validate data integrity
    ///
    /// Every rating must be a finite value in `MIN_RATING..=MAX_RATING`.
    /// Ratings referencing unknown movies are tolerated here; the join drops them.
    pub fn validate(&self) -> Result<()> {
        for rating in &self.ratings {
            if !rating.rating.is_finite()
                || rating.rating < MIN_RATING
                || rating.rating > MAX_RATING
            {
                return Err(DataLoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: rating.rating.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MOVIES: &str = "movieId,title,genres\n\
                          1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy\n\
                          2,Jumanji (1995),Adventure|Children|Fantasy\n";
    const RATINGS: &str = "userId,movieId,rating,timestamp\n\
                           1,1,4.0,964982703\n\
                           1,2,5.0,964981247\n\
                           2,1,3.0,964982224\n\
                           2,99,4.5,964983815\n";

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("movie.csv"), MOVIES).unwrap();
        fs::write(dir.path().join("rating.csv"), RATINGS).unwrap();

        let dataset = Dataset::load_from_dir(dir.path()).unwrap();
        let (users, movies, ratings) = dataset.counts();

        assert_eq!(users, 2);
        assert_eq!(movies, 2);
        assert_eq!(ratings, 4);
        assert_eq!(dataset.get_user_ratings(1).len(), 2);
        assert_eq!(dataset.get_movie(2).unwrap().title, "Jumanji (1995)");
    }

    #[test]
    fn test_load_missing_ratings_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("movie.csv"), MOVIES).unwrap();

        let result = Dataset::load_from_dir(dir.path());
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }

    #[test]
    fn test_joined_drops_unknown_movies() {
        let movies = parser::parse_movies_from_reader(MOVIES.as_bytes()).unwrap();
        let ratings = parser::parse_ratings_from_reader(RATINGS.as_bytes()).unwrap();
        let dataset = Dataset::from_parts(movies, ratings).unwrap();

        let joined = dataset.joined();
        assert_eq!(joined.len(), 3);
        assert!(joined.iter().all(|row| row.movie_id != 99));
        assert_eq!(joined[0].title, "Toy Story (1995)");
        assert_eq!(joined[1].title, "Jumanji (1995)");
    }

    #[test]
    fn test_rejects_out_of_range_rating() {
        let ratings = vec![Rating {
            user_id: 1,
            movie_id: 1,
            rating: 6.0,
            timestamp: 0,
        }];
        let result = Dataset::from_parts(Vec::new(), ratings);
        assert!(matches!(result, Err(DataLoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_rejects_duplicate_movie_ids() {
        let movie = Movie {
            id: 7,
            title: "Twice (2000)".to_string(),
            year: Some(2000),
            genres: vec![],
        };
        let result = Dataset::from_parts(vec![movie.clone(), movie], Vec::new());
        assert!(matches!(result, Err(DataLoadError::ValidationError(_))));
    }
}
