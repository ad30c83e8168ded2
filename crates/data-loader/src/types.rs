//! Core domain types for the MovieLens CSV dataset.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Type aliases for domain clarity (UserId, MovieId)
//! - Movie and Rating records as read from `movie.csv` / `rating.csv`
//! - The `Dataset`, which owns both tables and answers the lookups the
//!   recommenders need
//! - `JoinedRating`, one rating row annotated with its movie title

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Movie-related Types
// =============================================================================

/// Represents a movie in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// Full title as it appears in the file, e.g. "Toy Story (1995)".
    ///
    /// Titles are the column keys of the rating matrix.
    pub title: String,
    /// Year extracted from title (e.g., "Toy Story (1995)")
    pub year: Option<u16>,
    pub genres: Vec<Genre>,
}

/// Movie genres used by the MovieLens CSV releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Children,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    FilmNoir,
    Horror,
    Imax,
    Musical,
    Mystery,
    Romance,
    SciFi,
    Thriller,
    War,
    Western,
}

// =============================================================================
// Rating Type
// =============================================================================

/// Represents a single rating from a user for a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 0.5 to 5.0 in half-star steps
    pub rating: f32,
    /// Unix timestamp (seconds) when rating was made
    pub timestamp: i64,
}

/// One row of the ratings/movies join: a rating annotated with its title.
///
/// The title is borrowed from the `Dataset` that produced the row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedRating<'a> {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub title: &'a str,
    pub rating: f32,
    pub timestamp: i64,
}

// =============================================================================
// Dataset - The In-Memory Tables
// =============================================================================

/// Holds the movie table and the rating table, plus a per-user rating index.
///
/// Ratings are kept in file order in `ratings`; `user_ratings` holds the same
/// records grouped by user for the "full rating history" lookups.
#[derive(Debug)]
pub struct Dataset {
    pub(crate) movies: HashMap<MovieId, Movie>,
    pub(crate) ratings: Vec<Rating>,
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
}

impl Dataset {
    /// Creates a new, empty Dataset
    pub fn new() -> Self {
        Self {
            movies: HashMap::new(),
            ratings: Vec::new(),
            user_ratings: HashMap::new(),
        }
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if user has no ratings
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All ratings in the order they were inserted
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Iterate over every movie (arbitrary order)
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// Every user with at least one rating, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_ratings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Insert a movie into the dataset
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a rating and update the per-user index
    pub fn insert_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);
        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(rating);
    }

    /// Join ratings with movie titles.
    ///
    /// Ratings drive the join: every rating whose movie is known yields one
    /// row, in rating order. Ratings pointing at an unknown movie are dropped.
    pub fn joined(&self) -> Vec<JoinedRating<'_>> {
        let joined: Vec<JoinedRating<'_>> = self
            .ratings
            .iter()
            .filter_map(|r| {
                let movie = self.movies.get(&r.movie_id)?;
                Some(JoinedRating {
                    user_id: r.user_id,
                    movie_id: r.movie_id,
                    title: movie.title.as_str(),
                    rating: r.rating,
                    timestamp: r.timestamp,
                })
            })
            .collect();

        let dropped = self.ratings.len() - joined.len();
        if dropped > 0 {
            tracing::warn!("Dropped {} ratings referencing unknown movies", dropped);
        }
        joined
    }

    /// Get counts for debugging/validation: (users, movies, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.user_ratings.len(), self.movies.len(), self.ratings.len())
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}
