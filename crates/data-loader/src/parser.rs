//! Parser for MovieLens CSV files.
//!
//! This module handles parsing the two CSV files of the MovieLens releases:
//! - movie.csv: movieId,title,genres
//! - rating.csv: userId,movieId,rating,timestamp
//!
//! Both files start with a header row. Titles may be quoted and contain
//! commas, which the `csv` crate takes care of. Timestamps are accepted
//! either as unix seconds or as `YYYY-MM-DD HH:MM:SS` datetimes.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::warn;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

const MOVIES_FILE: &str = "movie.csv";
const RATINGS_FILE: &str = "rating.csv";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const NO_GENRES: &str = "(no genres listed)";

/// Raw movie row exactly as it appears in the file
#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    #[serde(default)]
    genres: Option<String>,
}

/// Raw rating row; the timestamp stays textual until we know its format
#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f32,
    timestamp: String,
}

/// Open a file, reporting a missing file as `FileNotFound` rather than a bare I/O error
fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Parse the movie.csv file
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    parse_movies_from_reader(open(path)?)
}

/// Parse movies from any reader holding movie.csv content
pub fn parse_movies_from_reader<R: Read>(reader: R) -> Result<Vec<Movie>> {
    let mut movies = Vec::new();

    for (idx, row) in csv_reader(reader).deserialize::<MovieRow>().enumerate() {
        // Line 1 is the header
        let line_no = idx + 2;
        let row = row?;

        if row.title.is_empty() {
            return Err(DataLoadError::ParseError {
                file: MOVIES_FILE.to_string(),
                line: line_no,
                reason: "Missing title".to_string(),
            });
        }

        let genres = match row.genres.as_deref() {
            Some(s) => parse_genres(s),
            None => Vec::new(),
        };

        movies.push(Movie {
            id: row.movie_id,
            year: extract_year_from_title(&row.title),
            title: row.title,
            genres,
        });
    }

    Ok(movies)
}

/// Parse the rating.csv file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    parse_ratings_from_reader(open(path)?)
}

/// Parse ratings from any reader holding rating.csv content
pub fn parse_ratings_from_reader<R: Read>(reader: R) -> Result<Vec<Rating>> {
    let mut ratings = Vec::new();

    for (idx, row) in csv_reader(reader).deserialize::<RatingRow>().enumerate() {
        let line_no = idx + 2;
        let row = row?;

        let timestamp =
            parse_timestamp(&row.timestamp).ok_or_else(|| DataLoadError::ParseError {
                file: RATINGS_FILE.to_string(),
                line: line_no,
                reason: format!("Invalid timestamp: {}", row.timestamp),
            })?;

        ratings.push(Rating {
            user_id: row.user_id,
            movie_id: row.movie_id,
            rating: row.rating,
            timestamp,
        });
    }

    Ok(ratings)
}

/// Parse a timestamp given as unix seconds or as a `YYYY-MM-DD HH:MM:SS` datetime (UTC)
fn parse_timestamp(s: &str) -> Option<i64> {
    if let Ok(secs) = s.parse::<i64>() {
        return Some(secs);
    }
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Extract year from movie title
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        return title[start + 1..end].trim().parse::<u16>().ok();
    }
    None
}

/// Parse a genre string into Genre enum
///
/// Both the 1M spelling ("Children's") and the CSV spelling ("Children") are accepted.
fn parse_genre(s: &str) -> Result<Genre> {
    match s {
        "Action" => Ok(Genre::Action),
        "Adventure" => Ok(Genre::Adventure),
        "Animation" => Ok(Genre::Animation),
        "Children" | "Children's" => Ok(Genre::Children),
        "Comedy" => Ok(Genre::Comedy),
        "Crime" => Ok(Genre::Crime),
        "Documentary" => Ok(Genre::Documentary),
        "Drama" => Ok(Genre::Drama),
        "Fantasy" => Ok(Genre::Fantasy),
        "Film-Noir" => Ok(Genre::FilmNoir),
        "Horror" => Ok(Genre::Horror),
        "IMAX" => Ok(Genre::Imax),
        "Musical" => Ok(Genre::Musical),
        "Mystery" => Ok(Genre::Mystery),
        "Romance" => Ok(Genre::Romance),
        "Sci-Fi" => Ok(Genre::SciFi),
        "Thriller" => Ok(Genre::Thriller),
        "War" => Ok(Genre::War),
        "Western" => Ok(Genre::Western),
        _ => Err(DataLoadError::InvalidValue {
            field: "genre".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parse pipe-separated genres
///
/// Example: "Action|Adventure|Sci-Fi" -> vec![Genre::Action, Genre::Adventure, Genre::SciFi]
///
/// Genres are metadata only, so an unrecognised name is logged and skipped.
fn parse_genres(s: &str) -> Vec<Genre> {
    if s.is_empty() || s == NO_GENRES {
        return Vec::new();
    }
    s.split('|')
        .filter_map(|g| match parse_genre(g.trim()) {
            Ok(genre) => Some(genre),
            Err(e) => {
                warn!("Skipping genre: {}", e);
                None
            }
        })
        .collect()
}
