//! Tunable parameters shared by the matrix builder and both recommenders.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};

/// All thresholds of the recommendation pipeline.
///
/// Missing fields in a serialized config fall back to the defaults, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// A title is kept only if it has strictly more ratings than this
    pub min_rating_count: usize,
    /// Fraction of the target's movies another user must have rated
    pub min_similarity_ratio: f64,
    /// Minimum Pearson correlation for a user to count as similar
    pub correlation_threshold: f64,
    /// Mean weighted ratings at or below this are dropped
    pub weighted_rating_cutoff: f64,
    /// Number of titles returned by each recommender
    pub top_n: usize,
    /// Rating value that marks a favorite movie (exact match)
    pub favorite_rating: f32,
    /// Shared observations required before a correlation is defined
    pub min_overlap: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            min_rating_count: 1000,
            min_similarity_ratio: 0.6,
            correlation_threshold: 0.65,
            weighted_rating_cutoff: 3.5,
            top_n: 5,
            favorite_rating: 5.0,
            min_overlap: 2,
        }
    }
}

impl RecommenderConfig {
    pub fn with_min_rating_count(mut self, count: usize) -> Self {
        self.min_rating_count = count;
        self
    }

    pub fn with_min_similarity_ratio(mut self, ratio: f64) -> Self {
        self.min_similarity_ratio = ratio;
        self
    }

    pub fn with_correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = threshold;
        self
    }

    pub fn with_weighted_rating_cutoff(mut self, cutoff: f64) -> Self {
        self.weighted_rating_cutoff = cutoff;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_favorite_rating(mut self, rating: f32) -> Self {
        self.favorite_rating = rating;
        self
    }

    pub fn with_min_overlap(mut self, min_overlap: usize) -> Self {
        self.min_overlap = min_overlap;
        self
    }

    /// Reject values the algorithms cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_similarity_ratio) {
            return Err(RecommendError::InvalidConfig(format!(
                "min_similarity_ratio must be within [0, 1], got {}",
                self.min_similarity_ratio
            )));
        }
        if !(-1.0..=1.0).contains(&self.correlation_threshold) {
            return Err(RecommendError::InvalidConfig(format!(
                "correlation_threshold must be within [-1, 1], got {}",
                self.correlation_threshold
            )));
        }
        if !self.weighted_rating_cutoff.is_finite() {
            return Err(RecommendError::InvalidConfig(
                "weighted_rating_cutoff must be finite".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(RecommendError::InvalidConfig(
                "top_n must be at least 1".to_string(),
            ));
        }
        if self.min_overlap < 2 {
            return Err(RecommendError::InvalidConfig(format!(
                "min_overlap must be at least 2, got {}",
                self.min_overlap
            )));
        }
        Ok(())
    }
}
