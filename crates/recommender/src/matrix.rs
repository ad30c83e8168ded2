//! User × movie rating matrix.
//!
//! Built from the joined rating table, keeping only popular titles. The
//! matrix is sparse: a missing cell means "not rated", which is not the same
//! as a zero rating, so nothing here ever fills gaps with a default value.
//!
//! ## Layout
//! - rows are users, sorted by `UserId`
//! - columns are titles, sorted lexicographically
//! - each row and each column is a vector of `(index, rating)` pairs sorted
//!   by index, so two rows (or two columns) can be merge-joined
//!   on their common entries

use data_loader::{Dataset, JoinedRating, UserId};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// One non-missing cell seen from a row (column index) or a column (row index)
pub type Entry = (usize, f32);

#[derive(Debug, Clone, Default)]
pub struct UserMovieMatrix {
    user_ids: Vec<UserId>,
    titles: Vec<String>,
    user_index: HashMap<UserId, usize>,
    title_index: HashMap<String, usize>,
    rows: Vec<Vec<Entry>>,
    columns: Vec<Vec<Entry>>,
    /// Source rating rows per column, before duplicate cells were averaged
    column_counts: Vec<usize>,
}

impl UserMovieMatrix {
    /// Join the dataset and build the matrix from it
    pub fn from_dataset(dataset: &Dataset, min_rating_count: usize) -> Self {
        Self::build(&dataset.joined(), min_rating_count)
    }

    /// Build the matrix from joined rating rows.
    ///
    /// ## Algorithm
    /// 1. Count rating rows per title
    /// 2. Keep titles whose count is strictly greater than `min_rating_count`
    /// 3. Pivot: one row per user, one column per kept title; a user who rated
    ///    the same title more than once gets the mean of those ratings
    ///
    /// Every user present in `joined` gets a row, even if all of their
    /// ratings were on unpopular titles (the row is then empty).
    pub fn build(joined: &[JoinedRating<'_>], min_rating_count: usize) -> Self {
        let mut title_counts: HashMap<&str, usize> = HashMap::new();
        for row in joined {
            *title_counts.entry(row.title).or_insert(0) += 1;
        }

        let popular: BTreeSet<&str> = title_counts
            .iter()
            .filter(|&(_, &count)| count > min_rating_count)
            .map(|(&title, _)| title)
            .collect();
        let users: BTreeSet<UserId> = joined.iter().map(|row| row.user_id).collect();

        let titles: Vec<String> = popular.iter().map(|t| t.to_string()).collect();
        let user_ids: Vec<UserId> = users.into_iter().collect();
        let title_index: HashMap<String, usize> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        let user_index: HashMap<UserId, usize> =
            user_ids.iter().enumerate().map(|(i, &u)| (u, i)).collect();

        // Raw cells per row, in file order; duplicates are merged once sorted
        let mut raw_rows: Vec<Vec<Entry>> = vec![Vec::new(); user_ids.len()];
        for row in joined {
            let Some(&col) = title_index.get(row.title) else {
                continue;
            };
            let r = user_index[&row.user_id];
            raw_rows[r].push((col, row.rating));
        }

        let mut rows = Vec::with_capacity(raw_rows.len());
        let mut columns = vec![Vec::new(); titles.len()];
        for (r, mut raw) in raw_rows.into_iter().enumerate() {
            raw.sort_by_key(|&(col, _)| col);
            let merged = average_duplicates(&raw);
            // Rows are visited in order, so every column stays sorted by row
            for &(c, value) in &merged {
                columns[c].push((r, value));
            }
            rows.push(merged);
        }

        let column_counts = titles.iter().map(|t| title_counts[t.as_str()]).collect();

        info!(
            "Built rating matrix: {} users x {} titles ({} of {} titles kept, threshold {})",
            user_ids.len(),
            titles.len(),
            titles.len(),
            title_counts.len(),
            min_rating_count
        );
        debug!(
            "Rating matrix holds {} non-missing cells",
            rows.iter().map(Vec::len).sum::<usize>()
        );

        Self {
            user_ids,
            titles,
            user_index,
            title_index,
            rows,
            columns,
            column_counts,
        }
    }

    /// True when no title survived the popularity filter
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn n_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn n_titles(&self) -> usize {
        self.titles.len()
    }

    /// Row keys, ascending
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    /// Column keys, ascending
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn user_id_at(&self, row: usize) -> UserId {
        self.user_ids[row]
    }

    pub fn title_at(&self, col: usize) -> &str {
        &self.titles[col]
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.title_index.contains_key(title)
    }

    pub fn title_position(&self, title: &str) -> Option<usize> {
        self.title_index.get(title).copied()
    }

    /// Non-missing cells of a user's row as `(column, rating)`
    pub fn user_row(&self, user_id: UserId) -> Option<&[Entry]> {
        let r = *self.user_index.get(&user_id)?;
        Some(&self.rows[r])
    }

    /// Row by position rather than by user id
    pub fn row_at(&self, row: usize) -> &[Entry] {
        &self.rows[row]
    }

    /// Non-missing cells of a title's column as `(row, rating)`
    pub fn column(&self, title: &str) -> Option<&[Entry]> {
        let c = *self.title_index.get(title)?;
        Some(&self.columns[c])
    }

    pub fn column_at(&self, col: usize) -> &[Entry] {
        &self.columns[col]
    }

    /// Number of source rating rows behind a column
    pub fn column_count(&self, title: &str) -> Option<usize> {
        let c = *self.title_index.get(title)?;
        Some(self.column_counts[c])
    }

    /// A single cell; `None` means not rated (or unknown user/title)
    pub fn rating(&self, user_id: UserId, title: &str) -> Option<f32> {
        let c = *self.title_index.get(title)?;
        let row = self.user_row(user_id)?;
        row.binary_search_by_key(&c, |&(col, _)| col)
            .ok()
            .map(|i| row[i].1)
    }
}

/// Collapse runs of the same column in a sorted row into their mean
fn average_duplicates(sorted: &[Entry]) -> Vec<Entry> {
    sorted
        .chunk_by(|a, b| a.0 == b.0)
        .map(|run| {
            let sum: f64 = run.iter().map(|&(_, v)| f64::from(v)).sum();
            (run[0].0, (sum / run.len() as f64) as f32)
        })
        .collect()
}
