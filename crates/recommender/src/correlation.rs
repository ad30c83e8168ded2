//! Pearson correlation over sparse, pairwise-complete observations.
//!
//! Two vectors are compared only on the positions where both have a value.
//! If that overlap is too small, or either side is constant on it, the
//! correlation is undefined and `None` is returned; callers skip such pairs.

use crate::matrix::Entry;

/// Pearson correlation of two sorted sparse vectors.
///
/// `min_overlap` is the number of shared positions required; anything below
/// two is raised to two, since a line through one point has no slope.
pub fn pearson(a: &[Entry], b: &[Entry], min_overlap: usize) -> Option<f64> {
    let pairs = paired_observations(a, b);
    if pairs.len() < min_overlap.max(2) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|&(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|&(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for &(x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some((cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0))
}

/// Values present in both vectors, matched by index.
fn paired_observations(a: &[Entry], b: &[Entry]) -> Vec<(f64, f64)> {
    let mut pairs = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (ia, va) = a[i];
        let (ib, vb) = b[j];
        if ia == ib {
            pairs.push((f64::from(va), f64::from(vb)));
            i += 1;
            j += 1;
        } else if ia < ib {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

/// Number of positions both vectors have a value for
pub fn overlap(a: &[Entry], b: &[Entry]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(values: &[f32]) -> Vec<Entry> {
        values.iter().copied().enumerate().collect()
    }

    #[test]
    fn test_perfect_correlation() {
        let a = dense(&[1.0, 2.0, 3.0, 4.0]);
        let b = dense(&[2.0, 4.0, 6.0, 8.0]);
        let r = pearson(&a, &b, 2).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let c = dense(&[4.0, 3.0, 2.0, 1.0]);
        let r = pearson(&a, &c, 2).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_self_correlation_is_one() {
        let a = dense(&[5.0, 3.0, 4.0, 1.0]);
        let r = pearson(&a, &a, 2).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let a = vec![(0, 5.0), (1, 3.0), (3, 4.0), (4, 1.0)];
        let b = vec![(0, 4.5), (2, 2.0), (3, 4.0), (4, 2.5)];
        assert_eq!(pearson(&a, &b, 2), pearson(&b, &a, 2));
    }

    #[test]
    fn test_known_value() {
        let a = dense(&[5.0, 3.0, 4.0, 1.0]);
        let b = dense(&[5.0, 2.0, 4.0, 2.0]);
        // cov = 6.75, var_a = 8.75, var_b = 6.75
        let expected = 6.75 / (8.75f64 * 6.75).sqrt();
        let r = pearson(&a, &b, 2).unwrap();
        assert!((r - expected).abs() < 1e-12);
    }

    #[test]
    fn test_only_shared_positions_count() {
        // Position 9 exists only in `a` and must not influence the result
        let a = vec![(0, 1.0), (1, 2.0), (2, 3.0), (9, 1.0)];
        let b = vec![(0, 1.0), (1, 2.0), (2, 3.0)];
        let r = pearson(&a, &b, 2).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(overlap(&a, &b), 3);
    }

    #[test]
    fn test_undefined_cases() {
        let a = vec![(0, 4.0), (1, 2.0)];
        // single shared observation
        assert_eq!(pearson(&a, &[(1, 3.0)], 2), None);
        // no overlap at all
        assert_eq!(pearson(&a, &[(5, 3.0), (6, 1.0)], 2), None);
        // constant vector
        assert_eq!(pearson(&a, &[(0, 3.0), (1, 3.0)], 2), None);
        // overlap below the requested minimum
        assert_eq!(pearson(&a, &[(0, 1.0), (1, 2.0)], 3), None);
    }
}
