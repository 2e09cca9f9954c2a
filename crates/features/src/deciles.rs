//! Size decile assignment.
//!
//! Buckets a column of displayed sizes into up to ten quantile groups,
//! labelled 1 (smallest) through 10 (largest).
//!
//! The quantile edges are taken at q = 0, 0.1, ..., 1.0 with linear
//! interpolation between order statistics (position `q * (n - 1)`). Duplicate
//! edges are dropped, which leaves fewer groups when sizes repeat heavily.
//! Groups are right-closed intervals `(e[k-1], e[k]]`, the first one also
//! closed on the left. A value's label depends only on the multiset of values,
//! never on row order, and equal sizes always share a label.

use hliq_core::{DecileLabel, NUM_DECILES};
use ordered_float::OrderedFloat;

/// Linear interpolation between `a` and `b`, evaluated from the nearer end.
#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

/// Quantile value of an ascending slice at fraction `q` in `[0, 1]`.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let last = sorted.len() - 1;
    let pos = q * last as f64;
    let lo = (pos.floor() as usize).min(last);
    let hi = (lo + 1).min(last);
    lerp(sorted[lo], sorted[hi], pos - lo as f64)
}

/// Distinct quantile edges of the finite values, ascending.
///
/// Returns at most `buckets + 1` edges; empty when there are no finite values.
pub fn quantile_edges(values: &[f64], buckets: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || buckets == 0 {
        return Vec::new();
    }
    sorted.sort_unstable_by_key(|v| OrderedFloat(*v));

    let step = 1.0 / buckets as f64;
    let mut edges: Vec<f64> = (0..=buckets)
        .map(|k| {
            let q = if k == buckets { 1.0 } else { k as f64 * step };
            quantile_sorted(&sorted, q)
        })
        .collect();
    edges.dedup();
    edges
}

/// Label of `value` given ascending distinct edges.
fn label_for(value: f64, edges: &[f64]) -> Option<DecileLabel> {
    if !value.is_finite() || edges.is_empty() {
        return None;
    }
    // One distinct value: a single group.
    if edges.len() == 1 || value <= edges[0] {
        return Some(1);
    }
    let idx = edges.partition_point(|e| *e < value);
    if idx >= edges.len() {
        return None;
    }
    Some(idx as DecileLabel)
}

/// Assign size deciles to a column.
///
/// Non-finite entries get `None`; every other entry gets a label in
/// `1..=NUM_DECILES`.
pub fn assign_deciles(values: &[f64]) -> Vec<Option<DecileLabel>> {
    let edges = quantile_edges(values, NUM_DECILES);
    values.iter().map(|v| label_for(*v, &edges)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_even_spread_gives_ten_equal_groups() {
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        let labels = assign_deciles(&values);

        for (v, label) in values.iter().zip(&labels) {
            let expected = ((*v as usize - 1) / 10 + 1) as DecileLabel;
            assert_eq!(*label, Some(expected), "value {}", v);
        }
        let mut counts = [0usize; NUM_DECILES];
        for label in labels.iter().flatten() {
            counts[*label as usize - 1] += 1;
        }
        assert!(counts.iter().all(|c| *c == 10));
    }

    #[test]
    fn test_edges_interpolate() {
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        let edges = quantile_edges(&values, NUM_DECILES);

        assert_eq!(edges.len(), 11);
        assert_relative_eq!(edges[0], 1.0);
        assert_relative_eq!(edges[1], 10.9, epsilon = 1e-9);
        assert_relative_eq!(edges[10], 100.0);
    }

    #[test]
    fn test_duplicates_collapse_groups() {
        let values = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 3.0];
        let edges = quantile_edges(&values, NUM_DECILES);
        assert_eq!(edges.len(), 4);

        let labels = assign_deciles(&values);
        assert!(labels[..8].iter().all(|l| *l == Some(1)));
        assert_eq!(labels[8], Some(2));
        assert_eq!(labels[9], Some(3));
    }

    #[test]
    fn test_single_distinct_value_is_one_group() {
        let labels = assign_deciles(&[5.0, 5.0, 5.0]);
        assert_eq!(labels, vec![Some(1), Some(1), Some(1)]);

        assert_eq!(assign_deciles(&[42.0]), vec![Some(1)]);
        assert_eq!(assign_deciles(&[5.0; 4]), vec![Some(1); 4]);
    }

    #[test]
    fn test_non_finite_unlabelled() {
        let labels = assign_deciles(&[1.0, f64::NAN, 2.0]);
        assert_eq!(labels[1], None);
        assert!(labels[0].is_some());
        assert!(labels[2].is_some());

        assert!(assign_deciles(&[]).is_empty());
        assert_eq!(assign_deciles(&[f64::NAN]), vec![None]);
    }

    #[test]
    fn test_labels_independent_of_order() {
        let values: Vec<f64> = (0..57).map(|i| ((i * 37) % 23) as f64).collect();
        let mut reversed = values.clone();
        reversed.reverse();

        let forward = assign_deciles(&values);
        let backward = assign_deciles(&reversed);

        for (i, v) in values.iter().enumerate() {
            let j = values.len() - 1 - i;
            assert_eq!(reversed[j], *v);
            assert_eq!(forward[i], backward[j]);
        }
    }

    #[test]
    fn test_labels_monotone_in_value() {
        let values = vec![3.0, 100.0, 7.0, 7.0, 1.0, 50.0, 2.0, 9.0, 12.0, 30.0, 4.0, 8.0];
        let labels = assign_deciles(&values);
        for a in 0..values.len() {
            for b in 0..values.len() {
                if values[a] < values[b] {
                    assert!(labels[a] <= labels[b]);
                }
            }
        }
    }
}
