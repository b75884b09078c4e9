//! Sequence-integrity and inter-arrival metrics.
//!
//! Metric definitions are fixed: the out-of-order ratio counts every
//! adjacent transition whose delta is not exactly +1, so reordering
//! (negative deltas) and loss (positive skips) both register. The
//! duplicate ratio counts repeats anywhere in the series, not only
//! adjacent ones.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// Integrity of a received sequence-number series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequenceIntegrity {
    /// Fraction of adjacent transitions deviating from the +1 step, in [0,1].
    pub out_of_order_ratio: f64,
    /// Fraction of samples repeating a value seen elsewhere, in [0,1].
    pub duplicate_ratio: f64,
    /// Number of samples the ratios were computed over.
    pub sample_count: usize,
}

/// Compute out-of-order and duplicate ratios for a sequence-number series.
///
/// A series of fewer than two samples has no transitions, so the
/// out-of-order ratio is undefined; this is reported as
/// [`TraceError::InsufficientData`] rather than coerced to 0 or NaN.
pub fn compute_integrity(seq: &[i64]) -> Result<SequenceIntegrity> {
    if seq.len() < 2 {
        return Err(TraceError::InsufficientData { len: seq.len() });
    }

    let transitions = seq.len() - 1;
    let deviations = seq.windows(2).filter(|w| w[1] - w[0] != 1).count();
    let distinct = seq.iter().collect::<HashSet<_>>().len();

    Ok(SequenceIntegrity {
        out_of_order_ratio: deviations as f64 / transitions as f64,
        duplicate_ratio: (seq.len() - distinct) as f64 / seq.len() as f64,
        sample_count: seq.len(),
    })
}

/// Adjacent differences of `times`, each scaled by `unit_scale`.
///
/// `unit_scale` converts the timestamp unit: 1e3 for seconds to
/// milliseconds, 1e6 for seconds to microseconds. The result has one
/// fewer element than the input.
pub fn compute_intervals(times: &[f64], unit_scale: f64) -> Vec<f64> {
    times.windows(2).map(|w| (w[1] - w[0]) * unit_scale).collect()
}

/// Inter-arrival interval distribution with its quartiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalStats {
    /// Scaled adjacent intervals, in source order.
    pub intervals: Vec<f64>,
    /// First quartile (25th percentile, linear interpolation).
    pub q1: f64,
    /// Third quartile (75th percentile, linear interpolation).
    pub q3: f64,
}

impl IntervalStats {
    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Derive interval statistics from an arrival-time series.
///
/// Fewer than two timestamps yield no intervals, reported as
/// [`TraceError::InsufficientData`].
pub fn interval_stats(times: &[f64], unit_scale: f64) -> Result<IntervalStats> {
    if times.len() < 2 {
        return Err(TraceError::InsufficientData { len: times.len() });
    }

    let intervals = compute_intervals(times, unit_scale);
    let mut sorted = intervals.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(IntervalStats {
        q1: percentile(&sorted, 25.0),
        q3: percentile(&sorted, 75.0),
        intervals,
    })
}

/// Linear-interpolation percentile over an ascending, non-empty slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_clean_sequence() {
        let metrics = compute_integrity(&[1, 2, 3, 4, 5]).expect("compute");
        assert_eq!(metrics.out_of_order_ratio, 0.0);
        assert_eq!(metrics.duplicate_ratio, 0.0);
        assert_eq!(metrics.sample_count, 5);
    }

    #[test]
    fn test_integrity_duplicate_and_skip() {
        // diffs are [1, 0, 2, 1]: two transitions deviate from +1
        let metrics = compute_integrity(&[1, 2, 2, 4, 5]).expect("compute");
        assert_eq!(metrics.out_of_order_ratio, 0.5);
        assert_eq!(metrics.duplicate_ratio, 0.2);
        assert_eq!(metrics.sample_count, 5);
    }

    #[test]
    fn test_integrity_negative_delta_counts() {
        // reordered delivery: 2 arrives again after 3; diffs are [1, 1, -1, 1]
        let metrics = compute_integrity(&[1, 2, 3, 2, 3]).expect("compute");
        assert_eq!(metrics.out_of_order_ratio, 0.25);
        assert_eq!(metrics.duplicate_ratio, 0.4);
    }

    #[test]
    fn test_integrity_short_sequence_rejected() {
        for seq in [&[][..], &[42][..]] {
            match compute_integrity(seq) {
                Err(TraceError::InsufficientData { len }) => assert_eq!(len, seq.len()),
                other => panic!("expected InsufficientData, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_compute_intervals_scaled() {
        assert_eq!(
            compute_intervals(&[0.0, 0.01, 0.02], 1000.0),
            vec![10.0, 10.0]
        );
        assert!(compute_intervals(&[0.5], 1000.0).is_empty());
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        // numpy convention: Q1 of [1,2,3,4] is 1.75
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 25.0), 1.75);
        assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 75.0), 3.25);
        assert_eq!(percentile(&[5.0], 25.0), 5.0);
    }

    #[test]
    fn test_interval_stats_quartiles() {
        let stats = interval_stats(&[0.0, 0.001, 0.003, 0.006, 0.010], 1e6).expect("stats");
        // intervals in microseconds: [1000, 2000, 3000, 4000]
        assert_eq!(stats.intervals, vec![1000.0, 2000.0, 3000.0, 4000.0]);
        assert_eq!(stats.q1, 1750.0);
        assert_eq!(stats.q3, 3250.0);
        assert_eq!(stats.iqr(), 1500.0);
    }

    #[test]
    fn test_interval_stats_short_series_rejected() {
        match interval_stats(&[0.0], 1e3) {
            Err(TraceError::InsufficientData { len: 1 }) => {}
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }
}
