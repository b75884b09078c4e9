//! Tabulated metric reports.
//!
//! Two output artifacts for sweep consumers:
//! - [`IntegrityReport`] — out-of-order and duplicate ratios per scenario
//! - [`IntervalReport`] — inter-arrival quartiles per scenario
//!
//! Both render an aligned text table for the terminal and serialize to
//! pretty JSON for downstream tooling. Ratios are stored as fractions and
//! displayed as percentages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{IntervalStats, SequenceIntegrity};

// ── integrity table ───────────────────────────────────────────────────────

/// Integrity metrics for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityRow {
    /// Scenario label (e.g. `"dynamicHL_J3"` or `"baseline"`).
    pub scenario: String,
    pub metrics: SequenceIntegrity,
}

/// Integrity metrics across a set of scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub run_at: DateTime<Utc>,
    pub rows: Vec<IntegrityRow>,
}

impl IntegrityReport {
    pub fn new(rows: Vec<IntegrityRow>) -> Self {
        Self {
            run_at: Utc::now(),
            rows,
        }
    }

    /// Render as an aligned text table.
    pub fn render_table(&self) -> String {
        let label_width = column_width("Scenario", self.rows.iter().map(|r| r.scenario.as_str()));

        let mut out = format!(
            "{:<label_width$}  {:>8}  {:>8}  {:>8}\n",
            "Scenario", "Samples", "OoO (%)", "Dup (%)"
        );
        for row in &self.rows {
            out.push_str(&format!(
                "{:<label_width$}  {:>8}  {:>8.2}  {:>8.2}\n",
                row.scenario,
                row.metrics.sample_count,
                row.metrics.out_of_order_ratio * 100.0,
                row.metrics.duplicate_ratio * 100.0,
            ));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ── interval table ────────────────────────────────────────────────────────

/// Inter-arrival quartiles for one scenario, in microseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalRow {
    pub scenario: String,
    pub q1_us: f64,
    pub q3_us: f64,
    pub iqr_us: f64,
}

impl IntervalRow {
    /// Build a row from microsecond-scaled interval statistics.
    pub fn new(scenario: impl Into<String>, stats: &IntervalStats) -> Self {
        Self {
            scenario: scenario.into(),
            q1_us: stats.q1,
            q3_us: stats.q3,
            iqr_us: stats.iqr(),
        }
    }
}

/// Inter-arrival quartiles across a set of scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalReport {
    pub run_at: DateTime<Utc>,
    pub rows: Vec<IntervalRow>,
}

impl IntervalReport {
    pub fn new(rows: Vec<IntervalRow>) -> Self {
        Self {
            run_at: Utc::now(),
            rows,
        }
    }

    /// Render as an aligned text table.
    pub fn render_table(&self) -> String {
        let label_width = column_width("Scenario", self.rows.iter().map(|r| r.scenario.as_str()));

        let mut out = format!(
            "{:<label_width$}  {:>10}  {:>10}  {:>10}\n",
            "Scenario", "Q1 (µs)", "Q3 (µs)", "IQR (µs)"
        );
        for row in &self.rows {
            out.push_str(&format!(
                "{:<label_width$}  {:>10.2}  {:>10.2}  {:>10.2}\n",
                row.scenario, row.q1_us, row.q3_us, row.iqr_us,
            ));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn column_width<'a>(header: &str, labels: impl Iterator<Item = &'a str>) -> usize {
    labels
        .map(str::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}
