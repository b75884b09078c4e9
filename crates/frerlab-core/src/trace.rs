//! Reading scavetool CSV vector exports.
//!
//! `opp_scavetool export` writes one row per recorded result. Rows whose
//! `type` column is `"vector"` carry a full time series in two
//! whitespace-separated columns: `vectime` (timestamps in seconds) and
//! `vecvalue` (samples aligned index-for-index with the timestamps).
//! Other row kinds (scalars, parameters, attributes) share the header but
//! leave those columns empty.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TraceError};

/// One named time series extracted from a vector trace file.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSeries {
    /// Vector name as recorded by the simulation (e.g. `"seqNum:vector"`).
    pub name: String,
    /// Sample timestamps in seconds, non-decreasing.
    pub times: Vec<f64>,
    /// Sampled values, same length as `times`.
    pub values: Vec<f64>,
}

impl VectorSeries {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The value series truncated to integers.
    ///
    /// Sequence-number vectors are recorded as floats by the export tool;
    /// this is the lossless way back for the metrics layer.
    pub fn values_as_sequence(&self) -> Vec<i64> {
        self.values.iter().map(|v| *v as i64).collect()
    }
}

/// Raw trace row. Only the columns this crate consumes are modeled; the
/// series columns are optional because non-vector rows omit them.
#[derive(Debug, Deserialize)]
struct TraceRow {
    #[serde(rename = "type")]
    row_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    vectime: Option<String>,
    #[serde(default)]
    vecvalue: Option<String>,
}

/// Read the first row of type `"vector"` named `vector_name` from
/// `trace_path` and decode both series.
///
/// Fails with [`TraceError::VectorNotFound`] when no row matches, and with
/// [`TraceError::MalformedVector`] when a matching row is missing a series
/// column, holds a non-numeric token, or the two series differ in length.
pub fn read_vector(trace_path: &Path, vector_name: &str) -> Result<VectorSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(trace_path)?;

    for row in reader.deserialize::<TraceRow>() {
        let row = row?;
        if row.row_type != "vector" || row.name != vector_name {
            continue;
        }

        let times = decode_series(row.vectime.as_deref(), "vectime", trace_path, vector_name)?;
        let values = decode_series(row.vecvalue.as_deref(), "vecvalue", trace_path, vector_name)?;

        if times.len() != values.len() {
            return Err(TraceError::MalformedVector {
                name: vector_name.to_string(),
                path: trace_path.to_path_buf(),
                reason: format!(
                    "vectime has {} samples but vecvalue has {}",
                    times.len(),
                    values.len()
                ),
            });
        }

        return Ok(VectorSeries {
            name: row.name,
            times,
            values,
        });
    }

    Err(TraceError::VectorNotFound {
        name: vector_name.to_string(),
        path: trace_path.to_path_buf(),
    })
}

/// Decode one whitespace-separated series column into numbers.
fn decode_series(
    raw: Option<&str>,
    column: &str,
    trace_path: &Path,
    vector_name: &str,
) -> Result<Vec<f64>> {
    let raw = raw.ok_or_else(|| TraceError::MalformedVector {
        name: vector_name.to_string(),
        path: trace_path.to_path_buf(),
        reason: format!("missing {column} column"),
    })?;

    raw.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| TraceError::MalformedVector {
                name: vector_name.to_string(),
                path: trace_path.to_path_buf(),
                reason: format!("non-numeric token {token:?} in {column}"),
            })
        })
        .collect()
}
