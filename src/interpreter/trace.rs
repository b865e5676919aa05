//! Execution trace.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One trace iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Trace iteration index, from 0.
    pub iter: usize,
    /// Scalar fitness of the current solution, `None` before construction.
    pub current_fitness: Option<f64>,
    /// Scalar fitness of the best solution so far.
    pub best_fitness: Option<f64>,
    /// Seconds since the run started.
    pub elapsed_s: f64,
    /// Whether the last local search of the iteration replaced the current
    /// solution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
    /// ΔE of the last Metropolis decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_e: Option<f64>,
    /// Temperature of the last Metropolis decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Failure message; only on the final record of a failed run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Receives every record as it is appended.
pub trait TraceListener {
    fn on_record(&mut self, record: &TraceRecord);
}

impl<F: FnMut(&TraceRecord)> TraceListener for F {
    fn on_record(&mut self, record: &TraceRecord) {
        self(record)
    }
}

/// Append-only list of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    records: Vec<TraceRecord>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.last()
    }

    /// Best fitness per record, for plotting convergence.
    pub fn best_curve(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.best_fitness).collect()
    }

    /// JSON array of records.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.records).unwrap_or_else(|_| "[]".into())
    }

    /// JSON array of records without `elapsed_s`, so two runs with the same
    /// seed compare byte-equal.
    pub fn canonical_json(&self) -> String {
        let records: Vec<Value> = self
            .records
            .iter()
            .filter_map(|r| serde_json::to_value(r).ok())
            .map(|mut v| {
                if let Value::Object(map) = &mut v {
                    map.remove("elapsed_s");
                }
                v
            })
            .collect();
        Value::Array(records).to_string()
    }
}
