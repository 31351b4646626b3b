//! Analyses: a seed model and the data points run from it.
use super::record::{ObjectRecord, Record};
use anyhow::Result;
use duckdb::Row;
use duckdb::types::Value;

/// A set of data points generated from one seed model
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    base: ObjectRecord,
    /// Path of the seed model
    pub seed_model_path: String,
    /// Set when the seed model has changed since the data points were run
    pub data_points_are_invalid: bool,
}

impl AnalysisRecord {
    /// Create an unsaved analysis
    pub fn new(name: &str, seed_model_path: &str) -> Self {
        Self {
            base: ObjectRecord::new(name),
            seed_model_path: seed_model_path.to_string(),
            data_points_are_invalid: false,
        }
    }
}

impl Record for AnalysisRecord {
    const TABLE: &'static str = "analysis_records";
    const COLUMNS: &'static [&'static str] = &["seed_model_path", "data_points_are_invalid"];

    fn base(&self) -> &ObjectRecord {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectRecord {
        &mut self.base
    }

    fn bind_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.seed_model_path.clone()),
            Value::Boolean(self.data_points_are_invalid),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let offset = ObjectRecord::COLUMNS.len();
        Ok(Self {
            base: ObjectRecord::from_row(row)?,
            seed_model_path: row.get(offset)?,
            data_points_are_invalid: row.get(offset + 1)?,
        })
    }
}
