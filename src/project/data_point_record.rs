//! Data points: one simulated variant of an analysis's seed model.
use super::record::{ObjectRecord, Record, optional_text};
use anyhow::{Context, Result};
use duckdb::Row;
use duckdb::types::Value;
use uuid::Uuid;

/// One model run as part of an analysis
#[derive(Debug, Clone, PartialEq)]
pub struct DataPointRecord {
    base: ObjectRecord,
    /// The analysis the data point belongs to
    pub analysis_record_id: i64,
    /// Whether the data point has been run
    pub complete: bool,
    /// Whether running the data point failed
    pub failed: bool,
    /// Directory holding the data point's files
    pub directory: String,
    /// Path of the OpenStudio model
    pub osm_path: Option<String>,
    /// Path of the translated EnergyPlus input file
    pub idf_path: Option<String>,
    /// The job which ran the data point
    pub top_level_job_uuid: Option<Uuid>,
}

impl DataPointRecord {
    /// Create an unsaved data point of an analysis
    pub fn new(name: &str, analysis_record_id: i64, directory: &str) -> Self {
        Self {
            base: ObjectRecord::new(name),
            analysis_record_id,
            complete: false,
            failed: false,
            directory: directory.to_string(),
            osm_path: None,
            idf_path: None,
            top_level_job_uuid: None,
        }
    }
}

impl Record for DataPointRecord {
    const TABLE: &'static str = "data_point_records";
    const COLUMNS: &'static [&'static str] = &[
        "analysis_record_id",
        "complete",
        "failed",
        "directory",
        "osm_path",
        "idf_path",
        "top_level_job_uuid",
    ];

    fn base(&self) -> &ObjectRecord {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectRecord {
        &mut self.base
    }

    fn bind_values(&self) -> Vec<Value> {
        vec![
            Value::BigInt(self.analysis_record_id),
            Value::Boolean(self.complete),
            Value::Boolean(self.failed),
            Value::Text(self.directory.clone()),
            optional_text(self.osm_path.clone()),
            optional_text(self.idf_path.clone()),
            optional_text(self.top_level_job_uuid.map(|uuid| uuid.to_string())),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let offset = ObjectRecord::COLUMNS.len();
        let job: Option<String> = row.get(offset + 6)?;

        Ok(Self {
            base: ObjectRecord::from_row(row)?,
            analysis_record_id: row.get(offset)?,
            complete: row.get(offset + 1)?,
            failed: row.get(offset + 2)?,
            directory: row.get(offset + 3)?,
            osm_path: row.get(offset + 4)?,
            idf_path: row.get(offset + 5)?,
            top_level_job_uuid: job
                .map(|uuid| Uuid::parse_str(&uuid))
                .transpose()
                .context("Invalid top_level_job_uuid")?,
        })
    }
}
