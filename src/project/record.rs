//! Columns and change tracking shared by every record type.
use crate::handle::Handle;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use derive_more::{Deref, DerefMut};
use duckdb::Row;
use duckdb::types::Value;
use uuid::Uuid;

/// A type stored as one row of a project database table
pub trait Record: Clone + PartialEq {
    /// The table the records are stored in
    const TABLE: &'static str;

    /// The columns specific to this record type, in the order of [`Record::bind_values`]
    const COLUMNS: &'static [&'static str];

    /// The columns shared by all records
    fn base(&self) -> &ObjectRecord;

    /// The columns shared by all records
    fn base_mut(&mut self) -> &mut ObjectRecord;

    /// Values for [`Record::COLUMNS`]
    fn bind_values(&self) -> Vec<Value>;

    /// Read a record from a row holding [`ObjectRecord::COLUMNS`] followed by
    /// [`Record::COLUMNS`]
    fn from_row(row: &Row<'_>) -> Result<Self>;
}

/// The columns every record has
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    /// Row ID, assigned when the record is first saved
    pub id: Option<i64>,
    /// A handle which identifies the record across databases
    pub handle: Handle,
    /// Name
    pub name: String,
    /// Name for display to users
    pub display_name: String,
    /// Free text description
    pub description: String,
    /// When the record was first saved
    pub timestamp_create: Option<DateTime<Utc>>,
    /// When the record was last saved
    pub timestamp_last: Option<DateTime<Utc>>,
    /// Changes every time the record is saved
    pub uuid_last: Option<Uuid>,
}

impl ObjectRecord {
    /// The shared columns
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "handle",
        "name",
        "display_name",
        "description",
        "timestamp_create",
        "timestamp_last",
        "uuid_last",
    ];

    /// Create a record which has not been saved yet
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            handle: Handle::new(),
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            timestamp_create: None,
            timestamp_last: None,
            uuid_last: None,
        }
    }

    /// Values for every shared column except `id`
    pub(super) fn bind_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.handle.to_string()),
            Value::Text(self.name.clone()),
            Value::Text(self.display_name.clone()),
            Value::Text(self.description.clone()),
            optional_text(self.timestamp_create.map(|time| time.to_rfc3339())),
            optional_text(self.timestamp_last.map(|time| time.to_rfc3339())),
            optional_text(self.uuid_last.map(|uuid| uuid.to_string())),
        ]
    }

    /// Read the shared columns from the start of a row
    pub(super) fn from_row(row: &Row<'_>) -> Result<Self> {
        let handle: String = row.get(1)?;
        let uuid_last: Option<String> = row.get(7)?;

        Ok(Self {
            id: Some(row.get(0)?),
            handle: handle.parse()?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            description: row.get(4)?,
            timestamp_create: parse_timestamp(row.get(5)?)?,
            timestamp_last: parse_timestamp(row.get(6)?)?,
            uuid_last: uuid_last
                .map(|uuid| Uuid::parse_str(&uuid))
                .transpose()
                .context("Invalid uuid_last")?,
        })
    }

    /// Update the timestamps and version UUID before saving
    pub(super) fn touch(&mut self) {
        let now = Utc::now();
        self.timestamp_create.get_or_insert(now);
        self.timestamp_last = Some(now);
        self.uuid_last = Some(Uuid::new_v4());
    }
}

fn parse_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|value| {
            DateTime::parse_from_rfc3339(&value)
                .map(|time| time.with_timezone(&Utc))
                .with_context(|| format!("Invalid timestamp: {value}"))
        })
        .transpose()
}

/// A text value, or `NULL`
pub(super) fn optional_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

/// A record together with the values it had when last loaded from or saved to the database.
///
/// Changes made through [`std::ops::DerefMut`] can be detected with [`Tracked::is_dirty`] and
/// undone with [`Tracked::revert_to_last_values`].
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct Tracked<R> {
    #[deref]
    #[deref_mut]
    current: R,
    last: Option<R>,
}

impl<R: Record> Tracked<R> {
    /// Track a record which is not in the database yet
    pub fn new(record: R) -> Self {
        Self {
            current: record,
            last: None,
        }
    }

    /// Track a record as just loaded from the database
    pub(super) fn loaded(record: R) -> Self {
        Self {
            last: Some(record.clone()),
            current: record,
        }
    }

    /// The record's row ID, if it has been saved
    pub fn id(&self) -> Option<i64> {
        self.current.base().id
    }

    /// Whether the record differs from the values last loaded or saved
    pub fn is_dirty(&self) -> bool {
        self.last.as_ref() != Some(&self.current)
    }

    /// Undo changes made since the record was last loaded or saved
    pub fn revert_to_last_values(&mut self) {
        if let Some(last) = &self.last {
            self.current.clone_from(last);
        }
    }

    /// Mark the current values as the saved ones
    pub fn set_last_values(&mut self) {
        self.last = Some(self.current.clone());
    }

    /// The current values
    pub fn into_inner(self) -> R {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::AnalysisRecord;

    #[test]
    fn test_new_record_is_dirty() {
        let record = Tracked::new(AnalysisRecord::new("Analysis", "seed.osm"));
        assert!(record.is_dirty());
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_revert() {
        let mut record = Tracked::new(AnalysisRecord::new("Analysis", "seed.osm"));
        record.set_last_values();
        assert!(!record.is_dirty());

        record.base_mut().description = "Changed".into();
        record.data_points_are_invalid = true;
        assert!(record.is_dirty());

        record.revert_to_last_values();
        assert!(!record.is_dirty());
        assert_eq!(record.base().description, "");
        assert!(!record.data_points_are_invalid);
    }

    #[test]
    fn test_touch() {
        let mut base = ObjectRecord::new("Record");
        base.touch();
        let created = base.timestamp_create;
        let uuid = base.uuid_last;
        assert!(created.is_some());
        assert!(uuid.is_some());

        base.touch();
        assert_eq!(base.timestamp_create, created);
        assert_ne!(base.uuid_last, uuid);
    }

    #[test]
    fn test_parse_timestamp() {
        let time = parse_timestamp(Some("2024-01-02T03:04:05+00:00".into()))
            .unwrap()
            .unwrap();
        assert_eq!(time.to_rfc3339(), "2024-01-02T03:04:05+00:00");
        assert!(parse_timestamp(None).unwrap().is_none());
        assert!(parse_timestamp(Some("yesterday".into())).is_err());
    }
}
