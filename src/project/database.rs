//! The project database file.
use super::record::{ObjectRecord, Record, Tracked};
use super::{AnalysisRecord, AttributeRecord, DataPointRecord};
use anyhow::{Context, Result, bail, ensure};
use duckdb::types::Value;
use duckdb::{Connection, params, params_from_iter};
use itertools::Itertools;
use log::{debug, error, info};
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// The version of the table layout written by this crate
pub const SCHEMA_VERSION: &str = "1";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS project_database (key TEXT PRIMARY KEY, value TEXT NOT NULL);

CREATE SEQUENCE IF NOT EXISTS analysis_records_id START 1;
CREATE TABLE IF NOT EXISTS analysis_records (
    id BIGINT PRIMARY KEY DEFAULT nextval('analysis_records_id'),
    handle TEXT NOT NULL,
    name TEXT NOT NULL,
    display_name TEXT NOT NULL,
    description TEXT NOT NULL,
    timestamp_create TEXT,
    timestamp_last TEXT,
    uuid_last TEXT,
    seed_model_path TEXT NOT NULL,
    data_points_are_invalid BOOLEAN NOT NULL
);

CREATE SEQUENCE IF NOT EXISTS data_point_records_id START 1;
CREATE TABLE IF NOT EXISTS data_point_records (
    id BIGINT PRIMARY KEY DEFAULT nextval('data_point_records_id'),
    handle TEXT NOT NULL,
    name TEXT NOT NULL,
    display_name TEXT NOT NULL,
    description TEXT NOT NULL,
    timestamp_create TEXT,
    timestamp_last TEXT,
    uuid_last TEXT,
    analysis_record_id BIGINT NOT NULL,
    complete BOOLEAN NOT NULL,
    failed BOOLEAN NOT NULL,
    directory TEXT NOT NULL,
    osm_path TEXT,
    idf_path TEXT,
    top_level_job_uuid TEXT
);

CREATE SEQUENCE IF NOT EXISTS attribute_records_id START 1;
CREATE TABLE IF NOT EXISTS attribute_records (
    id BIGINT PRIMARY KEY DEFAULT nextval('attribute_records_id'),
    handle TEXT NOT NULL,
    name TEXT NOT NULL,
    display_name TEXT NOT NULL,
    description TEXT NOT NULL,
    timestamp_create TEXT,
    timestamp_last TEXT,
    uuid_last TEXT,
    data_point_record_id BIGINT NOT NULL,
    value_type TEXT NOT NULL,
    value TEXT NOT NULL,
    units TEXT
);
";

/// A project database holding analyses, their data points and the data points' attributes
pub struct ProjectDatabase {
    conn: Connection,
    path: Option<PathBuf>,
    /// Number of nested [`ProjectDatabase::transaction`] calls in progress
    depth: Cell<usize>,
}

/// Rolls back the open transaction when dropped, unless it was committed
struct TransactionGuard<'a> {
    database: &'a ProjectDatabase,
    committed: bool,
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if !self.committed
            && let Err(err) = self.database.conn.execute_batch("ROLLBACK")
        {
            error!("Could not roll back transaction: {err}");
        }
        self.database.depth.set(0);
    }
}

impl ProjectDatabase {
    /// Open a database file, creating it if it does not exist
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Could not open project database: {}", path.display()))?;
        let database = Self {
            conn,
            path: Some(path.to_path_buf()),
            depth: Cell::new(0),
        };
        database.initialise()?;
        info!("Opened project database {}", path.display());

        Ok(database)
    }

    /// Open a database which only exists in memory
    pub fn open_in_memory() -> Result<Self> {
        let database = Self {
            conn: Connection::open_in_memory()?,
            path: None,
            depth: Cell::new(0),
        };
        database.initialise()?;

        Ok(database)
    }

    /// The database file, unless it is in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create any missing tables and check the schema version
    fn initialise(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .context("Could not create project database tables")?;

        let version = self
            .conn
            .prepare("SELECT value FROM project_database WHERE key = 'schema_version'")?
            .query_map([], |row| row.get::<_, String>(0))?
            .next()
            .transpose()?;
        match version {
            Some(version) => ensure!(
                version == SCHEMA_VERSION,
                "Project database has schema version {version}, but only version \
                 {SCHEMA_VERSION} is supported"
            ),
            None => {
                self.conn.execute(
                    "INSERT INTO project_database (key, value) VALUES ('schema_version', ?)",
                    params![SCHEMA_VERSION],
                )?;
            }
        }

        Ok(())
    }

    /// Run `f` in a transaction, which is rolled back if `f` fails or panics.
    ///
    /// Calls made from within `f` join the outer transaction rather than starting a new one.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        if self.depth.get() > 0 {
            return f(self);
        }

        self.conn.execute_batch("BEGIN TRANSACTION")?;
        self.depth.set(1);
        let mut guard = TransactionGuard {
            database: self,
            committed: false,
        };
        let value = f(self)?;
        self.conn.execute_batch("COMMIT")?;
        guard.committed = true;

        Ok(value)
    }

    /// Save a record, inserting it if it has no ID yet and updating it otherwise. Returns the
    /// record's ID.
    ///
    /// The record is left untouched if saving fails.
    pub fn save<R: Record>(&self, record: &mut Tracked<R>) -> Result<i64> {
        let mut base = record.base().clone();
        base.touch();
        let mut values = base.bind_values();
        values.extend(record.bind_values());
        let columns = ObjectRecord::COLUMNS[1..]
            .iter()
            .chain(R::COLUMNS)
            .collect_vec();

        let id = match record.id() {
            None => {
                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
                    R::TABLE,
                    columns.iter().join(", "),
                    columns.iter().map(|_| "?").join(", ")
                );
                let id = self
                    .conn
                    .query_row(&sql, params_from_iter(&values), |row| row.get(0))
                    .with_context(|| format!("Could not insert into {}", R::TABLE))?;
                base.id = Some(id);
                id
            }
            Some(id) => {
                let sql = format!(
                    "UPDATE {} SET {} WHERE id = ?",
                    R::TABLE,
                    columns.iter().map(|column| format!("{column} = ?")).join(", ")
                );
                values.push(Value::BigInt(id));
                let updated = self
                    .conn
                    .execute(&sql, params_from_iter(&values))
                    .with_context(|| format!("Could not update {}", R::TABLE))?;
                ensure!(updated == 1, "There is no {} record with ID {id}", R::TABLE);
                id
            }
        };

        *record.base_mut() = base;
        record.set_last_values();
        debug!("Saved {} record {id}", R::TABLE);

        Ok(id)
    }

    /// Load records matching a `WHERE` clause
    fn load_where<R: Record>(&self, condition: &str, values: &[Value]) -> Result<Vec<Tracked<R>>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {condition} ORDER BY id",
            ObjectRecord::COLUMNS.iter().chain(R::COLUMNS).join(", "),
            R::TABLE
        );
        let mut statement = self.conn.prepare(&sql)?;
        let mut rows = statement.query(params_from_iter(values))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(Tracked::loaded(R::from_row(row)?));
        }

        Ok(records)
    }

    /// Load the record with the given ID
    pub fn load<R: Record>(&self, id: i64) -> Result<Option<Tracked<R>>> {
        Ok(self
            .load_where("id = ?", &[Value::BigInt(id)])?
            .into_iter()
            .next())
    }

    /// Load every record of a type, in ID order
    pub fn load_all<R: Record>(&self) -> Result<Vec<Tracked<R>>> {
        self.load_where("TRUE", &[])
    }

    /// The data points of an analysis
    pub fn data_points(&self, analysis_id: i64) -> Result<Vec<Tracked<DataPointRecord>>> {
        self.load_where("analysis_record_id = ?", &[Value::BigInt(analysis_id)])
    }

    /// The attributes of a data point
    pub fn attributes(&self, data_point_id: i64) -> Result<Vec<Tracked<AttributeRecord>>> {
        self.load_where("data_point_record_id = ?", &[Value::BigInt(data_point_id)])
    }

    /// Find an analysis by name
    pub fn find_analysis(&self, name: &str) -> Result<Option<Tracked<AnalysisRecord>>> {
        Ok(self
            .load_where("name = ?", &[Value::Text(name.to_string())])?
            .into_iter()
            .next())
    }

    /// Remove a record. Removing an analysis also removes its data points, and removing a data
    /// point also removes its attributes.
    pub fn remove<R: Record>(&self, id: i64) -> Result<()> {
        self.transaction(|db| db.remove_cascade(R::TABLE, id))
    }

    fn remove_cascade(&self, table: &str, id: i64) -> Result<()> {
        match table {
            AnalysisRecord::TABLE => {
                for data_point in self.data_points(id)? {
                    let data_point_id = data_point.id().context("Loaded record has no ID")?;
                    self.remove_cascade(DataPointRecord::TABLE, data_point_id)?;
                }
            }
            DataPointRecord::TABLE => {
                self.conn.execute(
                    "DELETE FROM attribute_records WHERE data_point_record_id = ?",
                    params![id],
                )?;
            }
            AttributeRecord::TABLE => {}
            _ => bail!("Unknown record table: {table}"),
        }

        let removed = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?"), params![id])?;
        ensure!(removed == 1, "There is no {table} record with ID {id}");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use crate::project::{Attribute, AttributeValue};
    use rstest::{fixture, rstest};
    use std::panic::{self, AssertUnwindSafe};
    use tempfile::tempdir;

    #[fixture]
    fn database() -> ProjectDatabase {
        ProjectDatabase::open_in_memory().unwrap()
    }

    fn add_analysis(database: &ProjectDatabase, name: &str) -> i64 {
        let mut analysis = Tracked::new(AnalysisRecord::new(name, "seed.osm"));
        database.save(&mut analysis).unwrap()
    }

    fn add_data_point(database: &ProjectDatabase, analysis_id: i64) -> i64 {
        let mut data_point = Tracked::new(DataPointRecord::new("Point", analysis_id, "run/1"));
        let id = database.save(&mut data_point).unwrap();
        let attribute = Attribute::new("North axis", AttributeValue::Double(30.0), Some("deg"));
        let mut attribute = Tracked::new(AttributeRecord::new(id, attribute));
        database.save(&mut attribute).unwrap();
        id
    }

    #[rstest]
    fn test_save_and_load(database: ProjectDatabase) {
        let mut analysis = Tracked::new(AnalysisRecord::new("Baseline", "seed.osm"));
        let id = database.save(&mut analysis).unwrap();
        assert_eq!(analysis.id(), Some(id));
        assert!(!analysis.is_dirty());

        let loaded = database.load::<AnalysisRecord>(id).unwrap().unwrap();
        assert_eq!(*loaded, *analysis);
        assert!(!loaded.is_dirty());
        assert!(database.load::<AnalysisRecord>(id + 1).unwrap().is_none());
    }

    #[rstest]
    fn test_update_changes_version(database: ProjectDatabase) {
        let mut analysis = Tracked::new(AnalysisRecord::new("Baseline", "seed.osm"));
        let id = database.save(&mut analysis).unwrap();
        let first_version = analysis.base().uuid_last;
        let created = analysis.base().timestamp_create;

        analysis.data_points_are_invalid = true;
        assert!(analysis.is_dirty());
        assert_eq!(database.save(&mut analysis).unwrap(), id);

        let loaded = database.load::<AnalysisRecord>(id).unwrap().unwrap();
        assert!(loaded.data_points_are_invalid);
        assert_ne!(loaded.base().uuid_last, first_version);
        assert_eq!(loaded.base().timestamp_create, created);
        assert_eq!(database.load_all::<AnalysisRecord>().unwrap().len(), 1);
    }

    #[rstest]
    fn test_find_analysis(database: ProjectDatabase) {
        add_analysis(&database, "First");
        let id = add_analysis(&database, "Second");
        let found = database.find_analysis("Second").unwrap().unwrap();
        assert_eq!(found.id(), Some(id));
        assert!(database.find_analysis("Third").unwrap().is_none());
    }

    #[rstest]
    fn test_remove_cascades(database: ProjectDatabase) {
        let analysis = add_analysis(&database, "Analysis");
        let first = add_data_point(&database, analysis);
        let second = add_data_point(&database, analysis);
        let other = add_data_point(&database, add_analysis(&database, "Other"));

        database.remove::<DataPointRecord>(first).unwrap();
        assert!(database.attributes(first).unwrap().is_empty());
        assert_eq!(database.data_points(analysis).unwrap().len(), 1);

        database.remove::<AnalysisRecord>(analysis).unwrap();
        assert!(database.load::<DataPointRecord>(second).unwrap().is_none());
        assert!(database.attributes(second).unwrap().is_empty());
        assert_eq!(database.attributes(other).unwrap().len(), 1);
        assert_eq!(database.load_all::<AttributeRecord>().unwrap().len(), 1);
    }

    #[rstest]
    fn test_remove_missing(database: ProjectDatabase) {
        assert_error!(
            database.remove::<AnalysisRecord>(42),
            "There is no analysis_records record with ID 42"
        );
    }

    #[rstest]
    fn test_transaction_rollback(database: ProjectDatabase) {
        let result: Result<()> = database.transaction(|db| {
            add_analysis(db, "Doomed");
            bail!("Something went wrong")
        });
        assert!(result.is_err());
        assert!(database.find_analysis("Doomed").unwrap().is_none());
    }

    #[rstest]
    fn test_remove_within_transaction(database: ProjectDatabase) {
        let analysis = add_analysis(&database, "Analysis");
        add_data_point(&database, analysis);
        let kept = add_analysis(&database, "Kept");

        database
            .transaction(|db| {
                db.remove::<AnalysisRecord>(analysis)?;
                db.remove::<AnalysisRecord>(kept + 1)
            })
            .unwrap_err();
        assert_eq!(database.load_all::<AnalysisRecord>().unwrap().len(), 2);

        database
            .transaction(|db| db.remove::<AnalysisRecord>(analysis))
            .unwrap();
        assert!(database.load::<AnalysisRecord>(analysis).unwrap().is_none());
        assert!(database.load_all::<DataPointRecord>().unwrap().is_empty());
    }

    #[rstest]
    fn test_transaction_rolled_back_on_panic(database: ProjectDatabase) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            database.transaction(|db| -> Result<()> {
                add_analysis(db, "Doomed");
                panic!("Something went very wrong")
            })
        }));
        assert!(result.is_err());
        assert!(database.find_analysis("Doomed").unwrap().is_none());

        // A new transaction can be started afterwards
        database
            .transaction(|db| Ok(add_analysis(db, "Survivor")))
            .unwrap();
        assert!(database.find_analysis("Survivor").unwrap().is_some());
    }

    #[rstest]
    fn test_failed_save_leaves_record_unchanged(database: ProjectDatabase) {
        let mut analysis = Tracked::new(AnalysisRecord::new("Baseline", "seed.osm"));
        let id = database.save(&mut analysis).unwrap();
        database.remove::<AnalysisRecord>(id).unwrap();

        analysis.data_points_are_invalid = true;
        let before = analysis.clone();
        assert_error!(
            database.save(&mut analysis),
            format!("There is no analysis_records record with ID {id}")
        );
        assert_eq!(analysis, before);
        assert!(analysis.is_dirty());
    }

    #[rstest]
    fn test_attribute_values(database: ProjectDatabase) {
        let data_point = add_data_point(&database, add_analysis(&database, "Analysis"));
        let attributes = database.attributes(data_point).unwrap();
        assert_eq!(
            attributes[0].attribute(),
            Attribute::new("North axis", AttributeValue::Double(30.0), Some("deg"))
        );
    }

    #[test]
    fn test_reopen_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.db");
        let id = {
            let database = ProjectDatabase::open(&path).unwrap();
            add_analysis(&database, "Persistent")
        };

        let database = ProjectDatabase::open(&path).unwrap();
        assert_eq!(database.path(), Some(path.as_path()));
        let analysis = database.load::<AnalysisRecord>(id).unwrap().unwrap();
        assert_eq!(analysis.base().name, "Persistent");
    }
}
