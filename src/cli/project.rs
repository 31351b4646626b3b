//! CLI commands for project databases.
use super::{init_logging, load_settings, translate_and_save};
use crate::model::Model;
use crate::project::{
    AnalysisRecord, AttributeRecord, DataPointRecord, ProjectDatabase, Record, Tracked,
    attributes_from_model,
};
use crate::settings::Settings;
use anyhow::{Context, Result};
use clap::Subcommand;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Subcommands for project databases
#[derive(Subcommand)]
pub enum ProjectSubcommands {
    /// Create a new, empty project database
    Init {
        /// Path of the database file
        database: PathBuf,
    },
    /// List the analyses and data points in a project database
    List {
        /// Path of the database file
        database: PathBuf,
    },
    /// Translate a model and record it as a data point of an analysis
    Record {
        /// Path of the database file
        database: PathBuf,
        /// The OpenStudio model to record
        model: PathBuf,
        /// Name of the analysis, which is created if it does not exist
        #[arg(short, long)]
        analysis: String,
        /// Directory for the data point's files
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write every data point attribute as CSV
    Export {
        /// Path of the database file
        database: PathBuf,
        /// CSV file to write to, instead of the console
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl ProjectSubcommands {
    /// Execute the supplied project subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Init { database } => handle_project_init_command(&database, None),
            Self::List { database } => handle_project_list_command(&database, None),
            Self::Record {
                database,
                model,
                analysis,
                output_dir,
            } => handle_project_record_command(
                &database,
                &model,
                &analysis,
                output_dir.as_deref(),
                None,
            )
            .map(|_| ()),
            Self::Export { database, output } => {
                handle_project_export_command(&database, output.as_deref(), None)
            }
        }
    }
}

/// One row of the attribute export
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeRow {
    /// Name of the analysis
    pub analysis: String,
    /// Name of the data point
    pub data_point: String,
    /// Name of the attribute
    pub attribute: String,
    /// The attribute's value type
    pub value_type: String,
    /// The attribute's value
    pub value: String,
    /// The attribute's units, if any
    pub units: Option<String>,
}

/// Handle the `project init` command.
pub fn handle_project_init_command(database: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;
    init_logging(&settings, None)?;

    ProjectDatabase::open(database)?;
    info!("Project database ready at {}", database.display());

    Ok(())
}

/// Handle the `project list` command.
pub fn handle_project_list_command(database: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;
    init_logging(&settings, None)?;

    let db = ProjectDatabase::open(database)?;
    for analysis in db.load_all::<AnalysisRecord>()? {
        let id = analysis.id().context("Loaded record has no ID")?;
        println!("{} (seed model: {})", analysis.base().name, analysis.seed_model_path);
        for data_point in db.data_points(id)? {
            let status = match (data_point.complete, data_point.failed) {
                (_, true) => "failed",
                (true, false) => "complete",
                (false, false) => "pending",
            };
            println!("  {}: {status}", data_point.base().name);
        }
    }

    Ok(())
}

/// Find an analysis by name, creating it if there is none
fn find_or_create_analysis(
    db: &ProjectDatabase,
    name: &str,
    seed_model: &Path,
) -> Result<Tracked<AnalysisRecord>> {
    if let Some(analysis) = db.find_analysis(name)? {
        return Ok(analysis);
    }

    let mut analysis = Tracked::new(AnalysisRecord::new(
        name,
        &seed_model.display().to_string(),
    ));
    db.save(&mut analysis)?;
    info!("Created analysis {name}");

    Ok(analysis)
}

/// Handle the `project record` command. Returns the ID of the new data point.
pub fn handle_project_record_command(
    database: &Path,
    model_path: &Path,
    analysis_name: &str,
    output_dir: Option<&Path>,
    settings: Option<Settings>,
) -> Result<i64> {
    let settings = load_settings(settings)?;
    let stem = model_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .context("Model path has no file name")?;
    let data_point_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => database
            .parent()
            .unwrap_or(Path::new(""))
            .join(analysis_name)
            .join(stem),
    };
    fs::create_dir_all(&data_point_dir).with_context(|| {
        format!("Failed to create directory: {}", data_point_dir.display())
    })?;
    init_logging(&settings, Some(&data_point_dir))?;

    let model = Model::load(model_path).context("Failed to load model.")?;
    let idf_path = data_point_dir.join(stem).with_extension("idf");
    let translator = translate_and_save(&model, &idf_path, true)?;

    let db = ProjectDatabase::open(database)?;
    db.transaction(|db| {
        let analysis = find_or_create_analysis(db, analysis_name, model_path)?;
        let analysis_id = analysis.id().context("Saved record has no ID")?;

        let mut data_point = Tracked::new(DataPointRecord::new(
            stem,
            analysis_id,
            &data_point_dir.display().to_string(),
        ));
        data_point.complete = true;
        data_point.failed = !translator.errors().is_empty();
        data_point.osm_path = Some(model_path.display().to_string());
        data_point.idf_path = Some(idf_path.display().to_string());
        let data_point_id = db.save(&mut data_point)?;

        for attribute in attributes_from_model(&model) {
            db.save(&mut Tracked::new(AttributeRecord::new(
                data_point_id,
                attribute,
            )))?;
        }
        info!("Recorded data point {stem} of analysis {analysis_name}");

        Ok(data_point_id)
    })
}

/// Collect the attributes of every data point, by analysis
pub fn attribute_rows(db: &ProjectDatabase) -> Result<Vec<AttributeRow>> {
    let mut rows = Vec::new();
    for analysis in db.load_all::<AnalysisRecord>()? {
        let analysis_id = analysis.id().context("Loaded record has no ID")?;
        for data_point in db.data_points(analysis_id)? {
            let data_point_id = data_point.id().context("Loaded record has no ID")?;
            for attribute in db.attributes(data_point_id)? {
                rows.push(AttributeRow {
                    analysis: analysis.base().name.clone(),
                    data_point: data_point.base().name.clone(),
                    attribute: attribute.base().name.clone(),
                    value_type: attribute.value.type_tag().to_string(),
                    value: attribute.value.to_string(),
                    units: attribute.units.clone(),
                });
            }
        }
    }

    Ok(rows)
}

fn write_rows<W: io::Write>(rows: &[AttributeRow], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Handle the `project export` command.
pub fn handle_project_export_command(
    database: &Path,
    output: Option<&Path>,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    init_logging(&settings, None)?;

    let db = ProjectDatabase::open(database)?;
    let rows = attribute_rows(&db)?;
    match output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Could not create file: {}", path.display()))?;
            write_rows(&rows, file)?;
            info!("Wrote {} attribute(s) to {}", rows.len(), path.display());
        }
        None => write_rows(&rows, io::stdout().lock())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Attribute, AttributeValue};
    use rstest::{fixture, rstest};

    #[fixture]
    fn database() -> ProjectDatabase {
        ProjectDatabase::open_in_memory().unwrap()
    }

    #[rstest]
    fn test_find_or_create_analysis(database: ProjectDatabase) {
        let created = find_or_create_analysis(&database, "Baseline", Path::new("seed.osm")).unwrap();
        let found = find_or_create_analysis(&database, "Baseline", Path::new("other.osm")).unwrap();
        assert_eq!(created.id(), found.id());
        assert_eq!(found.seed_model_path, "seed.osm");
        assert_eq!(database.load_all::<AnalysisRecord>().unwrap().len(), 1);
    }

    #[rstest]
    fn test_attribute_rows(database: ProjectDatabase) {
        let analysis = find_or_create_analysis(&database, "Baseline", Path::new("seed.osm")).unwrap();
        let mut data_point = Tracked::new(DataPointRecord::new("run1", analysis.id().unwrap(), "run1"));
        let data_point_id = database.save(&mut data_point).unwrap();
        let attribute = Attribute::new("Floor area", AttributeValue::Double(120.5), Some("m2"));
        database
            .save(&mut Tracked::new(AttributeRecord::new(data_point_id, attribute)))
            .unwrap();

        let rows = attribute_rows(&database).unwrap();
        assert_eq!(
            rows,
            [AttributeRow {
                analysis: "Baseline".to_string(),
                data_point: "run1".to_string(),
                attribute: "Floor area".to_string(),
                value_type: "double".to_string(),
                value: "120.5".to_string(),
                units: Some("m2".to_string()),
            }]
        );

        let mut out = Vec::new();
        write_rows(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "analysis,data_point,attribute,value_type,value,units\n\
             Baseline,run1,Floor area,double,120.5,m2\n"
        );
    }
}
