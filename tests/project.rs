//! Integration tests for the `project` commands.
use openstudio_model::cli::project::{
    attribute_rows, handle_project_export_command, handle_project_init_command,
    handle_project_record_command,
};
use openstudio_model::project::{AnalysisRecord, DataPointRecord, ProjectDatabase};
use openstudio_model::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Recording two models in one analysis and exporting their attributes
#[test]
fn test_project_record_and_export() {
    unsafe { std::env::set_var("OPENSTUDIO_LOG_LEVEL", "off") };

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("project.db");
    handle_project_init_command(&db_path, Some(Settings::default())).unwrap();

    for name in ["fuel_cell", "metered_office"] {
        let model_dir = dir.path().join(name);
        fs::create_dir(&model_dir).unwrap();
        let model_path = model_dir.join(format!("{name}.osm"));
        let demo: PathBuf = ["demos", name, "model.osm"].iter().collect();
        fs::copy(demo, &model_path).unwrap();

        handle_project_record_command(
            &db_path,
            &model_path,
            "Baseline",
            None,
            Some(Settings::default()),
        )
        .unwrap();

        let data_point_dir = dir.path().join("Baseline").join(name);
        assert!(data_point_dir.join(format!("{name}.idf")).is_file());
    }

    {
        let db = ProjectDatabase::open(&db_path).unwrap();
        let analyses = db.load_all::<AnalysisRecord>().unwrap();
        assert_eq!(analyses.len(), 1);
        let data_points = db.data_points(analyses[0].id().unwrap()).unwrap();
        assert_eq!(data_points.len(), 2);
        assert!(data_points.iter().all(|data_point| data_point.complete));
        assert!(data_points.iter().all(|data_point| !data_point.failed));
        assert_eq!(db.load_all::<DataPointRecord>().unwrap().len(), 2);

        let rows = attribute_rows(&db).unwrap();
        assert!(rows.iter().any(|row| row.data_point == "metered_office"
            && row.attribute == "Building name"
            && row.value == "Small Office"));
    }

    let csv_path = dir.path().join("attributes.csv");
    handle_project_export_command(&db_path, Some(&csv_path), Some(Settings::default())).unwrap();
    let csv = fs::read_to_string(csv_path).unwrap();
    assert!(csv.starts_with("analysis,data_point,attribute,value_type,value,units\n"));
    assert!(csv.contains("Baseline,fuel_cell,Building name,string,Fuel Cell Plant Building,"));
}
