//! Integration tests for the `translate` command.
use openstudio_model::cli::{OutputOpts, handle_translate_command};
use openstudio_model::idd::IddFileType;
use openstudio_model::idf::{IdfFile, StrictnessLevel};
use openstudio_model::settings::Settings;
use std::path::PathBuf;
use tempfile::tempdir;

/// An integration test for the `translate` command.
#[test]
fn test_handle_translate_command() {
    unsafe { std::env::set_var("OPENSTUDIO_LOG_LEVEL", "off") };

    let dir = tempdir().unwrap();
    let output = dir.path().join("in.idf");
    let opts = OutputOpts {
        output: Some(output.clone()),
        overwrite: false,
    };
    let model_path: PathBuf = ["demos", "fuel_cell", "model.osm"].iter().collect();
    handle_translate_command(&model_path, &opts, Some(Settings::default())).unwrap();

    let file = IdfFile::load(&output, IddFileType::EnergyPlus).unwrap();
    assert!(file.validity_report(StrictnessLevel::Draft).is_valid());
    let types = file
        .objects()
        .iter()
        .map(|object| object.object_type().to_string())
        .collect::<Vec<_>>();
    assert_eq!(types[0], "Version");
    for expected in [
        "SimulationControl",
        "Building",
        "Curve:Quadratic",
        "Curve:Cubic",
        "Generator:FuelCell:Inverter",
        "Generator:FuelCell:AirSupply",
    ] {
        assert!(types.iter().any(|t| t == expected), "{expected} missing");
    }

    // The output is not overwritten without the option
    assert!(handle_translate_command(&model_path, &opts, Some(Settings::default())).is_err());
}
