//! Bundled example models and the CLI commands for working with them.
use super::{OutputOpts, init_logging, load_settings, translate_and_save};
use crate::idd::IddFileType;
use crate::idf::IdfFile;
use crate::model::Model;
use crate::settings::Settings;
use anyhow::{Context, Result, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};

/// The directory containing the example models.
static DEMOS_DIR: Dir<'static> = include_dir!("demos");

/// File name of the model in each example directory
const MODEL_FILE_NAME: &str = "model.osm";

/// The available subcommands for managing example models.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Provide information about the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Extract an example model to a new directory.
    Extract {
        /// The name of the example to extract.
        name: String,
        /// The destination folder for the example.
        new_path: Option<PathBuf>,
    },
    /// Translate an example model into an EnergyPlus input file.
    Translate {
        /// The name of the example to translate.
        name: String,
        /// Output options
        #[command(flatten)]
        opts: OutputOpts,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Extract {
                name,
                new_path: dest,
            } => handle_example_extract_command(&name, dest.as_deref())?,
            Self::Translate { name, opts } => handle_example_translate_command(&name, &opts, None)?,
        }

        Ok(())
    }
}

/// Names of the bundled examples
pub fn example_names() -> impl Iterator<Item = &'static str> {
    DEMOS_DIR
        .dirs()
        .filter_map(|dir| dir.path().file_name()?.to_str())
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for name in example_names() {
        println!("{name}");
    }
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    let path: PathBuf = [name, "README.txt"].iter().collect();
    let readme = DEMOS_DIR
        .get_file(path)
        .context("Example not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")?;

    println!("{readme}");

    Ok(())
}

/// Handle the `example extract` command
fn handle_example_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_example(name, dest)
}

/// Extract the specified example to a new directory
pub fn extract_example(name: &str, new_path: &Path) -> Result<()> {
    let sub_dir = DEMOS_DIR.get_dir(name).context("Example not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    fs::create_dir(new_path)?;
    for entry in sub_dir.entries() {
        if let DirEntry::File(f) = entry
            && let Some(file_name) = f.path().file_name()
        {
            fs::write(new_path.join(file_name), f.contents())?;
        }
    }

    Ok(())
}

/// Parse the model bundled with an example
pub fn example_model(name: &str) -> Result<Model> {
    let path: PathBuf = [name, MODEL_FILE_NAME].iter().collect();
    let text = DEMOS_DIR
        .get_file(path)
        .context("Example not found.")?
        .contents_utf8()
        .with_context(|| format!("{MODEL_FILE_NAME} is not UTF-8 encoded"))?;
    let file = IdfFile::parse(text, IddFileType::OpenStudio)?;

    Model::from_idf_file(file).with_context(|| format!("Invalid model in example {name}"))
}

/// Handle the `example translate` command.
pub fn handle_example_translate_command(
    name: &str,
    opts: &OutputOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    init_logging(&settings, None)?;

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{name}.idf")));
    let model = example_model(name)?;
    translate_and_save(&model, &output, opts.overwrite || settings.overwrite)?;

    Ok(())
}
