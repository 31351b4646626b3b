//! The command line interface for the program.
use crate::energyplus::{ForwardTranslator, ReverseTranslator};
use crate::idd::IddFileType;
use crate::idf::{IdfFile, StrictnessLevel};
use crate::log;
use crate::model::Model;
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result, bail, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod project;
use project::ProjectSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for OpenStudio models.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for commands which write a translated file
#[derive(Args)]
pub struct OutputOpts {
    /// Path of the file to write
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Whether to overwrite the output file if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Check an OpenStudio model (.osm) or EnergyPlus input file (.idf).
    Validate {
        /// The file to check.
        file: PathBuf,
        /// How strictly to check the file.
        #[arg(long, value_enum)]
        strictness: Option<StrictnessLevel>,
    },
    /// Translate an OpenStudio model into an EnergyPlus input file.
    Translate {
        /// The OpenStudio model.
        model: PathBuf,
        /// Output options
        #[command(flatten)]
        opts: OutputOpts,
    },
    /// Translate an EnergyPlus input file into an OpenStudio model.
    Reverse {
        /// The EnergyPlus input file.
        idf: PathBuf,
        /// Output options
        #[command(flatten)]
        opts: OutputOpts,
    },
    /// Manage example models.
    Example {
        /// The available subcommands for managing example models.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage project databases.
    Project {
        /// The available subcommands for managing project databases.
        #[command(subcommand)]
        subcommand: ProjectSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Validate { file, strictness } => handle_validate_command(&file, strictness, None),
            Self::Translate { model, opts } => handle_translate_command(&model, &opts, None),
            Self::Reverse { idf, opts } => handle_reverse_command(&idf, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Project { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ openstudio --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Initialise the program logger, unless an earlier command already has
fn init_logging(settings: &Settings, log_file_path: Option<&Path>) -> Result<()> {
    if log::is_logger_initialised() {
        return Ok(());
    }

    log::init(Some(&settings.log_level), log_file_path).context("Failed to initialise logging.")
}

/// The IDD a file uses, judged by its extension
fn idd_file_type_for(path: &Path) -> Result<IddFileType> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("osm") => Ok(IddFileType::OpenStudio),
        Some("idf") => Ok(IddFileType::EnergyPlus),
        _ => bail!(
            "Cannot tell the type of {}: expected a .osm or .idf extension",
            path.display()
        ),
    }
}

/// Handle the `validate` command.
pub fn handle_validate_command(
    path: &Path,
    strictness: Option<StrictnessLevel>,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    init_logging(&settings, None)?;

    let level = strictness.unwrap_or(settings.strictness);
    let report = match idd_file_type_for(path)? {
        IddFileType::OpenStudio => Model::load(path)
            .context("Failed to load model.")?
            .validity_report(level),
        IddFileType::EnergyPlus => IdfFile::load(path, IddFileType::EnergyPlus)
            .context("Failed to load EnergyPlus file.")?
            .validity_report(level),
    };

    println!("{report}");
    ensure!(report.is_valid(), "{} is not valid", path.display());
    info!("Validation successful!");

    Ok(())
}

/// Translate a loaded model and write the result
pub fn translate_and_save(model: &Model, output: &Path, overwrite: bool) -> Result<ForwardTranslator> {
    let mut translator = ForwardTranslator::new();
    let file = translator.translate_model(model)?;
    file.save(output, overwrite)?;
    info!(
        "Wrote {} ({} warning(s), {} error(s))",
        output.display(),
        translator.warnings().len(),
        translator.errors().len()
    );

    Ok(translator)
}

/// Handle the `translate` command.
pub fn handle_translate_command(
    model_path: &Path,
    opts: &OutputOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    init_logging(&settings, None)?;

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| model_path.with_extension("idf"));
    let model = Model::load(model_path).context("Failed to load model.")?;
    info!("Loaded model from {}", model_path.display());

    translate_and_save(&model, &output, opts.overwrite || settings.overwrite)?;

    Ok(())
}

/// Handle the `reverse` command.
pub fn handle_reverse_command(
    idf_path: &Path,
    opts: &OutputOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    init_logging(&settings, None)?;

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| idf_path.with_extension("osm"));
    let file = IdfFile::load(idf_path, IddFileType::EnergyPlus)
        .context("Failed to load EnergyPlus file.")?;

    let mut translator = ReverseTranslator::new();
    let model = translator.translate_idf(&file)?;
    if !translator.errors().is_empty() {
        warn!(
            "{} object(s) could not be translated completely",
            translator.errors().len()
        );
    }
    model.save(&output, opts.overwrite || settings.overwrite)?;
    info!("Wrote {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    #[rstest]
    #[case("model.osm", IddFileType::OpenStudio)]
    #[case("MODEL.OSM", IddFileType::OpenStudio)]
    #[case("dir/in.idf", IddFileType::EnergyPlus)]
    fn test_idd_file_type_for(#[case] path: &str, #[case] expected: IddFileType) {
        assert_eq!(idd_file_type_for(Path::new(path)).unwrap(), expected);
    }

    #[test]
    fn test_idd_file_type_for_unknown() {
        assert_error!(
            idd_file_type_for(Path::new("model.txt")),
            "Cannot tell the type of model.txt: expected a .osm or .idf extension"
        );
    }
}
