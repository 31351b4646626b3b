//! Translation between OpenStudio models and EnergyPlus input files.
use crate::idd::{IddFactory, IddObject};
use crate::idf::IdfObject;
use anyhow::{Context, Result};
use std::fmt;

mod forward_translator;
pub use forward_translator::ForwardTranslator;
mod reverse_translator;
pub use reverse_translator::ReverseTranslator;

/// Tolerance allowed when checking that molar fractions sum to 1
pub const MOLAR_FRACTION_TOLERANCE: f64 = 1e-6;

/// A problem found while translating one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorMessage {
    /// The IDD type of the object being translated
    pub object_type: String,
    /// The object's name, if it has one
    pub object_name: Option<String>,
    /// What went wrong
    pub message: String,
}

impl TranslatorMessage {
    fn new(object: &IdfObject, message: String) -> Self {
        Self {
            object_type: object.object_type().to_string(),
            object_name: object.name().map(str::to_string),
            message,
        }
    }
}

impl fmt::Display for TranslatorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object_name {
            Some(name) => write!(f, "{} '{name}': {}", self.object_type, self.message),
            None => write!(f, "{}: {}", self.object_type, self.message),
        }
    }
}

/// Look up an object type in the EnergyPlus IDD
fn energyplus_idd_object(name: &str) -> Result<&'static IddObject> {
    IddFactory::energyplus()
        .object(name)
        .with_context(|| format!("{name} is missing from the EnergyPlus IDD"))
}

/// The EnergyPlus version identifier (major.minor) of the embedded IDD
pub fn energyplus_version() -> String {
    IddFactory::energyplus()
        .version()
        .split('.')
        .take(2)
        .collect::<Vec<_>>()
        .join(".")
}
