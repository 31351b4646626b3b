//! Validity checking for objects and collections of objects.
use super::IdfObject;
use crate::idd::{IddField, IddFieldKind, IddFile};
use itertools::Itertools;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::collections::HashMap;
use std::fmt;
use strum::Display;
use unicase::UniCase;

/// How thoroughly data is checked
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
    clap::ValueEnum,
)]
pub enum StrictnessLevel {
    /// No checks at all
    #[string = "none"]
    None,
    /// Populated fields must have valid values
    #[default]
    #[string = "draft"]
    Draft,
    /// Draft checks, plus required fields and objects must be present
    #[string = "final"]
    Final,
}

/// The category of a [`DataError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DataErrorKind {
    /// A numeric field holds something other than a number
    NotNumeric,
    /// A numeric field is outside its bounds
    OutOfRange,
    /// A choice field holds a value which is not one of its keys
    InvalidChoice,
    /// A handle field does not hold a handle
    InvalidHandle,
    /// A value contains characters which cannot be written to a file
    InvalidCharacters,
    /// A required field is empty
    MissingRequiredField,
    /// The object has fewer fields than its type's minimum
    TooFewFields,
    /// The object has more fields than its type allows
    TooManyFields,
    /// More than one object of a unique type exists
    DuplicateUniqueObject,
    /// No object of a required type exists
    MissingRequiredObject,
    /// A pointer field refers to a missing or unsuitable object
    DanglingPointer,
    /// Two objects of the same type share a name
    DuplicateName,
}

/// A problem with one field's value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The category of problem
    pub kind: DataErrorKind,
    /// Description of the problem
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FieldError {}

/// A problem found while checking data against its schema
#[derive(Debug, Clone, PartialEq)]
pub struct DataError {
    /// The category of problem
    pub kind: DataErrorKind,
    /// The IDD type of the offending object
    pub object_type: String,
    /// The name of the offending object, if it has one
    pub object_name: Option<String>,
    /// The offending field, if the problem concerns one field
    pub field_index: Option<usize>,
    /// Description of the problem
    pub message: String,
}

impl DataError {
    /// Create an error concerning the given object
    pub fn new(
        kind: DataErrorKind,
        object: &IdfObject,
        field_index: Option<usize>,
        message: String,
    ) -> Self {
        Self {
            kind,
            object_type: object.object_type().to_string(),
            object_name: object.name().map(str::to_string),
            field_index,
            message,
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.object_type)?;
        if let Some(name) = &self.object_name {
            write!(f, " '{name}'")?;
        }
        if let Some(index) = self.field_index {
            write!(f, " field {index}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// The result of checking a file or model at a given strictness level
#[derive(Debug, Clone, PartialEq)]
pub struct ValidityReport {
    /// The level the checks were carried out at
    pub level: StrictnessLevel,
    /// The problems found
    pub errors: Vec<DataError>,
}

impl ValidityReport {
    /// Whether no problems were found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Count the errors of each kind
    pub fn counts_by_kind(&self) -> HashMap<DataErrorKind, usize> {
        self.errors.iter().counts_by(|error| error.kind)
    }
}

impl fmt::Display for ValidityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "No errors found at strictness level {:?}", self.level);
        }

        writeln!(
            f,
            "{} error(s) found at strictness level {:?}:",
            self.errors.len(),
            self.level
        )?;
        for error in &self.errors {
            writeln!(f, "  * {error}")?;
        }

        Ok(())
    }
}

/// Check a single value against its field description, returning it in canonical form
pub(crate) fn check_value(field: &IddField, value: &str) -> Result<String, FieldError> {
    let value = value.trim();
    if value.contains([',', ';', '!', '\n', '\r']) {
        return Err(FieldError {
            kind: DataErrorKind::InvalidCharacters,
            message: format!("'{value}' contains a character reserved by the file format"),
        });
    }

    if value.is_empty() {
        return Ok(String::new());
    }

    match field.kind {
        IddFieldKind::Choice => field.accepts_key(value).map(str::to_string).ok_or_else(|| {
            FieldError {
                kind: DataErrorKind::InvalidChoice,
                message: format!(
                    "'{value}' is not a valid choice for {}. Valid choices are: {}",
                    field.name,
                    field.keys.join(", ")
                ),
            }
        }),
        IddFieldKind::Real | IddFieldKind::Integer => check_number(field, value),
        IddFieldKind::Handle => value
            .parse::<crate::handle::Handle>()
            .map(|handle| handle.to_string())
            .map_err(|_| FieldError {
                kind: DataErrorKind::InvalidHandle,
                message: format!("'{value}' is not a valid handle"),
            }),
        _ => Ok(value.to_string()),
    }
}

fn check_number(field: &IddField, value: &str) -> Result<String, FieldError> {
    if field.autosizable && value.eq_ignore_ascii_case("autosize") {
        return Ok("Autosize".to_string());
    }
    if field.autocalculatable && value.eq_ignore_ascii_case("autocalculate") {
        return Ok("Autocalculate".to_string());
    }

    let number: f64 = value.parse().map_err(|_| FieldError {
        kind: DataErrorKind::NotNumeric,
        message: format!("'{value}' is not a number, as required by {}", field.name),
    })?;

    field.check_number(number).map_err(|err| FieldError {
        kind: DataErrorKind::OutOfRange,
        message: format!("{}: {err}", field.name),
    })?;

    Ok(value.to_string())
}

/// Check a collection of objects which together form a file or model
pub(crate) fn collection_errors<'a, I>(
    objects: I,
    idd_file: &IddFile,
    level: StrictnessLevel,
) -> Vec<DataError>
where
    I: IntoIterator<Item = &'a IdfObject>,
{
    if level == StrictnessLevel::None {
        return Vec::new();
    }

    let mut errors = Vec::new();
    let mut counts: HashMap<UniCase<&str>, usize> = HashMap::new();
    let mut names: HashMap<(UniCase<&str>, UniCase<&str>), usize> = HashMap::new();
    for object in objects {
        errors.extend(object.validity_report(level));

        let object_type = UniCase::new(object.object_type());
        let count = counts.entry(object_type).or_default();
        *count += 1;
        if object.idd_object().unique && *count == 2 {
            errors.push(DataError::new(
                DataErrorKind::DuplicateUniqueObject,
                object,
                None,
                "More than one object of a unique type".to_string(),
            ));
        }

        if let Some(name) = object.name() {
            let count = names.entry((object_type, UniCase::new(name))).or_default();
            *count += 1;
            if *count == 2 {
                errors.push(DataError::new(
                    DataErrorKind::DuplicateName,
                    object,
                    object.idd_object().name_field_index(),
                    format!("Name '{name}' is used by more than one object of this type"),
                ));
            }
        }
    }

    if level == StrictnessLevel::Final {
        for required in idd_file.required_objects() {
            if !counts.contains_key(&UniCase::new(required.name.as_str())) {
                errors.push(DataError {
                    kind: DataErrorKind::MissingRequiredObject,
                    object_type: required.name.clone(),
                    object_name: None,
                    field_index: None,
                    message: "A required object is missing".to_string(),
                });
            }
        }
    }

    errors
}
