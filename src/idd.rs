//! The Input Data Dictionary (IDD) describes every object type that can appear in a model or an
//! EnergyPlus input file: its fields, their data types, defaults, bounds and the references
//! between objects.
//!
//! Two curated dictionaries are embedded in the binary: the OpenStudio IDD (used by models) and the
//! EnergyPlus IDD (used by translated IDF files). Each is parsed once on first use.
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use std::fmt;
use std::sync::OnceLock;
use strum::{Display, EnumIter, EnumString};
use unicase::UniCase;

mod parse;

/// The embedded OpenStudio IDD text
const OPENSTUDIO_IDD_TEXT: &str = include_str!("../assets/idd/OpenStudio.idd");

/// The embedded EnergyPlus IDD text
const ENERGYPLUS_IDD_TEXT: &str = include_str!("../assets/idd/Energy+.idd");

static OPENSTUDIO_IDD: OnceLock<IddFile> = OnceLock::new();
static ENERGYPLUS_IDD: OnceLock<IddFile> = OnceLock::new();

/// The data dictionaries known to the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum IddFileType {
    /// The OpenStudio model schema
    OpenStudio,
    /// The EnergyPlus input schema
    EnergyPlus,
}

impl IddFileType {
    /// Get the parsed dictionary for this file type
    pub fn idd_file(self) -> &'static IddFile {
        match self {
            Self::OpenStudio => IddFactory::openstudio(),
            Self::EnergyPlus => IddFactory::energyplus(),
        }
    }
}

/// Provides access to the embedded dictionaries
pub struct IddFactory;

impl IddFactory {
    /// The OpenStudio IDD
    pub fn openstudio() -> &'static IddFile {
        OPENSTUDIO_IDD.get_or_init(|| {
            IddFile::parse(OPENSTUDIO_IDD_TEXT).expect("Embedded OpenStudio IDD is invalid")
        })
    }

    /// The EnergyPlus IDD
    pub fn energyplus() -> &'static IddFile {
        ENERGYPLUS_IDD.get_or_init(|| {
            IddFile::parse(ENERGYPLUS_IDD_TEXT).expect("Embedded EnergyPlus IDD is invalid")
        })
    }

    /// Look up an object type in the given dictionary
    pub fn object(file_type: IddFileType, name: &str) -> Option<&'static IddObject> {
        file_type.idd_file().object(name)
    }
}

/// The data type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "kebab-case")]
pub enum IddFieldKind {
    /// Free text
    Alpha,
    /// A floating-point number
    Real,
    /// A whole number
    Integer,
    /// One of a fixed set of keys
    Choice,
    /// A reference to another object, by name (IDF) or handle (OSM)
    ObjectList,
    /// The name of a system node
    Node,
    /// An object's own handle
    Handle,
    /// A name defined outside the file (e.g. an output variable)
    ExternalList,
    /// A file or web location
    Url,
}

/// A bound on the value of a numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBound {
    /// The bound itself
    pub value: f64,
    /// Whether the bound itself is excluded from the valid range
    pub exclusive: bool,
}

impl fmt::Display for NumericBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The description of one field of an object type
#[derive(Debug, Clone, PartialEq)]
pub struct IddField {
    /// The field identifier (e.g. `A1`, `N3`)
    pub id: String,
    /// The human-readable field name
    pub name: String,
    /// The data type
    pub kind: IddFieldKind,
    /// Whether the field must be populated for an object to be valid
    pub required: bool,
    /// The value assumed when the field is left empty
    pub default: Option<String>,
    /// Lower bound for numeric fields
    pub minimum: Option<NumericBound>,
    /// Upper bound for numeric fields
    pub maximum: Option<NumericBound>,
    /// Allowed values for choice fields
    pub keys: Vec<String>,
    /// Reference classes this field may point to
    pub object_lists: Vec<String>,
    /// Reference classes which this field's value names
    pub references: Vec<String>,
    /// Units of the value, if any
    pub units: Option<String>,
    /// Whether the value may be `Autosize`
    pub autosizable: bool,
    /// Whether the value may be `Autocalculate`
    pub autocalculatable: bool,
    /// Free-text notes
    pub notes: Vec<String>,
}

impl IddField {
    /// Create a field from its identifier, inferring the default data type from its prefix
    pub fn new(id: &str) -> Self {
        let kind = if id.starts_with(['N', 'n']) {
            IddFieldKind::Real
        } else {
            IddFieldKind::Alpha
        };

        Self {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            required: false,
            default: None,
            minimum: None,
            maximum: None,
            keys: Vec::new(),
            object_lists: Vec::new(),
            references: Vec::new(),
            units: None,
            autosizable: false,
            autocalculatable: false,
            notes: Vec::new(),
        }
    }

    /// Whether the field holds a number
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, IddFieldKind::Real | IddFieldKind::Integer)
    }

    /// Whether the field points at another object
    pub fn is_pointer(&self) -> bool {
        self.kind == IddFieldKind::ObjectList
    }

    /// Find the key matching `value` (ignoring case), returning it in its canonical case
    pub fn accepts_key(&self, value: &str) -> Option<&str> {
        let value = UniCase::new(value);
        self.keys
            .iter()
            .find(|key| UniCase::new(key.as_str()) == value)
            .map(String::as_str)
    }

    /// Check that a number satisfies this field's data type and bounds
    pub fn check_number(&self, value: f64) -> Result<()> {
        ensure!(value.is_finite(), "{value} is not a finite number");
        if self.kind == IddFieldKind::Integer {
            ensure!(value.fract() == 0.0, "{value} is not an integer");
        }

        if let Some(min) = self.minimum {
            if min.exclusive {
                ensure!(value > min.value, "{value} must be greater than {min}");
            } else {
                ensure!(value >= min.value, "{value} is less than the minimum of {min}");
            }
        }

        if let Some(max) = self.maximum {
            if max.exclusive {
                ensure!(value < max.value, "{value} must be less than {max}");
            } else {
                ensure!(value <= max.value, "{value} is greater than the maximum of {max}");
            }
        }

        Ok(())
    }
}

/// The description of one object type
#[derive(Debug, Clone, PartialEq)]
pub struct IddObject {
    /// The type name (e.g. `OS:Generator:FuelCell:Inverter`)
    pub name: String,
    /// The group the type was declared in
    pub group: Option<String>,
    /// Descriptive text
    pub memo: Vec<String>,
    /// At most one object of this type may exist in a file
    pub unique: bool,
    /// At least one object of this type must exist in a file
    pub required: bool,
    /// The minimum number of fields written out for an object of this type
    pub min_fields: usize,
    /// The number of fields in each extensible group (zero if not extensible)
    pub extensible_group_size: usize,
    /// Index of the first field of the first extensible group
    pub first_extensible: Option<usize>,
    /// The declared fields
    pub fields: Vec<IddField>,
}

impl IddObject {
    /// Create an object type with no fields
    pub fn new(name: &str, group: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            group,
            memo: Vec::new(),
            unique: false,
            required: false,
            min_fields: 0,
            extensible_group_size: 0,
            first_extensible: None,
            fields: Vec::new(),
        }
    }

    /// Whether this type has the given name (ignoring case)
    pub fn is_type(&self, name: &str) -> bool {
        UniCase::new(self.name.as_str()) == UniCase::new(name)
    }

    /// Get the description of the field at `index`, mapping indices past the declared fields onto
    /// the extensible group template
    pub fn field(&self, index: usize) -> Option<&IddField> {
        self.fields.get(self.extensible_group_field(index))
    }

    /// Map an index in any extensible group back onto the declared template field. Other
    /// indices are returned unchanged.
    pub fn extensible_group_field(&self, index: usize) -> usize {
        match self.first_extensible {
            Some(first) if index >= first && self.extensible_group_size > 0 => {
                first + (index - first) % self.extensible_group_size
            }
            _ => index,
        }
    }

    /// Find a field by name (ignoring case)
    pub fn field_index(&self, name: &str) -> Option<usize> {
        let name = UniCase::new(name);
        self.fields
            .iter()
            .position(|field| UniCase::new(field.name.as_str()) == name)
    }

    /// The index of the `Name` field, if the type has one
    pub fn name_field_index(&self) -> Option<usize> {
        self.field_index("Name")
    }

    /// Whether the first field holds the object's handle
    pub fn has_handle_field(&self) -> bool {
        self.fields
            .first()
            .is_some_and(|field| field.kind == IddFieldKind::Handle)
    }

    /// Whether objects of this type can grow extensible groups
    pub fn is_extensible(&self) -> bool {
        self.extensible_group_size > 0
    }

    /// Whether the field at `index` is part of an extensible group
    pub fn is_extensible_index(&self, index: usize) -> bool {
        self.is_extensible() && self.first_extensible.is_some_and(|first| index >= first)
    }

    /// The number of fields before the first extensible group
    pub fn num_non_extensible_fields(&self) -> usize {
        self.first_extensible.unwrap_or(self.fields.len())
    }

    /// The maximum number of fields, or `None` if the type is extensible
    pub fn max_fields(&self) -> Option<usize> {
        (!self.is_extensible()).then_some(self.fields.len())
    }

    /// The reference classes an object of this type can be pointed at through
    pub fn references(&self) -> &[String] {
        self.name_field_index()
            .map_or(&[], |index| self.fields[index].references.as_slice())
    }

    /// Whether an object of this type may be the target of the given pointer field
    pub fn is_referenced_by(&self, field: &IddField) -> bool {
        self.references().iter().any(|reference| {
            field
                .object_lists
                .iter()
                .any(|list| UniCase::new(list.as_str()) == UniCase::new(reference.as_str()))
        })
    }
}

/// A parsed data dictionary
#[derive(Debug, Clone, PartialEq)]
pub struct IddFile {
    version: String,
    objects: IndexMap<UniCase<String>, IddObject>,
}

impl IddFile {
    /// Parse IDD text
    pub fn parse(text: &str) -> Result<Self> {
        parse::parse_idd(text)
    }

    /// The dictionary version taken from the `!IDD_Version` header
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up an object type by name (ignoring case)
    pub fn object(&self, name: &str) -> Option<&IddObject> {
        self.objects.get(&UniCase::new(name.to_string()))
    }

    /// Iterate over all object types in declaration order
    pub fn objects(&self) -> impl Iterator<Item = &IddObject> {
        self.objects.values()
    }

    /// Iterate over the object types of which at most one may exist
    pub fn unique_objects(&self) -> impl Iterator<Item = &IddObject> {
        self.objects().filter(|object| object.unique)
    }

    /// Iterate over the object types which must be present in a complete file
    pub fn required_objects(&self) -> impl Iterator<Item = &IddObject> {
        self.objects().filter(|object| object.required)
    }
}
