//! Field-indexed data records and the IDF text format.
//!
//! An [`IdfObject`] is an ordered list of string fields described by an [`IddObject`]. Empty
//! strings stand for absent values. Setters check values against the field description before
//! storing them, so a failed set leaves the object unchanged.
use crate::handle::Handle;
use crate::idd::{IddField, IddObject};
use anyhow::{Context, Result, ensure};

mod file;
pub use file::IdfFile;
mod validity;
pub(crate) use validity::{check_value, collection_errors};
pub use validity::{DataError, DataErrorKind, FieldError, StrictnessLevel, ValidityReport};

/// A single object of an IDF or OSM file
#[derive(Debug, Clone, PartialEq)]
pub struct IdfObject {
    idd: &'static IddObject,
    fields: Vec<String>,
    comment: Option<String>,
}

impl IdfObject {
    /// Create an object with every field empty
    pub fn new(idd: &'static IddObject) -> Self {
        Self {
            idd,
            fields: vec![String::new(); idd.min_fields.max(1)],
            comment: None,
        }
    }

    /// Create an object with default values filled in up to the type's minimum number of fields
    pub fn with_defaults(idd: &'static IddObject) -> Self {
        let mut object = Self::new(idd);
        for (index, value) in object.fields.iter_mut().enumerate() {
            if let Some(default) = idd.field(index).and_then(|field| field.default.as_ref()) {
                value.clone_from(default);
            }
        }

        object
    }

    /// Create an object from raw field values, without checking them
    pub(crate) fn from_fields(idd: &'static IddObject, fields: Vec<String>) -> Result<Self> {
        if let Some(max) = idd.max_fields() {
            ensure!(
                fields.len() <= max,
                "{} has {} fields but at most {max} are allowed",
                idd.name,
                fields.len()
            );
        }

        Ok(Self {
            idd,
            fields,
            comment: None,
        })
    }

    /// The description of this object's type
    pub fn idd_object(&self) -> &'static IddObject {
        self.idd
    }

    /// The name of this object's type
    pub fn object_type(&self) -> &'static str {
        &self.idd.name
    }

    /// The comment printed above the object
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Set the comment printed above the object
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// The number of fields currently stored
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over all stored field values, including empty ones
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// The value of a field, if populated
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.fields
            .get(index)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// The value of a field, falling back to the IDD default
    pub fn get_string_or_default(&self, index: usize) -> Option<&str> {
        self.get_string(index)
            .or_else(|| self.idd.field(index)?.default.as_deref())
    }

    /// The numeric value of a field. Autosized and autocalculated fields have no value.
    pub fn get_double(&self, index: usize) -> Option<f64> {
        parse_double(self.get_string(index)?)
    }

    /// The numeric value of a field, falling back to the IDD default
    pub fn get_double_or_default(&self, index: usize) -> Option<f64> {
        parse_double(self.get_string_or_default(index)?)
    }

    /// The integer value of a field
    pub fn get_int(&self, index: usize) -> Option<i32> {
        self.get_string(index)?.parse().ok()
    }

    /// The integer value of a field, falling back to the IDD default
    pub fn get_int_or_default(&self, index: usize) -> Option<i32> {
        self.get_string_or_default(index)?.parse().ok()
    }

    /// Whether a field is absent
    pub fn is_empty(&self, index: usize) -> bool {
        self.get_string(index).is_none()
    }

    /// Whether a field is set to `Autosize`
    pub fn is_autosized(&self, index: usize) -> bool {
        self.get_string(index)
            .is_some_and(|value| value.eq_ignore_ascii_case("autosize"))
    }

    /// Whether a field is set to `Autocalculate`
    pub fn is_autocalculated(&self, index: usize) -> bool {
        self.get_string(index)
            .is_some_and(|value| value.eq_ignore_ascii_case("autocalculate"))
    }

    fn field_description(&self, index: usize) -> Result<&'static IddField> {
        self.idd
            .field(index)
            .with_context(|| format!("{} has no field at index {index}", self.idd.name))
    }

    /// Set a field from text, checking it against the field description
    pub fn set_string(&mut self, index: usize, value: &str) -> Result<()> {
        let field = self.field_description(index)?;
        let value = check_value(field, value)?;
        self.store(index, value);

        Ok(())
    }

    /// Set a numeric field
    pub fn set_double(&mut self, index: usize, value: f64) -> Result<()> {
        let field = self.field_description(index)?;
        ensure!(field.is_numeric(), "{} is not a numeric field", field.name);
        self.set_string(index, &value.to_string())
    }

    /// Set an integer field
    pub fn set_int(&mut self, index: usize, value: i32) -> Result<()> {
        let field = self.field_description(index)?;
        ensure!(field.is_numeric(), "{} is not a numeric field", field.name);
        self.set_string(index, &value.to_string())
    }

    /// Set a field to `Autosize`
    pub fn set_autosize(&mut self, index: usize) -> Result<()> {
        self.set_string(index, "Autosize")
    }

    /// Write a handle into the first field
    pub(crate) fn set_handle(&mut self, handle: Handle) {
        self.store(0, handle.to_string());
    }

    /// Point a field at an object by handle, without checking the field's type
    pub(crate) fn set_handle_pointer(&mut self, index: usize, handle: Handle) {
        self.store(index, handle.to_string());
    }

    /// Clear a field
    pub fn reset(&mut self, index: usize) {
        if let Some(value) = self.fields.get_mut(index) {
            value.clear();
        }
        self.trim_trailing_empty();
    }

    /// Store an already checked value, growing the field list as needed
    fn store(&mut self, index: usize, value: String) {
        if index >= self.fields.len() {
            self.fields.resize(index + 1, String::new());
        }
        self.fields[index] = value;
        self.trim_trailing_empty();
    }

    fn trim_trailing_empty(&mut self) {
        let min = self.idd.min_fields.max(1);
        while self.fields.len() > min && self.fields.last().is_some_and(String::is_empty) {
            self.fields.pop();
        }
    }

    /// The object's name, if its type has a `Name` field and it is populated
    pub fn name(&self) -> Option<&str> {
        self.get_string(self.idd.name_field_index()?)
    }

    /// Set the name field without any uniqueness checks
    pub fn set_name_raw(&mut self, name: &str) -> Result<()> {
        let index = self
            .idd
            .name_field_index()
            .with_context(|| format!("{} does not have a name", self.idd.name))?;
        self.set_string(index, name)
    }

    /// The number of extensible groups, counting a partly filled last group
    pub fn num_extensible_groups(&self) -> usize {
        match self.idd.first_extensible {
            Some(first) if self.idd.is_extensible() && self.fields.len() > first => {
                (self.fields.len() - first).div_ceil(self.idd.extensible_group_size)
            }
            _ => 0,
        }
    }

    fn group_start(&self, group: usize) -> usize {
        self.idd.num_non_extensible_fields() + group * self.idd.extensible_group_size
    }

    /// The values of one extensible group
    pub fn extensible_group(&self, group: usize) -> Option<Vec<&str>> {
        if group >= self.num_extensible_groups() {
            return None;
        }

        let start = self.group_start(group);
        Some(
            (start..start + self.idd.extensible_group_size)
                .map(|index| self.fields.get(index).map_or("", String::as_str))
                .collect(),
        )
    }

    /// Append an extensible group, returning its index. Nothing is stored unless every value is
    /// valid.
    pub fn push_extensible_group(&mut self, values: &[&str]) -> Result<usize> {
        ensure!(
            self.idd.is_extensible(),
            "{} does not have extensible groups",
            self.idd.name
        );
        ensure!(
            values.len() == self.idd.extensible_group_size,
            "{} extensible groups have {} fields but {} values were given",
            self.idd.name,
            self.idd.extensible_group_size,
            values.len()
        );

        let group = self.num_extensible_groups();
        let start = self.group_start(group);
        let checked = values
            .iter()
            .enumerate()
            .map(|(offset, value)| Ok(check_value(self.field_description(start + offset)?, value)?))
            .collect::<Result<Vec<_>>>()?;

        self.fields.resize(start, String::new());
        self.fields.extend(checked);
        self.trim_trailing_empty();

        Ok(group)
    }

    /// Remove one extensible group, shifting later groups down
    pub fn erase_extensible_group(&mut self, group: usize) -> Result<()> {
        let num_groups = self.num_extensible_groups();
        ensure!(
            group < num_groups,
            "{} has {num_groups} extensible group(s); cannot erase group {group}",
            self.idd.name
        );

        let start = self.group_start(group);
        let end = (start + self.idd.extensible_group_size).min(self.fields.len());
        self.fields.drain(start..end);
        self.trim_trailing_empty();

        Ok(())
    }

    /// Remove every extensible group
    pub fn clear_extensible_groups(&mut self) {
        if self.idd.is_extensible() {
            self.fields.truncate(self.idd.num_non_extensible_fields());
            self.trim_trailing_empty();
        }
    }

    /// Check this object's fields at the given strictness level
    pub fn validity_report(&self, level: StrictnessLevel) -> Vec<DataError> {
        if level == StrictnessLevel::None {
            return Vec::new();
        }

        let mut errors = Vec::new();
        for (index, value) in self.fields.iter().enumerate() {
            let Some(field) = self.idd.field(index) else {
                errors.push(DataError::new(
                    DataErrorKind::TooManyFields,
                    self,
                    Some(index),
                    format!("Field {index} is beyond the last field of {}", self.idd.name),
                ));
                break;
            };

            if value.is_empty() {
                if level == StrictnessLevel::Final
                    && field.required
                    && !self.idd.is_extensible_index(index)
                {
                    errors.push(DataError::new(
                        DataErrorKind::MissingRequiredField,
                        self,
                        Some(index),
                        format!("Required field {} is empty", field.name),
                    ));
                }
            } else if let Err(err) = check_value(field, value) {
                errors.push(DataError::new(err.kind, self, Some(index), err.message));
            }
        }

        if level == StrictnessLevel::Final {
            for index in self.fields.len()..self.idd.num_non_extensible_fields() {
                let field = &self.idd.fields[index];
                if field.required {
                    errors.push(DataError::new(
                        DataErrorKind::MissingRequiredField,
                        self,
                        Some(index),
                        format!("Required field {} is missing", field.name),
                    ));
                }
            }

            if self.fields.len() < self.idd.min_fields {
                errors.push(DataError::new(
                    DataErrorKind::TooFewFields,
                    self,
                    None,
                    format!(
                        "{} fields present but {} requires at least {}",
                        self.fields.len(),
                        self.idd.name,
                        self.idd.min_fields
                    ),
                ));
            }
        }

        errors
    }
}

/// Parse a numeric field value, treating `Autosize`/`Autocalculate` as absent
fn parse_double(value: &str) -> Option<f64> {
    value.parse().ok().filter(|number: &f64| number.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use crate::idd::IddFactory;
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    fn idd(name: &str) -> &'static IddObject {
        IddFactory::openstudio().object(name).unwrap()
    }

    #[fixture]
    fn inverter() -> IdfObject {
        IdfObject::with_defaults(idd("OS:Generator:FuelCell:Inverter"))
    }

    #[fixture]
    fn air_supply() -> IdfObject {
        IdfObject::with_defaults(idd("OS:Generator:FuelCell:AirSupply"))
    }

    #[test]
    fn test_new_is_empty() {
        let object = IdfObject::new(idd("OS:Generator:FuelCell:Inverter"));
        assert_eq!(object.num_fields(), 4);
        assert!((0..4).all(|index| object.is_empty(index)));
    }

    #[rstest]
    fn test_with_defaults(inverter: IdfObject) {
        assert_eq!(inverter.get_string(2), Some("Constant"));
        assert_approx_eq!(f64, inverter.get_double(3).unwrap(), 1.0);
        assert!(inverter.is_empty(4));
        assert_eq!(inverter.get_string_or_default(4), None);
    }

    #[rstest]
    fn test_set_choice_canonical_case(mut inverter: IdfObject) {
        inverter.set_string(2, "quadratic").unwrap();
        assert_eq!(inverter.get_string(2), Some("Quadratic"));
    }

    #[rstest]
    fn test_set_invalid_choice(mut inverter: IdfObject) {
        assert!(inverter.set_string(2, "Linear").is_err());
        assert_eq!(inverter.get_string(2), Some("Constant"));
    }

    #[rstest]
    #[case(1.5)]
    #[case(-0.1)]
    #[case(f64::NAN)]
    fn test_set_double_out_of_range(mut inverter: IdfObject, #[case] value: f64) {
        assert!(inverter.set_double(3, value).is_err());
        assert_approx_eq!(f64, inverter.get_double(3).unwrap(), 1.0);
    }

    #[rstest]
    fn test_set_double(mut inverter: IdfObject) {
        inverter.set_double(3, 0.95).unwrap();
        assert_approx_eq!(f64, inverter.get_double(3).unwrap(), 0.95);
    }

    #[rstest]
    fn test_set_double_on_alpha_field(mut inverter: IdfObject) {
        assert_error!(inverter.set_double(1, 2.0), "Name is not a numeric field");
    }

    #[rstest]
    fn test_set_not_numeric(mut inverter: IdfObject) {
        assert!(inverter.set_string(3, "high").is_err());
    }

    #[rstest]
    fn test_set_beyond_fields(mut inverter: IdfObject) {
        assert_error!(
            inverter.set_string(5, "x"),
            "OS:Generator:FuelCell:Inverter has no field at index 5"
        );
    }

    #[rstest]
    fn test_set_reserved_characters(mut inverter: IdfObject) {
        assert!(inverter.set_string(1, "a,b").is_err());
        assert!(inverter.set_string(1, "a;b").is_err());
        assert!(inverter.set_string(1, "a!b").is_err());
    }

    #[rstest]
    fn test_reset_trims(mut inverter: IdfObject) {
        inverter.set_string(4, "{6b1ee30c-0b55-4ad3-9d54-6c2d4b2a8c60}").unwrap();
        assert_eq!(inverter.num_fields(), 5);
        inverter.reset(4);
        assert_eq!(inverter.num_fields(), 4);
        inverter.reset(3);
        assert_eq!(inverter.num_fields(), 4);
        assert!(inverter.is_empty(3));
        assert_approx_eq!(f64, inverter.get_double_or_default(3).unwrap(), 1.0);
    }

    #[rstest]
    fn test_name(mut inverter: IdfObject) {
        assert_eq!(inverter.name(), None);
        inverter.set_name_raw("My Inverter").unwrap();
        assert_eq!(inverter.name(), Some("My Inverter"));
    }

    #[test]
    fn test_autosize() {
        let mut object = IdfObject::new(idd("OS:Building"));
        assert!(object.set_autosize(3).is_err());
        object.set_double(3, 3.5).unwrap();
        assert!(!object.is_autosized(3));
    }

    #[rstest]
    fn test_extensible_groups(mut air_supply: IdfObject) {
        assert_eq!(air_supply.num_extensible_groups(), 0);
        assert_eq!(air_supply.push_extensible_group(&["nitrogen", "0.79"]).unwrap(), 0);
        assert_eq!(air_supply.push_extensible_group(&["Oxygen", "0.21"]).unwrap(), 1);
        assert_eq!(air_supply.num_extensible_groups(), 2);
        assert_eq!(air_supply.extensible_group(0).unwrap(), ["Nitrogen", "0.79"]);

        air_supply.erase_extensible_group(0).unwrap();
        assert_eq!(air_supply.num_extensible_groups(), 1);
        assert_eq!(air_supply.extensible_group(0).unwrap(), ["Oxygen", "0.21"]);
        assert_eq!(air_supply.extensible_group(1), None);

        air_supply.clear_extensible_groups();
        assert_eq!(air_supply.num_extensible_groups(), 0);
    }

    #[test]
    fn test_clear_extensible_groups_trims() {
        let mut meter = IdfObject::new(idd("OS:Meter:Custom"));
        assert_eq!(meter.num_fields(), 2);
        meter.push_extensible_group(&["", "Facility Net Purchased Electricity"]).unwrap();
        assert_eq!(meter.num_fields(), 5);

        // The empty fuel type field is not left behind
        meter.clear_extensible_groups();
        assert_eq!(meter.num_fields(), 2);
    }

    #[rstest]
    fn test_push_extensible_group_all_or_nothing(mut air_supply: IdfObject) {
        assert!(air_supply.push_extensible_group(&["Oxygen", "2.0"]).is_err());
        assert!(air_supply.push_extensible_group(&["Neon", "0.1"]).is_err());
        assert!(air_supply.push_extensible_group(&["Oxygen"]).is_err());
        assert_eq!(air_supply.num_extensible_groups(), 0);
    }

    #[rstest]
    fn test_extensible_on_non_extensible(mut inverter: IdfObject) {
        assert_error!(
            inverter.push_extensible_group(&["x"]),
            "OS:Generator:FuelCell:Inverter does not have extensible groups"
        );
        assert!(inverter.erase_extensible_group(0).is_err());
    }

    #[rstest]
    fn test_validity_draft(inverter: IdfObject) {
        assert!(inverter.validity_report(StrictnessLevel::Draft).is_empty());

        let object =
            IdfObject::from_fields(inverter.idd_object(), vec![String::new(), "x".into(), "Bad".into()])
                .unwrap();
        let errors = object.validity_report(StrictnessLevel::Draft);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, DataErrorKind::InvalidChoice);
        assert_eq!(errors[0].field_index, Some(2));
        assert!(object.validity_report(StrictnessLevel::None).is_empty());
    }

    #[test]
    fn test_validity_final() {
        let object = IdfObject::new(idd("OS:AirflowNetworkConstantPressureDrop"));
        assert!(object.validity_report(StrictnessLevel::Draft).is_empty());

        let kinds: Vec<_> = object
            .validity_report(StrictnessLevel::Final)
            .into_iter()
            .map(|error| (error.kind, error.field_index))
            .collect();
        assert!(kinds.contains(&(DataErrorKind::MissingRequiredField, Some(2))));
    }

    #[test]
    fn test_from_fields_too_many() {
        let fields = vec![String::new(); 6];
        assert_error!(
            IdfObject::from_fields(idd("OS:Generator:FuelCell:Inverter"), fields),
            "OS:Generator:FuelCell:Inverter has 6 fields but at most 5 are allowed"
        );
    }
}
