//! Attributes: named values describing a data point.
use super::record::{ObjectRecord, Record, optional_text};
use anyhow::{Context, Result, bail};
use duckdb::Row;
use duckdb::types::Value;

/// The value of an attribute
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum AttributeValue {
    /// True or false
    Boolean(bool),
    /// A whole number
    Integer(i64),
    /// A real number
    Double(f64),
    /// Text
    String(String),
}

impl AttributeValue {
    /// The tag stored alongside the value to record its type
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::String(_) => "string",
        }
    }

    /// Rebuild a value from its type tag and text
    pub fn from_tagged(tag: &str, text: &str) -> Result<Self> {
        let value = match tag {
            "boolean" => Self::Boolean(text.parse()?),
            "integer" => Self::Integer(text.parse()?),
            "double" => Self::Double(text.parse()?),
            "string" => Self::String(text.to_string()),
            _ => bail!("Unknown attribute value type: {tag}"),
        };

        Ok(value)
    }
}

/// A named value with optional units
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Name
    pub name: String,
    /// Value
    pub value: AttributeValue,
    /// Units of the value, if it has any
    pub units: Option<String>,
}

impl Attribute {
    /// Create an attribute
    pub fn new(name: &str, value: AttributeValue, units: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            value,
            units: units.map(str::to_string),
        }
    }
}

/// An attribute of a data point
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRecord {
    base: ObjectRecord,
    /// The data point described
    pub data_point_record_id: i64,
    /// Value
    pub value: AttributeValue,
    /// Units of the value, if it has any
    pub units: Option<String>,
}

impl AttributeRecord {
    /// Create an unsaved record of an attribute of a data point
    pub fn new(data_point_record_id: i64, attribute: Attribute) -> Self {
        Self {
            base: ObjectRecord::new(&attribute.name),
            data_point_record_id,
            value: attribute.value,
            units: attribute.units,
        }
    }

    /// The attribute the record holds
    pub fn attribute(&self) -> Attribute {
        Attribute {
            name: self.base.name.clone(),
            value: self.value.clone(),
            units: self.units.clone(),
        }
    }
}

impl Record for AttributeRecord {
    const TABLE: &'static str = "attribute_records";
    const COLUMNS: &'static [&'static str] =
        &["data_point_record_id", "value_type", "value", "units"];

    fn base(&self) -> &ObjectRecord {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectRecord {
        &mut self.base
    }

    fn bind_values(&self) -> Vec<Value> {
        vec![
            Value::BigInt(self.data_point_record_id),
            Value::Text(self.value.type_tag().to_string()),
            Value::Text(self.value.to_string()),
            optional_text(self.units.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let offset = ObjectRecord::COLUMNS.len();
        let tag: String = row.get(offset + 1)?;
        let text: String = row.get(offset + 2)?;

        Ok(Self {
            base: ObjectRecord::from_row(row)?,
            data_point_record_id: row.get(offset)?,
            value: AttributeValue::from_tagged(&tag, &text)
                .with_context(|| format!("Invalid attribute value: {text}"))?,
            units: row.get(offset + 3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AttributeValue::Boolean(true))]
    #[case(AttributeValue::Integer(-4))]
    #[case(AttributeValue::Double(0.25))]
    #[case(AttributeValue::String("Office, large".into()))]
    fn test_tagged_values(#[case] value: AttributeValue) {
        let text = value.to_string();
        assert_eq!(
            AttributeValue::from_tagged(value.type_tag(), &text).unwrap(),
            value
        );
    }

    #[test]
    fn test_unknown_tag() {
        assert!(AttributeValue::from_tagged("date", "2024-01-01").is_err());
        assert!(AttributeValue::from_tagged("integer", "four").is_err());
    }
}
