//! Persistence of analyses, data points and their attributes in a project database.
//!
//! Each record type maps to one table. Records are loaded into [`Tracked`] wrappers, which
//! remember the values last read from or written to the database so that changes can be
//! detected and reverted.
use crate::model::Model;
use itertools::Itertools;

mod analysis_record;
pub use analysis_record::AnalysisRecord;
mod attribute_record;
pub use attribute_record::{Attribute, AttributeRecord, AttributeValue};
mod data_point_record;
pub use data_point_record::DataPointRecord;
mod database;
pub use database::{ProjectDatabase, SCHEMA_VERSION};
mod record;
pub use record::{ObjectRecord, Record, Tracked};

/// Summarise a model as a list of attributes: the number of objects overall and of each type,
/// and the building's name and north axis if the model has a building
pub fn attributes_from_model(model: &Model) -> Vec<Attribute> {
    let mut attributes = vec![Attribute::new(
        "Number of objects",
        AttributeValue::Integer(count(model.len())),
        None,
    )];

    let counts = model.objects().map(|object| object.idd_object_type()).counts();
    for (idd_object_type, n) in counts.into_iter().sorted() {
        attributes.push(Attribute::new(
            &format!("Number of {idd_object_type} objects"),
            AttributeValue::Integer(count(n)),
            None,
        ));
    }

    if let Some(building) = model.building() {
        if let Some(name) = building.name() {
            attributes.push(Attribute::new(
                "Building name",
                AttributeValue::String(name.to_string()),
                None,
            ));
        }
        attributes.push(Attribute::new(
            "Building north axis",
            AttributeValue::Double(building.north_axis()),
            Some("deg"),
        ));
    }

    attributes
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use crate::model::{Building, CurveQuadratic};
    use rstest::rstest;

    #[rstest]
    fn test_attributes_from_model(mut model: Model) {
        model.add::<CurveQuadratic>().unwrap();
        model.add::<CurveQuadratic>().unwrap();
        model
            .unique::<Building>()
            .unwrap()
            .set_north_axis(45.0)
            .unwrap();

        let attributes = attributes_from_model(&model);
        let find = |name: &str| {
            attributes
                .iter()
                .find(|attribute| attribute.name == name)
                .map(|attribute| attribute.value.clone())
        };
        assert_eq!(find("Number of objects"), Some(AttributeValue::Integer(4)));
        assert_eq!(
            find("Number of OS:Curve:Quadratic objects"),
            Some(AttributeValue::Integer(2))
        );
        assert_eq!(
            find("Building name"),
            Some(AttributeValue::String("Building 1".into()))
        );
        assert_eq!(
            find("Building north axis"),
            Some(AttributeValue::Double(45.0))
        );
    }

    #[rstest]
    fn test_attributes_without_building(model: Model) {
        let attributes = attributes_from_model(&model);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[1].name, "Number of OS:Version objects");
    }
}
