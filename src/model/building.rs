//! The building: the top-level container for a model's geometry.
use super::{Model, ModelObject, ModelObjectKind, UniqueModelObjectKind};
use anyhow::Result;
use std::borrow::{Borrow, BorrowMut};

const NORTH_AXIS: usize = 2;
const NOMINAL_FLOOR_TO_FLOOR_HEIGHT: usize = 3;
const STANDARDS_BUILDING_TYPE: usize = 4;
const STANDARDS_NUMBER_OF_STORIES: usize = 5;

/// `OS:Building`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Building;

impl ModelObjectKind for Building {
    const IDD_OBJECT_TYPE: &'static str = "OS:Building";
}

impl UniqueModelObjectKind for Building {}

impl<M: Borrow<Model>> ModelObject<M, Building> {
    /// The angle between true north and the building's y axis, in degrees
    pub fn north_axis(&self) -> f64 {
        self.get_double_or_default(NORTH_AXIS).unwrap_or_default()
    }

    /// Whether the north axis has been left at its default
    pub fn is_north_axis_defaulted(&self) -> bool {
        self.is_empty(NORTH_AXIS)
    }

    /// The typical height from one floor to the next, in metres
    pub fn nominal_floor_to_floor_height(&self) -> Option<f64> {
        self.get_double(NOMINAL_FLOOR_TO_FLOOR_HEIGHT)
    }

    /// The building type used to look up standards data
    pub fn standards_building_type(&self) -> Option<&str> {
        self.get_string(STANDARDS_BUILDING_TYPE)
    }

    /// The number of stories used to look up standards data
    pub fn standards_number_of_stories(&self) -> Option<i32> {
        self.get_int(STANDARDS_NUMBER_OF_STORIES)
    }
}

impl<M: BorrowMut<Model>> ModelObject<M, Building> {
    /// Set the north axis, in degrees
    pub fn set_north_axis(&mut self, north_axis: f64) -> Result<()> {
        self.set_double(NORTH_AXIS, north_axis)
    }

    /// Return the north axis to its default
    pub fn reset_north_axis(&mut self) {
        self.reset(NORTH_AXIS);
    }

    /// Set the nominal floor to floor height, which must be positive
    pub fn set_nominal_floor_to_floor_height(&mut self, height: f64) -> Result<()> {
        self.set_double(NOMINAL_FLOOR_TO_FLOOR_HEIGHT, height)
    }

    /// Clear the nominal floor to floor height
    pub fn reset_nominal_floor_to_floor_height(&mut self) {
        self.reset(NOMINAL_FLOOR_TO_FLOOR_HEIGHT);
    }

    /// Set the standards building type
    pub fn set_standards_building_type(&mut self, building_type: &str) -> Result<()> {
        self.set_string(STANDARDS_BUILDING_TYPE, building_type)
    }

    /// Clear the standards building type
    pub fn reset_standards_building_type(&mut self) {
        self.reset(STANDARDS_BUILDING_TYPE);
    }

    /// Set the standards number of stories, which cannot be negative
    pub fn set_standards_number_of_stories(&mut self, stories: i32) -> Result<()> {
        self.set_int(STANDARDS_NUMBER_OF_STORIES, stories)
    }

    /// Clear the standards number of stories
    pub fn reset_standards_number_of_stories(&mut self) {
        self.reset(STANDARDS_NUMBER_OF_STORIES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_defaults(mut model: Model) {
        let building = model.unique::<Building>().unwrap();
        assert_eq!(building.name(), Some("Building 1"));
        assert_approx_eq!(f64, building.north_axis(), 0.0);
        assert!(building.is_north_axis_defaulted());
        assert_eq!(building.nominal_floor_to_floor_height(), None);
        assert_eq!(building.standards_number_of_stories(), None);
    }

    #[rstest]
    fn test_setters(mut model: Model) {
        let mut building = model.unique::<Building>().unwrap();
        building.set_north_axis(30.0).unwrap();
        assert_approx_eq!(f64, building.north_axis(), 30.0);
        assert!(!building.is_north_axis_defaulted());
        building.reset_north_axis();
        assert!(building.is_north_axis_defaulted());

        assert!(building.set_nominal_floor_to_floor_height(0.0).is_err());
        building.set_nominal_floor_to_floor_height(3.5).unwrap();
        assert_approx_eq!(f64, building.nominal_floor_to_floor_height().unwrap(), 3.5);
        building.reset_nominal_floor_to_floor_height();
        assert_eq!(building.nominal_floor_to_floor_height(), None);

        assert!(building.set_standards_number_of_stories(-1).is_err());
        building.set_standards_number_of_stories(4).unwrap();
        assert_eq!(building.standards_number_of_stories(), Some(4));

        building.set_standards_building_type("Office").unwrap();
        assert_eq!(building.standards_building_type(), Some("Office"));
        building.reset_standards_building_type();
        assert_eq!(building.standards_building_type(), None);
    }
}
