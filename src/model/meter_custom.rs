//! User-defined meters which sum a set of output variables.
use super::{Model, ModelObject, ModelObjectKind};
use anyhow::{Context, Result};
use std::borrow::{Borrow, BorrowMut};
use strum::{Display, EnumIter, EnumString};

const FUEL_TYPE: usize = 2;

/// `OS:Meter:Custom`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterCustom;

/// The fuel a custom meter measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum MeterFuelType {
    Electricity,
    NaturalGas,
    PropaneGas,
    FuelOilNo1,
    FuelOilNo2,
    Coal,
    Diesel,
    Gasoline,
    Water,
    Generic,
    OtherFuel1,
    OtherFuel2,
}

impl ModelObjectKind for MeterCustom {
    const IDD_OBJECT_TYPE: &'static str = "OS:Meter:Custom";
}

impl<M: Borrow<Model>> ModelObject<M, MeterCustom> {
    /// The fuel the meter measures, if one has been set
    pub fn fuel_type(&self) -> Option<MeterFuelType> {
        self.get_choice(FUEL_TYPE)
    }

    /// The variables the meter sums, as pairs of key name and variable name. An empty key
    /// means every object reporting the variable.
    pub fn key_var_groups(&self) -> Vec<(String, String)> {
        let object = self.idf_object();
        (0..object.num_extensible_groups())
            .filter_map(|group| object.extensible_group(group))
            .map(|values| (values[0].to_string(), values[1].to_string()))
            .collect()
    }

    /// The number of variables the meter sums
    pub fn num_key_var_groups(&self) -> usize {
        self.idf_object().num_extensible_groups()
    }
}

impl<M: BorrowMut<Model>> ModelObject<M, MeterCustom> {
    /// Set the fuel the meter measures
    pub fn set_fuel_type(&mut self, fuel_type: MeterFuelType) -> Result<()> {
        self.set_string(FUEL_TYPE, &fuel_type.to_string())
    }

    /// Clear the fuel type
    pub fn reset_fuel_type(&mut self) {
        self.reset(FUEL_TYPE);
    }

    /// Add a variable to the meter
    pub fn add_key_var_group(&mut self, key_name: &str, variable_name: &str) -> Result<()> {
        self.push_extensible_group(&[key_name, variable_name])?;
        Ok(())
    }

    /// Remove the variable at `group`
    pub fn remove_key_var_group(&mut self, group: usize) -> Result<()> {
        self.erase_extensible_group(group)
            .with_context(|| format!("Could not remove key/variable group {group}"))
    }

    /// Remove every variable
    pub fn remove_all_key_var_groups(&mut self) {
        self.clear_extensible_groups();
    }
}
