//! The power conditioning unit of a fuel cell generator.
use super::{CurveQuadratic, Model, ModelObject, ModelObjectKind};
use crate::handle::Handle;
use anyhow::{Result, ensure};
use std::borrow::{Borrow, BorrowMut};
use strum::{Display, EnumString};

const INVERTER_EFFICIENCY_CALCULATION_MODE: usize = 2;
const INVERTER_EFFICIENCY: usize = 3;
const EFFICIENCY_FUNCTION_OF_DC_POWER_CURVE: usize = 4;

/// `OS:Generator:FuelCell:Inverter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorFuelCellInverter;

/// How the inverter's efficiency is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum InverterEfficiencyCalculationMode {
    /// Efficiency is a quadratic function of DC power
    Quadratic,
    /// Efficiency is fixed
    Constant,
}

impl ModelObjectKind for GeneratorFuelCellInverter {
    const IDD_OBJECT_TYPE: &'static str = "OS:Generator:FuelCell:Inverter";

    fn initialize(object: &mut ModelObject<&mut Model, Self>) -> Result<()> {
        object.set_inverter_efficiency_calculation_mode(InverterEfficiencyCalculationMode::Constant)?;
        object.set_inverter_efficiency(1.0)
    }
}

impl GeneratorFuelCellInverter {
    /// Add an inverter whose efficiency is given by a quadratic curve of DC power
    pub fn create_with_curve(
        model: &mut Model,
        curve: Handle,
    ) -> Result<ModelObject<&mut Model, Self>> {
        ensure!(
            model.get::<CurveQuadratic>(curve).is_some(),
            "Inverter efficiency curves must be OS:Curve:Quadratic objects"
        );

        let mut inverter = model.add::<Self>()?;
        inverter.set_efficiency_function_of_dc_power_curve(curve)?;
        inverter.set_inverter_efficiency_calculation_mode(InverterEfficiencyCalculationMode::Quadratic)?;

        Ok(inverter)
    }
}

impl<M: Borrow<Model>> ModelObject<M, GeneratorFuelCellInverter> {
    /// How the inverter's efficiency is determined
    pub fn inverter_efficiency_calculation_mode(&self) -> InverterEfficiencyCalculationMode {
        self.get_choice(INVERTER_EFFICIENCY_CALCULATION_MODE)
            .unwrap_or(InverterEfficiencyCalculationMode::Constant)
    }

    /// The efficiency used in constant mode
    pub fn inverter_efficiency(&self) -> f64 {
        self.get_double_or_default(INVERTER_EFFICIENCY)
            .unwrap_or(1.0)
    }

    /// The curve giving efficiency as a function of DC power
    pub fn efficiency_function_of_dc_power_curve(&self) -> Option<Handle> {
        self.pointer(EFFICIENCY_FUNCTION_OF_DC_POWER_CURVE)
    }
}

impl<M: BorrowMut<Model>> ModelObject<M, GeneratorFuelCellInverter> {
    /// Set how the inverter's efficiency is determined
    pub fn set_inverter_efficiency_calculation_mode(
        &mut self,
        mode: InverterEfficiencyCalculationMode,
    ) -> Result<()> {
        self.set_string(INVERTER_EFFICIENCY_CALCULATION_MODE, &mode.to_string())
    }

    /// Set the efficiency used in constant mode, which must be between 0 and 1
    pub fn set_inverter_efficiency(&mut self, efficiency: f64) -> Result<()> {
        self.set_double(INVERTER_EFFICIENCY, efficiency)
    }

    /// Set the efficiency curve, which must be a quadratic curve
    pub fn set_efficiency_function_of_dc_power_curve(&mut self, curve: Handle) -> Result<()> {
        self.set_pointer(EFFICIENCY_FUNCTION_OF_DC_POWER_CURVE, curve)
    }

    /// Clear the efficiency curve
    pub fn reset_efficiency_function_of_dc_power_curve(&mut self) {
        self.reset(EFFICIENCY_FUNCTION_OF_DC_POWER_CURVE);
    }
}
