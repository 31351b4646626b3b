//! Settings controlling which parts of a simulation are run.
use super::{Model, ModelObject, ModelObjectKind, UniqueModelObjectKind};
use anyhow::Result;
use std::borrow::{Borrow, BorrowMut};
use strum::{Display, EnumIter, EnumString};

const DO_ZONE_SIZING_CALCULATION: usize = 1;
const DO_SYSTEM_SIZING_CALCULATION: usize = 2;
const DO_PLANT_SIZING_CALCULATION: usize = 3;
const RUN_SIMULATION_FOR_SIZING_PERIODS: usize = 4;
const RUN_SIMULATION_FOR_WEATHER_FILE_RUN_PERIODS: usize = 5;
const LOADS_CONVERGENCE_TOLERANCE_VALUE: usize = 6;
const TEMPERATURE_CONVERGENCE_TOLERANCE_VALUE: usize = 7;
const SOLAR_DISTRIBUTION: usize = 8;
const MAXIMUM_NUMBER_OF_WARMUP_DAYS: usize = 9;
const MINIMUM_NUMBER_OF_WARMUP_DAYS: usize = 10;

/// `OS:SimulationControl`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationControl;

impl ModelObjectKind for SimulationControl {
    const IDD_OBJECT_TYPE: &'static str = "OS:SimulationControl";
}

impl UniqueModelObjectKind for SimulationControl {}

/// How solar radiation falling on and entering the building is modelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum SolarDistribution {
    /// No shading by the building itself
    MinimalShadowing,
    /// Exterior shading is calculated; all beam radiation entering falls on the floor
    #[default]
    FullExterior,
    /// As [`SolarDistribution::FullExterior`], but beam radiation is tracked inside zones
    FullInteriorAndExterior,
    /// Full exterior calculation, including reflections from exterior surfaces
    FullExteriorWithReflections,
    /// Full interior and exterior calculation, including reflections from exterior surfaces
    FullInteriorAndExteriorWithReflections,
}

impl<M: Borrow<Model>> ModelObject<M, SimulationControl> {
    /// Whether zone sizing is calculated
    pub fn do_zone_sizing_calculation(&self) -> bool {
        self.get_yes_no(DO_ZONE_SIZING_CALCULATION)
    }

    /// Whether the zone sizing setting has been left at its default
    pub fn is_do_zone_sizing_calculation_defaulted(&self) -> bool {
        self.is_empty(DO_ZONE_SIZING_CALCULATION)
    }

    /// Whether system sizing is calculated
    pub fn do_system_sizing_calculation(&self) -> bool {
        self.get_yes_no(DO_SYSTEM_SIZING_CALCULATION)
    }

    /// Whether the system sizing setting has been left at its default
    pub fn is_do_system_sizing_calculation_defaulted(&self) -> bool {
        self.is_empty(DO_SYSTEM_SIZING_CALCULATION)
    }

    /// Whether plant sizing is calculated
    pub fn do_plant_sizing_calculation(&self) -> bool {
        self.get_yes_no(DO_PLANT_SIZING_CALCULATION)
    }

    /// Whether the plant sizing setting has been left at its default
    pub fn is_do_plant_sizing_calculation_defaulted(&self) -> bool {
        self.is_empty(DO_PLANT_SIZING_CALCULATION)
    }

    /// Whether the design days are simulated
    pub fn run_simulation_for_sizing_periods(&self) -> bool {
        self.get_yes_no(RUN_SIMULATION_FOR_SIZING_PERIODS)
    }

    /// Whether the sizing period setting has been left at its default
    pub fn is_run_simulation_for_sizing_periods_defaulted(&self) -> bool {
        self.is_empty(RUN_SIMULATION_FOR_SIZING_PERIODS)
    }

    /// Whether the weather file run periods are simulated
    pub fn run_simulation_for_weather_file_run_periods(&self) -> bool {
        self.get_yes_no(RUN_SIMULATION_FOR_WEATHER_FILE_RUN_PERIODS)
    }

    /// Whether the run period setting has been left at its default
    pub fn is_run_simulation_for_weather_file_run_periods_defaulted(&self) -> bool {
        self.is_empty(RUN_SIMULATION_FOR_WEATHER_FILE_RUN_PERIODS)
    }

    /// The tolerance for zone loads to converge during warmup, in W
    pub fn loads_convergence_tolerance_value(&self) -> f64 {
        self.get_double_or_default(LOADS_CONVERGENCE_TOLERANCE_VALUE)
            .unwrap_or(0.04)
    }

    /// Whether the loads tolerance has been left at its default
    pub fn is_loads_convergence_tolerance_value_defaulted(&self) -> bool {
        self.is_empty(LOADS_CONVERGENCE_TOLERANCE_VALUE)
    }

    /// The tolerance for zone temperatures to converge during warmup, in degrees C
    pub fn temperature_convergence_tolerance_value(&self) -> f64 {
        self.get_double_or_default(TEMPERATURE_CONVERGENCE_TOLERANCE_VALUE)
            .unwrap_or(0.4)
    }

    /// Whether the temperature tolerance has been left at its default
    pub fn is_temperature_convergence_tolerance_value_defaulted(&self) -> bool {
        self.is_empty(TEMPERATURE_CONVERGENCE_TOLERANCE_VALUE)
    }

    /// How solar radiation is distributed
    pub fn solar_distribution(&self) -> SolarDistribution {
        self.get_choice(SOLAR_DISTRIBUTION).unwrap_or_default()
    }

    /// Whether the solar distribution has been left at its default
    pub fn is_solar_distribution_defaulted(&self) -> bool {
        self.is_empty(SOLAR_DISTRIBUTION)
    }

    /// The most days of warmup before the simulation proper starts
    pub fn maximum_number_of_warmup_days(&self) -> i32 {
        self.get_int_or_default(MAXIMUM_NUMBER_OF_WARMUP_DAYS)
            .unwrap_or(25)
    }

    /// Whether the maximum warmup days have been left at their default
    pub fn is_maximum_number_of_warmup_days_defaulted(&self) -> bool {
        self.is_empty(MAXIMUM_NUMBER_OF_WARMUP_DAYS)
    }

    /// The fewest days of warmup before the simulation proper starts
    pub fn minimum_number_of_warmup_days(&self) -> i32 {
        self.get_int_or_default(MINIMUM_NUMBER_OF_WARMUP_DAYS)
            .unwrap_or(6)
    }

    /// Whether the minimum warmup days have been left at their default
    pub fn is_minimum_number_of_warmup_days_defaulted(&self) -> bool {
        self.is_empty(MINIMUM_NUMBER_OF_WARMUP_DAYS)
    }
}

impl<M: BorrowMut<Model>> ModelObject<M, SimulationControl> {
    /// Set whether zone sizing is calculated
    pub fn set_do_zone_sizing_calculation(&mut self, value: bool) -> Result<()> {
        self.set_yes_no(DO_ZONE_SIZING_CALCULATION, value)
    }

    /// Return the zone sizing setting to its default
    pub fn reset_do_zone_sizing_calculation(&mut self) {
        self.reset(DO_ZONE_SIZING_CALCULATION);
    }

    /// Set whether system sizing is calculated
    pub fn set_do_system_sizing_calculation(&mut self, value: bool) -> Result<()> {
        self.set_yes_no(DO_SYSTEM_SIZING_CALCULATION, value)
    }

    /// Return the system sizing setting to its default
    pub fn reset_do_system_sizing_calculation(&mut self) {
        self.reset(DO_SYSTEM_SIZING_CALCULATION);
    }

    /// Set whether plant sizing is calculated
    pub fn set_do_plant_sizing_calculation(&mut self, value: bool) -> Result<()> {
        self.set_yes_no(DO_PLANT_SIZING_CALCULATION, value)
    }

    /// Return the plant sizing setting to its default
    pub fn reset_do_plant_sizing_calculation(&mut self) {
        self.reset(DO_PLANT_SIZING_CALCULATION);
    }

    /// Set whether the design days are simulated
    pub fn set_run_simulation_for_sizing_periods(&mut self, value: bool) -> Result<()> {
        self.set_yes_no(RUN_SIMULATION_FOR_SIZING_PERIODS, value)
    }

    /// Return the sizing period setting to its default
    pub fn reset_run_simulation_for_sizing_periods(&mut self) {
        self.reset(RUN_SIMULATION_FOR_SIZING_PERIODS);
    }

    /// Set whether the weather file run periods are simulated
    pub fn set_run_simulation_for_weather_file_run_periods(&mut self, value: bool) -> Result<()> {
        self.set_yes_no(RUN_SIMULATION_FOR_WEATHER_FILE_RUN_PERIODS, value)
    }

    /// Return the run period setting to its default
    pub fn reset_run_simulation_for_weather_file_run_periods(&mut self) {
        self.reset(RUN_SIMULATION_FOR_WEATHER_FILE_RUN_PERIODS);
    }

    /// Set the loads convergence tolerance, which must be in (0, 0.5]
    pub fn set_loads_convergence_tolerance_value(&mut self, value: f64) -> Result<()> {
        self.set_double(LOADS_CONVERGENCE_TOLERANCE_VALUE, value)
    }

    /// Return the loads tolerance to its default
    pub fn reset_loads_convergence_tolerance_value(&mut self) {
        self.reset(LOADS_CONVERGENCE_TOLERANCE_VALUE);
    }

    /// Set the temperature convergence tolerance, which must be in (0, 0.5]
    pub fn set_temperature_convergence_tolerance_value(&mut self, value: f64) -> Result<()> {
        self.set_double(TEMPERATURE_CONVERGENCE_TOLERANCE_VALUE, value)
    }

    /// Return the temperature tolerance to its default
    pub fn reset_temperature_convergence_tolerance_value(&mut self) {
        self.reset(TEMPERATURE_CONVERGENCE_TOLERANCE_VALUE);
    }

    /// Set how solar radiation is distributed
    pub fn set_solar_distribution(&mut self, value: SolarDistribution) -> Result<()> {
        self.set_string(SOLAR_DISTRIBUTION, &value.to_string())
    }

    /// Return the solar distribution to its default
    pub fn reset_solar_distribution(&mut self) {
        self.reset(SOLAR_DISTRIBUTION);
    }

    /// Set the most warmup days, which must be positive
    pub fn set_maximum_number_of_warmup_days(&mut self, value: i32) -> Result<()> {
        self.set_int(MAXIMUM_NUMBER_OF_WARMUP_DAYS, value)
    }

    /// Return the maximum warmup days to their default
    pub fn reset_maximum_number_of_warmup_days(&mut self) {
        self.reset(MAXIMUM_NUMBER_OF_WARMUP_DAYS);
    }

    /// Set the fewest warmup days, which must be positive
    pub fn set_minimum_number_of_warmup_days(&mut self, value: i32) -> Result<()> {
        self.set_int(MINIMUM_NUMBER_OF_WARMUP_DAYS, value)
    }

    /// Return the minimum warmup days to their default
    pub fn reset_minimum_number_of_warmup_days(&mut self) {
        self.reset(MINIMUM_NUMBER_OF_WARMUP_DAYS);
    }
}
