//! The air supply subsystem of a fuel cell generator.
use super::{CurveCubic, CurveQuadratic, Model, ModelObject, ModelObjectKind};
use crate::handle::Handle;
use anyhow::{Context, Result, ensure};
use log::warn;
use std::borrow::{Borrow, BorrowMut};
use strum::{Display, EnumIter, EnumString};

const AIR_INLET_NODE_NAME: usize = 2;
const BLOWER_POWER_CURVE: usize = 3;
const BLOWER_HEAT_LOSS_FACTOR: usize = 4;
const AIR_SUPPLY_RATE_CALCULATION_MODE: usize = 5;
const STOICHIOMETRIC_RATIO: usize = 6;
const AIR_RATE_FUNCTION_OF_ELECTRIC_POWER_CURVE: usize = 7;
const AIR_RATE_AIR_TEMPERATURE_COEFFICIENT: usize = 8;
const AIR_RATE_FUNCTION_OF_FUEL_RATE_CURVE: usize = 9;
const AIR_INTAKE_HEAT_RECOVERY_MODE: usize = 10;
const AIR_SUPPLY_CONSTITUENT_MODE: usize = 11;

/// The most constituents an air supply can have
pub const MAX_CONSTITUENTS: usize = 5;

/// `OS:Generator:FuelCell:AirSupply`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorFuelCellAirSupply;

/// How the rate of air supply is calculated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AirSupplyRateCalculationMode {
    /// From the stoichiometric ratio
    #[default]
    AirRatiobyStoics,
    /// From a quadratic curve of electric power
    QuadraticFunctionofElectricPower,
    /// From a quadratic curve of fuel rate
    QuadraticFunctionofFuelRate,
}

/// Where heat recovered by the intake air comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AirIntakeHeatRecoveryMode {
    /// No heat is recovered
    #[default]
    NoRecovery,
    /// Heat lost by the burner, inverter and storage
    RecoverBurnerInverterStorage,
    /// Heat lost by the auxiliary blower
    RecoverAuxiliaryBlower,
    /// Heat lost by the inverter and storage
    RecoverInverterandStorage,
    /// Heat lost by the inverter
    RecoverInverter,
    /// Heat lost by the battery
    RecoverBattery,
}

/// How the composition of the supply air is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AirSupplyConstituentMode {
    /// Standard ambient air
    #[default]
    AmbientAir,
    /// The constituents listed on the object
    UserDefinedConstituents,
}

/// A gas which may make up the supply air
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ConstituentName {
    /// Carbon dioxide
    CarbonDioxide,
    /// Nitrogen
    Nitrogen,
    /// Oxygen
    Oxygen,
    /// Water vapour
    Water,
    /// Argon
    Argon,
}

/// One constituent of the supply air
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirSupplyConstituent {
    /// The gas
    pub name: ConstituentName,
    /// The gas's share of the air, by moles
    pub molar_fraction: f64,
}

impl ModelObjectKind for GeneratorFuelCellAirSupply {
    const IDD_OBJECT_TYPE: &'static str = "OS:Generator:FuelCell:AirSupply";

    fn initialize(object: &mut ModelObject<&mut Model, Self>) -> Result<()> {
        object.set_blower_heat_loss_factor(1.0)?;
        object.set_air_supply_rate_calculation_mode(AirSupplyRateCalculationMode::AirRatiobyStoics)?;
        object.set_stoichiometric_ratio(1.0)?;
        object.set_air_rate_air_temperature_coefficient(0.00283)?;
        object.set_air_intake_heat_recovery_mode(AirIntakeHeatRecoveryMode::NoRecovery)?;
        object.set_air_supply_constituent_mode(AirSupplyConstituentMode::AmbientAir)
    }
}

impl<M: Borrow<Model>> ModelObject<M, GeneratorFuelCellAirSupply> {
    /// The node air is drawn from
    pub fn air_inlet_node_name(&self) -> Option<&str> {
        self.get_string(AIR_INLET_NODE_NAME)
    }

    /// The cubic curve giving blower power
    pub fn blower_power_curve(&self) -> Option<Handle> {
        self.pointer(BLOWER_POWER_CURVE)
    }

    /// The share of blower power lost as heat to the air
    pub fn blower_heat_loss_factor(&self) -> f64 {
        self.get_double_or_default(BLOWER_HEAT_LOSS_FACTOR)
            .unwrap_or(1.0)
    }

    /// How the rate of air supply is calculated
    pub fn air_supply_rate_calculation_mode(&self) -> AirSupplyRateCalculationMode {
        self.get_choice(AIR_SUPPLY_RATE_CALCULATION_MODE)
            .unwrap_or_default()
    }

    /// The ratio of supplied air to the air needed to burn the fuel
    pub fn stoichiometric_ratio(&self) -> f64 {
        self.get_double_or_default(STOICHIOMETRIC_RATIO)
            .unwrap_or(1.0)
    }

    /// The quadratic curve of electric power giving the air rate
    pub fn air_rate_function_of_electric_power_curve(&self) -> Option<Handle> {
        self.pointer(AIR_RATE_FUNCTION_OF_ELECTRIC_POWER_CURVE)
    }

    /// The air rate's coefficient on air temperature
    pub fn air_rate_air_temperature_coefficient(&self) -> f64 {
        self.get_double_or_default(AIR_RATE_AIR_TEMPERATURE_COEFFICIENT)
            .unwrap_or(0.00283)
    }

    /// The quadratic curve of fuel rate giving the air rate
    pub fn air_rate_function_of_fuel_rate_curve(&self) -> Option<Handle> {
        self.pointer(AIR_RATE_FUNCTION_OF_FUEL_RATE_CURVE)
    }

    /// Where heat recovered by the intake air comes from
    pub fn air_intake_heat_recovery_mode(&self) -> AirIntakeHeatRecoveryMode {
        self.get_choice(AIR_INTAKE_HEAT_RECOVERY_MODE)
            .unwrap_or_default()
    }

    /// How the composition of the supply air is given
    pub fn air_supply_constituent_mode(&self) -> AirSupplyConstituentMode {
        self.get_choice(AIR_SUPPLY_CONSTITUENT_MODE)
            .unwrap_or_default()
    }

    /// The user-defined constituents, in the order they were added
    pub fn constituents(&self) -> Vec<AirSupplyConstituent> {
        let object = self.idf_object();
        (0..object.num_extensible_groups())
            .filter_map(|group| {
                let values = object.extensible_group(group)?;
                Some(AirSupplyConstituent {
                    name: values[0].parse().ok()?,
                    molar_fraction: values[1].parse().unwrap_or_default(),
                })
            })
            .collect()
    }

    /// The number of user-defined constituents, not counting groups which do not name a gas
    pub fn number_of_user_defined_constituents(&self) -> usize {
        self.constituents().len()
    }

    /// The sum of the constituents' molar fractions, which should be 1
    pub fn sum_of_constituents_molar_fractions(&self) -> f64 {
        self.constituents()
            .iter()
            .map(|constituent| constituent.molar_fraction)
            .sum()
    }
}

impl<M: BorrowMut<Model>> ModelObject<M, GeneratorFuelCellAirSupply> {
    /// Set the node air is drawn from
    pub fn set_air_inlet_node_name(&mut self, node: &str) -> Result<()> {
        self.set_string(AIR_INLET_NODE_NAME, node)
    }

    /// Clear the air inlet node
    pub fn reset_air_inlet_node_name(&mut self) {
        self.reset(AIR_INLET_NODE_NAME);
    }

    /// Set the blower power curve, which must be a cubic curve
    pub fn set_blower_power_curve(&mut self, curve: Handle) -> Result<()> {
        ensure!(
            self.model().get::<CurveCubic>(curve).is_some(),
            "Blower power curves must be OS:Curve:Cubic objects"
        );
        self.set_pointer(BLOWER_POWER_CURVE, curve)
    }

    /// Clear the blower power curve
    pub fn reset_blower_power_curve(&mut self) {
        self.reset(BLOWER_POWER_CURVE);
    }

    /// Set the blower heat loss factor, which must be between 0 and 1
    pub fn set_blower_heat_loss_factor(&mut self, factor: f64) -> Result<()> {
        self.set_double(BLOWER_HEAT_LOSS_FACTOR, factor)
    }

    /// Set how the rate of air supply is calculated
    pub fn set_air_supply_rate_calculation_mode(
        &mut self,
        mode: AirSupplyRateCalculationMode,
    ) -> Result<()> {
        self.set_string(AIR_SUPPLY_RATE_CALCULATION_MODE, &mode.to_string())
    }

    /// Set the stoichiometric ratio, which cannot be negative
    pub fn set_stoichiometric_ratio(&mut self, ratio: f64) -> Result<()> {
        self.set_double(STOICHIOMETRIC_RATIO, ratio)
    }

    fn set_quadratic_curve(&mut self, index: usize, curve: Handle) -> Result<()> {
        ensure!(
            self.model().get::<CurveQuadratic>(curve).is_some(),
            "Air rate curves must be OS:Curve:Quadratic objects"
        );
        self.set_pointer(index, curve)
    }

    /// Set the quadratic curve of electric power used for the air rate
    pub fn set_air_rate_function_of_electric_power_curve(&mut self, curve: Handle) -> Result<()> {
        self.set_quadratic_curve(AIR_RATE_FUNCTION_OF_ELECTRIC_POWER_CURVE, curve)
    }

    /// Clear the electric power air rate curve
    pub fn reset_air_rate_function_of_electric_power_curve(&mut self) {
        self.reset(AIR_RATE_FUNCTION_OF_ELECTRIC_POWER_CURVE);
    }

    /// Set the air rate's coefficient on air temperature
    pub fn set_air_rate_air_temperature_coefficient(&mut self, coefficient: f64) -> Result<()> {
        self.set_double(AIR_RATE_AIR_TEMPERATURE_COEFFICIENT, coefficient)
    }

    /// Set the quadratic curve of fuel rate used for the air rate
    pub fn set_air_rate_function_of_fuel_rate_curve(&mut self, curve: Handle) -> Result<()> {
        self.set_quadratic_curve(AIR_RATE_FUNCTION_OF_FUEL_RATE_CURVE, curve)
    }

    /// Clear the fuel rate air rate curve
    pub fn reset_air_rate_function_of_fuel_rate_curve(&mut self) {
        self.reset(AIR_RATE_FUNCTION_OF_FUEL_RATE_CURVE);
    }

    /// Set where heat recovered by the intake air comes from
    pub fn set_air_intake_heat_recovery_mode(
        &mut self,
        mode: AirIntakeHeatRecoveryMode,
    ) -> Result<()> {
        self.set_string(AIR_INTAKE_HEAT_RECOVERY_MODE, &mode.to_string())
    }

    /// Set how the composition of the supply air is given
    pub fn set_air_supply_constituent_mode(
        &mut self,
        mode: AirSupplyConstituentMode,
    ) -> Result<()> {
        self.set_string(AIR_SUPPLY_CONSTITUENT_MODE, &mode.to_string())
    }

    /// Add a constituent to the supply air.
    ///
    /// The constituent mode becomes [`AirSupplyConstituentMode::UserDefinedConstituents`]. A
    /// warning is logged if the molar fractions then add up to more than 1.
    ///
    /// # Arguments
    ///
    /// * `name` - The gas, one of `CarbonDioxide`, `Nitrogen`, `Oxygen`, `Water` or `Argon`
    /// * `molar_fraction` - The gas's share of the air, between 0 and 1
    pub fn add_constituent(&mut self, name: &str, molar_fraction: f64) -> Result<()> {
        let name: ConstituentName = name
            .parse()
            .with_context(|| format!("Unknown air supply constituent: {name}"))?;
        let constituents = self.view().constituents();
        ensure!(
            constituents.iter().all(|constituent| constituent.name != name),
            "Constituent {name} has already been added"
        );
        ensure!(
            constituents.len() < MAX_CONSTITUENTS,
            "An air supply cannot have more than {MAX_CONSTITUENTS} constituents"
        );

        self.push_extensible_group(&[&name.to_string(), &molar_fraction.to_string()])?;
        self.set_air_supply_constituent_mode(AirSupplyConstituentMode::UserDefinedConstituents)?;

        let sum = self.view().sum_of_constituents_molar_fractions();
        if sum > 1.0 {
            warn!(
                "Molar fractions of {} sum to {sum}, which is more than 1",
                self.name().unwrap_or_default()
            );
        }

        Ok(())
    }

    /// Remove a constituent
    pub fn remove_constituent(&mut self, name: &str) -> Result<()> {
        let name: ConstituentName = name
            .parse()
            .with_context(|| format!("Unknown air supply constituent: {name}"))?;
        // Search the stored groups, which may include ones without a valid gas
        let object = self.idf_object();
        let group = (0..object.num_extensible_groups())
            .find(|&group| {
                object
                    .extensible_group(group)
                    .is_some_and(|values| values[0].parse().ok() == Some(name))
            })
            .with_context(|| format!("Constituent {name} is not present"))?;

        self.erase_extensible_group(group)
    }

    /// Remove every constituent
    pub fn remove_all_constituents(&mut self) {
        self.clear_extensible_groups();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model};
    use crate::idd::IddFileType;
    use crate::idf::IdfFile;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_defaults(mut model: Model) {
        let air_supply = model.add::<GeneratorFuelCellAirSupply>().unwrap();
        assert_approx_eq!(f64, air_supply.blower_heat_loss_factor(), 1.0);
        assert_eq!(
            air_supply.air_supply_rate_calculation_mode(),
            AirSupplyRateCalculationMode::AirRatiobyStoics
        );
        assert_approx_eq!(f64, air_supply.stoichiometric_ratio(), 1.0);
        assert_approx_eq!(f64, air_supply.air_rate_air_temperature_coefficient(), 0.00283);
        assert_eq!(
            air_supply.air_intake_heat_recovery_mode(),
            AirIntakeHeatRecoveryMode::NoRecovery
        );
        assert_eq!(
            air_supply.air_supply_constituent_mode(),
            AirSupplyConstituentMode::AmbientAir
        );
        assert_eq!(air_supply.number_of_user_defined_constituents(), 0);
        assert_eq!(air_supply.blower_power_curve(), None);
    }

    #[rstest]
    fn test_add_constituents(mut model: Model) {
        let mut air_supply = model.add::<GeneratorFuelCellAirSupply>().unwrap();
        air_supply.add_constituent("Nitrogen", 0.7728).unwrap();
        assert_eq!(
            air_supply.air_supply_constituent_mode(),
            AirSupplyConstituentMode::UserDefinedConstituents
        );
        air_supply.add_constituent("oxygen", 0.2073).unwrap();
        air_supply.add_constituent("Water", 0.0104).unwrap();
        air_supply.add_constituent("Argon", 0.0092).unwrap();
        air_supply.add_constituent("CarbonDioxide", 0.0003).unwrap();

        let air_supply = air_supply.view();
        assert_eq!(air_supply.number_of_user_defined_constituents(), 5);
        assert_approx_eq!(
            f64,
            air_supply.sum_of_constituents_molar_fractions(),
            1.0,
            epsilon = 1e-9
        );
        assert_eq!(
            air_supply.constituents()[1],
            AirSupplyConstituent {
                name: ConstituentName::Oxygen,
                molar_fraction: 0.2073
            }
        );
    }

    #[rstest]
    fn test_add_constituent_errors(mut model: Model) {
        let mut air_supply = model.add::<GeneratorFuelCellAirSupply>().unwrap();
        assert_error!(
            air_supply.add_constituent("Neon", 0.1),
            "Unknown air supply constituent: Neon"
        );
        air_supply.add_constituent("Nitrogen", 0.5).unwrap();
        assert_error!(
            air_supply.add_constituent("NITROGEN", 0.1),
            "Constituent Nitrogen has already been added"
        );
        assert!(air_supply.add_constituent("Oxygen", 1.5).is_err());
        assert_eq!(air_supply.view().number_of_user_defined_constituents(), 1);
    }

    #[rstest]
    fn test_sum_above_one_is_allowed(mut model: Model) {
        let mut air_supply = model.add::<GeneratorFuelCellAirSupply>().unwrap();
        air_supply.add_constituent("Nitrogen", 0.9).unwrap();
        air_supply.add_constituent("Oxygen", 0.9).unwrap();
        assert_approx_eq!(f64, air_supply.view().sum_of_constituents_molar_fractions(), 1.8);
    }

    #[rstest]
    fn test_remove_constituents(mut model: Model) {
        let mut air_supply = model.add::<GeneratorFuelCellAirSupply>().unwrap();
        air_supply.add_constituent("Nitrogen", 0.79).unwrap();
        air_supply.add_constituent("Oxygen", 0.21).unwrap();

        air_supply.remove_constituent("nitrogen").unwrap();
        let constituents = air_supply.view().constituents();
        assert_eq!(constituents.len(), 1);
        assert_eq!(constituents[0].name, ConstituentName::Oxygen);
        assert_error!(
            air_supply.remove_constituent("Argon"),
            "Constituent Argon is not present"
        );

        air_supply.remove_all_constituents();
        assert_eq!(air_supply.view().number_of_user_defined_constituents(), 0);
        assert_approx_eq!(f64, air_supply.view().sum_of_constituents_molar_fractions(), 0.0);
    }

    #[test]
    fn test_remove_constituent_after_blank_group() {
        let text = "OS:Generator:FuelCell:AirSupply,,Air Supply,,,1,AirRatiobyStoics,1,,0.00283,,\
                    NoRecovery,UserDefinedConstituents,,0.1,Oxygen,0.2,Nitrogen,0.7;";
        let file = IdfFile::parse(text, IddFileType::OpenStudio).unwrap();
        let mut model = Model::from_idf_file(file).unwrap();
        let handle = model.handles_of_kind::<GeneratorFuelCellAirSupply>()[0];
        let mut air_supply = model.get_mut::<GeneratorFuelCellAirSupply>(handle).unwrap();
        assert_eq!(air_supply.view().number_of_user_defined_constituents(), 2);

        air_supply.remove_constituent("OXYGEN").unwrap();
        let constituents = air_supply.view().constituents();
        assert_eq!(constituents.len(), 1);
        assert_eq!(constituents[0].name, ConstituentName::Nitrogen);
        assert_approx_eq!(f64, constituents[0].molar_fraction, 0.7);
        assert_eq!(air_supply.idf_object().extensible_group(0).unwrap(), ["", "0.1"]);
    }

    #[rstest]
    fn test_curves(mut model: Model) {
        let quadratic = model.add::<CurveQuadratic>().unwrap().handle();
        let cubic = model.add::<CurveCubic>().unwrap().handle();
        let mut air_supply = model.add::<GeneratorFuelCellAirSupply>().unwrap();

        air_supply.set_blower_power_curve(cubic).unwrap();
        assert!(air_supply.set_blower_power_curve(quadratic).is_err());
        air_supply
            .set_air_rate_function_of_electric_power_curve(quadratic)
            .unwrap();
        assert_error!(
            air_supply.set_air_rate_function_of_fuel_rate_curve(cubic),
            "Air rate curves must be OS:Curve:Quadratic objects"
        );

        assert_eq!(air_supply.view().blower_power_curve(), Some(cubic));
        assert_eq!(
            air_supply.view().air_rate_function_of_electric_power_curve(),
            Some(quadratic)
        );
        assert_eq!(air_supply.view().air_rate_function_of_fuel_rate_curve(), None);
    }
}
