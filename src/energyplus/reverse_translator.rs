//! Translation of EnergyPlus input files into OpenStudio models.
use super::TranslatorMessage;
use crate::handle::Handle;
use crate::idd::IddFileType;
use crate::idf::{IdfFile, IdfObject};
use crate::model::{
    AirSupplyConstituentMode, AirSupplyRateCalculationMode, AirIntakeHeatRecoveryMode,
    AirflowNetworkConstantPressureDrop, Building, CurveCubic, CurveQuadratic,
    GeneratorFuelCellAirSupply, GeneratorFuelCellInverter, InverterEfficiencyCalculationMode,
    MeterCustom, MeterFuelType, Model, SimulationControl, SolarDistribution,
};
use anyhow::{Result, ensure};
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use unicase::UniCase;

type ObjectKey = (UniCase<String>, UniCase<String>);

/// Translates an EnergyPlus [`IdfFile`] into a [`Model`].
///
/// Objects referred to by name are translated first, so that the referring object can point at
/// them by handle. Values which cannot be carried into the model are recorded in
/// [`ReverseTranslator::errors`] and the rest of the file is still translated.
#[derive(Debug, Default)]
pub struct ReverseTranslator {
    /// Translated objects, by position in the file
    map: HashMap<usize, Option<Handle>>,
    /// Type and name of every named object translated so far
    names: HashSet<ObjectKey>,
    warnings: Vec<TranslatorMessage>,
    errors: Vec<TranslatorMessage>,
}

fn key(object: &IdfObject) -> ObjectKey {
    (
        UniCase::new(object.object_type().to_string()),
        UniCase::new(object.name().unwrap_or_default().to_string()),
    )
}

fn yes_no(object: &IdfObject, index: usize) -> Option<bool> {
    object
        .get_string(index)
        .map(|value| value.eq_ignore_ascii_case("Yes"))
}

impl ReverseTranslator {
    /// Create a translator
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings raised by the last translation
    pub fn warnings(&self) -> &[TranslatorMessage] {
        &self.warnings
    }

    /// Errors raised by the last translation
    pub fn errors(&self) -> &[TranslatorMessage] {
        &self.errors
    }

    /// Translate an EnergyPlus file
    pub fn translate_idf(&mut self, file: &IdfFile) -> Result<Model> {
        ensure!(
            file.idd_file_type() == IddFileType::EnergyPlus,
            "Reverse translation requires a file using the EnergyPlus IDD"
        );
        *self = Self::new();

        let mut model = Model::new();
        for index in 0..file.objects().len() {
            self.translate_and_map(file, &mut model, index);
        }

        info!(
            "Translated {} EnergyPlus objects into {} model objects",
            file.objects().len(),
            model.len()
        );

        Ok(model)
    }

    /// Translate the object at `index` in the file, unless it has been translated already
    fn translate_and_map(
        &mut self,
        file: &IdfFile,
        model: &mut Model,
        index: usize,
    ) -> Option<Handle> {
        if let Some(handle) = self.map.get(&index) {
            return *handle;
        }

        let object = &file.objects()[index];
        if let Some(name) = object.name()
            && !self.names.insert(key(object))
        {
            self.warn(
                object,
                format!(
                    "Another {} object is also named '{name}'; references to the name use the \
                     first",
                    object.object_type()
                ),
            );
        }

        let result = match object.object_type() {
            "Version" => {
                debug!(
                    "EnergyPlus version {:?} is not carried into the model",
                    object.get_string(0)
                );
                Ok(None)
            }
            "SimulationControl" => self.translate_simulation_control(model, object).map(Some),
            "Building" => self.translate_building(model, object).map(Some),
            "Curve:Quadratic" => self.translate_curve_quadratic(model, object).map(Some),
            "Curve:Cubic" => self.translate_curve_cubic(model, object).map(Some),
            "Generator:FuelCell:Inverter" => {
                self.translate_inverter(file, model, object).map(Some)
            }
            "Generator:FuelCell:AirSupply" => {
                self.translate_air_supply(file, model, object).map(Some)
            }
            "AirflowNetwork:Distribution:Component:ConstantPressureDrop" => {
                self.translate_constant_pressure_drop(model, object).map(Some)
            }
            "Meter:Custom" => self.translate_meter_custom(model, object).map(Some),
            other => {
                let message = format!("Objects of type {other} are not supported and were skipped");
                self.warn(object, message);
                Ok(None)
            }
        };

        let handle = result.unwrap_or_else(|err| {
            self.error(object, format!("Object could not be translated: {err:#}"));
            None
        });
        self.map.insert(index, handle);

        handle
    }

    /// Find the object a name field refers to among objects of `object_type`, translating it if
    /// needed
    fn resolve(
        &mut self,
        file: &IdfFile,
        model: &mut Model,
        referrer: &IdfObject,
        index: usize,
        object_type: &str,
    ) -> Option<Handle> {
        let name = referrer.get_string(index)?;
        let target = file.objects().iter().position(|object| {
            object.object_type().eq_ignore_ascii_case(object_type)
                && object
                    .name()
                    .is_some_and(|other| UniCase::new(other) == UniCase::new(name))
        });

        match target {
            Some(target) => self.translate_and_map(file, model, target),
            None => {
                self.error(referrer, format!("Cannot find {object_type} '{name}'"));
                None
            }
        }
    }

    fn warn(&mut self, object: &IdfObject, message: String) {
        let message = TranslatorMessage::new(object, message);
        warn!("{message}");
        self.warnings.push(message);
    }

    fn error(&mut self, object: &IdfObject, message: String) {
        let message = TranslatorMessage::new(object, message);
        error!("{message}");
        self.errors.push(message);
    }

    /// Record a field which could not be set, leaving the rest of the object as it is
    fn check<T>(&mut self, object: &IdfObject, result: Result<T>) {
        if let Err(err) = result {
            self.error(object, format!("{err:#}"));
        }
    }

    /// Read a choice field, recording an error if the value is not one of the choices
    fn choice<T: FromStr>(&mut self, object: &IdfObject, index: usize) -> Option<T> {
        let value = object.get_string(index)?;
        if let Ok(choice) = value.parse() {
            return Some(choice);
        }

        let field = object
            .idd_object()
            .field(index)
            .map_or("field", |field| field.name.as_str());
        self.error(object, format!("'{value}' is not a valid choice for {field}"));
        None
    }

    fn translate_simulation_control(
        &mut self,
        model: &mut Model,
        object: &IdfObject,
    ) -> Result<Handle> {
        let mut simulation_control = model.unique::<SimulationControl>()?;
        if let Some(value) = yes_no(object, 0) {
            self.check(object, simulation_control.set_do_zone_sizing_calculation(value));
        }
        if let Some(value) = yes_no(object, 1) {
            self.check(object, simulation_control.set_do_system_sizing_calculation(value));
        }
        if let Some(value) = yes_no(object, 2) {
            self.check(object, simulation_control.set_do_plant_sizing_calculation(value));
        }
        if let Some(value) = yes_no(object, 3) {
            self.check(object, simulation_control.set_run_simulation_for_sizing_periods(value));
        }
        if let Some(value) = yes_no(object, 4) {
            self.check(
                object,
                simulation_control.set_run_simulation_for_weather_file_run_periods(value),
            );
        }

        Ok(simulation_control.handle())
    }

    fn translate_building(&mut self, model: &mut Model, object: &IdfObject) -> Result<Handle> {
        let mut building = model.unique::<Building>()?;
        if let Some(name) = object.name() {
            self.check(object, building.set_name(name));
        }
        if let Some(north_axis) = object.get_double(1) {
            self.check(object, building.set_north_axis(north_axis));
        }
        let handle = building.handle();

        let mut simulation_control = model.unique::<SimulationControl>()?;
        if let Some(value) = object.get_double(3) {
            self.check(object, simulation_control.set_loads_convergence_tolerance_value(value));
        }
        if let Some(value) = object.get_double(4) {
            self.check(
                object,
                simulation_control.set_temperature_convergence_tolerance_value(value),
            );
        }
        if let Some(value) = self.choice::<SolarDistribution>(object, 5) {
            self.check(object, simulation_control.set_solar_distribution(value));
        }
        if let Some(value) = object.get_int(6) {
            self.check(object, simulation_control.set_maximum_number_of_warmup_days(value));
        }
        if let Some(value) = object.get_int(7) {
            self.check(object, simulation_control.set_minimum_number_of_warmup_days(value));
        }

        Ok(handle)
    }

    fn translate_curve_quadratic(
        &mut self,
        model: &mut Model,
        object: &IdfObject,
    ) -> Result<Handle> {
        let coefficient = |index| object.get_double(index).unwrap_or_default();
        let mut curve = model.add::<CurveQuadratic>()?;
        if let Some(name) = object.name() {
            self.check(object, curve.set_name(name));
        }
        self.check(object, curve.set_coefficient1_constant(coefficient(1)));
        self.check(object, curve.set_coefficient2_x(coefficient(2)));
        self.check(object, curve.set_coefficient3_x_pow2(coefficient(3)));
        if let Some(value) = object.get_double(4) {
            self.check(object, curve.set_minimum_value_of_x(value));
        }
        if let Some(value) = object.get_double(5) {
            self.check(object, curve.set_maximum_value_of_x(value));
        }
        if let Some(value) = object.get_double(6) {
            self.check(object, curve.set_minimum_curve_output(value));
        }
        if let Some(value) = object.get_double(7) {
            self.check(object, curve.set_maximum_curve_output(value));
        }

        Ok(curve.handle())
    }

    fn translate_curve_cubic(&mut self, model: &mut Model, object: &IdfObject) -> Result<Handle> {
        let coefficient = |index| object.get_double(index).unwrap_or_default();
        let mut curve = model.add::<CurveCubic>()?;
        if let Some(name) = object.name() {
            self.check(object, curve.set_name(name));
        }
        self.check(object, curve.set_coefficient1_constant(coefficient(1)));
        self.check(object, curve.set_coefficient2_x(coefficient(2)));
        self.check(object, curve.set_coefficient3_x_pow2(coefficient(3)));
        self.check(object, curve.set_coefficient4_x_pow3(coefficient(4)));
        if let Some(value) = object.get_double(5) {
            self.check(object, curve.set_minimum_value_of_x(value));
        }
        if let Some(value) = object.get_double(6) {
            self.check(object, curve.set_maximum_value_of_x(value));
        }
        if let Some(value) = object.get_double(7) {
            self.check(object, curve.set_minimum_curve_output(value));
        }
        if let Some(value) = object.get_double(8) {
            self.check(object, curve.set_maximum_curve_output(value));
        }

        Ok(curve.handle())
    }

    fn translate_inverter(
        &mut self,
        file: &IdfFile,
        model: &mut Model,
        object: &IdfObject,
    ) -> Result<Handle> {
        let curve = self.resolve(file, model, object, 3, "Curve:Quadratic");

        let mut inverter = model.add::<GeneratorFuelCellInverter>()?;
        if let Some(name) = object.name() {
            self.check(object, inverter.set_name(name));
        }
        if let Some(mode) = self.choice::<InverterEfficiencyCalculationMode>(object, 1) {
            self.check(object, inverter.set_inverter_efficiency_calculation_mode(mode));
        }
        if let Some(efficiency) = object.get_double(2) {
            self.check(object, inverter.set_inverter_efficiency(efficiency));
        }
        if let Some(curve) = curve {
            self.check(object, inverter.set_efficiency_function_of_dc_power_curve(curve));
        }

        Ok(inverter.handle())
    }

    fn translate_air_supply(
        &mut self,
        file: &IdfFile,
        model: &mut Model,
        object: &IdfObject,
    ) -> Result<Handle> {
        let blower_curve = self.resolve(file, model, object, 2, "Curve:Cubic");
        let electric_power_curve = self.resolve(file, model, object, 6, "Curve:Quadratic");
        let fuel_rate_curve = self.resolve(file, model, object, 8, "Curve:Quadratic");

        let mut air_supply = model.add::<GeneratorFuelCellAirSupply>()?;
        if let Some(name) = object.name() {
            self.check(object, air_supply.set_name(name));
        }
        if let Some(node) = object.get_string(1) {
            self.check(object, air_supply.set_air_inlet_node_name(node));
        }
        if let Some(curve) = blower_curve {
            self.check(object, air_supply.set_blower_power_curve(curve));
        }
        if let Some(value) = object.get_double(3) {
            self.check(object, air_supply.set_blower_heat_loss_factor(value));
        }
        if let Some(mode) = self.choice::<AirSupplyRateCalculationMode>(object, 4) {
            self.check(object, air_supply.set_air_supply_rate_calculation_mode(mode));
        }
        if let Some(value) = object.get_double(5) {
            self.check(object, air_supply.set_stoichiometric_ratio(value));
        }
        if let Some(curve) = electric_power_curve {
            self.check(object, air_supply.set_air_rate_function_of_electric_power_curve(curve));
        }
        if let Some(value) = object.get_double(7) {
            self.check(object, air_supply.set_air_rate_air_temperature_coefficient(value));
        }
        if let Some(curve) = fuel_rate_curve {
            self.check(object, air_supply.set_air_rate_function_of_fuel_rate_curve(curve));
        }
        if let Some(mode) = self.choice::<AirIntakeHeatRecoveryMode>(object, 9) {
            self.check(object, air_supply.set_air_intake_heat_recovery_mode(mode));
        }

        let declared = object.get_int(11).unwrap_or_default();
        let listed = object.num_extensible_groups();
        if usize::try_from(declared).ok() != Some(listed) {
            self.warn(
                object,
                format!(
                    "Number of UserDefined Constituents is {declared} but {listed} constituents \
                     are listed; every listed constituent was read"
                ),
            );
        }
        for group in 0..listed {
            let Some(values) = object.extensible_group(group) else {
                continue;
            };
            let name = values.first().copied().unwrap_or_default();
            let fraction = values.get(1).copied().unwrap_or_default();
            match fraction.parse::<f64>() {
                Ok(fraction) => self.check(object, air_supply.add_constituent(name, fraction)),
                Err(_) => self.error(
                    object,
                    format!("Molar fraction '{fraction}' of constituent '{name}' is not a number"),
                ),
            }
        }

        // Read after the constituents, which switch the mode
        if let Some(mode) = self.choice::<AirSupplyConstituentMode>(object, 10) {
            self.check(object, air_supply.set_air_supply_constituent_mode(mode));
        }

        Ok(air_supply.handle())
    }

    fn translate_constant_pressure_drop(
        &mut self,
        model: &mut Model,
        object: &IdfObject,
    ) -> Result<Handle> {
        let mut component = model.add::<AirflowNetworkConstantPressureDrop>()?;
        if let Some(name) = object.name() {
            self.check(object, component.set_name(name));
        }
        if let Some(value) = object.get_double(1) {
            self.check(object, component.set_pressure_difference_across_the_component(value));
        }

        Ok(component.handle())
    }

    fn translate_meter_custom(&mut self, model: &mut Model, object: &IdfObject) -> Result<Handle> {
        let mut meter = model.add::<MeterCustom>()?;
        if let Some(name) = object.name() {
            self.check(object, meter.set_name(name));
        }
        if let Some(fuel_type) = self.choice::<MeterFuelType>(object, 1) {
            self.check(object, meter.set_fuel_type(fuel_type));
        }
        for group in 0..object.num_extensible_groups() {
            if let Some(values) = object.extensible_group(group) {
                let key = values.first().copied().unwrap_or_default();
                let variable = values.get(1).copied().unwrap_or_default();
                self.check(object, meter.add_key_var_group(key, variable));
            }
        }

        Ok(meter.handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energyplus::ForwardTranslator;
    use crate::fixture::assert_error;
    use crate::model::ConstituentName;
    use float_cmp::assert_approx_eq;

    const IDF: &str = "
Version, 23.2;

Building,
  Office,                 !- Name
  15,                     !- North Axis {deg}
  City,                   !- Terrain
  0.05,                   !- Loads Convergence Tolerance Value
  0.3,                    !- Temperature Convergence Tolerance Value
  FullInteriorAndExterior, !- Solar Distribution
  20,                     !- Maximum Number of Warmup Days
  4;                      !- Minimum Number of Warmup Days

Generator:FuelCell:Inverter,
  Inverter,               !- Name
  Quadratic,              !- Inverter Efficiency Calculation Mode
  0.9,                    !- Inverter Efficiency
  Inverter Curve;         !- Efficiency Function of DC Power Curve Name

Curve:Quadratic,
  Inverter Curve,         !- Name
  0.8,                    !- Coefficient1 Constant
  0.01,                   !- Coefficient2 x
  0,                      !- Coefficient3 x**2
  0,                      !- Minimum Value of x
  100;                    !- Maximum Value of x

Generator:FuelCell:AirSupply,
  Air Supply,             !- Name
  Air Inlet Node,         !- Air Inlet Node Name
  Blower Curve,           !- Blower Power Curve Name
  1.0,                    !- Blower Heat Loss Factor
  AirRatiobyStoics,       !- Air Supply Rate Calculation Mode
  1.0,                    !- Stoichiometric Ratio
  ,                       !- Air Rate Function of Electric Power Curve Name
  0.00283,                !- Air Rate Air Temperature Coefficient
  ,                       !- Air Rate Function of Fuel Rate Curve Name
  NoRecovery,             !- Air Intake Heat Recovery Mode
  UserDefinedConstituents, !- Air Supply Constituent Mode
  2,                      !- Number of UserDefined Constituents
  Nitrogen,               !- Constituent 1
  0.79,                   !- Molar Fraction 1
  Oxygen,                 !- Constituent 2
  0.21,                   !- Molar Fraction 2
  Argon,                  !- Constituent 3
  0.0;                    !- Molar Fraction 3

Curve:Cubic,
  Blower Curve, 0, 0, 0, 0, 0, 1;

Schedule:Constant,
  Always On, , 1;
";

    fn translate(text: &str) -> (ReverseTranslator, Model) {
        let file = IdfFile::parse(text, IddFileType::EnergyPlus).unwrap();
        let mut translator = ReverseTranslator::new();
        let model = translator.translate_idf(&file).unwrap();
        (translator, model)
    }

    #[test]
    fn test_building_and_simulation_control() {
        let (_, model) = translate(IDF);
        let building = model.building().unwrap();
        assert_eq!(building.name(), Some("Office"));
        assert_approx_eq!(f64, building.north_axis(), 15.0);

        let simulation_control = model.simulation_control().unwrap();
        assert_approx_eq!(f64, simulation_control.loads_convergence_tolerance_value(), 0.05);
        assert_approx_eq!(f64, simulation_control.temperature_convergence_tolerance_value(), 0.3);
        assert_eq!(
            simulation_control.solar_distribution(),
            SolarDistribution::FullInteriorAndExterior
        );
        assert_eq!(simulation_control.maximum_number_of_warmup_days(), 20);
        assert_eq!(simulation_control.minimum_number_of_warmup_days(), 4);
    }

    #[test]
    fn test_pointers_resolved_by_name() {
        let (translator, model) = translate(IDF);
        assert!(translator.errors().is_empty());

        let inverter = model.objects_of_kind::<GeneratorFuelCellInverter>().next().unwrap();
        assert_eq!(
            inverter.inverter_efficiency_calculation_mode(),
            InverterEfficiencyCalculationMode::Quadratic
        );
        assert_approx_eq!(f64, inverter.inverter_efficiency(), 0.9);
        let curve = inverter.efficiency_function_of_dc_power_curve().unwrap();
        let curve = model.get::<CurveQuadratic>(curve).unwrap();
        assert_eq!(curve.name(), Some("Inverter Curve"));
        assert_approx_eq!(f64, curve.maximum_value_of_x(), 100.0);

        let air_supply = model.objects_of_kind::<GeneratorFuelCellAirSupply>().next().unwrap();
        let blower = air_supply.blower_power_curve().unwrap();
        assert_eq!(model.get::<CurveCubic>(blower).unwrap().name(), Some("Blower Curve"));
        assert_eq!(model.objects_of_kind::<CurveCubic>().count(), 1);
    }

    #[test]
    fn test_air_supply_reads_every_constituent() {
        let (translator, model) = translate(IDF);
        let air_supply = model.objects_of_kind::<GeneratorFuelCellAirSupply>().next().unwrap();
        assert_eq!(air_supply.air_inlet_node_name(), Some("Air Inlet Node"));
        let names: Vec<_> = air_supply
            .constituents()
            .iter()
            .map(|constituent| constituent.name)
            .collect();
        assert_eq!(
            names,
            [ConstituentName::Nitrogen, ConstituentName::Oxygen, ConstituentName::Argon]
        );
        assert_eq!(
            air_supply.air_supply_constituent_mode(),
            AirSupplyConstituentMode::UserDefinedConstituents
        );

        // The declared count of 2 does not match the three listed
        let warning = translator
            .warnings()
            .iter()
            .find(|warning| warning.object_type == "Generator:FuelCell:AirSupply")
            .unwrap();
        assert_eq!(
            warning.message,
            "Number of UserDefined Constituents is 2 but 3 constituents are listed; every \
             listed constituent was read"
        );
    }

    #[test]
    fn test_unsupported_types_are_skipped() {
        let (translator, model) = translate(IDF);
        let skipped = translator
            .warnings()
            .iter()
            .filter(|warning| warning.object_type == "Schedule:Constant")
            .collect::<Vec<_>>();
        assert_eq!(skipped.len(), 1);
        assert_eq!(
            skipped[0].message,
            "Objects of type Schedule:Constant are not supported and were skipped"
        );
        assert_eq!(model.objects_of_type("OS:Schedule:Constant").count(), 0);
    }

    #[test]
    fn test_missing_reference() {
        let (translator, model) = translate(
            "Generator:FuelCell:Inverter, Inverter, Constant, 0.95, Missing Curve;",
        );
        assert_eq!(translator.errors().len(), 1);
        assert_eq!(translator.errors()[0].message, "Cannot find Curve:Quadratic 'Missing Curve'");
        let inverter = model.objects_of_kind::<GeneratorFuelCellInverter>().next().unwrap();
        assert_eq!(inverter.efficiency_function_of_dc_power_curve(), None);
    }

    #[test]
    fn test_requires_energyplus_file() {
        let file = IdfFile::new(IddFileType::OpenStudio);
        assert_error!(
            ReverseTranslator::new().translate_idf(&file),
            "Reverse translation requires a file using the EnergyPlus IDD"
        );
    }

    #[test]
    fn test_forward_then_reverse() {
        let (_, model) = translate(IDF);
        let file = ForwardTranslator::new().translate_model(&model).unwrap();
        let (translator, again) = translate(&file.to_string());
        assert!(translator.errors().is_empty());
        assert_eq!(again.len(), model.len());

        let building = again.building().unwrap();
        assert_eq!(building.name(), Some("Office"));
        let air_supply = again.objects_of_kind::<GeneratorFuelCellAirSupply>().next().unwrap();
        assert_eq!(air_supply.number_of_user_defined_constituents(), 3);
    }

    #[test]
    fn test_out_of_range_value_is_skipped() {
        let (translator, model) = translate(
            "Building, Office;\nGenerator:FuelCell:Inverter, Inv, Quadratic, 1.5, ;",
        );
        assert_eq!(translator.errors().len(), 1);
        assert_eq!(translator.errors()[0].object_name.as_deref(), Some("Inv"));
        assert_eq!(
            translator.errors()[0].message,
            "Inverter Efficiency: 1.5 is greater than the maximum of 1"
        );

        // The rest of the object and file is still translated
        let inverter = model.objects_of_kind::<GeneratorFuelCellInverter>().next().unwrap();
        assert_eq!(inverter.name(), Some("Inv"));
        assert_eq!(
            inverter.inverter_efficiency_calculation_mode(),
            InverterEfficiencyCalculationMode::Quadratic
        );
        assert_approx_eq!(f64, inverter.inverter_efficiency(), 1.0);
        assert_eq!(model.building().unwrap().name(), Some("Office"));
    }

    #[test]
    fn test_invalid_choice_is_skipped() {
        let (translator, model) = translate("Generator:FuelCell:Inverter, Inv, Linear, 0.9, ;");
        assert_eq!(translator.errors().len(), 1);
        assert_eq!(
            translator.errors()[0].message,
            "'Linear' is not a valid choice for Inverter Efficiency Calculation Mode"
        );
        let inverter = model.objects_of_kind::<GeneratorFuelCellInverter>().next().unwrap();
        assert_eq!(
            inverter.inverter_efficiency_calculation_mode(),
            InverterEfficiencyCalculationMode::Constant
        );
        assert_approx_eq!(f64, inverter.inverter_efficiency(), 0.9);
    }

    #[test]
    fn test_duplicate_constituent_is_skipped() {
        let (translator, model) = translate(
            "Generator:FuelCell:AirSupply, Air Supply, Node, , 1, AirRatiobyStoics, 1, , \
             0.00283, , NoRecovery, UserDefinedConstituents, 3, Nitrogen, 0.79, nitrogen, 0.1, \
             Oxygen, 0.21;",
        );
        assert_eq!(translator.errors().len(), 1);
        assert_eq!(
            translator.errors()[0].message,
            "Constituent Nitrogen has already been added"
        );
        assert!(translator.warnings().is_empty());

        let air_supply = model.objects_of_kind::<GeneratorFuelCellAirSupply>().next().unwrap();
        let constituents = air_supply.constituents();
        assert_eq!(constituents.len(), 2);
        assert_eq!(constituents[0].name, ConstituentName::Nitrogen);
        assert_approx_eq!(f64, constituents[0].molar_fraction, 0.79);
        assert_eq!(constituents[1].name, ConstituentName::Oxygen);
    }

    #[test]
    fn test_duplicate_names_refer_to_first() {
        let (translator, model) = translate(
            "Curve:Quadratic, Shared, 0.8, 0, 0, 0, 1;
             Curve:Quadratic, Shared, 0.5, 0, 0, 0, 1;
             Generator:FuelCell:Inverter, Inv, Quadratic, 0.9, shared;",
        );
        assert!(translator.errors().is_empty());
        assert_eq!(translator.warnings().len(), 1);
        assert_eq!(
            translator.warnings()[0].message,
            "Another Curve:Quadratic object is also named 'Shared'; references to the name use \
             the first"
        );
        assert_eq!(model.objects_of_kind::<CurveQuadratic>().count(), 2);

        let inverter = model.objects_of_kind::<GeneratorFuelCellInverter>().next().unwrap();
        let curve = inverter.efficiency_function_of_dc_power_curve().unwrap();
        let curve = model.get::<CurveQuadratic>(curve).unwrap();
        assert_approx_eq!(f64, curve.coefficient1_constant(), 0.8);
    }

    #[test]
    fn test_unnamed_objects_are_kept_apart() {
        let (translator, model) = translate(
            "Curve:Quadratic, , 0.8, 0, 0, 0, 1;
             Curve:Quadratic, , 0.5, 0, 0, 0, 1;",
        );
        assert!(translator.warnings().is_empty());
        let mut coefficients = model
            .objects_of_kind::<CurveQuadratic>()
            .map(|curve| curve.coefficient1_constant())
            .collect::<Vec<_>>();
        coefficients.sort_by(f64::total_cmp);
        assert_eq!(coefficients, [0.5, 0.8]);
    }
}
