//! Translation of OpenStudio models into EnergyPlus input files.
use super::{MOLAR_FRACTION_TOLERANCE, TranslatorMessage, energyplus_idd_object, energyplus_version};
use crate::handle::Handle;
use crate::idd::IddFileType;
use crate::idf::{IdfFile, IdfObject};
use crate::model::{
    AirSupplyConstituentMode, AirSupplyRateCalculationMode, AirflowNetworkConstantPressureDrop,
    Building, CurveCubic, CurveQuadratic, GeneratorFuelCellAirSupply, GeneratorFuelCellInverter,
    InverterEfficiencyCalculationMode, MeterCustom, Model, ModelObject, ModelObjectKind,
    SimulationControl,
};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::collections::HashMap;

/// Translates a [`Model`] into an EnergyPlus [`IdfFile`].
///
/// Each model object is translated at most once per call to [`ForwardTranslator::translate_model`].
/// Objects referred to by pointer fields are translated when first needed and referred to by
/// name in the output.
#[derive(Debug, Default)]
pub struct ForwardTranslator {
    objects: Vec<IdfObject>,
    map: HashMap<Handle, Option<usize>>,
    warnings: Vec<TranslatorMessage>,
    errors: Vec<TranslatorMessage>,
}

impl ForwardTranslator {
    /// Create a translator
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings raised by the last translation
    pub fn warnings(&self) -> &[TranslatorMessage] {
        &self.warnings
    }

    /// Errors raised by the last translation. These do not stop translation; the objects
    /// concerned are translated as well as possible or skipped.
    pub fn errors(&self) -> &[TranslatorMessage] {
        &self.errors
    }

    /// Translate a model.
    ///
    /// The output always starts with a `Version` object, followed by `SimulationControl` and
    /// `Building` when the model has them.
    pub fn translate_model(&mut self, model: &Model) -> Result<IdfFile> {
        *self = Self::new();

        let mut version = IdfObject::new(energyplus_idd_object("Version")?);
        version.set_string(0, &energyplus_version())?;
        self.objects.push(version);

        if let Some(simulation_control) = model.simulation_control() {
            self.translate_and_map(model, simulation_control.into_generic())?;
        }
        if let Some(building) = model.building() {
            self.translate_and_map(model, building.into_generic())?;
        }
        for object in model.objects() {
            self.translate_and_map(model, object)?;
        }

        info!(
            "Translated {} model objects into {} EnergyPlus objects",
            model.len(),
            self.objects.len()
        );

        let mut file = IdfFile::new(IddFileType::EnergyPlus);
        file.set_header(vec![format!(
            "Translated from an OpenStudio model by openstudio-model {}",
            env!("CARGO_PKG_VERSION")
        )]);
        for object in self.objects.drain(..) {
            file.add_object(object)?;
        }

        Ok(file)
    }

    /// Translate an object, unless it has been translated already. Returns the index of the
    /// resulting IDF object, if there is one.
    fn translate_and_map(&mut self, model: &Model, object: ModelObject<&Model>) -> Result<Option<usize>> {
        if let Some(index) = self.map.get(&object.handle()) {
            return Ok(*index);
        }

        let handle = object.handle();
        let translated = match object.idd_object_type() {
            SimulationControl::IDD_OBJECT_TYPE => {
                Some(Self::translate_simulation_control(cast(object))?)
            }
            Building::IDD_OBJECT_TYPE => Some(self.translate_building(model, cast(object))?),
            CurveQuadratic::IDD_OBJECT_TYPE => Some(Self::translate_curve_quadratic(cast(object))?),
            CurveCubic::IDD_OBJECT_TYPE => Some(Self::translate_curve_cubic(cast(object))?),
            GeneratorFuelCellInverter::IDD_OBJECT_TYPE => {
                Some(self.translate_inverter(model, cast(object))?)
            }
            GeneratorFuelCellAirSupply::IDD_OBJECT_TYPE => {
                Some(self.translate_air_supply(model, cast(object))?)
            }
            AirflowNetworkConstantPressureDrop::IDD_OBJECT_TYPE => {
                Some(Self::translate_constant_pressure_drop(cast(object))?)
            }
            MeterCustom::IDD_OBJECT_TYPE => self.translate_meter_custom(cast(object))?,
            "OS:Version" | "OS:Facility" => {
                debug!("{} has no EnergyPlus counterpart", object.idd_object_type());
                None
            }
            other => {
                warn!("No EnergyPlus translation for objects of type {other}");
                None
            }
        };

        let index = translated.map(|idf| {
            self.objects.push(idf);
            self.objects.len() - 1
        });
        self.map.insert(handle, index);

        Ok(index)
    }

    /// Translate the object a pointer field refers to, returning its EnergyPlus name
    fn translate_pointer(&mut self, model: &Model, target: Option<Handle>) -> Result<Option<String>> {
        let Some(object) = target.and_then(|handle| model.object(handle)) else {
            return Ok(None);
        };

        let index = self.translate_and_map(model, object)?;
        Ok(index.and_then(|index| self.objects[index].name().map(str::to_string)))
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

    fn translate_simulation_control(
        simulation_control: ModelObject<&Model, SimulationControl>,
    ) -> Result<IdfObject> {
        let mut idf = IdfObject::new(energyplus_idd_object("SimulationControl")?);
        let yes_no = |value: bool| if value { "Yes" } else { "No" };
        idf.set_string(0, yes_no(simulation_control.do_zone_sizing_calculation()))?;
        idf.set_string(1, yes_no(simulation_control.do_system_sizing_calculation()))?;
        idf.set_string(2, yes_no(simulation_control.do_plant_sizing_calculation()))?;
        idf.set_string(3, yes_no(simulation_control.run_simulation_for_sizing_periods()))?;
        idf.set_string(
            4,
            yes_no(simulation_control.run_simulation_for_weather_file_run_periods()),
        )?;

        Ok(idf)
    }

    /// The EnergyPlus `Building` object also carries the convergence and warmup settings which
    /// OpenStudio keeps on `OS:SimulationControl`
    fn translate_building(
        &mut self,
        model: &Model,
        building: ModelObject<&Model, Building>,
    ) -> Result<IdfObject> {
        let mut idf = IdfObject::with_defaults(energyplus_idd_object("Building")?);
        if let Some(name) = building.name() {
            idf.set_name_raw(name)?;
        }
        idf.set_double(1, building.north_axis())?;
        idf.set_string(2, "Suburbs")?;

        if let Some(simulation_control) = model.simulation_control() {
            idf.set_double(3, simulation_control.loads_convergence_tolerance_value())?;
            idf.set_double(4, simulation_control.temperature_convergence_tolerance_value())?;
            idf.set_string(5, &simulation_control.solar_distribution().to_string())?;
            idf.set_int(6, simulation_control.maximum_number_of_warmup_days())?;
            idf.set_int(7, simulation_control.minimum_number_of_warmup_days())?;
        } else {
            self.warn(
                &idf,
                "Model has no OS:SimulationControl; EnergyPlus defaults will be used".into(),
            );
        }

        Ok(idf)
    }

    fn translate_curve_quadratic(curve: ModelObject<&Model, CurveQuadratic>) -> Result<IdfObject> {
        let mut idf = IdfObject::new(energyplus_idd_object("Curve:Quadratic")?);
        idf.set_name_raw(curve.name().unwrap_or_default())?;
        idf.set_double(1, curve.coefficient1_constant())?;
        idf.set_double(2, curve.coefficient2_x())?;
        idf.set_double(3, curve.coefficient3_x_pow2())?;
        idf.set_double(4, curve.minimum_value_of_x())?;
        idf.set_double(5, curve.maximum_value_of_x())?;
        if let Some(value) = curve.minimum_curve_output() {
            idf.set_double(6, value)?;
        }
        if let Some(value) = curve.maximum_curve_output() {
            idf.set_double(7, value)?;
        }

        Ok(idf)
    }

    fn translate_curve_cubic(curve: ModelObject<&Model, CurveCubic>) -> Result<IdfObject> {
        let mut idf = IdfObject::new(energyplus_idd_object("Curve:Cubic")?);
        idf.set_name_raw(curve.name().unwrap_or_default())?;
        idf.set_double(1, curve.coefficient1_constant())?;
        idf.set_double(2, curve.coefficient2_x())?;
        idf.set_double(3, curve.coefficient3_x_pow2())?;
        idf.set_double(4, curve.coefficient4_x_pow3())?;
        idf.set_double(5, curve.minimum_value_of_x())?;
        idf.set_double(6, curve.maximum_value_of_x())?;
        if let Some(value) = curve.minimum_curve_output() {
            idf.set_double(7, value)?;
        }
        if let Some(value) = curve.maximum_curve_output() {
            idf.set_double(8, value)?;
        }

        Ok(idf)
    }

    fn translate_inverter(
        &mut self,
        model: &Model,
        inverter: ModelObject<&Model, GeneratorFuelCellInverter>,
    ) -> Result<IdfObject> {
        let mut idf = IdfObject::new(energyplus_idd_object("Generator:FuelCell:Inverter")?);
        idf.set_name_raw(inverter.name().unwrap_or_default())?;
        let mode = inverter.inverter_efficiency_calculation_mode();
        idf.set_string(1, &mode.to_string())?;
        idf.set_double(2, inverter.inverter_efficiency())?;

        let curve = self.translate_pointer(model, inverter.efficiency_function_of_dc_power_curve())?;
        match curve {
            Some(curve) => idf.set_string(3, &curve)?,
            None if mode == InverterEfficiencyCalculationMode::Quadratic => self.error(
                &idf,
                "Inverter efficiency mode is Quadratic but no efficiency curve is set".into(),
            ),
            None => {}
        }

        Ok(idf)
    }

    fn translate_air_supply(
        &mut self,
        model: &Model,
        air_supply: ModelObject<&Model, GeneratorFuelCellAirSupply>,
    ) -> Result<IdfObject> {
        let mut idf = IdfObject::new(energyplus_idd_object("Generator:FuelCell:AirSupply")?);
        idf.set_name_raw(air_supply.name().unwrap_or_default())?;
        if let Some(node) = air_supply.air_inlet_node_name() {
            idf.set_string(1, node)?;
        }
        if let Some(curve) = self.translate_pointer(model, air_supply.blower_power_curve())? {
            idf.set_string(2, &curve)?;
        }
        idf.set_double(3, air_supply.blower_heat_loss_factor())?;

        let rate_mode = air_supply.air_supply_rate_calculation_mode();
        idf.set_string(4, &rate_mode.to_string())?;
        idf.set_double(5, air_supply.stoichiometric_ratio())?;
        let electric_power_curve = self.translate_pointer(
            model,
            air_supply.air_rate_function_of_electric_power_curve(),
        )?;
        if let Some(curve) = &electric_power_curve {
            idf.set_string(6, curve)?;
        }
        idf.set_double(7, air_supply.air_rate_air_temperature_coefficient())?;
        let fuel_rate_curve =
            self.translate_pointer(model, air_supply.air_rate_function_of_fuel_rate_curve())?;
        if let Some(curve) = &fuel_rate_curve {
            idf.set_string(8, curve)?;
        }

        let missing_curve = match rate_mode {
            AirSupplyRateCalculationMode::QuadraticFunctionofElectricPower => {
                electric_power_curve.is_none()
            }
            AirSupplyRateCalculationMode::QuadraticFunctionofFuelRate => fuel_rate_curve.is_none(),
            AirSupplyRateCalculationMode::AirRatiobyStoics => false,
        };
        if missing_curve {
            self.error(&idf, format!("Air supply rate mode is {rate_mode} but the curve it needs is not set"));
        }

        idf.set_string(9, &air_supply.air_intake_heat_recovery_mode().to_string())?;
        let constituent_mode = air_supply.air_supply_constituent_mode();
        idf.set_string(10, &constituent_mode.to_string())?;

        let constituents = air_supply.constituents();
        let count = i32::try_from(constituents.len()).context("Too many constituents")?;
        idf.set_int(11, count)?;
        for constituent in &constituents {
            idf.push_extensible_group(&[
                &constituent.name.to_string(),
                &constituent.molar_fraction.to_string(),
            ])?;
        }

        if constituent_mode == AirSupplyConstituentMode::UserDefinedConstituents
            && constituents.is_empty()
        {
            self.error(
                &idf,
                "Constituent mode is UserDefinedConstituents but no constituents are defined".into(),
            );
        }
        if !constituents.is_empty() {
            let sum = air_supply.sum_of_constituents_molar_fractions();
            if (sum - 1.0).abs() > MOLAR_FRACTION_TOLERANCE {
                self.warn(&idf, format!("Molar fractions of constituents sum to {sum}, not 1"));
            }
        }

        Ok(idf)
    }

    fn translate_constant_pressure_drop(
        component: ModelObject<&Model, AirflowNetworkConstantPressureDrop>,
    ) -> Result<IdfObject> {
        let mut idf = IdfObject::new(energyplus_idd_object(
            "AirflowNetwork:Distribution:Component:ConstantPressureDrop",
        )?);
        idf.set_name_raw(component.name().unwrap_or_default())?;
        idf.set_double(1, component.pressure_difference_across_the_component())?;

        Ok(idf)
    }

    fn translate_meter_custom(
        &mut self,
        meter: ModelObject<&Model, MeterCustom>,
    ) -> Result<Option<IdfObject>> {
        let mut idf = IdfObject::new(energyplus_idd_object("Meter:Custom")?);
        idf.set_name_raw(meter.name().unwrap_or_default())?;
        if let Some(fuel_type) = meter.fuel_type() {
            idf.set_string(1, &fuel_type.to_string())?;
        }

        let groups = meter.key_var_groups();
        if groups.is_empty() {
            self.error(&idf, "Meter has no key/variable pairs and will not be translated".into());
            return Ok(None);
        }
        for (key, variable) in &groups {
            idf.push_extensible_group(&[key, variable])?;
        }

        Ok(Some(idf))
    }
}

/// View an object as the kind its IDD type was matched against
fn cast<K: ModelObjectKind>(object: ModelObject<&Model>) -> ModelObject<&Model, K> {
    object
        .cast()
        .expect("Object type was matched against the kind's IDD type")
}
