//! The model: a registry of objects conforming to the OpenStudio IDD.
//!
//! Objects are stored as field-indexed data records and accessed through typed views
//! ([`ModelObject`]). The model keeps a cache of the handles of unique objects (e.g. the
//! building) and notifies observers when objects are removed.
use crate::handle::Handle;
use crate::idd::{IddFactory, IddFileType, IddObject};
use crate::idf::{
    DataError, DataErrorKind, IdfFile, IdfObject, StrictnessLevel, ValidityReport,
    collection_errors,
};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use log::warn;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use unicase::UniCase;

mod creator;
mod object;
pub use object::{Generic, ModelObject, ModelObjectKind, UniqueModelObjectKind};
mod airflow_network_constant_pressure_drop;
pub use airflow_network_constant_pressure_drop::AirflowNetworkConstantPressureDrop;
mod building;
pub use building::Building;
mod curve_cubic;
pub use curve_cubic::CurveCubic;
mod curve_quadratic;
pub use curve_quadratic::CurveQuadratic;
mod facility;
pub use facility::Facility;
mod generator_fuel_cell_air_supply;
pub use generator_fuel_cell_air_supply::{
    AirIntakeHeatRecoveryMode, AirSupplyConstituent, AirSupplyConstituentMode,
    AirSupplyRateCalculationMode, ConstituentName, GeneratorFuelCellAirSupply,
};
mod generator_fuel_cell_inverter;
pub use generator_fuel_cell_inverter::{
    GeneratorFuelCellInverter, InverterEfficiencyCalculationMode,
};
mod meter_custom;
pub use meter_custom::{MeterCustom, MeterFuelType};
mod simulation_control;
pub use simulation_control::{SimulationControl, SolarDistribution};
mod version;
pub use version::Version;

/// Details of an object which has been removed from a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedObject {
    /// The handle the object had
    pub handle: Handle,
    /// The object's IDD type
    pub idd_object_type: String,
    /// The object's name, if it had one
    pub name: Option<String>,
}

/// A callback run whenever an object is removed
type RemoveObserver = Box<dyn FnMut(&RemovedObject)>;

/// The data held for each object: its handle and its field values
#[derive(Debug, Clone, PartialEq)]
struct ObjectData {
    handle: Handle,
    idf: IdfObject,
}

/// A building energy model
pub struct Model {
    objects: IndexMap<Handle, ObjectData>,
    unique_cache: RefCell<HashMap<&'static str, Handle>>,
    remove_observers: Vec<RemoveObserver>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("objects", &self.objects.values().collect_vec())
            .field("remove_observers", &self.remove_observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    fn empty() -> Self {
        Self {
            objects: IndexMap::new(),
            unique_cache: RefCell::new(HashMap::new()),
            remove_observers: Vec::new(),
        }
    }

    /// Create a model containing only the version object
    pub fn new() -> Self {
        let mut model = Self::empty();
        model
            .add_object(Version::IDD_OBJECT_TYPE)
            .expect("OS:Version objects can always be created");

        model
    }

    /// Look up an OpenStudio IDD object type
    fn idd_object(idd_object_type: &str) -> Result<&'static IddObject> {
        IddFactory::openstudio()
            .object(idd_object_type)
            .with_context(|| format!("Unknown IDD object type: {idd_object_type}"))
    }

    /// Build a model from the objects of an OSM file
    pub fn from_idf_file(file: IdfFile) -> Result<Self> {
        ensure!(
            file.idd_file_type() == IddFileType::OpenStudio,
            "Models can only be built from files using the OpenStudio IDD"
        );

        let mut model = Self::empty();
        for mut idf in file.into_objects() {
            let idd = idf.idd_object();
            let handle = match idf.get_string(0).map(str::parse::<Handle>) {
                Some(Ok(handle)) => handle,
                _ => {
                    warn!(
                        "{} object '{}' does not have a valid handle; assigning a new one",
                        idd.name,
                        idf.name().unwrap_or_default()
                    );
                    Handle::new()
                }
            };
            ensure!(
                !model.contains(handle),
                "Handle {handle} is used by more than one object"
            );
            if idd.unique && model.find_unique(idd).is_some() {
                bail!("More than one {} object in model", idd.name);
            }
            if creator::initializer(&idd.name).is_none() {
                warn!("Creating GenericModelObject for IddObjectType '{}'", idd.name);
            }

            idf.set_handle(handle);
            model.objects.insert(handle, ObjectData { handle, idf });
        }

        if model.version().is_none() {
            warn!("Model has no OS:Version object; adding one");
            model.add_object(Version::IDD_OBJECT_TYPE)?;
        }

        Ok(model)
    }

    /// Read a model from an OSM file
    pub fn load(path: &Path) -> Result<Self> {
        let file = IdfFile::load(path, IddFileType::OpenStudio)?;
        Self::from_idf_file(file).with_context(|| format!("Invalid model: {}", path.display()))
    }

    /// Write the model to an OSM file
    pub fn save(&self, path: &Path, overwrite: bool) -> Result<()> {
        self.to_idf_file().save(path, overwrite)
    }

    /// The model's objects as an OSM file
    pub fn to_idf_file(&self) -> IdfFile {
        IdfFile::from_objects(
            IddFileType::OpenStudio,
            self.objects.values().map(|data| data.idf.clone()).collect(),
        )
    }

    /// The number of objects in the model
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the model has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether the model contains an object with the given handle
    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    fn idf(&self, handle: Handle) -> &IdfObject {
        &self.objects[&handle].idf
    }

    fn idf_mut(&mut self, handle: Handle) -> &mut IdfObject {
        &mut self.objects[&handle].idf
    }

    /// Iterate over all objects in the order they were added
    pub fn objects(&self) -> impl Iterator<Item = ModelObject<&Model>> {
        self.objects
            .keys()
            .map(move |&handle| ModelObject::new(self, handle))
    }

    /// Iterate over the objects of an IDD type (ignoring case)
    pub fn objects_of_type<'a>(
        &'a self,
        idd_object_type: &'a str,
    ) -> impl Iterator<Item = ModelObject<&'a Model>> {
        self.objects()
            .filter(move |object| object.idd_object().is_type(idd_object_type))
    }

    /// Iterate over the objects of kind `K`
    pub fn objects_of_kind<K: ModelObjectKind>(&self) -> impl Iterator<Item = ModelObject<&Model, K>> {
        self.objects().filter_map(ModelObject::cast::<K>)
    }

    /// The handles of the objects of kind `K`
    pub fn handles_of_kind<K: ModelObjectKind>(&self) -> Vec<Handle> {
        self.objects_of_kind::<K>()
            .map(|object| object.handle())
            .collect()
    }

    /// A view of any object
    pub fn object(&self, handle: Handle) -> Option<ModelObject<&Model>> {
        self.contains(handle)
            .then(|| ModelObject::new(self, handle))
    }

    /// A mutable view of any object
    pub fn object_mut(&mut self, handle: Handle) -> Option<ModelObject<&mut Model>> {
        if self.contains(handle) {
            Some(ModelObject::new(self, handle))
        } else {
            None
        }
    }

    /// A view of an object of kind `K`
    pub fn get<K: ModelObjectKind>(&self, handle: Handle) -> Option<ModelObject<&Model, K>> {
        self.object(handle)?.cast()
    }

    /// A mutable view of an object of kind `K`
    pub fn get_mut<K: ModelObjectKind>(
        &mut self,
        handle: Handle,
    ) -> Option<ModelObject<&mut Model, K>> {
        self.object_mut(handle)?.cast()
    }

    /// Add a new object of the given IDD type, returning its handle.
    ///
    /// The object is constructed through the creator table, so registered types start with the
    /// same values as when added with [`Model::add`]. If the type is unique and an object of it
    /// already exists, the existing object's handle is returned instead.
    pub fn add_object(&mut self, idd_object_type: &str) -> Result<Handle> {
        let idd = Self::idd_object(idd_object_type)?;
        if idd.unique
            && let Some(handle) = self.find_unique(idd)
        {
            return Ok(handle);
        }

        let handle = self.insert(IdfObject::with_defaults(idd));
        if let Some(name) = idd.name_field_index().map(|_| self.default_name(idd)) {
            self.idf_mut(handle).set_name_raw(&name)?;
        }

        match creator::initializer(&idd.name) {
            Some(initialize) => {
                if let Err(err) = initialize(self, handle) {
                    self.objects.shift_remove(&handle);
                    return Err(err.context(format!("Could not create {} object", idd.name)));
                }
            }
            None => warn!("Creating GenericModelObject for IddObjectType '{}'", idd.name),
        }

        Ok(handle)
    }

    /// Add a new object of kind `K`
    pub fn add<K: ModelObjectKind>(&mut self) -> Result<ModelObject<&mut Model, K>> {
        let handle = self.add_object(K::IDD_OBJECT_TYPE)?;
        Ok(ModelObject::new(self, handle))
    }

    /// Store an object under a fresh handle
    fn insert(&mut self, mut idf: IdfObject) -> Handle {
        let handle = Handle::new();
        idf.set_handle(handle);
        self.objects.insert(handle, ObjectData { handle, idf });

        handle
    }

    /// The default name for a new object: the type's words followed by the first free number
    fn default_name(&self, idd: &IddObject) -> String {
        let words = type_words(&idd.name);
        (1..)
            .map(|num| format!("{words} {num}"))
            .find(|name| !self.is_name_taken(idd, name, None))
            .unwrap_or(words)
    }

    /// Whether an object of the given type other than `except` has the name (ignoring case)
    fn is_name_taken(&self, idd: &IddObject, name: &str, except: Option<Handle>) -> bool {
        let name = UniCase::new(name);
        self.objects.values().any(|data| {
            Some(data.handle) != except
                && std::ptr::eq(data.idf.idd_object(), idd)
                && data.idf.name().is_some_and(|other| UniCase::new(other) == name)
        })
    }

    /// Set the name of an object, returning the name actually stored.
    ///
    /// Names are unique among the objects of one IDD type: if the name is taken, the first free
    /// name of the form `<name> <n>` is used instead.
    pub fn set_object_name(&mut self, handle: Handle, name: &str) -> Result<String> {
        let idd = self
            .objects
            .get(&handle)
            .with_context(|| format!("Object {handle} is not in the model"))?
            .idf
            .idd_object();
        let name = name.trim();
        ensure!(!name.is_empty(), "Names cannot be empty");

        let name = if self.is_name_taken(idd, name, Some(handle)) {
            (1..)
                .map(|num| format!("{name} {num}"))
                .find(|candidate| !self.is_name_taken(idd, candidate, Some(handle)))
                .unwrap_or_else(|| name.to_string())
        } else {
            name.to_string()
        };

        self.idf_mut(handle).set_name_raw(&name)?;
        Ok(name)
    }

    /// Find the object of a unique type, using and filling the cache
    fn find_unique(&self, idd: &'static IddObject) -> Option<Handle> {
        let mut cache = self.unique_cache.borrow_mut();
        if let Some(&handle) = cache.get(idd.name.as_str()) {
            return Some(handle);
        }

        let handle = self
            .objects
            .values()
            .find(|data| std::ptr::eq(data.idf.idd_object(), idd))?
            .handle;
        cache.insert(idd.name.as_str(), handle);

        Some(handle)
    }

    fn unique_idd_object<K: UniqueModelObjectKind>() -> &'static IddObject {
        Self::idd_object(K::IDD_OBJECT_TYPE).expect("Unique kinds use OpenStudio IDD object types")
    }

    /// The object of unique kind `K`, creating it if necessary
    pub fn unique<K: UniqueModelObjectKind>(&mut self) -> Result<ModelObject<&mut Model, K>> {
        self.add::<K>()
    }

    /// The object of unique kind `K`, if there is one
    pub fn optional_unique<K: UniqueModelObjectKind>(&self) -> Option<ModelObject<&Model, K>> {
        let handle = self.find_unique(Self::unique_idd_object::<K>())?;
        Some(ModelObject::new(self, handle))
    }

    /// The building, if there is one
    pub fn building(&self) -> Option<ModelObject<&Model, Building>> {
        self.optional_unique()
    }

    /// The facility, if there is one
    pub fn facility(&self) -> Option<ModelObject<&Model, Facility>> {
        self.optional_unique()
    }

    /// The simulation control settings, if there are any
    pub fn simulation_control(&self) -> Option<ModelObject<&Model, SimulationControl>> {
        self.optional_unique()
    }

    /// The version object
    pub fn version(&self) -> Option<ModelObject<&Model, Version>> {
        self.optional_unique()
    }

    /// Register a callback to be run whenever an object is removed
    pub fn connect_remove<F>(&mut self, observer: F)
    where
        F: FnMut(&RemovedObject) + 'static,
    {
        self.remove_observers.push(Box::new(observer));
    }

    /// Remove an object.
    ///
    /// Pointers to the object from elsewhere in the model are cleared and observers registered
    /// with [`Model::connect_remove`] are notified.
    pub fn remove(&mut self, handle: Handle) -> Result<RemovedObject> {
        let data = self
            .objects
            .get(&handle)
            .with_context(|| format!("Object {handle} is not in the model"))?;
        ensure!(
            !data.idf.idd_object().is_type(Version::IDD_OBJECT_TYPE),
            "The OS:Version object cannot be removed"
        );

        Ok(self.remove_unchecked(handle))
    }

    fn remove_unchecked(&mut self, handle: Handle) -> RemovedObject {
        let data = self
            .objects
            .shift_remove(&handle)
            .expect("Caller checks the object is present");
        self.unique_cache
            .borrow_mut()
            .retain(|_, cached| *cached != handle);

        for other in self.objects.values_mut() {
            let pointers = pointer_indices(&other.idf)
                .filter(|&index| {
                    other.idf.get_string(index).and_then(|value| value.parse().ok()) == Some(handle)
                })
                .collect_vec();
            for index in pointers {
                other.idf.reset(index);
            }
        }

        let removed = RemovedObject {
            handle,
            idd_object_type: data.idf.object_type().to_string(),
            name: data.idf.name().map(str::to_string),
        };
        for observer in &mut self.remove_observers {
            observer(&removed);
        }

        removed
    }

    /// Copy an object within this model, returning the copy's handle.
    ///
    /// The copy gets a new handle and a free name; its pointers refer to the same objects as the
    /// original's. Copying a unique object gives back the object itself.
    pub fn duplicate(&mut self, handle: Handle) -> Result<Handle> {
        let data = self
            .objects
            .get(&handle)
            .with_context(|| format!("Object {handle} is not in the model"))?;
        if data.idf.idd_object().unique {
            return Ok(handle);
        }

        let idf = data.idf.clone();
        let name = idf.name().map(str::to_string);
        let copy = self.insert(idf);
        if let Some(name) = name {
            self.set_object_name(copy, &name)?;
        }

        Ok(copy)
    }

    /// Copy an object into another model, returning the copy's handle.
    ///
    /// Objects referred to through pointer fields are copied as well (once each) and the copy's
    /// pointers rewired to them. A unique object replaces the target's existing one.
    pub fn clone_object(&self, handle: Handle, target: &mut Model) -> Result<Handle> {
        self.clone_recursive(handle, target, &mut HashMap::new())
    }

    fn clone_recursive(
        &self,
        handle: Handle,
        target: &mut Model,
        cloned: &mut HashMap<Handle, Handle>,
    ) -> Result<Handle> {
        if let Some(&copy) = cloned.get(&handle) {
            return Ok(copy);
        }

        let data = self
            .objects
            .get(&handle)
            .with_context(|| format!("Object {handle} is not in the model"))?;
        let idd = data.idf.idd_object();
        if idd.unique
            && let Some(existing) = target.find_unique(idd)
        {
            target.remove_unchecked(existing);
        }

        let copy = target.insert(data.idf.clone());
        cloned.insert(handle, copy);
        if let Some(name) = data.idf.name() {
            target.set_object_name(copy, name)?;
        }

        for index in pointer_indices(&data.idf).collect_vec() {
            let Some(pointee) = data.idf.get_string(index) else {
                continue;
            };

            match pointee
                .parse::<Handle>()
                .ok()
                .filter(|pointee| self.contains(*pointee))
            {
                Some(pointee) => {
                    let pointee_copy = self.clone_recursive(pointee, target, cloned)?;
                    target.idf_mut(copy).set_handle_pointer(index, pointee_copy);
                }
                None => target.idf_mut(copy).reset(index),
            }
        }

        Ok(copy)
    }

    /// Check the model at the given strictness level.
    ///
    /// As well as the checks made on files, pointers must refer to objects of a suitable type
    /// which are present in the model.
    pub fn validity_report(&self, level: StrictnessLevel) -> ValidityReport {
        let mut errors = collection_errors(
            self.objects.values().map(|data| &data.idf),
            IddFactory::openstudio(),
            level,
        );

        if level != StrictnessLevel::None {
            for data in self.objects.values() {
                errors.extend(self.pointer_errors(&data.idf));
            }
        }

        ValidityReport { level, errors }
    }

    fn pointer_errors<'a>(&'a self, idf: &'a IdfObject) -> impl Iterator<Item = DataError> + 'a {
        pointer_indices(idf).filter_map(move |index| {
            let value = idf.get_string(index)?;
            let field = idf.idd_object().field(index)?;
            let target = value
                .parse::<Handle>()
                .ok()
                .and_then(|handle| self.objects.get(&handle));

            let message = match target {
                None => format!("{} refers to {value}, which is not in the model", field.name),
                Some(target) if !target.idf.idd_object().is_referenced_by(field) => format!(
                    "{} refers to a {} object, which it cannot use",
                    field.name,
                    target.idf.object_type()
                ),
                Some(_) => return None,
            };

            Some(DataError::new(
                DataErrorKind::DanglingPointer,
                idf,
                Some(index),
                message,
            ))
        })
    }
}

/// The indices of the populated pointer fields of an object
fn pointer_indices(idf: &IdfObject) -> impl Iterator<Item = usize> + '_ {
    (1..idf.num_fields()).filter(|&index| {
        !idf.is_empty(index)
            && idf
                .idd_object()
                .field(index)
                .is_some_and(|field| field.is_pointer())
    })
}

/// Turn an IDD type name into words, e.g. `OS:Generator:FuelCell:Inverter` becomes
/// `Generator Fuel Cell Inverter`
fn type_words(idd_object_type: &str) -> String {
    let name = idd_object_type
        .strip_prefix("OS:")
        .unwrap_or(idd_object_type);

    let mut words = String::new();
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c == ':' || c == '_' {
            words.push(' ');
        } else {
            if c.is_ascii_uppercase()
                && previous.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
            {
                words.push(' ');
            }
            words.push(c);
        }
        previous = Some(c);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::rc::Rc;

    #[rstest]
    #[case("OS:Generator:FuelCell:Inverter", "Generator Fuel Cell Inverter")]
    #[case("OS:AirflowNetworkConstantPressureDrop", "Airflow Network Constant Pressure Drop")]
    #[case("OS:Curve:Quadratic", "Curve Quadratic")]
    #[case("OS:Building", "Building")]
    fn test_type_words(#[case] idd_object_type: &str, #[case] expected: &str) {
        assert_eq!(type_words(idd_object_type), expected);
    }

    #[test]
    fn test_new_model_has_only_version() {
        let model = Model::new();
        assert_eq!(model.len(), 1);
        let version = model.version().unwrap();
        assert_eq!(version.version_identifier(), IddFactory::openstudio().version());
    }

    #[rstest]
    fn test_add_object_dispatch(mut model: Model) {
        let handle = model.add_object("os:generator:fuelcell:inverter").unwrap();
        let inverter = model.get::<GeneratorFuelCellInverter>(handle).unwrap();
        assert_eq!(inverter.name(), Some("Generator Fuel Cell Inverter 1"));
        assert_eq!(inverter.get_string(2), Some("Constant"));

        assert_error!(
            model.add_object("OS:Not:A:Type"),
            "Unknown IDD object type: OS:Not:A:Type"
        );
    }

    #[rstest]
    fn test_add_generic_object(mut model: Model) {
        let handle = model.add_object("OS:Schedule:Constant").unwrap();
        let object = model.object(handle).unwrap();
        assert_eq!(object.name(), Some("Schedule Constant 1"));
        assert_approx_eq!(f64, object.get_double(3).unwrap(), 0.0);
        assert!(model.get::<Building>(handle).is_none());
    }

    #[rstest]
    fn test_default_names_are_unique_per_type(mut model: Model) {
        let first = model.add::<CurveQuadratic>().unwrap().handle();
        let second = model.add::<CurveQuadratic>().unwrap().handle();
        let cubic = model.add::<CurveCubic>().unwrap().handle();
        assert_eq!(model.object(first).unwrap().name(), Some("Curve Quadratic 1"));
        assert_eq!(model.object(second).unwrap().name(), Some("Curve Quadratic 2"));
        assert_eq!(model.object(cubic).unwrap().name(), Some("Curve Cubic 1"));
    }

    #[rstest]
    fn test_set_name_collision(mut model: Model) {
        let first = model.add::<CurveQuadratic>().unwrap().handle();
        let second = model.add::<CurveQuadratic>().unwrap().handle();
        assert_eq!(model.set_object_name(first, "Fan Curve").unwrap(), "Fan Curve");
        assert_eq!(model.set_object_name(second, "fan curve").unwrap(), "fan curve 1");
        assert_eq!(model.set_object_name(first, "Fan Curve").unwrap(), "Fan Curve");
        assert_error!(model.set_object_name(first, "  "), "Names cannot be empty");
    }

    #[rstest]
    fn test_unique_objects(mut model: Model) {
        assert!(model.building().is_none());
        let handle = model.unique::<Building>().unwrap().handle();
        assert_eq!(model.unique::<Building>().unwrap().handle(), handle);
        assert_eq!(model.add_object("OS:Building").unwrap(), handle);
        assert_eq!(model.building().unwrap().handle(), handle);
        assert_eq!(model.objects_of_type("OS:Building").count(), 1);
    }

    #[rstest]
    fn test_unique_cache_invalidated_on_remove(mut model: Model) {
        let handle = model.unique::<Building>().unwrap().handle();
        assert!(model.building().is_some());
        model.remove(handle).unwrap();
        assert!(model.building().is_none());

        let new_handle = model.unique::<Building>().unwrap().handle();
        assert_ne!(new_handle, handle);
        assert_eq!(model.building().unwrap().handle(), new_handle);
    }

    #[rstest]
    fn test_remove_clears_pointers(mut model: Model) {
        let curve = model.add::<CurveQuadratic>().unwrap().handle();
        let mut inverter = model.add::<GeneratorFuelCellInverter>().unwrap();
        inverter.set_efficiency_function_of_dc_power_curve(curve).unwrap();
        let inverter = inverter.handle();

        let removed = model.remove(curve).unwrap();
        assert_eq!(removed.idd_object_type, "OS:Curve:Quadratic");
        assert_eq!(removed.name.as_deref(), Some("Curve Quadratic 1"));

        let inverter = model.get::<GeneratorFuelCellInverter>(inverter).unwrap();
        assert_eq!(inverter.efficiency_function_of_dc_power_curve(), None);
        assert!(inverter.is_empty(4));
    }

    #[rstest]
    fn test_remove_version_fails(mut model: Model) {
        let handle = model.version().unwrap().handle();
        assert_error!(model.remove(handle), "The OS:Version object cannot be removed");
        assert!(model.remove(Handle::new()).is_err());
    }

    #[rstest]
    fn test_remove_observers(mut model: Model) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_by_observer = Rc::clone(&seen);
        model.connect_remove(move |removed| {
            seen_by_observer.borrow_mut().push(removed.handle);
        });

        let curve = model.add::<CurveQuadratic>().unwrap().handle();
        model.remove(curve).unwrap();
        assert_eq!(*seen.borrow(), [curve]);
    }

    #[rstest]
    fn test_duplicate(mut model: Model) {
        let curve = model.add::<CurveQuadratic>().unwrap().handle();
        let mut inverter = model.add::<GeneratorFuelCellInverter>().unwrap();
        inverter.set_efficiency_function_of_dc_power_curve(curve).unwrap();
        let inverter = inverter.handle();

        let copy = model.duplicate(inverter).unwrap();
        assert_ne!(copy, inverter);
        let copy = model.get::<GeneratorFuelCellInverter>(copy).unwrap();
        assert_eq!(copy.name(), Some("Generator Fuel Cell Inverter 1 1"));
        assert_eq!(copy.efficiency_function_of_dc_power_curve(), Some(curve));
        assert_eq!(copy.get_string(0), Some(copy.handle().to_string().as_str()));

        let building = model.unique::<Building>().unwrap().handle();
        assert_eq!(model.duplicate(building).unwrap(), building);
    }

    #[rstest]
    fn test_clone_into_other_model(mut model: Model) {
        let curve = model.add::<CurveQuadratic>().unwrap().handle();
        let mut inverter = model.add::<GeneratorFuelCellInverter>().unwrap();
        inverter.set_efficiency_function_of_dc_power_curve(curve).unwrap();
        inverter.set_comment(Some("Custom Object".into()));
        let inverter = inverter.handle();

        let mut other = Model::new();
        let copy = model.clone_object(inverter, &mut other).unwrap();
        assert_eq!(other.len(), 3);

        let copy = other.get::<GeneratorFuelCellInverter>(copy).unwrap();
        assert_eq!(copy.comment(), Some("Custom Object"));
        let copied_curve = copy.efficiency_function_of_dc_power_curve().unwrap();
        assert_ne!(copied_curve, curve);
        assert!(other.get::<CurveQuadratic>(copied_curve).is_some());
    }

    #[rstest]
    fn test_clone_unique_replaces_existing(mut model: Model) {
        let mut building = model.unique::<Building>().unwrap();
        building.set_name("Source").unwrap();
        let building = building.handle();

        let mut other = Model::new();
        let existing = other.unique::<Building>().unwrap().handle();
        let copy = model.clone_object(building, &mut other).unwrap();
        assert!(!other.contains(existing));
        assert_eq!(other.building().unwrap().handle(), copy);
        assert_eq!(other.building().unwrap().name(), Some("Source"));
    }

    #[rstest]
    fn test_validity_dangling_pointer(mut model: Model) {
        let mut inverter = model.add::<GeneratorFuelCellInverter>().unwrap();
        inverter.set_string(4, &Handle::new().to_string()).unwrap();
        let report = model.validity_report(StrictnessLevel::Draft);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, DataErrorKind::DanglingPointer);
        assert_eq!(report.errors[0].field_index, Some(4));
    }

    #[rstest]
    fn test_validity_duplicate_name(mut model: Model) {
        let first = model.add::<CurveQuadratic>().unwrap().handle();
        let second = model.add::<CurveQuadratic>().unwrap().handle();
        let name = model.object(first).unwrap().name().unwrap().to_string();
        model.object_mut(second).unwrap().set_string(1, &name).unwrap();

        let report = model.validity_report(StrictnessLevel::Draft);
        assert_eq!(
            report.counts_by_kind().get(&DataErrorKind::DuplicateName),
            Some(&1)
        );
    }

    #[rstest]
    fn test_to_and_from_idf_file(mut model: Model) {
        model.add::<GeneratorFuelCellAirSupply>().unwrap();
        model.unique::<Building>().unwrap();

        let file = model.to_idf_file();
        let loaded = Model::from_idf_file(file).unwrap();
        assert_eq!(loaded.len(), model.len());
        for (original, loaded) in model.objects().zip(loaded.objects()) {
            assert_eq!(original.handle(), loaded.handle());
            assert_eq!(original.idf_object(), loaded.idf_object());
        }
    }

    #[test]
    fn test_from_idf_file_assigns_missing_handles() {
        let text = "OS:Version,,3.7.0;\nOS:Curve:Quadratic,,Curve,0,0,0,0,1;\n";
        let file = IdfFile::parse(text, IddFileType::OpenStudio).unwrap();
        let model = Model::from_idf_file(file).unwrap();
        assert_eq!(model.len(), 2);
        for object in model.objects() {
            assert_eq!(object.get_string(0), Some(object.handle().to_string().as_str()));
        }
    }

    #[test]
    fn test_from_idf_file_duplicate_handle() {
        let handle = Handle::new();
        let text = format!("OS:Version,{handle},3.7.0;\nOS:Facility,{handle},Facility;\n");
        let file = IdfFile::parse(&text, IddFileType::OpenStudio).unwrap();
        assert_error!(
            Model::from_idf_file(file),
            format!("Handle {handle} is used by more than one object")
        );
    }

    #[test]
    fn test_from_idf_file_adds_version() {
        let file = IdfFile::parse("OS:Facility,,Facility;", IddFileType::OpenStudio).unwrap();
        let model = Model::from_idf_file(file).unwrap();
        assert!(model.version().is_some());
        assert!(model.facility().is_some());
    }

    #[test]
    fn test_from_energyplus_file_fails() {
        let file = IdfFile::parse("Version,23.2;", IddFileType::EnergyPlus).unwrap();
        assert!(Model::from_idf_file(file).is_err());
    }
}
