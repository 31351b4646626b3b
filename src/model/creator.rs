//! The table of object kinds which can be constructed by IDD type name.
use super::{
    AirflowNetworkConstantPressureDrop, Building, CurveCubic, CurveQuadratic, Facility,
    GeneratorFuelCellAirSupply, GeneratorFuelCellInverter, MeterCustom, Model, ModelObject,
    ModelObjectKind, SimulationControl, Version,
};
use crate::handle::Handle;
use anyhow::Result;

/// Sets up a newly inserted object of a registered kind
pub(super) type Initializer = fn(&mut Model, Handle) -> Result<()>;

/// Registered kinds, by IDD object type
const CREATORS: &[(&str, Initializer)] = &[
    (
        AirflowNetworkConstantPressureDrop::IDD_OBJECT_TYPE,
        initialize::<AirflowNetworkConstantPressureDrop>,
    ),
    (Building::IDD_OBJECT_TYPE, initialize::<Building>),
    (CurveCubic::IDD_OBJECT_TYPE, initialize::<CurveCubic>),
    (CurveQuadratic::IDD_OBJECT_TYPE, initialize::<CurveQuadratic>),
    (Facility::IDD_OBJECT_TYPE, initialize::<Facility>),
    (
        GeneratorFuelCellAirSupply::IDD_OBJECT_TYPE,
        initialize::<GeneratorFuelCellAirSupply>,
    ),
    (
        GeneratorFuelCellInverter::IDD_OBJECT_TYPE,
        initialize::<GeneratorFuelCellInverter>,
    ),
    (MeterCustom::IDD_OBJECT_TYPE, initialize::<MeterCustom>),
    (SimulationControl::IDD_OBJECT_TYPE, initialize::<SimulationControl>),
    (Version::IDD_OBJECT_TYPE, initialize::<Version>),
];

fn initialize<K: ModelObjectKind>(model: &mut Model, handle: Handle) -> Result<()> {
    K::initialize(&mut ModelObject::new(model, handle))
}

/// Find the initializer for an IDD object type, if the type has a registered kind
pub(super) fn initializer(idd_object_type: &str) -> Option<Initializer> {
    CREATORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(idd_object_type))
        .map(|(_, initialize)| *initialize)
}
