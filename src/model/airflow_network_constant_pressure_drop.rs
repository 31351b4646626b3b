//! A duct component with a fixed pressure drop.
use super::{Model, ModelObject, ModelObjectKind};
use anyhow::Result;
use std::borrow::{Borrow, BorrowMut};

const PRESSURE_DIFFERENCE_ACROSS_THE_COMPONENT: usize = 2;

/// `OS:AirflowNetworkConstantPressureDrop`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirflowNetworkConstantPressureDrop;

impl ModelObjectKind for AirflowNetworkConstantPressureDrop {
    const IDD_OBJECT_TYPE: &'static str = "OS:AirflowNetworkConstantPressureDrop";

    fn initialize(object: &mut ModelObject<&mut Model, Self>) -> Result<()> {
        object.set_pressure_difference_across_the_component(1.0)
    }
}

impl AirflowNetworkConstantPressureDrop {
    /// Add a component with the given pressure drop in Pa
    pub fn create_with_pressure_difference(
        model: &mut Model,
        pressure_difference: f64,
    ) -> Result<ModelObject<&mut Model, Self>> {
        let mut component = model.add::<Self>()?;
        if let Err(err) = component.set_pressure_difference_across_the_component(pressure_difference)
        {
            component.remove()?;
            return Err(err);
        }

        Ok(component)
    }
}

impl<M: Borrow<Model>> ModelObject<M, AirflowNetworkConstantPressureDrop> {
    /// The pressure drop across the component in Pa
    pub fn pressure_difference_across_the_component(&self) -> f64 {
        self.get_double(PRESSURE_DIFFERENCE_ACROSS_THE_COMPONENT)
            .unwrap_or_default()
    }
}

impl<M: BorrowMut<Model>> ModelObject<M, AirflowNetworkConstantPressureDrop> {
    /// Set the pressure drop in Pa, which must be positive
    pub fn set_pressure_difference_across_the_component(&mut self, value: f64) -> Result<()> {
        self.set_double(PRESSURE_DIFFERENCE_ACROSS_THE_COMPONENT, value)
    }
}
