//! The version of the IDD a model conforms to.
use super::{Model, ModelObject, ModelObjectKind, UniqueModelObjectKind};
use crate::idd::IddFactory;
use anyhow::Result;
use std::borrow::Borrow;

const VERSION_IDENTIFIER: usize = 1;
const PRERELEASE_IDENTIFIER: usize = 2;

/// `OS:Version`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version;

impl ModelObjectKind for Version {
    const IDD_OBJECT_TYPE: &'static str = "OS:Version";

    fn initialize(object: &mut ModelObject<&mut Model, Self>) -> Result<()> {
        object.set_string(VERSION_IDENTIFIER, IddFactory::openstudio().version())
    }
}

impl UniqueModelObjectKind for Version {}

impl<M: Borrow<Model>> ModelObject<M, Version> {
    /// The OpenStudio version the model was written with
    pub fn version_identifier(&self) -> &str {
        self.get_string_or_default(VERSION_IDENTIFIER)
            .unwrap_or_default()
    }

    /// Any prerelease tag of the version
    pub fn prerelease_identifier(&self) -> Option<&str> {
        self.get_string(PRERELEASE_IDENTIFIER)
    }
}
