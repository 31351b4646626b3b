//! The facility: the site-level counterpart to the building.
use super::{ModelObjectKind, UniqueModelObjectKind};

/// `OS:Facility`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facility;

impl ModelObjectKind for Facility {
    const IDD_OBJECT_TYPE: &'static str = "OS:Facility";
}

impl UniqueModelObjectKind for Facility {}
