//! Handles identify objects within a model.
use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for an object in a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(Uuid);

impl Handle {
    /// Create a new random handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for Handle {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.braced())
    }
}

impl FromStr for Handle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bare = s
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .unwrap_or(s);

        let uuid = Uuid::parse_str(bare).with_context(|| format!("Invalid handle: {s}"))?;
        Ok(Self(uuid))
    }
}
