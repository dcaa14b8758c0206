//! Civilizations taking part in the world.

use crate::types::{CityId, CivId, CivKind};
use serde::{Deserialize, Serialize};

/// A civilization: a player or a city-state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Civilization {
    pub id: CivId,
    /// Display name.
    pub name: String,
    pub kind: CivKind,
    /// ID of this civilization's capital city.
    pub capital: Option<CityId>,
}

impl Civilization {
    pub fn new(id: CivId, name: String, kind: CivKind) -> Self {
        Self {
            id,
            name,
            kind,
            capital: None,
        }
    }

    pub fn is_city_state(&self) -> bool {
        self.kind.is_city_state()
    }
}

impl std::fmt::Display for Civilization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}
