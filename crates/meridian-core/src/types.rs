//! Core identifiers and small shared enums.

use serde::{Deserialize, Serialize};

/// Civilization index, assigned in order of joining the world.
pub type CivId = u8;

/// Unique identifier for a unit.
pub type UnitId = u64;

/// Unique identifier for a city.
pub type CityId = u64;

/// Whether a civilization is a full player or a city-state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CivKind {
    #[default]
    Major,
    CityState,
}

impl CivKind {
    pub const fn is_city_state(&self) -> bool {
        matches!(self, CivKind::CityState)
    }
}

impl std::fmt::Display for CivKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CivKind::Major => write!(f, "Major Civilization"),
            CivKind::CityState => write!(f, "City-State"),
        }
    }
}

/// Diplomatic status between two civilizations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DiplomaticStatus {
    #[default]
    Peace,
    War,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_civ_kind_default_is_major() {
        assert_eq!(CivKind::default(), CivKind::Major);
        assert!(!CivKind::Major.is_city_state());
        assert!(CivKind::CityState.is_city_state());
    }

    #[test]
    fn test_civ_kind_display() {
        assert_eq!(CivKind::CityState.to_string(), "City-State");
    }
}
