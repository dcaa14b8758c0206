//! Units - military, civilian and great people.

use crate::coord::TileCoord;
use crate::types::{CivId, UnitId};
use serde::{Deserialize, Serialize};

/// A unit on the game map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Owning civilization.
    pub owner: CivId,
    pub unit_type: UnitType,
    /// Current position on the map.
    pub position: TileCoord,
    /// Remaining movement points this turn.
    pub movement: u32,
    /// Is the unit embarked on water?
    pub embarked: bool,
}

impl Unit {
    /// Create a new unit with full movement.
    pub fn new(id: UnitId, owner: CivId, unit_type: UnitType, position: TileCoord) -> Self {
        Self {
            id,
            owner,
            unit_type,
            position,
            movement: unit_type.movement(),
            embarked: false,
        }
    }

    /// Check if unit has movement left this turn.
    pub fn can_move(&self) -> bool {
        self.movement > 0
    }

    /// Use movement points.
    pub fn use_movement(&mut self, cost: u32) {
        self.movement = self.movement.saturating_sub(cost);
    }

    /// Restore movement at the start of the owner's turn.
    pub fn new_turn(&mut self) {
        self.movement = self.unit_type.movement();
    }

    pub fn is_military(&self) -> bool {
        self.unit_type.category().is_military()
    }
}

/// Types of units available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    // Civilian
    Settler,
    Worker,
    WorkBoat,

    // Great people
    GreatGeneral,
    GreatScientist,
    GreatMerchant,

    // Military
    Warrior,
    Spearman,
    Archer,
    Horseman,
    Trireme,
}

impl UnitType {
    pub const fn category(&self) -> UnitCategory {
        match self {
            UnitType::Settler | UnitType::Worker | UnitType::WorkBoat => UnitCategory::Civilian,
            UnitType::GreatGeneral | UnitType::GreatScientist | UnitType::GreatMerchant => {
                UnitCategory::GreatPerson
            }
            UnitType::Warrior | UnitType::Spearman => UnitCategory::Melee,
            UnitType::Archer => UnitCategory::Ranged,
            UnitType::Horseman => UnitCategory::Mounted,
            UnitType::Trireme => UnitCategory::Naval,
        }
    }

    pub fn is_great_person(&self) -> bool {
        self.category() == UnitCategory::GreatPerson
    }

    /// Movement points per turn.
    pub const fn movement(&self) -> u32 {
        match self {
            UnitType::Horseman => 4,
            UnitType::Trireme | UnitType::WorkBoat => 3,
            _ => 2,
        }
    }

    /// Display name, as shown in unit action menus.
    pub const fn name(&self) -> &'static str {
        match self {
            UnitType::Settler => "Settler",
            UnitType::Worker => "Worker",
            UnitType::WorkBoat => "Work Boat",
            UnitType::GreatGeneral => "Great General",
            UnitType::GreatScientist => "Great Scientist",
            UnitType::GreatMerchant => "Great Merchant",
            UnitType::Warrior => "Warrior",
            UnitType::Spearman => "Spearman",
            UnitType::Archer => "Archer",
            UnitType::Horseman => "Horseman",
            UnitType::Trireme => "Trireme",
        }
    }

    pub const fn all() -> &'static [UnitType] {
        &[
            UnitType::Settler,
            UnitType::Worker,
            UnitType::WorkBoat,
            UnitType::GreatGeneral,
            UnitType::GreatScientist,
            UnitType::GreatMerchant,
            UnitType::Warrior,
            UnitType::Spearman,
            UnitType::Archer,
            UnitType::Horseman,
            UnitType::Trireme,
        ]
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Broad unit classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    Civilian,
    GreatPerson,
    Melee,
    Ranged,
    Mounted,
    Naval,
}

impl UnitCategory {
    pub const fn is_military(&self) -> bool {
        !matches!(self, UnitCategory::Civilian | UnitCategory::GreatPerson)
    }
}
