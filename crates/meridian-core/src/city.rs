//! Cities and the territory they own.

use crate::coord::TileCoord;
use crate::types::{CityId, CivId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A city on the game map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    /// Owning civilization.
    pub owner: CivId,
    pub name: String,
    /// City center.
    pub position: TileCoord,
    /// Is this the owner's capital?
    pub is_capital: bool,
    /// Tiles owned by this city (borders), always including the center.
    pub territory: BTreeSet<TileCoord>,
}

impl City {
    /// Create a city owning only its center tile.
    ///
    /// Claiming the surrounding ring is done by the world, which knows which
    /// tiles are already taken.
    pub fn new(id: CityId, owner: CivId, name: String, position: TileCoord, is_capital: bool) -> Self {
        let mut territory = BTreeSet::new();
        territory.insert(position);
        Self {
            id,
            owner,
            name,
            position,
            is_capital,
            territory,
        }
    }

    /// Check if a tile is inside this city's borders.
    pub fn owns_tile(&self, coord: &TileCoord) -> bool {
        self.territory.contains(coord)
    }

    /// Add a tile to the city's borders. Returns false if already owned.
    pub fn expand_borders(&mut self, coord: TileCoord) -> bool {
        self.territory.insert(coord)
    }

    /// Release a tile. The city center can never be released.
    pub fn release_tile(&mut self, coord: &TileCoord) -> bool {
        if *coord == self.position {
            return false;
        }
        self.territory.remove(coord)
    }
}
