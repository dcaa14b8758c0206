//! Base terrain of map tiles.

use serde::{Deserialize, Serialize};

/// Base terrain type for a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Grassland,
    Plains,
    Desert,
    Tundra,
    Snow,
    Mountain,
    Coast,
    Ocean,
}

impl Terrain {
    /// Check if this is a water terrain type.
    pub const fn is_water(&self) -> bool {
        matches!(self, Terrain::Coast | Terrain::Ocean)
    }

    /// Check if land units may stand on this terrain.
    pub const fn is_passable_land(&self) -> bool {
        !self.is_water() && !matches!(self, Terrain::Mountain)
    }

    /// Check if this terrain can support a city.
    pub const fn can_found_city(&self) -> bool {
        self.is_passable_land()
    }

    pub const fn all() -> &'static [Terrain] {
        &[
            Terrain::Grassland,
            Terrain::Plains,
            Terrain::Desert,
            Terrain::Tundra,
            Terrain::Snow,
            Terrain::Mountain,
            Terrain::Coast,
            Terrain::Ocean,
        ]
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Terrain::Grassland => "Grassland",
            Terrain::Plains => "Plains",
            Terrain::Desert => "Desert",
            Terrain::Tundra => "Tundra",
            Terrain::Snow => "Snow",
            Terrain::Mountain => "Mountain",
            Terrain::Coast => "Coast",
            Terrain::Ocean => "Ocean",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_terrain() {
        assert!(Terrain::Ocean.is_water());
        assert!(Terrain::Coast.is_water());
        assert!(!Terrain::Desert.is_water());
    }

    #[test]
    fn test_city_sites() {
        let sites: Vec<_> = Terrain::all()
            .iter()
            .filter(|t| t.can_found_city())
            .collect();
        assert_eq!(sites.len(), 5);
        assert!(!Terrain::Mountain.can_found_city());
    }
}
