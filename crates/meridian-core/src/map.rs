//! Rectangular game map with tiles and spatial queries.

use crate::coord::TileCoord;
use crate::terrain::Terrain;
use crate::types::CityId;
use serde::{Deserialize, Serialize};

/// The game map containing all tiles.
///
/// Tiles are stored row-major, so every in-bounds coordinate has exactly
/// one tile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    tiles: Vec<Tile>,
}

impl Map {
    /// Create a map filled with a single terrain type.
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                tiles.push(Tile::new(TileCoord::new(x, y), terrain));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    fn index(&self, coord: &TileCoord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        Some(coord.y as usize * self.width as usize + coord.x as usize)
    }

    /// Get a tile at the given coordinate.
    pub fn get(&self, coord: &TileCoord) -> Option<&Tile> {
        self.index(coord).and_then(|i| self.tiles.get(i))
    }

    /// Get a mutable reference to a tile.
    pub fn get_mut(&mut self, coord: &TileCoord) -> Option<&mut Tile> {
        let i = self.index(coord)?;
        self.tiles.get_mut(i)
    }

    /// Check if a coordinate is within the map bounds.
    pub fn in_bounds(&self, coord: &TileCoord) -> bool {
        coord.in_bounds(self.width, self.height)
    }

    /// Get in-bounds neighbors of a coordinate.
    pub fn neighbors(&self, coord: &TileCoord) -> Vec<TileCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.in_bounds(c))
            .collect()
    }

    /// Find the closest tile to `from` that satisfies `accept`.
    ///
    /// Ties are broken by row-major order so the result is deterministic.
    pub fn nearest_tile(
        &self,
        from: &TileCoord,
        accept: impl Fn(&Tile) -> bool,
    ) -> Option<TileCoord> {
        self.tiles
            .iter()
            .filter(|t| accept(t))
            .min_by_key(|t| (from.distance(&t.coord), t.coord))
            .map(|t| t.coord)
    }

    /// Count total tiles in the map.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate over all tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

/// A single tile on the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the map.
    pub coord: TileCoord,
    /// Base terrain type.
    pub terrain: Terrain,
    /// City whose territory contains this tile.
    pub city: Option<CityId>,
}

impl Tile {
    pub fn new(coord: TileCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            city: None,
        }
    }

    /// Check if this tile lies inside any city's territory.
    pub fn is_owned(&self) -> bool {
        self.city.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_map() {
        let map = Map::filled(15, 15, Terrain::Desert);
        assert_eq!(map.tile_count(), 225);
        assert!(map.iter().all(|t| t.terrain == Terrain::Desert));
        assert!(map.iter().all(|t| !t.is_owned()));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let map = Map::filled(4, 3, Terrain::Grassland);
        assert!(map.get(&TileCoord::new(3, 2)).is_some());
        assert!(map.get(&TileCoord::new(4, 0)).is_none());
        assert!(map.get(&TileCoord::new(0, -1)).is_none());
    }

    #[test]
    fn test_get_returns_matching_coord() {
        let map = Map::filled(6, 5, Terrain::Plains);
        let coord = TileCoord::new(4, 3);
        assert_eq!(map.get(&coord).map(|t| t.coord), Some(coord));
    }

    #[test]
    fn test_corner_neighbors() {
        let map = Map::filled(15, 15, Terrain::Desert);
        let mut n = map.neighbors(&TileCoord::new(0, 0));
        n.sort();
        assert_eq!(
            n,
            vec![
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_nearest_tile() {
        let mut map = Map::filled(5, 5, Terrain::Grassland);
        if let Some(tile) = map.get_mut(&TileCoord::new(2, 2)) {
            tile.city = Some(1);
        }
        let from = TileCoord::new(2, 2);
        let nearest = map.nearest_tile(&from, |t| !t.is_owned());
        assert_eq!(nearest.map(|c| from.distance(&c)), Some(1));

        assert_eq!(map.nearest_tile(&from, |t| t.is_owned()), Some(from));
        assert_eq!(map.nearest_tile(&from, |_| false), None);
    }
}
