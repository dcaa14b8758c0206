//! Tile coordinates on the hex grid.
//!
//! Coordinates are axial: the six neighbors of `(x, y)` are `(x±1, y)`,
//! `(x, y±1)`, `(x+1, y+1)` and `(x-1, y-1)`. A rectangular map simply
//! bounds both axes.

use serde::{Deserialize, Serialize};

/// Position of a tile on the map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl PartialOrd for TileCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TileCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major so that iteration over sets of coordinates is stable
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl TileCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The six adjacent coordinates, unbounded.
    pub fn neighbors(&self) -> [TileCoord; 6] {
        let (x, y) = (self.x, self.y);
        [
            TileCoord::new(x + 1, y),
            TileCoord::new(x + 1, y + 1),
            TileCoord::new(x, y + 1),
            TileCoord::new(x - 1, y),
            TileCoord::new(x - 1, y - 1),
            TileCoord::new(x, y - 1),
        ]
    }

    /// Number of steps between two tiles.
    pub fn distance(&self, other: &TileCoord) -> u32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        // Moving diagonally along (1, 1) covers both axes in one step
        if dx.signum() == dy.signum() {
            dx.abs().max(dy.abs()) as u32
        } else {
            (dx.abs() + dy.abs()) as u32
        }
    }

    /// Check whether this coordinate lies on a `width` x `height` map.
    pub fn in_bounds(&self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < width && (self.y as u32) < height
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
