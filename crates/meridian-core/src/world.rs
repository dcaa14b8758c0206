//! Root world state containing all game data.
//!
//! The world owns the map, civilizations, cities, units and diplomacy, and is
//! the only place that mutates them together. Territory is recorded twice,
//! on each [`Tile`](crate::map::Tile) and in each [`City`], and the methods
//! here keep the two in agreement.

use crate::city::City;
use crate::civilization::Civilization;
use crate::coord::TileCoord;
use crate::diplomacy::{BordersClosed, DiplomacyError, DiplomacyState};
use crate::map::Map;
use crate::rules::GameRules;
use crate::terrain::Terrain;
use crate::trade::Trade;
use crate::types::{CityId, CivId, CivKind, DiplomaticStatus, UnitId};
use crate::unit::{Unit, UnitType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("tile {0} is outside the map")]
    OutOfBounds(TileCoord),
    #[error("unknown civilization {0}")]
    UnknownCiv(CivId),
    #[error("unknown city {0}")]
    UnknownCity(CityId),
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    #[error("cannot found a city on {terrain} at {coord}")]
    InvalidCitySite { coord: TileCoord, terrain: Terrain },
    #[error("tile {0} already belongs to a city")]
    TileOwned(TileCoord),
    #[error("the world already holds the maximum of {0} civilizations")]
    TooManyCivilizations(u8),
    #[error("civilizations {0} and {1} are at war")]
    AtWar(CivId, CivId),
    #[error(transparent)]
    Diplomacy(#[from] DiplomacyError),
}

/// The complete state of a game world at one point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub map: Map,
    pub rules: GameRules,
    /// Current turn number, starting at 1.
    pub turn: u32,
    pub diplomacy: DiplomacyState,
    civs: Vec<Civilization>,
    cities: BTreeMap<CityId, City>,
    units: BTreeMap<UnitId, Unit>,
    next_city_id: CityId,
    next_unit_id: UnitId,
}

impl World {
    pub fn new(map: Map, rules: GameRules) -> Self {
        Self {
            map,
            rules,
            turn: 1,
            diplomacy: DiplomacyState::default(),
            civs: Vec::new(),
            cities: BTreeMap::new(),
            units: BTreeMap::new(),
            next_city_id: 1,
            next_unit_id: 1,
        }
    }

    /// A world on a rectangular map of one terrain, with default rules.
    pub fn rectangular(width: u32, height: u32, terrain: Terrain) -> Self {
        Self::new(Map::filled(width, height, terrain), GameRules::default())
    }

    // =========================================================================
    // Civilizations
    // =========================================================================

    /// Add a civilization and return its id.
    pub fn add_civ(&mut self, name: impl Into<String>, kind: CivKind) -> Result<CivId, WorldError> {
        if self.civs.len() >= self.rules.max_civilizations as usize {
            return Err(WorldError::TooManyCivilizations(self.rules.max_civilizations));
        }
        let id = self.civs.len() as CivId;
        let civ = Civilization::new(id, name.into(), kind);
        debug!(civ = %civ, kind = %kind, "civilization added");
        self.civs.push(civ);
        Ok(id)
    }

    pub fn civ(&self, id: CivId) -> Option<&Civilization> {
        self.civs.get(id as usize)
    }

    pub fn civs(&self) -> &[Civilization] {
        &self.civs
    }

    fn require_civ(&self, id: CivId) -> Result<&Civilization, WorldError> {
        self.civ(id).ok_or(WorldError::UnknownCiv(id))
    }

    /// Establish a diplomatic relation between two civilizations.
    pub fn meet(&mut self, a: CivId, b: CivId) -> Result<(), WorldError> {
        self.require_civ(a)?;
        self.require_civ(b)?;
        self.diplomacy.relation_mut(a, b)?;
        Ok(())
    }

    // =========================================================================
    // Map and territory
    // =========================================================================

    /// Change the terrain of a tile.
    pub fn set_terrain(&mut self, coord: TileCoord, terrain: Terrain) -> Result<(), WorldError> {
        let tile = self
            .map
            .get_mut(&coord)
            .ok_or(WorldError::OutOfBounds(coord))?;
        tile.terrain = terrain;
        Ok(())
    }

    /// Found a city and claim the unowned tiles around it.
    ///
    /// The first city of a civilization becomes its capital.
    pub fn found_city(
        &mut self,
        owner: CivId,
        position: TileCoord,
        name: impl Into<String>,
    ) -> Result<CityId, WorldError> {
        let is_capital = self.require_civ(owner)?.capital.is_none();
        let tile = self
            .map
            .get(&position)
            .ok_or(WorldError::OutOfBounds(position))?;
        if tile.is_owned() {
            return Err(WorldError::TileOwned(position));
        }
        if !tile.terrain.can_found_city() {
            return Err(WorldError::InvalidCitySite {
                coord: position,
                terrain: tile.terrain,
            });
        }

        let id = self.next_city_id;
        self.next_city_id += 1;
        let mut city = City::new(id, owner, name.into(), position, is_capital);

        let radius = self.rules.initial_city_radius as i32;
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let coord = TileCoord::new(position.x + dx, position.y + dy);
                if position.distance(&coord) > self.rules.initial_city_radius {
                    continue;
                }
                if let Some(tile) = self.map.get_mut(&coord) {
                    if tile.city.is_none() {
                        tile.city = Some(id);
                        city.expand_borders(coord);
                    }
                }
            }
        }

        info!(
            city = %city.name,
            owner,
            position = %position,
            tiles = city.territory.len(),
            "city founded"
        );
        if is_capital {
            if let Some(civ) = self.civs.get_mut(owner as usize) {
                civ.capital = Some(id);
            }
        }
        self.cities.insert(id, city);
        Ok(id)
    }

    /// Add a tile to a city's territory, taking it from its current city.
    ///
    /// A tile that is another city's center cannot be taken.
    pub fn add_tile_to_city(&mut self, city_id: CityId, coord: TileCoord) -> Result<(), WorldError> {
        if !self.cities.contains_key(&city_id) {
            return Err(WorldError::UnknownCity(city_id));
        }
        let tile = self.map.get(&coord).ok_or(WorldError::OutOfBounds(coord))?;

        if let Some(previous) = tile.city.filter(|&c| c != city_id) {
            if let Some(prev_city) = self.cities.get_mut(&previous) {
                if !prev_city.release_tile(&coord) {
                    return Err(WorldError::TileOwned(coord));
                }
                debug!(tile = %coord, from = previous, to = city_id, "tile changed city");
            }
        }

        if let Some(tile) = self.map.get_mut(&coord) {
            tile.city = Some(city_id);
        }
        if let Some(city) = self.cities.get_mut(&city_id) {
            city.expand_borders(coord);
        }
        Ok(())
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    /// The city whose territory contains `coord`.
    pub fn city_at(&self, coord: &TileCoord) -> Option<&City> {
        self.map
            .get(coord)
            .and_then(|tile| tile.city)
            .and_then(|id| self.cities.get(&id))
    }

    /// The civilization owning the territory `coord` lies in.
    pub fn tile_owner(&self, coord: &TileCoord) -> Option<CivId> {
        self.city_at(coord).map(|city| city.owner)
    }

    /// All tiles owned by a civilization's cities.
    pub fn territory_of(&self, civ: CivId) -> BTreeSet<TileCoord> {
        self.cities
            .values()
            .filter(|city| city.owner == civ)
            .flat_map(|city| city.territory.iter().copied())
            .collect()
    }

    // =========================================================================
    // Units
    // =========================================================================

    /// Place a new unit.
    pub fn add_unit(
        &mut self,
        owner: CivId,
        unit_type: UnitType,
        position: TileCoord,
    ) -> Result<UnitId, WorldError> {
        self.require_civ(owner)?;
        if !self.map.in_bounds(&position) {
            return Err(WorldError::OutOfBounds(position));
        }
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, owner, unit_type, position));
        debug!(unit = id, unit_type = %unit_type, owner, position = %position, "unit added");
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn units_of(&self, civ: CivId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |unit| unit.owner == civ)
    }

    /// Hand a unit to another civilization. It keeps its tile but has no
    /// movement left this turn.
    pub fn transfer_unit(&mut self, id: UnitId, new_owner: CivId) -> Result<(), WorldError> {
        self.require_civ(new_owner)?;
        let unit = self.units.get_mut(&id).ok_or(WorldError::UnknownUnit(id))?;
        let previous = unit.owner;
        unit.owner = new_owner;
        unit.movement = 0;
        info!(unit = id, from = previous, to = new_owner, "unit changed owner");
        Ok(())
    }

    /// Remove a unit from the world.
    pub fn remove_unit(&mut self, id: UnitId) -> Result<Unit, WorldError> {
        self.units.remove(&id).ok_or(WorldError::UnknownUnit(id))
    }

    // =========================================================================
    // Diplomacy
    // =========================================================================

    /// Record a trade initiated by `from` with `to` and refresh open borders.
    pub fn conclude_trade(&mut self, from: CivId, to: CivId, trade: Trade) -> Result<(), WorldError> {
        self.require_civ(from)?;
        self.require_civ(to)?;
        if self.diplomacy.are_at_war(from, to) {
            warn!(from, to, "trade refused between civilizations at war");
            return Err(WorldError::AtWar(from, to));
        }
        self.diplomacy.relation_mut(from, to)?.add_trade(from, trade)?;
        self.refresh_open_borders(from, to)?;
        Ok(())
    }

    /// Recompute the cached open borders flags of one relation.
    ///
    /// Units left inside territory whose borders just closed are moved out.
    pub fn refresh_open_borders(
        &mut self,
        a: CivId,
        b: CivId,
    ) -> Result<Vec<BordersClosed>, WorldError> {
        let closed = match self.diplomacy.existing_relation_mut(a, b) {
            Some(rel) => rel.update_has_open_borders(),
            None => Vec::new(),
        };
        for change in &closed {
            self.expel_units(change.grantee, change.grantor);
        }
        Ok(closed)
    }

    /// Declare war: every trade between the two ends immediately.
    pub fn declare_war(&mut self, a: CivId, b: CivId) -> Result<(), WorldError> {
        self.require_civ(a)?;
        self.require_civ(b)?;
        let rel = self.diplomacy.relation_mut(a, b)?;
        rel.status = DiplomaticStatus::War;
        rel.clear_trades();
        info!(a, b, "war declared");
        self.refresh_open_borders(a, b)?;
        Ok(())
    }

    /// Make peace. Units standing in the other side's territory without its
    /// open borders are moved out, as they are when borders close.
    pub fn make_peace(&mut self, a: CivId, b: CivId) -> Result<(), WorldError> {
        self.require_civ(a)?;
        self.require_civ(b)?;
        let rel = self.diplomacy.relation_mut(a, b)?;
        rel.status = DiplomaticStatus::Peace;
        let a_welcome = rel.grants_open_borders(b);
        let b_welcome = rel.grants_open_borders(a);
        info!(a, b, "peace made");
        if !a_welcome {
            self.expel_units(a, b);
        }
        if !b_welcome {
            self.expel_units(b, a);
        }
        Ok(())
    }

    /// Advance to the next turn: restore movement, count down trades and
    /// close borders whose agreements ran out.
    pub fn next_turn(&mut self) {
        self.turn += 1;
        for unit in self.units.values_mut() {
            unit.new_turn();
        }

        let mut closed = Vec::new();
        for rel in self.diplomacy.iter_mut() {
            let expired = rel.next_turn();
            if !expired.is_empty() {
                let (a, b) = rel.civs();
                debug!(a, b, count = expired.len(), "trades expired");
            }
            closed.extend(rel.update_has_open_borders());
        }
        for change in closed {
            self.expel_units(change.grantee, change.grantor);
        }
        debug!(turn = self.turn, "turn started");
    }

    /// Move `intruder`'s units out of `host`'s territory to the nearest tile
    /// they may stand on.
    fn expel_units(&mut self, intruder: CivId, host: CivId) {
        let territory = self.territory_of(host);
        if territory.is_empty() {
            return;
        }
        let trespassing: Vec<UnitId> = self
            .units
            .values()
            .filter(|unit| unit.owner == intruder && territory.contains(&unit.position))
            .map(|unit| unit.id)
            .collect();

        for id in trespassing {
            let Some(unit) = self.units.get(&id) else {
                continue;
            };
            let naval = self
                .map
                .get(&unit.position)
                .map(|tile| tile.terrain.is_water())
                .unwrap_or(false);
            let from = unit.position;
            let target = self.map.nearest_tile(&from, |tile| {
                !territory.contains(&tile.coord)
                    && if naval {
                        tile.terrain.is_water()
                    } else {
                        tile.terrain.is_passable_land()
                    }
            });
            match (target, self.units.get_mut(&id)) {
                (Some(to), Some(unit)) => {
                    unit.position = to;
                    info!(unit = id, owner = intruder, from = %from, to = %to, "unit left closed borders");
                }
                _ => warn!(unit = id, owner = intruder, "no tile to move unit out of closed borders"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::TradeOffer;

    fn two_civ_world() -> (World, CivId, CivId) {
        let mut world = World::rectangular(15, 15, Terrain::Desert);
        let a = world.add_civ("Babylon", CivKind::Major).expect("room");
        let b = world.add_civ("Sumer", CivKind::Major).expect("room");
        world.meet(a, b).expect("known civs");
        (world, a, b)
    }

    #[test]
    fn test_found_city_claims_ring() {
        let (mut world, a, _) = two_civ_world();
        let city_id = world
            .found_city(a, TileCoord::new(5, 5), "Babylon")
            .expect("valid site");
        let city = world.city(city_id).expect("city exists");
        assert_eq!(city.territory.len(), 7);
        assert!(city.is_capital);
        assert_eq!(world.civ(a).and_then(|c| c.capital), Some(city_id));

        for coord in &city.territory {
            assert_eq!(world.tile_owner(coord), Some(a));
        }
        assert_eq!(world.tile_owner(&TileCoord::new(7, 7)), None);
    }

    #[test]
    fn test_corner_city_claims_only_map_tiles() {
        let (mut world, _, b) = two_civ_world();
        let city_id = world
            .found_city(b, TileCoord::new(0, 0), "Ur")
            .expect("valid site");
        let city = world.city(city_id).expect("city exists");
        assert_eq!(city.territory.len(), 4);
        assert!(city.owns_tile(&TileCoord::new(1, 0)));
    }

    #[test]
    fn test_second_city_is_not_capital() {
        let (mut world, a, _) = two_civ_world();
        let first = world.found_city(a, TileCoord::new(2, 2), "One").expect("site");
        let second = world.found_city(a, TileCoord::new(10, 10), "Two").expect("site");
        assert!(world.city(first).map(|c| c.is_capital).unwrap_or(false));
        assert!(!world.city(second).map(|c| c.is_capital).unwrap_or(true));
    }

    #[test]
    fn test_neighbouring_cities_do_not_share_tiles() {
        let (mut world, a, b) = two_civ_world();
        world.found_city(a, TileCoord::new(2, 2), "Babylon").expect("site");
        world.found_city(b, TileCoord::new(0, 0), "Ur").expect("site");

        // (1, 1) neighbours both centers and went to the first city
        assert_eq!(world.tile_owner(&TileCoord::new(1, 1)), Some(a));
        let a_tiles = world.territory_of(a);
        let b_tiles = world.territory_of(b);
        assert!(a_tiles.is_disjoint(&b_tiles));
    }

    #[test]
    fn test_invalid_city_sites() {
        let (mut world, a, b) = two_civ_world();
        world.found_city(a, TileCoord::new(2, 2), "Babylon").expect("site");

        assert_eq!(
            world.found_city(b, TileCoord::new(2, 3), "Ur"),
            Err(WorldError::TileOwned(TileCoord::new(2, 3)))
        );
        assert_eq!(
            world.found_city(b, TileCoord::new(20, 3), "Ur"),
            Err(WorldError::OutOfBounds(TileCoord::new(20, 3)))
        );
        world
            .set_terrain(TileCoord::new(9, 9), Terrain::Ocean)
            .expect("in bounds");
        assert_eq!(
            world.found_city(b, TileCoord::new(9, 9), "Ur"),
            Err(WorldError::InvalidCitySite {
                coord: TileCoord::new(9, 9),
                terrain: Terrain::Ocean
            })
        );
        assert_eq!(
            world.found_city(9, TileCoord::new(12, 12), "Nowhere"),
            Err(WorldError::UnknownCiv(9))
        );
    }

    #[test]
    fn test_add_tile_to_city_moves_ownership() {
        let (mut world, a, b) = two_civ_world();
        let a_city = world.found_city(a, TileCoord::new(2, 2), "Babylon").expect("site");
        let b_city = world.found_city(b, TileCoord::new(0, 0), "Ur").expect("site");

        world
            .add_tile_to_city(b_city, TileCoord::new(1, 1))
            .expect("tile can move");
        assert_eq!(world.tile_owner(&TileCoord::new(1, 1)), Some(b));
        assert!(!world
            .city(a_city)
            .map(|c| c.owns_tile(&TileCoord::new(1, 1)))
            .unwrap_or(true));

        // A city center stays put
        assert_eq!(
            world.add_tile_to_city(b_city, TileCoord::new(2, 2)),
            Err(WorldError::TileOwned(TileCoord::new(2, 2)))
        );
        assert_eq!(
            world.add_tile_to_city(99, TileCoord::new(7, 7)),
            Err(WorldError::UnknownCity(99))
        );
    }

    #[test]
    fn test_too_many_civilizations() {
        let mut world = World::rectangular(5, 5, Terrain::Plains);
        world.rules.max_civilizations = 2;
        world.add_civ("One", CivKind::Major).expect("room");
        world.add_civ("Two", CivKind::CityState).expect("room");
        assert_eq!(
            world.add_civ("Three", CivKind::Major),
            Err(WorldError::TooManyCivilizations(2))
        );
    }

    #[test]
    fn test_transfer_unit() {
        let (mut world, a, b) = two_civ_world();
        let unit = world
            .add_unit(a, UnitType::Warrior, TileCoord::new(2, 2))
            .expect("valid unit");
        world.transfer_unit(unit, b).expect("known civ");

        let unit = world.unit(unit).expect("still exists");
        assert_eq!(unit.owner, b);
        assert_eq!(unit.movement, 0);
        assert_eq!(world.units_of(a).count(), 0);
        assert_eq!(world.transfer_unit(42, b), Err(WorldError::UnknownUnit(42)));
    }

    #[test]
    fn test_conclude_trade_refreshes_borders() {
        let (mut world, a, b) = two_civ_world();
        world
            .conclude_trade(b, a, Trade::new().with_our_offer(TradeOffer::open_borders(30)))
            .expect("at peace");
        let rel = world.diplomacy.relation(a, b).expect("met");
        assert!(rel.grants_open_borders(b));
        assert!(!rel.grants_open_borders(a));
    }

    #[test]
    fn test_no_trade_at_war() {
        let (mut world, a, b) = two_civ_world();
        world.declare_war(a, b).expect("known civs");
        assert_eq!(
            world.conclude_trade(a, b, Trade::new().with_our_offer(TradeOffer::gold(10))),
            Err(WorldError::AtWar(a, b))
        );
        world.make_peace(b, a).expect("known civs");
        assert!(world
            .conclude_trade(a, b, Trade::new().with_our_offer(TradeOffer::gold(10)))
            .is_ok());
    }

    #[test]
    fn test_war_closes_borders_and_expels_units() {
        let (mut world, a, b) = two_civ_world();
        world.found_city(b, TileCoord::new(0, 0), "Ur").expect("site");
        world
            .conclude_trade(a, b, Trade::new().with_their_offer(TradeOffer::open_borders(30)))
            .expect("at peace");
        let scout = world
            .add_unit(a, UnitType::Warrior, TileCoord::new(1, 0))
            .expect("valid unit");

        world.declare_war(a, b).expect("known civs");

        let rel = world.diplomacy.relation(a, b).expect("met");
        assert!(!rel.has_open_borders());
        assert_eq!(rel.trade_count(), 0);
        let position = world.unit(scout).map(|u| u.position).expect("unit");
        assert_eq!(world.tile_owner(&position), None);
        assert_eq!(TileCoord::new(1, 0).distance(&position), 1);
    }

    #[test]
    fn test_peace_moves_units_out_of_former_enemy() {
        let (mut world, a, b) = two_civ_world();
        world.found_city(b, TileCoord::new(0, 0), "Ur").expect("site");
        world.declare_war(a, b).expect("known civs");
        let raider = world
            .add_unit(a, UnitType::Horseman, TileCoord::new(1, 0))
            .expect("valid unit");

        world.make_peace(b, a).expect("known civs");

        let position = world.unit(raider).map(|u| u.position).expect("unit");
        assert_eq!(world.tile_owner(&position), None);
        assert_eq!(TileCoord::new(1, 0).distance(&position), 1);
    }

    #[test]
    fn test_next_turn_expires_agreements() {
        let (mut world, a, b) = two_civ_world();
        world.rules.agreement_duration = 3;
        let offer = TradeOffer::open_borders_for(&world.rules);
        world
            .conclude_trade(a, b, Trade::new().with_our_offer(offer))
            .expect("at peace");
        let unit = world
            .add_unit(a, UnitType::Warrior, TileCoord::new(4, 4))
            .expect("valid unit");
        if let Some(u) = world.unit_mut(unit) {
            u.use_movement(2);
        }

        world.next_turn();
        assert_eq!(world.turn, 2);
        assert_eq!(world.unit(unit).map(|u| u.movement), Some(2));
        world.next_turn();
        assert!(world.diplomacy.relation(a, b).map(|r| r.has_open_borders()).unwrap_or(false));
        world.next_turn();
        assert!(!world.diplomacy.relation(a, b).map(|r| r.has_open_borders()).unwrap_or(true));
    }

    #[test]
    fn test_world_serialization_roundtrip() {
        let (mut world, a, b) = two_civ_world();
        world.found_city(a, TileCoord::new(2, 2), "Babylon").expect("site");
        world.add_unit(b, UnitType::Archer, TileCoord::new(7, 7)).expect("unit");
        world
            .conclude_trade(a, b, Trade::new().with_our_offer(TradeOffer::open_borders(30)))
            .expect("at peace");

        let json = serde_json::to_string(&world).expect("serialize");
        let restored: World = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.civs(), world.civs());
        assert_eq!(restored.territory_of(a), world.territory_of(a));
        assert_eq!(restored.units().count(), 1);
        assert!(restored
            .diplomacy
            .relation(a, b)
            .map(|r| r.grants_open_borders(a))
            .unwrap_or(false));
    }
}
