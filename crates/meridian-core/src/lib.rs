//! Meridian Core Library
//!
//! Rules for handing units between civilizations in a turn-based 4X strategy
//! game, together with the world model those rules read: a tile map, cities
//! and their territory, units, and the diplomacy and trades that open or
//! close borders.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: This crate is purely game logic
//! - **Explicit refresh**: cached diplomatic flags change only at well-defined points
//! - **Total queries**: eligibility checks answer, they never panic
//! - **Serializable**: All state can be saved/loaded via serde

// Core modules
pub mod coord;
pub mod map;
pub mod terrain;
pub mod types;

// World state
pub mod city;
pub mod civilization;
pub mod rules;
pub mod unit;
pub mod world;

// Diplomacy and trading
pub mod diplomacy;
pub mod trade;

// Unit actions
pub mod gifting;

// Re-exports for convenience
pub use city::City;
pub use civilization::Civilization;
pub use coord::TileCoord;
pub use diplomacy::{
    BordersClosed, DiplomacyError, DiplomacyRelation, DiplomacyState, RelationSide,
};
pub use gifting::{
    can_gift_unit, check_gift, gift_action, GiftAction, GiftBlocker, GiftError, GiftOutcome,
};
pub use map::{Map, Tile};
pub use rules::{GameRules, RulesError};
pub use terrain::Terrain;
pub use trade::{Trade, TradeOffer, TradeType, OPEN_BORDERS};
pub use types::*;
pub use unit::{Unit, UnitCategory, UnitType};
pub use world::{World, WorldError};
