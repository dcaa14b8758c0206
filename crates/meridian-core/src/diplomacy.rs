//! Diplomatic relations between pairs of civilizations.
//!
//! Each pair of civilizations shares exactly one [`DiplomacyRelation`]. Data
//! that differs per side (who opened their borders, how one side feels about
//! the other) lives in per-side slots inside that record, so the two views
//! of a relationship can never drift apart.
//!
//! The open borders flags are cached. They are derived from the trade list
//! only when [`DiplomacyRelation::update_has_open_borders`] runs; adding or
//! removing a trade leaves them untouched until then.

use crate::trade::Trade;
use crate::types::{CivId, DiplomaticStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors from diplomacy bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DiplomacyError {
    #[error("civilization {0} cannot hold relations with itself")]
    SelfRelation(CivId),
    #[error("civilization {civ} is not party to the relation between {a} and {b}")]
    NotParty { civ: CivId, a: CivId, b: CivId },
}

/// State held by one side of a relation about the other side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSide {
    /// Cached: this side has opened its borders to the other.
    pub grants_open_borders: bool,
    /// How this side regards the other. For a city-state this is the
    /// influence the other civilization holds with it.
    pub opinion: i32,
}

/// A grant of open borders that was withdrawn by a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BordersClosed {
    pub grantor: CivId,
    pub grantee: CivId,
}

/// The shared relation between two civilizations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyRelation {
    /// The two parties, lowest id first.
    civs: (CivId, CivId),
    pub status: DiplomaticStatus,
    /// Concluded trades, stored from the first party's point of view.
    trades: Vec<Trade>,
    /// Per-side state, indexed like `civs`.
    sides: [RelationSide; 2],
}

impl DiplomacyRelation {
    fn new(a: CivId, b: CivId) -> Self {
        Self {
            civs: (a.min(b), a.max(b)),
            status: DiplomaticStatus::Peace,
            trades: Vec::new(),
            sides: [RelationSide::default(), RelationSide::default()],
        }
    }

    /// The two parties, lowest id first.
    pub fn civs(&self) -> (CivId, CivId) {
        self.civs
    }

    /// The counterpart of `civ` in this relation.
    pub fn other(&self, civ: CivId) -> Option<CivId> {
        match self.side_index(civ)? {
            0 => Some(self.civs.1),
            _ => Some(self.civs.0),
        }
    }

    fn side_index(&self, civ: CivId) -> Option<usize> {
        if civ == self.civs.0 {
            Some(0)
        } else if civ == self.civs.1 {
            Some(1)
        } else {
            None
        }
    }

    fn require_side(&self, civ: CivId) -> Result<usize, DiplomacyError> {
        self.side_index(civ).ok_or(DiplomacyError::NotParty {
            civ,
            a: self.civs.0,
            b: self.civs.1,
        })
    }

    /// Per-side state held by `civ`.
    pub fn side(&self, civ: CivId) -> Option<&RelationSide> {
        self.side_index(civ).map(|i| &self.sides[i])
    }

    pub fn is_at_war(&self) -> bool {
        self.status == DiplomaticStatus::War
    }

    /// Record a trade initiated by `from`. Does not refresh open borders.
    pub fn add_trade(&mut self, from: CivId, trade: Trade) -> Result<(), DiplomacyError> {
        let trade = match self.require_side(from)? {
            0 => trade,
            _ => trade.reverse(),
        };
        self.trades.push(trade);
        Ok(())
    }

    /// Remove the trade at `index`. Does not refresh open borders.
    pub fn remove_trade(&mut self, index: usize) -> Option<Trade> {
        (index < self.trades.len()).then(|| self.trades.remove(index))
    }

    /// Drop every trade. Does not refresh open borders.
    pub fn clear_trades(&mut self) {
        self.trades.clear();
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    /// All trades as seen by `civ`, so that "our offers" are `civ`'s.
    pub fn trades_from(&self, civ: CivId) -> Result<Vec<Trade>, DiplomacyError> {
        let trades = match self.require_side(civ)? {
            0 => self.trades.clone(),
            _ => self.trades.iter().map(Trade::reverse).collect(),
        };
        Ok(trades)
    }

    /// Cached: has `grantor` opened its borders to the other side?
    pub fn grants_open_borders(&self, grantor: CivId) -> bool {
        self.side(grantor)
            .map(|side| side.grants_open_borders)
            .unwrap_or(false)
    }

    /// Cached: has either side opened its borders to the other?
    pub fn has_open_borders(&self) -> bool {
        self.sides.iter().any(|side| side.grants_open_borders)
    }

    /// Recompute both open borders flags from the current trades.
    ///
    /// Returns the grants that were withdrawn, so the caller can move units
    /// out of territory they may no longer occupy.
    pub fn update_has_open_borders(&mut self) -> Vec<BordersClosed> {
        let first_grants = self.trades.iter().any(Trade::we_grant_open_borders);
        let second_grants = self.trades.iter().any(Trade::they_grant_open_borders);

        let mut closed = Vec::new();
        for (index, now) in [(0, first_grants), (1, second_grants)] {
            let (grantor, grantee) = match index {
                0 => (self.civs.0, self.civs.1),
                _ => (self.civs.1, self.civs.0),
            };
            let side = &mut self.sides[index];
            if side.grants_open_borders != now {
                debug!(grantor, grantee, open = now, "open borders changed");
            }
            if side.grants_open_borders && !now {
                closed.push(BordersClosed { grantor, grantee });
            }
            side.grants_open_borders = now;
        }
        closed
    }

    /// Count down all timed trades by one turn and drop the ones that ran
    /// out. Does not refresh open borders.
    pub fn next_turn(&mut self) -> Vec<Trade> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.trades.len());
        for mut trade in self.trades.drain(..) {
            if trade.tick() {
                expired.push(trade);
            } else {
                kept.push(trade);
            }
        }
        self.trades = kept;
        expired
    }

    /// `holder`'s opinion of the other side.
    pub fn opinion(&self, holder: CivId) -> i32 {
        self.side(holder).map(|side| side.opinion).unwrap_or(0)
    }

    /// Adjust `holder`'s opinion of the other side.
    pub fn add_opinion(&mut self, holder: CivId, delta: i32) -> Result<i32, DiplomacyError> {
        let index = self.require_side(holder)?;
        let side = &mut self.sides[index];
        side.opinion = side.opinion.saturating_add(delta);
        Ok(side.opinion)
    }
}

/// All relations in the world, one per pair of civilizations that have met.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiplomacyState {
    /// Serialized as a sequence of pairs since JSON requires string keys.
    #[serde(with = "pair_key_map")]
    relations: BTreeMap<(CivId, CivId), DiplomacyRelation>,
}

/// Serialize a map keyed by civilization pairs as a list of entries.
mod pair_key_map {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(
        map: &BTreeMap<(CivId, CivId), DiplomacyRelation>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<(CivId, CivId), DiplomacyRelation>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let relations: Vec<DiplomacyRelation> = Deserialize::deserialize(deserializer)?;
        Ok(relations.into_iter().map(|rel| (rel.civs(), rel)).collect())
    }
}

fn pair_key(a: CivId, b: CivId) -> (CivId, CivId) {
    (a.min(b), a.max(b))
}

impl DiplomacyState {
    /// Get the relation between two civilizations, if they have one.
    pub fn relation(&self, a: CivId, b: CivId) -> Option<&DiplomacyRelation> {
        self.relations.get(&pair_key(a, b))
    }

    /// Get the relation between two civilizations, creating it on first use.
    pub fn relation_mut(
        &mut self,
        a: CivId,
        b: CivId,
    ) -> Result<&mut DiplomacyRelation, DiplomacyError> {
        if a == b {
            return Err(DiplomacyError::SelfRelation(a));
        }
        Ok(self
            .relations
            .entry(pair_key(a, b))
            .or_insert_with(|| DiplomacyRelation::new(a, b)))
    }

    /// Get an existing relation mutably without creating one.
    pub fn existing_relation_mut(&mut self, a: CivId, b: CivId) -> Option<&mut DiplomacyRelation> {
        self.relations.get_mut(&pair_key(a, b))
    }

    /// Check whether two civilizations have met.
    pub fn have_met(&self, a: CivId, b: CivId) -> bool {
        self.relation(a, b).is_some()
    }

    pub fn are_at_war(&self, a: CivId, b: CivId) -> bool {
        self.relation(a, b)
            .map(DiplomacyRelation::is_at_war)
            .unwrap_or(false)
    }

    /// Civilizations `civ` has a relation with.
    pub fn known_civs(&self, civ: CivId) -> Vec<CivId> {
        self.relations
            .values()
            .filter_map(|rel| rel.other(civ))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiplomacyRelation> {
        self.relations.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DiplomacyRelation> {
        self.relations.values_mut()
    }
}
