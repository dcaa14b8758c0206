//! Gifting units to other civilizations.
//!
//! A unit may be handed to the civilization whose territory a destination
//! tile lies in. For a major civilization this needs open borders in at
//! least one direction between giver and recipient: either side having
//! opened its borders is enough. City-states take military units without
//! any agreement.
//!
//! Evaluation only reads the world and never fails: every reason a gift is
//! impossible is reported as a [`GiftBlocker`], never as a panic. The open
//! borders flags it reads are the cached ones, so a trade that has not been
//! followed by a refresh does not count yet.

use crate::coord::TileCoord;
use crate::types::{CivId, UnitId};
use crate::unit::UnitType;
use crate::world::{World, WorldError};
use thiserror::Error;
use tracing::{debug, info};

/// Reason a unit cannot be gifted to a tile's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GiftBlocker {
    #[error("unit {0} does not exist")]
    UnknownUnit(UnitId),
    #[error("tile {0} is not inside any civilization's territory")]
    UnownedTile(TileCoord),
    #[error("tile {0} already belongs to the unit's owner")]
    OwnTerritory(TileCoord),
    #[error("civilizations {0} and {1} have not met")]
    NoRelation(CivId, CivId),
    #[error("civilizations {0} and {1} are at war")]
    AtWar(CivId, CivId),
    #[error("neither {giver} nor {recipient} has opened its borders to the other")]
    ClosedBorders { giver: CivId, recipient: CivId },
    #[error("city-states only accept military units, not a {0}")]
    NotMilitary(UnitType),
    #[error("embarked units cannot be gifted")]
    Embarked,
}

/// Errors from executing a gift.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GiftError {
    #[error("gift is no longer possible: {0}")]
    Ineligible(#[from] GiftBlocker),
    #[error("the unit has no movement left this turn")]
    Disabled,
    #[error("tile {destination} now belongs to civilization {actual}, not {expected}")]
    RecipientChanged {
        destination: TileCoord,
        expected: CivId,
        actual: CivId,
    },
    #[error("the unit now belongs to civilization {actual}, not {expected}")]
    GiverChanged { expected: CivId, actual: CivId },
    #[error(transparent)]
    World(#[from] WorldError),
}

/// What happened to a gifted unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GiftOutcome {
    /// The unit now belongs to the recipient.
    Transferred { unit: UnitId, recipient: CivId },
    /// A great person given to a city-state is disbanded; the city-state
    /// still credits the giver.
    Disbanded { unit: UnitId, recipient: CivId },
}

/// An available "gift unit" action.
///
/// An action can exist while disabled: the unit qualifies but has spent its
/// movement this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GiftAction {
    pub unit: UnitId,
    pub unit_type: UnitType,
    pub giver: CivId,
    pub recipient: CivId,
    pub destination: TileCoord,
    enabled: bool,
}

impl GiftAction {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Carry out the gift against the current world.
    ///
    /// Eligibility is checked again first, so an action kept across world
    /// changes cannot be replayed. Both parties must still be the ones the
    /// action was built for.
    pub fn execute(&self, world: &mut World) -> Result<GiftOutcome, GiftError> {
        let current = check_gift(world, self.unit, self.destination)?;
        if current.giver != self.giver {
            return Err(GiftError::GiverChanged {
                expected: self.giver,
                actual: current.giver,
            });
        }
        if current.recipient != self.recipient {
            return Err(GiftError::RecipientChanged {
                destination: self.destination,
                expected: self.recipient,
                actual: current.recipient,
            });
        }
        if !current.enabled {
            return Err(GiftError::Disabled);
        }

        let city_state = world
            .civ(self.recipient)
            .map(|civ| civ.is_city_state())
            .ok_or(WorldError::UnknownCiv(self.recipient))?;
        let bonus = if city_state {
            world.rules.gift_influence_bonus
        } else {
            world.rules.gift_opinion_bonus
        };
        // check_gift found the relation, so it is never created here
        if let Some(rel) = world
            .diplomacy
            .existing_relation_mut(current.recipient, current.giver)
        {
            rel.add_opinion(current.recipient, bonus)
                .map_err(WorldError::from)?;
        }

        let outcome = if city_state && current.unit_type.is_great_person() {
            world.remove_unit(self.unit)?;
            GiftOutcome::Disbanded {
                unit: self.unit,
                recipient: self.recipient,
            }
        } else {
            world.transfer_unit(self.unit, self.recipient)?;
            GiftOutcome::Transferred {
                unit: self.unit,
                recipient: self.recipient,
            }
        };
        info!(
            unit = self.unit,
            unit_type = %self.unit_type,
            giver = current.giver,
            recipient = current.recipient,
            bonus,
            ?outcome,
            "unit gifted"
        );
        Ok(outcome)
    }
}

/// Decide whether `unit` can be gifted to the owner of `destination`.
pub fn check_gift(
    world: &World,
    unit: UnitId,
    destination: TileCoord,
) -> Result<GiftAction, GiftBlocker> {
    let unit = world.unit(unit).ok_or(GiftBlocker::UnknownUnit(unit))?;
    let giver = unit.owner;

    let recipient = world
        .tile_owner(&destination)
        .ok_or(GiftBlocker::UnownedTile(destination))?;
    if recipient == giver {
        return Err(GiftBlocker::OwnTerritory(destination));
    }

    let relation = world
        .diplomacy
        .relation(giver, recipient)
        .ok_or(GiftBlocker::NoRelation(giver, recipient))?;
    if relation.is_at_war() {
        return Err(GiftBlocker::AtWar(giver, recipient));
    }

    let city_state = world
        .civ(recipient)
        .map(|civ| civ.is_city_state())
        .unwrap_or(false);
    if city_state {
        if !unit.is_military() && !world.rules.city_states_accept_civilians {
            return Err(GiftBlocker::NotMilitary(unit.unit_type));
        }
    } else if !relation.grants_open_borders(giver) && !relation.grants_open_borders(recipient) {
        return Err(GiftBlocker::ClosedBorders { giver, recipient });
    }

    if unit.embarked {
        return Err(GiftBlocker::Embarked);
    }

    Ok(GiftAction {
        unit: unit.id,
        unit_type: unit.unit_type,
        giver,
        recipient,
        destination,
        enabled: unit.can_move(),
    })
}

/// The gift action for `unit` at `destination`, if one exists.
pub fn gift_action(world: &World, unit: UnitId, destination: TileCoord) -> Option<GiftAction> {
    match check_gift(world, unit, destination) {
        Ok(action) => Some(action),
        Err(blocker) => {
            debug!(unit, destination = %destination, %blocker, "no gift action");
            None
        }
    }
}

/// Check whether `unit` can be gifted right now to the owner of `destination`.
pub fn can_gift_unit(world: &World, unit: UnitId, destination: TileCoord) -> bool {
    gift_action(world, unit, destination).is_some_and(|action| action.is_enabled())
}
