//! Trades concluded between civilizations.
//!
//! A trade is two directional offer lists: what the initiating side gives
//! ("our offers") and what the counterpart gives ("their offers"). Timed
//! offers such as agreements count down once per turn; when any timed offer
//! in a trade runs out the whole trade ends.

use crate::rules::GameRules;
use serde::{Deserialize, Serialize};

/// Name of the open borders agreement.
pub const OPEN_BORDERS: &str = "Open Borders";

/// Category of a single trade offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    Gold,
    GoldPerTurn,
    LuxuryResource,
    StrategicResource,
    Technology,
    City,
    /// Treaties such as open borders.
    Agreement,
    Introduction,
}

/// One item given by one side of a trade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    /// Item name, e.g. "Open Borders" or a resource name.
    pub name: String,
    pub kind: TradeType,
    /// Quantity (gold amount, resource count; 1 for agreements).
    pub amount: u32,
    /// Remaining turns. `None` for one-off items that never expire.
    pub duration: Option<u32>,
}

impl TradeOffer {
    pub fn new(name: impl Into<String>, kind: TradeType, amount: u32, duration: Option<u32>) -> Self {
        Self {
            name: name.into(),
            kind,
            amount,
            duration,
        }
    }

    /// An open borders agreement lasting `duration` turns.
    pub fn open_borders(duration: u32) -> Self {
        Self::new(OPEN_BORDERS, TradeType::Agreement, 1, Some(duration))
    }

    /// An open borders agreement of the standard length under `rules`.
    pub fn open_borders_for(rules: &GameRules) -> Self {
        Self::open_borders(rules.agreement_duration)
    }

    /// A lump sum of gold.
    pub fn gold(amount: u32) -> Self {
        Self::new("Gold", TradeType::Gold, amount, None)
    }

    /// Gold paid every turn for `duration` turns.
    pub fn gold_per_turn(amount: u32, duration: u32) -> Self {
        Self::new("Gold per turn", TradeType::GoldPerTurn, amount, Some(duration))
    }

    pub fn is_timed(&self) -> bool {
        self.duration.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.duration == Some(0)
    }

    /// Check if this offer opens the giver's borders.
    pub fn grants_open_borders(&self) -> bool {
        self.kind == TradeType::Agreement && self.name == OPEN_BORDERS && !self.is_expired()
    }

    fn tick(&mut self) {
        if let Some(turns) = self.duration.as_mut() {
            *turns = turns.saturating_sub(1);
        }
    }
}

/// A concluded trade, seen from the initiating side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Offers given by the initiating side.
    pub our_offers: Vec<TradeOffer>,
    /// Offers given by the counterpart.
    pub their_offers: Vec<TradeOffer>,
}

impl Trade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an offer given by the initiating side.
    pub fn with_our_offer(mut self, offer: TradeOffer) -> Self {
        self.our_offers.push(offer);
        self
    }

    /// Add an offer given by the counterpart.
    pub fn with_their_offer(mut self, offer: TradeOffer) -> Self {
        self.their_offers.push(offer);
        self
    }

    /// The same trade seen from the counterpart's side.
    pub fn reverse(&self) -> Trade {
        Trade {
            our_offers: self.their_offers.clone(),
            their_offers: self.our_offers.clone(),
        }
    }

    /// Does the initiating side open its borders in this trade?
    pub fn we_grant_open_borders(&self) -> bool {
        self.our_offers.iter().any(TradeOffer::grants_open_borders)
    }

    /// Does the counterpart open its borders in this trade?
    pub fn they_grant_open_borders(&self) -> bool {
        self.their_offers.iter().any(TradeOffer::grants_open_borders)
    }

    /// Count down every timed offer by one turn.
    ///
    /// Returns true once any timed offer has run out, meaning the trade is
    /// over.
    pub fn tick(&mut self) -> bool {
        let mut expired = false;
        for offer in self.our_offers.iter_mut().chain(self.their_offers.iter_mut()) {
            if offer.is_timed() {
                offer.tick();
                expired |= offer.is_expired();
            }
        }
        expired
    }
}
