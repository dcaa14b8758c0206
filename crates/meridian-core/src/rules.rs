//! Tunable rule constants.
//!
//! Rules are plain data so a host can ship them as JSON next to its other
//! game content. Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule constants consulted by world mutations and the gift action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Opinion a major civilization gains of a civ that gifts it a unit.
    pub gift_opinion_bonus: i32,
    /// Influence gained with a city-state by gifting it a unit.
    pub gift_influence_bonus: i32,
    /// Let city-states accept civilian units as gifts.
    pub city_states_accept_civilians: bool,
    /// Default length of agreements such as open borders, in turns.
    pub agreement_duration: u32,
    /// Rings of tiles claimed around a newly founded city.
    pub initial_city_radius: u32,
    /// Maximum number of civilizations in one world.
    pub max_civilizations: u8,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            gift_opinion_bonus: 5,
            gift_influence_bonus: 5,
            city_states_accept_civilians: false,
            agreement_duration: 30,
            initial_city_radius: 1,
            max_civilizations: 16,
        }
    }
}

impl GameRules {
    /// Parse rules from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: GameRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Serialize rules to pretty JSON.
    pub fn to_json(&self) -> Result<String, RulesError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate rules and return the first problem found.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.gift_opinion_bonus < 0 {
            return Err(RulesError::NegativeBonus("gift_opinion_bonus"));
        }
        if self.gift_influence_bonus < 0 {
            return Err(RulesError::NegativeBonus("gift_influence_bonus"));
        }
        if self.agreement_duration == 0 {
            return Err(RulesError::ZeroAgreementDuration);
        }
        if self.initial_city_radius > 3 {
            return Err(RulesError::CityRadiusTooLarge(self.initial_city_radius));
        }
        if self.max_civilizations < 2 {
            return Err(RulesError::TooFewCivilizations);
        }
        Ok(())
    }
}

/// Errors from loading or validating rules.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("invalid rules JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} cannot be negative")]
    NegativeBonus(&'static str),
    #[error("agreements must last at least one turn")]
    ZeroAgreementDuration,
    #[error("initial city radius {0} is larger than 3")]
    CityRadiusTooLarge(u32),
    #[error("a world needs room for at least 2 civilizations")]
    TooFewCivilizations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = GameRules::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.agreement_duration, 30);
        assert!(!rules.city_states_accept_civilians);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let rules = GameRules::from_json(r#"{ "gift_opinion_bonus": 12 }"#).expect("valid rules");
        assert_eq!(rules.gift_opinion_bonus, 12);
        assert_eq!(rules.gift_influence_bonus, 5);
        assert_eq!(rules.max_civilizations, 16);
    }

    #[test]
    fn test_json_roundtrip() {
        let rules = GameRules {
            city_states_accept_civilians: true,
            ..GameRules::default()
        };
        let json = rules.to_json().expect("serialize");
        assert_eq!(GameRules::from_json(&json).expect("parse"), rules);
    }

    #[test]
    fn test_invalid_rules() {
        assert!(matches!(
            GameRules::from_json(r#"{ "gift_influence_bonus": -1 }"#),
            Err(RulesError::NegativeBonus("gift_influence_bonus"))
        ));
        assert!(matches!(
            GameRules::from_json(r#"{ "agreement_duration": 0 }"#),
            Err(RulesError::ZeroAgreementDuration)
        ));
        assert!(matches!(
            GameRules::from_json(r#"{ "initial_city_radius": 5 }"#),
            Err(RulesError::CityRadiusTooLarge(5))
        ));
        assert!(matches!(
            GameRules::from_json("not json"),
            Err(RulesError::Parse(_))
        ));
    }
}
