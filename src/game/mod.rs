pub mod achievements;
pub mod engine;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{MetricVector, WeightTable};
use crate::scenario::{Department, HotelType, Scenario};

pub use achievements::{evaluate_achievements, AchievementId};
pub use engine::{DecisionOutcome, GameSession};

pub const DEFAULT_MAX_TURNS: u32 = 10;
pub const DEFAULT_MIN_SCENARIOS_PER_DAY: usize = 1;
pub const DEFAULT_MAX_SCENARIOS_PER_DAY: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSetup {
    pub hotel_type: HotelType,
    pub role: Department,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GameRules {
    pub max_turns: u32,
    pub min_scenarios_per_day: usize,
    pub max_scenarios_per_day: usize,
    pub weights: WeightTable,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            min_scenarios_per_day: DEFAULT_MIN_SCENARIOS_PER_DAY,
            max_scenarios_per_day: DEFAULT_MAX_SCENARIOS_PER_DAY,
            weights: WeightTable::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub current_day: u32,
    pub completed_turns: u32,
    /// `None` until a baseline has been loaded for the game.
    #[serde(default)]
    pub metrics: Option<MetricVector>,
    #[serde(default)]
    pub achievements: BTreeSet<AchievementId>,
}

impl GameState {
    pub fn new(baseline: MetricVector) -> Self {
        Self {
            current_day: 1,
            completed_turns: 0,
            metrics: Some(baseline),
            achievements: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GamePhase {
    AwaitingDecision { remaining: usize },
    /// Nothing left to answer for the role today; the player waits for new content.
    NoContent,
    GameOver,
}

/// Persisted form of a game: everything except the decision log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub game_id: String,
    pub player_id: String,
    pub setup: GameSetup,
    pub state: GameState,
    #[serde(default)]
    pub active: Vec<Scenario>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn new_game_id(player_id: &str, now: DateTime<Utc>) -> String {
    format!("game_{}_{}", player_id, now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::game::{new_game_id, GamePhase};

    #[test]
    fn game_id_embeds_player_and_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(new_game_id("alice", now), "game_alice_1700000000123");
    }

    #[test]
    fn phase_serializes_with_tag() {
        let json =
            serde_json::to_value(GamePhase::AwaitingDecision { remaining: 2 }).expect("json");
        assert_eq!(json["phase"], "awaiting_decision");
        assert_eq!(json["remaining"], 2);
    }
}
