pub mod migrations;
pub mod sqlite;

use crate::decision::Decision;
use crate::error::GameResult;
use crate::game::GameRecord;
use crate::metrics::MetricVector;
use crate::scenario::{Department, HotelType, Scenario};

pub use sqlite::SqliteStore;

/// Persistence seam for games, their decisions, authored scenarios and
/// hotel baselines.
pub trait GameStore {
    fn create_game(&self, record: &GameRecord) -> GameResult<()>;
    fn save_game(&self, record: &GameRecord) -> GameResult<()>;
    fn load_game(&self, game_id: &str) -> GameResult<Option<GameRecord>>;
    fn latest_game_for_player(&self, player_id: &str) -> GameResult<Option<GameRecord>>;

    /// Persists the post-decision game record and the new decision together,
    /// or neither.
    fn record_turn(&self, record: &GameRecord, decision: &Decision) -> GameResult<()>;
    fn load_decisions(&self, game_id: &str) -> GameResult<Vec<Decision>>;

    fn upsert_scenario(&self, scenario: &Scenario) -> GameResult<()>;
    fn get_scenario(&self, id: &str) -> GameResult<Option<Scenario>>;
    fn list_scenarios(&self, department: Option<Department>) -> GameResult<Vec<Scenario>>;
    fn delete_scenario(&self, id: &str) -> GameResult<bool>;

    fn get_baseline(&self, hotel_type: HotelType) -> GameResult<Option<MetricVector>>;
    fn set_baseline(&self, hotel_type: HotelType, metrics: &MetricVector) -> GameResult<()>;
}
