use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::decision::{Decision, RecordedScores};
use crate::error::GameResult;
use crate::game::GameRecord;
use crate::metrics::MetricVector;
use crate::scenario::{Department, HotelType, Scenario};
use crate::store::migrations::BASE_MIGRATION;
use crate::store::GameStore;

const DECISION_COLUMNS: &str = "id, game_id, player_id, question_id, selected_option_index, day, \
     scenario_text, selected_option_text, metrics_before_json, metrics_after_json, \
     bao, saw, topsis, vikor_s, vikor_r, ahp, electre, mavt, created_at";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> GameResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> GameResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> GameResult<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    fn upsert_game(conn: &Connection, record: &GameRecord) -> GameResult<()> {
        conn.execute(
            r#"
INSERT INTO games(
    game_id, player_id, hotel_type, role, current_day, completed_turns,
    record_json, created_at, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
ON CONFLICT(game_id) DO UPDATE SET
    current_day = excluded.current_day,
    completed_turns = excluded.completed_turns,
    record_json = excluded.record_json,
    updated_at = excluded.updated_at
"#,
            params![
                record.game_id,
                record.player_id,
                record.setup.hotel_type.as_slug(),
                record.setup.role.as_slug(),
                record.state.current_day as i64,
                record.state.completed_turns as i64,
                serde_json::to_string(record)?,
                timestamp(record.created_at),
                timestamp(record.updated_at)
            ],
        )?;
        Ok(())
    }

    fn insert_decision(conn: &Connection, decision: &Decision) -> GameResult<()> {
        let s = &decision.scores;
        conn.execute(
            &format!(
                "INSERT INTO decisions({DECISION_COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
            ),
            params![
                decision.id,
                decision.game_id,
                decision.player_id,
                decision.question_id,
                decision.selected_option_index as i64,
                decision.day as i64,
                decision.scenario_text,
                decision.selected_option_text,
                serde_json::to_string(&decision.metrics_before)?,
                serde_json::to_string(&decision.metrics_after)?,
                s.bao,
                s.saw,
                s.topsis,
                s.vikor_s,
                s.vikor_r,
                s.ahp,
                s.electre,
                s.mavt,
                timestamp(decision.created_at)
            ],
        )?;
        Ok(())
    }

    fn query_game(&self, sql: &str, key: &str) -> GameResult<Option<GameRecord>> {
        let json = self
            .conn
            .query_row(sql, params![key], |row| row.get::<_, String>(0))
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl GameStore for SqliteStore {
    fn create_game(&self, record: &GameRecord) -> GameResult<()> {
        Self::upsert_game(&self.conn, record)
    }

    fn save_game(&self, record: &GameRecord) -> GameResult<()> {
        Self::upsert_game(&self.conn, record)
    }

    fn load_game(&self, game_id: &str) -> GameResult<Option<GameRecord>> {
        self.query_game("SELECT record_json FROM games WHERE game_id = ?1", game_id)
    }

    fn latest_game_for_player(&self, player_id: &str) -> GameResult<Option<GameRecord>> {
        self.query_game(
            r#"
SELECT record_json
FROM games
WHERE player_id = ?1
ORDER BY updated_at DESC
LIMIT 1
"#,
            player_id,
        )
    }

    fn record_turn(&self, record: &GameRecord, decision: &Decision) -> GameResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        Self::insert_decision(&tx, decision)?;
        Self::upsert_game(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    fn load_decisions(&self, game_id: &str) -> GameResult<Vec<Decision>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DECISION_COLUMNS} FROM decisions WHERE game_id = ?1 ORDER BY day ASC, created_at ASC"
        ))?;
        let rows = stmt
            .query_map(params![game_id], row_to_decision_parts)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(DecisionRow::into_decision).collect()
    }

    fn upsert_scenario(&self, scenario: &Scenario) -> GameResult<()> {
        self.conn.execute(
            r#"
INSERT INTO scenarios(id, department, difficulty, scenario_json, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(id) DO UPDATE SET
    department = excluded.department,
    difficulty = excluded.difficulty,
    scenario_json = excluded.scenario_json,
    updated_at = excluded.updated_at
"#,
            params![
                scenario.id,
                scenario.department.as_slug(),
                scenario.difficulty as i64,
                serde_json::to_string(scenario)?,
                timestamp(Utc::now())
            ],
        )?;
        Ok(())
    }

    fn get_scenario(&self, id: &str) -> GameResult<Option<Scenario>> {
        let json = self
            .conn
            .query_row(
                "SELECT scenario_json FROM scenarios WHERE id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn list_scenarios(&self, department: Option<Department>) -> GameResult<Vec<Scenario>> {
        let rows = if let Some(department) = department {
            let mut stmt = self.conn.prepare(
                "SELECT scenario_json FROM scenarios WHERE department = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map(params![department.as_slug()], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        } else {
            let mut stmt = self
                .conn
                .prepare("SELECT scenario_json FROM scenarios ORDER BY department ASC, id ASC")?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };
        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(Into::into))
            .collect()
    }

    fn delete_scenario(&self, id: &str) -> GameResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM scenarios WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn get_baseline(&self, hotel_type: HotelType) -> GameResult<Option<MetricVector>> {
        let json = self
            .conn
            .query_row(
                "SELECT metrics_json FROM hotel_baselines WHERE hotel_type = ?1",
                params![hotel_type.as_slug()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set_baseline(&self, hotel_type: HotelType, metrics: &MetricVector) -> GameResult<()> {
        self.conn.execute(
            r#"
INSERT INTO hotel_baselines(hotel_type, metrics_json, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(hotel_type) DO UPDATE SET
    metrics_json = excluded.metrics_json,
    updated_at = excluded.updated_at
"#,
            params![
                hotel_type.as_slug(),
                serde_json::to_string(metrics)?,
                timestamp(Utc::now())
            ],
        )?;
        Ok(())
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

struct DecisionRow {
    id: String,
    game_id: String,
    player_id: String,
    question_id: String,
    selected_option_index: i64,
    day: i64,
    scenario_text: String,
    selected_option_text: String,
    metrics_before_json: String,
    metrics_after_json: String,
    scores: RecordedScores,
    created_at: String,
}

impl DecisionRow {
    fn into_decision(self) -> GameResult<Decision> {
        Ok(Decision {
            id: self.id,
            player_id: self.player_id,
            game_id: self.game_id,
            question_id: self.question_id,
            selected_option_index: self.selected_option_index.max(0) as usize,
            day: self.day.max(0) as u32,
            scenario_text: self.scenario_text,
            selected_option_text: self.selected_option_text,
            metrics_before: serde_json::from_str(&self.metrics_before_json)?,
            metrics_after: serde_json::from_str(&self.metrics_after_json)?,
            scores: self.scores,
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

fn row_to_decision_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<DecisionRow> {
    Ok(DecisionRow {
        id: row.get(0)?,
        game_id: row.get(1)?,
        player_id: row.get(2)?,
        question_id: row.get(3)?,
        selected_option_index: row.get(4)?,
        day: row.get(5)?,
        scenario_text: row.get(6)?,
        selected_option_text: row.get(7)?,
        metrics_before_json: row.get(8)?,
        metrics_after_json: row.get(9)?,
        scores: RecordedScores {
            bao: row.get(10)?,
            saw: row.get(11)?,
            topsis: row.get(12)?,
            vikor_s: row.get(13)?,
            vikor_r: row.get(14)?,
            ahp: row.get(15)?,
            electre: row.get(16)?,
            mavt: row.get(17)?,
        },
        created_at: row.get(18)?,
    })
}
