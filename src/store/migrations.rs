pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    game_id TEXT PRIMARY KEY,
    player_id TEXT NOT NULL,
    hotel_type TEXT NOT NULL,
    role TEXT NOT NULL,
    current_day INTEGER NOT NULL,
    completed_turns INTEGER NOT NULL,
    record_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_games_player_updated
    ON games(player_id, updated_at DESC);

CREATE TABLE IF NOT EXISTS decisions (
    id TEXT PRIMARY KEY,
    game_id TEXT NOT NULL,
    player_id TEXT NOT NULL,
    question_id TEXT NOT NULL,
    selected_option_index INTEGER NOT NULL,
    day INTEGER NOT NULL,
    scenario_text TEXT NOT NULL,
    selected_option_text TEXT NOT NULL,
    metrics_before_json TEXT NOT NULL,
    metrics_after_json TEXT NOT NULL,
    bao REAL,
    saw REAL,
    topsis REAL,
    vikor_s REAL,
    vikor_r REAL,
    ahp REAL,
    electre REAL,
    mavt REAL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_decisions_game_day
    ON decisions(game_id, day, created_at);

CREATE TABLE IF NOT EXISTS scenarios (
    id TEXT PRIMARY KEY,
    department TEXT NOT NULL,
    difficulty INTEGER NOT NULL,
    scenario_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scenarios_department
    ON scenarios(department);

CREATE TABLE IF NOT EXISTS hotel_baselines (
    hotel_type TEXT PRIMARY KEY,
    metrics_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
