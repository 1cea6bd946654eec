use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::game::{
    GameRules, DEFAULT_MAX_SCENARIOS_PER_DAY, DEFAULT_MAX_TURNS, DEFAULT_MIN_SCENARIOS_PER_DAY,
};
use crate::metrics::WeightTable;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_session_path")]
    pub session_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_min_per_day")]
    pub min_scenarios_per_day: usize,
    #[serde(default = "default_max_per_day")]
    pub max_scenarios_per_day: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: WeightTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Inline key; `api_key_env` is consulted when this is empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<String>,
    pub session_path: Option<String>,
    pub llm_enabled: Option<bool>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/hotel-sim/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.max_turns == 0 {
            bail!("game.max_turns must be at least 1");
        }
        if self.game.min_scenarios_per_day == 0
            || self.game.min_scenarios_per_day > self.game.max_scenarios_per_day
        {
            bail!(
                "game.min_scenarios_per_day ({}) must be between 1 and max_scenarios_per_day ({})",
                self.game.min_scenarios_per_day,
                self.game.max_scenarios_per_day
            );
        }
        if self.scoring.weights.iter().any(|(_, w)| !w.is_finite() || w < 0.0)
            || self.scoring.weights.total() <= 0.0
        {
            bail!("scoring.weights must be non-negative with a positive total");
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path;
        }
        if let Some(session_path) = overrides.session_path {
            self.storage.session_path = session_path;
        }
        if let Some(enabled) = overrides.llm_enabled {
            self.llm.enabled = enabled;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_session_path(&self) -> PathBuf {
        expand_tilde(&self.storage.session_path)
    }

    pub fn rules(&self) -> GameRules {
        GameRules {
            max_turns: self.game.max_turns,
            min_scenarios_per_day: self.game.min_scenarios_per_day,
            max_scenarios_per_day: self.game.max_scenarios_per_day,
            weights: self.scoring.weights,
        }
    }

    pub fn default_template() -> String {
        let template = r#"[storage]
db_path = "~/.local/share/hotel-sim/hotel.db"
session_path = "~/.local/share/hotel-sim/session.json"

[game]
max_turns = 10
min_scenarios_per_day = 1
max_scenarios_per_day = 3

[scoring.weights]
revenue = 0.25
customerSatisfaction = 0.25
staffSatisfaction = 0.20
occupancyRate = 0.15
sustainability = 0.15

[llm]
enabled = false
endpoint = "https://api.openai.com/v1/chat/completions"
model = "gpt-4o-mini"
api_key = ""
api_key_env = "OPENAI_API_KEY"
timeout_secs = 30
max_tokens = 600

[server]
bind = "127.0.0.1:8080"
"#;
        template.to_string()
    }
}

impl LlmConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        if self.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            session_path: default_session_path(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            min_scenarios_per_day: default_min_per_day(),
            max_scenarios_per_day: default_max_per_day(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: String::new(),
            api_key_env: default_llm_api_key_env(),
            timeout_secs: default_llm_timeout_secs(),
            max_tokens: default_llm_max_tokens(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_db_path() -> String {
    "~/.local/share/hotel-sim/hotel.db".to_string()
}

fn default_session_path() -> String {
    "~/.local/share/hotel-sim/session.json".to_string()
}

fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

fn default_min_per_day() -> usize {
    DEFAULT_MIN_SCENARIOS_PER_DAY
}

fn default_max_per_day() -> usize {
    DEFAULT_MAX_SCENARIOS_PER_DAY
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_llm_max_tokens() -> u32 {
    600
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
