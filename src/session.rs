use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::scenario::{Department, HotelType};

/// Client-local pointer to the game in progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveSession {
    pub game_id: String,
    pub player_id: String,
    pub hotel_type: HotelType,
    pub role: Department,
}

impl ActiveSession {
    pub fn load(path: &Path) -> GameResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    pub fn require(path: &Path) -> GameResult<Self> {
        Self::load(path)?.ok_or_else(|| {
            GameError::MissingSetup(format!(
                "no active game session at {}; run new-game or pass --game",
                path.display()
            ))
        })
    }

    pub fn save(&self, path: &Path) -> GameResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Returns whether a session file was removed.
    pub fn clear(path: &Path) -> GameResult<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

/// Picks an explicit game id, falling back to the stored session.
pub fn resolve_game_id(explicit: Option<String>, session_path: &Path) -> GameResult<String> {
    match explicit {
        Some(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        _ => Ok(ActiveSession::require(session_path)?.game_id),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GameError;
    use crate::scenario::{Department, HotelType};
    use crate::session::{resolve_game_id, ActiveSession};

    #[test]
    fn missing_session_is_a_setup_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        assert!(ActiveSession::load(&path).expect("load").is_none());
        let err = resolve_game_id(None, &path).expect_err("no session");
        assert!(matches!(err, GameError::MissingSetup(_)));
        assert_eq!(
            resolve_game_id(Some("game_x_1".to_string()), &path).expect("explicit"),
            "game_x_1"
        );
    }

    #[test]
    fn save_load_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state").join("session.json");
        let session = ActiveSession {
            game_id: "game_p1_42".to_string(),
            player_id: "p1".to_string(),
            hotel_type: HotelType::FiveStar,
            role: Department::Hr,
        };
        session.save(&path).expect("save");
        assert_eq!(ActiveSession::require(&path).expect("load"), session);
        assert_eq!(resolve_game_id(None, &path).expect("resolve"), "game_p1_42");
        assert!(ActiveSession::clear(&path).expect("clear"));
        assert!(!ActiveSession::clear(&path).expect("clear again"));
    }
}
