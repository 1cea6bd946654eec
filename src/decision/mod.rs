pub mod log;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricVector;
use crate::scoring::{ScoreCard, ScoreMethod};

pub use log::{DecisionLog, ScoreAverages, TimelinePoint};

/// Scores as persisted. Decisions written before an indicator existed carry
/// `None` for it, which is distinct from a real score of 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct RecordedScores {
    #[serde(default)]
    pub bao: Option<f64>,
    #[serde(default)]
    pub saw: Option<f64>,
    #[serde(default)]
    pub topsis: Option<f64>,
    #[serde(default)]
    pub vikor_s: Option<f64>,
    #[serde(default)]
    pub vikor_r: Option<f64>,
    #[serde(default)]
    pub ahp: Option<f64>,
    #[serde(default)]
    pub electre: Option<f64>,
    #[serde(default)]
    pub mavt: Option<f64>,
}

impl RecordedScores {
    pub fn get(&self, method: ScoreMethod) -> Option<f64> {
        match method {
            ScoreMethod::Bao => self.bao,
            ScoreMethod::Saw => self.saw,
            ScoreMethod::Topsis => self.topsis,
            ScoreMethod::VikorS => self.vikor_s,
            ScoreMethod::VikorR => self.vikor_r,
            ScoreMethod::Ahp => self.ahp,
            ScoreMethod::Electre => self.electre,
            ScoreMethod::Mavt => self.mavt,
        }
    }
}

impl From<ScoreCard> for RecordedScores {
    fn from(card: ScoreCard) -> Self {
        Self {
            bao: Some(card.bao),
            saw: Some(card.saw),
            topsis: Some(card.topsis),
            vikor_s: Some(card.vikor_s),
            vikor_r: Some(card.vikor_r),
            ahp: Some(card.ahp),
            electre: Some(card.electre),
            mavt: Some(card.mavt),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub id: String,
    pub player_id: String,
    pub game_id: String,
    pub question_id: String,
    pub selected_option_index: usize,
    pub day: u32,
    pub scenario_text: String,
    pub selected_option_text: String,
    pub metrics_before: MetricVector,
    pub metrics_after: MetricVector,
    #[serde(default)]
    pub scores: RecordedScores,
    pub created_at: DateTime<Utc>,
}
