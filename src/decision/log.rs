use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::decision::{Decision, RecordedScores};
use crate::error::GameError;
use crate::metrics::MetricVector;
use crate::scoring::methods::round1;
use crate::scoring::ScoreMethod;

/// Per-method arithmetic mean over the decisions that carry that score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreAverages {
    pub decisions: usize,
    pub bao: Option<f64>,
    pub saw: Option<f64>,
    pub topsis: Option<f64>,
    pub vikor_s: Option<f64>,
    pub vikor_r: Option<f64>,
    pub ahp: Option<f64>,
    pub electre: Option<f64>,
    pub mavt: Option<f64>,
}

impl ScoreAverages {
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

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelinePoint {
    pub sequence: usize,
    pub day: u32,
    pub question_id: String,
    pub metrics_after: MetricVector,
    pub scores: RecordedScores,
}

/// Append-only decision history of one game, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionLog {
    game_id: String,
    decisions: Vec<Decision>,
}

impl DecisionLog {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            decisions: Vec::new(),
        }
    }

    /// Rebuilds a log from stored records, keeping only this game's
    /// decisions and restoring submission order.
    pub fn from_records(game_id: impl Into<String>, records: Vec<Decision>) -> Self {
        let game_id = game_id.into();
        let mut decisions = records
            .into_iter()
            .filter(|d| d.game_id == game_id)
            .collect::<Vec<_>>();
        decisions.sort_by(|a, b| a.day.cmp(&b.day).then(a.created_at.cmp(&b.created_at)));
        Self { game_id, decisions }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn append(&mut self, decision: Decision) -> Result<(), GameError> {
        if decision.game_id != self.game_id {
            return Err(GameError::invalid_state(format!(
                "decision {} belongs to game {}, not {}",
                decision.id, decision.game_id, self.game_id
            )));
        }
        self.decisions.push(decision);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn last(&self) -> Option<&Decision> {
        self.decisions.last()
    }

    pub fn answered_ids(&self) -> HashSet<String> {
        self.decisions
            .iter()
            .map(|d| d.question_id.clone())
            .collect()
    }

    /// Display order: latest day first, then latest submission first.
    pub fn newest_first(&self) -> Vec<&Decision> {
        let mut out = self.decisions.iter().collect::<Vec<_>>();
        out.sort_by(|a, b| b.day.cmp(&a.day).then(b.created_at.cmp(&a.created_at)));
        out
    }

    pub fn timeline(&self) -> Vec<TimelinePoint> {
        self.decisions
            .iter()
            .enumerate()
            .map(|(idx, d)| TimelinePoint {
                sequence: idx + 1,
                day: d.day,
                question_id: d.question_id.clone(),
                metrics_after: d.metrics_after,
                scores: d.scores,
            })
            .collect()
    }

    pub fn averages(&self) -> ScoreAverages {
        let mean = |method: ScoreMethod| -> Option<f64> {
            let values = self
                .decisions
                .iter()
                .filter_map(|d| d.scores.get(method))
                .collect::<Vec<_>>();
            if values.is_empty() {
                None
            } else {
                Some(round1(values.iter().sum::<f64>() / values.len() as f64))
            }
        };

        ScoreAverages {
            decisions: self.decisions.len(),
            bao: mean(ScoreMethod::Bao),
            saw: mean(ScoreMethod::Saw),
            topsis: mean(ScoreMethod::Topsis),
            vikor_s: mean(ScoreMethod::VikorS),
            vikor_r: mean(ScoreMethod::VikorR),
            ahp: mean(ScoreMethod::Ahp),
            electre: mean(ScoreMethod::Electre),
            mavt: mean(ScoreMethod::Mavt),
        }
    }
}
