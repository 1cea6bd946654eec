pub mod methods;
pub mod rating;

use serde::{Deserialize, Serialize};

use crate::metrics::{EffectVector, WeightTable};
use crate::scoring::methods::{
    ahp_score, bao_score, electre_score, mavt_score, saw_score, topsis_score, vikor_scores,
};

pub use rating::ScoreRating;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    Bao,
    Saw,
    Topsis,
    VikorS,
    VikorR,
    Ahp,
    Electre,
    Mavt,
}

impl ScoreMethod {
    pub const ALL: [ScoreMethod; 8] = [
        ScoreMethod::Bao,
        ScoreMethod::Saw,
        ScoreMethod::Topsis,
        ScoreMethod::VikorS,
        ScoreMethod::VikorR,
        ScoreMethod::Ahp,
        ScoreMethod::Electre,
        ScoreMethod::Mavt,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Bao => "bao",
            Self::Saw => "saw",
            Self::Topsis => "topsis",
            Self::VikorS => "vikor_s",
            Self::VikorR => "vikor_r",
            Self::Ahp => "ahp",
            Self::Electre => "electre",
            Self::Mavt => "mavt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bao => "BAO",
            Self::Saw => "SAW",
            Self::Topsis => "TOPSIS",
            Self::VikorS => "VIKOR S",
            Self::VikorR => "VIKOR R",
            Self::Ahp => "AHP",
            Self::Electre => "ELECTRE",
            Self::Mavt => "MAVT",
        }
    }

    /// VIKOR regrets are the only indicators where a lower value is better.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Self::VikorS | Self::VikorR)
    }
}

/// All indicators for one decision, each rounded to one decimal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreCard {
    pub bao: f64,
    pub saw: f64,
    pub topsis: f64,
    pub vikor_s: f64,
    pub vikor_r: f64,
    pub ahp: f64,
    pub electre: f64,
    pub mavt: f64,
}

impl ScoreCard {
    pub fn get(&self, method: ScoreMethod) -> f64 {
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

    pub fn rating(&self) -> ScoreRating {
        ScoreRating::from_score(self.bao)
    }
}

/// Scores the intrinsic effect of an option. Callers pass the authored
/// effect, never the clamped metric difference.
pub fn compute_scores(effect: &EffectVector, weights: &WeightTable) -> ScoreCard {
    let (vikor_s, vikor_r) = vikor_scores(effect, weights);
    ScoreCard {
        bao: bao_score(effect, weights),
        saw: saw_score(effect, weights),
        topsis: topsis_score(effect, weights),
        vikor_s,
        vikor_r,
        ahp: ahp_score(effect, weights),
        electre: electre_score(effect, weights),
        mavt: mavt_score(effect, weights),
    }
}

#[cfg(test)]
mod tests {
    use crate::metrics::{EffectVector, WeightTable};
    use crate::scoring::{compute_scores, ScoreMethod, ScoreRating};

    #[test]
    fn compute_scores_fills_every_method() {
        let effect = EffectVector::new(10.0, -20.0, 0.0, 0.0, 0.0);
        let card = compute_scores(&effect, &WeightTable::default());
        assert_eq!(card.bao, -2.5);
        assert_eq!(card.saw, card.bao);
        assert_eq!(card.topsis, -1.7);
        assert_eq!(card.vikor_s, 5.0);
        assert_eq!(card.vikor_r, 5.0);
        assert_eq!(card.ahp, -0.6);
        assert_eq!(card.electre, 0.0);
        assert_eq!(card.mavt, -0.8);
        assert_eq!(card.get(ScoreMethod::Topsis), -1.7);
        assert_eq!(card.rating(), ScoreRating::Caution);
    }

    #[test]
    fn only_vikor_is_lower_better() {
        let lower: Vec<_> = ScoreMethod::ALL
            .iter()
            .filter(|m| m.lower_is_better())
            .collect();
        assert_eq!(lower, vec![&ScoreMethod::VikorS, &ScoreMethod::VikorR]);
    }
}
