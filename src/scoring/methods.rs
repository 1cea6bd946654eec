//! Simplified multi-criteria indicators computed from a single effect vector.
//!
//! Every function is total: an all-zero effect scores 0 everywhere, and a
//! zero denominator yields 0 rather than NaN.

use crate::metrics::{EffectVector, WeightTable};

/// Magnitude used to standardize effects (authored effects sit roughly in [-20, 20]).
pub const MAX_EFFECT_MAGNITUDE: f64 = 20.0;
pub const MIN_EFFECT_MAGNITUDE: f64 = -20.0;
pub const ELECTRE_DISCORDANCE_THRESHOLD: f64 = -5.0;
pub const MAVT_NEGATIVE_PENALTY: f64 = 1.5;
pub const SCORE_SCALE: f64 = 5.0;

pub fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn weighted_sum(effect: &EffectVector, weights: &WeightTable) -> f64 {
    weights
        .iter()
        .map(|(key, weight)| effect.get(key) * weight)
        .sum()
}

/// Weighted-sum score. SAW is the same quantity under a different name.
pub fn bao_score(effect: &EffectVector, weights: &WeightTable) -> f64 {
    round1(weighted_sum(effect, weights))
}

pub fn saw_score(effect: &EffectVector, weights: &WeightTable) -> f64 {
    bao_score(effect, weights)
}

/// Share of the weighted magnitude that is positive, mapped onto [-5, 5].
pub fn topsis_score(effect: &EffectVector, weights: &WeightTable) -> f64 {
    let mut positive = 0.0;
    let mut magnitude = 0.0;
    for (key, weight) in weights.iter() {
        let value = effect.get(key);
        positive += value.max(0.0) * weight;
        magnitude += value.abs() * weight;
    }
    if magnitude == 0.0 {
        return 0.0;
    }
    let ratio = positive / magnitude;
    round1((ratio * 10.0 - SCORE_SCALE).clamp(-SCORE_SCALE, SCORE_SCALE))
}

/// Group regret S and individual regret R over the negative effects only.
/// Lower is better; 0 when nothing gets worse.
pub fn vikor_scores(effect: &EffectVector, weights: &WeightTable) -> (f64, f64) {
    let mut s = 0.0_f64;
    let mut r = 0.0_f64;
    for (key, weight) in weights.iter() {
        let value = effect.get(key);
        if value < 0.0 {
            let regret = value.abs() * weight;
            s += regret;
            r = r.max(regret);
        }
    }
    (round1(s), round1(r))
}

pub fn ahp_score(effect: &EffectVector, weights: &WeightTable) -> f64 {
    let total_weight = weights.total();
    if total_weight == 0.0 {
        return 0.0;
    }
    let standardized: f64 = weights
        .iter()
        .map(|(key, weight)| weight * (effect.get(key) / MAX_EFFECT_MAGNITUDE))
        .sum();
    round1(standardized / total_weight * SCORE_SCALE)
}

/// Concordance (weights of improving criteria) minus discordance (weights of
/// criteria dropping below the veto threshold).
pub fn electre_score(effect: &EffectVector, weights: &WeightTable) -> f64 {
    let mut concordance = 0.0;
    let mut discordance = 0.0;
    for (key, weight) in weights.iter() {
        let value = effect.get(key);
        if value > 0.0 {
            concordance += weight;
        }
        if value < ELECTRE_DISCORDANCE_THRESHOLD {
            discordance += weight;
        }
    }
    round1((concordance - discordance) * SCORE_SCALE)
}

/// Loss-averse weighted sum: negative effects count 1.5x before weighting.
/// The raw value is rescaled onto [-5, 5] against the assumed raw bounds,
/// separately on each side of zero so a neutral decision stays at 0.
pub fn mavt_score(effect: &EffectVector, weights: &WeightTable) -> f64 {
    let raw: f64 = weights
        .iter()
        .map(|(key, weight)| {
            let value = effect.get(key);
            let utility = if value < 0.0 {
                value * MAVT_NEGATIVE_PENALTY
            } else {
                value
            };
            utility * weight
        })
        .sum();

    let total_weight = weights.total();
    let raw_min = MIN_EFFECT_MAGNITUDE * MAVT_NEGATIVE_PENALTY * total_weight;
    let raw_max = MAX_EFFECT_MAGNITUDE * total_weight;

    let scaled = if raw >= 0.0 {
        if raw_max > 0.0 {
            raw / raw_max * SCORE_SCALE
        } else {
            0.0
        }
    } else if raw_min < 0.0 {
        raw / raw_min.abs() * SCORE_SCALE
    } else {
        0.0
    };
    round1(scaled.clamp(-SCORE_SCALE, SCORE_SCALE))
}
