use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRating {
    Poor,
    Caution,
    Neutral,
    Good,
    Excellent,
}

impl ScoreRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            Self::Excellent
        } else if score >= 1.0 {
            Self::Good
        } else if score >= -1.0 {
            Self::Neutral
        } else if score >= -4.0 {
            Self::Caution
        } else {
            Self::Poor
        }
    }
}

impl Display for ScoreRating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Poor => "Poor",
            Self::Caution => "Caution",
            Self::Neutral => "Neutral",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use crate::scoring::rating::ScoreRating;

    #[test]
    fn band_edges_are_inclusive() {
        assert_eq!(ScoreRating::from_score(4.0), ScoreRating::Excellent);
        assert_eq!(ScoreRating::from_score(3.9), ScoreRating::Good);
        assert_eq!(ScoreRating::from_score(1.0), ScoreRating::Good);
        assert_eq!(ScoreRating::from_score(-1.0), ScoreRating::Neutral);
        assert_eq!(ScoreRating::from_score(-4.0), ScoreRating::Caution);
        assert_eq!(ScoreRating::from_score(-4.1), ScoreRating::Poor);
    }
}
