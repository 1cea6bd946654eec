use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::metrics::{MetricKey, MetricVector};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementId {
    FirstDecision,
    HappyCustomers,
    RevenueMaster,
    StaffChampion,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricThreshold {
    pub metric: MetricKey,
    pub at_least: f64,
}

impl AchievementId {
    pub const ALL: [AchievementId; 4] = [
        AchievementId::FirstDecision,
        AchievementId::HappyCustomers,
        AchievementId::RevenueMaster,
        AchievementId::StaffChampion,
    ];

    pub fn threshold(&self) -> Option<MetricThreshold> {
        let (metric, at_least) = match self {
            Self::FirstDecision => return None,
            Self::HappyCustomers => (MetricKey::CustomerSatisfaction, 90.0),
            Self::RevenueMaster => (MetricKey::Revenue, 80.0),
            Self::StaffChampion => (MetricKey::StaffSatisfaction, 85.0),
        };
        Some(MetricThreshold { metric, at_least })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstDecision => "First Step",
            Self::HappyCustomers => "Happy Customers",
            Self::RevenueMaster => "Revenue Master",
            Self::StaffChampion => "Staff Champion",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstDecision => "Made the first decision",
            Self::HappyCustomers => "Customer satisfaction reached 90+",
            Self::RevenueMaster => "Revenue reached 80+",
            Self::StaffChampion => "Staff satisfaction reached 85+",
        }
    }
}

impl Display for AchievementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let slug = match self {
            Self::FirstDecision => "FIRST_DECISION",
            Self::HappyCustomers => "HAPPY_CUSTOMERS",
            Self::RevenueMaster => "REVENUE_MASTER",
            Self::StaffChampion => "STAFF_CHAMPION",
        };
        write!(f, "{slug}")
    }
}

/// Adds every newly earned achievement to `unlocked` and returns only the
/// new ones. Existing entries are never removed.
pub fn evaluate_achievements(
    unlocked: &mut BTreeSet<AchievementId>,
    metrics: &MetricVector,
    decisions_made: usize,
) -> Vec<AchievementId> {
    let mut added = Vec::new();
    for id in AchievementId::ALL {
        if unlocked.contains(&id) {
            continue;
        }
        let earned = match id.threshold() {
            Some(threshold) => metrics.get(threshold.metric) >= threshold.at_least,
            None => decisions_made >= 1,
        };
        if earned {
            unlocked.insert(id);
            added.push(id);
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::game::achievements::{evaluate_achievements, AchievementId};
    use crate::metrics::MetricVector;

    #[test]
    fn first_decision_unlocks_once() {
        let mut unlocked = BTreeSet::new();
        let added = evaluate_achievements(&mut unlocked, &MetricVector::uniform(50.0), 1);
        assert_eq!(added, vec![AchievementId::FirstDecision]);
        let added = evaluate_achievements(&mut unlocked, &MetricVector::uniform(50.0), 2);
        assert!(added.is_empty());
    }

    #[test]
    fn happy_customers_never_relocks() {
        let mut unlocked = BTreeSet::new();
        let mut metrics = MetricVector::uniform(50.0);
        metrics.customer_satisfaction = 90.0;
        let added = evaluate_achievements(&mut unlocked, &metrics, 1);
        assert!(added.contains(&AchievementId::HappyCustomers));

        metrics.customer_satisfaction = 40.0;
        let added = evaluate_achievements(&mut unlocked, &metrics, 2);
        assert!(added.is_empty());
        assert!(unlocked.contains(&AchievementId::HappyCustomers));
    }

    #[test]
    fn thresholds_match_metric_levels() {
        let mut unlocked = BTreeSet::new();
        let metrics = MetricVector::new(80.0, 89.9, 85.0, 0.0, 0.0);
        let added = evaluate_achievements(&mut unlocked, &metrics, 0);
        assert_eq!(
            added,
            vec![AchievementId::RevenueMaster, AchievementId::StaffChampion]
        );
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&AchievementId::HappyCustomers).expect("json");
        assert_eq!(json, "\"HAPPY_CUSTOMERS\"");
        assert_eq!(AchievementId::FirstDecision.to_string(), "FIRST_DECISION");
    }
}
