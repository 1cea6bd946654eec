pub mod normalize;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    Revenue,
    CustomerSatisfaction,
    StaffSatisfaction,
    OccupancyRate,
    Sustainability,
}

impl MetricKey {
    pub const ALL: [MetricKey; 5] = [
        MetricKey::Revenue,
        MetricKey::CustomerSatisfaction,
        MetricKey::StaffSatisfaction,
        MetricKey::OccupancyRate,
        MetricKey::Sustainability,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::CustomerSatisfaction => "customerSatisfaction",
            Self::StaffSatisfaction => "staffSatisfaction",
            Self::OccupancyRate => "occupancyRate",
            Self::Sustainability => "sustainability",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::CustomerSatisfaction => "Customer Satisfaction",
            Self::StaffSatisfaction => "Staff Satisfaction",
            Self::OccupancyRate => "Occupancy Rate",
            Self::Sustainability => "Sustainability",
        }
    }
}

impl Display for MetricKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown metric key: {0}")]
pub struct MetricKeyParseError(pub String);

impl FromStr for MetricKey {
    type Err = MetricKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "revenue" => Ok(Self::Revenue),
            "customersatisfaction" | "customer" => Ok(Self::CustomerSatisfaction),
            "staffsatisfaction" | "staff" => Ok(Self::StaffSatisfaction),
            "occupancyrate" | "occupancy" => Ok(Self::OccupancyRate),
            "sustainability" => Ok(Self::Sustainability),
            _ => Err(MetricKeyParseError(s.to_string())),
        }
    }
}

/// Absolute hotel state. Each field is kept in [0, 100] after a decision is
/// applied; construction does not enforce the range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricVector {
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub customer_satisfaction: f64,
    #[serde(default)]
    pub staff_satisfaction: f64,
    #[serde(default)]
    pub occupancy_rate: f64,
    #[serde(default)]
    pub sustainability: f64,
}

/// Signed per-metric delta authored on a scenario option. Never clamped.
pub type EffectVector = MetricVector;

impl MetricVector {
    pub fn new(
        revenue: f64,
        customer_satisfaction: f64,
        staff_satisfaction: f64,
        occupancy_rate: f64,
        sustainability: f64,
    ) -> Self {
        Self {
            revenue,
            customer_satisfaction,
            staff_satisfaction,
            occupancy_rate,
            sustainability,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value, value)
    }

    /// Starting metrics used when a hotel type has no stored baseline.
    pub fn default_baseline() -> Self {
        Self::uniform(50.0)
    }

    pub fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Revenue => self.revenue,
            MetricKey::CustomerSatisfaction => self.customer_satisfaction,
            MetricKey::StaffSatisfaction => self.staff_satisfaction,
            MetricKey::OccupancyRate => self.occupancy_rate,
            MetricKey::Sustainability => self.sustainability,
        }
    }

    pub fn set(&mut self, key: MetricKey, value: f64) {
        match key {
            MetricKey::Revenue => self.revenue = value,
            MetricKey::CustomerSatisfaction => self.customer_satisfaction = value,
            MetricKey::StaffSatisfaction => self.staff_satisfaction = value,
            MetricKey::OccupancyRate => self.occupancy_rate = value,
            MetricKey::Sustainability => self.sustainability = value,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        MetricKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    pub fn is_zero(&self) -> bool {
        self.iter().all(|(_, v)| v == 0.0)
    }

    /// Field-wise sum without clamping.
    pub fn plus(&self, other: &MetricVector) -> MetricVector {
        let mut out = *self;
        for key in MetricKey::ALL {
            out.set(key, self.get(key) + other.get(key));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WeightTable {
    pub revenue: f64,
    pub customer_satisfaction: f64,
    pub staff_satisfaction: f64,
    pub occupancy_rate: f64,
    pub sustainability: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            revenue: 0.25,
            customer_satisfaction: 0.25,
            staff_satisfaction: 0.20,
            occupancy_rate: 0.15,
            sustainability: 0.15,
        }
    }
}

impl WeightTable {
    pub fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::Revenue => self.revenue,
            MetricKey::CustomerSatisfaction => self.customer_satisfaction,
            MetricKey::StaffSatisfaction => self.staff_satisfaction,
            MetricKey::OccupancyRate => self.occupancy_rate,
            MetricKey::Sustainability => self.sustainability,
        }
    }

    pub fn total(&self) -> f64 {
        MetricKey::ALL.iter().map(|k| self.get(*k)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        MetricKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::metrics::{MetricKey, MetricVector, WeightTable};

    #[test]
    fn default_weights_sum_to_one() {
        assert!((WeightTable::default().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn parses_metric_aliases() {
        assert_eq!(
            MetricKey::from_str("customer_satisfaction").expect("parse"),
            MetricKey::CustomerSatisfaction
        );
        assert_eq!(
            MetricKey::from_str("Occupancy").expect("parse"),
            MetricKey::OccupancyRate
        );
        assert!(MetricKey::from_str("profit").is_err());
    }

    #[test]
    fn missing_fields_deserialize_as_zero() {
        let effect: MetricVector =
            serde_json::from_str(r#"{"revenue": 5, "sustainability": -3}"#).expect("json");
        assert_eq!(effect.revenue, 5.0);
        assert_eq!(effect.customer_satisfaction, 0.0);
        assert_eq!(effect.sustainability, -3.0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(MetricVector::uniform(1.0)).expect("json");
        assert!(json.get("customerSatisfaction").is_some());
        assert!(json.get("occupancyRate").is_some());
    }
}
