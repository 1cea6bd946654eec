use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::metrics::EffectVector;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HotelType {
    #[serde(rename = "5_star")]
    FiveStar,
    #[serde(rename = "boutique")]
    Boutique,
    #[serde(rename = "resort")]
    Resort,
}

impl HotelType {
    pub const ALL: [HotelType; 3] = [HotelType::FiveStar, HotelType::Boutique, HotelType::Resort];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::FiveStar => "5_star",
            Self::Boutique => "boutique",
            Self::Resort => "resort",
        }
    }
}

impl Display for HotelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::FiveStar => "5-Star Hotel",
            Self::Boutique => "Boutique Hotel",
            Self::Resort => "Resort",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown hotel type: {0}")]
pub struct HotelTypeParseError(pub String);

impl FromStr for HotelType {
    type Err = HotelTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "5_star" | "five_star" | "5star" => Ok(Self::FiveStar),
            "boutique" => Ok(Self::Boutique),
            "resort" => Ok(Self::Resort),
            _ => Err(HotelTypeParseError(s.to_string())),
        }
    }
}

/// Department a question is authored for. Every department except
/// `Sustainability` is also a playable role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Reservation,
    CustomerRelations,
    Operations,
    Financial,
    Hr,
    Sustainability,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Reservation,
        Department::CustomerRelations,
        Department::Operations,
        Department::Financial,
        Department::Hr,
        Department::Sustainability,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Reservation => "reservation",
            Self::CustomerRelations => "customer_relations",
            Self::Operations => "operations",
            Self::Financial => "financial",
            Self::Hr => "hr",
            Self::Sustainability => "sustainability",
        }
    }

    pub fn is_playable_role(&self) -> bool {
        !matches!(self, Self::Sustainability)
    }
}

impl Display for Department {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Reservation => "Reservation Manager",
            Self::CustomerRelations => "Customer Relations Manager",
            Self::Operations => "Operations Manager",
            Self::Financial => "Revenue Manager",
            Self::Hr => "HR Manager",
            Self::Sustainability => "Sustainability",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown department: {0}")]
pub struct DepartmentParseError(pub String);

impl FromStr for Department {
    type Err = DepartmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "reservation" | "reservations" => Ok(Self::Reservation),
            "customer_relations" | "customer" | "guest_relations" => Ok(Self::CustomerRelations),
            "operations" | "ops" => Ok(Self::Operations),
            "financial" | "finance" | "revenue" => Ok(Self::Financial),
            "hr" | "staff" | "personnel" => Ok(Self::Hr),
            "sustainability" => Ok(Self::Sustainability),
            _ => Err(DepartmentParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioOption {
    pub text: String,
    #[serde(default)]
    pub effects: EffectVector,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub id: String,
    pub text: String,
    pub department: Department,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    pub options: Vec<ScenarioOption>,
}

/// Authoring payload: like [`Scenario`] but the id is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    pub department: Department,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub options: Vec<ScenarioOption>,
}

impl ScenarioDraft {
    /// Keeps a supplied id, otherwise derives one from the content hash.
    pub fn into_scenario(self) -> Scenario {
        let id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => content_id(&self.text, self.department, &self.options),
        };
        Scenario {
            id,
            text: self.text,
            department: self.department,
            difficulty: self.difficulty,
            options: self.options,
        }
    }
}

impl Scenario {
    pub fn option(&self, index: usize) -> Option<&ScenarioOption> {
        self.options.get(index)
    }
}

fn content_id(text: &str, department: Department, options: &[ScenarioOption]) -> String {
    let canonical = serde_json::to_string(&(text, department, options)).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("q_{}", &digest[..12])
}

fn default_difficulty() -> u8 {
    1
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::metrics::EffectVector;
    use crate::scenario::schema::{Department, HotelType, ScenarioDraft, ScenarioOption};

    #[test]
    fn parses_hotel_and_department_slugs() {
        assert_eq!(HotelType::from_str("5_star").expect("hotel"), HotelType::FiveStar);
        assert_eq!(HotelType::from_str("Resort").expect("hotel"), HotelType::Resort);
        assert!(HotelType::from_str("motel").is_err());
        assert_eq!(
            Department::from_str("customer-relations").expect("department"),
            Department::CustomerRelations
        );
        assert!(!Department::Sustainability.is_playable_role());
    }

    #[test]
    fn hotel_type_serializes_as_slug() {
        let json = serde_json::to_string(&HotelType::FiveStar).expect("json");
        assert_eq!(json, "\"5_star\"");
    }

    #[test]
    fn draft_without_id_gets_stable_content_id() {
        let draft = ScenarioDraft {
            id: None,
            text: "A guest reports a broken AC".to_string(),
            department: Department::Operations,
            difficulty: 2,
            options: vec![ScenarioOption {
                text: "Send a technician".to_string(),
                effects: EffectVector::new(-2.0, 5.0, 0.0, 0.0, 0.0),
            }],
        };
        let first = draft.clone().into_scenario();
        let second = draft.into_scenario();
        assert_eq!(first.id, second.id);
        assert!(first.id.starts_with("q_"));
        assert_eq!(first.id.len(), 14);
    }

    #[test]
    fn authored_json_defaults_missing_effects() {
        let raw = r#"{
            "text": "Overbooking on a holiday weekend",
            "department": "reservation",
            "options": [
                {"text": "Upgrade guests", "effects": {"revenue": -5, "customerSatisfaction": 10}},
                {"text": "Walk guests to a partner hotel"}
            ]
        }"#;
        let draft: ScenarioDraft = serde_json::from_str(raw).expect("json");
        assert_eq!(draft.difficulty, 1);
        assert_eq!(draft.options[0].effects.staff_satisfaction, 0.0);
        assert!(draft.options[1].effects.is_zero());
    }
}
