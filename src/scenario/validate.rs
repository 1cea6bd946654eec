use crate::error::GameError;
use crate::scenario::schema::Scenario;

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 3;

pub fn validate_scenario(scenario: &Scenario) -> Result<(), GameError> {
    let mut problems = Vec::new();
    if scenario.id.trim().is_empty() {
        problems.push("id is empty".to_string());
    }
    if scenario.text.trim().is_empty() {
        problems.push("text is empty".to_string());
    }
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&scenario.difficulty) {
        problems.push(format!(
            "difficulty {} outside {MIN_DIFFICULTY}..={MAX_DIFFICULTY}",
            scenario.difficulty
        ));
    }
    if scenario.options.is_empty() {
        problems.push("at least one option is required".to_string());
    }
    for (idx, option) in scenario.options.iter().enumerate() {
        if option.text.trim().is_empty() {
            problems.push(format!("option {idx} has empty text"));
        }
        if option.effects.iter().any(|(_, v)| !v.is_finite()) {
            problems.push(format!("option {idx} has a non-finite effect"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(GameError::Validation(format!(
            "scenario {}: {}",
            scenario.id,
            problems.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GameError;
    use crate::metrics::EffectVector;
    use crate::scenario::schema::{Department, Scenario, ScenarioOption};
    use crate::scenario::validate::validate_scenario;

    fn scenario() -> Scenario {
        Scenario {
            id: "q1".to_string(),
            text: "Staff ask for an extra day off".to_string(),
            department: Department::Hr,
            difficulty: 2,
            options: vec![ScenarioOption {
                text: "Approve".to_string(),
                effects: EffectVector::new(-3.0, 0.0, 8.0, 0.0, 0.0),
            }],
        }
    }

    #[test]
    fn accepts_well_formed_scenario() {
        assert!(validate_scenario(&scenario()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut bad = scenario();
        bad.text = "  ".to_string();
        bad.difficulty = 7;
        bad.options[0].text = String::new();
        let err = validate_scenario(&bad).expect_err("should fail");
        let GameError::Validation(message) = err else {
            panic!("unexpected error variant");
        };
        assert!(message.contains("text is empty"));
        assert!(message.contains("difficulty 7"));
        assert!(message.contains("option 0 has empty text"));
    }

    #[test]
    fn rejects_scenario_without_options() {
        let mut bad = scenario();
        bad.options.clear();
        assert!(validate_scenario(&bad).is_err());
    }
}
