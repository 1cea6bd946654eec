use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::decision::{Decision, DecisionLog, RecordedScores};
use crate::error::GameError;
use crate::game::achievements::{evaluate_achievements, AchievementId};
use crate::game::{GamePhase, GameRecord, GameRules, GameSetup, GameState};
use crate::metrics::normalize::apply_effect;
use crate::metrics::MetricVector;
use crate::scenario::{draw_day_scenarios, Scenario};
use crate::scoring::{compute_scores, ScoreCard, ScoreRating};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub decision: Decision,
    pub scores: ScoreCard,
    pub rating: ScoreRating,
    pub unlocked: Vec<AchievementId>,
    pub day_completed: bool,
    pub game_over: bool,
    pub phase: GamePhase,
}

/// One game in play: persisted record, its decision log and the rules it
/// runs under.
#[derive(Debug, Clone)]
pub struct GameSession {
    record: GameRecord,
    log: DecisionLog,
    rules: GameRules,
}

impl GameSession {
    #[allow(clippy::too_many_arguments)]
    pub fn start<R: Rng>(
        game_id: impl Into<String>,
        player_id: impl Into<String>,
        setup: GameSetup,
        baseline: MetricVector,
        pool: &[Scenario],
        rules: GameRules,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        if !setup.role.is_playable_role() {
            return Err(GameError::Validation(format!(
                "{} is not a playable role",
                setup.role.as_slug()
            )));
        }
        let game_id = game_id.into();
        let log = DecisionLog::new(game_id.clone());
        let active = draw_day_scenarios(
            pool,
            setup.role,
            &log.answered_ids(),
            rules.min_scenarios_per_day,
            rules.max_scenarios_per_day,
            rng,
        );
        if active.is_empty() {
            warn!("no scenarios available for role {} on day 1", setup.role.as_slug());
        }
        let record = GameRecord {
            game_id,
            player_id: player_id.into(),
            setup,
            state: GameState::new(baseline),
            active,
            created_at: now,
            updated_at: now,
        };
        info!(
            "game {} started: {} / {}, {} scenario(s) on day 1",
            record.game_id,
            setup.hotel_type.as_slug(),
            setup.role.as_slug(),
            record.active.len()
        );
        Ok(Self { record, log, rules })
    }

    pub fn restore(record: GameRecord, log: DecisionLog, rules: GameRules) -> Result<Self, GameError> {
        if log.game_id() != record.game_id {
            return Err(GameError::invalid_state(format!(
                "decision log for {} does not belong to game {}",
                log.game_id(),
                record.game_id
            )));
        }
        Ok(Self { record, log, rules })
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn state(&self) -> &GameState {
        &self.record.state
    }

    pub fn log(&self) -> &DecisionLog {
        &self.log
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn active(&self) -> &[Scenario] {
        &self.record.active
    }

    pub fn into_parts(self) -> (GameRecord, DecisionLog) {
        (self.record, self.log)
    }

    pub fn is_over(&self) -> bool {
        self.record.state.completed_turns >= self.rules.max_turns
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_over() {
            GamePhase::GameOver
        } else if self.record.active.is_empty() {
            GamePhase::NoContent
        } else {
            GamePhase::AwaitingDecision {
                remaining: self.record.active.len(),
            }
        }
    }

    /// Applies the chosen option of an active scenario. On any rejection the
    /// session is left untouched.
    pub fn submit_decision<R: Rng>(
        &mut self,
        scenario_id: &str,
        option_index: usize,
        pool: &[Scenario],
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::invalid_state(format!(
                "game {} is over",
                self.record.game_id
            )));
        }
        let Some(position) = self.record.active.iter().position(|s| s.id == scenario_id) else {
            return Err(GameError::invalid_state(format!(
                "scenario {scenario_id} is not active on day {}",
                self.record.state.current_day
            )));
        };
        let scenario = &self.record.active[position];
        let Some(option) = scenario.option(option_index) else {
            return Err(GameError::invalid_state(format!(
                "scenario {scenario_id} has no option {option_index}"
            )));
        };
        let Some(before) = self.record.state.metrics else {
            return Err(GameError::invalid_state(format!(
                "game {} has no metrics snapshot",
                self.record.game_id
            )));
        };

        let after = apply_effect(&before, &option.effects);
        let scores = compute_scores(&option.effects, &self.rules.weights);
        let decision = Decision {
            id: Uuid::new_v4().to_string(),
            player_id: self.record.player_id.clone(),
            game_id: self.record.game_id.clone(),
            question_id: scenario.id.clone(),
            selected_option_index: option_index,
            day: self.record.state.current_day,
            scenario_text: scenario.text.clone(),
            selected_option_text: option.text.clone(),
            metrics_before: before,
            metrics_after: after,
            scores: RecordedScores::from(scores),
            created_at: now,
        };
        self.log.append(decision.clone())?;
        debug!(
            "decision {} on {}: option {} bao={:.1}",
            decision.id, scenario_id, option_index, scores.bao
        );

        self.record.active.remove(position);
        self.record.state.metrics = Some(after);
        self.record.updated_at = now;

        let unlocked = evaluate_achievements(
            &mut self.record.state.achievements,
            &after,
            self.log.len(),
        );
        if !unlocked.is_empty() {
            let names = unlocked
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            info!("game {} unlocked: {names}", self.record.game_id);
        }

        let day_completed = self.record.active.is_empty();
        if day_completed {
            self.record.state.completed_turns += 1;
            if self.is_over() {
                info!(
                    "game {} over after {} turns",
                    self.record.game_id, self.record.state.completed_turns
                );
            } else {
                self.record.state.current_day += 1;
                self.draw_for_today(pool, rng);
            }
        }

        Ok(DecisionOutcome {
            decision,
            scores,
            rating: scores.rating(),
            unlocked,
            day_completed,
            game_over: self.is_over(),
            phase: self.phase(),
        })
    }

    /// Retries the draw for a day that had no content. Returns whether any
    /// scenario is now active.
    pub fn refresh_day<R: Rng>(&mut self, pool: &[Scenario], rng: &mut R) -> Result<bool, GameError> {
        match self.phase() {
            GamePhase::GameOver => Err(GameError::invalid_state(format!(
                "game {} is over",
                self.record.game_id
            ))),
            GamePhase::AwaitingDecision { .. } => Ok(true),
            GamePhase::NoContent => {
                self.draw_for_today(pool, rng);
                Ok(!self.record.active.is_empty())
            }
        }
    }

    fn draw_for_today<R: Rng>(&mut self, pool: &[Scenario], rng: &mut R) {
        self.record.active = draw_day_scenarios(
            pool,
            self.record.setup.role,
            &self.log.answered_ids(),
            self.rules.min_scenarios_per_day,
            self.rules.max_scenarios_per_day,
            rng,
        );
        if self.record.active.is_empty() {
            warn!(
                "game {}: no scenarios left for {} on day {}",
                self.record.game_id,
                self.record.setup.role.as_slug(),
                self.record.state.current_day
            );
        } else {
            info!(
                "game {}: day {} drew {} scenario(s)",
                self.record.game_id,
                self.record.state.current_day,
                self.record.active.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::decision::DecisionLog;
    use crate::error::GameError;
    use crate::game::engine::GameSession;
    use crate::game::{AchievementId, GamePhase, GameRules, GameSetup};
    use crate::metrics::{EffectVector, MetricVector};
    use crate::scenario::{Department, HotelType, Scenario, ScenarioOption};

    fn setup() -> GameSetup {
        GameSetup {
            hotel_type: HotelType::Boutique,
            role: Department::Operations,
        }
    }

    fn rules(per_day: usize) -> GameRules {
        GameRules {
            min_scenarios_per_day: per_day,
            max_scenarios_per_day: per_day,
            ..GameRules::default()
        }
    }

    fn pool(count: usize) -> Vec<Scenario> {
        (0..count)
            .map(|idx| Scenario {
                id: format!("q{idx}"),
                text: format!("operations question {idx}"),
                department: Department::Operations,
                difficulty: 1,
                options: vec![
                    ScenarioOption {
                        text: "invest".to_string(),
                        effects: EffectVector::new(-5.0, 10.0, 5.0, 0.0, 0.0),
                    },
                    ScenarioOption {
                        text: "cut costs".to_string(),
                        effects: EffectVector::new(10.0, -20.0, 0.0, 0.0, 0.0),
                    },
                ],
            })
            .collect()
    }

    fn start(pool: &[Scenario], rules: GameRules, rng: &mut StdRng) -> GameSession {
        GameSession::start(
            "g1",
            "p1",
            setup(),
            MetricVector::uniform(50.0),
            pool,
            rules,
            rng,
            Utc::now(),
        )
        .expect("start game")
    }

    fn first_active(session: &GameSession) -> String {
        session.active()[0].id.clone()
    }

    #[test]
    fn two_scenario_day_completes_after_two_decisions() {
        let mut rng = StdRng::seed_from_u64(11);
        let pool = pool(8);
        let mut session = start(&pool, rules(2), &mut rng);
        assert_eq!(session.phase(), GamePhase::AwaitingDecision { remaining: 2 });

        let id = first_active(&session);
        let outcome = session
            .submit_decision(&id, 0, &pool, &mut rng, Utc::now())
            .expect("first decision");
        assert!(!outcome.day_completed);
        assert_eq!(session.state().completed_turns, 0);

        let id = first_active(&session);
        let outcome = session
            .submit_decision(&id, 1, &pool, &mut rng, Utc::now())
            .expect("second decision");
        assert!(outcome.day_completed);
        assert_eq!(session.state().completed_turns, 1);
        assert_eq!(session.state().current_day, 2);
        assert_eq!(session.active().len(), 2);
        let answered = session.log().answered_ids();
        assert!(session.active().iter().all(|s| !answered.contains(&s.id)));
    }

    #[test]
    fn ten_day_playthrough_ends_exactly_at_turn_ten() {
        let mut rng = StdRng::seed_from_u64(5);
        let pool = pool(12);
        let mut session = start(&pool, rules(1), &mut rng);

        for turn in 1..=10u32 {
            assert!(!session.is_over(), "game ended early before turn {turn}");
            let id = first_active(&session);
            let outcome = session
                .submit_decision(&id, 0, &pool, &mut rng, Utc::now())
                .expect("decision");
            assert!(outcome.day_completed);
            assert_eq!(session.state().completed_turns, turn);
            assert_eq!(outcome.game_over, turn == 10);
        }

        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.state().current_day, 10);
        assert_eq!(session.log().len(), 10);
        assert!(session.active().is_empty());

        let err = session
            .submit_decision("q11", 0, &pool, &mut rng, Utc::now())
            .expect_err("game over rejects decisions");
        assert!(matches!(err, GameError::InvalidState(_)));
        assert_eq!(session.state().completed_turns, 10);
    }

    #[test]
    fn rejects_inactive_scenario_without_side_effects() {
        let mut rng = StdRng::seed_from_u64(2);
        let pool = pool(4);
        let mut session = start(&pool, rules(1), &mut rng);
        let before = session.state().clone();
        let active_id = first_active(&session);
        let inactive = pool
            .iter()
            .find(|s| s.id != active_id)
            .expect("inactive scenario")
            .id
            .clone();

        let err = session
            .submit_decision(&inactive, 0, &pool, &mut rng, Utc::now())
            .expect_err("inactive scenario");
        assert!(matches!(err, GameError::InvalidState(_)));
        let err = session
            .submit_decision(&active_id, 9, &pool, &mut rng, Utc::now())
            .expect_err("missing option");
        assert!(matches!(err, GameError::InvalidState(_)));

        assert_eq!(session.state(), &before);
        assert!(session.log().is_empty());
        assert_eq!(session.active().len(), 1);
    }

    #[test]
    fn rejects_decision_without_metrics_snapshot() {
        let mut rng = StdRng::seed_from_u64(2);
        let pool = pool(2);
        let session = start(&pool, rules(1), &mut rng);
        let (mut record, log) = session.into_parts();
        record.state.metrics = None;
        let mut session = GameSession::restore(record, log, rules(1)).expect("restore");
        let id = first_active(&session);
        let err = session
            .submit_decision(&id, 0, &pool, &mut rng, Utc::now())
            .expect_err("no metrics");
        assert!(matches!(err, GameError::InvalidState(_)));
    }

    #[test]
    fn scores_use_authored_effect_not_clamped_delta() {
        let mut rng = StdRng::seed_from_u64(9);
        let pool = vec![Scenario {
            id: "boom".to_string(),
            text: "Festival in town".to_string(),
            department: Department::Operations,
            difficulty: 2,
            options: vec![ScenarioOption {
                text: "raise prices".to_string(),
                effects: EffectVector::new(20.0, 0.0, 0.0, 0.0, 0.0),
            }],
        }];
        let mut session = GameSession::start(
            "g1",
            "p1",
            setup(),
            MetricVector::new(95.0, 50.0, 50.0, 50.0, 50.0),
            &pool,
            rules(1),
            &mut rng,
            Utc::now(),
        )
        .expect("start");
        let outcome = session
            .submit_decision("boom", 0, &pool, &mut rng, Utc::now())
            .expect("decision");
        assert_eq!(outcome.decision.metrics_after.revenue, 100.0);
        assert_eq!(outcome.scores.bao, 5.0);
        assert_eq!(outcome.unlocked, vec![
            AchievementId::FirstDecision,
            AchievementId::RevenueMaster
        ]);
    }

    #[test]
    fn empty_day_waits_for_content_and_refreshes() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut session = start(&[], rules(1), &mut rng);
        assert_eq!(session.phase(), GamePhase::NoContent);
        assert!(!session.refresh_day(&[], &mut rng).expect("refresh"));
        assert_eq!(session.state().completed_turns, 0);

        let pool = pool(3);
        assert!(session.refresh_day(&pool, &mut rng).expect("refresh"));
        assert_eq!(session.phase(), GamePhase::AwaitingDecision { remaining: 1 });
    }

    #[test]
    fn sustainability_is_not_a_playable_role() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = GameSession::start(
            "g1",
            "p1",
            GameSetup {
                hotel_type: HotelType::Resort,
                role: Department::Sustainability,
            },
            MetricVector::uniform(50.0),
            &[],
            GameRules::default(),
            &mut rng,
            Utc::now(),
        );
        assert!(matches!(result, Err(GameError::Validation(_))));
    }

    #[test]
    fn restore_rejects_foreign_log() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = pool(2);
        let (record, _) = start(&pool, rules(1), &mut rng).into_parts();
        let result = GameSession::restore(record, DecisionLog::new("other"), rules(1));
        assert!(result.is_err());
    }
}
