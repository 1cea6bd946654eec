use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decision::{Decision, DecisionLog, ScoreAverages, TimelinePoint};
use crate::error::{GameError, GameResult};
use crate::game::{new_game_id, DecisionOutcome, GamePhase, GameRules, GameSession, GameSetup, GameState};
use crate::metrics::normalize::{METRIC_CEILING, METRIC_FLOOR};
use crate::metrics::MetricVector;
use crate::report::{build_report, PerformanceReport};
use crate::scenario::{validate_scenario, Department, HotelType, Scenario, ScenarioDraft};
use crate::store::GameStore;

/// What a client needs to render the current turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameView {
    pub game_id: String,
    pub player_id: String,
    pub setup: GameSetup,
    pub state: GameState,
    pub phase: GamePhase,
    pub active: Vec<Scenario>,
}

impl GameView {
    fn of(session: &GameSession) -> Self {
        let record = session.record();
        Self {
            game_id: record.game_id.clone(),
            player_id: record.player_id.clone(),
            setup: record.setup,
            state: record.state.clone(),
            phase: session.phase(),
            active: record.active.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BaselineView {
    pub hotel_type: HotelType,
    pub metrics: MetricVector,
    /// False when no baseline is stored and the default is shown.
    pub stored: bool,
}

pub struct GameService<S: GameStore> {
    store: S,
    rules: GameRules,
}

impl<S: GameStore> GameService<S> {
    pub fn new(store: S, rules: GameRules) -> Self {
        Self { store, rules }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn new_game<R: Rng>(
        &self,
        player_id: &str,
        setup: GameSetup,
        rng: &mut R,
    ) -> GameResult<GameView> {
        let player_id = player_id.trim();
        if player_id.is_empty() {
            return Err(GameError::MissingSetup("player id is required".to_string()));
        }
        let baseline = match self.store.get_baseline(setup.hotel_type)? {
            Some(metrics) => metrics,
            None => {
                warn!(
                    "no baseline stored for {}; using default metrics",
                    setup.hotel_type
                );
                MetricVector::default_baseline()
            }
        };
        let pool = self.store.list_scenarios(Some(setup.role))?;
        let now = Utc::now();
        let session = GameSession::start(
            new_game_id(player_id, now),
            player_id,
            setup,
            baseline,
            &pool,
            self.rules,
            rng,
            now,
        )?;
        self.store.create_game(session.record())?;
        Ok(GameView::of(&session))
    }

    pub fn load_session(&self, game_id: &str) -> GameResult<GameSession> {
        let record = self
            .store
            .load_game(game_id)?
            .ok_or_else(|| GameError::not_found("game", game_id))?;
        let log = DecisionLog::from_records(game_id, self.store.load_decisions(game_id)?);
        GameSession::restore(record, log, self.rules)
    }

    pub fn latest_game(&self, player_id: &str) -> GameResult<GameView> {
        let record = self
            .store
            .latest_game_for_player(player_id)?
            .ok_or_else(|| GameError::not_found("game for player", player_id))?;
        self.view(&record.game_id)
    }

    pub fn view(&self, game_id: &str) -> GameResult<GameView> {
        Ok(GameView::of(&self.load_session(game_id)?))
    }

    pub fn submit<R: Rng>(
        &self,
        game_id: &str,
        scenario_id: &str,
        option_index: usize,
        rng: &mut R,
    ) -> GameResult<DecisionOutcome> {
        let mut session = self.load_session(game_id)?;
        let pool = self.store.list_scenarios(Some(session.record().setup.role))?;
        let outcome = session.submit_decision(scenario_id, option_index, &pool, rng, Utc::now())?;
        self.store.record_turn(session.record(), &outcome.decision)?;
        Ok(outcome)
    }

    pub fn refresh<R: Rng>(&self, game_id: &str, rng: &mut R) -> GameResult<GameView> {
        let mut session = self.load_session(game_id)?;
        let pool = self.store.list_scenarios(Some(session.record().setup.role))?;
        if session.refresh_day(&pool, rng)? {
            self.store.save_game(session.record())?;
        }
        Ok(GameView::of(&session))
    }

    pub fn history(&self, game_id: &str) -> GameResult<Vec<Decision>> {
        let session = self.load_session(game_id)?;
        Ok(session.log().newest_first().into_iter().cloned().collect())
    }

    pub fn timeline(&self, game_id: &str) -> GameResult<Vec<TimelinePoint>> {
        Ok(self.load_session(game_id)?.log().timeline())
    }

    pub fn averages(&self, game_id: &str) -> GameResult<ScoreAverages> {
        Ok(self.load_session(game_id)?.log().averages())
    }

    /// Deterministic part of the report; the model analysis is attached by
    /// the caller.
    pub fn report(&self, game_id: &str) -> GameResult<PerformanceReport> {
        let session = self.load_session(game_id)?;
        Ok(build_report(session.record(), session.log(), &self.rules))
    }

    pub fn add_scenario(&self, draft: ScenarioDraft) -> GameResult<Scenario> {
        let scenario = draft.into_scenario();
        validate_scenario(&scenario)?;
        self.store.upsert_scenario(&scenario)?;
        info!("scenario {} saved for {}", scenario.id, scenario.department);
        Ok(scenario)
    }

    pub fn list_scenarios(&self, department: Option<Department>) -> GameResult<Vec<Scenario>> {
        self.store.list_scenarios(department)
    }

    pub fn get_scenario(&self, id: &str) -> GameResult<Scenario> {
        self.store
            .get_scenario(id)?
            .ok_or_else(|| GameError::not_found("scenario", id))
    }

    pub fn remove_scenario(&self, id: &str) -> GameResult<()> {
        if !self.store.delete_scenario(id)? {
            return Err(GameError::not_found("scenario", id));
        }
        info!("scenario {id} removed");
        Ok(())
    }

    pub fn baseline(&self, hotel_type: HotelType) -> GameResult<BaselineView> {
        let stored = self.store.get_baseline(hotel_type)?;
        Ok(BaselineView {
            hotel_type,
            metrics: stored.unwrap_or_else(MetricVector::default_baseline),
            stored: stored.is_some(),
        })
    }

    pub fn set_baseline(&self, hotel_type: HotelType, metrics: MetricVector) -> GameResult<BaselineView> {
        let out_of_range = metrics
            .iter()
            .filter(|(_, v)| !v.is_finite() || *v < METRIC_FLOOR || *v > METRIC_CEILING)
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>();
        if !out_of_range.is_empty() {
            return Err(GameError::Validation(format!(
                "baseline metrics must be within {METRIC_FLOOR}..={METRIC_CEILING}: {}",
                out_of_range.join(", ")
            )));
        }
        self.store.set_baseline(hotel_type, &metrics)?;
        info!("baseline for {hotel_type} updated");
        Ok(BaselineView {
            hotel_type,
            metrics,
            stored: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::error::GameError;
    use crate::game::{AchievementId, GamePhase, GameRules, GameSetup};
    use crate::metrics::{EffectVector, MetricVector};
    use crate::scenario::{Department, HotelType, ScenarioDraft, ScenarioOption};
    use crate::service::GameService;
    use crate::store::SqliteStore;

    fn service() -> GameService<SqliteStore> {
        let rules = GameRules {
            min_scenarios_per_day: 1,
            max_scenarios_per_day: 1,
            ..GameRules::default()
        };
        GameService::new(SqliteStore::open_in_memory().expect("store"), rules)
    }

    fn draft(id: &str, department: Department) -> ScenarioDraft {
        ScenarioDraft {
            id: Some(id.to_string()),
            text: format!("Scenario {id}"),
            department,
            difficulty: 1,
            options: vec![
                ScenarioOption {
                    text: "Hire seasonal staff".to_string(),
                    effects: EffectVector::new(-5.0, 5.0, 10.0, 0.0, 0.0),
                },
                ScenarioOption {
                    text: "Ask for overtime".to_string(),
                    effects: EffectVector::new(5.0, 0.0, -15.0, 0.0, 0.0),
                },
            ],
        }
    }

    fn setup() -> GameSetup {
        GameSetup {
            hotel_type: HotelType::Boutique,
            role: Department::Hr,
        }
    }

    #[test]
    fn new_game_falls_back_to_default_baseline() {
        let service = service();
        service.add_scenario(draft("h1", Department::Hr)).expect("add");
        let mut rng = StdRng::seed_from_u64(3);
        let view = service.new_game("p1", setup(), &mut rng).expect("new game");
        assert!(view.game_id.starts_with("game_p1_"));
        assert_eq!(view.state.metrics, Some(MetricVector::default_baseline()));
        assert_eq!(view.phase, GamePhase::AwaitingDecision { remaining: 1 });
    }

    #[test]
    fn new_game_uses_stored_baseline() {
        let service = service();
        service
            .set_baseline(HotelType::Boutique, MetricVector::new(70.0, 65.0, 60.0, 55.0, 50.0))
            .expect("set");
        let mut rng = StdRng::seed_from_u64(3);
        let view = service.new_game("p1", setup(), &mut rng).expect("new game");
        assert_eq!(view.state.metrics.map(|m| m.revenue), Some(70.0));
        assert_eq!(view.phase, GamePhase::NoContent);
    }

    #[test]
    fn submit_persists_state_and_log() {
        let service = service();
        service.add_scenario(draft("h1", Department::Hr)).expect("add");
        service.add_scenario(draft("h2", Department::Hr)).expect("add");
        service
            .add_scenario(draft("ops", Department::Operations))
            .expect("add");
        let mut rng = StdRng::seed_from_u64(8);
        let view = service.new_game("p1", setup(), &mut rng).expect("new game");
        let first = view.active[0].id.clone();

        let outcome = service
            .submit(&view.game_id, &first, 0, &mut rng)
            .expect("submit");
        assert!(outcome.day_completed);
        assert_eq!(outcome.unlocked, vec![AchievementId::FirstDecision]);

        let reloaded = service.view(&view.game_id).expect("view");
        assert_eq!(reloaded.state.completed_turns, 1);
        assert_eq!(reloaded.state.current_day, 2);
        assert_eq!(reloaded.state.metrics.map(|m| m.staff_satisfaction), Some(60.0));
        assert_eq!(reloaded.active.len(), 1);
        assert_ne!(reloaded.active[0].id, first);
        assert_eq!(reloaded.active[0].department, Department::Hr);

        let history = service.history(&view.game_id).expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question_id, first);
        assert_eq!(service.averages(&view.game_id).expect("avg").decisions, 1);
        assert_eq!(service.timeline(&view.game_id).expect("timeline").len(), 1);
    }

    #[test]
    fn rejected_submit_changes_nothing() {
        let service = service();
        service.add_scenario(draft("h1", Department::Hr)).expect("add");
        let mut rng = StdRng::seed_from_u64(8);
        let view = service.new_game("p1", setup(), &mut rng).expect("new game");
        let err = service
            .submit(&view.game_id, "nope", 0, &mut rng)
            .expect_err("unknown scenario");
        assert!(matches!(err, GameError::InvalidState(_)));
        assert_eq!(service.view(&view.game_id).expect("view"), view);
        assert!(service.history(&view.game_id).expect("history").is_empty());
    }

    #[test]
    fn refresh_picks_up_new_content() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(8);
        let view = service.new_game("p1", setup(), &mut rng).expect("new game");
        assert_eq!(view.phase, GamePhase::NoContent);
        service.add_scenario(draft("h1", Department::Hr)).expect("add");
        let view = service.refresh(&view.game_id, &mut rng).expect("refresh");
        assert_eq!(view.phase, GamePhase::AwaitingDecision { remaining: 1 });
        assert_eq!(service.view(&view.game_id).expect("view").active.len(), 1);
    }

    #[test]
    fn unknown_game_is_not_found() {
        let service = service();
        let err = service.view("game_missing_1").expect_err("missing");
        assert!(matches!(err, GameError::NotFound { kind: "game", .. }));
    }

    #[test]
    fn authoring_validates_and_removes() {
        let service = service();
        let mut bad = draft("bad", Department::Hr);
        bad.options.clear();
        assert!(matches!(
            service.add_scenario(bad),
            Err(GameError::Validation(_))
        ));

        let saved = service
            .add_scenario(ScenarioDraft {
                id: None,
                ..draft("ignored", Department::Sustainability)
            })
            .expect("add");
        assert!(saved.id.starts_with("q_"));
        assert_eq!(service.get_scenario(&saved.id).expect("get"), saved);
        service.remove_scenario(&saved.id).expect("remove");
        assert!(matches!(
            service.remove_scenario(&saved.id),
            Err(GameError::NotFound { .. })
        ));
    }

    #[test]
    fn baseline_rejects_out_of_range_values() {
        let service = service();
        let err = service
            .set_baseline(HotelType::Resort, MetricVector::new(120.0, 50.0, 50.0, 50.0, 50.0))
            .expect_err("out of range");
        assert!(matches!(err, GameError::Validation(_)));
        let view = service.baseline(HotelType::Resort).expect("baseline");
        assert!(!view.stored);
        assert_eq!(view.metrics, MetricVector::default_baseline());
    }

    #[test]
    fn missing_player_is_a_setup_error() {
        let service = service();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            service.new_game("  ", setup(), &mut rng),
            Err(GameError::MissingSetup(_))
        ));
    }
}
