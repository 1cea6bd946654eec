use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::decision::{Decision, ScoreAverages, TimelinePoint};
use crate::game::{AchievementId, DecisionOutcome, GamePhase};
use crate::metrics::{MetricKey, MetricVector};
use crate::report::PerformanceReport;
use crate::scenario::Scenario;
use crate::scoring::{ScoreMethod, ScoreRating};
use crate::service::{BaselineView, GameView};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn rating_cell(rating: ScoreRating) -> Cell {
    let color = match rating {
        ScoreRating::Excellent | ScoreRating::Good => Color::Green,
        ScoreRating::Neutral => Color::Yellow,
        ScoreRating::Caution | ScoreRating::Poor => Color::Red,
    };
    Cell::new(rating.to_string()).fg(color)
}

fn score_text(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| "-".to_string())
}

fn phase_text(phase: GamePhase) -> String {
    match phase {
        GamePhase::AwaitingDecision { remaining } => format!("{remaining} decision(s) pending"),
        GamePhase::NoContent => "no scenarios available today".to_string(),
        GamePhase::GameOver => "game over".to_string(),
    }
}

fn metrics_table(metrics: &MetricVector) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    for (key, value) in metrics.iter() {
        table.add_row(vec![key.label().to_string(), format!("{value:.1}")]);
    }
    table
}

pub fn render_game_table(view: &GameView) -> String {
    let mut out = format!(
        "Game {} | player {} | {} hotel | {} role\nDay {} | turns {} | {}\n",
        view.game_id,
        view.player_id,
        view.setup.hotel_type,
        view.setup.role,
        view.state.current_day,
        view.state.completed_turns,
        phase_text(view.phase)
    );
    match &view.state.metrics {
        Some(metrics) => out.push_str(&metrics_table(metrics).to_string()),
        None => out.push_str("Metrics unavailable"),
    }
    if !view.state.achievements.is_empty() {
        let names = view
            .state
            .achievements
            .iter()
            .map(AchievementId::name)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("\nAchievements: {names}"));
    }
    if !view.active.is_empty() {
        out.push('\n');
        out.push_str(&render_active_table(&view.active));
    }
    out
}

pub fn render_active_table(scenarios: &[Scenario]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Scenario", "Question", "Option", "Choice"]);
    for scenario in scenarios {
        for (idx, option) in scenario.options.iter().enumerate() {
            let (id, text) = if idx == 0 {
                (scenario.id.clone(), scenario.text.clone())
            } else {
                (String::new(), String::new())
            };
            table.add_row(vec![id, text, idx.to_string(), option.text.clone()]);
        }
    }
    table.to_string()
}

pub fn render_outcome_table(outcome: &DecisionOutcome) -> String {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Before", "After", "Change"]);
    for key in MetricKey::ALL {
        let before = outcome.decision.metrics_before.get(key);
        let after = outcome.decision.metrics_after.get(key);
        table.add_row(vec![
            key.label().to_string(),
            format!("{before:.1}"),
            format!("{after:.1}"),
            format!("{:+.1}", after - before),
        ]);
    }

    let mut scores = new_table();
    scores.set_header(vec!["Indicator", "Score"]);
    for method in ScoreMethod::ALL {
        scores.add_row(vec![
            method.label().to_string(),
            format!("{:.1}", outcome.scores.get(method)),
        ]);
    }
    scores.add_row(Row::from(vec![
        Cell::new("Rating"),
        rating_cell(outcome.rating),
    ]));

    let mut out = format!(
        "{} -> {}\n{}\n{}",
        outcome.decision.scenario_text,
        outcome.decision.selected_option_text,
        table,
        scores
    );
    for id in &outcome.unlocked {
        out.push_str(&format!("\nAchievement unlocked: {} ({})", id.name(), id.description()));
    }
    if outcome.game_over {
        out.push_str("\nGame over.");
    } else if outcome.day_completed {
        out.push_str(&format!("\nDay complete: {}", phase_text(outcome.phase)));
    }
    out
}

pub fn render_history_table(decisions: &[Decision]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Day", "Scenario", "Choice", "BAO", "Rating", "Decided At"]);
    for d in decisions {
        let rating = match d.scores.bao {
            Some(bao) => rating_cell(ScoreRating::from_score(bao)),
            None => Cell::new("-"),
        };
        table.add_row(Row::from(vec![
            Cell::new(d.day.to_string()),
            Cell::new(&d.scenario_text),
            Cell::new(&d.selected_option_text),
            Cell::new(score_text(d.scores.bao)),
            rating,
            Cell::new(d.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]));
    }
    table.to_string()
}

pub fn render_timeline_table(points: &[TimelinePoint]) -> String {
    let mut table = new_table();
    let mut header = vec!["#".to_string(), "Day".to_string()];
    header.extend(MetricKey::ALL.iter().map(|k| k.label().to_string()));
    header.push("BAO".to_string());
    table.set_header(header);
    for p in points {
        let mut row = vec![p.sequence.to_string(), p.day.to_string()];
        row.extend(p.metrics_after.iter().map(|(_, v)| format!("{v:.1}")));
        row.push(score_text(p.scores.bao));
        table.add_row(row);
    }
    table.to_string()
}

pub fn render_averages_table(averages: &ScoreAverages) -> String {
    let mut table = new_table();
    table.set_header(vec!["Indicator", "Average"]);
    for method in ScoreMethod::ALL {
        let label = if method.lower_is_better() {
            format!("{} (lower is better)", method.label())
        } else {
            method.label().to_string()
        };
        table.add_row(vec![label, score_text(averages.get(method))]);
    }
    format!("{}\nDecisions: {}", table, averages.decisions)
}

pub fn render_scenarios_table(scenarios: &[Scenario]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Id", "Department", "Difficulty", "Options", "Question"]);
    for s in scenarios {
        table.add_row(vec![
            s.id.clone(),
            s.department.to_string(),
            s.difficulty.to_string(),
            s.options.len().to_string(),
            s.text.clone(),
        ]);
    }
    table.to_string()
}

pub fn render_baseline_table(view: &BaselineView) -> String {
    let source = if view.stored { "stored" } else { "default" };
    format!(
        "{} baseline ({source})\n{}",
        view.hotel_type,
        metrics_table(&view.metrics)
    )
}

pub fn render_report(report: &PerformanceReport) -> String {
    let mut out = report.summary.clone();
    match (&report.analysis, &report.analysis_error) {
        (Some(analysis), _) => {
            out.push_str("\nAnalysis:\n");
            out.push_str(analysis);
        }
        (None, Some(err)) => out.push_str(&format!("\nAnalysis unavailable: {err}")),
        (None, None) => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::decision::ScoreAverages;
    use crate::output::table::render_averages_table;

    #[test]
    fn averages_table_marks_missing_values() {
        let averages = ScoreAverages {
            decisions: 2,
            bao: Some(1.5),
            ..ScoreAverages::default()
        };
        let text = render_averages_table(&averages);
        assert!(text.contains("1.5"));
        assert!(text.contains("VIKOR S (lower is better)"));
        assert!(text.contains("Decisions: 2"));
    }
}
