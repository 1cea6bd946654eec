pub mod llm;

use std::fmt::Write as _;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decision::{DecisionLog, ScoreAverages};
use crate::game::{AchievementId, GameRecord, GameRules};
use crate::metrics::{MetricKey, MetricVector};
use crate::scenario::{Department, HotelType};
use crate::scoring::ScoreMethod;

pub use llm::LlmClient;

/// Produces a free-text analysis for a prompt. One call, no retry.
#[async_trait]
pub trait ReportModel: Send + Sync {
    fn name(&self) -> &str;
    async fn analyze(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionLine {
    pub day: u32,
    pub question_id: String,
    pub scenario_text: String,
    pub selected_option_text: String,
    pub bao: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceReport {
    pub game_id: String,
    pub player_id: String,
    pub hotel_type: HotelType,
    pub role: Department,
    pub game_over: bool,
    pub completed_turns: u32,
    pub final_metrics: Option<MetricVector>,
    pub decisions: Vec<DecisionLine>,
    pub averages: ScoreAverages,
    pub achievements: Vec<AchievementId>,
    pub summary: String,
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub analysis_error: Option<String>,
}

pub fn build_report(record: &GameRecord, log: &DecisionLog, rules: &GameRules) -> PerformanceReport {
    let decisions = log
        .decisions()
        .iter()
        .map(|d| DecisionLine {
            day: d.day,
            question_id: d.question_id.clone(),
            scenario_text: d.scenario_text.clone(),
            selected_option_text: d.selected_option_text.clone(),
            bao: d.scores.bao,
        })
        .collect::<Vec<_>>();
    let mut report = PerformanceReport {
        game_id: record.game_id.clone(),
        player_id: record.player_id.clone(),
        hotel_type: record.setup.hotel_type,
        role: record.setup.role,
        game_over: record.state.completed_turns >= rules.max_turns,
        completed_turns: record.state.completed_turns,
        final_metrics: record.state.metrics,
        decisions,
        averages: log.averages(),
        achievements: record.state.achievements.iter().copied().collect(),
        summary: String::new(),
        analysis: None,
        analysis_error: None,
    };
    report.summary = summary_text(&report);
    report
}

pub fn summary_text(report: &PerformanceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Game {} ({} hotel, {} role): {} turn(s) completed{}",
        report.game_id,
        report.hotel_type,
        report.role,
        report.completed_turns,
        if report.game_over { ", game over" } else { "" }
    );
    match report.final_metrics {
        Some(metrics) => {
            out.push_str("Final metrics:\n");
            for (key, value) in metrics.iter() {
                let _ = writeln!(out, "  {}: {value:.1}", key.label());
            }
        }
        None => out.push_str("Final metrics: unavailable\n"),
    }
    let _ = writeln!(out, "Decisions made: {}", report.decisions.len());
    for line in &report.decisions {
        let _ = writeln!(
            out,
            "  Day {}: {} -> {}{}",
            line.day,
            line.scenario_text,
            line.selected_option_text,
            line.bao.map(|b| format!(" (BAO {b:.1})")).unwrap_or_default()
        );
    }
    if report.averages.decisions > 0 {
        out.push_str("Average scores:\n");
        for method in ScoreMethod::ALL {
            let value = report
                .averages
                .get(method)
                .map(|v| format!("{v:.1}"))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(out, "  {}: {value}", method.label());
        }
    }
    if report.achievements.is_empty() {
        out.push_str("Achievements: none\n");
    } else {
        let names = report
            .achievements
            .iter()
            .map(|a| a.name())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "Achievements: {names}");
    }
    out
}

pub fn analysis_prompt(report: &PerformanceReport) -> String {
    let mut prompt = String::from(
        "You are a hotel management coach. Review the player's decisions below and \
         write a short performance analysis: strengths, weaknesses and two concrete \
         suggestions. Refer to the metrics by name.\n\n",
    );
    prompt.push_str(&report.summary);
    if let Some(metrics) = report.final_metrics {
        let weakest = MetricKey::ALL
            .into_iter()
            .min_by(|a, b| metrics.get(*a).total_cmp(&metrics.get(*b)));
        if let Some(key) = weakest {
            let _ = write!(prompt, "\nWeakest metric: {}", key.label());
        }
    }
    prompt
}

/// Asks the model for an analysis. A model failure is recorded on the report
/// instead of failing the whole request.
pub async fn attach_analysis(report: &mut PerformanceReport, model: &dyn ReportModel) {
    let prompt = analysis_prompt(report);
    match model.analyze(&prompt).await {
        Ok(text) => {
            info!("{} analysis received for {}", model.name(), report.game_id);
            report.analysis = Some(text);
            report.analysis_error = None;
        }
        Err(err) => {
            warn!("{} analysis failed for {}: {err:#}", model.name(), report.game_id);
            report.analysis = None;
            report.analysis_error = Some(format!("{err:#}"));
        }
    }
}
