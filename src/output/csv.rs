use anyhow::Result;

use crate::decision::{Decision, ScoreAverages, TimelinePoint};
use crate::metrics::MetricKey;
use crate::scoring::ScoreMethod;

fn score(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_default()
}

pub fn history_to_csv(decisions: &[Decision]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    let mut header = vec![
        "day".to_string(),
        "question_id".to_string(),
        "scenario".to_string(),
        "option".to_string(),
    ];
    header.extend(MetricKey::ALL.iter().map(|k| format!("{}_after", k.as_slug())));
    header.extend(ScoreMethod::ALL.iter().map(|m| m.as_slug().to_string()));
    header.push("created_at".to_string());
    writer.write_record(&header)?;

    for d in decisions {
        let mut row = vec![
            d.day.to_string(),
            d.question_id.clone(),
            d.scenario_text.clone(),
            d.selected_option_text.clone(),
        ];
        row.extend(d.metrics_after.iter().map(|(_, v)| format!("{v:.1}")));
        row.extend(ScoreMethod::ALL.iter().map(|m| score(d.scores.get(*m))));
        row.push(d.created_at.to_rfc3339());
        writer.write_record(&row)?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn timeline_to_csv(points: &[TimelinePoint]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    let mut header = vec!["sequence".to_string(), "day".to_string()];
    header.extend(MetricKey::ALL.iter().map(|k| k.as_slug().to_string()));
    header.push("bao".to_string());
    writer.write_record(&header)?;

    for p in points {
        let mut row = vec![p.sequence.to_string(), p.day.to_string()];
        row.extend(p.metrics_after.iter().map(|(_, v)| format!("{v:.1}")));
        row.push(score(p.scores.bao));
        writer.write_record(&row)?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn averages_to_csv(averages: &ScoreAverages) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["method", "average", "decisions"])?;
    for method in ScoreMethod::ALL {
        writer.write_record([
            method.as_slug().to_string(),
            score(averages.get(method)),
            averages.decisions.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use crate::decision::{RecordedScores, ScoreAverages, TimelinePoint};
    use crate::metrics::MetricVector;
    use crate::output::csv::{averages_to_csv, timeline_to_csv};

    #[test]
    fn timeline_csv_has_one_row_per_point() {
        let points = vec![TimelinePoint {
            sequence: 1,
            day: 1,
            question_id: "q1".to_string(),
            metrics_after: MetricVector::new(55.0, 40.0, 50.0, 50.0, 50.0),
            scores: RecordedScores {
                bao: Some(-1.3),
                ..RecordedScores::default()
            },
        }];
        let csv = timeline_to_csv(&points).expect("csv");
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(
            lines[0],
            "sequence,day,revenue,customerSatisfaction,staffSatisfaction,occupancyRate,sustainability,bao"
        );
        assert_eq!(lines[1], "1,1,55.0,40.0,50.0,50.0,50.0,-1.3");
    }

    #[test]
    fn missing_averages_are_blank() {
        let csv = averages_to_csv(&ScoreAverages::default()).expect("csv");
        assert!(csv.contains("bao,,0"));
    }
}
