use std::collections::BTreeSet;

use super::sources::{CandidateScores, RunScores};
use crate::model::{ComparisonResult, ComparisonSummary, DeltaStatus, StyleDelta, Verdict};
use crate::util::round_to;

pub const UNCHANGED_THRESHOLD_PCT: f64 = 0.5;

pub fn classify_delta(delta_pct: f64) -> DeltaStatus {
    if delta_pct.abs() < UNCHANGED_THRESHOLD_PCT {
        DeltaStatus::Unchanged
    } else if delta_pct > 0.0 {
        DeltaStatus::Improved
    } else {
        DeltaStatus::Regression
    }
}

pub fn style_delta(
    style: &str,
    current: Option<&CandidateScores>,
    baseline: Option<&CandidateScores>,
) -> StyleDelta {
    let current_pct = current.and_then(|scores| scores.avg_percentage);
    let baseline_pct = baseline.and_then(|scores| scores.avg_percentage);
    let current_score = current.and_then(|scores| scores.avg_score);
    let baseline_score = baseline.and_then(|scores| scores.avg_score);

    let delta_pct = match (current_pct, baseline_pct) {
        (Some(current), Some(baseline)) => Some(round_to(current - baseline, 1)),
        _ => None,
    };
    let delta_score = match (current_score, baseline_score) {
        (Some(current), Some(baseline)) => Some(round_to(current - baseline, 2)),
        _ => None,
    };
    let status = match (delta_pct, current_pct, baseline_pct) {
        (Some(delta), _, _) => classify_delta(delta),
        (None, Some(_), None) => DeltaStatus::Added,
        (None, None, Some(_)) => DeltaStatus::Removed,
        _ => DeltaStatus::Incomplete,
    };

    StyleDelta {
        style: style.to_string(),
        current_pct,
        baseline_pct,
        delta_pct,
        current_score,
        baseline_score,
        delta_score,
        current_grade: current.and_then(|scores| scores.avg_grade),
        baseline_grade: baseline.and_then(|scores| scores.avg_grade),
        status,
    }
}

pub fn compare_scores(
    current: &RunScores,
    baseline: &RunScores,
    timestamp: String,
) -> ComparisonResult {
    let styles = current
        .styles
        .keys()
        .chain(baseline.styles.keys())
        .map(String::as_str)
        .collect::<BTreeSet<&str>>();

    let deltas = styles
        .into_iter()
        .map(|style| style_delta(style, current.styles.get(style), baseline.styles.get(style)))
        .collect::<Vec<StyleDelta>>();

    ComparisonResult {
        current_run_id: current.run_id.clone(),
        baseline_run_id: baseline.run_id.clone(),
        timestamp,
        summary: summarize_deltas(&deltas),
        styles: deltas,
    }
}

pub fn summarize_deltas(deltas: &[StyleDelta]) -> ComparisonSummary {
    let count = |status: DeltaStatus| deltas.iter().filter(|delta| delta.status == status).count();
    let improved = count(DeltaStatus::Improved);
    let regressed = count(DeltaStatus::Regression);
    let unchanged = count(DeltaStatus::Unchanged);

    let overall_verdict = if regressed > 0 {
        Verdict::RegressionDetected
    } else if improved > 0 {
        Verdict::Improved
    } else {
        Verdict::Unchanged
    };

    ComparisonSummary {
        improved,
        regressed,
        unchanged,
        not_comparable: deltas.len() - improved - regressed - unchanged,
        overall_verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_delta, compare_scores, style_delta};
    use crate::commands::compare::sources::{CandidateScores, RunScores};
    use crate::model::{DeltaStatus, Verdict};

    fn scored(percentage: f64, score: f64) -> CandidateScores {
        CandidateScores {
            avg_percentage: Some(percentage),
            avg_score: Some(score),
            ..CandidateScores::default()
        }
    }

    #[test]
    fn small_movement_is_unchanged() {
        let delta = style_delta("Anime", Some(&scored(80.3, 20.08)), Some(&scored(80.0, 20.0)));
        assert_eq!(delta.delta_pct, Some(0.3));
        assert_eq!(delta.delta_score, Some(0.08));
        assert_eq!(delta.status, DeltaStatus::Unchanged);
    }

    #[test]
    fn gains_and_losses_are_classified() {
        let improved = style_delta("Anime", Some(&scored(82.0, 20.5)), Some(&scored(80.0, 20.0)));
        assert_eq!(improved.delta_pct, Some(2.0));
        assert_eq!(improved.status, DeltaStatus::Improved);

        let regressed = style_delta("Anime", Some(&scored(75.0, 18.75)), Some(&scored(80.0, 20.0)));
        assert_eq!(regressed.delta_pct, Some(-5.0));
        assert_eq!(regressed.status, DeltaStatus::Regression);
    }

    #[test]
    fn threshold_is_half_a_point() {
        assert_eq!(classify_delta(0.4), DeltaStatus::Unchanged);
        assert_eq!(classify_delta(-0.4), DeltaStatus::Unchanged);
        assert_eq!(classify_delta(0.5), DeltaStatus::Improved);
        assert_eq!(classify_delta(-0.5), DeltaStatus::Regression);
    }

    #[test]
    fn any_regression_dominates_the_verdict() {
        let mut current = RunScores::new("Run_2026_02_05");
        current.merge("Anime", scored(82.0, 20.5));
        current.merge("Pop Art", scored(75.0, 18.75));
        current.merge("Storybook", scored(80.3, 20.08));
        let mut baseline = RunScores::new("Run_2026_02_04");
        baseline.merge("Anime", scored(80.0, 20.0));
        baseline.merge("Pop Art", scored(80.0, 20.0));
        baseline.merge("Storybook", scored(80.0, 20.0));

        let comparison = compare_scores(&current, &baseline, "2026-02-05T00:00:00Z".to_string());
        assert_eq!(comparison.summary.improved, 1);
        assert_eq!(comparison.summary.regressed, 1);
        assert_eq!(comparison.summary.unchanged, 1);
        assert_eq!(comparison.summary.overall_verdict, Verdict::RegressionDetected);
        assert_eq!(comparison.baseline_run_id, "Run_2026_02_04");
    }

    #[test]
    fn absent_scores_are_not_treated_as_zero() {
        let mut current = RunScores::new("Run_2026_02_05");
        current.merge("Anime", scored(80.0, 20.0));
        current.merge("Doodle", scored(60.0, 15.0));
        current.merge(
            "Graffiti",
            CandidateScores {
                final_score: Some(2.0),
                ..CandidateScores::default()
            },
        );
        let mut baseline = RunScores::new("Run_2026_02_04");
        baseline.merge("Anime", scored(0.0, 0.0));
        baseline.merge("Chibi Sticker", scored(70.0, 17.5));

        let comparison = compare_scores(&current, &baseline, "ts".to_string());
        let statuses = comparison
            .styles
            .iter()
            .map(|delta| (delta.style.as_str(), delta.status))
            .collect::<Vec<(&str, DeltaStatus)>>();
        assert_eq!(
            statuses,
            vec![
                ("Anime", DeltaStatus::Improved),
                ("Chibi Sticker", DeltaStatus::Removed),
                ("Doodle", DeltaStatus::Added),
                ("Graffiti", DeltaStatus::Incomplete),
            ]
        );
        assert_eq!(comparison.styles[0].delta_pct, Some(80.0));
        assert_eq!(comparison.styles[2].delta_pct, None);
        assert_eq!(comparison.summary.not_comparable, 3);
        assert_eq!(comparison.summary.overall_verdict, Verdict::Improved);
    }
}
