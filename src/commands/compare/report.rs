use std::fmt::Write;

use anyhow::Result;
use tracing::{info, warn};

use crate::model::{ComparisonResult, DeltaStatus, Grade, Verdict};

pub fn render_comparison_markdown(comparison: &ComparisonResult) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "# Comparison: {} vs {}",
        comparison.current_run_id, comparison.baseline_run_id
    )?;
    writeln!(out)?;
    writeln!(out, "Generated: {}", comparison.timestamp)?;
    writeln!(out)?;
    writeln!(out, "## Per-Style Deltas")?;
    writeln!(out)?;
    writeln!(out, "| Style | Baseline | Current | Delta | Status |")?;
    writeln!(out, "|-------|----------|---------|-------|--------|")?;
    for delta in &comparison.styles {
        let flag = if delta.status == DeltaStatus::Regression {
            " REGRESSION"
        } else {
            ""
        };
        writeln!(
            out,
            "| {} | {} | {} | {} | {}{} |",
            delta.style,
            format_score(delta.baseline_pct, delta.baseline_grade),
            format_score(delta.current_pct, delta.current_grade),
            format_delta(delta.delta_pct),
            delta.status.as_str(),
            flag
        )?;
    }

    let summary = &comparison.summary;
    writeln!(out)?;
    writeln!(out, "## Verdict")?;
    writeln!(out)?;
    writeln!(out, "- Improved: {}", summary.improved)?;
    writeln!(out, "- Regressed: {}", summary.regressed)?;
    writeln!(out, "- Unchanged: {}", summary.unchanged)?;
    if summary.not_comparable > 0 {
        writeln!(out, "- Not comparable: {}", summary.not_comparable)?;
    }
    writeln!(out, "- **Overall: {}**", summary.overall_verdict.as_str())?;
    Ok(out)
}

pub fn format_score(percentage: Option<f64>, grade: Option<Grade>) -> String {
    match (percentage, grade) {
        (Some(percentage), Some(grade)) => format!("{percentage:.1}% ({grade})"),
        (Some(percentage), None) => format!("{percentage:.1}%"),
        (None, _) => "n/a".to_string(),
    }
}

pub fn format_delta(delta_pct: Option<f64>) -> String {
    match delta_pct {
        Some(delta) if delta > 0.0 => format!("+{delta:.1}%"),
        Some(delta) => format!("{delta:.1}%"),
        None => "n/a".to_string(),
    }
}

pub fn log_comparison(comparison: &ComparisonResult) {
    for delta in &comparison.styles {
        info!(
            style = %delta.style,
            baseline = %format_score(delta.baseline_pct, delta.baseline_grade),
            current = %format_score(delta.current_pct, delta.current_grade),
            delta = %format_delta(delta.delta_pct),
            status = delta.status.as_str(),
            "style delta"
        );
    }

    let summary = &comparison.summary;
    if summary.overall_verdict == Verdict::RegressionDetected {
        warn!(
            baseline_run_id = %comparison.baseline_run_id,
            regressed = summary.regressed,
            improved = summary.improved,
            unchanged = summary.unchanged,
            "regression detected against baseline"
        );
    } else {
        info!(
            baseline_run_id = %comparison.baseline_run_id,
            verdict = summary.overall_verdict.as_str(),
            improved = summary.improved,
            regressed = summary.regressed,
            unchanged = summary.unchanged,
            not_comparable = summary.not_comparable,
            "comparison verdict"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{format_delta, render_comparison_markdown};
    use crate::model::{
        ComparisonResult, ComparisonSummary, DeltaStatus, Grade, StyleDelta, Verdict,
    };

    #[test]
    fn markdown_flags_regressions_and_missing_values() {
        let comparison = ComparisonResult {
            current_run_id: "Run_2026_02_05".to_string(),
            baseline_run_id: "Run_2026_02_04".to_string(),
            timestamp: "2026-02-05T10:00:00Z".to_string(),
            styles: vec![
                StyleDelta {
                    style: "Anime".to_string(),
                    current_pct: Some(75.0),
                    baseline_pct: Some(80.0),
                    delta_pct: Some(-5.0),
                    current_score: Some(18.75),
                    baseline_score: Some(20.0),
                    delta_score: Some(-1.25),
                    current_grade: Some(Grade::B),
                    baseline_grade: Some(Grade::A),
                    status: DeltaStatus::Regression,
                },
                StyleDelta {
                    style: "Doodle".to_string(),
                    current_pct: Some(60.0),
                    baseline_pct: None,
                    delta_pct: None,
                    current_score: Some(15.0),
                    baseline_score: None,
                    delta_score: None,
                    current_grade: Some(Grade::C),
                    baseline_grade: None,
                    status: DeltaStatus::Added,
                },
            ],
            summary: ComparisonSummary {
                improved: 0,
                regressed: 1,
                unchanged: 0,
                not_comparable: 1,
                overall_verdict: Verdict::RegressionDetected,
            },
        };

        let markdown = render_comparison_markdown(&comparison).expect("markdown should render");
        assert!(markdown.starts_with("# Comparison: Run_2026_02_05 vs Run_2026_02_04\n"));
        assert!(markdown.contains("| Anime | 80.0% (A) | 75.0% (B) | -5.0% | regression REGRESSION |"));
        assert!(markdown.contains("| Doodle | n/a | 60.0% (C) | n/a | added |"));
        assert!(markdown.contains("- Not comparable: 1"));
        assert!(markdown.contains("- **Overall: REGRESSION_DETECTED**"));
    }

    #[test]
    fn positive_deltas_carry_a_sign() {
        assert_eq!(format_delta(Some(2.0)), "+2.0%");
        assert_eq!(format_delta(Some(0.0)), "0.0%");
        assert_eq!(format_delta(Some(-0.3)), "-0.3%");
    }
}
