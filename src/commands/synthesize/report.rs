use std::fmt::Write;

use anyhow::Result;

use crate::commands::compare::{format_delta, format_score};
use crate::model::{
    ComparisonResult, JudgeRankings, MAX_SCORE, PreferenceRankings, RunSpec, SynthesisResult,
};

pub struct ReportInputs<'a> {
    pub spec: &'a RunSpec,
    pub feasibility: &'a JudgeRankings,
    pub preference: &'a PreferenceRankings,
    pub synthesis: &'a SynthesisResult,
    pub comparison: Option<&'a ComparisonResult>,
    pub generated_at: &'a str,
}

pub fn render_report(inputs: &ReportInputs<'_>) -> Result<String> {
    let mut out = String::new();
    let spec = inputs.spec;

    writeln!(out, "# Benchmark Run: {}", spec.run_id)?;
    writeln!(out)?;
    writeln!(out, "## Final Rankings")?;
    writeln!(out)?;
    writeln!(
        out,
        "| Rank | Style | Feasibility Rank | Preference Rank | Final Score |"
    )?;
    writeln!(
        out,
        "|------|-------|------------------|-----------------|-------------|"
    )?;
    for ranking in &inputs.synthesis.rankings {
        writeln!(
            out,
            "| {} | {} | {} | {} | {:.2} |",
            ranking.rank,
            ranking.style,
            ranking.feasibility_rank,
            ranking.preference_rank,
            ranking.final_score
        )?;
    }
    writeln!(out)?;
    writeln!(out, "**Winner: {}**", inputs.synthesis.winner)?;
    writeln!(out)?;

    writeln!(out, "## Feasibility Assessment ({})", inputs.feasibility.judge)?;
    writeln!(out)?;
    for ranking in &inputs.feasibility.rankings {
        writeln!(
            out,
            "### {}. {} (Score: {}/{MAX_SCORE:.1}, {:.1}%, Grade: {})",
            ranking.rank, ranking.style, ranking.avg_score, ranking.avg_percentage, ranking.avg_grade
        )?;
        writeln!(out, "{}", ranking.reasoning)?;
        writeln!(out)?;
    }

    let preference_judge = inputs
        .preference
        .judge
        .as_deref()
        .unwrap_or(spec.judges.preference.model.as_str());
    writeln!(out, "## Preference Assessment ({preference_judge})")?;
    writeln!(out)?;
    for ranking in &inputs.preference.rankings {
        let appeal = ranking
            .appeal_score
            .map(|score| score.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        writeln!(
            out,
            "### {}. {} (Appeal: {appeal})",
            ranking.rank, ranking.style
        )?;
        if let Some(reasoning) = &ranking.reasoning {
            writeln!(out, "{reasoning}")?;
        }
        writeln!(out)?;
    }

    if let Some(comparison) = inputs.comparison {
        render_comparison_section(&mut out, comparison)?;
    }

    writeln!(out, "## Metadata")?;
    writeln!(out)?;
    writeln!(out, "- **Run ID**: {}", spec.run_id)?;
    writeln!(out, "- **Pipeline Version**: {}", spec.pipeline_version)?;
    writeln!(out, "- **ACRUE Version**: {}", spec.acrue_version)?;
    writeln!(out, "- **Feasibility Model**: {}", spec.judges.feasibility.model)?;
    writeln!(out, "- **Preference Model**: {}", spec.judges.preference.model)?;
    writeln!(out, "- **Timestamp**: {}", inputs.generated_at)?;
    writeln!(out, "- **Styles Tested**: {}", spec.styles.join(", "))?;
    writeln!(out, "- **Images Per Style**: {}", spec.image_count)?;
    writeln!(
        out,
        "- **Total Evaluations**: {}",
        spec.image_count as usize * spec.styles.len()
    )?;
    Ok(out)
}

fn render_comparison_section(out: &mut String, comparison: &ComparisonResult) -> Result<()> {
    writeln!(out, "## Comparison vs Baseline")?;
    writeln!(out)?;
    writeln!(out, "Baseline: **{}**", comparison.baseline_run_id)?;
    writeln!(out)?;
    writeln!(out, "| Style | Baseline | Current | Delta | Status |")?;
    writeln!(out, "|-------|----------|---------|-------|--------|")?;
    for delta in &comparison.styles {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            delta.style,
            format_score(delta.baseline_pct, None),
            format_score(delta.current_pct, None),
            format_delta(delta.delta_pct),
            delta.status.as_str()
        )?;
    }
    let summary = &comparison.summary;
    writeln!(out)?;
    writeln!(
        out,
        "**Verdict: {}** ({} improved, {} regressed, {} unchanged)",
        summary.overall_verdict.as_str(),
        summary.improved,
        summary.regressed,
        summary.unchanged
    )?;
    writeln!(out)?;
    Ok(())
}
