use std::collections::HashMap;

use anyhow::{Result, bail};
use tracing::warn;

use crate::error::BenchError;
use crate::model::{AppliedWeights, RunSpec, SynthesisRanking, SynthesisResult};

pub type RankMap = HashMap<String, u32>;

pub fn rank_map<'a>(entries: impl IntoIterator<Item = (&'a str, u32)>) -> RankMap {
    entries
        .into_iter()
        .map(|(style, rank)| (style.to_string(), rank))
        .collect()
}

pub fn missing_rank(spec: &RunSpec) -> u32 {
    spec.styles.len() as u32
}

pub fn synthesize(
    spec: &RunSpec,
    feasibility: &RankMap,
    preference: &RankMap,
) -> Result<SynthesisResult> {
    if spec.styles.is_empty() {
        bail!("run spec {} declares no styles to synthesize", spec.run_id);
    }

    let weights = AppliedWeights {
        feasibility: spec.synthesis.feasibility_weight,
        preference: spec.synthesis.preference_weight,
    };
    let fallback = missing_rank(spec);

    let mut rankings = spec
        .styles
        .iter()
        .map(|style| {
            let feasibility_rank = lookup_rank(feasibility, style, "feasibility", fallback);
            let preference_rank = lookup_rank(preference, style, "preference", fallback);
            SynthesisRanking {
                style: style.clone(),
                feasibility_rank,
                preference_rank,
                final_score: weights.feasibility * f64::from(feasibility_rank)
                    + weights.preference * f64::from(preference_rank),
                rank: 0,
            }
        })
        .collect::<Vec<SynthesisRanking>>();

    rankings.sort_by(|left, right| left.final_score.total_cmp(&right.final_score));
    for (index, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = index as u32 + 1;
    }

    let winner = rankings[0].style.clone();
    Ok(SynthesisResult {
        winner,
        rankings,
        weights,
    })
}

fn lookup_rank(ranks: &RankMap, style: &str, source_label: &str, fallback: u32) -> u32 {
    match ranks.get(style) {
        Some(rank) => *rank,
        None => {
            let missing = BenchError::MissingData {
                style: style.to_string(),
                source_label: source_label.to_string(),
            };
            warn!(error = %missing, default_rank = fallback, "defaulting missing rank");
            fallback
        }
    }
}
