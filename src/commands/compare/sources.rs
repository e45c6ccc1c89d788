use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::error::BenchError;
use crate::model::{
    ACRUE_FILE, FEASIBILITY_FILE, Grade, LEGACY_FEASIBILITY_FILE, SYNTHESIS_FILE,
};
use crate::util::{first_existing, mean, read_json, round_to};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateScores {
    pub final_score: Option<f64>,
    pub feasibility_rank: Option<u32>,
    pub preference_rank: Option<u32>,
    pub avg_score: Option<f64>,
    pub avg_percentage: Option<f64>,
    pub avg_grade: Option<Grade>,
}

impl CandidateScores {
    fn inherit(&mut self, source: CandidateScores) {
        self.final_score = self.final_score.or(source.final_score);
        self.feasibility_rank = self.feasibility_rank.or(source.feasibility_rank);
        self.preference_rank = self.preference_rank.or(source.preference_rank);
        self.avg_score = self.avg_score.or(source.avg_score);
        self.avg_percentage = self.avg_percentage.or(source.avg_percentage);
        self.avg_grade = self.avg_grade.or(source.avg_grade);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunScores {
    pub run_id: String,
    pub styles: BTreeMap<String, CandidateScores>,
}

impl RunScores {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            styles: BTreeMap::new(),
        }
    }

    pub fn merge(&mut self, style: &str, scores: CandidateScores) {
        self.styles
            .entry(style.to_string())
            .or_default()
            .inherit(scores);
    }
}

#[derive(Debug, Deserialize)]
struct SynthesisSource {
    #[serde(default)]
    rankings: Vec<SynthesisSourceRow>,
}

#[derive(Debug, Deserialize)]
struct SynthesisSourceRow {
    style: String,
    #[serde(default)]
    final_score: Option<f64>,
    #[serde(default, alias = "gemini_rank", alias = "rank_a")]
    feasibility_rank: Option<u32>,
    #[serde(default, alias = "opus_rank", alias = "rank_b")]
    preference_rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AggregateSource {
    #[serde(default)]
    rankings: Vec<AggregateSourceRow>,
}

#[derive(Debug, Deserialize)]
struct AggregateSourceRow {
    style: String,
    #[serde(default)]
    avg_score: Option<f64>,
    #[serde(default)]
    avg_percentage: Option<f64>,
    #[serde(default)]
    avg_grade: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemSourceRow {
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    weighted_total: Option<f64>,
    #[serde(default)]
    percentage: Option<f64>,
    #[serde(default)]
    summary: Option<ItemSourceSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemSourceSummary {
    Scores {
        #[serde(default)]
        weighted_total: Option<f64>,
        #[serde(default)]
        percentage: Option<f64>,
    },
    Text(IgnoredAny),
}

impl ItemSourceRow {
    fn percentage(&self) -> Option<f64> {
        match &self.summary {
            Some(ItemSourceSummary::Scores { percentage, .. }) => percentage.or(self.percentage),
            _ => self.percentage,
        }
    }

    fn weighted_total(&self) -> Option<f64> {
        match &self.summary {
            Some(ItemSourceSummary::Scores { weighted_total, .. }) => {
                weighted_total.or(self.weighted_total)
            }
            _ => self.weighted_total,
        }
    }
}

/// Loads a run's per-style scores. Sources are read in priority order and an
/// earlier source's value is never replaced by a later one.
pub fn load_run_scores(run_dir: &Path, run_id: &str) -> Result<RunScores> {
    if !run_dir.is_dir() {
        return Err(BenchError::not_found(format!("run directory for {run_id}"), run_dir).into());
    }

    let mut scores = RunScores::new(run_id);

    let synthesis_path = run_dir.join(SYNTHESIS_FILE);
    if synthesis_path.exists() {
        let synthesis = read_json::<SynthesisSource>(&synthesis_path)?;
        for row in synthesis.rankings {
            scores.merge(
                &row.style,
                CandidateScores {
                    final_score: row.final_score,
                    feasibility_rank: row.feasibility_rank,
                    preference_rank: row.preference_rank,
                    ..CandidateScores::default()
                },
            );
        }
    }

    if let Some(aggregate_path) =
        first_existing(run_dir, &[FEASIBILITY_FILE, LEGACY_FEASIBILITY_FILE])
    {
        let aggregate = read_json::<AggregateSource>(&aggregate_path)?;
        for row in aggregate.rankings {
            scores.merge(
                &row.style,
                CandidateScores {
                    avg_score: row.avg_score,
                    avg_percentage: row.avg_percentage,
                    avg_grade: row.avg_grade.and_then(|grade| grade.parse().ok()),
                    ..CandidateScores::default()
                },
            );
        }
    }

    let items_path = run_dir.join(ACRUE_FILE);
    if items_path.exists() {
        let items = read_json::<Vec<ItemSourceRow>>(&items_path)?;
        for (style, item_scores) in aggregate_items(&items) {
            scores.merge(&style, item_scores);
        }
    }

    Ok(scores)
}

fn aggregate_items(items: &[ItemSourceRow]) -> BTreeMap<String, CandidateScores> {
    let mut grouped = BTreeMap::<String, (Vec<f64>, Vec<f64>)>::new();
    for item in items {
        let Some(style) = item.style.as_deref().filter(|style| !style.is_empty()) else {
            continue;
        };
        let entry = grouped.entry(style.to_string()).or_default();
        if let Some(weighted_total) = item.weighted_total() {
            entry.0.push(weighted_total);
        }
        if let Some(percentage) = item.percentage() {
            entry.1.push(percentage);
        }
    }

    grouped
        .into_iter()
        .map(|(style, (totals, percentages))| {
            let avg_percentage = mean(&percentages).map(|value| round_to(value, 1));
            let scores = CandidateScores {
                avg_score: mean(&totals).map(|value| round_to(value, 2)),
                avg_percentage,
                avg_grade: avg_percentage.map(Grade::from_percentage),
                ..CandidateScores::default()
            };
            (style, scores)
        })
        .collect()
}
