use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const CANDIDATE_COUNT: usize = 3;
pub const ITEM_COUNT: u32 = 3;
pub const MAX_SCORE: f64 = 25.0;
pub const MAX_DIMENSION_SCORE: f64 = 5.0;

pub const RUN_SPEC_FILE: &str = "run_spec.json";
pub const JUDGMENTS_FILE: &str = "judgments.json";
pub const ACRUE_FILE: &str = "acrue.json";
pub const FEASIBILITY_FILE: &str = "feasibility.json";
pub const LEGACY_FEASIBILITY_FILE: &str = "gemini.json";
pub const PREFERENCE_FILE: &str = "preference.json";
pub const LEGACY_PREFERENCE_FILE: &str = "opus.json";
pub const SYNTHESIS_FILE: &str = "synthesis.json";
pub const REPORT_FILE: &str = "report.md";
pub const COMPARISON_FILE: &str = "comparison.json";
pub const COMPARISON_REPORT_FILE: &str = "comparison.md";

#[derive(Debug, Clone)]
pub struct BenchPaths {
    pub project_root: PathBuf,
    pub runs_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub spec_path: PathBuf,
}

impl BenchPaths {
    pub fn from_root(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            runs_dir: project_root.join("runs"),
            ledger_path: project_root.join("benchmark_ledger.sqlite"),
            spec_path: project_root.join(RUN_SPEC_FILE),
        }
    }

    pub fn output_dir(&self, spec: &RunSpec) -> PathBuf {
        self.project_root.join(&spec.output_dir)
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.runs_dir.join(run_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub run_id: String,
    pub styles: Vec<String>,
    pub image_count: u32,
    pub output_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_run_id: Option<String>,
    pub judges: JudgeModels,
    pub synthesis: SynthesisWeights,
    pub pipeline_version: String,
    pub acrue_version: String,
}

impl RunSpec {
    pub fn baseline_run_id(&self) -> Option<&str> {
        self.baseline_run_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeModels {
    pub feasibility: JudgeModel,
    pub preference: JudgeModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeModel {
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisWeights {
    pub feasibility_weight: f64,
    pub preference_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    F,
}

const PERCENTAGE_BREAKPOINTS: [(f64, Grade); 4] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::B),
    (60.0, Grade::C),
];

const ORDINAL_BREAKPOINTS: [(f64, Grade); 4] = [
    (4.5, Grade::APlus),
    (3.5, Grade::A),
    (2.5, Grade::B),
    (1.5, Grade::C),
];

impl Grade {
    pub fn from_percentage(percentage: f64) -> Self {
        PERCENTAGE_BREAKPOINTS
            .iter()
            .find(|(threshold, _)| percentage >= *threshold)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::APlus => 5,
            Self::A => 4,
            Self::B => 3,
            Self::C => 2,
            Self::F => 1,
        }
    }

    pub fn from_ordinal_mean(mean: f64) -> Self {
        ORDINAL_BREAKPOINTS
            .iter()
            .find(|(threshold, _)| mean >= *threshold)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "A+" => Ok(Self::APlus),
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "F" => Ok(Self::F),
            other => Err(format!("unknown grade: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Accuracy,
    Completeness,
    Relevance,
    Usefulness,
    Exceptional,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Accuracy,
        Dimension::Completeness,
        Dimension::Relevance,
        Dimension::Usefulness,
        Dimension::Exceptional,
    ];

    pub fn weight(self) -> f64 {
        match self {
            Self::Accuracy | Self::Completeness => 1.0,
            Self::Relevance | Self::Usefulness => 0.5,
            Self::Exceptional => 2.0,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Accuracy => "Accuracy",
            Self::Completeness => "Completeness",
            Self::Relevance => "Relevance",
            Self::Usefulness => "Usefulness",
            Self::Exceptional => "Exceptional",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionSet<T> {
    pub accuracy: T,
    pub completeness: T,
    pub relevance: T,
    pub usefulness: T,
    pub exceptional: T,
}

impl<T> DimensionSet<T> {
    pub fn get(&self, dimension: Dimension) -> &T {
        match dimension {
            Dimension::Accuracy => &self.accuracy,
            Dimension::Completeness => &self.completeness,
            Dimension::Relevance => &self.relevance,
            Dimension::Usefulness => &self.usefulness,
            Dimension::Exceptional => &self.exceptional,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &T)> {
        Dimension::ALL
            .into_iter()
            .map(move |dimension| (dimension, self.get(dimension)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Dimension, &T) -> U) -> DimensionSet<U> {
        DimensionSet {
            accuracy: f(Dimension::Accuracy, &self.accuracy),
            completeness: f(Dimension::Completeness, &self.completeness),
            relevance: f(Dimension::Relevance, &self.relevance),
            usefulness: f(Dimension::Usefulness, &self.usefulness),
            exceptional: f(Dimension::Exceptional, &self.exceptional),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    #[serde(alias = "yes", alias = "YES")]
    Yes,
    #[serde(alias = "no", alias = "NO")]
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Confidence {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("confidence must be within 1..=5, got {value}"))
        }
    }
}

impl From<Confidence> for u8 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    pub id: String,
    pub question: String,
    pub answer: Answer,
    pub confidence: Confidence,
    #[serde(default)]
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDimension {
    #[serde(default)]
    pub passed: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub avg_confidence: Option<f64>,
    pub dimension_score: f64,
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemJudgment {
    pub style: String,
    #[serde(alias = "image_id", alias = "image")]
    pub item_id: String,
    pub dimensions: DimensionSet<RawDimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub weight: f64,
    pub passed: u32,
    pub total: u32,
    pub pass_rate: String,
    pub avg_confidence: f64,
    pub dimension_score: f64,
    pub weighted_score: f64,
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub total_assertions: u32,
    pub total_passed: u32,
    pub overall_pass_rate: String,
    pub overall_avg_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEvaluation {
    pub style: String,
    pub item_id: String,
    pub dimensions: DimensionSet<DimensionScore>,
    pub weighted_total: f64,
    pub percentage: f64,
    pub grade: Grade,
    pub summary: ItemSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRanking {
    pub rank: u32,
    pub style: String,
    pub avg_score: f64,
    pub avg_percentage: f64,
    pub avg_grade: Grade,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeRankings {
    pub judge: String,
    pub timestamp: String,
    pub methodology: String,
    pub rankings: Vec<StyleRanking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRanking {
    pub rank: u32,
    pub style: String,
    #[serde(default)]
    pub appeal_score: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRankings {
    #[serde(default)]
    pub judge: Option<String>,
    pub rankings: Vec<PreferenceRanking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRanking {
    pub style: String,
    #[serde(alias = "gemini_rank", alias = "rank_a")]
    pub feasibility_rank: u32,
    #[serde(alias = "opus_rank", alias = "rank_b")]
    pub preference_rank: u32,
    pub final_score: f64,
    pub rank: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedWeights {
    #[serde(alias = "a")]
    pub feasibility: f64,
    #[serde(alias = "b")]
    pub preference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub winner: String,
    pub rankings: Vec<SynthesisRanking>,
    pub weights: AppliedWeights,
}

impl SynthesisResult {
    pub fn feasibility_top(&self) -> Option<&str> {
        self.rankings
            .iter()
            .find(|ranking| ranking.feasibility_rank == 1)
            .map(|ranking| ranking.style.as_str())
    }

    pub fn preference_top(&self) -> Option<&str> {
        self.rankings
            .iter()
            .find(|ranking| ranking.preference_rank == 1)
            .map(|ranking| ranking.style.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaStatus {
    Unchanged,
    Improved,
    Regression,
    Added,
    Removed,
    Incomplete,
}

impl DeltaStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Improved => "improved",
            Self::Regression => "regression",
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Incomplete => "incomplete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    RegressionDetected,
    Improved,
    Unchanged,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegressionDetected => "REGRESSION_DETECTED",
            Self::Improved => "IMPROVED",
            Self::Unchanged => "UNCHANGED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDelta {
    pub style: String,
    pub current_pct: Option<f64>,
    pub baseline_pct: Option<f64>,
    pub delta_pct: Option<f64>,
    pub current_score: Option<f64>,
    pub baseline_score: Option<f64>,
    pub delta_score: Option<f64>,
    pub current_grade: Option<Grade>,
    pub baseline_grade: Option<Grade>,
    pub status: DeltaStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub improved: usize,
    pub regressed: usize,
    pub unchanged: usize,
    #[serde(default)]
    pub not_comparable: usize,
    pub overall_verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub current_run_id: String,
    pub baseline_run_id: String,
    pub timestamp: String,
    pub styles: Vec<StyleDelta>,
    pub summary: ComparisonSummary,
}

#[cfg(test)]
mod tests {
    use super::{Dimension, Grade, ItemJudgment, MAX_DIMENSION_SCORE, MAX_SCORE, RunSpec};

    #[test]
    fn grade_uses_strict_descending_breakpoints() {
        assert_eq!(Grade::from_percentage(90.0), Grade::APlus);
        assert_eq!(Grade::from_percentage(89.9), Grade::A);
        assert_eq!(Grade::from_percentage(80.0), Grade::A);
        assert_eq!(Grade::from_percentage(70.0), Grade::B);
        assert_eq!(Grade::from_percentage(60.0), Grade::C);
        assert_eq!(Grade::from_percentage(59.9), Grade::F);
        assert_eq!(Grade::from_percentage(0.0), Grade::F);
    }

    #[test]
    fn grade_ordinal_mean_remaps_with_half_point_breakpoints() {
        assert_eq!(Grade::from_ordinal_mean(4.5), Grade::APlus);
        assert_eq!(Grade::from_ordinal_mean(4.49), Grade::A);
        assert_eq!(Grade::from_ordinal_mean(2.5), Grade::B);
        assert_eq!(Grade::from_ordinal_mean(1.5), Grade::C);
        assert_eq!(Grade::from_ordinal_mean(1.0), Grade::F);
    }

    #[test]
    fn grade_serializes_as_letter() {
        let raw = serde_json::to_string(&Grade::APlus).expect("grade should serialize");
        assert_eq!(raw, "\"A+\"");
        let parsed: Grade = serde_json::from_str("\"C\"").expect("grade should parse");
        assert_eq!(parsed, Grade::C);
    }

    #[test]
    fn dimension_weights_sum_to_max_score() {
        let max = Dimension::ALL
            .iter()
            .map(|dimension| dimension.weight() * MAX_DIMENSION_SCORE)
            .sum::<f64>();
        assert_eq!(max, MAX_SCORE);
    }

    #[test]
    fn judgment_missing_a_dimension_is_rejected() {
        let raw = serde_json::json!({
            "style": "Anime",
            "item_id": "img-1",
            "dimensions": {
                "accuracy": { "dimension_score": 4.0 },
                "completeness": { "dimension_score": 4.0 },
                "relevance": { "dimension_score": 4.0 },
                "usefulness": { "dimension_score": 4.0 }
            }
        });
        let error = serde_json::from_value::<ItemJudgment>(raw)
            .expect_err("missing exceptional dimension should fail");
        assert!(error.to_string().contains("exceptional"), "unexpected: {error}");
    }

    #[test]
    fn assertion_confidence_outside_range_is_rejected() {
        let raw = serde_json::json!({
            "id": "A1",
            "question": "Is the subject recognizable?",
            "answer": "Yes",
            "confidence": 7,
            "evidence": "face intact"
        });
        let error = serde_json::from_value::<super::Assertion>(raw)
            .expect_err("confidence 7 should fail");
        assert!(error.to_string().contains("1..=5"), "unexpected: {error}");
    }

    #[test]
    fn blank_baseline_run_id_reads_as_unset() {
        let raw = serde_json::json!({
            "run_id": "Run_2026_02_04",
            "styles": ["Anime", "Pop Art", "Storybook"],
            "image_count": 3,
            "output_dir": "runs/Run_2026_02_04",
            "baseline_run_id": "  ",
            "judges": {
                "feasibility": { "model": "gemini-2.0-flash" },
                "preference": { "model": "opus" }
            },
            "synthesis": { "feasibility_weight": 0.5, "preference_weight": 0.5 },
            "pipeline_version": "1.1.0",
            "acrue_version": "3.0"
        });
        let spec: RunSpec = serde_json::from_value(raw).expect("spec should parse");
        assert_eq!(spec.baseline_run_id(), None);
    }
}
