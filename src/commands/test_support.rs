use std::path::Path;

use crate::model::{
    Answer, Assertion, BenchPaths, Confidence, DimensionSet, ItemJudgment, JudgeModel,
    JudgeModels, RawDimension, RunSpec, SynthesisWeights,
};
use crate::util::write_json_pretty;

pub const STYLES: [&str; 3] = ["Anime", "Pop Art", "Storybook"];

pub fn sample_spec(run_id: &str) -> RunSpec {
    RunSpec {
        run_id: run_id.to_string(),
        styles: STYLES.iter().map(|style| style.to_string()).collect(),
        image_count: 3,
        output_dir: format!("runs/{run_id}"),
        baseline_run_id: None,
        judges: JudgeModels {
            feasibility: JudgeModel {
                model: "gemini-2.0-flash".to_string(),
            },
            preference: JudgeModel {
                model: "claude-opus".to_string(),
            },
        },
        synthesis: SynthesisWeights {
            feasibility_weight: 0.5,
            preference_weight: 0.5,
        },
        pipeline_version: "1.1.0".to_string(),
        acrue_version: "3.0".to_string(),
    }
}

pub fn write_spec(paths: &BenchPaths, spec: &RunSpec) {
    write_json_pretty(&paths.spec_path, spec).expect("spec fixture should write");
}

pub fn paths_in(root: &Path) -> BenchPaths {
    BenchPaths::from_root(root)
}

pub fn credential_present(_: &str) -> Option<String> {
    Some("test-key".to_string())
}

pub fn credential_missing(_: &str) -> Option<String> {
    None
}

fn assertion(id: &str, answer: Answer) -> Assertion {
    Assertion {
        id: id.to_string(),
        question: format!("Question {id}?"),
        answer,
        confidence: Confidence::try_from(4).expect("4 is a valid confidence"),
        evidence: "visible in output".to_string(),
    }
}

fn raw_dimension(score: f64) -> RawDimension {
    RawDimension {
        passed: None,
        total: None,
        avg_confidence: None,
        dimension_score: score,
        assertions: vec![assertion("Q1", Answer::Yes), assertion("Q2", Answer::No)],
    }
}

pub fn uniform_judgment(style: &str, item_id: &str, score: f64) -> ItemJudgment {
    ItemJudgment {
        style: style.to_string(),
        item_id: item_id.to_string(),
        dimensions: DimensionSet {
            accuracy: raw_dimension(score),
            completeness: raw_dimension(score),
            relevance: raw_dimension(score),
            usefulness: raw_dimension(score),
            exceptional: raw_dimension(score),
        },
    }
}
