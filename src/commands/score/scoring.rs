use crate::model::{
    Answer, Assertion, Dimension, DimensionScore, DimensionSet, Grade, ItemEvaluation,
    ItemJudgment, ItemSummary, MAX_DIMENSION_SCORE, MAX_SCORE, RawDimension,
};
use crate::util::{mean, round_to};

pub fn score_item(judgment: &ItemJudgment) -> ItemEvaluation {
    let dimensions = judgment.dimensions.map(score_dimension);

    let weighted_total = round_to(
        dimensions
            .iter()
            .map(|(_, score)| score.weighted_score)
            .sum::<f64>(),
        2,
    );
    let percentage = round_to((weighted_total / MAX_SCORE * 100.0).clamp(0.0, 100.0), 1);

    ItemEvaluation {
        style: judgment.style.clone(),
        item_id: judgment.item_id.clone(),
        summary: summarize_dimensions(&judgment.dimensions, &dimensions),
        dimensions,
        weighted_total,
        percentage,
        grade: Grade::from_percentage(percentage),
    }
}

pub fn score_dimension(dimension: Dimension, raw: &RawDimension) -> DimensionScore {
    let passed = raw.passed.unwrap_or_else(|| {
        raw.assertions
            .iter()
            .filter(|assertion| assertion.answer == Answer::Yes)
            .count() as u32
    });
    let total = raw.total.unwrap_or(raw.assertions.len() as u32);
    let avg_confidence = raw
        .avg_confidence
        .or_else(|| mean_confidence(&raw.assertions))
        .unwrap_or(0.0);

    let dimension_score = raw.dimension_score.clamp(0.0, MAX_DIMENSION_SCORE);
    let weighted_score = dimension_score * dimension.weight();

    DimensionScore {
        weight: dimension.weight(),
        passed,
        total,
        pass_rate: format!("{passed}/{total}"),
        avg_confidence: round_to(avg_confidence, 2),
        dimension_score: round_to(dimension_score, 2),
        weighted_score: round_to(weighted_score, 2),
        assertions: raw.assertions.clone(),
    }
}

pub fn placeholder_evaluation(style: &str, item_id: &str, reason: &str) -> ItemEvaluation {
    let empty = RawDimension {
        passed: Some(0),
        total: Some(0),
        avg_confidence: Some(0.0),
        dimension_score: 0.0,
        assertions: Vec::new(),
    };
    let judgment = ItemJudgment {
        style: style.to_string(),
        item_id: item_id.to_string(),
        dimensions: DimensionSet {
            accuracy: empty.clone(),
            completeness: empty.clone(),
            relevance: empty.clone(),
            usefulness: empty.clone(),
            exceptional: empty,
        },
    };

    let mut evaluation = score_item(&judgment);
    evaluation.summary.note = Some(format!("degraded: {reason}"));
    evaluation
}

fn summarize_dimensions(
    raw: &DimensionSet<RawDimension>,
    scored: &DimensionSet<DimensionScore>,
) -> ItemSummary {
    let total_assertions = scored.iter().map(|(_, score)| score.total).sum::<u32>();
    let total_passed = scored.iter().map(|(_, score)| score.passed).sum::<u32>();
    let confidences = raw
        .iter()
        .flat_map(|(_, dimension)| dimension.assertions.iter())
        .map(|assertion| f64::from(assertion.confidence.value()))
        .collect::<Vec<f64>>();

    ItemSummary {
        total_assertions,
        total_passed,
        overall_pass_rate: format!("{total_passed}/{total_assertions}"),
        overall_avg_confidence: round_to(mean(&confidences).unwrap_or(0.0), 2),
        note: None,
    }
}

fn mean_confidence(assertions: &[Assertion]) -> Option<f64> {
    let values = assertions
        .iter()
        .map(|assertion| f64::from(assertion.confidence.value()))
        .collect::<Vec<f64>>();
    mean(&values)
}
