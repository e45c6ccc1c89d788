use serde_json::Value;
use tracing::warn;

use super::scoring::{placeholder_evaluation, score_item};
use crate::error::BenchError;
use crate::model::{ItemEvaluation, ItemJudgment};

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub evaluations: Vec<ItemEvaluation>,
    pub degraded: usize,
    pub skipped: usize,
}

pub fn score_batch(records: &[Value]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (index, record) in records.iter().enumerate() {
        match parse_judgment(index, record) {
            Ok(judgment) => outcome.evaluations.push(score_item(&judgment)),
            Err(err) => {
                let Some(style) = record.get("style").and_then(Value::as_str) else {
                    warn!(index, error = %err, "skipping judgment without a style");
                    outcome.skipped += 1;
                    continue;
                };
                let item_id = record_item_id(record).unwrap_or_else(|| format!("item-{}", index + 1));
                warn!(index, style, item_id = %item_id, error = %err, "degrading judgment to placeholder");
                outcome
                    .evaluations
                    .push(placeholder_evaluation(style, &item_id, &err.to_string()));
                outcome.degraded += 1;
            }
        }
    }

    outcome
}

pub fn parse_judgment(index: usize, record: &Value) -> Result<ItemJudgment, BenchError> {
    if let Some(reason) = record.get("error").and_then(Value::as_str) {
        return Err(BenchError::parse(
            format!("judgment #{index}"),
            format!("judge reported error: {reason}"),
        ));
    }
    serde_json::from_value::<ItemJudgment>(record.clone())
        .map_err(|err| BenchError::parse(format!("judgment #{index}"), err))
}

fn record_item_id(record: &Value) -> Option<String> {
    ["item_id", "image_id", "image"]
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
}
