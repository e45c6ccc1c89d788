use std::collections::HashMap;

use crate::model::{Dimension, Grade, ItemEvaluation, JudgeRankings, RunSpec, StyleRanking};
use crate::util::{mean, now_utc_string, round_to};

pub fn feasibility_rankings(spec: &RunSpec, items: &[ItemEvaluation]) -> JudgeRankings {
    JudgeRankings {
        judge: format!(
            "{} (ACRUE {})",
            spec.judges.feasibility.model, spec.acrue_version
        ),
        timestamp: now_utc_string(),
        methodology: "Rankings computed from ACRUE weighted_total averages".to_string(),
        rankings: rank_items(items),
    }
}

pub fn rank_items(items: &[ItemEvaluation]) -> Vec<StyleRanking> {
    let mut rankings = group_by_style(items)
        .into_iter()
        .map(|(style, members)| summarize_group(style, &members))
        .collect::<Vec<StyleRanking>>();

    rankings.sort_by(|left, right| right.avg_score.total_cmp(&left.avg_score));
    for (index, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = index as u32 + 1;
    }
    rankings
}

fn group_by_style(items: &[ItemEvaluation]) -> Vec<(&str, Vec<&ItemEvaluation>)> {
    let mut positions = HashMap::<&str, usize>::new();
    let mut groups = Vec::<(&str, Vec<&ItemEvaluation>)>::new();

    for item in items {
        let style = item.style.as_str();
        match positions.get(style) {
            Some(&position) => groups[position].1.push(item),
            None => {
                positions.insert(style, groups.len());
                groups.push((style, vec![item]));
            }
        }
    }
    groups
}

fn summarize_group(style: &str, members: &[&ItemEvaluation]) -> StyleRanking {
    let totals = members
        .iter()
        .map(|item| item.weighted_total)
        .collect::<Vec<f64>>();
    let percentages = members
        .iter()
        .map(|item| item.percentage)
        .collect::<Vec<f64>>();

    StyleRanking {
        rank: 0,
        style: style.to_string(),
        avg_score: round_to(mean(&totals).unwrap_or(0.0), 2),
        avg_percentage: round_to(mean(&percentages).unwrap_or(0.0), 1),
        avg_grade: average_grade(members),
        reasoning: group_reasoning(members),
    }
}

/// Averages letter grades through their ordinals rather than re-grading the
/// average percentage; the two can disagree near a breakpoint.
pub fn average_grade(members: &[&ItemEvaluation]) -> Grade {
    let ordinals = members
        .iter()
        .map(|item| f64::from(item.grade.ordinal()))
        .collect::<Vec<f64>>();
    mean(&ordinals)
        .map(Grade::from_ordinal_mean)
        .unwrap_or(Grade::F)
}

fn group_reasoning(members: &[&ItemEvaluation]) -> String {
    let breakdown = Dimension::ALL
        .iter()
        .filter_map(|dimension| {
            let scores = members
                .iter()
                .map(|item| item.dimensions.get(*dimension).weighted_score)
                .collect::<Vec<f64>>();
            mean(&scores).map(|average| format!("{}: {average:.1}", dimension.title()))
        })
        .collect::<Vec<String>>();

    format!(
        "Average across {} images. {}",
        members.len(),
        breakdown.join(", ")
    )
}
