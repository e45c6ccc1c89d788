use crate::commands::rank::rank_items;
use crate::commands::score::score_item;
use crate::commands::synthesize::{rank_map, synthesize};
use crate::commands::test_support::{STYLES, sample_spec, uniform_judgment};
use crate::model::{Grade, ItemEvaluation};

#[test]
fn perfect_style_wins_end_to_end() {
    let spec = sample_spec("Run_2026_02_04");
    let dimension_scores = [("Anime", 4.0), ("Pop Art", 5.0), ("Storybook", 3.0)];

    let mut evaluations = Vec::<ItemEvaluation>::new();
    for item in 1..=3 {
        for (style, score) in dimension_scores {
            let judgment = uniform_judgment(style, &format!("img-{item}"), score);
            evaluations.push(score_item(&judgment));
        }
    }
    assert_eq!(evaluations.len(), STYLES.len() * 3);

    let feasibility = rank_items(&evaluations);
    let pop_art = &feasibility[0];
    assert_eq!(pop_art.style, "Pop Art");
    assert_eq!(pop_art.rank, 1);
    assert_eq!(pop_art.avg_score, 25.0);
    assert_eq!(pop_art.avg_percentage, 100.0);
    assert_eq!(pop_art.avg_grade, Grade::APlus);
    assert_eq!(feasibility[1].style, "Anime");
    assert_eq!(feasibility[2].avg_grade, Grade::C);

    let feasibility_ranks = rank_map(
        feasibility
            .iter()
            .map(|ranking| (ranking.style.as_str(), ranking.rank)),
    );
    let preference_ranks = rank_map([("Pop Art", 1), ("Storybook", 2), ("Anime", 3)]);

    let synthesis =
        synthesize(&spec, &feasibility_ranks, &preference_ranks).expect("synthesis should work");
    assert_eq!(synthesis.winner, "Pop Art");
    assert_eq!(synthesis.rankings[0].final_score, 1.0);
    assert_eq!(synthesis.feasibility_top(), Some("Pop Art"));
    assert_eq!(synthesis.preference_top(), Some("Pop Art"));
}
