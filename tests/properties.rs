//! Property-based tests for the scorer.
//!
//! These hold for every input:
//! - scores stay within 0..=100
//! - analysis is deterministic down to the serialized bytes
//! - keyword tables are bounded, sorted and free of stop words
//! - one extra error-class condition costs exactly the error penalty

use proptest::prelude::*;
use seo_scorer::{analyze, ScoringConfig};

const OPTIMAL_TITLE: &str = "A Practical Guide to Writing Readable Article";

fn markdownish() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?#\\[\\]()!\n]{1,400}"
}

proptest! {
    #[test]
    fn prop_scores_are_bounded(
        content in markdownish(),
        title in "[a-zA-Z ]{0,80}",
        description in "[a-zA-Z ]{0,200}",
    ) {
        let result = analyze(&content, &title, &description);
        prop_assert!((0..=100).contains(&result.score));
        prop_assert!((0..=100).contains(&result.readability.score));
        prop_assert!(result.readability.grade_metric.is_finite());
        prop_assert!(result.readability.avg_sentence_length.is_finite());
    }

    #[test]
    fn prop_analysis_is_deterministic(
        content in markdownish(),
        title in "[a-zA-Z ]{0,80}",
    ) {
        let first = serde_json::to_string(&analyze(&content, &title, "")).unwrap();
        let second = serde_json::to_string(&analyze(&content, &title, "")).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_top_keywords_are_filtered_and_sorted(content in markdownish()) {
        let config = ScoringConfig::default();
        let result = analyze(&content, "", "");
        let top = &result.keywords.top_keywords;

        prop_assert!(top.len() <= 10);
        prop_assert!(result.keywords.suggestions.len() <= 3);
        for pair in top.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
        }
        for keyword in top {
            prop_assert!(keyword.word.chars().count() > 3);
            prop_assert!(!config.stop_words.contains(&keyword.word));
        }
    }

    #[test]
    fn prop_missing_title_costs_one_error(content in markdownish()) {
        let with_title = analyze(&content, OPTIMAL_TITLE, "");
        prop_assume!(with_title.score >= 15);
        let without_title = analyze(&content, "", "");
        prop_assert_eq!(with_title.score - without_title.score, 15);
    }

    #[test]
    fn prop_suggestions_sorted_by_priority(content in markdownish()) {
        let result = analyze(&content, "", "");
        for pair in result.suggestions.windows(2) {
            prop_assert!(pair[0].priority >= pair[1].priority);
        }
    }
}
