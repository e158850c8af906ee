use seo_scorer::{analyze, analyze_with, Band, GradeLabel, ScoringConfig, SuggestionKind};

const OPTIMAL_TITLE: &str = "A Practical Guide to Writing Readable Article";
const OPTIMAL_DESCRIPTION: &str = "Learn how sentence length, headings, images and trusted external links work together to make long-form articles easier to read and to share.";

fn body_sentences(n: usize) -> String {
    (0..n)
        .map(|_| "Writers measure clarity with careful editing and steady practice every day.")
        .collect::<Vec<_>>()
        .join(" ")
}

fn well_formed_article() -> String {
    format!(
        "# Building Better Articles\n\n\
         ## Why Structure Matters\n\n\
         {}\n\n\
         ![diagram](images/diagram.png)\n\n\
         ## Further Reading\n\n\
         Read the [style guide](https://example.com/guide) before drafting.\n\n\
         {}",
        body_sentences(50),
        body_sentences(50)
    )
}

#[test]
fn well_formed_article_scores_full_marks() {
    assert_eq!(OPTIMAL_TITLE.chars().count(), 45);
    assert_eq!(OPTIMAL_DESCRIPTION.chars().count(), 140);

    let result = analyze(&well_formed_article(), OPTIMAL_TITLE, OPTIMAL_DESCRIPTION);

    assert!(result.readability.word_count >= 1000);
    assert!(result.structure.has_h1);
    assert_eq!(result.structure.h2_count, 2);
    assert!(result.structure.has_images);
    assert_eq!(result.structure.external_links, 1);
    assert_eq!(result.structure.internal_links, 0);
    assert!(result.meta.title_optimal);
    assert!(result.meta.description_optimal);

    let messages: Vec<&str> = result.suggestions.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Title length is optimal",
            "Description length is optimal",
            "Content length is good",
        ]
    );
    assert!(result
        .suggestions
        .iter()
        .all(|s| s.kind == SuggestionKind::Success));
    assert_eq!(result.score, 100);
    assert_eq!(result.band, Band::Good);
}

#[test]
fn removing_title_costs_exactly_one_error() {
    let content = well_formed_article();
    let with_title = analyze(&content, OPTIMAL_TITLE, OPTIMAL_DESCRIPTION);
    let without_title = analyze(&content, "", OPTIMAL_DESCRIPTION);

    assert_eq!(with_title.score - without_title.score, 15);
    assert_eq!(without_title.suggestions[0].message, "Missing meta title");
    assert_eq!(without_title.suggestions[0].kind, SuggestionKind::Error);
}

#[test]
fn run_on_text_is_one_sentence() {
    let content = "word ".repeat(500);
    let result = analyze(&content, "", "");

    assert_eq!(result.readability.word_count, 500);
    assert_eq!(result.readability.sentence_count, 1);
    assert_eq!(result.readability.avg_sentence_length, 500.0);
    assert_eq!(result.readability.grade_metric, 191.2);
    assert_eq!(result.readability.grade_label, GradeLabel::College);
    assert_eq!(result.readability.score, 0);

    assert_eq!(result.keywords.top_keywords.len(), 1);
    assert_eq!(result.keywords.top_keywords[0].word, "word");
    assert_eq!(result.keywords.top_keywords[0].count, 500);
    assert_eq!(result.keywords.top_keywords[0].density, 100.0);
}

#[test]
fn readability_of_short_simple_text() {
    let result = analyze("The cat sat. The dog ran!", "", "");
    let r = &result.readability;
    assert_eq!(r.word_count, 6);
    assert_eq!(r.sentence_count, 2);
    assert_eq!(r.avg_sentence_length, 3.0);
    assert_eq!(r.grade_metric, -2.6);
    assert_eq!(r.grade_label, GradeLabel::Easy);
    assert_eq!(r.score, 100);
}

#[test]
fn degenerate_input_stays_finite() {
    for content in ["...", "!?!", "", "   "] {
        let result = analyze(content, "", "");
        assert_eq!(result.readability.word_count, 0);
        assert_eq!(result.readability.sentence_count, 0);
        assert!(result.readability.grade_metric.is_finite());
        assert_eq!(result.readability.avg_sentence_length, 0.0);
        assert!(result.keywords.top_keywords.is_empty());
        assert!((0..=100).contains(&result.score));
    }
}

#[test]
fn keywords_rank_by_count_then_first_occurrence() {
    let text = "Rust makes systems programming safer. \
                Rust programming rewards careful design. \
                Systems thinking helps.";
    let result = analyze(text, "", "");
    let words: Vec<&str> = result
        .keywords
        .top_keywords
        .iter()
        .map(|k| k.word.as_str())
        .collect();
    assert_eq!(
        words,
        vec![
            "rust",
            "systems",
            "programming",
            "makes",
            "safer",
            "rewards",
            "careful",
            "design",
            "thinking",
            "helps",
        ]
    );
    assert_eq!(result.keywords.suggestions, vec!["rust", "systems", "programming"]);
    let density = result.keywords.density["rust"];
    assert!((density - 2.0 / 13.0 * 100.0).abs() < 1e-9);
    assert_eq!(result.keywords.density.len(), 10);
}

#[test]
fn stop_words_and_short_words_are_not_keywords() {
    let text = "These cats would walk through these gardens. The cat and dog would nap.";
    let result = analyze(text, "", "");
    let words: Vec<&str> = result
        .keywords
        .top_keywords
        .iter()
        .map(|k| k.word.as_str())
        .collect();
    assert_eq!(words, vec!["cats", "walk", "gardens"]);
}

#[test]
fn equal_priorities_keep_rule_order() {
    let content = "word ".repeat(50);
    let result = analyze(&content, "", "");
    let messages: Vec<&str> = result.suggestions.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Missing meta title",
            "Content too short (50 words). Aim for 1000+ words",
            "Missing meta description",
            "Missing H1 heading",
            "Add H2 subheadings for better structure",
            "Sentences are too long. Aim for 15-20 words average",
            "Consider adding images",
            "Add external links to authoritative sources",
        ]
    );
    // 4 errors, 4 warnings
    assert_eq!(result.score, 100 - 4 * 15 - 4 * 8);
    assert_eq!(result.band, Band::Poor);
}

#[test]
fn length_warnings_report_actual_lengths() {
    let content = body_sentences(40);
    let result = analyze(&content, "Too short", "Also short");
    let messages: Vec<&str> = result.suggestions.iter().map(|s| s.message.as_str()).collect();
    assert!(messages.contains(&"Title length (9) should be 30-60 characters"));
    assert!(messages.contains(&"Description length (10) should be 120-160 characters"));
    assert!(messages.contains(&"Consider expanding content (440 words). 1500+ is ideal"));
}

#[test]
fn meta_lengths_count_characters_not_bytes() {
    let result = analyze("Body.", "Café résumé", "");
    assert_eq!(result.meta.title_length, 11);
    assert!(result.meta.has_title);
    assert!(!result.meta.has_description);
}

#[test]
fn structure_counts_headings_and_links() {
    let text = "# Title\n\n## One\n\n### Detail\n\n### More\n\nSee [intro](/intro), \
                [api](docs/api.md) and [rfc](https://example.org/rfc).\n\n\
                ![](pic.png)";
    let s = analyze(text, "", "").structure;
    assert!(s.has_h1);
    assert_eq!(s.h2_count, 1);
    assert_eq!(s.h3_count, 2);
    assert_eq!(s.internal_links, 2);
    assert_eq!(s.external_links, 1);
    assert!(s.has_links);
    assert!(s.has_images);
    assert_eq!(s.paragraph_count, 6);
}

#[test]
fn custom_config_changes_thresholds() {
    let config = ScoringConfig::from_toml_str(
        "short_content_words = 10\ngood_content_words = 20\n[band]\ngood = 50\nfair = 30\n",
    )
    .unwrap();
    let content = format!("# Heading\n\n## Sub\n\n{}", body_sentences(2));
    let result = analyze_with(&config, &content, OPTIMAL_TITLE, OPTIMAL_DESCRIPTION);
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.message == "Content length is good"));
    // images and external links warnings only
    assert_eq!(result.score, 84);
    assert_eq!(result.band, Band::Good);
}

#[test]
fn json_output_uses_camel_case_fields() {
    let result = analyze("# Heading\n\nSome text here.", "Title", "");
    let json = serde_json::to_string_pretty(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed.get("score").is_some());
    assert_eq!(parsed["band"], "poor");
    assert!(parsed["readability"].get("gradeMetric").is_some());
    assert!(parsed["readability"].get("avgSentenceLength").is_some());
    assert_eq!(parsed["readability"]["gradeLabel"], "HighSchool");
    assert!(parsed["keywords"].get("topKeywords").is_some());
    assert!(parsed["meta"].get("titleOptimal").is_some());
    assert_eq!(parsed["structure"]["hasH1"], true);
    assert!(parsed["structure"].get("h2Count").is_some());
    assert_eq!(parsed["suggestions"][0]["type"], "error");
}

#[test]
fn linked_image_counts_as_one_external_link() {
    let result = analyze("# T\n\n[![build](badge.svg)](https://ci.example.com/job)\n", "", "");
    let s = &result.structure;
    assert_eq!(s.external_links, 1);
    assert_eq!(s.internal_links, 0);
    assert!(s.has_images);
    assert!(s.has_links);
    assert!(!result
        .suggestions
        .iter()
        .any(|s| s.message.starts_with("Add external links")));
}

#[test]
fn extreme_penalties_floor_at_zero() {
    let config = ScoringConfig::from_toml_str(
        "error_penalty = 2147483647\nwarning_penalty = 2147483647\n",
    )
    .unwrap();
    let result = analyze_with(&config, "", "", "");
    assert_eq!(result.score, 0);
    assert_eq!(result.band, Band::Poor);
}

#[test]
fn expansion_target_comes_from_config() {
    let config = ScoringConfig::from_toml_str("ideal_content_words = 2000\n").unwrap();
    let result = analyze_with(&config, &body_sentences(40), "", "");
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.message == "Consider expanding content (440 words). 2000+ is ideal"));
}
