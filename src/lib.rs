use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod integrations;
pub mod store;

pub use config::ScoringConfig;
pub use error::{Error, Result};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub score: i32,
    pub band: Band,
    pub readability: Readability,
    pub keywords: Keywords,
    pub meta: Meta,
    pub structure: Structure,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Readability {
    pub score: i32,
    /// Flesch-Kincaid grade level, one decimal.
    pub grade_metric: f64,
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub grade_label: GradeLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keywords {
    pub density: BTreeMap<String, f64>,
    pub top_keywords: Vec<KeywordCount>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub title_length: usize,
    pub description_length: usize,
    pub has_title: bool,
    pub has_description: bool,
    pub title_optimal: bool,
    pub description_optimal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub has_h1: bool,
    pub h2_count: usize,
    pub h3_count: usize,
    pub paragraph_count: usize,
    pub has_images: bool,
    pub has_links: bool,
    pub internal_links: usize,
    pub external_links: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub message: String,
    pub priority: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Error,
    Warning,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeLabel {
    Easy,
    MiddleSchool,
    HighSchool,
    College,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Good,
    Fair,
    Poor,
}

impl fmt::Display for GradeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GradeLabel::Easy => "Easy",
            GradeLabel::MiddleSchool => "Middle School",
            GradeLabel::HighSchool => "High School",
            GradeLabel::College => "College",
        })
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SuggestionKind::Error => "error",
            SuggestionKind::Warning => "warning",
            SuggestionKind::Success => "success",
        })
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Band::Good => "good",
            Band::Fair => "fair",
            Band::Poor => "poor",
        })
    }
}

impl Suggestion {
    fn error(priority: u8, message: impl Into<String>) -> Self {
        Self {
            kind: SuggestionKind::Error,
            message: message.into(),
            priority,
        }
    }

    fn warning(priority: u8, message: impl Into<String>) -> Self {
        Self {
            kind: SuggestionKind::Warning,
            message: message.into(),
            priority,
        }
    }

    fn success(priority: u8, message: impl Into<String>) -> Self {
        Self {
            kind: SuggestionKind::Success,
            message: message.into(),
            priority,
        }
    }
}

// ---------------------------------------------------------------------------
// Readability constants
// ---------------------------------------------------------------------------

// Flesch-Kincaid grade level. Fixed for compatibility with published scores.
const FK_SENTENCE_WEIGHT: f64 = 0.39;
const FK_SYLLABLE_WEIGHT: f64 = 11.8;
const FK_OFFSET: f64 = 15.59;

const SCORE_MIN: i32 = 0;
const SCORE_MAX: i32 = 100;

static DEFAULT_CONFIG: Lazy<ScoringConfig> = Lazy::new(ScoringConfig::default);

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").unwrap());

static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^# ").unwrap());

static H2_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## ").unwrap());

static H3_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^### ").unwrap());

static IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]\n]*\]\([^)\n]*\)").unwrap());

// Applied after image embeds are stripped, so a linked image counts once,
// by its outer target.
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]\n]*\]\(([^)\n]*)\)").unwrap());

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round half toward positive infinity, so -2.5 becomes -2 and 2.5 becomes 3.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn round_tenths(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

fn tokenize_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn count_sentences(text: &str) -> usize {
    SENTENCE_SPLIT_RE
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count()
}

fn count_paragraphs(text: &str) -> usize {
    PARAGRAPH_SPLIT_RE
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .count()
}

fn count_syllables(word: &str) -> usize {
    word.chars()
        .filter(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
        .count()
}

// ---------------------------------------------------------------------------
// Analysis passes
// ---------------------------------------------------------------------------

fn grade_label(metric: f64, config: &ScoringConfig) -> GradeLabel {
    if metric > config.grade.college {
        GradeLabel::College
    } else if metric > config.grade.high_school {
        GradeLabel::HighSchool
    } else if metric > config.grade.middle_school {
        GradeLabel::MiddleSchool
    } else {
        GradeLabel::Easy
    }
}

struct ReadabilityPass {
    record: Readability,
    // Unrounded, used for the sentence-length rule.
    avg_sentence_length: f64,
}

fn measure_readability(text: &str, words: &[String], config: &ScoringConfig) -> ReadabilityPass {
    let word_count = words.len();
    let sentence_count = count_sentences(text);
    let words_denominator = word_count.max(1) as f64;
    let sentences_denominator = sentence_count.max(1) as f64;

    let avg_sentence_length = word_count as f64 / sentences_denominator;
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
    let metric = FK_SENTENCE_WEIGHT * avg_sentence_length
        + FK_SYLLABLE_WEIGHT * (syllables as f64 / words_denominator)
        - FK_OFFSET;

    let score = round_half_up(100.0 - metric * config.readability_grade_weight)
        .clamp(SCORE_MIN as f64, SCORE_MAX as f64) as i32;

    ReadabilityPass {
        record: Readability {
            score,
            grade_metric: round_tenths(metric),
            word_count,
            sentence_count,
            avg_sentence_length: round_tenths(avg_sentence_length),
            grade_label: grade_label(metric, config),
        },
        avg_sentence_length,
    }
}

fn extract_keywords(words: &[String], config: &ScoringConfig) -> Keywords {
    let stop_words: HashSet<String> = config
        .stop_words
        .iter()
        .map(|w| w.to_lowercase())
        .collect();

    // First-occurrence order breaks ties between equal counts.
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in words {
        if word.chars().count() <= config.min_keyword_length || stop_words.contains(word) {
            continue;
        }
        let count = counts.entry(word.as_str()).or_insert(0);
        if *count == 0 {
            order.push(word.as_str());
        }
        *count += 1;
    }

    let mut ranked: Vec<(&str, usize)> = order.into_iter().map(|w| (w, counts[w])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(config.top_keyword_limit);

    let total = words.len().max(1) as f64;
    let top_keywords: Vec<KeywordCount> = ranked
        .into_iter()
        .map(|(word, count)| KeywordCount {
            word: word.to_string(),
            count,
            density: count as f64 / total * 100.0,
        })
        .collect();

    Keywords {
        density: top_keywords
            .iter()
            .map(|k| (k.word.clone(), k.density))
            .collect(),
        suggestions: top_keywords
            .iter()
            .take(config.keyword_suggestion_limit)
            .map(|k| k.word.clone())
            .collect(),
        top_keywords,
    }
}

fn analyze_structure(text: &str) -> Structure {
    let mut internal_links = 0;
    let mut external_links = 0;
    let without_images = IMAGE_RE.replace_all(text, "");
    for caps in LINK_RE.captures_iter(&without_images) {
        if caps[1].trim_start().starts_with("http") {
            external_links += 1;
        } else {
            internal_links += 1;
        }
    }

    Structure {
        has_h1: H1_RE.is_match(text),
        h2_count: H2_RE.find_iter(text).count(),
        h3_count: H3_RE.find_iter(text).count(),
        paragraph_count: count_paragraphs(text),
        has_images: IMAGE_RE.is_match(text),
        has_links: internal_links + external_links > 0,
        internal_links,
        external_links,
    }
}

fn analyze_meta(title: &str, description: &str, config: &ScoringConfig) -> Meta {
    let title_length = title.chars().count();
    let description_length = description.chars().count();
    Meta {
        title_length,
        description_length,
        has_title: title_length > 0,
        has_description: description_length > 0,
        title_optimal: config.title_length.contains(title_length),
        description_optimal: config.description_length.contains(description_length),
    }
}

// ---------------------------------------------------------------------------
// Suggestion rules
// ---------------------------------------------------------------------------

fn rule_title(meta: &Meta, config: &ScoringConfig) -> Suggestion {
    let range = config.title_length;
    if !meta.has_title {
        Suggestion::error(10, "Missing meta title")
    } else if !meta.title_optimal {
        Suggestion::warning(
            8,
            format!(
                "Title length ({}) should be {}-{} characters",
                meta.title_length, range.min, range.max
            ),
        )
    } else {
        Suggestion::success(1, "Title length is optimal")
    }
}

fn rule_description(meta: &Meta, config: &ScoringConfig) -> Suggestion {
    let range = config.description_length;
    if !meta.has_description {
        Suggestion::error(9, "Missing meta description")
    } else if !meta.description_optimal {
        Suggestion::warning(
            7,
            format!(
                "Description length ({}) should be {}-{} characters",
                meta.description_length, range.min, range.max
            ),
        )
    } else {
        Suggestion::success(1, "Description length is optimal")
    }
}

fn rule_content_length(word_count: usize, config: &ScoringConfig) -> Suggestion {
    if word_count < config.short_content_words {
        Suggestion::error(
            10,
            format!(
                "Content too short ({word_count} words). Aim for {}+ words",
                config.good_content_words
            ),
        )
    } else if word_count < config.good_content_words {
        Suggestion::warning(
            6,
            format!(
                "Consider expanding content ({word_count} words). {}+ is ideal",
                config.ideal_content_words
            ),
        )
    } else {
        Suggestion::success(1, "Content length is good")
    }
}

fn rule_h1(structure: &Structure) -> Option<Suggestion> {
    (!structure.has_h1).then(|| Suggestion::error(9, "Missing H1 heading"))
}

fn rule_h2(structure: &Structure) -> Option<Suggestion> {
    (structure.h2_count == 0)
        .then(|| Suggestion::warning(5, "Add H2 subheadings for better structure"))
}

fn rule_images(structure: &Structure) -> Option<Suggestion> {
    (!structure.has_images).then(|| Suggestion::warning(4, "Consider adding images"))
}

fn rule_external_links(structure: &Structure) -> Option<Suggestion> {
    (structure.external_links == 0)
        .then(|| Suggestion::warning(3, "Add external links to authoritative sources"))
}

fn rule_sentence_length(avg_sentence_length: f64, config: &ScoringConfig) -> Option<Suggestion> {
    (avg_sentence_length > config.long_sentence_words).then(|| {
        Suggestion::warning(5, "Sentences are too long. Aim for 15-20 words average")
    })
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn overall_score(suggestions: &[Suggestion], config: &ScoringConfig) -> i32 {
    let penalty = suggestions
        .iter()
        .map(|s| match s.kind {
            SuggestionKind::Error => config.error_penalty,
            SuggestionKind::Warning => config.warning_penalty,
            SuggestionKind::Success => 0,
        })
        .fold(0i32, i32::saturating_add);
    SCORE_MAX.saturating_sub(penalty).clamp(SCORE_MIN, SCORE_MAX)
}

fn band_for_score(score: i32, config: &ScoringConfig) -> Band {
    if score >= config.band.good {
        Band::Good
    } else if score >= config.band.fair {
        Band::Fair
    } else {
        Band::Poor
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score `content` with the default configuration.
///
/// Callers should not pass empty content; it still yields a well-formed,
/// low-scoring record rather than an error.
pub fn analyze(content: &str, title: &str, description: &str) -> Analysis {
    analyze_with(&DEFAULT_CONFIG, content, title, description)
}

pub fn analyze_with(
    config: &ScoringConfig,
    content: &str,
    title: &str,
    description: &str,
) -> Analysis {
    let words = tokenize_words(content);
    let readability = measure_readability(content, &words, config);
    let keywords = extract_keywords(&words, config);
    let structure = analyze_structure(content);
    let meta = analyze_meta(title, description, config);

    // Rule order is the tie-break for equal priorities.
    let mut suggestions: Vec<Suggestion> = [
        Some(rule_title(&meta, config)),
        Some(rule_description(&meta, config)),
        Some(rule_content_length(readability.record.word_count, config)),
        rule_h1(&structure),
        rule_h2(&structure),
        rule_images(&structure),
        rule_external_links(&structure),
        rule_sentence_length(readability.avg_sentence_length, config),
    ]
    .into_iter()
    .flatten()
    .collect();

    let score = overall_score(&suggestions, config);
    suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));

    tracing::debug!(
        words = readability.record.word_count,
        sentences = readability.record.sentence_count,
        suggestions = suggestions.len(),
        score,
        "content analyzed"
    );

    Analysis {
        score,
        band: band_for_score(score, config),
        readability: readability.record,
        keywords,
        meta,
        structure,
        suggestions,
    }
}
