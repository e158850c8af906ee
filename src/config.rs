//! Tunable scoring parameters.
//!
//! Every heuristic threshold the scorer uses lives here so it can be
//! overridden from a TOML file. The defaults reproduce the dashboard's
//! scoring exactly; the Flesch-Kincaid constants are not tunable.
//!
//! ```toml
//! min_keyword_length = 4
//! stop_words = ["the", "and", "content"]
//!
//! [title_length]
//! min = 40
//! max = 70
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive character-length window for a metadata string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

impl LengthRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }
}

/// Lower bounds (exclusive) of the grade-metric bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    pub college: f64,
    pub high_school: f64,
    pub middle_school: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            college: 12.0,
            high_school: 8.0,
            middle_school: 5.0,
        }
    }
}

/// Minimum overall score (inclusive) for each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    pub good: i32,
    pub fair: i32,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self { good: 80, fair: 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub title_length: LengthRange,
    pub description_length: LengthRange,
    /// Below this word count the content is flagged as an error.
    pub short_content_words: usize,
    /// At or above this word count the content length counts as good.
    pub good_content_words: usize,
    /// Target length quoted when suggesting the content be expanded.
    pub ideal_content_words: usize,
    /// Average words per sentence above which sentences are "too long".
    pub long_sentence_words: f64,
    /// Words of this many characters or fewer are never keywords.
    pub min_keyword_length: usize,
    pub top_keyword_limit: usize,
    pub keyword_suggestion_limit: usize,
    pub error_penalty: i32,
    pub warning_penalty: i32,
    /// Readability score lost per grade level.
    pub readability_grade_weight: f64,
    pub grade: GradeThresholds,
    pub band: BandThresholds,
    pub stop_words: Vec<String>,
}

const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with", "at", "by",
    "from", "as", "into", "through", "during", "before", "after", "above", "below", "between",
    "under", "and", "but", "or", "yet", "so", "if", "because", "although", "though", "while",
    "where", "when", "that", "which", "who", "whom", "whose", "what", "this", "these", "those",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            title_length: LengthRange::new(30, 60),
            description_length: LengthRange::new(120, 160),
            short_content_words: 300,
            good_content_words: 1000,
            ideal_content_words: 1500,
            long_sentence_words: 25.0,
            min_keyword_length: 3,
            top_keyword_limit: 10,
            keyword_suggestion_limit: 3,
            error_penalty: 15,
            warning_penalty: 8,
            readability_grade_weight: 5.0,
            grade: GradeThresholds::default(),
            band: BandThresholds::default(),
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl ScoringConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ScoringConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded scoring config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, range) in [
            ("title_length", self.title_length),
            ("description_length", self.description_length),
        ] {
            if range.min > range.max {
                return Err(Error::Config(format!(
                    "{name}: min ({}) exceeds max ({})",
                    range.min, range.max
                )));
            }
        }
        if self.short_content_words > self.good_content_words {
            return Err(Error::Config(format!(
                "short_content_words ({}) exceeds good_content_words ({})",
                self.short_content_words, self.good_content_words
            )));
        }
        if self.good_content_words > self.ideal_content_words {
            return Err(Error::Config(format!(
                "good_content_words ({}) exceeds ideal_content_words ({})",
                self.good_content_words, self.ideal_content_words
            )));
        }
        let g = &self.grade;
        if !(g.college >= g.high_school && g.high_school >= g.middle_school) {
            return Err(Error::Config(
                "grade thresholds must satisfy college >= high_school >= middle_school".into(),
            ));
        }
        if self.band.good < self.band.fair {
            return Err(Error::Config(format!(
                "band.good ({}) is below band.fair ({})",
                self.band.good, self.band.fair
            )));
        }
        if self.error_penalty < 0 || self.warning_penalty < 0 {
            return Err(Error::Config("penalties must be non-negative".into()));
        }
        if self.keyword_suggestion_limit > self.top_keyword_limit {
            return Err(Error::Config(format!(
                "keyword_suggestion_limit ({}) exceeds top_keyword_limit ({})",
                self.keyword_suggestion_limit, self.top_keyword_limit
            )));
        }
        Ok(())
    }
}
