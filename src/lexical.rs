use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Primitive counts over one essay. Recomputed on every call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalStats {
    pub word_count: usize,
    /// Floored at 1 so per-sentence averages never divide by zero.
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub unique_word_ratio: f64,
    pub complex_word_ratio: f64,
    pub avg_words_per_sentence: f64,
    pub transition_word_hits: usize,
    pub academic_word_hits: usize,
    pub misspelling_hits: usize,
    pub char_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordCountStatus {
    Insufficient,
    Minimal,
    Good,
    Excellent,
    Outstanding,
    Exceptional,
}

impl WordCountStatus {
    pub fn from_word_count(words: usize) -> Self {
        match words {
            0..=49 => Self::Insufficient,
            50..=149 => Self::Minimal,
            150..=299 => Self::Good,
            300..=499 => Self::Excellent,
            500..=799 => Self::Outstanding,
            _ => Self::Exceptional,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Insufficient => "Keep writing! Minimum 50 words needed",
            Self::Minimal => "Good start! Try to reach 150+ words",
            Self::Good => "Great progress! Aiming for 300+ is ideal",
            Self::Excellent => "Excellent length! Perfect for analysis",
            Self::Outstanding => "Outstanding! Comprehensive coverage",
            Self::Exceptional => "Exceptional! Very thorough analysis",
        }
    }
}

// ---------------------------------------------------------------------------
// Marker vocabularies
// ---------------------------------------------------------------------------

/// Trimmed essays shorter than this are rejected by interactive callers.
/// The analyzer itself accepts anything.
pub const MIN_ESSAY_CHARS: usize = 50;

/// Characters a word must exceed to count as complex.
const COMPLEX_WORD_MIN_CHARS: usize = 6;

pub const TRANSITION_WORDS: [&str; 10] = [
    "however",
    "therefore",
    "furthermore",
    "moreover",
    "consequently",
    "additionally",
    "nevertheless",
    "meanwhile",
    "subsequently",
    "accordingly",
];

pub const ACADEMIC_WORDS: [&str; 10] = [
    "analyze",
    "evaluate",
    "demonstrate",
    "illustrate",
    "examine",
    "investigate",
    "establish",
    "determine",
    "significant",
    "substantial",
];

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r]*\n\s*").unwrap());

static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]").unwrap());

static MISSPELLING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:teh|recieve|occured)\b").unwrap());

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Counts list words appearing anywhere in the lowered text. This is plain
/// substring containment: "reevaluated" counts as a hit for "evaluate".
fn marker_hits(lowered: &str, markers: &[&str]) -> usize {
    markers.iter().filter(|m| lowered.contains(*m)).count()
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn tokenize(text: &str) -> LexicalStats {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();

    let sentence_count = SENTENCE_SPLIT_RE
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);

    let paragraph_count = PARAGRAPH_SPLIT_RE
        .split(text.trim())
        .filter(|p| !p.trim().is_empty())
        .count();

    let unique: HashSet<String> = words
        .iter()
        .map(|w| NON_WORD_RE.replace_all(&w.to_lowercase(), "").into_owned())
        .collect();

    let complex = words
        .iter()
        .filter(|w| w.chars().count() > COMPLEX_WORD_MIN_CHARS)
        .count();

    let lowered = text.to_lowercase();

    LexicalStats {
        word_count,
        sentence_count,
        paragraph_count,
        unique_word_ratio: ratio(unique.len(), word_count),
        complex_word_ratio: ratio(complex, word_count),
        avg_words_per_sentence: word_count as f64 / sentence_count as f64,
        transition_word_hits: marker_hits(&lowered, &TRANSITION_WORDS),
        academic_word_hits: marker_hits(&lowered, &ACADEMIC_WORDS),
        misspelling_hits: MISSPELLING_RE.find_iter(text).count(),
        char_count: text.chars().count(),
    }
}
