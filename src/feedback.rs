use serde::{Deserialize, Serialize};

use crate::lexical::LexicalStats;
use crate::scoring::Strategy;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Lists are in evaluation order, not ranked by impact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

struct Thresholds {
    length_thorough: usize,
    length_solid: usize,
    length_developing: usize,
    paragraphs_strong: usize,
    paragraphs_clear: usize,
    paragraphs_some: usize,
    vocabulary_rich: f64,
    vocabulary_varied: f64,
    complexity_high: f64,
    complexity_mid: f64,
    transitions_strong: usize,
    academic_strong: usize,
    academic_some: usize,
    sentence_optimal: (f64, f64),
    sentence_short: f64,
    sentence_long: f64,
    summary_vocabulary: f64,
    summary_transitions: usize,
}

static TH: Thresholds = Thresholds {
    length_thorough: 600,
    length_solid: 400,
    length_developing: 250,
    paragraphs_strong: 5,
    paragraphs_clear: 3,
    paragraphs_some: 2,
    vocabulary_rich: 0.7,
    vocabulary_varied: 0.5,
    complexity_high: 0.3,
    complexity_mid: 0.2,
    transitions_strong: 3,
    academic_strong: 3,
    academic_some: 1,
    sentence_optimal: (15.0, 25.0),
    sentence_short: 12.0,
    sentence_long: 30.0,
    summary_vocabulary: 0.7,
    summary_transitions: 3,
};

const BASIC_TIPS: [&str; 3] = [
    "Open with a concise thesis and ensure each paragraph supports it.",
    "Vary sentence lengths to improve readability and flow.",
    "Proofread for minor grammatical slips and subject\u{2013}verb agreement.",
];

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

enum Note {
    Strength(String),
    Improvement(String),
}

fn criterion_length(wc: usize) -> Note {
    if wc >= TH.length_thorough {
        Note::Strength(format!(
            "Thorough development: {wc} words give your argument room to breathe."
        ))
    } else if wc >= TH.length_solid {
        Note::Strength(format!("Solid length at {wc} words covers the topic well."))
    } else if wc >= TH.length_developing {
        Note::Improvement(format!(
            "At {wc} words the essay feels brief. Develop your key points further."
        ))
    } else {
        Note::Improvement(format!(
            "Only {wc} words. Expand with supporting evidence and examples."
        ))
    }
}

fn criterion_paragraphs(pc: usize) -> Note {
    if pc >= TH.paragraphs_strong {
        Note::Strength(format!("Well organized into {pc} paragraphs with a clear progression."))
    } else if pc >= TH.paragraphs_clear {
        Note::Strength(format!("Clear structure across {pc} paragraphs."))
    } else if pc >= TH.paragraphs_some {
        Note::Improvement(
            "Add body paragraphs so each main idea gets its own space.".to_string(),
        )
    } else {
        Note::Improvement(
            "Break the text into paragraphs: introduction, body, and conclusion.".to_string(),
        )
    }
}

fn criterion_vocabulary(ratio: f64) -> Note {
    let pct = ratio * 100.0;
    if ratio > TH.vocabulary_rich {
        Note::Strength(format!(
            "Rich vocabulary: {pct:.0}% of your words are distinct."
        ))
    } else if ratio > TH.vocabulary_varied {
        Note::Strength(format!("Good word variety ({pct:.0}% distinct words)."))
    } else {
        Note::Improvement(format!(
            "Only {pct:.0}% of words are distinct. Vary your word choice to avoid repetition."
        ))
    }
}

fn criterion_complexity(ratio: f64) -> Note {
    if ratio > TH.complexity_high {
        Note::Strength("Sophisticated word choice with plenty of precise, longer terms.".to_string())
    } else if ratio > TH.complexity_mid {
        Note::Strength("Balanced mix of simple and complex vocabulary.".to_string())
    } else {
        Note::Improvement(
            "Introduce more precise, discipline-specific vocabulary.".to_string(),
        )
    }
}

fn criterion_transitions(hits: usize) -> Note {
    if hits >= TH.transitions_strong {
        Note::Strength(format!(
            "Effective transitions ({hits} distinct markers) connect your ideas."
        ))
    } else if hits > 0 {
        Note::Improvement(format!(
            "Only {hits} transition word(s). Use words like 'however' or 'therefore' to link ideas."
        ))
    } else {
        Note::Improvement(
            "No transition words found. Connect paragraphs with 'furthermore', 'consequently', and similar markers.".to_string(),
        )
    }
}

fn criterion_academic(hits: usize) -> Note {
    if hits >= TH.academic_strong {
        Note::Strength("Strong academic register throughout.".to_string())
    } else if hits >= TH.academic_some {
        Note::Strength("Some academic language supports a formal tone.".to_string())
    } else {
        Note::Improvement(
            "Adopt a more academic register: analyze, evaluate, demonstrate.".to_string(),
        )
    }
}

/// The only criterion that can stay silent: lengths just outside the optimal
/// band but still acceptable produce no note.
fn criterion_sentence_length(avg: f64) -> Option<Note> {
    let (lo, hi) = TH.sentence_optimal;
    if (lo..=hi).contains(&avg) {
        Some(Note::Strength(format!(
            "Well-paced sentences averaging {avg:.1} words."
        )))
    } else if avg < TH.sentence_short {
        Some(Note::Improvement(format!(
            "Sentences average {avg:.1} words. Combine short ones to improve flow."
        )))
    } else if avg > TH.sentence_long {
        Some(Note::Improvement(format!(
            "Sentences average {avg:.1} words. Split long ones for clarity."
        )))
    } else {
        None
    }
}

fn summarize(stats: &LexicalStats, strengths: usize, improvements: usize) -> String {
    let mut summary = format!(
        "Your essay shows {strengths} strength(s) and {improvements} area(s) for improvement."
    );
    if stats.unique_word_ratio > TH.summary_vocabulary {
        summary.push_str(" Your vocabulary range is particularly impressive.");
    } else if stats.transition_word_hits >= TH.summary_transitions {
        summary.push_str(" Your use of transitions creates good flow between ideas.");
    }
    summary
}

fn feedback_advanced(stats: &LexicalStats) -> FeedbackResult {
    let notes = [
        Some(criterion_length(stats.word_count)),
        Some(criterion_paragraphs(stats.paragraph_count)),
        Some(criterion_vocabulary(stats.unique_word_ratio)),
        Some(criterion_complexity(stats.complex_word_ratio)),
        Some(criterion_transitions(stats.transition_word_hits)),
        Some(criterion_academic(stats.academic_word_hits)),
        criterion_sentence_length(stats.avg_words_per_sentence),
    ];

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    for note in notes.into_iter().flatten() {
        match note {
            Note::Strength(s) => strengths.push(s),
            Note::Improvement(s) => improvements.push(s),
        }
    }

    let summary = summarize(stats, strengths.len(), improvements.len());
    FeedbackResult {
        strengths,
        improvements,
        summary,
    }
}

fn feedback_basic(stats: &LexicalStats) -> FeedbackResult {
    let improvements: Vec<String> = BASIC_TIPS.iter().map(|t| t.to_string()).collect();
    let summary = summarize(stats, 0, improvements.len());
    FeedbackResult {
        strengths: vec![],
        improvements,
        summary,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn feedback(stats: &LexicalStats) -> FeedbackResult {
    feedback_with(stats, Strategy::Advanced)
}

pub fn feedback_with(stats: &LexicalStats, strategy: Strategy) -> FeedbackResult {
    match strategy {
        Strategy::Advanced => feedback_advanced(stats),
        Strategy::Basic => feedback_basic(stats),
    }
}
