use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lexical::LexicalStats;
use crate::round_half_up;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub content: i32,
    pub organization: i32,
    pub language: i32,
    pub mechanics: i32,
}

impl ScoreBreakdown {
    pub fn sum(&self) -> i32 {
        self.content + self.organization + self.language + self.mechanics
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    F,
    D,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "C-")]
    CMinus,
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B-")]
    BMinus,
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A-")]
    AMinus,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    pub fn from_total(total: i32) -> Self {
        let c = &RUBRIC.grade_cutoffs;
        if total >= c[0] {
            Self::APlus
        } else if total >= c[1] {
            Self::A
        } else if total >= c[2] {
            Self::AMinus
        } else if total >= c[3] {
            Self::BPlus
        } else if total >= c[4] {
            Self::B
        } else if total >= c[5] {
            Self::BMinus
        } else if total >= c[6] {
            Self::CPlus
        } else if total >= c[7] {
            Self::C
        } else if total >= c[8] {
            Self::CMinus
        } else if total >= c[9] {
            Self::DPlus
        } else if total >= c[10] {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    NeedsImprovement,
    Average,
    Good,
    Excellent,
}

impl Category {
    pub fn from_total(total: i32) -> Self {
        if total >= RUBRIC.category_excellent_min {
            Self::Excellent
        } else if total >= RUBRIC.category_good_min {
            Self::Good
        } else if total >= RUBRIC.category_average_min {
            Self::Average
        } else {
            Self::NeedsImprovement
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Average => "average",
            Self::NeedsImprovement => "needs-improvement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    pub total: i32,
    pub breakdown: ScoreBreakdown,
    pub grade: Grade,
    pub category: Category,
}

/// Interchangeable scoring heuristics. `Basic` is the offline fallback,
/// `Advanced` the four-dimension rubric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Basic,
    #[default]
    Advanced,
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Rubric {
    content_bands: &'static [(usize, i32)],
    content_floor: i32,
    organization_bands: &'static [(usize, i32)],
    organization_floor: i32,
    language_bands: &'static [(f64, i32)],
    language_floor: i32,
    mechanics_base: i32,
    mechanics_cap: i32,
    sentence_optimal: (f64, f64),
    sentence_acceptable: (f64, f64),
    sentence_bonus: (i32, i32, i32),
    complexity_high: f64,
    complexity_mid: f64,
    complexity_bonus: (i32, i32, i32),
    quality_bonus_ratio: f64,
    quality_bonus: f64,
    noise_amplitude: f64,
    total_min: i32,
    total_max: i32,
    grade_cutoffs: [i32; 11],
    category_excellent_min: i32,
    category_good_min: i32,
    category_average_min: i32,
    basic_sentence_pivot: f64,
    basic_sentence_slope: f64,
    basic_structure_base: f64,
    basic_structure_step: f64,
    basic_grammar_base: f64,
    basic_grammar_step: f64,
    basic_sub_min: f64,
    basic_sub_max: f64,
}

static RUBRIC: Rubric = Rubric {
    content_bands: &[
        (1000, 25),
        (800, 24),
        (600, 22),
        (400, 19),
        (250, 16),
        (150, 12),
    ],
    content_floor: 8,
    organization_bands: &[(6, 25), (5, 23), (4, 21), (3, 18), (2, 14)],
    organization_floor: 9,
    language_bands: &[
        (0.8, 25),
        (0.7, 23),
        (0.6, 21),
        (0.5, 18),
        (0.4, 15),
        (0.3, 12),
    ],
    language_floor: 10,
    mechanics_base: 15,
    mechanics_cap: 25,
    sentence_optimal: (15.0, 25.0),
    sentence_acceptable: (12.0, 30.0),
    sentence_bonus: (5, 3, 1),
    complexity_high: 0.3,
    complexity_mid: 0.2,
    complexity_bonus: (5, 3, 1),
    quality_bonus_ratio: 0.7,
    quality_bonus: 3.0,
    noise_amplitude: 2.0,
    total_min: 50,
    total_max: 100,
    grade_cutoffs: [97, 93, 90, 87, 83, 80, 77, 73, 70, 67, 65],
    category_excellent_min: 95,
    category_good_min: 85,
    category_average_min: 75,
    basic_sentence_pivot: 14.0,
    basic_sentence_slope: 4.0,
    basic_structure_base: 60.0,
    basic_structure_step: 8.0,
    basic_grammar_base: 70.0,
    basic_grammar_step: 5.0,
    basic_sub_min: 40.0,
    basic_sub_max: 100.0,
};

/// Half-width of the uniform perturbation added to advanced totals.
pub fn noise_amplitude() -> f64 {
    RUBRIC.noise_amplitude
}

// ---------------------------------------------------------------------------
// Rubric dimensions
// ---------------------------------------------------------------------------

fn content_score(word_count: usize) -> i32 {
    RUBRIC
        .content_bands
        .iter()
        .find(|(min, _)| word_count >= *min)
        .map_or(RUBRIC.content_floor, |(_, s)| *s)
}

fn organization_score(paragraph_count: usize) -> i32 {
    RUBRIC
        .organization_bands
        .iter()
        .find(|(min, _)| paragraph_count >= *min)
        .map_or(RUBRIC.organization_floor, |(_, s)| *s)
}

fn language_score(unique_word_ratio: f64) -> i32 {
    RUBRIC
        .language_bands
        .iter()
        .find(|(above, _)| unique_word_ratio > *above)
        .map_or(RUBRIC.language_floor, |(_, s)| *s)
}

fn mechanics_score(stats: &LexicalStats) -> i32 {
    let avg = stats.avg_words_per_sentence;
    let (opt_lo, opt_hi) = RUBRIC.sentence_optimal;
    let (ok_lo, ok_hi) = RUBRIC.sentence_acceptable;
    let (s_best, s_ok, s_else) = RUBRIC.sentence_bonus;
    let sentence = if (opt_lo..=opt_hi).contains(&avg) {
        s_best
    } else if (ok_lo..=ok_hi).contains(&avg) {
        s_ok
    } else {
        s_else
    };

    let (c_high, c_mid, c_else) = RUBRIC.complexity_bonus;
    let complexity = if stats.complex_word_ratio > RUBRIC.complexity_high {
        c_high
    } else if stats.complex_word_ratio > RUBRIC.complexity_mid {
        c_mid
    } else {
        c_else
    };

    (RUBRIC.mechanics_base + sentence + complexity).min(RUBRIC.mechanics_cap)
}

/// The deterministic part of an advanced total: dimension sum plus the
/// vocabulary bonus, before noise and clamping.
pub fn rubric_baseline(stats: &LexicalStats) -> f64 {
    rubric_breakdown(stats).sum() as f64 + quality_bonus(stats)
}

fn rubric_breakdown(stats: &LexicalStats) -> ScoreBreakdown {
    ScoreBreakdown {
        content: content_score(stats.word_count),
        organization: organization_score(stats.paragraph_count),
        language: language_score(stats.unique_word_ratio),
        mechanics: mechanics_score(stats),
    }
}

fn quality_bonus(stats: &LexicalStats) -> f64 {
    if stats.unique_word_ratio > RUBRIC.quality_bonus_ratio {
        RUBRIC.quality_bonus
    } else {
        0.0
    }
}

fn clamp_total(raw: f64) -> i32 {
    (round_half_up(raw) as i32).clamp(RUBRIC.total_min, RUBRIC.total_max)
}

fn grade_result(total: i32, breakdown: ScoreBreakdown) -> GradeResult {
    GradeResult {
        total,
        breakdown,
        grade: Grade::from_total(total),
        category: Category::from_total(total),
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn score_advanced<R: Rng + ?Sized>(stats: &LexicalStats, rng: &mut R) -> GradeResult {
    let breakdown = rubric_breakdown(stats);
    let amp = RUBRIC.noise_amplitude;
    let noise: f64 = rng.gen_range(-amp..=amp);
    let baseline = breakdown.sum() as f64 + quality_bonus(stats);
    let total = clamp_total(baseline + noise);
    debug!(
        rubric_sum = breakdown.sum(),
        baseline,
        noise,
        total,
        "scored essay with advanced rubric"
    );
    grade_result(total, breakdown)
}

fn score_basic(stats: &LexicalStats) -> GradeResult {
    let bound = |v: f64| v.clamp(RUBRIC.basic_sub_min, RUBRIC.basic_sub_max);
    let clarity = bound(
        100.0
            - (stats.avg_words_per_sentence - RUBRIC.basic_sentence_pivot)
                * RUBRIC.basic_sentence_slope,
    );
    let structure = bound(
        RUBRIC.basic_structure_base + stats.paragraph_count as f64 * RUBRIC.basic_structure_step,
    );
    let grammar = bound(
        RUBRIC.basic_grammar_base - stats.misspelling_hits as f64 * RUBRIC.basic_grammar_step,
    );
    let overall = round_half_up((clarity + structure + grammar) / 3.0);

    let quarter = |v: f64| round_half_up(v / 4.0) as i32;
    let breakdown = ScoreBreakdown {
        content: quarter(overall),
        organization: quarter(structure),
        language: quarter(clarity),
        mechanics: quarter(grammar),
    };
    let total = clamp_total(overall);
    debug!(clarity, structure, grammar, total, "scored essay with basic heuristic");
    grade_result(total, breakdown)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scores with the advanced rubric, drawing noise from the thread RNG.
pub fn score(stats: &LexicalStats) -> GradeResult {
    score_with(stats, Strategy::Advanced, &mut rand::thread_rng())
}

pub fn score_with<R: Rng + ?Sized>(
    stats: &LexicalStats,
    strategy: Strategy,
    rng: &mut R,
) -> GradeResult {
    match strategy {
        Strategy::Advanced => score_advanced(stats, rng),
        Strategy::Basic => score_basic(stats),
    }
}
