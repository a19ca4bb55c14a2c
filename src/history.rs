use chrono::{DateTime, Local, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feedback::FeedbackResult;
use crate::round_half_up;
use crate::scoring::{Category, Grade, GradeResult, ScoreBreakdown};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// One graded submission. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayRecord {
    /// Creation instant in epoch milliseconds; also the sort and date key.
    pub id: i64,
    pub title: String,
    pub score: i32,
    pub breakdown: ScoreBreakdown,
    pub feedback: FeedbackResult,
    pub graded_at: String,
    pub word_count: usize,
    /// Minutes, at `WORDS_PER_MINUTE`.
    pub reading_time: usize,
    pub essay_preview: String,
    pub category: Category,
    pub grade: Grade,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_essays: usize,
    pub average_score: i32,
    pub total_words: usize,
    pub total_reading_time: usize,
    pub improvement_rate: i32,
    pub streak: u32,
    pub last_submission_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    /// Recent-window mean minus prior-window mean, one decimal place.
    pub trend: f64,
    pub best_score: i32,
    pub worst_score: i32,
    pub consistency: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub user_stats: UserStats,
    pub essays: Vec<EssayRecord>,
    pub export_date: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Score,
    Title,
    Words,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub sort: SortKey,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MAX_HISTORY: usize = 20;
pub const PREVIEW_CHARS: usize = 300;
pub const WORDS_PER_MINUTE: usize = 200;
pub const DEFAULT_TITLE: &str = "Untitled Essay";

const WINDOW: usize = 5;
const IMPROVEMENT_MIN_RECORDS: usize = 2 * WINDOW;
const GRADED_AT_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const CONSISTENCY_EXCELLENT: i32 = 80;
const CONSISTENCY_GOOD: i32 = 60;
const STREAK_WEEK: u32 = 7;
const ESSAY_MILESTONE: usize = 10;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

impl EssayRecord {
    pub fn new(
        title: &str,
        text: &str,
        result: &GradeResult,
        feedback: FeedbackResult,
        now: DateTime<Local>,
    ) -> Self {
        let title = title.trim();
        let word_count = text.split_whitespace().count();
        Self {
            id: now.timestamp_millis(),
            title: if title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                title.to_string()
            },
            score: result.total,
            breakdown: result.breakdown,
            feedback,
            graded_at: now.format(GRADED_AT_FORMAT).to_string(),
            word_count,
            reading_time: word_count.div_ceil(WORDS_PER_MINUTE),
            essay_preview: preview(text),
            category: result.category,
            grade: result.grade,
        }
    }

    /// Local calendar day the record was created on.
    pub fn day(&self) -> Option<NaiveDate> {
        Local
            .timestamp_millis_opt(self.id)
            .single()
            .map(|dt| dt.date_naive())
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mean_score(records: &[EssayRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.score as f64).sum::<f64>() / records.len() as f64
}

fn improvement_rate(records: &[EssayRecord]) -> i32 {
    if records.len() < IMPROVEMENT_MIN_RECORDS {
        return 0;
    }
    let recent = mean_score(&records[..WINDOW]);
    let older = mean_score(&records[WINDOW..IMPROVEMENT_MIN_RECORDS]);
    if older == 0.0 {
        return 0;
    }
    round_half_up((recent - older) / older * 100.0) as i32
}

/// Consecutive daily submissions ending today. A same-day pair or a gap of
/// more than one day ends the run.
fn streak(records: &[EssayRecord], today: NaiveDate) -> u32 {
    let Some(newest) = records.first() else {
        return 0;
    };
    if newest.day() != Some(today) {
        return 0;
    }

    let mut run = 1;
    for pair in records.windows(2) {
        match (pair[0].day(), pair[1].day()) {
            (Some(newer), Some(older)) if (newer - older).num_days() == 1 => run += 1,
            _ => break,
        }
    }
    run
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

pub fn aggregate_history(records: &[EssayRecord]) -> UserStats {
    aggregate_history_on(records, Local::now().date_naive())
}

/// Like `aggregate_history`, with an explicit "today" for the streak.
pub fn aggregate_history_on(records: &[EssayRecord], today: NaiveDate) -> UserStats {
    if records.is_empty() {
        return UserStats::default();
    }

    UserStats {
        total_essays: records.len(),
        average_score: round_half_up(mean_score(records)) as i32,
        total_words: records.iter().map(|r| r.word_count).sum(),
        total_reading_time: records.iter().map(|r| r.reading_time).sum(),
        improvement_rate: improvement_rate(records),
        streak: streak(records, today),
        last_submission_date: records.first().map(|r| r.graded_at.clone()),
    }
}

pub fn analytics(records: &[EssayRecord], average_score: i32) -> Analytics {
    if records.is_empty() {
        return Analytics::default();
    }

    let recent = &records[..records.len().min(WINDOW)];
    let prior = &records[records.len().min(WINDOW)..records.len().min(2 * WINDOW)];
    let trend = if !recent.is_empty() && !prior.is_empty() {
        mean_score(recent) - mean_score(prior)
    } else {
        0.0
    };

    let best_score = records.iter().map(|r| r.score).max().unwrap_or(0);
    let worst_score = records.iter().map(|r| r.score).min().unwrap_or(0);

    let consistency = if average_score == 0 {
        0
    } else {
        let avg = average_score as f64;
        let variance = records
            .iter()
            .map(|r| (r.score as f64 - avg).powi(2))
            .sum::<f64>()
            / records.len() as f64;
        let raw = 100.0 - variance.sqrt() / avg * 100.0;
        (round_half_up(raw) as i32).max(0)
    };

    Analytics {
        trend: round_half_up(trend * 10.0) / 10.0,
        best_score,
        worst_score,
        consistency,
    }
}

/// Three dashboard messages: trend, consistency, achievement.
pub fn insights(stats: &UserStats, analytics: &Analytics) -> Vec<String> {
    let trend = if analytics.trend > 0.0 {
        format!(
            "You've improved by {:.1} points recently!",
            analytics.trend
        )
    } else if analytics.trend < 0.0 {
        format!(
            "Focus area: recent dip of {:.1} points.",
            analytics.trend.abs()
        )
    } else {
        "Maintaining consistent performance.".to_string()
    };

    let consistency = if analytics.consistency > CONSISTENCY_EXCELLENT {
        "Excellent consistency in your writing quality!"
    } else if analytics.consistency > CONSISTENCY_GOOD {
        "Good stability with room for more consistency."
    } else {
        "Work on maintaining consistent quality across essays."
    };

    let achievement = if stats.streak >= STREAK_WEEK {
        "Amazing! Week-long writing streak!".to_string()
    } else if stats.total_essays >= ESSAY_MILESTONE {
        format!(
            "Great milestone: {} essays completed!",
            stats.total_essays
        )
    } else {
        "Keep writing to unlock achievements!".to_string()
    };

    vec![trend, consistency.to_string(), achievement]
}

// ---------------------------------------------------------------------------
// Session context
// ---------------------------------------------------------------------------

/// Newest-first submission history capped at `MAX_HISTORY` entries. The
/// caller owns it and decides how it is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EssayHistory {
    records: Vec<EssayRecord>,
}

impl EssayHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores ordering and the cap on records loaded from elsewhere.
    pub fn from_records(mut records: Vec<EssayRecord>) -> Self {
        records.sort_by(|a, b| b.id.cmp(&a.id));
        records.truncate(MAX_HISTORY);
        Self { records }
    }

    /// Records are keyed by id, so an id that does not exceed the newest one
    /// (same millisecond, clock skew) is bumped past it.
    pub fn push(&mut self, mut record: EssayRecord) {
        if let Some(newest) = self.records.first() {
            record.id = record.id.max(newest.id + 1);
        }
        debug!(id = record.id, score = record.score, "recording essay");
        self.records.insert(0, record);
        if self.records.len() > MAX_HISTORY {
            let evicted = self.records.len() - MAX_HISTORY;
            self.records.truncate(MAX_HISTORY);
            debug!(evicted, "history over capacity, dropped oldest");
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EssayRecord] {
        &self.records
    }

    pub fn stats(&self) -> UserStats {
        aggregate_history(&self.records)
    }

    pub fn analytics(&self) -> Analytics {
        let stats = self.stats();
        analytics(&self.records, stats.average_score)
    }

    pub fn insights(&self) -> Vec<String> {
        let stats = self.stats();
        let summary = analytics(&self.records, stats.average_score);
        insights(&stats, &summary)
    }

    pub fn query(&self, query: &HistoryQuery) -> Vec<&EssayRecord> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut hits: Vec<&EssayRecord> = self
            .records
            .iter()
            .filter(|r| {
                needle
                    .as_deref()
                    .map_or(true, |n| r.title.to_lowercase().contains(n))
            })
            .filter(|r| query.category.map_or(true, |c| r.category == c))
            .collect();

        match query.sort {
            SortKey::Date => hits.sort_by(|a, b| b.id.cmp(&a.id)),
            SortKey::Score => hits.sort_by(|a, b| b.score.cmp(&a.score)),
            SortKey::Title => hits.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.title.cmp(&b.title))
            }),
            SortKey::Words => hits.sort_by(|a, b| b.word_count.cmp(&a.word_count)),
        }
        hits
    }

    pub fn export(&self, now: DateTime<Utc>) -> ExportDocument {
        ExportDocument {
            user_stats: self.stats(),
            essays: self.records.clone(),
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
