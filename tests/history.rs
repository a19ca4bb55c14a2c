use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use essay_grader::history::{MAX_HISTORY, PREVIEW_CHARS};
use essay_grader::{
    aggregate_history, aggregate_history_on, analytics, insights, Analytics, Category,
    EssayHistory, EssayRecord, FeedbackResult, Grade, GradeResult, HistoryQuery, ScoreBreakdown,
    SortKey, UserStats,
};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn noon(days_ago: i64) -> DateTime<Local> {
    (today() - Duration::days(days_ago))
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_local_timezone(Local)
        .single()
        .unwrap()
}

fn graded(total: i32) -> GradeResult {
    GradeResult {
        total,
        breakdown: ScoreBreakdown {
            content: 20,
            organization: 20,
            language: 20,
            mechanics: 20,
        },
        grade: Grade::from_total(total),
        category: Category::from_total(total),
    }
}

fn record(title: &str, score: i32, words: usize, when: DateTime<Local>) -> EssayRecord {
    let text = vec!["word"; words].join(" ");
    EssayRecord::new(title, &text, &graded(score), FeedbackResult::default(), when)
}

/// Newest first, one record per day ending today.
fn daily(scores: &[i32]) -> Vec<EssayRecord> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &s)| record("Essay", s, 250, noon(i as i64)))
        .collect()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[test]
fn record_derives_reading_time_and_preview() {
    let rec = record("  ", 88, 201, noon(0));
    assert_eq!(rec.title, "Untitled Essay");
    assert_eq!(rec.word_count, 201);
    assert_eq!(rec.reading_time, 2);
    assert_eq!(rec.essay_preview.chars().count(), PREVIEW_CHARS + 3);
    assert!(rec.essay_preview.ends_with("..."));
    assert_eq!(rec.grade, Grade::BPlus);
    assert_eq!(rec.category, Category::Good);
    assert_eq!(rec.day(), Some(today()));
}

#[test]
fn short_text_preview_is_untouched() {
    let rec = EssayRecord::new("Tiny", "Just a few words.", &graded(70), FeedbackResult::default(), noon(0));
    assert_eq!(rec.essay_preview, "Just a few words.");
    assert_eq!(rec.reading_time, 1);
}

#[test]
fn graded_at_uses_display_format() {
    let when = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).single().unwrap();
    let rec = record("Essay", 80, 10, when);
    assert_eq!(rec.graded_at, "3/5/2024, 2:07:09 PM");
    assert_eq!(rec.id, when.timestamp_millis());
}

#[test]
fn record_serializes_camel_case() {
    let rec = record("Essay", 80, 10, noon(0));
    let json = serde_json::to_value(&rec).unwrap();
    assert!(json.get("gradedAt").is_some());
    assert!(json.get("essayPreview").is_some());
    assert!(json.get("readingTime").is_some());
    assert_eq!(json["grade"], "B-");
    let back: EssayRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, rec);
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[test]
fn empty_history_is_all_zero() {
    assert_eq!(aggregate_history(&[]), UserStats::default());
    assert_eq!(analytics(&[], 0), Analytics::default());
}

#[test]
fn aggregates_totals_and_improvement() {
    let records = daily(&[90, 92, 88, 95, 91, 70, 72, 68, 75, 71]);
    let stats = aggregate_history_on(&records, today());
    assert_eq!(stats.total_essays, 10);
    assert_eq!(stats.average_score, 81);
    assert_eq!(stats.total_words, 2500);
    assert_eq!(stats.total_reading_time, 20);
    assert_eq!(stats.improvement_rate, 28);
    assert_eq!(stats.streak, 10);
    assert_eq!(stats.last_submission_date, Some(records[0].graded_at.clone()));
}

#[test]
fn improvement_needs_ten_records() {
    let records = daily(&[90, 92, 88, 95, 91, 70, 72, 68, 75]);
    assert_eq!(aggregate_history_on(&records, today()).improvement_rate, 0);
}

#[test]
fn improvement_can_be_negative() {
    let records = daily(&[70, 70, 70, 70, 70, 80, 80, 80, 80, 80]);
    assert_eq!(aggregate_history_on(&records, today()).improvement_rate, -12);
}

#[test]
fn streak_counts_consecutive_days() {
    let records = daily(&[80, 82, 84]);
    assert_eq!(aggregate_history_on(&records, today()).streak, 3);
}

#[test]
fn streak_stops_at_gap() {
    let records = vec![
        record("a", 80, 100, noon(0)),
        record("b", 80, 100, noon(1)),
        record("c", 80, 100, noon(3)),
        record("d", 80, 100, noon(4)),
    ];
    assert_eq!(aggregate_history_on(&records, today()).streak, 2);

    let records = vec![
        record("a", 80, 100, noon(0)),
        record("b", 80, 100, noon(2)),
        record("c", 80, 100, noon(3)),
    ];
    assert_eq!(aggregate_history_on(&records, today()).streak, 1);
}

#[test]
fn streak_is_zero_without_submission_today() {
    let records = vec![record("a", 80, 100, noon(1)), record("b", 80, 100, noon(2))];
    assert_eq!(aggregate_history_on(&records, today()).streak, 0);
}

#[test]
fn same_day_submissions_end_the_run() {
    let records = vec![
        record("a", 80, 100, noon(0)),
        record("b", 80, 100, noon(0) - Duration::hours(1)),
        record("c", 80, 100, noon(1)),
    ];
    assert_eq!(aggregate_history_on(&records, today()).streak, 1);
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[test]
fn identical_scores_are_fully_consistent() {
    let records = daily(&[80; 6]);
    let summary = analytics(&records, 80);
    assert_eq!(summary.consistency, 100);
    assert_eq!(summary.trend, 0.0);
    assert_eq!(summary.best_score, 80);
    assert_eq!(summary.worst_score, 80);
}

#[test]
fn trend_compares_recent_and_prior_windows() {
    let records = daily(&[90, 90, 90, 90, 90, 80, 80, 80, 80, 80]);
    let summary = analytics(&records, 85);
    assert_eq!(summary.trend, 10.0);
    assert_eq!(summary.best_score, 90);
    assert_eq!(summary.worst_score, 80);
    // std 5 over mean 85
    assert_eq!(summary.consistency, 94);
}

#[test]
fn trend_rounds_to_one_decimal() {
    let records = daily(&[91, 90, 90, 90, 90, 90, 90, 90]);
    assert_eq!(analytics(&records, 90).trend, 0.2);
}

#[test]
fn trend_needs_a_prior_window() {
    let records = daily(&[95, 60, 70]);
    assert_eq!(analytics(&records, 75).trend, 0.0);
}

#[test]
fn consistency_guards_zero_average() {
    let records = daily(&[80, 90]);
    assert_eq!(analytics(&records, 0).consistency, 0);
}

#[test]
fn consistency_floors_at_zero() {
    let records = daily(&[100, 1]);
    assert_eq!(analytics(&records, 10).consistency, 0);
}

#[test]
fn insight_messages() {
    let stats = UserStats {
        total_essays: 12,
        streak: 8,
        ..UserStats::default()
    };
    let summary = Analytics {
        trend: -3.5,
        consistency: 85,
        ..Analytics::default()
    };
    let messages = insights(&stats, &summary);
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], "Focus area: recent dip of 3.5 points.");
    assert_eq!(messages[1], "Excellent consistency in your writing quality!");
    assert_eq!(messages[2], "Amazing! Week-long writing streak!");

    let stats = UserStats {
        total_essays: 10,
        streak: 2,
        ..UserStats::default()
    };
    let messages = insights(&stats, &Analytics::default());
    assert_eq!(messages[0], "Maintaining consistent performance.");
    assert_eq!(messages[2], "Great milestone: 10 essays completed!");
}

// ---------------------------------------------------------------------------
// Session context
// ---------------------------------------------------------------------------

#[test]
fn history_caps_at_twenty_newest_first() {
    let mut history = EssayHistory::new();
    let start = noon(0) - Duration::hours(2);
    for i in 0..=MAX_HISTORY {
        history.push(record(&format!("essay {i}"), 80, 100, start + Duration::minutes(i as i64)));
    }
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history.records()[0].title, "essay 20");
    assert_eq!(history.records()[MAX_HISTORY - 1].title, "essay 1");
    assert!(history.records().windows(2).all(|w| w[0].id > w[1].id));
}

#[test]
fn same_instant_pushes_get_distinct_ids() {
    let when = noon(0);
    let mut history = EssayHistory::new();
    for i in 0..3 {
        history.push(record(&format!("batch {i}"), 80, 100, when));
    }
    let ids: Vec<i64> = history.records().iter().map(|r| r.id).collect();
    assert_eq!(ids[2], when.timestamp_millis());
    assert!(ids.windows(2).all(|w| w[0] > w[1]), "{ids:?}");
    assert_eq!(history.records()[0].title, "batch 2");
}

#[test]
fn push_never_moves_an_id_backwards() {
    let mut history = EssayHistory::new();
    history.push(record("later", 80, 100, noon(0)));
    history.push(record("skewed", 80, 100, noon(1)));
    assert_eq!(history.records()[0].title, "skewed");
    assert_eq!(history.records()[0].id, noon(0).timestamp_millis() + 1);

    let by_date = history.query(&HistoryQuery::default());
    assert_eq!(by_date[0].title, "skewed");
}

#[test]
fn from_records_restores_order_and_cap() {
    let records: Vec<EssayRecord> = (0..25)
        .map(|i| record(&format!("essay {i}"), 80, 100, noon(0) - Duration::minutes(100 - i)))
        .collect();
    let history = EssayHistory::from_records(records);
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history.records()[0].title, "essay 24");
}

#[test]
fn query_searches_filters_and_sorts() {
    let mut history = EssayHistory::new();
    history.push(record("Climate Policy", 96, 300, noon(2)));
    history.push(record("art history", 78, 900, noon(1)));
    history.push(record("Policy Review", 88, 500, noon(0)));

    let hits = history.query(&HistoryQuery {
        search: Some("POLICY".to_string()),
        ..HistoryQuery::default()
    });
    let titles: Vec<&str> = hits.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Policy Review", "Climate Policy"]);

    let hits = history.query(&HistoryQuery {
        category: Some(Category::Excellent),
        ..HistoryQuery::default()
    });
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Climate Policy");

    let by = |sort| {
        history
            .query(&HistoryQuery {
                sort,
                ..HistoryQuery::default()
            })
            .iter()
            .map(|r| r.title.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(by(SortKey::Score), ["Climate Policy", "Policy Review", "art history"]);
    assert_eq!(by(SortKey::Title), ["art history", "Climate Policy", "Policy Review"]);
    assert_eq!(by(SortKey::Words), ["art history", "Policy Review", "Climate Policy"]);
}

#[test]
fn clear_empties_history() {
    let mut history = EssayHistory::new();
    history.push(record("a", 80, 100, noon(0)));
    history.clear();
    assert!(history.is_empty());
    assert_eq!(history.stats(), UserStats::default());
}

#[test]
fn export_document_shape() {
    let mut history = EssayHistory::new();
    history.push(record("a", 80, 100, noon(0)));
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).single().unwrap();
    let doc = history.export(now);
    assert_eq!(doc.essays.len(), 1);
    assert_eq!(doc.user_stats.total_essays, 1);

    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["exportDate"], "2024-06-01T08:30:00.000Z");
    assert_eq!(json["userStats"]["averageScore"], 80);
    assert!(json["essays"][0].get("gradedAt").is_some());
}
