pub mod feedback;
pub mod history;
pub mod lexical;
pub mod scoring;
pub mod store;

pub use feedback::{feedback, feedback_with, FeedbackResult};
pub use history::{
    aggregate_history, aggregate_history_on, analytics, insights, Analytics, EssayHistory,
    EssayRecord, ExportDocument, HistoryQuery, SortKey, UserStats,
};
pub use lexical::{tokenize, LexicalStats, WordCountStatus};
pub use scoring::{score, score_with, Category, Grade, GradeResult, ScoreBreakdown, Strategy};
pub use store::GraderError;

/// Rounds halves toward positive infinity, so -2.5 becomes -2.
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}
