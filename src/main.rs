use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use essay_grader::history::DEFAULT_TITLE;
use essay_grader::{
    feedback_with, score_with, store, tokenize, Analytics, Category, EssayHistory, EssayRecord,
    FeedbackResult, GradeResult, HistoryQuery, LexicalStats, SortKey, Strategy, UserStats,
    WordCountStatus,
};

#[derive(Parser)]
#[command(
    name = "essay-grader",
    about = "Grade essays and track writing progress",
    version
)]
struct Cli {
    /// History file (created on first grade)
    #[arg(long, env = "ESSAY_GRADER_HISTORY", default_value = "essay_history.json")]
    history: PathBuf,

    /// Scoring strategy used by `grade`
    #[arg(long, global = true, value_enum, default_value_t = StrategyArg::Advanced)]
    strategy: StrategyArg,

    /// Fix the score noise for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grade essays and record them (reads stdin if no files are given).
    ///
    /// A batch is all-or-nothing: if any file is unreadable or too short,
    /// nothing from the batch is recorded, saved or printed.
    Grade {
        files: Vec<PathBuf>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Aggregate statistics, analytics and insights
    Stats,
    /// List recorded essays
    History {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort: SortArg,
    },
    /// Print the full history as an export document
    Export,
    /// Remove all recorded essays
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Basic,
    Advanced,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Basic => Strategy::Basic,
            StrategyArg::Advanced => Strategy::Advanced,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Excellent => Category::Excellent,
            CategoryArg::Good => Category::Good,
            CategoryArg::Average => Category::Average,
            CategoryArg::NeedsImprovement => Category::NeedsImprovement,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Date,
    Score,
    Title,
    Words,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortKey::Date,
            SortArg::Score => SortKey::Score,
            SortArg::Title => SortKey::Title,
            SortArg::Words => SortKey::Words,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GradeReport {
    record_id: i64,
    title: String,
    length_status: WordCountStatus,
    length_message: &'static str,
    stats: LexicalStats,
    result: GradeResult,
    feedback: FeedbackResult,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    user_stats: UserStats,
    analytics: Analytics,
    insights: Vec<String>,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn grade_one(
    history: &mut EssayHistory,
    text: &str,
    title: &str,
    strategy: Strategy,
    rng: &mut ChaCha8Rng,
) -> anyhow::Result<GradeReport> {
    let text = text.trim();
    let stats = tokenize(text);
    store::ensure_gradable(&stats)?;
    let result = score_with(&stats, strategy, rng);
    let feedback = feedback_with(&stats, strategy);
    let record = EssayRecord::new(title, text, &result, feedback.clone(), Local::now());
    let title = record.title.clone();
    history.push(record);
    let record_id = history.records()[0].id;
    info!(%title, record_id, score = result.total, grade = %result.grade, "essay graded");

    let length_status = WordCountStatus::from_word_count(stats.word_count);
    Ok(GradeReport {
        record_id,
        title,
        length_status,
        length_message: length_status.message(),
        stats,
        result,
        feedback,
    })
}

fn title_for(explicit: Option<&str>, path: Option<&Path>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            path.and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut history = store::load(&cli.history)?;

    match cli.command {
        Command::Grade { files, title } => {
            let strategy = Strategy::from(cli.strategy);
            let mut rng = cli.seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);

            let mut reports = Vec::new();
            if files.is_empty() {
                let mut input = String::new();
                std::io::stdin()
                    .read_to_string(&mut input)
                    .context("failed to read stdin")?;
                let title = title_for(title.as_deref(), None);
                reports.push(grade_one(&mut history, &input, &title, strategy, &mut rng)?);
            } else {
                for path in &files {
                    let text = std::fs::read_to_string(path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let title = title_for(title.as_deref(), Some(path));
                    reports.push(grade_one(&mut history, &text, &title, strategy, &mut rng)?);
                }
            }

            store::save(&cli.history, &history)?;
            for report in &reports {
                print_json(report)?;
            }
        }
        Command::Stats => {
            let user_stats = history.stats();
            print_json(&StatsReport {
                analytics: history.analytics(),
                insights: history.insights(),
                user_stats,
            })?;
        }
        Command::History {
            search,
            category,
            sort,
        } => {
            let query = HistoryQuery {
                search,
                category: category.map(Category::from),
                sort: sort.into(),
            };
            print_json(&history.query(&query))?;
        }
        Command::Export => {
            print_json(&history.export(Utc::now()))?;
        }
        Command::Clear => {
            let removed = history.len();
            history.clear();
            store::save(&cli.history, &history)?;
            info!(removed, "history cleared");
        }
    }
    Ok(())
}
