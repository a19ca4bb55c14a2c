use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::history::{EssayHistory, EssayRecord};
use crate::lexical::{LexicalStats, MIN_ESSAY_CHARS};

#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed history document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("essay is too short: {chars} characters, at least {min} required")]
    TooShort { chars: usize, min: usize },
}

pub type Result<T> = std::result::Result<T, GraderError>;

/// Interactive gate applied before grading. The core never rejects input.
/// Expects stats of the trimmed essay.
pub fn ensure_gradable(stats: &LexicalStats) -> Result<()> {
    let chars = stats.char_count;
    if chars < MIN_ESSAY_CHARS {
        return Err(GraderError::TooShort {
            chars,
            min: MIN_ESSAY_CHARS,
        });
    }
    Ok(())
}

/// A missing file is an empty history.
pub fn load(path: &Path) -> Result<EssayHistory> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no history file yet, starting empty");
            return Ok(EssayHistory::new());
        }
        Err(source) => {
            return Err(GraderError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let records: Vec<EssayRecord> = serde_json::from_str(&raw)?;
    let stored = records.len();
    let history = EssayHistory::from_records(records);
    if history.len() < stored {
        warn!(path = %path.display(), "history file exceeded capacity, oldest entries dropped");
    }
    Ok(history)
}

pub fn save(path: &Path, history: &EssayHistory) -> Result<()> {
    let json = serde_json::to_string_pretty(history)?;
    fs::write(path, json).map_err(|source| GraderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), essays = history.len(), "history saved");
    Ok(())
}
