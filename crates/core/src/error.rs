//! Error types for corpus flattening.

use std::path::PathBuf;

use thiserror::Error;

use crate::corpus::Split;

/// Errors surfaced by the flattening pipeline. All of them are fatal for the
/// split being processed.
#[derive(Error, Debug)]
pub enum FlattenError {
    /// Utterance and label counts disagree within one conversation.
    #[error(
        "conversation {conversation_id} in {split} is misaligned: \
         {turns} turns, {emotions} emotion labels, {acts} act labels"
    )]
    Alignment {
        split: Split,
        conversation_id: usize,
        turns: usize,
        emotions: usize,
        acts: usize,
    },

    /// The three parallel files of a split hold different numbers of lines.
    #[error(
        "{split} files disagree on conversation count: \
         {dialogues} dialogues, {emotions} emotion lines, {acts} act lines"
    )]
    LineCountMismatch {
        split: Split,
        dialogues: usize,
        emotions: usize,
        acts: usize,
    },

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A required corpus file does not exist.
    #[error("missing input file: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlattenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = FlattenError> = std::result::Result<T, E>;
