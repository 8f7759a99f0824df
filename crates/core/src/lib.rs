//! Core flattening logic for the DailyDialog corpus.
//!
//! This crate splits each conversation line of the corpus into labelled turns,
//! flattens a split into one turn table, and attaches to every turn the
//! concatenation of its preceding turns from the same conversation.

mod context;
mod corpus;
mod error;
mod table;
mod turn;
pub mod pipeline;

pub use context::{build_contexts, ContextConfig};
pub use corpus::{write_raw_table, RawSplit, Split, SplitFiles};
pub use error::{FlattenError, Result};
pub use pipeline::{
    flatten_split, process_split, run, write_metadata, PipelineConfig, PipelineResult,
    SplitResult,
};
pub use table::{to_records, write_turn_table, TurnRecord};
pub use turn::{split_conversation, split_labels, split_utterances, Misaligned, Turn};

/// End-of-utterance token separating turns in a dialogue line.
pub const TURN_DELIMITER: &str = "__eou__";

/// Default number of preceding turns in a context window.
pub const DEFAULT_WINDOW_SIZE: usize = 1;

/// Default token placed between context turns.
///
/// Turn text is assumed never to begin with this token.
pub const DEFAULT_SEPARATOR: &str = "[SEP]";
