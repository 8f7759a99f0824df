//! Pipeline turning each corpus split into a flattened TSV table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::{build_contexts, ContextConfig};
use crate::corpus::{write_raw_table, RawSplit, Split, SplitFiles};
use crate::error::{FlattenError, Result};
use crate::table::{to_records, write_turn_table};
use crate::turn::{split_conversation, Turn};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the unzipped corpus.
    pub input_root: PathBuf,
    pub output_dir: PathBuf,
    pub context: ContextConfig,
    /// Splits to process, in order.
    pub splits: Vec<Split>,
    /// Also write the per-conversation `<split>.tsv` next to the raw files.
    pub write_raw_tables: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("."),
            output_dir: PathBuf::from("./data"),
            context: ContextConfig::default(),
            splits: Split::ALL.to_vec(),
            write_raw_tables: false,
        }
    }
}

impl PipelineConfig {
    /// Build a validated config from user input. An empty `splits` selects
    /// every split.
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        window_size: i64,
        separator: impl Into<String>,
        splits: Vec<Split>,
        write_raw_tables: bool,
    ) -> Result<Self> {
        let config = Self {
            input_root: input_root.into(),
            output_dir: output_dir.into(),
            context: ContextConfig::new(window_size, separator)?,
            splits: if splits.is_empty() {
                Split::ALL.to_vec()
            } else {
                splits
            },
            write_raw_tables,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.context.validate()?;
        if self.splits.is_empty() {
            return Err(FlattenError::Config("no splits selected".to_string()));
        }
        Ok(())
    }

    /// Where the flattened table for `split` is written.
    pub fn output_path(&self, split: Split) -> PathBuf {
        self.output_dir.join(format!("{}.tsv", split.output_stem()))
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.output_dir.join("metadata.json")
    }
}

/// Result of processing a single split.
#[derive(Debug, Clone, Serialize)]
pub struct SplitResult {
    pub split: Split,
    pub conversations: usize,
    pub turns: usize,
    pub output_path: PathBuf,
}

/// Result of processing all configured splits.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub splits: Vec<SplitResult>,
    pub total_conversations: usize,
    pub total_turns: usize,
}

/// Split every conversation and concatenate the turns in conversation order.
///
/// Conversation ids are the 0-based line numbers of the split. The first
/// misaligned conversation aborts the whole split.
pub fn flatten_split(raw: &RawSplit) -> Result<Vec<Turn>> {
    let mut turns = Vec::new();
    for (conversation_id, (dialogue, emotions, acts)) in raw.conversations().enumerate() {
        let conversation = split_conversation(conversation_id, dialogue, emotions, acts)
            .map_err(|m| m.into_error(raw.split, conversation_id))?;
        turns.extend(conversation);
    }

    let empty = turns.iter().filter(|t| t.text.is_empty()).count();
    if empty > 0 {
        warn!(split = %raw.split, empty, "split contains empty turns");
    }
    Ok(turns)
}

/// Process one split from raw files to its output table.
pub fn process_split(config: &PipelineConfig, split: Split) -> Result<SplitResult> {
    let files = SplitFiles::locate(&config.input_root, split)?;
    let raw = RawSplit::read(&files)?;

    if config.write_raw_tables {
        let raw_path = write_raw_table(&raw, &files.dir)?;
        debug!(split = %split, path = %raw_path.display(), "wrote per-conversation table");
    }

    let turns = flatten_split(&raw)?;
    let contexts = build_contexts(&turns, &config.context);
    let records = to_records(turns, contexts);

    let output_path = config.output_path(split);
    let turn_count = write_turn_table(&output_path, &records)?;

    info!(
        split = %split,
        conversations = raw.len(),
        turns = turn_count,
        path = %output_path.display(),
        "flattened split"
    );

    Ok(SplitResult {
        split,
        conversations: raw.len(),
        turns: turn_count,
        output_path,
    })
}

/// Process all configured splits sequentially. The first error aborts the run.
pub fn run(config: &PipelineConfig) -> Result<PipelineResult> {
    config.validate()?;
    create_output_dir(&config.output_dir)?;

    let splits = config
        .splits
        .iter()
        .map(|&split| process_split(config, split))
        .collect::<Result<Vec<_>>>()?;

    Ok(PipelineResult {
        total_conversations: splits.iter().map(|s| s.conversations).sum(),
        total_turns: splits.iter().map(|s| s.turns).sum(),
        splits,
    })
}

/// Write `metadata.json` describing the run into the output directory.
pub fn write_metadata(config: &PipelineConfig, result: &PipelineResult) -> Result<PathBuf> {
    let metadata = serde_json::json!({
        "config": {
            "input": config.input_root.to_string_lossy(),
            "output": config.output_dir.to_string_lossy(),
            "window_size": config.context.window_size,
            "separator": config.context.separator,
            "splits": config.splits,
            "write_raw_tables": config.write_raw_tables,
        },
        "counts": {
            "total_conversations": result.total_conversations,
            "total_turns": result.total_turns,
            "avg_turns_per_conversation": if result.total_conversations > 0 {
                result.total_turns as f64 / result.total_conversations as f64
            } else {
                0.0
            },
        },
        "splits": result.splits,
    });

    let path = config.metadata_path();
    let file = File::create(&path).map_err(|e| FlattenError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &metadata)?;
    writer.flush().map_err(|e| FlattenError::io(&path, e))?;
    Ok(path)
}

fn create_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| FlattenError::io(dir, e))
}
