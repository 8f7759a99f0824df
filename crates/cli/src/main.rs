//! CLI tool for flattening the DailyDialog corpus.
//!
//! Reads the train, validation and test splits of the unzipped corpus and
//! writes one TSV per split with a row per turn and its preceding context.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dailydialog_flattener_core::{
    pipeline::{PipelineConfig, PipelineResult},
    run, write_metadata, Split, DEFAULT_SEPARATOR,
};

/// Flatten DailyDialog into per-turn TSV tables with conversational context.
#[derive(Parser, Debug)]
#[command(name = "dailydialog-flatten")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file path of the unzipped DailyDialog dataset
    #[arg(long, default_value = ".")]
    input: PathBuf,

    /// The file path of the output dataset
    #[arg(long, default_value = "./data")]
    output: PathBuf,

    /// Number of preceding turns joined into each context
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    window_size: i64,

    /// Token placed between context turns
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    separator: String,

    /// Split to process (repeatable); defaults to train, validation and test
    #[arg(long = "split")]
    splits: Vec<Split>,

    /// Also write the per-conversation <split>.tsv next to the raw files
    #[arg(long)]
    write_raw_tables: bool,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn pipeline_config(&self) -> dailydialog_flattener_core::Result<PipelineConfig> {
        PipelineConfig::new(
            &self.input,
            &self.output,
            self.window_size,
            self.separator.as_str(),
            self.splits.clone(),
            self.write_raw_tables,
        )
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose {
            "dailydialog_flattener_core=debug,dailydialog_flatten=debug"
        } else {
            "dailydialog_flattener_core=info,dailydialog_flatten=info"
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.pipeline_config()?;

    println!("Flattening splits from {:?}...", config.input_root);
    let result: PipelineResult = run(&config)?;
    let metadata_path = write_metadata(&config, &result)?;

    println!("\n[summary]");
    for split in &result.splits {
        println!(
            "  {}: {} conversations, {} turns -> {:?}",
            split.split, split.conversations, split.turns, split.output_path
        );
    }
    println!("  Total conversations: {}", result.total_conversations);
    println!("  Total turns: {}", result.total_turns);
    println!("  Metadata: {:?}", metadata_path);

    Ok(())
}
