//! Locating and reading the three parallel files of a DailyDialog split.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{FlattenError, Result};

/// One of the three corpus partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];

    /// Name used by the corpus folders and file names.
    pub fn name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }

    /// Stem of the flattened output table; validation is published as `dev`.
    pub fn output_stem(self) -> &'static str {
        match self {
            Split::Validation => "dev",
            other => other.name(),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Split {
    type Err = FlattenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "validation" | "dev" => Ok(Split::Validation),
            "test" => Ok(Split::Test),
            other => Err(FlattenError::Config(format!("unknown split '{other}'"))),
        }
    }
}

/// Paths of the dialogue, emotion and act files for one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFiles {
    pub split: Split,
    pub dir: PathBuf,
    pub dialogues: PathBuf,
    pub emotions: PathBuf,
    pub acts: PathBuf,
}

impl SplitFiles {
    /// File set for `split` inside `dir`, whether or not the files exist.
    pub fn in_dir(dir: &Path, split: Split) -> Self {
        let name = split.name();
        Self {
            split,
            dir: dir.to_path_buf(),
            dialogues: dir.join(format!("dialogues_{name}.txt")),
            emotions: dir.join(format!("dialogues_emotion_{name}.txt")),
            acts: dir.join(format!("dialogues_act_{name}.txt")),
        }
    }

    /// Where the unzipped corpus keeps the split: `<root>/<split>/<split>/`.
    pub fn canonical(input_root: &Path, split: Split) -> Self {
        Self::in_dir(&input_root.join(split.name()).join(split.name()), split)
    }

    /// Find the split's files, preferring the canonical folder and otherwise
    /// taking the first directory under `input_root` that holds all three.
    pub fn locate(input_root: &Path, split: Split) -> Result<Self> {
        let canonical = Self::canonical(input_root, split);
        if canonical.all_exist() {
            debug!(split = %split, dir = %canonical.dir.display(), "found canonical split folder");
            return Ok(canonical);
        }

        let mut dirs: Vec<PathBuf> = WalkDir::new(input_root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.path().to_path_buf())
            .collect();
        dirs.sort();

        if let Some(found) = dirs
            .iter()
            .map(|dir| Self::in_dir(dir, split))
            .find(SplitFiles::all_exist)
        {
            warn!(
                split = %split,
                dir = %found.dir.display(),
                "split files not in canonical folder, using discovered location"
            );
            return Ok(found);
        }

        Err(FlattenError::MissingInput(canonical.first_missing()))
    }

    fn paths(&self) -> [&Path; 3] {
        [self.dialogues.as_path(), self.emotions.as_path(), self.acts.as_path()]
    }

    fn all_exist(&self) -> bool {
        self.paths().iter().all(|p| p.is_file())
    }

    fn first_missing(&self) -> PathBuf {
        self.paths()
            .into_iter()
            .find(|p| !p.is_file())
            .unwrap_or(&self.dialogues)
            .to_path_buf()
    }
}

/// One line per conversation from each of the three files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSplit {
    pub split: Split,
    pub dialogues: Vec<String>,
    pub emotions: Vec<String>,
    pub acts: Vec<String>,
}

impl RawSplit {
    pub fn read(files: &SplitFiles) -> Result<Self> {
        Self::from_lines(
            files.split,
            read_lines(&files.dialogues)?,
            read_lines(&files.emotions)?,
            read_lines(&files.acts)?,
        )
    }

    /// Pair up already-loaded lines, rejecting files of unequal length.
    pub fn from_lines(
        split: Split,
        dialogues: Vec<String>,
        emotions: Vec<String>,
        acts: Vec<String>,
    ) -> Result<Self> {
        if dialogues.len() != emotions.len() || dialogues.len() != acts.len() {
            return Err(FlattenError::LineCountMismatch {
                split,
                dialogues: dialogues.len(),
                emotions: emotions.len(),
                acts: acts.len(),
            });
        }
        Ok(Self {
            split,
            dialogues,
            emotions,
            acts,
        })
    }

    pub fn len(&self) -> usize {
        self.dialogues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogues.is_empty()
    }

    /// `(dialogue, emotions, acts)` per conversation, in file order.
    pub fn conversations(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.dialogues
            .iter()
            .zip(&self.emotions)
            .zip(&self.acts)
            .map(|((d, e), a)| (d.as_str(), e.as_str(), a.as_str()))
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(FlattenError::MissingInput(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| FlattenError::io(path, e))?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Row of the per-conversation table written next to the raw files.
#[derive(Debug, Serialize)]
struct RawConversationRow<'a> {
    #[serde(rename = "")]
    index: usize,
    dialogue: &'a str,
    emotion: &'a str,
    act: &'a str,
}

/// Write `<dir>/<split>.tsv` with one row per conversation.
pub fn write_raw_table(raw: &RawSplit, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.tsv", raw.split.name()));
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)?;

    for (index, (dialogue, emotion, act)) in raw.conversations().enumerate() {
        writer.serialize(RawConversationRow {
            index,
            dialogue,
            emotion,
            act,
        })?;
    }
    writer.flush().map_err(|e| FlattenError::io(&path, e))?;
    Ok(path)
}
