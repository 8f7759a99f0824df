//! Splitting one conversation line of the corpus into aligned turns.

use crate::corpus::Split;
use crate::error::FlattenError;
use crate::TURN_DELIMITER;

/// A single utterance with its labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub text: String,
    pub emotion: String,
    pub act: String,
    pub conversation_id: usize,
    /// 0-based position within the conversation.
    pub position: usize,
}

/// Counts of a conversation whose utterances and labels do not line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misaligned {
    pub turns: usize,
    pub emotions: usize,
    pub acts: usize,
}

impl Misaligned {
    pub fn into_error(self, split: Split, conversation_id: usize) -> FlattenError {
        FlattenError::Alignment {
            split,
            conversation_id,
            turns: self.turns,
            emotions: self.emotions,
            acts: self.acts,
        }
    }
}

/// Split a raw dialogue blob on the end-of-utterance token.
///
/// Empty fragments are dropped before trimming, so a trailing delimiter adds
/// no turn while a whitespace-only fragment still yields an empty turn that
/// keeps its label slot.
pub fn split_utterances(raw_dialogue: &str) -> Vec<String> {
    raw_dialogue
        .split(TURN_DELIMITER)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| fragment.trim().to_string())
        .collect()
}

/// Split a whitespace-delimited list of label codes.
pub fn split_labels(raw_labels: &str) -> Vec<String> {
    raw_labels.split_whitespace().map(str::to_string).collect()
}

/// Decompose one conversation into turns tagged with `conversation_id`.
pub fn split_conversation(
    conversation_id: usize,
    raw_dialogue: &str,
    raw_emotions: &str,
    raw_acts: &str,
) -> Result<Vec<Turn>, Misaligned> {
    let texts = split_utterances(raw_dialogue);
    let emotions = split_labels(raw_emotions);
    let acts = split_labels(raw_acts);

    if texts.len() != emotions.len() || texts.len() != acts.len() {
        return Err(Misaligned {
            turns: texts.len(),
            emotions: emotions.len(),
            acts: acts.len(),
        });
    }

    Ok(texts
        .into_iter()
        .zip(emotions)
        .zip(acts)
        .enumerate()
        .map(|(position, ((text, emotion), act))| Turn {
            text,
            emotion,
            act,
            conversation_id,
            position,
        })
        .collect())
}
