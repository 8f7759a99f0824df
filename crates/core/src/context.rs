//! Sliding-window conversational context over a flattened turn table.

use serde::Serialize;

use crate::error::{FlattenError, Result};
use crate::turn::Turn;
use crate::{DEFAULT_SEPARATOR, DEFAULT_WINDOW_SIZE};

/// Window size and separator used when building contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextConfig {
    /// Number of preceding turns to include.
    pub window_size: usize,
    /// Placed between two non-empty context turns.
    pub separator: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl ContextConfig {
    /// Build a validated config from a signed window size as read from user input.
    pub fn new(window_size: i64, separator: impl Into<String>) -> Result<Self> {
        let window_size = usize::try_from(window_size).map_err(|_| {
            FlattenError::Config(format!("window size must be non-negative, got {window_size}"))
        })?;
        let config = Self {
            window_size,
            separator: separator.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size > 0 && self.separator.is_empty() {
            return Err(FlattenError::Config(
                "separator must not be empty when the window size is positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Compute the context string for every turn, in table order.
///
/// Slot `k` of turn `i` is the text of turn `i - k` when both belong to the
/// same conversation. Non-empty slots are joined from the most distant to the
/// nearest, so the separator never leads, trails, or repeats.
pub fn build_contexts(turns: &[Turn], config: &ContextConfig) -> Vec<String> {
    (0..turns.len())
        .map(|index| context_for(turns, index, config))
        .collect()
}

/// Context of the turn at `index`; `index` must be within `turns`.
pub(crate) fn context_for(turns: &[Turn], index: usize, config: &ContextConfig) -> String {
    let current = turns[index].conversation_id;
    let mut slots: Vec<&str> = Vec::with_capacity(config.window_size);

    for lag in (1..=config.window_size).rev() {
        let Some(prior_index) = index.checked_sub(lag) else {
            continue;
        };
        let prior = &turns[prior_index];
        if prior.conversation_id != current || prior.text.is_empty() {
            continue;
        }
        slots.push(&prior.text);
    }

    slots.join(config.separator.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(conversations: &[&[&str]]) -> Vec<Turn> {
        conversations
            .iter()
            .enumerate()
            .flat_map(|(conversation_id, texts)| {
                texts.iter().enumerate().map(move |(position, text)| Turn {
                    text: text.to_string(),
                    emotion: "0".to_string(),
                    act: "1".to_string(),
                    conversation_id,
                    position,
                })
            })
            .collect()
    }

    fn config(window_size: usize, separator: &str) -> ContextConfig {
        ContextConfig {
            window_size,
            separator: separator.to_string(),
        }
    }

    #[test]
    fn test_window_of_two_within_one_conversation() {
        let turns = table(&[&["Hi", "Hello", "Bye"]]);
        let contexts = build_contexts(&turns, &config(2, "[SEP]"));
        assert_eq!(contexts, vec!["", "Hi", "Hi[SEP]Hello"]);
    }

    #[test]
    fn test_no_context_across_conversation_boundary() {
        let turns = table(&[&["A", "B"], &["C"]]);
        let contexts = build_contexts(&turns, &config(1, "[SEP]"));
        assert_eq!(contexts, vec!["", "A", ""]);
    }

    #[test]
    fn test_window_larger_than_conversation() {
        let turns = table(&[&["A", "B", "C"], &["D", "E"]]);
        let contexts = build_contexts(&turns, &config(5, " | "));
        assert_eq!(contexts, vec!["", "A", "A | B", "", "D"]);
    }

    #[test]
    fn test_window_slides_past_distant_turns() {
        let turns = table(&[&["t0", "t1", "t2", "t3"]]);
        let contexts = build_contexts(&turns, &config(2, "/"));
        assert_eq!(contexts[3], "t1/t2");
    }

    #[test]
    fn test_zero_window_yields_empty_contexts() {
        let turns = table(&[&["A", "B"], &["C", "D"]]);
        for separator in ["[SEP]", ""] {
            let contexts = build_contexts(&turns, &config(0, separator));
            assert!(contexts.iter().all(String::is_empty));
            assert_eq!(contexts.len(), turns.len());
        }
    }

    #[test]
    fn test_first_turn_of_every_conversation_has_empty_context() {
        let turns = table(&[&["A", "B", "C"], &["D"], &["E", "F"]]);
        for window_size in 0..5 {
            let contexts = build_contexts(&turns, &config(window_size, "[SEP]"));
            for (turn, context) in turns.iter().zip(&contexts) {
                if turn.position == 0 {
                    assert_eq!(context, "");
                }
            }
        }
    }

    #[test]
    fn test_contexts_only_draw_from_own_conversation() {
        let turns = table(&[&["a1", "a2", "a3"], &["b1", "b2"], &["c1", "c2", "c3"]]);
        let contexts = build_contexts(&turns, &config(3, "[SEP]"));

        for (turn, context) in turns.iter().zip(&contexts) {
            let prefix = &turn.text[..1];
            for piece in context.split("[SEP]").filter(|p| !p.is_empty()) {
                assert!(piece.starts_with(prefix), "{piece} leaked into {}", turn.text);
            }
        }
    }

    #[test]
    fn test_empty_turns_leave_no_separator_artifacts() {
        let turns = table(&[&["A", "", "C", "", "E"]]);
        let contexts = build_contexts(&turns, &config(3, "[SEP]"));

        assert_eq!(contexts, vec!["", "A", "A", "A[SEP]C", "C"]);
        for context in &contexts {
            assert!(!context.starts_with("[SEP]"));
            assert!(!context.ends_with("[SEP]"));
            assert!(!context.contains("[SEP][SEP]"));
        }
    }

    #[test]
    fn test_rebuild_is_identical() {
        let turns = table(&[&["A", "B", "C"], &["D", "E"]]);
        let config = config(2, "[SEP]");
        assert_eq!(build_contexts(&turns, &config), build_contexts(&turns, &config));
    }

    #[test]
    fn test_config_rejects_negative_window() {
        let err = ContextConfig::new(-1, "[SEP]").unwrap_err();
        assert!(matches!(err, FlattenError::Config(_)));
    }

    #[test]
    fn test_config_rejects_empty_separator_with_window() {
        assert!(matches!(
            ContextConfig::new(2, "").unwrap_err(),
            FlattenError::Config(_)
        ));
        assert_eq!(ContextConfig::new(0, "").unwrap().window_size, 0);
    }

    #[test]
    fn test_default_config() {
        let config = ContextConfig::default();
        assert_eq!(config.window_size, 1);
        assert_eq!(config.separator, DEFAULT_SEPARATOR);
        assert!(config.validate().is_ok());
    }
}
