//! Flattened per-turn TSV output.

use std::path::Path;

use serde::Serialize;

use crate::error::{FlattenError, Result};
use crate::turn::Turn;

/// One row of the flattened table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    /// Global row index; written under an unnamed header.
    #[serde(rename = "")]
    pub index: usize,
    pub dialogue: String,
    pub emotion: String,
    pub act: String,
    pub convo_id: usize,
    pub context: String,
}

/// Pair each turn with its context. Both slices must be in table order.
pub fn to_records(turns: Vec<Turn>, contexts: Vec<String>) -> Vec<TurnRecord> {
    debug_assert_eq!(turns.len(), contexts.len());
    turns
        .into_iter()
        .zip(contexts)
        .enumerate()
        .map(|(index, (turn, context))| TurnRecord {
            index,
            dialogue: turn.text,
            emotion: turn.emotion,
            act: turn.act,
            convo_id: turn.conversation_id,
            context,
        })
        .collect()
}

/// Write records as tab-separated values with a header row.
///
/// Returns the number of data rows written.
pub fn write_turn_table(path: &Path, records: &[TurnRecord]) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;

    if records.is_empty() {
        writer.write_record(["", "dialogue", "emotion", "act", "convo_id", "context"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| FlattenError::io(path, e))?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn turn(text: &str, conversation_id: usize, position: usize) -> Turn {
        Turn {
            text: text.to_string(),
            emotion: "0".to_string(),
            act: "2".to_string(),
            conversation_id,
            position,
        }
    }

    #[test]
    fn test_to_records_keeps_order() {
        let records = to_records(
            vec![turn("A", 0, 0), turn("B", 0, 1), turn("C", 1, 0)],
            vec![String::new(), "A".to_string(), String::new()],
        );

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].dialogue, "B");
        assert_eq!(records[1].context, "A");
        assert_eq!(records[2].convo_id, 1);
        assert_eq!(records[2].index, 2);
    }

    #[test]
    fn test_write_turn_table_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("train.tsv");
        let records = to_records(
            vec![turn("Hi", 0, 0), turn("Hello there", 0, 1)],
            vec![String::new(), "Hi".to_string()],
        );

        let rows = write_turn_table(&path, &records).unwrap();
        assert_eq!(rows, 2);

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "\tdialogue\temotion\tact\tconvo_id\tcontext\n\
             0\tHi\t0\t2\t0\t\n\
             1\tHello there\t0\t2\t0\tHi\n"
        );
    }

    #[test]
    fn test_write_empty_table_still_has_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.tsv");

        assert_eq!(write_turn_table(&path, &[]).unwrap(), 0);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "\tdialogue\temotion\tact\tconvo_id\tcontext\n");
    }
}
