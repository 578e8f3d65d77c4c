// Primitives for reading JSON lists of records.

use std::fs;

use log::{debug, warn};
use serde_json::Value as JSValue;

use feedback_pipeline::{Chunk, ExtractError, COMMENTS_FIELD};

/// Reads a JSON array of objects, `chunk_size` records at a time.
///
/// Unlike tables, records do not share a header: a chunk in which no record has a `Comments`
/// field is reported as missing the field, and the following chunks are still read.
pub struct RecordChunks {
    path: String,
    chunk_size: usize,
    next_index: usize,
    records: Option<std::vec::IntoIter<JSValue>>,
    done: bool,
}

impl RecordChunks {
    pub fn new(path: &str, chunk_size: usize) -> RecordChunks {
        RecordChunks {
            path: path.to_string(),
            chunk_size: chunk_size.max(1),
            next_index: 0,
            records: None,
            done: false,
        }
    }
}

fn read_records(path: &str) -> Result<Vec<JSValue>, ExtractError> {
    let contents = fs::read_to_string(path).map_err(|e| ExtractError::Read {
        message: format!("{}: {}", path, e),
    })?;
    let js: JSValue = serde_json::from_str(&contents).map_err(|e| ExtractError::Read {
        message: format!("{}: {}", path, e),
    })?;
    match js {
        JSValue::Array(l) => Ok(l),
        _ => Err(ExtractError::Read {
            message: format!("{}: expected a list of records", path),
        }),
    }
}

/// The comment of a record. Absent and null fields give None, other values are written out.
fn comment_of(record: &JSValue) -> Option<Option<String>> {
    let v = record.as_object()?.get(COMMENTS_FIELD)?;
    Some(match v {
        JSValue::Null => None,
        JSValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

impl Iterator for RecordChunks {
    type Item = Result<Chunk, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.records.is_none() {
            match read_records(&self.path) {
                Ok(l) => {
                    debug!("RecordChunks: {} records in {}", l.len(), self.path);
                    self.records = Some(l.into_iter());
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        let records = self.records.as_mut()?;
        let batch: Vec<JSValue> = records.by_ref().take(self.chunk_size).collect();
        if batch.is_empty() {
            self.done = true;
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        let fields: Vec<Option<String>> = batch.iter().filter_map(comment_of).collect();
        if fields.is_empty() {
            warn!("RecordChunks: no {} field in chunk {}", COMMENTS_FIELD, index);
            return Some(Err(ExtractError::MissingField {
                field: COMMENTS_FIELD.to_string(),
                chunk: index,
            }));
        }
        Some(Ok(Chunk::from_raw(index, fields.into_iter().flatten())))
    }
}
