// Primitives for reading CSV and TSV files.

use std::fs::File;

use log::{debug, warn};

use feedback_pipeline::{Chunk, ExtractError, COMMENTS_FIELD};

use crate::feedback::io_common::find_column;

enum State {
    Unopened,
    Reading {
        records: csv::StringRecordsIntoIter<File>,
        // None when the header has no comments column.
        comments_idx: Option<usize>,
    },
    Done,
}

/// Reads a delimited file lazily, `chunk_size` records at a time.
///
/// The header is shared by all the chunks: when it has no `Comments` column, every chunk of
/// the file is reported as missing the field.
pub struct CsvChunks {
    path: String,
    delimiter: u8,
    chunk_size: usize,
    next_index: usize,
    state: State,
}

impl CsvChunks {
    pub fn new(path: &str, delimiter: u8, chunk_size: usize) -> CsvChunks {
        CsvChunks {
            path: path.to_string(),
            delimiter,
            chunk_size: chunk_size.max(1),
            next_index: 0,
            state: State::Unopened,
        }
    }

    fn open(&self) -> Result<State, ExtractError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)
            .map_err(read_error)?;
        let header: Vec<String> = rdr
            .headers()
            .map_err(read_error)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        debug!("CsvChunks::open: {} header: {:?}", self.path, header);
        let comments_idx = find_column(&header, COMMENTS_FIELD);
        if comments_idx.is_none() {
            warn!(
                "CsvChunks::open: no {} column in {}",
                COMMENTS_FIELD, self.path
            );
        }
        Ok(State::Reading {
            records: rdr.into_records(),
            comments_idx,
        })
    }
}

fn read_error(e: csv::Error) -> ExtractError {
    ExtractError::Read {
        message: e.to_string(),
    }
}

impl Iterator for CsvChunks {
    type Item = Result<Chunk, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let State::Unopened = self.state {
            match self.open() {
                Ok(s) => self.state = s,
                Err(e) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
            }
        }
        let (records, comments_idx) = match &mut self.state {
            State::Reading {
                records,
                comments_idx,
            } => (records, *comments_idx),
            _ => return None,
        };

        let mut raw: Vec<String> = Vec::new();
        let mut count: usize = 0;
        while count < self.chunk_size {
            match records.next() {
                Some(Ok(record)) => {
                    count += 1;
                    if let Some(idx) = comments_idx {
                        if let Some(cell) = record.get(idx) {
                            raw.push(cell.to_string());
                        }
                    }
                }
                Some(Err(e)) => {
                    self.state = State::Done;
                    return Some(Err(read_error(e)));
                }
                None => break,
            }
        }
        if count == 0 {
            self.state = State::Done;
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        match comments_idx {
            Some(_) => Some(Ok(Chunk::from_raw(index, raw))),
            None => Some(Err(ExtractError::MissingField {
                field: COMMENTS_FIELD.to_string(),
                chunk: index,
            })),
        }
    }
}
