// Primitives for reading spreadsheets, and the generic tables of the demographics command.

use calamine::{open_workbook_auto, DataType, Range, Reader};
use log::{debug, warn};

use feedback_pipeline::{Chunk, ExtractError, COMMENTS_FIELD};

use crate::feedback::io_common::{cell_to_string, find_column, ArtifactKind};
use crate::feedback::*;

/// Reads the first worksheet of a workbook, `chunk_size` rows at a time.
///
/// The workbook is opened when the first chunk is requested.
pub struct SpreadsheetChunks {
    path: String,
    chunk_size: usize,
    next_index: usize,
    // The first worksheet and the position of the comments column.
    loaded: Option<(Range<DataType>, Option<usize>)>,
    next_row: usize,
    done: bool,
}

impl SpreadsheetChunks {
    pub fn new(path: &str, chunk_size: usize) -> SpreadsheetChunks {
        SpreadsheetChunks {
            path: path.to_string(),
            chunk_size: chunk_size.max(1),
            next_index: 0,
            loaded: None,
            // Row 0 is the header.
            next_row: 1,
            done: false,
        }
    }
}

fn first_sheet(path: &str) -> BFbResult<Range<DataType>> {
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;
    Ok(wrange)
}

fn header_of(wrange: &Range<DataType>) -> Vec<String> {
    wrange
        .rows()
        .next()
        .map(|row| {
            row.iter()
                .map(|c| cell_to_string(c).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}

impl Iterator for SpreadsheetChunks {
    type Item = Result<Chunk, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.loaded.is_none() {
            match first_sheet(&self.path) {
                Ok(wrange) => {
                    let header = header_of(&wrange);
                    debug!("SpreadsheetChunks: {} header: {:?}", self.path, header);
                    let idx = find_column(&header, COMMENTS_FIELD);
                    if idx.is_none() {
                        warn!(
                            "SpreadsheetChunks: no {} column in {}",
                            COMMENTS_FIELD, self.path
                        );
                    }
                    self.loaded = Some((wrange, idx));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(ExtractError::Read {
                        message: e.to_string(),
                    }));
                }
            }
        }
        let (wrange, comments_idx) = self.loaded.as_ref()?;
        let total_rows = wrange.height();
        if self.next_row >= total_rows {
            self.done = true;
            return None;
        }

        let end = (self.next_row + self.chunk_size).min(total_rows);
        let index = self.next_index;
        let item = match comments_idx {
            Some(idx) => {
                let raw: Vec<String> = wrange
                    .rows()
                    .skip(self.next_row)
                    .take(end - self.next_row)
                    .filter_map(|row| row.get(*idx).and_then(cell_to_string))
                    .collect();
                Ok(Chunk::from_raw(index, raw))
            }
            None => Err(ExtractError::MissingField {
                field: COMMENTS_FIELD.to_string(),
                chunk: index,
            }),
        };
        self.next_row = end;
        self.next_index += 1;
        Some(item)
    }
}

/// A table read entirely in memory. Empty cells are None.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Reads a delimited file or the first worksheet of a spreadsheet. Text files are read as CSV.
pub fn read_table(path: &str) -> BFbResult<Table> {
    match ArtifactKind::from_path(path) {
        Some(ArtifactKind::DelimitedText { delimiter }) => read_delimited_table(path, delimiter),
        Some(ArtifactKind::LineText) => read_delimited_table(path, b','),
        Some(ArtifactKind::Spreadsheet) => {
            let wrange = first_sheet(path)?;
            let header = header_of(&wrange);
            let rows = wrange
                .rows()
                .skip(1)
                .map(|row| row.iter().map(cell_to_string).collect())
                .collect();
            Ok(Table { header, rows })
        }
        _ => Err(Box::new(FeedbackError::Extraction {
            source: ExtractError::UnsupportedFormat {
                name: io_common::simplify_file_name(path),
            },
        })),
    }
}

fn read_delimited_table(path: &str, delimiter: u8) -> BFbResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    collect_table(rdr)
}

/// Reads a CSV table held in memory, as downloaded or piped in.
pub fn table_from_csv_text(text: &str) -> BFbResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    collect_table(rdr)
}

fn collect_table<R: std::io::Read>(mut rdr: csv::Reader<R>) -> BFbResult<Table> {
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu {})?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record_r in rdr.records() {
        let record = record_r.context(CsvLineParseSnafu {})?;
        rows.push(
            record
                .iter()
                .map(|c| Some(c.to_string()).filter(|s| !s.trim().is_empty()))
                .collect(),
        );
    }
    Ok(Table { header, rows })
}
