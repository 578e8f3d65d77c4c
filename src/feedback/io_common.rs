// The kinds of artifacts and the dispatch to their readers.

use log::warn;
use std::path::Path;

use feedback_pipeline::{Chunk, ExtractError};

use crate::feedback::{io_csv, io_excel, io_json, io_text};

/// The kinds of artifacts the comments can be read from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ArtifactKind {
    DelimitedText { delimiter: u8 },
    Spreadsheet,
    RecordList,
    LineText,
    Document,
}

impl ArtifactKind {
    /// Infers the kind from the suffix of the file name. Returns None for unsupported suffixes.
    pub fn from_path(path: &str) -> Option<ArtifactKind> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())?;
        match ext.as_str() {
            "csv" => Some(ArtifactKind::DelimitedText { delimiter: b',' }),
            "tsv" => Some(ArtifactKind::DelimitedText { delimiter: b'\t' }),
            "xlsx" | "xls" | "ods" => Some(ArtifactKind::Spreadsheet),
            "json" => Some(ArtifactKind::RecordList),
            "txt" => Some(ArtifactKind::LineText),
            "pdf" => Some(ArtifactKind::Document),
            _ => None,
        }
    }
}

/// A lazy sequence of chunks of comments.
pub type CommentChunks = Box<dyn Iterator<Item = Result<Chunk, ExtractError>>>;

/// Returns the chunks of comments contained in the file.
///
/// Nothing is read before the first chunk is requested. An unsupported file produces a single
/// `UnsupportedFormat` error.
pub fn extract_comments(path: &str, chunk_size: usize) -> CommentChunks {
    let chunk_size = chunk_size.max(1);
    match ArtifactKind::from_path(path) {
        Some(ArtifactKind::DelimitedText { delimiter }) => {
            Box::new(io_csv::CsvChunks::new(path, delimiter, chunk_size))
        }
        Some(ArtifactKind::Spreadsheet) => Box::new(io_excel::SpreadsheetChunks::new(
            path, chunk_size,
        )),
        Some(ArtifactKind::RecordList) => Box::new(io_json::RecordChunks::new(path, chunk_size)),
        Some(ArtifactKind::LineText) => Box::new(io_text::LineChunks::text(path)),
        Some(ArtifactKind::Document) => Box::new(io_text::LineChunks::pdf(path)),
        None => {
            warn!("extract_comments: unsupported file format: {}", path);
            Box::new(std::iter::once(Err(ExtractError::UnsupportedFormat {
                name: simplify_file_name(path),
            })))
        }
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Finds a column by name. The header cells are trimmed, the comparison is case-sensitive.
pub fn find_column<S: AsRef<str>>(header: &[S], name: &str) -> Option<usize> {
    header.iter().position(|h| h.as_ref().trim() == name)
}

/// The text of a spreadsheet cell. Empty cells give None.
pub fn cell_to_string(cell: &calamine::DataType) -> Option<String> {
    match cell {
        calamine::DataType::Empty => None,
        calamine::DataType::String(s) => Some(s.clone()),
        calamine::DataType::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        calamine::DataType::Float(f) => Some(f.to_string()),
        calamine::DataType::Int(i) => Some(i.to_string()),
        calamine::DataType::Bool(b) => Some(b.to_string()),
        calamine::DataType::DateTime(f) => Some(f.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_from_suffix() {
        assert_eq!(
            ArtifactKind::from_path("a/b/Feedback.CSV"),
            Some(ArtifactKind::DelimitedText { delimiter: b',' })
        );
        assert_eq!(
            ArtifactKind::from_path("x.tsv"),
            Some(ArtifactKind::DelimitedText { delimiter: b'\t' })
        );
        assert_eq!(
            ArtifactKind::from_path("x.ods"),
            Some(ArtifactKind::Spreadsheet)
        );
        assert_eq!(ArtifactKind::from_path("x.json"), Some(ArtifactKind::RecordList));
        assert_eq!(ArtifactKind::from_path("x.txt"), Some(ArtifactKind::LineText));
        assert_eq!(ArtifactKind::from_path("x.pdf"), Some(ArtifactKind::Document));
        assert_eq!(ArtifactKind::from_path("x.docx"), None);
        assert_eq!(ArtifactKind::from_path("noext"), None);
    }

    #[test]
    fn unsupported_files_yield_one_error() {
        let chunks: Vec<_> = extract_comments("/tmp/notes.docx", 10).collect();
        assert_eq!(
            chunks,
            vec![Err(ExtractError::UnsupportedFormat {
                name: "notes.docx".to_string()
            })]
        );
    }

    #[test]
    fn header_lookup_is_trimmed_and_case_sensitive() {
        let header = vec!["id", " Comments ", "comments"];
        assert_eq!(find_column(&header, "Comments"), Some(1));
        assert_eq!(find_column(&header, "COMMENTS"), None);
    }

    #[test]
    fn cells() {
        use calamine::DataType;
        assert_eq!(cell_to_string(&DataType::Empty), None);
        assert_eq!(cell_to_string(&DataType::Float(42.0)), Some("42".to_string()));
        assert_eq!(cell_to_string(&DataType::Float(4.5)), Some("4.5".to_string()));
        assert_eq!(
            cell_to_string(&DataType::String("ok".to_string())),
            Some("ok".to_string())
        );
    }
}
