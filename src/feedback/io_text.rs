// Primitives for line-oriented documents: plain text and PDF.

use std::fs;

use log::debug;

use feedback_pipeline::{Chunk, ExtractError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Text,
    Pdf,
}

/// The whole document as a single chunk, one comment per non-blank line.
pub struct LineChunks {
    path: String,
    kind: DocumentKind,
    done: bool,
}

impl LineChunks {
    pub fn text(path: &str) -> LineChunks {
        LineChunks {
            path: path.to_string(),
            kind: DocumentKind::Text,
            done: false,
        }
    }

    pub fn pdf(path: &str) -> LineChunks {
        LineChunks {
            path: path.to_string(),
            kind: DocumentKind::Pdf,
            done: false,
        }
    }

    fn read(&self) -> Result<String, ExtractError> {
        let res = match self.kind {
            DocumentKind::Text => fs::read_to_string(&self.path).map_err(|e| e.to_string()),
            DocumentKind::Pdf => pdf_extract::extract_text(&self.path).map_err(|e| e.to_string()),
        };
        res.map_err(|message| ExtractError::Read {
            message: format!("{}: {}", self.path, message),
        })
    }
}

impl Iterator for LineChunks {
    type Item = Result<Chunk, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.done = true;
        let res = self.read().map(|text| Chunk::from_lines(0, &text));
        if let Ok(c) = &res {
            debug!("LineChunks: {} lines in {}", c.len(), self.path);
        }
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_chunk_of_lines() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("notes.txt");
        fs::write(&p, "The bus was late\n\n   \r\nLovely food  \n").unwrap();
        let chunks: Vec<_> = LineChunks::text(&p.display().to_string()).collect();
        assert_eq!(
            chunks,
            vec![Ok(Chunk {
                index: 0,
                comments: vec!["The bus was late".to_string(), "Lovely food".to_string()]
            })]
        );
    }

    #[test]
    fn unreadable_documents() {
        let chunks: Vec<_> = LineChunks::pdf("/nonexistent/report.pdf").collect();
        assert_eq!(chunks.len(), 1);
        assert!(matches!(chunks[0], Err(ExtractError::Read { .. })));
    }
}
