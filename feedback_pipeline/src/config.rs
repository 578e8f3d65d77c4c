// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The name of the field that carries the free-text comments in tabular inputs.
pub const COMMENTS_FIELD: &str = "Comments";

/// The default number of comments in a chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// The default ceiling used to approximate the progress of a run.
pub const DEFAULT_TOTAL_ESTIMATE: usize = 1_000_000;

/// Prefix of the cached value when the translation service failed.
pub const TRANSLATION_ERROR_PREFIX: &str = "Error: ";

/// A bounded batch of comments, as produced by an extractor.
///
/// The boundaries of a chunk carry no meaning: the same comments split
/// differently produce the same results.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Chunk {
    /// Position of the chunk in the sequence produced by the extractor.
    pub index: usize,
    pub comments: Vec<String>,
}

impl Chunk {
    /// Builds a chunk from raw entries. The entries are trimmed and the empty ones dropped.
    pub fn from_raw<I, S>(index: usize, raw: I) -> Chunk
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let comments = raw
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Chunk { index, comments }
    }

    /// Splits a text blob on line boundaries into a single chunk.
    pub fn from_lines(index: usize, text: &str) -> Chunk {
        Chunk::from_raw(index, text.lines())
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

// ******** Output data structures *********

/// The categorical output of the binary sentiment model.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    /// Normalizes the label returned by a model.
    ///
    /// Accepts the common spellings of the binary classifiers (`POSITIVE`, `LABEL_1`, `pos`...).
    pub fn parse(label: &str) -> Option<SentimentLabel> {
        match label.trim().to_lowercase().as_str() {
            "positive" | "pos" | "label_1" | "1" => Some(SentimentLabel::Positive),
            "negative" | "neg" | "label_0" | "0" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
        }
    }
}

impl Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A probability in [0, 1], rounded to 2 decimal digits.
#[derive(PartialEq, Debug, Clone, Copy, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);

    /// Returns None if the value is not a probability.
    pub fn new(p: f64) -> Option<Confidence> {
        if p.is_finite() && (0.0..=1.0).contains(&p) {
            Some(Confidence((p * 100.0).round() / 100.0))
        } else {
            None
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    pub confidence: Confidence,
}

/// One row of the output table.
#[derive(PartialEq, Debug, Clone)]
pub struct ClassificationResult {
    pub original: String,
    /// The translated text, or `Error: <message>` if the translation failed.
    pub translated: String,
    pub department: String,
    /// None when the sentiment model failed and the row was kept anyway.
    pub sentiment: Option<SentimentScore>,
}

impl ClassificationResult {
    pub fn translation_failed(&self) -> bool {
        self.translated.starts_with(TRANSLATION_ERROR_PREFIX)
    }

    /// The label as written in the output table.
    pub fn sentiment_label(&self) -> &'static str {
        match &self.sentiment {
            Some(s) => s.label.as_str(),
            None => "ERROR",
        }
    }

    pub fn confidence(&self) -> Confidence {
        self.sentiment
            .map(|s| s.confidence)
            .unwrap_or(Confidence::ZERO)
    }
}

/// Progress of a run, reported after each chunk.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Progress {
    pub rows_processed: usize,
    /// `rows_processed / total_estimate`, capped at 1.0.
    pub fraction: f64,
}

/// What happened during a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: Vec<ClassificationResult>,
    pub rows_processed: usize,
    pub skipped_chunks: usize,
    pub cache_entries: usize,
    pub cache_hits: usize,
    /// The error that ended the run early. The results collected before are kept.
    pub halted: Option<PipelineError>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }
}

/// Errors raised while reading the comments out of an artifact.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ExtractError {
    /// The kind of the artifact could not be inferred from its name.
    UnsupportedFormat { name: String },
    /// The chunk does not have the comments field. Only this chunk is skipped.
    MissingField { field: String, chunk: usize },
    /// The artifact could not be read. No more chunks will follow.
    Read { message: String },
}

impl Error for ExtractError {}

impl Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::UnsupportedFormat { name } => {
                write!(f, "Unsupported file format: {}", name)
            }
            ExtractError::MissingField { field, chunk } => {
                write!(f, "Chunk {}: missing field {:?}", chunk, field)
            }
            ExtractError::Read { message } => write!(f, "Failed to read input: {}", message),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TranslationError {
    pub message: String,
}

impl Error for TranslationError {}

impl Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum SentimentError {
    /// The model could not be reached or returned garbage.
    Model { message: String },
    UnknownLabel { label: String },
    InvalidScore { score: f64 },
}

impl Error for SentimentError {}

impl Display for SentimentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentError::Model { message } => write!(f, "Sentiment model failed: {}", message),
            SentimentError::UnknownLabel { label } => {
                write!(f, "Unknown sentiment label {:?}", label)
            }
            SentimentError::InvalidScore { score } => {
                write!(f, "Sentiment score {} is not a probability", score)
            }
        }
    }
}

/// Errors that end a run before all the chunks are processed.
#[derive(PartialEq, Debug, Clone)]
pub enum PipelineError {
    Extraction(ExtractError),
    Sentiment {
        comment: String,
        source: SentimentError,
    },
}

impl Error for PipelineError {}

impl Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Extraction(e) => write!(f, "{}", e),
            PipelineError::Sentiment { comment, source } => {
                write!(f, "{} (comment: {:?})", source, comment)
            }
        }
    }
}

// ********* Configuration **********

/// What to do with a row when the sentiment model fails.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SentimentFailurePolicy {
    /// Stop the run. The rows already processed are kept.
    Abort,
    /// Keep the row without a sentiment and continue.
    MarkRow,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PipelineRules {
    pub chunk_size: usize,
    /// Ceiling for the progress computation. It is not the true number of rows.
    pub total_estimate: usize,
    pub source_lang: String,
    pub target_lang: String,
    pub sentiment_failure: SentimentFailurePolicy,
}

impl Default for PipelineRules {
    fn default() -> Self {
        PipelineRules {
            chunk_size: DEFAULT_CHUNK_SIZE,
            total_estimate: DEFAULT_TOTAL_ESTIMATE,
            source_lang: "auto".to_string(),
            target_lang: "en".to_string(),
            sentiment_failure: SentimentFailurePolicy::Abort,
        }
    }
}
