use log::debug;
use std::collections::HashSet;

use crate::config::{Confidence, SentimentError, SentimentLabel, SentimentScore};

/// The output of a model, before normalization.
#[derive(PartialEq, Debug, Clone)]
pub struct RawPrediction {
    pub label: String,
    pub score: f64,
}

/// A binary sentiment model.
pub trait SentimentModel {
    fn predict(&self, text: &str) -> Result<RawPrediction, SentimentError>;
}

/// Scores a (translated) comment.
///
/// The label is normalized to the closed set of labels and the confidence is rounded to
/// 2 decimal digits.
pub fn score(model: &dyn SentimentModel, text: &str) -> Result<SentimentScore, SentimentError> {
    let raw = model.predict(text)?;
    let label = SentimentLabel::parse(&raw.label).ok_or(SentimentError::UnknownLabel {
        label: raw.label.clone(),
    })?;
    let confidence =
        Confidence::new(raw.score).ok_or(SentimentError::InvalidScore { score: raw.score })?;
    debug!("score: {:?} -> {} {}", text, label, confidence);
    Ok(SentimentScore { label, confidence })
}

/// A word-list model that runs offline.
///
/// The score is the share of the winning polarity among the polarized words. A comment without
/// any polarized word is reported as positive with a confidence of 0.5.
#[derive(Debug, Clone)]
pub struct LexiconModel {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl LexiconModel {
    pub fn new<S: AsRef<str>>(positive: &[S], negative: &[S]) -> LexiconModel {
        let norm = |ws: &[S]| -> HashSet<String> {
            ws.iter().map(|w| w.as_ref().trim().to_lowercase()).collect()
        };
        LexiconModel {
            positive: norm(positive),
            negative: norm(negative),
        }
    }
}

impl Default for LexiconModel {
    fn default() -> Self {
        LexiconModel::new(POSITIVE_WORDS, NEGATIVE_WORDS)
    }
}

impl SentimentModel for LexiconModel {
    fn predict(&self, text: &str) -> Result<RawPrediction, SentimentError> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .collect();
        let pos = words.iter().filter(|w| self.positive.contains(**w)).count();
        let neg = words.iter().filter(|w| self.negative.contains(**w)).count();
        let total = pos + neg;
        if total == 0 {
            return Ok(RawPrediction {
                label: "POSITIVE".to_string(),
                score: 0.5,
            });
        }
        let ratio = pos as f64 / total as f64;
        let res = if pos >= neg {
            RawPrediction {
                label: "POSITIVE".to_string(),
                score: ratio,
            }
        } else {
            RawPrediction {
                label: "NEGATIVE".to_string(),
                score: 1.0 - ratio,
            }
        };
        Ok(res)
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb", "outstanding",
    "brilliant", "love", "loved", "best", "better", "happy", "beautiful", "perfect", "awesome",
    "pleasant", "satisfied", "recommend", "impressive", "exceptional", "efficient", "helpful",
    "reliable", "clean", "comfortable", "friendly", "kind", "organized", "smooth", "delicious",
    "fresh", "spacious", "quick", "thank", "thanks", "grateful", "blessed", "easy", "nice",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate", "disappointing",
    "disappointed", "failure", "failed", "unhappy", "angry", "frustrated", "frustrating",
    "problem", "problems", "broken", "dirty", "rude", "late", "slow", "delay", "delays",
    "crowded", "difficult", "confusing", "expensive", "unclean", "smelly", "cold", "stale",
    "noisy", "lost", "chaos", "missed", "waiting", "uncomfortable", "unprofessional",
];
