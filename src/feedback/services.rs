// HTTP clients for the translation service and the sentiment model.

use std::time::Duration;

use serde::Deserialize;

use feedback_pipeline::sentiment::{LexiconModel, RawPrediction, SentimentModel};
use feedback_pipeline::translation::{PassthroughTranslator, Translator};

use crate::feedback::config_reader::*;
use crate::feedback::*;

fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

/// A LibreTranslate compatible service.
pub struct HttpTranslator {
    agent: ureq::Agent,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TranslateReply {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl HttpTranslator {
    pub fn new(endpoint: &str, api_key: Option<&str>, timeout: Duration) -> HttpTranslator {
        HttpTranslator {
            agent: agent(timeout),
            endpoint: endpoint.to_string(),
            api_key: api_key.map(|s| s.to_string()),
        }
    }
}

impl Translator for HttpTranslator {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let mut body = json!({
            "q": text,
            "source": source_lang,
            "target": target_lang,
            "format": "text",
        });
        if let Some(k) = &self.api_key {
            body["api_key"] = json!(k);
        }
        let reply: TranslateReply = self
            .agent
            .post(&self.endpoint)
            .send_json(body)
            .map_err(|e| TranslationError {
                message: e.to_string(),
            })?
            .into_json()
            .map_err(|e| TranslationError {
                message: format!("invalid reply from {}: {}", self.endpoint, e),
            })?;
        Ok(reply.translated_text)
    }
}

/// A text classification service answering in the Hugging Face inference format.
pub struct HttpSentimentModel {
    agent: ureq::Agent,
    endpoint: String,
    api_token: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum PredictReply {
    Nested(Vec<Vec<RawLabel>>),
    Flat(Vec<RawLabel>),
}

#[derive(Deserialize, Debug, Clone)]
struct RawLabel {
    label: String,
    score: f64,
}

impl HttpSentimentModel {
    pub fn new(endpoint: &str, api_token: Option<&str>, timeout: Duration) -> HttpSentimentModel {
        HttpSentimentModel {
            agent: agent(timeout),
            endpoint: endpoint.to_string(),
            api_token: api_token.map(|s| s.to_string()),
        }
    }
}

/// Keeps the label with the highest score.
fn best_label(reply: PredictReply) -> Option<RawLabel> {
    let labels = match reply {
        PredictReply::Nested(l) => l.into_iter().next().unwrap_or_default(),
        PredictReply::Flat(l) => l,
    };
    labels
        .into_iter()
        .fold(None, |best: Option<RawLabel>, l| match best {
            Some(b) if b.score >= l.score => Some(b),
            _ => Some(l),
        })
}

impl SentimentModel for HttpSentimentModel {
    fn predict(&self, text: &str) -> Result<RawPrediction, SentimentError> {
        let mut req = self.agent.post(&self.endpoint);
        if let Some(t) = &self.api_token {
            req = req.set("Authorization", &format!("Bearer {}", t));
        }
        let reply: PredictReply = req
            .send_json(json!({ "inputs": text }))
            .map_err(|e| SentimentError::Model {
                message: e.to_string(),
            })?
            .into_json()
            .map_err(|e| SentimentError::Model {
                message: format!("invalid reply from {}: {}", self.endpoint, e),
            })?;
        let best = best_label(reply).ok_or_else(|| SentimentError::Model {
            message: format!("empty reply from {}", self.endpoint),
        })?;
        Ok(RawPrediction {
            label: best.label,
            score: best.score,
        })
    }
}

/// Downloads a text document, such as a CSV export.
pub fn fetch_text(url: &str, timeout: Duration) -> BFbResult<String> {
    info!("fetch_text: downloading {}", url);
    let text = agent(timeout)
        .get(url)
        .call()
        .context(FetchingSnafu { url })?
        .into_string()
        .context(ReadingReplySnafu { url })?;
    debug!("fetch_text: {} bytes from {}", text.len(), url);
    Ok(text)
}

pub fn make_translator(settings: &TranslationSettings) -> BFbResult<Box<dyn Translator>> {
    match settings.provider {
        TranslationProvider::Passthrough => {
            info!("make_translator: the comments are not translated");
            Ok(Box::new(PassthroughTranslator))
        }
        TranslationProvider::Http => {
            let endpoint = settings
                .endpoint
                .as_deref()
                .context(MissingEndpointSnafu {
                    service: "translation",
                })?;
            info!("make_translator: using {}", endpoint);
            Ok(Box::new(HttpTranslator::new(
                endpoint,
                settings.api_key.as_deref(),
                settings.timeout,
            )))
        }
    }
}

pub fn make_sentiment_model(settings: &SentimentSettings) -> BFbResult<Box<dyn SentimentModel>> {
    match settings.provider {
        SentimentProvider::Lexicon => {
            info!("make_sentiment_model: using the built-in lexicon");
            Ok(Box::new(LexiconModel::default()))
        }
        SentimentProvider::Http => {
            let endpoint = settings
                .endpoint
                .as_deref()
                .context(MissingEndpointSnafu {
                    service: "sentiment",
                })?;
            info!("make_sentiment_model: using {}", endpoint);
            Ok(Box::new(HttpSentimentModel::new(
                endpoint,
                settings.api_token.as_deref(),
                settings.timeout,
            )))
        }
    }
}
