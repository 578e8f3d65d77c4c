use crate::feedback::*;

use std::time::Duration;

use feedback_pipeline::taxonomy::{Department, Taxonomy, GENERAL_SERVICES};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputSettings {
    #[serde(rename = "chunkSize")]
    pub chunk_size: Option<usize>,
    #[serde(rename = "totalRowsEstimate")]
    pub total_rows_estimate: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranslationConfig {
    pub provider: Option<String>,
    pub endpoint: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    #[serde(rename = "sourceLang")]
    pub source_lang: Option<String>,
    #[serde(rename = "targetLang")]
    pub target_lang: Option<String>,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SentimentConfig {
    pub provider: Option<String>,
    pub endpoint: Option<String>,
    #[serde(rename = "apiToken")]
    pub api_token: Option<String>,
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
    #[serde(rename = "onError")]
    pub on_error: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentConfig {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeedbackConfig {
    #[serde(rename = "inputSettings")]
    pub input_settings: Option<InputSettings>,
    pub translation: Option<TranslationConfig>,
    pub sentiment: Option<SentimentConfig>,
    pub departments: Option<Vec<DepartmentConfig>>,
    #[serde(rename = "catchAll")]
    pub catch_all: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TranslationProvider {
    Passthrough,
    Http,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TranslationSettings {
    pub provider: TranslationProvider,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SentimentProvider {
    Lexicon,
    Http,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SentimentSettings {
    pub provider: SentimentProvider,
    pub endpoint: Option<String>,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

/// Everything the classify command needs, after merging the configuration file and the
/// command line.
#[derive(Debug, Clone)]
pub struct ClassifySettings {
    pub rules: PipelineRules,
    pub taxonomy: Taxonomy,
    pub translation: TranslationSettings,
    pub sentiment: SentimentSettings,
}

pub fn read_config(path: &str) -> BFbResult<FeedbackConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: FeedbackConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

fn translation_provider(s: &str) -> FbResult<TranslationProvider> {
    match s.trim().to_lowercase().as_str() {
        "none" | "passthrough" => Ok(TranslationProvider::Passthrough),
        "http" => Ok(TranslationProvider::Http),
        x => whatever!("unknown translation provider: {}", x),
    }
}

fn sentiment_provider(s: &str) -> FbResult<SentimentProvider> {
    match s.trim().to_lowercase().as_str() {
        "lexicon" => Ok(SentimentProvider::Lexicon),
        "http" => Ok(SentimentProvider::Http),
        x => whatever!("unknown sentiment provider: {}", x),
    }
}

fn failure_policy(s: &str) -> FbResult<SentimentFailurePolicy> {
    match s.trim().to_lowercase().as_str() {
        "abort" => Ok(SentimentFailurePolicy::Abort),
        "mark" => Ok(SentimentFailurePolicy::MarkRow),
        x => whatever!("unknown sentiment error policy: {} (expected abort or mark)", x),
    }
}

fn positive_chunk_size(n: usize) -> FbResult<usize> {
    if n == 0 {
        whatever!("the chunk size must be positive");
    }
    Ok(n)
}

fn taxonomy_of(config: &FeedbackConfig) -> FbResult<Taxonomy> {
    let catch_all = config.catch_all.as_deref().unwrap_or(GENERAL_SERVICES);
    match &config.departments {
        None => Ok(Taxonomy::new(
            Taxonomy::pilgrimage().departments().to_vec(),
            catch_all,
        )),
        Some(l) if l.is_empty() => whatever!("the list of departments is empty"),
        Some(l) => {
            let deps: Vec<Department> = l
                .iter()
                .map(|d| Department::new(d.name.trim(), d.keywords.as_slice()))
                .collect();
            Ok(Taxonomy::new(deps, catch_all))
        }
    }
}

/// Merges the configuration file and the command line. The command line wins.
pub fn resolve_classify(config: &FeedbackConfig, args: &ClassifyArgs) -> BFbResult<ClassifySettings> {
    let input = config.input_settings.clone().unwrap_or_default();
    let tr = config.translation.clone().unwrap_or_default();
    let se = config.sentiment.clone().unwrap_or_default();
    let defaults = PipelineRules::default();

    let chunk_size = positive_chunk_size(
        args.chunk_size
            .or(input.chunk_size)
            .unwrap_or(defaults.chunk_size),
    )?;

    let sentiment_failure = match args.on_sentiment_error.as_ref().or(se.on_error.as_ref()) {
        Some(s) => failure_policy(s)?,
        None => defaults.sentiment_failure,
    };

    let rules = PipelineRules {
        chunk_size,
        total_estimate: input.total_rows_estimate.unwrap_or(defaults.total_estimate),
        source_lang: args
            .source_lang
            .clone()
            .or(tr.source_lang)
            .unwrap_or(defaults.source_lang),
        target_lang: args
            .target_lang
            .clone()
            .or(tr.target_lang)
            .unwrap_or(defaults.target_lang),
        sentiment_failure,
    };

    // Without an explicit provider, a configured endpoint selects the HTTP service.
    let translation = TranslationSettings {
        provider: match args.translator.as_ref().or(tr.provider.as_ref()) {
            Some(s) => translation_provider(s)?,
            None if tr.endpoint.is_some() => TranslationProvider::Http,
            None => TranslationProvider::Passthrough,
        },
        endpoint: tr.endpoint,
        api_key: tr.api_key,
        timeout: Duration::from_secs(tr.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    };
    let sentiment = SentimentSettings {
        provider: match args.sentiment.as_ref().or(se.provider.as_ref()) {
            Some(s) => sentiment_provider(s)?,
            None if se.endpoint.is_some() => SentimentProvider::Http,
            None => SentimentProvider::Lexicon,
        },
        endpoint: se.endpoint,
        api_token: se.api_token,
        timeout: Duration::from_secs(se.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    };

    Ok(ClassifySettings {
        rules,
        taxonomy: taxonomy_of(config)?,
        translation,
        sentiment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_args() -> ClassifyArgs {
        ClassifyArgs {
            input: None,
            text: None,
            out: None,
            reference: None,
            summary: None,
            chunk_size: None,
            source_lang: None,
            target_lang: None,
            translator: None,
            sentiment: None,
            on_sentiment_error: None,
            preview: None,
        }
    }

    #[test]
    fn parse_full_config() {
        let js = r#"{
            "inputSettings": {"chunkSize": 500, "totalRowsEstimate": 2000},
            "translation": {"endpoint": "http://localhost:5000/translate", "targetLang": "fr"},
            "sentiment": {"provider": "lexicon", "onError": "mark"},
            "departments": [{"name": " Transport ", "keywords": ["Bus", "driver"]}],
            "catchAll": "Other"
        }"#;
        let config: FeedbackConfig = serde_json::from_str(js).unwrap();
        let s = resolve_classify(&config, &no_args()).unwrap();
        assert_eq!(s.rules.chunk_size, 500);
        assert_eq!(s.rules.total_estimate, 2000);
        assert_eq!(s.rules.source_lang, "auto");
        assert_eq!(s.rules.target_lang, "fr");
        assert_eq!(s.rules.sentiment_failure, SentimentFailurePolicy::MarkRow);
        assert_eq!(s.translation.provider, TranslationProvider::Http);
        assert_eq!(s.translation.timeout, Duration::from_secs(30));
        assert_eq!(s.sentiment.provider, SentimentProvider::Lexicon);
        assert_eq!(s.taxonomy.labels(), vec!["Transport", "Other"]);
        assert_eq!(s.taxonomy.classify("the bus"), "Transport");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let s = resolve_classify(&FeedbackConfig::default(), &no_args()).unwrap();
        assert_eq!(s.rules, PipelineRules::default());
        assert_eq!(s.translation.provider, TranslationProvider::Passthrough);
        assert_eq!(s.sentiment.provider, SentimentProvider::Lexicon);
        assert_eq!(s.taxonomy, Taxonomy::pilgrimage());
    }

    #[test]
    fn command_line_wins() {
        let config: FeedbackConfig =
            serde_json::from_str(r#"{"sentiment": {"onError": "mark"}, "inputSettings": {"chunkSize": 3}}"#)
                .unwrap();
        let mut args = no_args();
        args.on_sentiment_error = Some("abort".to_string());
        args.chunk_size = Some(7);
        args.translator = Some("none".to_string());
        let s = resolve_classify(&config, &args).unwrap();
        assert_eq!(s.rules.sentiment_failure, SentimentFailurePolicy::Abort);
        assert_eq!(s.rules.chunk_size, 7);
    }

    #[test]
    fn bad_values() {
        let mut args = no_args();
        args.sentiment = Some("oracle".to_string());
        assert!(resolve_classify(&FeedbackConfig::default(), &args).is_err());

        let mut args = no_args();
        args.chunk_size = Some(0);
        assert!(resolve_classify(&FeedbackConfig::default(), &args).is_err());

        let config: FeedbackConfig = serde_json::from_str(r#"{"departments": []}"#).unwrap();
        assert!(resolve_classify(&config, &no_args()).is_err());
    }
}
