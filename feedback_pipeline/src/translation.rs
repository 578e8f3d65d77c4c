use log::{debug, warn};
use std::collections::HashMap;

use crate::config::{TranslationError, TRANSLATION_ERROR_PREFIX};

/// A translation service.
pub trait Translator {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// Returns the text unchanged. Useful when the comments are already in the target language.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl Translator for PassthroughTranslator {
    fn translate(&self, text: &str, _: &str, _: &str) -> Result<String, TranslationError> {
        Ok(text.to_string())
    }
}

/// Memoizes the translations for the duration of one run.
///
/// The key is the trimmed original text only: once a text is cached, a request with another
/// target language returns the cached value.
/// Failures are cached too, as `Error: <message>`.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<String, String>,
    hits: usize,
}

impl TranslationCache {
    pub fn new() -> TranslationCache {
        TranslationCache::default()
    }

    /// Returns `(original, translated)`, or None for an empty input. The translator is not
    /// called for empty inputs or for texts already in the cache.
    pub fn translate(
        &mut self,
        translator: &dyn Translator,
        text: Option<&str>,
        source_lang: &str,
        target_lang: &str,
    ) -> Option<(String, String)> {
        let text = text?.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(cached) = self.entries.get(text) {
            self.hits += 1;
            return Some((text.to_string(), cached.clone()));
        }
        let translated = match translator.translate(text, source_lang, target_lang) {
            Ok(t) => t,
            Err(e) => {
                warn!("translate: failed to translate {:?}: {}", text, e);
                format!("{}{}", TRANSLATION_ERROR_PREFIX, e)
            }
        };
        debug!("translate: {:?} -> {:?}", text, translated);
        self.entries.insert(text.to_string(), translated.clone());
        Some((text.to_string(), translated))
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.entries.get(text.trim()).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// The number of calls to the translator. Every miss adds an entry.
    pub fn misses(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Upper-cases the text and records the calls. Fails for the texts in `failing`.
    #[derive(Default)]
    pub(crate) struct RecordingTranslator {
        pub calls: RefCell<Vec<(String, String, String)>>,
        pub failing: Vec<String>,
    }

    impl Translator for RecordingTranslator {
        fn translate(&self, text: &str, src: &str, dest: &str) -> Result<String, TranslationError> {
            self.calls
                .borrow_mut()
                .push((text.to_string(), src.to_string(), dest.to_string()));
            if self.failing.iter().any(|f| f == text) {
                return Err(TranslationError {
                    message: "service unavailable".to_string(),
                });
            }
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn translates_once_per_text() {
        let tr = RecordingTranslator::default();
        let mut cache = TranslationCache::new();
        let a = cache.translate(&tr, Some("merci"), "auto", "en");
        let b = cache.translate(&tr, Some("  merci "), "auto", "en");
        assert_eq!(a, Some(("merci".to_string(), "MERCI".to_string())));
        assert_eq!(a, b);
        assert_eq!(tr.calls.borrow().len(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn empty_inputs_skip_the_translator() {
        let tr = RecordingTranslator::default();
        let mut cache = TranslationCache::new();
        assert_eq!(cache.translate(&tr, None, "auto", "en"), None);
        assert_eq!(cache.translate(&tr, Some(""), "auto", "en"), None);
        assert_eq!(cache.translate(&tr, Some(" \t "), "auto", "en"), None);
        assert!(tr.calls.borrow().is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn failures_are_cached_as_sentinels() {
        let tr = RecordingTranslator {
            failing: vec!["foo".to_string()],
            ..Default::default()
        };
        let mut cache = TranslationCache::new();
        let (_, t) = cache.translate(&tr, Some("foo"), "auto", "en").unwrap();
        assert_eq!(t, "Error: service unavailable");
        let (_, t2) = cache.translate(&tr, Some("foo"), "auto", "en").unwrap();
        assert_eq!(t, t2);
        assert_eq!(tr.calls.borrow().len(), 1);
        let (_, t3) = cache.translate(&tr, Some("bar"), "auto", "en").unwrap();
        assert_eq!(t3, "BAR");
    }

    #[test]
    fn target_language_is_not_part_of_the_key() {
        let tr = RecordingTranslator::default();
        let mut cache = TranslationCache::new();
        cache.translate(&tr, Some("hola"), "auto", "en");
        let (_, t) = cache.translate(&tr, Some("hola"), "auto", "fr").unwrap();
        assert_eq!(t, "HOLA");
        assert_eq!(tr.calls.borrow().len(), 1);
        assert_eq!(tr.calls.borrow()[0].2, "en");
    }
}
