mod config;
pub mod builder;
pub mod demographics;
pub mod manual;
pub mod sentiment;
pub mod taxonomy;
pub mod translation;

use log::{debug, info, warn};

pub use crate::config::*;
use crate::sentiment::SentimentModel;
use crate::taxonomy::Taxonomy;
use crate::translation::{TranslationCache, Translator};

/// One run of the translation and classification pipeline.
///
/// The translation cache belongs to the run: two pipelines never share translations.
pub struct Pipeline<'a> {
    rules: PipelineRules,
    taxonomy: Taxonomy,
    translator: &'a dyn Translator,
    model: &'a dyn SentimentModel,
    cache: TranslationCache,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        rules: &PipelineRules,
        taxonomy: &Taxonomy,
        translator: &'a dyn Translator,
        model: &'a dyn SentimentModel,
    ) -> Pipeline<'a> {
        Pipeline {
            rules: rules.clone(),
            taxonomy: taxonomy.clone(),
            translator,
            model,
            cache: TranslationCache::new(),
        }
    }

    pub fn rules(&self) -> &PipelineRules {
        &self.rules
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Processes the chunks in order and collects one row per comment.
    ///
    /// Chunks missing the comments field are skipped. Any other extraction error, or a
    /// sentiment failure under the `Abort` policy, ends the run: the rows collected so far are
    /// returned in the report along with the error.
    ///
    /// `progress` is called after each chunk with a non-decreasing value, capped at 1.0.
    pub fn run<I>(&mut self, chunks: I, progress: &mut dyn FnMut(Progress)) -> RunReport
    where
        I: IntoIterator<Item = Result<Chunk, ExtractError>>,
    {
        let mut results: Vec<ClassificationResult> = Vec::new();
        let mut skipped_chunks: usize = 0;
        let mut halted: Option<PipelineError> = None;

        for chunk_r in chunks {
            let chunk = match chunk_r {
                Ok(c) => c,
                Err(e @ ExtractError::MissingField { .. }) => {
                    warn!("run: skipping chunk: {}", e);
                    skipped_chunks += 1;
                    continue;
                }
                Err(e) => {
                    warn!("run: extraction stopped: {}", e);
                    halted = Some(PipelineError::Extraction(e));
                    break;
                }
            };
            debug!("run: chunk {} with {} comments", chunk.index, chunk.len());

            let outcome = self.process_chunk(&chunk, &mut results);
            progress(self.progress(results.len()));
            if let Err(e) = outcome {
                warn!("run: stopping after chunk {}: {}", chunk.index, e);
                halted = Some(e);
                break;
            }
        }

        info!(
            "run: {} rows processed, {} chunks skipped, {} cached translations",
            results.len(),
            skipped_chunks,
            self.cache.len()
        );
        RunReport {
            rows_processed: results.len(),
            results,
            skipped_chunks,
            cache_entries: self.cache.len(),
            cache_hits: self.cache.hits(),
            halted,
        }
    }

    /// Translates, classifies and scores each comment of the chunk. Rows are appended to `out`
    /// as they are produced, so they survive an abort in the middle of the chunk.
    fn process_chunk(
        &mut self,
        chunk: &Chunk,
        out: &mut Vec<ClassificationResult>,
    ) -> Result<(), PipelineError> {
        for comment in chunk.comments.iter() {
            let (original, translated) = match self.cache.translate(
                self.translator,
                Some(comment.as_str()),
                &self.rules.source_lang,
                &self.rules.target_lang,
            ) {
                Some(p) => p,
                // Blank entries never make it to a row.
                None => continue,
            };
            let department = self.taxonomy.classify(&translated).to_string();
            let sentiment = match sentiment::score(self.model, &translated) {
                Ok(s) => Some(s),
                Err(e) => match self.rules.sentiment_failure {
                    SentimentFailurePolicy::Abort => {
                        return Err(PipelineError::Sentiment {
                            comment: original,
                            source: e,
                        });
                    }
                    SentimentFailurePolicy::MarkRow => {
                        warn!("process_chunk: no sentiment for {:?}: {}", original, e);
                        None
                    }
                },
            };
            out.push(ClassificationResult {
                original,
                translated,
                department,
                sentiment,
            });
        }
        Ok(())
    }

    fn progress(&self, rows_processed: usize) -> Progress {
        let fraction = if self.rules.total_estimate == 0 {
            1.0
        } else {
            (rows_processed as f64 / self.rules.total_estimate as f64).min(1.0)
        };
        Progress {
            rows_processed,
            fraction,
        }
    }
}

/// Runs the pipeline over the chunks, without progress reporting.
pub fn run_pipeline<I>(
    chunks: I,
    rules: &PipelineRules,
    taxonomy: &Taxonomy,
    translator: &dyn Translator,
    model: &dyn SentimentModel,
) -> RunReport
where
    I: IntoIterator<Item = Result<Chunk, ExtractError>>,
{
    let mut pipeline = Pipeline::new(rules, taxonomy, translator, model);
    pipeline.run(chunks, &mut |_| {})
}
