pub use crate::config::*;

use crate::sentiment::SentimentModel;
use crate::taxonomy::Taxonomy;
use crate::translation::Translator;

/// A builder for comments entered by hand, bypassing the extractors.
///
/// All the comments end up in a single chunk.
///
/// ```
/// use feedback_pipeline::builder::Builder;
/// use feedback_pipeline::sentiment::LexiconModel;
/// use feedback_pipeline::translation::PassthroughTranslator;
/// use feedback_pipeline::PipelineRules;
///
/// let mut builder = Builder::new(&PipelineRules::default());
/// builder.add_comment("The bus was late");
/// builder.add_lines("Lovely food\n\n   \nThe staff were rude");
///
/// let report = builder.run(&PassthroughTranslator, &LexiconModel::default());
/// assert_eq!(report.results.len(), 3);
/// assert_eq!(report.results[0].department, "Transport & Travel");
/// ```
pub struct Builder {
    pub(crate) _rules: PipelineRules,
    pub(crate) _taxonomy: Taxonomy,
    pub(crate) _comments: Vec<String>,
}

impl Builder {
    pub fn new(rules: &PipelineRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _taxonomy: Taxonomy::default(),
            _comments: Vec::new(),
        }
    }

    pub fn taxonomy(self, taxonomy: &Taxonomy) -> Builder {
        Builder {
            _rules: self._rules,
            _taxonomy: taxonomy.clone(),
            _comments: self._comments,
        }
    }

    /// Adds one comment. Blank comments are ignored.
    pub fn add_comment(&mut self, comment: &str) {
        let c = comment.trim();
        if !c.is_empty() {
            self._comments.push(c.to_string());
        }
    }

    /// Adds one comment per line of the text.
    pub fn add_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.add_comment(line);
        }
    }

    pub fn len(&self) -> usize {
        self._comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self._comments.is_empty()
    }

    /// The single chunk holding all the comments.
    pub fn chunk(&self) -> Chunk {
        Chunk::from_raw(0, &self._comments)
    }

    pub fn run(&self, translator: &dyn Translator, model: &dyn SentimentModel) -> RunReport {
        crate::run_pipeline(
            vec![Ok(self.chunk())],
            &self._rules,
            &self._taxonomy,
            translator,
            model,
        )
    }
}
