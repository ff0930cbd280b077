use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::normalizer::{Lowercase, Normalizer, SpaceBetweenDigits, Unaccent};
use crate::tokenizer::{Chain, Edge, Tokenizer, Whitespace, Whole};

/// A text analysis pipeline: normalizers run left to right over the raw text,
/// then one tokenizer turns the result into terms.
///
/// An analyzer may carry a separate query-time tokenizer. Autocomplete fields
/// index every edge prefix but look up the user's words as typed, otherwise a
/// query for "john" would also match anything starting with "j".
#[derive(Clone)]
pub struct Analyzer {
    name: String,
    normalizers: Vec<Arc<dyn Normalizer>>,
    tokenizer: Arc<dyn Tokenizer>,
    query_tokenizer: Option<Arc<dyn Tokenizer>>,
}

impl Analyzer {
    pub fn new(name: impl Into<String>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Analyzer {
            name: name.into(),
            normalizers: Vec::new(),
            tokenizer,
            query_tokenizer: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizers.push(normalizer);
        self
    }

    pub fn with_query_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.query_tokenizer = Some(tokenizer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs only the normalizer chain.
    pub fn normalize(&self, text: &str) -> String {
        self.normalizers
            .iter()
            .fold(text.to_string(), |acc, n| n.apply(&acc))
    }

    /// Index-time analysis.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(vec![self.normalize(text)])
    }

    /// Query-time analysis; same as [`Analyzer::analyze`] unless a query
    /// tokenizer was configured.
    pub fn analyze_query(&self, text: &str) -> Vec<String> {
        let tokenizer = self.query_tokenizer.as_ref().unwrap_or(&self.tokenizer);
        tokenizer.tokenize(vec![self.normalize(text)])
    }

    /// lowercase, unaccent, space between digits, then whitespace + edge
    /// prefixes at index time and plain whitespace at query time.
    pub fn autocomplete() -> Self {
        Self::build_autocomplete(Edge::default())
    }

    pub fn autocomplete_with_min_gram(min_gram: usize) -> Result<Self> {
        Ok(Self::build_autocomplete(Edge::new(min_gram)?))
    }

    fn build_autocomplete(edge: Edge) -> Self {
        let stages: Vec<Arc<dyn Tokenizer>> = vec![Arc::new(Whitespace), Arc::new(edge)];
        Analyzer::new("autocomplete", Arc::new(Chain::new(stages)))
            .with_normalizer(Arc::new(Lowercase))
            .with_normalizer(Arc::new(Unaccent))
            .with_normalizer(Arc::new(SpaceBetweenDigits))
            .with_query_tokenizer(Arc::new(Whitespace))
    }

    /// No normalization; the trimmed input is the only term.
    pub fn identifier() -> Self {
        Analyzer::new("identifier", Arc::new(Whole))
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let normalizers: Vec<&str> = self.normalizers.iter().map(|n| n.name()).collect();
        f.debug_struct("Analyzer")
            .field("name", &self.name)
            .field("normalizers", &normalizers)
            .field("tokenizer", &self.tokenizer.name())
            .field("query_tokenizer", &self.query_tokenizer.as_ref().map(|t| t.name()))
            .finish()
    }
}
