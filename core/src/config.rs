//! Declarative analyzer configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "fields": {
//!     "name": { "type": "autocomplete", "min_gram": 2 },
//!     "type": { "type": "identifier" },
//!     "body": {
//!       "type": "custom",
//!       "normalizers": ["lowercase", "unaccent"],
//!       "tokenizer": { "type": "whitespace" }
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::error::Result;
use crate::index::Index;
use crate::normalizer::{Lowercase, Normalizer, SpaceBetweenDigits, Unaccent};
use crate::tokenizer::{Chain, Edge, Tokenizer, Whitespace, Whole, DEFAULT_MIN_GRAM};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizerKind {
    Lowercase,
    Unaccent,
    SpaceBetweenDigits,
}

impl NormalizerKind {
    pub fn build(self) -> Arc<dyn Normalizer> {
        match self {
            NormalizerKind::Lowercase => Arc::new(Lowercase),
            NormalizerKind::Unaccent => Arc::new(Unaccent),
            NormalizerKind::SpaceBetweenDigits => Arc::new(SpaceBetweenDigits),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenizerConfig {
    Whitespace,
    Edge {
        #[serde(default = "default_min_gram")]
        min_gram: usize,
    },
    Whole,
    Chain { tokenizers: Vec<TokenizerConfig> },
}

impl TokenizerConfig {
    pub fn build(&self) -> Result<Arc<dyn Tokenizer>> {
        Ok(match self {
            TokenizerConfig::Whitespace => Arc::new(Whitespace),
            TokenizerConfig::Edge { min_gram } => Arc::new(Edge::new(*min_gram)?),
            TokenizerConfig::Whole => Arc::new(Whole),
            TokenizerConfig::Chain { tokenizers } => {
                let stages = tokenizers.iter().map(|t| t.build()).collect::<Result<Vec<_>>>()?;
                Arc::new(Chain::new(stages))
            }
        })
    }
}

fn default_min_gram() -> usize {
    DEFAULT_MIN_GRAM
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyzerConfig {
    Autocomplete {
        #[serde(default = "default_min_gram")]
        min_gram: usize,
    },
    Identifier,
    Custom {
        #[serde(default)]
        normalizers: Vec<NormalizerKind>,
        tokenizer: TokenizerConfig,
        #[serde(default)]
        query_tokenizer: Option<TokenizerConfig>,
    },
}

impl AnalyzerConfig {
    pub fn build(&self) -> Result<Analyzer> {
        match self {
            AnalyzerConfig::Autocomplete { min_gram } => Analyzer::autocomplete_with_min_gram(*min_gram),
            AnalyzerConfig::Identifier => Ok(Analyzer::identifier()),
            AnalyzerConfig::Custom {
                normalizers,
                tokenizer,
                query_tokenizer,
            } => {
                let mut analyzer = Analyzer::new("custom", tokenizer.build()?);
                for n in normalizers {
                    analyzer = analyzer.with_normalizer(n.build());
                }
                if let Some(qt) = query_tokenizer {
                    analyzer = analyzer.with_query_tokenizer(qt.build()?);
                }
                Ok(analyzer)
            }
        }
    }
}

/// Field name to analyzer mapping for a new [`Index`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub fields: BTreeMap<String, AnalyzerConfig>,
}

impl IndexConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn build(&self) -> Result<Index> {
        let analyzers = self
            .fields
            .iter()
            .map(|(name, cfg)| cfg.build().map(|a| (name.clone(), a)))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(fields = analyzers.len(), "built analyzers from config");
        Ok(Index::new(analyzers))
    }
}
