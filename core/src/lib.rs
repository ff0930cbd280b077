//! In-memory full-text indexing over JSON records.
//!
//! Fields are analyzed into terms by per-field [`Analyzer`]s, terms map to
//! posting lists, and [`QueryNode`] trees combine term matches into ranked
//! results.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod index;
pub mod normalizer;
pub mod query;
pub mod records;
pub mod shared;
pub mod tokenizer;

pub use analyzer::Analyzer;
pub use config::{AnalyzerConfig, IndexConfig};
pub use error::{Error, Result};
pub use index::{DocId, Index, IndexStats, Posting, TermId};
pub use query::{Combinator, QueryNode, ScoredHit};
pub use shared::SharedIndex;
