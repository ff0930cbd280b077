use std::sync::Arc;

use crate::error::{Error, Result};

pub const DEFAULT_MIN_GRAM: usize = 1;

/// Turns a sequence of text fragments into a sequence of tokens.
///
/// Tokenizers work on sequences rather than single strings so they can be
/// chained: the output of a splitting tokenizer feeds an expanding one. Output
/// order follows input order.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, input: Vec<String>) -> Vec<String>;

    fn name(&self) -> &str;
}

/// Splits on runs of whitespace and drops empty pieces.
#[derive(Debug, Clone, Copy, Default)]
pub struct Whitespace;

impl Tokenizer for Whitespace {
    fn tokenize(&self, input: Vec<String>) -> Vec<String> {
        input
            .iter()
            .flat_map(|text| text.split_whitespace())
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}

/// Expands each token into its prefixes, from `min_gram` characters up to the
/// whole token. Tokens no longer than `min_gram` pass through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    min_gram: usize,
}

impl Edge {
    pub fn new(min_gram: usize) -> Result<Self> {
        if min_gram == 0 {
            return Err(Error::Construction("edge tokenizer needs min_gram >= 1"));
        }
        Ok(Self { min_gram })
    }

    pub fn min_gram(&self) -> usize {
        self.min_gram
    }

    fn expand(&self, token: String, out: &mut Vec<String>) {
        let len = token.chars().count();
        if len <= self.min_gram {
            out.push(token);
            return;
        }
        // prefix ends are char boundaries, so slicing is safe for multi-byte text
        let ends = token
            .char_indices()
            .map(|(start, c)| start + c.len_utf8())
            .skip(self.min_gram - 1);
        out.extend(ends.map(|end| token[..end].to_string()));
    }
}

impl Default for Edge {
    fn default() -> Self {
        Edge { min_gram: DEFAULT_MIN_GRAM }
    }
}

impl Tokenizer for Edge {
    fn tokenize(&self, input: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(input.len());
        for token in input {
            self.expand(token, &mut out);
        }
        out
    }

    fn name(&self) -> &str {
        "edge"
    }
}

/// Emits each fragment trimmed, as one token. Used for exact-match identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Whole;

impl Tokenizer for Whole {
    fn tokenize(&self, input: Vec<String>) -> Vec<String> {
        input
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> &str {
        "whole"
    }
}

/// Runs several tokenizers in sequence, each consuming the previous output.
#[derive(Clone)]
pub struct Chain {
    stages: Vec<Arc<dyn Tokenizer>>,
}

impl Chain {
    pub fn new(stages: Vec<Arc<dyn Tokenizer>>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name())
    }
}

impl Tokenizer for Chain {
    fn tokenize(&self, input: Vec<String>) -> Vec<String> {
        self.stages.iter().fold(input, |tokens, stage| stage.tokenize(tokens))
    }

    fn name(&self) -> &str {
        "chain"
    }
}
