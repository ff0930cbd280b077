use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::analyzer::Analyzer;
use crate::error::{Error, Result};
use crate::query::{Combinator, QueryNode, ScoredHit};

pub type TermId = u32;
pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
}

/// Terms of one field, interned to ids that index the posting arena.
#[derive(Debug, Default)]
pub struct FieldIndex {
    dictionary: HashMap<String, TermId>,
    postings: Vec<Vec<Posting>>, // by term id, each sorted by doc_id
}

impl FieldIndex {
    /// Documents are indexed in id order, so a term's postings only ever grow
    /// at the tail: either bump the last entry or append a new one.
    fn add(&mut self, doc_id: DocId, term: String) {
        let next_id = self.postings.len() as TermId;
        let tid = *self.dictionary.entry(term).or_insert(next_id);
        if tid == next_id {
            self.postings.push(Vec::new());
        }
        let list = &mut self.postings[tid as usize];
        match list.last_mut() {
            Some(last) if last.doc_id == doc_id => last.frequency += 1,
            _ => list.push(Posting { doc_id, frequency: 1 }),
        }
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.dictionary
            .get(term)
            .map(|tid| self.postings[*tid as usize].as_slice())
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    pub fn num_postings(&self) -> usize {
        self.postings.iter().map(Vec::len).sum()
    }
}

/// Append-only store of the original records; a record's id is its position.
#[derive(Debug, Default)]
pub struct DocStore {
    docs: Vec<Value>,
}

impl DocStore {
    fn next_id(&self) -> DocId {
        self.docs.len() as DocId
    }

    fn push(&mut self, record: Value) {
        self.docs.push(record);
    }

    pub fn get(&self, id: DocId) -> Option<&Value> {
        self.docs.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldStats {
    pub num_terms: usize,
    pub num_postings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub num_docs: usize,
    pub fields: BTreeMap<String, FieldStats>,
}

/// An in-memory full-text index over JSON records.
///
/// Each indexed field is analyzed with the analyzer registered for it at
/// construction. Scores use `tf * ln(N / df)` where `N` is the number of
/// stored records when the query runs.
#[derive(Debug, Default)]
pub struct Index {
    analyzers: HashMap<String, Analyzer>,
    docs: DocStore,
    fields: HashMap<String, FieldIndex>,
}

impl Index {
    pub fn new<I, K>(analyzers: I) -> Self
    where
        I: IntoIterator<Item = (K, Analyzer)>,
        K: Into<String>,
    {
        Index {
            analyzers: analyzers.into_iter().map(|(k, a)| (k.into(), a)).collect(),
            ..Default::default()
        }
    }

    pub fn analyzer(&self, field: &str) -> Result<&Analyzer> {
        self.analyzers.get(field).ok_or_else(|| Error::Configuration {
            field: field.to_string(),
        })
    }

    /// Stores each record and indexes the named fields of it.
    ///
    /// Every field is checked for an analyzer before anything is stored, so a
    /// configuration error leaves the index untouched. Records missing a field
    /// are still stored and can be matched through other fields or
    /// [`QueryNode::Constant`].
    pub fn index_batch<I, S>(&mut self, records: I, fields: &[S]) -> Result<()>
    where
        I: IntoIterator<Item = Value>,
        S: AsRef<str>,
    {
        let Index {
            analyzers,
            docs,
            fields: field_indexes,
        } = self;
        let analyzers = &*analyzers;

        let resolved = fields
            .iter()
            .map(|f| {
                let f = f.as_ref();
                analyzers
                    .get(f)
                    .map(|a| (f, a))
                    .ok_or_else(|| Error::Configuration { field: f.to_string() })
            })
            .collect::<Result<Vec<_>>>()?;

        let first = docs.len();
        for record in records {
            let doc_id = docs.next_id();
            for (field, analyzer) in &resolved {
                let Some(text) = field_text(&record, field) else {
                    tracing::trace!(doc_id, field, "field missing, not indexed");
                    continue;
                };
                let field_index = field_indexes.entry(field.to_string()).or_default();
                for term in analyzer.analyze(&text) {
                    field_index.add(doc_id, term);
                }
            }
            docs.push(record);
        }

        tracing::debug!(
            added = docs.len() - first,
            num_docs = docs.len(),
            fields = resolved.len(),
            "indexed batch"
        );
        Ok(())
    }

    /// Analyzes `text` the way queries on `field` are analyzed and returns one
    /// term node per token, in order.
    pub fn terms(&self, field: &str, text: &str) -> Result<Vec<QueryNode>> {
        let analyzer = self.analyzer(field)?;
        Ok(analyzer
            .analyze_query(text)
            .into_iter()
            .map(|term| QueryNode::term(field, term))
            .collect())
    }

    /// Combines the terms of `text` on `field`. `None` when the text yields no
    /// tokens.
    pub fn match_query(&self, field: &str, text: &str, combinator: Combinator) -> Result<Option<QueryNode>> {
        let terms = self.terms(field, text)?;
        if terms.is_empty() {
            return Ok(None);
        }
        combinator.combine(terms).map(Some)
    }

    /// All matches of `query`, sorted by doc id.
    pub fn evaluate(&self, query: &QueryNode) -> Vec<ScoredHit> {
        query.evaluate(self)
    }

    /// Matches ranked by score, highest first, ties going to the earlier
    /// document. `limit` of `None` keeps every match.
    pub fn search(&self, query: &QueryNode, limit: Option<usize>) -> Vec<ScoredHit> {
        let mut hits = self.evaluate(query);
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
        if let Some(n) = limit {
            hits.truncate(n);
        }
        hits
    }

    /// The stored records of the best `limit` matches.
    pub fn top_n(&self, query: &QueryNode, limit: Option<usize>) -> Vec<&Value> {
        self.search(query, limit)
            .into_iter()
            .filter_map(|hit| self.docs.get(hit.doc_id))
            .collect()
    }

    pub fn doc(&self, id: DocId) -> Option<&Value> {
        self.docs.get(id)
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn postings(&self, field: &str, term: &str) -> Option<&[Posting]> {
        self.fields.get(field)?.postings(term)
    }

    pub fn doc_freq(&self, field: &str, term: &str) -> usize {
        self.postings(field, term).map_or(0, <[Posting]>::len)
    }

    pub fn stats(&self) -> IndexStats {
        let fields = self
            .fields
            .iter()
            .map(|(name, fi)| {
                let stats = FieldStats {
                    num_terms: fi.num_terms(),
                    num_postings: fi.num_postings(),
                };
                (name.clone(), stats)
            })
            .collect();
        IndexStats {
            num_docs: self.docs.len(),
            fields,
        }
    }
}

/// The text to analyze for `field`, or `None` when the record has nothing
/// indexable there.
fn field_text<'a>(record: &'a Value, field: &str) -> Option<Cow<'a, str>> {
    match record.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        v @ (Value::Number(_) | Value::Bool(_)) => Some(Cow::Owned(v.to_string())),
        Value::Array(items) => {
            let parts: Vec<Cow<'a, str>> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(Cow::Borrowed(s.as_str())),
                    v @ (Value::Number(_) | Value::Bool(_)) => Some(Cow::Owned(v.to_string())),
                    _ => None,
                })
                .collect();
            Some(Cow::Owned(parts.join(" ")))
        }
        Value::Object(_) => {
            tracing::warn!(field, "nested object is not indexable, skipping");
            None
        }
    }
}
