use parking_lot::{RwLock, RwLockReadGuard};
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::index::{DocId, Index, IndexStats};
use crate::query::{QueryNode, ScoredHit};

/// An [`Index`] shared between threads: one writer or many readers at a time.
///
/// Queries hold the read lock for the whole evaluation, so a concurrent batch
/// is either fully visible to a query or not at all.
#[derive(Clone, Debug)]
pub struct SharedIndex {
    inner: Arc<RwLock<Index>>,
}

impl SharedIndex {
    pub fn new(index: Index) -> Self {
        SharedIndex {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Indexes a batch under the write lock and returns the new document count.
    pub fn index_batch<S: AsRef<str>>(&self, records: Vec<Value>, fields: &[S]) -> Result<usize> {
        let mut index = self.inner.write();
        index.index_batch(records, fields)?;
        Ok(index.num_docs())
    }

    pub fn terms(&self, field: &str, text: &str) -> Result<Vec<QueryNode>> {
        self.inner.read().terms(field, text)
    }

    /// Ranked hits paired with clones of their stored records.
    pub fn search(&self, query: &QueryNode, limit: Option<usize>) -> (usize, Vec<(ScoredHit, Value)>) {
        let index = self.inner.read();
        let hits = index.search(query, None);
        let total = hits.len();
        let top = hits
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .filter_map(|hit| index.doc(hit.doc_id).map(|doc| (hit, doc.clone())))
            .collect();
        (total, top)
    }

    pub fn top_n(&self, query: &QueryNode, limit: Option<usize>) -> Vec<Value> {
        self.inner.read().top_n(query, limit).into_iter().cloned().collect()
    }

    pub fn doc(&self, id: DocId) -> Option<Value> {
        self.inner.read().doc(id).cloned()
    }

    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }

    /// Direct read access for callers composing several lookups.
    pub fn read(&self) -> RwLockReadGuard<'_, Index> {
        self.inner.read()
    }
}
