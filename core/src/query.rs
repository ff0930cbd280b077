use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::index::{DocId, Index};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredHit {
    pub doc_id: DocId,
    pub score: f32,
}

/// Child list of a combinator node. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<QueryNode>", into = "Vec<QueryNode>")]
pub struct Children(Vec<QueryNode>);

impl Children {
    pub fn iter(&self) -> std::slice::Iter<'_, QueryNode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<QueryNode>> for Children {
    type Error = Error;

    fn try_from(children: Vec<QueryNode>) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::Construction("combinator needs at least one child"));
        }
        Ok(Children(children))
    }
}

impl From<Children> for Vec<QueryNode> {
    fn from(children: Children) -> Self {
        children.0
    }
}

/// A query tree. Leaves resolve against the index; combinators merge the
/// scored hits of their children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryNode {
    /// Documents whose `field` contains `term`, scored `tf * idf`.
    Term { field: String, term: String },
    /// Every stored document, scored 1.0.
    Constant,
    /// Documents matched by all children; scores add up.
    And(Children),
    /// Documents matched by any child; scores of matching children add up.
    Or(Children),
    /// Documents matched by any child; the best child score wins.
    #[serde(rename = "dismax")]
    DisMax(Children),
}

impl QueryNode {
    pub fn term(field: impl Into<String>, term: impl Into<String>) -> Self {
        QueryNode::Term {
            field: field.into(),
            term: term.into(),
        }
    }

    pub fn constant() -> Self {
        QueryNode::Constant
    }

    pub fn and(children: Vec<QueryNode>) -> Result<Self> {
        Ok(QueryNode::And(children.try_into()?))
    }

    pub fn or(children: Vec<QueryNode>) -> Result<Self> {
        Ok(QueryNode::Or(children.try_into()?))
    }

    pub fn dismax(children: Vec<QueryNode>) -> Result<Self> {
        Ok(QueryNode::DisMax(children.try_into()?))
    }

    /// Resolves the tree to its matches, sorted by doc id.
    pub fn evaluate(&self, index: &Index) -> Vec<ScoredHit> {
        match self {
            QueryNode::Term { field, term } => term_hits(index, field, term),
            QueryNode::Constant => (0..index.num_docs() as DocId)
                .map(|doc_id| ScoredHit { doc_id, score: 1.0 })
                .collect(),
            QueryNode::And(children) => {
                let mut iter = children.iter();
                let Some(first) = iter.next() else { return Vec::new() };
                let mut acc = first.evaluate(index);
                for child in iter {
                    if acc.is_empty() {
                        break;
                    }
                    acc = intersect(acc, child.evaluate(index));
                }
                acc
            }
            QueryNode::Or(children) => children
                .iter()
                .fold(Vec::new(), |acc, child| union(acc, child.evaluate(index), |a, b| a + b)),
            QueryNode::DisMax(children) => children
                .iter()
                .fold(Vec::new(), |acc, child| union(acc, child.evaluate(index), f32::max)),
        }
    }
}

fn term_hits(index: &Index, field: &str, term: &str) -> Vec<ScoredHit> {
    let Some(postings) = index.postings(field, term) else {
        return Vec::new();
    };
    let n = index.num_docs() as f32;
    let idf = (n / postings.len() as f32).ln();
    postings
        .iter()
        .map(|p| ScoredHit {
            doc_id: p.doc_id,
            score: p.frequency as f32 * idf,
        })
        .collect()
}

/// Linear merge of two doc-id-sorted hit lists keeping common ids.
fn intersect(a: Vec<ScoredHit>, b: Vec<ScoredHit>) -> Vec<ScoredHit> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (x, y) = (a[i], b[j]);
        if x.doc_id == y.doc_id {
            out.push(ScoredHit {
                doc_id: x.doc_id,
                score: x.score + y.score,
            });
            i += 1;
            j += 1;
        } else if x.doc_id < y.doc_id {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

/// Linear merge of two doc-id-sorted hit lists keeping every id; ids present
/// in both get `combine(a, b)`.
fn union(a: Vec<ScoredHit>, b: Vec<ScoredHit>, combine: impl Fn(f32, f32) -> f32) -> Vec<ScoredHit> {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (x, y) = (a[i], b[j]);
        if x.doc_id == y.doc_id {
            out.push(ScoredHit {
                doc_id: x.doc_id,
                score: combine(x.score, y.score),
            });
            i += 1;
            j += 1;
        } else if x.doc_id < y.doc_id {
            out.push(x);
            i += 1;
        } else {
            out.push(y);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// How the term nodes of a free-text query are combined. Parsing, from a
/// string or through serde, ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Combinator {
    And,
    #[default]
    Or,
    #[serde(rename = "dismax")]
    DisMax,
}

impl Combinator {
    pub fn combine(self, children: Vec<QueryNode>) -> Result<QueryNode> {
        match self {
            Combinator::And => QueryNode::and(children),
            Combinator::Or => QueryNode::or(children),
            Combinator::DisMax => QueryNode::dismax(children),
        }
    }
}

impl FromStr for Combinator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(Combinator::And),
            "or" => Ok(Combinator::Or),
            "dismax" => Ok(Combinator::DisMax),
            other => Err(format!("unknown combinator `{other}`, expected and, or or dismax")),
        }
    }
}

impl TryFrom<String> for Combinator {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}
