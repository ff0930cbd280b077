use quill_core::{Analyzer, Index, QueryNode};
use serde_json::{json, Value};

fn new_index() -> Index {
    Index::new([("name", Analyzer::autocomplete()), ("type", Analyzer::identifier())])
}

fn users() -> Index {
    let mut ix = new_index();
    ix.index_batch(
        vec![
            json!({"name": "john Crème Brulée", "type": "user"}),
            json!({"name": "john another with worse idf", "type": "user"}),
            json!({"name": "hello world k777bb k9 bzz", "type": "user"}),
            json!({"name": "jack", "type": "admin"}),
            json!({"name": "doe world"}),
        ],
        &["name"],
    )
    .unwrap();
    ix
}

fn terms(ix: &Index, text: &str) -> Vec<QueryNode> {
    ix.terms("name", text).unwrap()
}

fn or(parts: Vec<Vec<QueryNode>>) -> QueryNode {
    QueryNode::or(parts.into_iter().flatten().collect()).unwrap()
}

fn and(parts: Vec<Vec<QueryNode>>) -> QueryNode {
    QueryNode::and(parts.into_iter().flatten().collect()).unwrap()
}

fn owned(records: Vec<&Value>) -> Vec<Value> {
    records.into_iter().cloned().collect()
}

#[test]
fn doe() {
    let ix = users();
    let q = or(vec![terms(&ix, "doe")]);
    assert_eq!(owned(ix.top_n(&q, None)), vec![json!({"name": "doe world"})]);
}

#[test]
fn doe_or_john() {
    let ix = users();
    let q = or(vec![terms(&ix, "doe"), terms(&ix, "john")]);
    let expected = vec![
        json!({"name": "doe world"}),
        json!({"name": "john Crème Brulée", "type": "user"}),
        json!({"name": "john another with worse idf", "type": "user"}),
    ];
    assert_eq!(owned(ix.top_n(&q, None)), expected);
}

#[test]
fn doe_and_john() {
    let ix = users();
    let q = and(vec![terms(&ix, "doe"), terms(&ix, "john")]);
    assert!(ix.top_n(&q, None).is_empty());
}

#[test]
fn world_and_john_or_hello() {
    let ix = users();
    let inner = or(vec![terms(&ix, "john"), terms(&ix, "hello")]);
    let q = and(vec![terms(&ix, "world"), vec![inner]]);
    assert_eq!(
        owned(ix.top_n(&q, None)),
        vec![json!({"name": "hello world k777bb k9 bzz", "type": "user"})]
    );
}

#[test]
fn doe_limit_1() {
    let ix = users();
    let q = or(vec![terms(&ix, "doe")]);
    assert_eq!(owned(ix.top_n(&q, Some(1))), vec![json!({"name": "doe world"})]);
    assert!(ix.top_n(&q, Some(0)).is_empty());
}

#[test]
fn prefixes_match_at_query_time() {
    let ix = users();
    let q = or(vec![terms(&ix, "Bru")]);
    assert_eq!(
        owned(ix.top_n(&q, None)),
        vec![json!({"name": "john Crème Brulée", "type": "user"})]
    );
    let digits = or(vec![terms(&ix, "k777")]);
    assert_eq!(ix.search(&digits, None).len(), 1);
}

#[test]
fn unindexed_field_and_unseen_term_match_nothing() {
    let ix = users();
    // "type" has an analyzer but was not indexed in this batch
    let q = or(vec![ix.terms("type", "user").unwrap()]);
    assert!(ix.top_n(&q, None).is_empty());
    assert!(ix.top_n(&QueryNode::term("name", "zebra"), None).is_empty());
}

#[test]
fn non_latin_marks_keep_words_apart() {
    let mut ix = new_index();
    ix.index_batch(
        vec![json!({"name": "かっこう"}), json!({"name": "がっこう"}), json!({"name": "हिन्दी"})],
        &["name"],
    )
    .unwrap();
    let q = or(vec![terms(&ix, "がっこう")]);
    assert_eq!(owned(ix.top_n(&q, None)), vec![json!({"name": "がっこう"})]);
    let q = or(vec![terms(&ix, "हिन्दी")]);
    assert_eq!(ix.search(&q, None).len(), 1);
    assert_eq!(ix.doc_freq("name", "हनद"), 0);
}

#[test]
fn constant_returns_all_in_insertion_order() {
    let ix = users();
    let all = ix.search(&QueryNode::constant(), None);
    let ids: Vec<u32> = all.iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn dismax_matches_like_or_but_scores_the_best_child() {
    let ix = users();
    let children: Vec<QueryNode> = [terms(&ix, "world"), terms(&ix, "hello")].concat();
    let or_hits = ix.evaluate(&QueryNode::or(children.clone()).unwrap());
    let dismax_hits = ix.evaluate(&QueryNode::dismax(children).unwrap());

    let or_ids: Vec<u32> = or_hits.iter().map(|h| h.doc_id).collect();
    let dismax_ids: Vec<u32> = dismax_hits.iter().map(|h| h.doc_id).collect();
    assert_eq!(or_ids, dismax_ids);

    // doc 2 has both words: OR adds them, DISMAX keeps the larger
    let world = ix.evaluate(&QueryNode::term("name", "world"))[0].score;
    let hello = ix.evaluate(&QueryNode::term("name", "hello"))[0].score;
    let doc2 = |hits: &[quill_core::ScoredHit]| hits.iter().find(|h| h.doc_id == 2).unwrap().score;
    assert_eq!(doc2(&or_hits), world + hello);
    assert_eq!(doc2(&dismax_hits), world.max(hello));
}

#[test]
fn idf_tracks_the_corpus_at_query_time() {
    let mut ix = users();
    let q = QueryNode::term("name", "doe");
    let before = ix.search(&q, None)[0].score;
    ix.index_batch(vec![json!({"name": "unrelated"})], &["name"]).unwrap();
    let after = ix.search(&q, None)[0].score;
    assert!((before - 5.0f32.ln()).abs() < 1e-6);
    assert!((after - 6.0f32.ln()).abs() < 1e-6);
}

#[test]
fn big_index() {
    let mut ix = new_index();
    let iter = 200;
    for _ in 0..iter {
        ix.index_batch(
            vec![
                json!({"name": "john Crème Brulée", "type": "user"}),
                json!({"name": "john another with worse idf", "type": "user"}),
                json!({"name": "hello world k777bb k9 bzz", "type": "user"}),
                json!({"name": "jack", "type": "admin"}),
                json!({"name": "doe world"}),
                json!({"name": "world"}),
            ],
            &["name"],
        )
        .unwrap();
    }
    assert_eq!(ix.num_docs(), iter * 6);

    let doe = or(vec![terms(&ix, "doe")]);
    assert_eq!(ix.top_n(&doe, None).len(), iter);

    let world = or(vec![terms(&ix, "world")]);
    assert_eq!(ix.top_n(&world, None).len(), iter * 3);

    let world_and_doe = and(vec![terms(&ix, "world"), terms(&ix, "doe")]);
    assert_eq!(ix.top_n(&world_and_doe, None).len(), iter);

    let q = or(vec![vec![world_and_doe], terms(&ix, "john")]);
    assert_eq!(ix.top_n(&q, None).len(), iter * 3);
}
