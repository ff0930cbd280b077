use criterion::{criterion_group, criterion_main, Criterion};
use quill_core::{Analyzer, Combinator, Index};
use serde_json::json;

const TEXT: &str = "Crème Brulée 9oz with caramelised sugar, k777bb hello world and another 42 words";

fn bench_autocomplete(c: &mut Criterion) {
    let analyzer = Analyzer::autocomplete();
    c.bench_function("autocomplete_analyze", |b| b.iter(|| analyzer.analyze(TEXT)));
}

fn bench_top_n(c: &mut Criterion) {
    let mut ix = Index::new([("name", Analyzer::autocomplete())]);
    for _ in 0..2_000 {
        ix.index_batch(
            vec![
                json!({"name": "john Crème Brulée"}),
                json!({"name": "hello world k777bb k9 bzz"}),
                json!({"name": "doe world"}),
            ],
            &["name"],
        )
        .unwrap();
    }
    let query = ix
        .match_query("name", "world john", Combinator::Or)
        .unwrap()
        .unwrap();
    c.bench_function("top_10_or", |b| b.iter(|| ix.top_n(&query, Some(10))));
}

criterion_group!(benches, bench_autocomplete, bench_top_n);
criterion_main!(benches);
