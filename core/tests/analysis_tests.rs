use proptest::prelude::*;
use quill_core::normalizer::{Lowercase, Normalizer, SpaceBetweenDigits, Unaccent};
use quill_core::tokenizer::{Edge, Tokenizer, Whitespace};
use quill_core::Analyzer;

#[test]
fn it_normalizes_like_the_documented_examples() {
    assert_eq!(Lowercase.apply("ABC"), "abc");
    assert_eq!(Unaccent.apply("Crème Brulée"), "Creme Brulee");
    assert_eq!(SpaceBetweenDigits.apply("Crème Brulée 9oz"), "Crème Brulée  9 oz");
    assert_eq!(SpaceBetweenDigits.apply("ab9999oz xoxo99x"), "ab 9999 oz xoxo 99 x");
}

#[test]
fn it_tokenizes_whitespace() {
    assert_eq!(Whitespace.tokenize(vec!["hello world".to_string()]), vec!["hello", "world"]);
}

#[test]
fn it_runs_the_full_autocomplete_pipeline() {
    let tokens = Analyzer::autocomplete().analyze("K9 Bzz");
    assert_eq!(tokens, vec!["k", "9", "b", "bz", "bzz"]);
}

proptest! {
    #[test]
    fn edge_emits_every_prefix(word in "[a-zé]{1,12}", min_gram in 1usize..8) {
        let edge = Edge::new(min_gram).unwrap();
        let out = edge.tokenize(vec![word.clone()]);
        let len = word.chars().count();
        if len <= min_gram {
            prop_assert_eq!(out, vec![word]);
        } else {
            prop_assert_eq!(out.len(), len - min_gram + 1);
            prop_assert_eq!(out[0].chars().count(), min_gram);
            for pair in out.windows(2) {
                prop_assert!(pair[1].starts_with(pair[0].as_str()));
                prop_assert_eq!(pair[1].chars().count(), pair[0].chars().count() + 1);
            }
            prop_assert_eq!(out.last().unwrap(), &word);
        }
    }

    #[test]
    fn analysis_is_deterministic(text in "\\PC{0,40}") {
        let analyzer = Analyzer::autocomplete();
        prop_assert_eq!(analyzer.analyze(&text), analyzer.analyze(&text));
        prop_assert_eq!(analyzer.analyze_query(&text), analyzer.analyze_query(&text));
    }

    #[test]
    fn whitespace_never_emits_blank_tokens(text in "[ a-z\\t\\n]{0,30}") {
        for token in Whitespace.tokenize(vec![text]) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.contains(char::is_whitespace));
        }
    }
}
