use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").expect("valid regex");
}

/// A string-to-string transform applied to raw field text before tokenization.
pub trait Normalizer: Send + Sync {
    fn apply(&self, text: &str) -> String;

    fn name(&self) -> &str;
}

/// Case-folds every alphabetic character.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lowercase;

impl Normalizer for Lowercase {
    fn apply(&self, text: &str) -> String {
        text.to_lowercase()
    }

    fn name(&self) -> &str {
        "lowercase"
    }
}

/// Strips diacritics: "Crème" becomes "Creme".
///
/// Characters are canonically decomposed, marks from the combining diacritics
/// blocks are dropped and the remainder is recomposed. Marks outside those
/// blocks (Devanagari vowel signs, Thai tone marks, the kana voicing mark) are
/// part of the letter and survive. A few letters whose stroke is not a
/// combining mark are folded by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unaccent;

impl Normalizer for Unaccent {
    fn apply(&self, text: &str) -> String {
        text.nfd()
            .filter(|c| !is_diacritic(*c))
            .map(fold_stroke)
            .nfc()
            .collect()
    }

    fn name(&self) -> &str {
        "unaccent"
    }
}

fn is_diacritic(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

fn fold_stroke(c: char) -> char {
    match c {
        'ø' => 'o',
        'Ø' => 'O',
        'đ' => 'd',
        'Đ' => 'D',
        'ł' => 'l',
        'Ł' => 'L',
        'ħ' => 'h',
        'Ħ' => 'H',
        'ı' => 'i',
        other => other,
    }
}

/// Surrounds every maximal run of ASCII digits with one space on each side.
///
/// The spaces are inserted even when one is already present, so "a 9b"
/// becomes "a  9 b"; the whitespace tokenizer collapses the doubled space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceBetweenDigits;

impl Normalizer for SpaceBetweenDigits {
    fn apply(&self, text: &str) -> String {
        DIGIT_RUN.replace_all(text, " ${0} ").into_owned()
    }

    fn name(&self) -> &str {
        "space_between_digits"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_folds_ascii_and_unicode() {
        assert_eq!(Lowercase.apply("ABC"), "abc");
        assert_eq!(Lowercase.apply("CRÈME"), "crème");
    }

    #[test]
    fn unaccent_strips_diacritics() {
        assert_eq!(Unaccent.apply("Crème Brulée"), "Creme Brulee");
        assert_eq!(Unaccent.apply("Ångström Øre"), "Angstrom Ore");
    }

    #[test]
    fn unaccent_leaves_unmapped_characters() {
        assert_eq!(Unaccent.apply("plain text 42"), "plain text 42");
        assert_eq!(Unaccent.apply("한국어"), "한국어");
        assert_eq!(Unaccent.apply("東京"), "東京");
        assert_eq!(Unaccent.apply("हिन्दी"), "हिन्दी");
        assert_eq!(Unaccent.apply("がっこう"), "がっこう");
        assert_eq!(Unaccent.apply("ที่นี่"), "ที่นี่");
    }

    #[test]
    fn unaccent_keeps_voiced_kana_distinct() {
        assert_ne!(Unaccent.apply("がっこう"), Unaccent.apply("かっこう"));
    }

    #[test]
    fn digits_get_surrounded_by_spaces() {
        assert_eq!(SpaceBetweenDigits.apply("Crème Brulée 9oz"), "Crème Brulée  9 oz");
        assert_eq!(SpaceBetweenDigits.apply("ab9999oz xoxo99x"), "ab 9999 oz xoxo 99 x");
        assert_eq!(SpaceBetweenDigits.apply("42"), " 42 ");
        assert_eq!(SpaceBetweenDigits.apply("no digits"), "no digits");
    }
}
