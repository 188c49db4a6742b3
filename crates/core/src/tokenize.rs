//! Reference tokenizers.
//!
//! A morphological analyser producing real lemmas plugs in through the
//! [`Tokenizer`] trait; the two implementations here need no model files.

use crate::helpers::{join_sentence_lemmas, split_sentences};
use crate::Tokenizer;

/// Splits on whitespace and lowercases. Suited to pre-segmented text.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> String {
        join_sentence_lemmas(split_sentences(text).into_iter().map(|sentence| {
            sentence
                .split_whitespace()
                .map(|word| {
                    word.trim_matches(|c: char| !c.is_alphanumeric())
                        .to_lowercase()
                })
                .collect::<Vec<_>>()
        }))
    }
}

/// One token per alphanumeric character. Suited to unsegmented Japanese,
/// where it yields a bag of characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn tokenize(&self, text: &str) -> String {
        join_sentence_lemmas(split_sentences(text).into_iter().map(|sentence| {
            sentence
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .map(String::from)
                .collect::<Vec<_>>()
        }))
    }
}

/// Tokenize every text of a partition.
pub fn tokenize_all<T>(tokenizer: &T, texts: &[String]) -> Vec<String>
where
    T: Tokenizer + ?Sized,
{
    texts.iter().map(|text| tokenizer.tokenize(text)).collect()
}
