//! Helper functions for sentence splitting and lemma joining.

use regex::Regex;
use std::sync::LazyLock;

// Sentence terminators, Japanese and ASCII, plus line breaks.
static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[。．！？!?.\n]+").unwrap());

/// Split text into sentence segments, dropping the terminators and any
/// segment that is only whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_END_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Join per-sentence lemmas into one space-separated string.
///
/// Lemmas inside a sentence are joined by a single space, each sentence is
/// trimmed, and sentences are joined by a single space, so sentence
/// boundaries look like ordinary word spacing in the result.
pub fn join_sentence_lemmas<I, S>(sentences: I) -> String
where
    I: IntoIterator<Item = Vec<S>>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for sentence in sentences {
        let mut segment = String::new();
        for lemma in &sentence {
            let lemma = lemma.as_ref().trim();
            if lemma.is_empty() {
                continue;
            }
            segment.push_str(lemma);
            segment.push(' ');
        }
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(segment);
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("今日は晴れ。散歩に行く！ Done. "),
            vec!["今日は晴れ", "散歩に行く", "Done"]
        );
        assert!(split_sentences("。。\n").is_empty());
    }

    #[test]
    fn test_join_sentence_lemmas() {
        let sentences = vec![vec!["今回", "は"], vec!["来る", "", "ます"]];
        assert_eq!(join_sentence_lemmas(sentences), "今回 は 来る ます");
    }

    #[test]
    fn test_join_sentence_lemmas_skips_empty_sentences() {
        let sentences: Vec<Vec<String>> = vec![vec![], vec!["a".into()], vec![" ".into()]];
        assert_eq!(join_sentence_lemmas(sentences), "a");
    }
}
