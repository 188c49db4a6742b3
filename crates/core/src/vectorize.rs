//! Bag-of-words vectorization with a vocabulary fit on one partition only.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{DatasetError, Result};

/// Default token pattern: runs of two or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

static DEFAULT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_TOKEN_PATTERN).unwrap());

/// Term counts for one document, indexed by vocabulary position.
pub type BowVector = Vec<u32>;

/// Frozen mapping from term to column index.
///
/// There is no way to add terms after construction; a new vocabulary
/// requires an explicit new fit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Vocabulary {
    index: BTreeMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from terms. Duplicates collapse; indices follow
    /// sorted term order.
    pub fn from_terms<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let sorted: BTreeSet<String> = terms.into_iter().collect();
        let index = sorted
            .into_iter()
            .enumerate()
            .map(|(i, term)| (term, i))
            .collect();
        Self { index }
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Terms in index order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }
}

/// A count-based text vectorizer.
///
/// `fit` learns a vocabulary; `transform` never changes it.
pub trait Vectorizer {
    fn fit(&self, corpus: &[String]) -> Vocabulary;

    fn transform(&self, corpus: &[String], vocabulary: &Vocabulary) -> Vec<BowVector>;
}

impl<V: Vectorizer + ?Sized> Vectorizer for &V {
    fn fit(&self, corpus: &[String]) -> Vocabulary {
        (*self).fit(corpus)
    }

    fn transform(&self, corpus: &[String], vocabulary: &Vocabulary) -> Vec<BowVector> {
        (*self).transform(corpus, vocabulary)
    }
}

/// Lowercasing bag-of-words counter with a stop-word set.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    token_re: Regex,
    stop_words: HashSet<String>,
    lowercase: bool,
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self {
            token_re: DEFAULT_TOKEN_RE.clone(),
            stop_words: HashSet::new(),
            lowercase: true,
        }
    }
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop words are compared after lowercasing, when lowercasing is on.
    pub fn with_stop_words<I, S>(mut self, stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = stop_words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_token_pattern(mut self, pattern: &str) -> Result<Self> {
        self.token_re = Regex::new(pattern).map_err(|e| DatasetError::InvalidTokenPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self)
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    fn terms<'a>(&'a self, document: &'a str) -> impl Iterator<Item = String> + 'a {
        self.token_re
            .find_iter(document)
            .map(move |m| {
                if self.lowercase {
                    m.as_str().to_lowercase()
                } else {
                    m.as_str().to_string()
                }
            })
            .filter(move |term| !self.stop_words.contains(term))
    }
}

impl Vectorizer for CountVectorizer {
    fn fit(&self, corpus: &[String]) -> Vocabulary {
        Vocabulary::from_terms(corpus.iter().flat_map(|doc| self.terms(doc)))
    }

    fn transform(&self, corpus: &[String], vocabulary: &Vocabulary) -> Vec<BowVector> {
        corpus
            .iter()
            .map(|doc| {
                let mut counts = vec![0u32; vocabulary.len()];
                for term in self.terms(doc) {
                    if let Some(i) = vocabulary.index_of(&term) {
                        counts[i] += 1;
                    }
                }
                counts
            })
            .collect()
    }
}

/// Fits a [`Vectorizer`] on exactly one partition and applies that fit,
/// unchanged, to every partition.
#[derive(Debug, Clone)]
pub struct VectorizerAdapter<V> {
    vectorizer: V,
}

impl<V: Vectorizer> VectorizerAdapter<V> {
    pub fn new(vectorizer: V) -> Self {
        Self { vectorizer }
    }

    /// Fit on `partitions[0]`, then transform every partition, the first
    /// included. Output order and per-partition lengths match the input.
    pub fn fit_transform_all(
        &self,
        partitions: &[Vec<String>],
    ) -> Result<(Vec<Vec<BowVector>>, Vocabulary)> {
        let fit_on = partitions.first().ok_or(DatasetError::EmptyFittingSet)?;
        let refs: Vec<&[String]> = partitions.iter().map(Vec::as_slice).collect();
        self.fit_transform_with(fit_on, &refs)
    }

    /// Fit on `fit_on` only, then transform each of `partitions`.
    pub fn fit_transform_with(
        &self,
        fit_on: &[String],
        partitions: &[&[String]],
    ) -> Result<(Vec<Vec<BowVector>>, Vocabulary)> {
        let vocabulary = self.fit(fit_on)?;
        let vectors = partitions
            .iter()
            .map(|partition| self.transform(partition, &vocabulary))
            .collect();
        Ok((vectors, vocabulary))
    }

    pub fn fit(&self, fit_on: &[String]) -> Result<Vocabulary> {
        if fit_on.is_empty() {
            return Err(DatasetError::EmptyFittingSet);
        }
        let vocabulary = self.vectorizer.fit(fit_on);
        tracing::debug!(
            "Fit vocabulary of {} terms on {} documents",
            vocabulary.len(),
            fit_on.len()
        );
        Ok(vocabulary)
    }

    pub fn transform(&self, partition: &[String], vocabulary: &Vocabulary) -> Vec<BowVector> {
        self.vectorizer.transform(partition, vocabulary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_is_sorted_and_deduplicated() {
        let vocab = Vocabulary::from_terms(docs(&["dog", "cat", "dog", "bird"]));
        assert_eq!(vocab.terms().collect::<Vec<_>>(), vec!["bird", "cat", "dog"]);
        assert_eq!(vocab.index_of("cat"), Some(1));
        assert_eq!(vocab.index_of("cow"), None);
    }

    #[test]
    fn test_count_vectorizer_defaults() {
        let vectorizer = CountVectorizer::new().with_stop_words(["the"]);
        let corpus = docs(&["The cat sat on the mat", "a dog"]);
        let vocab = vectorizer.fit(&corpus);

        // Single-character tokens fall outside the default pattern.
        assert_eq!(
            vocab.terms().collect::<Vec<_>>(),
            vec!["cat", "dog", "mat", "on", "sat"]
        );
        let vectors = vectorizer.transform(&corpus, &vocab);
        assert_eq!(vectors, vec![vec![1, 0, 1, 1, 1], vec![0, 1, 0, 0, 0]]);
    }

    #[test]
    fn test_custom_token_pattern() {
        let vectorizer = CountVectorizer::new().with_token_pattern(r"\S+").unwrap();
        let vocab = vectorizer.fit(&docs(&["今 日 は 今"]));
        assert_eq!(vocab.len(), 3);
        assert_eq!(
            vectorizer.transform(&docs(&["今 今 x"]), &vocab)[0],
            vec![0, 2, 0]
        );
    }

    #[test]
    fn test_invalid_token_pattern() {
        assert!(matches!(
            CountVectorizer::new().with_token_pattern("("),
            Err(DatasetError::InvalidTokenPattern { .. })
        ));
    }

    #[test]
    fn test_fit_transform_all_fits_first_partition_only() {
        let adapter = VectorizerAdapter::new(CountVectorizer::new());
        let partitions = vec![docs(&["cat dog", "dog"]), docs(&["bird bird cat"])];

        let (vectors, vocab) = adapter.fit_transform_all(&partitions).unwrap();
        assert_eq!(vocab.terms().collect::<Vec<_>>(), vec!["cat", "dog"]);
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![vec![1, 1], vec![0, 1]]);
        assert_eq!(vectors[1], vec![vec![1, 0]]);
    }

    #[test]
    fn test_empty_fitting_set() {
        let adapter = VectorizerAdapter::new(CountVectorizer::new());
        assert!(matches!(
            adapter.fit_transform_all(&[]),
            Err(DatasetError::EmptyFittingSet)
        ));
        assert!(matches!(
            adapter.fit_transform_all(&[vec![], docs(&["cat"])]),
            Err(DatasetError::EmptyFittingSet)
        ));
    }

    #[test]
    fn test_fit_transform_with_explicit_fit_set() {
        let adapter = VectorizerAdapter::new(CountVectorizer::new());
        let train = docs(&["alpha beta"]);
        let test = docs(&["beta gamma"]);

        let (vectors, vocab) = adapter.fit_transform_with(&train, &[test.as_slice()]).unwrap();
        assert!(!vocab.contains("gamma"));
        assert_eq!(vectors, vec![vec![vec![0, 1]]]);
    }
}
