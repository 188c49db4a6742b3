//! Dataset preparation for MITI-coded motivational-interviewing dialogue.
//!
//! This crate loads one transcript table per case, prefixes each utterance
//! with a window of preceding utterances, splits cases (never utterances)
//! into train and test sets, and builds a bag-of-words vectorization fit on
//! the training partition only.

/// Trait for tokenization operations.
///
/// Implementors return the lemmas of `text` joined by single spaces, with
/// sentence boundaries rendered as ordinary word spacing. See
/// [`join_sentence_lemmas`] for the joining rule.
pub trait Tokenizer {
    /// Tokenize and lemmatize `text`.
    fn tokenize(&self, text: &str) -> String;
}

// Blanket implementation for references to Tokenizers
impl<T: Tokenizer + ?Sized> Tokenizer for &T {
    fn tokenize(&self, text: &str) -> String {
        (*self).tokenize(text)
    }
}

mod corpus;
mod error;
mod flatten;
mod helpers;
mod loader;
pub mod pipeline;
mod split;
mod tokenize;
mod vectorize;
mod window;

pub use corpus::{assemble, Case, CaseKey, Corpus, DocumentView, MitiCode, Utterance};
pub use error::{DatasetError, Result};
pub use flatten::{flatten, FlatDataset};
pub use helpers::{join_sentence_lemmas, split_sentences};
pub use loader::{
    case_key_for, discover_sources, load, load_cases, LoaderOptions, TableFormat,
    DEFAULT_FALLBACK_ENCODING, DEFAULT_PRIMARY_ENCODING, DIALOGUE_COLUMN, MITI_CODE_COLUMN,
};
pub use pipeline::{
    load_corpus, prepare, write_jsonl_output, Partition, PipelineConfig, PipelineResult,
    PreparedDataset,
};
pub use split::{split_discourse, train_count, Rounding, Split};
pub use tokenize::{tokenize_all, CharTokenizer, WhitespaceTokenizer};
pub use vectorize::{
    BowVector, CountVectorizer, Vectorizer, VectorizerAdapter, Vocabulary, DEFAULT_TOKEN_PATTERN,
};
pub use window::{apply_window, CONTEXT_SEPARATOR, DEFAULT_PLACEHOLDER};
