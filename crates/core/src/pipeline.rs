//! Pipeline for turning a directory of case tables into vectorized
//! train/test partitions.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::corpus::{assemble, CaseKey, Corpus, DocumentView, MitiCode};
use crate::error::Result;
use crate::flatten::{flatten, FlatDataset};
use crate::loader::{
    load_cases, LoaderOptions, TableFormat, DEFAULT_FALLBACK_ENCODING, DEFAULT_PRIMARY_ENCODING,
};
use crate::split::{split_discourse, Rounding, Split};
use crate::tokenize::tokenize_all;
use crate::vectorize::{BowVector, Vectorizer, VectorizerAdapter, Vocabulary};
use crate::window::DEFAULT_PLACEHOLDER;
use crate::Tokenizer;

/// Configuration for the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub format: TableFormat,
    pub window_size: usize,
    pub placeholder: String,
    pub train_ratio: f64,
    pub seed: Option<u64>,
    pub rounding: Rounding,
    pub primary_encoding: String,
    pub fallback_encoding: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            format: TableFormat::Csv,
            window_size: 0,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            train_ratio: 0.8,
            seed: None,
            rounding: Rounding::Floor,
            primary_encoding: DEFAULT_PRIMARY_ENCODING.to_string(),
            fallback_encoding: DEFAULT_FALLBACK_ENCODING.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn loader_options(&self) -> Result<LoaderOptions> {
        LoaderOptions::from_labels(self.format, &self.primary_encoding, &self.fallback_encoding)
    }
}

/// A flat partition with its tokenized texts and count vectors.
#[derive(Debug, Clone)]
pub struct Partition {
    pub dataset: FlatDataset,
    pub tokens: Vec<String>,
    pub vectors: Vec<BowVector>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

/// Everything produced by one run of [`prepare`].
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub corpus: Corpus,
    pub documents: DocumentView,
    pub split: Split,
    pub train: Partition,
    pub test: Partition,
    pub vocabulary: Vocabulary,
}

/// Summary of written output.
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub total_cases: usize,
    pub train_cases: usize,
    pub test_cases: usize,
    pub train_utterances: usize,
    pub test_utterances: usize,
    pub vocabulary_size: usize,
}

/// One utterance record in the JSONL output.
#[derive(Debug, Serialize)]
pub struct UtteranceRecord<'a> {
    pub case: &'a CaseKey,
    pub text: &'a str,
    pub tokens: &'a str,
    pub label: &'a MitiCode,
    pub vector: &'a BowVector,
}

/// One case record in the document JSONL output.
#[derive(Debug, Serialize)]
pub struct DocumentRecord<'a> {
    pub case: &'a CaseKey,
    pub text: &'a str,
}

/// Load every case in `dir` and build the windowed corpus and document view.
pub fn load_corpus(dir: &Path, config: &PipelineConfig) -> Result<(Corpus, DocumentView)> {
    let options = config.loader_options()?;
    let cases = load_cases(dir, &options)?;
    let (corpus, documents) = assemble(cases, config.window_size, &config.placeholder);

    tracing::info!(
        "Assembled {} cases ({} utterances) with a context window of {}",
        corpus.len(),
        corpus.utterance_count(),
        config.window_size
    );
    Ok((corpus, documents))
}

/// Run the whole preparation: load, window, split by case, flatten,
/// tokenize, then fit the vectorizer on the training partition alone.
pub fn prepare<T, V>(
    dir: &Path,
    tokenizer: &T,
    vectorizer: V,
    config: &PipelineConfig,
) -> Result<PreparedDataset>
where
    T: Tokenizer + ?Sized,
    V: Vectorizer,
{
    let (corpus, documents) = load_corpus(dir, config)?;

    let keys: Vec<CaseKey> = corpus.keys().cloned().collect();
    let split = split_discourse(&keys, config.train_ratio, config.seed, config.rounding)?;
    tracing::info!(
        "Split {} cases into {} train / {} test",
        keys.len(),
        split.train.len(),
        split.test.len()
    );

    let train = flatten(&corpus, &split.train)?;
    let test = flatten(&corpus, &split.test)?;

    let train_tokens = tokenize_all(tokenizer, &train.texts);
    let test_tokens = tokenize_all(tokenizer, &test.texts);

    let adapter = VectorizerAdapter::new(vectorizer);
    let (vectors, vocabulary) = adapter.fit_transform_with(
        &train_tokens,
        &[train_tokens.as_slice(), test_tokens.as_slice()],
    )?;
    let mut vectors = vectors.into_iter();
    let train_vectors = vectors.next().unwrap_or_default();
    let test_vectors = vectors.next().unwrap_or_default();

    tracing::info!("Vocabulary has {} terms", vocabulary.len());

    Ok(PreparedDataset {
        corpus,
        documents,
        split,
        train: Partition {
            dataset: train,
            tokens: train_tokens,
            vectors: train_vectors,
        },
        test: Partition {
            dataset: test,
            tokens: test_tokens,
            vectors: test_vectors,
        },
        vocabulary,
    })
}

/// Write `training.jsonl`, `test.jsonl`, `documents.jsonl` and
/// `vocabulary.json` under `output_dir`.
pub fn write_jsonl_output(prepared: &PreparedDataset, output_dir: &Path) -> Result<PipelineResult> {
    std::fs::create_dir_all(output_dir)?;

    write_partition(&prepared.train, &output_dir.join("training.jsonl"))?;
    write_partition(&prepared.test, &output_dir.join("test.jsonl"))?;

    let mut documents = BufWriter::new(File::create(output_dir.join("documents.jsonl"))?);
    for (case, text) in prepared.documents.iter() {
        let line = serde_json::to_string(&DocumentRecord { case, text })?;
        writeln!(documents, "{}", line)?;
    }
    documents.flush()?;

    let vocabulary = BufWriter::new(File::create(output_dir.join("vocabulary.json"))?);
    serde_json::to_writer_pretty(vocabulary, &prepared.vocabulary)?;

    Ok(PipelineResult {
        total_cases: prepared.corpus.len(),
        train_cases: prepared.split.train.len(),
        test_cases: prepared.split.test.len(),
        train_utterances: prepared.train.len(),
        test_utterances: prepared.test.len(),
        vocabulary_size: prepared.vocabulary.len(),
    })
}

fn write_partition(partition: &Partition, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    let dataset = &partition.dataset;

    for i in 0..dataset.len() {
        let record = UtteranceRecord {
            case: &dataset.case_keys[i],
            text: &dataset.texts[i],
            tokens: &partition.tokens[i],
            label: &dataset.labels[i],
            vector: &partition.vectors[i],
        };
        writeln!(file, "{}", serde_json::to_string(&record)?)?;
    }

    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatasetError;
    use crate::tokenize::WhitespaceTokenizer;
    use crate::vectorize::CountVectorizer;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_case(dir: &Path, name: &str, rows: &[(&str, &str)]) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        writeln!(file, "dialogue,MITI_code").unwrap();
        for (text, code) in rows {
            writeln!(file, "{},{}", text, code).unwrap();
        }
    }

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        write_case(temp.path(), "X.csv", &[("hello there", "1"), ("how are things", "2")]);
        write_case(
            temp.path(),
            "Y.csv",
            &[("good morning", "1"), ("morning walk", "3"), ("nice weather", "2")],
        );
        temp
    }

    #[test]
    fn test_default_config_serializes_for_metadata() {
        let value = serde_json::to_value(PipelineConfig::default()).unwrap();
        assert_eq!(value["format"], "csv");
        assert_eq!(value["rounding"], "floor");
        assert_eq!(value["primary_encoding"], "utf-8");
        assert_eq!(value["fallback_encoding"], "shift_jis");
    }

    #[test]
    fn test_load_corpus() {
        let temp = fixture();
        let config = PipelineConfig {
            window_size: 1,
            ..Default::default()
        };

        let (corpus, documents) = load_corpus(temp.path(), &config).unwrap();
        assert_eq!(corpus.len(), 2);
        let x: Vec<_> = corpus.get(&"X".into()).unwrap().texts().collect();
        assert_eq!(x, vec!["<NA>\thello there", "hello there\thow are things"]);
        assert_eq!(documents.get(&"X".into()), Some("hello there\nhow are things\n"));
    }

    #[test]
    fn test_prepare_all_train() {
        let temp = fixture();
        let config = PipelineConfig {
            window_size: 1,
            train_ratio: 1.0,
            seed: Some(0),
            ..Default::default()
        };

        let prepared =
            prepare(temp.path(), &WhitespaceTokenizer, CountVectorizer::new(), &config).unwrap();
        assert_eq!(prepared.train.len(), 5);
        assert!(prepared.test.is_empty());
        assert!(prepared.test.vectors.is_empty());
        assert_eq!(prepared.train.vectors.len(), 5);
        assert!(prepared.vocabulary.contains("morning"));
        // The placeholder becomes an ordinary term.
        assert!(prepared.vocabulary.contains("na"));
    }

    #[test]
    fn test_prepare_empty_training_partition() {
        let temp = fixture();
        let config = PipelineConfig {
            train_ratio: 0.0,
            seed: Some(0),
            ..Default::default()
        };

        let err = prepare(temp.path(), &WhitespaceTokenizer, CountVectorizer::new(), &config)
            .unwrap_err();
        assert!(matches!(err, DatasetError::EmptyFittingSet));
    }

    #[test]
    fn test_write_jsonl_output() {
        let temp = fixture();
        let out = TempDir::new().unwrap();
        let config = PipelineConfig {
            train_ratio: 0.5,
            seed: Some(7),
            ..Default::default()
        };

        let prepared =
            prepare(temp.path(), &WhitespaceTokenizer, CountVectorizer::new(), &config).unwrap();
        let result = write_jsonl_output(&prepared, out.path()).unwrap();

        assert_eq!(result.total_cases, 2);
        assert_eq!(result.train_cases, 1);
        assert_eq!(result.test_cases, 1);
        assert_eq!(result.train_utterances + result.test_utterances, 5);

        let training = std::fs::read_to_string(out.path().join("training.jsonl")).unwrap();
        assert_eq!(training.lines().count(), result.train_utterances);
        let first: serde_json::Value = serde_json::from_str(training.lines().next().unwrap()).unwrap();
        assert!(first["label"].is_string());
        assert_eq!(
            first["vector"].as_array().unwrap().len(),
            result.vocabulary_size
        );

        let documents = std::fs::read_to_string(out.path().join("documents.jsonl")).unwrap();
        assert_eq!(documents.lines().count(), 2);
        assert!(out.path().join("vocabulary.json").exists());
    }
}
