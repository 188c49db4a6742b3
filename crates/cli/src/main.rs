//! CLI tool for preparing MITI-coded dialogue transcripts.
//!
//! Reads one CSV/TSV transcript per case, adds a context window to every
//! utterance, splits whole cases into train and test partitions, and writes
//! tokenized, bag-of-words vectorized JSONL output.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use miti_dataset_core::{
    pipeline::{PipelineConfig, PipelineResult},
    prepare, write_jsonl_output, CharTokenizer, CountVectorizer, Rounding, TableFormat,
    Tokenizer, WhitespaceTokenizer, DEFAULT_FALLBACK_ENCODING, DEFAULT_PLACEHOLDER,
    DEFAULT_PRIMARY_ENCODING, DEFAULT_TOKEN_PATTERN,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TokenizerKind {
    /// Lowercased whitespace-separated words
    Whitespace,
    /// One token per character (unsegmented Japanese)
    Char,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoundingArg {
    Floor,
    Nearest,
}

impl From<RoundingArg> for Rounding {
    fn from(arg: RoundingArg) -> Self {
        match arg {
            RoundingArg::Floor => Rounding::Floor,
            RoundingArg::Nearest => Rounding::Nearest,
        }
    }
}

/// Prepare MITI dialogue transcripts for utterance classification.
#[derive(Parser, Debug)]
#[command(name = "miti-prepare")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing one transcript file per case
    #[arg(long)]
    data_dir: PathBuf,

    /// Output directory for JSONL files
    #[arg(long)]
    output_dir: PathBuf,

    /// Source file extension: csv or tsv
    #[arg(long, default_value = "csv")]
    extension: String,

    /// Number of preceding utterances prepended as context
    #[arg(long, default_value = "0")]
    window_size: usize,

    /// Text used for context slots before the start of a case
    #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
    placeholder: String,

    /// Fraction of cases assigned to training (0.0-1.0)
    #[arg(long, default_value = "0.8")]
    train_ratio: f64,

    /// Seed for the case permutation; omit for a non-reproducible split
    #[arg(long)]
    seed: Option<u64>,

    /// How the fractional number of training cases is rounded
    #[arg(long, value_enum, default_value = "floor")]
    rounding: RoundingArg,

    /// Encoding tried first when decoding source files
    #[arg(long, default_value = DEFAULT_PRIMARY_ENCODING)]
    primary_encoding: String,

    /// Encoding tried when the primary one fails
    #[arg(long, default_value = DEFAULT_FALLBACK_ENCODING)]
    fallback_encoding: String,

    /// Tokenizer applied before vectorization
    #[arg(long, value_enum, default_value = "whitespace")]
    tokenizer: TokenizerKind,

    /// Vectorizer token pattern (defaults depend on the tokenizer)
    #[arg(long)]
    token_pattern: Option<String>,

    /// File with one stop word per line
    #[arg(long)]
    stop_words: Option<PathBuf>,
}

fn load_stop_words(path: Option<&PathBuf>) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "miti_prepare=info,miti_dataset_core=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = PipelineConfig {
        format: args.extension.parse::<TableFormat>()?,
        window_size: args.window_size,
        placeholder: args.placeholder.clone(),
        train_ratio: args.train_ratio,
        seed: args.seed,
        rounding: args.rounding.into(),
        primary_encoding: args.primary_encoding.clone(),
        fallback_encoding: args.fallback_encoding.clone(),
    };

    let tokenizer: Box<dyn Tokenizer> = match args.tokenizer {
        TokenizerKind::Whitespace => Box::new(WhitespaceTokenizer),
        TokenizerKind::Char => Box::new(CharTokenizer),
    };
    let token_pattern = match (&args.token_pattern, args.tokenizer) {
        (Some(pattern), _) => pattern.clone(),
        (None, TokenizerKind::Char) => r"\S+".to_string(),
        (None, TokenizerKind::Whitespace) => DEFAULT_TOKEN_PATTERN.to_string(),
    };
    let stop_words = load_stop_words(args.stop_words.as_ref())?;
    tracing::info!("Using {} stop words", stop_words.len());

    let vectorizer = CountVectorizer::new()
        .with_token_pattern(&token_pattern)?
        .with_stop_words(stop_words);

    println!("Preparing cases from {:?}...", args.data_dir);
    let prepared = prepare(&args.data_dir, tokenizer.as_ref(), vectorizer, &config)?;

    println!("Writing output to {:?}...", args.output_dir);
    let result: PipelineResult = write_jsonl_output(&prepared, &args.output_dir)?;

    let metadata_path = args.output_dir.join("metadata.json");
    let metadata = serde_json::json!({
        "config": {
            "data_dir": args.data_dir.to_string_lossy(),
            "output_dir": args.output_dir.to_string_lossy(),
            "pipeline": config,
            "tokenizer": format!("{:?}", args.tokenizer).to_lowercase(),
            "token_pattern": token_pattern,
        },
        "counts": result,
        "split": {
            "train": prepared.split.train,
            "test": prepared.split.test,
        },
        "files": {
            "train_path": args.output_dir.join("training.jsonl").to_string_lossy(),
            "test_path": args.output_dir.join("test.jsonl").to_string_lossy(),
            "documents_path": args.output_dir.join("documents.jsonl").to_string_lossy(),
            "vocabulary_path": args.output_dir.join("vocabulary.json").to_string_lossy(),
        },
    });
    std::fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;

    println!("\n[summary]");
    println!("  Total cases: {}", result.total_cases);
    println!("  Train cases: {} ({} utterances)", result.train_cases, result.train_utterances);
    println!("  Test cases: {} ({} utterances)", result.test_cases, result.test_utterances);
    println!("  Vocabulary size: {}", result.vocabulary_size);
    println!("  Output: {:?}/{{training,test}}.jsonl", args.output_dir);
    println!("  Metadata: {:?}", metadata_path);

    Ok(())
}
