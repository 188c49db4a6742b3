//! Table loader: one CSV/TSV file per case.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use encoding_rs::Encoding;
use serde::Serialize;
use walkdir::WalkDir;

use crate::corpus::{Case, CaseKey, Utterance};
use crate::error::{DatasetError, Result};

/// Column holding the utterance text.
pub const DIALOGUE_COLUMN: &str = "dialogue";
/// Column holding the MITI code.
pub const MITI_CODE_COLUMN: &str = "MITI_code";

// Short Japanese UTF-8 text can also be valid Shift_JIS, so UTF-8 goes first.
pub const DEFAULT_PRIMARY_ENCODING: &str = "utf-8";
pub const DEFAULT_FALLBACK_ENCODING: &str = "shift_jis";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Source file flavour. Determines both the extension and the separator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Csv,
    Tsv,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Tsv => "tsv",
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            TableFormat::Csv => b',',
            TableFormat::Tsv => b'\t',
        }
    }
}

impl FromStr for TableFormat {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(TableFormat::Csv),
            "tsv" => Ok(TableFormat::Tsv),
            other => Err(DatasetError::UnsupportedExtension(other.to_string())),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How source tables are read.
#[derive(Debug, Clone, Copy)]
pub struct LoaderOptions {
    pub format: TableFormat,
    pub primary_encoding: &'static Encoding,
    pub fallback_encoding: &'static Encoding,
}

impl LoaderOptions {
    /// Resolve WHATWG encoding labels such as `"shift_jis"` or `"utf-8"`.
    pub fn from_labels(format: TableFormat, primary: &str, fallback: &str) -> Result<Self> {
        Ok(Self {
            format,
            primary_encoding: resolve_encoding(primary)?,
            fallback_encoding: resolve_encoding(fallback)?,
        })
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            format: TableFormat::Csv,
            primary_encoding: encoding_rs::UTF_8,
            fallback_encoding: encoding_rs::SHIFT_JIS,
        }
    }
}

fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| DatasetError::UnknownEncoding(label.to_string()))
}

/// List `<dir>/*.<ext>` for the given format, sorted by path.
///
/// Only the top level of `dir` is searched. Symlinks are followed, and an
/// entry that cannot be read fails the whole listing.
pub fn discover_sources(dir: &Path, format: TableFormat) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DatasetError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| DatasetError::Discovery {
            dir: dir.to_path_buf(),
            source,
        })?;
        let matches_format = entry
            .path()
            .extension()
            .map_or(false, |ext| ext == format.extension());
        if entry.file_type().is_file() && matches_format {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(DatasetError::EmptyDirectory {
            dir: dir.to_path_buf(),
            extension: format.extension().to_string(),
        });
    }
    Ok(paths)
}

/// The case key of a source file: its file stem.
pub fn case_key_for(path: &Path) -> CaseKey {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    CaseKey(stem)
}

/// Read one source table into a case.
pub fn load(path: &Path, options: &LoaderOptions) -> Result<Case> {
    if !path.is_file() {
        return Err(DatasetError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    let text = decode(path, &bytes, options)?;
    let case = parse_table(path, &text, options.format)?;

    tracing::info!("Read {} utterances from {}", case.len(), path.display());
    Ok(case)
}

/// Load every source table in `dir`, keyed by case.
pub fn load_cases(dir: &Path, options: &LoaderOptions) -> Result<BTreeMap<CaseKey, Case>> {
    let paths = discover_sources(dir, options.format)?;

    let mut cases = BTreeMap::new();
    for path in paths {
        let case = load(&path, options)?;
        insert_case(&mut cases, case_key_for(&path), &path, case)?;
    }

    tracing::info!("Loaded {} cases from {}", cases.len(), dir.display());
    Ok(cases)
}

/// File stems are converted lossily, so two distinct names can share a key.
fn insert_case(
    cases: &mut BTreeMap<CaseKey, Case>,
    key: CaseKey,
    path: &Path,
    case: Case,
) -> Result<()> {
    if cases.contains_key(&key) {
        return Err(DatasetError::DuplicateCase {
            key,
            path: path.to_path_buf(),
        });
    }
    cases.insert(key, case);
    Ok(())
}

fn decode<'a>(path: &Path, bytes: &'a [u8], options: &LoaderOptions) -> Result<Cow<'a, str>> {
    if let Some(text) = decode_strict(bytes, options.primary_encoding) {
        return Ok(text);
    }

    tracing::warn!(
        "{} is not valid {}, retrying with {}",
        path.display(),
        options.primary_encoding.name(),
        options.fallback_encoding.name()
    );

    decode_strict(bytes, options.fallback_encoding).ok_or_else(|| DatasetError::MalformedTable {
        path: path.to_path_buf(),
        reason: format!(
            "bytes are neither valid {} nor valid {}",
            options.primary_encoding.name(),
            options.fallback_encoding.name()
        ),
    })
}

fn decode_strict<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    let bytes = if encoding == encoding_rs::UTF_8 {
        bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
    } else {
        bytes
    };
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
}

fn parse_table(path: &Path, text: &str, format: TableFormat) -> Result<Case> {
    let malformed = |reason: String| DatasetError::MalformedTable {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter())
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| malformed(e.to_string()))?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| malformed(format!("missing required column '{}'", name)))
    };
    let dialogue_idx = column(DIALOGUE_COLUMN)?;
    let code_idx = column(MITI_CODE_COLUMN)?;

    let mut utterances = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        let text = record.get(dialogue_idx).unwrap_or("");
        let code = record.get(code_idx).unwrap_or("").trim();
        utterances.push(Utterance::new(text, code));
    }

    Ok(Case::new(utterances))
}
