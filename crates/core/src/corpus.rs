//! Cases, utterances and the case-keyed collections built from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::window::apply_window;

/// The MITI behavioral code attached to an utterance.
///
/// Codes are kept as the raw cell text, so both numeric (`"3"`) and
/// symbolic (`"GI"`) annotation schemes are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MitiCode(pub String);

impl MitiCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MitiCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one case (transcript). Derived from the source file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CaseKey(pub String);

impl CaseKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CaseKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// One labeled line of dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Utterance {
    pub text: String,
    pub label: MitiCode,
}

impl Utterance {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: MitiCode::new(label),
        }
    }
}

/// An ordered transcript. Order defines adjacency for context windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Case {
    utterances: Vec<Utterance>,
}

impl Case {
    pub fn new(utterances: Vec<Utterance>) -> Self {
        Self { utterances }
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.utterances.iter().map(|u| u.text.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &MitiCode> {
        self.utterances.iter().map(|u| &u.label)
    }

    /// Newline-joined utterance texts, with a trailing newline after every
    /// utterance including the last.
    pub fn document_text(&self) -> String {
        let mut doc = String::new();
        for text in self.texts() {
            doc.push_str(text);
            doc.push('\n');
        }
        doc
    }
}

impl FromIterator<Utterance> for Case {
    fn from_iter<I: IntoIterator<Item = Utterance>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Windowed cases keyed by case. Iteration follows key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    cases: BTreeMap<CaseKey, Case>,
}

impl Corpus {
    pub fn get(&self, key: &CaseKey) -> Option<&Case> {
        self.cases.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CaseKey> {
        self.cases.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CaseKey, &Case)> {
        self.cases.iter()
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Total utterances across all cases.
    pub fn utterance_count(&self) -> usize {
        self.cases.values().map(Case::len).sum()
    }
}

/// Unwindowed full-case text blocks keyed by case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentView {
    documents: BTreeMap<CaseKey, String>,
}

impl DocumentView {
    pub fn get(&self, key: &CaseKey) -> Option<&str> {
        self.documents.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CaseKey> {
        self.documents.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CaseKey, &str)> {
        self.documents.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Build the windowed corpus and the document view from loaded cases.
///
/// The document view is taken from the unwindowed cases; each case is
/// windowed on its own, so context never crosses a case boundary.
pub fn assemble(
    cases: BTreeMap<CaseKey, Case>,
    window_size: usize,
    placeholder: &str,
) -> (Corpus, DocumentView) {
    let documents = cases
        .iter()
        .map(|(key, case)| (key.clone(), case.document_text()))
        .collect();

    let windowed = cases
        .into_iter()
        .map(|(key, case)| {
            let windowed = apply_window(&case, window_size, placeholder);
            (key, windowed)
        })
        .collect();

    (Corpus { cases: windowed }, DocumentView { documents })
}
