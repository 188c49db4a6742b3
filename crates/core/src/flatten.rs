//! Flatten selected cases into parallel text/label sequences.

use serde::Serialize;

use crate::corpus::{CaseKey, Corpus, MitiCode};
use crate::error::{DatasetError, Result};

/// Parallel, equal-length sequences ready for a classifier.
///
/// `case_keys[i]` names the case that `texts[i]` and `labels[i]` came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatDataset {
    pub texts: Vec<String>,
    pub labels: Vec<MitiCode>,
    pub case_keys: Vec<CaseKey>,
}

impl FlatDataset {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Concatenate the utterances of `keys`, in the given key order and in
/// stored utterance order within each case.
pub fn flatten(corpus: &Corpus, keys: &[CaseKey]) -> Result<FlatDataset> {
    let mut dataset = FlatDataset::default();

    for key in keys {
        let case = corpus
            .get(key)
            .ok_or_else(|| DatasetError::KeyNotFound { key: key.clone() })?;

        for utterance in case.utterances() {
            dataset.texts.push(utterance.text.clone());
            dataset.labels.push(utterance.label.clone());
            dataset.case_keys.push(key.clone());
        }
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{assemble, Case, Utterance};
    use std::collections::BTreeMap;

    fn corpus() -> Corpus {
        let mut cases = BTreeMap::new();
        cases.insert(
            CaseKey::from("a"),
            Case::new(vec![Utterance::new("a1", "1"), Utterance::new("a2", "2")]),
        );
        cases.insert(CaseKey::from("b"), Case::new(vec![Utterance::new("b1", "3")]));
        assemble(cases, 0, "<NA>").0
    }

    #[test]
    fn test_flatten_follows_key_order() {
        let flat = flatten(&corpus(), &["b".into(), "a".into()]).unwrap();
        assert_eq!(flat.texts, vec!["b1", "a1", "a2"]);
        assert_eq!(
            flat.labels,
            vec![MitiCode::new("3"), MitiCode::new("1"), MitiCode::new("2")]
        );
        let keys: Vec<&str> = flat.case_keys.iter().map(CaseKey::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "a"]);
    }

    #[test]
    fn test_flatten_no_keys() {
        let flat = flatten(&corpus(), &[]).unwrap();
        assert!(flat.is_empty());
        assert!(flat.labels.is_empty());
    }

    #[test]
    fn test_flatten_unknown_key() {
        let err = flatten(&corpus(), &["a".into(), "zz".into()]).unwrap_err();
        assert!(matches!(err, DatasetError::KeyNotFound { ref key } if key.as_str() == "zz"));
    }
}
