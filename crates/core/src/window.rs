//! Sliding context windows over the utterances of a single case.

use crate::corpus::{Case, Utterance};

/// Default text emitted for context slots before the start of a case.
pub const DEFAULT_PLACEHOLDER: &str = "<NA>";

/// Separator between context pieces and the target utterance.
pub const CONTEXT_SEPARATOR: char = '\t';

/// Prefix every utterance with the `window_size` utterances preceding it.
///
/// Pieces are ordered oldest first and the target utterance last, joined by
/// a tab. Slots that would fall before the start of the case are filled with
/// `placeholder`. A window of zero returns the case unchanged.
///
/// The result always has the same length and label sequence as `case`.
pub fn apply_window(case: &Case, window_size: usize, placeholder: &str) -> Case {
    if window_size == 0 {
        return case.clone();
    }

    let utterances = case.utterances();
    utterances
        .iter()
        .enumerate()
        .map(|(i, utterance)| Utterance {
            text: window_text(utterances, i, window_size, placeholder),
            label: utterance.label.clone(),
        })
        .collect()
}

fn window_text(utterances: &[Utterance], i: usize, window_size: usize, placeholder: &str) -> String {
    let mut text = String::new();
    for offset in (1..=window_size).rev() {
        let piece = match i.checked_sub(offset) {
            Some(j) => utterances[j].text.as_str(),
            None => placeholder,
        };
        text.push_str(piece);
        text.push(CONTEXT_SEPARATOR);
    }
    text.push_str(&utterances[i].text);
    text
}
