//! Discourse-level train/test splitting.
//!
//! Context windows make neighbouring utterances of a case share text, so
//! whole cases are assigned to one side of the split. Splitting individual
//! utterances would leak windowed context across the boundary.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::corpus::CaseKey;
use crate::error::{DatasetError, Result};

/// How the fractional train size is turned into a case count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Truncate: 5 cases at 0.8 gives 4 train cases, 0.5 of 5 gives 2.
    #[default]
    Floor,
    /// Round half away from zero: 0.5 of 5 gives 3.
    Nearest,
}

impl Rounding {
    fn apply(self, value: f64) -> usize {
        match self {
            Rounding::Floor => value.floor() as usize,
            Rounding::Nearest => value.round() as usize,
        }
    }
}

/// A partition of the case keys into disjoint train and test sets.
///
/// Both sides keep the order of the shuffled permutation they were cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    pub train: Vec<CaseKey>,
    pub test: Vec<CaseKey>,
}

/// Number of train cases for `total` cases at `train_ratio`.
pub fn train_count(total: usize, train_ratio: f64, rounding: Rounding) -> Result<usize> {
    if !train_ratio.is_finite() || !(0.0..=1.0).contains(&train_ratio) {
        return Err(DatasetError::InvalidRatio(train_ratio));
    }
    Ok(rounding.apply(total as f64 * train_ratio).min(total))
}

/// Shuffle the case keys and cut them into train and test sets.
///
/// A fixed `seed` with the same input order always yields the same split;
/// `None` draws the permutation from OS entropy.
pub fn split_discourse(
    keys: &[CaseKey],
    train_ratio: f64,
    seed: Option<u64>,
    rounding: Rounding,
) -> Result<Split> {
    let num_train = train_count(keys.len(), train_ratio, rounding)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut permutation = keys.to_vec();
    permutation.shuffle(&mut rng);

    let test = permutation.split_off(num_train);
    tracing::debug!(
        "Discourse split: {} train cases, {} test cases (ratio {})",
        permutation.len(),
        test.len(),
        train_ratio
    );

    Ok(Split {
        train: permutation,
        test,
    })
}
