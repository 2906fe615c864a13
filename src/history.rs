//! The append-only bout log and its confusion-matrix / threshold-search
//! analysis.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::EloteError;

/// Attributes passed alongside a bout, consulted by the oracle and recorded
/// on the resulting [`Bout`].
pub type BoutAttributes = serde_json::Map<String, serde_json::Value>;

/// The recorded outcome of a single bout.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Outcome {
    /// The left competitor won.
    Left,
    /// The right competitor won.
    Right,
    /// The bout was a draw.
    Draw,
    /// The oracle declined to decide (e.g. equal inputs).
    None,
}

/// An immutable record of one dispatched bout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bout<Id> {
    left_id: Id,
    right_id: Id,
    predicted_prob_left_wins: f64,
    outcome: Outcome,
    attributes: BoutAttributes,
}

impl<Id> Bout<Id> {
    /// Creates a new bout record.
    #[must_use]
    pub fn new(
        left_id: Id,
        right_id: Id,
        predicted_prob_left_wins: f64,
        outcome: Outcome,
        attributes: BoutAttributes,
    ) -> Self {
        Bout {
            left_id,
            right_id,
            predicted_prob_left_wins,
            outcome,
            attributes,
        }
    }

    /// The left competitor's identifier.
    pub fn left_id(&self) -> &Id {
        &self.left_id
    }

    /// The right competitor's identifier.
    pub fn right_id(&self) -> &Id {
        &self.right_id
    }

    /// The model's pre-bout estimate that the left competitor would win.
    #[must_use]
    pub fn predicted_prob_left_wins(&self) -> f64 {
        self.predicted_prob_left_wins
    }

    /// The recorded outcome.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Attributes supplied alongside this bout.
    pub fn attributes(&self) -> &BoutAttributes {
        &self.attributes
    }
}

/// Counts produced by [`History::confusion_matrix`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ConfusionMatrix {
    /// Predicted LEFT wins, and it did.
    pub true_positive: u64,
    /// Predicted LEFT wins, but it didn't.
    pub false_positive: u64,
    /// Predicted RIGHT wins, and it did.
    pub true_negative: u64,
    /// Predicted RIGHT wins, but it didn't.
    pub false_negative: u64,
    /// The threshold band didn't produce a definite prediction, or the
    /// oracle itself declined to decide.
    pub do_nothing: u64,
}

impl ConfusionMatrix {
    /// Total number of bouts this matrix was computed over.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.true_positive
            + self.false_positive
            + self.true_negative
            + self.false_negative
            + self.do_nothing
    }

    /// `(tp + tn) / total`, or `0.0` if `total() == 0`.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positive + self.true_negative) as f64 / total as f64
        }
    }
}

/// The thresholds and accuracy [`History::random_search`] found to perform
/// best.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ThresholdSearchResult {
    /// Lower threshold.
    pub lo: f64,
    /// Upper threshold.
    pub hi: f64,
    /// The accuracy those thresholds achieved.
    pub accuracy: f64,
}

/// A summary produced by [`History::report_results`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Report {
    /// The confusion matrix at the default thresholds `(0.5, 0.5)`.
    pub matrix: ConfusionMatrix,
    /// `matrix.accuracy()`.
    pub accuracy: f64,
}

/// An append-only log of bout predictions and outcomes.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct History<Id> {
    bouts: Vec<Bout<Id>>,
}

impl<Id> History<Id> {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        History { bouts: Vec::new() }
    }

    /// Appends a bout record. The arena calls this once per dispatched
    /// pairing; records are never mutated afterwards.
    pub fn push(&mut self, bout: Bout<Id>) {
        self.bouts.push(bout);
    }

    /// All recorded bouts, in dispatch order.
    pub fn bouts(&self) -> &[Bout<Id>] {
        &self.bouts
    }

    /// Clears the history. The only way bouts are ever removed.
    pub fn clear(&mut self) {
        self.bouts.clear();
    }

    /// Computes a confusion matrix for a band `[lo, hi]`: predictions at or
    /// above `hi` are treated as "LEFT wins", predictions at or below `lo`
    /// as "RIGHT wins", and everything in between as "do nothing". A
    /// recorded [`Outcome::None`] is always `do_nothing`, regardless of the
    /// band; a recorded [`Outcome::Draw`] counts as incorrect whenever the
    /// band produced a definite prediction.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidThresholds`] if `lo > hi` or either is
    /// outside `[0, 1]`.
    pub fn confusion_matrix(&self, lo: f64, hi: f64) -> Result<ConfusionMatrix, EloteError> {
        validate_thresholds(lo, hi)?;

        let mut matrix = ConfusionMatrix::default();
        for bout in &self.bouts {
            if bout.outcome == Outcome::None {
                matrix.do_nothing += 1;
                continue;
            }

            let p = bout.predicted_prob_left_wins;
            if p >= hi {
                if bout.outcome == Outcome::Left {
                    matrix.true_positive += 1;
                } else {
                    matrix.false_positive += 1;
                }
            } else if p <= lo {
                if bout.outcome == Outcome::Right {
                    matrix.true_negative += 1;
                } else {
                    matrix.false_negative += 1;
                }
            } else {
                matrix.do_nothing += 1;
            }
        }

        Ok(matrix)
    }

    /// Samples `trials` threshold bands `(lo, hi)` uniformly from `[0,
    /// 1]^2` with `lo <= hi`, scores each by accuracy, and returns the best.
    /// Deterministic given `seed`.
    ///
    /// # Errors
    ///
    /// Never fails in practice; thresholds are always sampled in range, but
    /// the signature stays fallible since it shares [`Self::confusion_matrix`].
    pub fn random_search(
        &self,
        trials: u32,
        seed: u64,
    ) -> Result<ThresholdSearchResult, EloteError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut best = ThresholdSearchResult {
            lo: 0.0,
            hi: 1.0,
            accuracy: self.confusion_matrix(0.0, 1.0)?.accuracy(),
        };

        for _ in 0..trials {
            let x: f64 = rng.gen();
            let y: f64 = rng.gen();
            let (lo, hi) = if x <= y { (x, y) } else { (y, x) };

            let accuracy = self.confusion_matrix(lo, hi)?.accuracy();
            if accuracy > best.accuracy {
                best = ThresholdSearchResult { lo, hi, accuracy };
            }
        }

        Ok(best)
    }

    /// Overall counts and accuracy at the default thresholds `(0.5, 0.5)`.
    ///
    /// # Errors
    ///
    /// Never fails; `(0.5, 0.5)` is always a valid threshold pair. Fallible
    /// for consistency with [`Self::confusion_matrix`].
    pub fn report_results(&self) -> Result<Report, EloteError> {
        let matrix = self.confusion_matrix(0.5, 0.5)?;
        let accuracy = matrix.accuracy();
        Ok(Report { matrix, accuracy })
    }
}

fn validate_thresholds(lo: f64, hi: f64) -> Result<(), EloteError> {
    if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
        return Err(EloteError::InvalidThresholds { lo, hi });
    }
    Ok(())
}
