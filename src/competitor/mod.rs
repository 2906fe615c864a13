//! The [`Competitor`] capability and the four concrete rating-state variants
//! that implement it.

mod dwz;
mod ecf;
mod elo;
mod glicko;

pub use dwz::{DwzCompetitor, DwzConfig};
pub use ecf::{EcfCompetitor, EcfConfig};
pub use elo::{EloCompetitor, EloConfig};
pub use glicko::{GlickoCompetitor, GlickoConfig};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EloteError;
use crate::state::StateDoc;

/// Tags which of the four rating-state variants a competitor or state
/// document is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum CompetitorKind {
    /// Classic Elo.
    #[serde(rename = "EloCompetitor")]
    Elo,
    /// Glicko-1, per spec §4.1.2.
    #[serde(rename = "GlickoCompetitor")]
    Glicko,
    /// English Chess Federation grading.
    #[serde(rename = "ECFCompetitor")]
    Ecf,
    /// German Chess Federation `Deutsche Wertungszahl`.
    #[serde(rename = "DWZCompetitor")]
    Dwz,
}

impl fmt::Display for CompetitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompetitorKind::Elo => "EloCompetitor",
            CompetitorKind::Glicko => "GlickoCompetitor",
            CompetitorKind::Ecf => "ECFCompetitor",
            CompetitorKind::Dwz => "DWZCompetitor",
        };
        f.write_str(s)
    }
}

/// The capability every rating-state variant exposes.
///
/// Operations between two competitors (`expected_score`, `beat`, `tied`,
/// `lost_to`) require both sides to be the same concrete type; Rust's type
/// system enforces the homogeneous-pairing rule from spec §4.1 at compile
/// time for direct use. Type-erased callers (the arena, the ensemble) check
/// [`CompetitorKind`] at runtime and surface [`EloteError::TypeMismatch`].
pub trait Competitor: Sized {
    /// The variant's class-level tunables, duplicated into each instance at
    /// construction (see spec §9's note on class variables).
    type Config: Copy;

    /// Current rating.
    #[must_use]
    fn rating(&self) -> f64;

    /// This competitor's variant tag.
    #[must_use]
    fn kind(&self) -> CompetitorKind;

    /// The hard floor below which `rating` may never drop.
    #[must_use]
    fn minimum_rating(&self) -> f64;

    /// This competitor's class-level tunables.
    #[must_use]
    fn config(&self) -> Self::Config;

    /// Replaces this competitor's class-level tunables. Used by the arena's
    /// `set_competitor_class_var` to propagate a change to every live
    /// competitor of a variant.
    fn set_config(&mut self, config: Self::Config);

    /// Probability that `self` beats `other`, in `[0, 1]`.
    #[must_use]
    fn expected_score(&self, other: &Self) -> f64;

    /// Registers a win of `self` over `other`; mutates both sides.
    fn beat(&mut self, other: &mut Self);

    /// Registers a win of `other` over `self`; mutates both sides.
    fn lost_to(&mut self, other: &mut Self) {
        other.beat(self);
    }

    /// Registers a draw; mutates both sides symmetrically.
    fn tied(&mut self, other: &mut Self);

    /// Restores the construction-time rating and variant-specific state.
    fn reset(&mut self);

    /// Serializes this competitor to a self-describing [`StateDoc`].
    #[must_use]
    fn export_state(&self) -> StateDoc;

    /// Deserializes a competitor from a [`StateDoc`], failing with
    /// [`EloteError::InvalidState`] if `doc.kind()` doesn't match this
    /// variant or a required field is missing.
    fn from_state(doc: &StateDoc) -> Result<Self, EloteError>;

    /// Clamps `rating` to the floor. Internal clamping after a mathematical
    /// update is policy, not an error; this is the single place every
    /// variant funnels through after an update.
    fn clamp_to_floor(rating: f64, minimum_rating: f64) -> f64 {
        rating.max(minimum_rating)
    }
}
