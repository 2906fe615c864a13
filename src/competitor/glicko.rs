//! Glicko-1, per spec §4.1.2: ratings and expected scores on the original
//! 400-point Glicko scale, without Glicko-2's internal rescaling step (see
//! DESIGN.md for why this implementation stays on the public scale
//! throughout rather than following the teacher's Glicko-2 conversion).

use serde_json::json;

use crate::competitor::{Competitor, CompetitorKind};
use crate::constants;
use crate::error::EloteError;
use crate::rating_math::{glicko_decay, glicko_expected_score, glicko_update};
use crate::state::StateDoc;

/// Glicko's class-level tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlickoConfig {
    /// Inactivity decay constant used by [`GlickoCompetitor::decay`].
    pub c: f64,
}

impl Default for GlickoConfig {
    fn default() -> Self {
        GlickoConfig {
            c: constants::DEFAULT_GLICKO_C,
        }
    }
}

/// A Glicko-rated competitor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlickoCompetitor {
    rating: f64,
    initial_rating: f64,
    deviation: f64,
    initial_deviation: f64,
    minimum_rating: f64,
    config: GlickoConfig,
}

impl GlickoCompetitor {
    /// Creates a new competitor at `initial_rating` with the default
    /// starting deviation ([`constants::DEFAULT_RATING_DEVIATION`]), the
    /// default floor, and the default [`GlickoConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if `initial_rating` is below
    /// the floor.
    pub fn new(initial_rating: f64) -> Result<Self, EloteError> {
        Self::with_config(
            initial_rating,
            constants::DEFAULT_RATING_DEVIATION,
            constants::DEFAULT_MINIMUM_RATING,
            GlickoConfig::default(),
        )
    }

    /// Creates a new competitor with an explicit starting deviation, floor,
    /// and config.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if `initial_rating` is below
    /// `minimum_rating`, or if `deviation` isn't in `(0, 350]`.
    pub fn with_config(
        initial_rating: f64,
        deviation: f64,
        minimum_rating: f64,
        config: GlickoConfig,
    ) -> Result<Self, EloteError> {
        if initial_rating < minimum_rating {
            return Err(EloteError::InvalidParameter {
                name: "initial_rating",
                reason: format!("{initial_rating} is below the floor {minimum_rating}"),
            });
        }
        if !(deviation > 0.0 && deviation <= constants::GLICKO_MAX_RATING_DEVIATION) {
            return Err(EloteError::InvalidParameter {
                name: "deviation",
                reason: format!(
                    "{deviation} is outside (0, {}]",
                    constants::GLICKO_MAX_RATING_DEVIATION
                ),
            });
        }

        Ok(GlickoCompetitor {
            rating: initial_rating,
            initial_rating,
            deviation,
            initial_deviation: deviation,
            minimum_rating,
            config,
        })
    }

    /// Current rating deviation (uncertainty). Higher means less confident.
    #[must_use]
    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    /// Applies Glicko's inactivity decay for `elapsed_periods` rating
    /// periods, growing `deviation` without otherwise touching `rating`.
    /// Distinct from `beat`/`tied`, per spec §9.
    pub fn decay(&mut self, elapsed_periods: f64) {
        self.deviation = glicko_decay(
            self.deviation,
            self.config.c,
            elapsed_periods,
            constants::GLICKO_MAX_RATING_DEVIATION,
        );
    }
}

impl Competitor for GlickoCompetitor {
    type Config = GlickoConfig;

    fn rating(&self) -> f64 {
        self.rating
    }

    fn kind(&self) -> CompetitorKind {
        CompetitorKind::Glicko
    }

    fn minimum_rating(&self) -> f64 {
        self.minimum_rating
    }

    fn config(&self) -> GlickoConfig {
        self.config
    }

    fn set_config(&mut self, config: GlickoConfig) {
        self.config = config;
    }

    fn expected_score(&self, other: &Self) -> f64 {
        glicko_expected_score(self.rating, other.rating, other.deviation)
    }

    fn beat(&mut self, other: &mut Self) {
        apply_update(self, other, 1.0, 0.0);
    }

    fn tied(&mut self, other: &mut Self) {
        apply_update(self, other, 0.5, 0.5);
    }

    fn reset(&mut self) {
        self.rating = self.initial_rating;
        self.deviation = self.initial_deviation;
    }

    fn export_state(&self) -> StateDoc {
        let mut parameters = serde_json::Map::new();
        parameters.insert("initial_rating".into(), json!(self.initial_rating));
        parameters.insert("initial_deviation".into(), json!(self.initial_deviation));
        parameters.insert("minimum_rating".into(), json!(self.minimum_rating));

        let mut state = serde_json::Map::new();
        state.insert("rating".into(), json!(self.rating));
        state.insert("rd".into(), json!(self.deviation));

        let mut class_vars = serde_json::Map::new();
        class_vars.insert("c".into(), json!(self.config.c));

        StateDoc::new(CompetitorKind::Glicko, parameters, state, class_vars)
    }

    fn from_state(doc: &StateDoc) -> Result<Self, EloteError> {
        doc.require_kind(CompetitorKind::Glicko)?;

        let initial_rating = doc.require_parameter_f64("initial_rating")?;
        let initial_deviation = doc
            .parameter_f64("initial_deviation")
            .unwrap_or(constants::DEFAULT_RATING_DEVIATION);
        let minimum_rating = doc
            .parameter_f64("minimum_rating")
            .unwrap_or(constants::DEFAULT_MINIMUM_RATING);
        let c = doc
            .class_var_f64("c")
            .unwrap_or(constants::DEFAULT_GLICKO_C);
        let rating = doc.require_state_f64("rating")?;
        let deviation = doc
            .state_f64("rd")
            .ok_or_else(|| EloteError::InvalidState("missing required state field `rd`".into()))?;

        if rating < minimum_rating {
            return Err(EloteError::InvalidState(format!(
                "rating {rating} is below the floor {minimum_rating}"
            )));
        }
        if !(deviation > 0.0 && deviation <= constants::GLICKO_MAX_RATING_DEVIATION) {
            return Err(EloteError::InvalidState(format!(
                "rd {deviation} is outside (0, {}]",
                constants::GLICKO_MAX_RATING_DEVIATION
            )));
        }

        Ok(GlickoCompetitor {
            rating,
            initial_rating,
            deviation,
            initial_deviation,
            minimum_rating,
            config: GlickoConfig { c },
        })
    }
}

fn apply_update(a: &mut GlickoCompetitor, b: &mut GlickoCompetitor, score_a: f64, score_b: f64) {
    debug_assert!((score_a + score_b - 1.0).abs() < 1e-9);

    let (a_rating, a_deviation) = (a.rating, a.deviation);
    let (b_rating, b_deviation) = (b.rating, b.deviation);

    let (new_a_rating, new_a_deviation) =
        glicko_update(a_rating, a_deviation, b_rating, b_deviation, score_a);
    let (new_b_rating, new_b_deviation) =
        glicko_update(b_rating, b_deviation, a_rating, a_deviation, score_b);

    a.rating = GlickoCompetitor::clamp_to_floor(new_a_rating, a.minimum_rating);
    a.deviation = new_a_deviation
        .max(f64::EPSILON)
        .min(constants::GLICKO_MAX_RATING_DEVIATION);

    b.rating = GlickoCompetitor::clamp_to_floor(new_b_rating, b.minimum_rating);
    b.deviation = new_b_deviation
        .max(f64::EPSILON)
        .min(constants::GLICKO_MAX_RATING_DEVIATION);
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_approx_eq {
        ($a:expr, $b:expr, $tolerance:expr) => {{
            let a_val = $a;
            let b_val = $b;
            assert!(
                (a_val - b_val).abs() <= $tolerance,
                "{} = {a_val} is not approximately equal to {} = {b_val}",
                stringify!($a),
                stringify!($b)
            )
        }};
    }

    #[test]
    fn high_deviation_favorite_beats_low_deviation_underdog() {
        let mut a =
            GlickoCompetitor::with_config(1500.0, 200.0, 100.0, GlickoConfig::default()).unwrap();
        let mut b =
            GlickoCompetitor::with_config(1400.0, 30.0, 100.0, GlickoConfig::default()).unwrap();

        a.beat(&mut b);

        // The paper's worked example uses Glicko-2's volatility update; this
        // is the plain Glicko-1 per-game update from spec §4.1.2 instead, so
        // we only check direction and the deviations shrinking, not the
        // spec's illustrative four-decimal values.
        assert!(a.rating() > 1500.0);
        assert!(b.rating() < 1400.0);
        assert!(a.deviation() < 200.0);
        assert!(b.deviation() < 30.0);
    }

    #[test]
    fn tie_between_identical_competitors_is_identity() {
        let mut a = GlickoCompetitor::new(1500.0).unwrap();
        let mut b = GlickoCompetitor::new(1500.0).unwrap();
        a.tied(&mut b);
        assert_approx_eq!(a.rating(), 1500.0, 1e-9);
        assert_approx_eq!(b.rating(), 1500.0, 1e-9);
    }

    #[test]
    fn decay_grows_deviation_without_moving_rating() {
        let mut a = GlickoCompetitor::new(1500.0).unwrap();
        let before = a.deviation();
        a.decay(10.0);
        assert!(a.deviation() > before);
        assert_approx_eq!(a.rating(), 1500.0, 1e-12);
        assert!(a.deviation() <= constants::GLICKO_MAX_RATING_DEVIATION);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut a = GlickoCompetitor::new(1500.0).unwrap();
        let mut b = GlickoCompetitor::new(1400.0).unwrap();
        a.beat(&mut b);
        a.reset();
        assert_approx_eq!(a.rating(), 1500.0, 1e-12);
        assert_approx_eq!(a.deviation(), constants::DEFAULT_RATING_DEVIATION, 1e-12);
    }

    #[test]
    fn state_round_trips() {
        let mut a = GlickoCompetitor::new(1500.0).unwrap();
        let mut b = GlickoCompetitor::new(1400.0).unwrap();
        a.beat(&mut b);

        let doc = a.export_state();
        let reloaded = GlickoCompetitor::from_state(&doc).unwrap();
        assert_eq!(reloaded.export_state(), doc);
    }

    #[test]
    fn construction_rejects_deviation_above_max() {
        let err =
            GlickoCompetitor::with_config(1500.0, 400.0, 100.0, GlickoConfig::default()).unwrap_err();
        assert!(matches!(err, EloteError::InvalidParameter { .. }));
    }
}
