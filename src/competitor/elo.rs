//! Classic Elo.

use serde_json::json;

use crate::competitor::{Competitor, CompetitorKind};
use crate::constants;
use crate::error::EloteError;
use crate::rating_math::logistic_expected_score;
use crate::state::StateDoc;

/// Elo's class-level tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EloConfig {
    /// Sensitivity parameter; larger values move ratings further per bout.
    pub k_factor: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        EloConfig {
            k_factor: constants::DEFAULT_K_FACTOR,
        }
    }
}

/// An Elo-rated competitor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EloCompetitor {
    rating: f64,
    initial_rating: f64,
    minimum_rating: f64,
    config: EloConfig,
}

impl EloCompetitor {
    /// Creates a new competitor at `initial_rating`, using the default
    /// floor ([`constants::DEFAULT_MINIMUM_RATING`]) and [`EloConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if `initial_rating` is below
    /// the floor.
    pub fn new(initial_rating: f64) -> Result<Self, EloteError> {
        Self::with_config(
            initial_rating,
            constants::DEFAULT_MINIMUM_RATING,
            EloConfig::default(),
        )
    }

    /// Creates a new competitor with an explicit floor and config.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if `initial_rating` is below
    /// `minimum_rating`.
    pub fn with_config(
        initial_rating: f64,
        minimum_rating: f64,
        config: EloConfig,
    ) -> Result<Self, EloteError> {
        if initial_rating < minimum_rating {
            return Err(EloteError::InvalidParameter {
                name: "initial_rating",
                reason: format!("{initial_rating} is below the floor {minimum_rating}"),
            });
        }

        Ok(EloCompetitor {
            rating: initial_rating,
            initial_rating,
            minimum_rating,
            config,
        })
    }
}

impl Competitor for EloCompetitor {
    type Config = EloConfig;

    fn rating(&self) -> f64 {
        self.rating
    }

    fn kind(&self) -> CompetitorKind {
        CompetitorKind::Elo
    }

    fn minimum_rating(&self) -> f64 {
        self.minimum_rating
    }

    fn config(&self) -> EloConfig {
        self.config
    }

    fn set_config(&mut self, config: EloConfig) {
        self.config = config;
    }

    fn expected_score(&self, other: &Self) -> f64 {
        logistic_expected_score(self.rating, other.rating)
    }

    fn beat(&mut self, other: &mut Self) {
        apply_delta(self, other, 1.0, 0.0);
    }

    fn tied(&mut self, other: &mut Self) {
        apply_delta(self, other, 0.5, 0.5);
    }

    fn reset(&mut self) {
        self.rating = self.initial_rating;
    }

    fn export_state(&self) -> StateDoc {
        let mut parameters = serde_json::Map::new();
        parameters.insert("initial_rating".into(), json!(self.initial_rating));
        parameters.insert("minimum_rating".into(), json!(self.minimum_rating));

        let mut state = serde_json::Map::new();
        state.insert("rating".into(), json!(self.rating));

        let mut class_vars = serde_json::Map::new();
        class_vars.insert("k_factor".into(), json!(self.config.k_factor));

        StateDoc::new(CompetitorKind::Elo, parameters, state, class_vars)
    }

    fn from_state(doc: &StateDoc) -> Result<Self, EloteError> {
        doc.require_kind(CompetitorKind::Elo)?;

        let initial_rating = doc.require_parameter_f64("initial_rating")?;
        let minimum_rating = doc
            .parameter_f64("minimum_rating")
            .unwrap_or(constants::DEFAULT_MINIMUM_RATING);
        let k_factor = doc
            .class_var_f64("k_factor")
            .unwrap_or(constants::DEFAULT_K_FACTOR);
        let rating = doc.require_state_f64("rating")?;

        if rating < minimum_rating {
            return Err(EloteError::InvalidState(format!(
                "rating {rating} is below the floor {minimum_rating}"
            )));
        }

        Ok(EloCompetitor {
            rating,
            initial_rating,
            minimum_rating,
            config: EloConfig { k_factor },
        })
    }
}

fn apply_delta(a: &mut EloCompetitor, b: &mut EloCompetitor, score_a: f64, score_b: f64) {
    let expected_a = a.expected_score(b);
    let k = a.config.k_factor;
    let delta = k * (score_a - expected_a);
    debug_assert!((score_a + score_b - 1.0).abs() < 1e-9);

    a.rating = EloCompetitor::clamp_to_floor(a.rating + delta, a.minimum_rating);
    b.rating = EloCompetitor::clamp_to_floor(b.rating - delta, b.minimum_rating);
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
    fn equal_ratings_default_k_match_expected_deltas() {
        let mut a = EloCompetitor::new(1500.0).unwrap();
        let mut b = EloCompetitor::new(1500.0).unwrap();

        a.beat(&mut b);

        assert_approx_eq!(a.rating(), 1516.0, 1e-6);
        assert_approx_eq!(b.rating(), 1484.0, 1e-6);
    }

    #[test]
    fn unequal_ratings_match_expected_scores_and_deltas() {
        let a = EloCompetitor::new(400.0).unwrap();
        let b = EloCompetitor::new(500.0).unwrap();

        assert_approx_eq!(b.expected_score(&a), 0.6401, 1e-4);
        assert_approx_eq!(a.expected_score(&b), 0.3599, 1e-4);

        let mut a = a;
        let mut b = b;
        a.beat(&mut b);

        assert_approx_eq!(a.rating(), 420.48, 0.01);
        assert_approx_eq!(b.rating(), 479.52, 0.01);
    }

    #[test]
    fn expected_score_is_complementary() {
        let a = EloCompetitor::new(1200.0).unwrap();
        let b = EloCompetitor::new(1800.0).unwrap();
        assert_approx_eq!(a.expected_score(&b) + b.expected_score(&a), 1.0, 1e-9);
    }

    #[test]
    fn tie_between_equals_is_identity() {
        let mut a = EloCompetitor::new(1500.0).unwrap();
        let mut b = EloCompetitor::new(1500.0).unwrap();
        a.tied(&mut b);
        assert_approx_eq!(a.rating(), 1500.0, 1e-9);
        assert_approx_eq!(b.rating(), 1500.0, 1e-9);
    }

    #[test]
    fn floor_holds_under_stress() {
        let mut loser = EloCompetitor::new(100.0).unwrap();
        let mut winner = EloCompetitor::new(2800.0).unwrap();

        for _ in 0..10_000 {
            winner.beat(&mut loser);
        }

        assert!(loser.rating() >= loser.minimum_rating() - 1e-9);
    }

    #[test]
    fn reset_restores_initial_rating() {
        let mut a = EloCompetitor::new(1500.0).unwrap();
        let mut b = EloCompetitor::new(1400.0).unwrap();
        a.beat(&mut b);
        a.reset();
        assert_approx_eq!(a.rating(), 1500.0, 1e-12);
    }

    #[test]
    fn construction_below_floor_is_an_error() {
        let err = EloCompetitor::with_config(50.0, 100.0, EloConfig::default()).unwrap_err();
        assert!(matches!(err, EloteError::InvalidParameter { .. }));
    }

    #[test]
    fn state_round_trips() {
        let mut a = EloCompetitor::new(1500.0).unwrap();
        let mut b = EloCompetitor::new(1400.0).unwrap();
        a.beat(&mut b);

        let doc = a.export_state();
        let reloaded = EloCompetitor::from_state(&doc).unwrap();
        assert_eq!(reloaded.export_state(), doc);
        assert_approx_eq!(reloaded.rating(), a.rating(), 1e-12);
    }

    #[test]
    fn cross_type_state_is_rejected() {
        use crate::competitor::GlickoCompetitor;

        let glicko = GlickoCompetitor::new(1500.0).unwrap();
        let doc = glicko.export_state();

        let err = EloCompetitor::from_state(&doc).unwrap_err();
        assert!(matches!(err, EloteError::InvalidState(_)));
    }
}
