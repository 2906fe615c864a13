//! `Deutsche Wertungszahl` (DWZ): Elo's logistic expected score with a
//! development coefficient that adapts to how many bouts a competitor has
//! played, per the German Chess Federation's schedule shape described in
//! spec §4.1.4 and §9.

use serde_json::json;

use crate::competitor::{Competitor, CompetitorKind};
use crate::constants;
use crate::error::EloteError;
use crate::rating_math::{dwz_development_coefficient, logistic_expected_score};
use crate::state::StateDoc;

/// DWZ's class-level tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DwzConfig {
    /// Base development coefficient before the age/experience schedule is
    /// applied.
    pub e0: f64,
    /// Optional age bucket (in years), scaling the development coefficient
    /// for younger players per the DWZ schedule's age allowance.
    pub age_bucket: Option<u32>,
}

impl Default for DwzConfig {
    fn default() -> Self {
        DwzConfig {
            e0: constants::DEFAULT_DWZ_E0,
            age_bucket: None,
        }
    }
}

/// A DWZ-rated competitor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DwzCompetitor {
    rating: f64,
    initial_rating: f64,
    minimum_rating: f64,
    /// Effective match count, incremented once per bout.
    a_effective: f64,
    config: DwzConfig,
}

impl DwzCompetitor {
    /// Creates a new competitor at `initial_rating`, using the default
    /// floor and [`DwzConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if `initial_rating` is below
    /// the floor.
    pub fn new(initial_rating: f64) -> Result<Self, EloteError> {
        Self::with_config(
            initial_rating,
            constants::DEFAULT_MINIMUM_RATING,
            DwzConfig::default(),
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
        config: DwzConfig,
    ) -> Result<Self, EloteError> {
        if initial_rating < minimum_rating {
            return Err(EloteError::InvalidParameter {
                name: "initial_rating",
                reason: format!("{initial_rating} is below the floor {minimum_rating}"),
            });
        }

        Ok(DwzCompetitor {
            rating: initial_rating,
            initial_rating,
            minimum_rating,
            a_effective: 0.0,
            config,
        })
    }

    /// Effective match count accumulated so far.
    #[must_use]
    pub fn effective_match_count(&self) -> f64 {
        self.a_effective
    }
}

impl Competitor for DwzCompetitor {
    type Config = DwzConfig;

    fn rating(&self) -> f64 {
        self.rating
    }

    fn kind(&self) -> CompetitorKind {
        CompetitorKind::Dwz
    }

    fn minimum_rating(&self) -> f64 {
        self.minimum_rating
    }

    fn config(&self) -> DwzConfig {
        self.config
    }

    fn set_config(&mut self, config: DwzConfig) {
        self.config = config;
    }

    fn expected_score(&self, other: &Self) -> f64 {
        logistic_expected_score(self.rating, other.rating)
    }

    fn beat(&mut self, other: &mut Self) {
        apply_update(self, other, 1.0, 0.0);
    }

    fn tied(&mut self, other: &mut Self) {
        apply_update(self, other, 0.5, 0.5);
    }

    fn reset(&mut self) {
        self.rating = self.initial_rating;
        self.a_effective = 0.0;
    }

    fn export_state(&self) -> StateDoc {
        let mut parameters = serde_json::Map::new();
        parameters.insert("initial_rating".into(), json!(self.initial_rating));
        parameters.insert("minimum_rating".into(), json!(self.minimum_rating));

        let mut state = serde_json::Map::new();
        state.insert("rating".into(), json!(self.rating));
        state.insert("a".into(), json!(self.a_effective));

        let mut class_vars = serde_json::Map::new();
        class_vars.insert("e0".into(), json!(self.config.e0));
        if let Some(age) = self.config.age_bucket {
            class_vars.insert("age_bucket".into(), json!(age));
        }

        StateDoc::new(CompetitorKind::Dwz, parameters, state, class_vars)
    }

    fn from_state(doc: &StateDoc) -> Result<Self, EloteError> {
        doc.require_kind(CompetitorKind::Dwz)?;

        let initial_rating = doc.require_parameter_f64("initial_rating")?;
        let minimum_rating = doc
            .parameter_f64("minimum_rating")
            .unwrap_or(constants::DEFAULT_MINIMUM_RATING);
        let rating = doc.require_state_f64("rating")?;
        let a_effective = doc.state_f64("a").unwrap_or(0.0);

        if rating < minimum_rating {
            return Err(EloteError::InvalidState(format!(
                "rating {rating} is below the floor {minimum_rating}"
            )));
        }

        let config = DwzConfig {
            e0: doc
                .class_var_f64("e0")
                .unwrap_or(constants::DEFAULT_DWZ_E0),
            age_bucket: doc
                .class_vars()
                .get("age_bucket")
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| u32::try_from(v).ok()),
        };

        Ok(DwzCompetitor {
            rating,
            initial_rating,
            minimum_rating,
            a_effective,
            config,
        })
    }
}

fn apply_update(a: &mut DwzCompetitor, b: &mut DwzCompetitor, score_a: f64, score_b: f64) {
    debug_assert!((score_a + score_b - 1.0).abs() < 1e-9);

    let (a_rating, b_rating) = (a.rating, b.rating);
    let expected_a = logistic_expected_score(a_rating, b_rating);
    let expected_b = logistic_expected_score(b_rating, a_rating);

    let e_a = dwz_development_coefficient(a.config.e0, a.a_effective, a.config.age_bucket);
    let e_b = dwz_development_coefficient(b.config.e0, b.a_effective, b.config.age_bucket);

    a.rating = DwzCompetitor::clamp_to_floor(
        a_rating + e_a * (score_a - expected_a),
        a.minimum_rating,
    );
    b.rating = DwzCompetitor::clamp_to_floor(
        b_rating + e_b * (score_b - expected_b),
        b.minimum_rating,
    );

    a.a_effective += 1.0;
    b.a_effective += 1.0;
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
    fn win_strengthens_winner_weakens_loser() {
        let mut a = DwzCompetitor::new(1500.0).unwrap();
        let mut b = DwzCompetitor::new(1500.0).unwrap();

        a.beat(&mut b);

        assert!(a.rating() >= 1500.0);
        assert!(b.rating() <= 1500.0);
        assert_approx_eq!(a.effective_match_count(), 1.0, 1e-12);
        assert_approx_eq!(b.effective_match_count(), 1.0, 1e-12);
    }

    #[test]
    fn new_players_adapt_faster_than_experienced_ones() {
        let mut novice = DwzCompetitor::new(1500.0).unwrap();
        let mut novice_opponent = DwzCompetitor::new(1500.0).unwrap();
        novice.beat(&mut novice_opponent);
        let novice_delta = novice.rating() - 1500.0;

        let mut veteran = DwzCompetitor::new(1500.0).unwrap();
        veteran.a_effective = 200.0;
        let mut veteran_opponent = DwzCompetitor::new(1500.0).unwrap();
        veteran.beat(&mut veteran_opponent);
        let veteran_delta = veteran.rating() - 1500.0;

        assert!(novice_delta > veteran_delta);
    }

    #[test]
    fn tie_between_equals_is_identity() {
        let mut a = DwzCompetitor::new(1500.0).unwrap();
        let mut b = DwzCompetitor::new(1500.0).unwrap();
        a.tied(&mut b);
        assert_approx_eq!(a.rating(), 1500.0, 1e-9);
        assert_approx_eq!(b.rating(), 1500.0, 1e-9);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut a = DwzCompetitor::new(1500.0).unwrap();
        let mut b = DwzCompetitor::new(1400.0).unwrap();
        a.beat(&mut b);
        a.reset();
        assert_approx_eq!(a.rating(), 1500.0, 1e-12);
        assert_approx_eq!(a.effective_match_count(), 0.0, 1e-12);
    }

    #[test]
    fn state_round_trips() {
        let mut a = DwzCompetitor::new(1500.0).unwrap();
        let mut b = DwzCompetitor::new(1400.0).unwrap();
        a.beat(&mut b);

        let doc = a.export_state();
        let reloaded = DwzCompetitor::from_state(&doc).unwrap();
        assert_eq!(reloaded.export_state(), doc);
    }
}
