//! English Chess Federation grading: a linear expected-score rule and a
//! rolling-window rating update.

use std::collections::VecDeque;

use serde_json::json;

use crate::competitor::{Competitor, CompetitorKind};
use crate::constants;
use crate::error::EloteError;
use crate::rating_math::ecf_expected_score;
use crate::state::StateDoc;

/// ECF's class-level tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EcfConfig {
    /// Linear-scale divisor for the expected-score formula.
    pub f: f64,
    /// Size of the rolling window of opponent-adjusted ratings.
    pub n_period: usize,
    /// Rating-equivalent reward added to the opponent's rating on a win.
    pub win_delta: f64,
    /// Rating-equivalent reward added to the opponent's rating on a draw.
    pub draw_delta: f64,
    /// Rating-equivalent penalty added to the opponent's rating on a loss.
    pub loss_delta: f64,
}

impl Default for EcfConfig {
    fn default() -> Self {
        EcfConfig {
            f: constants::DEFAULT_ECF_F,
            n_period: constants::DEFAULT_ECF_N_PERIOD,
            win_delta: constants::DEFAULT_ECF_WIN_DELTA,
            draw_delta: constants::DEFAULT_ECF_DRAW_DELTA,
            loss_delta: constants::DEFAULT_ECF_LOSS_DELTA,
        }
    }
}

/// An ECF-graded competitor.
#[derive(Clone, Debug, PartialEq)]
pub struct EcfCompetitor {
    rating: f64,
    initial_rating: f64,
    minimum_rating: f64,
    window: VecDeque<f64>,
    config: EcfConfig,
}

impl EcfCompetitor {
    /// Creates a new competitor at `initial_rating`, using the default
    /// floor (both default to 100, per spec §4.1.3) and default
    /// [`EcfConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if `initial_rating` is below
    /// the floor.
    pub fn new(initial_rating: f64) -> Result<Self, EloteError> {
        Self::with_config(
            initial_rating,
            constants::DEFAULT_MINIMUM_RATING,
            EcfConfig::default(),
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
        config: EcfConfig,
    ) -> Result<Self, EloteError> {
        if initial_rating < minimum_rating {
            return Err(EloteError::InvalidParameter {
                name: "initial_rating",
                reason: format!("{initial_rating} is below the floor {minimum_rating}"),
            });
        }

        Ok(EcfCompetitor {
            rating: initial_rating,
            initial_rating,
            minimum_rating,
            window: VecDeque::new(),
            config,
        })
    }

    /// The rolling window of opponent-adjusted ratings this competitor's
    /// rating is averaged from, oldest first.
    #[must_use]
    pub fn window(&self) -> &VecDeque<f64> {
        &self.window
    }

    fn push_and_average(&mut self, entry: f64) {
        self.window.push_back(entry);
        while self.window.len() > self.config.n_period {
            self.window.pop_front();
        }

        let mean = self.window.iter().sum::<f64>() / self.window.len() as f64;
        self.rating = Self::clamp_to_floor(mean, self.minimum_rating);
    }
}

impl Competitor for EcfCompetitor {
    type Config = EcfConfig;

    fn rating(&self) -> f64 {
        self.rating
    }

    fn kind(&self) -> CompetitorKind {
        CompetitorKind::Ecf
    }

    fn minimum_rating(&self) -> f64 {
        self.minimum_rating
    }

    fn config(&self) -> EcfConfig {
        self.config
    }

    fn set_config(&mut self, config: EcfConfig) {
        self.config = config;
    }

    fn expected_score(&self, other: &Self) -> f64 {
        ecf_expected_score(self.rating, other.rating, self.config.f)
    }

    fn beat(&mut self, other: &mut Self) {
        let (a_rating, b_rating) = (self.rating, other.rating);
        self.push_and_average(b_rating + self.config.win_delta);
        other.push_and_average(a_rating + other.config.loss_delta);
    }

    fn tied(&mut self, other: &mut Self) {
        let (a_rating, b_rating) = (self.rating, other.rating);
        self.push_and_average(b_rating + self.config.draw_delta);
        other.push_and_average(a_rating + other.config.draw_delta);
    }

    fn reset(&mut self) {
        self.rating = self.initial_rating;
        self.window.clear();
    }

    fn export_state(&self) -> StateDoc {
        let mut parameters = serde_json::Map::new();
        parameters.insert("initial_rating".into(), json!(self.initial_rating));
        parameters.insert("minimum_rating".into(), json!(self.minimum_rating));

        let mut state = serde_json::Map::new();
        state.insert("rating".into(), json!(self.rating));
        state.insert(
            "window".into(),
            json!(self.window.iter().copied().collect::<Vec<_>>()),
        );

        let mut class_vars = serde_json::Map::new();
        class_vars.insert("f".into(), json!(self.config.f));
        class_vars.insert("n_period".into(), json!(self.config.n_period));
        class_vars.insert("win_delta".into(), json!(self.config.win_delta));
        class_vars.insert("draw_delta".into(), json!(self.config.draw_delta));
        class_vars.insert("loss_delta".into(), json!(self.config.loss_delta));

        StateDoc::new(CompetitorKind::Ecf, parameters, state, class_vars)
    }

    fn from_state(doc: &StateDoc) -> Result<Self, EloteError> {
        doc.require_kind(CompetitorKind::Ecf)?;

        let initial_rating = doc.require_parameter_f64("initial_rating")?;
        let minimum_rating = doc
            .parameter_f64("minimum_rating")
            .unwrap_or(constants::DEFAULT_MINIMUM_RATING);
        let rating = doc.require_state_f64("rating")?;

        if rating < minimum_rating {
            return Err(EloteError::InvalidState(format!(
                "rating {rating} is below the floor {minimum_rating}"
            )));
        }

        let config = EcfConfig {
            f: doc.class_var_f64("f").unwrap_or(constants::DEFAULT_ECF_F),
            n_period: doc
                .class_vars()
                .get("n_period")
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(constants::DEFAULT_ECF_N_PERIOD),
            win_delta: doc
                .class_var_f64("win_delta")
                .unwrap_or(constants::DEFAULT_ECF_WIN_DELTA),
            draw_delta: doc
                .class_var_f64("draw_delta")
                .unwrap_or(constants::DEFAULT_ECF_DRAW_DELTA),
            loss_delta: doc
                .class_var_f64("loss_delta")
                .unwrap_or(constants::DEFAULT_ECF_LOSS_DELTA),
        };

        let window = doc
            .state_array("window")
            .map(|values| {
                values
                    .iter()
                    .filter_map(serde_json::Value::as_f64)
                    .collect::<VecDeque<_>>()
            })
            .unwrap_or_default();

        Ok(EcfCompetitor {
            rating,
            initial_rating,
            minimum_rating,
            window,
            config,
        })
    }
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
    fn first_bout_fills_empty_window_with_opponent_adjusted_rating() {
        let mut a = EcfCompetitor::new(160.0).unwrap();
        let mut b = EcfCompetitor::new(120.0).unwrap();

        a.beat(&mut b);

        assert_approx_eq!(a.rating(), 170.0, 1e-9);
        assert_approx_eq!(b.rating(), 110.0, 1e-9);
    }

    #[test]
    fn window_is_bounded_at_n_period() {
        let config = EcfConfig {
            n_period: 3,
            ..EcfConfig::default()
        };
        let mut a = EcfCompetitor::with_config(1000.0, 100.0, config).unwrap();
        let mut opponent = EcfCompetitor::with_config(1000.0, 100.0, config).unwrap();

        for _ in 0..10 {
            a.beat(&mut opponent);
        }

        assert_eq!(a.window().len(), 3);
    }

    #[test]
    fn tie_between_equals_is_identity() {
        let mut a = EcfCompetitor::new(1000.0).unwrap();
        let mut b = EcfCompetitor::new(1000.0).unwrap();
        a.tied(&mut b);
        assert_approx_eq!(a.rating(), 1000.0, 1e-9);
        assert_approx_eq!(b.rating(), 1000.0, 1e-9);
    }

    #[test]
    fn reset_clears_window() {
        let mut a = EcfCompetitor::new(160.0).unwrap();
        let mut b = EcfCompetitor::new(120.0).unwrap();
        a.beat(&mut b);
        a.reset();
        assert!(a.window().is_empty());
        assert_approx_eq!(a.rating(), 160.0, 1e-12);
    }

    #[test]
    fn state_round_trips_window() {
        let mut a = EcfCompetitor::new(160.0).unwrap();
        let mut b = EcfCompetitor::new(120.0).unwrap();
        a.beat(&mut b);

        let doc = a.export_state();
        let reloaded = EcfCompetitor::from_state(&doc).unwrap();
        assert_eq!(reloaded.export_state(), doc);
        assert_eq!(reloaded.window(), a.window());
    }
}
