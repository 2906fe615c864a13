//! Default tunables for each rating algorithm.
//!
//! These mirror the defaults documented by each system's governing body
//! (USCF/FIDE for Elo, Glickman's Glicko paper, the English Chess
//! Federation's grading tables, and the German Chess Federation's `Deutsche
//! Wertungszahl` schedule) rather than inventing new ones.

/// Rating floor shared by every competitor variant. No visible rating may
/// drop below this value.
pub const DEFAULT_MINIMUM_RATING: f64 = 100.0;

/// Elo's sensitivity parameter. Larger values make each bout move the
/// rating further.
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Default starting rating for a newly constructed competitor, used when the
/// caller doesn't supply one.
pub const DEFAULT_INITIAL_RATING: f64 = 1500.0;

/// Default rating deviation (uncertainty) for a new Glicko competitor.
pub const DEFAULT_RATING_DEVIATION: f64 = 350.0;

/// Glicko's RD never grows past this value, even under arbitrarily long
/// inactivity.
pub const GLICKO_MAX_RATING_DEVIATION: f64 = 350.0;

/// Glicko's inactivity decay constant, used by `GlickoCompetitor::decay`.
/// Chosen so that roughly a year of inactivity restores RD close to its
/// maximum from a fully-confident rating, the usual rule of thumb cited
/// alongside Glickman's paper.
pub const DEFAULT_GLICKO_C: f64 = 34.6;

/// `q = ln(10) / 400`, the scaling constant used throughout Glicko's
/// g-function and expected-score formulas.
#[must_use]
pub fn glicko_q() -> f64 {
    std::f64::consts::LN_10 / 400.0
}

/// ECF's linear-scale divisor: a 40-point rating gap is worth roughly a
/// third of a win, per the ECF's published conversion tables.
pub const DEFAULT_ECF_F: f64 = 120.0;

/// Size of the rolling window of opponent ratings an ECF competitor
/// averages over.
pub const DEFAULT_ECF_N_PERIOD: usize = 30;

/// Rating-equivalent reward for a win in the ECF system, added to the
/// opponent's rating before it enters the rolling window.
pub const DEFAULT_ECF_WIN_DELTA: f64 = 50.0;

/// Rating-equivalent reward for a draw in the ECF system.
pub const DEFAULT_ECF_DRAW_DELTA: f64 = 0.0;

/// Rating-equivalent penalty for a loss in the ECF system.
pub const DEFAULT_ECF_LOSS_DELTA: f64 = -50.0;

/// DWZ's base development coefficient, before the age/experience schedule
/// is applied.
pub const DEFAULT_DWZ_E0: f64 = 30.0;

/// Lower bound of DWZ's development coefficient after the schedule is
/// applied.
pub const DWZ_E_MIN: f64 = 5.0;

/// Upper bound of DWZ's development coefficient after the schedule is
/// applied.
pub const DWZ_E_MAX: f64 = 30.0;

/// Effective match count past which DWZ treats a player as "experienced"
/// and stops boosting the development coefficient for low game counts.
pub const DWZ_EXPERIENCED_THRESHOLD: f64 = 30.0;
