#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![warn(rustdoc::pedantic)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_rust_codeblocks
)]
#![forbid(unsafe_code)]

//! Pairwise skill-rating algorithms — Elo, Glicko, ECF, and DWZ — sharing a
//! common [`Competitor`] capability, a portable [`StateDoc`] codec, and a
//! [`LambdaArena`] dispatcher for running and grading tournaments between
//! opaque identifiers.
//!
//! ```
//! use elote::{Competitor, EloCompetitor};
//!
//! let mut a = EloCompetitor::new(1500.0).unwrap();
//! let mut b = EloCompetitor::new(1500.0).unwrap();
//! a.beat(&mut b);
//! assert!(a.rating() > 1500.0);
//! ```

pub mod arena;
pub mod competitor;
pub mod constants;
pub mod ensemble;
pub mod error;
pub mod history;
pub mod rating_math;
pub mod state;

pub use arena::{LambdaArena, LeaderboardEntry};
pub use competitor::{
    Competitor, CompetitorKind, DwzCompetitor, DwzConfig, EcfCompetitor, EcfConfig, EloCompetitor,
    EloConfig, GlickoCompetitor, GlickoConfig,
};
pub use ensemble::{Ensemble, EnsembleMember};
pub use error::{EloteError, Result};
pub use history::{
    Bout, BoutAttributes, ConfusionMatrix, History, Outcome, Report, ThresholdSearchResult,
};
pub use state::StateDoc;
