//! `LambdaArena`: a dispatcher that maps opaque identifiers to lazily-created
//! competitors of one variant, driven by a caller-supplied oracle closure.
//!
//! The name is literal: both the competitor factory and the oracle are
//! ordinary closures (lambdas) the caller provides at construction.

use std::collections::HashMap;
use std::hash::Hash;

use crate::competitor::Competitor;
use crate::error::EloteError;
use crate::history::{Bout, BoutAttributes, History, Outcome};
use crate::state::StateDoc;

/// One row of [`LambdaArena::leaderboard`].
#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardEntry<Id> {
    /// The competitor's identifier.
    pub id: Id,
    /// Current rating.
    pub rating: f64,
    /// Variant-specific extra state (e.g. `rd` for Glicko, `a` for DWZ),
    /// taken verbatim from the competitor's exported state minus `rating`.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A tournament dispatcher over competitors of a single variant `C`,
/// identified by `Id` and keyed to a factory `F` and an oracle `O`.
pub struct LambdaArena<Id, C, F, O>
where
    C: Competitor,
{
    factory: F,
    oracle: O,
    class_config: C::Config,
    competitors: HashMap<Id, C>,
    history: History<Id>,
    draw_as_tie: bool,
}

impl<Id, C, F, O> LambdaArena<Id, C, F, O>
where
    Id: Eq + Hash + Clone + Ord,
    C: Competitor,
    F: Fn() -> Result<C, EloteError>,
    O: Fn(&Id, &Id, &BoutAttributes) -> Option<bool>,
{
    /// Creates an arena. `factory` is called once per never-before-seen `Id`
    /// encountered by [`Self::tournament`]; `oracle` decides each bout.
    ///
    /// # Errors
    ///
    /// Returns whatever `factory()` returns on its first (probing) call,
    /// used to seed `class_config`.
    pub fn new(factory: F, oracle: O) -> Result<Self, EloteError> {
        let class_config = factory()?.config();
        Ok(LambdaArena {
            factory,
            oracle,
            class_config,
            competitors: HashMap::new(),
            history: History::new(),
            draw_as_tie: false,
        })
    }

    /// Opts into treating an oracle's `None` as a tie (`a.tied(b)`) instead
    /// of the default policy of recording [`Outcome::None`] and skipping
    /// mutation.
    #[must_use]
    pub fn with_draw_as_tie(mut self, draw_as_tie: bool) -> Self {
        self.draw_as_tie = draw_as_tie;
        self
    }

    /// Mutates the class-level tunables shared by every competitor of this
    /// arena's variant — both those already created and those the factory
    /// produces afterwards.
    pub fn set_competitor_class_var(&mut self, config: C::Config) {
        self.class_config = config;
        for competitor in self.competitors.values_mut() {
            competitor.set_config(config);
        }
    }

    /// Read-only access to every competitor currently tracked.
    pub fn competitors(&self) -> &HashMap<Id, C> {
        &self.competitors
    }

    /// The bout log accumulated so far.
    pub fn history(&self) -> &History<Id> {
        &self.history
    }

    /// Discards all recorded bouts without touching competitor state.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Snapshots every tracked competitor to a [`StateDoc`], keyed by id.
    pub fn export_state(&self) -> HashMap<Id, StateDoc> {
        self.competitors
            .iter()
            .map(|(id, c)| (id.clone(), c.export_state()))
            .collect()
    }

    /// Ratings sorted descending, ties broken by ascending `Id` order.
    #[must_use]
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry<Id>> {
        let mut entries: Vec<LeaderboardEntry<Id>> = self
            .competitors
            .iter()
            .map(|(id, c)| {
                let mut extra = c.export_state().state().clone();
                extra.remove("rating");
                LeaderboardEntry {
                    id: id.clone(),
                    rating: c.rating(),
                    extra,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }

    fn get_or_create(&mut self, id: &Id) -> Result<(), EloteError> {
        if !self.competitors.contains_key(id) {
            let mut competitor = (self.factory)()?;
            competitor.set_config(self.class_config);
            self.competitors.insert(id.clone(), competitor);
        }
        Ok(())
    }

    /// Dispatches a sequence of `(left_id, right_id, attributes)` bouts in
    /// order: creates either side's competitor on first sight, asks the
    /// oracle, applies the resulting update, and appends a [`Bout`] record.
    ///
    /// # Errors
    ///
    /// Returns whatever the factory returns if competitor creation fails, or
    /// [`EloteError::InvalidParameter`] if a pairing bouts an id against
    /// itself.
    pub fn tournament<It>(&mut self, seq: It) -> Result<(), EloteError>
    where
        It: IntoIterator<Item = (Id, Id, BoutAttributes)>,
    {
        for (a_id, b_id, attrs) in seq {
            if a_id == b_id {
                return Err(EloteError::InvalidParameter {
                    name: "b_id",
                    reason: "a competitor cannot bout itself".into(),
                });
            }

            self.get_or_create(&a_id)?;
            self.get_or_create(&b_id)?;

            let mut a = self
                .competitors
                .remove(&a_id)
                .expect("get_or_create just inserted it");
            let mut b = self
                .competitors
                .remove(&b_id)
                .expect("get_or_create just inserted it");

            let predicted_prob_left_wins = a.expected_score(&b);

            let outcome = match (self.oracle)(&a_id, &b_id, &attrs) {
                Some(true) => {
                    a.beat(&mut b);
                    Outcome::Left
                }
                Some(false) => {
                    b.beat(&mut a);
                    Outcome::Right
                }
                None => {
                    if self.draw_as_tie {
                        a.tied(&mut b);
                        Outcome::Draw
                    } else {
                        Outcome::None
                    }
                }
            };

            self.history.push(Bout::new(
                a_id.clone(),
                b_id.clone(),
                predicted_prob_left_wins,
                outcome,
                attrs,
            ));

            self.competitors.insert(a_id, a);
            self.competitors.insert(b_id, b);
        }

        Ok(())
    }
}
