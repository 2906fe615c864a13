//! Weighted composition of heterogeneous competitors, per spec §4.2.
//!
//! [`Competitor`] can't be used as a trait object (`from_state` returns
//! `Self`), so an ensemble's members are enum-dispatched through
//! [`EnsembleMember`] instead of `Box<dyn Competitor>`.

use crate::competitor::{Competitor, CompetitorKind, DwzCompetitor, EcfCompetitor, EloCompetitor, GlickoCompetitor};
use crate::error::EloteError;
use crate::state::StateDoc;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// One competitor of any variant, enum-dispatched so ensembles can mix
/// variants within a single component list.
#[derive(Clone, Debug, PartialEq)]
pub enum EnsembleMember {
    /// A classic Elo component.
    Elo(EloCompetitor),
    /// A Glicko component.
    Glicko(GlickoCompetitor),
    /// An ECF component.
    Ecf(EcfCompetitor),
    /// A DWZ component.
    Dwz(DwzCompetitor),
}

impl EnsembleMember {
    /// This member's variant tag.
    #[must_use]
    pub fn kind(&self) -> CompetitorKind {
        match self {
            EnsembleMember::Elo(c) => c.kind(),
            EnsembleMember::Glicko(c) => c.kind(),
            EnsembleMember::Ecf(c) => c.kind(),
            EnsembleMember::Dwz(c) => c.kind(),
        }
    }

    /// This member's current rating.
    #[must_use]
    pub fn rating(&self) -> f64 {
        match self {
            EnsembleMember::Elo(c) => c.rating(),
            EnsembleMember::Glicko(c) => c.rating(),
            EnsembleMember::Ecf(c) => c.rating(),
            EnsembleMember::Dwz(c) => c.rating(),
        }
    }

    /// Probability this member beats `other`.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::TypeMismatch`] if `other` is a different
    /// variant.
    pub fn expected_score(&self, other: &EnsembleMember) -> Result<f64, EloteError> {
        match (self, other) {
            (EnsembleMember::Elo(a), EnsembleMember::Elo(b)) => Ok(a.expected_score(b)),
            (EnsembleMember::Glicko(a), EnsembleMember::Glicko(b)) => Ok(a.expected_score(b)),
            (EnsembleMember::Ecf(a), EnsembleMember::Ecf(b)) => Ok(a.expected_score(b)),
            (EnsembleMember::Dwz(a), EnsembleMember::Dwz(b)) => Ok(a.expected_score(b)),
            _ => Err(EloteError::TypeMismatch {
                expected: self.kind(),
                found: other.kind(),
            }),
        }
    }

    /// Registers a win of `self` over `other`.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::TypeMismatch`] if `other` is a different
    /// variant.
    pub fn beat(&mut self, other: &mut EnsembleMember) -> Result<(), EloteError> {
        match (self, other) {
            (EnsembleMember::Elo(a), EnsembleMember::Elo(b)) => {
                a.beat(b);
                Ok(())
            }
            (EnsembleMember::Glicko(a), EnsembleMember::Glicko(b)) => {
                a.beat(b);
                Ok(())
            }
            (EnsembleMember::Ecf(a), EnsembleMember::Ecf(b)) => {
                a.beat(b);
                Ok(())
            }
            (EnsembleMember::Dwz(a), EnsembleMember::Dwz(b)) => {
                a.beat(b);
                Ok(())
            }
            (a, b) => Err(EloteError::TypeMismatch {
                expected: a.kind(),
                found: b.kind(),
            }),
        }
    }

    /// Registers a draw, mutating both sides symmetrically.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::TypeMismatch`] if `other` is a different
    /// variant.
    pub fn tied(&mut self, other: &mut EnsembleMember) -> Result<(), EloteError> {
        match (self, other) {
            (EnsembleMember::Elo(a), EnsembleMember::Elo(b)) => {
                a.tied(b);
                Ok(())
            }
            (EnsembleMember::Glicko(a), EnsembleMember::Glicko(b)) => {
                a.tied(b);
                Ok(())
            }
            (EnsembleMember::Ecf(a), EnsembleMember::Ecf(b)) => {
                a.tied(b);
                Ok(())
            }
            (EnsembleMember::Dwz(a), EnsembleMember::Dwz(b)) => {
                a.tied(b);
                Ok(())
            }
            (a, b) => Err(EloteError::TypeMismatch {
                expected: a.kind(),
                found: b.kind(),
            }),
        }
    }

    /// Restores construction-time state.
    pub fn reset(&mut self) {
        match self {
            EnsembleMember::Elo(c) => c.reset(),
            EnsembleMember::Glicko(c) => c.reset(),
            EnsembleMember::Ecf(c) => c.reset(),
            EnsembleMember::Dwz(c) => c.reset(),
        }
    }

    /// Serializes this member to a self-describing [`StateDoc`].
    #[must_use]
    pub fn export_state(&self) -> StateDoc {
        match self {
            EnsembleMember::Elo(c) => c.export_state(),
            EnsembleMember::Glicko(c) => c.export_state(),
            EnsembleMember::Ecf(c) => c.export_state(),
            EnsembleMember::Dwz(c) => c.export_state(),
        }
    }

    /// Deserializes a member, dispatching on `doc.kind()`.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidState`] if the underlying variant
    /// rejects the document.
    pub fn from_state(doc: &StateDoc) -> Result<Self, EloteError> {
        match doc.kind() {
            CompetitorKind::Elo => Ok(EnsembleMember::Elo(EloCompetitor::from_state(doc)?)),
            CompetitorKind::Glicko => Ok(EnsembleMember::Glicko(GlickoCompetitor::from_state(doc)?)),
            CompetitorKind::Ecf => Ok(EnsembleMember::Ecf(EcfCompetitor::from_state(doc)?)),
            CompetitorKind::Dwz => Ok(EnsembleMember::Dwz(DwzCompetitor::from_state(doc)?)),
        }
    }
}

/// A weighted composition of components, each a possibly different variant.
#[derive(Clone, Debug, PartialEq)]
pub struct Ensemble {
    members: Vec<(EnsembleMember, f64)>,
}

impl Ensemble {
    /// Builds an ensemble from `(component, weight)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if `members` is empty or the
    /// weights don't sum to `1 ± 1e-6`.
    pub fn new(members: Vec<(EnsembleMember, f64)>) -> Result<Self, EloteError> {
        if members.is_empty() {
            return Err(EloteError::InvalidParameter {
                name: "members",
                reason: "an ensemble needs at least one component".into(),
            });
        }

        let total_weight: f64 = members.iter().map(|(_, w)| w).sum();
        if (total_weight - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EloteError::InvalidParameter {
                name: "members",
                reason: format!("weights must sum to 1, got {total_weight}"),
            });
        }

        Ok(Ensemble { members })
    }

    /// The component list, in order.
    pub fn members(&self) -> &[(EnsembleMember, f64)] {
        &self.members
    }

    /// Weighted sum of each component's expected score against the
    /// component at the matching position in `other`.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if the two ensembles have a
    /// different number of components, or [`EloteError::TypeMismatch`] if a
    /// matched pair is of different variants.
    pub fn expected_score(&self, other: &Ensemble) -> Result<f64, EloteError> {
        self.require_matching_shape(other)?;

        let mut total = 0.0;
        for ((member, weight), (other_member, _)) in self.members.iter().zip(other.members.iter())
        {
            total += weight * member.expected_score(other_member)?;
        }
        Ok(total)
    }

    /// Registers a win of `self` over `other`, dispatched pairwise to every
    /// matched component.
    ///
    /// # Errors
    ///
    /// Returns [`EloteError::InvalidParameter`] if the two ensembles have a
    /// different number of components, or [`EloteError::TypeMismatch`] if a
    /// matched pair is of different variants. Fails before any component is
    /// mutated.
    pub fn beat(&mut self, other: &mut Ensemble) -> Result<(), EloteError> {
        self.require_matching_shape(other)?;
        for ((member, _), (other_member, _)) in
            self.members.iter_mut().zip(other.members.iter_mut())
        {
            member.beat(other_member)?;
        }
        Ok(())
    }

    /// Registers a win of `other` over `self`.
    ///
    /// # Errors
    ///
    /// See [`Self::beat`].
    pub fn lost_to(&mut self, other: &mut Ensemble) -> Result<(), EloteError> {
        other.beat(self)
    }

    /// Registers a draw, mutating both sides symmetrically.
    ///
    /// # Errors
    ///
    /// See [`Self::beat`].
    pub fn tied(&mut self, other: &mut Ensemble) -> Result<(), EloteError> {
        self.require_matching_shape(other)?;
        for ((member, _), (other_member, _)) in
            self.members.iter_mut().zip(other.members.iter_mut())
        {
            member.tied(other_member)?;
        }
        Ok(())
    }

    /// Restores every component to its construction-time state.
    pub fn reset(&mut self) {
        for (member, _) in &mut self.members {
            member.reset();
        }
    }

    /// Serializes every component, paired with its weight.
    #[must_use]
    pub fn export_state(&self) -> Vec<(StateDoc, f64)> {
        self.members
            .iter()
            .map(|(member, weight)| (member.export_state(), *weight))
            .collect()
    }

    /// Deserializes an ensemble from `(state_doc, weight)` pairs produced by
    /// [`Self::export_state`].
    ///
    /// # Errors
    ///
    /// See [`Self::new`] and [`EnsembleMember::from_state`].
    pub fn from_docs(docs: Vec<(StateDoc, f64)>) -> Result<Self, EloteError> {
        let members = docs
            .into_iter()
            .map(|(doc, weight)| EnsembleMember::from_state(&doc).map(|member| (member, weight)))
            .collect::<Result<Vec<_>, _>>()?;
        Ensemble::new(members)
    }

    fn require_matching_shape(&self, other: &Ensemble) -> Result<(), EloteError> {
        if self.members.len() != other.members.len() {
            return Err(EloteError::InvalidParameter {
                name: "other",
                reason: format!(
                    "ensembles have different component counts ({} vs {})",
                    self.members.len(),
                    other.members.len()
                ),
            });
        }
        for ((member, _), (other_member, _)) in self.members.iter().zip(other.members.iter()) {
            if member.kind() != other_member.kind() {
                return Err(EloteError::TypeMismatch {
                    expected: member.kind(),
                    found: other_member.kind(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitor::{EloConfig, GlickoConfig};

    fn elo(rating: f64) -> EnsembleMember {
        EnsembleMember::Elo(EloCompetitor::new(rating).unwrap())
    }

    fn glicko(rating: f64) -> EnsembleMember {
        EnsembleMember::Glicko(GlickoCompetitor::new(rating).unwrap())
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let err = Ensemble::new(vec![(elo(1500.0), 0.3), (glicko(1500.0), 0.3)]).unwrap_err();
        assert!(matches!(err, EloteError::InvalidParameter { .. }));
    }

    #[test]
    fn expected_score_is_weighted_average_of_components() {
        let a = Ensemble::new(vec![(elo(1600.0), 0.5), (glicko(1600.0), 0.5)]).unwrap();
        let b = Ensemble::new(vec![(elo(1400.0), 0.5), (glicko(1400.0), 0.5)]).unwrap();

        let e_ab = a.expected_score(&b).unwrap();
        let e_ba = b.expected_score(&a).unwrap();
        assert!(e_ab > 0.5);
        assert!((e_ab + e_ba - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_component_kind_is_rejected() {
        let a = Ensemble::new(vec![(elo(1500.0), 1.0)]).unwrap();
        let b = Ensemble::new(vec![(glicko(1500.0), 1.0)]).unwrap();
        assert!(matches!(
            a.expected_score(&b),
            Err(EloteError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn mismatched_component_count_is_rejected() {
        let a = Ensemble::new(vec![(elo(1500.0), 1.0)]).unwrap();
        let b = Ensemble::new(vec![(elo(1500.0), 0.5), (glicko(1500.0), 0.5)]).unwrap();
        assert!(matches!(
            a.expected_score(&b),
            Err(EloteError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn beat_dispatches_to_every_component_pairwise() {
        let mut a = Ensemble::new(vec![(elo(1500.0), 0.5), (glicko(1500.0), 0.5)]).unwrap();
        let mut b = Ensemble::new(vec![(elo(1500.0), 0.5), (glicko(1500.0), 0.5)]).unwrap();

        a.beat(&mut b).unwrap();

        assert!(a.members()[0].0.rating() > 1500.0);
        assert!(b.members()[0].0.rating() < 1500.0);
        assert!(a.members()[1].0.rating() > 1500.0);
        assert!(b.members()[1].0.rating() < 1500.0);
    }

    #[test]
    fn reset_restores_every_component() {
        let mut a = Ensemble::new(vec![(elo(1500.0), 1.0)]).unwrap();
        let mut b = Ensemble::new(vec![(elo(1400.0), 1.0)]).unwrap();
        a.beat(&mut b).unwrap();
        a.reset();
        assert!((a.members()[0].0.rating() - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn state_round_trips_with_weights() {
        let original = Ensemble::new(vec![(elo(1500.0), 0.5), (glicko(1500.0), 0.5)]).unwrap();
        let docs = original.export_state();
        let reloaded = Ensemble::from_docs(docs).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn config_override_via_elo_builder() {
        let custom = EloCompetitor::with_config(1500.0, 100.0, EloConfig { k_factor: 10.0 }).unwrap();
        let ensemble = Ensemble::new(vec![(EnsembleMember::Elo(custom), 1.0)]).unwrap();
        assert_eq!(ensemble.members()[0].0.kind(), CompetitorKind::Elo);
    }
}
