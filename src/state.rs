//! The portable state document: a self-describing record of a competitor's
//! constructor-time parameters, dynamic state, and class-level tunables.
//!
//! See spec §6.1 for the wire shape. The encoder always emits both the
//! structured (`parameters`/`state`) and flattened (`initial_rating`/
//! `current_rating`) forms; the decoder prefers the structured fields and
//! only reads the flattened ones when a structured field is missing, which
//! keeps older documents (written before a field moved into `parameters` or
//! `state`) loadable.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::competitor::CompetitorKind;
use crate::error::EloteError;

/// Current state document version. Bumped if the wire shape changes in a
/// way that isn't backward compatible.
pub const STATE_DOC_VERSION: u32 = 1;

/// Self-describing serialization of a single competitor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDoc {
    #[serde(rename = "type")]
    kind: CompetitorKind,
    version: u32,
    created_at: i64,
    id: Uuid,
    parameters: serde_json::Map<String, Value>,
    state: serde_json::Map<String, Value>,
    class_vars: serde_json::Map<String, Value>,
    /// Backward-compatibility flattening of `parameters.initial_rating`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    initial_rating: Option<f64>,
    /// Backward-compatibility flattening of `state.rating`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    current_rating: Option<f64>,
}

impl StateDoc {
    /// Builds a new document for `kind`, stamping `created_at` with the
    /// current time and generating a fresh id.
    ///
    /// `parameters` must contain an `"initial_rating"` entry and `state`
    /// must contain a `"rating"` entry; both get mirrored into the
    /// flattened top-level fields automatically.
    #[must_use]
    pub fn new(
        kind: CompetitorKind,
        parameters: serde_json::Map<String, Value>,
        state: serde_json::Map<String, Value>,
        class_vars: serde_json::Map<String, Value>,
    ) -> Self {
        let initial_rating = parameters.get("initial_rating").and_then(Value::as_f64);
        let current_rating = state.get("rating").and_then(Value::as_f64);

        StateDoc {
            kind,
            version: STATE_DOC_VERSION,
            created_at: now_epoch_secs(),
            id: Uuid::new_v4(),
            parameters,
            state,
            class_vars,
            initial_rating,
            current_rating,
        }
    }

    /// The variant this document was exported from.
    #[must_use]
    pub fn kind(&self) -> CompetitorKind {
        self.kind
    }

    /// Document format version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Seconds since the Unix epoch at export time.
    #[must_use]
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Opaque identifier for this export.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Constructor-time values, e.g. `initial_rating` and variant-specific
    /// parameters.
    #[must_use]
    pub fn parameters(&self) -> &serde_json::Map<String, Value> {
        &self.parameters
    }

    /// Dynamic values, e.g. `rating` and variant-specific state such as
    /// Glicko's `rd`.
    #[must_use]
    pub fn state(&self) -> &serde_json::Map<String, Value> {
        &self.state
    }

    /// The variant's tunables (e.g. Elo's `k_factor`) at export time.
    #[must_use]
    pub fn class_vars(&self) -> &serde_json::Map<String, Value> {
        &self.class_vars
    }

    /// Fails with [`EloteError::InvalidState`] if `self.kind()` isn't
    /// `expected`.
    pub fn require_kind(&self, expected: CompetitorKind) -> Result<(), EloteError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(EloteError::InvalidState(format!(
                "expected state document of type {expected}, found {}",
                self.kind
            )))
        }
    }

    /// Reads a numeric field from `parameters`, falling back to the
    /// flattened `initial_rating` field when `key == "initial_rating"` and
    /// the structured field is absent.
    #[must_use]
    pub fn parameter_f64(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).and_then(Value::as_f64).or({
            if key == "initial_rating" {
                self.initial_rating
            } else {
                None
            }
        })
    }

    /// Reads a numeric field from `state`, falling back to the flattened
    /// `current_rating` field when `key == "rating"` and the structured
    /// field is absent.
    #[must_use]
    pub fn state_f64(&self, key: &str) -> Option<f64> {
        self.state.get(key).and_then(Value::as_f64).or({
            if key == "rating" {
                self.current_rating
            } else {
                None
            }
        })
    }

    /// Reads a numeric field from `class_vars`.
    #[must_use]
    pub fn class_var_f64(&self, key: &str) -> Option<f64> {
        self.class_vars.get(key).and_then(Value::as_f64)
    }

    /// Reads an array field from `state` (used for ECF's window and DWZ's
    /// effective match count history).
    #[must_use]
    pub fn state_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.state.get(key).and_then(Value::as_array)
    }

    /// Requires a numeric field in `parameters`, mapping a missing field to
    /// [`EloteError::InvalidState`].
    pub fn require_parameter_f64(&self, key: &'static str) -> Result<f64, EloteError> {
        self.parameter_f64(key)
            .ok_or_else(|| EloteError::InvalidState(format!("missing required parameter `{key}`")))
    }

    /// Requires a numeric field in `state`, mapping a missing field to
    /// [`EloteError::InvalidState`].
    pub fn require_state_f64(&self, key: &'static str) -> Result<f64, EloteError> {
        self.state_f64(key)
            .ok_or_else(|| EloteError::InvalidState(format!("missing required state field `{key}`")))
    }
}

fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> StateDoc {
        let mut parameters = serde_json::Map::new();
        parameters.insert("initial_rating".into(), json!(1500.0));

        let mut state = serde_json::Map::new();
        state.insert("rating".into(), json!(1516.0));

        StateDoc::new(CompetitorKind::Elo, parameters, state, serde_json::Map::new())
    }

    #[test]
    fn flattens_initial_and_current_rating() {
        let doc = sample_doc();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["initial_rating"], json!(1500.0));
        assert_eq!(value["current_rating"], json!(1516.0));
        assert_eq!(value["type"], json!("EloCompetitor"));
        assert_eq!(value["version"], json!(1));
    }

    #[test]
    fn decoder_prefers_structured_over_flattened() {
        let mut doc = sample_doc();
        doc.current_rating = Some(9999.0);
        assert_eq!(doc.state_f64("rating"), Some(1516.0));
    }

    #[test]
    fn decoder_falls_back_to_flattened_when_structured_missing() {
        let mut doc = sample_doc();
        doc.state.remove("rating");
        assert_eq!(doc.state_f64("rating"), Some(1516.0));
    }

    #[test]
    fn require_kind_rejects_mismatch() {
        let doc = sample_doc();
        assert!(doc.require_kind(CompetitorKind::Glicko).is_err());
        assert!(doc.require_kind(CompetitorKind::Elo).is_ok());
    }

    #[test]
    fn round_trips_through_json_text() {
        let doc = sample_doc();
        let text = serde_json::to_string(&doc).unwrap();
        let parsed: StateDoc = serde_json::from_str(&text).unwrap();
        assert_eq!(doc, parsed);
    }
}
