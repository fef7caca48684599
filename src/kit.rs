//! Core types for **kits**, **reagents** and the **safety margin**.
//!
//! This module holds the data model used across the crate. The serde shape of
//! [`Kit`] and [`Reagent`] is the persisted and exported JSON format:
//!
//! ```json
//! [{ "id": "kit-1718000000000", "name": "SuperScript IV",
//!    "reagents": [{ "name": "Buffer 5X", "volumePerReaction": 4 }],
//!    "protocol": "", "notes": "" }]
//! ```
//!
//! All volumes are in µL; there is no unit conversion.
use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a kit (e.g. `"default-kit"`, `"kit-1718000000000"`).
///
/// Stable for the lifetime of the kit; never reused for a different kit.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KitId(pub String);

impl KitId {
    /// Borrow the raw id string.
    pub fn as_str(&self) -> &str { &self.0 }

    /// `true` when the id is empty or only whitespace (i.e. "not yet assigned").
    pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }
}

impl fmt::Display for KitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<&str> for KitId {
    fn from(s: &str) -> Self { KitId(s.to_string()) }
}

impl From<String> for KitId {
    fn from(s: String) -> Self { KitId(s) }
}

/// A named component of a kit with its volume for one reaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reagent {
    /// Display name (e.g. `"dNTP Mix (10 mM)"`).
    pub name: String,
    /// Volume in µL for a single reaction.
    pub volume_per_reaction: f64,
}

impl Reagent {
    pub fn new(name: impl Into<String>, volume_per_reaction: f64) -> Self {
        Reagent { name: name.into(), volume_per_reaction }
    }
}

/// One reagent-mix recipe: an ordered reagent list plus optional protocol and notes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kit {
    /// Catalog-unique id. Leave blank when saving a new kit; the store assigns one.
    #[serde(default)]
    pub id: KitId,
    /// Display name.
    pub name: String,
    /// Reagents in mixing order.
    pub reagents: Vec<Reagent>,
    /// Thermocycler protocol, free text (may be empty).
    #[serde(default)]
    pub protocol: String,
    /// Additional notes, free text (may be empty).
    #[serde(default)]
    pub notes: String,
}

impl Kit {
    /// A new, not yet saved kit (blank id, no protocol or notes).
    pub fn new(name: impl Into<String>, reagents: Vec<Reagent>) -> Self {
        Kit { id: KitId::default(), name: name.into(), reagents, protocol: String::new(), notes: String::new() }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// `true` for the read-only built-in kit.
    pub fn is_builtin(&self) -> bool { self.id.as_str() == crate::kits::DEFAULT_KIT_ID }

    /// Check the rules every saved kit must satisfy.
    ///
    /// Volumes must be finite and strictly positive.
    pub fn validate(&self) -> crate::Result<()> {
        use crate::KitError::Validation;
        if self.name.trim().is_empty() {
            return Err(Validation("kit name is blank".into()));
        }
        if self.reagents.is_empty() {
            return Err(Validation("kit has no reagents".into()));
        }
        for (i, r) in self.reagents.iter().enumerate() {
            if r.name.trim().is_empty() {
                return Err(Validation(format!("reagent #{} has a blank name", i + 1)));
            }
            if !r.volume_per_reaction.is_finite() || r.volume_per_reaction <= 0.0 {
                return Err(Validation(format!(
                    "reagent `{}` must have a positive volume (got {})",
                    r.name, r.volume_per_reaction
                )));
            }
        }
        Ok(())
    }
}

/// Which safety-margin policy is active.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarginMode {
    /// Add a fixed number of extra reactions.
    #[default]
    ExtraCount,
    /// Scale the sample count up by a percentage.
    ExtraPercentage,
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarginMode::ExtraCount => "extra-count",
            MarginMode::ExtraPercentage => "extra-percentage",
        })
    }
}

/// Safety-excess policy applied on top of the sample count.
///
/// Both values are kept; only the one selected by `mode` is used.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Margin {
    pub mode: MarginMode,
    /// Extra reactions, used in [`MarginMode::ExtraCount`].
    pub extra_count: u32,
    /// Extra percentage in `[0, 100]`, used in [`MarginMode::ExtraPercentage`].
    pub extra_percentage: f64,
}

impl Default for Margin {
    /// One extra reaction; 10 % kept for when the mode is switched.
    fn default() -> Self {
        Margin { mode: MarginMode::ExtraCount, extra_count: 1, extra_percentage: 10.0 }
    }
}

impl Margin {
    /// Fixed extra reactions.
    pub fn extra_count(extra: u32) -> Self {
        Margin { mode: MarginMode::ExtraCount, extra_count: extra, ..Margin::default() }
    }

    /// Percentage excess; clamped into `[0, 100]`, non-finite values become 0.
    pub fn extra_percentage(pct: f64) -> Self {
        Margin { mode: MarginMode::ExtraPercentage, extra_percentage: clamp_percentage(pct), ..Margin::default() }
    }

    /// Switch the active mode, keeping both stored values.
    pub fn with_mode(mut self, mode: MarginMode) -> Self {
        self.mode = mode;
        self
    }
}

fn clamp_percentage(pct: f64) -> f64 {
    if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 }
}

/// One row of a calculation: a reagent and its scaled total volume.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledReagent {
    pub name: String,
    pub volume_per_reaction: f64,
    /// `volume_per_reaction * factor`, rounded half-up to 2 decimals.
    pub total_volume: f64,
}

#[cfg(test)]
mod kit_tests {
    use super::*;

    fn two_reagents() -> Vec<Reagent> { vec![Reagent::new("A", 2.0), Reagent::new("B", 1.0)] }

    #[test]
    fn json_shape_uses_camel_case_and_defaults() {
        let k: Kit = serde_json::from_str(
            r#"{"id":"kit-1","name":"K","reagents":[{"name":"A","volumePerReaction":2}]}"#,
        ).unwrap();
        assert_eq!(k.id, KitId::from("kit-1"));
        assert_eq!(k.reagents[0].volume_per_reaction, 2.0);
        assert!(k.protocol.is_empty() && k.notes.is_empty());
        let out = serde_json::to_value(&k).unwrap();
        assert!(out["reagents"][0].get("volumePerReaction").is_some());
    }

    #[test]
    fn validate_rejects_blank_names_and_bad_volumes() {
        assert!(Kit::new("K", two_reagents()).validate().is_ok());
        assert!(Kit::new("  ", two_reagents()).validate().is_err());
        assert!(Kit::new("K", vec![]).validate().is_err());
        assert!(Kit::new("K", vec![Reagent::new(" ", 1.0)]).validate().is_err());
        assert!(Kit::new("K", vec![Reagent::new("A", 0.0)]).validate().is_err());
        assert!(Kit::new("K", vec![Reagent::new("A", -1.0)]).validate().is_err());
        assert!(Kit::new("K", vec![Reagent::new("A", f64::NAN)]).validate().is_err());
    }

    #[test]
    fn margin_percentage_is_clamped() {
        assert_eq!(Margin::extra_percentage(150.0).extra_percentage, 100.0);
        assert_eq!(Margin::extra_percentage(-5.0).extra_percentage, 0.0);
        assert_eq!(Margin::extra_percentage(f64::NAN).extra_percentage, 0.0);
    }

    #[test]
    fn switching_mode_keeps_inactive_value() {
        let m = Margin::extra_count(3).with_mode(MarginMode::ExtraPercentage);
        assert_eq!(m.extra_count, 3);
        assert_eq!(m.mode, MarginMode::ExtraPercentage);
        assert_eq!(m.mode.to_string(), "extra-percentage");
    }
}
