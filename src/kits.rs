//! The built-in example kit.
//!
//! It is always the first entry of the catalog, is never written to storage and
//! cannot be edited or deleted. Its display name is localized through the
//! `defaultKit.name` key; the English text below is what gets stored in [`Kit::name`].
use crate::kit::{Kit, KitId, Reagent};

/// Fixed id of the built-in kit.
pub const DEFAULT_KIT_ID: &str = "default-kit";

const DEFAULT_REAGENTS: &[(&str, f64)] = &[
    ("Reaction Buffer 5X", 4.0),
    ("dNTP Mix (10 mM)", 1.0),
    ("RNase Inhibitor", 0.5),
    ("Reverse Transcriptase", 1.0),
];

const DEFAULT_PROTOCOL: &str =
    "1. Annealing: 65°C for 5 min\n2. Synthesis: 50°C for 50 min\n3. Inactivation: 85°C for 5 min";

/// Build the built-in generic cDNA kit.
///
/// # Examples
/// ```
/// let k = mastermix::kits::default_kit();
/// assert!(k.is_builtin());
/// assert_eq!(k.reagents.len(), 4);
/// ```
pub fn default_kit() -> Kit {
    Kit {
        id: KitId::from(DEFAULT_KIT_ID),
        name: "Generic Kit (Example)".to_string(),
        reagents: DEFAULT_REAGENTS.iter().map(|&(n, v)| Reagent::new(n, v)).collect(),
        protocol: DEFAULT_PROTOCOL.to_string(),
        notes: "This is a generic kit. Create your own for specific protocols.".to_string(),
    }
}

#[cfg(test)]
mod default_kit_tests {
    use super::*;

    #[test]
    fn default_kit_is_valid() {
        assert!(default_kit().validate().is_ok());
    }

    #[test]
    fn default_protocol_has_three_steps() {
        assert_eq!(default_kit().protocol.lines().count(), 3);
    }
}
