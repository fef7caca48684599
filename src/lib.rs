#![forbid(unsafe_code)]
//! # mastermix
//!
//! Reagent **master mix** calculator for laboratory kits (cDNA synthesis, PCR, ...).
//! A kit is an ordered list of reagents with a per-reaction volume; the calculator
//! scales it by the number of samples plus a **safety margin** and reports per-reagent
//! and total volumes in µL.
//!
//! ## Highlights
//! - 🧪 One read-only **built-in kit** plus any number of user-defined kits.
//! - 💾 User kits persist as a JSON list through a [`KitStorage`] (file-backed by default).
//! - 📤 Import/export of the same JSON format, with duplicate ids skipped.
//! - 📋 Tab-delimited clipboard text and a printable protocol sheet (English or Portuguese).
//!
//! ## Examples
//! ```rust
//! use mastermix::{calc, Kit, KitStore, Margin, MemoryStorage, Reagent};
//!
//! let mut store = KitStore::load(MemoryStorage::new());
//! let id = store.save(Kit::new("My RT kit", vec![
//!     Reagent::new("Buffer 5X", 2.0),
//!     Reagent::new("Enzyme", 1.0),
//! ])).unwrap();
//! let kit = store.select(id.as_str()).unwrap();
//!
//! // 10 samples + 20 % => 12 reactions
//! let mix = calc::calculate(kit, 10.0, &Margin::extra_percentage(20.0));
//! assert_eq!(mix.rows[0].total_volume, 24.0);
//! assert_eq!(mix.total_volume, 36.0);
//! ```
//!
//! ## Version
//! See [`VERSION`].

pub mod kit;
pub mod kits;
pub mod calc;
pub mod schema;
pub mod storage;
pub mod store;
pub mod render;
pub mod i18n;
pub mod clipboard;
pub mod config;
pub mod logging;
mod error;

pub use calc::{calculate, MixResult};
pub use error::{KitError, Result};
pub use kit::{Kit, KitId, Margin, MarginMode, Reagent, ScaledReagent};
pub use storage::{FileStorage, KitStorage, MemoryStorage};
pub use store::{ImportReport, KitStore};

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse `Name=volume` into a reagent (e.g. `"dNTP Mix (10 mM)=1"`).
///
/// The split happens at the **last** `=`, so names may contain `=`. The volume goes
/// through [`calc::coerce_number`]; positivity is checked when the kit is saved.
///
/// # Examples
/// ```
/// let r = mastermix::parse_reagent("Buffer 5X=4").unwrap();
/// assert_eq!(r.volume_per_reaction, 4.0);
/// assert!(mastermix::parse_reagent("no volume").is_none());
/// ```
pub fn parse_reagent(arg: &str) -> Option<Reagent> {
    let (name, volume) = arg.rsplit_once('=')?;
    Some(Reagent::new(name.trim(), calc::coerce_number(volume)))
}

#[cfg(test)]
mod cli_support_tests {
    use super::*;

    #[test]
    fn reagent_spec_splits_at_last_equals() {
        let r = parse_reagent("Mix A=B = 2.5").unwrap();
        assert_eq!(r.name, "Mix A=B");
        assert_eq!(r.volume_per_reaction, 2.5);
        assert_eq!(parse_reagent("X=abc").unwrap().volume_per_reaction, 0.0);
    }
}
