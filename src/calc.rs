//! Master mix arithmetic.
//!
//! Everything here is pure: the same kit, sample count and margin always give
//! the same volumes. Raw user input goes through [`coerce_number`] /
//! [`coerce_count`] first; after that no function in this module can see or
//! produce a NaN.
//!
//! # Examples
//! ```
//! use mastermix::{calc, Kit, Margin, Reagent};
//! let kit = Kit::new("K", vec![Reagent::new("A", 2.0), Reagent::new("B", 1.0)]);
//! let mix = calc::calculate(&kit, 3.0, &Margin::extra_count(1));
//! assert_eq!(mix.factor, 4.0);
//! assert_eq!(mix.total_volume, 12.0);
//! ```
use serde::Serialize;

use crate::kit::{Kit, Margin, MarginMode, ScaledReagent};

/// Parse a numeric input field. Anything that is not a finite number
/// (empty, text, `NaN`, `inf`) counts as `0`.
pub fn coerce_number(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse an extra-reaction count: [`coerce_number`], then truncated and floored at `0`.
pub fn coerce_count(raw: &str) -> u32 {
    let v = coerce_number(raw);
    if v <= 0.0 { 0 } else { v.trunc().min(f64::from(u32::MAX)) as u32 }
}

/// Round half-up to two decimals.
///
/// A small nudge away from zero absorbs binary representation error, so
/// `1.005` rounds to `1.01` as it would on paper.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    let scaled = x * 100.0;
    (scaled + scaled.signum() * 1e-7).round() / 100.0
}

/// Total number of reactions to prepare for `samples` under `margin`.
///
/// Zero or negative sample counts are accepted; the margin still applies.
pub fn multiplication_factor(samples: f64, margin: &Margin) -> f64 {
    let samples = if samples.is_finite() { samples } else { 0.0 };
    match margin.mode {
        MarginMode::ExtraCount => samples + f64::from(margin.extra_count),
        MarginMode::ExtraPercentage => {
            let pct = if margin.extra_percentage.is_finite() { margin.extra_percentage } else { 0.0 };
            samples * (1.0 + pct / 100.0)
        }
    }
}

/// Scale every reagent of `kit` by `factor`, preserving reagent order.
/// Each total is rounded on its own.
pub fn scaled_volumes(kit: &Kit, factor: f64) -> Vec<ScaledReagent> {
    kit.reagents
        .iter()
        .map(|r| ScaledReagent {
            name: r.name.clone(),
            volume_per_reaction: r.volume_per_reaction,
            total_volume: round2(r.volume_per_reaction * factor),
        })
        .collect()
}

/// Sum of the already-rounded per-reagent totals, rounded again.
pub fn total_final_volume(rows: &[ScaledReagent]) -> f64 {
    round2(rows.iter().map(|r| r.total_volume).sum())
}

/// A complete calculation, ready for rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixResult {
    pub factor: f64,
    pub rows: Vec<ScaledReagent>,
    pub total_volume: f64,
}

/// Run the whole calculation for one kit.
pub fn calculate(kit: &Kit, samples: f64, margin: &Margin) -> MixResult {
    let factor = multiplication_factor(samples, margin);
    let rows = scaled_volumes(kit, factor);
    let total_volume = total_final_volume(&rows);
    MixResult { factor, rows, total_volume }
}

#[cfg(test)]
mod calc_tests {
    use super::*;
    use crate::kit::Reagent;

    fn ab_kit() -> Kit { Kit::new("AB", vec![Reagent::new("A", 2.0), Reagent::new("B", 1.0)]) }

    #[test]
    fn extra_count_adds_reactions() {
        for s in 0..20u32 {
            for e in 0..5u32 {
                let f = multiplication_factor(f64::from(s), &Margin::extra_count(e));
                assert_eq!(f, f64::from(s + e));
            }
        }
    }

    #[test]
    fn extra_percentage_scales_samples() {
        for s in [0.0, 1.0, 7.0, 96.0] {
            for p in [0.0, 5.0, 20.0, 100.0] {
                let f = multiplication_factor(s, &Margin::extra_percentage(p));
                assert!((f - s * (1.0 + p / 100.0)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn zero_samples_still_get_extra_reactions() {
        let mix = calculate(&ab_kit(), 0.0, &Margin::extra_count(2));
        assert_eq!(mix.factor, 2.0);
        assert_eq!(mix.total_volume, 6.0);
    }

    #[test]
    fn extra_count_scenario() {
        let mix = calculate(&ab_kit(), 3.0, &Margin::extra_count(1));
        assert_eq!(mix.factor, 4.0);
        let totals: Vec<_> = mix.rows.iter().map(|r| (r.name.as_str(), r.total_volume)).collect();
        assert_eq!(totals, vec![("A", 8.0), ("B", 4.0)]);
        assert_eq!(mix.total_volume, 12.0);
    }

    #[test]
    fn extra_percentage_scenario() {
        let mix = calculate(&ab_kit(), 10.0, &Margin::extra_percentage(20.0));
        assert!((mix.factor - 12.0).abs() < 1e-9);
        assert_eq!(mix.rows[0].total_volume, 24.0);
        assert_eq!(mix.rows[1].total_volume, 12.0);
        assert_eq!(mix.total_volume, 36.0);
    }

    #[test]
    fn rows_follow_kit_order() {
        let kit = crate::kits::default_kit();
        let rows = scaled_volumes(&kit, 2.5);
        assert_eq!(rows.len(), kit.reagents.len());
        for (row, r) in rows.iter().zip(&kit.reagents) {
            assert_eq!(row.name, r.name);
        }
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(f64::NAN), 0.0);
    }

    #[test]
    fn total_sums_rounded_rows() {
        // 0.333 * 1 -> 0.33 three times; the sum stays 0.99, not round2(0.999).
        let kit = Kit::new("T", vec![Reagent::new("x", 0.333), Reagent::new("y", 0.333), Reagent::new("z", 0.333)]);
        let mix = calculate(&kit, 1.0, &Margin::extra_count(0));
        assert_eq!(mix.total_volume, 0.99);
    }

    #[test]
    fn garbage_input_coerces_to_zero() {
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
        assert_eq!(coerce_number(" 12.5 "), 12.5);
        assert_eq!(coerce_count("-3"), 0);
        assert_eq!(coerce_count("2.9"), 2);
        assert_eq!(multiplication_factor(f64::NAN, &Margin::extra_count(1)), 1.0);
    }
}
