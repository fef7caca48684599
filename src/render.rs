//! Text renderings of a calculation: clipboard text, printable protocol and
//! result tables.
//!
//! All wording comes from a [`TextResolver`]; numbers are formatted here.
//! Per-reaction volumes print as entered (`4`, `0.5`), totals always with two
//! decimals, and the reaction count with one.
use chrono::NaiveDate;
use polars::prelude::*;

use crate::calc::MixResult;
use crate::i18n::TextResolver;
use crate::kit::Kit;
use crate::{KitError, Result};

/// Display name of a kit; the built-in kit's name is localized.
pub fn kit_title(kit: &Kit, t: &dyn TextResolver) -> String {
    if kit.is_builtin() { t.text("defaultKit.name", &[]) } else { kit.name.clone() }
}

/// Tab-delimited results, suitable for pasting into a spreadsheet.
///
/// ```text
/// Master mix results for 4.0 reactions
/// Reagent<TAB>Volume/Reaction (µL)<TAB>Total Volume (µL)
/// A<TAB>2<TAB>8.00
/// Total Final Volume:<TAB>8.00 µL
/// ```
pub fn clipboard_text(mix: &MixResult, t: &dyn TextResolver) -> Result<String> {
    let factor = format!("{:.1}", mix.factor);
    let mut out = t.text("results.forReactions", &[("factor", factor.as_str())]);
    out.push('\n');

    let mut w = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());
    w.write_record([
        t.text("results.reagent", &[]),
        t.text("results.volumePerReaction", &[]),
        t.text("results.totalVolume", &[]),
    ]).map_err(csv_error)?;
    for r in &mix.rows {
        w.write_record([r.name.clone(), r.volume_per_reaction.to_string(), format!("{:.2}", r.total_volume)])
            .map_err(csv_error)?;
    }
    let table = w.into_inner().map_err(|e| KitError::Io(e.into_error()))?;
    out.push_str(&String::from_utf8_lossy(&table));

    out.push_str(&format!("{}\t{:.2} µL", t.text("results.finalVolume", &[]), mix.total_volume));
    Ok(out)
}

fn csv_error(e: csv::Error) -> KitError {
    KitError::Io(e.into())
}

/// Printable protocol sheet (Markdown): title, generation date, protocol,
/// results table and, when present, the kit notes.
pub fn printable_protocol(kit: &Kit, mix: &MixResult, t: &dyn TextResolver, date: NaiveDate) -> String {
    let date = date.format("%Y-%m-%d").to_string();
    let mut s = String::new();
    s.push_str(&format!("# {}\n\n", kit_title(kit, t)));
    s.push_str(&format!("{}\n\n", t.text("print.generatedOn", &[("date", date.as_str())])));

    s.push_str(&format!("## {}\n\n", t.text("kitModal.protocolLabel", &[])));
    if kit.protocol.trim().is_empty() {
        s.push_str(&format!("{}\n\n", t.text("protocol.none", &[])));
    } else {
        s.push_str(&format!("```\n{}\n```\n\n", kit.protocol));
    }

    s.push_str(&format!("## {}\n\n", t.text("results.title", &[])));
    s.push_str(&format!(
        "| {} | {} | {} |\n|---|---:|---:|\n",
        t.text("results.reagent", &[]),
        t.text("results.volumePerReaction", &[]),
        t.text("results.totalVolume", &[]),
    ));
    for r in &mix.rows {
        s.push_str(&format!("| {} | {} | **{:.2}** |\n", r.name, r.volume_per_reaction, r.total_volume));
    }

    if !kit.notes.trim().is_empty() {
        s.push_str(&format!("\n## {}\n\n{}\n", t.text("kitModal.notesLabel", &[]), kit.notes));
    }
    s
}

/// Results as a DataFrame, one row per reagent, headers localized.
pub fn results_frame(mix: &MixResult, t: &dyn TextResolver) -> PolarsResult<DataFrame> {
    let names: Vec<String> = mix.rows.iter().map(|r| r.name.clone()).collect();
    let per: Vec<f64> = mix.rows.iter().map(|r| r.volume_per_reaction).collect();
    let totals: Vec<String> = mix.rows.iter().map(|r| format!("{:.2}", r.total_volume)).collect();
    DataFrame::new(vec![
        Series::new(t.text("results.reagent", &[]).as_str().into(), names),
        Series::new(t.text("results.volumePerReaction", &[]).as_str().into(), per),
        Series::new(t.text("results.totalVolume", &[]).as_str().into(), totals),
    ])
}

/// The catalog as a DataFrame: id, name, reagent count, protocol present, built-in.
pub fn kits_frame<'a>(kits: impl IntoIterator<Item = &'a Kit>, t: &dyn TextResolver) -> PolarsResult<DataFrame> {
    let kits: Vec<&Kit> = kits.into_iter().collect();
    df!(
        "kit" => kits.iter().map(|k| k.id.0.clone()).collect::<Vec<_>>(),
        "name" => kits.iter().map(|k| kit_title(k, t)).collect::<Vec<_>>(),
        "reagents" => kits.iter().map(|k| k.reagents.len() as u32).collect::<Vec<_>>(),
        "protocol" => kits.iter().map(|k| !k.protocol.trim().is_empty()).collect::<Vec<_>>(),
        "builtin" => kits.iter().map(|k| k.is_builtin()).collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod render_tests {
    use super::*;
    use crate::calc::calculate;
    use crate::i18n::Locale;
    use crate::kit::{Margin, Reagent};

    fn ab_mix() -> (Kit, MixResult) {
        let kit = Kit::new("AB", vec![Reagent::new("A", 2.0), Reagent::new("B", 0.5)]);
        let mix = calculate(&kit, 3.0, &Margin::extra_count(1));
        (kit, mix)
    }

    #[test]
    fn clipboard_text_layout() {
        let (_, mix) = ab_mix();
        let text = clipboard_text(&mix, &Locale::En).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Master mix results for 4.0 reactions");
        assert_eq!(lines[1], "Reagent\tVolume/Reaction (µL)\tTotal Volume (µL)");
        assert_eq!(lines[2], "A\t2\t8.00");
        assert_eq!(lines[3], "B\t0.5\t2.00");
        assert_eq!(lines[4], "Total Final Volume:\t10.00 µL");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn clipboard_rows_keep_names_verbatim() {
        let kit = Kit::new("HF", vec![Reagent::new("Buffer \"HF\" 5X", 4.0)]);
        let mix = calculate(&kit, 1.0, &Margin::extra_count(0));
        let text = clipboard_text(&mix, &Locale::En).unwrap();
        assert_eq!(text.lines().nth(2), Some("Buffer \"HF\" 5X\t4\t4.00"));
    }

    #[test]
    fn clipboard_text_is_localized() {
        let (_, mix) = ab_mix();
        let text = clipboard_text(&mix, &Locale::Pt).unwrap();
        assert!(text.starts_with("Resultados do Master Mix para 4.0 reações\nReagente\t"));
    }

    #[test]
    fn printable_protocol_sections() {
        let (kit, mix) = ab_mix();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let sheet = printable_protocol(&kit, &mix, &Locale::En, date);
        assert!(sheet.starts_with("# AB\n"));
        assert!(sheet.contains("Generated on: 2025-03-14"));
        assert!(sheet.contains("No protocol defined."));
        assert!(sheet.contains("| A | 2 | **8.00** |"));
        assert!(!sheet.contains("## Notes"));

        let kit = kit.with_protocol("65°C 5 min").with_notes("keep on ice");
        let sheet = printable_protocol(&kit, &mix, &Locale::En, date);
        assert!(sheet.contains("65°C 5 min"));
        assert!(sheet.contains("## Notes\n\nkeep on ice"));
    }

    #[test]
    fn builtin_title_is_localized() {
        let kit = crate::kits::default_kit();
        assert_eq!(kit_title(&kit, &Locale::Pt), "Kit Genérico (Exemplo)");
    }

    #[test]
    fn frames_have_one_row_per_item() {
        let (kit, mix) = ab_mix();
        assert_eq!(results_frame(&mix, &Locale::En).unwrap().height(), 2);
        let builtin = crate::kits::default_kit();
        let df = kits_frame([&builtin, &kit], &Locale::En).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 5);
    }
}
