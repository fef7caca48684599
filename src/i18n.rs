//! Display strings, looked up by key.
//!
//! Nothing outside this module depends on the wording; renderers ask a
//! [`TextResolver`] for a key and pass interpolation parameters, which fill
//! `{{name}}` placeholders.
//!
//! # Examples
//! ```
//! use mastermix::i18n::{Locale, TextResolver};
//! let t = Locale::Pt;
//! assert_eq!(t.text("results.reagent", &[]), "Reagente");
//! assert_eq!(Locale::En.text("results.forReactions", &[("factor", "4.0")]),
//!            "Master mix results for 4.0 reactions");
//! ```
use core::fmt;
use core::str::FromStr;

/// Resolve a key (plus parameters) into a display string.
pub trait TextResolver {
    fn text(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Built-in locales.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Locale {
    #[default]
    En,
    Pt,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Locale::En => "en", Locale::Pt => "pt" })
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts `en`, `pt` and region variants such as `pt-BR` or `en_US.UTF-8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s.split(['-', '_', '.']).next().unwrap_or_default().to_ascii_lowercase();
        match lang.as_str() {
            "en" => Ok(Locale::En),
            "pt" => Ok(Locale::Pt),
            _ => Err(format!("unsupported language `{s}` (expected en or pt)")),
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("defaultKit.name", "Generic Kit (Example)"),
    ("results.title", "Master Mix Results"),
    ("results.forReactions", "Master mix results for {{factor}} reactions"),
    ("results.reagent", "Reagent"),
    ("results.volumePerReaction", "Volume/Reaction (µL)"),
    ("results.totalVolume", "Total Volume (µL)"),
    ("results.finalVolume", "Total Final Volume:"),
    ("kitModal.protocolLabel", "Thermocycler Protocol"),
    ("kitModal.notesLabel", "Notes"),
    ("protocol.none", "No protocol defined."),
    ("print.generatedOn", "Protocol and Master Mix - Generated on: {{date}}"),
    ("copy.done", "Copied!"),
    ("copy.failed", "Copy failed"),
    ("kits.reagentCount", "{{count}} reagents"),
    ("kits.saved", "Kit saved as {{id}}."),
    ("kits.deleted", "Kit {{id}} deleted."),
    ("kits.notDeleted", "Kit {{id}} cannot be deleted or does not exist."),
    ("export.done", "Kits exported to {{path}}."),
    ("import.summary", "{{imported}} of {{total}} kits were imported successfully! Duplicate kits were ignored."),
];

const PT: &[(&str, &str)] = &[
    ("defaultKit.name", "Kit Genérico (Exemplo)"),
    ("results.title", "Resultados do Master Mix"),
    ("results.forReactions", "Resultados do Master Mix para {{factor}} reações"),
    ("results.reagent", "Reagente"),
    ("results.volumePerReaction", "Volume/Reação (µL)"),
    ("results.totalVolume", "Volume Total (µL)"),
    ("results.finalVolume", "Volume Total Final:"),
    ("kitModal.protocolLabel", "Protocolo do Termociclador"),
    ("kitModal.notesLabel", "Notas"),
    ("protocol.none", "Nenhum protocolo definido."),
    ("print.generatedOn", "Protocolo e Master Mix - Gerado em: {{date}}"),
    ("copy.done", "Copiado!"),
    ("copy.failed", "Falha ao copiar"),
    ("kits.reagentCount", "{{count}} reagentes"),
    ("kits.saved", "Kit salvo como {{id}}."),
    ("kits.deleted", "Kit {{id}} excluído."),
    ("kits.notDeleted", "O kit {{id}} não pode ser excluído ou não existe."),
    ("export.done", "Kits exportados para {{path}}."),
    ("import.summary", "{{imported}} de {{total}} kits foram importados com sucesso! Kits duplicados foram ignorados."),
];

impl Locale {
    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self { Locale::En => EN, Locale::Pt => PT }
    }
}

impl TextResolver for Locale {
    /// Unknown keys resolve to the key itself; missing translations fall back to English.
    fn text(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = lookup(self.table(), key).or_else(|| lookup(EN, key)).unwrap_or(key);
        interpolate(template, params)
    }
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{{{name}}}}}"), value)
    })
}
