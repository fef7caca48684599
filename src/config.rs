//! Runtime settings: where kits are stored, display language, clipboard command.
//!
//! The CLI fills this from flags and `MASTERMIX_*` environment variables;
//! anything left unset is derived here.
use std::path::PathBuf;

use crate::i18n::Locale;

/// Resolved settings for one run.
#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub locale: Locale,
    pub clipboard_cmd: Option<String>,
}

impl Config {
    /// Fill unset values with platform defaults.
    pub fn resolve(data_dir: Option<PathBuf>, locale: Option<Locale>, clipboard_cmd: Option<String>) -> Self {
        Config {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            locale: locale.or_else(locale_from_env).unwrap_or_default(),
            clipboard_cmd: clipboard_cmd
                .filter(|c| !c.trim().is_empty())
                .or_else(|| crate::clipboard::default_command().map(str::to_string)),
        }
    }
}

/// Per-user data directory.
///
/// - macOS: `~/Library/Application Support/mastermix`
/// - Windows: `%APPDATA%\mastermix`
/// - otherwise: `$XDG_DATA_HOME/mastermix` or `~/.local/share/mastermix`
pub fn default_data_dir() -> PathBuf {
    let home = || PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()));
    if cfg!(target_os = "macos") {
        home().join("Library/Application Support/mastermix")
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("mastermix")
    } else {
        match std::env::var("XDG_DATA_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("mastermix"),
            _ => home().join(".local/share/mastermix"),
        }
    }
}

fn locale_from_env() -> Option<Locale> {
    std::env::var("LANG").ok().and_then(|l| l.parse().ok())
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn explicit_values_win() {
        let c = Config::resolve(Some(PathBuf::from("/tmp/kits")), Some(Locale::Pt), Some("cat".into()));
        assert_eq!(c.data_dir, PathBuf::from("/tmp/kits"));
        assert_eq!(c.locale, Locale::Pt);
        assert_eq!(c.clipboard_cmd.as_deref(), Some("cat"));
    }

    #[test]
    fn default_dir_ends_with_crate_name() {
        assert!(default_data_dir().ends_with("mastermix"));
    }
}
