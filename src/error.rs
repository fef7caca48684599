//! Error type shared by the kit store, the import schema and the renderers.
//!
//! Storage *read* failures never surface here: [`crate::store::KitStore::load`]
//! absorbs them and falls back to the built-in kit. Everything else is reported
//! to the caller, and no failing operation leaves the catalog half-mutated.

/// Convenience alias used across the library.
pub type Result<T, E = KitError> = std::result::Result<T, E>;

/// Every failure the library reports to its caller.
#[derive(Debug, thiserror::Error)]
pub enum KitError {
    /// A kit failed validation on save (blank name, blank reagent name,
    /// no reagents, or a non-positive volume).
    #[error("invalid kit: {0}")]
    Validation(String),

    /// The built-in kit cannot be edited.
    #[error("kit `{0}` is read-only")]
    ReadOnlyKit(String),

    /// No kit with this id exists in the catalog.
    #[error("unknown kit: {0}")]
    UnknownKit(String),

    /// Export requested while the catalog holds only the built-in kit.
    #[error("there are no custom kits to export")]
    NothingToExport,

    /// Import text is not valid JSON.
    #[error("import is not valid JSON: {0}")]
    ImportParse(#[source] serde_json::Error),

    /// Import JSON is valid but its top level is not an array of kits.
    #[error("import does not contain a list of kits")]
    ImportFormat,

    /// Durable storage rejected a write; the catalog was left as it was.
    #[error("could not write kit storage: {0}")]
    StorageWrite(#[source] std::io::Error),

    /// The clipboard command could not be run or exited unsuccessfully.
    #[error("copy to clipboard failed: {0}")]
    Clipboard(String),

    /// Any other I/O failure (export file, printable output).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn storage_write_keeps_source() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only fs");
        let e = KitError::StorageWrite(io);
        assert!(e.source().is_some());
        assert!(e.to_string().contains("read-only fs"));
    }

    #[test]
    fn messages_name_the_kit() {
        let e = KitError::ReadOnlyKit("default-kit".into());
        assert_eq!(e.to_string(), "kit `default-kit` is read-only");
    }
}
