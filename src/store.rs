//! The kit catalog: the built-in kit plus user-defined kits, kept in sync
//! with a [`KitStorage`].
//!
//! Every mutation (save, delete, import) builds the next catalog, writes all
//! user-defined kits to storage in one call, and only then replaces the
//! in-memory catalog. A failed write therefore leaves the store exactly as it
//! was before the call.
//!
//! # Examples
//! ```
//! use mastermix::{Kit, KitStore, MemoryStorage, Reagent};
//! let mut store = KitStore::load(MemoryStorage::new());
//! let id = store.save(Kit::new("SuperScript IV", vec![Reagent::new("Buffer 5X", 4.0)])).unwrap();
//! assert_eq!(store.kits().len(), 2);
//! assert!(store.delete(id.as_str()).unwrap());
//! assert_eq!(store.kits().len(), 1);
//! ```
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::kit::{Kit, KitId};
use crate::kits::{default_kit, DEFAULT_KIT_ID};
use crate::schema::parse_kit_list;
use crate::storage::KitStorage;
use crate::{KitError, Result};

/// Fixed file name used by [`KitStore::export_to`].
pub const EXPORT_FILE_NAME: &str = "cdna_kits_backup.json";

/// Outcome of [`KitStore::import`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Kits actually added to the catalog.
    pub imported: usize,
    /// Records that passed validation, including skipped duplicates.
    pub valid_total: usize,
}

impl ImportReport {
    /// Valid records left out because their id was already taken.
    pub fn duplicates(&self) -> usize { self.valid_total - self.imported }
}

/// Catalog of kits backed by durable storage.
///
/// Invariants: `kits[0]` is the built-in kit; ids are unique; `selected`
/// always names a kit in `kits`.
#[derive(Debug)]
pub struct KitStore<S: KitStorage> {
    storage: S,
    kits: Vec<Kit>,
    selected: KitId,
}

impl<S: KitStorage> KitStore<S> {
    /// Build the catalog from `storage`.
    ///
    /// Records without an id, a name or reagents are dropped, as are records
    /// whose id is already taken. Unreadable or corrupt storage is logged and
    /// yields a catalog holding only the built-in kit.
    pub fn load(storage: S) -> Self {
        let mut kits = vec![default_kit()];
        match storage.read() {
            Ok(Some(raw)) => match parse_kit_list(&raw) {
                Ok(records) => {
                    let mut seen: HashSet<KitId> = HashSet::from([KitId::from(DEFAULT_KIT_ID)]);
                    for record in records {
                        match record {
                            Ok(kit) if seen.insert(kit.id.clone()) => kits.push(kit),
                            Ok(kit) => debug!(id = %kit.id, "dropping stored kit with duplicate id"),
                            Err(reason) => debug!(%reason, "dropping invalid stored kit"),
                        }
                    }
                }
                Err(e) => warn!(error = %e, "stored kits are corrupt; using the built-in kit only"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read kit storage; using the built-in kit only"),
        }
        debug!(kits = kits.len(), "kit catalog loaded");
        KitStore { storage, kits, selected: KitId::from(DEFAULT_KIT_ID) }
    }

    /// All kits, built-in first.
    pub fn kits(&self) -> &[Kit] { &self.kits }

    /// User-defined kits only.
    pub fn user_kits(&self) -> impl Iterator<Item = &Kit> + '_ {
        self.kits.iter().filter(|k| !k.is_builtin())
    }

    pub fn get(&self, id: &str) -> Option<&Kit> {
        self.kits.iter().find(|k| k.id.as_str() == id)
    }

    pub fn storage(&self) -> &S { &self.storage }

    pub fn selected_id(&self) -> &KitId { &self.selected }

    /// The selected kit (the built-in kit unless [`select`](Self::select) chose another).
    pub fn selected(&self) -> &Kit {
        self.get(self.selected.as_str()).unwrap_or(&self.kits[0])
    }

    /// Select the kit used for calculations.
    pub fn select(&mut self, id: &str) -> Result<&Kit> {
        let Some(pos) = self.kits.iter().position(|k| k.id.as_str() == id) else {
            return Err(KitError::UnknownKit(id.to_string()));
        };
        self.selected = self.kits[pos].id.clone();
        Ok(&self.kits[pos])
    }

    /// Create or replace a kit.
    ///
    /// If `kit.id` names an existing user-defined kit, that kit is replaced in
    /// place. Otherwise a fresh id is assigned and the kit is appended.
    /// Returns the id the kit was stored under.
    pub fn save(&mut self, mut kit: Kit) -> Result<KitId> {
        if kit.is_builtin() {
            return Err(KitError::ReadOnlyKit(DEFAULT_KIT_ID.to_string()));
        }
        kit.validate()?;

        let mut next = self.kits.clone();
        match next.iter().position(|k| k.id == kit.id) {
            Some(pos) => {
                info!(id = %kit.id, name = %kit.name, "replacing kit");
                next[pos] = kit.clone();
            }
            None => {
                kit.id = self.fresh_id();
                info!(id = %kit.id, name = %kit.name, "adding kit");
                next.push(kit.clone());
            }
        }
        self.commit(next)?;
        Ok(kit.id)
    }

    /// Remove a kit. Returns `false` (and changes nothing) for the built-in kit
    /// or an unknown id. A deleted selection falls back to the built-in kit.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if id == DEFAULT_KIT_ID {
            debug!("ignoring delete of the built-in kit");
            return Ok(false);
        }
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next: Vec<Kit> = self.kits.iter().filter(|k| k.id.as_str() != id).cloned().collect();
        self.commit(next)?;
        if self.selected.as_str() == id {
            self.selected = KitId::from(DEFAULT_KIT_ID);
        }
        info!(id, "kit deleted");
        Ok(true)
    }

    /// Serialize every user-defined kit as pretty JSON.
    pub fn export(&self) -> Result<String> {
        let kits: Vec<&Kit> = self.user_kits().collect();
        if kits.is_empty() {
            return Err(KitError::NothingToExport);
        }
        serde_json::to_string_pretty(&kits).map_err(|e| KitError::Io(e.into()))
    }

    /// Write [`export`](Self::export) to `dir/cdna_kits_backup.json`.
    /// Nothing is written when there is nothing to export.
    pub fn export_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let json = self.export()?;
        let path = dir.as_ref().join(EXPORT_FILE_NAME);
        std::fs::write(&path, json)?;
        info!(path = %path.display(), "kits exported");
        Ok(path)
    }

    /// Merge kits from exported JSON.
    ///
    /// Records failing validation are not counted; valid records whose id is
    /// already in the catalog (or earlier in the same file) are skipped silently.
    pub fn import(&mut self, raw: &str) -> Result<ImportReport> {
        let records = parse_kit_list(raw)?;
        let mut taken: HashSet<KitId> = self.kits.iter().map(|k| k.id.clone()).collect();
        let mut next = self.kits.clone();
        let mut valid_total = 0;
        let mut imported = 0;
        for record in records {
            match record {
                Ok(kit) => {
                    valid_total += 1;
                    if taken.insert(kit.id.clone()) {
                        imported += 1;
                        next.push(kit);
                    } else {
                        debug!(id = %kit.id, "skipping imported kit with existing id");
                    }
                }
                Err(reason) => debug!(%reason, "skipping invalid imported kit"),
            }
        }
        self.commit(next)?;
        info!(imported, valid_total, "kits imported");
        Ok(ImportReport { imported, valid_total })
    }

    /// Persist `next` (minus the built-in kit), then make it the catalog.
    fn commit(&mut self, next: Vec<Kit>) -> Result<()> {
        let user: Vec<&Kit> = next.iter().filter(|k| !k.is_builtin()).collect();
        let json = serde_json::to_string(&user).map_err(|e| KitError::StorageWrite(e.into()))?;
        self.storage.write(&json).map_err(KitError::StorageWrite)?;
        self.kits = next;
        Ok(())
    }

    fn fresh_id(&self) -> KitId {
        let mut millis = chrono::Utc::now().timestamp_millis();
        loop {
            let id = format!("kit-{millis}");
            if self.get(&id).is_none() {
                return KitId(id);
            }
            millis += 1;
        }
    }
}
