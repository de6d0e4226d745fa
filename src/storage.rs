// Manages the on-disk event snapshot and its generated companion module.
//
// Two artifacts are always written together:
// - events.json: the canonical list, pretty-printed UTF-8.
// - events.py:   the same list bound to `EVENTS`, importable as-is.
use crate::model::EventRecord;
use crate::store::EventStore;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name the companion module binds the list to.
pub const MODULE_BINDING: &str = "EVENTS";

pub struct LocalStorage;

impl LocalStorage {
    /// Helper to get a sidecar lock file path
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on `file_path`'s sidecar.
    /// Not reentrant: do not nest calls for the same path.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    fn temp_path_for(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "snapshot".to_string());
        path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
    }

    fn write_temp(path: &Path, contents: &[u8]) -> Result<PathBuf> {
        let tmp_path = Self::temp_path_for(path);
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("Failed to create {:?}", tmp_path))?;
        file.write_all(contents)
            .and_then(|_| file.sync_all())
            .with_context(|| format!("Failed to write {:?}", tmp_path))?;
        Ok(tmp_path)
    }

    /// Atomic write: write to a unique temp sibling, then rename over `path`.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = Self::write_temp(path, contents.as_ref())?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("Failed to replace {:?}", path));
        }
        Ok(())
    }

    pub fn render_snapshot(records: &[EventRecord]) -> Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }

    pub fn render_module(records: &[EventRecord]) -> Result<String> {
        Ok(format!(
            "{} = {}\n",
            MODULE_BINDING,
            Self::render_snapshot(records)?
        ))
    }

    /// Reads a snapshot. Never fails: a missing, unreadable or malformed file
    /// is an empty list, and entries that are not records are skipped.
    pub fn load_events(path: &Path) -> Vec<EventRecord> {
        if !path.exists() {
            return vec![];
        }
        let content = match Self::with_lock(path, || Ok(fs::read_to_string(path)?)) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Could not read {}: {}. Starting empty.", path.display(), e);
                return vec![];
            }
        };
        Self::parse_snapshot(&content)
    }

    pub fn parse_snapshot(content: &str) -> Vec<EventRecord> {
        let items = match serde_json::from_str::<serde_json::Value>(content) {
            Ok(serde_json::Value::Array(items)) => items,
            Ok(_) => {
                log::warn!("Snapshot is not a list. Starting empty.");
                return vec![];
            }
            Err(e) => {
                log::warn!("Snapshot is not valid JSON ({}). Starting empty.", e);
                return vec![];
            }
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<EventRecord>(item) {
                Ok(rec) if !rec.id.is_empty() => Some(rec),
                Ok(_) => {
                    log::warn!("Skipping stored event without id");
                    None
                }
                Err(e) => {
                    log::warn!("Skipping unreadable stored event: {}", e);
                    None
                }
            })
            .collect()
    }

    pub fn load_store(path: &Path) -> EventStore {
        EventStore::from_records(Self::load_events(path))
    }

    /// Writes both artifacts under one lock.
    ///
    /// Both temp files are fully written before either is renamed, so a
    /// reader never sees a truncated file. Any failure is returned.
    pub fn persist(json_path: &Path, module_path: &Path, records: &[EventRecord]) -> Result<()> {
        let snapshot = Self::render_snapshot(records)?;
        let module = Self::render_module(records)?;

        Self::with_lock(json_path, || {
            let json_tmp = Self::write_temp(json_path, snapshot.as_bytes())?;
            let module_tmp = match Self::write_temp(module_path, module.as_bytes()) {
                Ok(p) => p,
                Err(e) => {
                    let _ = fs::remove_file(&json_tmp);
                    return Err(e);
                }
            };
            // Module first: if it cannot be replaced, events.json stays as it was.
            if let Err(e) = fs::rename(&module_tmp, module_path) {
                let _ = fs::remove_file(&module_tmp);
                let _ = fs::remove_file(&json_tmp);
                return Err(e).with_context(|| format!("Failed to replace {:?}", module_path));
            }
            if let Err(e) = fs::rename(&json_tmp, json_path) {
                let _ = fs::remove_file(&json_tmp);
                return Err(e).with_context(|| format!("Failed to replace {:?}", json_path));
            }
            Ok(())
        })?;

        log::info!(
            "{} / {} saved ({} events)",
            json_path.display(),
            module_path.display(),
            records.len()
        );
        Ok(())
    }
}
