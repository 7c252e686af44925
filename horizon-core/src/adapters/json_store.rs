//! File-backed pattern store (`patterns.json`)

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::memory::{apply_update, remove_patterns};
use crate::domain::result::{Error, Result};
use crate::domain::{CategorizationPattern, PatternKey};
use crate::ports::{PatternStore, PatternUpdate};

pub const PATTERNS_FILE: &str = "patterns.json";

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PatternFile {
    version: u32,
    patterns: Vec<CategorizationPattern>,
}

/// Pattern store persisted as a JSON document
///
/// Every write reloads the file, applies the change and replaces the file
/// through a temporary sibling. Writers hold the mutex and an exclusive
/// lock on `patterns.json.lock`, so concurrent `hz` processes do not lose
/// each other's updates.
pub struct JsonPatternStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonPatternStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/patterns.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PATTERNS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<HashMap<PatternKey, CategorizationPattern>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        let file: PatternFile = serde_json::from_str(&content)?;
        if file.version > FORMAT_VERSION {
            return Err(Error::store(format!(
                "{} has format version {}, newest supported is {}",
                self.path.display(),
                file.version,
                FORMAT_VERSION
            )));
        }
        Ok(file.patterns.into_iter().map(|p| (p.key(), p)).collect())
    }

    fn write(&self, patterns: &HashMap<PatternKey, CategorizationPattern>) -> Result<()> {
        let mut sorted: Vec<CategorizationPattern> = patterns.values().cloned().collect();
        sorted.sort_by(|a, b| {
            a.family_id
                .cmp(&b.family_id)
                .then_with(|| a.merchant_normalized.cmp(&b.merchant_normalized))
                .then_with(|| a.category_id.cmp(&b.category_id))
        });
        let file = PatternFile {
            version: FORMAT_VERSION,
            patterns: sorted,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&file)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = file.patterns.len(), "wrote pattern file");
        Ok(())
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::store("pattern file lock poisoned"))
    }

    /// Exclusive lock shared with other processes; released on drop
    fn lock_file(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.path.with_extension("json.lock"))?;
        file.lock_exclusive()?;
        Ok(file)
    }
}

impl PatternStore for JsonPatternStore {
    fn patterns_for_family(&self, family_id: Uuid) -> Result<Vec<CategorizationPattern>> {
        let _guard = self.guard()?;
        let mut found: Vec<CategorizationPattern> = self
            .read()?
            .into_values()
            .filter(|p| p.family_id == family_id)
            .collect();
        found.sort_by(|a, b| a.merchant_normalized.cmp(&b.merchant_normalized));
        Ok(found)
    }

    fn update_pattern(
        &self,
        key: &PatternKey,
        update: PatternUpdate<'_>,
    ) -> Result<CategorizationPattern> {
        let _guard = self.guard()?;
        let _lock = self.lock_file()?;
        let mut patterns = self.read()?;
        let updated = apply_update(&mut patterns, key, update)?;
        self.write(&patterns)?;
        Ok(updated)
    }

    fn delete_patterns(&self, family_id: Uuid, ids: &[Uuid]) -> Result<usize> {
        let _guard = self.guard()?;
        let _lock = self.lock_file()?;
        let mut patterns = self.read()?;
        let removed = remove_patterns(&mut patterns, family_id, ids);
        if removed > 0 {
            self.write(&patterns)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn key(family_id: Uuid, merchant: &str) -> PatternKey {
        PatternKey {
            family_id,
            merchant_normalized: merchant.to_string(),
            category_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonPatternStore::in_dir(dir.path());
        assert!(store.patterns_for_family(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_updates_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let family_id = Uuid::new_v4();
        let key = key(family_id, "costco");
        let now = Utc::now();

        let store = JsonPatternStore::in_dir(dir.path());
        for _ in 0..3 {
            store
                .update_pattern(&key, &mut |existing| match existing {
                    Some(p) => p.record_match(now),
                    None => CategorizationPattern::first_match(&key, now),
                })
                .unwrap();
        }

        let reopened = JsonPatternStore::in_dir(dir.path());
        let patterns = reopened.patterns_for_family(family_id).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].match_count, 3);
        assert!(!dir.path().join("patterns.json.tmp").exists());
    }

    #[test]
    fn test_delete_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let family_id = Uuid::new_v4();
        let store = JsonPatternStore::in_dir(dir.path());
        let now = Utc::now();

        let keep = key(family_id, "keep");
        let drop = key(family_id, "drop");
        store
            .update_pattern(&keep, &mut |_| CategorizationPattern::first_match(&keep, now))
            .unwrap();
        let dropped = store
            .update_pattern(&drop, &mut |_| CategorizationPattern::first_match(&drop, now))
            .unwrap();

        assert_eq!(store.delete_patterns(family_id, &[dropped.id]).unwrap(), 1);
        let remaining = JsonPatternStore::in_dir(dir.path())
            .patterns_for_family(family_id)
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].merchant_normalized, "keep");
    }

    #[test]
    fn test_separate_handles_share_one_file_without_losing_updates() {
        let dir = TempDir::new().unwrap();
        let family_id = Uuid::new_v4();
        let key = key(family_id, "walmart");
        let now = Utc::now();

        // one store per thread, like separate hz processes on the same directory
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = dir.path().to_path_buf();
                let key = key.clone();
                std::thread::spawn(move || {
                    let store = JsonPatternStore::in_dir(&path);
                    for _ in 0..10 {
                        store
                            .update_pattern(&key, &mut |existing| match existing {
                                Some(p) => p.record_match(now),
                                None => CategorizationPattern::first_match(&key, now),
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let patterns = JsonPatternStore::in_dir(dir.path())
            .patterns_for_family(family_id)
            .unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].match_count, 40);
        assert!(dir.path().join("patterns.json.lock").exists());
    }

    #[test]
    fn test_newer_format_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PATTERNS_FILE),
            r#"{"version": 99, "patterns": []}"#,
        )
        .unwrap();
        let store = JsonPatternStore::in_dir(dir.path());
        assert!(matches!(
            store.patterns_for_family(Uuid::new_v4()),
            Err(Error::Store(_))
        ));
    }
}
