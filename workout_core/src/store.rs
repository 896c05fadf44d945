//! Whole-document JSON persistence with file locking.
//!
//! Each collection (catalog, plans, history) lives in one file that is read
//! entirely on load and replaced entirely on every mutation. There is no
//! revision check, so two writers racing on the same file means the last
//! one wins.

use crate::{Catalog, Error, HistoryLog, PlanBook, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const CATALOG_FILE: &str = "catalog.json";
pub const PLANS_FILE: &str = "plans.json";
pub const HISTORY_FILE: &str = "history.json";

/// Load a document under a shared lock.
///
/// A missing file yields `T::default()`. A file that does not parse is an
/// error: overwriting it on the next save would lose its contents.
pub fn load_document<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        tracing::debug!("No document at {:?}, starting empty", path);
        return Ok(T::default());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    let doc = serde_json::from_str(&contents).map_err(|e| {
        tracing::warn!("Failed to parse {:?}: {}", path, e);
        Error::Json(e)
    })?;
    tracing::debug!("Loaded document from {:?}", path);
    Ok(doc)
}

/// Replace a document atomically.
///
/// 1. Write to a temp file in the same directory under an exclusive lock
/// 2. Sync to disk
/// 3. Rename over the original
pub fn save_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "document path missing parent")
    })?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, doc)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Saved document to {:?}", path);
    Ok(())
}

/// Load, modify and save back
pub fn update_document<T, F, R>(path: &Path, f: F) -> Result<R>
where
    T: DeserializeOwned + Serialize + Default,
    F: FnOnce(&mut T) -> Result<R>,
{
    let mut doc: T = load_document(path)?;
    let out = f(&mut doc)?;
    save_document(path, &doc)?;
    Ok(out)
}

/// The three documents under one data directory
#[derive(Clone, Debug)]
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    pub fn plans_path(&self) -> PathBuf {
        self.dir.join(PLANS_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    /// Saved catalog, or the seed catalog on first run
    pub fn load_catalog(&self) -> Result<Catalog> {
        let path = self.catalog_path();
        if !path.exists() {
            tracing::info!("No catalog at {:?}, using built-in exercises", path);
            return Ok(crate::get_default_catalog().clone());
        }
        load_document(&path)
    }

    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        save_document(&self.catalog_path(), catalog)
    }

    pub fn load_plans(&self) -> Result<PlanBook> {
        load_document(&self.plans_path())
    }

    pub fn save_plans(&self, plans: &PlanBook) -> Result<()> {
        save_document(&self.plans_path(), plans)
    }

    pub fn load_history(&self) -> Result<HistoryLog> {
        load_document(&self.history_path())
    }

    pub fn save_history(&self, history: &HistoryLog) -> Result<()> {
        save_document(&self.history_path(), history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::MuscleGroup;
    use crate::{ExerciseDefinition, ExerciseKind, ExerciseParams, PlanDraft};
    use chrono::Weekday;

    #[test]
    fn test_missing_documents_start_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(temp_dir.path());

        assert!(store.load_plans().unwrap().plans().is_empty());
        assert!(store.load_history().unwrap().is_empty());
        assert_eq!(
            store.load_catalog().unwrap().len(),
            crate::get_default_catalog().len()
        );
    }

    #[test]
    fn test_catalog_roundtrip_replaces_seed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(temp_dir.path());

        let mut catalog = Catalog::new();
        catalog
            .add_exercise("Costas", "Dorsais", ExerciseKind::MultiJoint, ExerciseDefinition::new("Remada Baixa", "3", "10", "60"))
            .unwrap();
        store.save_catalog(&catalog).unwrap();

        assert_eq!(store.load_catalog().unwrap(), catalog);
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(temp_dir.path().join("nested"));

        let id = update_document(&store.plans_path(), |book: &mut PlanBook| {
            let mut draft = PlanDraft::new(vec![Weekday::Mon], vec![MuscleGroup::Chest]);
            draft.add(
                "Peitoral Médio",
                "Supino Reto",
                ExerciseParams { sets: 3, reps: 10, time_per_set: 45, rest: 60 },
            );
            Ok(book.create(draft)?.id)
        })
        .unwrap();

        let loaded = store.load_plans().unwrap();
        assert_eq!(loaded.plans().len(), 1);
        assert_eq!(loaded.plans()[0].id, id);
    }

    #[test]
    fn test_failed_update_does_not_write() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(PLANS_FILE);

        let result = update_document(&path, |_: &mut PlanBook| -> Result<()> {
            Err(Error::Validation("nope".into()))
        });
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupted_document_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(HISTORY_FILE);
        std::fs::write(&path, "{ invalid json }").unwrap();

        let result: Result<HistoryLog> = load_document(&path);
        assert!(matches!(result, Err(Error::Json(_))));
        // Untouched
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ invalid json }");
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(temp_dir.path());
        store.save_history(&HistoryLog::new()).unwrap();
        store.save_history(&HistoryLog::new()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != HISTORY_FILE)
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only {}, found extras: {:?}",
            HISTORY_FILE,
            extras
        );
    }
}
