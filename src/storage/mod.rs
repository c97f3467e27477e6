use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::{ConfigPaths, StorageOptions};
use crate::state::AppState;

mod schema;

pub use schema::StoredState;

const STATE_TMP_EXTENSION: &str = "json.tmp";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("state file {path} is unavailable")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("state file {path} is malformed")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the whole [`AppState`] lives between runs.
pub trait StateStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<StoredState>, PersistenceError>;

    /// Replaces the stored blob with `state`.
    fn save(&self, state: &AppState) -> Result<(), PersistenceError>;

    /// Copies the current blob aside before a fresh state overwrites it.
    fn preserve_existing(&self) -> Result<Option<PathBuf>, PersistenceError> {
        Ok(None)
    }
}

/// JSON file on disk holding the full state.
#[derive(Clone, Debug)]
pub struct StorageHandle {
    state_path: Arc<PathBuf>,
    options: Arc<StorageOptions>,
}

impl StorageHandle {
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    fn unavailable(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Unavailable {
            path: self.state_path.to_path_buf(),
            source,
        }
    }
}

impl StateStore for StorageHandle {
    fn load(&self) -> Result<Option<StoredState>, PersistenceError> {
        let raw = match fs::read(&*self.state_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.unavailable(err)),
        };
        schema::parse(&raw)
            .map(Some)
            .map_err(|source| PersistenceError::Malformed {
                path: self.state_path.to_path_buf(),
                source,
            })
    }

    fn save(&self, state: &AppState) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(state).map_err(|err| self.unavailable(err.into()))?;
        let tmp_path = self.state_path.with_extension(STATE_TMP_EXTENSION);
        fs::write(&tmp_path, &json).map_err(|err| self.unavailable(err))?;
        fs::rename(&tmp_path, &*self.state_path).map_err(|err| self.unavailable(err))?;
        tracing::debug!(path = %self.state_path.display(), bytes = json.len(), "state saved");
        Ok(())
    }

    fn preserve_existing(&self) -> Result<Option<PathBuf>, PersistenceError> {
        if !self.options.backup_malformed || !self.state_path.exists() {
            return Ok(None);
        }
        let backup_dir = &self.options.backup_dir;
        fs::create_dir_all(backup_dir).map_err(|err| self.unavailable(err))?;
        let stamp = OffsetDateTime::now_utc().unix_timestamp();
        let target = backup_dir.join(format!("state-{stamp}.corrupt.json"));
        fs::copy(&*self.state_path, &target).map_err(|err| self.unavailable(err))?;
        Ok(Some(target))
    }
}

pub fn init(paths: &ConfigPaths, storage: &StorageOptions) -> anyhow::Result<StorageHandle> {
    let mut options = storage.clone();
    if options.state_path.as_os_str().is_empty() {
        options.state_path = paths.state_path.clone();
    }
    if options.backup_dir.as_os_str().is_empty() {
        options.backup_dir = paths.backup_dir.clone();
    }
    if let Some(parent) = options.state_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    Ok(StorageHandle {
        state_path: Arc::new(options.state_path.clone()),
        options: Arc::new(options),
    })
}


#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    use super::*;
    use crate::state::reconcile;

    fn temp_paths(root: &TempDir) -> ConfigPaths {
        let base = root.path();
        let config_dir = base.join("config");
        let data_dir = base.join("data");
        ConfigPaths {
            config_dir: config_dir.clone(),
            config_file: config_dir.join("config.toml"),
            data_dir: data_dir.clone(),
            state_path: data_dir.join("state.json"),
            backup_dir: data_dir.join("backups"),
            log_dir: base.join("logs"),
        }
    }

    fn init_storage() -> anyhow::Result<(TempDir, StorageHandle)> {
        let temp = TempDir::new()?;
        let paths = temp_paths(&temp);
        let storage = init(&paths, &StorageOptions::default())?;
        Ok((temp, storage))
    }

    fn seeded_state() -> AppState {
        let today = crate::state::Day::new(time::macros::date!(2024 - 01 - 02));
        reconcile(None, today, &[]).0
    }

    #[test]
    fn missing_file_loads_as_absent() -> anyhow::Result<()> {
        let (_temp, storage) = init_storage()?;
        assert!(storage.load()?.is_none());
        Ok(())
    }

    #[test]
    fn save_then_load_returns_same_state() -> anyhow::Result<()> {
        let (_temp, storage) = init_storage()?;
        let state = seeded_state();
        storage.save(&state)?;

        let stored = storage.load()?.expect("state present");
        assert_eq!(stored.tasks, state.tasks);
        assert_eq!(stored.daily_routine.as_ref(), Some(&state.daily_routine));
        assert_eq!(stored.settings, state.settings);
        assert_eq!(stored.last_open_date, state.last_open_date);
        assert!(!storage
            .state_path()
            .with_extension(STATE_TMP_EXTENSION)
            .exists());
        Ok(())
    }

    #[test]
    fn saved_blob_uses_storage_keys() -> anyhow::Result<()> {
        let (_temp, storage) = init_storage()?;
        storage.save(&seeded_state())?;
        let raw: serde_json::Value = serde_json::from_slice(&fs::read(storage.state_path())?)?;
        for key in ["tasks", "dailyRoutine", "settings", "lastOpenDate"] {
            assert!(raw.get(key).is_some(), "missing {key}");
        }
        assert_eq!(raw["lastOpenDate"], "Tue Jan 02 2024");
        Ok(())
    }

    #[test]
    fn malformed_file_reports_error_and_can_be_preserved() -> anyhow::Result<()> {
        let (_temp, storage) = init_storage()?;
        fs::write(storage.state_path(), "not json {{{")?;

        assert_matches!(storage.load(), Err(PersistenceError::Malformed { .. }));

        let backup = storage.preserve_existing()?.expect("backup written");
        assert_eq!(fs::read_to_string(&backup)?, "not json {{{");
        Ok(())
    }

    #[test]
    fn preserve_skips_when_disabled() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let paths = temp_paths(&temp);
        let options = StorageOptions {
            backup_malformed: false,
            ..StorageOptions::default()
        };
        let storage = init(&paths, &options)?;
        fs::write(storage.state_path(), "[]")?;
        assert!(storage.preserve_existing()?.is_none());
        Ok(())
    }

    #[test]
    fn save_into_missing_directory_is_unavailable() -> anyhow::Result<()> {
        let (temp, storage) = init_storage()?;
        fs::remove_dir_all(temp.path().join("data"))?;
        assert_matches!(
            storage.save(&seeded_state()),
            Err(PersistenceError::Unavailable { .. })
        );
        Ok(())
    }
}
