use crate::error::AppError;
use crate::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const STORE_FILE_NAME: &str = "storage.json";
const STORE_ENV_VAR: &str = "DAYLIST_STORE_PATH";

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("daylist").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("daylist")
            .join(STORE_FILE_NAME))
    }
}

/// Key-value store backed by a single JSON object on disk.
///
/// Every `set` rewrites the whole file. A missing file reads as an empty
/// store; a file that is not a JSON object of strings is an `invalid_data`
/// error on open.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open_default() -> Result<Self, AppError> {
        let path = store_path()?;
        Self::open(&path)
    }

    pub fn open(path: &Path) -> Result<Self, AppError> {
        let entries = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|err| {
                    AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}
