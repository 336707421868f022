use crate::{dirs, error::TimerError};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Environment variable overriding the data root
pub const ROOT_ENV: &str = "TASKTIMER_ROOT";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding every persisted file
    pub root: PathBuf,
}

impl Config {
    /// Resolves the data root: explicit override, then `$TASKTIMER_ROOT`, then the platform data dir
    pub fn resolve(root: Option<PathBuf>) -> Result<Self, TimerError> {
        let Some(root) = root
            .or_else(|| env::var_os(ROOT_ENV).map(PathBuf::from))
            .or_else(|| dirs().map(|d| d.data_local_dir().to_owned()).ok())
        else {
            return Err(TimerError::NoProjectDirs);
        };

        Ok(Self { root })
    }
}

pub trait Saveable: Serialize + DeserializeOwned + Default {
    fn path(root: &Path) -> PathBuf;

    /// Writes the whole value, replacing the previous file in one rename
    fn save(&self, root: &Path) -> Result<(), TimerError> {
        let path = Self::path(root);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = path.with_extension("tmp");
        fs::write(&staging, serde_json::to_string_pretty(self)?)?;
        if let Err(error) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            Err(error)?
        }

        Ok(())
    }

    fn try_read(root: &Path) -> Result<Self, TimerError> {
        let content = fs::read_to_string(Self::path(root))?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Like [`Saveable::try_read`], but a missing or undecodable file yields the default value
    fn load(root: &Path) -> Self {
        Self::try_read(root).unwrap_or_else(|error| {
            debug!("Starting from empty state ({error})");
            Self::default()
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Config, Saveable};
    use crate::scratch_dir;
    use serde::{Deserialize, Serialize};
    use std::{
        fs,
        path::{Path, PathBuf},
    };

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    impl Saveable for Counter {
        fn path(root: &Path) -> PathBuf {
            root.join("nested").join("counter.json")
        }
    }

    #[test]
    fn test_save_creates_missing_directories() {
        let dir = scratch_dir("config-save");
        let root = dir.path();

        Counter { value: 7 }.save(root).unwrap();

        assert_eq!(Counter::try_read(root).unwrap(), Counter { value: 7 });
        assert!(!root.join("nested").join("counter.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_staging_file() {
        let dir = scratch_dir("config-rename");
        let root = dir.path();
        // A non-empty directory where the file should go
        fs::create_dir_all(Counter::path(root).join("occupied")).unwrap();

        assert!(Counter { value: 1 }.save(root).is_err());
        assert!(!root.join("nested").join("counter.tmp").exists());
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let dir = scratch_dir("config-load");
        let root = dir.path();
        assert_eq!(Counter::load(root), Counter::default());

        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(Counter::path(root), "{ not json").unwrap();
        assert!(Counter::try_read(root).is_err());
        assert_eq!(Counter::load(root), Counter::default());
    }

    #[test]
    fn test_explicit_root_wins() {
        let config = Config::resolve(Some(PathBuf::from("/somewhere/else"))).unwrap();
        assert_eq!(config.root, PathBuf::from("/somewhere/else"));
    }
}
