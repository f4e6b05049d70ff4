use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PlannerConfig {
    pub database: Option<String>,
    pub busy_timeout_ms: Option<u64>,
}

impl PlannerConfig {
    /// Database path from the config, falling back to the default location under `base`
    pub fn database_path_in(&self, base: &Path) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path_in(base))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("schoolplanner.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".schoolplanner").join("planner.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PlannerConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PlannerConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PlannerConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schoolplanner.toml");
        let config = PlannerConfig {
            database: Some("data/planner.db".to_string()),
            busy_timeout_ms: Some(250),
        };

        write_config(&path, &config, false).unwrap();
        let loaded = load_config(Some(path.as_path())).unwrap().unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.busy_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schoolplanner.toml");
        write_config(&path, &PlannerConfig::default(), false).unwrap();

        assert!(write_config(&path, &PlannerConfig::default(), false).is_err());
        assert!(write_config(&path, &PlannerConfig::default(), true).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        let base = Path::new("/srv/school");
        assert_eq!(config.database_path_in(base), base.join(".schoolplanner").join("planner.db"));
        assert_eq!(config.busy_timeout(), Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS));
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("planner.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
