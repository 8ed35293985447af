use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use oxiscan_core::scan_root;

/// Fatal configuration problems, reported before any file is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("scanSource must list at least one project")]
    EmptyScanSource,
    #[error("scanSource[{0}] requires a name and at least one path")]
    IncompleteSource(usize),
    #[error("scan directory {0} does not exist")]
    MissingDirectory(String),
    #[error("analysisTarget must not be empty")]
    MissingTarget,
    #[error("plugin table '{0}' is registered more than once")]
    DuplicateTable(String),
}

/// One logical project: a name, the directories holding its sources and an
/// optional manifest/lockfile to read the installed target version from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub package_file: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    #[default]
    Disabled,
    Default,
}

/// Engine configuration, usually loaded from a JSON file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default)]
    pub scan_source: Vec<ScanSource>,

    /// Module specifier matched against import sources
    #[serde(default)]
    pub analysis_target: String,

    /// API names to flag in every result table
    #[serde(default)]
    pub black_list: Vec<String>,

    #[serde(default)]
    pub score_plugin: ScoreMode,

    /// Directory scan paths and package files are relative to (defaults to cwd)
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Resolve the base directory and validate the scan sources
    pub fn initialize(&mut self) -> Result<()> {
        let base = match self.base_dir.take() {
            Some(dir) => {
                debug!("Using provided base directory: {:?}", dir);
                dir.canonicalize().unwrap_or(dir)
            }
            None => env::current_dir()?,
        };
        info!("Using base directory: {}", base.display());
        self.base_dir = Some(base);
        self.validate()?;
        Ok(())
    }

    /// Get the base directory, returning an error if not initialized
    pub fn base_dir(&self) -> Result<&PathBuf> {
        self.base_dir
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_source.is_empty() {
            return Err(ConfigError::EmptyScanSource);
        }
        for (idx, source) in self.scan_source.iter().enumerate() {
            if source.name.trim().is_empty() || source.path.is_empty() {
                return Err(ConfigError::IncompleteSource(idx));
            }
        }
        let base = self.base_dir.as_deref().unwrap_or(Path::new("."));
        for source in &self.scan_source {
            if let Some(missing) = source.path.iter().find(|p| !scan_root(base, p).is_dir()) {
                return Err(ConfigError::MissingDirectory(missing.clone()));
            }
        }
        if self.analysis_target.trim().is_empty() {
            return Err(ConfigError::MissingTarget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &Path, sources: Vec<ScanSource>, target: &str) -> AnalysisConfig {
        AnalysisConfig {
            scan_source: sources,
            analysis_target: target.to_string(),
            base_dir: Some(dir.to_path_buf()),
            ..Default::default()
        }
    }

    fn source(name: &str, paths: &[&str]) -> ScanSource {
        ScanSource {
            name: name.to_string(),
            path: paths.iter().map(|p| p.to_string()).collect(),
            package_file: None,
        }
    }

    fn config_error(mut cfg: AnalysisConfig) -> ConfigError {
        let err = cfg.initialize().unwrap_err();
        err.downcast::<ConfigError>().expect("expected a ConfigError")
    }

    #[test]
    fn test_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("src")).unwrap();
        let mut cfg = config_in(temp_dir.path(), vec![source("app", &["src"])], "dep");
        cfg.initialize().unwrap();
        assert!(cfg.base_dir().is_ok());
    }

    #[test]
    fn test_empty_scan_source() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config_in(temp_dir.path(), vec![], "dep");
        assert_eq!(config_error(cfg), ConfigError::EmptyScanSource);
    }

    #[test]
    fn test_source_without_paths() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("src")).unwrap();
        let cfg =
            config_in(temp_dir.path(), vec![source("app", &["src"]), source("admin", &[])], "dep");
        assert_eq!(config_error(cfg), ConfigError::IncompleteSource(1));
    }

    #[test]
    fn test_source_without_name() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("src")).unwrap();
        let cfg = config_in(temp_dir.path(), vec![source(" ", &["src"])], "dep");
        assert_eq!(config_error(cfg), ConfigError::IncompleteSource(0));
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config_in(temp_dir.path(), vec![source("app", &["nope"])], "dep");
        assert_eq!(config_error(cfg), ConfigError::MissingDirectory("nope".to_string()));
    }

    #[test]
    fn test_missing_target() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("src")).unwrap();
        let cfg = config_in(temp_dir.path(), vec![source("app", &["src"])], "");
        assert_eq!(config_error(cfg), ConfigError::MissingTarget);
    }

    #[test]
    fn test_base_dir_requires_initialize() {
        let cfg = AnalysisConfig::default();
        assert!(cfg.base_dir().is_err());
    }

    #[test]
    fn test_from_file_camel_case() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("analysis.json");
        fs::write(
            &path,
            r#"{
                "scanSource": [
                    { "name": "app", "path": ["src"], "packageFile": "package.json" }
                ],
                "analysisTarget": "framework",
                "blackList": ["framework.legacy"],
                "scorePlugin": "default"
            }"#,
        )
        .unwrap();

        let cfg = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(cfg.analysis_target, "framework");
        assert_eq!(cfg.scan_source[0].package_file.as_deref(), Some("package.json"));
        assert_eq!(cfg.black_list, vec!["framework.legacy".to_string()]);
        assert_eq!(cfg.score_plugin, ScoreMode::Default);
        assert!(cfg.base_dir.is_none());
    }

    #[test]
    fn test_score_mode_defaults_to_disabled() {
        let cfg: AnalysisConfig = serde_json::from_str(r#"{ "analysisTarget": "dep" }"#).unwrap();
        assert_eq!(cfg.score_plugin, ScoreMode::Disabled);
        assert!(cfg.scan_source.is_empty());
    }
}
