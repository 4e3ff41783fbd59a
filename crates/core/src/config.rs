use crate::crop_factor::{CropFactorError, CropFactorTable};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub recursive_default: bool,
    /// Worker pool size. Unset means one worker per available core.
    pub workers: Option<usize>,
    pub shutdown_timeout_secs: u64,
    /// Checked before the built-in crop-factor rules.
    pub crop_factors: Vec<CropFactorOverride>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recursive_default: true,
            workers: None,
            shutdown_timeout_secs: 60,
            crop_factors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropFactorOverride {
    pub pattern: String,
    pub multiplier: f64,
}

impl AppConfig {
    pub fn crop_factor_table(&self) -> Result<CropFactorTable, CropFactorError> {
        let user_rules: Vec<(String, f64)> = self
            .crop_factors
            .iter()
            .map(|rule| (rule.pattern.clone(), rule.multiplier))
            .collect();
        CropFactorTable::with_user_rules(&user_rules)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "samfort", "photo-renamer")
        .context("could not determine the OS config directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&app_paths()?.config_path)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(config, &app_paths()?.config_path)
}

/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory: {}", dir.display()))?;
    }
    let body = toml::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, body)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;
    Ok(())
}
