use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[cfg(windows)]
pub fn config_dir() -> PathBuf {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("remedium")
}

#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("remedium")
}

fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn default_fixes_dir() -> PathBuf {
    PathBuf::from("fixes")
}

#[derive(Serialize, Deserialize)]
pub struct FixesConfig {
    /// Where reports land; relative paths resolve against the project.
    #[serde(default = "default_fixes_dir")]
    pub dir: PathBuf,
}

impl Default for FixesConfig {
    fn default() -> Self {
        Self {
            dir: default_fixes_dir(),
        }
    }
}

fn default_backups() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
pub struct RunConfig {
    /// Thread count override; the CLI flag wins over this.
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default = "default_backups")]
    pub backups: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: None,
            backups: default_backups(),
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub fixes: FixesConfig,
    #[serde(default)]
    pub run: RunConfig,
}

pub fn load_config() -> Result<Config> {
    let path = config_file_path();
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).context("failed to parse config")
    } else {
        Ok(Config::default())
    }
}
