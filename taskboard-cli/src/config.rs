use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskboard_core::{SortConfig, SortKey, SortState, StatusFilter, ViewState};

use crate::state::{ensure_taskboard_home, taskboard_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiSection,
    #[serde(default)]
    pub view: ViewSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSection {
    /// "all" or a status name.
    #[serde(default = "default_filter")]
    pub default_filter: String,
    /// "none", "asc" or "desc" (by date).
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_filter() -> String {
    "all".to_string()
}

fn default_sort() -> String {
    "none".to_string()
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            default_filter: default_filter(),
            default_sort: default_sort(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSection {
                base_url: taskboard_sync::http::DEFAULT_BASE_URL.to_string(),
                timeout_secs: default_timeout_secs(),
            },
            view: ViewSection::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    /// Starting sort/filter for a fresh list view.
    pub fn initial_view(&self) -> Result<ViewState> {
        let filter: StatusFilter = self
            .view
            .default_filter
            .parse()
            .with_context(|| format!("view.default_filter = {:?}", self.view.default_filter))?;

        let sort = match self.view.default_sort.trim().to_lowercase().as_str() {
            "" | "none" => SortState::new(),
            "asc" | "ascending" => SortState::with(SortConfig::ascending(SortKey::Date)),
            "desc" | "descending" => SortState::with(SortConfig::descending(SortKey::Date)),
            other => bail!("view.default_sort must be none, asc or desc (got {other:?})"),
        };

        Ok(ViewState { sort, filter })
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(taskboard_home()?.join("config.toml"))
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = resolve(path)?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("in {}", p.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => ensure_taskboard_home()?.join("config.toml"),
    };
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = resolve(path)?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default(), path)?;
    println!("Wrote {}", written.display());
    Ok(())
}
