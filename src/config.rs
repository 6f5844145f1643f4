// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::format::CurrencyStyle;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Fintrack", "fintrack"));

pub const API_URL_ENV: &str = "FINTRACK_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub currency: CurrencyStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 15,
            currency: CurrencyStyle::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific config dir")?;
    Ok(proj.config_dir().join("fintrack.toml"))
}

impl Settings {
    /// Reads `path`; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Read config at {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Parse config at {}", path.display()))
    }

    /// File, then environment, then the `--api-url` flag.
    pub fn load(api_url_flag: Option<&str>) -> Result<Self> {
        let mut settings = Settings::from_file(&config_path()?)?;
        settings.apply_overrides(std::env::var(API_URL_ENV).ok().as_deref(), api_url_flag);
        Ok(settings)
    }

    pub fn apply_overrides(&mut self, env_url: Option<&str>, flag_url: Option<&str>) {
        for url in [env_url, flag_url].into_iter().flatten() {
            let url = url.trim();
            if !url.is_empty() {
                self.api_base_url = url.trim_end_matches('/').to_string();
            }
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
