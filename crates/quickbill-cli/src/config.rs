// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use quickbill_app::{Catalog, CatalogEntry, DEFAULT_CURRENCY};
use quickbill_tui::UiOptions;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

pub const APP_NAME: &str = "quickbill";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            catalog: CatalogSection::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub currency: Option<String>,
    pub show_date: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            currency: Some(DEFAULT_CURRENCY.to_owned()),
            show_date: Some(true),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSection {
    pub items: Option<Vec<CatalogItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("QUICKBILL_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set QUICKBILL_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` at the top and put values under [ui], [catalog], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(currency) = &self.ui.currency
            && currency.trim().is_empty()
        {
            bail!(
                "ui.currency in {} must not be empty; use a symbol such as \"₹\" or \"$\"",
                path.display()
            );
        }

        self.catalog()
            .with_context(|| format!("invalid [catalog] in {}", path.display()))?;

        if let Some(log_path) = &self.log.path
            && log_path.trim().is_empty()
        {
            bail!(
                "log.path in {} must not be empty; remove it to disable logging",
                path.display()
            );
        }

        self.log_level()
            .with_context(|| format!("invalid [log] in {}", path.display()))?;
        Ok(())
    }

    pub fn currency(&self) -> &str {
        self.ui.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn show_date(&self) -> bool {
        self.ui.show_date.unwrap_or(true)
    }

    pub fn ui_options(&self) -> UiOptions {
        UiOptions {
            currency: self.currency().to_owned(),
            show_date: self.show_date(),
        }
    }

    /// Configured catalog, or the built-in demo catalog when `[catalog]` has no items.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog.items {
            Some(items) => Catalog::new(
                items
                    .iter()
                    .map(|item| CatalogEntry::new(item.name.clone(), item.price))
                    .collect(),
            ),
            None => Ok(Catalog::demo()),
        }
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log.path.as_ref().map(PathBuf::from)
    }

    pub fn log_level(&self) -> Result<Level> {
        let raw = self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
        raw.parse::<Level>().map_err(|_| {
            anyhow!("unknown log level {raw:?}; use one of: error, warn, info, debug, trace")
        })
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# quickbill config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\ncurrency = \"{}\"\nshow_date = true\n\n[catalog]\n# Optional. Replaces the built-in demo catalog.\n# items = [\n#   {{ name = \"Tea\", price = 20 }},\n#   {{ name = \"Coffee\", price = 40 }},\n# ]\n\n[log]\n# Optional. Logging is off unless a file path is set.\n# path = \"/tmp/quickbill.log\"\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_CURRENCY,
            DEFAULT_LOG_LEVEL,
        )
    }
}
