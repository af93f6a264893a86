// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use crate::config::Config;

/// Installs a file-backed subscriber when `[log].path` is set. The terminal
/// belongs to the TUI, so nothing is ever written to stdout or stderr.
pub fn init(config: &Config) -> Result<bool> {
    let Some(path) = config.log_path() else {
        return Ok(false);
    };
    let level = config.log_level()?;
    install(&path, level)?;
    tracing::info!(path = %path.display(), %level, "logging enabled");
    Ok(true)
}

fn install(path: &Path, level: tracing::Level) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}
