// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use quickbill_app::{
    AppCommand, AppEvent, AppState, BillHeader, Catalog, CatalogEntry, LineItemId,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use time::{Date, Month};

pub const CAFE_ITEMS: [(&str, i64); 4] = [
    ("Tea", 20),
    ("Coffee", 40),
    ("Green Tea", 30),
    ("Samosa", 15),
];

pub fn catalog(items: &[(&str, i64)]) -> Result<Catalog> {
    Catalog::new(
        items
            .iter()
            .map(|(name, price)| CatalogEntry::new(*name, *price))
            .collect(),
    )
    .context("build fixture catalog")
}

pub fn cafe_state() -> Result<AppState> {
    Ok(AppState::with_catalog(catalog(&CAFE_ITEMS)?))
}

/// Picks the first result for `query`, types `quantity`, and commits.
pub fn add_line(state: &mut AppState, query: &str, quantity: &str) -> Result<LineItemId> {
    state.dispatch(AppCommand::EditQuery(query.to_owned()));
    if state.dispatch(AppCommand::SelectResult(0)).is_empty() {
        bail!("no catalog result for {query:?}");
    }
    state.dispatch(AppCommand::EditQuantity(quantity.to_owned()));
    match state.dispatch(AppCommand::Commit).first() {
        Some(AppEvent::LineAdded(id)) => Ok(*id),
        other => bail!("commit of {query:?} x {quantity:?} did not add a line: {other:?}"),
    }
}

/// `(name, quantity, amount)` for every line, in display order.
pub fn line_summary(state: &AppState) -> Vec<(String, i64, i64)> {
    state
        .ledger
        .items()
        .iter()
        .map(|line| (line.name.clone(), line.quantity, line.amount))
        .collect()
}

pub fn fixed_header() -> Result<BillHeader> {
    let date = Date::from_calendar_date(2026, Month::October, 17).context("fixture date")?;
    BillHeader::new(1, date)
}

pub fn write_config(content: &str) -> Result<(TempDir, PathBuf)> {
    let temp = tempfile::tempdir().context("create temp dir")?;
    let path = temp.path().join("config.toml");
    fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
    Ok((temp, path))
}
