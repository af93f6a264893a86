// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::ids::*;

pub const DEFAULT_CURRENCY: &str = "₹";

const DEMO_ITEMS: [(&str, i64); 15] = [
    ("Tea", 20),
    ("Coffee", 40),
    ("Green Tea", 30),
    ("Cappuccino", 60),
    ("Espresso", 50),
    ("Latte", 55),
    ("Sandwich", 80),
    ("Burger", 120),
    ("Samosa", 15),
    ("Chips", 25),
    ("Cookies", 35),
    ("Cake Slice", 70),
    ("Cold Drink", 30),
    ("Juice", 45),
    ("Water Bottle", 20),
];

const HEADER_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short], [month repr:short] [day padding:none], [year]");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub unit_price: i64,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, unit_price: i64) -> Self {
        Self {
            name: name.into(),
            unit_price,
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Fixed list of purchasable items. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for entry in &entries {
            if entry.name.trim().is_empty() {
                bail!("catalog item name is required -- give every item a name");
            }
            if entry.unit_price < 0 {
                bail!(
                    "catalog item {:?} has negative price {}; prices must be >= 0",
                    entry.name,
                    entry.unit_price
                );
            }
            if !seen.insert(entry.name.as_str()) {
                bail!(
                    "catalog item {:?} is listed twice; item names must be unique",
                    entry.name
                );
            }
        }
        Ok(Self { entries })
    }

    pub fn demo() -> Self {
        Self {
            entries: DEMO_ITEMS
                .iter()
                .map(|(name, price)| CatalogEntry::new(*name, *price))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Entries whose name contains `query` case-insensitively, in catalog order.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.matches(query))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub name: String,
    pub unit_price: i64,
}

impl From<&CatalogEntry> for Selection {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            unit_price: entry.unit_price,
        }
    }
}

impl From<&LineItem> for Selection {
    fn from(line: &LineItem) -> Self {
        Self {
            name: line.name.clone(),
            unit_price: line.unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusTarget {
    Search,
    Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorMode {
    Idle,
    Editing(LineItemId),
}

impl EditorMode {
    pub const fn editing_id(self) -> Option<LineItemId> {
        match self {
            Self::Idle => None,
            Self::Editing(id) => Some(id),
        }
    }

    pub const fn commit_label(self) -> &'static str {
        match self {
            Self::Idle => "Add",
            Self::Editing(_) => "Save",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillHeader {
    pub order_number: u64,
    pub date: Date,
}

impl BillHeader {
    pub fn new(order_number: u64, date: Date) -> Result<Self> {
        if order_number == 0 {
            bail!("order number must be at least 1");
        }
        Ok(Self { order_number, date })
    }

    pub fn date_label(&self) -> Result<String> {
        self.date
            .format(HEADER_DATE_FORMAT)
            .with_context(|| format!("format bill date {}", self.date))
    }
}

pub fn format_amount(currency: &str, amount: i64) -> String {
    format!("{currency}{amount}")
}

pub fn item_count_label(count: usize) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} item{suffix}")
}
