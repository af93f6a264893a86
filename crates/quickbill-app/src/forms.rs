// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};

use crate::Selection;

/// A validated candidate line: what a commit would write to the ledger.
///
/// Only constructible through [`LineDraft::new`] or [`LineDraft::from_form`], so
/// `amount` always equals `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDraft {
    name: String,
    unit_price: i64,
    quantity: i64,
    amount: i64,
}

impl LineDraft {
    pub fn new(name: impl Into<String>, unit_price: i64, quantity: i64) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            bail!("line item name is required");
        }
        if unit_price < 0 {
            bail!("line item unit price cannot be negative");
        }
        if quantity <= 0 {
            bail!("quantity must be a positive whole number");
        }
        let amount = quantity.checked_mul(unit_price).ok_or_else(|| {
            anyhow!("amount for {quantity} x {unit_price} overflows; use a smaller quantity")
        })?;
        Ok(Self {
            name,
            unit_price,
            quantity,
            amount,
        })
    }

    pub fn from_form(selection: Option<&Selection>, quantity_text: &str) -> Result<Self> {
        let Some(selection) = selection else {
            bail!("no item selected -- search and pick an item first");
        };
        let quantity = parse_quantity(quantity_text)?;
        Self::new(selection.name.clone(), selection.unit_price, quantity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn unit_price(&self) -> i64 {
        self.unit_price
    }

    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    pub const fn amount(&self) -> i64 {
        self.amount
    }
}

pub fn parse_quantity(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        bail!("quantity is required");
    }
    let quantity: i64 = trimmed
        .parse()
        .with_context(|| format!("quantity {trimmed:?} is not a whole number"))?;
    if quantity <= 0 {
        bail!("quantity must be positive, got {quantity}");
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::{LineDraft, parse_quantity};
    use crate::Selection;
    use anyhow::Result;

    fn tea() -> Selection {
        Selection {
            name: "Tea".to_owned(),
            unit_price: 20,
        }
    }

    #[test]
    fn parse_quantity_accepts_positive_integers() -> Result<()> {
        assert_eq!(parse_quantity("3")?, 3);
        assert_eq!(parse_quantity(" 12 ")?, 12);
        Ok(())
    }

    #[test]
    fn parse_quantity_rejects_zero_negative_and_text() {
        for raw in ["", "0", "-1", "abc", "2.5", "3x"] {
            assert!(parse_quantity(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn draft_requires_selection() {
        let error = LineDraft::from_form(None, "3").expect_err("missing selection should fail");
        assert!(error.to_string().contains("no item selected"));
    }

    #[test]
    fn draft_computes_amount() -> Result<()> {
        let draft = LineDraft::from_form(Some(&tea()), "3")?;
        assert_eq!(draft.name(), "Tea");
        assert_eq!(draft.quantity(), 3);
        assert_eq!(draft.amount(), 60);
        Ok(())
    }

    #[test]
    fn draft_rejects_overflowing_amount() {
        let error = LineDraft::new("Gold", i64::MAX, 2).expect_err("overflow should fail");
        assert!(error.to_string().contains("overflows"));
    }

    #[test]
    fn zero_price_items_are_allowed() -> Result<()> {
        let draft = LineDraft::new("Free refill", 0, 4)?;
        assert_eq!(draft.amount(), 0);
        Ok(())
    }
}
