// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{LineDraft, LineItem, LineItemId};
use anyhow::{Result, anyhow};

/// Ordered bill lines. Insertion order is display order; ids are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    items: Vec<LineItem>,
    next_id: LineItemId,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: LineItemId::new(1),
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: LineItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Adds a line at the end. Fails when the bill total would overflow.
    pub fn append(&mut self, draft: &LineDraft) -> Result<LineItemId> {
        self.check_total(None, draft)?;
        let id = self.next_id;
        self.next_id = id.next();
        self.items.push(line_from_draft(id, draft));
        Ok(id)
    }

    /// Overwrites the line with `id` in place. Returns false when no such line exists.
    pub fn replace(&mut self, id: LineItemId, draft: &LineDraft) -> Result<bool> {
        if self.position(id).is_none() {
            return Ok(false);
        }
        self.check_total(Some(id), draft)?;
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            *item = line_from_draft(id, draft);
        }
        Ok(true)
    }

    pub fn remove(&mut self, id: LineItemId) -> Option<LineItem> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Sum of line amounts. Never overflows: `append` and `replace` refuse lines that would.
    pub fn total(&self) -> i64 {
        self.items.iter().map(|item| item.amount).sum()
    }

    fn check_total(&self, replacing: Option<LineItemId>, draft: &LineDraft) -> Result<()> {
        self.items
            .iter()
            .filter(|item| Some(item.id) != replacing)
            .try_fold(draft.amount(), |sum, item| sum.checked_add(item.amount))
            .map(|_| ())
            .ok_or_else(|| anyhow!("bill total would overflow with {}", draft.name()))
    }
}

fn line_from_draft(id: LineItemId, draft: &LineDraft) -> LineItem {
    LineItem {
        id,
        name: draft.name().to_owned(),
        unit_price: draft.unit_price(),
        quantity: draft.quantity(),
        amount: draft.amount(),
    }
}

#[cfg(test)]
mod tests {
    use super::Ledger;
    use crate::{LineDraft, LineItemId};
    use anyhow::Result;

    #[test]
    fn append_assigns_monotonic_ids() -> Result<()> {
        let mut ledger = Ledger::new();
        let first = ledger.append(&LineDraft::new("Tea", 20, 3)?)?;
        let second = ledger.append(&LineDraft::new("Coffee", 40, 1)?)?;
        assert_eq!(first, LineItemId::new(1));
        assert_eq!(second, LineItemId::new(2));
        assert_eq!(ledger.total(), 100);
        Ok(())
    }

    #[test]
    fn ids_are_not_reused_after_remove() -> Result<()> {
        let mut ledger = Ledger::new();
        let first = ledger.append(&LineDraft::new("Tea", 20, 1)?)?;
        assert!(ledger.remove(first).is_some());
        let second = ledger.append(&LineDraft::new("Tea", 20, 1)?)?;
        assert_ne!(first, second);
        assert_eq!(second, LineItemId::new(2));
        Ok(())
    }

    #[test]
    fn replace_keeps_id_and_position() -> Result<()> {
        let mut ledger = Ledger::new();
        let tea = ledger.append(&LineDraft::new("Tea", 20, 3)?)?;
        let coffee = ledger.append(&LineDraft::new("Coffee", 40, 1)?)?;

        assert!(ledger.replace(tea, &LineDraft::new("Latte", 55, 2)?)?);
        let items = ledger.items();
        assert_eq!(items[0].id, tea);
        assert_eq!(items[0].name, "Latte");
        assert_eq!(items[0].amount, 110);
        assert_eq!(items[1].id, coffee);
        assert_eq!(ledger.total(), 150);
        Ok(())
    }

    #[test]
    fn replace_and_remove_unknown_ids_are_noops() -> Result<()> {
        let mut ledger = Ledger::new();
        ledger.append(&LineDraft::new("Tea", 20, 1)?)?;
        let before = ledger.clone();

        assert!(!ledger.replace(LineItemId::new(99), &LineDraft::new("Tea", 20, 9)?)?);
        assert!(ledger.remove(LineItemId::new(99)).is_none());
        assert_eq!(ledger, before);
        Ok(())
    }

    #[test]
    fn remove_decreases_total_by_line_amount() -> Result<()> {
        let mut ledger = Ledger::new();
        let tea = ledger.append(&LineDraft::new("Tea", 20, 3)?)?;
        ledger.append(&LineDraft::new("Coffee", 40, 1)?)?;
        let before = ledger.total();

        let removed = ledger.remove(tea).expect("tea line exists");
        assert_eq!(ledger.total(), before - removed.amount);
        assert_eq!(ledger.total(), 40);
        Ok(())
    }

    #[test]
    fn overflowing_lines_are_refused() -> Result<()> {
        let mut ledger = Ledger::new();
        let big = ledger.append(&LineDraft::new("Gold", i64::MAX - 10, 1)?)?;
        let small = ledger.append(&LineDraft::new("Tea", 10, 1)?)?;
        assert_eq!(ledger.total(), i64::MAX);

        let error = ledger
            .append(&LineDraft::new("Tea", 1, 1)?)
            .expect_err("total would pass i64::MAX");
        assert!(error.to_string().contains("would overflow"));
        assert!(ledger.replace(small, &LineDraft::new("Tea", 11, 1)?).is_err());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total(), i64::MAX);

        // The replaced line's own amount does not count against the new one.
        assert!(ledger.replace(big, &LineDraft::new("Gold", i64::MAX - 10, 1)?)?);
        let amounts: i64 = ledger.items().iter().map(|item| item.amount).sum();
        assert_eq!(ledger.total(), amounts);
        Ok(())
    }
}
