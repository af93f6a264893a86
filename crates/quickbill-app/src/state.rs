// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{
    Catalog, CatalogEntry, EditorMode, FocusTarget, Ledger, LineDraft, LineItemId, Selection,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub catalog: Catalog,
    pub ledger: Ledger,
    pub query: String,
    pub selection: Option<Selection>,
    pub quantity: String,
    pub results_open: bool,
    pub editor: EditorMode,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_catalog(Catalog::demo())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    EditQuery(String),
    OpenResults,
    DismissResults,
    SelectResult(usize),
    EditQuantity(String),
    Commit,
    BeginEdit(LineItemId),
    Remove(LineItemId),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    QueryChanged(String),
    SelectionChanged(Option<Selection>),
    QuantityChanged(String),
    ResultsPanelChanged(bool),
    FocusRequested(FocusTarget),
    LineAdded(LineItemId),
    LineReplaced(LineItemId),
    LineRemoved(LineItemId),
    EditStarted(LineItemId),
    EditCancelled(LineItemId),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            ledger: Ledger::new(),
            query: String::new(),
            selection: None,
            quantity: String::new(),
            results_open: false,
            editor: EditorMode::Idle,
            status_line: None,
        }
    }

    /// Results shown to the user: only while the panel is open and the query is non-empty.
    pub fn visible_results(&self) -> Vec<&CatalogEntry> {
        if !self.results_open || self.query.is_empty() {
            return Vec::new();
        }
        self.catalog.search(&self.query)
    }

    pub fn pending_line(&self) -> Result<LineDraft> {
        LineDraft::from_form(self.selection.as_ref(), &self.quantity)
    }

    pub fn can_commit(&self) -> bool {
        self.pending_line().is_ok()
    }

    pub fn editing_id(&self) -> Option<LineItemId> {
        self.editor.editing_id()
    }

    pub fn total(&self) -> i64 {
        self.ledger.total()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::EditQuery(text) => self.edit_query(text),
            AppCommand::OpenResults => self.set_results_open(true).into_iter().collect(),
            AppCommand::DismissResults => self.set_results_open(false).into_iter().collect(),
            AppCommand::SelectResult(index) => self.select_result(index),
            AppCommand::EditQuantity(text) => {
                self.quantity = text;
                vec![AppEvent::QuantityChanged(self.quantity.clone())]
            }
            AppCommand::Commit => self.commit(),
            AppCommand::BeginEdit(id) => self.begin_edit(id),
            AppCommand::Remove(id) => self.remove(id),
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn edit_query(&mut self, text: String) -> Vec<AppEvent> {
        self.query = text;
        let mut events = vec![AppEvent::QueryChanged(self.query.clone())];
        if self.selection.take().is_some() {
            events.push(AppEvent::SelectionChanged(None));
        }
        events.extend(self.set_results_open(true));
        events
    }

    fn select_result(&mut self, index: usize) -> Vec<AppEvent> {
        let Some(selection) = self
            .visible_results()
            .get(index)
            .map(|entry| Selection::from(*entry))
        else {
            tracing::debug!(index, query = %self.query, "select ignored: no such result");
            return Vec::new();
        };

        self.query = selection.name.clone();
        self.selection = Some(selection.clone());
        let mut events = vec![
            AppEvent::SelectionChanged(Some(selection)),
            AppEvent::QueryChanged(self.query.clone()),
        ];
        events.extend(self.set_results_open(false));
        events.push(AppEvent::FocusRequested(FocusTarget::Quantity));
        events
    }

    fn commit(&mut self) -> Vec<AppEvent> {
        let draft = match self.pending_line() {
            Ok(draft) => draft,
            Err(error) => {
                tracing::debug!(reason = %error, "commit ignored");
                return Vec::new();
            }
        };

        let (event, verb) = match self.editor {
            EditorMode::Idle => match self.ledger.append(&draft) {
                Ok(id) => {
                    tracing::info!(line_id = id.get(), name = draft.name(), "line added");
                    (AppEvent::LineAdded(id), "added")
                }
                Err(error) => return self.refuse_commit(&error),
            },
            EditorMode::Editing(id) => match self.ledger.replace(id, &draft) {
                Ok(true) => {
                    tracing::info!(line_id = id.get(), name = draft.name(), "line saved");
                    (AppEvent::LineReplaced(id), "saved")
                }
                Ok(false) => {
                    tracing::warn!(line_id = id.get(), "edited line no longer exists");
                    let mut events = vec![AppEvent::EditCancelled(id)];
                    events.extend(self.reset_form());
                    return events;
                }
                Err(error) => return self.refuse_commit(&error),
            },
        };

        let mut events = vec![event];
        events.extend(self.reset_form());
        events.push(self.set_status(&format!(
            "{verb} {} x{}",
            draft.name(),
            draft.quantity()
        )));
        events.push(AppEvent::FocusRequested(FocusTarget::Search));
        events
    }

    fn begin_edit(&mut self, id: LineItemId) -> Vec<AppEvent> {
        let Some(line) = self.ledger.get(id) else {
            tracing::debug!(line_id = id.get(), "edit ignored: unknown line");
            return Vec::new();
        };

        let selection = Selection::from(line);
        self.query = line.name.clone();
        self.quantity = line.quantity.to_string();
        self.selection = Some(selection.clone());
        self.editor = EditorMode::Editing(id);
        tracing::debug!(line_id = id.get(), "edit started");

        let mut events = vec![
            AppEvent::EditStarted(id),
            AppEvent::QueryChanged(self.query.clone()),
            AppEvent::SelectionChanged(Some(selection)),
            AppEvent::QuantityChanged(self.quantity.clone()),
        ];
        events.extend(self.set_results_open(false));
        events.push(AppEvent::FocusRequested(FocusTarget::Search));
        events
    }

    fn remove(&mut self, id: LineItemId) -> Vec<AppEvent> {
        let Some(removed) = self.ledger.remove(id) else {
            tracing::debug!(line_id = id.get(), "remove ignored: unknown line");
            return Vec::new();
        };
        tracing::info!(line_id = id.get(), name = %removed.name, "line removed");

        let mut events = vec![AppEvent::LineRemoved(id)];
        if self.editing_id() == Some(id) {
            events.push(AppEvent::EditCancelled(id));
            events.extend(self.reset_form());
        }
        events.push(self.set_status(&format!("removed {}", removed.name)));
        events
    }

    /// The form is kept so the quantity can be corrected.
    fn refuse_commit(&mut self, error: &anyhow::Error) -> Vec<AppEvent> {
        tracing::warn!(reason = %error, "commit refused");
        vec![self.set_status(&error.to_string())]
    }

    fn reset_form(&mut self) -> Vec<AppEvent> {
        self.query.clear();
        self.selection = None;
        self.quantity.clear();
        self.editor = EditorMode::Idle;
        let mut events = vec![
            AppEvent::QueryChanged(String::new()),
            AppEvent::SelectionChanged(None),
            AppEvent::QuantityChanged(String::new()),
        ];
        events.extend(self.set_results_open(false));
        events
    }

    fn set_results_open(&mut self, open: bool) -> Option<AppEvent> {
        if self.results_open == open {
            return None;
        }
        self.results_open = open;
        Some(AppEvent::ResultsPanelChanged(open))
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState};
    use crate::{Catalog, CatalogEntry, EditorMode, FocusTarget, LineItemId, Selection};

    fn tea_and_coffee() -> AppState {
        let catalog = Catalog::new(vec![
            CatalogEntry::new("Tea", 20),
            CatalogEntry::new("Coffee", 40),
            CatalogEntry::new("Green Tea", 30),
        ])
        .expect("valid catalog");
        AppState::with_catalog(catalog)
    }

    fn pick(state: &mut AppState, query: &str, index: usize) {
        state.dispatch(AppCommand::EditQuery(query.to_owned()));
        state.dispatch(AppCommand::SelectResult(index));
    }

    fn add(state: &mut AppState, query: &str, quantity: &str) -> LineItemId {
        pick(state, query, 0);
        state.dispatch(AppCommand::EditQuantity(quantity.to_owned()));
        let events = state.dispatch(AppCommand::Commit);
        match events.first() {
            Some(AppEvent::LineAdded(id)) => *id,
            other => panic!("expected LineAdded, got {other:?}"),
        }
    }

    #[test]
    fn results_hidden_until_query_and_panel_open() {
        let mut state = tea_and_coffee();
        assert!(state.visible_results().is_empty());

        state.dispatch(AppCommand::OpenResults);
        assert!(state.visible_results().is_empty(), "empty query hides results");

        state.dispatch(AppCommand::EditQuery("tea".to_owned()));
        assert_eq!(state.visible_results().len(), 2);

        state.dispatch(AppCommand::DismissResults);
        assert!(state.visible_results().is_empty());
        assert_eq!(state.query, "tea");
    }

    #[test]
    fn selecting_result_mirrors_name_and_requests_quantity_focus() {
        let mut state = tea_and_coffee();
        state.dispatch(AppCommand::EditQuery("TEA".to_owned()));

        let events = state.dispatch(AppCommand::SelectResult(1));
        let green_tea = Selection {
            name: "Green Tea".to_owned(),
            unit_price: 30,
        };
        assert_eq!(
            events,
            vec![
                AppEvent::SelectionChanged(Some(green_tea.clone())),
                AppEvent::QueryChanged("Green Tea".to_owned()),
                AppEvent::ResultsPanelChanged(false),
                AppEvent::FocusRequested(FocusTarget::Quantity),
            ]
        );
        assert_eq!(state.selection, Some(green_tea));
        assert!(!state.results_open);
    }

    #[test]
    fn select_out_of_range_is_noop() {
        let mut state = tea_and_coffee();
        state.dispatch(AppCommand::EditQuery("coffee".to_owned()));
        let before = state.clone();
        assert!(state.dispatch(AppCommand::SelectResult(5)).is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn editing_query_clears_selection() {
        let mut state = tea_and_coffee();
        pick(&mut state, "tea", 0);
        assert!(state.selection.is_some());

        let events = state.dispatch(AppCommand::EditQuery("Te".to_owned()));
        assert!(events.contains(&AppEvent::SelectionChanged(None)));
        assert!(state.selection.is_none());
        assert!(state.results_open);
    }

    #[test]
    fn dismiss_keeps_selection() {
        let mut state = tea_and_coffee();
        pick(&mut state, "coffee", 0);
        state.dispatch(AppCommand::OpenResults);
        state.dispatch(AppCommand::DismissResults);
        assert_eq!(
            state.selection.as_ref().map(|selection| selection.name.as_str()),
            Some("Coffee")
        );
    }

    #[test]
    fn commit_appends_and_resets_form() {
        let mut state = tea_and_coffee();
        let id = add(&mut state, "tea", "3");

        let items = state.ledger.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].name, "Tea");
        assert_eq!(items[0].unit_price, 20);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].amount, 60);
        assert_eq!(state.total(), 60);

        assert!(state.query.is_empty());
        assert!(state.quantity.is_empty());
        assert!(state.selection.is_none());
        assert_eq!(state.editor, EditorMode::Idle);
        assert_eq!(state.status_line.as_deref(), Some("added Tea x3"));
    }

    #[test]
    fn commit_requests_search_focus() {
        let mut state = tea_and_coffee();
        pick(&mut state, "tea", 0);
        state.dispatch(AppCommand::EditQuantity("1".to_owned()));
        let events = state.dispatch(AppCommand::Commit);
        assert_eq!(
            events.last(),
            Some(&AppEvent::FocusRequested(FocusTarget::Search))
        );
    }

    #[test]
    fn invalid_commits_are_silent_noops() {
        let mut state = tea_and_coffee();
        for quantity in ["0", "-1", "", "two"] {
            pick(&mut state, "tea", 0);
            state.dispatch(AppCommand::EditQuantity(quantity.to_owned()));
            assert!(!state.can_commit());
            let before = state.clone();
            assert!(state.dispatch(AppCommand::Commit).is_empty());
            assert_eq!(state, before);
        }

        let mut state = tea_and_coffee();
        state.dispatch(AppCommand::EditQuantity("3".to_owned()));
        assert!(state.dispatch(AppCommand::Commit).is_empty());
        assert!(state.ledger.is_empty());
    }

    #[test]
    fn commit_that_would_overflow_total_keeps_form() {
        let catalog = Catalog::new(vec![
            CatalogEntry::new("Gold", i64::MAX - 10),
            CatalogEntry::new("Tea", 20),
        ])
        .expect("valid catalog");
        let mut state = AppState::with_catalog(catalog);
        add(&mut state, "gold", "1");

        pick(&mut state, "tea", 0);
        state.dispatch(AppCommand::EditQuantity("1".to_owned()));
        let events = state.dispatch(AppCommand::Commit);
        assert!(matches!(
            events.as_slice(),
            [AppEvent::StatusUpdated(message)] if message.contains("would overflow")
        ));
        assert_eq!(state.ledger.len(), 1);
        assert_eq!(state.total(), i64::MAX - 10);
        assert_eq!(state.quantity, "1");
        assert!(state.selection.is_some());
    }

    #[test]
    fn edit_session_replaces_line_in_place() {
        let mut state = tea_and_coffee();
        let tea = add(&mut state, "tea", "3");
        let coffee = add(&mut state, "coffee", "1");

        let events = state.dispatch(AppCommand::BeginEdit(tea));
        assert_eq!(events.first(), Some(&AppEvent::EditStarted(tea)));
        assert_eq!(
            events.last(),
            Some(&AppEvent::FocusRequested(FocusTarget::Search))
        );
        assert_eq!(state.editor, EditorMode::Editing(tea));
        assert_eq!(state.query, "Tea");
        assert_eq!(state.quantity, "3");
        assert_eq!(state.ledger.len(), 2, "line stays until commit");

        state.dispatch(AppCommand::EditQuantity("5".to_owned()));
        let events = state.dispatch(AppCommand::Commit);
        assert_eq!(events.first(), Some(&AppEvent::LineReplaced(tea)));

        let items = state.ledger.items();
        assert_eq!(items[0].id, tea);
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[0].amount, 100);
        assert_eq!(items[1].id, coffee);
        assert_eq!(state.total(), 140);
        assert_eq!(state.editor, EditorMode::Idle);
    }

    #[test]
    fn edit_can_switch_catalog_item() {
        let mut state = tea_and_coffee();
        let tea = add(&mut state, "tea", "2");

        state.dispatch(AppCommand::BeginEdit(tea));
        state.dispatch(AppCommand::EditQuery("cof".to_owned()));
        assert!(!state.can_commit(), "query edit drops the selection");
        state.dispatch(AppCommand::SelectResult(0));
        state.dispatch(AppCommand::Commit);

        let line = state.ledger.get(tea).expect("line kept its id");
        assert_eq!(line.name, "Coffee");
        assert_eq!(line.amount, 80);
    }

    #[test]
    fn removing_line_under_edit_cancels_session() {
        let mut state = tea_and_coffee();
        let tea = add(&mut state, "tea", "3");
        state.dispatch(AppCommand::BeginEdit(tea));

        let events = state.dispatch(AppCommand::Remove(tea));
        assert_eq!(events[0], AppEvent::LineRemoved(tea));
        assert_eq!(events[1], AppEvent::EditCancelled(tea));
        assert_eq!(state.editor, EditorMode::Idle);
        assert!(state.query.is_empty());
        assert!(state.quantity.is_empty());
        assert!(state.selection.is_none());
        assert!(state.ledger.get(tea).is_none());
    }

    #[test]
    fn removing_other_line_keeps_edit_session() {
        let mut state = tea_and_coffee();
        let tea = add(&mut state, "tea", "3");
        let coffee = add(&mut state, "coffee", "1");
        state.dispatch(AppCommand::BeginEdit(tea));

        let events = state.dispatch(AppCommand::Remove(coffee));
        assert!(!events.contains(&AppEvent::EditCancelled(tea)));
        assert_eq!(state.editor, EditorMode::Editing(tea));
        assert_eq!(state.quantity, "3");
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut state = tea_and_coffee();
        add(&mut state, "tea", "1");
        let before = state.clone();
        assert!(state.dispatch(AppCommand::BeginEdit(LineItemId::new(42))).is_empty());
        assert!(state.dispatch(AppCommand::Remove(LineItemId::new(42))).is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::SetStatus("hello".to_owned()));
        assert_eq!(events, vec![AppEvent::StatusUpdated("hello".to_owned())]);
        assert_eq!(state.status_line.as_deref(), Some("hello"));

        let events = state.dispatch(AppCommand::ClearStatus);
        assert_eq!(events, vec![AppEvent::StatusCleared]);
        assert!(state.status_line.is_none());
    }
}
