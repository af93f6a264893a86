// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use quickbill_app::{
    AppCommand, AppEvent, AppState, BillHeader, DEFAULT_CURRENCY, FocusTarget, LineItemId,
    format_amount, item_count_label,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::time::{Duration, Instant};

const STATUS_TTL: Duration = Duration::from_secs(4);
const DROPDOWN_ROWS: usize = 8;
const SEARCH_PLACEHOLDER: &str = "Search items...";
const QUANTITY_PLACEHOLDER: &str = "Qty";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    pub currency: String,
    pub show_date: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_owned(),
            show_date: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Pane {
    #[default]
    Search,
    Quantity,
    Ledger,
}

impl Pane {
    const fn next(self) -> Self {
        match self {
            Self::Search => Self::Quantity,
            Self::Quantity => Self::Ledger,
            Self::Ledger => Self::Search,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Search => Self::Ledger,
            Self::Quantity => Self::Search,
            Self::Ledger => Self::Quantity,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Quantity => "qty",
            Self::Ledger => "bill",
        }
    }
}

impl From<FocusTarget> for Pane {
    fn from(target: FocusTarget) -> Self {
        match target {
            FocusTarget::Search => Self::Search,
            FocusTarget::Quantity => Self::Quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    pane: Pane,
    result_cursor: usize,
    ledger_cursor: usize,
    help_visible: bool,
    status_deadline: Option<Instant>,
}

/// Static text drawn around the form: computed once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chrome {
    order_line: String,
    currency: String,
}

impl Chrome {
    fn new(header: &BillHeader, options: &UiOptions) -> Result<Self> {
        let order_line = if options.show_date {
            format!("Order #{} | {}", header.order_number, header.date_label()?)
        } else {
            format!("Order #{}", header.order_number)
        };
        Ok(Self {
            order_line,
            currency: options.currency.clone(),
        })
    }
}

pub fn run_app(state: &mut AppState, header: &BillHeader, options: &UiOptions) -> Result<()> {
    let chrome = Chrome::new(header, options)?;

    enable_raw_mode().context("enable raw mode")?;
    let mut terminal = restore_on_error(enter_terminal(), restore_terminal)?;

    let mut view_data = ViewData::default();
    tracing::info!(
        order = header.order_number,
        items = state.catalog.len(),
        "billing session started"
    );

    let mut result = Ok(());
    loop {
        expire_status(state, &mut view_data, Instant::now());

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data, &chrome)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(state, &mut view_data, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    restore_terminal()?;
    tracing::info!(
        lines = state.ledger.len(),
        total = state.total(),
        "billing session ended"
    );
    result
}

fn enter_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    Ok(())
}

/// Runs `restore` when `result` failed; the setup error wins over a restore error.
fn restore_on_error<T>(result: Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    if let Err(error) = &result
        && let Err(restore_error) = restore()
    {
        tracing::warn!(%error, %restore_error, "terminal restore failed after setup error");
    }
    result
}

fn expire_status(state: &mut AppState, view_data: &mut ViewData, now: Instant) {
    if view_data
        .status_deadline
        .is_some_and(|deadline| now >= deadline)
    {
        view_data.status_deadline = None;
        state.dispatch(AppCommand::ClearStatus);
    }
}

fn handle_key_event(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            view_data.help_visible = false;
        }
        return false;
    }

    match key.code {
        KeyCode::F(1) => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::Tab => {
            focus_pane(state, view_data, view_data.pane.next());
            return false;
        }
        KeyCode::BackTab => {
            focus_pane(state, view_data, view_data.pane.prev());
            return false;
        }
        KeyCode::Esc => {
            dispatch(state, view_data, AppCommand::DismissResults);
            return false;
        }
        _ => {}
    }

    match view_data.pane {
        Pane::Search => handle_search_key(state, view_data, key),
        Pane::Quantity => handle_quantity_key(state, view_data, key),
        Pane::Ledger => handle_ledger_key(state, view_data, key),
    }
    false
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Char(ch) if is_text_input(key) => {
            let mut query = state.query.clone();
            query.push(ch);
            dispatch(state, view_data, AppCommand::EditQuery(query));
        }
        KeyCode::Backspace => {
            let mut query = state.query.clone();
            if query.pop().is_some() {
                dispatch(state, view_data, AppCommand::EditQuery(query));
            }
        }
        KeyCode::Down => {
            if state.results_open {
                let last = state.visible_results().len().saturating_sub(1);
                view_data.result_cursor = (view_data.result_cursor + 1).min(last);
            } else {
                dispatch(state, view_data, AppCommand::OpenResults);
            }
        }
        KeyCode::Up => {
            view_data.result_cursor = view_data.result_cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            // A visible dropdown takes the activation key until an item is picked;
            // after that only typing can change the selection.
            let command = if state.selection.is_some() || state.visible_results().is_empty() {
                AppCommand::Commit
            } else {
                AppCommand::SelectResult(view_data.result_cursor)
            };
            dispatch(state, view_data, command);
        }
        _ => {}
    }
}

fn handle_quantity_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Char(ch) if is_text_input(key) => {
            let mut quantity = state.quantity.clone();
            quantity.push(ch);
            dispatch(state, view_data, AppCommand::EditQuantity(quantity));
        }
        KeyCode::Backspace => {
            let mut quantity = state.quantity.clone();
            if quantity.pop().is_some() {
                dispatch(state, view_data, AppCommand::EditQuantity(quantity));
            }
        }
        KeyCode::Enter => dispatch(state, view_data, AppCommand::Commit),
        _ => {}
    }
}

fn handle_ledger_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let last = state.ledger.len().saturating_sub(1);
            view_data.ledger_cursor = (view_data.ledger_cursor + 1).min(last);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.ledger_cursor = view_data.ledger_cursor.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => view_data.ledger_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            view_data.ledger_cursor = state.ledger.len().saturating_sub(1);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(id) = line_at_cursor(state, view_data) {
                dispatch(state, view_data, AppCommand::BeginEdit(id));
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = line_at_cursor(state, view_data) {
                dispatch(state, view_data, AppCommand::Remove(id));
            }
        }
        _ => {}
    }
}

fn is_text_input(key: KeyEvent) -> bool {
    !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn line_at_cursor(state: &AppState, view_data: &ViewData) -> Option<LineItemId> {
    state
        .ledger
        .items()
        .get(view_data.ledger_cursor)
        .map(|line| line.id)
}

/// Moving focus off the search field stands in for clicking outside the dropdown.
fn focus_pane(state: &mut AppState, view_data: &mut ViewData, target: Pane) {
    let leaving_search = view_data.pane == Pane::Search && target != Pane::Search;
    let entering_search = view_data.pane != Pane::Search && target == Pane::Search;
    view_data.pane = target;
    if leaving_search {
        dispatch(state, view_data, AppCommand::DismissResults);
    }
    if entering_search && state.selection.is_none() {
        dispatch(state, view_data, AppCommand::OpenResults);
    }
}

fn dispatch(state: &mut AppState, view_data: &mut ViewData, command: AppCommand) {
    let events = state.dispatch(command);
    apply_events(state, view_data, &events);
}

fn apply_events(state: &AppState, view_data: &mut ViewData, events: &[AppEvent]) {
    for event in events {
        match event {
            AppEvent::FocusRequested(target) => view_data.pane = Pane::from(*target),
            AppEvent::QueryChanged(_) | AppEvent::ResultsPanelChanged(true) => {
                view_data.result_cursor = 0;
            }
            AppEvent::StatusUpdated(_) => {
                view_data.status_deadline = Some(Instant::now() + STATUS_TTL);
            }
            AppEvent::StatusCleared => view_data.status_deadline = None,
            AppEvent::LineAdded(id) | AppEvent::EditStarted(id) => {
                if let Some(index) = state.ledger.position(*id) {
                    view_data.ledger_cursor = index;
                }
            }
            _ => {}
        }
    }
    view_data.ledger_cursor = view_data
        .ledger_cursor
        .min(state.ledger.len().saturating_sub(1));
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    view_data: &ViewData,
    chrome: &Chrome,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(4),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(chrome.order_line.clone()).block(
        Block::default()
            .title("Quick Bill")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, layout[0]);

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(10),
        ])
        .split(layout[1]);
    render_input(
        frame,
        inputs[0],
        Pane::Search,
        &state.query,
        SEARCH_PLACEHOLDER,
        view_data,
    );
    render_input(
        frame,
        inputs[1],
        Pane::Quantity,
        &state.quantity,
        QUANTITY_PLACEHOLDER,
        view_data,
    );

    let button_style = if !state.can_commit() {
        Style::default().fg(Color::DarkGray)
    } else if state.editing_id().is_some() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new(commit_button_label(state))
        .style(button_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, inputs[2]);

    let hint = Paragraph::new(selection_hint_text(state, &chrome.currency))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(hint, layout[2]);

    render_ledger(frame, layout[3], state, view_data, &chrome.currency);

    let total = Paragraph::new(total_text(state, &chrome.currency)).block(
        Block::default()
            .title("Total Amount")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(total, layout[4]);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[5]);

    render_dropdown(frame, inputs[0], state, view_data, &chrome.currency);

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_input(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    pane: Pane,
    value: &str,
    placeholder: &str,
    view_data: &ViewData,
) {
    let focused = view_data.pane == pane && !view_data.help_visible;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let paragraph = if value.is_empty() {
        Paragraph::new(placeholder.to_owned()).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(value.to_owned())
    };
    frame.render_widget(
        paragraph.block(
            Block::default()
                .title(pane.label())
                .borders(Borders::ALL)
                .border_style(border_style),
        ),
        area,
    );

    if focused {
        let typed = u16::try_from(value.chars().count()).unwrap_or(u16::MAX);
        let max_x = area.x + area.width.saturating_sub(2);
        let x = area.x.saturating_add(1).saturating_add(typed).min(max_x);
        frame.set_cursor_position((x, area.y + 1));
    }
}

fn render_ledger(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
    currency: &str,
) {
    let focused = view_data.pane == Pane::Ledger;
    let block = Block::default()
        .title("Bill Items")
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });

    if state.ledger.is_empty() {
        let empty = Paragraph::new(empty_ledger_text())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(
        ["Sl", "Item", "Qty", "Amount", "Actions"].map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }),
    );

    let editing = state.editing_id();
    let rows = ledger_rows(state, currency)
        .into_iter()
        .zip(state.ledger.items())
        .enumerate()
        .map(|(index, (cells, line))| {
            let mut style = Style::default();
            if editing == Some(line.id) {
                style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
            }
            if focused && index == view_data.ledger_cursor {
                style = style.bg(Color::DarkGray);
            }
            Row::new(cells.map(Cell::from)).style(style)
        });

    let widths = [
        Constraint::Length(4),
        Constraint::Min(16),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn render_dropdown(
    frame: &mut ratatui::Frame<'_>,
    anchor: Rect,
    state: &AppState,
    view_data: &ViewData,
    currency: &str,
) {
    let lines = results_lines(state, view_data.result_cursor, currency);
    if lines.is_empty() || view_data.pane != Pane::Search {
        return;
    }

    let screen = frame.area();
    let top = anchor.y.saturating_add(anchor.height);
    let wanted = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let height = wanted.min(screen.height.saturating_sub(top));
    if height < 3 {
        return;
    }
    let area = Rect {
        x: anchor.x,
        y: top,
        width: anchor.width,
        height,
    };

    let styled = lines
        .into_iter()
        .map(|(text, highlighted)| {
            let style = if highlighted {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect::<Vec<_>>();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(styled).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

/// Dropdown rows as `(text, highlighted)`, windowed so the cursor stays visible.
fn results_lines(state: &AppState, cursor: usize, currency: &str) -> Vec<(String, bool)> {
    let results = state.visible_results();
    let start = cursor.saturating_sub(DROPDOWN_ROWS - 1);
    results
        .iter()
        .enumerate()
        .skip(start)
        .take(DROPDOWN_ROWS)
        .map(|(index, entry)| {
            (
                format!(
                    "{}  {}",
                    entry.name,
                    format_amount(currency, entry.unit_price)
                ),
                index == cursor,
            )
        })
        .collect()
}

fn ledger_rows(state: &AppState, currency: &str) -> Vec<[String; 5]> {
    state
        .ledger
        .items()
        .iter()
        .enumerate()
        .map(|(index, line)| {
            [
                (index + 1).to_string(),
                format!(
                    "{} ({} each)",
                    line.name,
                    format_amount(currency, line.unit_price)
                ),
                line.quantity.to_string(),
                format_amount(currency, line.amount),
                "e edit d del".to_owned(),
            ]
        })
        .collect()
}

fn commit_button_label(state: &AppState) -> String {
    format!("[ {} ]", state.editor.commit_label())
}

fn selection_hint_text(state: &AppState, currency: &str) -> String {
    match &state.selection {
        Some(selection) => format!(
            "Selected: {} @ {}",
            selection.name,
            format_amount(currency, selection.unit_price)
        ),
        None => String::new(),
    }
}

fn empty_ledger_text() -> &'static str {
    "No items added yet\nSearch and add items to start billing"
}

fn total_text(state: &AppState, currency: &str) -> String {
    format!(
        "{}\n{}",
        format_amount(currency, state.total()),
        item_count_label(state.ledger.len())
    )
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = match state.editing_id() {
        Some(id) => format!("EDIT #{id}"),
        None => "ADD".to_owned(),
    };
    let keys = match view_data.pane {
        Pane::Search => "type search | up/down pick | enter select/commit",
        Pane::Quantity => "type qty | enter commit",
        Pane::Ledger => "j/k move | e edit | d delete",
    };
    let default = format!("{keys} | tab pane | esc close | f1 help | ctrl+q quit");
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | tab/shift+tab switch pane | esc close results | f1 help\n\
search: type to filter | up/down move | enter pick result, or commit when no results\n\
qty: type quantity | enter add/save\n\
bill: j/k or up/down move | g/G first/last | e or enter edit | d or delete remove\n\
editing: pick another item or change qty, then enter to save"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
