//! Main application logic for the terminal user interface.
//!
//! The `App` struct is the interactive controller: it owns the task store,
//! tracks which screen is active, wires key events to store and projection
//! calls, and renders the result. The edit dialog is a small state
//! machine: closed, open on exactly one recorded task id, closed again on
//! save or cancel.

use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::store::{SortOrder, TaskStore};
use crate::tui::form::{TaskForm, DUE_FIELD, SUBJECT_FIELD, TEXT_FIELD};
use crate::tui::utils::centered_rect;
use crate::view::{format_completion, visible_tasks, FilterMode};

/// How long to wait for a key before redrawing anyway. Keeps the clock in
/// the header moving once per second while the user is idle.
const TICK: Duration = Duration::from_secs(1);

/// Which screen is active.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AppState {
    TaskList,
    AddTask,
    EditTask,
    ConfirmDelete,
    Help,
}

/// Interactive controller over an owned task store.
pub struct App {
    state: AppState,
    store: TaskStore,
    table_state: TableState,
    /// Ids of the tasks currently shown, in display order.
    visible: Vec<i64>,
    filter_mode: FilterMode,
    search_text: String,
    search_active: bool,
    form: TaskForm,
    /// The one task an edit session may have open.
    editing_id: Option<i64>,
    pending_delete: Option<i64>,
    status_message: String,
}

impl App {
    /// Create the controller around an already-opened store.
    pub fn new(store: TaskStore) -> Self {
        let mut app = App {
            state: AppState::TaskList,
            store,
            table_state: TableState::default(),
            visible: Vec::new(),
            filter_mode: FilterMode::All,
            search_text: String::new(),
            search_active: false,
            form: TaskForm::new(),
            editing_id: None,
            pending_delete: None,
            status_message: String::new(),
        };
        app.update_visible();
        app
    }

    /// Recompute the visible id list from the current filter and search,
    /// keeping the selection on the same task when it survives.
    fn update_visible(&mut self) {
        let old_selected = self
            .table_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .copied();

        self.visible = visible_tasks(self.store.all(), self.filter_mode, &self.search_text)
            .into_iter()
            .map(|t| t.id)
            .collect();

        match old_selected.and_then(|id| self.visible.iter().position(|&v| v == id)) {
            Some(idx) => self.table_state.select(Some(idx)),
            None => self.table_state.select(if self.visible.is_empty() {
                None
            } else {
                Some(0)
            }),
        }
    }

    fn selected_id(&self) -> Option<i64> {
        self.table_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .copied()
    }

    fn set_status(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn select_previous(&mut self) {
        if let Some(i) = self.table_state.selected() {
            if i > 0 {
                self.table_state.select(Some(i - 1));
            }
        } else if !self.visible.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn select_next(&mut self) {
        if let Some(i) = self.table_state.selected() {
            if i + 1 < self.visible.len() {
                self.table_state.select(Some(i + 1));
            }
        } else if !self.visible.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    /// Open the edit dialog on the selected task, populated with its
    /// current fields. Does nothing when the id is gone.
    fn open_editor(&mut self) {
        if let Some(id) = self.selected_id() {
            if let Some(task) = self.store.get(id) {
                self.form = TaskForm::from_task(task);
                self.editing_id = Some(id);
                self.state = AppState::EditTask;
            }
        }
    }

    /// Submit the add form. A validation failure keeps the dialog open
    /// with the entered values intact.
    fn submit_new_task(&mut self) {
        let values = self.form.values();
        match self.store.create(&values.subject, &values.text, &values.due_date) {
            Ok(task) => {
                self.form = TaskForm::new();
                self.state = AppState::TaskList;
                self.update_visible();
                self.set_status(format!("Task #{} added", task.number));
            }
            Err(e) => self.set_status(format!("Cannot add task: {e}")),
        }
    }

    /// Save the edit form back onto the recorded task and close the
    /// dialog. Field problems keep the dialog open.
    fn save_edited_task(&mut self) {
        let Some(id) = self.editing_id else {
            return;
        };
        let values = self.form.values();
        let due = match NaiveDate::parse_from_str(values.due_date.trim(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                self.set_status("Due date must be YYYY-MM-DD".to_string());
                return;
            }
        };
        if values.subject.trim().is_empty() || values.text.trim().is_empty() {
            self.set_status("Subject and task text are required".to_string());
            return;
        }

        self.store.edit(id, &values.subject, &values.text, due);
        self.editing_id = None;
        self.state = AppState::TaskList;
        self.update_visible();
        self.set_status("Task updated".to_string());
    }

    /// Keys on the task list screen. Returns true to quit.
    fn handle_task_list_key(&mut self, key: KeyCode) -> bool {
        if self.search_active {
            match key {
                KeyCode::Esc => {
                    self.search_active = false;
                    self.search_text.clear();
                    self.update_visible();
                }
                KeyCode::Enter => {
                    self.search_active = false;
                    self.set_status(format!("{} task(s) match", self.visible.len()));
                }
                KeyCode::Backspace => {
                    self.search_text.pop();
                    self.update_visible();
                }
                KeyCode::Char(c) => {
                    self.search_text.push(c);
                    self.update_visible();
                }
                _ => {}
            }
            return false;
        }

        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if self.search_text.is_empty() {
                    return true;
                }
                self.search_text.clear();
                self.update_visible();
            }
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id() {
                    self.store.toggle_complete(id);
                    let done = self.store.get(id).map(|t| t.completed).unwrap_or(false);
                    self.update_visible();
                    self.set_status(format!(
                        "Task marked as {}",
                        if done { "done" } else { "pending" }
                    ));
                }
            }
            KeyCode::Char('a') => {
                self.form = TaskForm::new();
                self.state = AppState::AddTask;
            }
            KeyCode::Char('e') => self.open_editor(),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.pending_delete = Some(id);
                    self.state = AppState::ConfirmDelete;
                }
            }
            KeyCode::Char('f') => {
                self.filter_mode = self.filter_mode.next();
                self.update_visible();
                self.set_status(format!("Filter: {}", self.filter_mode.label()));
            }
            KeyCode::Char('/') => {
                self.search_active = true;
            }
            KeyCode::Char('n') => {
                self.store.sort_by(SortOrder::Newest);
                self.update_visible();
                self.set_status("Sorted by newest due date".to_string());
            }
            KeyCode::Char('o') => {
                self.store.sort_by(SortOrder::Oldest);
                self.update_visible();
                self.set_status("Sorted by oldest due date".to_string());
            }
            KeyCode::Char('h') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    /// Keys while the add or edit dialog is open.
    fn handle_form_key(&mut self, key: KeyCode, is_edit: bool) -> bool {
        match key {
            KeyCode::Esc => {
                // Cancel path: close without touching the store.
                self.editing_id = None;
                self.state = AppState::TaskList;
            }
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Left => self.form.move_cursor(false),
            KeyCode::Right => self.form.move_cursor(true),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter => {
                if is_edit {
                    self.save_edited_task();
                } else {
                    self.submit_new_task();
                }
            }
            KeyCode::Char(c) => self.form.insert(c),
            _ => {}
        }
        false
    }

    /// Keys in the delete confirmation dialog.
    fn handle_confirm_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.pending_delete.take() {
                    self.store.delete(id);
                    self.update_visible();
                    self.set_status("Task deleted".to_string());
                }
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_delete = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        false
    }

    fn handle_help_key(&mut self, _key: KeyCode) -> bool {
        self.state = AppState::TaskList;
        false
    }

    /// Poll for a key event, falling through once per tick so the clock
    /// keeps time. Returns true when the app should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
                {
                    return Ok(true);
                }
                self.status_message.clear();
                let quit = match self.state {
                    AppState::TaskList => self.handle_task_list_key(key.code),
                    AppState::AddTask => self.handle_form_key(key.code, false),
                    AppState::EditTask => self.handle_form_key(key.code, true),
                    AppState::ConfirmDelete => self.handle_confirm_key(key.code),
                    AppState::Help => self.handle_help_key(key.code),
                };
                return Ok(quit);
            }
        }
        Ok(false)
    }

    /// Title on the left, live clock on the right.
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(20)])
            .split(area);

        let title = Paragraph::new("To-Do Manager")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        f.render_widget(title, halves[0]);

        let clock = Paragraph::new(Local::now().format("%d/%m/%Y %H:%M:%S").to_string())
            .alignment(Alignment::Right);
        f.render_widget(clock, halves[1]);
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        self.render_header(f, chunks[0]);

        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|id| self.store.get(*id))
            .map(|t| {
                let row_style = if t.completed {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let status_style = if t.completed {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Yellow)
                };
                Row::new(vec![
                    Cell::from(t.number.to_string()),
                    Cell::from(t.due_date.to_string()),
                    Cell::from(t.subject.clone()),
                    Cell::from(t.text.clone()),
                    Cell::from(format_completion(t.completed)).style(status_style),
                ])
                .style(row_style)
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Min(14),
            Constraint::Min(24),
            Constraint::Length(8),
        ];

        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["#", "Due", "Subject", "Task", "Status"])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .bottom_margin(1),
            )
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }

    /// The add/edit dialog, drawn as a popup over the task list.
    fn render_form(&self, f: &mut Frame, area: Rect, is_edit: bool) {
        let title = if is_edit {
            let number = self
                .editing_id
                .and_then(|id| self.store.get(id))
                .map(|t| t.number)
                .unwrap_or(0);
            format!("Edit Task #{number}")
        } else {
            "Add Task".to_string()
        };

        let popup = centered_rect(60, 70, area);
        f.render_widget(Clear, popup);
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(popup);
        f.render_widget(block, popup);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let fields = [
            (SUBJECT_FIELD, "Subject", &self.form.subject.value),
            (TEXT_FIELD, "Task", &self.form.text.value),
            (DUE_FIELD, "Due Date (YYYY-MM-DD)", &self.form.due_date.value),
        ];
        for (idx, label, value) in fields {
            let style = if self.form.focus == idx {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let field = Paragraph::new(value.as_str())
                .style(style)
                .block(Block::default().borders(Borders::ALL).title(label));
            f.render_widget(field, rows[idx]);
        }

        let hint = Paragraph::new("Tab: Next field | Enter: Save | Esc: Cancel")
            .style(Style::default().fg(Color::Gray));
        f.render_widget(hint, rows[4]);
    }

    /// Confirmation dialog for the destructive path.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let target = self
            .pending_delete
            .and_then(|id| self.store.get(id))
            .map(|t| format!("Delete task #{} \"{}\"", t.number, t.subject))
            .unwrap_or_default();

        let popup = centered_rect(50, 30, area);
        f.render_widget(Clear, popup);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(target),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let dialog = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Confirm Delete")
                    .style(Style::default().fg(Color::Red)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(dialog, popup);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 80, area);
        f.render_widget(Clear, popup);

        let text = vec![
            Line::from(""),
            Line::from("  Up/Down, j/k   Move selection"),
            Line::from("  a              Add a task"),
            Line::from("  e              Edit the selected task"),
            Line::from("  Space          Toggle done / pending"),
            Line::from("  d              Delete the selected task"),
            Line::from("  f              Cycle filter (all / completed / not completed)"),
            Line::from("  /              Search subject and task text"),
            Line::from("  n / o          Sort by newest / oldest due date"),
            Line::from("  q, Esc         Quit"),
            Line::from(""),
            Line::from("Press any key to return"),
        ];
        let help = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(help, popup);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.search_active {
            format!(
                "Search: {} (Enter to apply, Esc to cancel)",
                self.search_text
            )
        } else if !self.search_text.is_empty() {
            format!(
                "{} of {} task(s) match '{}' | Press 'h' for help",
                self.visible.len(),
                self.store.all().len(),
                self.search_text
            )
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "{} of {} task(s) shown (filter: {}) | Press 'h' for help",
                    self.visible.len(),
                    self.store.all().len(),
                    self.filter_mode.label()
                ),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::ConfirmDelete => "Confirm Delete".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };

        let status = Paragraph::new(text)
            .style(Style::default().bg(Color::Blue).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Dispatch to the active screen; dialogs draw over the task list.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_task_list(f, chunks[0]);
        match self.state {
            AppState::TaskList => {}
            AppState::AddTask => self.render_form(f, chunks[0], false),
            AppState::EditTask => self.render_form(f, chunks[0], true),
            AppState::ConfirmDelete => self.render_confirm(f, chunks[0]),
            AppState::Help => self.render_help(f, chunks[0]),
        }
        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop: draw, then wait for input or the next tick.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
