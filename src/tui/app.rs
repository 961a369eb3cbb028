//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which maps key presses onto the
//! `TaskScreen` controller, runs the jobs it hands back through the
//! `Dispatcher`, and renders the list, the modal editor and its dialogs.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::runtime::Handle;
use tracing::debug;

use crate::confirm::{Confirmation, DELETE_PROMPT};
use crate::editor::EditMode;
use crate::error::GatewayError;
use crate::fields::Status;
use crate::format::{card_lines, format_due, format_status};
use crate::gateway::TaskGateway;
use crate::screen::{Completion, Job, TaskScreen};
use crate::task::TaskId;
use crate::tui::{
    colors::{ACCENT, DARK_RED, DISABLED, MODAL_BG, PLACEHOLDER, PRIMARY, SEGMENT_ACTIVE, SEGMENT_BG, TEXT},
    date_picker::{DatePicker, PickerOutcome},
    dispatch::Dispatcher,
    enums::AppState,
    input::InputField,
    task_form::{
        TaskForm, DESCRIPTION_GLOBAL_ORDER, DUE_GLOBAL_ORDER, PRIORITY_GLOBAL_ORDER,
        STATUS_GLOBAL_ORDER, TITLE_GLOBAL_ORDER,
    },
    utils::centered_rect,
};

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    screen: TaskScreen,
    dispatcher: Dispatcher,
    list_state: ListState,
    task_form: TaskForm,
    date_picker: Option<DatePicker>,
    status_message: String,
}

impl App {
    pub fn new(handle: Handle, gateway: Arc<dyn TaskGateway>) -> Self {
        App {
            state: AppState::TaskList,
            screen: TaskScreen::new(),
            dispatcher: Dispatcher::new(handle, gateway),
            list_state: ListState::default(),
            task_form: TaskForm::new(),
            date_picker: None,
            status_message: String::new(),
        }
    }

    /// Load the list when the screen first appears.
    pub fn start(&mut self) {
        let job = self.screen.mount();
        self.dispatcher.dispatch(job);
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn selected_id(&self) -> Option<TaskId> {
        let index = self.list_state.selected()?;
        self.screen.store().tasks().get(index).and_then(|t| t.id)
    }

    /// Keep the selection on the same task, or at least a valid row, after
    /// the list changed.
    fn sync_selection(&mut self, keep: Option<TaskId>) {
        if let Some(index) = keep.and_then(|id| self.screen.store().position(id)) {
            self.list_state.select(Some(index));
            return;
        }
        let len = self.screen.store().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            Some(_) => {}
        }
    }

    /// Feed a finished job back into the screen and follow up.
    fn apply(&mut self, job: Job, result: Result<Completion, GatewayError>) {
        let refreshed = matches!(job, Job::Refresh { .. });
        let selected = self.selected_id();
        // Progress notes ("Saving...") end with any result
        if self.status_message.ends_with("...") {
            self.clear_status_message();
        }
        match self.screen.complete(job, result) {
            Ok(Some(next)) => self.dispatcher.dispatch(next),
            Ok(None) => {}
            // Already logged and reflected in the screen state
            Err(e) => debug!(error = %e, "job failed"),
        }
        if refreshed {
            self.sync_selection(selected);
        }

        let editing = matches!(self.state, AppState::Editor | AppState::DatePicker);
        if editing && !self.screen.editor().is_open() {
            self.state = AppState::TaskList;
            self.date_picker = None;
            self.set_status_message("Task saved");
        }
        if self.screen.alert().is_some() {
            self.state = AppState::Alert;
        }
    }

    /// Apply every result that has arrived.
    fn pump(&mut self) {
        for (job, result) in self.dispatcher.drain() {
            self.apply(job, result);
        }
    }

    fn open_new(&mut self) {
        match self.screen.open_new() {
            Ok(()) => {
                self.task_form = TaskForm::new();
                self.state = AppState::Editor;
            }
            Err(e) => self.set_status_message(format!("Error: {e}")),
        }
    }

    fn open_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.screen.open_task(id) {
            Ok(()) => {
                if let Some(draft) = self.screen.editor().draft() {
                    self.task_form = TaskForm::from_task(draft);
                }
                self.state = AppState::Editor;
            }
            Err(e) => self.set_status_message(format!("Error: {e}")),
        }
    }

    fn save(&mut self) {
        match self.screen.save() {
            Ok(job) => {
                self.dispatcher.dispatch(job);
                self.set_status_message("Saving...");
            }
            Err(e) => self.set_status_message(format!("Error: {e}")),
        }
    }

    /// Handle keyboard input in the main task list view.
    ///
    /// Returns true if the application should quit.
    fn handle_task_list_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(selected) = self.list_state.selected() {
                    if selected > 0 {
                        self.list_state.select(Some(selected - 1));
                    }
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.screen.store().len();
                match self.list_state.selected() {
                    Some(selected) if selected + 1 < len => self.list_state.select(Some(selected + 1)),
                    None if len > 0 => self.list_state.select(Some(0)),
                    _ => {}
                }
            }
            KeyCode::Char('a') => self.open_new(),
            KeyCode::Enter | KeyCode::Char('e') => self.open_selected(),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.screen.request_delete(id);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('r') => {
                let job = self.screen.refresh();
                self.dispatcher.dispatch(job);
                self.set_status_message("Refreshing...");
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the modal editor.
    fn handle_editor_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        if key == KeyCode::Esc {
            self.screen.cancel_edit();
            self.state = AppState::TaskList;
            self.clear_status_message();
            return Ok(false);
        }
        if self.screen.editor().is_saving() {
            self.set_status_message("Saving...");
            return Ok(false);
        }

        let result = match key {
            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.save();
                Ok(())
            }
            KeyCode::Tab | KeyCode::Down => {
                self.task_form.next_field();
                Ok(())
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.task_form.prev_field();
                Ok(())
            }
            KeyCode::Left => self.task_form.handle_left_right(false, self.screen.editor_mut()),
            KeyCode::Right => self.task_form.handle_left_right(true, self.screen.editor_mut()),
            KeyCode::Home => {
                if let Some(field) = self.task_form.active_input() {
                    field.move_cursor_home();
                }
                Ok(())
            }
            KeyCode::End => {
                if let Some(field) = self.task_form.active_input() {
                    field.move_cursor_end();
                }
                Ok(())
            }
            KeyCode::Enter if self.task_form.current_field == DUE_GLOBAL_ORDER => {
                let current = self.screen.editor().draft().and_then(|t| t.due_date).map(|d| d.local_day());
                self.date_picker = Some(DatePicker::new(current));
                self.state = AppState::DatePicker;
                Ok(())
            }
            KeyCode::Enter => {
                self.save();
                Ok(())
            }
            KeyCode::Backspace | KeyCode::Delete if self.task_form.current_field == DUE_GLOBAL_ORDER => {
                self.screen.editor_mut().set_due_date(None)
            }
            KeyCode::Backspace => {
                self.task_form.handle_backspace();
                self.task_form.sync_current(self.screen.editor_mut())
            }
            KeyCode::Delete => {
                self.task_form.handle_delete();
                self.task_form.sync_current(self.screen.editor_mut())
            }
            KeyCode::Char(c) => {
                if self.task_form.handle_char(c) {
                    self.task_form.sync_current(self.screen.editor_mut())
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.set_status_message(format!("Error: {e}"));
        }
        Ok(false)
    }

    fn handle_date_picker_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        let Some(picker) = self.date_picker.as_mut() else {
            self.state = AppState::Editor;
            return Ok(false);
        };
        match picker.handle_key(key) {
            PickerOutcome::Pending => {}
            PickerOutcome::Picked(day) => {
                if let Err(e) = self.screen.editor_mut().set_due_day(day) {
                    self.set_status_message(format!("Error: {e}"));
                }
                self.date_picker = None;
                self.state = AppState::Editor;
            }
            PickerOutcome::Dismissed => {
                self.date_picker = None;
                self.state = AppState::Editor;
            }
        }
        Ok(false)
    }

    fn handle_confirm_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        let answer = match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Confirmation::Accepted,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Confirmation::Declined,
            _ => return Ok(false),
        };
        self.state = AppState::TaskList;
        if let Some(job) = self.screen.answer_delete(answer) {
            self.dispatcher.dispatch(job);
            self.set_status_message("Deleting...");
        }
        Ok(false)
    }

    fn handle_alert_input(&mut self, _key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        self.screen.dismiss_alert();
        self.state = if self.screen.editor().is_open() {
            AppState::Editor
        } else {
            AppState::TaskList
        };
        Ok(false)
    }

    fn handle_help_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => {
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Route one key press by application state.
    ///
    /// Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        match self.state {
            AppState::TaskList => self.handle_task_list_input(key, modifiers),
            AppState::Editor => self.handle_editor_input(key, modifiers),
            AppState::DatePicker => self.handle_date_picker_input(key, modifiers),
            AppState::Confirm => self.handle_confirm_input(key, modifiers),
            AppState::Alert => self.handle_alert_input(key, modifiers),
            AppState::Help => self.handle_help_input(key, modifiers),
        }
    }

    /// Poll for and handle keyboard events based on current application state.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                if self.state != AppState::Editor {
                    self.clear_status_message();
                }
                return self.handle_key(key.code, key.modifiers);
            }
        }
        Ok(false)
    }

    /// Render the list of task cards.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let header = Paragraph::new(Line::from(Span::styled(
            "TASKS",
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(PRIMARY)))
        .alignment(Alignment::Center);
        f.render_widget(header, chunks[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Tasks ({}) - Press 'h' for help", self.screen.store().len()));

        if self.screen.store().is_empty() {
            let empty = Paragraph::new("No tasks yet. Press 'a' to add one.")
                .style(Style::default().fg(PLACEHOLDER))
                .block(block)
                .alignment(Alignment::Center);
            f.render_widget(empty, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .screen
            .store()
            .iter()
            .map(|task| {
                let title_style = match task.status {
                    Status::Done => Style::default().add_modifier(Modifier::BOLD | Modifier::CROSSED_OUT),
                    _ => Style::default().add_modifier(Modifier::BOLD),
                };
                let mut lines: Vec<Line> = card_lines(task)
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let style = if i == 0 { title_style } else { Style::default().fg(PLACEHOLDER) };
                        Line::from(Span::styled(text, style))
                    })
                    .collect();
                lines.push(Line::from(""));
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(ACCENT).fg(TEXT))
            .highlight_symbol("> ");
        f.render_stateful_widget(list, chunks[1], &mut self.list_state);
    }

    fn text_field(field: &InputField, title: &str, focused: bool) -> Paragraph<'static> {
        let border = if focused { Style::default().fg(PRIMARY) } else { Style::default().fg(PLACEHOLDER) };
        Paragraph::new(field.value.clone())
            .block(Block::default().borders(Borders::ALL).title(title.to_string()).border_style(border))
            .wrap(Wrap { trim: false })
    }

    /// Render the modal editor over the list.
    fn render_editor(&mut self, f: &mut Frame, area: Rect) {
        let Some(draft) = self.screen.editor().draft() else {
            return;
        };
        let title = match self.screen.editor().mode() {
            Some(EditMode::Existing(id)) => format!("Edit task #{id}"),
            _ => "New task".to_string(),
        };
        let saving = self.screen.editor().is_saving();

        let area = centered_rect(70, 80, area);
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(PRIMARY))
            .style(Style::default().bg(MODAL_BG).fg(TEXT));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(5), // Description
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Status
                Constraint::Length(3), // Due Date
                Constraint::Min(1),    // Actions
            ])
            .split(inner);

        let current = self.task_form.current_field;
        f.render_widget(Self::text_field(&self.task_form.title, "Title", current == TITLE_GLOBAL_ORDER), chunks[0]);
        f.render_widget(
            Self::text_field(&self.task_form.description, "Description", current == DESCRIPTION_GLOBAL_ORDER),
            chunks[1],
        );
        f.render_widget(
            Self::text_field(&self.task_form.priority, "Priority", current == PRIORITY_GLOBAL_ORDER),
            chunks[2],
        );

        // Status segmented selector
        let mut segments = Vec::new();
        for status in Status::ALL {
            let style = if status == draft.status {
                Style::default().bg(SEGMENT_ACTIVE).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().bg(SEGMENT_BG).fg(TEXT)
            };
            segments.push(Span::styled(format!(" {} ", format_status(status)), style));
            segments.push(Span::raw(" "));
        }
        let status_border = if current == STATUS_GLOBAL_ORDER { PRIMARY } else { PLACEHOLDER };
        let status_selector = Paragraph::new(Line::from(segments)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Status  < >")
                .border_style(Style::default().fg(status_border)),
        );
        f.render_widget(status_selector, chunks[3]);

        let due = match draft.due_date {
            Some(due) => Span::raw(format_due(due)),
            None => Span::styled("No due date (Enter to pick)", Style::default().fg(PLACEHOLDER)),
        };
        let due_border = if current == DUE_GLOBAL_ORDER { PRIMARY } else { PLACEHOLDER };
        let due_field = Paragraph::new(Line::from(due)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Due Date")
                .border_style(Style::default().fg(due_border)),
        );
        f.render_widget(due_field, chunks[4]);

        let actions = if saving {
            Line::from(Span::styled("Saving...   Esc Close", Style::default().fg(DISABLED)))
        } else {
            Line::from(vec![
                Span::styled("Enter", Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)),
                Span::raw(" Save   "),
                Span::styled("Esc", Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)),
                Span::raw(" Cancel   "),
                Span::styled("Tab", Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)),
                Span::raw(" Next field"),
            ])
        };
        f.render_widget(Paragraph::new(actions).alignment(Alignment::Center), chunks[5]);

        if self.state == AppState::Editor {
            let cursor_field = match current {
                TITLE_GLOBAL_ORDER => Some((chunks[0], &self.task_form.title)),
                DESCRIPTION_GLOBAL_ORDER => Some((chunks[1], &self.task_form.description)),
                PRIORITY_GLOBAL_ORDER => Some((chunks[2], &self.task_form.priority)),
                _ => None,
            };
            if let Some((chunk, field)) = cursor_field {
                f.set_cursor_position((cursor_column(chunk, field.cursor), chunk.y + 1));
            }
        }
    }

    /// Render the help screen with keyboard shortcuts.
    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Task List", bold)),
            Line::from("  Up/Down, k/j   Select task"),
            Line::from("  a              Add new task"),
            Line::from("  Enter/e        Edit selected task"),
            Line::from("  d              Delete selected task"),
            Line::from("  r              Reload from server"),
            Line::from("  h/F1           Show this help"),
            Line::from("  q/Esc/Ctrl+C   Quit"),
            Line::from(""),
            Line::from(Span::styled("Editor", bold)),
            Line::from("  Tab/Up/Down    Move between fields"),
            Line::from("  Left/Right     Change status"),
            Line::from("  Enter          Save (pick date on Due Date)"),
            Line::from("  Backspace      Clear due date (on Due Date)"),
            Line::from("  Esc            Discard changes"),
            Line::from(""),
            Line::from(Span::styled("Date Picker", bold)),
            Line::from("  Arrows         Move by day or week"),
            Line::from("  PgUp/PgDn      Previous/next month"),
            Line::from("  t              Jump to today"),
            Line::from("  Enter          Pick, Esc Close"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press Esc to return"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the delete confirmation dialog.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Delete Task")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED).fg(Color::White));

        let area = centered_rect(70, 30, area);
        f.render_widget(Clear, area);

        let task_title = self
            .screen
            .pending_delete()
            .and_then(|id| self.screen.store().get(id))
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(DELETE_PROMPT, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(task_title),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_alert(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Error")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED).fg(Color::White));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.screen.alert().unwrap_or_default().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press any key to continue"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let mut status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!("Tasks: {} | Press 'h' for help", self.screen.store().len()),
                AppState::Editor => "Edit Task".to_string(),
                AppState::DatePicker => "Pick Due Date".to_string(),
                AppState::Confirm => "Confirm Delete".to_string(),
                AppState::Alert => "Error".to_string(),
                AppState::Help => "Help".to_string(),
            }
        };
        if self.dispatcher.in_flight() > 0 && self.status_message.is_empty() {
            status_text.push_str(" | Working...");
        }

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(PRIMARY).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::Help => self.render_help(f, chunks[0]),
            _ => self.render_task_list(f, chunks[0]),
        }
        if self.screen.editor().is_open() && self.state != AppState::Help {
            self.render_editor(f, chunks[0]);
        }
        match self.state {
            AppState::DatePicker => {
                if let Some(picker) = &self.date_picker {
                    picker.render(f, chunks[0]);
                }
            }
            AppState::Confirm => self.render_confirm(f, chunks[0]),
            AppState::Alert => self.render_alert(f, chunks[0]),
            _ => {}
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering, job results and input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            self.pump();
            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Screen column of a text cursor inside a bordered input box.
fn cursor_column(area: Rect, cursor: usize) -> u16 {
    let offset = u16::try_from(cursor).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(offset)
        .min(area.right().saturating_sub(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use ratatui::backend::TestBackend;
    use serde_json::json;
    use tokio::runtime::Runtime;

    use crate::screen::tests::{task, Call, FakeGateway};
    use crate::screen::DELETE_FAILED;

    fn app_with(tasks: Vec<crate::task::Task>) -> (Runtime, Arc<FakeGateway>, App) {
        let runtime = Runtime::new().unwrap();
        let gateway = Arc::new(FakeGateway::with_tasks(tasks));
        let mut app = App::new(runtime.handle().clone(), gateway.clone());
        app.start();
        settle(&mut app);
        (runtime, gateway, app)
    }

    /// Apply results until no job is left running.
    fn settle(app: &mut App) {
        while let Some((job, result)) = app.dispatcher.wait() {
            app.apply(job, result);
        }
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            app.handle_key(*key, KeyModifiers::NONE).unwrap();
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE).unwrap();
        }
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal.backend().buffer().content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_renders_card_without_due_line() {
        let (_rt, gateway, mut app) = app_with(vec![task(1, "A")]);
        assert_eq!(gateway.calls(), vec![Call::List]);

        let text = screen_text(&mut app);
        assert!(text.contains("Status: pending | Priority: 0"));
        assert!(!text.contains("Due:"));
        assert_eq!(app.selected_id(), Some(1));
    }

    #[test]
    fn test_add_task_posts_then_reloads() {
        let (_rt, gateway, mut app) = app_with(vec![]);
        press(&mut app, &[KeyCode::Char('a')]);
        assert_eq!(app.state, AppState::Editor);
        type_text(&mut app, "B");
        press(&mut app, &[KeyCode::Tab, KeyCode::Tab, KeyCode::Backspace]);
        type_text(&mut app, "2");
        press(&mut app, &[KeyCode::Enter]);
        settle(&mut app);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 3);
        match &calls[1] {
            Call::Create(body) => assert_eq!(
                serde_json::to_value(body).unwrap(),
                json!({"title": "B", "description": "", "status": "pending", "priority": 2})
            ),
            other => panic!("expected a create call, got {other:?}"),
        }
        assert_eq!(calls[2], Call::List);
        assert_eq!(app.state, AppState::TaskList);
        assert!(screen_text(&mut app).contains("Status: pending | Priority: 2"));
    }

    #[test]
    fn test_failed_save_keeps_editor_open() {
        let (_rt, gateway, mut app) = app_with(vec![]);
        *gateway.fail_writes.lock().unwrap() = true;
        press(&mut app, &[KeyCode::Char('a')]);
        type_text(&mut app, "X");
        press(&mut app, &[KeyCode::Enter]);
        settle(&mut app);

        assert_eq!(app.state, AppState::Editor);
        assert_eq!(app.screen.editor().draft().map(|t| t.title.as_str()), Some("X"));
        assert!(!app.screen.editor().is_saving());
        assert_eq!(app.screen.alert(), None);
    }

    #[test]
    fn test_edit_changes_status_and_updates_by_id() {
        let (_rt, gateway, mut app) = app_with(vec![task(1, "A"), task(2, "B")]);
        press(&mut app, &[KeyCode::Down, KeyCode::Enter]);
        assert_eq!(app.screen.editor().mode(), Some(EditMode::Existing(2)));
        press(&mut app, &[KeyCode::Tab, KeyCode::Tab, KeyCode::Tab, KeyCode::Right, KeyCode::Enter]);
        settle(&mut app);

        assert!(matches!(&gateway.calls()[1], Call::Update(2, t) if t.status == Status::OnGoing));
        assert_eq!(app.screen.store().get(2).map(|t| t.status), Some(Status::OnGoing));
    }

    #[test]
    fn test_declined_delete_sends_nothing() {
        let (_rt, gateway, mut app) = app_with(vec![task(5, "E")]);
        press(&mut app, &[KeyCode::Char('d')]);
        assert_eq!(app.state, AppState::Confirm);
        assert!(screen_text(&mut app).contains(DELETE_PROMPT));
        press(&mut app, &[KeyCode::Char('n')]);
        settle(&mut app);

        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(gateway.calls(), vec![Call::List]);
        assert_eq!(app.screen.store().len(), 1);
    }

    #[test]
    fn test_failed_delete_shows_alert() {
        let (_rt, gateway, mut app) = app_with(vec![task(5, "E")]);
        *gateway.fail_writes.lock().unwrap() = true;
        press(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        settle(&mut app);

        assert_eq!(app.state, AppState::Alert);
        assert!(screen_text(&mut app).contains(DELETE_FAILED));
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.state, AppState::TaskList);
        assert_eq!(app.screen.alert(), None);
    }

    #[test]
    fn test_due_date_from_picker_and_clear() {
        let (_rt, _gateway, mut app) = app_with(vec![]);
        press(&mut app, &[KeyCode::Char('a'), KeyCode::BackTab, KeyCode::Enter]);
        assert_eq!(app.state, AppState::DatePicker);
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.state, AppState::Editor);
        let due = app.screen.editor().draft().and_then(|t| t.due_date);
        assert_eq!(due.map(|d| d.local_day()), Some(Local::now().date_naive()));

        press(&mut app, &[KeyCode::Backspace]);
        assert!(app.screen.editor().draft().unwrap().due_date.is_none());
    }

    #[test]
    fn test_refresh_keeps_selection_on_same_task() {
        let (_rt, gateway, mut app) = app_with(vec![task(1, "A"), task(2, "B")]);
        press(&mut app, &[KeyCode::Down]);
        assert_eq!(app.selected_id(), Some(2));

        gateway.tasks.lock().unwrap().insert(0, task(3, "C"));
        press(&mut app, &[KeyCode::Char('r')]);
        settle(&mut app);
        assert_eq!(app.list_state.selected(), Some(2));
        assert_eq!(app.selected_id(), Some(2));
        assert!(app.status_message.is_empty());
    }

    #[test]
    fn test_cursor_column_stays_inside_the_box() {
        let area = Rect::new(5, 0, 20, 3);
        assert_eq!(cursor_column(area, 0), 6);
        assert_eq!(cursor_column(area, 4), 10);
        assert_eq!(cursor_column(area, 100_000), 23);
        let edge = Rect::new(u16::MAX - 10, 0, 10, 3);
        assert_eq!(cursor_column(edge, usize::MAX), u16::MAX - 2);
    }

    #[test]
    fn test_escape_discards_draft() {
        let (_rt, gateway, mut app) = app_with(vec![task(1, "A")]);
        press(&mut app, &[KeyCode::Enter]);
        type_text(&mut app, "zzz");
        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.state, AppState::TaskList);
        assert!(!app.screen.editor().is_open());
        assert_eq!(app.screen.store().get(1).map(|t| t.title.as_str()), Some("A"));
        assert_eq!(gateway.calls(), vec![Call::List]);
    }
}
