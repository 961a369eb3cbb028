//! Month-grid date picker for the due date field.

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::tui::colors::{PLACEHOLDER, PRIMARY, SEGMENT_ACTIVE, TEXT};
use crate::tui::utils::centered_fixed;

/// What a key press did to the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    /// Still choosing.
    Pending,
    /// A day was confirmed.
    Picked(NaiveDate),
    /// Closed without a choice; the due date stays as it was.
    Dismissed,
}

#[derive(Debug, Clone)]
pub struct DatePicker {
    selected: NaiveDate,
    today: NaiveDate,
}

impl DatePicker {
    /// Open on `initial`, or today when there is none.
    pub fn new(initial: Option<NaiveDate>) -> Self {
        Self::with_today(initial, Local::now().date_naive())
    }

    pub fn with_today(initial: Option<NaiveDate>, today: NaiveDate) -> Self {
        DatePicker { selected: initial.unwrap_or(today), today }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    fn shift_days(&mut self, days: i64) {
        if let Some(day) = self.selected.checked_add_signed(Duration::days(days)) {
            self.selected = day;
        }
    }

    fn shift_months(&mut self, forward: bool) {
        let moved = if forward {
            self.selected.checked_add_months(Months::new(1))
        } else {
            self.selected.checked_sub_months(Months::new(1))
        };
        if let Some(day) = moved {
            self.selected = day;
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> PickerOutcome {
        match key {
            KeyCode::Left | KeyCode::Char('h') => self.shift_days(-1),
            KeyCode::Right | KeyCode::Char('l') => self.shift_days(1),
            KeyCode::Up | KeyCode::Char('k') => self.shift_days(-7),
            KeyCode::Down | KeyCode::Char('j') => self.shift_days(7),
            KeyCode::PageUp | KeyCode::Char('<') => self.shift_months(false),
            KeyCode::PageDown | KeyCode::Char('>') => self.shift_months(true),
            KeyCode::Char('t') => self.selected = self.today,
            KeyCode::Enter | KeyCode::Char(' ') => return PickerOutcome::Picked(self.selected),
            KeyCode::Esc | KeyCode::Char('q') => return PickerOutcome::Dismissed,
            _ => {}
        }
        PickerOutcome::Pending
    }

    /// Weeks of the selected month, Monday first. Days outside the month are `None`.
    pub fn weeks(&self) -> Vec<[Option<NaiveDate>; 7]> {
        let mut weeks = Vec::new();
        let Some(first) = self.selected.with_day(1) else {
            return weeks;
        };
        let mut week = [None; 7];
        let mut day = first;
        while day.month() == first.month() {
            let slot = day.weekday().num_days_from_monday() as usize;
            week[slot] = Some(day);
            if slot == 6 {
                weeks.push(week);
                week = [None; 7];
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        if week.iter().any(Option::is_some) {
            weeks.push(week);
        }
        weeks
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let area = centered_fixed(30, 13, area);
        f.render_widget(Clear, area);

        let mut lines = vec![
            Line::from(Span::styled(
                self.selected.format("%B %Y").to_string(),
                Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Mo Tu We Th Fr Sa Su", Style::default().fg(PLACEHOLDER))),
        ];
        for week in self.weeks() {
            let mut spans = Vec::with_capacity(14);
            for (i, slot) in week.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" "));
                }
                let span = match slot {
                    None => Span::raw("  "),
                    Some(day) => {
                        let text = format!("{:>2}", day.day());
                        let style = if *day == self.selected {
                            Style::default().bg(SEGMENT_ACTIVE).fg(ratatui::style::Color::White)
                        } else if *day == self.today {
                            Style::default().fg(PRIMARY).add_modifier(Modifier::UNDERLINED)
                        } else {
                            Style::default().fg(TEXT)
                        };
                        Span::styled(text, style)
                    }
                };
                spans.push(span);
            }
            lines.push(Line::from(spans));
        }

        let picker = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Due date - Enter pick, Esc close")
                    .border_style(Style::default().fg(PRIMARY))
                    .style(Style::default().bg(ratatui::style::Color::White)),
            )
            .alignment(Alignment::Center);
        f.render_widget(picker, area);
    }
}
