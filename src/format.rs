//! Display formatting and due date input parsing.
//!
//! Shared by the command line output and the terminal UI so both show a task
//! the same way.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::fields::{Status, Timestamp};
use crate::task::Task;

/// Human label for a status, as shown on the segmented control.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Pending => "Pending",
        Status::OnGoing => "On going",
        Status::Done => "Done",
    }
}

/// A due date as a local calendar day.
pub fn format_due(due: Timestamp) -> String {
    due.local_day().format("%Y-%m-%d").to_string()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<Timestamp>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = d.local_day() - today;
            if delta.num_days() == 0 {
                "today".into()
            } else if delta.num_days() == 1 {
                "tomorrow".into()
            } else if delta.num_days() > 1 {
                format!("in {}d", delta.num_days())
            } else {
                format!("{}d late", -delta.num_days())
            }
        }
    }
}

/// The lines of a task card: title, status and priority, and a due line
/// only when the task has a due date.
pub fn card_lines(task: &Task) -> Vec<String> {
    let mut lines = vec![
        task.title.clone(),
        format!("Status: {} | Priority: {}", task.status, task.priority),
    ];
    if let Some(due) = task.due_date {
        lines.push(format!("Due: {}", format_due(due)));
    }
    lines
}

/// Parse human-readable due date input.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "next monday", "friday", "this friday"
/// - "end of week", "end of month", "weekend"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let weekday = today.weekday().num_days_from_monday() as i64;
            return Some(today + Duration::days(6 - weekday));
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        "this weekend" | "weekend" => {
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
            return Some(today + Duration::days(days_until_saturday as i64));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        // Offsets past the calendar range are not a date
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return today.checked_add_signed(Duration::try_days(days)?);
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return today.checked_add_signed(Duration::try_weeks(weeks)?);
            }
        }
        if let Some(nm) = rest.strip_suffix('m') {
            if let Ok(months) = nm.trim().parse::<i64>() {
                // Approximate: 30 days per month
                return today.checked_add_signed(Duration::try_days(months.checked_mul(30)?)?);
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];

    let current = today.weekday().num_days_from_monday() as i64;
    for (day_name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == day_name || s == format!("this {day_name}") {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {day_name}") {
            let days = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Parse due date input relative to the local current day.
pub fn parse_due_today(s: &str) -> Option<NaiveDate> {
    parse_due_input(s, Local::now().date_naive())
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks as a table in server order.
pub fn print_table(tasks: &[Task]) {
    println!("{:<5} {:<9} {:<4} {:<12} {}", "ID", "Status", "Pri", "Due", "Title");
    let today = Local::now().date_naive();
    for t in tasks {
        let id = t.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:<5} {:<9} {:<4} {:<12} {}",
            id,
            t.status,
            t.priority,
            format_due_relative(t.due_date, today),
            truncate(&t.title, 60)
        );
    }
}

/// Print one task with every field.
pub fn print_task(task: &Task) {
    let id = task.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
    println!("ID:          {id}");
    println!("Title:       {}", task.title);
    println!("Status:      {}", task.status);
    println!("Priority:    {}", task.priority);
    println!(
        "Due:         {}",
        task.due_date.map(format_due).unwrap_or_else(|| "-".into())
    );
    if let Some(created) = task.created_at {
        println!("Created:     {}", created.to_wire());
    }
    if let Some(updated) = task.updated_at {
        println!("Updated:     {}", updated.to_wire());
    }
    println!();
    println!("{}", task.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("-"));
}
