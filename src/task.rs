//! Task data structure and related functionality.
//!
//! A `Task` is both the server record and the in-memory draft: the only
//! difference is that a draft has no `id` yet.

use serde::{Deserialize, Serialize};

use crate::fields::{Status, Timestamp};

/// Server-assigned task identifier.
pub type TaskId = i64;

/// A to-do item as exchanged with the `/tasks` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, skip_serializing)]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<Timestamp>,
}

impl Task {
    /// A blank draft: empty title and description, pending, priority 0, no due date.
    pub fn draft() -> Self {
        Task {
            id: None,
            title: String::new(),
            description: Some(String::new()),
            status: Status::Pending,
            due_date: None,
            priority: 0,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Coerce free-form priority input to an integer.
///
/// Reads an optional sign and the leading run of digits after any leading
/// whitespace; anything that does not start with a number becomes 0.
/// Out-of-range values saturate.
pub fn coerce_priority(input: &str) -> i64 {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return 0;
    }
    let mut value: i64 = 0;
    for b in digits.bytes() {
        let d = i64::from(b - b'0');
        value = match value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(d)
            } else {
                v.checked_add(d)
            }
        }) {
            Some(v) => v,
            None => return if negative { i64::MIN } else { i64::MAX },
        };
    }
    value
}
