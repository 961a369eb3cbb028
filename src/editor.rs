//! Detail editor state machine.
//!
//! The editor holds at most one draft. Transitions:
//!
//! | from              | action            | to                            |
//! |-------------------|-------------------|-------------------------------|
//! | closed            | open_new          | editing-new                   |
//! | closed            | open_existing     | editing-existing              |
//! | editing-*         | cancel            | closed                        |
//! | editing-*, idle   | begin_save        | editing-*, saving             |
//! | editing-*, saving | begin_save        | rejected (`SaveInFlight`)     |
//! | editing-*, saving | finish_save(ok)   | closed                        |
//! | editing-*, saving | finish_save(err)  | editing-*, idle, draft intact |
//!
//! Every save hands out a `SaveTicket`; a completion whose ticket does not
//! match the current save (the editor was dismissed, maybe reopened) leaves
//! the editor alone.

use chrono::NaiveDate;

use crate::error::EditorError;
use crate::fields::{Status, Timestamp};
use crate::task::{coerce_priority, Task, TaskId};

/// Identifies one save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket(u64);

/// Which kind of draft the editor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    New,
    Existing(TaskId),
}

/// The gateway call a save turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Create(Task),
    Update(TaskId, Task),
}

#[derive(Debug, Clone)]
struct Session {
    mode: EditMode,
    draft: Task,
    saving: Option<SaveTicket>,
}

/// What a save completion did to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResolution {
    /// The save succeeded and the editor closed.
    Closed,
    /// The save failed; the editor is still open with its draft.
    KeptOpen,
    /// The completion belonged to a save the editor no longer tracks.
    Stale,
}

/// The modal task editor.
#[derive(Debug, Default)]
pub struct Editor {
    session: Option<Session>,
    next_ticket: u64,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn mode(&self) -> Option<EditMode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn is_saving(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.saving.is_some())
    }

    pub fn draft(&self) -> Option<&Task> {
        self.session.as_ref().map(|s| &s.draft)
    }

    /// Open a blank draft.
    pub fn open_new(&mut self) -> Result<(), EditorError> {
        self.open(EditMode::New, Task::draft())
    }

    /// Open a copy of an existing task.
    pub fn open_existing(&mut self, task: &Task) -> Result<(), EditorError> {
        let id = task.id.ok_or(EditorError::MissingId)?;
        self.open(EditMode::Existing(id), task.clone())
    }

    fn open(&mut self, mode: EditMode, draft: Task) -> Result<(), EditorError> {
        if self.session.is_some() {
            return Err(EditorError::AlreadyOpen);
        }
        self.session = Some(Session { mode, draft, saving: None });
        Ok(())
    }

    /// Dismiss the editor, discarding the draft. An in-flight save is not
    /// aborted; its completion will be reported as stale.
    pub fn cancel(&mut self) -> bool {
        self.session.take().is_some()
    }

    fn draft_mut(&mut self) -> Result<&mut Task, EditorError> {
        self.session.as_mut().map(|s| &mut s.draft).ok_or(EditorError::Closed)
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), EditorError> {
        self.draft_mut()?.title = title.to_string();
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), EditorError> {
        self.draft_mut()?.description = Some(description.to_string());
        Ok(())
    }

    /// Set priority from raw text, coercing anything non-numeric to 0.
    pub fn set_priority_text(&mut self, text: &str) -> Result<i64, EditorError> {
        let priority = coerce_priority(text);
        self.draft_mut()?.priority = priority;
        Ok(priority)
    }

    pub fn set_status(&mut self, status: Status) -> Result<(), EditorError> {
        self.draft_mut()?.status = status;
        Ok(())
    }

    /// Move the status selector one step; `forward` cycles pending → on going → done.
    pub fn cycle_status(&mut self, forward: bool) -> Result<Status, EditorError> {
        let draft = self.draft_mut()?;
        draft.status = if forward { draft.status.next() } else { draft.status.prev() };
        Ok(draft.status)
    }

    pub fn set_due_date(&mut self, due: Option<Timestamp>) -> Result<(), EditorError> {
        self.draft_mut()?.due_date = due;
        Ok(())
    }

    /// Set the due date to local midnight of a picked calendar day.
    pub fn set_due_day(&mut self, day: NaiveDate) -> Result<(), EditorError> {
        self.set_due_date(Some(Timestamp::from_local_day(day)))
    }

    /// Start a save: marks the editor as saving and returns the call to make.
    pub fn begin_save(&mut self) -> Result<(SaveTicket, SaveRequest), EditorError> {
        let ticket = SaveTicket(self.next_ticket);
        let session = self.session.as_mut().ok_or(EditorError::Closed)?;
        if session.saving.is_some() {
            return Err(EditorError::SaveInFlight);
        }
        let request = match session.mode {
            EditMode::New => SaveRequest::Create(session.draft.clone()),
            EditMode::Existing(id) => SaveRequest::Update(id, session.draft.clone()),
        };
        session.saving = Some(ticket);
        self.next_ticket += 1;
        Ok((ticket, request))
    }

    /// Resolve a save started with `begin_save`.
    pub fn finish_save(&mut self, ticket: SaveTicket, succeeded: bool) -> SaveResolution {
        let current = self.session.as_ref().and_then(|s| s.saving);
        if current != Some(ticket) {
            return SaveResolution::Stale;
        }
        if succeeded {
            self.session = None;
            SaveResolution::Closed
        } else {
            if let Some(session) = self.session.as_mut() {
                session.saving = None;
            }
            SaveResolution::KeptOpen
        }
    }
}
