//! Delete confirmation.
//!
//! Deleting is a two-step flow: a request parks the task id, and only an
//! affirmative answer releases it. The TUI answers through its modal dialog;
//! the CLI asks on stdin through a `Confirmer`.

use std::io::{self, BufRead, Write};

use crate::task::TaskId;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// The user's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(yes: bool) -> Self {
        if yes {
            Confirmation::Accepted
        } else {
            Confirmation::Declined
        }
    }
}

/// A delete waiting for confirmation.
#[derive(Debug, Default)]
pub struct DeleteFlow {
    pending: Option<TaskId>,
}

impl DeleteFlow {
    /// Park a delete request; a newer request replaces an unanswered one.
    pub fn request(&mut self, id: TaskId) {
        self.pending = Some(id);
    }

    pub fn pending(&self) -> Option<TaskId> {
        self.pending
    }

    /// Answer the pending request. Returns the id to delete only when accepted.
    pub fn resolve(&mut self, answer: Confirmation) -> Option<TaskId> {
        let id = self.pending.take()?;
        match answer {
            Confirmation::Accepted => Some(id),
            Confirmation::Declined => None,
        }
    }
}

/// Something that can ask the user a yes/no question.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> Confirmation;
}

/// Always says yes (`--yes`).
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> Confirmation {
        Confirmation::Accepted
    }
}

/// Asks `[y/N]` on a line-oriented terminal. Anything but y/yes declines.
pub struct PromptConfirmer<R, W> {
    input: R,
    output: W,
}

impl PromptConfirmer<io::StdinLock<'static>, io::Stderr> {
    pub fn stdin() -> Self {
        PromptConfirmer { input: io::stdin().lock(), output: io::stderr() }
    }
}

impl<R: BufRead, W: Write> PromptConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        PromptConfirmer { input, output }
    }
}

impl<R: BufRead, W: Write> Confirmer for PromptConfirmer<R, W> {
    fn confirm(&mut self, prompt: &str) -> Confirmation {
        if write!(self.output, "{prompt} [y/N] ").and_then(|_| self.output.flush()).is_err() {
            return Confirmation::Declined;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes").into(),
            Err(_) => Confirmation::Declined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declined_delete_releases_nothing() {
        let mut flow = DeleteFlow::default();
        flow.request(5);
        assert_eq!(flow.pending(), Some(5));
        assert_eq!(flow.resolve(Confirmation::Declined), None);
        assert_eq!(flow.pending(), None);
    }

    #[test]
    fn test_accepted_delete_releases_id_once() {
        let mut flow = DeleteFlow::default();
        flow.request(5);
        assert_eq!(flow.resolve(Confirmation::Accepted), Some(5));
        assert_eq!(flow.resolve(Confirmation::Accepted), None);
    }

    #[test]
    fn test_prompt_confirmer() {
        let mut out = Vec::new();
        let answer = PromptConfirmer::new("yes\n".as_bytes(), &mut out).confirm(DELETE_PROMPT);
        assert_eq!(answer, Confirmation::Accepted);
        assert!(String::from_utf8(out).unwrap().ends_with("[y/N] "));

        let answer = PromptConfirmer::new("\n".as_bytes(), Vec::new()).confirm(DELETE_PROMPT);
        assert_eq!(answer, Confirmation::Declined);
        let answer = PromptConfirmer::new("".as_bytes(), Vec::new()).confirm(DELETE_PROMPT);
        assert_eq!(answer, Confirmation::Declined);
    }
}
