//! Command implementations for the CLI interface.
//!
//! Every subcommand goes through the same `TaskScreen` controller as the
//! interactive UI, driving each job to completion on the runtime before
//! printing. The only differences are the confirmation source and that
//! failed saves are reported instead of leaving an editor open.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tokio::runtime::Runtime;
use tracing::info;

use crate::confirm::{Confirmer, DELETE_PROMPT};
use crate::editor::Editor;
use crate::fields::Status;
use crate::format::{parse_due_today, print_table, print_task};
use crate::gateway::TaskGateway;
use crate::screen::{drive, TaskScreen, DELETE_FAILED};
use crate::task::TaskId;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface (default).
    Ui,

    /// List all tasks in server order.
    List,

    /// View a single task by ID.
    View {
        /// Task ID to view
        id: TaskId,
    },

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Status: pending | on-going | done.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Priority; anything that is not a number counts as 0.
        #[arg(long, allow_hyphen_values = true)]
        priority: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "friday", or "in Nd".
        #[arg(long)]
        due: Option<String>,
    },

    /// Update fields on a task.
    Update {
        /// Task ID to update
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long, allow_hyphen_values = true)]
        priority: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "friday", or "in Nd".
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date.
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task after confirmation.
    Delete {
        /// Task ID to delete
        id: TaskId,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Field changes requested on the command line.
#[derive(Debug, Default, Clone)]
pub struct TaskEdits {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
}

impl TaskEdits {
    /// Apply the changes to the open draft.
    pub fn apply(&self, editor: &mut Editor) -> anyhow::Result<()> {
        if let Some(title) = &self.title {
            editor.set_title(title)?;
        }
        if let Some(desc) = &self.desc {
            editor.set_description(desc)?;
        }
        if let Some(status) = self.status {
            editor.set_status(status)?;
        }
        if let Some(priority) = &self.priority {
            editor.set_priority_text(priority)?;
        }
        if self.clear_due {
            editor.set_due_date(None)?;
        } else if let Some(due) = &self.due {
            let day = parse_due_today(due)
                .with_context(|| format!("could not understand due date '{due}'"))?;
            editor.set_due_day(day)?;
        }
        Ok(())
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(runtime: &Runtime, gateway: Arc<dyn TaskGateway>, log_file: &Path) -> anyhow::Result<()> {
    info!(log_file = %log_file.display(), "starting interactive screen");
    run_tui(runtime.handle().clone(), gateway).context("UI error")
}

/// Print the task table.
pub fn cmd_list(runtime: &Runtime, gateway: &dyn TaskGateway) -> anyhow::Result<()> {
    let mut screen = TaskScreen::new();
    let job = screen.mount();
    runtime
        .block_on(drive(&mut screen, gateway, job))
        .context("could not load the task list")?;
    if screen.store().is_empty() {
        println!("No tasks.");
    } else {
        print_table(screen.store().tasks());
    }
    Ok(())
}

/// Print one task.
pub fn cmd_view(runtime: &Runtime, gateway: &dyn TaskGateway, id: TaskId) -> anyhow::Result<()> {
    let task = runtime
        .block_on(gateway.get(id))
        .with_context(|| format!("could not load task #{id}"))?;
    print_task(&task);
    Ok(())
}

/// Create a task from a fresh draft.
pub fn cmd_add(
    runtime: &Runtime,
    gateway: &dyn TaskGateway,
    title: String,
    edits: TaskEdits,
) -> anyhow::Result<()> {
    let mut screen = TaskScreen::new();
    screen.open_new()?;
    screen.editor_mut().set_title(&title)?;
    edits.apply(screen.editor_mut())?;
    let job = screen.save()?;
    runtime
        .block_on(drive(&mut screen, gateway, job))
        .context("could not create the task")?;
    println!("Added task: {title}");
    Ok(())
}

/// Fetch a task, edit it as an existing draft and save it back.
pub fn cmd_update(
    runtime: &Runtime,
    gateway: &dyn TaskGateway,
    id: TaskId,
    edits: TaskEdits,
) -> anyhow::Result<()> {
    let task = runtime
        .block_on(gateway.get(id))
        .with_context(|| format!("could not load task #{id}"))?;
    let mut screen = TaskScreen::new();
    screen.open_fetched(&task)?;
    edits.apply(screen.editor_mut())?;
    let job = screen.save()?;
    runtime
        .block_on(drive(&mut screen, gateway, job))
        .with_context(|| format!("could not update task #{id}"))?;
    println!("Updated task #{id}");
    Ok(())
}

/// Delete a task once the confirmer agrees.
pub fn cmd_delete(
    runtime: &Runtime,
    gateway: &dyn TaskGateway,
    id: TaskId,
    confirmer: &mut dyn Confirmer,
) -> anyhow::Result<()> {
    let mut screen = TaskScreen::new();
    screen.request_delete(id);
    let answer = confirmer.confirm(DELETE_PROMPT);
    let Some(job) = screen.answer_delete(answer) else {
        println!("Aborted.");
        return Ok(());
    };
    if let Err(e) = runtime.block_on(drive(&mut screen, gateway, job)) {
        let message = screen.alert().unwrap_or(DELETE_FAILED).to_string();
        return Err(anyhow::Error::new(e).context(message));
    }
    println!("Deleted task #{id}");
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Reject a command line that would send nothing.
pub fn ensure_edits(edits: &TaskEdits) -> anyhow::Result<()> {
    let TaskEdits { title, desc, status, priority, due, clear_due } = edits;
    if title.is_none() && desc.is_none() && status.is_none() && priority.is_none() && due.is_none() && !clear_due {
        bail!("nothing to update; pass at least one field flag");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AssumeYes, Confirmation};
    use crate::screen::tests::{task, Call, FakeGateway};

    struct Refuse;

    impl Confirmer for Refuse {
        fn confirm(&mut self, _prompt: &str) -> Confirmation {
            Confirmation::Declined
        }
    }

    fn runtime() -> Runtime {
        Runtime::new().unwrap()
    }

    #[test]
    fn test_add_posts_once_then_lists() {
        let gateway = FakeGateway::default();
        let edits = TaskEdits { priority: Some("2".into()), ..Default::default() };
        cmd_add(&runtime(), &gateway, "B".into(), edits).unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::Create(t) if t.title == "B" && t.priority == 2));
        assert_eq!(calls[1], Call::List);
    }

    #[test]
    fn test_add_with_bad_due_sends_nothing() {
        let gateway = FakeGateway::default();
        let edits = TaskEdits { due: Some("someday".into()), ..Default::default() };
        assert!(cmd_add(&runtime(), &gateway, "B".into(), edits).is_err());
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_add_with_huge_due_offset_is_rejected() {
        let gateway = FakeGateway::default();
        let edits = TaskEdits { due: Some("in 100000000d".into()), ..Default::default() };
        let err = cmd_add(&runtime(), &gateway, "B".into(), edits).unwrap_err();
        assert_eq!(err.to_string(), "could not understand due date 'in 100000000d'");
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_failed_add_is_reported() {
        let gateway = FakeGateway::default();
        *gateway.fail_writes.lock().unwrap() = true;
        let err = cmd_add(&runtime(), &gateway, "B".into(), TaskEdits::default()).unwrap_err();
        assert_eq!(err.to_string(), "could not create the task");
    }

    #[test]
    fn test_update_fetches_then_puts_by_id() {
        let gateway = FakeGateway::with_tasks(vec![task(3, "C")]);
        let edits = TaskEdits { status: Some(Status::Done), clear_due: true, ..Default::default() };
        cmd_update(&runtime(), &gateway, 3, edits).unwrap();

        let calls = gateway.calls();
        assert_eq!(calls[0], Call::Get(3));
        assert!(matches!(&calls[1], Call::Update(3, t) if t.status == Status::Done && t.title == "C"));
        assert_eq!(calls[2], Call::List);
    }

    #[test]
    fn test_declined_delete_sends_nothing() {
        let gateway = FakeGateway::with_tasks(vec![task(5, "E")]);
        cmd_delete(&runtime(), &gateway, 5, &mut Refuse).unwrap();
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_confirmed_delete() {
        let gateway = FakeGateway::with_tasks(vec![task(5, "E")]);
        cmd_delete(&runtime(), &gateway, 5, &mut AssumeYes).unwrap();
        assert_eq!(gateway.calls(), vec![Call::Delete(5), Call::List]);
    }

    #[test]
    fn test_failed_delete_shows_message() {
        let gateway = FakeGateway::with_tasks(vec![task(5, "E")]);
        *gateway.fail_writes.lock().unwrap() = true;
        let err = cmd_delete(&runtime(), &gateway, 5, &mut AssumeYes).unwrap_err();
        assert_eq!(err.to_string(), DELETE_FAILED);
    }

    #[test]
    fn test_empty_update_is_rejected() {
        assert!(ensure_edits(&TaskEdits::default()).is_err());
        assert!(ensure_edits(&TaskEdits { clear_due: true, ..Default::default() }).is_ok());
    }
}
