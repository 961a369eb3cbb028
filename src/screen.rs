//! The task screen controller.
//!
//! `TaskScreen` owns the store, the editor and the delete flow. User actions
//! are plain methods that may hand back a `Job`; the caller performs the job
//! against a gateway (inline with `drive`, or in the background in the TUI)
//! and feeds the result to `complete`, which may ask for a follow-up job.

use tracing::{debug, error, info, warn};

use crate::confirm::{Confirmation, DeleteFlow};
use crate::editor::{Editor, SaveRequest, SaveResolution, SaveTicket};
use crate::error::{EditorError, GatewayError};
use crate::gateway::TaskGateway;
use crate::store::TaskStore;
use crate::task::{Task, TaskId};

/// Message shown when a delete fails.
pub const DELETE_FAILED: &str = "Could not delete the task.";

/// A gateway call requested by the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// Reload the list. Generations grow with every refresh the screen
    /// issues; a completion older than the last one applied is dropped.
    Refresh { generation: u64 },
    Save { ticket: SaveTicket, request: SaveRequest },
    Delete(TaskId),
}

/// What a successful job returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Listed(Vec<Task>),
    Saved(Task),
    Deleted,
}

/// Run one job against the gateway.
pub async fn perform(gateway: &dyn TaskGateway, job: &Job) -> Result<Completion, GatewayError> {
    match job {
        Job::Refresh { .. } => gateway.list().await.map(Completion::Listed),
        Job::Save { request: SaveRequest::Create(draft), .. } => {
            gateway.create(draft).await.map(Completion::Saved)
        }
        Job::Save { request: SaveRequest::Update(id, draft), .. } => {
            gateway.update(*id, draft).await.map(Completion::Saved)
        }
        Job::Delete(id) => gateway.delete(*id).await.map(|_| Completion::Deleted),
    }
}

/// Screen state: the list, the modal editor and any pending delete.
#[derive(Debug, Default)]
pub struct TaskScreen {
    store: TaskStore,
    editor: Editor,
    deletion: DeleteFlow,
    alert: Option<String>,
    refreshes_issued: u64,
    refresh_applied: u64,
}

impl TaskScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// The job to run when the screen first appears.
    pub fn mount(&mut self) -> Job {
        self.refresh()
    }

    /// A list reload, newer than every one issued before it.
    pub fn refresh(&mut self) -> Job {
        self.refreshes_issued += 1;
        Job::Refresh { generation: self.refreshes_issued }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Field edits go straight to the editor.
    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// The "add" action.
    pub fn open_new(&mut self) -> Result<(), EditorError> {
        self.editor.open_new()
    }

    /// Select a listed task for editing.
    pub fn open_task(&mut self, id: TaskId) -> Result<(), EditorError> {
        let task = self.store.get(id).ok_or(EditorError::UnknownTask(id))?;
        self.editor.open_existing(task)
    }

    /// Edit a task that is not (or not yet) in the local list.
    pub fn open_fetched(&mut self, task: &Task) -> Result<(), EditorError> {
        self.editor.open_existing(task)
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.editor.cancel()
    }

    /// Save the current draft.
    pub fn save(&mut self) -> Result<Job, EditorError> {
        let (ticket, request) = self.editor.begin_save()?;
        Ok(Job::Save { ticket, request })
    }

    /// First step of a delete: wait for confirmation.
    pub fn request_delete(&mut self, id: TaskId) {
        self.deletion.request(id);
    }

    pub fn pending_delete(&self) -> Option<TaskId> {
        self.deletion.pending()
    }

    /// Second step of a delete. Only an accepted answer yields a job.
    pub fn answer_delete(&mut self, answer: Confirmation) -> Option<Job> {
        let id = self.deletion.resolve(answer);
        if id.is_none() {
            info!("delete declined");
        }
        id.map(Job::Delete)
    }

    /// User-visible error, if any.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Apply the result of a job.
    ///
    /// Returns the follow-up job on success. A failure has already been
    /// handled here (logged, editor kept open, alert raised for deletes) and
    /// is handed back only so non-interactive callers can report it.
    pub fn complete(
        &mut self,
        job: Job,
        result: Result<Completion, GatewayError>,
    ) -> Result<Option<Job>, GatewayError> {
        match job {
            Job::Refresh { generation } if generation <= self.refresh_applied => {
                debug!(generation, latest = self.refresh_applied, "dropping stale list refresh");
                Ok(None)
            }
            Job::Refresh { generation } => {
                self.refresh_applied = generation;
                match result {
                    Ok(Completion::Listed(tasks)) => {
                        self.store.apply_refresh(Ok(tasks)).map(|_| None)
                    }
                    Ok(other) => {
                        warn!(?other, "unexpected completion for a list refresh");
                        Ok(None)
                    }
                    Err(e) => self.store.apply_refresh(Err(e)).map(|_| None),
                }
            }
            Job::Save { ticket, request } => {
                let kind = match request {
                    SaveRequest::Create(_) => "create",
                    SaveRequest::Update(..) => "update",
                };
                match result {
                    Ok(_) => {
                        if self.editor.finish_save(ticket, true) == SaveResolution::Stale {
                            info!(kind, "save finished after the editor was dismissed");
                        } else {
                            info!(kind, "task saved");
                        }
                        Ok(Some(self.refresh()))
                    }
                    Err(e) => {
                        error!(kind, error = %e, "save failed, editor stays open");
                        self.editor.finish_save(ticket, false);
                        Err(e)
                    }
                }
            }
            Job::Delete(id) => match result {
                Ok(_) => {
                    info!(id, "task deleted");
                    Ok(Some(self.refresh()))
                }
                Err(e) => {
                    error!(id, error = %e, "delete failed");
                    self.alert = Some(DELETE_FAILED.to_string());
                    Err(e)
                }
            },
        }
    }
}

/// Perform a job and every follow-up it triggers, in order.
///
/// Returns the error of the first job only; follow-up failures (a reload
/// after a successful save) are handled by the screen and logged.
pub async fn drive(
    screen: &mut TaskScreen,
    gateway: &dyn TaskGateway,
    job: Job,
) -> Result<(), GatewayError> {
    let result = perform(gateway, &job).await;
    let mut next = screen.complete(job, result)?;
    while let Some(job) = next.take() {
        let result = perform(gateway, &job).await;
        next = screen.complete(job, result).unwrap_or(None);
    }
    Ok(())
}
