//! Client-side task store.
//!
//! The store is a disposable projection of the server list: it is only ever
//! replaced wholesale, in server response order, and never patched locally.

use tracing::{info, warn};

use crate::error::GatewayError;
use crate::task::{Task, TaskId};

/// Ordered list of tasks as last returned by the server.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a fresh server response.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Apply the outcome of a list call.
    ///
    /// On success the list is replaced and its new length returned. On failure
    /// the previous list is kept, the error is logged and handed back.
    pub fn apply_refresh(
        &mut self,
        result: Result<Vec<Task>, GatewayError>,
    ) -> Result<usize, GatewayError> {
        match result {
            Ok(tasks) => {
                info!(count = tasks.len(), "task list refreshed");
                self.replace(tasks);
                Ok(self.len())
            }
            Err(e) => {
                warn!(error = %e, "task list refresh failed, keeping previous list");
                Err(e)
            }
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Get a task by ID.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == Some(id))
    }

    /// Position of a task in display order.
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == Some(id))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;

    fn task(id: TaskId, title: &str) -> Task {
        Task { id: Some(id), title: title.to_string(), ..Task::draft() }
    }

    #[test]
    fn test_replace_keeps_server_order() {
        let mut store = TaskStore::new();
        store.replace(vec![task(3, "C"), task(1, "A"), task(2, "B")]);
        let ids: Vec<_> = store.iter().filter_map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(store.position(1), Some(1));
        assert_eq!(store.get(2).map(|t| t.title.as_str()), Some("B"));
        assert_eq!(store.get(9), None);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_list() {
        let mut store = TaskStore::new();
        store.replace(vec![task(1, "A")]);
        let err = GatewayError::Status {
            method: reqwest::Method::GET,
            url: "http://localhost:8000/tasks".into(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert!(store.apply_refresh(Err(err)).is_err());
        assert_eq!(store.len(), 1);

        let mut done = task(2, "B");
        done.status = Status::Done;
        assert_eq!(store.apply_refresh(Ok(vec![done])).unwrap(), 1);
        assert_eq!(store.get(2).map(|t| t.status), Some(Status::Done));
        assert!(store.get(1).is_none());
    }
}
