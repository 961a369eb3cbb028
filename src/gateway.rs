//! REST gateway for the `/tasks` endpoint.
//!
//! Every operation is a single request/response round trip: no retry, no
//! timeout configuration and no auth header.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::GatewayError;
use crate::task::{Task, TaskId};

/// The boundary to the backend task service.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// `GET /tasks`
    async fn list(&self) -> Result<Vec<Task>, GatewayError>;
    /// `GET /tasks/{id}`
    async fn get(&self, id: TaskId) -> Result<Task, GatewayError>;
    /// `POST /tasks`
    async fn create(&self, task: &Task) -> Result<Task, GatewayError>;
    /// `PUT /tasks/{id}`
    async fn update(&self, id: TaskId, task: &Task) -> Result<Task, GatewayError>;
    /// `DELETE /tasks/{id}`
    async fn delete(&self, id: TaskId) -> Result<(), GatewayError>;
}

/// `TaskGateway` over HTTP with reqwest.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base: String,
}

impl HttpGateway {
    pub fn new(base: &Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(client: Client, base: &Url) -> Self {
        HttpGateway {
            client,
            base: base.as_str().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn item_url(&self, id: TaskId) -> String {
        format!("{}/{}", self.base, id)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<(reqwest::Response, String), GatewayError> {
        debug!(%method, %url, "sending request");
        let response = build(self.client.request(method.clone(), &url))
            .send()
            .await
            .map_err(|source| GatewayError::Transport { url: url.clone(), source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status { method, url, status });
        }
        Ok((response, url))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, GatewayError> {
        let (response, url) = self.send(method, url, build).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| GatewayError::Decode { url, source })
    }
}

#[async_trait]
impl TaskGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<Task>, GatewayError> {
        self.send_json(Method::GET, self.base.clone(), |r| r).await
    }

    async fn get(&self, id: TaskId) -> Result<Task, GatewayError> {
        self.send_json(Method::GET, self.item_url(id), |r| r).await
    }

    async fn create(&self, task: &Task) -> Result<Task, GatewayError> {
        self.send_json(Method::POST, self.base.clone(), |r| r.json(task)).await
    }

    async fn update(&self, id: TaskId, task: &Task) -> Result<Task, GatewayError> {
        self.send_json(Method::PUT, self.item_url(id), |r| r.json(task)).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), GatewayError> {
        self.send(Method::DELETE, self.item_url(id), |r| r).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};

    use crate::fields::Status;

    #[derive(Clone, Default)]
    struct Backend {
        tasks: Arc<Mutex<Vec<Value>>>,
        bodies: Arc<Mutex<Vec<(String, Value)>>>,
    }

    async fn list(State(b): State<Backend>) -> Json<Vec<Value>> {
        Json(b.tasks.lock().unwrap().clone())
    }

    async fn create(State(b): State<Backend>, Json(mut body): Json<Value>) -> Json<Value> {
        b.bodies.lock().unwrap().push(("POST".into(), body.clone()));
        let mut tasks = b.tasks.lock().unwrap();
        body["id"] = json!(tasks.len() as i64 + 1);
        tasks.push(body.clone());
        Json(body)
    }

    async fn fetch(State(b): State<Backend>, Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
        b.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t["id"] == json!(id))
            .cloned()
            .map(Json)
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn update(
        State(b): State<Backend>,
        Path(id): Path<i64>,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        b.bodies.lock().unwrap().push((format!("PUT {id}"), body.clone()));
        let mut tasks = b.tasks.lock().unwrap();
        let slot = tasks.iter_mut().find(|t| t["id"] == json!(id)).ok_or(StatusCode::NOT_FOUND)?;
        let mut updated = body;
        updated["id"] = json!(id);
        *slot = updated.clone();
        Ok(Json(updated))
    }

    async fn remove(State(b): State<Backend>, Path(id): Path<i64>) -> StatusCode {
        let mut tasks = b.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t["id"] != json!(id));
        if tasks.len() == before {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        }
    }

    async fn serve(backend: Backend) -> Url {
        let app = Router::new()
            .route("/tasks", get(list).post(create))
            .route("/tasks/:id", get(fetch).put(update).delete(remove))
            .with_state(backend);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/tasks")).unwrap()
    }

    #[tokio::test]
    async fn test_crud_round_trips_against_backend() {
        let backend = Backend::default();
        let gateway = HttpGateway::new(&serve(backend.clone()).await);

        assert!(gateway.list().await.unwrap().is_empty());

        let mut draft = Task::draft();
        draft.title = "B".into();
        draft.priority = 2;
        let created = gateway.create(&draft).await.unwrap();
        assert_eq!(created.id, Some(1));

        let mut edited = created.clone();
        edited.status = Status::OnGoing;
        let updated = gateway.update(1, &edited).await.unwrap();
        assert_eq!(updated.status, Status::OnGoing);
        assert_eq!(gateway.get(1).await.unwrap().status, Status::OnGoing);

        gateway.delete(1).await.unwrap();
        assert!(gateway.list().await.unwrap().is_empty());

        let bodies = backend.bodies.lock().unwrap().clone();
        assert_eq!(bodies[0].0, "POST");
        assert_eq!(
            bodies[0].1,
            json!({"title": "B", "description": "", "status": "pending", "priority": 2})
        );
        assert_eq!(bodies[1].0, "PUT 1");
        assert_eq!(bodies[1].1["status"], "on going");
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let gateway = HttpGateway::new(&serve(Backend::default()).await);
        let err = gateway.delete(42).await.unwrap_err();
        assert!(matches!(err, GatewayError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_failure() {
        // Bind then drop to get a port nothing is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let gateway = HttpGateway::new(&Url::parse(&format!("http://{addr}/tasks")).unwrap());
        assert!(matches!(gateway.list().await, Err(GatewayError::Transport { .. })));
    }

    #[test]
    fn test_item_url_ignores_trailing_slash() {
        let gateway = HttpGateway::new(&Url::parse("http://localhost:8000/tasks/").unwrap());
        assert_eq!(gateway.item_url(5), "http://localhost:8000/tasks/5");
        assert_eq!(gateway.base_url(), "http://localhost:8000/tasks");
    }
}
