#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use training_client::backend::HttpTrainingApi;
use training_client::config::ClientConfig;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub route: &'static str,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
struct StubInner {
    replies: HashMap<&'static str, Vec<Reply>>,
    calls: Vec<Call>,
}

/// Scripted stand-in for the training backend. Unscripted routes answer 404.
#[derive(Clone, Default)]
pub struct StubBackend {
    inner: Arc<Mutex<StubInner>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, route: &'static str, status: u16, body: Value) -> &Self {
        self.replies(route, vec![Reply { status, body }])
    }

    /// Replies are handed out in order; the last one repeats.
    pub fn replies(&self, route: &'static str, replies: Vec<Reply>) -> &Self {
        self.inner.lock().unwrap().replies.insert(route, replies);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn routes_called(&self) -> Vec<&'static str> {
        self.calls().iter().map(|c| c.route).collect()
    }

    fn respond(&self, route: &'static str, uri: Uri, body: Bytes) -> Response {
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call {
            route,
            path: uri.path().to_string(),
            body,
        });

        let reply = match inner.replies.get_mut(route) {
            Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
            Some(queue) => queue.first().cloned(),
            None => None,
        };

        match reply {
            Some(Reply { status, body }) => {
                let status = StatusCode::from_u16(status).unwrap();
                if body.is_null() {
                    status.into_response()
                } else {
                    (status, Json(body)).into_response()
                }
            }
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

pub fn reply(status: u16, body: Value) -> Reply {
    Reply { status, body }
}

async fn handle(stub: StubBackend, route: &'static str, uri: Uri, body: Bytes) -> Response {
    stub.respond(route, uri, body)
}

/// Serves the stub on an ephemeral port and returns the API base URL.
pub async fn spawn_backend(stub: StubBackend) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route(
            "/api/users",
            get(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "users", uri, body)
            })
            .post(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "users:save", uri, body)
            }),
        )
        .route(
            "/api/users/{id}",
            get(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "users:get", uri, body)
            })
            .delete(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "users:delete", uri, body)
            }),
        )
        .route(
            "/api/training",
            get(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "training", uri, body)
            })
            .post(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "training:save", uri, body)
            }),
        )
        .route(
            "/api/training/{id}",
            get(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "training:get", uri, body)
            })
            .delete(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "training:delete", uri, body)
            }),
        )
        .route(
            "/api/allocations",
            get(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "allocations:list", uri, body)
            })
            .post(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "allocations:create", uri, body)
            }),
        )
        .route(
            "/api/allocations/{id}",
            get(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "allocations:get", uri, body)
            })
            .delete(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "allocations:delete", uri, body)
            }),
        )
        .route(
            "/api/login",
            post(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "login", uri, body)
            }),
        )
        .route(
            "/api/signup",
            post(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "signup", uri, body)
            }),
        )
        .route(
            "/api/user/available-programs/{user_id}",
            get(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "available", uri, body)
            }),
        )
        .route(
            "/api/user/my-trainings/{user_id}",
            get(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "my-trainings", uri, body)
            }),
        )
        .route(
            "/api/user/enroll",
            post(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "enroll:body", uri, body)
            }),
        )
        .route(
            "/api/user/enroll/{user_id}/{program_id}",
            post(|State(s): State<StubBackend>, uri: Uri, body: Bytes| {
                handle(s, "enroll:path", uri, body)
            }),
        )
        .with_state(stub);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}/api", addr)
}

pub fn config_for(api_url: &str) -> ClientConfig {
    ClientConfig {
        api_url: api_url.to_string(),
        storage_url: "sqlite::memory:".to_string(),
        fallback_to_all_trainings: true,
    }
}

pub fn http_api(api_url: &str) -> Arc<HttpTrainingApi> {
    Arc::new(HttpTrainingApi::new(&config_for(api_url)).expect("Failed to build http client"))
}

/// A base URL nothing is listening on.
pub async fn dead_backend_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

/// Answers every request with a 200 whose body stops short of its Content-Length.
pub async fn truncated_backend_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{\"success\":",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}/api", addr)
}
