//! In-process servers and doubles shared by the handler and client tests.

use crate::AppState;
use crate::github::{IssueRequest, IssueTracker, TrackerError};
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Issue tracker double that records submissions instead of calling GitHub.
#[derive(Default)]
pub struct MockTracker {
    fail: bool,
    submitted: Mutex<Vec<IssueRequest>>,
}

impl MockTracker {
    pub fn new() -> Self {
        MockTracker::default()
    }

    /// A tracker whose submissions always fail, as if the remote side were down.
    pub fn failing() -> Self {
        MockTracker {
            fail: true,
            ..MockTracker::default()
        }
    }

    pub fn submitted(&self) -> Vec<IssueRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    async fn submit(&self, issue: &IssueRequest) -> Result<(), TrackerError> {
        if self.fail {
            return Err(TrackerError::Rejected(StatusCode::BAD_GATEWAY));
        }
        self.submitted.lock().unwrap().push(issue.clone());
        Ok(())
    }
}

/// Serves the full application on an ephemeral port and returns its base URL.
pub async fn spawn_app(latest_release: Option<&str>, tracker: Arc<dyn IssueTracker>) -> String {
    let state = AppState::new(latest_release.map(String::from), tracker);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, crate::api::router(state))
            .await
            .expect("serve test app");
    });

    format!("http://{addr}")
}

#[derive(Clone)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Stand-in for the GitHub issues API. Answers every issue creation with the
/// configured status and keeps the received requests for inspection.
#[derive(Clone)]
pub struct FakeGithub {
    status: StatusCode,
    received: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeGithub {
    pub async fn spawn(status: StatusCode) -> (Self, String) {
        let fake = FakeGithub {
            status,
            received: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/repos/{org}/{repo}/issues", post(record_issue))
            .with_state(fake.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake github");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake github");
        });

        (fake, format!("http://{addr}"))
    }

    pub fn received(&self) -> Vec<RecordedRequest> {
        self.received.lock().unwrap().clone()
    }
}

async fn record_issue(
    State(fake): State<FakeGithub>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    fake.received
        .lock()
        .unwrap()
        .push(RecordedRequest { headers, body });

    fake.status
}
