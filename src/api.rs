use crate::AppState;
use crate::config::Listener as ListenerConfig;
use crate::github::{IssueRequest, TrackerError};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

const UPDATE_URL_DARWIN: &str = "https://ibm.biz/bluemixcode";
const UPDATE_URL_WIN32: &str = "https://ibm.biz/bluemixcode-win32";
const UPDATE_URL_UNSUPPORTED: &str = "https://ibm.biz/bluemix-os-notsupported";
const RELEASE_NOTES_URL: &str = "https://ibm.biz/bluemixcode-releasenotes";

const FEEDBACK_LABELS: [&str; 2] = ["feedback", "from_ide"];

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn serve(listener: ListenerConfig, state: AppState) -> Result<(), ServeError> {
    let addr = format!("{}:{}", listener.host, listener.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// The permissive CORS layer puts `Access-Control-Allow-Origin: *` on every
/// response, error responses included. `get` also serves HEAD with the body
/// stripped, which covers the liveness probes that only send HEAD.
pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route(
            "/api/update/{operating_system}/{quality}/{commit_id}",
            get(update),
        )
        .route("/api/feedback", post(feedback))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

async fn index() -> &'static str {
    "Nothing to see here"
}

#[derive(Deserialize, Debug)]
struct UpdateParams {
    operating_system: String,
    quality: String,
    commit_id: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum UpdateResponse {
    Available {
        url: &'static str,
        version: String,
        #[serde(rename = "releaseNotes")]
        release_notes: &'static str,
    },
    UpToDate {
        message: &'static str,
    },
}

impl UpdateResponse {
    fn up_to_date() -> Self {
        UpdateResponse::UpToDate {
            message: "Up to date",
        }
    }
}

impl IntoResponse for UpdateResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Total mapping from operating system token to download URL. Unknown tokens
/// get the not-supported landing page, never an error.
fn download_url(operating_system: &str) -> &'static str {
    match operating_system {
        "darwin" => UPDATE_URL_DARWIN,
        "win32" => UPDATE_URL_WIN32,
        _ => UPDATE_URL_UNSUPPORTED,
    }
}

async fn update(
    State(state): State<AppState>,
    Path(params): Path<UpdateParams>,
) -> UpdateResponse {
    // No configured release id disables the check entirely.
    let Some(latest) = state.latest_release.as_deref() else {
        return UpdateResponse::up_to_date();
    };

    if params.quality == "stable" && params.commit_id != latest {
        UpdateResponse::Available {
            url: download_url(&params.operating_system),
            version: latest.to_string(),
            release_notes: RELEASE_NOTES_URL,
        }
    } else {
        UpdateResponse::up_to_date()
    }
}

/// Client-sent labels are ignored; the forced pair is attached server-side.
#[derive(Deserialize, Debug)]
struct FeedbackBody {
    title: String,
    body: String,
}

#[derive(thiserror::Error, Debug)]
enum FeedbackError {
    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Unable to create feedback")]
    Submission(#[from] TrackerError),
}

impl IntoResponse for FeedbackError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

async fn feedback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, FeedbackError> {
    let feedback: FeedbackBody =
        serde_json::from_slice(&body).map_err(|_| FeedbackError::InvalidBody)?;

    let issue = IssueRequest {
        title: feedback.title,
        body: feedback.body,
        labels: FEEDBACK_LABELS.iter().map(|label| label.to_string()).collect(),
    };

    if let Err(err) = state.tracker.submit(&issue).await {
        tracing::error!(%err, title = %issue.title, "failed to create feedback issue");
        return Err(err.into());
    }

    Ok("Thanks For the Feedback")
}
