pub mod api;
pub mod config;
pub mod github;

#[cfg(test)]
pub mod testutils;

use crate::config::Config;
use crate::github::{GithubClient, IssueTracker};
use std::sync::Arc;

/// Read-only state shared by every handler. Built fully before the server
/// accepts its first connection, never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub latest_release: Option<String>,
    pub tracker: Arc<dyn IssueTracker>,
}

impl AppState {
    pub fn new(latest_release: Option<String>, tracker: Arc<dyn IssueTracker>) -> Self {
        AppState {
            latest_release,
            tracker,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("could not construct the issue tracker client: {0}")]
    Tracker(#[from] github::TrackerError),

    #[error(transparent)]
    Serve(#[from] api::ServeError),
}

pub async fn run(config: Config) -> Result<(), RunError> {
    let tracker: Arc<dyn IssueTracker> = Arc::new(GithubClient::new(config.github_token)?);
    let state = AppState::new(config.latest_release, tracker);

    api::serve(config.listener, state).await?;
    Ok(())
}
