use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;

use crate::auth::Token;
use crate::error::{CimonError, Result};
use crate::model::{WorkflowJob, WorkflowRun, WorkflowRunId};
use crate::providers::WorkflowSource;

use super::types::{WorkflowJobsResponse, WorkflowRunsResponse};

/// GitHub Actions REST client.
#[derive(Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    /// Creates a client against `base_url` (e.g. `https://api.github.com`).
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|e| CimonError::Config(format!("Invalid GitHub token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("cimon/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| CimonError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CimonError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// `owner/repo`, nothing more and nothing less.
fn validate_repo(repo: &str) -> Result<()> {
    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(CimonError::InvalidInput(format!(
            "Repository must be in format 'owner/repo', got '{repo}'"
        )));
    }
    Ok(())
}

#[async_trait]
impl WorkflowSource for GitHubClient {
    async fn list_workflow_runs(&self, repo: &str, limit: usize) -> Result<Vec<WorkflowRun>> {
        validate_repo(repo)?;
        let url = format!(
            "{}/repos/{}/actions/runs?per_page={}",
            self.base_url, repo, limit
        );

        let response: WorkflowRunsResponse = self.get_json(&url).await?;
        if response.total_count == 0 {
            warn!("No workflow runs found for {repo}");
        }

        let mut runs: Vec<WorkflowRun> = response
            .workflow_runs
            .into_iter()
            .map(WorkflowRun::from)
            .collect();
        runs.truncate(limit);
        Ok(runs)
    }

    async fn list_job_runs(&self, repo: &str, run: WorkflowRunId) -> Result<Vec<WorkflowJob>> {
        validate_repo(repo)?;
        let url = format!("{}/repos/{}/actions/runs/{}/jobs", self.base_url, repo, run);

        let response: WorkflowJobsResponse = self.get_json(&url).await?;
        if response.total_count == 0 {
            warn!("No jobs found for workflow run {run}");
        }

        Ok(response.jobs.into_iter().map(WorkflowJob::from).collect())
    }
}
