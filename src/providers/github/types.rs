use serde::Deserialize;

use crate::model::{Status, Step, WorkflowJob, WorkflowRun};

/// Response from GitHub API for workflow runs.
#[derive(Debug, Deserialize)]
pub struct WorkflowRunsResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub workflow_runs: Vec<GitHubWorkflowRun>,
}

/// Response from GitHub API for workflow jobs.
#[derive(Debug, Deserialize)]
pub struct WorkflowJobsResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub jobs: Vec<GitHubJob>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubWorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub head_sha: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubJob {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub steps: Vec<GitHubStep>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubStep {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
}

/// A finished run reports its outcome in `conclusion`; an unfinished one only
/// has `status`.
fn github_status(status: Option<&str>, conclusion: Option<&str>) -> Status {
    match conclusion.filter(|c| !c.is_empty()) {
        Some(conclusion) => Status::parse(conclusion),
        None => status.map(Status::parse).unwrap_or_default(),
    }
}

impl From<GitHubWorkflowRun> for WorkflowRun {
    fn from(run: GitHubWorkflowRun) -> Self {
        WorkflowRun {
            id: run.id,
            status: github_status(run.status.as_deref(), run.conclusion.as_deref()),
            title: run.display_title.or(run.name).unwrap_or_default(),
            head_sha: run.head_sha.unwrap_or_default(),
            web_url: run.html_url.unwrap_or_default(),
        }
    }
}

impl From<GitHubJob> for WorkflowJob {
    fn from(job: GitHubJob) -> Self {
        WorkflowJob {
            id: job.id,
            status: github_status(job.status.as_deref(), job.conclusion.as_deref()),
            name: job.name,
            steps: job.steps.into_iter().map(Step::from).collect(),
        }
    }
}

impl From<GitHubStep> for Step {
    fn from(step: GitHubStep) -> Self {
        Step {
            status: github_status(step.status.as_deref(), step.conclusion.as_deref()),
            name: step.name,
        }
    }
}
