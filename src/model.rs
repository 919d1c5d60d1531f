//! Entity snapshots fetched from the CI providers.
//!
//! Every record here is an immutable copy of remote state at fetch time. A
//! refresh produces brand-new values; nothing is edited in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ProjectId = u64;
pub type PipelineId = u64;
pub type JobId = u64;
pub type WorkflowRunId = u64;

/// Step names GitHub injects around every job. They carry no user meaning.
pub const SENTINEL_STEPS: [&str; 2] = ["Set up job", "Complete job"];

const SHORT_SHA_LEN: usize = 8;

/// Closed status vocabulary shared by pipelines, jobs, workflow runs and steps.
///
/// Unrecognised strings map to `Unknown` instead of failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Success,
    Failed,
    Running,
    Pending,
    Canceled,
    Manual,
    Skipped,
    #[default]
    Unknown,
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "failed" | "failure" => Self::Failed,
            "running" | "in_progress" => Self::Running,
            "pending" | "queued" | "waiting" | "requested" | "created" => Self::Pending,
            "canceled" | "cancelled" => Self::Canceled,
            "manual" => Self::Manual,
            "skipped" => Self::Skipped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Running => "running",
            Self::Pending => "pending",
            Self::Canceled => "canceled",
            Self::Manual => "manual",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Failed => "❌",
            Self::Running => "🏃",
            Self::Pending => "⏳",
            Self::Canceled => "🚫",
            Self::Manual => "✋",
            Self::Skipped => "⤵️",
            Self::Unknown => "❔",
        }
    }

    /// Statuses the failure cascade digs into.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Canceled)
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitored GitLab project, as stored in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub id: PipelineId,
    pub status: Status,
    pub created_at: Option<DateTime<Utc>>,
    pub sha: String,
    pub web_url: String,
}

impl Pipeline {
    pub fn short_sha(&self) -> Option<&str> {
        short_sha(&self.sha)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub stage: String,
    pub status: Status,
    /// Seconds, never negative.
    pub duration: f64,
    pub web_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub id: String,
    pub title: String,
    pub message: String,
    pub author_name: String,
    pub committed_at: Option<DateTime<Utc>>,
}

impl Commit {
    pub fn short_id(&self) -> Option<&str> {
        short_sha(&self.id)
    }
}

/// A pipeline together with its lazily fetched source commit.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineEntry {
    pub pipeline: Pipeline,
    /// `None` when the commit lookup failed; the pipeline is still shown.
    pub commit: Option<Commit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub name: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRun {
    pub id: WorkflowRunId,
    pub title: String,
    pub status: Status,
    pub head_sha: String,
    pub web_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowJob {
    pub id: JobId,
    pub name: String,
    pub status: Status,
    pub steps: Vec<Step>,
}

impl WorkflowJob {
    /// Steps worth showing, in execution order.
    pub fn visible_steps(&self) -> Vec<Step> {
        filter_steps(&self.steps)
    }
}

/// First eight characters of a commit hash, or `None` for shorter input.
pub fn short_sha(sha: &str) -> Option<&str> {
    if sha.len() >= SHORT_SHA_LEN && sha.is_char_boundary(SHORT_SHA_LEN) {
        Some(&sha[..SHORT_SHA_LEN])
    } else {
        None
    }
}

/// Drops the provider's bookkeeping steps. Matching is exact and case-sensitive.
pub fn filter_steps(steps: &[Step]) -> Vec<Step> {
    steps
        .iter()
        .filter(|step| !SENTINEL_STEPS.contains(&step.name.as_str()))
        .cloned()
        .collect()
}
