//! Wire shapes of the GitLab REST v4 responses.
//!
//! Fields GitLab may omit or null out are optional here and normalised when
//! converted into the domain records.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{Commit, Job, Pipeline, Status};

#[derive(Debug, Deserialize)]
pub struct PipelineNode {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobNode {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Seconds; `null` while the job has not run.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommitNode {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub committed_date: Option<DateTime<Utc>>,
}

impl From<PipelineNode> for Pipeline {
    fn from(node: PipelineNode) -> Self {
        Pipeline {
            id: node.id,
            status: node.status.as_deref().map(Status::parse).unwrap_or_default(),
            created_at: node.created_at,
            sha: node.sha.unwrap_or_default(),
            web_url: node.web_url.unwrap_or_default(),
        }
    }
}

impl From<JobNode> for Job {
    fn from(node: JobNode) -> Self {
        Job {
            id: node.id,
            name: node.name.unwrap_or_default(),
            stage: node.stage.unwrap_or_default(),
            status: node.status.as_deref().map(Status::parse).unwrap_or_default(),
            duration: node.duration.unwrap_or(0.0).max(0.0),
            web_url: node.web_url.unwrap_or_default(),
        }
    }
}

impl From<CommitNode> for Commit {
    fn from(node: CommitNode) -> Self {
        Commit {
            id: node.id,
            title: node.title.unwrap_or_default(),
            message: node.message.unwrap_or_default(),
            author_name: node.author_name.unwrap_or_default(),
            committed_at: node.committed_date,
        }
    }
}
