//! Data source adapters for the supported CI providers.
//!
//! The navigator only talks to the traits below. Every method performs a
//! single request/response round-trip with no retry, and must be awaited from
//! a background task, never from the UI loop.

mod github;
mod gitlab;

use async_trait::async_trait;
use futures::future::join_all;
use log::warn;

use crate::error::Result;
use crate::model::{
    Commit, Job, JobId, Pipeline, PipelineEntry, PipelineId, ProjectId, WorkflowJob, WorkflowRun,
    WorkflowRunId,
};

pub use github::GitHubClient;
pub use gitlab::GitLabClient;

/// GitLab-shaped hierarchy: project → pipelines → jobs → log.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn list_pipelines(&self, project: ProjectId, limit: usize) -> Result<Vec<Pipeline>>;

    async fn list_jobs(&self, project: ProjectId, pipeline: PipelineId) -> Result<Vec<Job>>;

    async fn get_log(&self, project: ProjectId, job: JobId) -> Result<String>;

    async fn get_commit(&self, project: ProjectId, sha: &str) -> Result<Commit>;
}

/// GitHub-shaped hierarchy: repository → workflow runs → jobs → steps.
///
/// Steps arrive embedded in each job; see [`WorkflowJob::visible_steps`].
#[async_trait]
pub trait WorkflowSource: Send + Sync {
    async fn list_workflow_runs(&self, repo: &str, limit: usize) -> Result<Vec<WorkflowRun>>;

    async fn list_job_runs(&self, repo: &str, run: WorkflowRunId) -> Result<Vec<WorkflowJob>>;
}

/// Lists a project's pipelines and fetches their commits concurrently.
///
/// Only the pipeline listing can fail the call; a commit that cannot be
/// fetched leaves `commit` empty for that entry.
pub async fn pipeline_entries<S>(
    source: &S,
    project: ProjectId,
    limit: usize,
) -> Result<Vec<PipelineEntry>>
where
    S: DataSource + ?Sized,
{
    let pipelines = source.list_pipelines(project, limit).await?;

    let commits = join_all(pipelines.iter().map(|pipeline| async move {
        if pipeline.sha.is_empty() {
            return None;
        }
        match source.get_commit(project, &pipeline.sha).await {
            Ok(commit) => Some(commit),
            Err(e) => {
                warn!("Commit {} of pipeline {} unavailable: {e}", pipeline.sha, pipeline.id);
                None
            }
        }
    }))
    .await;

    Ok(pipelines
        .into_iter()
        .zip(commits)
        .map(|(pipeline, commit)| PipelineEntry { pipeline, commit })
        .collect())
}


#[cfg(test)]
pub mod fake {
    //! In-memory data source used by cascade, loader and app tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{DataSource, WorkflowSource};
    use crate::error::{CimonError, Result};
    use crate::model::{
        Commit, Job, JobId, Pipeline, PipelineId, ProjectId, Status, WorkflowJob, WorkflowRun,
        WorkflowRunId,
    };

    #[derive(Default)]
    pub struct FakeSource {
        pub pipelines: HashMap<ProjectId, Vec<Pipeline>>,
        pub jobs: HashMap<PipelineId, Vec<Job>>,
        pub failing_jobs: Vec<PipelineId>,
        pub logs: HashMap<JobId, String>,
        pub commits: HashMap<String, Commit>,
        pub runs: Vec<WorkflowRun>,
        pub run_jobs: HashMap<WorkflowRunId, Vec<WorkflowJob>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn record(&self, call: String) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    pub fn pipeline(id: PipelineId, status: &str, sha: &str) -> Pipeline {
        Pipeline {
            id,
            status: Status::parse(status),
            created_at: None,
            sha: sha.to_string(),
            web_url: format!("https://gitlab.example.com/p/-/pipelines/{id}"),
        }
    }

    pub fn job(id: JobId, name: &str, status: &str) -> Job {
        Job {
            id,
            name: name.to_string(),
            stage: "test".to_string(),
            status: Status::parse(status),
            duration: 0.0,
            web_url: format!("https://gitlab.example.com/p/-/jobs/{id}"),
        }
    }

    pub fn commit(sha: &str, message: &str) -> Commit {
        Commit {
            id: sha.to_string(),
            title: message.to_string(),
            message: message.to_string(),
            author_name: "dev".to_string(),
            committed_at: None,
        }
    }

    #[async_trait]
    impl DataSource for FakeSource {
        async fn list_pipelines(&self, project: ProjectId, limit: usize) -> Result<Vec<Pipeline>> {
            self.record(format!("pipelines:{project}"));
            let mut pipelines = self.pipelines.get(&project).cloned().unwrap_or_default();
            pipelines.truncate(limit);
            Ok(pipelines)
        }

        async fn list_jobs(&self, _project: ProjectId, pipeline: PipelineId) -> Result<Vec<Job>> {
            self.record(format!("jobs:{pipeline}"));
            tokio::task::yield_now().await;
            if self.failing_jobs.contains(&pipeline) {
                return Err(CimonError::Api {
                    status: 500,
                    message: format!("jobs for {pipeline} unavailable"),
                });
            }
            Ok(self.jobs.get(&pipeline).cloned().unwrap_or_default())
        }

        async fn get_log(&self, _project: ProjectId, job: JobId) -> Result<String> {
            self.record(format!("log:{job}"));
            self.logs
                .get(&job)
                .cloned()
                .ok_or_else(|| CimonError::NotFound(format!("log for job {job}")))
        }

        async fn get_commit(&self, _project: ProjectId, sha: &str) -> Result<Commit> {
            self.record(format!("commit:{sha}"));
            self.commits
                .get(sha)
                .cloned()
                .ok_or_else(|| CimonError::NotFound(format!("commit {sha}")))
        }
    }

    #[async_trait]
    impl WorkflowSource for FakeSource {
        async fn list_workflow_runs(&self, repo: &str, limit: usize) -> Result<Vec<WorkflowRun>> {
            self.record(format!("runs:{repo}"));
            Ok(self.runs.iter().take(limit).cloned().collect())
        }

        async fn list_job_runs(&self, _repo: &str, run: WorkflowRunId) -> Result<Vec<WorkflowJob>> {
            self.record(format!("run_jobs:{run}"));
            Ok(self.run_jobs.get(&run).cloned().unwrap_or_default())
        }
    }
}
