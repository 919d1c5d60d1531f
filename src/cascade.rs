//! Failure cascade: surfaces jobs and a log for every failed pipeline without
//! the operator having to drill down by hand.

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};

use crate::model::{Job, JobId, Pipeline, PipelineId, ProjectId};
use crate::providers::DataSource;

#[derive(Debug, Clone, PartialEq)]
pub struct JobLog {
    pub job: JobId,
    pub job_name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CascadeOutcome {
    /// Jobs fetched; `log` is `None` only when the pipeline had no jobs.
    Diagnosed { jobs: Vec<Job>, log: Option<JobLog> },
    JobsUnavailable { error: String },
    LogUnavailable {
        jobs: Vec<Job>,
        job: JobId,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeEntry {
    pub pipeline: PipelineId,
    pub outcome: CascadeOutcome,
}

impl CascadeEntry {
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            CascadeOutcome::Diagnosed { .. } => None,
            CascadeOutcome::JobsUnavailable { error } => Some(error),
            CascadeOutcome::LogUnavailable { error, .. } => Some(error),
        }
    }
}

/// Diagnostics for the failed pipelines of one load, in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeReport {
    pub entries: Vec<CascadeEntry>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.error().is_some()).count()
    }
}

/// Pipelines the cascade digs into, in the order they were loaded.
pub fn failed_pipelines(pipelines: &[Pipeline]) -> Vec<&Pipeline> {
    pipelines.iter().filter(|p| p.status.is_failure()).collect()
}

/// Runs the cascade over a loaded pipeline set.
///
/// Failed pipelines are diagnosed one after another in load order. Each gets
/// exactly one jobs fetch; the first job in API order (not the first *failed*
/// job) gets a log fetch. A failing fetch only affects the entry for its own
/// pipeline.
pub async fn resolve<S>(source: &S, project: ProjectId, pipelines: &[Pipeline]) -> CascadeReport
where
    S: DataSource + ?Sized,
{
    let failed = failed_pipelines(pipelines);
    if failed.is_empty() {
        debug!("No failed pipelines for project {project}, cascade skipped");
        return CascadeReport::default();
    }

    info!(
        "Resolving diagnostics for {} failed pipeline(s) in project {project}",
        failed.len()
    );

    let entries = stream::iter(failed)
        .then(|pipeline| diagnose(source, project, pipeline.id))
        .collect()
        .await;

    CascadeReport { entries }
}

async fn diagnose<S>(source: &S, project: ProjectId, pipeline: PipelineId) -> CascadeEntry
where
    S: DataSource + ?Sized,
{
    let jobs = match source.list_jobs(project, pipeline).await {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!("Cascade: jobs for pipeline {pipeline} unavailable: {e}");
            return CascadeEntry {
                pipeline,
                outcome: CascadeOutcome::JobsUnavailable {
                    error: e.to_string(),
                },
            };
        }
    };

    let Some(first) = jobs.first() else {
        debug!("Cascade: pipeline {pipeline} has no jobs");
        return CascadeEntry {
            pipeline,
            outcome: CascadeOutcome::Diagnosed { jobs, log: None },
        };
    };

    let (job, job_name) = (first.id, first.name.clone());
    let outcome = match source.get_log(project, job).await {
        Ok(text) => CascadeOutcome::Diagnosed {
            log: Some(JobLog {
                job,
                job_name,
                text,
            }),
            jobs,
        },
        Err(e) => {
            warn!("Cascade: log for job {job} of pipeline {pipeline} unavailable: {e}");
            CascadeOutcome::LogUnavailable {
                jobs,
                job,
                error: e.to_string(),
            }
        }
    };

    CascadeEntry { pipeline, outcome }
}
