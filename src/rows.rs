//! Row building shared by the interactive pages and the CLI report.
//!
//! Rows are plain data: a label, a style hint resolved later against a theme,
//! and an optional reference to what the row stands for.

use std::collections::HashMap;

use crate::cascade::{CascadeOutcome, CascadeReport};
use crate::model::{
    Job, JobId, PipelineEntry, PipelineId, Project, ProjectId, Status, Step, WorkflowJob,
    WorkflowRun, WorkflowRunId,
};

const COMMIT_MESSAGE_MAX: usize = 60;
const JOB_NAME_MAX: usize = 50;
/// Lines of a failed job's log shown inline under the pipeline list.
pub const CASCADE_LOG_TAIL: usize = 40;
const SEPARATOR: &str = "─────────────────────";
const PROJECT_ICONS: [&str; 8] = ["🔧", "🏗️", "📦", "🌐", "🔬", "📱", "💻", "⚡"];

/// Symbolic actions carried by settings-style rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenSettings,
    AddProject,
    AddToken,
}

/// What a row stands for. `None` rows are decoration and cannot be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowRef {
    #[default]
    None,
    Project(ProjectId),
    Pipeline(PipelineId),
    Job(JobId),
    Workflow(WorkflowRunId),
    Action(Action),
}

impl RowRef {
    pub fn is_selectable(self) -> bool {
        !matches!(self, RowRef::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleHint {
    Title,
    Separator,
    Text,
    Muted,
    Accent,
    Loading,
    Error,
    Status(Status),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: String,
    pub hint: StyleHint,
    pub reference: RowRef,
}

impl Row {
    pub fn new(label: impl Into<String>, hint: StyleHint, reference: RowRef) -> Self {
        Self {
            label: label.into(),
            hint,
            reference,
        }
    }

    pub fn label(label: impl Into<String>, hint: StyleHint) -> Self {
        Self::new(label, hint, RowRef::None)
    }

    pub fn separator() -> Self {
        Self::label(SEPARATOR, StyleHint::Separator)
    }

    pub fn loading(what: &str) -> Self {
        Self::label(format!("⏳ Loading {what}..."), StyleHint::Loading)
    }

    pub fn error(what: &str, message: &str) -> Self {
        Self::label(
            format!("❌ Failed to load {what}: {message}"),
            StyleHint::Error,
        )
    }

    /// Same row with its reference removed.
    pub fn decorative(self) -> Self {
        Self {
            reference: RowRef::None,
            ..self
        }
    }
}

/// Cuts `text` to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// `65.4` → `1m 5s`; whole seconds, hours only when needed.
pub fn format_duration(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

/// Stable icon for a project, picked from its name.
pub fn project_icon(name: &str) -> &'static str {
    let hash: usize = name.chars().map(|c| c as usize).sum();
    PROJECT_ICONS[hash % PROJECT_ICONS.len()]
}

/// Removes ANSI escape sequences and carriage returns from job traces.
pub fn strip_ansi(text: &str) -> String {
    console::strip_ansi_codes(text).replace('\r', "")
}

pub fn home_rows(projects: &[Project]) -> Vec<Row> {
    let mut rows = vec![
        Row::new(
            " ⚙️  Settings",
            StyleHint::Accent,
            RowRef::Action(Action::OpenSettings),
        ),
        Row::separator(),
    ];
    rows.extend(projects.iter().map(|project| {
        Row::new(
            format!(" {}  {}", project_icon(&project.name), project.name),
            StyleHint::Text,
            RowRef::Project(project.id),
        )
    }));
    if projects.is_empty() {
        rows.push(Row::label(
            " No projects configured yet, add one under Settings",
            StyleHint::Muted,
        ));
    }
    rows
}

pub fn settings_rows() -> Vec<Row> {
    vec![
        Row::new(
            "Add new project",
            StyleHint::Text,
            RowRef::Action(Action::AddProject),
        ),
        Row::new(
            "Add new token",
            StyleHint::Text,
            RowRef::Action(Action::AddToken),
        ),
    ]
}

pub fn pipeline_row(entry: &PipelineEntry) -> Row {
    let pipeline = &entry.pipeline;
    let message = entry
        .commit
        .as_ref()
        .map(|c| c.message.trim().to_string())
        .unwrap_or_else(|| "unknown commit message".to_string());
    let message = truncate(message.lines().next().unwrap_or(""), COMMIT_MESSAGE_MAX);

    let mut label = format!(
        "{} Pipeline #{}: {}",
        pipeline.status.emoji(),
        pipeline.id,
        message
    );
    if let Some(short) = pipeline.short_sha() {
        label.push_str(&format!(" ({short})"));
    }

    Row::new(
        label,
        StyleHint::Status(pipeline.status),
        RowRef::Pipeline(pipeline.id),
    )
}

pub fn pipeline_rows(entries: &[PipelineEntry]) -> Vec<Row> {
    let mut rows = vec![Row::label(
        format!("🔧 Pipelines ({})", entries.len()),
        StyleHint::Title,
    )];
    rows.extend(entries.iter().map(pipeline_row));
    rows
}

fn job_stats(jobs: &[Job]) -> String {
    let mut counts: HashMap<Status, usize> = HashMap::new();
    for job in jobs {
        *counts.entry(job.status).or_default() += 1;
    }

    let parts: Vec<String> = [
        Status::Success,
        Status::Failed,
        Status::Running,
        Status::Pending,
        Status::Canceled,
    ]
    .into_iter()
    .filter_map(|status| {
        counts
            .get(&status)
            .map(|count| format!("{}{count}", status.emoji()))
    })
    .collect();

    if parts.is_empty() {
        "no jobs".to_string()
    } else {
        parts.join(" | ")
    }
}

pub fn job_row(job: &Job) -> Row {
    let mut label = format!("{} {}", job.status.emoji(), truncate(&job.name, JOB_NAME_MAX));
    if job.duration > 0.0 {
        label.push_str(&format!(" ({})", format_duration(job.duration)));
    }
    if !job.stage.is_empty() {
        label.push_str(&format!(" [{}]", job.stage));
    }
    Row::new(label, StyleHint::Status(job.status), RowRef::Job(job.id))
}

/// Jobs page body: title, a status summary when there are jobs, then one row
/// per job.
pub fn job_rows(jobs: &[Job]) -> Vec<Row> {
    let mut rows = vec![Row::label(
        format!("⚙️ Jobs ({})", jobs.len()),
        StyleHint::Title,
    )];
    if !jobs.is_empty() {
        rows.push(Row::label(
            format!("📊 Status: {}", job_stats(jobs)),
            StyleHint::Accent,
        ));
        rows.push(Row::separator());
    }
    rows.extend(jobs.iter().map(job_row));
    rows
}

pub fn log_rows(job_name: &str, text: &str) -> Vec<Row> {
    let clean = strip_ansi(text);
    let mut rows = vec![Row::label(format!("📜 Log of {job_name}"), StyleHint::Title)];
    if clean.trim().is_empty() {
        rows.push(Row::label("(empty log)", StyleHint::Muted));
    } else {
        rows.extend(clean.lines().map(|line| Row::label(line, StyleHint::Text)));
    }
    rows
}

fn log_tail_rows(text: &str, tail: usize) -> Vec<Row> {
    let clean = strip_ansi(text);
    let lines: Vec<&str> = clean.lines().collect();
    let start = lines.len().saturating_sub(tail);
    let mut rows = Vec::new();
    if start > 0 {
        rows.push(Row::label(
            format!("   … {start} earlier line(s) omitted"),
            StyleHint::Muted,
        ));
    }
    rows.extend(
        lines[start..]
            .iter()
            .map(|line| Row::label(format!("   {line}"), StyleHint::Muted)),
    );
    rows
}

/// Diagnostic rows appended below the pipeline list. Every row is decorative.
pub fn cascade_rows(report: &CascadeReport) -> Vec<Row> {
    if report.is_empty() {
        return Vec::new();
    }

    let mut rows = vec![
        Row::separator(),
        Row::label(
            format!("🩺 Diagnostics for {} failed pipeline(s)", report.entries.len()),
            StyleHint::Title,
        ),
    ];

    for entry in &report.entries {
        rows.push(Row::label(
            format!("Pipeline #{}", entry.pipeline),
            StyleHint::Accent,
        ));
        match &entry.outcome {
            CascadeOutcome::Diagnosed { jobs, log } => {
                rows.extend(job_rows(jobs).into_iter().map(Row::decorative));
                if let Some(log) = log {
                    rows.push(Row::label(
                        format!("📜 Log of {}", log.job_name),
                        StyleHint::Title,
                    ));
                    rows.extend(log_tail_rows(&log.text, CASCADE_LOG_TAIL));
                }
            }
            CascadeOutcome::JobsUnavailable { error } => {
                rows.push(Row::error("jobs", error));
            }
            CascadeOutcome::LogUnavailable { jobs, error, .. } => {
                rows.extend(job_rows(jobs).into_iter().map(Row::decorative));
                rows.push(Row::error("log", error));
            }
        }
    }
    rows
}

pub fn workflow_rows(runs: &[WorkflowRun]) -> Vec<Row> {
    let mut rows = vec![Row::label(
        format!("🐙 Workflow runs ({})", runs.len()),
        StyleHint::Title,
    )];
    rows.extend(runs.iter().enumerate().map(|(i, run)| {
        Row::new(
            format!("{:>2}  {}  {} {}", i + 1, run.title, run.status.emoji(), run.status),
            StyleHint::Status(run.status),
            RowRef::Workflow(run.id),
        )
    }));
    rows
}

pub fn workflow_job_rows(jobs: &[WorkflowJob]) -> Vec<Row> {
    let mut rows = vec![Row::label(
        format!("⚙️ Jobs ({})", jobs.len()),
        StyleHint::Title,
    )];
    rows.extend(jobs.iter().enumerate().map(|(i, job)| {
        Row::new(
            format!("{:>2}  {}  {} {}", i + 1, job.name, job.status.emoji(), job.status),
            StyleHint::Status(job.status),
            RowRef::Job(job.id),
        )
    }));
    rows
}

pub fn step_rows(steps: &[Step]) -> Vec<Row> {
    let mut rows = vec![Row::label(
        format!("🪜 Steps ({})", steps.len()),
        StyleHint::Title,
    )];
    rows.extend(steps.iter().enumerate().map(|(i, step)| {
        Row::label(
            format!("{:>2}  {}  {} {}", i + 1, step.name, step.status.emoji(), step.status),
            StyleHint::Status(step.status),
        )
    }));
    rows
}
