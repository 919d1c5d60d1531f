use std::fmt::Write;

use comfy_table::Cell;

use crate::cascade::{CascadeOutcome, CascadeReport};
use crate::model::{Commit, Job, PipelineEntry};
use crate::rows::{self, job_rows, strip_ansi};

use super::styling::{self, bright, bright_red, dim};
use super::tables::{create_table, header, status_cell};

const MESSAGE_WIDTH: usize = 60;

/// Prints the fetched pipelines of one project as a table to stdout.
pub fn print_pipelines(project: &str, entries: &[PipelineEntry]) {
    println!("{}", render_pipelines(project, entries));
}

/// Prints each failed pipeline's jobs followed by the log of its first job.
pub fn print_cascade(report: &CascadeReport) {
    print!("{}", render_cascade(report));
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn render_pipelines(project: &str, entries: &[PipelineEntry]) -> String {
    let mut output = String::new();
    add_section_header(
        &mut output,
        "🔧",
        &format!("Pipelines of {project} ({})", entries.len()),
    );

    if entries.is_empty() {
        let _ = writeln!(output, "  {}", dim("No pipelines found"));
        return output;
    }

    let mut table = create_table();
    table.set_header(header(&[
        "Pipeline", "Status", "Commit", "Author", "Message", "Created", "Link",
    ]));
    for entry in entries {
        let pipeline = &entry.pipeline;
        let commit = entry.commit.as_ref();
        let message = commit
            .map(|c| c.title.trim().to_string())
            .unwrap_or_else(|| "unknown commit message".to_string());
        let created = pipeline
            .created_at
            .or_else(|| commit.and_then(|c| c.committed_at))
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let sha = commit
            .and_then(Commit::short_id)
            .or_else(|| pipeline.short_sha())
            .unwrap_or("-");

        table.add_row(vec![
            Cell::new(format!("#{}", pipeline.id)),
            status_cell(pipeline.status),
            Cell::new(sha),
            Cell::new(commit.map_or("-", |c| c.author_name.as_str())),
            Cell::new(rows::truncate(&message, MESSAGE_WIDTH)),
            Cell::new(created),
            Cell::new(&pipeline.web_url),
        ]);
    }
    let _ = writeln!(output, "{table}");
    output
}

fn render_cascade(report: &CascadeReport) -> String {
    let mut output = String::new();
    if report.is_empty() {
        let _ = writeln!(output, "{}", styling::bright_green("No failed pipelines ✓"));
        return output;
    }

    for entry in &report.entries {
        let _ = writeln!(output);
        add_section_header(
            &mut output,
            "🩺",
            &format!("Diagnostics for pipeline #{}", entry.pipeline),
        );

        match &entry.outcome {
            CascadeOutcome::Diagnosed { jobs, log } => {
                write_jobs(&mut output, jobs);
                match log {
                    Some(log) => {
                        let _ = writeln!(output);
                        add_section_header(&mut output, "📜", &format!("Log of {}", log.job_name));
                        let _ = writeln!(output, "{}", strip_ansi(&log.text).trim_end());
                    }
                    None => {
                        let _ = writeln!(output, "  {}", dim("Pipeline has no jobs, no log to show"));
                    }
                }
            }
            CascadeOutcome::JobsUnavailable { error } => {
                let _ = writeln!(output, "  {}", bright_red(format!("Failed to fetch jobs: {error}")));
            }
            CascadeOutcome::LogUnavailable { jobs, job, error } => {
                write_jobs(&mut output, jobs);
                let _ = writeln!(
                    output,
                    "  {}",
                    bright_red(format!("Failed to fetch log of job {job}: {error}"))
                );
            }
        }
    }

    if report.error_count() > 0 {
        let _ = writeln!(
            output,
            "\n{}",
            styling::bright_yellow(format!(
                "⚠️  {} pipeline(s) could not be fully diagnosed",
                report.error_count()
            ))
        );
    }
    output
}

fn write_jobs(output: &mut String, jobs: &[Job]) {
    for row in job_rows(jobs) {
        let _ = writeln!(output, "  {}", styling::row(&row));
    }
}
