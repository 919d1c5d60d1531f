use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{self, Token};
use crate::cascade;
use crate::config::ConfigStore;
use crate::error::CimonError;
use crate::model::ProjectId;
use crate::output::{self, ReportProgress};
use crate::providers::{self, GitHubClient, GitLabClient, WorkflowSource};
use crate::tui::{self, App, GitHubSession, GitLabSession, Theme};

#[derive(Parser)]
#[command(name = "cimon")]
#[command(author, version, about = "Terminal navigator for CI pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file [default: <config dir>/cimon/config.yaml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Browse configured GitLab projects interactively (default)
    Tui {
        #[arg(short, long, env = "GITLAB_TOKEN")]
        token: Option<String>,

        /// GitLab instance URL [default: from config]
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Print recent pipelines of a GitLab project and diagnose failed ones
    Pl {
        #[arg(short = 'P', long)]
        project: ProjectId,

        #[arg(short, long, env = "GITLAB_TOKEN")]
        token: Option<String>,

        #[arg(short, long)]
        url: Option<String>,

        /// Pipelines to fetch [default: from config]
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Browse GitHub Actions workflow runs of a repository
    Wf {
        /// Repository as owner/repo
        #[arg(short = 'R', long)]
        repo: String,

        #[arg(short, long, env = "GITHUB_TOKEN")]
        token: Option<String>,

        /// GitHub API URL [default: from config]
        #[arg(short, long)]
        url: Option<String>,

        /// Workflow runs to fetch [default: from config]
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Store GitLab and GitHub tokens in the config file
    Auth,
}

impl Cli {
    /// Whether the command takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self.command,
            None | Some(Commands::Tui { .. }) | Some(Commands::Wf { .. })
        )
    }

    fn open_store(&self) -> Result<ConfigStore> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => ConfigStore::default_path()?,
        };
        ConfigStore::open(&path)
            .with_context(|| format!("Failed to open config store at {}", path.display()))
    }

    async fn execute_tui(&self, token: Option<&str>, url: Option<&str>) -> Result<()> {
        let store = self.open_store()?;
        let token = require_token(token, store.token(), "GitLab", "GITLAB_TOKEN")?;
        let url = url.map_or_else(|| store.config().gitlab.base_url.clone(), str::to_owned);
        info!(
            "Opening navigator for {} project(s) on {url}",
            store.projects().len()
        );

        let client = GitLabClient::new(&url, Some(token))?;
        let app = App::gitlab(
            GitLabSession {
                source: Arc::new(client),
                store,
                base_url: url,
            },
            Theme::default(),
        );

        tokio::task::block_in_place(|| tui::run(app)).context("Terminal UI failed")
    }

    async fn execute_pl(
        &self,
        project: ProjectId,
        token: Option<&str>,
        url: Option<&str>,
        limit: Option<usize>,
    ) -> Result<()> {
        let store = self.open_store()?;
        let token = require_token(token, store.token(), "GitLab", "GITLAB_TOKEN")?;
        let url = url.map_or_else(|| store.config().gitlab.base_url.clone(), str::to_owned);
        let limit = limit.unwrap_or(store.config().gitlab.limit);
        let name = store
            .projects()
            .iter()
            .find(|p| p.id == project)
            .map_or_else(|| format!("project {project}"), |p| p.name.clone());

        info!("Collecting pipelines for {name} ({project}) from {url}");
        let client = GitLabClient::new(&url, Some(token))?;

        let progress = ReportProgress::start_fetching(&name);
        let entries = match providers::pipeline_entries(&client, project, limit).await {
            Ok(entries) => entries,
            Err(e) => {
                progress.abandon();
                return Err(e).with_context(|| format!("Failed to list pipelines of {name}"));
            }
        };

        let pipelines: Vec<_> = entries.iter().map(|e| e.pipeline.clone()).collect();
        let failed = cascade::failed_pipelines(&pipelines).len();
        let progress = progress.finish_fetching_start_cascade(failed);
        let report = cascade::resolve(&client, project, &pipelines).await;
        progress.finish_cascade();

        output::print_pipelines(&name, &entries);
        output::print_cascade(&report);
        Ok(())
    }

    async fn execute_wf(
        &self,
        repo: &str,
        token: Option<&str>,
        url: Option<&str>,
        limit: Option<usize>,
    ) -> Result<()> {
        let store = self.open_store()?;
        let token = require_token(token, store.github_token(), "GitHub", "GITHUB_TOKEN")?;
        let url = url.map_or_else(|| store.config().github.base_url.clone(), str::to_owned);
        let limit = limit.unwrap_or(store.config().github.limit);

        let client = GitHubClient::new(&url, Some(token))?;
        let runs = client
            .list_workflow_runs(repo, limit)
            .await
            .with_context(|| format!("Failed to list workflow runs of {repo}"))?;
        info!("Fetched {} workflow run(s) for {repo}", runs.len());

        let app = App::github(
            GitHubSession {
                source: Arc::new(client),
                repo: repo.to_string(),
                limit,
            },
            runs,
            Theme::default(),
        );

        tokio::task::block_in_place(|| tui::run(app)).context("Terminal UI failed")
    }

    fn execute_auth(&self) -> Result<()> {
        let mut store = self.open_store()?;
        let term = console::Term::stderr();

        eprint!("GitLab token (leave empty to keep current): ");
        let gitlab = term.read_secure_line()?;
        if !gitlab.trim().is_empty() {
            store.set_token(&gitlab)?;
            eprintln!("{}", output::dim("GitLab token saved"));
        }

        eprint!("GitHub token (leave empty to keep current): ");
        let github = term.read_secure_line()?;
        if !github.trim().is_empty() {
            store.set_github_token(&github)?;
            eprintln!("{}", output::dim("GitHub token saved"));
        }

        info!("Tokens written to {}", store.path().display());
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let command = self.command.clone().unwrap_or(Commands::Tui {
            token: std::env::var("GITLAB_TOKEN").ok(),
            url: None,
        });

        match &command {
            Commands::Tui { token, url } => {
                self.execute_tui(token.as_deref(), url.as_deref()).await
            }
            Commands::Pl {
                project,
                token,
                url,
                limit,
            } => {
                self.execute_pl(*project, token.as_deref(), url.as_deref(), *limit)
                    .await
            }
            Commands::Wf {
                repo,
                token,
                url,
                limit,
            } => {
                self.execute_wf(repo, token.as_deref(), url.as_deref(), *limit)
                    .await
            }
            Commands::Auth => self.execute_auth(),
        }
    }
}

fn require_token(
    explicit: Option<&str>,
    stored: Option<&str>,
    provider: &str,
    env: &str,
) -> Result<Token> {
    auth::resolve(explicit, stored).ok_or_else(|| {
        anyhow!(CimonError::Config(format!(
            "no {provider} token configured; pass --token, set {env} or run `cimon auth`"
        )))
    })
}
