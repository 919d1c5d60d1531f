//! Navigator controller: turns page actions into navigation, loads and
//! config writes, and applies deliveries coming back from the loader.

use std::collections::HashSet;
use std::sync::Arc;

use crossterm::event::KeyEvent;
use futures::future::{BoxFuture, FutureExt};
use log::{debug, error, info, warn};

use crate::auth::Token;
use crate::cascade::{self, CascadeReport};
use crate::config::ConfigStore;
use crate::error::{CimonError, Result};
use crate::model::{
    short_sha, JobId, Pipeline, PipelineId, Project, ProjectId, WorkflowRun, WorkflowRunId,
};
use crate::providers::{self, DataSource, GitLabClient, WorkflowSource};
use crate::rows::{self, Action, Row, RowRef, StyleHint};

use super::form::{Form, FormOutput};
use super::loader::{Delivery, Loader, Ticket};
use super::navigator::{Navigator, PageId};
use super::notice::{Notice, Notifier};
use super::page::{Page, PageAction, Payload};
use super::theme::Theme;

/// GitLab navigation rooted at Home.
pub struct GitLabSession {
    pub source: Arc<dyn DataSource>,
    pub store: ConfigStore,
    /// Instance the running client talks to; reused when the client is rebuilt.
    pub base_url: String,
}

/// GitHub Actions navigation rooted at one repository's workflow runs.
pub struct GitHubSession {
    pub source: Arc<dyn WorkflowSource>,
    pub repo: String,
    pub limit: usize,
}

enum Backend {
    GitLab(GitLabSession),
    GitHub(GitHubSession),
}

pub struct App {
    nav: Navigator<Page>,
    loader: Loader,
    notifier: Notifier,
    theme: Theme,
    backend: Backend,
    project: Option<Project>,
    pipeline: Option<PipelineId>,
    job: Option<(JobId, String)>,
    run: Option<WorkflowRunId>,
    step_job: Option<JobId>,
    refreshing: HashSet<PageId>,
    quit: bool,
}

impl App {
    fn with_backend(backend: Backend, theme: Theme) -> Self {
        let loader = Loader::default();
        let notifier = Notifier::new(loader.sender());
        Self {
            nav: Navigator::new(),
            loader,
            notifier,
            theme,
            backend,
            project: None,
            pipeline: None,
            job: None,
            run: None,
            step_job: None,
            refreshing: HashSet::new(),
            quit: false,
        }
    }

    pub fn gitlab(session: GitLabSession, theme: Theme) -> Self {
        let mut app = Self::with_backend(Backend::GitLab(session), theme);
        app.rebuild_home();
        app
    }

    /// Opens on the already fetched workflow runs of `session.repo`.
    pub fn github(session: GitHubSession, runs: Vec<WorkflowRun>, theme: Theme) -> Self {
        let context = session.repo.clone();
        let mut app = Self::with_backend(Backend::GitHub(session), theme);
        let mut page = Page::new(PageId::Workflows, context);
        page.finish(Payload::Workflows(runs));
        app.nav.push(PageId::Workflows, page);
        app
    }

    pub fn page(&self) -> Option<&Page> {
        self.nav.current()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notifier.current()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Titles from the root down to the visible page.
    pub fn breadcrumb(&self) -> Vec<&'static str> {
        let mut trail = Vec::new();
        let mut cursor = self.nav.visible();
        while let Some(id) = cursor {
            trail.push(id.title());
            cursor = id.parent();
        }
        trail.reverse();
        trail
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let Some(page) = self.nav.current_mut() else {
            self.quit = true;
            return;
        };
        let id = page.id();

        match page.on_key(key) {
            PageAction::None => {}
            PageAction::Quit => {
                info!("Quit requested from {id}");
                self.quit = true;
            }
            PageAction::Back => self.back(id),
            PageAction::Refresh => self.refresh(id),
            PageAction::Select(reference) => self.select(id, reference),
            PageAction::Submit => self.submit(id),
        }
    }

    /// Applies every delivery currently queued. Called once per UI tick.
    pub fn drain(&mut self) {
        while let Some(delivery) = self.loader.try_next() {
            self.apply(delivery);
        }
    }

    pub fn apply(&mut self, delivery: Delivery) {
        let Some(delivery) = self.loader.accept(delivery) else {
            return;
        };

        match delivery {
            Delivery::HideNotice { id } => self.notifier.hide(id),
            Delivery::Loaded { ticket, result } => self.on_loaded(ticket, result),
            Delivery::Cascade { ticket, report } => self.on_cascade(ticket, &report),
        }
    }

    fn on_loaded(&mut self, ticket: Ticket, result: Result<Payload>) {
        let refreshed = self.refreshing.remove(&ticket.page);
        let Some(page) = self.nav.get_mut(ticket.page) else {
            debug!("Delivery for unregistered {} ignored", ticket.page);
            return;
        };

        match result {
            Ok(payload) => {
                let failed: Vec<Pipeline> = match &payload {
                    Payload::Pipelines(entries) => entries
                        .iter()
                        .map(|e| e.pipeline.clone())
                        .filter(|p| p.status.is_failure())
                        .collect(),
                    _ => Vec::new(),
                };

                debug!("Loaded {} (generation {})", ticket.page, ticket.generation);
                page.finish(payload);
                if refreshed {
                    self.notifier.success(format!("{} refreshed", ticket.page));
                }

                if failed.is_empty() {
                    return;
                }
                if let (Backend::GitLab(session), Some(project)) = (&self.backend, &self.project) {
                    let source = Arc::clone(&session.source);
                    let project = project.id;
                    self.loader.follow_up(ticket, async move {
                        cascade::resolve(source.as_ref(), project, &failed).await
                    });
                }
            }
            Err(e) => {
                warn!("Loading {} failed: {e}", ticket.page);
                page.fail(&e.to_string());
                self.notifier
                    .error(format!("Failed to load {}", ticket.page.title().to_lowercase()));
            }
        }
    }

    fn on_cascade(&mut self, ticket: Ticket, report: &CascadeReport) {
        let Some(page) = self.nav.get_mut(ticket.page) else {
            return;
        };
        page.append(rows::cascade_rows(report));

        let errors = report.error_count();
        if errors > 0 {
            self.notifier
                .warn(format!("{errors} failed pipeline(s) could not be diagnosed"));
        }
    }

    fn back(&mut self, from: PageId) {
        if let Some(parent) = self.nav.back(from) {
            self.notifier.info(format!("Back to {parent}"));
        }
    }

    fn refresh(&mut self, id: PageId) {
        match id {
            PageId::Home => {
                self.rebuild_home();
                self.notifier.success("Projects reloaded");
            }
            PageId::Settings | PageId::AddProject | PageId::AddToken => {
                self.notifier.info("Nothing to refresh here");
            }
            _ => {
                self.notifier
                    .info(format!("Refreshing {}", id.title().to_lowercase()));
                self.refreshing.insert(id);
                self.load(id);
            }
        }
    }

    fn select(&mut self, from: PageId, reference: RowRef) {
        match reference {
            RowRef::None => self.notifier.warn("No data for this row"),
            RowRef::Action(Action::OpenSettings) => {
                let page = Page::with_rows(PageId::Settings, "", rows::settings_rows());
                self.nav.push(PageId::Settings, page);
            }
            RowRef::Action(Action::AddProject) => {
                let page = Page::with_form(
                    PageId::AddProject,
                    Form::add_project(),
                    self.configured_project_rows(),
                );
                self.nav.push(PageId::AddProject, page);
            }
            RowRef::Action(Action::AddToken) => {
                let page = Page::with_form(PageId::AddToken, Form::add_token(), Vec::new());
                self.nav.push(PageId::AddToken, page);
            }
            RowRef::Project(project) => self.open_pipelines(project),
            RowRef::Pipeline(pipeline) => self.open_jobs(pipeline),
            RowRef::Job(job) if from == PageId::WorkflowJobs => self.open_steps(job),
            RowRef::Job(job) => self.open_log(job),
            RowRef::Workflow(run) => self.open_workflow_jobs(run),
        }
    }

    fn open_pipelines(&mut self, id: ProjectId) {
        let Backend::GitLab(session) = &self.backend else {
            return;
        };
        let Some(project) = session.store.projects().iter().find(|p| p.id == id).cloned() else {
            self.notifier.warn(format!("Project {id} is no longer configured"));
            return;
        };

        self.discard(PageId::Jobs);
        self.discard(PageId::Log);
        self.notifier
            .info(format!("Loading pipelines for {}", project.name));
        let context = format!("{} {}", rows::project_icon(&project.name), project.name);
        self.project = Some(project);
        self.nav.push(PageId::Pipelines, Page::new(PageId::Pipelines, context));
        self.load(PageId::Pipelines);
    }

    fn open_jobs(&mut self, pipeline: PipelineId) {
        let mut context = format!("Pipeline #{pipeline}");
        let data = self.nav.get(PageId::Pipelines).and_then(Page::data);
        if let Some(Payload::Pipelines(entries)) = data {
            if let Some(entry) = entries.iter().find(|e| e.pipeline.id == pipeline) {
                context = with_link(context, &entry.pipeline.web_url);
            }
        }

        self.discard(PageId::Log);
        self.pipeline = Some(pipeline);
        self.nav.push(PageId::Jobs, Page::new(PageId::Jobs, context));
        self.load(PageId::Jobs);
    }

    fn open_log(&mut self, job: JobId) {
        let found = match self.nav.get(PageId::Jobs).and_then(Page::data) {
            Some(Payload::Jobs(jobs)) => jobs.iter().find(|j| j.id == job),
            _ => None,
        };
        let (name, context) = match found {
            Some(j) => (j.name.clone(), with_link(j.name.clone(), &j.web_url)),
            None => (format!("job {job}"), format!("job {job}")),
        };

        self.job = Some((job, name));
        self.nav.push(PageId::Log, Page::new(PageId::Log, context));
        self.load(PageId::Log);
    }

    fn open_workflow_jobs(&mut self, run: WorkflowRunId) {
        let found = match self.nav.get(PageId::Workflows).and_then(Page::data) {
            Some(Payload::Workflows(runs)) => runs.iter().find(|r| r.id == run),
            _ => None,
        };
        let context = match found {
            Some(r) => {
                let mut context = r.title.clone();
                if let Some(sha) = short_sha(&r.head_sha) {
                    context.push_str(&format!(" ({sha})"));
                }
                with_link(context, &r.web_url)
            }
            None => format!("run {run}"),
        };

        self.discard(PageId::Steps);
        self.run = Some(run);
        self.nav.push(
            PageId::WorkflowJobs,
            Page::new(PageId::WorkflowJobs, context),
        );
        self.load(PageId::WorkflowJobs);
    }

    fn open_steps(&mut self, job: JobId) {
        let found = match self.nav.get(PageId::WorkflowJobs).and_then(Page::data) {
            Some(Payload::WorkflowJobs(jobs)) => jobs.iter().find(|j| j.id == job).cloned(),
            _ => None,
        };
        let Some(job) = found else {
            self.notifier.warn(format!("Job {job} not found"));
            return;
        };

        let mut page = Page::new(PageId::Steps, job.name.clone());
        self.step_job = Some(job.id);
        page.finish(Payload::Steps(job));
        self.nav.push(PageId::Steps, page);
    }

    /// Drops a page together with any load still in flight for it.
    fn discard(&mut self, id: PageId) {
        self.loader.cancel(id);
        self.nav.remove(id);
        self.refreshing.remove(&id);
    }

    fn load(&mut self, id: PageId) {
        let Some(fetch) = self.fetcher(id) else {
            warn!("No fetch available for {id}");
            return;
        };
        if let Some(page) = self.nav.get_mut(id) {
            page.begin_load();
        }
        self.loader.load(id, fetch);
    }

    fn fetcher(&self, id: PageId) -> Option<BoxFuture<'static, Result<Payload>>> {
        match (&self.backend, id) {
            (Backend::GitLab(session), PageId::Pipelines) => {
                let source = Arc::clone(&session.source);
                let project = self.project.as_ref()?.id;
                let limit = session.store.config().gitlab.limit;
                Some(
                    async move {
                        providers::pipeline_entries(source.as_ref(), project, limit)
                            .await
                            .map(Payload::Pipelines)
                    }
                    .boxed(),
                )
            }
            (Backend::GitLab(session), PageId::Jobs) => {
                let source = Arc::clone(&session.source);
                let project = self.project.as_ref()?.id;
                let pipeline = self.pipeline?;
                Some(
                    async move {
                        source
                            .list_jobs(project, pipeline)
                            .await
                            .map(Payload::Jobs)
                    }
                    .boxed(),
                )
            }
            (Backend::GitLab(session), PageId::Log) => {
                let source = Arc::clone(&session.source);
                let project = self.project.as_ref()?.id;
                let (job, job_name) = self.job.clone()?;
                Some(
                    async move {
                        source
                            .get_log(project, job)
                            .await
                            .map(|text| Payload::Log { job_name, text })
                    }
                    .boxed(),
                )
            }
            (Backend::GitHub(session), PageId::Workflows) => {
                let source = Arc::clone(&session.source);
                let repo = session.repo.clone();
                let limit = session.limit;
                Some(
                    async move {
                        source
                            .list_workflow_runs(&repo, limit)
                            .await
                            .map(Payload::Workflows)
                    }
                    .boxed(),
                )
            }
            (Backend::GitHub(session), PageId::WorkflowJobs) => {
                let source = Arc::clone(&session.source);
                let repo = session.repo.clone();
                let run = self.run?;
                Some(
                    async move {
                        source
                            .list_job_runs(&repo, run)
                            .await
                            .map(Payload::WorkflowJobs)
                    }
                    .boxed(),
                )
            }
            (Backend::GitHub(session), PageId::Steps) => {
                let source = Arc::clone(&session.source);
                let repo = session.repo.clone();
                let run = self.run?;
                let job = self.step_job?;
                Some(
                    async move {
                        source
                            .list_job_runs(&repo, run)
                            .await?
                            .into_iter()
                            .find(|j| j.id == job)
                            .map(Payload::Steps)
                            .ok_or_else(|| {
                                CimonError::NotFound(format!("job {job} of run {run}"))
                            })
                    }
                    .boxed(),
                )
            }
            _ => None,
        }
    }

    fn submit(&mut self, id: PageId) {
        let Some(form) = self.nav.get(id).and_then(Page::form) else {
            return;
        };
        let output = match form.submit() {
            Ok(output) => output,
            Err(e) => {
                self.notifier.warn(e.to_string());
                return;
            }
        };

        let Backend::GitLab(session) = &mut self.backend else {
            return;
        };
        let saved = match output {
            FormOutput::Project { id, name } => session
                .store
                .add_project(id, &name)
                .map(|()| format!("Project {name} added")),
            FormOutput::Token(token) => session.store.set_token(&token).and_then(|()| {
                let client = GitLabClient::new(&session.base_url, Some(Token::from(token)))?;
                session.source = Arc::new(client);
                info!("GitLab client rebuilt with new token");
                Ok("Token saved".to_string())
            }),
        };

        match saved {
            Ok(message) => {
                self.nav.remove(id);
                self.rebuild_home();
                self.notifier.success(message);
            }
            Err(e) => {
                error!("Saving {id} failed: {e}");
                self.notifier.error(format!("Save failed: {e}"));
            }
        }
    }

    fn rebuild_home(&mut self) {
        let Backend::GitLab(session) = &self.backend else {
            return;
        };
        let projects = session.store.projects();
        let context = format!("{} project(s)", projects.len());
        let page = Page::with_rows(PageId::Home, context, rows::home_rows(projects));
        self.nav.remove(PageId::Home);
        self.nav.push(PageId::Home, page);
    }

    fn configured_project_rows(&self) -> Vec<Row> {
        let Backend::GitLab(session) = &self.backend else {
            return Vec::new();
        };
        let mut list = vec![Row::label("Configured projects", StyleHint::Title)];
        list.extend(session.store.projects().iter().map(|p| {
            Row::label(format!("  {}  {}", p.id, p.name), StyleHint::Muted)
        }));
        list
    }
}

fn with_link(label: String, url: &str) -> String {
    if url.is_empty() {
        label
    } else {
        format!("{label} · {url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Status, Step, WorkflowJob};
    use crate::providers::fake::{commit, job, pipeline, FakeSource};
    use crossterm::event::{KeyCode, KeyModifiers};
    use tempfile::TempDir;

    fn gitlab_app(source: FakeSource) -> (App, Arc<FakeSource>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::open(dir.path().join("config.yaml")).unwrap();
        store.add_project(42, "api").unwrap();
        let fake = Arc::new(source);
        let app = App::gitlab(
            GitLabSession {
                source: fake.clone(),
                store,
                base_url: "https://gitlab.example.com".to_string(),
            },
            Theme::default(),
        );
        (app, fake, dir)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    async fn settle(app: &mut App, deliveries: usize) {
        for _ in 0..deliveries {
            let delivery = app.loader.recv().await.unwrap();
            app.apply(delivery);
        }
    }

    fn labels(app: &App) -> Vec<String> {
        app.page()
            .unwrap()
            .rows()
            .iter()
            .map(|r| r.label.clone())
            .collect()
    }

    fn failing_source() -> FakeSource {
        let mut source = FakeSource::default();
        source
            .pipelines
            .insert(42, vec![pipeline(100, "failed", "abc12345678")]);
        source
            .commits
            .insert("abc12345678".to_string(), commit("abc12345678", "Fix login"));
        source.jobs.insert(100, vec![job(1, "build", "failed")]);
        source.logs.insert(1, "BUILD FAILED".to_string());
        source
    }

    fn open_api_pipelines(app: &mut App) {
        press(app, KeyCode::Down);
        press(app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::Pipelines));
    }

    #[tokio::test]
    async fn test_home_lists_settings_and_projects() {
        let (app, _, _dir) = gitlab_app(FakeSource::default());

        let page = app.page().unwrap();
        assert_eq!(page.id(), PageId::Home);
        assert_eq!(
            page.selected_reference(),
            RowRef::Action(Action::OpenSettings)
        );
        assert!(page.rows()[2].label.ends_with("api"));
        assert_eq!(app.breadcrumb(), vec!["Projects"]);
    }

    #[tokio::test]
    async fn test_failed_pipeline_cascade_scenario() {
        let (mut app, fake, _dir) = gitlab_app(failing_source());

        open_api_pipelines(&mut app);
        assert_eq!(app.page().unwrap().rows()[0].hint, StyleHint::Loading);

        settle(&mut app, 2).await;

        let page = app.page().unwrap();
        let pipeline_rows: Vec<&Row> = page
            .rows()
            .iter()
            .filter(|r| matches!(r.reference, RowRef::Pipeline(_)))
            .collect();
        assert_eq!(pipeline_rows.len(), 1);
        assert!(pipeline_rows[0].label.contains("(abc12345)"));
        assert!(pipeline_rows[0].label.contains("Fix login"));

        let all = labels(&app);
        assert!(all.iter().any(|l| l.contains("build")));
        assert!(all.iter().any(|l| l.contains("BUILD FAILED")));
        assert_eq!(fake.count("jobs:100"), 1);
        assert_eq!(fake.count("log:1"), 1);
        assert_eq!(page.selected_reference(), RowRef::Pipeline(100));
    }

    #[tokio::test]
    async fn test_empty_pipelines_show_header_and_skip_cascade() {
        let (mut app, fake, _dir) = gitlab_app(FakeSource::default());

        open_api_pipelines(&mut app);
        settle(&mut app, 1).await;

        assert_eq!(labels(&app), vec!["🔧 Pipelines (0)".to_string()]);
        assert_eq!(fake.count("jobs:"), 0);
        assert!(app.loader.try_next().is_none());
    }

    #[tokio::test]
    async fn test_jobs_error_reported_for_that_pipeline_only() {
        let mut source = FakeSource::default();
        source.pipelines.insert(
            42,
            vec![pipeline(10, "failed", ""), pipeline(20, "canceled", "")],
        );
        source.failing_jobs.push(10);
        source.jobs.insert(20, vec![job(2, "lint", "failed")]);
        source.logs.insert(2, "lint output".to_string());
        let (mut app, _, _dir) = gitlab_app(source);

        open_api_pipelines(&mut app);
        settle(&mut app, 2).await;

        let page = app.page().unwrap();
        assert!(page
            .rows()
            .iter()
            .any(|r| r.reference == RowRef::Pipeline(10)));
        assert!(page
            .rows()
            .iter()
            .any(|r| r.hint == StyleHint::Error && r.label.contains("jobs for 10")));
        assert!(labels(&app).iter().any(|l| l.contains("lint output")));
        assert!(app.notice().unwrap().message.contains("could not be diagnosed"));
    }

    #[tokio::test]
    async fn test_drill_down_to_log_and_back() {
        let (mut app, _, _dir) = gitlab_app(failing_source());
        open_api_pipelines(&mut app);
        settle(&mut app, 2).await;

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::Jobs));
        settle(&mut app, 1).await;
        assert_eq!(app.page().unwrap().selected_reference(), RowRef::Job(1));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::Log));
        settle(&mut app, 1).await;
        assert!(app.page().unwrap().context().starts_with("build · https://"));
        assert!(labels(&app).iter().any(|l| l == "BUILD FAILED"));
        assert_eq!(app.breadcrumb(), vec!["Projects", "Pipelines", "Jobs", "Log"]);

        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.nav.visible(), Some(PageId::Jobs));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.nav.visible(), Some(PageId::Pipelines));
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.nav.visible(), Some(PageId::Home));
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_refresh_discards_superseded_load() {
        let mut source = FakeSource::default();
        source
            .pipelines
            .insert(42, vec![pipeline(100, "success", "")]);
        let (mut app, fake, _dir) = gitlab_app(source);

        open_api_pipelines(&mut app);
        press(&mut app, KeyCode::Char('r'));

        let first = app.loader.recv().await.unwrap();
        let second = app.loader.recv().await.unwrap();
        let accepted: Vec<Delivery> = [first, second]
            .into_iter()
            .filter_map(|d| app.loader.accept(d))
            .collect();
        assert_eq!(accepted.len(), 1);
        assert!(matches!(
            accepted[0],
            Delivery::Loaded { ticket, .. } if ticket.generation == 2
        ));

        assert_eq!(fake.count("pipelines:42"), 2);
    }

    #[tokio::test]
    async fn test_refresh_reports_completion() {
        let mut source = FakeSource::default();
        source
            .pipelines
            .insert(42, vec![pipeline(100, "success", "")]);
        let (mut app, _, _dir) = gitlab_app(source);
        open_api_pipelines(&mut app);
        settle(&mut app, 1).await;

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.page().unwrap().rows()[0].hint, StyleHint::Loading);
        settle(&mut app, 1).await;

        assert_eq!(app.notice().unwrap().message, "Pipelines refreshed");
        assert_eq!(app.page().unwrap().selected_reference(), RowRef::Pipeline(100));
    }

    #[tokio::test]
    async fn test_load_error_renders_inline() {
        let mut source = failing_source();
        source.logs.clear();
        let (mut app, _, _dir) = gitlab_app(source);
        open_api_pipelines(&mut app);
        settle(&mut app, 2).await;
        press(&mut app, KeyCode::Enter);
        settle(&mut app, 1).await;

        press(&mut app, KeyCode::Enter);
        settle(&mut app, 1).await;

        let page = app.page().unwrap();
        assert_eq!(page.id(), PageId::Log);
        assert_eq!(page.rows()[0].hint, StyleHint::Error);
        assert!(page.rows()[0].label.contains("log for job 1"));
        assert_eq!(app.notice().unwrap().message, "Failed to load log");
    }

    #[tokio::test]
    async fn test_selecting_decoration_shows_notice() {
        let (mut app, _, _dir) = gitlab_app(FakeSource::default());
        open_api_pipelines(&mut app);
        settle(&mut app, 1).await;

        press(&mut app, KeyCode::Enter);

        assert_eq!(app.nav.visible(), Some(PageId::Pipelines));
        assert_eq!(app.notice().unwrap().message, "No data for this row");
    }

    #[tokio::test]
    async fn test_add_project_form_validates_then_rebuilds_home() {
        let (mut app, _, dir) = gitlab_app(FakeSource::default());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::Settings));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::AddProject));

        type_text(&mut app, "web");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "frontend");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::AddProject));
        assert!(app.notice().unwrap().message.contains("numeric"));

        for _ in 0.."frontend".len() {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Tab);
        for _ in 0.."web".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "7");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "web");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.nav.visible(), Some(PageId::Home));
        assert!(!app.nav.contains(PageId::AddProject));
        assert!(labels(&app).iter().any(|l| l.ends_with("web")));
        let reopened = ConfigStore::open(dir.path().join("config.yaml")).unwrap();
        assert_eq!(reopened.projects().len(), 2);
        assert_eq!(reopened.projects()[1].id, 7);
    }

    #[tokio::test]
    async fn test_add_token_stores_token() {
        let (mut app, _, dir) = gitlab_app(FakeSource::default());

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::AddToken));

        type_text(&mut app, "glpat-new");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.nav.visible(), Some(PageId::Home));
        let reopened = ConfigStore::open(dir.path().join("config.yaml")).unwrap();
        assert_eq!(reopened.token(), Some("glpat-new"));
    }

    #[tokio::test]
    async fn test_token_save_keeps_instance_url() {
        let mut server = mockito::Server::new_async().await;
        let pipelines = server
            .mock("GET", "/api/v4/projects/42/pipelines")
            .match_query(mockito::Matcher::Any)
            .match_header("PRIVATE-TOKEN", "glpat-new")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::open(dir.path().join("config.yaml")).unwrap();
        store.add_project(42, "api").unwrap();
        let mut app = App::gitlab(
            GitLabSession {
                source: Arc::new(FakeSource::default()),
                store,
                base_url: server.url(),
            },
            Theme::default(),
        );

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "glpat-new");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::Home));

        open_api_pipelines(&mut app);
        settle(&mut app, 1).await;

        pipelines.assert_async().await;
        assert_eq!(labels(&app), vec!["🔧 Pipelines (0)".to_string()]);
    }

    #[tokio::test]
    async fn test_form_escape_returns_to_settings() {
        let (mut app, _, _dir) = gitlab_app(FakeSource::default());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Esc);

        assert_eq!(app.nav.visible(), Some(PageId::Settings));
    }

    fn step(name: &str) -> Step {
        Step {
            name: name.to_string(),
            status: Status::Success,
        }
    }

    #[tokio::test]
    async fn test_github_workflow_drill_down() {
        let run = WorkflowRun {
            id: 11,
            title: "Add login".to_string(),
            status: Status::Failed,
            head_sha: "0123456789".to_string(),
            web_url: String::new(),
        };
        let mut source = FakeSource::default();
        source.run_jobs.insert(
            11,
            vec![WorkflowJob {
                id: 7,
                name: "test".to_string(),
                status: Status::Failed,
                steps: vec![step("Set up job"), step("cargo test"), step("Complete job")],
            }],
        );
        let fake = Arc::new(source);
        let mut app = App::github(
            GitHubSession {
                source: fake.clone(),
                repo: "octo/app".to_string(),
                limit: 5,
            },
            vec![run],
            Theme::default(),
        );

        assert_eq!(app.page().unwrap().selected_reference(), RowRef::Workflow(11));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::WorkflowJobs));
        assert_eq!(app.page().unwrap().context(), "Add login (01234567)");
        settle(&mut app, 1).await;

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::Steps));
        let steps = labels(&app);
        assert_eq!(steps.len(), 2);
        assert!(steps[1].contains("cargo test"));

        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.nav.visible(), Some(PageId::Workflows));
        press(&mut app, KeyCode::Char('r'));
        settle(&mut app, 1).await;
        assert_eq!(fake.count("runs:octo/app"), 1);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_steps_refresh_refetches_run_jobs() {
        let run = WorkflowRun {
            id: 11,
            title: "Add login".to_string(),
            status: Status::Failed,
            head_sha: String::new(),
            web_url: String::new(),
        };
        let mut source = FakeSource::default();
        source.run_jobs.insert(
            11,
            vec![WorkflowJob {
                id: 7,
                name: "test".to_string(),
                status: Status::Failed,
                steps: vec![step("Checkout"), step("cargo test")],
            }],
        );
        let fake = Arc::new(source);
        let mut app = App::github(
            GitHubSession {
                source: fake.clone(),
                repo: "octo/app".to_string(),
                limit: 5,
            },
            vec![run],
            Theme::default(),
        );
        press(&mut app, KeyCode::Enter);
        settle(&mut app, 1).await;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.nav.visible(), Some(PageId::Steps));

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.page().unwrap().rows()[0].hint, StyleHint::Loading);
        settle(&mut app, 1).await;

        assert_eq!(fake.count("run_jobs:11"), 2);
        let steps = labels(&app);
        assert_eq!(steps.len(), 3);
        assert!(steps[2].contains("cargo test"));
        assert_eq!(app.notice().unwrap().message, "Steps refreshed");
    }
}
