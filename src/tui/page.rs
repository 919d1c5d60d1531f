//! One full-screen view: its rows, selection, load state and key table.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::{Job, PipelineEntry, WorkflowJob, WorkflowRun};
use crate::rows::{self, Row, RowRef};

use super::form::{Form, FormAction};
use super::navigator::PageId;

const PAGE_STEP: usize = 10;

/// Data a page was last rendered from.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Pipelines(Vec<PipelineEntry>),
    Jobs(Vec<Job>),
    Log { job_name: String, text: String },
    Workflows(Vec<WorkflowRun>),
    WorkflowJobs(Vec<WorkflowJob>),
    Steps(WorkflowJob),
}

impl Payload {
    pub fn rows(&self) -> Vec<Row> {
        match self {
            Payload::Pipelines(entries) => rows::pipeline_rows(entries),
            Payload::Jobs(jobs) => rows::job_rows(jobs),
            Payload::Log { job_name, text } => rows::log_rows(job_name, text),
            Payload::Workflows(runs) => rows::workflow_rows(runs),
            Payload::WorkflowJobs(jobs) => rows::workflow_job_rows(jobs),
            Payload::Steps(job) => rows::step_rows(&job.visible_steps()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    None,
    Quit,
    Back,
    Refresh,
    Select(RowRef),
    Submit,
}

#[derive(Debug)]
pub struct Page {
    id: PageId,
    context: String,
    rows: Vec<Row>,
    cursor: usize,
    state: PageState,
    data: Option<Payload>,
    form: Option<Form>,
    /// Selection to restore once the next load lands.
    restore: RowRef,
    updated_at: Option<DateTime<Local>>,
}

impl Page {
    pub fn new(id: PageId, context: impl Into<String>) -> Self {
        Self {
            id,
            context: context.into(),
            rows: Vec::new(),
            cursor: 0,
            state: PageState::Idle,
            data: None,
            form: None,
            restore: RowRef::None,
            updated_at: None,
        }
    }

    /// A page whose rows are known up front.
    pub fn with_rows(id: PageId, context: impl Into<String>, rows: Vec<Row>) -> Self {
        let mut page = Self::new(id, context);
        page.set_rows(rows);
        page
    }

    pub fn with_form(id: PageId, form: Form, rows: Vec<Row>) -> Self {
        let mut page = Self::with_rows(id, "", rows);
        page.form = Some(form);
        page
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    pub fn cursor(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.cursor)
    }

    pub fn selected_reference(&self) -> RowRef {
        self.rows
            .get(self.cursor)
            .map(|row| row.reference)
            .unwrap_or_default()
    }

    /// Replaces the content with a placeholder, remembering the selection.
    pub fn begin_load(&mut self) {
        if self.state != PageState::Loading {
            self.restore = self.selected_reference();
        }
        self.rows = vec![Row::loading(&self.id.title().to_lowercase())];
        self.cursor = 0;
        self.state = PageState::Loading;
    }

    pub fn finish(&mut self, payload: Payload) {
        let rows = payload.rows();
        self.data = Some(payload);
        self.set_rows(rows);
    }

    pub fn fail(&mut self, message: &str) {
        self.rows = vec![Row::error(&self.id.title().to_lowercase(), message)];
        self.cursor = 0;
        self.state = PageState::Failed(message.to_string());
        self.restore = RowRef::None;
    }

    /// Swaps in a fresh row set, keeping focus on the same entity if present.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        let focus = match self.restore {
            RowRef::None => self.selected_reference(),
            restore => restore,
        };
        self.rows = rows;
        self.cursor = self
            .position_of(focus)
            .or_else(|| self.first_selectable())
            .unwrap_or(0);
        self.state = PageState::Ready;
        self.restore = RowRef::None;
        self.updated_at = Some(Local::now());
    }

    pub fn append(&mut self, rows: Vec<Row>) {
        self.rows.extend(rows);
    }

    fn position_of(&self, reference: RowRef) -> Option<usize> {
        if !reference.is_selectable() {
            return None;
        }
        self.rows.iter().position(|row| row.reference == reference)
    }

    fn first_selectable(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.reference.is_selectable())
    }

    fn last_selectable(&self) -> Option<usize> {
        self.rows.iter().rposition(|row| row.reference.is_selectable())
    }

    fn has_selectable(&self) -> bool {
        self.first_selectable().is_some()
    }

    /// Moves the cursor `steps` selectable rows down (or up). Pages without
    /// selectable rows scroll line by line instead.
    pub fn move_by(&mut self, steps: usize, down: bool) {
        if self.rows.is_empty() {
            return;
        }

        if !self.has_selectable() {
            let last = self.rows.len() - 1;
            self.cursor = if down {
                (self.cursor + steps).min(last)
            } else {
                self.cursor.saturating_sub(steps)
            };
            return;
        }

        for _ in 0..steps {
            let next = if down {
                (self.cursor + 1..self.rows.len()).find(|&i| self.rows[i].reference.is_selectable())
            } else {
                (0..self.cursor)
                    .rev()
                    .find(|&i| self.rows[i].reference.is_selectable())
            };
            match next {
                Some(i) => self.cursor = i,
                None => break,
            }
        }
    }

    pub fn move_to_top(&mut self) {
        self.cursor = self.first_selectable().unwrap_or(0);
    }

    pub fn move_to_bottom(&mut self) {
        self.cursor = self
            .last_selectable()
            .unwrap_or_else(|| self.rows.len().saturating_sub(1));
    }

    /// Page-scoped key table. Cursor movement is handled in place.
    pub fn on_key(&mut self, key: KeyEvent) -> PageAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return PageAction::Quit;
        }

        if let Some(form) = self.form.as_mut() {
            return match form.on_key(key) {
                FormAction::Submit => PageAction::Submit,
                FormAction::Cancel => PageAction::Back,
                FormAction::None => PageAction::None,
            };
        }

        let root = self.id.is_root();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc if root => PageAction::Quit,
            KeyCode::Char('b') | KeyCode::Esc if !root => PageAction::Back,
            KeyCode::Char('r') => PageAction::Refresh,
            KeyCode::Enter => PageAction::Select(self.selected_reference()),
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_by(1, true);
                PageAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_by(1, false);
                PageAction::None
            }
            KeyCode::PageDown => {
                self.move_by(PAGE_STEP, true);
                PageAction::None
            }
            KeyCode::PageUp => {
                self.move_by(PAGE_STEP, false);
                PageAction::None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.move_to_top();
                PageAction::None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.move_to_bottom();
                PageAction::None
            }
            _ => PageAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::{job, pipeline};
    use crate::rows::StyleHint;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn jobs_page(jobs: Vec<Job>) -> Page {
        let mut page = Page::new(PageId::Jobs, "Pipeline #100");
        page.begin_load();
        page.finish(Payload::Jobs(jobs));
        page
    }

    #[test]
    fn test_loading_placeholder() {
        let mut page = Page::new(PageId::Pipelines, "api");
        page.begin_load();

        assert_eq!(page.state(), &PageState::Loading);
        assert_eq!(page.rows().len(), 1);
        assert_eq!(page.rows()[0].hint, StyleHint::Loading);
    }

    #[test]
    fn test_initial_selection_skips_decoration() {
        let page = jobs_page(vec![job(1, "build", "failed"), job(2, "test", "success")]);

        assert_eq!(page.cursor(), Some(3));
        assert_eq!(page.selected_reference(), RowRef::Job(1));
    }

    #[test]
    fn test_cursor_moves_between_selectable_rows_only() {
        let mut page = jobs_page(vec![job(1, "build", "failed"), job(2, "test", "success")]);

        page.on_key(key(KeyCode::Up));
        assert_eq!(page.selected_reference(), RowRef::Job(1));
        page.on_key(key(KeyCode::Down));
        assert_eq!(page.selected_reference(), RowRef::Job(2));
        page.on_key(key(KeyCode::Down));
        assert_eq!(page.selected_reference(), RowRef::Job(2));
        page.on_key(key(KeyCode::Char('g')));
        assert_eq!(page.selected_reference(), RowRef::Job(1));
    }

    #[test]
    fn test_refresh_keeps_focus_on_same_entity() {
        let mut page = jobs_page(vec![job(1, "build", "failed"), job(2, "test", "success")]);
        page.on_key(key(KeyCode::Down));

        page.begin_load();
        page.finish(Payload::Jobs(vec![
            job(0, "prepare", "success"),
            job(1, "build", "failed"),
            job(2, "test", "success"),
        ]));

        assert_eq!(page.selected_reference(), RowRef::Job(2));
    }

    #[test]
    fn test_refresh_falls_back_when_entity_is_gone() {
        let mut page = jobs_page(vec![job(1, "build", "failed"), job(2, "test", "success")]);
        page.on_key(key(KeyCode::Down));

        page.begin_load();
        page.finish(Payload::Jobs(vec![job(5, "deploy", "manual")]));

        assert_eq!(page.selected_reference(), RowRef::Job(5));
    }

    #[test]
    fn test_failed_load_renders_error_row() {
        let mut page = Page::new(PageId::Pipelines, "api");
        page.begin_load();
        page.fail("API request failed (status 500): boom");

        assert!(matches!(page.state(), PageState::Failed(_)));
        assert_eq!(page.rows()[0].hint, StyleHint::Error);
        assert!(page.rows()[0].label.contains("boom"));
        assert_eq!(page.selected_reference(), RowRef::None);
    }

    #[test]
    fn test_pipelines_payload_keeps_snapshot() {
        let entry = PipelineEntry {
            pipeline: pipeline(100, "failed", "abc12345678"),
            commit: None,
        };
        let mut page = Page::new(PageId::Pipelines, "api");
        page.finish(Payload::Pipelines(vec![entry.clone()]));

        assert_eq!(page.data(), Some(&Payload::Pipelines(vec![entry])));
        assert_eq!(page.selected_reference(), RowRef::Pipeline(100));
    }

    #[test]
    fn test_key_table() {
        let mut home = Page::with_rows(PageId::Home, "", vec![]);
        assert_eq!(home.on_key(key(KeyCode::Char('q'))), PageAction::Quit);
        assert_eq!(home.on_key(key(KeyCode::Esc)), PageAction::Quit);
        assert_eq!(home.on_key(key(KeyCode::Char('b'))), PageAction::None);

        let mut jobs = jobs_page(vec![job(1, "build", "failed")]);
        assert_eq!(jobs.on_key(key(KeyCode::Char('b'))), PageAction::Back);
        assert_eq!(jobs.on_key(key(KeyCode::Esc)), PageAction::Back);
        assert_eq!(jobs.on_key(key(KeyCode::Char('q'))), PageAction::None);
        assert_eq!(jobs.on_key(key(KeyCode::Char('r'))), PageAction::Refresh);
        assert_eq!(
            jobs.on_key(key(KeyCode::Enter)),
            PageAction::Select(RowRef::Job(1))
        );
        assert_eq!(jobs.on_key(key(KeyCode::Char('x'))), PageAction::None);
        assert_eq!(
            jobs.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            PageAction::Quit
        );
    }

    #[test]
    fn test_log_page_scrolls_without_selection() {
        let mut page = Page::new(PageId::Log, "build");
        page.finish(Payload::Log {
            job_name: "build".to_string(),
            text: "a\nb\nc".to_string(),
        });

        page.on_key(key(KeyCode::End));
        assert_eq!(page.cursor(), Some(3));
        page.on_key(key(KeyCode::PageUp));
        assert_eq!(page.cursor(), Some(0));
        assert_eq!(
            page.on_key(key(KeyCode::Enter)),
            PageAction::Select(RowRef::None)
        );
    }

    #[test]
    fn test_form_page_routes_keys_to_form() {
        let mut page = Page::with_form(PageId::AddToken, Form::add_token(), vec![]);

        assert_eq!(page.on_key(key(KeyCode::Char('b'))), PageAction::None);
        assert_eq!(page.form().unwrap().fields()[0].value, "b");
        assert_eq!(page.on_key(key(KeyCode::Enter)), PageAction::Submit);
        assert_eq!(page.on_key(key(KeyCode::Esc)), PageAction::Back);
    }
}
