//! Input forms behind the Settings page.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::{CimonError, Result};
use crate::model::ProjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddProject,
    AddToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub masked: bool,
}

impl Field {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
        }
    }

    fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }

    /// Value as it should appear on screen.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Cancel,
}

/// Validated form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutput {
    Project { id: ProjectId, name: String },
    Token(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    kind: FormKind,
    fields: Vec<Field>,
    focus: usize,
}

impl Form {
    pub fn add_project() -> Self {
        Self {
            kind: FormKind::AddProject,
            fields: vec![Field::new("ProjectID"), Field::new("ProjectName")],
            focus: 0,
        }
    }

    pub fn add_token() -> Self {
        Self {
            kind: FormKind::AddToken,
            fields: vec![Field::masked("Token")],
            focus: 0,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn on_key(&mut self, key: KeyEvent) -> FormAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => FormAction::Cancel,
            KeyCode::Enter => FormAction::Submit,
            KeyCode::Char('s') if ctrl => FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len();
                FormAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
                FormAction::None
            }
            KeyCode::Backspace => {
                self.fields[self.focus].value.pop();
                FormAction::None
            }
            KeyCode::Char(c) if !ctrl => {
                self.fields[self.focus].value.push(c);
                FormAction::None
            }
            _ => FormAction::None,
        }
    }

    /// Validates the current input. Nothing is created on error.
    pub fn submit(&self) -> Result<FormOutput> {
        match self.kind {
            FormKind::AddProject => {
                let raw_id = self.fields[0].value.trim();
                let id = raw_id.parse::<ProjectId>().map_err(|_| {
                    CimonError::InvalidInput(format!("project ID must be numeric, got '{raw_id}'"))
                })?;
                let name = self.fields[1].value.trim();
                if name.is_empty() {
                    return Err(CimonError::InvalidInput("project name is empty".into()));
                }
                Ok(FormOutput::Project {
                    id,
                    name: name.to_string(),
                })
            }
            FormKind::AddToken => {
                let token = self.fields[0].value.trim();
                if token.is_empty() {
                    return Err(CimonError::InvalidInput("token is empty".into()));
                }
                Ok(FormOutput::Token(token.to_string()))
            }
        }
    }
}
