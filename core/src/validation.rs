//! Form validation for task drafts.
//!
//! The task store trusts its inputs. Everything a form collects goes
//! through [`TaskDraft::validate`] first, and only a [`ValidDraft`] can be
//! turned into a task or an update patch.

use crate::task::{Category, Priority, Task, TaskId, TaskPatch};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form field a validation message belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// The task description
    Text,
    /// The due date
    DueDate,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::DueDate => "dueDate",
        })
    }
}

/// A single field-level validation message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field
    pub field: Field,
    /// Message to show next to the field
    pub message: String,
}

/// All validation failures of one draft
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[error("task draft is invalid: {}", summary(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Every field error, in field order
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for `field`, if it failed
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// What a task form collects, before validation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Task description as typed
    pub text: String,
    /// Selected priority
    pub priority: Priority,
    /// Due date as entered, `YYYY-MM-DD`
    pub due_date: String,
    /// Selected category
    pub category: Category,
}

impl TaskDraft {
    /// A fresh form: empty text, medium priority, work category, due today
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            due_date: today.format(DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    /// A form pre-filled from an existing task, for editing
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            text: task.text.clone(),
            priority: task.priority,
            due_date: task.due_date.format(DATE_FORMAT).to_string(),
            category: task.category.clone(),
        }
    }

    /// Set the description
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the priority
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the due date text
    #[must_use]
    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    /// Set the category
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Check every field, collecting all failures
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] when the description is blank or the due
    /// date is missing or not a `YYYY-MM-DD` date.
    pub fn validate(&self) -> Result<ValidDraft, ValidationErrors> {
        let mut errors = Vec::new();

        if self.text.trim().is_empty() {
            errors.push(FieldError {
                field: Field::Text,
                message: "Task description is required".to_string(),
            });
        }

        let due_date = match self.due_date.trim() {
            "" => {
                errors.push(FieldError {
                    field: Field::DueDate,
                    message: "Due date is required".to_string(),
                });
                None
            },
            raw => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError {
                        field: Field::DueDate,
                        message: "Due date must be a valid date (YYYY-MM-DD)".to_string(),
                    });
                    None
                },
            },
        };

        match due_date {
            Some(due_date) if errors.is_empty() => Ok(ValidDraft {
                text: self.text.clone(),
                priority: self.priority,
                due_date,
                category: self.category.clone(),
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

/// A draft that passed validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidDraft {
    text: String,
    priority: Priority,
    due_date: NaiveDate,
    category: Category,
}

impl ValidDraft {
    /// The validated description
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The parsed due date
    #[must_use]
    pub const fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Build a new task from this draft
    #[must_use]
    pub fn into_task(self, id: TaskId, created_at: DateTime<Utc>) -> Task {
        Task::new(
            id,
            self.text,
            self.priority,
            self.due_date,
            self.category,
            created_at,
        )
    }

    /// Patch replacing every editable field with this draft's values
    #[must_use]
    pub fn into_patch(self) -> TaskPatch {
        TaskPatch::new()
            .text(self.text)
            .priority(self.priority)
            .due_date(self.due_date)
            .category(self.category)
    }
}
