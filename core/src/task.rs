//! Task records and their field types.
//!
//! A [`Task`] is the only entity the dashboard tracks. Its `id` and
//! `created_at` are fixed at creation; `completed_at` is present exactly when
//! `completed` is true. The only way to change text, priority, due date or
//! category is a [`TaskPatch`], which has no way to express the immutable or
//! completion fields.

use crate::error::ParseError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random `TaskId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TaskId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority
///
/// Ordered `Low < Medium < High`, so sorting by priority descending puts
/// high-priority tasks first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait
    Low,
    /// The default for new tasks
    Medium,
    /// Needs attention first
    High,
}

impl Priority {
    /// Lowercase name used in forms and filters
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseError::UnknownPriority(s.to_string())),
        }
    }
}

/// Task category
///
/// The four built-in categories cover the dashboard's defaults; any other
/// name is kept as [`Category::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    /// Work items (the default for new tasks)
    Work,
    /// Personal errands
    Personal,
    /// Health and fitness
    Health,
    /// Learning
    Education,
    /// A user-defined category
    Other(String),
}

impl Category {
    /// Name used for display and search matching
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Health => "health",
            Self::Education => "education",
            Self::Other(name) => name,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Work
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyCategory);
        }

        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "work" => Self::Work,
            "personal" => Self::Personal,
            "health" => Self::Health,
            "education" => Self::Education,
            _ => Self::Other(trimmed.to_string()),
        })
    }
}

impl TryFrom<String> for Category {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

/// A single trackable to-do item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Description of the task
    pub text: String,
    /// How urgent the task is
    pub priority: Priority,
    /// Day the task is due
    pub due_date: NaiveDate,
    /// Classification
    pub category: Category,
    /// Whether the task is completed
    pub completed: bool,
    /// When the task was completed (present iff `completed`)
    pub completed_at: Option<DateTime<Utc>>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new, not yet completed task
    #[must_use]
    pub fn new(
        id: TaskId,
        text: impl Into<String>,
        priority: Priority,
        due_date: NaiveDate,
        category: Category,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            priority,
            due_date,
            category,
            completed: false,
            completed_at: None,
            created_at,
        }
    }

    /// Whether the task is still open and was due before `today`
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date < today
    }

    /// Flips completion, stamping `now` when the task becomes completed
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
    }

    /// Replaces the fields present in `patch`, leaving the rest untouched
    pub fn apply_patch(&mut self, patch: TaskPatch) {
        let TaskPatch {
            text,
            priority,
            due_date,
            category,
        } = patch;

        if let Some(text) = text {
            self.text = text;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(due_date) = due_date {
            self.due_date = due_date;
        }
        if let Some(category) = category {
            self.category = category;
        }
    }
}

/// Partial field set for updating a task
///
/// Only the editable fields can appear here; `id`, `created_at` and the
/// completion fields are out of reach of an update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// New category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl TaskPatch {
    /// An empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the priority
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the due date
    #[must_use]
    pub const fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set the category
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Whether applying this patch would change nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.category.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Task {
        Task::new(
            TaskId::new(),
            "Write report",
            Priority::High,
            date(2024, 1, 10),
            Category::Work,
            Utc::now(),
        )
    }

    #[test]
    fn new_task_is_open() {
        let task = sample();
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn toggle_sets_and_clears_completed_at() {
        let mut task = sample();
        let now = Utc::now();

        task.toggle(now);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));

        task.toggle(now);
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn overdue_is_strictly_before_today() {
        let task = sample();
        assert!(task.is_overdue(date(2024, 1, 11)));
        assert!(!task.is_overdue(date(2024, 1, 10)));
        assert!(!task.is_overdue(date(2024, 1, 9)));
    }

    #[test]
    fn completed_task_is_never_overdue() {
        let mut task = sample();
        task.toggle(Utc::now());
        assert!(!task.is_overdue(date(2030, 1, 1)));
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut task = sample();
        let before = task.clone();

        task.apply_patch(TaskPatch::new().priority(Priority::Low));

        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.text, before.text);
        assert_eq!(task.due_date, before.due_date);
        assert_eq!(task.category, before.category);
        assert_eq!(task.id, before.id);
        assert_eq!(task.created_at, before.created_at);
    }

    #[test]
    fn empty_patch_is_identity() {
        let mut task = sample();
        let before = task.clone();
        assert!(TaskPatch::new().is_empty());
        task.apply_patch(TaskPatch::new());
        assert_eq!(task, before);
    }

    #[test]
    fn priority_orders_high_above_low() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" low ".parse::<Priority>(), Ok(Priority::Low));
        assert!(matches!(
            "urgent".parse::<Priority>(),
            Err(ParseError::UnknownPriority(_))
        ));
    }

    #[test]
    fn category_keeps_unknown_names() {
        assert_eq!("Education".parse::<Category>(), Ok(Category::Education));
        assert_eq!(
            "Gardening".parse::<Category>(),
            Ok(Category::Other("Gardening".to_string()))
        );
        assert_eq!("  ".parse::<Category>(), Err(ParseError::EmptyCategory));
    }

    #[test]
    fn task_serializes_with_camel_case_keys() {
        let mut task = sample();
        task.category = Category::Other("garden".to_string());
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["priority"], "high");
        assert_eq!(json["dueDate"], "2024-01-10");
        assert_eq!(json["category"], "garden");
        assert_eq!(json["completed"], false);
        assert!(json["completedAt"].is_null());

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }
}
