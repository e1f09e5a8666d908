//! Domain types for the dashboard feature.
//!
//! The dashboard owns everything around the task store that a user
//! interface needs: the editing session, the active filter, the debounced
//! search input and the last form validation failure.

use serde::{Deserialize, Serialize};
use taskboard_core::projection::TaskFilter;
use taskboard_core::search::SearchState;
use taskboard_core::store::{TaskAction, TaskList};
use taskboard_core::task::{Task, TaskId};
use taskboard_core::validation::{TaskDraft, ValidationErrors};

/// State of the task dashboard
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    /// The task store
    pub tasks: TaskList,
    /// Raw and effective search terms
    pub search: SearchState,
    /// Active status filter
    pub filter: TaskFilter,
    /// Task whose edit form is open, if any
    pub editing: Option<TaskId>,
    /// Validation failure of the last submitted form
    pub form_errors: Option<ValidationErrors>,
}

impl DashboardState {
    /// Creates an empty dashboard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dashboard over existing tasks
    #[must_use]
    pub fn with_tasks(tasks: impl Into<TaskList>) -> Self {
        Self {
            tasks: tasks.into(),
            ..Self::default()
        }
    }

    /// The task being edited
    #[must_use]
    pub fn editing_task(&self) -> Option<&Task> {
        self.editing.and_then(|id| self.tasks.get(&id))
    }

    /// Edit form pre-filled from the task being edited
    #[must_use]
    pub fn edit_draft(&self) -> Option<TaskDraft> {
        self.editing_task().map(TaskDraft::from_task)
    }
}

/// Actions the dashboard accepts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardAction {
    /// Validate a new-task form and add the task
    CreateTask {
        /// Submitted form
        draft: TaskDraft,
    },

    /// Open the edit form for a task
    StartEditing {
        /// Task to edit
        id: TaskId,
    },

    /// Close the edit form without saving
    CancelEditing,

    /// Validate the edit form and update the task being edited
    SaveEdit {
        /// Submitted form
        draft: TaskDraft,
    },

    /// Flip completion of a task
    ToggleTask {
        /// Task to toggle
        id: TaskId,
    },

    /// Remove a task
    DeleteTask {
        /// Task to remove
        id: TaskId,
    },

    /// Replace every task (bulk load)
    LoadTasks {
        /// New contents of the store
        tasks: Vec<Task>,
    },

    /// Search input changed
    SearchChanged {
        /// Text now in the search box
        query: String,
    },

    /// Debounce delay elapsed for a keystroke
    SearchApplied {
        /// Generation of the keystroke that scheduled this
        generation: u64,
    },

    /// Status filter changed
    FilterChanged {
        /// Newly selected filter
        filter: TaskFilter,
    },

    /// Task store action forwarded unchanged
    Task(TaskAction),
}
