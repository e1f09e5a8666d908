//! Reducer logic for the task store.
//!
//! The store is an ordered sequence of tasks. New tasks are prepended; no
//! other ordering is maintained, so consumers sort for display through the
//! projection module. The reducer never fails: actions naming a task that
//! is not present are absorbed as no-ops.

use crate::effect::Effect;
use crate::environment::Clock;
use crate::reducer::Reducer;
use crate::task::{Task, TaskId, TaskPatch};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// Actions accepted by the task store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskAction {
    /// Prepend a fully-formed task (id and `created_at` already assigned)
    Add(Task),

    /// Replace the given fields of a task, keeping its position
    Update {
        /// Task to update
        id: TaskId,
        /// Fields to replace
        patch: TaskPatch,
    },

    /// Remove a task
    Delete {
        /// Task to remove
        id: TaskId,
    },

    /// Flip completion of a task
    Toggle {
        /// Task to toggle
        id: TaskId,
    },

    /// Replace the whole store contents (bulk load)
    ReplaceAll(Vec<Task>),
}

/// Ordered sequence of tasks held by the store
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    /// Creates an empty task list
    #[must_use]
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list holds no tasks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in store order
    #[must_use]
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    /// Iterate tasks in store order
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Returns a task by ID
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// Checks if a task exists
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == *id)
    }

    /// Applies `action` to a copy of this list and returns the copy
    ///
    /// `self` is left untouched; the returned list is the new state.
    #[must_use]
    pub fn apply(&self, action: TaskAction, clock: &dyn Clock) -> Self {
        let mut next = self.clone();
        next.reduce(action, clock);
        next
    }

    /// Returns whether the action changed anything
    fn reduce(&mut self, action: TaskAction, clock: &dyn Clock) -> bool {
        match action {
            TaskAction::Add(task) => {
                if self.contains(&task.id) {
                    tracing::debug!(id = %task.id, "Ignoring add: id already present");
                    return false;
                }
                self.tasks.insert(0, task);
                true
            },
            TaskAction::Update { id, patch } => {
                let Some(task) = self.get_mut(&id) else {
                    tracing::debug!(%id, "Ignoring update: no such task");
                    return false;
                };
                task.apply_patch(patch);
                true
            },
            TaskAction::Delete { id } => {
                let before = self.tasks.len();
                self.tasks.retain(|t| t.id != id);
                let removed = self.tasks.len() != before;
                if !removed {
                    tracing::debug!(%id, "Ignoring delete: no such task");
                }
                removed
            },
            TaskAction::Toggle { id } => {
                let Some(task) = self.get_mut(&id) else {
                    tracing::debug!(%id, "Ignoring toggle: no such task");
                    return false;
                };
                task.toggle(clock.now());
                true
            },
            TaskAction::ReplaceAll(tasks) => {
                self.tasks = tasks;
                true
            },
        }
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl FromIterator<Task> for TaskList {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// Environment dependencies for the task reducer
#[derive(Clone)]
pub struct TaskEnvironment {
    /// Clock for completion timestamps
    pub clock: Arc<dyn Clock>,
}

impl TaskEnvironment {
    /// Creates a new `TaskEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl std::fmt::Debug for TaskEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the task store
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskReducer;

impl TaskReducer {
    /// Creates a new `TaskReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for TaskReducer {
    type State = TaskList;
    type Action = TaskAction;
    type Environment = TaskEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let changed = state.reduce(action, env.clock.as_ref());
        tracing::trace!(changed, tasks = state.len(), "Task action reduced");

        SmallVec::new()
    }
}
