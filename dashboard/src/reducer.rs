//! Reducer logic for the dashboard.
//!
//! Form submissions are validated here, ids and timestamps are assigned from
//! the environment, and the resulting task changes are delegated to the
//! task store reducer. Search keystrokes schedule a debounced apply.

use crate::types::{DashboardAction, DashboardState};
use std::sync::Arc;
use std::time::Duration;
use taskboard_core::{
    SmallVec,
    effect::Effect,
    environment::{Calendar, Clock, IdGenerator},
    reducer::Reducer,
    search::{DEFAULT_DEBOUNCE, SEARCH_DEBOUNCE},
    store::{TaskAction, TaskEnvironment, TaskReducer},
    validation::TaskDraft,
};

/// Environment dependencies for the dashboard reducer
#[derive(Clone)]
pub struct DashboardEnvironment {
    /// Clock for creation and completion timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of ids for new tasks
    pub ids: Arc<dyn IdGenerator>,
    /// Day boundaries for "today"
    pub calendar: Calendar,
    /// Quiet period before a search keystroke applies
    pub search_debounce: Duration,
}

impl DashboardEnvironment {
    /// Creates an environment with UTC day boundaries and the default debounce
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            clock,
            ids,
            calendar: Calendar::utc(),
            search_debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Use `calendar` for day boundaries
    #[must_use]
    pub const fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Use `debounce` as the search quiet period
    #[must_use]
    pub const fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    /// Calendar day the clock currently reads
    #[must_use]
    pub fn today(&self) -> chrono::NaiveDate {
        self.calendar.today(self.clock.as_ref())
    }

    fn tasks(&self) -> TaskEnvironment {
        TaskEnvironment::new(Arc::clone(&self.clock))
    }
}

impl std::fmt::Debug for DashboardEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardEnvironment")
            .field("calendar", &self.calendar)
            .field("search_debounce", &self.search_debounce)
            .finish_non_exhaustive()
    }
}

/// Reducer for the dashboard
#[derive(Clone, Debug, Default)]
pub struct DashboardReducer {
    tasks: TaskReducer,
}

impl DashboardReducer {
    /// Creates a new `DashboardReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tasks: TaskReducer::new(),
        }
    }

    /// Runs a task store action and lifts its effects
    fn reduce_tasks(
        &self,
        state: &mut DashboardState,
        action: TaskAction,
        env: &DashboardEnvironment,
    ) -> SmallVec<[Effect<DashboardAction>; 4]> {
        self.tasks
            .reduce(&mut state.tasks, action, &env.tasks())
            .into_iter()
            .map(|effect| effect.map(DashboardAction::Task))
            .collect()
    }

    fn create_task(
        &self,
        state: &mut DashboardState,
        draft: &TaskDraft,
        env: &DashboardEnvironment,
    ) -> SmallVec<[Effect<DashboardAction>; 4]> {
        match draft.validate() {
            Ok(valid) => {
                state.form_errors = None;
                let task = valid.into_task(env.ids.next_id(), env.clock.now());
                tracing::debug!(id = %task.id, "Creating task");
                self.reduce_tasks(state, TaskAction::Add(task), env)
            },
            Err(errors) => {
                tracing::debug!(%errors, "Rejected new task");
                state.form_errors = Some(errors);
                SmallVec::new()
            },
        }
    }

    fn save_edit(
        &self,
        state: &mut DashboardState,
        draft: &TaskDraft,
        env: &DashboardEnvironment,
    ) -> SmallVec<[Effect<DashboardAction>; 4]> {
        let Some(id) = state.editing else {
            tracing::debug!("Save without an open edit form ignored");
            return SmallVec::new();
        };

        match draft.validate() {
            Ok(valid) => {
                state.editing = None;
                state.form_errors = None;
                let patch = valid.into_patch();
                self.reduce_tasks(state, TaskAction::Update { id, patch }, env)
            },
            Err(errors) => {
                tracing::debug!(%id, %errors, "Rejected task edit");
                state.form_errors = Some(errors);
                SmallVec::new()
            },
        }
    }

    /// Ends the editing session if its task no longer exists
    fn drop_stale_session(state: &mut DashboardState) {
        if let Some(id) = state.editing {
            if !state.tasks.contains(&id) {
                tracing::debug!(%id, "Edited task is gone, closing edit form");
                state.editing = None;
                state.form_errors = None;
            }
        }
    }
}

impl Reducer for DashboardReducer {
    type State = DashboardState;
    type Action = DashboardAction;
    type Environment = DashboardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Forms ==========
            DashboardAction::CreateTask { draft } => self.create_task(state, &draft, env),

            DashboardAction::StartEditing { id } => {
                if state.tasks.contains(&id) {
                    state.editing = Some(id);
                    state.form_errors = None;
                } else {
                    tracing::debug!(%id, "Edit requested for unknown task");
                }
                SmallVec::new()
            },

            DashboardAction::CancelEditing => {
                state.editing = None;
                state.form_errors = None;
                SmallVec::new()
            },

            DashboardAction::SaveEdit { draft } => self.save_edit(state, &draft, env),

            // ========== Task store ==========
            DashboardAction::ToggleTask { id } => {
                self.reduce_tasks(state, TaskAction::Toggle { id }, env)
            },

            DashboardAction::DeleteTask { id } => {
                let effects = self.reduce_tasks(state, TaskAction::Delete { id }, env);
                Self::drop_stale_session(state);
                effects
            },

            DashboardAction::LoadTasks { tasks } => {
                let effects = self.reduce_tasks(state, TaskAction::ReplaceAll(tasks), env);
                Self::drop_stale_session(state);
                effects
            },

            DashboardAction::Task(action) => {
                let effects = self.reduce_tasks(state, action, env);
                Self::drop_stale_session(state);
                effects
            },

            // ========== Search & filter ==========
            DashboardAction::SearchChanged { query } => {
                let generation = state.search.keystroke(query);
                tracing::trace!(generation, "Search input changed");
                taskboard_core::smallvec![Effect::debounce(
                    SEARCH_DEBOUNCE,
                    env.search_debounce,
                    DashboardAction::SearchApplied { generation },
                )]
            },

            DashboardAction::SearchApplied { generation } => {
                if state.search.apply(generation) {
                    tracing::debug!(
                        generation,
                        term = state.search.effective(),
                        "Search term applied"
                    );
                } else {
                    tracing::debug!(
                        generation,
                        latest = state.search.generation(),
                        "Stale search apply ignored"
                    );
                }
                SmallVec::new()
            },

            DashboardAction::FilterChanged { filter } => {
                state.filter = filter;
                SmallVec::new()
            },
        }
    }
}
