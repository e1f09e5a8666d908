//! # Taskboard Core
//!
//! Task store, view projector and domain types for the Taskboard dashboard.
//!
//! The crate follows the reducer architecture: all state changes go through a
//! pure reducer over explicit actions, side effects are returned as values,
//! and dependencies (clock, id generation) are injected through an
//! environment.
//!
//! ## Core Concepts
//!
//! - **State**: [`store::TaskList`], an ordered sequence of [`task::Task`]s
//! - **Action**: [`store::TaskAction`], the tagged inputs to the task store
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions, executed by the runtime
//! - **Projection**: [`projection::Statistics`] and [`projection::visible_tasks`],
//!   pure derivations recomputed from the current tasks
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use taskboard_core::environment::SystemClock;
//! use taskboard_core::projection::{visible_tasks, Statistics, TaskFilter};
//! use taskboard_core::reducer::Reducer;
//! use taskboard_core::store::{TaskAction, TaskEnvironment, TaskList, TaskReducer};
//! use taskboard_core::task::{Category, Priority, Task, TaskId};
//!
//! let env = TaskEnvironment::new(Arc::new(SystemClock));
//! let mut tasks = TaskList::new();
//! let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap_or_default();
//!
//! let task = Task::new(TaskId::new(), "Learn React basics", Priority::High, due, Category::Education, chrono::Utc::now());
//! TaskReducer::new().reduce(&mut tasks, TaskAction::Add(task), &env);
//!
//! let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
//! let stats = Statistics::from_tasks(tasks.as_slice(), today);
//! assert_eq!(stats.total, 1);
//!
//! let visible = visible_tasks(tasks.as_slice(), "react", TaskFilter::All, today);
//! assert_eq!(visible.len(), 1);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Parse errors for the textual forms of domain enums
pub mod error;

/// Task records and their field types
pub mod task;

/// The task store: actions and the reducer over the task sequence
pub mod store;

/// Pure derivations: statistics and the filtered/sorted task view
pub mod projection;

/// Debounced search input state
pub mod search;

/// Form validation for task drafts
pub mod validation;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for TaskReducer {
    ///     type State = TaskList;
    ///     type Action = TaskAction;
    ///     type Environment = TaskEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut TaskList,
    ///         action: TaskAction,
    ///         env: &TaskEnvironment,
    ///     ) -> SmallVec<[Effect<TaskAction>; 4]> {
    ///         *state = state.apply(action, env.clock.as_ref());
    ///         SmallVec::new()
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates state in place and returns effect descriptions for the
        /// runtime to execute. Reducers never fail: actions that do not
        /// apply to the current state are absorbed as no-ops.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifier for a cancellable effect
    ///
    /// Registering a cancellable effect under an id that already has a
    /// pending effect cancels the pending one first, so at most one effect
    /// per id is ever in flight.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create an effect id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The name this id was created with
        #[must_use]
        pub const fn name(&self) -> &'static str {
            self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (debouncing, timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Run `effect` under `id`, cancelling any effect still pending under the same id
        Cancellable {
            /// Owner of the pending effect slot
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Cancel the effect pending under the given id, if any
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Dispatch `action` after `duration`, replacing any delay pending under `id`
        #[must_use]
        pub fn debounce(id: EffectId, duration: Duration, action: Action) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(Effect::Delay {
                    duration,
                    action: Box::new(action),
                }),
            }
        }

        /// Whether this effect does nothing when executed
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    effects.iter().all(Effect::is_none)
                },
                _ => false,
            }
        }

        /// Lift an effect into a parent action type
        ///
        /// Used when a parent reducer delegates to a child reducer and needs
        /// to hand the child's effects to the runtime.
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            F: Fn(Action) -> B + Clone + Send + Sync + 'static,
            Action: Send + 'static,
            B: Send + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => {
                    Effect::Parallel(effects.into_iter().map(|e| e.map(f.clone())).collect())
                },
                Effect::Sequential(effects) => {
                    Effect::Sequential(effects.into_iter().map(|e| e.map(f.clone())).collect())
                },
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
                Effect::Cancellable { id, effect } => Effect::Cancellable {
                    id,
                    effect: Box::new(effect.map(f)),
                },
                Effect::Cancel(id) => Effect::Cancel(id),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use crate::task::TaskId;
    use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Production uses [`SystemClock`]; tests use a fixed clock.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by [`Utc::now`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh task identifiers
    pub trait IdGenerator: Send + Sync {
        /// Produce an id never returned before by this generator
        fn next_id(&self) -> TaskId;
    }

    /// Random v4 UUID ids
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidGenerator;

    impl IdGenerator for UuidGenerator {
        fn next_id(&self) -> TaskId {
            TaskId::new()
        }
    }

    /// Calendar used to decide which day "today" is
    ///
    /// Day boundaries are taken in a single fixed UTC offset so overdue
    /// checks do not depend on the host's local time zone.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Calendar {
        offset: FixedOffset,
    }

    impl Calendar {
        /// Calendar with day boundaries at UTC midnight
        #[must_use]
        pub fn utc() -> Self {
            Self {
                offset: Utc.fix(),
            }
        }

        /// Calendar with day boundaries at midnight in the given offset east of UTC
        ///
        /// Returns `None` if the offset is outside ±24 hours.
        #[must_use]
        pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
            let seconds = minutes.checked_mul(60)?;
            FixedOffset::east_opt(seconds).map(|offset| Self { offset })
        }

        /// The offset this calendar reckons days in
        #[must_use]
        pub const fn offset(&self) -> FixedOffset {
            self.offset
        }

        /// Calendar day containing `instant`
        #[must_use]
        pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
            instant.with_timezone(&self.offset).date_naive()
        }

        /// Calendar day the clock currently reads
        #[must_use]
        pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
            self.date_of(clock.now())
        }
    }

    impl Default for Calendar {
        fn default() -> Self {
            Self::utc()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};
    use super::environment::Calendar;
    use chrono::{DateTime, NaiveDate, Utc};
    use std::time::Duration;

    const ID: EffectId = EffectId::new("test");

    #[test]
    fn debounce_wraps_delay_in_cancellable() {
        let effect = Effect::debounce(ID, Duration::from_millis(300), 7_u32);
        match effect {
            Effect::Cancellable { id, effect } => {
                assert_eq!(id, ID);
                assert!(matches!(effect.as_ref(), Effect::Delay { action, .. } if **action == 7));
            },
            other => panic!("expected cancellable effect, got {other:?}"),
        }
    }

    #[test]
    fn map_preserves_shape() {
        let effect = Effect::debounce(ID, Duration::from_millis(5), 2_u32).map(|n| n * 10);
        match effect {
            Effect::Cancellable { effect, .. } => {
                assert!(matches!(effect.as_ref(), Effect::Delay { action, .. } if **action == 20));
            },
            other => panic!("expected cancellable effect, got {other:?}"),
        }
    }

    #[test]
    fn is_none_sees_through_composites() {
        assert!(Effect::<u8>::None.is_none());
        assert!(Effect::<u8>::merge(vec![Effect::None, Effect::chain(vec![])]).is_none());
        assert!(!Effect::<u8>::Cancel(ID).is_none());
    }

    #[test]
    fn calendar_offsets_shift_the_day_boundary() {
        let instant = DateTime::parse_from_rfc3339("2024-03-01T23:30:00Z")
            .map(|t| t.with_timezone(&Utc))
            .unwrap();

        assert_eq!(
            Calendar::utc().date_of(instant),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(
            Calendar::from_offset_minutes(60).unwrap().date_of(instant),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        assert!(Calendar::from_offset_minutes(25 * 60).is_none());
    }
}
