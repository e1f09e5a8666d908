//! # Taskboard Testing
//!
//! Testing utilities and helpers for the Taskboard crates.
//!
//! This crate provides:
//! - Deterministic implementations of the environment traits (clock, ids)
//! - Task fixtures
//! - A Given-When-Then builder for reducer tests
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use taskboard_testing::{test_clock, TaskBuilder, ReducerTest, assertions};
//!
//! let task = TaskBuilder::new("Buy milk").build();
//!
//! ReducerTest::new(TaskReducer::new())
//!     .with_env(TaskEnvironment::new(Arc::new(test_clock())))
//!     .given_state(TaskList::new())
//!     .when_action(TaskAction::Add(task))
//!     .then_state(|tasks| assert_eq!(tasks.len(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use taskboard_core::environment::{Clock, IdGenerator};
use taskboard_core::task::{Category, Priority, Task, TaskId};

/// Ergonomic testing utilities for reducers
pub mod reducer_test;

/// Deterministic environment implementations
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, TaskId, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use taskboard_testing::mocks::FixedClock;
    /// use taskboard_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    ///
    /// Useful for checking which timestamp an action recorded.
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock reading `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock to `time`
        pub fn set(&self, time: DateTime<Utc>) {
            if let Ok(mut guard) = self.time.lock() {
                *guard = time;
            }
        }

        /// Move the clock forward by `delta`
        pub fn advance(&self, delta: chrono::Duration) {
            if let Ok(mut guard) = self.time.lock() {
                *guard += delta;
            }
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            match self.time.lock() {
                Ok(guard) => *guard,
                Err(poisoned) => *poisoned.into_inner(),
            }
        }
    }

    /// Predictable ids: 1, 2, 3, ... as UUIDs
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Generator whose first id is `1`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(1),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> TaskId {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            TaskId::from_uuid(uuid::Uuid::from_u128(u128::from(n)))
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Task fixtures
pub mod fixtures {
    use super::{Category, DateTime, NaiveDate, Priority, Task, TaskId, Utc, mocks};
    use taskboard_core::environment::Clock;

    /// The calendar day [`mocks::test_clock`] reads (2025-01-01)
    #[must_use]
    pub fn test_today() -> NaiveDate {
        mocks::test_clock().now().date_naive()
    }

    /// `n` days after [`test_today`] (negative for days before)
    #[must_use]
    pub fn days_from_today(n: i64) -> NaiveDate {
        test_today() + chrono::Duration::days(n)
    }

    /// Builder for tasks with sensible test defaults
    ///
    /// Defaults: medium priority, work category, due on [`test_today`],
    /// created at the test clock's time, open, random id.
    #[derive(Debug, Clone)]
    pub struct TaskBuilder {
        task: Task,
    }

    impl TaskBuilder {
        /// Start a task with the given description
        #[must_use]
        pub fn new(text: impl Into<String>) -> Self {
            Self {
                task: Task::new(
                    TaskId::new(),
                    text,
                    Priority::Medium,
                    test_today(),
                    Category::Work,
                    mocks::test_clock().now(),
                ),
            }
        }

        /// Use a specific id
        #[must_use]
        pub const fn id(mut self, id: TaskId) -> Self {
            self.task.id = id;
            self
        }

        /// Set the priority
        #[must_use]
        pub const fn priority(mut self, priority: Priority) -> Self {
            self.task.priority = priority;
            self
        }

        /// Set the due date
        #[must_use]
        pub const fn due(mut self, due_date: NaiveDate) -> Self {
            self.task.due_date = due_date;
            self
        }

        /// Set the category
        #[must_use]
        pub fn category(mut self, category: Category) -> Self {
            self.task.category = category;
            self
        }

        /// Mark the task completed at `at`
        #[must_use]
        pub const fn completed_at(mut self, at: DateTime<Utc>) -> Self {
            self.task.completed = true;
            self.task.completed_at = Some(at);
            self
        }

        /// Mark the task completed at the test clock's time
        #[must_use]
        pub fn completed(self) -> Self {
            let at = mocks::test_clock().now();
            self.completed_at(at)
        }

        /// Finish building
        #[must_use]
        pub fn build(self) -> Task {
            self.task
        }
    }
}

// Re-export commonly used items
pub use fixtures::{TaskBuilder, days_from_today, test_today};
pub use mocks::{FixedClock, ManualClock, SequentialIdGenerator, test_clock};
pub use reducer_test::{ReducerTest, assertions};
