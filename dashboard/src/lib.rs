//! Task dashboard built on the Taskboard task store.
//!
//! The dashboard is the caller of the task store. It demonstrates:
//!
//! - Form validation before anything reaches the store
//! - Id and timestamp assignment from an injected environment
//! - An editing session and a status filter
//! - A debounced search input, cancelled and rescheduled on every keystroke
//! - A recomputed view (statistics plus the visible task list)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskboard::{DashboardAction, DashboardEnvironment, DashboardReducer, DashboardState};
//! use taskboard_core::environment::{SystemClock, UuidGenerator};
//! use taskboard_core::validation::TaskDraft;
//! use taskboard_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = DashboardEnvironment::new(Arc::new(SystemClock), Arc::new(UuidGenerator));
//! let today = env.today();
//! let store = Store::new(DashboardState::new(), DashboardReducer::new(), env);
//!
//! store
//!     .send(DashboardAction::CreateTask {
//!         draft: TaskDraft::new(today).text("Learn React basics"),
//!     })
//!     .await?;
//!
//! let view = store.state(|s| s.view(today)).await;
//! println!("{view}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod reducer;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::Config;
pub use reducer::{DashboardEnvironment, DashboardReducer};
pub use types::{DashboardAction, DashboardState};
pub use view::DashboardView;
