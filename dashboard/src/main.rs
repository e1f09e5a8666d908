//! Task dashboard demo binary
//!
//! Drives the dashboard end to end through the runtime Store and prints the
//! resulting views.

use chrono::Duration as Days;
use std::sync::Arc;
use std::time::Duration;
use taskboard::{Config, DashboardAction, DashboardEnvironment, DashboardReducer, DashboardState};
use taskboard_core::environment::{SystemClock, UuidGenerator};
use taskboard_core::projection::TaskFilter;
use taskboard_core::task::{Category, Priority};
use taskboard_core::validation::TaskDraft;
use taskboard_runtime::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(?config, "Starting taskboard demo");
    println!("=== Taskboard ===\n");

    let env = DashboardEnvironment::new(Arc::new(SystemClock), Arc::new(UuidGenerator))
        .with_calendar(config.calendar())
        .with_search_debounce(config.search_debounce());
    let today = env.today();
    let store = Store::new(DashboardState::new(), DashboardReducer::new(), env);

    // Create some tasks
    let drafts = [
        TaskDraft::new(today)
            .text("Learn React basics")
            .priority(Priority::High)
            .category(Category::Education),
        TaskDraft::new(today - Days::days(2))
            .text("File expense report")
            .priority(Priority::Medium),
        TaskDraft::new(today + Days::days(3))
            .text("Book dentist appointment")
            .priority(Priority::Low)
            .category(Category::Health),
        TaskDraft::new(today + Days::days(1))
            .text("Read about React hooks")
            .priority(Priority::Medium)
            .category(Category::Education),
    ];
    for draft in drafts {
        store.send(DashboardAction::CreateTask { draft }).await?;
    }

    println!(">>> Created 4 tasks");
    print!("{}", store.state(|s| s.view(today)).await);

    // An invalid form is rejected with field messages
    println!("\n>>> Submitting an empty form");
    store
        .send(DashboardAction::CreateTask {
            draft: TaskDraft::default(),
        })
        .await?;
    if let Some(errors) = store.state(|s| s.form_errors.clone()).await {
        for error in errors.errors() {
            println!("  {}: {}", error.field, error.message);
        }
    }

    // Typing into the search box: only the last keystroke applies
    println!("\n>>> Typing \"react\"");
    let mut applied = store.subscribe_actions();
    let mut query = String::new();
    for c in "react".chars() {
        query.push(c);
        store
            .send(DashboardAction::SearchChanged {
                query: query.clone(),
            })
            .await?;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    while let Ok(action) = applied.recv().await {
        if matches!(action, DashboardAction::SearchApplied { .. }) {
            break;
        }
    }
    let applied_count = store.state(|s| s.search.applied_count()).await;
    println!("Search applied {applied_count} time(s)");
    print!("{}", store.state(|s| s.view(today)).await);

    // Complete the overdue task
    println!("\n>>> Completing the overdue task");
    store
        .send(DashboardAction::SearchChanged {
            query: String::new(),
        })
        .await?
        .wait()
        .await;
    let overdue = store
        .state(|s| {
            s.tasks
                .iter()
                .find(|task| task.is_overdue(today))
                .map(|task| task.id)
        })
        .await;
    if let Some(id) = overdue {
        store.send(DashboardAction::ToggleTask { id }).await?;
    }
    store
        .send(DashboardAction::FilterChanged {
            filter: TaskFilter::Completed,
        })
        .await?;
    print!("{}", store.state(|s| s.view(today)).await);

    // Final view as JSON
    println!("\n>>> Pending tasks as JSON");
    store
        .send(DashboardAction::FilterChanged {
            filter: TaskFilter::Pending,
        })
        .await?;
    let view = store.state(|s| s.view(today)).await;
    println!("{}", serde_json::to_string_pretty(&view)?);

    store.shutdown(config.shutdown_timeout()).await?;
    println!("\n=== Demo Complete ===");
    Ok(())
}
