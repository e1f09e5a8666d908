//! What the presentation layer renders.

use crate::types::DashboardState;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use taskboard_core::projection::{Statistics, TaskFilter, visible_tasks};
use taskboard_core::task::Task;

/// Snapshot of the dashboard for one render
///
/// Recomputed from scratch on every call to [`DashboardState::view`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Aggregate counts over every task
    pub stats: Statistics,
    /// Tasks matching the search and filter, in display order
    pub visible: Vec<Task>,
    /// Active filter
    pub filter: TaskFilter,
    /// Search term the list is filtered by
    pub search_term: String,
}

impl DashboardState {
    /// Derive the view as of `today`
    #[must_use]
    pub fn view(&self, today: NaiveDate) -> DashboardView {
        let tasks = self.tasks.as_slice();
        DashboardView {
            stats: Statistics::from_tasks(tasks, today),
            visible: visible_tasks(tasks, self.search.effective(), self.filter, today)
                .into_iter()
                .cloned()
                .collect(),
            filter: self.filter,
            search_term: self.search.effective().to_string(),
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;
        writeln!(
            f,
            "{} tasks, {} completed, {} pending, {} overdue ({}% done)",
            stats.total, stats.completed, stats.pending, stats.overdue, stats.progress
        )?;

        let filters: Vec<String> = TaskFilter::ALL
            .iter()
            .map(|&filter| {
                let marker = if filter == self.filter { "*" } else { "" };
                format!("{marker}{} ({})", filter.label(), stats.count_for(filter))
            })
            .collect();
        writeln!(f, "Filters: {}", filters.join(" | "))?;

        if !self.search_term.is_empty() {
            writeln!(f, "Search: \"{}\"", self.search_term)?;
        }

        if self.visible.is_empty() {
            return writeln!(f, "  (no tasks)");
        }
        for task in &self.visible {
            let status = if task.completed { "✓" } else { " " };
            writeln!(
                f,
                "  [{status}] {:<6} {} {:<10} {}",
                task.priority, task.due_date, task.category, task.text
            )?;
        }
        Ok(())
    }
}
