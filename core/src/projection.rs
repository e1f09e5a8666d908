//! Pure derivations over the task store.
//!
//! Two independent projections are recomputed whenever their inputs change:
//!
//! - [`Statistics`]: aggregate counts and completion progress
//! - [`visible_tasks`]: the search-matched, filtered and sorted subsequence
//!   the dashboard displays
//!
//! Neither reads a clock. "Today" is passed in by the caller, so the same
//! inputs always produce the same output.

use crate::error::ParseError;
use crate::task::{Priority, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Filter selector applied after search matching
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    /// No further filtering
    #[default]
    All,
    /// Not completed
    Pending,
    /// Completed
    Completed,
    /// Not completed and due before today
    Overdue,
    /// High priority and not completed
    #[serde(rename = "high")]
    HighPriority,
}

impl TaskFilter {
    /// Every filter, in the order the dashboard lists them
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Pending,
        Self::Completed,
        Self::Overdue,
        Self::HighPriority,
    ];

    /// Name used in URLs and configuration
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::HighPriority => "high",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Tasks",
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
            Self::HighPriority => "High Priority",
        }
    }

    /// Whether `task` passes this filter on `today`
    #[must_use]
    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
            Self::Overdue => task.is_overdue(today),
            Self::HighPriority => task.priority == Priority::High && !task.completed,
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownFilter(s.to_string()))
    }
}

/// Aggregate statistics over all tasks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Count of all tasks
    pub total: usize,
    /// Count of completed tasks
    pub completed: usize,
    /// `total - completed`
    pub pending: usize,
    /// Open tasks due before today
    pub overdue: usize,
    /// Open high-priority tasks
    pub high_priority: usize,
    /// Completion percentage, rounded half up; 0 when there are no tasks
    pub progress: u8,
}

impl Statistics {
    /// Derive statistics from the full task sequence
    #[must_use]
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            ..Self::default()
        };

        for task in tasks {
            if task.completed {
                stats.completed += 1;
            } else {
                if task.due_date < today {
                    stats.overdue += 1;
                }
                if task.priority == Priority::High {
                    stats.high_priority += 1;
                }
            }
        }

        stats.pending = stats.total - stats.completed;
        stats.progress = progress_percent(stats.completed, stats.total);
        stats
    }

    /// Number of tasks the given filter would show with an empty search
    #[must_use]
    pub const fn count_for(&self, filter: TaskFilter) -> usize {
        match filter {
            TaskFilter::All => self.total,
            TaskFilter::Pending => self.pending,
            TaskFilter::Completed => self.completed,
            TaskFilter::Overdue => self.overdue,
            TaskFilter::HighPriority => self.high_priority,
        }
    }
}

/// `round(100 * completed / total)` with ties rounded up, in integer arithmetic
fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }

    let completed = completed as u128;
    let total = total as u128;
    let rounded = (200 * completed + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

/// Whether `task` matches a search string
///
/// An empty search matches everything. Otherwise the task's text or category
/// name must contain the search string, ignoring case.
#[must_use]
pub fn matches_search(task: &Task, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    contains_lowercase(task, &needle)
}

fn contains_lowercase(task: &Task, needle: &str) -> bool {
    task.text.to_lowercase().contains(needle) || task.category.name().to_lowercase().contains(needle)
}

/// Display order: open before completed, then priority high to low, then
/// earliest due date first
#[must_use]
pub fn display_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.due_date.cmp(&b.due_date))
}

/// Derive the tasks the dashboard displays
///
/// Steps, in order: keep tasks matching `search` (if non-empty), keep tasks
/// passing `filter`, then stable-sort by [`display_order`]. Tasks equal on
/// every sort key keep their relative input order. The input is borrowed,
/// never modified, and the result only references tasks from it.
#[must_use]
pub fn visible_tasks<'a>(
    tasks: &'a [Task],
    search: &str,
    filter: TaskFilter,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let needle = (!search.is_empty()).then(|| search.to_lowercase());

    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| needle.as_deref().is_none_or(|needle| contains_lowercase(task, needle)))
        .filter(|task| filter.matches(task, today))
        .collect();

    // slice::sort_by is stable
    visible.sort_by(|a, b| display_order(a, b));
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Category, TaskId};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(text: &str, priority: Priority, due: NaiveDate, category: Category) -> Task {
        Task::new(TaskId::new(), text, priority, due, category, Utc::now())
    }

    fn completed(mut task: Task) -> Task {
        task.toggle(Utc::now());
        task
    }

    fn today() -> NaiveDate {
        date(2024, 1, 8)
    }

    #[test]
    fn empty_store_has_zero_progress() {
        let stats = Statistics::from_tasks(&[], today());
        assert_eq!(stats, Statistics::default());
        assert_eq!(stats.progress, 0);
    }

    #[test]
    fn all_completed_is_full_progress() {
        let tasks = vec![
            completed(task("a", Priority::Low, today(), Category::Work)),
            completed(task("b", Priority::High, today(), Category::Work)),
        ];
        let stats = Statistics::from_tasks(&tasks, today());
        assert_eq!(stats.progress, 100);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn progress_rounds_half_up() {
        assert_eq!(progress_percent(1, 8), 13); // 12.5
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 200), 1); // 0.5
        assert_eq!(progress_percent(0, 5), 0);
    }

    #[test]
    fn overdue_counts_only_open_tasks_due_before_today() {
        let yesterday = date(2024, 1, 7);
        let late = task("late", Priority::Medium, yesterday, Category::Work);
        let due_today = task("today", Priority::Medium, today(), Category::Work);
        let done_late = completed(task("done", Priority::Medium, yesterday, Category::Work));

        let stats = Statistics::from_tasks(&[late, due_today, done_late], today());

        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.progress, 33);
    }

    #[test]
    fn overdue_task_leaves_count_once_completed() {
        let mut late = task("late", Priority::Medium, date(2024, 1, 7), Category::Work);
        assert_eq!(Statistics::from_tasks(&[late.clone()], today()).overdue, 1);

        late.toggle(Utc::now());
        assert_eq!(Statistics::from_tasks(&[late], today()).overdue, 0);
    }

    #[test]
    fn count_for_matches_visible_len_without_search() {
        let tasks = vec![
            task("a", Priority::High, date(2024, 1, 1), Category::Work),
            completed(task("b", Priority::High, date(2024, 1, 1), Category::Work)),
            task("c", Priority::Low, date(2024, 2, 1), Category::Health),
            task("d", Priority::High, date(2024, 3, 1), Category::Personal),
        ];
        let stats = Statistics::from_tasks(&tasks, today());

        for filter in TaskFilter::ALL {
            assert_eq!(
                stats.count_for(filter),
                visible_tasks(&tasks, "", filter, today()).len(),
                "filter {filter}"
            );
        }
    }

    #[test]
    fn priority_dominates_due_date() {
        let a = task("A", Priority::High, date(2024, 1, 10), Category::Work);
        let b = task("B", Priority::Low, date(2024, 1, 5), Category::Work);
        let tasks = vec![b.clone(), a.clone()];

        let visible = visible_tasks(&tasks, "", TaskFilter::All, today());

        assert_eq!(visible, vec![&a, &b]);
    }

    #[test]
    fn completed_tasks_sort_last() {
        let done = completed(task("done", Priority::High, date(2024, 1, 1), Category::Work));
        let open = task("open", Priority::Low, date(2024, 12, 1), Category::Work);
        let tasks = vec![done.clone(), open.clone()];

        let visible = visible_tasks(&tasks, "", TaskFilter::All, today());

        assert_eq!(visible, vec![&open, &done]);
    }

    #[test]
    fn earlier_due_date_breaks_priority_ties() {
        let later = task("later", Priority::Medium, date(2024, 1, 20), Category::Work);
        let sooner = task("sooner", Priority::Medium, date(2024, 1, 9), Category::Work);
        let tasks = vec![later.clone(), sooner.clone()];

        assert_eq!(
            visible_tasks(&tasks, "", TaskFilter::All, today()),
            vec![&sooner, &later]
        );
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let due = date(2024, 1, 9);
        let first = task("first", Priority::Medium, due, Category::Work);
        let second = task("second", Priority::Medium, due, Category::Health);
        let third = task("third", Priority::Medium, due, Category::Personal);
        let tasks = vec![first.clone(), second.clone(), third.clone()];

        assert_eq!(
            visible_tasks(&tasks, "", TaskFilter::All, today()),
            vec![&first, &second, &third]
        );
    }

    #[test]
    fn search_matches_text_case_insensitively() {
        let react = task("Learn React basics", Priority::Medium, today(), Category::Education);
        let groceries = task("Buy groceries", Priority::Medium, today(), Category::Personal);
        let tasks = vec![react.clone(), groceries];

        assert_eq!(
            visible_tasks(&tasks, "react", TaskFilter::All, today()),
            vec![&react]
        );
    }

    #[test]
    fn search_matches_category_name() {
        let run = task("Morning run", Priority::Medium, today(), Category::Health);
        let report = task("Quarterly report", Priority::Medium, today(), Category::Work);
        let tasks = vec![run.clone(), report];

        assert_eq!(
            visible_tasks(&tasks, "HEAL", TaskFilter::All, today()),
            vec![&run]
        );
    }

    #[test]
    fn filters_select_expected_tasks() {
        let late_high = task("late high", Priority::High, date(2024, 1, 1), Category::Work);
        let future_low = task("future low", Priority::Low, date(2024, 6, 1), Category::Work);
        let done_high = completed(task("done high", Priority::High, date(2024, 1, 1), Category::Work));
        let tasks = vec![late_high.clone(), future_low.clone(), done_high.clone()];
        let run = |filter| visible_tasks(&tasks, "", filter, today());

        assert_eq!(run(TaskFilter::All).len(), 3);
        assert_eq!(run(TaskFilter::Pending), vec![&late_high, &future_low]);
        assert_eq!(run(TaskFilter::Completed), vec![&done_high]);
        assert_eq!(run(TaskFilter::Overdue), vec![&late_high]);
        assert_eq!(run(TaskFilter::HighPriority), vec![&late_high]);
    }

    #[test]
    fn search_applies_before_filter() {
        let a = task("alpha", Priority::High, date(2024, 1, 1), Category::Work);
        let b = task("beta", Priority::High, date(2024, 1, 1), Category::Work);
        let tasks = vec![a.clone(), b];

        assert_eq!(
            visible_tasks(&tasks, "alp", TaskFilter::Overdue, today()),
            vec![&a]
        );
    }

    #[test]
    fn filter_names_round_trip() {
        for filter in TaskFilter::ALL {
            assert_eq!(filter.as_str().parse::<TaskFilter>(), Ok(filter));
        }
        assert!(matches!(
            "someday".parse::<TaskFilter>(),
            Err(ParseError::UnknownFilter(_))
        ));
    }
}
