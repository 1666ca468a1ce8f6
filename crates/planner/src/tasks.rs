//! To-do tasks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::storage::{Collection, Storage};
use crate::{contains_ignore_case, new_id, non_blank, remove_by_id};

/// Storage key for the task list.
pub const TASKS_KEY: &str = "tasks";

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("invalid priority: {s}")),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Input for [`Tasks::add`].
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
}

/// Completion filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid status filter: {s}")),
        }
    }
}

/// Task list filter. The default matches every task.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Matched against title and description, ignoring case.
    pub search: String,
    pub status: StatusFilter,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let matches_search = contains_ignore_case(&task.title, &self.search)
            || task
                .description
                .as_deref()
                .is_some_and(|d| contains_ignore_case(d, &self.search));
        let matches_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        };
        let matches_priority = self.priority.is_none_or(|p| p == task.priority);

        matches_search && matches_status && matches_priority
    }
}

/// Completed versus total tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed share in whole percent, 0 when there are no tasks.
    #[must_use]
    pub fn percent(self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}

/// The persisted task list.
pub struct Tasks<'a> {
    items: Collection<'a, Task>,
}

impl<'a> Tasks<'a> {
    #[must_use]
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self {
            items: Collection::new(storage, TASKS_KEY),
        }
    }

    /// All tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage cannot be read.
    pub fn all(&self) -> Result<Vec<Task>, PlannerError> {
        self.items.load()
    }

    /// Add a task at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Required` if the title is blank.
    pub fn add(&self, new: NewTask, now: DateTime<Utc>) -> Result<Task, PlannerError> {
        let title = non_blank(Some(&new.title)).ok_or(PlannerError::Required("title"))?;
        let task = Task {
            id: new_id(),
            title,
            description: non_blank(new.description.as_deref()),
            completed: false,
            priority: new.priority,
            due_date: new.due_date,
            created_at: now,
            category: non_blank(new.category.as_deref()),
        };

        self.items.update(|items| {
            items.insert(0, task.clone());
            Ok(())
        })?;
        tracing::debug!(id = %task.id, "Task added");
        Ok(task)
    }

    /// Flip a task between done and not done.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::NotFound` if no task has this id.
    pub fn toggle(&self, id: &str) -> Result<Task, PlannerError> {
        self.items.update(|items| {
            let task = items
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| PlannerError::not_found("task", id))?;
            task.completed = !task.completed;
            Ok(task.clone())
        })
    }

    /// Remove a task. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage fails.
    pub fn delete(&self, id: &str) -> Result<bool, PlannerError> {
        self.items
            .update(|items| Ok(remove_by_id(items, id, |t: &Task| &t.id)))
    }
}

/// Tasks matching `filter`, in list order.
#[must_use]
pub fn filter<'t>(tasks: &'t [Task], filter: &TaskFilter) -> Vec<&'t Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

#[must_use]
pub fn progress(tasks: &[Task]) -> Progress {
    Progress {
        completed: tasks.iter().filter(|t| t.completed).count(),
        total: tasks.len(),
    }
}
