//! Personal planner commands.
//!
//! Works on the same JSON collections the browser planner keeps in
//! `localStorage`, stored as one file per key in a data directory.
//!
//! # Usage
//!
//! ```bash
//! hb-cli planner tasks add "Pay rent" --priority high --due 2025-03-01
//! hb-cli planner tasks list --status active
//! hb-cli planner workouts start --name "Leg day"
//! hb-cli planner workouts exercise Squat
//! hb-cli planner workouts set <exercise-id> --reps 5 --weight 100
//! hb-cli planner workouts finish
//! hb-cli planner watchlist add "Dune" --type book
//! hb-cli planner expenses add 42.50 "Groceries" --category Food
//! hb-cli planner expenses summary
//! ```
//!
//! # Environment Variables
//!
//! - `HOMEBASE_PLANNER_DIR` - Data directory (default: `<user data dir>/homebase`)

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use homebase_planner::expenses::{self, EntryType, ExpenseFilter, Expenses, NewExpense};
use homebase_planner::tasks::{self, NewTask, Priority, StatusFilter, TaskFilter, Tasks};
use homebase_planner::watchlist::{
    self, MediaType, NewWatchlistItem, WatchStatus, Watchlist, WatchlistFilter,
};
use homebase_planner::workouts::{
    self, ActiveWorkout, DEFAULT_WORKOUT_NAME, ExerciseSet, Workouts,
};
use homebase_planner::{FileStorage, Storage};
use rust_decimal::Decimal;

use super::CommandError;

#[derive(Subcommand)]
pub enum PlannerCommand {
    /// To-do list
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Workout log
    Workouts {
        #[command(subcommand)]
        action: WorkoutAction,
    },
    /// Movies, shows and books
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
    /// Income and expenses
    Expenses {
        #[command(subcommand)]
        action: ExpenseAction,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks with progress
    List {
        /// Match title or description
        #[arg(long, default_value = "")]
        search: String,
        /// `all`, `active` or `completed`
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// `low`, `medium` or `high`
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Add a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Flip a task between active and completed
    Toggle { id: String },
    /// Delete a task
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// List recorded workouts and this week's totals
    List,
    /// Start a workout session
    Start {
        #[arg(long, default_value = DEFAULT_WORKOUT_NAME)]
        name: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Add an exercise to the session in progress
    Exercise {
        name: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Log a set for an exercise in the session
    Set {
        exercise_id: String,
        #[arg(long, default_value_t = 0)]
        reps: u32,
        #[arg(long)]
        weight: Option<f64>,
        /// Seconds
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        distance: Option<f64>,
    },
    /// Show the session in progress
    Status,
    /// Finish the session and record it
    Finish,
    /// Discard the session in progress
    Cancel,
    /// Delete a recorded workout
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum WatchlistAction {
    /// List items with counts
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// `movie`, `tv` or `book`
        #[arg(long = "type")]
        kind: Option<MediaType>,
        /// `want-to-watch`, `watching` or `completed`
        #[arg(long)]
        status: Option<WatchStatus>,
    },
    /// Add an item
    Add {
        title: String,
        #[arg(long = "type", default_value = "movie")]
        kind: MediaType,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change an item's status
    Status { id: String, status: WatchStatus },
    /// Rate an item from 1 to 5
    Rate { id: String, rating: u8 },
    /// Delete an item
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ExpenseAction {
    /// List entries
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<String>,
        /// `expense` or `income`
        #[arg(long = "type")]
        kind: Option<EntryType>,
    },
    /// Record an expense or income
    Add {
        amount: Decimal,
        description: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type", default_value = "expense")]
        kind: EntryType,
        /// Defaults to today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete an entry
    Delete { id: String },
    /// This month's totals and top spending categories
    Summary,
}

/// Run a planner command against the data directory.
///
/// # Errors
///
/// Returns `CommandError` if the directory is unusable or the operation fails.
pub fn run(data_dir: Option<PathBuf>, command: PlannerCommand) -> Result<(), CommandError> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .map(|d| d.join("homebase"))
            .ok_or(CommandError::NoDataDir)?,
    };
    let storage = FileStorage::open(dir).map_err(homebase_planner::PlannerError::from)?;
    tracing::debug!(dir = %storage.dir().display(), "Opened planner storage");

    let clock = Clock {
        now: Utc::now(),
        today: chrono::Local::now().date_naive(),
    };
    let output = execute(&storage, command, clock)?;
    emit(&output);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn emit(output: &str) {
    if !output.is_empty() {
        println!("{output}");
    }
}

/// Current time for record timestamps and the local date for month/week math.
#[derive(Debug, Clone, Copy)]
struct Clock {
    now: DateTime<Utc>,
    today: NaiveDate,
}

fn execute(
    storage: &dyn Storage,
    command: PlannerCommand,
    clock: Clock,
) -> Result<String, CommandError> {
    match command {
        PlannerCommand::Tasks { action } => run_tasks(storage, action, clock),
        PlannerCommand::Workouts { action } => run_workouts(storage, action, clock),
        PlannerCommand::Watchlist { action } => run_watchlist(storage, action, clock),
        PlannerCommand::Expenses { action } => run_expenses(storage, action, clock),
    }
}

fn deleted(kind: &str, id: &str, removed: bool) -> String {
    if removed {
        format!("Deleted {kind} {id}")
    } else {
        format!("No {kind} with id {id}")
    }
}

// =============================================================================
// Tasks
// =============================================================================

fn run_tasks(storage: &dyn Storage, action: TaskAction, clock: Clock) -> Result<String, CommandError> {
    let tasks = Tasks::new(storage);

    let output = match action {
        TaskAction::List {
            search,
            status,
            priority,
        } => {
            let all = tasks.all()?;
            let filter = TaskFilter {
                search,
                status,
                priority,
            };
            let progress = tasks::progress(&all);
            let mut out = format!(
                "{} of {} completed ({}%)",
                progress.completed,
                progress.total,
                progress.percent()
            );
            for task in tasks::filter(&all, &filter) {
                let _ = write!(
                    out,
                    "\n[{}] {}  {} ({})",
                    if task.completed { "x" } else { " " },
                    task.id,
                    task.title,
                    task.priority
                );
                if let Some(due) = task.due_date {
                    let _ = write!(out, " due {due}");
                }
                if let Some(category) = &task.category {
                    let _ = write!(out, " #{category}");
                }
            }
            out
        }
        TaskAction::Add {
            title,
            description,
            priority,
            due,
            category,
        } => {
            let task = tasks.add(
                NewTask {
                    title,
                    description,
                    priority,
                    due_date: due,
                    category,
                },
                clock.now,
            )?;
            format!("Added task {}", task.id)
        }
        TaskAction::Toggle { id } => {
            let task = tasks.toggle(&id)?;
            format!(
                "Task {} is now {}",
                task.id,
                if task.completed { "completed" } else { "active" }
            )
        }
        TaskAction::Delete { id } => deleted("task", &id, tasks.delete(&id)?),
    };
    Ok(output)
}

// =============================================================================
// Workouts
// =============================================================================

fn describe_active(active: &ActiveWorkout, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "{} ({}) in progress for {}",
        active.name,
        active.id,
        workouts::format_duration(active.elapsed_minutes(now))
    );
    for exercise in &active.exercises {
        let _ = write!(
            out,
            "\n  {}  {} [{}] {} set(s)",
            exercise.id,
            exercise.name,
            exercise.category,
            exercise.sets.len()
        );
    }
    out
}

fn run_workouts(
    storage: &dyn Storage,
    action: WorkoutAction,
    clock: Clock,
) -> Result<String, CommandError> {
    let log = Workouts::new(storage);

    let output = match action {
        WorkoutAction::List => {
            let all = log.all()?;
            let week = workouts::weekly_summary(&all, clock.now);
            let mut out = format!(
                "This week: {} workout(s), {}",
                week.count,
                workouts::format_duration(week.total_minutes)
            );
            for workout in &all {
                let _ = write!(
                    out,
                    "\n{}  {}  {}  {}  {} exercise(s)",
                    workout.id,
                    workout.date.format("%Y-%m-%d"),
                    workout.name,
                    workouts::format_duration(workout.duration),
                    workout.exercises.len()
                );
            }
            out
        }
        WorkoutAction::Start { name, notes } => {
            if let Some(active) = ActiveWorkout::load(storage)? {
                return Err(CommandError::WorkoutInProgress(active.name));
            }
            let active = ActiveWorkout::start(&name, notes.as_deref(), clock.now);
            active.save(storage)?;
            format!("Started {} ({})", active.name, active.id)
        }
        WorkoutAction::Exercise { name, category } => {
            let mut active = ActiveWorkout::load(storage)?.ok_or(CommandError::NoActiveWorkout)?;
            let exercise_id = active.add_exercise(&name, category.as_deref())?.id.clone();
            active.save(storage)?;
            format!("Added exercise {exercise_id}")
        }
        WorkoutAction::Set {
            exercise_id,
            reps,
            weight,
            duration,
            distance,
        } => {
            let mut active = ActiveWorkout::load(storage)?.ok_or(CommandError::NoActiveWorkout)?;
            let index = active.add_set(&exercise_id)?;
            active.update_set(
                &exercise_id,
                index,
                ExerciseSet {
                    reps,
                    weight: weight.or(Some(0.0)),
                    duration,
                    distance,
                },
            )?;
            active.save(storage)?;
            format!("Logged set {} for {exercise_id}", index + 1)
        }
        WorkoutAction::Status => match ActiveWorkout::load(storage)? {
            Some(active) => describe_active(&active, clock.now),
            None => "No workout in progress".to_string(),
        },
        WorkoutAction::Finish => {
            let active = ActiveWorkout::load(storage)?.ok_or(CommandError::NoActiveWorkout)?;
            let workout = active.finish(clock.now);
            let summary = format!(
                "Recorded {} ({}), {}",
                workout.name,
                workout.id,
                workouts::format_duration(workout.duration)
            );
            log.record(workout)?;
            ActiveWorkout::clear(storage)?;
            summary
        }
        WorkoutAction::Cancel => {
            ActiveWorkout::clear(storage)?;
            "Workout discarded".to_string()
        }
        WorkoutAction::Delete { id } => deleted("workout", &id, log.delete(&id)?),
    };
    Ok(output)
}

// =============================================================================
// Watchlist
// =============================================================================

fn run_watchlist(
    storage: &dyn Storage,
    action: WatchlistAction,
    clock: Clock,
) -> Result<String, CommandError> {
    let list = Watchlist::new(storage);

    let output = match action {
        WatchlistAction::List {
            search,
            kind,
            status,
        } => {
            let all = list.all()?;
            let counts = watchlist::counts(&all);
            let mut out = format!(
                "{} item(s), {} watching, {} completed",
                counts.total, counts.watching, counts.completed
            );
            let filter = WatchlistFilter {
                search,
                kind,
                status,
            };
            for item in watchlist::filter(&all, &filter) {
                let _ = write!(out, "\n{}  {} [{}] {}", item.id, item.title, item.kind, item.status);
                if let Some(year) = item.year {
                    let _ = write!(out, " ({year})");
                }
                if let Some(rating) = item.rating {
                    let _ = write!(out, " {rating}/5");
                }
            }
            out
        }
        WatchlistAction::Add {
            title,
            kind,
            genre,
            year,
            notes,
        } => {
            let item = list.add(
                NewWatchlistItem {
                    title,
                    kind,
                    genre,
                    year,
                    notes,
                },
                clock.now,
            )?;
            format!("Added {} {}", item.kind, item.id)
        }
        WatchlistAction::Status { id, status } => {
            let item = list.update_status(&id, status, clock.now)?;
            format!("{} is now {}", item.title, item.status)
        }
        WatchlistAction::Rate { id, rating } => {
            let item = list.rate(&id, rating)?;
            format!("Rated {} {rating}/5", item.title)
        }
        WatchlistAction::Delete { id } => deleted("item", &id, list.delete(&id)?),
    };
    Ok(output)
}

// =============================================================================
// Expenses
// =============================================================================

fn run_expenses(
    storage: &dyn Storage,
    action: ExpenseAction,
    clock: Clock,
) -> Result<String, CommandError> {
    let ledger = Expenses::new(storage);

    let output = match action {
        ExpenseAction::List {
            search,
            category,
            kind,
        } => {
            let all = ledger.all()?;
            let filter = ExpenseFilter {
                search,
                category,
                kind,
            };
            let mut lines = Vec::new();
            for expense in expenses::filter(&all, &filter) {
                let sign = if expense.kind == EntryType::Income { "+" } else { "-" };
                lines.push(format!(
                    "{}  {}  {sign}${:.2}  {} [{}]",
                    expense.id, expense.date, expense.amount, expense.description, expense.category
                ));
            }
            if lines.is_empty() {
                "No entries".to_string()
            } else {
                lines.join("\n")
            }
        }
        ExpenseAction::Add {
            amount,
            description,
            category,
            kind,
            date,
        } => {
            let expense = ledger.add(NewExpense {
                amount,
                description,
                category,
                kind,
                date: date.unwrap_or(clock.today),
            })?;
            format!("Added {} {}", expense.kind, expense.id)
        }
        ExpenseAction::Delete { id } => deleted("entry", &id, ledger.delete(&id)?),
        ExpenseAction::Summary => {
            let all = ledger.all()?;
            let month = expenses::monthly_summary(&all, clock.today);
            let mut out = format!(
                "{}: income ${:.2}, expenses ${:.2}, net ${:.2}",
                clock.today.format("%B %Y"),
                month.income,
                month.expenses,
                month.net
            );
            for (category, total) in expenses::top_categories(&all) {
                let _ = write!(out, "\n  {category}: ${total:.2}");
            }
            out
        }
    };
    Ok(output)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use homebase_planner::MemoryStorage;
    use homebase_planner::workouts::ACTIVE_WORKOUT_KEY;

    use super::*;

    fn clock() -> Clock {
        Clock {
            now: Utc.with_ymd_and_hms(2025, 3, 12, 18, 0, 0).unwrap(),
            today: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
        }
    }

    fn task_cmd(storage: &MemoryStorage, action: TaskAction) -> String {
        execute(storage, PlannerCommand::Tasks { action }, clock()).unwrap()
    }

    fn workout_cmd(storage: &MemoryStorage, action: WorkoutAction) -> Result<String, CommandError> {
        execute(storage, PlannerCommand::Workouts { action }, clock())
    }

    #[test]
    fn test_task_lifecycle() {
        let storage = MemoryStorage::new();
        task_cmd(
            &storage,
            TaskAction::Add {
                title: "Pay rent".to_string(),
                description: None,
                priority: Priority::High,
                due: NaiveDate::from_ymd_opt(2025, 4, 1),
                category: None,
            },
        );
        let id = Tasks::new(&storage).all().unwrap()[0].id.clone();

        assert_eq!(
            task_cmd(&storage, TaskAction::Toggle { id: id.clone() }),
            format!("Task {id} is now completed")
        );

        let listing = task_cmd(
            &storage,
            TaskAction::List {
                search: String::new(),
                status: StatusFilter::All,
                priority: None,
            },
        );
        assert!(listing.starts_with("1 of 1 completed (100%)"));
        assert!(listing.contains("Pay rent (high) due 2025-04-01"));

        assert_eq!(
            task_cmd(&storage, TaskAction::Delete { id: id.clone() }),
            format!("Deleted task {id}")
        );
        assert_eq!(
            task_cmd(&storage, TaskAction::Delete { id: id.clone() }),
            format!("No task with id {id}")
        );
    }

    #[test]
    fn test_workout_session_is_persisted_between_commands() {
        let storage = MemoryStorage::new();
        workout_cmd(
            &storage,
            WorkoutAction::Start {
                name: "Leg day".to_string(),
                notes: None,
            },
        )
        .unwrap();
        assert!(storage.get_item(ACTIVE_WORKOUT_KEY).unwrap().is_some());

        workout_cmd(
            &storage,
            WorkoutAction::Exercise {
                name: "Squat".to_string(),
                category: None,
            },
        )
        .unwrap();
        let exercise_id = ActiveWorkout::load(&storage).unwrap().unwrap().exercises[0]
            .id
            .clone();
        workout_cmd(
            &storage,
            WorkoutAction::Set {
                exercise_id,
                reps: 5,
                weight: Some(100.0),
                duration: None,
                distance: None,
            },
        )
        .unwrap();

        workout_cmd(&storage, WorkoutAction::Finish).unwrap();
        assert!(storage.get_item(ACTIVE_WORKOUT_KEY).unwrap().is_none());

        let recorded = Workouts::new(&storage).all().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].name, "Leg day");
        assert_eq!(recorded[0].exercises[0].sets[0].reps, 5);
    }

    #[test]
    fn test_workout_commands_need_a_session() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            workout_cmd(&storage, WorkoutAction::Finish),
            Err(CommandError::NoActiveWorkout)
        ));

        let start = || WorkoutAction::Start {
            name: DEFAULT_WORKOUT_NAME.to_string(),
            notes: None,
        };
        workout_cmd(&storage, start()).unwrap();
        assert!(matches!(
            workout_cmd(&storage, start()),
            Err(CommandError::WorkoutInProgress(_))
        ));
    }

    #[test]
    fn test_expense_summary_lists_top_categories() {
        let storage = MemoryStorage::new();
        let add = |amount: &str, description: &str, category: &str, kind: EntryType| {
            execute(
                &storage,
                PlannerCommand::Expenses {
                    action: ExpenseAction::Add {
                        amount: amount.parse().unwrap(),
                        description: description.to_string(),
                        category: Some(category.to_string()),
                        kind,
                        date: None,
                    },
                },
                clock(),
            )
            .unwrap()
        };
        add("2000", "Salary", "Work", EntryType::Income);
        add("42.5", "Groceries", "Food", EntryType::Expense);
        add("12", "Cinema", "Fun", EntryType::Expense);

        let summary = execute(
            &storage,
            PlannerCommand::Expenses {
                action: ExpenseAction::Summary,
            },
            clock(),
        )
        .unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines[0],
            "March 2025: income $2000.00, expenses $54.50, net $1945.50"
        );
        assert_eq!(lines[1], "  Food: $42.50");
        assert_eq!(lines[2], "  Fun: $12.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_watchlist_rating_out_of_range_is_rejected() {
        let storage = MemoryStorage::new();
        let item = Watchlist::new(&storage)
            .add(
                NewWatchlistItem {
                    title: "Dune".to_string(),
                    kind: MediaType::Book,
                    genre: None,
                    year: None,
                    notes: None,
                },
                clock().now,
            )
            .unwrap();

        let result = execute(
            &storage,
            PlannerCommand::Watchlist {
                action: WatchlistAction::Rate {
                    id: item.id,
                    rating: 6,
                },
            },
            clock(),
        );
        assert!(matches!(result, Err(CommandError::Planner(_))));
    }
}
