//! Integration tests for planner collections kept in a data directory.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{NaiveDate, TimeZone, Utc};
use homebase_planner::expenses::{self, EntryType, Expenses, NewExpense};
use homebase_planner::tasks::{NewTask, Priority, Tasks};
use homebase_planner::workouts::{ActiveWorkout, Workouts};
use homebase_planner::{FileStorage, Storage};
use serde_json::Value;

#[test]
fn test_collections_survive_reopening_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

    {
        let storage = FileStorage::open(dir.path()).unwrap();
        Tasks::new(&storage)
            .add(
                NewTask {
                    title: "Renew passport".to_string(),
                    description: None,
                    priority: Priority::High,
                    due_date: None,
                    category: None,
                },
                now,
            )
            .unwrap();
        Expenses::new(&storage)
            .add(NewExpense {
                amount: "19.99".parse().unwrap(),
                description: "Books".to_string(),
                category: None,
                kind: EntryType::Expense,
                date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
            })
            .unwrap();
    }

    let storage = FileStorage::open(dir.path()).unwrap();
    let tasks = Tasks::new(&storage).all().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Renew passport");

    let ledger = Expenses::new(&storage).all().unwrap();
    assert_eq!(ledger[0].category, "Other");
    let month = expenses::monthly_summary(&ledger, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    assert_eq!(month.expenses.to_string(), "19.99");
}

#[test]
fn test_files_hold_browser_compatible_json() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

    Expenses::new(&storage)
        .add(NewExpense {
            amount: "12.5".parse().unwrap(),
            description: "Lunch".to_string(),
            category: Some("Food".to_string()),
            kind: EntryType::Expense,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        })
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("expenses.json")).unwrap();
    let json: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["amount"], 12.5);
    assert_eq!(json[0]["type"], "expense");
    assert_eq!(json[0]["date"], "2025-03-10");

    let mut session = ActiveWorkout::start("Run", None, now);
    session.add_exercise("Intervals", Some("cardio")).unwrap();
    session.save(&storage).unwrap();
    assert!(dir.path().join("activeWorkout.json").exists());

    let finished = ActiveWorkout::load(&storage).unwrap().unwrap().finish(now);
    Workouts::new(&storage).record(finished).unwrap();
    ActiveWorkout::clear(&storage).unwrap();

    assert!(storage.get_item("activeWorkout").unwrap().is_none());
    let raw = std::fs::read_to_string(dir.path().join("workouts.json")).unwrap();
    let json: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["exercises"][0]["name"], "Intervals");
}

#[test]
fn test_corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tasks.json"), "{not json").unwrap();

    let storage = FileStorage::open(dir.path()).unwrap();
    assert!(Tasks::new(&storage).all().unwrap().is_empty());
}
