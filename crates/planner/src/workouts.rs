//! Workout sessions and the workout log.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::storage::{Collection, Storage};
use crate::{new_id, non_blank, remove_by_id};

/// Storage key for finished workouts.
pub const WORKOUTS_KEY: &str = "workouts";

/// Storage key for a workout still in progress.
pub const ACTIVE_WORKOUT_KEY: &str = "activeWorkout";

/// Name used when a workout is started without one.
pub const DEFAULT_WORKOUT_NAME: &str = "Quick Workout";

/// Category used when an exercise is added without one.
pub const DEFAULT_EXERCISE_CATEGORY: &str = "strength";

/// One set of an exercise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Seconds, for timed exercises.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// For cardio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
}

/// A finished workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub name: String,
    /// When the workout started.
    pub date: DateTime<Utc>,
    /// Whole minutes.
    pub duration: u32,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A workout in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorkout {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl ActiveWorkout {
    /// Begin a workout at `now`. A blank name becomes "Quick Workout".
    #[must_use]
    pub fn start(name: &str, notes: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: non_blank(Some(name)).unwrap_or_else(|| DEFAULT_WORKOUT_NAME.to_string()),
            notes: non_blank(notes),
            started_at: now,
            exercises: Vec::new(),
        }
    }

    /// Append an exercise with no sets.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Required` if the name is blank.
    pub fn add_exercise(
        &mut self,
        name: &str,
        category: Option<&str>,
    ) -> Result<&Exercise, PlannerError> {
        let name = non_blank(Some(name)).ok_or(PlannerError::Required("exercise name"))?;
        let category = non_blank(category).unwrap_or_else(|| DEFAULT_EXERCISE_CATEGORY.to_string());
        self.exercises.push(Exercise {
            id: new_id(),
            name,
            category,
            sets: Vec::new(),
        });
        self.exercises
            .last()
            .ok_or(PlannerError::Required("exercise name"))
    }

    /// Append an empty set (0 reps, 0 weight) to an exercise.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::NotFound` if the exercise does not exist.
    pub fn add_set(&mut self, exercise_id: &str) -> Result<usize, PlannerError> {
        let exercise = self.exercise_mut(exercise_id)?;
        exercise.sets.push(ExerciseSet {
            reps: 0,
            weight: Some(0.0),
            ..ExerciseSet::default()
        });
        Ok(exercise.sets.len() - 1)
    }

    /// Replace set `index` of an exercise.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::NotFound` or `PlannerError::NoSuchSet`.
    pub fn update_set(
        &mut self,
        exercise_id: &str,
        index: usize,
        set: ExerciseSet,
    ) -> Result<(), PlannerError> {
        let exercise = self.exercise_mut(exercise_id)?;
        let slot = exercise
            .sets
            .get_mut(index)
            .ok_or_else(|| PlannerError::NoSuchSet {
                exercise_id: exercise_id.to_owned(),
                index,
            })?;
        *slot = set;
        Ok(())
    }

    /// Whole minutes since the start; 0 if the clock went backwards.
    #[must_use]
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        u32::try_from((now - self.started_at).num_minutes().max(0)).unwrap_or(u32::MAX)
    }

    /// End the session, keeping the recorded exercises.
    #[must_use]
    pub fn finish(self, now: DateTime<Utc>) -> Workout {
        let duration = self.elapsed_minutes(now);
        Workout {
            id: self.id,
            name: self.name,
            date: self.started_at,
            duration,
            exercises: self.exercises,
            notes: self.notes,
        }
    }

    /// The in-progress workout, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Storage` if storage cannot be read.
    pub fn load(storage: &dyn Storage) -> Result<Option<Self>, PlannerError> {
        let Some(raw) = storage.get_item(ACTIVE_WORKOUT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(active) => Ok(Some(active)),
            Err(e) => {
                tracing::warn!(key = ACTIVE_WORKOUT_KEY, "Ignoring unreadable active workout: {}", e);
                Ok(None)
            }
        }
    }

    /// Persist this session so it survives between runs.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if encoding or storage fails.
    pub fn save(&self, storage: &dyn Storage) -> Result<(), PlannerError> {
        let raw = serde_json::to_string(self).map_err(|source| PlannerError::Encode {
            key: ACTIVE_WORKOUT_KEY,
            source,
        })?;
        storage.set_item(ACTIVE_WORKOUT_KEY, &raw)?;
        Ok(())
    }

    /// Forget any saved session.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Storage` if storage fails.
    pub fn clear(storage: &dyn Storage) -> Result<(), PlannerError> {
        storage.remove_item(ACTIVE_WORKOUT_KEY)?;
        Ok(())
    }

    fn exercise_mut(&mut self, exercise_id: &str) -> Result<&mut Exercise, PlannerError> {
        self.exercises
            .iter_mut()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| PlannerError::not_found("exercise", exercise_id))
    }
}

/// Workouts within the last seven days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySummary {
    pub count: usize,
    pub total_minutes: u32,
}

/// The persisted workout log.
pub struct Workouts<'a> {
    items: Collection<'a, Workout>,
}

impl<'a> Workouts<'a> {
    #[must_use]
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self {
            items: Collection::new(storage, WORKOUTS_KEY),
        }
    }

    /// All workouts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage cannot be read.
    pub fn all(&self) -> Result<Vec<Workout>, PlannerError> {
        self.items.load()
    }

    /// Add a finished workout at the front of the log.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage fails.
    pub fn record(&self, workout: Workout) -> Result<(), PlannerError> {
        tracing::debug!(id = %workout.id, minutes = workout.duration, "Workout recorded");
        self.items.update(|items| {
            items.insert(0, workout);
            Ok(())
        })
    }

    /// Remove a workout. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage fails.
    pub fn delete(&self, id: &str) -> Result<bool, PlannerError> {
        self.items
            .update(|items| Ok(remove_by_id(items, id, |w: &Workout| &w.id)))
    }
}

/// Workouts dated no earlier than seven days before `now`.
#[must_use]
pub fn weekly_summary(workouts: &[Workout], now: DateTime<Utc>) -> WeeklySummary {
    let week_ago = now - Duration::days(7);
    let recent = workouts.iter().filter(|w| w.date >= week_ago);
    let (count, total_minutes) = recent.fold((0, 0_u32), |(count, minutes), w| {
        (count + 1, minutes.saturating_add(w.duration))
    });
    WeeklySummary {
        count,
        total_minutes,
    }
}

/// `"1h 5m"` for an hour or more, otherwise `"45m"`.
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    let (hours, mins) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::storage::MemoryStorage;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_start_defaults() {
        let workout = ActiveWorkout::start("  ", Some(""), at(7, 0));
        assert_eq!(workout.name, "Quick Workout");
        assert_eq!(workout.notes, None);
        assert!(workout.exercises.is_empty());
    }

    #[test]
    fn test_session_records_exercises_and_sets() {
        let mut workout = ActiveWorkout::start("Push day", None, at(7, 0));
        let bench = workout.add_exercise("Bench press", None).unwrap().id.clone();
        assert_eq!(workout.exercises[0].category, "strength");
        assert!(workout.add_exercise(" ", Some("cardio")).is_err());

        let index = workout.add_set(&bench).unwrap();
        assert_eq!(workout.exercises[0].sets[index].weight, Some(0.0));
        workout
            .update_set(
                &bench,
                index,
                ExerciseSet {
                    reps: 8,
                    weight: Some(60.0),
                    ..ExerciseSet::default()
                },
            )
            .unwrap();
        assert!(matches!(
            workout.update_set(&bench, 5, ExerciseSet::default()),
            Err(PlannerError::NoSuchSet { index: 5, .. })
        ));
        assert!(workout.add_set("missing").is_err());

        let finished = workout.finish(at(8, 5));
        assert_eq!(finished.duration, 65);
        assert_eq!(finished.date, at(7, 0));
        assert_eq!(finished.exercises[0].sets[0].reps, 8);
    }

    #[test]
    fn test_elapsed_minutes_never_negative() {
        let workout = ActiveWorkout::start("x", None, at(9, 0));
        assert_eq!(workout.elapsed_minutes(at(8, 0)), 0);
        assert_eq!(workout.elapsed_minutes(at(9, 0)), 0);
    }

    #[test]
    fn test_record_delete_and_weekly_summary() {
        let storage = MemoryStorage::new();
        let log = Workouts::new(&storage);

        let old = ActiveWorkout::start("Old", None, at(7, 0) - Duration::days(10)).finish(at(7, 30) - Duration::days(10));
        let recent = ActiveWorkout::start("Recent", None, at(7, 0) - Duration::days(2)).finish(at(7, 45) - Duration::days(2));
        log.record(old.clone()).unwrap();
        log.record(recent.clone()).unwrap();

        let all = log.all().unwrap();
        assert_eq!(all[0].name, "Recent");
        assert_eq!(
            weekly_summary(&all, at(12, 0)),
            WeeklySummary {
                count: 1,
                total_minutes: 45
            }
        );

        assert!(log.delete(&old.id).unwrap());
        let ids: Vec<_> = log.all().unwrap().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, [recent.id]);
    }

    #[test]
    fn test_active_workout_persists() {
        let storage = MemoryStorage::new();
        assert_eq!(ActiveWorkout::load(&storage).unwrap(), None);

        let mut workout = ActiveWorkout::start("Legs", None, at(6, 0));
        workout.add_exercise("Squat", None).unwrap();
        workout.save(&storage).unwrap();
        assert_eq!(ActiveWorkout::load(&storage).unwrap(), Some(workout));

        ActiveWorkout::clear(&storage).unwrap();
        assert_eq!(ActiveWorkout::load(&storage).unwrap(), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(65), "1h 5m");
        assert_eq!(format_duration(120), "2h 0m");
        assert_eq!(format_duration(0), "0m");
    }
}
