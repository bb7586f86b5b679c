//! In-memory training log served by the demo binary

use apiloom::{ArgMap, ArgValue, BodyConfig, Endpoint, HandlerError, HandlerOutput, Param, Registry};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};

const SERVICE: &str = "training";

#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    pub name: &'static str,
    pub muscle_group: &'static str,
    pub equipment: &'static str,
}

fn catalog() -> &'static [Exercise] {
    static CATALOG: OnceLock<Vec<Exercise>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![
            Exercise {
                name: "squat",
                muscle_group: "legs",
                equipment: "barbell",
            },
            Exercise {
                name: "bench press",
                muscle_group: "chest",
                equipment: "barbell",
            },
            Exercise {
                name: "pull-up",
                muscle_group: "back",
                equipment: "bar",
            },
            Exercise {
                name: "plank",
                muscle_group: "core",
                equipment: "none",
            },
        ]
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct Workout {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub minutes: i64,
    pub exercises: Vec<String>,
}

/// Request body for creating a workout
#[derive(Debug, Deserialize)]
pub struct NewWorkout {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub minutes: i64,
    #[serde(default)]
    pub exercises: Vec<String>,
}

/// The demo's API client
pub struct TrainingLog {
    workouts: Mutex<Vec<Workout>>,
}

impl TrainingLog {
    pub fn new(workouts: Vec<Workout>) -> Self {
        Self {
            workouts: Mutex::new(workouts),
        }
    }

    /// A log holding a week of sample workouts in March 2024
    pub fn seeded() -> Self {
        let sample = [
            (1, "Leg day", 4, 55, vec!["squat"]),
            (2, "Upper body", 5, 45, vec!["bench press", "pull-up"]),
            (3, "Core", 7, 20, vec!["plank"]),
        ];
        Self::new(
            sample
                .into_iter()
                .filter_map(|(id, title, day, minutes, exercises)| {
                    Some(Workout {
                        id,
                        title: title.to_string(),
                        date: NaiveDate::from_ymd_opt(2024, 3, day)?,
                        minutes,
                        exercises: exercises.into_iter().map(str::to_string).collect(),
                    })
                })
                .collect(),
        )
    }

    fn snapshot(&self) -> Result<Vec<Workout>, HandlerError> {
        self.workouts
            .lock()
            .map(|workouts| workouts.clone())
            .map_err(|_| HandlerError::Other(anyhow::anyhow!("training log is poisoned")))
    }

    fn list(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<Workout>, HandlerError> {
        let mut workouts: Vec<Workout> = self
            .snapshot()?
            .into_iter()
            .filter(|w| start.is_none_or(|start| w.date >= start))
            .filter(|w| end.is_none_or(|end| w.date <= end))
            .collect();
        workouts.sort_by_key(|w| (w.date, w.id));
        if limit > 0 {
            workouts.truncate(limit as usize);
        }
        Ok(workouts)
    }

    fn get(&self, id: i64) -> Result<Workout, HandlerError> {
        self.snapshot()?
            .into_iter()
            .find(|w| w.id == id)
            .ok_or_else(|| HandlerError::upstream(404, format!("workout {id} not found")))
    }

    fn create(&self, new: &NewWorkout, today: NaiveDate) -> Result<Workout, HandlerError> {
        let mut workouts = self
            .workouts
            .lock()
            .map_err(|_| HandlerError::Other(anyhow::anyhow!("training log is poisoned")))?;
        let workout = Workout {
            id: workouts.iter().map(|w| w.id).max().unwrap_or(0) + 1,
            title: new.title.clone(),
            date: new.date.unwrap_or(today),
            minutes: new.minutes,
            exercises: new.exercises.clone(),
        };
        workouts.push(workout.clone());
        Ok(workout)
    }
}

fn day_of(date: DateTime<Utc>) -> NaiveDate {
    date.date_naive()
}

/// Every endpoint the demo exposes
pub fn registry() -> Registry<TrainingLog> {
    let mut registry = Registry::new();

    registry.register(
        Endpoint::builder("workout_list")
            .service(SERVICE)
            .cassette("workouts")
            .get("/v1/workouts")
            .param(Param::date_range("Only workouts inside this window"))
            .param(Param::int("limit", "Maximum number of workouts to return"))
            .cli("workouts", Some("list"))
            .aliases(["ls"])
            .tool("workout_list")
            .short("List workouts")
            .long("List logged workouts ordered by date, optionally limited to a date window.")
            .handler(|_ctx, log: Arc<TrainingLog>, args| async move {
                let workouts = log.list(
                    args.date_opt("start").map(day_of),
                    args.date_opt("end").map(day_of),
                    args.int_or("limit", 0),
                )?;
                HandlerOutput::json(&workouts)
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("workout_get")
            .service(SERVICE)
            .cassette("workouts")
            .get("/v1/workouts/{id}")
            .param(Param::int("id", "Workout id").required())
            .depends_on("workout_list", first_workout_id)
            .cli("workouts", Some("get"))
            .tool("workout_get")
            .short("Show one workout")
            .long("Show a single workout with the exercises it contained.")
            .handler(|_ctx, log: Arc<TrainingLog>, args| async move {
                HandlerOutput::json(&log.get(args.int("id"))?)
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("workout_create")
            .service(SERVICE)
            .cassette("none")
            .post("/v1/workouts")
            .body(
                BodyConfig::of::<NewWorkout>()
                    .description("The workout to log")
                    .example(r#"{"title": "Intervals", "date": "2024-03-09", "minutes": 30}"#),
            )
            .cli("workouts", Some("create"))
            .tool("workout_create")
            .short("Log a workout")
            .long("Log a new workout. The date defaults to today when omitted.")
            .handler(|_ctx, log: Arc<TrainingLog>, args| async move {
                let new = args
                    .body::<NewWorkout>()
                    .ok_or_else(|| HandlerError::Other(anyhow::anyhow!("workout body is missing")))?;
                HandlerOutput::json(&log.create(new, Utc::now().date_naive())?)
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("exercise_lookup")
            .service(SERVICE)
            .cassette("exercises")
            .get("/v1/exercises/{name}")
            .param(Param::string("name", "Exercise name").required())
            .cli("exercise", None)
            .tool("exercise_lookup")
            .short("Look up an exercise")
            .long("Look up an exercise in the catalog by name, case-insensitively.")
            .handler(|_ctx, _log: Arc<TrainingLog>, args| async move {
                let name = args.string("name");
                let exercise = catalog()
                    .iter()
                    .find(|e| e.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| HandlerError::upstream(404, format!("exercise '{name}' not found")))?;
                HandlerOutput::json(exercise)
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("workout_export")
            .service(SERVICE)
            .cassette("workouts")
            .get("/v1/workouts/export")
            .param(Param::date("day", "Export workouts up to and including this day"))
            .cli("export", None)
            .raw_output()
            .short("Export workouts as CSV")
            .long("Export every workout up to a day as CSV with an id,date,title,minutes header.")
            .handler(|_ctx, log: Arc<TrainingLog>, args| async move {
                let until = day_of(args.date("day"));
                let mut csv = String::from("id,date,title,minutes\n");
                for w in log.list(None, Some(until), 0)? {
                    csv.push_str(&format!("{},{},{},{}\n", w.id, w.date, w.title, w.minutes));
                }
                Ok(HandlerOutput::raw(csv.into_bytes()))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("daily_summary")
            .service(SERVICE)
            .cassette("workouts")
            .get("/v1/summary/{day}")
            .param(Param::date("day", "Day to summarize"))
            .param(Param::bool("detailed", "Include minutes per exercise"))
            .cli("summary", None)
            .tool("daily_summary")
            .short("Summarize a day")
            .long("Total the workouts logged on a day.")
            .handler(|_ctx, log: Arc<TrainingLog>, args| async move {
                let day = day_of(args.date("day"));
                let workouts = log.list(Some(day), Some(day), 0)?;
                let mut summary = json!({
                    "day": day.to_string(),
                    "workouts": workouts.len(),
                    "minutes": workouts.iter().map(|w| w.minutes).sum::<i64>(),
                });
                if args.bool("detailed") {
                    let mut per_exercise: BTreeMap<&str, i64> = BTreeMap::new();
                    for w in &workouts {
                        let share = w.minutes / (w.exercises.len().max(1) as i64);
                        for exercise in &w.exercises {
                            *per_exercise.entry(exercise.as_str()).or_default() += share;
                        }
                    }
                    summary["exercises"] = json!(per_exercise);
                }
                Ok(HandlerOutput::Json(summary))
            })
            .build(),
    );

    registry
}

fn first_workout_id(listing: &Value) -> Option<ArgMap> {
    let id = listing.as_array()?.first()?.get("id")?.as_i64()?;
    let mut args = ArgMap::new();
    args.insert("id".to_string(), ArgValue::Int(id));
    Some(args)
}
