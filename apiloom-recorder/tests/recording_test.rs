//! End-to-end recording passes against an in-memory cassette transport

use apiloom::{ArgMap, ArgValue, CallContext, Endpoint, HandlerError, HandlerOutput, Param, Registry, Surface};
use apiloom_config::LoomConfig;
use apiloom_recorder::{Cassette, CassetteFactory, RecorderError, Recorder, Session};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_test::traced_test;

type Journal = Arc<Mutex<Vec<String>>>;

/// Logs cassette lifecycle events and every handler call
#[derive(Clone, Default)]
struct Tape {
    journal: Journal,
}

struct OpenCassette {
    name: String,
    journal: Journal,
}

#[async_trait]
impl CassetteFactory for Tape {
    type Http = String;
    type Cassette = OpenCassette;

    async fn open(&self, cassette: &str) -> anyhow::Result<OpenCassette> {
        if cassette == "broken" {
            anyhow::bail!("cannot open {cassette}");
        }
        self.journal.lock().unwrap().push(format!("open {cassette}"));
        Ok(OpenCassette {
            name: cassette.to_string(),
            journal: self.journal.clone(),
        })
    }
}

#[async_trait]
impl Cassette for OpenCassette {
    type Http = String;

    fn http_client(&self) -> String {
        self.name.clone()
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.journal.lock().unwrap().push(format!("close {}", self.name));
        Ok(())
    }
}

struct Client {
    cassette: String,
    session: Vec<u8>,
    journal: Journal,
}

impl Client {
    fn log(&self, line: String) {
        self.journal.lock().unwrap().push(line);
    }
}

fn build_client(journal: Journal) -> impl Fn(String, &Session) -> anyhow::Result<Client> {
    move |cassette, session| {
        Ok(Client {
            cassette,
            session: session.as_bytes().to_vec(),
            journal: journal.clone(),
        })
    }
}

fn workouts_registry() -> Registry<Client> {
    let mut registry = Registry::new();

    registry.register(
        Endpoint::builder("workout_sets")
            .cassette("workouts")
            .param(Param::int("id", "Workout id").required())
            .depends_on("workout_get", |previous| {
                let sets = previous["sets"].as_i64()?;
                let mut args = ArgMap::new();
                args.insert("id".to_string(), ArgValue::Int(sets));
                Some(args)
            })
            .handler(|_ctx, client: Arc<Client>, args| async move {
                client.log(format!("sets id={}", args.int("id")));
                Ok(HandlerOutput::Json(json!({})))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("workout_list")
            .cassette("workouts")
            .param(Param::int("limit", "Page size"))
            .param(Param::date_range("Window"))
            .handler(|_ctx, client: Arc<Client>, args| async move {
                client.log(format!(
                    "list limit={} start={} end={}",
                    args.int_or("limit", 0),
                    args.date("start").format("%Y-%m-%d"),
                    args.date("end").format("%Y-%m-%d"),
                ));
                Ok(HandlerOutput::Json(json!([{ "id": 41 }, { "id": 42 }])))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("workout_get")
            .cassette("workouts")
            .param(Param::int("id", "Workout id").required())
            .depends_on("workout_list", |previous| {
                let id = previous.get(0)?.get("id")?.as_i64()?;
                let mut args = ArgMap::new();
                args.insert("id".to_string(), ArgValue::Int(id));
                Some(args)
            })
            .handler(|_ctx, client: Arc<Client>, args| async move {
                client.log(format!("get id={}", args.int("id")));
                Ok(HandlerOutput::Json(json!({ "id": args.int("id"), "sets": 3 })))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("profile")
            .cassette("account")
            .handler(|_ctx, client: Arc<Client>, _args| async move {
                client.log(format!(
                    "profile via {} session={}",
                    client.cassette,
                    String::from_utf8_lossy(&client.session)
                ));
                Err(HandlerError::upstream(500, "boom"))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("profile_photo")
            .cassette("account")
            .depends_on("profile", |_previous| None)
            .handler(|_ctx, client: Arc<Client>, _args| async move {
                client.log("photo".to_string());
                Ok(HandlerOutput::Json(json!({})))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("create_workout")
            .cassette("none")
            .handler(|_ctx, client: Arc<Client>, _args| async move {
                client.log("create".to_string());
                Ok(HandlerOutput::Json(json!({})))
            })
            .build(),
    );

    registry
}

fn ctx() -> CallContext {
    CallContext::new(Surface::Recorder)
}

fn journal_of(tape: &Tape) -> Vec<String> {
    tape.journal.lock().unwrap().clone()
}

#[tokio::test]
async fn test_dependents_run_after_upstream_with_provided_args() {
    let registry = workouts_registry();
    let tape = Tape::default();
    let recorder = Recorder::new(&registry, tape.clone(), build_client(tape.journal.clone()))
        .with_reference(Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap());

    let report = recorder.record_cassette(&ctx(), "workouts").await.unwrap();

    assert_eq!(report.recorded, vec!["workout_list", "workout_get", "workout_sets"]);
    assert!(report.skipped.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(
        journal_of(&tape),
        vec![
            "open workouts",
            "list limit=10 start=2024-03-01 end=2024-03-08",
            "get id=41",
            "sets id=3",
            "close workouts",
        ]
    );
}

#[tokio::test]
async fn test_failures_and_skips_do_not_stop_the_cassette() {
    let registry = workouts_registry();
    let tape = Tape::default();
    let recorder = Recorder::new(&registry, tape.clone(), build_client(tape.journal.clone()))
        .with_session(Session::new("token-1"));

    let report = recorder.record_cassette(&ctx(), "account").await.unwrap();

    assert!(report.recorded.is_empty());
    assert_eq!(report.failed, vec!["profile"]);
    assert_eq!(report.skipped, vec!["profile_photo"]);
    assert_eq!(
        journal_of(&tape),
        vec![
            "open account",
            "profile via account session=token-1",
            "close account",
        ]
    );
}

#[tokio::test]
async fn test_record_all_visits_cassettes_in_first_seen_order() {
    let registry = workouts_registry();
    let tape = Tape::default();
    let recorder = Recorder::new(&registry, tape.clone(), build_client(tape.journal.clone()));

    let reports = recorder.record_all(&ctx()).await.unwrap();

    let cassettes: Vec<_> = reports.iter().map(|r| r.cassette.as_str()).collect();
    assert_eq!(cassettes, vec!["workouts", "account"]);
    assert!(!journal_of(&tape).iter().any(|line| line == "create"));
}

#[tokio::test]
async fn test_unknown_and_unrecorded_cassettes_are_not_found() {
    let registry = workouts_registry();
    let tape = Tape::default();
    let recorder = Recorder::new(&registry, tape.clone(), build_client(tape.journal.clone()));

    for name in ["missing", "none", ""] {
        let err = recorder.record_cassette(&ctx(), name).await.unwrap_err();
        assert!(matches!(err, RecorderError::CassetteNotFound { .. }));
    }
    assert!(journal_of(&tape).is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_an_error() {
    let mut registry = Registry::new();
    registry.register(Endpoint::<Client>::builder("ping").cassette("broken").build());
    let tape = Tape::default();
    let recorder = Recorder::new(&registry, tape.clone(), build_client(tape.journal.clone()));

    let err = recorder.record_cassette(&ctx(), "broken").await.unwrap_err();
    assert!(matches!(err, RecorderError::Transport { .. }));
}

#[tokio::test]
async fn test_client_build_failure_closes_the_cassette() {
    let registry = workouts_registry();
    let tape = Tape::default();
    let recorder = Recorder::new(&registry, tape.clone(), |_http: String, _session: &Session| {
        anyhow::bail!("no credentials")
    });

    let err = recorder.record_cassette(&ctx(), "account").await.unwrap_err();
    assert!(matches!(err, RecorderError::ClientBuild { .. }));
    assert_eq!(journal_of(&tape), vec!["open account", "close account"]);
}

#[tokio::test]
async fn test_settings_supply_session_and_reference_date() {
    let dir = TempDir::new().unwrap();
    let session_file = dir.path().join("session.bin");
    std::fs::write(&session_file, "from-file").unwrap();
    let config = LoomConfig {
        reference_date: NaiveDate::from_ymd_opt(2024, 1, 10),
        session_file: Some(session_file),
        ..Default::default()
    };

    let registry = workouts_registry();
    let tape = Tape::default();
    let recorder = Recorder::new(&registry, tape.clone(), build_client(tape.journal.clone()))
        .with_config(&config)
        .unwrap();

    recorder.record_all(&ctx()).await.unwrap();

    let journal = journal_of(&tape);
    assert!(journal.contains(&"list limit=10 start=2024-01-03 end=2024-01-10".to_string()));
    assert!(journal.contains(&"profile via account session=from-file".to_string()));
}

#[tokio::test]
#[traced_test]
async fn test_cycle_is_logged_and_recorded_once() {
    let mut registry = Registry::new();
    registry.register(
        Endpoint::builder("left")
            .cassette("loop")
            .depends_on("right", |_| Some(ArgMap::new()))
            .handler(|_ctx, client: Arc<Client>, _args| async move {
                client.log("left".to_string());
                Ok(HandlerOutput::Json(json!({})))
            })
            .build(),
    );
    registry.register(
        Endpoint::builder("right")
            .cassette("loop")
            .depends_on("left", |_| Some(ArgMap::new()))
            .handler(|_ctx, client: Arc<Client>, _args| async move {
                client.log("right".to_string());
                Ok(HandlerOutput::Json(json!({})))
            })
            .build(),
    );
    let tape = Tape::default();
    let recorder = Recorder::new(&registry, tape.clone(), build_client(tape.journal.clone()));

    let report = recorder.record_cassette(&ctx(), "loop").await.unwrap();

    assert_eq!(report.recorded, vec!["right", "left"]);
    assert!(logs_contain("Dependency cycle through endpoint left"));
}
