//! Integration tests for tool generation and dispatch

use apiloom::{
    BodyConfig, CallContext, Endpoint, HandlerError, HandlerOutput, Param, Registry, Surface,
};
use apiloom_tools::ToolGenerator;
use rmcp::model::{CallToolResult, JsonObject, RawContent};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

struct Gym {
    name: &'static str,
}

#[derive(Debug, Deserialize)]
struct NewWorkout {
    title: String,
    minutes: i64,
}

fn registry() -> Registry<Gym> {
    let mut registry = Registry::new();

    registry.register(
        Endpoint::builder("get_workout")
            .get("/v1/workouts/{id}")
            .param(Param::int("id", "Workout id").required())
            .param(Param::int("limit", "Maximum sets"))
            .param(Param::bool("detailed", "Include sets"))
            .tool("get_workout")
            .short("Show one workout")
            .handler(|_ctx, gym: Arc<Gym>, args| async move {
                Ok(HandlerOutput::Json(json!({
                    "gym": gym.name,
                    "id": args.int("id"),
                    "limit_set": args.has("limit"),
                    "detailed": args.bool("detailed"),
                })))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("export_workouts")
            .get("/v1/workouts/export")
            .tool("export_workouts")
            .raw_output()
            .handler(|_ctx, _gym, _args| async move { Ok(HandlerOutput::raw(b"a,b\n".to_vec())) })
            .build(),
    );

    registry.register(
        Endpoint::builder("cli_only")
            .get("/v1/cli")
            .cli("cli-only", None)
            .build(),
    );

    registry.register(
        Endpoint::builder("create_workout")
            .post("/v1/workouts")
            .body(BodyConfig::of::<NewWorkout>().description("Workout to create"))
            .tool("create_workout")
            .short("Create a workout")
            .handler(|_ctx, _gym, args| async move {
                let workout = args
                    .body::<NewWorkout>()
                    .ok_or_else(|| HandlerError::Other(anyhow::anyhow!("no body")))?;
                Ok(HandlerOutput::Json(json!({
                    "title": workout.title,
                    "minutes": workout.minutes,
                })))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("history")
            .get("/v1/history")
            .param(Param::date("day", "Day to show"))
            .param(Param::date_range("Window"))
            .tool("history")
            .short("Workout history")
            .handler(|_ctx, _gym, args| async move {
                Ok(HandlerOutput::Json(json!({
                    "day_set": args.has("day"),
                    "start": args.date_opt("start").map(|d| d.format("%Y-%m-%d").to_string()),
                    "end_set": args.has("end"),
                })))
            })
            .build(),
    );

    registry.register(
        Endpoint::builder("flaky")
            .get("/v1/flaky")
            .tool("flaky")
            .short("Always fails upstream")
            .handler(|_ctx, _gym, _args| async move {
                Err(HandlerError::upstream(503, "service unavailable"))
            })
            .build(),
    );

    registry
}

fn arguments(value: Value) -> Option<JsonObject> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn text_of(result: &CallToolResult) -> String {
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.clone(),
        _ => panic!("expected text content"),
    }
}

fn ctx() -> CallContext {
    CallContext::new(Surface::Tool)
}

#[test]
fn test_only_eligible_endpoints_become_tools() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let names: Vec<String> = tools
        .list_tools()
        .iter()
        .map(|t| t.name.to_string())
        .collect();
    assert_eq!(
        names,
        vec!["get_workout", "create_workout", "history", "flaky"]
    );
    assert!(tools.get("export_workouts").is_none());
    assert_eq!(tools.len(), 4);
}

#[test]
fn test_tool_description_falls_back_to_short() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();
    let tool = tools.get("get_workout").unwrap().tool();

    assert_eq!(tool.description.as_deref(), Some("Show one workout"));
}

#[tokio::test]
async fn test_successful_call_returns_pretty_json() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(
            ctx(),
            "get_workout",
            arguments(json!({ "id": 12, "limit": 0, "detailed": true })),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let text = text_of(&result);
    assert!(text.contains("\n  \"gym\": \"north\""));
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        value,
        json!({ "gym": "north", "id": 12, "limit_set": false, "detailed": true })
    );
}

#[tokio::test]
async fn test_string_numbers_are_parsed() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(ctx(), "get_workout", arguments(json!({ "id": "7" })))
        .await
        .unwrap();

    let value: Value = serde_json::from_str(&text_of(&result)).unwrap();
    assert_eq!(value["id"], 7);
}

#[tokio::test]
async fn test_whole_float_numbers_are_integers() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(
            ctx(),
            "get_workout",
            arguments(json!({ "id": 7.0, "limit": 5.0 })),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let value: Value = serde_json::from_str(&text_of(&result)).unwrap();
    assert_eq!(value["id"], 7);
    assert_eq!(value["limit_set"], true);
}

#[tokio::test]
async fn test_fractional_number_is_tool_error() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(ctx(), "get_workout", arguments(json!({ "id": 7.5 })))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(text_of(&result), "invalid integer for id: '7.5'");
}

#[tokio::test]
async fn test_missing_required_param_is_tool_error() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools.call_tool(ctx(), "get_workout", None).await.unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(text_of(&result), "missing required argument: id");
}

#[tokio::test]
async fn test_body_is_decoded_from_string_property() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(
            ctx(),
            "create_workout",
            arguments(json!({ "newWorkout": "{\"title\": \"Legs\", \"minutes\": 40}" })),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let value: Value = serde_json::from_str(&text_of(&result)).unwrap();
    assert_eq!(value, json!({ "title": "Legs", "minutes": 40 }));
}

#[tokio::test]
async fn test_invalid_body_is_tool_error() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(
            ctx(),
            "create_workout",
            arguments(json!({ "newWorkout": "{\"title\": 5}" })),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(text_of(&result).starts_with("invalid NewWorkout body"));
}

#[tokio::test]
async fn test_missing_body_is_tool_error() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(ctx(), "create_workout", arguments(json!({})))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(text_of(&result), "missing required body argument: newWorkout");
}

#[tokio::test]
async fn test_dates_default_and_ranges_are_independent() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(ctx(), "history", arguments(json!({ "start": "2024-01-01" })))
        .await
        .unwrap();

    let value: Value = serde_json::from_str(&text_of(&result)).unwrap();
    assert_eq!(
        value,
        json!({ "day_set": true, "start": "2024-01-01", "end_set": false })
    );
}

#[tokio::test]
async fn test_invalid_date_is_tool_error() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools
        .call_tool(ctx(), "history", arguments(json!({ "day": "yesterday" })))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(text_of(&result).contains("expected YYYY-MM-DD"));
}

#[test_log::test(tokio::test)]
async fn test_handler_error_is_tool_error() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    let result = tools.call_tool(ctx(), "flaky", None).await.unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(text_of(&result), "upstream returned 503: service unavailable");
}

#[tokio::test]
async fn test_unknown_tool_is_protocol_error() {
    let registry = registry();
    let tools = ToolGenerator::new(&registry, Arc::new(Gym { name: "north" })).generate();

    assert!(tools.call_tool(ctx(), "nope", None).await.is_err());
}
