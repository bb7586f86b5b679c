//! Declaring, materializing and invoking endpoints through the public API

use apiloom::{
    materialize, ArgSource, CallContext, Endpoint, HandlerArgs, HandlerError, HandlerOutput,
    Param, RawArg, Registry, Surface,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

struct Counter {
    step: i64,
}

/// A surface that answers from a flat string map
struct Flat(HashMap<&'static str, &'static str>);

impl ArgSource for Flat {
    fn value(&mut self, param: &Param) -> Option<RawArg> {
        self.0.get(param.name.as_str()).map(|v| RawArg::Text(v.to_string()))
    }

    fn range_bound(&mut self, key: &str) -> Option<String> {
        self.0.get(key).map(|v| v.to_string())
    }
}

fn registry() -> Registry<Counter> {
    let mut registry = Registry::new();
    registry.register(
        Endpoint::builder("advance")
            .cassette("counter")
            .post("/advance")
            .param(Param::int("from", "Starting value").required())
            .param(Param::int("times", "Repetitions"))
            .param(Param::date_range("Window"))
            .handler(|ctx: CallContext, counter: Arc<Counter>, args: HandlerArgs| async move {
                Ok(HandlerOutput::Json(json!({
                    "surface": ctx.surface().to_string(),
                    "value": args.int("from") + counter.step * args.int_or("times", 1),
                    "windowed": args.has("start") || args.has("end"),
                })))
            })
            .build(),
    );
    registry.register(Endpoint::builder("unbound").cassette("counter").build());
    registry
}

#[tokio::test]
async fn test_materialized_args_reach_the_handler() {
    let registry = registry();
    let endpoint = registry.by_name("advance").unwrap();
    let mut source = Flat(HashMap::from([("from", "5"), ("times", "0"), ("end", "")]));

    let args = HandlerArgs::from_params(materialize(&endpoint.params, &mut source).unwrap());
    let output = endpoint
        .invoke(CallContext::new(Surface::Cli), Arc::new(Counter { step: 3 }), args)
        .await
        .unwrap();

    assert_eq!(
        output.as_json().unwrap(),
        &json!({ "surface": "cli", "value": 8, "windowed": false })
    );
}

#[tokio::test]
async fn test_invoking_without_handler_fails() {
    let registry = registry();
    let endpoint = registry.by_name("unbound").unwrap();

    let err = endpoint
        .invoke(
            CallContext::new(Surface::Recorder),
            Arc::new(Counter { step: 1 }),
            HandlerArgs::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HandlerError::Missing { .. }));
    assert_eq!(err.to_string(), "endpoint 'unbound' has no handler");
}

#[test]
fn test_cassette_grouping_follows_registration() {
    let registry = registry();
    assert_eq!(registry.cassettes(), vec!["counter"]);
    assert_eq!(registry.by_cassette("counter").len(), 2);
}
