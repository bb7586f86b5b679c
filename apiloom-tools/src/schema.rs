//! JSON schemas for generated tools
//!
//! Parameter types map onto schema types the same way everywhere:
//! strings, dates and date-range bounds are `"string"`, integers are
//! `"number"`, switches are `"boolean"`.

use apiloom::{BodyConfig, Endpoint, ParamType, END_KEY, START_KEY};
use rmcp::model::JsonObject;
use serde_json::{json, Map, Value};

/// Hint appended to date descriptions
pub const DATE_HINT: &str = "YYYY-MM-DD";

/// Build the input schema for an endpoint
pub fn input_schema<C>(endpoint: &Endpoint<C>) -> JsonObject {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();

    for param in &endpoint.params {
        match param.kind {
            ParamType::DateRange => {
                properties.insert(
                    START_KEY.to_string(),
                    property("string", &format!("Start date ({DATE_HINT})")),
                );
                properties.insert(
                    END_KEY.to_string(),
                    property("string", &format!("End date ({DATE_HINT})")),
                );
                continue;
            }
            ParamType::Date => {
                properties.insert(
                    param.name.clone(),
                    property("string", &date_description(&param.description)),
                );
            }
            kind => {
                properties.insert(
                    param.name.clone(),
                    property(schema_type(kind), &param.description),
                );
            }
        }

        if param.required {
            required.push(param.name.clone());
        }
    }

    if let Some(body) = &endpoint.body {
        let name = body.property_name();
        properties.insert(name.clone(), property("string", &body_description(body)));
        required.push(name);
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), json!(required));
    schema
}

/// Schema type for a parameter type
pub fn schema_type(kind: ParamType) -> &'static str {
    match kind {
        ParamType::Int => "number",
        ParamType::Bool => "boolean",
        ParamType::String | ParamType::Date | ParamType::DateRange => "string",
    }
}

/// Append the date format hint unless the description already carries it
pub fn date_description(description: &str) -> String {
    if description.contains(DATE_HINT) {
        description.to_string()
    } else if description.trim().is_empty() {
        format!("({DATE_HINT})")
    } else {
        format!("{description} ({DATE_HINT})")
    }
}

/// Body description followed by its example, when one is configured
pub fn body_description(body: &BodyConfig) -> String {
    let mut description = body.get_description().to_string();
    if let Some(example) = body.get_example() {
        description.push_str("\n\nExample:\n");
        description.push_str(example);
    }
    description
}

fn property(kind: &str, description: &str) -> Value {
    json!({
        "type": kind,
        "description": description,
    })
}

/// Names of the required properties in a schema
pub fn required_properties(schema: &JsonObject) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiloom::Param;
    use serde::Deserialize;

    struct Client;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct NewWorkout {
        title: String,
    }

    fn endpoint() -> Endpoint<Client> {
        Endpoint::builder("create_workout")
            .post("/v1/workouts")
            .param(Param::int("id", "Workout id").required())
            .param(Param::string("note", "Free text"))
            .param(Param::bool("dry_run", "Validate only"))
            .param(Param::date("day", "Day of the workout"))
            .param(Param::date("logged", "Logged on (YYYY-MM-DD)"))
            .param(Param::date_range("Window"))
            .body(
                BodyConfig::of::<NewWorkout>()
                    .description("Workout to create")
                    .example(r#"{"title": "Legs"}"#),
            )
            .build()
    }

    #[test]
    fn test_property_types() {
        let schema = input_schema(&endpoint());
        let properties = schema["properties"].as_object().unwrap();

        assert_eq!(schema["type"], "object");
        assert_eq!(properties["id"]["type"], "number");
        assert_eq!(properties["note"]["type"], "string");
        assert_eq!(properties["dry_run"]["type"], "boolean");
        assert_eq!(properties["day"]["type"], "string");
        assert_eq!(properties["start"]["type"], "string");
        assert_eq!(properties["end"]["type"], "string");
        assert!(!properties.contains_key("range"));
    }

    #[test]
    fn test_date_hint_is_appended_once() {
        let schema = input_schema(&endpoint());
        let properties = schema["properties"].as_object().unwrap();

        assert_eq!(
            properties["day"]["description"],
            "Day of the workout (YYYY-MM-DD)"
        );
        assert_eq!(properties["logged"]["description"], "Logged on (YYYY-MM-DD)");
    }

    #[test]
    fn test_required_list() {
        let schema = input_schema(&endpoint());
        assert_eq!(required_properties(&schema), vec!["id", "newWorkout"]);
    }

    #[test]
    fn test_body_property() {
        let schema = input_schema(&endpoint());
        let body = &schema["properties"]["newWorkout"];

        assert_eq!(body["type"], "string");
        assert_eq!(
            body["description"],
            "Workout to create\n\nExample:\n{\"title\": \"Legs\"}"
        );
    }

    #[test]
    fn test_anonymous_body_without_example() {
        let endpoint: Endpoint<Client> = Endpoint::builder("raw")
            .body(BodyConfig::json().description("Anything"))
            .build();
        let schema = input_schema(&endpoint);

        assert_eq!(schema["properties"]["body"]["description"], "Anything");
        assert_eq!(required_properties(&schema), vec!["body"]);
    }

    #[test]
    fn test_empty_endpoint_schema() {
        let endpoint: Endpoint<Client> = Endpoint::builder("ping").build();
        let schema = input_schema(&endpoint);

        assert!(schema["properties"].as_object().unwrap().is_empty());
        assert!(required_properties(&schema).is_empty());
    }
}
