use agent_playground::{tools::Tool, AgentError, FunctionFactory};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, JsonSchema)]
struct GreetingParams {
    /// Who to greet
    name: String,
    /// How many exclamation marks to add
    #[serde(default)]
    excitement: Option<u8>,
}

agent_playground::tool!(
    name = "greeting_card",
    description = "Write a short greeting for someone",
    params = GreetingParams,
    |params: GreetingParams| async move {
        if params.name.trim().is_empty() {
            return Err("name must not be blank".to_string());
        }
        let marks = "!".repeat(params.excitement.unwrap_or(1) as usize);
        Ok(json!(format!("Hello, {}{}", params.name, marks)))
    }
);

#[tokio::test]
async fn test_macro_generated_tool() {
    let tool = GreetingCard;

    assert_eq!(tool.name(), "greeting_card");
    assert_eq!(tool.description(), "Write a short greeting for someone");

    let result = tool
        .execute(json!({"name": "Layla", "excitement": 3}))
        .await
        .unwrap();
    assert_eq!(result, "Hello, Layla!!!");

    let result = tool.execute(json!({"name": "Omar"})).await.unwrap();
    assert_eq!(result, "Hello, Omar!");
}

#[test]
fn test_macro_schema_uses_doc_comments() {
    let schema = GreetingCard.parameters_schema();

    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["name"]["description"], "Who to greet");
    assert_eq!(schema["required"], json!(["name"]));
}

#[tokio::test]
async fn test_macro_tool_errors() {
    let tool = GreetingCard;

    let err = tool.execute(json!({"wrong_field": "oops"})).await.unwrap_err();
    assert!(matches!(err, AgentError::Validation(_)));
    assert!(err.to_string().contains("greeting_card"));

    let err = tool.execute(json!({"name": "  "})).await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::ToolExecution(ref message) if message == "name must not be blank"
    ));
}

#[tokio::test]
async fn test_macro_tool_in_factory() {
    let factory = FunctionFactory::new().with_tool(GreetingCard);
    assert_eq!(factory.tool_names(), vec!["greeting_card"]);

    let err = factory
        .execute_function("greeting_card", json!({"name": "Sara", "excitement": -1}))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Validation(_)));
}
