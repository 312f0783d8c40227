use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

/// A tool declaration as handed to an agent.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: FunctionParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionParameters {
    #[serde(rename = "type")]
    pub param_type: String,
    pub properties: HashMap<String, PropertyDef>,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyDef {
    #[serde(rename = "type")]
    pub prop_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyDef {
    pub fn new(prop_type: &str, description: &str) -> Self {
        Self {
            prop_type: prop_type.to_string(),
            description: Some(description.to_string()),
        }
    }
}

/// Something that can execute named tool calls with JSON arguments.
///
/// `Err` means the call itself was malformed (unknown tool, missing argument).
/// Failures of the underlying operation come back as `Ok` with
/// `"success": false` so the agent can read the message.
#[async_trait]
pub trait FunctionCallHandler: Send + Sync {
    async fn handle_function_call(
        &self,
        name: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, String>;

    fn supported_functions(&self) -> Vec<String>;
}
