// =============================================================================
// FORMS TOOL HANDLER
// =============================================================================
//
// Exposes the Forms operations as named tools. Each call:
// 1. pulls its arguments out of the JSON object
// 2. runs the matching `FormsService` operation
// 3. wraps the summary (or a translated error) in a small result object

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::tool_models::{FunctionCallHandler, FunctionDef, FunctionParameters, PropertyDef};
use crate::core::forms::{
    FormsApi, FormsError, FormsService, NewForm, PublishSettings, QuestionDescriptor,
};

pub const CREATE_FORM: &str = "create_form";
pub const GET_FORM: &str = "get_form";
pub const SET_PUBLISH_SETTINGS: &str = "set_publish_settings";
pub const GET_FORM_RESPONSE: &str = "get_form_response";
pub const LIST_FORM_RESPONSES: &str = "list_form_responses";

const QUESTIONS_HELP: &str = "\
Questions to add after creating the form. Each entry needs 'type' and 'title'; \
'description' and 'required' (default false) are optional. Types:
- TEXT_QUESTION
- MULTIPLE_CHOICE_QUESTION: 'options' (list of strings)
- CHECKBOX_QUESTION: 'options' (list of strings)
- SCALE_QUESTION: 'scale_min', 'scale_max' (integers), optional 'scale_labels' keyed by the bound, e.g. {\"1\": \"Low\", \"5\": \"High\"}
- DATE_QUESTION: optional 'include_time' (default false), 'include_year' (default true)
- TIME_QUESTION
Entries with any other type are skipped.";

/// Turns an operation failure into the message the agent sees.
pub fn describe_error(tool: &str, error: &FormsError) -> String {
    match error.status() {
        Some(401) | Some(403) => format!(
            "API error in {}: {}. Check that the service account can access this form.",
            tool, error
        ),
        Some(404) => format!(
            "API error in {}: {}. Check the form or response ID.",
            tool, error
        ),
        _ => format!("API error in {}: {}", tool, error),
    }
}

pub struct FormsToolHandler<C: FormsApi> {
    service: FormsService<C>,
}

impl<C: FormsApi> FormsToolHandler<C> {
    pub fn new(service: FormsService<C>) -> Self {
        Self { service }
    }

    async fn run(&self, name: &str, args: &Value) -> Result<Result<String, FormsError>, String> {
        let user = required_str(args, "user_google_email")?;

        let outcome = match name {
            CREATE_FORM => {
                let questions: Vec<QuestionDescriptor> = match args.get("questions") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(value) => serde_json::from_value(value.clone())
                        .map_err(|e| format!("Invalid 'questions' argument: {}", e))?,
                };
                let new_form = NewForm {
                    title: required_str(args, "title")?.to_string(),
                    description: optional_str(args, "description"),
                    document_title: optional_str(args, "document_title"),
                    questions,
                };
                self.service.create_form(user, new_form).await
            }
            GET_FORM => {
                let form_id = required_str(args, "form_id")?;
                self.service.get_form(user, form_id).await
            }
            SET_PUBLISH_SETTINGS => {
                let form_id = required_str(args, "form_id")?;
                let settings = PublishSettings {
                    publish_as_template: optional_bool(args, "publish_as_template")?,
                    require_authentication: optional_bool(args, "require_authentication")?,
                };
                self.service.set_publish_settings(user, form_id, settings).await
            }
            GET_FORM_RESPONSE => {
                let form_id = required_str(args, "form_id")?;
                let response_id = required_str(args, "response_id")?;
                self.service
                    .get_form_response(user, form_id, response_id)
                    .await
            }
            LIST_FORM_RESPONSES => {
                let form_id = required_str(args, "form_id")?;
                let page_size = match args.get("page_size") {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(
                        value
                            .as_u64()
                            .and_then(|n| u32::try_from(n).ok())
                            .ok_or_else(|| invalid_argument("page_size"))?,
                    ),
                };
                let page_token = args.get("page_token").and_then(Value::as_str);
                self.service
                    .list_form_responses(user, form_id, page_size, page_token)
                    .await
            }
            _ => return Err(format!("Unknown function: {}", name)),
        };

        Ok(outcome)
    }
}

#[async_trait]
impl<C: FormsApi> FunctionCallHandler for FormsToolHandler<C> {
    async fn handle_function_call(&self, name: &str, args: &Value) -> Result<Value, String> {
        if !self.supported_functions().iter().any(|f| f == name) {
            return Err(format!("Unknown function: {}", name));
        }

        match self.run(name, args).await? {
            Ok(content) => Ok(json!({
                "success": true,
                "content": content,
            })),
            Err(e) => {
                tracing::error!("{} failed: {}", name, e);
                Ok(json!({
                    "success": false,
                    "error": describe_error(name, &e),
                }))
            }
        }
    }

    fn supported_functions(&self) -> Vec<String> {
        [
            CREATE_FORM,
            GET_FORM,
            SET_PUBLISH_SETTINGS,
            GET_FORM_RESPONSE,
            LIST_FORM_RESPONSES,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("Missing '{}' argument", key))
}

fn optional_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Absent or null means `false`; any other non-bool is rejected.
fn optional_bool(args: &Value, key: &str) -> Result<bool, String> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(value) => value.as_bool().ok_or_else(|| invalid_argument(key)),
    }
}

fn invalid_argument(key: &str) -> String {
    format!("Invalid '{}' argument", key)
}

// =============================================================================
// TOOL DECLARATIONS
// =============================================================================

fn function(
    name: &str,
    description: &str,
    properties: Vec<(&str, PropertyDef)>,
    required: &[&str],
) -> FunctionDef {
    let mut all = HashMap::new();
    all.insert(
        "user_google_email".to_string(),
        PropertyDef::new("string", "The user's Google email address."),
    );
    for (key, prop) in properties {
        all.insert(key.to_string(), prop);
    }

    let mut required_keys = vec!["user_google_email".to_string()];
    required_keys.extend(required.iter().map(|s| s.to_string()));

    FunctionDef {
        name: name.to_string(),
        description: description.to_string(),
        parameters: FunctionParameters {
            param_type: "object".to_string(),
            properties: all,
            required: required_keys,
        },
    }
}

pub fn forms_function_defs() -> Vec<FunctionDef> {
    vec![
        function(
            CREATE_FORM,
            "Create a new Google Form, optionally with initial questions. Returns the form ID, edit URL and responder URL.",
            vec![
                ("title", PropertyDef::new("string", "The title of the form.")),
                ("description", PropertyDef::new("string", "The description of the form.")),
                (
                    "document_title",
                    PropertyDef::new("string", "The document title shown in the browser tab."),
                ),
                ("questions", PropertyDef::new("array", QUESTIONS_HELP)),
            ],
            &["title"],
        ),
        function(
            GET_FORM,
            "Get a form's details, including its questions and URLs.",
            vec![("form_id", PropertyDef::new("string", "The ID of the form to retrieve."))],
            &["form_id"],
        ),
        function(
            SET_PUBLISH_SETTINGS,
            "Update the publish settings of a form.",
            vec![
                ("form_id", PropertyDef::new("string", "The ID of the form.")),
                (
                    "publish_as_template",
                    PropertyDef::new(
                        "boolean",
                        "Whether to publish as a template. Defaults to false.",
                    ),
                ),
                (
                    "require_authentication",
                    PropertyDef::new(
                        "boolean",
                        "Whether to require authentication to view/submit. Defaults to false.",
                    ),
                ),
            ],
            &["form_id"],
        ),
        function(
            GET_FORM_RESPONSE,
            "Get one response from a form, with its answers.",
            vec![
                ("form_id", PropertyDef::new("string", "The ID of the form.")),
                ("response_id", PropertyDef::new("string", "The ID of the response.")),
            ],
            &["form_id", "response_id"],
        ),
        function(
            LIST_FORM_RESPONSES,
            "List a form's responses with pagination.",
            vec![
                ("form_id", PropertyDef::new("string", "The ID of the form.")),
                (
                    "page_size",
                    PropertyDef::new(
                        "integer",
                        "Maximum number of responses to return. Defaults to 10.",
                    ),
                ),
                (
                    "page_token",
                    PropertyDef::new("string", "Token for retrieving the next page of results."),
                ),
            ],
            &["form_id"],
        ),
    ]
}
