// This is the entry point of the Forms tools.
//
// **Architecture Overview:**
// - `core/` = Business logic (question translation, summaries)
// - `infra/` = Implementations of core traits (Google Forms over HTTP)
// - `tools/` = Tool declarations and the call dispatcher an agent talks to
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Run one tool call, or list the available tools
//
// Usage:
//   forms_tools                          # print tool declarations as JSON
//   forms_tools <tool_name> '<json>'     # run one tool, print the result JSON

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "tools/tools_layer.rs"]
mod tools;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::core::forms::FormsService;
use crate::infra::google::GoogleFormsClient;
use crate::tools::{FormsToolHandler, FunctionCallHandler};

/// Parses the JSON argument object and fills in the acting user from
/// `GOOGLE_USER_EMAIL` when the call doesn't name one.
fn parse_args(raw: Option<&str>, default_user: Option<String>) -> Result<Value> {
    let mut args: Value = match raw {
        Some(raw) => serde_json::from_str(raw).context("Tool arguments must be a JSON object")?,
        None => Value::Object(Default::default()),
    };

    let Some(object) = args.as_object_mut() else {
        bail!("Tool arguments must be a JSON object");
    };

    if !object.contains_key("user_google_email") {
        if let Some(user) = default_user {
            object.insert("user_google_email".to_string(), Value::String(user));
        }
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging so we can see what's happening. Logs go to stderr so
    // stdout stays clean JSON.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let mut cli_args = std::env::args().skip(1);
    let Some(tool_name) = cli_args.next() else {
        let defs = tools::forms_tools::forms_function_defs();
        println!("{}", serde_json::to_string_pretty(&defs)?);
        return Ok(());
    };
    let raw_args = cli_args.next();

    let args = parse_args(raw_args.as_deref(), std::env::var("GOOGLE_USER_EMAIL").ok())?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let client = GoogleFormsClient::from_env()
        .await
        .context("Failed to set up the Google Forms client")?;
    let handler = FormsToolHandler::new(FormsService::new(client));

    match handler.handle_function_call(&tool_name, &args).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => bail!(e),
    }
}
