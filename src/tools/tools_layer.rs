// Tool layer - turns agent tool calls into core service calls.
// Each external surface gets its own handler file.

pub mod forms_tools;

pub mod tool_models;

pub use forms_tools::FormsToolHandler;
pub use tool_models::FunctionCallHandler;
