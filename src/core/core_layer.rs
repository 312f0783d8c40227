// The core module contains all business logic.
// Nothing in here knows about HTTP or credentials; the infra layer plugs in
// through the traits each feature defines.

#[path = "forms/mod.rs"]
pub mod forms;
