// =============================================================================
// GOOGLE FORMS MODULE
// =============================================================================
//
// HTTP access to the Google Forms API. This lives in the infra layer because
// it handles external I/O; the core layer only sees the `FormsApi` trait.
//
// **Authentication:**
// Service account credentials only. With `GOOGLE_FORMS_DELEGATE_USER=true`
// every call impersonates the acting user (domain-wide delegation);
// otherwise forms must be shared with the service account email.

pub mod forms_client;
pub mod service_account;

pub use forms_client::GoogleFormsClient;
