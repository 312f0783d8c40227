use async_trait::async_trait;
use thiserror::Error;

use super::forms_models::{
    BatchRequest, Form, FormInfo, FormResponse, PublishSettings, QuestionDescriptor, ResponsePage,
};
use super::question_builder::build_question_requests;

/// Errors raised while talking to the Forms API.
#[derive(Debug, Error)]
pub enum FormsError {
    #[error("Forms API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl FormsError {
    /// HTTP status for API errors, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FormsError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The Forms API calls the service needs. `user` is the acting user's email;
/// implementations may use it to pick credentials.
#[async_trait]
pub trait FormsApi: Send + Sync {
    async fn create_form(&self, user: &str, info: &FormInfo) -> Result<Form, FormsError>;
    async fn batch_update(
        &self,
        user: &str,
        form_id: &str,
        requests: &[BatchRequest],
    ) -> Result<(), FormsError>;
    async fn get_form(&self, user: &str, form_id: &str) -> Result<Form, FormsError>;
    async fn set_publish_settings(
        &self,
        user: &str,
        form_id: &str,
        settings: &PublishSettings,
    ) -> Result<(), FormsError>;
    async fn get_response(
        &self,
        user: &str,
        form_id: &str,
        response_id: &str,
    ) -> Result<FormResponse, FormsError>;
    async fn list_responses(
        &self,
        user: &str,
        form_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ResponsePage, FormsError>;
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub fn edit_url(form_id: &str) -> String {
    format!("https://docs.google.com/forms/d/{}/edit", form_id)
}

/// The API's responder URI when it sent one, else the public viewform link.
pub fn responder_url(form_id: &str, responder_uri: Option<&str>) -> String {
    match responder_uri {
        Some(uri) => uri.to_string(),
        None => format!("https://docs.google.com/forms/d/{}/viewform", form_id),
    }
}

/// Arguments for `FormsService::create_form`.
#[derive(Debug, Clone, Default)]
pub struct NewForm {
    pub title: String,
    pub description: Option<String>,
    pub document_title: Option<String>,
    pub questions: Vec<QuestionDescriptor>,
}

/// Runs each Forms operation and renders the result as a summary for the agent.
pub struct FormsService<C: FormsApi> {
    client: C,
}

impl<C: FormsApi> FormsService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Creates a form, then adds its questions in one batch update.
    ///
    /// A failed batch update doesn't fail the call: the form exists at that
    /// point, so the summary reports it with a warning appended.
    pub async fn create_form(&self, user: &str, new_form: NewForm) -> Result<String, FormsError> {
        tracing::info!(user, title = %new_form.title, "create_form invoked");

        let info = FormInfo {
            title: new_form.title.clone(),
            description: new_form.description.filter(|d| !d.is_empty()),
            document_title: new_form.document_title.filter(|d| !d.is_empty()),
        };

        let created = self.client.create_form(user, &info).await?;
        let form_id = created.form_id.clone();
        let title = created.title.clone().unwrap_or(new_form.title);

        let mut message = format!(
            "Successfully created form '{}' for {}. Form ID: {}. Edit URL: {}. Responder URL: {}",
            title,
            user,
            form_id,
            edit_url(&form_id),
            responder_url(&form_id, created.responder_uri.as_deref())
        );

        if !new_form.questions.is_empty() {
            tracing::info!(
                "Adding {} questions to form {}",
                new_form.questions.len(),
                form_id
            );

            let requests = build_question_requests(&new_form.questions, |skipped| {
                tracing::warn!(
                    index = skipped.index,
                    "Unsupported question type: {}. Skipping question: {}",
                    skipped.kind,
                    skipped.title
                );
            });

            tracing::debug!(
                positions = ?requests
                    .iter()
                    .map(|r| r.create_item.position())
                    .collect::<Vec<_>>(),
                "Queued {} question requests",
                requests.len()
            );

            if requests.is_empty() {
                tracing::warn!("No supported questions to add to form {}", form_id);
            } else if let Err(e) = self.client.batch_update(user, &form_id, &requests).await {
                tracing::error!("Failed to add questions to form {}: {}", form_id, e);
                message.push_str(&format!(
                    ". WARNING: Failed to add questions due to an error: {}",
                    e
                ));
                return Ok(message);
            } else {
                tracing::info!("Successfully added questions to form {}", form_id);
            }
        }

        tracing::info!(user, form_id = %form_id, "Form created");
        Ok(message)
    }

    pub async fn get_form(&self, user: &str, form_id: &str) -> Result<String, FormsError> {
        tracing::info!(user, form_id, "get_form invoked");

        let form = self.client.get_form(user, form_id).await?;

        let title = form.title.clone().unwrap_or_else(|| "No Title".to_string());
        let description = form
            .description
            .clone()
            .unwrap_or_else(|| "No Description".to_string());
        let document_title = form.document_title.clone().unwrap_or_else(|| title.clone());

        let questions: Vec<String> = form
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let n = i + 1;
                let item_title = item
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("Question {}", n));
                let required = if item.required { " (Required)" } else { "" };
                format!("  {}. {}{}", n, item_title, required)
            })
            .collect();

        let questions_text = if questions.is_empty() {
            "  No questions found".to_string()
        } else {
            questions.join("\n")
        };

        tracing::info!(user, form_id, "Form retrieved");

        Ok(format!(
            "Form Details for {user}:\n\
             - Title: \"{title}\"\n\
             - Description: \"{description}\"\n\
             - Document Title: \"{document_title}\"\n\
             - Form ID: {form_id}\n\
             - Edit URL: {edit}\n\
             - Responder URL: {responder}\n\
             - Questions ({count} total):\n\
             {questions_text}",
            edit = edit_url(form_id),
            responder = responder_url(form_id, form.responder_uri.as_deref()),
            count = form.items.len(),
        ))
    }

    pub async fn set_publish_settings(
        &self,
        user: &str,
        form_id: &str,
        settings: PublishSettings,
    ) -> Result<String, FormsError> {
        tracing::info!(user, form_id, "set_publish_settings invoked");

        self.client
            .set_publish_settings(user, form_id, &settings)
            .await?;

        tracing::info!(user, form_id, "Publish settings updated");
        Ok(format!(
            "Successfully updated publish settings for form {} for {}. Publish as template: {}, Require authentication: {}",
            form_id, user, settings.publish_as_template, settings.require_authentication
        ))
    }

    pub async fn get_form_response(
        &self,
        user: &str,
        form_id: &str,
        response_id: &str,
    ) -> Result<String, FormsError> {
        tracing::info!(user, form_id, response_id, "get_form_response invoked");

        let response = self.client.get_response(user, form_id, response_id).await?;

        let answers: Vec<String> = response
            .answers
            .iter()
            .map(|answer| {
                if answer.text_answers.is_empty() {
                    format!("  Question ID {}: No answer provided", answer.question_id)
                } else {
                    format!(
                        "  Question ID {}: {}",
                        answer.question_id,
                        answer.text_answers.join(", ")
                    )
                }
            })
            .collect();

        let answers_text = if answers.is_empty() {
            "  No answers found".to_string()
        } else {
            answers.join("\n")
        };

        let unknown = || "Unknown".to_string();
        let returned_id = response.response_id.clone().unwrap_or_else(unknown);

        tracing::info!(user, response_id = %returned_id, "Response retrieved");

        Ok(format!(
            "Form Response Details for {user}:\n\
             - Form ID: {form_id}\n\
             - Response ID: {returned_id}\n\
             - Created: {created}\n\
             - Last Submitted: {submitted}\n\
             - Answers:\n\
             {answers_text}",
            created = response.create_time.clone().unwrap_or_else(unknown),
            submitted = response.last_submitted_time.clone().unwrap_or_else(unknown),
        ))
    }

    pub async fn list_form_responses(
        &self,
        user: &str,
        form_id: &str,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<String, FormsError> {
        tracing::info!(user, form_id, "list_form_responses invoked");

        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(FormsError::InvalidArgument(
                "page_size must be at least 1".to_string(),
            ));
        }
        let page_token = page_token.filter(|t| !t.is_empty());

        let page = self
            .client
            .list_responses(user, form_id, page_size, page_token)
            .await?;

        if page.responses.is_empty() {
            return Ok(format!(
                "No responses found for form {} for {}.",
                form_id, user
            ));
        }

        let lines: Vec<String> = page
            .responses
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "  {}. Response ID: {} | Created: {} | Last Submitted: {} | Answers: {}",
                    i + 1,
                    r.response_id.as_deref().unwrap_or("Unknown"),
                    r.create_time.as_deref().unwrap_or("Unknown"),
                    r.last_submitted_time.as_deref().unwrap_or("Unknown"),
                    r.answers.len()
                )
            })
            .collect();

        let pagination = match &page.next_page_token {
            Some(token) => format!("\nNext page token: {}", token),
            None => "\nNo more pages.".to_string(),
        };

        tracing::info!(
            "Retrieved {} responses for {}. Form ID: {}",
            page.responses.len(),
            user,
            form_id
        );

        Ok(format!(
            "Form Responses for {}:\n- Form ID: {}\n- Total responses returned: {}\n- Responses:\n{}{}",
            user,
            form_id,
            page.responses.len(),
            lines.join("\n"),
            pagination
        ))
    }
}
