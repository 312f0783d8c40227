use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

use super::service_account::ServiceAccountAuth;
use crate::core::forms::forms_models::Answer;
use crate::core::forms::{
    BatchRequest, Form, FormInfo, FormItem, FormResponse, FormsApi, FormsError, PublishSettings,
    ResponsePage,
};

pub const DEFAULT_BASE_URL: &str = "https://forms.googleapis.com/v1";

/// Forms REST API client. Only the calls the core layer needs.
pub struct GoogleFormsClient {
    client: Client,
    auth: ServiceAccountAuth,
    base_url: String,
    /// Impersonate the acting user instead of calling as the service account.
    delegate_user: bool,
}

impl GoogleFormsClient {
    pub fn new(auth: ServiceAccountAuth) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: DEFAULT_BASE_URL.to_string(),
            delegate_user: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_delegation(mut self, enabled: bool) -> Self {
        self.delegate_user = enabled;
        self
    }

    /// Creates a client from `GOOGLE_SERVICE_ACCOUNT_*`, `FORMS_API_BASE_URL`
    /// and `GOOGLE_FORMS_DELEGATE_USER`.
    pub async fn from_env() -> Result<Self, FormsError> {
        let auth = ServiceAccountAuth::from_env().await?;
        tracing::info!("Using service account {}", auth.client_email());
        let mut client = Self::new(auth).with_user_delegation(
            std::env::var("GOOGLE_FORMS_DELEGATE_USER")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(false),
        );
        if let Ok(base_url) = std::env::var("FORMS_API_BASE_URL") {
            client = client.with_base_url(base_url);
        }
        Ok(client)
    }

    fn form_url(&self, form_id: &str) -> String {
        format!("{}/forms/{}", self.base_url, form_id)
    }

    async fn authorized(
        &self,
        request: RequestBuilder,
        user: &str,
    ) -> Result<RequestBuilder, FormsError> {
        let subject = if self.delegate_user && !user.is_empty() {
            Some(user)
        } else {
            None
        };
        let token = self.auth.get_access_token(subject).await?;
        Ok(request.bearer_auth(token))
    }

    /// Sends the request and turns any non-2xx status into `FormsError::Api`.
    async fn send(&self, request: RequestBuilder, user: &str) -> Result<Response, FormsError> {
        let response = self
            .authorized(request, user)
            .await?
            .send()
            .await
            .map_err(|e| FormsError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(FormsError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        user: &str,
    ) -> Result<T, FormsError> {
        self.send(request, user)
            .await?
            .json()
            .await
            .map_err(|e| FormsError::Decode(e.to_string()))
    }
}

/// Pulls `error.message` out of a Google error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl FormsApi for GoogleFormsClient {
    async fn create_form(&self, user: &str, info: &FormInfo) -> Result<Form, FormsError> {
        tracing::debug!("POST {}/forms", self.base_url);
        let request = self
            .client
            .post(format!("{}/forms", self.base_url))
            .json(&json!({ "info": info }));
        let form: ApiForm = self.send_json(request, user).await?;
        Ok(form.into())
    }

    async fn batch_update(
        &self,
        user: &str,
        form_id: &str,
        requests: &[BatchRequest],
    ) -> Result<(), FormsError> {
        tracing::debug!(
            "POST {}:batchUpdate ({} requests)",
            self.form_url(form_id),
            requests.len()
        );
        let request = self
            .client
            .post(format!("{}:batchUpdate", self.form_url(form_id)))
            .json(&json!({ "requests": requests }));
        self.send(request, user).await?;
        Ok(())
    }

    async fn get_form(&self, user: &str, form_id: &str) -> Result<Form, FormsError> {
        tracing::debug!("GET {}", self.form_url(form_id));
        let request = self.client.get(self.form_url(form_id));
        let form: ApiForm = self.send_json(request, user).await?;
        Ok(form.into())
    }

    async fn set_publish_settings(
        &self,
        user: &str,
        form_id: &str,
        settings: &PublishSettings,
    ) -> Result<(), FormsError> {
        tracing::debug!("POST {}:setPublishSettings", self.form_url(form_id));
        let request = self
            .client
            .post(format!("{}:setPublishSettings", self.form_url(form_id)))
            .json(settings);
        self.send(request, user).await?;
        Ok(())
    }

    async fn get_response(
        &self,
        user: &str,
        form_id: &str,
        response_id: &str,
    ) -> Result<FormResponse, FormsError> {
        let url = format!("{}/responses/{}", self.form_url(form_id), response_id);
        tracing::debug!("GET {}", url);
        let response: ApiFormResponse = self.send_json(self.client.get(url), user).await?;
        Ok(response.into())
    }

    async fn list_responses(
        &self,
        user: &str,
        form_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ResponsePage, FormsError> {
        let url = format!("{}/responses", self.form_url(form_id));
        tracing::debug!("GET {} (pageSize={})", url, page_size);

        let mut query = vec![("pageSize", page_size.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let list: ApiResponseList = self
            .send_json(self.client.get(url).query(&query), user)
            .await?;

        Ok(ResponsePage {
            responses: list.responses.into_iter().map(Into::into).collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

// =============================================================================
// FORMS API RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiForm {
    #[serde(default)]
    form_id: String,
    #[serde(default)]
    info: ApiFormInfo,
    responder_uri: Option<String>,
    #[serde(default)]
    items: Vec<ApiItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFormInfo {
    title: Option<String>,
    description: Option<String>,
    document_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiItem {
    title: Option<String>,
    question_item: Option<ApiQuestionItem>,
}

#[derive(Debug, Deserialize)]
struct ApiQuestionItem {
    question: Option<ApiQuestion>,
}

#[derive(Debug, Deserialize)]
struct ApiQuestion {
    #[serde(default)]
    required: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFormResponse {
    response_id: Option<String>,
    create_time: Option<String>,
    last_submitted_time: Option<String>,
    #[serde(default)]
    answers: BTreeMap<String, ApiAnswer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAnswer {
    text_answers: Option<ApiTextAnswers>,
}

#[derive(Debug, Deserialize)]
struct ApiTextAnswers {
    #[serde(default)]
    answers: Vec<ApiTextAnswer>,
}

#[derive(Debug, Deserialize)]
struct ApiTextAnswer {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponseList {
    #[serde(default)]
    responses: Vec<ApiFormResponse>,
    next_page_token: Option<String>,
}

impl From<ApiForm> for Form {
    fn from(api: ApiForm) -> Self {
        Form {
            form_id: api.form_id,
            title: api.info.title,
            description: api.info.description,
            document_title: api.info.document_title,
            responder_uri: api.responder_uri,
            items: api
                .items
                .into_iter()
                .map(|item| FormItem {
                    title: item.title,
                    required: item
                        .question_item
                        .and_then(|q| q.question)
                        .is_some_and(|q| q.required),
                })
                .collect(),
        }
    }
}

impl From<ApiFormResponse> for FormResponse {
    fn from(api: ApiFormResponse) -> Self {
        FormResponse {
            response_id: api.response_id,
            create_time: api.create_time,
            last_submitted_time: api.last_submitted_time,
            // BTreeMap iteration keeps answers sorted by question id.
            answers: api
                .answers
                .into_iter()
                .map(|(question_id, answer)| Answer {
                    question_id,
                    text_answers: answer
                        .text_answers
                        .map(|t| t.answers.into_iter().map(|a| a.value).collect())
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}
