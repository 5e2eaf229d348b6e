use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::Config;
use crate::quiz::Scope;

use super::decode::{decode_quiz, decode_quiz_list, decode_saved_id};
use super::dto::{QuizPayload, QuizSummary, ServerQuiz};
use super::error::{ApiError, ApiResult};
use super::service::QuizService;

/// [`QuizService`] over the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpQuizService {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpQuizService {
    pub fn new(base_url: &str, token: Option<String>) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            token,
        })
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(config.api().base_url(), config.api().token().map(str::to_string))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    #[tracing::instrument(level = "debug", skip(self, request))]
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> ApiResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| String::from("request failed"));
            return Err(ApiError::StatusError { status, message });
        }

        tracing::debug!(%status, bytes = body.len(), "{operation} succeeded");
        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl QuizService for HttpQuizService {
    async fn list_quizzes(&self, scope: &Scope) -> ApiResult<Vec<QuizSummary>> {
        let url = self.endpoint(&["quiz", scope.kind(), scope.id()])?;
        let body = self.send("list_quizzes", self.request(Method::GET, url)).await?;
        decode_quiz_list(body)
    }

    async fn get_quiz(&self, quiz_id: &str, include_answers: bool) -> ApiResult<ServerQuiz> {
        let mut url = self.endpoint(&["quiz", quiz_id])?;
        if include_answers {
            url.query_pairs_mut().append_pair("includeAnswers", "true");
        }
        let body = self.send("get_quiz", self.request(Method::GET, url)).await?;
        decode_quiz(body)
    }

    async fn create_quiz(&self, payload: &QuizPayload) -> ApiResult<Option<String>> {
        let url = self.endpoint(&["quiz"])?;
        let request = self.request(Method::POST, url).json(payload);
        let body = self.send("create_quiz", request).await?;
        Ok(decode_saved_id(&body))
    }

    async fn update_quiz(&self, quiz_id: &str, payload: &QuizPayload) -> ApiResult<Option<String>> {
        let url = self.endpoint(&["quiz", quiz_id])?;
        let request = self.request(Method::PUT, url).json(payload);
        let body = self.send("update_quiz", request).await?;
        Ok(decode_saved_id(&body))
    }

    async fn delete_quiz(&self, quiz_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["quiz", quiz_id])?;
        self.send("delete_quiz", self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
