use async_trait::async_trait;

use crate::quiz::Scope;

use super::dto::{QuizPayload, QuizSummary, ServerQuiz};
use super::error::ApiResult;

/// Quiz endpoints of the backend.
#[async_trait]
pub trait QuizService: Send + Sync {
    async fn list_quizzes(&self, scope: &Scope) -> ApiResult<Vec<QuizSummary>>;

    /// `include_answers` asks the backend for the full correct-answer data.
    async fn get_quiz(&self, quiz_id: &str, include_answers: bool) -> ApiResult<ServerQuiz>;

    /// Returns the id of the created quiz when the backend sends it back.
    async fn create_quiz(&self, payload: &QuizPayload) -> ApiResult<Option<String>>;

    async fn update_quiz(&self, quiz_id: &str, payload: &QuizPayload) -> ApiResult<Option<String>>;

    async fn delete_quiz(&self, quiz_id: &str) -> ApiResult<()>;
}
