use thiserror::Error;

use crate::api::ApiError;
use crate::quiz::{QuestionError, QuestionId, QuizErrors};

use super::EditorMode;

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("quiz is invalid: {0}")]
    Validation(QuizErrors),
    #[error("question is invalid: {0}")]
    Question(#[from] QuestionError),
    #[error("question not found: {0}")]
    UnknownQuestion(QuestionId),
    #[error("`{operation}` is not available in {mode} mode")]
    InvalidTransition {
        operation: &'static str,
        mode: EditorMode,
    },
    #[error("api error: {0}")]
    Api(#[from] ApiError),
}
