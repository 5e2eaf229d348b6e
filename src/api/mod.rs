//! Boundary to the quiz backend.

mod client;
pub use client::HttpQuizService;

mod decode;
pub use decode::{decode_quiz, decode_quiz_list, decode_saved_id, decode_submission, id_of};

mod dto;
pub use dto::{
    GradedAnswer, GradedQuestion, GradedSubmission, QuestionPayload, QuizPayload, QuizSummary,
    ServerQuestion, ServerQuiz,
};

mod error;
pub use error::{ApiError, ApiResult};

mod service;
pub use service::QuizService;
