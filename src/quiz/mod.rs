//! Quiz drafts: data model, correct-answer canonicalization and validation.

mod canonical;
pub use canonical::{
    AnswerEncoding, AnswerSource, Canonical, canonical_answers, canonicalize, is_object_id,
};

mod error;
pub use error::{CanonicalError, QuestionError};

mod model;
pub(crate) use model::one_or_many;
pub use model::{
    FALSE_LABEL, Question, QuestionId, QuestionOption, QuestionType, QuizDraft, QuizInfo,
    RawAnswer, Scope, TRUE_LABEL,
};

mod validate;
pub use validate::{QuizErrors, QuizField, normalize_title, validate_question, validate_quiz};
