//! Typed decoding of backend responses.
//!
//! Responses come bare or wrapped (`{"data": ...}`, `{"quiz": ...}`,
//! `{"quizzes": [...]}`) and carry ids as `_id` or `id`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::dto::{GradedSubmission, QuizSummary, ServerQuiz};
use super::error::{ApiError, ApiResult};

/// Id of a plain string or of a document with `_id`/`id`.
pub fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Object(map) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn unwrap_envelope(mut value: Value, keys: &[&str]) -> Value {
    loop {
        let Value::Object(map) = &mut value else {
            return value;
        };
        let Some(inner) = keys.iter().find_map(|key| map.remove(*key)) else {
            return value;
        };
        value = inner;
    }
}

pub fn decode_quiz(value: Value) -> ApiResult<ServerQuiz> {
    let quiz = unwrap_envelope(value, &["data", "quiz"]);
    if !quiz.is_object() {
        return Err(ApiError::UnexpectedShape(String::from("expected a quiz object")));
    }
    Ok(serde_json::from_value(quiz)?)
}

pub fn decode_quiz_list(value: Value) -> ApiResult<Vec<QuizSummary>> {
    let list = unwrap_envelope(value, &["data", "quizzes"]);
    let Value::Array(items) = list else {
        return Err(ApiError::UnexpectedShape(String::from("expected a list of quizzes")));
    };

    items
        .into_iter()
        .map(|item| {
            let id = id_of(&item)
                .ok_or_else(|| ApiError::UnexpectedShape(String::from("quiz without an id")))?;
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let is_published = item
                .get("isPublished")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let question_count = item
                .get("questions")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            let updated_at = item
                .get("updatedAt")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<DateTime<Utc>>().ok());

            Ok(QuizSummary {
                id,
                title,
                is_published,
                question_count,
                updated_at,
                raw: item,
            })
        })
        .collect()
}

/// Id of a created or updated quiz, if the response carries one.
pub fn decode_saved_id(value: &Value) -> Option<String> {
    let mut current = value;
    loop {
        if let Some(id) = current.get("_id").or_else(|| current.get("id")).and_then(Value::as_str) {
            return Some(id.to_string());
        }
        current = ["data", "quiz"].iter().find_map(|key| current.get(*key))?;
    }
}

pub fn decode_submission(value: Value) -> ApiResult<GradedSubmission> {
    let submission = unwrap_envelope(value, &["data", "submission"]);
    Ok(serde_json::from_value(submission)?)
}
