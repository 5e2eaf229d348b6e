use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::{Validate, ValidationError};

use super::canonical::canonical_answers;
use super::error::QuestionError;
use super::model::{FALSE_LABEL, Question, QuestionType, QuizInfo, TRUE_LABEL};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 500;
pub const TIME_LIMIT_MIN: i64 = 5;
pub const TIME_LIMIT_MAX: i64 = 720;
pub const PASSING_SCORE_MIN: i64 = 1;
pub const PASSING_SCORE_MAX: i64 = 100;
pub const ATTEMPTS_MIN: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizField {
    Title,
    Description,
    TimeLimit,
    PassingScore,
    AttemptsAllowed,
    Questions,
}

impl QuizField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "time_limit" | "timeLimit" => Some(Self::TimeLimit),
            "passing_score" | "passingScore" => Some(Self::PassingScore),
            "attempts_allowed" | "attemptsAllowed" => Some(Self::AttemptsAllowed),
            "questions" => Some(Self::Questions),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::TimeLimit => "timeLimit",
            Self::PassingScore => "passingScore",
            Self::AttemptsAllowed => "attemptsAllowed",
            Self::Questions => "questions",
        }
    }
}

/// Field level errors of a quiz draft, one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuizErrors(BTreeMap<QuizField, String>);

impl QuizErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: QuizField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuizField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub(crate) fn single(field: QuizField, message: String) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    fn insert(&mut self, field: QuizField, message: String) {
        self.0.entry(field).or_insert(message);
    }
}

impl fmt::Display for QuizErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// Collapses inner whitespace and trims.
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn rule_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

pub(crate) fn title_rule(title: &str) -> Result<(), ValidationError> {
    let length = normalize_title(title).chars().count();
    if length == 0 {
        return Err(rule_error("title_required", "Title is required".into()));
    }
    if length < TITLE_MIN {
        return Err(rule_error(
            "title_too_short",
            format!("Title must be at least {TITLE_MIN} characters"),
        ));
    }
    if length > TITLE_MAX {
        return Err(rule_error(
            "title_too_long",
            format!("Title cannot exceed {TITLE_MAX} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn description_rule(description: &str) -> Result<(), ValidationError> {
    let length = description.trim().chars().count();
    if length == 0 {
        return Err(rule_error("description_required", "Description is required".into()));
    }
    if length < DESCRIPTION_MIN {
        return Err(rule_error(
            "description_too_short",
            format!("Description must be at least {DESCRIPTION_MIN} characters"),
        ));
    }
    if length > DESCRIPTION_MAX {
        return Err(rule_error(
            "description_too_long",
            format!("Description cannot exceed {DESCRIPTION_MAX} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn time_limit_rule(minutes: i64) -> Result<(), ValidationError> {
    if minutes < TIME_LIMIT_MIN {
        return Err(rule_error(
            "time_limit_too_short",
            format!("Time limit must be at least {TIME_LIMIT_MIN} minutes"),
        ));
    }
    if minutes > TIME_LIMIT_MAX {
        return Err(rule_error(
            "time_limit_too_long",
            format!("Time limit cannot exceed {TIME_LIMIT_MAX} minutes"),
        ));
    }
    Ok(())
}

pub(crate) fn passing_score_rule(score: i64) -> Result<(), ValidationError> {
    if score < PASSING_SCORE_MIN {
        return Err(rule_error(
            "passing_score_too_low",
            format!("Passing score must be at least {PASSING_SCORE_MIN}%"),
        ));
    }
    if score > PASSING_SCORE_MAX {
        return Err(rule_error(
            "passing_score_too_high",
            format!("Passing score cannot exceed {PASSING_SCORE_MAX}%"),
        ));
    }
    Ok(())
}

pub(crate) fn attempts_rule(attempts: i64) -> Result<(), ValidationError> {
    if attempts < ATTEMPTS_MIN {
        return Err(rule_error(
            "attempts_too_low",
            format!("Attempts allowed must be at least {ATTEMPTS_MIN}"),
        ));
    }
    Ok(())
}

pub fn validate_question(question: &Question) -> Result<(), QuestionError> {
    if question.text().trim().is_empty() {
        return Err(QuestionError::EmptyText);
    }

    let options = question.options();
    match question.question_type() {
        QuestionType::TrueFalse => {
            if question.option_texts() != [TRUE_LABEL, FALSE_LABEL] {
                return Err(QuestionError::TrueFalseOptions);
            }
        }
        QuestionType::MultipleChoice | QuestionType::Checkbox => {
            if options.is_empty() {
                return Err(QuestionError::NoOptions);
            }
            if options.len() < 2 {
                return Err(QuestionError::TooFewOptions { min: 2 });
            }
        }
    }

    if let Some(index) = options.iter().position(|o| o.text().trim().is_empty()) {
        return Err(QuestionError::EmptyOption { position: index + 1 });
    }

    // also rejects NaN
    if !(question.points() > 0.0) {
        return Err(QuestionError::InvalidPoints);
    }

    let flagged = options.iter().filter(|o| o.is_flagged_correct()).count();
    let has_encoded = question.original_correct_answer().is_some_and(|a| !a.is_empty())
        || !question.correct_answer().is_empty();
    if flagged == 0 && !has_encoded {
        return Err(QuestionError::NoCorrectOption);
    }
    if flagged > 1 && question.question_type().is_single_select() {
        return Err(QuestionError::MultipleCorrect);
    }

    Ok(())
}

/// Validates the quiz info and its questions. Every field rule is checked;
/// for questions the first offending one is reported by its 1-based position.
pub fn validate_quiz(info: &QuizInfo, questions: &[Question]) -> QuizErrors {
    let mut errors = QuizErrors::default();

    if let Err(report) = info.validate() {
        for (name, field_errors) in report.field_errors() {
            let Some(field) = QuizField::from_name(&name) else {
                continue;
            };
            if let Some(message) = field_errors.iter().find_map(|e| e.message.as_ref()) {
                errors.insert(field, message.to_string());
            }
        }
    }

    if let Some(message) = questions_error(questions) {
        errors.insert(QuizField::Questions, message);
    }

    errors
}

fn questions_error(questions: &[Question]) -> Option<String> {
    if questions.is_empty() {
        return Some(String::from("At least one question is required"));
    }

    for (index, question) in questions.iter().enumerate() {
        let position = index + 1;
        if let Err(e) = validate_question(question) {
            return Some(format!("Question {position}: {e}"));
        }
        if let Err(e) = canonical_answers(question, position) {
            return Some(e.to_string());
        }
    }

    None
}
