//! Resolution of correct answers into option texts.
//!
//! The backend and older drafts encode correct answers as option indices,
//! option ids or literal texts. Everything that leaves this crate uses the
//! literal texts only.

use std::sync::LazyLock;

use regex::Regex;

use super::error::CanonicalError;
use super::model::{Question, QuestionOption, RawAnswer};

static OBJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("object id pattern is valid"));

/// True for the 24 hex character identifiers the backend assigns.
pub fn is_object_id(value: &str) -> bool {
    OBJECT_ID.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerEncoding {
    IndexEncoded,
    IdEncoded,
    TextEncoded,
}

impl AnswerEncoding {
    /// Decides the encoding of a whole array. A single numeric element makes
    /// the array index encoded, a single object id makes it id encoded.
    pub fn detect(raw: &[RawAnswer]) -> Self {
        if raw.iter().any(RawAnswer::is_numeric) {
            Self::IndexEncoded
        } else if raw.iter().filter_map(RawAnswer::as_str).any(is_object_id) {
            Self::IdEncoded
        } else {
            Self::TextEncoded
        }
    }

    /// Maps the array onto option texts. Elements that do not resolve to an
    /// option are dropped.
    pub fn resolve(self, raw: &[RawAnswer], options: &[QuestionOption]) -> Vec<String> {
        let mut answers = Vec::new();

        for answer in raw {
            let text = match self {
                Self::IndexEncoded => answer
                    .as_index()
                    .and_then(|index| options.get(index))
                    .map(QuestionOption::text),
                Self::IdEncoded => answer.as_str().and_then(|id| {
                    options
                        .iter()
                        .find(|o| o.id() == Some(id))
                        .map(QuestionOption::text)
                }),
                Self::TextEncoded => answer
                    .as_str()
                    .and_then(|text| options.iter().find(|o| o.text() == text))
                    .map(QuestionOption::text),
            };

            if let Some(text) = text {
                push_unique(&mut answers, text);
            }
        }

        answers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Flags,
    Original(AnswerEncoding),
    Raw(AnswerEncoding),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    answers: Vec<String>,
    source: AnswerSource,
}

impl Canonical {
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn source(&self) -> AnswerSource {
        self.source
    }

    pub fn into_answers(self) -> Vec<String> {
        self.answers
    }
}

/// Resolves the correct answers of `question` into option texts.
///
/// Strategies, first non-empty result wins:
/// 1. option `isCorrect` flags,
/// 2. the correct-answer array attached when the question was loaded,
/// 3. the question's own raw correct-answer array.
pub fn canonicalize(question: &Question) -> Option<Canonical> {
    if question.has_flags() {
        // one entry per flagged option, duplicated texts included
        let answers: Vec<String> = question
            .options()
            .iter()
            .filter(|o| o.is_flagged_correct())
            .map(|o| o.text().to_string())
            .collect();
        if !answers.is_empty() {
            return Some(Canonical {
                answers,
                source: AnswerSource::Flags,
            });
        }
    }

    if let Some(original) = question.original_correct_answer().filter(|a| !a.is_empty()) {
        let encoding = AnswerEncoding::detect(original);
        tracing::debug!(question = %question.id(), ?encoding, "resolving loaded correct answers");
        let answers = encoding.resolve(original, question.options());
        if !answers.is_empty() {
            return Some(Canonical {
                answers,
                source: AnswerSource::Original(encoding),
            });
        }
    }

    let raw = question.correct_answer();
    if !raw.is_empty() {
        let encoding = AnswerEncoding::detect(raw);
        tracing::debug!(question = %question.id(), ?encoding, "resolving raw correct answers");
        let answers = encoding.resolve(raw, question.options());
        if !answers.is_empty() {
            return Some(Canonical {
                answers,
                source: AnswerSource::Raw(encoding),
            });
        }
    }

    None
}

/// Same as [`canonicalize`], failing with the 1-based `position` of the
/// question when nothing resolves.
pub fn canonical_answers(question: &Question, position: usize) -> Result<Vec<String>, CanonicalError> {
    canonicalize(question)
        .map(Canonical::into_answers)
        .ok_or(CanonicalError::NoCorrectAnswer { position })
}

fn push_unique(answers: &mut Vec<String>, text: &str) {
    if !answers.iter().any(|a| a == text) {
        answers.push(text.to_string());
    }
}
