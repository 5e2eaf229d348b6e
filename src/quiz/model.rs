use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::canonical::canonicalize;
use super::validate::{
    attempts_rule, description_rule, passing_score_rule, time_limit_rule, title_rule,
};

pub const TRUE_LABEL: &str = "True";
pub const FALSE_LABEL: &str = "False";

/// Local identifier of a question inside a draft. Never sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(Uuid);

impl QuestionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[default]
    #[serde(alias = "multiple_choice", alias = "single")]
    MultipleChoice,
    #[serde(alias = "multiple")]
    Checkbox,
    #[serde(alias = "true_false", alias = "boolean")]
    TrueFalse,
}

impl QuestionType {
    /// Multiple-choice and true/false questions accept exactly one correct option.
    pub fn is_single_select(self) -> bool {
        matches!(self, Self::MultipleChoice | Self::TrueFalse)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleChoice => write!(f, "multiple-choice"),
            Self::Checkbox => write!(f, "checkbox"),
            Self::TrueFalse => write!(f, "true-false"),
        }
    }
}

/// One element of a correct-answer array as the backend or an import file
/// sent it: an index, an option id or a literal option text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Number(f64),
    Text(String),
}

impl RawAnswer {
    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Number(_) => true,
            Self::Text(s) => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
        }
    }

    /// 0-based option index, if this element is a usable one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
                Some(*n as usize)
            }
            Self::Text(s) if self.is_numeric() => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<&str> for RawAnswer {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<usize> for RawAnswer {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "OptionRepr")]
pub struct QuestionOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_correct: Option<bool>,
}

impl QuestionOption {
    pub fn new<S: Into<String>>(text: S, is_correct: bool) -> Self {
        Self {
            id: None,
            text: text.into(),
            is_correct: Some(is_correct),
        }
    }

    /// Option as it arrives from the backend: no correctness flag.
    pub fn unflagged<S: Into<String>>(id: Option<String>, text: S) -> Self {
        Self {
            id,
            text: text.into(),
            is_correct: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    pub fn is_flagged_correct(&self) -> bool {
        self.is_correct == Some(true)
    }
}

// Options are either bare strings or objects, ids either `_id` or `id`.
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionRepr {
    Text(String),
    Object {
        #[serde(default, rename = "_id")]
        object_id: Option<String>,
        #[serde(default)]
        id: Option<String>,
        text: String,
        #[serde(default, rename = "isCorrect")]
        is_correct: Option<bool>,
    },
}

impl From<OptionRepr> for QuestionOption {
    fn from(value: OptionRepr) -> Self {
        match value {
            OptionRepr::Text(text) => Self::unflagged(None, text),
            OptionRepr::Object {
                object_id,
                id,
                text,
                is_correct,
            } => Self {
                id: object_id.or(id),
                text,
                is_correct,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Accepts `null`, a single value or an array.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value: Option<OneOrMany<T>> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

fn default_points() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, skip_serializing)]
    id: QuestionId,
    text: String,
    #[serde(rename = "type", default)]
    question_type: QuestionType,
    #[serde(default)]
    options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    #[serde(default = "default_points")]
    points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_correct_answer: Option<Vec<RawAnswer>>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    correct_answer: Vec<RawAnswer>,
}

impl Question {
    pub fn new<S: Into<String>>(text: S, question_type: QuestionType) -> Self {
        let mut question = Self {
            id: QuestionId::new(),
            text: text.into(),
            question_type,
            options: Vec::new(),
            explanation: None,
            points: default_points(),
            original_correct_answer: None,
            correct_answer: Vec::new(),
        };
        if question_type == QuestionType::TrueFalse {
            question.options = true_false_options(None);
        }
        question
    }

    pub fn multiple_choice<S: Into<String>>(text: S) -> Self {
        Self::new(text, QuestionType::MultipleChoice)
    }

    pub fn checkbox<S: Into<String>>(text: S) -> Self {
        Self::new(text, QuestionType::Checkbox)
    }

    pub fn true_false<S: Into<String>>(text: S, answer: bool) -> Self {
        let mut question = Self::new(text, QuestionType::TrueFalse);
        question.options = true_false_options(Some(answer));
        question
    }

    pub fn with_option<S: Into<String>>(mut self, text: S, is_correct: bool) -> Self {
        self.options.push(QuestionOption::new(text, is_correct));
        self
    }

    pub fn with_options(mut self, options: Vec<QuestionOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_explanation<S: Into<String>>(mut self, explanation: S) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_points(mut self, points: f64) -> Self {
        self.points = points;
        self
    }

    pub fn with_correct_answer(mut self, answers: Vec<RawAnswer>) -> Self {
        self.correct_answer = answers;
        self
    }

    pub fn with_original_correct_answer(mut self, answers: Vec<RawAnswer>) -> Self {
        self.original_correct_answer = Some(answers);
        self
    }

    pub fn id(&self) -> QuestionId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    pub fn original_correct_answer(&self) -> Option<&[RawAnswer]> {
        self.original_correct_answer.as_deref()
    }

    pub fn correct_answer(&self) -> &[RawAnswer] {
        &self.correct_answer
    }

    pub fn option_texts(&self) -> Vec<&str> {
        self.options.iter().map(QuestionOption::text).collect()
    }

    pub fn has_flags(&self) -> bool {
        self.options.iter().any(|o| o.is_correct.is_some())
    }

    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }

    /// Switching to true/false replaces the options with the fixed pair.
    pub fn set_type(&mut self, question_type: QuestionType) {
        if question_type == QuestionType::TrueFalse && self.question_type != question_type {
            self.options = true_false_options(None);
        }
        self.question_type = question_type;
    }

    /// Flags the option at `index` as correct. Single-select questions drop
    /// every other flag, checkbox questions toggle the option.
    pub fn mark_correct(&mut self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        if !self.has_flags() {
            self.seed_flags();
        }

        if self.question_type.is_single_select() {
            for (i, option) in self.options.iter_mut().enumerate() {
                option.is_correct = Some(i == index);
            }
        } else {
            for option in self.options.iter_mut() {
                option.is_correct.get_or_insert(false);
            }
            let option = &mut self.options[index];
            option.is_correct = Some(!option.is_flagged_correct());
        }
        true
    }

    /// Turns answers held in the loaded or raw arrays into option flags, so
    /// that toggling one option keeps the others.
    fn seed_flags(&mut self) {
        let Some(canonical) = canonicalize(self) else {
            return;
        };
        let answers = canonical.into_answers();
        for option in self.options.iter_mut() {
            option.is_correct = Some(answers.iter().any(|a| *a == option.text));
        }
    }

    pub(crate) fn assign_id(&mut self, id: QuestionId) {
        self.id = id;
    }
}

fn true_false_options(answer: Option<bool>) -> Vec<QuestionOption> {
    match answer {
        Some(answer) => vec![
            QuestionOption::new(TRUE_LABEL, answer),
            QuestionOption::new(FALSE_LABEL, !answer),
        ],
        None => vec![
            QuestionOption::new(TRUE_LABEL, false),
            QuestionOption::new(FALSE_LABEL, false),
        ],
    }
}

fn default_time_limit() -> i64 {
    30
}

fn default_passing_score() -> i64 {
    70
}

fn default_attempts() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizInfo {
    #[serde(default)]
    #[validate(custom(function = title_rule))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = description_rule))]
    pub description: String,
    /// Minutes.
    #[serde(default = "default_time_limit")]
    #[validate(custom(function = time_limit_rule))]
    pub time_limit: i64,
    /// Percent.
    #[serde(default = "default_passing_score")]
    #[validate(custom(function = passing_score_rule))]
    pub passing_score: i64,
    #[serde(default = "default_attempts")]
    #[validate(custom(function = attempts_rule))]
    pub attempts_allowed: i64,
    #[serde(default)]
    pub is_published: bool,
}

impl Default for QuizInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            time_limit: default_time_limit(),
            passing_score: default_passing_score(),
            attempts_allowed: default_attempts(),
            is_published: false,
        }
    }
}

/// Hierarchy level a quiz is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Course(String),
    Module(String),
    Lesson(String),
}

impl Scope {
    /// Picks the most specific scope available: lesson, then module, then course.
    pub fn most_specific(
        course: Option<&str>,
        module: Option<&str>,
        lesson: Option<&str>,
    ) -> Option<Self> {
        fn present(id: Option<&str>) -> Option<&str> {
            id.map(str::trim).filter(|id| !id.is_empty())
        }

        if let Some(id) = present(lesson) {
            return Some(Self::Lesson(id.to_string()));
        }
        if let Some(id) = present(module) {
            return Some(Self::Module(id.to_string()));
        }
        present(course).map(|id| Self::Course(id.to_string()))
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Course(id) | Self::Module(id) | Self::Lesson(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Course(_) => "course",
            Self::Module(_) => "module",
            Self::Lesson(_) => "lesson",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// In-memory quiz being authored or edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizDraft {
    #[serde(flatten)]
    pub info: QuizInfo,
    #[serde(default)]
    questions: Vec<Question>,
}

impl QuizDraft {
    pub fn new(info: QuizInfo, questions: Vec<Question>) -> Self {
        Self { info, questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn position_of(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub(crate) fn push_question(&mut self, question: Question) -> QuestionId {
        let id = question.id;
        self.questions.push(question);
        id
    }

    /// Replaces the question in place, keeping its identifier and position.
    pub(crate) fn replace_question(&mut self, id: QuestionId, mut question: Question) -> bool {
        match self.position_of(id) {
            Some(index) => {
                question.assign_id(id);
                self.questions[index] = question;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_question(&mut self, id: QuestionId) -> Option<Question> {
        self.position_of(id).map(|index| self.questions.remove(index))
    }
}
