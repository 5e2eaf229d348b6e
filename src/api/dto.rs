use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::quiz::{
    Question, QuestionOption, QuestionType, QuizDraft, QuizErrors, QuizField, QuizInfo, RawAnswer,
    Scope, canonical_answers, normalize_title, one_or_many, validate_quiz,
};

use super::decode::id_of;

/// Body of `POST /quiz` and `PUT /quiz/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    pub title: String,
    pub description: String,
    pub time_limit: i64,
    pub passing_score: i64,
    pub attempts_allowed: i64,
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<String>,
    /// Always literal option texts.
    pub correct_answer: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub points: f64,
    /// 1-based.
    pub order: usize,
}

impl QuizPayload {
    /// Validates the draft and resolves every question's correct answers.
    /// Nothing is built unless the whole draft is valid.
    pub fn from_draft(draft: &QuizDraft, scope: &Scope) -> Result<Self, QuizErrors> {
        let errors = validate_quiz(&draft.info, draft.questions());
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut questions = Vec::with_capacity(draft.questions().len());
        for (index, question) in draft.questions().iter().enumerate() {
            let order = index + 1;
            let correct_answer = canonical_answers(question, order)
                .map_err(|e| QuizErrors::single(QuizField::Questions, e.to_string()))?;

            questions.push(QuestionPayload {
                text: question.text().trim().to_string(),
                question_type: question.question_type(),
                options: question.options().iter().map(|o| o.text().to_string()).collect(),
                correct_answer,
                explanation: question
                    .explanation()
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string),
                points: question.points(),
                order,
            });
        }

        let info = &draft.info;
        let (course_id, module_id, lesson_id) = match scope {
            Scope::Course(id) => (Some(id.clone()), None, None),
            Scope::Module(id) => (None, Some(id.clone()), None),
            Scope::Lesson(id) => (None, None, Some(id.clone())),
        };

        Ok(Self {
            title: normalize_title(&info.title),
            description: info.description.trim().to_string(),
            time_limit: info.time_limit,
            passing_score: info.passing_score,
            attempts_allowed: info.attempts_allowed,
            is_published: info.is_published,
            course_id,
            module_id,
            lesson_id,
            questions,
        })
    }
}

/// A quiz as returned by `GET /quiz/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerQuiz {
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub time_limit: Option<i64>,
    #[serde(default)]
    pub passing_score: Option<i64>,
    #[serde(default)]
    pub attempts_allowed: Option<i64>,
    #[serde(default)]
    pub is_published: bool,
    // either plain ids or populated documents
    #[serde(default)]
    course_id: Option<Value>,
    #[serde(default)]
    module_id: Option<Value>,
    #[serde(default)]
    lesson_id: Option<Value>,
    #[serde(default)]
    pub questions: Vec<ServerQuestion>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerQuestion {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub correct_answer: Vec<RawAnswer>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub order: Option<i64>,
}

impl ServerQuiz {
    pub fn id(&self) -> Option<&str> {
        self.object_id.as_deref().or(self.id.as_deref())
    }

    pub fn scope(&self) -> Option<Scope> {
        let course = self.course_id.as_ref().and_then(id_of);
        let module = self.module_id.as_ref().and_then(id_of);
        let lesson = self.lesson_id.as_ref().and_then(id_of);
        Scope::most_specific(course.as_deref(), module.as_deref(), lesson.as_deref())
    }

    /// List endpoints strip answer data. Judged on the first question only.
    pub fn needs_answers(&self) -> bool {
        self.questions.first().is_some_and(|q| {
            q.correct_answer.is_empty() && !q.options.iter().any(|o| o.is_correct().is_some())
        })
    }
}

impl From<ServerQuestion> for Question {
    fn from(value: ServerQuestion) -> Self {
        let mut question = Question::new(value.text, value.question_type).with_options(value.options);
        if !value.correct_answer.is_empty() {
            question = question.with_original_correct_answer(value.correct_answer);
        }
        if let Some(explanation) = value.explanation.filter(|e| !e.trim().is_empty()) {
            question = question.with_explanation(explanation);
        }
        if let Some(points) = value.points {
            question = question.with_points(points);
        }
        question
    }
}

impl From<ServerQuiz> for QuizDraft {
    fn from(value: ServerQuiz) -> Self {
        let defaults = QuizInfo::default();
        let info = QuizInfo {
            title: value.title,
            description: value.description,
            time_limit: value.time_limit.unwrap_or(defaults.time_limit),
            passing_score: value.passing_score.unwrap_or(defaults.passing_score),
            attempts_allowed: value.attempts_allowed.unwrap_or(defaults.attempts_allowed),
            is_published: value.is_published,
        };

        let mut questions = value.questions;
        // stable: questions without an order keep their position at the end
        questions.sort_by_key(|q| q.order.unwrap_or(i64::MAX));

        QuizDraft::new(info, questions.into_iter().map(Question::from).collect())
    }
}

/// Row of the quiz list view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub is_published: bool,
    pub question_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub raw: Value,
}

/// A graded attempt, read only. `is_correct` comes from the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedSubmission {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    quiz: Option<Value>,
    /// Course, module or lesson the attempt belongs to, as sent.
    #[serde(default)]
    pub scope: Option<Value>,
    #[serde(default)]
    pub answers: Vec<GradedAnswer>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GradedSubmission {
    pub fn quiz_title(&self) -> Option<&str> {
        self.quiz.as_ref()?.get("title")?.as_str()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    #[serde(default, deserialize_with = "one_or_many")]
    pub user_answer: Vec<String>,
    #[serde(default)]
    pub is_correct: bool,
    pub question: GradedQuestion,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedQuestion {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub correct_answer: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}
