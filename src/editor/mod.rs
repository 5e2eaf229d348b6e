//! Quiz draft editor.
//!
//! One owner drives the editor through `list -> add|edit -> list`. Questions
//! are edited in memory only; the single `save` call validates, canonicalizes
//! and persists the whole draft, then reloads the list from the backend.

use std::fmt;

use crate::api::{ApiError, QuizPayload, QuizService, QuizSummary};
use crate::error::log_error;
use crate::quiz::{
    Question, QuestionId, QuizDraft, QuizErrors, QuizInfo, Scope, validate_question,
    validate_quiz,
};

mod error;
pub use error::{EditorError, EditorResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    List,
    Add,
    Edit { quiz_id: String },
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Add => write!(f, "add"),
            Self::Edit { .. } => write!(f, "edit"),
        }
    }
}

/// Immutable copy of the editor state.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSnapshot {
    pub mode: EditorMode,
    pub draft: QuizDraft,
    pub quizzes: Vec<QuizSummary>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub quiz_id: Option<String>,
    pub created: bool,
    pub list_reloaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub list_reloaded: bool,
}

pub struct QuizEditor<S> {
    service: S,
    scope: Scope,
    mode: EditorMode,
    draft: QuizDraft,
    quizzes: Vec<QuizSummary>,
    notice: Option<String>,
}

impl<S: QuizService> QuizEditor<S> {
    pub fn new(service: S, scope: Scope) -> Self {
        Self {
            service,
            scope,
            mode: EditorMode::List,
            draft: QuizDraft::default(),
            quizzes: Vec::new(),
            notice: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn draft(&self) -> &QuizDraft {
        &self.draft
    }

    pub fn quizzes(&self) -> &[QuizSummary] {
        &self.quizzes
    }

    /// Last failure meant for the user, cleared by the next successful transition.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            mode: self.mode.clone(),
            draft: self.draft.clone(),
            quizzes: self.quizzes.clone(),
            notice: self.notice.clone(),
        }
    }

    pub async fn load_list(&mut self) -> EditorResult<&[QuizSummary]> {
        match self.service.list_quizzes(&self.scope).await {
            Ok(quizzes) => {
                tracing::debug!(scope = %self.scope, count = quizzes.len(), "quiz list loaded");
                self.quizzes = quizzes;
                Ok(&self.quizzes)
            }
            Err(e) => {
                self.surface("Failed to load quizzes", &e);
                Err(e.into())
            }
        }
    }

    /// `list -> add` with an empty draft.
    pub fn new_quiz(&mut self) -> EditorResult<()> {
        self.expect_list("new_quiz")?;
        self.draft = QuizDraft::default();
        self.mode = EditorMode::Add;
        self.notice = None;
        Ok(())
    }

    /// `list -> edit`. When the fetched quiz looks stripped of its answers it
    /// is fetched again with answers; if that fails the first copy is used.
    pub async fn select_quiz(&mut self, quiz_id: &str) -> EditorResult<()> {
        self.expect_list("select_quiz")?;

        let quiz = match self.service.get_quiz(quiz_id, false).await {
            Ok(quiz) => quiz,
            Err(e) => {
                self.surface("Failed to load quiz", &e);
                return Err(e.into());
            }
        };

        let quiz = if quiz.needs_answers() {
            match self.service.get_quiz(quiz_id, true).await {
                Ok(full) => full,
                Err(e) => {
                    tracing::warn!(quiz_id, error = %e, "unable to fetch quiz answers, keeping loaded copy");
                    quiz
                }
            }
        } else {
            quiz
        };

        self.draft = QuizDraft::from(quiz);
        self.mode = EditorMode::Edit {
            quiz_id: quiz_id.to_string(),
        };
        self.notice = None;
        Ok(())
    }

    pub fn info_mut(&mut self) -> EditorResult<&mut QuizInfo> {
        self.expect_draft("info_mut")?;
        Ok(&mut self.draft.info)
    }

    pub fn add_question(&mut self, question: Question) -> EditorResult<QuestionId> {
        self.expect_draft("add_question")?;
        validate_question(&question)?;
        Ok(self.draft.push_question(question))
    }

    pub fn update_question(&mut self, id: QuestionId, question: Question) -> EditorResult<()> {
        self.expect_draft("update_question")?;
        validate_question(&question)?;
        if self.draft.replace_question(id, question) {
            Ok(())
        } else {
            Err(EditorError::UnknownQuestion(id))
        }
    }

    pub fn delete_question(&mut self, id: QuestionId) -> EditorResult<Question> {
        self.expect_draft("delete_question")?;
        self.draft
            .remove_question(id)
            .ok_or(EditorError::UnknownQuestion(id))
    }

    /// Field errors of the current draft, for inline display.
    pub fn validate(&self) -> QuizErrors {
        validate_quiz(&self.draft.info, self.draft.questions())
    }

    /// `add|edit -> list`. Nothing is sent unless the whole draft is valid.
    /// On a failed create/update the editor keeps its mode and draft.
    pub async fn save(&mut self) -> EditorResult<SaveOutcome> {
        let existing = match &self.mode {
            EditorMode::List => {
                return Err(EditorError::InvalidTransition {
                    operation: "save",
                    mode: self.mode.clone(),
                });
            }
            EditorMode::Add => None,
            EditorMode::Edit { quiz_id } => Some(quiz_id.clone()),
        };

        let payload =
            QuizPayload::from_draft(&self.draft, &self.scope).map_err(EditorError::Validation)?;

        let result = match &existing {
            None => self.service.create_quiz(&payload).await,
            Some(quiz_id) => self.service.update_quiz(quiz_id, &payload).await,
        };

        let quiz_id = match result {
            Ok(saved) => saved.or_else(|| existing.clone()),
            Err(e) => {
                self.surface("Failed to save quiz", &e);
                return Err(e.into());
            }
        };

        tracing::info!(
            quiz_id = quiz_id.as_deref().unwrap_or("<unknown>"),
            questions = payload.questions.len(),
            created = existing.is_none(),
            "quiz saved"
        );

        self.mode = EditorMode::List;
        self.draft = QuizDraft::default();
        self.notice = None;
        let list_reloaded = self.load_list().await.is_ok();

        Ok(SaveOutcome {
            quiz_id,
            created: existing.is_none(),
            list_reloaded,
        })
    }

    /// Deletes a quiz, then reloads the list. `Ok` means the quiz is gone
    /// even when the reload failed.
    pub async fn delete_quiz(&mut self, quiz_id: &str) -> EditorResult<DeleteOutcome> {
        self.expect_list("delete_quiz")?;

        if let Err(e) = self.service.delete_quiz(quiz_id).await {
            self.surface("Failed to delete quiz", &e);
            return Err(e.into());
        }

        tracing::info!(quiz_id, "quiz deleted");
        self.notice = None;
        let list_reloaded = self.load_list().await.is_ok();
        Ok(DeleteOutcome { list_reloaded })
    }

    /// `add|edit -> list`, dropping the draft.
    pub fn cancel(&mut self) {
        self.mode = EditorMode::List;
        self.draft = QuizDraft::default();
        self.notice = None;
    }

    fn expect_list(&self, operation: &'static str) -> EditorResult<()> {
        match self.mode {
            EditorMode::List => Ok(()),
            _ => Err(EditorError::InvalidTransition {
                operation,
                mode: self.mode.clone(),
            }),
        }
    }

    fn expect_draft(&self, operation: &'static str) -> EditorResult<()> {
        match self.mode {
            EditorMode::Add | EditorMode::Edit { .. } => Ok(()),
            EditorMode::List => Err(EditorError::InvalidTransition {
                operation,
                mode: EditorMode::List,
            }),
        }
    }

    fn surface(&mut self, message: &str, error: &ApiError) {
        log_error(error);
        self.notice = Some(message.to_string());
    }
}
