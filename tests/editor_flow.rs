mod common;
use eduverse::api::{ApiError, HttpQuizService, QuizService};
use eduverse::editor::{EditorError, EditorMode, QuizEditor};
use eduverse::quiz::{AnswerEncoding, AnswerSource, Question, QuizField, Scope, canonicalize};
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{AnswerStyle, TestBackend, spawn_backend};

fn course() -> Scope {
    Scope::Course("c1".into())
}

fn europe_questions() -> Vec<Question> {
    vec![
        Question::multiple_choice("Capital of France?")
            .with_option("Paris", true)
            .with_option("London", false)
            .with_option("Berlin", false)
            .with_explanation("Paris is the capital of France."),
        Question::true_false("Rome is in Italy", true),
        Question::checkbox("Which are rivers?")
            .with_option("Danube", true)
            .with_option("Alps", false)
            .with_option("Rhine", true),
    ]
}

/// Creates the Europe quiz through the editor and returns its id.
async fn create_europe(backend: &TestBackend) -> String {
    let mut editor = QuizEditor::new(backend.service(), course());
    editor.new_quiz().unwrap();
    {
        let info = editor.info_mut().unwrap();
        info.title = "Europe".into();
        info.description = "Capitals and rivers of Europe".into();
    }
    for question in europe_questions() {
        editor.add_question(question).unwrap();
    }

    let outcome = editor.save().await.unwrap();
    assert!(outcome.created);
    assert!(outcome.list_reloaded);
    assert_eq!(editor.mode(), &EditorMode::List);

    let quiz_id = outcome.quiz_id.expect("backend returns the new id");
    assert!(editor.quizzes().iter().any(|q| q.id == quiz_id));
    quiz_id
}

#[tokio::test]
async fn short_title_sends_nothing() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    let mut editor = QuizEditor::new(backend.service(), course());

    editor.new_quiz().unwrap();
    {
        let info = editor.info_mut().unwrap();
        info.title = "Qz".into();
        info.description = "A description long enough".into();
        info.passing_score = 150;
        info.attempts_allowed = 0;
    }
    editor.add_question(europe_questions().remove(0)).unwrap();

    let err = editor.save().await.unwrap_err();
    let EditorError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };

    assert_eq!(errors.get(QuizField::Title), Some("Title must be at least 3 characters"));
    assert_eq!(errors.get(QuizField::PassingScore), Some("Passing score cannot exceed 100%"));
    assert_eq!(errors.get(QuizField::AttemptsAllowed), Some("Attempts allowed must be at least 1"));
    assert_eq!(editor.mode(), &EditorMode::Add);
    assert_eq!(backend.requests(), 0);
}

#[tokio::test]
async fn payload_carries_answer_texts() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    let quiz_id = create_europe(&backend).await;

    let stored = backend.stored(&quiz_id).unwrap();
    assert_eq!(stored["title"], "Europe");
    assert_eq!(stored["courseId"], "c1");
    assert!(stored.get("lessonId").is_none());
    assert_eq!(stored["questions"][0]["correctAnswer"], json!(["Paris"]));
    assert_eq!(stored["questions"][1]["options"], json!(["True", "False"]));
    assert_eq!(stored["questions"][1]["correctAnswer"], json!(["True"]));
    assert_eq!(stored["questions"][2]["correctAnswer"], json!(["Danube", "Rhine"]));
    assert_eq!(stored["questions"][2]["order"], 3);
}

async fn round_trip(style: AnswerStyle) {
    let backend = spawn_backend(style, false).await;
    let quiz_id = create_europe(&backend).await;

    let mut editor = QuizEditor::new(backend.service(), course());
    editor.select_quiz(&quiz_id).await.unwrap();
    assert_eq!(editor.mode(), &EditorMode::Edit { quiz_id: quiz_id.clone() });

    let draft = editor.draft();
    assert_eq!(draft.info.title, "Europe");
    let answers: Vec<Vec<String>> = draft
        .questions()
        .iter()
        .map(|q| canonicalize(q).unwrap().into_answers())
        .collect();
    assert_eq!(answers, vec![vec!["Paris"], vec!["True"], vec!["Danube", "Rhine"]]);

    let expected = match style {
        AnswerStyle::Text => AnswerEncoding::TextEncoded,
        AnswerStyle::Ids => AnswerEncoding::IdEncoded,
        AnswerStyle::Indices => AnswerEncoding::IndexEncoded,
    };
    let source = canonicalize(&draft.questions()[0]).unwrap().source();
    assert_eq!(source, AnswerSource::Original(expected));

    // saving unchanged writes the same answers back
    let before = backend.stored(&quiz_id).unwrap();
    editor.save().await.unwrap();
    let after = backend.stored(&quiz_id).unwrap();
    assert_eq!(before["questions"], after["questions"]);
}

#[tokio::test]
async fn round_trip_with_text_answers() {
    round_trip(AnswerStyle::Text).await;
}

#[tokio::test]
async fn round_trip_with_option_ids() {
    round_trip(AnswerStyle::Ids).await;
}

#[tokio::test]
async fn round_trip_with_indices() {
    round_trip(AnswerStyle::Indices).await;
}

#[tokio::test]
async fn stripped_answers_are_fetched_again() {
    let backend = spawn_backend(AnswerStyle::Ids, true).await;
    let quiz_id = create_europe(&backend).await;

    let service = backend.service();
    let stripped = service.get_quiz(&quiz_id, false).await.unwrap();
    assert!(stripped.needs_answers());

    let mut editor = QuizEditor::new(service, course());
    let requests = backend.requests();
    editor.select_quiz(&quiz_id).await.unwrap();

    assert_eq!(backend.requests(), requests + 2);
    let first = &editor.draft().questions()[0];
    assert_eq!(canonicalize(first).unwrap().answers(), &["Paris"]);
}

#[tokio::test]
async fn toggling_loaded_checkbox_keeps_answers() {
    let backend = spawn_backend(AnswerStyle::Ids, false).await;
    let quiz_id = create_europe(&backend).await;

    let mut editor = QuizEditor::new(backend.service(), course());
    editor.select_quiz(&quiz_id).await.unwrap();

    let mut rivers = editor.draft().questions()[2].clone();
    assert!(rivers.mark_correct(1));
    editor.update_question(rivers.id(), rivers).unwrap();
    editor.save().await.unwrap();

    let stored = backend.stored(&quiz_id).unwrap();
    assert_eq!(stored["questions"][2]["correctAnswer"], json!(["Danube", "Alps", "Rhine"]));
}

#[tokio::test]
async fn legacy_index_answers_are_saved_as_text() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    let quiz_id = backend.seed(json!({
        "title": "Opinions",
        "description": "Questions about opinions",
        "courseId": "c1",
        "questions": [{"text": "Agree?", "type": "multiple-choice", "options": ["Yes", "No"], "correctAnswer": [0]}]
    }));

    let mut editor = QuizEditor::new(backend.service(), course());
    editor.select_quiz(&quiz_id).await.unwrap();
    editor.save().await.unwrap();

    let stored = backend.stored(&quiz_id).unwrap();
    assert_eq!(stored["questions"][0]["correctAnswer"], json!(["Yes"]));
    assert_eq!(stored["questions"][0]["order"], 1);
}

#[tokio::test]
async fn unmatched_answers_block_save() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    let quiz_id = backend.seed(json!({
        "title": "Opinions",
        "description": "Questions about opinions",
        "courseId": "c1",
        "questions": [
            {"text": "Agree?", "options": ["Yes", "No"], "correctAnswer": ["Yes"]},
            {"text": "Sure?", "options": ["Yes", "No"], "correctAnswer": ["Maybe"]}
        ]
    }));

    let mut editor = QuizEditor::new(backend.service(), course());
    editor.select_quiz(&quiz_id).await.unwrap();
    let requests = backend.requests();

    let EditorError::Validation(errors) = editor.save().await.unwrap_err() else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.get(QuizField::Questions),
        Some("Question 2 has no correct answer that matches its options")
    );
    assert_eq!(backend.requests(), requests);
    assert_eq!(editor.mode(), &EditorMode::Edit { quiz_id });
}

#[tokio::test]
async fn update_keeps_quiz_id() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    let quiz_id = create_europe(&backend).await;

    let mut editor = QuizEditor::new(backend.service(), course());
    editor.select_quiz(&quiz_id).await.unwrap();
    editor.info_mut().unwrap().title = "  Europe   revisited ".into();
    let last = editor.draft().questions()[2].id();
    editor.delete_question(last).unwrap();

    let outcome = editor.save().await.unwrap();
    assert!(!outcome.created);
    assert_eq!(outcome.quiz_id.as_deref(), Some(quiz_id.as_str()));

    assert_eq!(editor.quizzes().len(), 1);
    assert_eq!(editor.quizzes()[0].title, "Europe revisited");
    assert_eq!(editor.quizzes()[0].question_count, 2);
}

#[tokio::test]
async fn delete_reloads_list() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    let first = create_europe(&backend).await;
    let second = create_europe(&backend).await;

    let mut editor = QuizEditor::new(backend.service(), course());
    assert_eq!(editor.load_list().await.unwrap().len(), 2);

    let outcome = editor.delete_quiz(&first).await.unwrap();
    assert!(outcome.list_reloaded);
    assert_eq!(editor.quizzes().len(), 1);
    assert_eq!(editor.quizzes()[0].id, second);
    assert!(backend.stored(&first).is_none());
}

#[tokio::test]
async fn lists_are_scoped() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    create_europe(&backend).await;

    let mut editor = QuizEditor::new(backend.service(), Scope::Lesson("l1".into()));
    assert!(editor.load_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_quiz_leaves_state_unchanged() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    let mut editor = QuizEditor::new(backend.service(), course());

    let err = editor.select_quiz("ffffffffffffffffffffffff").await.unwrap_err();
    let EditorError::Api(ApiError::StatusError { status, message }) = err else {
        panic!("expected a status error, got {err:?}");
    };

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message, "Quiz not found");
    assert_eq!(editor.mode(), &EditorMode::List);
    assert_eq!(editor.notice(), Some("Failed to load quiz"));
}

#[tokio::test]
async fn token_is_sent_as_bearer() {
    let backend = spawn_backend(AnswerStyle::Text, false).await;
    let service = HttpQuizService::new(&backend.base_url(), Some("t0k3n".into())).unwrap();

    service.list_quizzes(&course()).await.unwrap();
    assert_eq!(backend.last_authorization().as_deref(), Some("Bearer t0k3n"));
}
