use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{Json, Router};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use eduverse::api::HttpQuizService;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// How the mock backend encodes `correctAnswer` when serving a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStyle {
    Text,
    Ids,
    Indices,
}

struct StoredQuiz {
    id: String,
    seq: u64,
    body: Value,
    // seeded documents are served untouched
    raw: bool,
}

struct Backend {
    style: AnswerStyle,
    strip_answers: bool,
    quizzes: Vec<StoredQuiz>,
    next_seq: u64,
    requests: usize,
    last_authorization: Option<String>,
}

type SharedBackend = Arc<Mutex<Backend>>;

pub struct TestBackend {
    pub address: String,
    state: SharedBackend,
}

impl TestBackend {
    pub fn base_url(&self) -> String {
        format!("{}/api/v1", self.address)
    }

    pub fn service(&self) -> HttpQuizService {
        HttpQuizService::new(&self.base_url(), None).unwrap()
    }

    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().unwrap().last_authorization.clone()
    }

    /// Body of a quiz exactly as the client sent it.
    pub fn stored(&self, quiz_id: &str) -> Option<Value> {
        let backend = self.state.lock().unwrap();
        backend
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id)
            .map(|q| q.body.clone())
    }

    /// Stores a quiz document that is served as given.
    pub fn seed(&self, body: Value) -> String {
        let mut backend = self.state.lock().unwrap();
        backend.insert(body, true)
    }
}

impl Backend {
    fn insert(&mut self, body: Value, raw: bool) -> String {
        self.next_seq += 1;
        let id = format!("{:024x}", 0xabc000 + self.next_seq);
        self.quizzes.push(StoredQuiz {
            id: id.clone(),
            seq: self.next_seq,
            body,
            raw,
        });
        id
    }

    fn render(&self, quiz: &StoredQuiz, include_answers: bool) -> Value {
        let with_answers = include_answers || !self.strip_answers;
        let mut body = quiz.body.clone();
        body["_id"] = json!(quiz.id);

        let Some(questions) = body.get_mut("questions").and_then(Value::as_array_mut) else {
            return body;
        };

        for (qi, question) in questions.iter_mut().enumerate() {
            if !quiz.raw {
                render_answers(question, self.style, quiz.seq, qi);
            }
            if !with_answers {
                if let Some(question) = question.as_object_mut() {
                    question.remove("correctAnswer");
                }
            }
        }
        body
    }
}

/// Backend-style object id; the fixed prefix keeps hex letters in every id.
fn option_id(seq: u64, question: usize, option: usize) -> String {
    format!("64b7f0c2a1b2{:012x}", (seq << 16) | ((question as u64) << 8) | option as u64)
}

fn render_answers(question: &mut Value, style: AnswerStyle, seq: u64, qi: usize) {
    let texts = |value: &Value| -> Vec<String> {
        value
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    };
    let options = texts(&question["options"]);
    let correct = texts(&question["correctAnswer"]);
    let position = |answer: &String| options.iter().position(|o| o == answer);

    match style {
        AnswerStyle::Text => {}
        AnswerStyle::Ids => {
            question["options"] = options
                .iter()
                .enumerate()
                .map(|(oi, text)| json!({"_id": option_id(seq, qi, oi), "text": text}))
                .collect();
            question["correctAnswer"] = correct
                .iter()
                .filter_map(position)
                .map(|oi| json!(option_id(seq, qi, oi)))
                .collect();
        }
        AnswerStyle::Indices => {
            question["correctAnswer"] = correct.iter().filter_map(position).map(|oi| json!(oi)).collect();
        }
    }
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"success": false, "message": "Quiz not found"})))
}

async fn list_quizzes(
    State(state): State<SharedBackend>,
    Path((kind, scope_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    backend.requests += 1;
    backend.last_authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let key = format!("{kind}Id");
    let items: Vec<Value> = backend
        .quizzes
        .iter()
        .filter(|q| q.body.get(&key).and_then(Value::as_str) == Some(scope_id.as_str()))
        .map(|q| backend.render(q, false))
        .collect();

    (StatusCode::OK, Json(json!({"success": true, "data": items})))
}

async fn get_quiz(
    State(state): State<SharedBackend>,
    Path(quiz_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    backend.requests += 1;

    let include_answers = query.get("includeAnswers").is_some_and(|v| v == "true");
    match backend.quizzes.iter().find(|q| q.id == quiz_id) {
        Some(quiz) => {
            let body = backend.render(quiz, include_answers);
            (StatusCode::OK, Json(json!({"success": true, "data": body})))
        }
        None => not_found(),
    }
}

async fn create_quiz(State(state): State<SharedBackend>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    backend.requests += 1;

    let id = backend.insert(body, false);
    (StatusCode::CREATED, Json(json!({"success": true, "data": {"_id": id}})))
}

async fn update_quiz(
    State(state): State<SharedBackend>,
    Path(quiz_id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    backend.requests += 1;

    match backend.quizzes.iter_mut().find(|q| q.id == quiz_id) {
        Some(quiz) => {
            quiz.body = body;
            quiz.raw = false;
            (StatusCode::OK, Json(json!({"success": true})))
        }
        None => not_found(),
    }
}

async fn delete_quiz(State(state): State<SharedBackend>, Path(quiz_id): Path<String>) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    backend.requests += 1;

    let before = backend.quizzes.len();
    backend.quizzes.retain(|q| q.id != quiz_id);
    if backend.quizzes.len() == before {
        return not_found();
    }
    (StatusCode::OK, Json(json!({"success": true, "message": "Quiz deleted"})))
}

/// Starts the mock quiz backend on a random local port.
pub async fn spawn_backend(style: AnswerStyle, strip_answers: bool) -> TestBackend {
    let state = Arc::new(Mutex::new(Backend {
        style,
        strip_answers,
        quizzes: Vec::new(),
        next_seq: 0,
        requests: 0,
        last_authorization: None,
    }));

    let api = Router::new()
        .route("/quiz", post(create_quiz))
        .route("/quiz/{id}", get(get_quiz).put(update_quiz).delete(delete_quiz))
        .route("/quiz/{kind}/{scope_id}", get(list_quizzes))
        .with_state(state.clone());
    let app = Router::new().nest("/api/v1", api);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestBackend {
        address: format!("http://127.0.0.1:{port}"),
        state,
    }
}
