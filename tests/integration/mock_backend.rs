//! In-process stand-in for the MentorIA backend.
//!
//! Serves the REST surface under `/api/v1` on an ephemeral port. State lives
//! behind a mutex so tests can seed data, flip failure switches, and inspect
//! what the client sent.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// Timestamp format the backend emits (naive, no offset).
const TIMESTAMP: &str = "2024-03-01T10:00:00";

/// Mutable backend state.
#[derive(Debug, Default)]
pub struct BackendState {
    /// Registered users by email: (password, user json).
    pub users: HashMap<String, (String, Value)>,
    /// Issued tokens and the email they belong to.
    pub tokens: HashMap<String, String>,
    /// Mentor records, without resources.
    pub mentors: Vec<Value>,
    /// Resource records, each carrying `mentor_id`.
    pub resources: Vec<Value>,
    /// Last id handed out.
    pub next_id: u64,
    /// Number of upload requests received.
    pub uploads: usize,
    /// Makes the profile endpoint never answer.
    pub hang_profile: bool,
    /// Makes the mentor list endpoint fail with 500.
    pub fail_mentors: bool,
    /// Delays applied to successive resource list requests.
    pub resource_delays: VecDeque<Duration>,
    /// Delays applied to successive mentor list responses.
    pub mentor_delays: VecDeque<Duration>,
}

impl BackendState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// A running mock backend.
pub struct MockBackend {
    /// Base URL including `/api/v1`.
    pub base_url: String,
    state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Starts the backend on an ephemeral port.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            next_id: 100,
            ..BackendState::default()
        }));

        let api = Router::new()
            .route("/auth/register", post(register))
            .route("/auth/login/token", post(login))
            .route("/auth/me", get(me))
            .route("/users/me/profile", get(profile).patch(update_profile))
            .route("/mentors/", get(list_mentors).post(create_mentor))
            .route("/mentors/:id", get(get_mentor).put(update_mentor).delete(delete_mentor))
            .route("/resources/mentor/:id", get(list_resources))
            .route("/resources/upload", post(upload_resource))
            .route("/resources/url", post(add_url_resource))
            .route("/resources/:id", delete(delete_resource))
            .with_state(state.clone());
        let router = Router::new()
            .nest("/api/v1", api)
            .layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });

        Self {
            base_url: format!("http://{addr}/api/v1"),
            state,
            handle,
        }
    }

    /// Locks the backend state.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state poisoned")
    }

    /// Registers a user directly.
    pub fn seed_user(&self, email: &str, password: &str) {
        let mut state = self.state();
        let id = state.next_id();
        let user = user_json(id, email, None);
        state
            .users
            .insert(email.to_string(), (password.to_string(), user));
    }

    /// Issues a token for an existing user without going through login.
    pub fn issue_token(&self, email: &str) -> String {
        let token = format!("token-{email}-seeded");
        self.state()
            .tokens
            .insert(token.clone(), email.to_string());
        token
    }

    /// Adds a mentor with a fixed id.
    pub fn seed_mentor(&self, id: u64, name: &str, expertise: &str) {
        self.state().mentors.push(json!({
            "id": id,
            "name": name,
            "expertise": expertise,
            "description": format!("Your mentor specialized in {expertise}"),
            "created_at": TIMESTAMP,
        }));
    }

    /// Adds a resource with a fixed id to a mentor.
    pub fn seed_resource(&self, id: u64, mentor_id: u64, title: &str) {
        self.state().resources.push(json!({
            "id": id,
            "title": title,
            "type": "pdf",
            "status": "ANALYZED",
            "mentor_id": mentor_id,
            "size": 2048,
            "uploadDate": TIMESTAMP,
        }));
    }

    /// Invalidates every issued token.
    pub fn revoke_tokens(&self) {
        self.state().tokens.clear();
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn user_json(id: u64, email: &str, full_name: Option<&str>) -> Value {
    json!({
        "id": id,
        "email": email,
        "full_name": full_name,
        "is_active": true,
        "created_at": TIMESTAMP,
    })
}

fn error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

/// Resolves the bearer token to a user email.
fn authorize(state: &BackendState, headers: &HeaderMap) -> Result<String, Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    token
        .and_then(|t| state.tokens.get(t).cloned())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
}

fn id_matches(value: &Value, id: &str) -> bool {
    match &value["id"] {
        Value::Number(n) => n.to_string() == id,
        Value::String(s) => s == id,
        _ => false,
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
    full_name: Option<String>,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = state.lock().expect("poisoned");
    if state.users.contains_key(&body.email) {
        return error(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let id = state.next_id();
    let user = user_json(id, &body.email, body.full_name.as_deref());
    state
        .users
        .insert(body.email, (body.password, user.clone()));
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn login(State(state): State<Shared>, Form(form): Form<HashMap<String, String>>) -> Response {
    let mut state = state.lock().expect("poisoned");
    let email = form.get("username").cloned().unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();
    match state.users.get(&email) {
        Some((expected, _)) if *expected == password => {
            let id = state.next_id();
            let token = format!("token-{id}");
            state.tokens.insert(token.clone(), email);
            Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
        }
        _ => error(StatusCode::UNAUTHORIZED, "Incorrect email or password"),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("poisoned");
    match authorize(&state, &headers) {
        Ok(email) => Json(state.users[&email].1.clone()).into_response(),
        Err(response) => response,
    }
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let (user, hang) = {
        let state = state.lock().expect("poisoned");
        match authorize(&state, &headers) {
            Ok(email) => (state.users[&email].1.clone(), state.hang_profile),
            Err(response) => return response,
        }
    };
    if hang {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
    Json(json!({
        "user": user,
        "profile": {
            "notifications_enabled": true,
            "subscription_status": "free",
            "mentor_count": 0,
            "resource_upload_mb": 0.0,
        },
    }))
    .into_response()
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let state = state.lock().expect("poisoned");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    Json(json!({ "message": "Profile updated successfully", "received": body })).into_response()
}

// ============================================================================
// Mentors
// ============================================================================

async fn list_mentors(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let (mentors, delay) = {
        let mut state = state.lock().expect("poisoned");
        if let Err(response) = authorize(&state, &headers) {
            return response;
        }
        if state.fail_mentors {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
        (state.mentors.clone(), state.mentor_delays.pop_front())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(Value::Array(mentors)).into_response()
}

async fn get_mentor(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let state = state.lock().expect("poisoned");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    state
        .mentors
        .iter()
        .find(|m| id_matches(m, &id))
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Mentor not found"),
            |m| Json(m.clone()).into_response(),
        )
}

async fn create_mentor(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("poisoned");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let id = state.next_id();
    let mut mentor = body;
    mentor["id"] = json!(id);
    mentor["created_at"] = json!(TIMESTAMP);
    state.mentors.push(mentor.clone());
    (StatusCode::CREATED, Json(mentor)).into_response()
}

async fn update_mentor(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("poisoned");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let Some(mentor) = state.mentors.iter_mut().find(|m| id_matches(m, &id)) else {
        return error(StatusCode::NOT_FOUND, "Mentor not found");
    };
    if let Value::Object(fields) = body {
        for (key, value) in fields {
            mentor[key] = value;
        }
    }
    Json(mentor.clone()).into_response()
}

async fn delete_mentor(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().expect("poisoned");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let before = state.mentors.len();
    state.mentors.retain(|m| !id_matches(m, &id));
    if state.mentors.len() == before {
        return error(StatusCode::NOT_FOUND, "Mentor not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Resources
// ============================================================================

async fn list_resources(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(mentor_id): Path<String>,
) -> Response {
    // Snapshot at arrival, answer after the configured delay.
    let (resources, delay) = {
        let mut state = state.lock().expect("poisoned");
        if let Err(response) = authorize(&state, &headers) {
            return response;
        }
        let resources: Vec<Value> = state
            .resources
            .iter()
            .filter(|r| r["mentor_id"].to_string().trim_matches('"') == mentor_id)
            .cloned()
            .collect();
        (resources, state.resource_delays.pop_front())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(Value::Array(resources)).into_response()
}

async fn upload_resource(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    {
        let mut state = state.lock().expect("poisoned");
        state.uploads += 1;
        if let Err(response) = authorize(&state, &headers) {
            return response;
        }
    }

    let mut file_name = None;
    let mut content_type = None;
    let mut size = 0;
    let mut mentor_id = None;
    while let Some(field) = multipart.next_field().await.expect("bad multipart") {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                size = field.bytes().await.expect("bad file part").len();
            }
            Some("mentor_id") => {
                mentor_id = Some(field.text().await.expect("bad mentor_id"));
            }
            _ => {}
        }
    }
    let (Some(file_name), Some(mentor_id)) = (file_name, mentor_id) else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "file and mentor_id are required");
    };

    let mut state = state.lock().expect("poisoned");
    let id = state.next_id();
    let kind = match content_type.as_deref() {
        Some("application/pdf") => "pdf",
        Some(ct) if ct.starts_with("image/") => "image",
        _ => "text",
    };
    let resource = json!({
        "id": id,
        "name": file_name,
        "type": kind,
        "status": "PENDING",
        "mentor_id": mentor_id,
        "size": size,
        "created_at": TIMESTAMP,
    });
    state.resources.push(resource.clone());
    (StatusCode::CREATED, Json(resource)).into_response()
}

async fn add_url_resource(
    State(state): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().expect("poisoned");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let id = state.next_id();
    let resource = json!({
        "id": id.to_string(),
        "name": form.get("name"),
        "url": form.get("url"),
        "type": "url",
        "status": "pending",
        "mentor_id": form.get("mentor_id"),
    });
    state.resources.push(resource.clone());
    (StatusCode::CREATED, Json(resource)).into_response()
}

async fn delete_resource(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().expect("poisoned");
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let before = state.resources.len();
    state.resources.retain(|r| !id_matches(r, &id));
    if state.resources.len() == before {
        return error(StatusCode::NOT_FOUND, "Resource not found");
    }
    Json(json!({ "message": "Resource deleted" })).into_response()
}
