//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{
    ChatRequest, ChatResponse, ConnectionStatus, ErrorResponse, SessionResponse, SuccessResponse,
};
use super::AppState;
use crate::render::{render_turn, render_turns};
use crate::session::{Session, SessionError, SharedSession};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the page
        .route("/", get(serve_page))
        // Static assets (embedded)
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(end_session))
        // One submission per call
        .route("/api/sessions/:id/chat", post(send_chat))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Sessions
// ============================================================

/// Start a session and open its backend connection
async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let (id, session) = state.sessions.create().await;
    let mut session = session.lock().await;

    if let Err(e) = session
        .initialize(state.connector.as_ref(), &state.settings)
        .await
    {
        tracing::warn!(session = %id, error = %e, "Session started without a connection");
    }

    Json(session_response(&session, state.max_messages_displayed))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = lookup(&state, id).await?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(session_response(&session, state.max_messages_displayed)))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

fn session_response(session: &Session, max_messages: usize) -> SessionResponse {
    let transcript = session.transcript();
    SessionResponse {
        session_id: session.id(),
        created_at: session.created_at(),
        connection: ConnectionStatus::from(session.connection()),
        messages: render_turns(transcript.recent(max_messages)),
        total_messages: transcript.len(),
    }
}

async fn lookup(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

// ============================================================
// Chat
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session = lookup(&state, id).await?;
    // Held across the backend call: one submission per session at a time
    let mut session = session.lock().await;

    let reply = session.submit(&req.text).await.map_err(|e| match e {
        SessionError::SessionUnavailable => AppError::Unavailable(e.to_string()),
        SessionError::EmptyInput => AppError::BadRequest(e.to_string()),
    })?;

    let Some([seeker, guide]) = session.transcript().turns().last_chunk::<2>() else {
        return Err(AppError::Internal(
            "Transcript missing the submitted turns".to_string(),
        ));
    };

    Ok(Json(ChatResponse {
        seeker: render_turn(seeker),
        guide: render_turn(guide),
        failed: reply.is_failure(),
    }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("gita-guide ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuideConfig;
    use crate::llm::{LlmConnector, LlmError, LlmResponse};
    use crate::session::testing::{MockConnector, MockLlmService};
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(connector: impl LlmConnector + 'static, config: &GuideConfig) -> Router {
        create_router(AppState::new(Arc::new(connector), config))
    }

    fn ready_app(mock: &Arc<MockLlmService>) -> Router {
        app_with(MockConnector::ready(mock.clone()), &GuideConfig::default())
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn new_session(app: &Router) -> (String, Value) {
        let (status, body) = send(app, post_json("/api/sessions", &json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["session_id"].as_str().unwrap().to_string();
        (id, body)
    }

    async fn chat(app: &Router, id: &str, text: &str) -> (StatusCode, Value) {
        send(
            app,
            post_json(&format!("/api/sessions/{id}/chat"), &json!({ "text": text })),
        )
        .await
    }

    #[tokio::test]
    async fn test_create_session_ready() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        let app = ready_app(&mock);

        let (_, body) = new_session(&app).await;
        assert_eq!(body["connection"]["ready"], true);
        assert!(body["connection"].get("error").is_none());
        assert_eq!(body["messages"], json!([]));
    }

    #[tokio::test]
    async fn test_verse_request_end_to_end() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        mock.queue_response(LlmResponse::text(
            "<sanskrit>Text</sanskrit><translation>Meaning</translation>",
        ));
        let app = ready_app(&mock);
        let (id, _) = new_session(&app).await;

        let (status, body) = chat(&app, &id, "Chapter 2, Verse 47").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["failed"], false);
        assert_eq!(body["seeker"]["role"], "seeker");
        assert_eq!(body["seeker"]["content"], "Chapter 2, Verse 47");

        let html = body["guide"]["html"].as_str().unwrap();
        assert_eq!(html.matches("<div class='sanskrit'>").count(), 1);
        assert_eq!(html.matches("<div class='translation'>").count(), 1);
        assert!(html.find("class='sanskrit'").unwrap() < html.find("class='translation'").unwrap());
        assert!(!html.contains("<sanskrit>") && !html.contains("<translation>"));
        assert_eq!(body["guide"]["styled"], true);
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported_and_recorded() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        mock.queue_error(LlmError::network("Request timeout"));
        let app = ready_app(&mock);
        let (id, _) = new_session(&app).await;

        let (status, body) = chat(&app, &id, "Chapter 6").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["failed"], true);
        assert_eq!(
            body["guide"]["content"],
            "❌ Failed to generate response: Request timeout"
        );

        let (_, session) = send(&app, get_req(&format!("/api/sessions/{id}"))).await;
        assert_eq!(session["total_messages"], 2);
        assert_eq!(session["messages"][1]["content"], body["guide"]["content"]);
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let app = app_with(
            MockConnector::failing(LlmError::network("Connection failed")),
            &GuideConfig::default(),
        );

        let (id, body) = new_session(&app).await;
        assert_eq!(body["connection"]["ready"], false);
        assert_eq!(
            body["connection"]["error"],
            "❌ Could not connect to Ollama. Please ensure Ollama is running locally."
        );

        let (status, body) = chat(&app, &id, "Chapter 1").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["error"],
            "Cannot process request - Connection not established"
        );

        let (_, session) = send(&app, get_req(&format!("/api/sessions/{id}"))).await;
        assert_eq!(session["total_messages"], 0);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        let app = ready_app(&mock);
        let (id, _) = new_session(&app).await;

        let (status, _) = chat(&app, &id, "  ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(mock.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        let app = ready_app(&mock);
        let id = Uuid::new_v4();

        let (status, _) = chat(&app, &id.to_string(), "hello").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get_req(&format!("/api/sessions/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_display_window() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        for answer in ["one", "two", "three"] {
            mock.queue_response(LlmResponse::text(answer));
        }
        let config = GuideConfig {
            max_messages_displayed: 2,
            ..GuideConfig::default()
        };
        let app = app_with(MockConnector::ready(mock.clone()), &config);
        let (id, _) = new_session(&app).await;

        for question in ["q1", "q2", "q3"] {
            let (status, _) = chat(&app, &id, question).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = send(&app, get_req(&format!("/api/sessions/{id}"))).await;
        assert_eq!(body["total_messages"], 6);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "q3");
        assert_eq!(messages[1]["content"], "three");
    }

    #[tokio::test]
    async fn test_abandoned_page_loads_are_swept() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        let state = AppState::new(
            Arc::new(MockConnector::ready(mock)),
            &GuideConfig::default(),
        );
        let sessions = state.sessions.clone();
        let app = create_router(state);

        for _ in 0..500 {
            new_session(&app).await;
        }
        assert_eq!(sessions.len().await, 500);

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(sessions.evict_idle(std::time::Duration::from_millis(5)).await, 500);
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_reading_a_session_keeps_it_alive() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        let state = AppState::new(
            Arc::new(MockConnector::ready(mock)),
            &GuideConfig::default(),
        );
        let sessions = state.sessions.clone();
        let app = create_router(state);
        let (id, _) = new_session(&app).await;

        tokio::time::sleep(std::time::Duration::from_millis(600)).await;
        let (status, _) = send(&app, get_req(&format!("/api/sessions/{id}"))).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(sessions.evict_idle(std::time::Duration::from_millis(500)).await, 0);
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_end_session() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        let app = ready_app(&mock);
        let (id, _) = new_session(&app).await;

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{id}"))
                .body(Body::empty())
                .unwrap()
        };
        let (status, body) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_page_and_version() {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        let app = ready_app(&mock);

        let response = app.clone().oneshot(get_req("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Bhagavad Gita AI Guide"));

        let response = app.clone().oneshot(get_req("/version")).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).starts_with("gita-guide "));

        let response = app.oneshot(get_req("/assets/app.js")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
