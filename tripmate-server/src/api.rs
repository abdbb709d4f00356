//! REST endpoints for frontend applications: chat, itineraries, profiles,
//! and session management.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use tripmate_store::{ChatMessage, StoreError, UserProfile};

use crate::state::{AppState, VERSION};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/itinerary/create", post(create_itinerary))
        .route("/api/itinerary/:user_id", get(get_itinerary))
        .route("/api/user/profile", post(save_profile))
        .route("/api/user/profile/:user_id", get(get_profile))
        .route("/api/session/:session_id", delete(delete_session))
        .route("/api/sessions", get(list_sessions))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub user_id: String,
    pub timestamp: String,
    pub metadata: Value,
}

#[derive(Debug, Deserialize)]
pub struct ItineraryCreateRequest {
    pub user_id: String,
    pub itinerary: Value,
    #[serde(default)]
    pub trip_plan: Value,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Local::now().to_rfc3339(),
        version: VERSION.to_string(),
    })
}

/// Main chat endpoint: session-based conversation with the agent runtime.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorBody>)> {
    let (mut session, session_id) = state
        .sessions
        .get_or_create(req.session_id.as_deref(), &req.user_id)
        .await;

    // a supplied profile wins over the stored one; the store falls back to
    // defaults so there is always something to seed the session with
    let profile = match &req.user_profile {
        Some(profile) => profile.clone(),
        None => state.profiles.load(&req.user_id),
    };
    session.state.insert(
        "user_profile".to_string(),
        serde_json::to_value(&profile).unwrap_or(Value::Null),
    );
    session.state.insert(
        "_time".to_string(),
        Value::String(Local::now().to_rfc3339()),
    );
    session
        .state
        .insert("user_id".to_string(), Value::String(req.user_id.clone()));

    tracing::info!(user_id = %req.user_id, session_id = %session_id, "processing chat message");

    let reply = state
        .runtime
        .run(
            &req.message,
            &req.user_id,
            &session_id,
            &session.state,
            &session.messages,
        )
        .await
        .map_err(|e| {
            tracing::error!(session_id = %session_id, error = %e, "agent runtime call failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody::new(format!("Error processing request: {e}"))),
            )
        })?;

    session.messages.push(ChatMessage {
        role: "user".to_string(),
        content: req.message.clone(),
    });
    session.messages.push(ChatMessage {
        role: "assistant".to_string(),
        content: reply.clone(),
    });
    let message_count = session.messages.len();
    state.sessions.put(&session_id, session).await;

    let has_itinerary = state.itineraries.latest(&req.user_id).is_some();

    Ok(Json(ChatResponse {
        response: reply,
        session_id,
        user_id: req.user_id,
        timestamp: Local::now().to_rfc3339(),
        metadata: json!({
            "has_itinerary": has_itinerary,
            "session_messages": message_count,
        }),
    }))
}

/// Persist one itinerary snapshot for a user.
async fn create_itinerary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ItineraryCreateRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state
        .itineraries
        .append(&req.user_id, req.itinerary, req.trip_plan)
        .await
    {
        Ok((record, count)) => Ok(Json(json!({
            "success": true,
            "iten_id": record.iten_id,
            "records": count,
            "user_id": req.user_id,
        }))),
        Err(e @ StoreError::MissingUserId) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "error": e.to_string()})),
        )),
        Err(e) => {
            tracing::error!(user_id = %req.user_id, error = %e, "failed to persist itinerary");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "error": e.to_string()})),
            ))
        }
    }
}

/// Latest saved itinerary for a user.
async fn get_itinerary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.itineraries.latest(&user_id) {
        Some(record) => Ok(Json(json!({
            "success": true,
            "itinerary": record,
            "user_id": user_id,
        }))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": "No itinerary found for this user",
            })),
        )),
    }
}

/// Create or update a user profile (full overwrite).
async fn save_profile(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.profiles.save(&profile) {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": "Profile saved successfully",
            "user_id": profile.user_id,
        }))),
        Err(e @ StoreError::MissingUserId) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "error": e.to_string()})),
        )),
        Err(e) => {
            tracing::error!(user_id = %profile.user_id, error = %e, "failed to save profile");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "error": e.to_string()})),
            ))
        }
    }
}

/// Fetch a user profile; unknown users get the documented defaults.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<Value> {
    let profile = state.profiles.load(&user_id);
    Json(json!({
        "success": true,
        "profile": profile,
        "user_id": user_id,
    }))
}

/// Delete a chat session.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if state.sessions.delete(&session_id).await {
        Ok(Json(json!({
            "success": true,
            "message": "Session deleted successfully",
        })))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": "Session not found",
            })),
        ))
    }
}

/// List all active sessions (for debugging).
async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Value> {
    let ids = state.sessions.list().await;
    Json(json!({
        "active_sessions": ids,
        "count": ids.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeClient;
    use axum::body::Body;
    use axum::http::{header, Request};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use tripmate_store::{InMemorySessionStore, ItineraryLog, ProfileStore, SessionStore};

    fn test_state() -> (Arc<AppState>, TempDir) {
        let dir = TempDir::new().unwrap();
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let state = Arc::new(AppState {
            sessions,
            profiles: ProfileStore::new(dir.path()),
            itineraries: ItineraryLog::new(dir.path()),
            runtime: RuntimeClient::new(None, Duration::from_secs(1)),
        });
        (state, dir)
    }

    async fn request(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (state, _dir) = test_state();
        let (status, body) = request(router(state), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn chat_without_a_runtime_is_a_502_but_keeps_the_session() {
        let (state, _dir) = test_state();
        let app = router(state.clone());

        let (status, body) = request(
            app,
            "POST",
            "/api/chat",
            Some(json!({"message": "plan a trip to Goa", "user_id": "user_0001"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);

        // the session was created before the runtime call failed
        assert_eq!(state.sessions.list().await.len(), 1);
    }

    #[tokio::test]
    async fn itinerary_create_then_fetch_round_trips() {
        let (state, _dir) = test_state();
        let app = router(state);

        let (status, body) = request(
            app.clone(),
            "POST",
            "/api/itinerary/create",
            Some(json!({"user_id": "user_0001", "itinerary": {"destination": "Tokyo"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["iten_id"], "itin_0001");
        assert_eq!(body["records"], 1);

        let (status, body) = request(app, "GET", "/api/itinerary/user_0001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["itinerary"]["itinerary"]["destination"], "Tokyo");
    }

    #[tokio::test]
    async fn missing_itinerary_is_a_404() {
        let (state, _dir) = test_state();
        let (status, body) = request(router(state), "GET", "/api/itinerary/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn profile_save_then_fetch_round_trips() {
        let (state, _dir) = test_state();
        let app = router(state);

        let profile = json!({
            "user_id": "user_0001",
            "first_name": "Faiz",
            "preferred_currency": "INR",
            "languages": ["English", "Hindi"]
        });
        let (status, _) = request(app.clone(), "POST", "/api/user/profile", Some(profile)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = request(app, "GET", "/api/user/profile/user_0001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["first_name"], "Faiz");
        assert_eq!(body["profile"]["languages"][1], "Hindi");
    }

    #[tokio::test]
    async fn unknown_profile_returns_defaults() {
        let (state, _dir) = test_state();
        let (status, body) =
            request(router(state), "GET", "/api/user/profile/nobody", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["first_name"], "User");
        assert_eq!(body["profile"]["timezone"], "Asia/Kolkata");
    }

    #[tokio::test]
    async fn session_delete_and_list() {
        let (state, _dir) = test_state();
        let app = router(state.clone());

        let (_, id) = state.sessions.get_or_create(None, "user_0001").await;

        let (status, body) = request(app.clone(), "GET", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);

        let (status, _) =
            request(app.clone(), "DELETE", &format!("/api/session/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = request(app, "DELETE", &format!("/api/session/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
