use crate::agent::ChatAgent;
use crate::models::api::{ ChatRequest, ChatResponse, ErrorResponse, HealthResponse, MessageResponse };
use crate::models::chat::{ now_timestamp, Exchange };
use crate::server::error::ApiError;
use std::any::Any;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::{ rejection::JsonRejection, State },
    response::{ Html, IntoResponse, Response },
    http::StatusCode,
    Json,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{ Any as AnyOrigin, CorsLayer };
use log::{ debug, error };

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Clone)]
struct AppState {
    agent: Arc<ChatAgent>,
}

pub fn router(agent: ChatAgent) -> Router {
    let app_state = AppState {
        agent: Arc::new(agent),
    };

    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(chat_handler))
        .route("/history", get(history_handler))
        .route("/clear_history", post(clear_history_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .with_state(app_state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        debug!("Unreadable chat payload: {}", e);
        ApiError::BadRequest("No JSON data received")
    })?;

    let message = req.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Empty message"));
    }

    let reply = state.agent.chat(message).await;
    Ok(Json(ChatResponse {
        response: reply.response,
        timestamp: reply.timestamp,
    }))
}

async fn history_handler(State(state): State<AppState>) -> Result<Json<Vec<Exchange>>, ApiError> {
    let history = state.agent.history().await.map_err(ApiError::storage("Error retrieving history"))?;
    Ok(Json(history))
}

async fn clear_history_handler(
    State(state): State<AppState>
) -> Result<Json<MessageResponse>, ApiError> {
    state.agent.clear_history().await.map_err(ApiError::storage("Error clearing history"))?;
    Ok(
        Json(MessageResponse {
            message: "Chat history cleared successfully".into(),
        })
    )
}

async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let messages_stored = state.agent
        .message_count().await
        .map_err(ApiError::storage("Health check failed"))?;

    Ok(
        Json(HealthResponse {
            status: "healthy".into(),
            storage: state.agent.storage().into(),
            response_mode: state.agent.response_mode().into(),
            messages_stored,
            timestamp: now_timestamp(),
        })
    )
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Endpoint not found".into(),
        }),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".into(),
        }),
    ).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{ HistoryError, HistoryStore, MemoryHistoryStore };
    use crate::responder::{ ResponseGenerator, RuleBasedResponder };
    use async_trait::async_trait;
    use axum::body::{ to_bytes, Body };
    use axum::http::{ header::CONTENT_TYPE, Method, Request };
    use serde_json::{ json, Value };
    use tower::ServiceExt;

    struct UnreachableStore;

    #[async_trait]
    impl HistoryStore for UnreachableStore {
        async fn append(&self, _: &str, _: &str) -> Result<Exchange, HistoryError> {
            Err(HistoryError::Config("connection refused".into()))
        }

        async fn list(&self) -> Result<Vec<Exchange>, HistoryError> {
            Err(HistoryError::Config("connection refused".into()))
        }

        async fn clear(&self) -> Result<(), HistoryError> {
            Err(HistoryError::Config("connection refused".into()))
        }

        fn describe(&self) -> &'static str {
            "unreachable"
        }
    }

    struct PanickingResponder;

    #[async_trait]
    impl ResponseGenerator for PanickingResponder {
        async fn generate(&self, _message: &str) -> String {
            panic!("responder exploded")
        }

        fn mode(&self) -> &'static str {
            "panics"
        }
    }

    fn app_with(store: Arc<dyn HistoryStore>) -> Router {
        router(ChatAgent::new(Arc::new(RuleBasedResponder::new()), store))
    }

    fn memory_app() -> Router {
        app_with(Arc::new(MemoryHistoryStore::new()))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) =>
                builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn chat_returns_reply_and_records_it() {
        let app = memory_app();

        let (status, body) = send(&app, Method::POST, "/chat", Some(json!({ "message": "  hello  " }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Hello! How can I help you today?");
        assert_eq!(body["timestamp"].as_str().unwrap().len(), 19);

        let (status, history) = send(&app, Method::GET, "/history", None).await;
        assert_eq!(status, StatusCode::OK);
        let history = history.as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["user_message"], "hello");
        assert_eq!(history[0]["bot_response"], "Hello! How can I help you today?");
        assert_eq!(history[0]["timestamp"], body["timestamp"]);
    }

    #[tokio::test]
    async fn blank_or_missing_message_is_rejected() {
        let app = memory_app();

        for payload in [json!({ "message": "   " }), json!({}), json!({ "message": null })] {
            let (status, body) = send(&app, Method::POST, "/chat", Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Empty message");
        }

        let (_, history) = send(&app, Method::GET, "/history", None).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_json_body_is_rejected() {
        let app = memory_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .body(Body::from("message=hello"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "No JSON data received");
    }

    #[tokio::test]
    async fn clear_history_empties_log() {
        let app = memory_app();
        send(&app, Method::POST, "/chat", Some(json!({ "message": "hi" }))).await;

        let (status, body) = send(&app, Method::POST, "/clear_history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Chat history cleared successfully");

        let (status, _) = send(&app, Method::POST, "/clear_history", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, history) = send(&app, Method::GET, "/history", None).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_reports_store_and_count() {
        let app = memory_app();
        send(&app, Method::POST, "/chat", Some(json!({ "message": "hello" }))).await;
        send(&app, Method::POST, "/chat", Some(json!({ "message": "bye" }))).await;

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], "in-memory");
        assert_eq!(body["response_mode"], "rules");
        assert_eq!(body["messages_stored"], 2);
    }

    #[tokio::test]
    async fn storage_failures_surface_as_500_except_on_chat() {
        let app = app_with(Arc::new(UnreachableStore));

        let (status, body) = send(&app, Method::POST, "/chat", Some(json!({ "message": "hello" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Hello! How can I help you today?");

        let (status, body) = send(&app, Method::GET, "/history", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error retrieving history");

        let (status, body) = send(&app, Method::POST, "/clear_history", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error clearing history");

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Health check failed");
    }

    #[tokio::test]
    async fn handler_panic_becomes_generic_500() {
        let app = router(
            ChatAgent::new(Arc::new(PanickingResponder), Arc::new(MemoryHistoryStore::new()))
        );

        let (status, body) = send(&app, Method::POST, "/chat", Some(json!({ "message": "hello" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let app = memory_app();
        let (status, body) = send(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn index_serves_chat_page() {
        let app = memory_app();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/chat"));
    }
}
