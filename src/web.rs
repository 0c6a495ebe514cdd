use crate::{
    app::{
        reports::{HealthReport, StatusReport},
        AppError, AppLocal,
    },
    config::ServerConfig,
    documents::DocumentCreate,
    semantic::AnswerResult,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::{signal, sync::RwLock};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const ENDPOINTS: &[(&str, &str)] = &[
    ("index", "GET /"),
    ("health", "GET /health"),
    ("status", "GET /status"),
    ("documents", "GET /documents"),
    ("embedding_test", "GET /embedding_test"),
    ("upload", "POST /upload"),
    ("ask", "POST /ask"),
    ("clear", "POST /clear"),
];

#[derive(Clone)]
struct SharedState {
    app: Arc<RwLock<AppLocal>>,
}

/// Build the HTTP router around a shared knowledge base.
pub fn router(app: Arc<RwLock<AppLocal>>, server_config: &ServerConfig) -> Router {
    let shared_state = Arc::new(SharedState { app });

    Router::new()
        .route("/", get(index).fallback(method_not_allowed))
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/status", get(status).fallback(method_not_allowed))
        .route("/documents", get(list_documents).fallback(method_not_allowed))
        .route(
            "/embedding_test",
            get(embedding_test).fallback(method_not_allowed),
        )
        .route("/upload", post(upload).fallback(method_not_allowed))
        .route("/ask", post(ask).fallback(method_not_allowed))
        .route("/clear", post(clear).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(cors_layer(&server_config.cors_origins))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

async fn start_app(app: AppLocal) -> anyhow::Result<()> {
    let server_config = app.config().server.clone();
    let app = Arc::new(RwLock::new(app));

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        log::warn!("shutting down, in-memory documents will be lost");
    }

    let router = router(app, &server_config);

    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!(
        "listening on {addr} (environment: {})",
        server_config.environment
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(app: AppLocal) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { start_app(app).await })
}

#[derive(Debug)]
struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": self.0.to_string(), "status": "failed"})),
            ),
            AppError::Other(_) => {
                log::error!("{self:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": self.0.to_string(), "status": "error"})),
                )
            }
        }
        .into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Unwrap a JSON body, turning missing or malformed bodies into a 400.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        log::debug!("rejected body: {rejection}");
        HttpError(AppError::Validation(
            "request body is empty or malformed".to_string(),
        ))
    })
}

async fn index() -> impl IntoResponse {
    let endpoints: serde_json::Map<String, serde_json::Value> = ENDPOINTS
        .iter()
        .map(|(name, route)| (name.to_string(), json!(route)))
        .collect();

    Json(json!({
        "status": "online",
        "service": "docqa",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
        "endpoints": endpoints,
        "usage": "Use POST to upload documents and ask questions",
    }))
}

async fn health(State(state): State<Arc<SharedState>>) -> Json<HealthReport> {
    let app = state.app.clone();
    tokio::task::block_in_place(move || Json(app.blocking_read().health()))
}

async fn status(State(state): State<Arc<SharedState>>) -> Json<StatusReport> {
    let app = state.app.clone();
    tokio::task::block_in_place(move || Json(app.blocking_read().status()))
}

async fn embedding_test(State(state): State<Arc<SharedState>>) -> Json<serde_json::Value> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let probe = app.blocking_read().embedding_probe();

        Json(json!({
            "test": "embedding function test",
            "embedding": probe,
            "note": "hash-based pseudo embedding, not a semantic model",
        }))
    })
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub count: usize,
    pub documents: Vec<crate::documents::DocumentSummary>,
}

async fn list_documents(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<DocumentListResponse>, HttpError> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let app = app.blocking_read();
        let documents = app.list_documents();

        Ok(DocumentListResponse {
            count: documents.len(),
            documents,
        }
        .into())
    })
}

async fn upload(
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<DocumentCreate>, JsonRejection>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let payload = json_body(payload)?;
    log::debug!(
        "upload: title {:?}, {} bytes",
        payload.title,
        payload.content.len()
    );

    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let mut app = app.blocking_write();
        let document = app.add_document(payload)?;
        let length = document.length();

        Ok(Json(json!({
            "status": "success",
            "message": "document uploaded",
            "document": {
                "id": document.id,
                "title": document.title,
                "length": length,
                "created_at": document.created_at,
            },
            "statistics": {
                "total_documents": app.total(),
                "content_length": length,
            },
        })))
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

async fn ask(
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResult>, HttpError> {
    let payload = json_body(payload)?;
    log::debug!("payload: {payload:?}");

    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let mut app = app.blocking_write();
        app.answer_question(&payload.question)
            .map(Into::into)
            .map_err(Into::into)
    })
}

async fn clear(State(state): State<Arc<SharedState>>) -> Result<Json<serde_json::Value>, HttpError> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let mut app = app.blocking_write();
        let cleared = app.clear_store();

        Ok(Json(json!({
            "status": "success",
            "message": format!("cleared {cleared} documents"),
            "cleared": cleared,
            "timestamp": Utc::now(),
        })))
    })
}

async fn not_found() -> impl IntoResponse {
    let available: Vec<&str> = ENDPOINTS.iter().map(|(_, route)| *route).collect();

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "endpoint not found",
            "status": 404,
            "available_endpoints": available,
        })),
    )
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "method not allowed",
            "status": 405,
            "allowed_methods": ["GET", "POST"],
        })),
    )
}
