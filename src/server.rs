use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, middleware};
use eyre::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AnalyzeError;
use crate::pipeline::{AnalysisResponse, Analyzer};

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const HEALTH_PATH: &str = "/api/health";

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct AppState {
    analyzer: Arc<Analyzer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    video_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub has_supadata_key: bool,
    #[serde(rename = "hasOpenAIKey")]
    pub has_openai_key: bool,
    pub model: String,
    pub version: String,
}

/// Build the HTTP routes for the analysis service
pub fn router(analyzer: Arc<Analyzer>) -> Router {
    Router::new()
        .route("/", get(root))
        .route(ANALYZE_PATH, get(health).post(analyze).options(preflight))
        .route(HEALTH_PATH, get(health).options(preflight))
        .layer(middleware::map_response(add_cors_headers))
        .with_state(AppState { analyzer })
}

/// Serve until Ctrl-C
pub async fn serve(analyzer: Arc<Analyzer>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(analyzer))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    response
}

async fn root() -> &'static str {
    "ytdigest: POST /api/analyze with {\"videoUrl\": \"...\"}\n"
}

async fn preflight() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [(header::ACCESS_CONTROL_MAX_AGE, "86400")])
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let settings = state.analyzer.settings();
    Json(Health {
        status: "ok".to_string(),
        has_supadata_key: settings.keys.supadata.is_some(),
        has_openai_key: settings.keys.openai.is_some(),
        model: settings.model.clone(),
        version: env!("GIT_DESCRIBE").to_string(),
    })
}

async fn analyze(State(state): State<AppState>, payload: Result<Json<AnalyzeRequest>, JsonRejection>) -> Response {
    let url = match payload {
        Ok(Json(AnalyzeRequest { video_url: Some(url) })) if !url.trim().is_empty() => url,
        Ok(_) => return invalid_request("videoUrl is required".to_string()),
        Err(rejection) => return invalid_request(rejection.body_text()),
    };

    let response = state.analyzer.clone().run(url).await;
    respond(response)
}

fn invalid_request(message: String) -> Response {
    let error = AnalyzeError::InvalidRequest(message);
    respond(AnalysisResponse::from_error(&error, &Uuid::new_v4().to_string(), Duration::ZERO))
}

fn respond(response: AnalysisResponse) -> Response {
    let status = response.status;
    let request_id = HeaderValue::from_str(&response.request_id).ok();
    let mut http = (status, Json(response)).into_response();
    if let Some(id) = request_id {
        http.headers_mut().insert(REQUEST_ID_HEADER, id);
    }
    http
}
