//! Web server implementation

use crate::config::WebConfig;
use crate::sessions::{CaptchaVerdict, SessionStore};
use crate::static_files::StaticFiles;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use cysim_common::{
    ChallengeView, CommandSummary, ConsentChoice, Error, GrammarTable, Outcome, PanelState,
    RunTrigger, SessionStatus,
};

/// Header carrying the session token
pub const SESSION_HEADER: &str = "x-cysim-session";

/// Web server state
#[derive(Clone)]
pub struct WebServer {
    state: Arc<WebServerState>,
}

struct WebServerState {
    cfg: WebConfig,
    sessions: SessionStore,
    trigger: RunTrigger,
    static_files: StaticFiles,
}

// ============================================================================
// Errors
// ============================================================================

/// [`Error`] rendered as an HTTP response
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::EmptyInput | Error::InvalidConsent(_) | Error::CaptchaIncorrect => {
                StatusCode::BAD_REQUEST
            }
            Error::NotLoggedIn => StatusCode::UNAUTHORIZED,
            Error::CaptchaRequired => StatusCode::FORBIDDEN,
            Error::UnknownChallenge(_) => StatusCode::NOT_FOUND,
            Error::RunInProgress => StatusCode::CONFLICT,
            Error::SessionEnded => StatusCode::GONE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }
        (status, Json(serde_json::json!({"error": self.0.to_string()}))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn require_token(headers: &HeaderMap) -> ApiResult<&str> {
    session_token(headers).ok_or(ApiError(Error::NotLoggedIn))
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub captcha_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default, rename = "skipCaptcha")]
    pub skip_captcha: Option<String>,
}

impl LoginQuery {
    fn wants_skip(&self) -> bool {
        matches!(self.skip_captcha.as_deref(), Some("true") | Some("1"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCaptchaRequest {
    pub id: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCaptchaResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<ChallengeView>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsentRequest {
    pub choice: ConsentChoice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelResponse {
    pub panel: PanelState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub input: String,
}

/// An outcome with both of its renderings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub outcome: Outcome,
    pub text: String,
    pub html: String,
}

impl From<Outcome> for RunResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            text: outcome.render_text(),
            html: outcome.render_html(),
            outcome,
        }
    }
}

// ============================================================================
// Server
// ============================================================================

pub async fn serve(cfg: WebConfig) -> anyhow::Result<()> {
    let addr = cfg.listen_addr()?;
    WebServer::new(cfg).serve(addr).await
}

impl WebServer {
    /// Create a new web server
    pub fn new(cfg: WebConfig) -> Self {
        Self {
            state: Arc::new(WebServerState {
                sessions: SessionStore::new(cfg.captcha_ttl(), cfg.session_idle_ttl()),
                trigger: RunTrigger::new(cfg.run_delay()),
                static_files: StaticFiles::new(),
                cfg,
            }),
        }
    }

    pub fn config(&self) -> &WebConfig {
        &self.state.cfg
    }

    /// Create router
    pub fn router(&self) -> Router {
        Router::new()
            // Console UI
            .route("/", get(index_handler))
            .route("/index.html", get(index_handler))
            .route("/static/*path", get(static_handler))
            // Health
            .route("/api/health", get(health_handler))
            // Login gate
            .route("/api/captcha", get(captcha_handler))
            .route("/api/captcha/verify", post(verify_captcha_handler))
            .route("/api/session", get(session_status_handler))
            .route("/api/session/login", post(login_handler))
            .route("/api/session/logout", post(logout_handler))
            .route("/api/consent", post(consent_handler))
            .route("/api/panel/toggle", post(toggle_panel_handler))
            // Interpreter
            .route("/api/run", post(run_handler))
            .route("/api/evaluate", post(evaluate_handler))
            .route("/api/commands", get(commands_handler))
            .fallback(not_found_handler)
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        info!("Cypress simulator console starting on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

impl Default for WebServer {
    fn default() -> Self {
        Self::new(WebConfig::default())
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cysim-web",
        "version": cysim_common::VERSION,
    }))
}

async fn index_handler(State(state): State<Arc<WebServerState>>) -> Response {
    state.static_files.index()
}

async fn static_handler(
    State(state): State<Arc<WebServerState>>,
    Path(path): Path<String>,
) -> Response {
    state.static_files.serve(&path)
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({"error": "not found"})))
}

async fn captcha_handler(State(state): State<Arc<WebServerState>>) -> Json<ChallengeView> {
    Json(state.sessions.issue_challenge().await)
}

async fn verify_captcha_handler(
    State(state): State<Arc<WebServerState>>,
    Json(req): Json<VerifyCaptchaRequest>,
) -> ApiResult<Json<VerifyCaptchaResponse>> {
    let verdict = state.sessions.verify_challenge(&req.id, &req.answer).await?;
    let body = match verdict {
        CaptchaVerdict::Solved => VerifyCaptchaResponse {
            valid: true,
            error: None,
            next: None,
        },
        CaptchaVerdict::Retry(next) => VerifyCaptchaResponse {
            valid: false,
            error: Some(Error::CaptchaIncorrect.to_string()),
            next: Some(next),
        },
    };
    Ok(Json(body))
}

async fn session_status_handler(
    State(state): State<Arc<WebServerState>>,
    headers: HeaderMap,
) -> Json<SessionStatus> {
    Json(state.sessions.status(session_token(&headers)).await)
}

async fn login_handler(
    State(state): State<Arc<WebServerState>>,
    Query(query): Query<LoginQuery>,
    body: Option<Json<LoginRequest>>,
) -> ApiResult<Json<LoginResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let captcha = &state.cfg.captcha;
    let bypass = !captcha.required || (captcha.allow_skip && query.wants_skip());

    let token = state.sessions.login(req.captcha_id.as_deref(), bypass).await?;
    let status = state.sessions.status(Some(&token)).await;
    Ok(Json(LoginResponse { token, status }))
}

async fn logout_handler(
    State(state): State<Arc<WebServerState>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let token = require_token(&headers)?;
    state.sessions.logout(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn consent_handler(
    State(state): State<Arc<WebServerState>>,
    headers: HeaderMap,
    Json(req): Json<ConsentRequest>,
) -> ApiResult<Json<SessionStatus>> {
    let token = require_token(&headers)?;
    state.sessions.set_consent(token, req.choice).await?;
    Ok(Json(state.sessions.status(Some(token)).await))
}

async fn toggle_panel_handler(
    State(state): State<Arc<WebServerState>>,
    headers: HeaderMap,
) -> ApiResult<Json<PanelResponse>> {
    let token = require_token(&headers)?;
    let panel = state.sessions.toggle_panel(token).await?;
    Ok(Json(PanelResponse { panel }))
}

/// Evaluate under the session gate and reveal the outcome after the
/// configured delay.
///
/// The delay and the release of the run slot happen in a spawned task, so
/// a client that goes away mid-run does not leave the session busy.
async fn run_handler(
    State(state): State<Arc<WebServerState>>,
    headers: HeaderMap,
    Json(req): Json<RunRequest>,
) -> ApiResult<Json<RunResponse>> {
    let token = require_token(&headers)?.to_string();
    let ticket = state.sessions.begin_run(&token, &req.input).await.map_err(|e| {
        warn!("run rejected: {}", e);
        e
    })?;

    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        let result = task_state.trigger.run(&req.input).await;
        if let Err(e) = task_state.sessions.finish_run(&token, ticket).await {
            info!("discarding result of a run whose session ended");
            return Err(e);
        }
        result
    });

    let outcome = handle.await.map_err(Error::from)??;
    Ok(Json(RunResponse::from(outcome)))
}

/// Evaluate immediately, without a session or delay
async fn evaluate_handler(
    State(state): State<Arc<WebServerState>>,
    Json(req): Json<RunRequest>,
) -> ApiResult<Json<RunResponse>> {
    let outcome = state.trigger.evaluate_now(&req.input)?;
    Ok(Json(RunResponse::from(outcome)))
}

async fn commands_handler() -> Json<Vec<CommandSummary>> {
    Json(GrammarTable::builtin().iter().map(|spec| spec.summary()).collect())
}
