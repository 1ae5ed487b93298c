// Learn Dashboard - Web Server
// Serves the rendered profile page and answers chart actions from the browser

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use learn_dashboard::dashboard::SECTIONS;
use learn_dashboard::{
    error_page, fetch_all, html_document, Action, AuthProvider, Dashboard, DashboardConfig, DashboardError,
    DashboardView, Document, GraphQlClient, LiveDashboard, RawDashboard, SystemClock, TokenAuth, Update,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

#[derive(Parser)]
#[command(name = "learn-dashboard-server", version, about = "Serve the profile dashboard over HTTP")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Serve saved query results instead of fetching live
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Overrides `[server] bind`
    #[arg(long)]
    bind: Option<String>,
}

/// Current dashboard, or the message of the last failed load
enum Session {
    Ready(Box<LiveDashboard<SystemClock>>),
    Failed(String),
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    config: Arc<DashboardConfig>,
    auth: Arc<TokenAuth>,
    data_dir: Option<PathBuf>,
    session: Arc<RwLock<Session>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data, error: None }
    }
}

impl ApiResponse<()> {
    fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: (), error: Some(message.into()) }
    }
}

/// One mount replacement, as the host script applies it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MountUpdate {
    mount_id: String,
    markup: String,
    scroll_into_view: bool,
}

/// Measured widths posted by the host script on load and on window resize
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResizeReport {
    window_width: f64,
    /// Mount id to container width
    mounts: BTreeMap<String, f64>,
}

impl From<Update> for MountUpdate {
    fn from(update: Update) -> Self {
        Self {
            mount_id: update.mount_id,
            markup: update.content.to_markup(),
            scroll_into_view: update.scroll_into_view,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

async fn load_session(state: &AppState) -> Session {
    let raw = match &state.data_dir {
        Some(dir) => RawDashboard::from_dir(dir),
        None if !state.auth.is_authenticated() => Err(DashboardError::NotAuthenticated),
        None => {
            let client = GraphQlClient::new(state.config.api.graphql_endpoint(), state.auth.clone());
            fetch_all(&client).await
        }
    };

    match raw.and_then(|raw| DashboardView::build_with(&raw, &state.config.classification)) {
        Ok(view) => {
            info!("dashboard loaded for {}", view.user.as_ref().map_or("unknown", |u| u.login.as_str()));
            let live = LiveDashboard::new(
                Dashboard::new(view),
                document_for(&state.config),
                SystemClock::new(),
                state.config.charts.debounce_ms,
            );
            Session::Ready(Box::new(live))
        }
        Err(e) => {
            error!("dashboard load failed: {}", e);
            Session::Failed(e.to_string())
        }
    }
}

/// Mount layout assumed until the host reports real measurements
fn document_for(config: &DashboardConfig) -> Document {
    let width = config.charts.render_width;
    SECTIONS.iter().fold(
        Document::new(width).with_settings(config.charts.viewport_settings()),
        |doc, (id, _)| doc.with_mount(id, width),
    )
}

fn unavailable(message: &str) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(ApiResponse::failure(message))).into_response()
}

// ============================================================================
// Page Handlers
// ============================================================================

/// GET / - Profile page, or the error page with retry/logout
async fn serve_index(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    let html = match &*session {
        Session::Ready(live) => {
            let login = live.dashboard().view().user.as_ref().map(|u| u.login.clone()).unwrap_or_default();
            html_document(&format!("{} - Profile", login), &live.render_page())
        }
        Session::Failed(message) => html_document("Profile", &error_page(message)),
    };
    Html(html)
}

/// GET /retry - Refetch everything, then back to the page
async fn retry(State(state): State<AppState>) -> impl IntoResponse {
    let fresh = load_session(&state).await;
    *state.session.write().await = fresh;
    Redirect::to("/")
}

/// GET /logout - Drop the session token and the loaded data
async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    state.auth.logout();
    *state.session.write().await = Session::Failed("Logged out. Sign in again to view your profile.".to_string());
    Redirect::to("/")
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/action/:action - Run a chart action, return the mounts to replace
async fn run_action(State(state): State<AppState>, Path(encoded): Path<String>) -> Response {
    let Some(action) = Action::decode(&encoded) else {
        warn!("unknown action '{}'", encoded);
        return (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(format!("unknown action '{}'", encoded))))
            .into_response();
    };

    let mut session = state.session.write().await;
    match &mut *session {
        Session::Ready(live) => {
            let updates: Vec<MountUpdate> = live
                .handle(&action)
                .into_iter()
                .map(MountUpdate::from)
                .collect();
            (StatusCode::OK, Json(ApiResponse::ok(updates))).into_response()
        }
        Session::Failed(message) => unavailable(message),
    }
}

/// Record the measurements, wait out the debounce window, then collect the
/// redraws. A newer report arriving meanwhile pushes the deadline out, so only
/// the last report of a burst gets the updates.
async fn apply_resize(state: &AppState, report: ResizeReport) -> Result<Vec<MountUpdate>, String> {
    {
        let mut session = state.session.write().await;
        match &mut *session {
            Session::Ready(live) => {
                let widths: Vec<(&str, f64)> = report.mounts.iter().map(|(id, w)| (id.as_str(), *w)).collect();
                live.report_resize(report.window_width, &widths);
            }
            Session::Failed(message) => return Err(message.clone()),
        }
    }

    tokio::time::sleep(Duration::from_millis(state.config.charts.debounce_ms)).await;

    let mut session = state.session.write().await;
    match &mut *session {
        Session::Ready(live) => {
            let updates: Vec<MountUpdate> = live.poll().into_iter().map(MountUpdate::from).collect();
            debug!("resize to {}px redrew {} mounts", report.window_width, updates.len());
            Ok(updates)
        }
        Session::Failed(message) => Err(message.clone()),
    }
}

/// POST /api/resize - Measured widths in, redrawn mounts out
async fn report_resize(State(state): State<AppState>, Json(report): Json<ResizeReport>) -> Response {
    match apply_resize(&state, report).await {
        Ok(updates) => (StatusCode::OK, Json(ApiResponse::ok(updates))).into_response(),
        Err(message) => unavailable(&message),
    }
}

/// GET /api/skills - Skill levels and histories
async fn get_skills(State(state): State<AppState>) -> Response {
    match &*state.session.read().await {
        Session::Ready(live) => Json(ApiResponse::ok(&live.dashboard().view().skills)).into_response(),
        Session::Failed(message) => unavailable(message),
    }
}

/// GET /api/xp - XP date buckets per category
async fn get_xp(State(state): State<AppState>) -> Response {
    match &*state.session.read().await {
        Session::Ready(live) => Json(ApiResponse::ok(&live.dashboard().view().xp)).into_response(),
        Session::Failed(message) => unavailable(message),
    }
}

/// GET /api/progress - Merged projects per category
async fn get_progress(State(state): State<AppState>) -> Response {
    match &*state.session.read().await {
        Session::Ready(live) => Json(ApiResponse::ok(&live.dashboard().view().progress)).into_response(),
        Session::Failed(message) => unavailable(message),
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("🌐 Learn Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = DashboardConfig::load(args.config.as_deref())?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let mut state = AppState {
        auth: Arc::new(TokenAuth::new(config.api.token.clone())),
        config: Arc::new(config),
        data_dir: args.data_dir,
        session: Arc::new(RwLock::new(Session::Failed("Not loaded yet".to_string()))),
    };
    match &state.data_dir {
        Some(dir) => println!("✓ Serving saved data from {}", dir.display()),
        None => println!("✓ Fetching from {}", state.config.api.graphql_endpoint()),
    }

    let initial = load_session(&state).await;
    if let Session::Failed(message) = &initial {
        eprintln!("❌ Initial load failed: {}", message);
    }
    state.session = Arc::new(RwLock::new(initial));

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/action/:action", get(run_action))
        .route("/resize", post(report_resize))
        .route("/skills", get(get_skills))
        .route("/xp", get(get_xp))
        .route("/progress", get(get_progress))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .route("/retry", get(retry))
        .route("/logout", get(logout))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let listener = tokio::net::TcpListener::bind(&bind).await?;

    println!("\n🚀 Server running on http://{}", bind);
    println!("   API: http://{}/api/xp", bind);
    println!("   UI:  http://{}", bind);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use learn_dashboard::Element;

    fn state_with(config: DashboardConfig, token: Option<String>, data_dir: Option<PathBuf>) -> AppState {
        AppState {
            auth: Arc::new(TokenAuth::new(token)),
            config: Arc::new(config),
            data_dir,
            session: Arc::new(RwLock::new(Session::Failed("Not loaded yet".to_string()))),
        }
    }

    async fn sample_state(debounce_ms: u64) -> AppState {
        let mut config = DashboardConfig::default();
        config.charts.debounce_ms = debounce_ms;
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/sample-data");
        let state = state_with(config, None, Some(dir));
        let session = load_session(&state).await;
        *state.session.write().await = session;
        state
    }

    fn report(window_width: f64, mounts: &[(&str, f64)]) -> ResizeReport {
        ResizeReport {
            window_width,
            mounts: mounts.iter().map(|(id, w)| (id.to_string(), *w)).collect(),
        }
    }

    #[test]
    fn test_mount_update_carries_markup() {
        let update = Update {
            mount_id: "xp-graph".to_string(),
            content: Element::new("p").class("no-data").text("none"),
            scroll_into_view: true,
        };
        let json = serde_json::to_value(MountUpdate::from(update)).unwrap();
        assert_eq!(json["mountId"], "xp-graph");
        assert_eq!(json["markup"], "<p class=\"no-data\">none</p>");
        assert_eq!(json["scrollIntoView"], true);
    }

    #[test]
    fn test_document_has_every_section() {
        let doc = document_for(&DashboardConfig::default());
        for (id, _) in SECTIONS {
            assert_eq!(doc.measure(id), Some(900.0));
        }
    }

    #[test]
    fn test_failure_response_shape() {
        let json = serde_json::to_value(ApiResponse::failure("down")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "down");
    }

    #[tokio::test]
    async fn test_expired_token_fails_without_fetching() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"42","exp":1}"#);
        let expired = format!("{}.{}.c2lnbmF0dXJl", header, payload);

        let mut config = DashboardConfig::default();
        // Nothing listens here; reaching the network would surface a transport error instead
        config.api.domain = "127.0.0.1:9".to_string();
        let state = state_with(config, Some(expired), None);

        match load_session(&state).await {
            Session::Failed(message) => assert_eq!(message, DashboardError::NotAuthenticated.to_string()),
            Session::Ready(_) => panic!("expired token must not load a dashboard"),
        }
        assert_eq!(state.auth.get_token(), None);
    }

    #[tokio::test]
    async fn test_resize_report_redraws_only_changed_mounts() {
        let state = sample_state(20).await;

        let updates = apply_resize(&state, report(400.0, &[("auditRatio-graph", 360.0)])).await.unwrap();
        let ids: Vec<&str> = updates.iter().map(|u| u.mount_id.as_str()).collect();
        assert_eq!(ids, vec!["auditRatio-graph"]);
        assert!(updates[0].markup.contains("Given: "));
        assert!(!updates[0].scroll_into_view);

        let updates = apply_resize(&state, report(400.0, &[("auditRatio-graph", 360.0)])).await.unwrap();
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_resize_without_session_is_unavailable() {
        let state = state_with(DashboardConfig::default(), None, None);
        let err = apply_resize(&state, report(800.0, &[])).await.unwrap_err();
        assert_eq!(err, "Not loaded yet");
    }
}
