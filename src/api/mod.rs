//! HTTP layer -- axum routes, handlers, and the dashboard page.

mod routes;
pub mod state;

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use self::state::AppState;

/// Build the application router: dashboard page, versioned API, middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .nest("/api/v1", routes::api_routes())
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

#[derive(Template)]
#[template(path = "board.html")]
struct BoardTemplate {
    rows: Vec<BoardRow>,
    generated_at: String,
}

struct BoardRow {
    id: String,
    kind: String,
    sha: String,
    status: String,
    text: String,
    tooltip: String,
}

/// Server-rendered snapshot of the board. Live updates come from the patch
/// stream; this page is the zero-javascript fallback view.
async fn dashboard(State(state): State<AppState>) -> Response {
    let board = state.board.read().await;
    let rows = board
        .iter()
        .map(|(id, element)| {
            let kind = match &element.role {
                crate::board::Role::ProgressBox { .. } => "progress box",
                crate::board::Role::ConfigRow { .. } => "config row",
                crate::board::Role::ShaLabel { .. } => "sha label",
                crate::board::Role::BranchEntry { .. } => "branch entry",
                crate::board::Role::RetestControl { .. } => "retest control",
            };
            BoardRow {
                id: id.to_string(),
                kind: kind.to_string(),
                sha: element.role.sha().to_string(),
                status: element
                    .view
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                text: element.view.text.clone().unwrap_or_default(),
                tooltip: element.view.tooltip.clone().unwrap_or_default(),
            }
        })
        .collect();
    drop(board);

    let page = BoardTemplate {
        rows,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };
    match page.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render dashboard");
            (StatusCode::INTERNAL_SERVER_ERROR, "render failure").into_response()
        }
    }
}
