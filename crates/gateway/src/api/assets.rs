//! Static front-end files.
//!
//! Read from `server.static_dir` on every request, so the page and widget
//! can be edited without restarting the server.

use std::io::ErrorKind;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::state::AppState;

/// `GET /` — chat page.
pub async fn index(State(state): State<AppState>) -> Response {
    serve_static(&state, "index.html", "text/html; charset=utf-8").await
}

/// `GET /widget.js` — embeddable loader script.
pub async fn widget(State(state): State<AppState>) -> Response {
    serve_static(&state, "widget.js", "application/javascript; charset=utf-8").await
}

async fn serve_static(state: &AppState, name: &str, content_type: &'static str) -> Response {
    let path = state.config.server.static_dir.join(name);

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("{name} not found") })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read static file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("failed to read {name}") })),
            )
                .into_response()
        }
    }
}
