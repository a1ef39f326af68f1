pub mod assets;
pub mod chat;
pub mod health;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use dc_domain::config::CorsConfig;

use crate::state::AppState;

/// Build the HTTP router.
///
/// All routes are public: the chat endpoint is called straight from the
/// embedded widget on customer-facing pages.
pub fn router() -> Router<AppState> {
    Router::new()
        // Static front-end
        .route("/", get(assets::index))
        .route("/widget.js", get(assets::widget))
        // Health probe
        .route("/health", get(health::health))
        // Chat
        .route("/api/chat", post(chat::chat))
        .layer(TraceLayer::new_for_http())
}

/// Build a [`CorsLayer`] from the configured allowed origins.
///
/// A lone `"*"` allows every origin, which is what an embeddable widget
/// needs.  Entries ending in `:*` match any port on that host.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if cors.allowed_origins.iter().any(|o| o == "*") {
        tracing::info!("CORS: all origins allowed");
        return base.allow_origin(tower_http::cors::Any);
    }

    let matcher = OriginMatcher::from_origins(&cors.allowed_origins);
    if matcher.port_wildcards.is_empty() {
        return base.allow_origin(AllowOrigin::list(matcher.exact));
    }
    base.allow_origin(AllowOrigin::predicate(move |origin, _| matcher.matches(origin)))
}

/// Allowed origins split into exact values and `scheme://host:` prefixes
/// that accept any numeric port.
#[derive(Debug, Default)]
struct OriginMatcher {
    exact: Vec<HeaderValue>,
    port_wildcards: Vec<String>,
}

impl OriginMatcher {
    fn from_origins(origins: &[String]) -> Self {
        let mut matcher = Self::default();
        for origin in origins {
            if let Some(prefix) = origin.strip_suffix('*').filter(|p| p.ends_with(':')) {
                matcher.port_wildcards.push(prefix.to_owned());
            } else if let Ok(hv) = origin.parse::<HeaderValue>() {
                matcher.exact.push(hv);
            } else {
                tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
            }
        }
        matcher
    }

    fn matches(&self, origin: &HeaderValue) -> bool {
        if self.exact.iter().any(|e| e.as_bytes() == origin.as_bytes()) {
            return true;
        }
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        self.port_wildcards.iter().any(|prefix| {
            origin
                .strip_prefix(prefix.as_str())
                .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
        })
    }
}
