//! # Routes
//!
//! Axum router configuration for the simulator API.
//!
//! Request path through the middleware stack (outermost first):
//!
//! ```text
//! trace → security headers → catch-panic → CORS → rate limit → body limit
//!       → /api/payments/simulate: API-key gate → handler
//! ```
//!
//! Panics are caught inside the security-header layers so the generic 500
//! carries the same headers as every other response. Unknown paths get a
//! JSON 404 and wrong methods on known paths a JSON 405.

use crate::error::panic_response;
use crate::handlers;
use crate::middleware::{enforce_rate_limit, require_api_key};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
///
/// Routes:
/// - GET  / - Banner
/// - GET  /health - Health check
/// - POST /api/payments/simulate - Simulate a payment
pub fn create_router(state: AppState) -> Router {
    // Access gate only guards the payment route
    let payment_routes = Router::new()
        .route("/simulate", post(handlers::simulate_payment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let router = Router::new()
        .route("/", get(handlers::banner))
        .route("/health", get(handlers::health))
        .nest("/api/payments", payment_routes)
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        // Middleware
        .layer(DefaultBodyLimit::max(state.config.body_limit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ))
        .layer(cors_layer(&state.config.allowed_origin))
        .layer(CatchPanicLayer::custom(panic_response));

    with_security_headers(router)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// CORS restricted to `allowed_origin`, or open when it is `*`
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origin == "*" {
        return cors.allow_origin(Any);
    }

    match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => cors.allow_origin(AllowOrigin::list([origin])),
        Err(_) => {
            warn!("Ignoring invalid ALLOWED_ORIGIN {:?}; cross-origin requests disabled", allowed_origin);
            cors
        }
    }
}

/// Conservative response headers applied unless a handler set them
fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let headers = [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::REFERRER_POLICY, "no-referrer"),
        (header::X_DNS_PREFETCH_CONTROL, "off"),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            "same-origin",
        ),
    ];

    headers.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ))
    })
}
