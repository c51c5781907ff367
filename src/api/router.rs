//! Router setup and configuration.

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    LatencyUnit,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

use crate::api::handlers::{health, users};
use crate::api::middleware::{request_timeout, track_metrics};
use crate::api::state::AppState;

/// Create the main application router.
///
/// Layers, outermost first: request id, tracing, request-id propagation,
/// metrics, deadline. The deadline sits innermost so timed-out requests are
/// still logged and counted.
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config.server.request_timeout();

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(health::metrics));

    let collection = post(users::create_user).get(users::list_users);

    // `/users/` is accepted alongside `/users` for the collection.
    let user_routes = Router::new()
        .route("/users", collection.clone())
        .route("/users/", collection)
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    Router::new()
        .merge(health_routes)
        .merge(user_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_request_span)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(track_metrics))
                .layer(middleware::from_fn_with_state(timeout, request_timeout)),
        )
        .with_state(state)
}

fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
