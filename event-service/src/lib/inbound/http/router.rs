use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_event::create_event;
use super::handlers::current_user::current_user;
use super::handlers::delete_event::delete_event;
use super::handlers::get_event::get_event;
use super::handlers::health::health;
use super::handlers::list_events::list_all_events;
use super::handlers::list_events::list_events;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::update_event::update_event;
use super::middleware::authenticate as auth_middleware;
use crate::domain::event::ports::EventServicePort;
use crate::domain::user::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub event_service: Arc<dyn EventServicePort>,
    pub authenticator: Arc<Authenticator>,
}

/// Transport settings for the HTTP surface.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Directory served under `/uploads`
    pub uploads_dir: PathBuf,
    /// Largest accepted request body in bytes
    pub body_limit: usize,
    /// Browser origin allowed with credentials; any origin when unset
    pub cors_origin: Option<String>,
}

pub fn create_router(state: AppState, settings: HttpSettings) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/events", get(list_events))
        .route("/api/events/debug/all", get(list_all_events))
        .route("/api/events/:id", get(get_event));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(current_user))
        .route("/api/events", post(create_event))
        .route("/api/events/:id", put(update_event).delete(delete_event))
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(&settings.uploads_dir))
        .layer(DefaultBodyLimit::max(settings.body_limit))
        .layer(trace_layer)
        .layer(cors_layer(settings.cors_origin.as_deref()))
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(e) => {
            tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
            CorsLayer::new().allow_origin(Any)
        }
    }
}
