pub mod error;
pub mod handlers;
pub mod openapi;
pub mod services;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::bearer_auth_middleware;
use state::AppState;

/// Build the complete router.
pub fn router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/composite/health", get(handlers::health_check))
        .route("/composite/users/authenticate", post(handlers::authenticate_user))
        .route(
            "/composite/organizer/authenticate",
            post(handlers::authenticate_organizer),
        );

    // ==========================================================================
    // Protected Routes (bearer token required; roles checked per handler)
    // ==========================================================================
    let protected_routes = Router::new()
        // Users
        .route("/composite/users", post(handlers::create_user))
        .route(
            "/composite/users/{user_id}",
            get(handlers::get_user)
                .put(handlers::modify_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/composite/users/{user_id}/tickets",
            get(handlers::get_user_tickets),
        )
        // Events
        .route(
            "/composite/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/composite/events/{event_id}",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route(
            "/composite/events/{event_id}/tickets",
            get(handlers::get_event_tickets),
        )
        // Tickets
        .route("/composite/ticket", post(handlers::book_ticket))
        .route(
            "/composite/ticket/{ticket_id}",
            get(handlers::get_ticket).delete(handlers::cancel_ticket),
        )
        // Organizer
        .route(
            "/composite/organizer",
            get(handlers::get_current_organizer).post(handlers::create_organizer),
        )
        .route(
            "/composite/organizer/{organizer_id}",
            get(handlers::get_organizer)
                .put(handlers::modify_organizer)
                .delete(handlers::delete_organizer),
        )
        .route_layer(from_fn(bearer_auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP gateway and serve until the process is stopped.
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.gateway.host, state.config.gateway.port);
    let app = router(Arc::new(state));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
