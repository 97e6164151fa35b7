//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum routers for the order and user services
//! - Wire up middleware (tracing, request ID, timeout, metrics)
//! - Serve on a listener until shutdown is signalled

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::request::{
    make_request_span, propagate_request_id_layer, set_request_id_layer, track_metrics,
};
use crate::http::{orders, users};
use crate::service::{OrderEnrichmentService, UserService};

/// State injected into order handlers.
#[derive(Clone)]
pub struct OrderState {
    pub orders: OrderEnrichmentService,
}

/// State injected into user handlers.
#[derive(Clone)]
pub struct UserState {
    pub users: UserService,
}

/// Routes of the order service.
pub fn order_router(state: OrderState, request_timeout: Duration) -> Router {
    let routes = Router::new()
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route("/health", get(health))
        .with_state(state);
    with_middleware(routes, request_timeout)
}

/// Routes of the user service.
pub fn user_router(state: UserState, request_timeout: Duration) -> Router {
    let routes = Router::new()
        .route("/api/users", post(users::create_user).get(users::list_users))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/users/email/{email}", get(users::get_user_by_email))
        .route("/health", get(health))
        .with_state(state);
    with_middleware(routes, request_timeout)
}

async fn health() -> &'static str {
    "ok"
}

#[allow(deprecated)]
fn with_middleware(routes: Router, request_timeout: Duration) -> Router {
    routes.route_layer(middleware::from_fn(track_metrics)).layer(
        ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(propagate_request_id_layer())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}

/// A named HTTP server around one router.
pub struct HttpServer {
    name: &'static str,
    router: Router,
}

impl HttpServer {
    pub fn new(name: &'static str, router: Router) -> Self {
        Self { name, router }
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(server = self.name, address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(server = self.name, "HTTP server stopped");
        Ok(())
    }
}
