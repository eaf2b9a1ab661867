//! proctor-server - REST API server for proctor.
//!
//! Learner identity comes from the `x-learner-id` header, set by an
//! authenticating proxy in front of this service.
//!
//! # Example
//!
//! ```ignore
//! use proctor_server::{create_engine, create_server, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = create_engine(EngineConfig::from_env()).unwrap();
//!     let app = create_server(AppState::new(engine));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod extract;
pub mod factory;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use extract::Learner;
pub use factory::create_engine;
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

/// Upper bound on in-flight requests.
const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
}
