//! # Axum Helpers
//!
//! Building blocks shared by the catalog's HTTP services.
//!
//! - **[`errors`]**: `AppError` and the JSON error envelope with stable error codes
//! - **[`extractors`]**: `UuidPath`, `ValidatedJson`, `ValidatedQuery`
//! - **[`http`]**: CORS and security-header middleware
//! - **[`server`]**: router assembly with OpenAPI UIs, health endpoints, graceful shutdown
//!
//! ```ignore
//! use axum_helpers::{create_production_app, create_router, health_router};
//!
//! let app = create_router::<ApiDoc>(api_routes).await?.merge(health_router(app_info!()));
//! create_production_app(app, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson, ValidatedQuery};
