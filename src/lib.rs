//! Tumae gateway application library
//!
//! Lookup tables, onboarding aggregation, the proxy modules mounted by the
//! gateway, response normalization, and the session-aware API client.

pub mod catalog;
pub mod client;
pub mod modules;
pub mod normalize;
pub mod onboarding;
pub mod session;
pub mod utils;

pub use client::{ApiClient, ClientError};
pub use modules::register_all;
pub use session::{Session, SessionContext, SessionEvent, SessionStore};

use std::sync::Arc;

use tumae_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use tumae_upstream::HttpBackend;

/// Run the gateway until a shutdown signal arrives.
///
/// Modules are stopped even when the server fails; the server error wins.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    tumae_telemetry::init(&settings.telemetry)?;
    tracing::info!(
        env = ?settings.environment,
        upstream = %settings.upstream.base_url,
        "tumae gateway starting"
    );

    let backend = Arc::new(HttpBackend::new(&settings.upstream)?);
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, backend, settings)?;

    let ctx = InitCtx { settings };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = tumae_http::start_server(&registry, settings).await;
    let stopped = registry.stop_modules().await;
    served.and(stopped)
}
