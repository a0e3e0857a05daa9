//! Bookshelf application library
//!
//! Wires the books module into the kernel registry and serves it over HTTP.

pub mod modules;

/// Re-export commonly used types
pub use modules::*;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Build the registry holding every application module
pub fn build_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

/// Run the service until Ctrl-C, driving the full module lifecycle.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        address = %settings.server.bind_address(),
        "bookshelf bootstrap starting"
    );

    let registry = build_registry();
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;
    tracing::info!(
        modules = registry.module_count(),
        "bookshelf bootstrap complete"
    );

    let served = bookshelf_http::start_server(&registry, &settings, shutdown_signal())
        .await
        .context("HTTP server terminated with an error");

    registry.stop_modules().await?;
    served
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "failed to listen for shutdown signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn registry_contains_books_module() {
        let registry = build_registry();
        assert_eq!(registry.module_count(), 1);
        assert!(registry.get_module("books").is_some());
    }

    #[tokio::test]
    async fn full_router_serves_books_and_health() {
        let registry = build_registry();
        let app = bookshelf_http::build_router(&registry, &Settings::default());

        let response = app
            .clone()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/books").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["books"], serde_json::json!([]));
    }
}
