//! Expert search HTTP server
//!
//! Actix-web REST API exposing semantic and literal search

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use expertsearch_common::{Result, SearchError};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use error::ApiError;
pub use state::AppState;

fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

/// Run the HTTP server until shutdown
///
/// The embedding store inside `state` lives for the whole server run and is
/// released when this returns.
pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let bind_addr = state.config.server_bind_address();
    let origins = state.config.cors_origins.clone();
    let data = web::Data::new(state);

    info!("Starting HTTP server on {} (CORS origins: {:?})", bind_addr, origins);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(cors(&origins))
            .wrap(TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .map_err(|e| SearchError::config(format!("Failed to bind {}: {}", bind_addr, e)))?
    .run()
    .await?;

    info!("HTTP server stopped, releasing embedding store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;
    use actix_web::test;

    #[actix_web::test]
    async fn test_cors_allows_configured_origin() {
        let app = test::init_service(
            App::new()
                .wrap(cors(&["http://localhost:5173".to_string()]))
                .configure(routes::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/health")
            .insert_header((header::ORIGIN, "http://localhost:5173"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
    }
}
