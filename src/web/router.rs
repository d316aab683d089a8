//! Web application router and middleware setup.

use crate::error::Result;
use crate::web::config::WebConfig;
use crate::web::handlers;
use crate::web::websocket::{self, Hub};
use axum::{routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

/// Create the axum application: the landing page and the push channel.
pub async fn create_app(config: WebConfig, hub: Arc<Hub>) -> Result<Router> {
    let mut app = Router::new().route("/ws", get(websocket::websocket_handler));

    // Serve the landing page from the static directory when one is
    // configured, otherwise fall back to the built-in page.
    if let Some(static_path) = &config.static_path {
        let static_path = PathBuf::from(static_path);

        if static_path.exists() {
            info!("Serving static files from: {:?}", static_path);

            app = app.nest_service("/static", ServeDir::new(&static_path));

            let index_file = static_path.join("index.html");
            if index_file.exists() {
                app = app.route("/", get(handlers::serve_index));
            } else {
                app = app.route("/", get(handlers::default_index));
            }
        } else {
            tracing::warn!(
                "Static path {:?} does not exist, serving default index",
                static_path
            );
            app = app.route("/", get(handlers::default_index));
        }
    } else {
        app = app.route("/", get(handlers::default_index));
    }

    // Add middleware layers
    let service_builder = ServiceBuilder::new().layer(TraceLayer::new_for_http());

    if config.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app = app.layer(service_builder);

    Ok(app.with_state(hub))
}
