use anyhow::Context;
use axum::extract::State;
use axum::Router;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod api;
mod app_env;
mod db;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routing_utils;

#[cfg(test)]
mod integration_test;

/// Application state shared by every route handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

/// The application state as handlers extract it
pub type AppState = State<Arc<SharedData>>;

/// Assembles the application router on top of the given connectivity handle
fn todo_app_router(ext_cxn: persistence::ExternalConnectivity) -> Router {
    let shared_data = Arc::new(SharedData { ext_cxn });
    let router = Router::new()
        .nest("/todos", api::todo::todo_routes())
        .nest("/users", api::user::user_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if dotenv().is_err() {
        println!("Starting server without .env file.");
    }
    logging::setup_logging(logging::init_env_filter());

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("{} must be set to connect to PostgreSQL", app_env::DB_URL))?;
    let db_pool = db::connect_sqlx(&db_url).await;
    db::run_migrations(&db_pool).await?;

    let port: u16 = match env::var(app_env::PORT) {
        Ok(raw_port) => raw_port
            .parse()
            .with_context(|| format!("{} must be a valid port number", app_env::PORT))?,
        Err(_) => 5000,
    };

    let ext_cxn = persistence::ExternalConnectivity::new(db_pool);
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on port {port}");
    axum::serve(listener, todo_app_router(ext_cxn))
        .await
        .context("Running the HTTP server")?;

    Ok(())
}
