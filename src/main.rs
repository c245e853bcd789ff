//! # WhatsApp Lead Tracker
//!
//! Main entry point of the webhook service.
//! Configures logging, storage, SSL, middleware and route handling.

#![recursion_limit = "256"]
use logfire::config::{MetricsOptions, SendToLogfire};
use ntex::web;
use ntex_cors::Cors;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};
use wa_lead_tracker::{config, front, repo, utils, webhook};

const INIT_MIGRATION: &str = include_str!("../migrations/001_init.sql");

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::AppConfig::load()?;

    // Initialize logging and metrics
    let logfire_config = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()));
    let shutdown_handler = match app_config.logfire_token.as_deref() {
        Some(token) => logfire_config
            .send_to_logfire(SendToLogfire::Yes)
            .with_token(token),
        None => logfire_config.send_to_logfire(SendToLogfire::No),
    }
    .finish()?;

    let repo_handle = utils::build_repo(&app_config)?;

    if let repo::RepoHandle::Sqlite(sqlite_repo) = &repo_handle {
        if let Err(e) = utils::run_migrations(&sqlite_repo.db_pool, INIT_MIGRATION).await {
            logfire::error!(
                "Failed to apply the schema, storage calls will fail: {error}",
                error = e.to_string()
            );
        }
    }

    configure_and_run_server(app_config, repo_handle).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor(
    app_config: &config::AppConfig,
) -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    app_config: config::AppConfig,
    repo_handle: repo::RepoHandle,
) -> anyhow::Result<()> {
    let server_addr = app_config.server_addr();
    let is_prod = app_config.is_prod();
    let ssl_acceptor = if is_prod {
        Some(setup_ssl_acceptor(&app_config)?)
    } else {
        None
    };

    logfire::info!(
        "Starting web server on {host}:{port}",
        host = &server_addr.0,
        port = i64::from(server_addr.1)
    );

    let server = web::server(move || {
        web::App::new()
            .wrap(
                Cors::new()
                    .allowed_methods(vec!["GET", "HEAD", "POST", "OPTIONS", "PATCH", "DELETE"])
                    .finish(),
            )
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(front::AppState {
                repo: repo_handle.boxed(),
                config: app_config.clone(),
            })
            .configure(webhook::routes::whatsapp)
            .configure(front::routes::links)
            .configure(front::routes::admin)
            .service(front::server::index)
            .default_service(web::route().to(front::server::serve_not_found))
    });

    let bound_server = match ssl_acceptor {
        Some(ssl_acceptor) => server.bind_openssl(server_addr, ssl_acceptor)?,
        None => server.bind(server_addr)?,
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
