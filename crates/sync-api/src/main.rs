use actix_web::{
    middleware::DefaultHeaders,
    web, App, HttpServer,
};
use tracing::{error, info};

mod config;
mod handlers;
mod logging;
mod middleware;
mod routes;
mod services;
mod state;
mod workers;

use config::ApiConfig;
use middleware::{ErrorHandler, RequestId};
use state::AppState;
use workers::SyncWorker;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match ApiConfig::from_env() {
        Ok(config) => {
            if let Err(e) = config.validate() {
                eprintln!("Configuration validation failed: {}", e);
                std::process::exit(1);
            }
            config
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(
        "starting sync-api v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.server_address()
    );

    let app_state = match AppState::new(config.clone()).await {
        Ok(state) => {
            info!("application state initialized");
            state
        }
        Err(e) => {
            error!("failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    let (worker_shutdown_tx, worker_shutdown_rx) = tokio::sync::oneshot::channel();
    let worker = SyncWorker::new(app_state.clone(), app_state.sqs_queue.clone());
    let worker_task = tokio::spawn(worker.run(worker_shutdown_rx));

    let cors_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(RequestId)
            .wrap(ErrorHandler)
            .wrap(middleware::setup_cors(&cors_config.cors))
            .wrap(middleware::logging_middleware())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
                    .add(("Content-Security-Policy", "default-src 'self'")),
            )
            .configure(routes::configure_routes)
            .configure(|cfg| {
                #[cfg(debug_assertions)]
                routes::configure_dev_routes(cfg);
            })
    });

    let server = if let Some(workers) = config.server.workers {
        info!("setting worker threads to: {}", workers);
        server.workers(workers)
    } else {
        server
    };

    let server = server.bind(&config.server_address())?.run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    info!("sync-api ready and listening on {}", &config.server_address());

    shutdown_signal().await;
    info!("shutdown signal received, stopping sync-api");

    let _ = worker_shutdown_tx.send(());
    server_handle.stop(true).await;

    match server_task.await {
        Ok(Ok(())) => info!("server shut down successfully"),
        Ok(Err(e)) => error!("server error during shutdown: {}", e),
        Err(e) => error!("failed to shut down server task: {}", e),
    }

    if let Err(e) = worker_task.await {
        error!("failed to shut down sync worker: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_main_module_compiles() {
        assert_eq!(env!("CARGO_PKG_NAME"), "sync-api");
    }

    #[tokio::test]
    async fn test_config_loading() {
        env::set_var("DATABASE_URL", "postgresql://u:p@localhost/test");
        env::set_var("SYNC_QUEUE_URL", "https://sqs.example/q");

        let config = ApiConfig::from_env();
        assert!(config.is_ok());
        assert!(config.unwrap().validate().is_ok());

        env::remove_var("DATABASE_URL");
        env::remove_var("SYNC_QUEUE_URL");
    }

    #[tokio::test]
    async fn test_graceful_shutdown_compiles() {
        tokio::select! {
            _ = tokio::time::sleep(tokio::time::Duration::from_millis(1)) => {},
            _ = shutdown_signal() => {},
        }
    }
}
