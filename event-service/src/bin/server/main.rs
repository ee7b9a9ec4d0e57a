use std::sync::Arc;

use auth::Authenticator;
use chrono::Duration;
use event_service::config::Config;
use event_service::config::DatabaseBackend;
use event_service::domain::event::ports::EventServicePort;
use event_service::domain::event::service::EventService;
use event_service::domain::user::ports::AuthServicePort;
use event_service::domain::user::service::AuthService;
use event_service::inbound::http::router::create_router;
use event_service::inbound::http::router::AppState;
use event_service::inbound::http::router::HttpSettings;
use event_service::outbound::repositories::event::MongoEventRepository;
use event_service::outbound::repositories::memory::InMemoryEventRepository;
use event_service::outbound::repositories::memory::InMemoryUserRepository;
use event_service::outbound::repositories::mongo::MongoStore;
use event_service::outbound::repositories::user::MongoUserRepository;
use event_service::outbound::storage::local::LocalImageStore;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "event-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        backend = ?config.database.backend,
        database = %config.database.name,
        http_port = config.server.http_port,
        uploads_dir = %config.uploads.dir.display(),
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        Duration::hours(config.jwt.expiration_hours),
    )?);

    let image_store = Arc::new(
        LocalImageStore::new(
            config.uploads.dir.clone(),
            config.uploads.allowed_types(),
            config.uploads.max_file_size,
        )
        .await?,
    );

    let mut mongo_store = None;
    let (auth_service, event_service): (Arc<dyn AuthServicePort>, Arc<dyn EventServicePort>) =
        match config.database.backend {
            DatabaseBackend::Mongodb => {
                let store = MongoStore::connect(&config.database.url, &config.database.name).await?;
                store.ensure_indexes().await?;

                let user_repository = Arc::new(MongoUserRepository::new(store.database()));
                let event_repository = Arc::new(MongoEventRepository::new(store.database()));
                mongo_store = Some(store);

                (
                    Arc::new(AuthService::new(user_repository, Arc::clone(&authenticator))),
                    Arc::new(EventService::new(event_repository, Arc::clone(&image_store))),
                )
            }
            DatabaseBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on shutdown");

                (
                    Arc::new(AuthService::new(
                        Arc::new(InMemoryUserRepository::new()),
                        Arc::clone(&authenticator),
                    )),
                    Arc::new(EventService::new(
                        Arc::new(InMemoryEventRepository::new()),
                        Arc::clone(&image_store),
                    )),
                )
            }
        };

    let http_application = create_router(
        AppState {
            auth_service,
            event_service,
            authenticator,
        },
        HttpSettings {
            uploads_dir: config.uploads.dir.clone(),
            body_limit: config.uploads.body_limit(),
            cors_origin: config.server.cors_origin().map(str::to_string),
        },
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = mongo_store {
        store.shutdown().await;
    }

    tracing::info!("Server exited");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
