use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use tokio::sync::watch;
use tracing::{info, warn};

use custody_api::{build_app, AppState};
use custody_core::repositories::{AccountRepository, SessionRepository, UserRepository};
use custody_core::services::{spawn_session_sweeper, SignedSessions, StoredSessions, TokenStrategy};
use custody_core::{Ledger, SessionAuthenticator};
use custody_infrastructure::{create_pool, run_migrations, MemoryStore, PgStore};
use custody_shared::config::{AppConfig, StorageBackend, TokenStrategyKind};

struct Stores {
    users: Arc<dyn UserRepository>,
    accounts: Arc<dyn AccountRepository>,
    sessions: Arc<dyn SessionRepository>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    custody_shared::telemetry::init_telemetry(&config.log).context("initializing telemetry")?;

    info!("{} starting (env: {})", config.app.name, config.app.env);

    let stores = open_stores(&config).await?;

    let tokens: Arc<dyn TokenStrategy> = match config.session.strategy {
        TokenStrategyKind::Stateful => Arc::new(StoredSessions::new(stores.sessions)),
        TokenStrategyKind::Stateless => {
            warn!("Stateless tokens cannot be revoked before they expire");
            Arc::new(SignedSessions::new(&config.session.jwt_secret))
        }
    };

    let auth = Arc::new(
        SessionAuthenticator::new(stores.users, tokens)
            .with_ttl(chrono::Duration::hours(config.session.ttl_hours)),
    );
    let ledger = Arc::new(Ledger::new(stores.accounts));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_session_sweeper(
        Arc::clone(&auth),
        Duration::from_secs(config.session.sweep_interval_secs),
        shutdown_rx,
    );

    let app = build_app(
        AppState::new(ledger, auth),
        Duration::from_secs(config.app.request_timeout_secs),
    );

    let host: std::net::IpAddr = config.app.host.parse().context("parsing app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    sweeper.await.context("joining session sweeper")?;
    info!("Server stopped");

    Ok(())
}

async fn open_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on exit");
            let store = Arc::new(
                MemoryStore::with_seed_accounts(&config.storage.seed_accounts)
                    .context("seeding startup accounts")?,
            );
            info!("Seeded {} startup accounts", config.storage.seed_accounts.len());
            Ok(Stores {
                users: store.clone(),
                accounts: store.clone(),
                sessions: store,
            })
        }
        StorageBackend::Postgres => {
            if !config.storage.seed_accounts.is_empty() {
                warn!("storage.seed_accounts is ignored by the postgres backend");
            }
            info!("Connecting to database...");
            let pool = create_pool(&config.database)
                .await
                .context("connecting to database")?;
            run_migrations(&pool).await.context("running migrations")?;
            info!("Database ready");

            let store = Arc::new(PgStore::new(pool));
            Ok(Stores {
                users: store.clone(),
                accounts: store.clone(),
                sessions: store,
            })
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
