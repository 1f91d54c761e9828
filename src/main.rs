use audit_trail::config::{Config, StorageBackend};
use audit_trail::domain::audit::{
    spawn_retention_task, AuditEntryRepository, AuditItemRepository, AuditService,
    AuditTrailService,
};
use audit_trail::infrastructure::persistence::{
    MemoryAuditEntryRepository, MemoryAuditItemRepository,
};
use audit_trail::interface::api::{build_router, init_metrics, AppState};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "postgres")]
use audit_trail::infrastructure::persistence::{
    create_pool, run_migrations, PgAuditEntryRepository, PgAuditItemRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting audit trail service");
    info!("Storage backend: {:?}", config.audit.backend);

    let audit_service = build_audit_service(&config).await?;

    // Install the recorder before anything records metrics
    info!("Initializing Prometheus metrics exporter");
    let prometheus_handle = init_metrics()?;

    // Start log retention task
    if let Some(max_age) = config.audit.retention() {
        let interval = std::time::Duration::from_secs(config.audit.cleanup_interval_secs.max(1));
        spawn_retention_task(audit_service.clone(), max_age, interval);
        info!(
            "Audit log retention enabled: {} minutes",
            max_age.num_minutes()
        );
    }

    let state = AppState {
        audit_service,
        audit_config: config.audit.clone(),
    };
    let app = build_router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("REST API server listening on {}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

/// Wire the audit service to the configured repositories
async fn build_audit_service(config: &Config) -> anyhow::Result<Arc<dyn AuditService>> {
    let (items, entries): (Arc<dyn AuditItemRepository>, Arc<dyn AuditEntryRepository>) =
        match config.audit.backend {
            StorageBackend::Memory => {
                warn!("Using in-memory audit storage; records are lost on restart");
                (
                    Arc::new(MemoryAuditItemRepository::new()),
                    Arc::new(MemoryAuditEntryRepository::new()),
                )
            }
            #[cfg(feature = "postgres")]
            StorageBackend::Postgres => {
                info!("Initializing database connection...");
                let pool = create_pool(&config.database).await?;

                info!("Running database migrations...");
                run_migrations(&pool).await?;

                (
                    Arc::new(PgAuditItemRepository::new(pool.clone())),
                    Arc::new(PgAuditEntryRepository::new(pool)),
                )
            }
            #[cfg(not(feature = "postgres"))]
            StorageBackend::Postgres => {
                anyhow::bail!("postgres backend requested but the `postgres` feature is disabled")
            }
        };

    info!("Audit repositories initialized");
    Ok(Arc::new(AuditTrailService::new(items, entries)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
