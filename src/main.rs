mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::files::{routes as files_routes, ObjectCatalogService};
use crate::features::links::{
    routes as links_routes, GrantStore, LinkRegistry, LinkService, MemoryGrantStore,
    PgGrantStore, PurgeWorker, SignedUrlIssuer, UrlDigester,
};
use crate::modules::storage::{ObjectStorage, S3StorageClient};
use crate::shared::clock::{Clock, SystemClock};
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Grant store: Postgres when a database is configured, memory otherwise
    let store: Arc<dyn GrantStore> = match &config.database {
        Some(db_config) => {
            let pool = database::create_pool(db_config).await?;
            tracing::info!("Database connection pool created");

            tracing::info!("Running database migrations...");
            database::run_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            tracing::info!("Database migrations completed successfully");

            Arc::new(PgGrantStore::new(pool))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set; link grants are kept in memory (capacity {}) and lost on restart",
                config.links.registry_capacity
            );
            Arc::new(MemoryGrantStore::new(config.links.registry_capacity))
        }
    };

    // Storage backend
    let storage_client = S3StorageClient::new(config.storage.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage client: {}", e))?;
    storage_client.check_bucket_access().await;
    let storage: Arc<dyn ObjectStorage> = Arc::new(storage_client);
    tracing::info!(
        "Storage client initialized for bucket: {}",
        storage.bucket_name()
    );

    let digester = UrlDigester::from_key(config.links.digest_key.as_deref())
        .map_err(|e| anyhow::anyhow!("Invalid link digest key: {}", e))?;
    tracing::info!("Link digests use {}", digester.algorithm());

    let registry = Arc::new(LinkRegistry::new(store, digester, Arc::clone(&clock)));
    let issuer = SignedUrlIssuer::new(
        Arc::clone(&storage),
        Arc::clone(&clock),
        chrono::Duration::minutes(config.links.max_expiration_minutes),
        chrono::Duration::from_std(config.links.clock_skew_tolerance)
            .map_err(|e| anyhow::anyhow!("Invalid clock skew tolerance: {}", e))?,
    );
    let link_service = Arc::new(LinkService::new(
        issuer,
        Arc::clone(&registry),
        config.links.default_expiration_minutes,
    ));
    let catalog_service = Arc::new(ObjectCatalogService::new(Arc::clone(&storage)));
    tracing::info!(
        "Link service initialized (default {} min, max {} min, clock skew tolerance {:?})",
        config.links.default_expiration_minutes,
        config.links.max_expiration_minutes,
        config.links.clock_skew_tolerance
    );

    // Background purge of expired and revoked grants
    let shutdown_token = CancellationToken::new();
    let purge_handle = match config.links.purge_interval {
        Some(every) => {
            let worker = PurgeWorker::new(Arc::clone(&registry), every);
            let handle = tokio::spawn(worker.run(shutdown_token.clone()));
            tracing::info!("Link purge worker spawned");
            Some(handle)
        }
        None => {
            tracing::info!("Link purge worker disabled");
            None
        }
    };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(files_routes::routes(catalog_service))
        .merge(links_routes::routes(link_service))
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                // Propagate X-Request-Id to response headers
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop background work, then release the registry
    shutdown_token.cancel();
    if let Some(handle) = purge_handle {
        if let Err(e) = handle.await {
            tracing::error!("Link purge worker panicked: {}", e);
        }
    }
    if let Err(e) = registry.shutdown().await {
        tracing::error!("Error shutting down link registry: {}", e);
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, draining connections");
}
