// [library] Error handling crate - main only needs to report startup failures
use anyhow::Result;

// [library] HTTP utilities from axum web framework
use axum::http::{header::ACCEPT, HeaderValue, Method};

// [business] Local modules from the library target
use plant_gateway::{
    config::Config,                   // Environment-driven configuration
    db::{create_pool, SchemaCatalog}, // Pool factory and identifier allow-lists
    web,                              // Router construction
};

// [library] Tower ecosystem - CORS and request tracing middleware
use tower_http::{
    cors::{Any, CorsLayer}, // [security] Cross-Origin Resource Sharing middleware
    trace::TraceLayer,      // [library] HTTP request/response logging middleware
};

// [library] Structured logging framework
use tracing::info; // Logging macros
use tracing_subscriber::{EnvFilter, FmtSubscriber}; // Log formatting and RUST_LOG filtering

// [rust] Attribute macro that runs main inside tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // [library] Logging first, so configuration errors are reported through it
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("plant_gateway=info,tower_http=debug")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?; // [rust] ? reports a second subscriber as a startup error

    info!("Starting plant gateway");

    // [business] Fail fast on missing database settings
    let config = Config::from_env()?;
    let bind_address = config.bind_address(); // [business] "host:port" for the TCP listener

    info!("Connecting to database...");
    let db = create_pool(config.connect_options()).await?; // [rust] ? propagates connection errors
    info!("Database connection established");

    // [security] Allow-lists for client-supplied identifiers
    let catalog = SchemaCatalog::load(&db, &config.allowed_tables).await?;

    // [business] HTTP application setup - routes, state injection, middleware
    let cors = cors_layer(&config.allowed_origins);
    let app = web::create_app_router(db.clone(), config, catalog) // [rust] Router keeps its own pool handle
        .layer(cors) // [security] Browser origin policy
        .layer(TraceLayer::new_for_http()); // [library] One span per request

    // [rust] TCP listener binding - creates socket for incoming connections
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server is running on http://{}", bind_address);

    // [rust] Runs until a shutdown signal arrives and in-flight requests drain
    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // [business] Release pooled connections on every exit path out of serve
    info!("Closing database pool");
    db.close().await;

    served?; // [rust] Surface a serve error only after the pool is closed
    info!("Server stopped");
    Ok(())
}

// [security] No origins configured means any origin, matching a permissive default
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS]) // [business] Read-only gateway
        .allow_headers([ACCEPT]);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter() // [rust] Borrowing iterator over Vec<String>
        .filter_map(|origin| origin.parse().ok()) // [rust] String -> HeaderValue, invalid entries dropped
        .collect();
    layer.allow_origin(origins)
}

// [business] Resolves on Ctrl-C or SIGTERM; axum then stops accepting and drains in-flight requests
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
