// [library] Axum web framework routing components
use axum::{extract::FromRef, routing::get, Router};

use std::sync::Arc; // [rust] Atomic Reference Counting for shared ownership

// [business] Import application modules for dependency injection and routing
use crate::{
    config::Config,                // [business] Application configuration
    db::{Database, SchemaCatalog}, // [business] Connection pool and identifier allow-lists
    web::handlers,                 // [business] One handler per gateway route
};

// [rust] Shared read-only allow-lists
pub type Catalog = Arc<SchemaCatalog>;

// [business] Everything a handler may need, injected once at startup
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,     // [business] Shared connection pool
    pub config: Config,   // [business] Raw-query switch and other settings
    pub catalog: Catalog, // [security] Table and property allow-lists
}

impl AppState {
    pub fn new(db: Database, config: Config, catalog: SchemaCatalog) -> Self {
        Self {
            db,
            config,
            catalog: Arc::new(catalog),
        }
    }
}

// [library] FromRef lets handlers extract only the part of the state they use
impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Catalog {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.catalog.clone()
    }
}

// [business] Build the HTTP router: query routes under /api plus a health probe
pub fn create_app_router(db: Database, config: Config, catalog: SchemaCatalog) -> Router {
    let app_state = AppState::new(db, config, catalog);

    let api = Router::new()
        .route("/data/:tableName", get(handlers::table_handler)) // [security] Allow-listed tables only
        .route("/query/:sqlQuery", get(handlers::raw_query_handler)) // [security] Gated, read-only
        .route("/row", get(handlers::row_handler)) // [business] Row ids and statuses
        .route("/status", get(handlers::status_handler)) // [business] Whole RowData table
        .route("/status/:rowId", get(handlers::status_by_row_handler)) // [business] One row's status
        .route("/plant", get(handlers::plant_handler)) // [business] Whole PlantData table
        .route("/plant/:rowId", get(handlers::latest_plants_handler)) // [business] Latest per plant
        .route(
            "/plant/:rowId/:plantId/:property",
            get(handlers::plant_property_handler),
        );

    Router::new()
        .nest("/api", api) // [business] All query routes live under /api
        .route("/health", get(health_check)) // [business] Liveness probe - never touches the database
        .with_state(app_state) // [library] Dependency injection for every handler
}

async fn health_check() -> &'static str {
    "OK"
}
