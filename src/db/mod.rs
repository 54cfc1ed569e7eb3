// [rust] Module declarations - organize database-related functionality
pub mod catalog; // Allow-lists resolving client identifiers to schema objects
pub mod models; // Query descriptors and result shapes
pub mod queries; // Statement builders and query execution

// [rust] Re-export child modules so callers can import from db:: directly
pub use catalog::*;
pub use models::*;
pub use queries::*;

// [library] SQLx - async PostgreSQL driver with built-in connection pooling
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

// [rust] Shared handle to the pool - one per process, cloned into every request
pub type Database = Arc<Pool<Postgres>>;

// [business] Connect the pool eagerly so a bad configuration fails at startup
pub async fn create_pool(options: PgConnectOptions) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new().connect_with(options).await?;

    Ok(Arc::new(pool))
}
