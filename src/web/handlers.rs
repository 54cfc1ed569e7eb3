// [business] Import application modules - pool, configuration, statement builders, guard
use crate::{
    config::Config,                                   // [business] Raw-query switch
    db::{queries, Database, ResultSet},               // [business] Statement builders and pool
    security::ensure_read_only,                       // [security] Read-only statement check
    web::{error::GatewayError, routes::Catalog},      // [business] Error mapping and allow-lists
};

// [library] Axum extractors - path parameters and injected application state
use axum::{
    extract::{Path, State},
    response::Json, // [library] Serializes the result set with application/json
};

// [library] Structured logging for raw statements
use tracing::{debug, info};

// [rust] Every handler answers with a JSON array or a GatewayError rendered by IntoResponse
type RowsResult = Result<Json<ResultSet>, GatewayError>;

// [business] An id that is not an integer cannot match any row
fn no_rows(raw: &str) -> RowsResult {
    debug!("Id {:?} is not an integer; answering with no rows", raw);
    Ok(Json(Vec::new()))
}

// [business] GET /api/data/:tableName - full contents of an allow-listed table
pub async fn table_handler(
    State(db): State<Database>,
    State(catalog): State<Catalog>,
    Path(table_name): Path<String>,
) -> RowsResult {
    // [security] Unknown names become 400 before any connection is checked out
    let table = catalog.resolve_table(&table_name)?;
    let rows = queries::fetch_rows(&db, &queries::whole_table(table)).await?;
    Ok(Json(rows))
}

// [business] GET /api/query/:sqlQuery - read-only raw statement, when enabled
pub async fn raw_query_handler(
    State(db): State<Database>,
    State(config): State<Config>,
    Path(sql_query): Path<String>,
) -> RowsResult {
    // [security] Off unless ENABLE_RAW_QUERY is set
    if !config.enable_raw_query {
        return Err(GatewayError::RawQueryDisabled);
    }

    let statement = ensure_read_only(&sql_query)?; // [security] Single SELECT/WITH only
    info!("Executing raw query: {}", statement);

    let rows = queries::fetch_rows(&db, &queries::raw(statement)).await?;
    Ok(Json(rows))
}

// [business] GET /api/row - id and status of every row
pub async fn row_handler(State(db): State<Database>) -> RowsResult {
    let rows = queries::fetch_rows(&db, &queries::row_summary()).await?;
    Ok(Json(rows))
}

// [business] GET /api/status - every RowData row
pub async fn status_handler(State(db): State<Database>) -> RowsResult {
    let rows = queries::fetch_rows(&db, &queries::all_rows()).await?;
    Ok(Json(rows))
}

// [business] GET /api/status/:rowId - RowData rows with that id
pub async fn status_by_row_handler(
    State(db): State<Database>,
    Path(row_id): Path<String>,
) -> RowsResult {
    let Some(id) = queries::parse_id(&row_id) else {
        return no_rows(&row_id);
    };

    let rows = queries::fetch_rows(&db, &queries::row_by_id(id)).await?;
    Ok(Json(rows))
}

// [business] GET /api/plant - every PlantData measurement
pub async fn plant_handler(State(db): State<Database>) -> RowsResult {
    let rows = queries::fetch_rows(&db, &queries::all_plants()).await?;
    Ok(Json(rows))
}

// [business] GET /api/plant/:rowId - most recent measurement per plant in the row
pub async fn latest_plants_handler(
    State(db): State<Database>,
    Path(row_id): Path<String>,
) -> RowsResult {
    let Some(id) = queries::parse_id(&row_id) else {
        return no_rows(&row_id);
    };

    let rows = queries::fetch_rows(&db, &queries::latest_plants_in_row(id)).await?;
    Ok(Json(rows))
}

// [business] GET /api/plant/:rowId/:plantId/:property - time series of one measured column
pub async fn plant_property_handler(
    State(db): State<Database>,
    State(catalog): State<Catalog>,
    Path((row_id, plant_id, property)): Path<(String, String, String)>,
) -> RowsResult {
    // [security] The column is checked first so an unknown property is always a 400
    let column = catalog.resolve_property(&property)?;

    let (Some(row), Some(plant)) = (queries::parse_id(&row_id), queries::parse_id(&plant_id))
    else {
        return no_rows(&format!("{}/{}", row_id, plant_id));
    };

    let descriptor = queries::plant_property_series(row, plant, column);
    let rows = queries::fetch_rows(&db, &descriptor).await?;
    Ok(Json(rows))
}
