use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::search::{PopularProduct, ProductDocument, SortOrder},
    routes::ApiError,
};

const DEFAULT_POPULAR_SIZE: usize = 10;
const MAX_POPULAR_SIZE: usize = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search))
        .route("/top", get(popular))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuery {
    // A request without q is rejected before the handler runs; q may still
    // be blank, which matches everything inside the price window.
    q: String,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sorting: Option<SortOrder>,
}

#[instrument(name = "GET /api/search", skip(app_state))]
async fn search(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductDocument>>, ApiError> {
    let results = app_state
        .repository
        .search(
            &query.q,
            query.min_price,
            query.max_price,
            query.sorting.unwrap_or_default(),
        )
        .await?;

    Ok(Json(results))
}

#[derive(Debug, Clone, Deserialize)]
struct PopularQuery {
    size: Option<usize>,
}

#[instrument(name = "GET /api/search/top", skip(app_state))]
async fn popular(
    State(app_state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<Vec<PopularProduct>>, ApiError> {
    let size = query
        .size
        .unwrap_or(DEFAULT_POPULAR_SIZE)
        .min(MAX_POPULAR_SIZE)
        .max(1);

    let products = app_state.repository.popular(size).await?;
    Ok(Json(products))
}
