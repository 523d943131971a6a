//! Order HTTP Routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::Value;

use super::errors::ApiResult;
use super::state::AppState;
use crate::catalog::Order;
use crate::storage::InsertOneResult;

pub fn order_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/orders", post(create_order_handler))
        .with_state(state)
}

/// Validate one order and store the body as sent; answers 201 with the assigned id.
async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InsertOneResult>)> {
    let Json(body) = payload?;
    Order::from_value(&body)?;

    let result = state.storage.orders().insert_one(body).await?;
    Ok((StatusCode::CREATED, Json(result)))
}
