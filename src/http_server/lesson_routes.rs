//! Lesson HTTP Routes
//!
//! Listing, search, and the space update.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use super::state::AppState;
use crate::query::{parse_document_id, translate_search, translate_space_update};
use crate::storage::UpdateResult;

pub const SPACE_UPDATED_MESSAGE: &str = "Space updated successfully";

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateSpaceResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub result: UpdateResult,
}

pub fn lesson_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/lessons", get(list_lessons_handler))
        .route("/lessons/:id", put(update_space_handler))
        .route("/search", get(search_lessons_handler))
        .with_state(state)
}

/// Every lesson, in storage order
async fn list_lessons_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    let lessons = state.storage.lessons().find_all().await?;
    Ok(Json(lessons))
}

async fn search_lessons_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(params) = params?;
    let predicate = translate_search(params.q.as_deref())?;
    let lessons = state.storage.lessons().find(&predicate).await?;
    Ok(Json(lessons))
}

async fn update_space_handler(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<UpdateSpaceResponse>> {
    let Path(id) = id?;
    // A bad id is reported ahead of a bad body
    parse_document_id(&id)?;
    let Json(body) = payload?;
    let mutation = translate_space_update(&id, &body)?;

    let result = state.storage.lessons().update_one(&mutation).await?;
    if result.matched_count == 0 && state.reject_unmatched_updates {
        return Err(ApiError::LessonNotFound(id));
    }

    Ok(Json(UpdateSpaceResponse {
        message: SPACE_UPDATED_MESSAGE,
        result,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_response_shape() {
        let body = serde_json::to_value(UpdateSpaceResponse {
            message: SPACE_UPDATED_MESSAGE,
            result: UpdateResult::matched(true),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({"message": "Space updated successfully", "matchedCount": 1, "modifiedCount": 1})
        );
    }
}
