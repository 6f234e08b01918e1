//! Category routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Deserializer};

use bazaar_core::CategoryId;

use super::require_non_blank;
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParams};
use crate::models::{Category, CategoryNode};
use crate::state::AppState;
use crate::store::ParentError;

/// Create the category routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route("/categories/tree", get(tree))
        .route("/categories/{id}", get(show).patch(update).delete(delete))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    /// Absent: keep. `null`: make it a root. Value: move under that parent.
    #[serde(default, deserialize_with = "present")]
    pub parent_id: Option<Option<CategoryId>>,
}

/// Distinguish an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn not_found() -> AppError {
    AppError::NotFound("Category not found".to_string())
}

fn parent_not_found() -> AppError {
    AppError::NotFound("Parent category not found".to_string())
}

async fn list(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.store().categories())
}

/// Categories nested under their parents.
async fn tree(State(state): State<AppState>) -> Json<Vec<CategoryNode>> {
    Json(CategoryNode::forest(state.store().categories()))
}

async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<CategoryId>,
) -> Result<Json<Category>> {
    state.store().category(&id).map(Json).ok_or_else(not_found)
}

async fn create(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    require_non_blank("name", &request.name)?;

    if let Some(parent_id) = &request.parent_id {
        state.store().category(parent_id).ok_or_else(parent_not_found)?;
    }

    let now = Utc::now();
    let category = state.store().create_category(Category {
        id: CategoryId::generate(),
        name: request.name,
        parent_id: request.parent_id,
        created_at: now,
        updated_at: now,
    });

    tracing::info!(category_id = %category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update(
    State(state): State<AppState>,
    PathParams(id): PathParams<CategoryId>,
    JsonBody(request): JsonBody<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    let store = state.store();
    let mut category = store.category(&id).ok_or_else(not_found)?;

    if let Some(name) = request.name {
        require_non_blank("name", &name)?;
        category.name = name;
    }

    if let Some(parent_id) = request.parent_id {
        category.parent_id = parent_id;
    }
    category.updated_at = Utc::now();

    match store.update_category_checked(category) {
        Some(Ok(category)) => Ok(Json(category)),
        Some(Err(ParentError::NotFound(_))) => Err(parent_not_found()),
        Some(Err(ParentError::Cycle(_))) => Err(AppError::Validation(
            "A category cannot be moved under itself or one of its descendants".to_string(),
        )),
        None => Err(not_found()),
    }
}

async fn delete(
    State(state): State<AppState>,
    PathParams(id): PathParams<CategoryId>,
) -> Result<StatusCode> {
    state.store().delete_category(&id).ok_or_else(not_found)?;
    tracing::info!(category_id = %id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_parent_absent_null_and_value() {
        let absent: UpdateCategoryRequest = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let null: UpdateCategoryRequest = serde_json::from_str(r#"{"parentId":null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));

        let value: UpdateCategoryRequest = serde_json::from_str(r#"{"parentId":"p"}"#).unwrap();
        assert_eq!(value.parent_id, Some(Some(CategoryId::new("p"))));
    }
}
