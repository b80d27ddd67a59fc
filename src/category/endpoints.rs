//! Defines the route handlers for categories.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rusqlite::params;
use serde::Deserialize;

use crate::{
    Error,
    category::core::{
        Category, CategoryForm, CategoryId, CategoryKind, CategoryState, create_category,
        get_categories, get_category, map_duplicate_name,
    },
    db::lock_connection,
    extract::{ApiJson, ApiQuery},
};

/// The optional filter for listing categories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "tipo")]
    pub kind: Option<CategoryKind>,
}

/// A route handler for listing categories ordered by name.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_categories(query.kind, &connection).map(Json)
}

/// A route handler for getting a category by its ID.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category(category_id, &connection).map(Json)
}

/// A route handler for creating a category, responds with the created category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error> {
    form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(&form, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// A route handler for renaming a category, responds with the updated category.
///
/// Expenses and income keep the category name they were saved with.
pub async fn edit_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
    ApiJson(form): ApiJson<CategoryForm>,
) -> Result<Json<Category>, Error> {
    form.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let name = form.name.trim();

    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, kind = ?2 WHERE id = ?3",
            params![name, form.kind, category_id],
        )
        .map_err(map_duplicate_name(name))?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(Json(get_category(category_id, &connection)?)),
    }
}

/// A route handler for deleting a category, responds with 204 No Content.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match connection.execute("DELETE FROM category WHERE id = ?1", params![category_id])? {
        0 => Err(Error::NotFound),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
