//! Item CRUD handlers: create, read, update, delete, list, search.

use crate::error::AppError;
use crate::extractors::{JsonBody, PageQuery, SearchQuery};
use crate::model::{Item, ItemCreate, ItemUpdate};
use crate::response::Page;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

fn parse_id(id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str)
        .map_err(|_| AppError::BadRequest(format!("invalid item id format: {}", id_str)))
}

#[utoipa::path(
    post,
    path = "/items/",
    tag = "items",
    request_body = ItemCreate,
    responses(
        (status = 201, description = "The created item", body = Item),
        (status = 422, description = "Invalid body"),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let input = ItemCreate::from_body(body)?;
    let item = state.store.create(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    get,
    path = "/items/",
    tag = "items",
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("size" = Option<u32>, Query, description = "Items per page, 1 to 100"),
    ),
    responses(
        (status = 200, description = "Items, newest first", body = Page<Item>),
        (status = 422, description = "Invalid page or size"),
    )
)]
pub async fn list(
    State(state): State<AppState>,
    page: PageQuery,
) -> Result<Json<Page<Item>>, AppError> {
    let listing = state.store.list(page.skip(), page.limit()).await?;
    Ok(Json(Page::new(listing.items, listing.total, page.page, page.size)))
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "The requested item", body = Item),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No item with this id"),
    )
)]
pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<Item>, AppError> {
    let id = parse_id(&id_str)?;
    let item = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::item_not_found(id))?;
    Ok(Json(item))
}

#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Item id")),
    request_body = ItemUpdate,
    responses(
        (status = 200, description = "The updated item", body = Item),
        (status = 400, description = "Malformed id or no fields provided"),
        (status = 404, description = "No item with this id"),
        (status = 422, description = "Invalid body"),
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Item>, AppError> {
    let id = parse_id(&id_str)?;
    let update = ItemUpdate::from_body(body)?;
    if update.is_empty() {
        if state.store.get(id).await?.is_none() {
            return Err(AppError::item_not_found(id));
        }
        return Err(AppError::BadRequest("no fields provided for update".into()));
    }
    let item = state
        .store
        .update(id, update)
        .await?
        .ok_or_else(|| AppError::item_not_found(id))?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No item with this id"),
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id_str)?;
    if !state.store.delete(id).await? {
        return Err(AppError::item_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/items/search/",
    tag = "items",
    params(
        ("q" = String, Query, description = "Case-insensitive substring of the name"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("size" = Option<u32>, Query, description = "Items per page, 1 to 100"),
    ),
    responses(
        (status = 200, description = "Matching items, newest first", body = Page<Item>),
        (status = 422, description = "Missing q or invalid page or size"),
    )
)]
pub async fn search(
    State(state): State<AppState>,
    query: SearchQuery,
) -> Result<Json<Page<Item>>, AppError> {
    let listing = state
        .store
        .search(&query.q, query.page.skip(), query.page.limit())
        .await?;
    Ok(Json(Page::new(
        listing.items,
        listing.total,
        query.page.page,
        query.page.size,
    )))
}
