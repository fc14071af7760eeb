//! Product CRUD handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::response::{message, success_many, success_one, success_one_ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

/// Path ids that are not integers cannot name a product, so they are 404s.
fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str.parse().map_err(|_| AppError::product_not_found(id_str))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.service.list().await?;
    Ok(success_many(products))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let product = state.service.get(id).await?;
    Ok(success_one_ok(product))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let product = state.service.create(body).await?;
    Ok(success_one(product))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let product = state.service.update(id, body).await?;
    Ok(success_one_ok(product))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    state.service.delete(id).await?;
    Ok(message("Product deleted successfully"))
}
