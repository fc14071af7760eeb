//! Response helpers. Products are returned bare: one object, or an array for listings.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<Vec<T>>) {
    (StatusCode::OK, Json(data))
}

pub fn message(message: &'static str) -> (StatusCode, Json<MessageBody>) {
    (StatusCode::OK, Json(MessageBody { message }))
}
