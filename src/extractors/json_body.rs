//! Optional JSON request body.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use serde_json::Value;

/// JSON body that may be absent. An empty (or whitespace-only) body is `None`
/// and left to the validator. A body over the configured limit is 413; a
/// non-JSON content type or malformed JSON is a 400 carrying the parser's text.
#[derive(Clone, Debug)]
pub struct JsonBody(pub Option<Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json_content = is_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(rejection.body_text())
            } else {
                AppError::Validation(rejection.body_text())
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(None));
        }
        if !json_content {
            return Err(AppError::Validation(
                "Expected request with `Content-Type: application/json`".into(),
            ));
        }
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))?;
        Ok(JsonBody(Some(value)))
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn extract(content_type: Option<&str>, body: &str) -> Result<Option<Value>, AppError> {
        let mut builder = Request::builder().method("POST").uri("/products");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        JsonBody::from_request(req, &()).await.map(|JsonBody(v)| v)
    }

    #[tokio::test]
    async fn empty_body_is_absent() {
        assert!(extract(None, "").await.unwrap().is_none());
        assert!(extract(Some("application/json"), "  \n").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn parses_json_with_charset_parameter() {
        let v = extract(Some("application/json; charset=utf-8"), r#"{"name":"Cup"}"#)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v["name"], "Cup");
    }

    #[tokio::test]
    async fn malformed_json_reports_parser_text() {
        match extract(Some("application/json"), "{not json").await {
            Err(AppError::Validation(msg)) => assert!(msg.starts_with("Invalid JSON body")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_content_type_is_rejected() {
        match extract(Some("text/plain"), r#"{"name":"Cup"}"#).await {
            Err(AppError::Validation(msg)) => assert!(msg.contains("application/json")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
