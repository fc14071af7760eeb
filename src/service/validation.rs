//! Request validation for product payloads.

use crate::error::AppError;
use crate::product::{NewProduct, ProductChanges};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub const MSG_REQUIRED: &str = "Name and price are required";
pub const MSG_NO_DATA: &str = "No data provided";
pub const MSG_EMPTY_NAME: &str = "Name cannot be empty";
pub const MSG_INVALID_PRICE: &str = "Invalid price format";
pub const MSG_NEGATIVE_PRICE: &str = "Price must be non-negative";

pub struct ProductValidator;

impl ProductValidator {
    /// Validate a create body. `name` and `price` are required; `description` defaults to empty.
    pub fn validate_create(body: Option<Value>) -> Result<NewProduct, AppError> {
        let body = match body {
            None | Some(Value::Null) => return Err(AppError::Validation(MSG_REQUIRED.into())),
            Some(v) => as_object(v)?,
        };

        let name = match body.get("name") {
            None | Some(Value::Null) => None,
            Some(v) => Some(string_field("name", v)?),
        };
        let price = body.get("price").filter(|v| !is_blank(v));
        let (name, price) = match (name, price) {
            (Some(name), Some(price)) if !name.is_empty() => (name, price),
            _ => return Err(AppError::Validation(MSG_REQUIRED.into())),
        };
        let price = parse_price(price)?;

        let description = match body.get("description") {
            None | Some(Value::Null) => String::new(),
            Some(v) => string_field("description", v)?,
        };

        Ok(NewProduct {
            name,
            description,
            price,
        })
    }

    /// Validate a partial update. Only keys present in the body are carried over;
    /// unknown keys are ignored.
    pub fn validate_update(body: Option<Value>) -> Result<ProductChanges, AppError> {
        let body = match body {
            None | Some(Value::Null) => return Err(AppError::Validation(MSG_NO_DATA.into())),
            Some(v) => as_object(v)?,
        };
        if body.is_empty() {
            return Err(AppError::Validation(MSG_NO_DATA.into()));
        }

        let mut changes = ProductChanges::default();
        if let Some(v) = body.get("name") {
            let name = match v {
                Value::Null => String::new(),
                v => string_field("name", v)?,
            };
            if name.is_empty() {
                return Err(AppError::Validation(MSG_EMPTY_NAME.into()));
            }
            changes.name = Some(name);
        }
        if let Some(v) = body.get("description") {
            changes.description = Some(match v {
                Value::Null => String::new(),
                v => string_field("description", v)?,
            });
        }
        if let Some(v) = body.get("price") {
            changes.price = Some(parse_price(v)?);
        }
        Ok(changes)
    }
}

/// Parse a price given as a JSON number or string into an exact, non-negative
/// decimal. Plain and scientific notation are accepted.
pub fn parse_price(value: &Value) -> Result<Decimal, AppError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(AppError::Validation(MSG_INVALID_PRICE.into())),
    };
    let price = Decimal::from_str_exact(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| AppError::Validation(MSG_INVALID_PRICE.into()))?;
    if price < Decimal::ZERO {
        return Err(AppError::Validation(MSG_NEGATIVE_PRICE.into()));
    }
    Ok(price)
}

fn as_object(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::Validation("body must be a JSON object".into())),
    }
}

fn string_field(field: &str, value: &Value) -> Result<String, AppError> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| AppError::Validation(format!("{} must be a string", field)))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
