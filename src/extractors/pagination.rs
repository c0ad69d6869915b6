//! `page`/`size` and search query parameters.

use crate::error::{AppError, FieldError};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SIZE: u32 = 10;
pub const MAX_SIZE: u32 = 100;

/// Validated pagination: `page >= 1`, `1 <= size <= 100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        PageQuery {
            page: DEFAULT_PAGE,
            size: DEFAULT_SIZE,
        }
    }
}

impl PageQuery {
    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.size as u64
    }

    pub fn limit(&self) -> u64 {
        self.size as u64
    }

    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut errors = Vec::new();
        let query = Self::collect(params, &mut errors);
        if errors.is_empty() {
            Ok(query)
        } else {
            Err(AppError::Validation(errors))
        }
    }

    fn collect(params: &HashMap<String, String>, errors: &mut Vec<FieldError>) -> Self {
        let page = bounded(params, "page", DEFAULT_PAGE, 1, u32::MAX, errors);
        let size = bounded(params, "size", DEFAULT_SIZE, 1, MAX_SIZE, errors);
        PageQuery { page, size }
    }
}

/// Validated search: non-empty `q` plus pagination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub page: PageQuery,
}

impl SearchQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut errors = Vec::new();
        let q = match params.get("q") {
            None => {
                errors.push(FieldError::new("q", "field required"));
                String::new()
            }
            Some(q) if q.is_empty() => {
                errors.push(FieldError::new("q", "must be at least 1 characters"));
                String::new()
            }
            Some(q) => q.clone(),
        };
        let page = PageQuery::collect(params, &mut errors);
        if errors.is_empty() {
            Ok(SearchQuery { q, page })
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

fn bounded(
    params: &HashMap<String, String>,
    field: &str,
    default: u32,
    min: u32,
    max: u32,
    errors: &mut Vec<FieldError>,
) -> u32 {
    let Some(raw) = params.get(field) else {
        return default;
    };
    match raw.parse::<i64>() {
        Ok(n) if n < min as i64 => {
            errors.push(FieldError::new(
                field,
                format!("must be greater than or equal to {}", min),
            ));
            default
        }
        Ok(n) if n > max as i64 => {
            errors.push(FieldError::new(
                field,
                format!("must be less than or equal to {}", max),
            ));
            default
        }
        Ok(n) => n as u32,
        Err(_) => {
            errors.push(FieldError::new(field, "must be a valid integer"));
            default
        }
    }
}

fn query_params(parts: &Parts) -> Result<HashMap<String, String>, AppError> {
    Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(params)| params)
        .map_err(|e| AppError::invalid("query", e.body_text()))
}

#[async_trait]
impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        PageQuery::from_params(&query_params(parts)?)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        SearchQuery::from_params(&query_params(parts)?)
    }
}
