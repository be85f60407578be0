use crate::error::{AppError, Result};
use crate::model::{ShortenRequest, ShortenResponse, UrlMappingResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tinylink_core::ShortCode;

/// A path segment that is not a well-formed code cannot name a mapping.
fn parse_code(raw: &str) -> Result<ShortCode> {
    ShortCode::new(raw.trim()).map_err(|_| AppError::NotFound)
}

pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let request = payload.into_create_request()?;

    let mapping = state.shortener().create(request).await?;
    let body = ShortenResponse::new(mapping, state.base_url());

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, body.short_url.clone())],
        Json(body),
    )
        .into_response())
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = parse_code(&code)?;
    let long_url = state.shortener().resolve(&code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, long_url)]).into_response())
}

pub async fn list_urls_handler(State(state): State<AppState>) -> Result<Json<Vec<UrlMappingResponse>>> {
    let mappings = state.shortener().list_all().await?;

    Ok(Json(
        mappings
            .into_iter()
            .map(|mapping| UrlMappingResponse::new(mapping, state.base_url()))
            .collect(),
    ))
}

pub async fn delete_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let code = parse_code(&code)?;

    if state.shortener().delete_by_code(&code).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
