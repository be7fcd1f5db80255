//! PhoneBook HTTP Routes
//!
//! Decodes requests into messages, sends them through the mediator, and maps
//! the results onto status codes. Validation happens here, before dispatch.

use std::time::Duration;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use phonebook_core::typed::{
    CreateEntry, DeleteEntry, GetAllEntries, GetEntryById, GetEntryByName, UpdateEntry,
};
use phonebook_core::{Entry, EntryFields, EntryId, Mediator};
use serde::Deserialize;
use tokio_util::sync::{CancellationToken, DropGuard};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

pub const BASE_PATH: &str = "/api/PhoneBook";

// ==================
// Shared State
// ==================

#[derive(Clone)]
pub struct AppState {
    pub mediator: Mediator,
}

impl AppState {
    pub fn new(mediator: Mediator) -> Self {
        Self { mediator }
    }
}

// ==================
// Request Types
// ==================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl EntryRequest {
    fn into_fields(self) -> Result<EntryFields, ApiError> {
        let fields = EntryFields::new(self.name, self.phone_number);
        fields.validate()?;
        Ok(fields)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub id: Option<EntryId>,
    #[serde(flatten)]
    pub entry: EntryRequest,
}

// ==================
// Routes
// ==================

/// Build the phonebook router. Requests running past `request_timeout` get 408
/// and their cancellation token fires.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route(BASE_PATH, get(get_all_entries).post(create_entry))
        .route(
            "/api/PhoneBook/{id}",
            get(get_entry_by_id).put(update_entry).delete(delete_entry),
        )
        .route("/api/PhoneBook/ByName/{name}", get(get_entry_by_name))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Token for one request; dropping the guard (request finished or aborted) cancels it.
fn request_scope() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

fn location(id: EntryId) -> String {
    format!("{BASE_PATH}/{id}")
}

// ==================
// Handlers
// ==================

async fn get_all_entries(State(state): State<AppState>) -> Result<Json<Vec<Entry>>, ApiError> {
    let (cancel, _guard) = request_scope();
    let entries = state.mediator.send(GetAllEntries, &cancel).await?;
    Ok(Json(entries))
}

async fn get_entry_by_id(
    State(state): State<AppState>,
    path: Result<Path<EntryId>, PathRejection>,
) -> Result<Json<Entry>, ApiError> {
    let Path(id) = path?;
    let (cancel, _guard) = request_scope();
    state
        .mediator
        .send(GetEntryById { id }, &cancel)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn get_entry_by_name(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Entry>, ApiError> {
    let Path(name) = path?;
    let (cancel, _guard) = request_scope();
    state
        .mediator
        .send(GetEntryByName { name }, &cancel)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_entry(
    State(state): State<AppState>,
    body: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let entry = request.into_fields()?;

    let (cancel, _guard) = request_scope();
    let created = state.mediator.send(CreateEntry { entry }, &cancel).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location(created.id))],
        Json(created),
    ))
}

async fn update_entry(
    State(state): State<AppState>,
    path: Result<Path<EntryId>, PathRejection>,
    body: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let Json(request) = body?;
    let entry = request.entry.into_fields()?;
    if request.id != Some(id) {
        return Err(ApiError::IdMismatch {
            path: id,
            body: request.id,
        });
    }

    let (cancel, _guard) = request_scope();
    if state.mediator.send(UpdateEntry { id, entry }, &cancel).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn delete_entry(
    State(state): State<AppState>,
    path: Result<Path<EntryId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    let (cancel, _guard) = request_scope();
    if state.mediator.send(DeleteEntry { id }, &cancel).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_points_at_the_entry() {
        assert_eq!(location(EntryId::new(12)), "/api/PhoneBook/12");
    }

    #[test]
    fn update_request_reads_flat_body() {
        let req: UpdateEntryRequest = serde_json::from_str(
            r#"{ "id": 3, "name": "John Doe", "phoneNumber": "123-456-7890" }"#,
        )
        .unwrap();
        assert_eq!(req.id, Some(EntryId::new(3)));
        assert_eq!(req.entry.phone_number, "123-456-7890");
    }

    #[test]
    fn missing_fields_fail_validation_not_decoding() {
        let req: EntryRequest = serde_json::from_str("{}").unwrap();
        let err = req.into_fields().unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref v) if v.errors().len() == 2));
    }

    #[test]
    fn drop_guard_cancels_the_token() {
        let (token, guard) = request_scope();
        assert!(!token.is_cancelled());
        drop(guard);
        assert!(token.is_cancelled());
    }
}
