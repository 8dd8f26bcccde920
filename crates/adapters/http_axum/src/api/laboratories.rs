//! JSON REST handlers for laboratories.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use labhub_app::ports::{ImageStore, LaboratoryRepository, MaterialRepository, ReservationRepository};
use labhub_domain::error::ValidationError;
use labhub_domain::id::LaboratoryId;
use labhub_domain::laboratory::{Laboratory, LaboratoryDetails, LaboratoryFilter, LaboratoryPatch};

use crate::auth::Privileged;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extract::{ValidJson, ValidQuery};
use crate::state::AppState;
use crate::uploads::image_extension;

/// Request body for creating a laboratory.
#[derive(Deserialize)]
pub struct CreateLaboratoryRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub cover_image_path: Option<String>,
    pub image_url: Option<String>,
    pub hourly_rate: Option<f64>,
}

impl CreateLaboratoryRequest {
    fn into_laboratory(self) -> Result<Laboratory, ApiError> {
        let mut builder = Laboratory::builder().title(self.title);
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(path) = self.cover_image_path {
            builder = builder.cover_image_path(path);
        }
        if let Some(url) = self.image_url {
            builder = builder.image_url(url);
        }
        if let Some(rate) = self.hourly_rate {
            builder = builder.hourly_rate(rate);
        }
        Ok(builder.build()?)
    }
}

/// Query string of the list endpoint, kept as raw text so that blank
/// parameters can be ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub search: Option<String>,
    #[serde(alias = "minRate")]
    pub min_rate: Option<String>,
    #[serde(alias = "maxRate")]
    pub max_rate: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<LaboratoryFilter, ValidationError> {
        Ok(LaboratoryFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            min_rate: parse_rate("min_rate", self.min_rate.as_deref())?,
            max_rate: parse_rate("max_rate", self.max_rate.as_deref())?,
        })
    }
}

fn parse_rate(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|rate| rate.is_finite())
            .map(Some)
            .ok_or(ValidationError::InvalidAmount { field }),
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Envelope<Vec<LaboratoryDetails>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(body) => body.into_response(),
        }
    }
}

/// Possible responses from the get, update and image endpoints.
pub enum GetResponse {
    Ok(Envelope<LaboratoryDetails>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(body) => body.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Envelope<LaboratoryDetails>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(body) => (StatusCode::CREATED, body).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    Deleted,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Deleted => Envelope::<()>::empty("Laboratory deleted").into_response(),
        }
    }
}

/// `GET /api/laboratories`
pub async fn list<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let filter = query.into_filter()?;
    let laboratories = state.laboratory_service.list_laboratories(&filter).await?;
    Ok(ListResponse::Ok(Envelope::new(
        "Laboratories retrieved",
        laboratories,
    )))
}

/// `GET /api/laboratories/{id}`
pub async fn get<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let id = LaboratoryId::parse(&id)?;
    let laboratory = state.laboratory_service.get_laboratory(id).await?;
    Ok(GetResponse::Ok(Envelope::new(
        "Laboratory retrieved",
        laboratory,
    )))
}

/// `POST /api/laboratories`
pub async fn create<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    ValidJson(req): ValidJson<CreateLaboratoryRequest>,
) -> Result<CreateResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let laboratory = req.into_laboratory()?;
    let created = state.laboratory_service.create_laboratory(laboratory).await?;
    Ok(CreateResponse::Created(Envelope::new(
        "Laboratory created",
        created,
    )))
}

/// `PATCH /api/laboratories/{id}`
pub async fn update<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<LaboratoryPatch>,
) -> Result<GetResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let id = LaboratoryId::parse(&id)?;
    let updated = state.laboratory_service.update_laboratory(id, patch).await?;
    Ok(GetResponse::Ok(Envelope::new("Laboratory updated", updated)))
}

/// `DELETE /api/laboratories/{id}`
pub async fn delete<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let id = LaboratoryId::parse(&id)?;
    state.laboratory_service.delete_laboratory(id).await?;
    Ok(DeleteResponse::Deleted)
}

/// `PUT /api/laboratories/{id}/image`
///
/// The raw request body is the image; its `Content-Type` picks the file
/// extension.
pub async fn upload_image<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<GetResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let id = LaboratoryId::parse(&id)?;
    let extension = image_extension(super::content_type(&headers))?;
    if body.is_empty() {
        return Err(ValidationError::EmptyField { field: "image" }.into());
    }
    state.laboratory_service.get_laboratory(id).await?;

    let path = state
        .images
        .store("laboratories", extension, body.to_vec())
        .await?;
    let patch = LaboratoryPatch {
        cover_image_path: Some(path.clone()),
        ..LaboratoryPatch::default()
    };
    match state.laboratory_service.update_laboratory(id, patch).await {
        Ok(updated) => Ok(GetResponse::Ok(Envelope::new(
            "Laboratory image uploaded",
            updated,
        ))),
        Err(err) => {
            super::discard_orphan(state.images.as_ref(), &path).await;
            Err(err.into())
        }
    }
}
