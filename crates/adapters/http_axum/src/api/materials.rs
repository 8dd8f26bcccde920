//! JSON REST handlers for the materials of a laboratory.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use labhub_app::ports::{ImageStore, LaboratoryRepository, MaterialRepository, ReservationRepository};
use labhub_domain::error::{LabHubError, ValidationError};
use labhub_domain::id::{LaboratoryId, MaterialId};
use labhub_domain::material::{Material, MaterialPatch, MaterialStatus};

use crate::auth::Privileged;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::uploads::image_extension;

/// Request body for adding a material to a laboratory.
#[derive(Deserialize)]
pub struct CreateMaterialRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub hourly_rate: Option<f64>,
    pub is_free: Option<bool>,
    pub status: Option<MaterialStatus>,
    pub cover_image_path: Option<String>,
    pub image_url: Option<String>,
}

impl CreateMaterialRequest {
    fn into_material(self, laboratory_id: LaboratoryId) -> Result<Material, LabHubError> {
        let mut builder = Material::builder()
            .laboratory_id(laboratory_id)
            .name(self.name)
            .kind(self.kind);
        if let Some(is_free) = self.is_free {
            builder = builder.is_free(is_free);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(rate) = self.hourly_rate {
            builder = builder.hourly_rate(rate);
        }
        if let Some(status) = self.status {
            builder = builder.status(status);
        }
        if let Some(path) = self.cover_image_path {
            builder = builder.cover_image_path(path);
        }
        if let Some(url) = self.image_url {
            builder = builder.image_url(url);
        }
        builder.build()
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Envelope<Vec<Material>>),
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
    Ok(Envelope<Material>),
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
    Created(Envelope<Material>),
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
            Self::Deleted => Envelope::<()>::empty("Material deleted").into_response(),
        }
    }
}

fn parse_pair(id: &str, material_id: &str) -> Result<(LaboratoryId, MaterialId), ApiError> {
    Ok((LaboratoryId::parse(id)?, MaterialId::parse(material_id)?))
}

/// `GET /api/laboratories/{id}/materials`
pub async fn list<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    Path(id): Path<String>,
) -> Result<ListResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let id = LaboratoryId::parse(&id)?;
    let materials = state.material_service.list_materials(id).await?;
    Ok(ListResponse::Ok(Envelope::new(
        "Materials retrieved",
        materials,
    )))
}

/// `GET /api/laboratories/{id}/materials/{material_id}`
pub async fn get<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    Path((id, material_id)): Path<(String, String)>,
) -> Result<GetResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let (id, material_id) = parse_pair(&id, &material_id)?;
    let material = state.material_service.get_material(id, material_id).await?;
    Ok(GetResponse::Ok(Envelope::new("Material retrieved", material)))
}

/// `POST /api/laboratories/{id}/materials`
pub async fn create<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<CreateMaterialRequest>,
) -> Result<CreateResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let id = LaboratoryId::parse(&id)?;
    let material = req.into_material(id)?;
    let created = state.material_service.create_material(material).await?;
    Ok(CreateResponse::Created(Envelope::new(
        "Material created",
        created,
    )))
}

/// `PATCH /api/laboratories/{id}/materials/{material_id}`
pub async fn update<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    Path((id, material_id)): Path<(String, String)>,
    ValidJson(patch): ValidJson<MaterialPatch>,
) -> Result<GetResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let (id, material_id) = parse_pair(&id, &material_id)?;
    let updated = state
        .material_service
        .update_material(id, material_id, patch)
        .await?;
    Ok(GetResponse::Ok(Envelope::new("Material updated", updated)))
}

/// `DELETE /api/laboratories/{id}/materials/{material_id}`
pub async fn delete<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    Path((id, material_id)): Path<(String, String)>,
) -> Result<DeleteResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let (id, material_id) = parse_pair(&id, &material_id)?;
    state.material_service.delete_material(id, material_id).await?;
    Ok(DeleteResponse::Deleted)
}

/// `PUT /api/laboratories/{id}/materials/{material_id}/image`
pub async fn upload_image<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    Path((id, material_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<GetResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let (id, material_id) = parse_pair(&id, &material_id)?;
    let extension = image_extension(super::content_type(&headers))?;
    if body.is_empty() {
        return Err(ValidationError::EmptyField { field: "image" }.into());
    }
    state.material_service.get_material(id, material_id).await?;

    let path = state
        .images
        .store("materials", extension, body.to_vec())
        .await?;
    let patch = MaterialPatch {
        cover_image_path: Some(path.clone()),
        ..MaterialPatch::default()
    };
    match state
        .material_service
        .update_material(id, material_id, patch)
        .await
    {
        Ok(updated) => Ok(GetResponse::Ok(Envelope::new(
            "Material image uploaded",
            updated,
        ))),
        Err(err) => {
            super::discard_orphan(state.images.as_ref(), &path).await;
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_require_is_free_when_creating_material() {
        let request: CreateMaterialRequest =
            serde_json::from_str(r#"{"name":"Drill","type":"Tool","hourly_rate":5.0}"#).unwrap();
        let result = request.into_material(LaboratoryId::new());
        assert!(matches!(
            result,
            Err(LabHubError::Validation(ValidationError::MissingField {
                field: "is_free"
            }))
        ));
    }

    #[test]
    fn should_build_free_material_when_is_free_given() {
        let request: CreateMaterialRequest =
            serde_json::from_str(r#"{"name":"Gloves","type":"PPE","is_free":true}"#).unwrap();
        let material = request.into_material(LaboratoryId::new()).unwrap();
        assert!(material.is_free);
        assert!(material.hourly_rate.is_none());
    }
}
