//! JSON REST handlers for reservations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use labhub_app::ports::{ImageStore, LaboratoryRepository, MaterialRepository, ReservationRepository};
use labhub_domain::error::ValidationError;
use labhub_domain::id::{LaboratoryId, MaterialId, ReservationId};
use labhub_domain::reservation::{ReservationDetails, ReservationPatch, ReservationRequest};
use labhub_domain::time::{ClockTime, parse_date};

use crate::auth::Privileged;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::state::AppState;

/// Request body for booking a laboratory. Dates and times stay textual until
/// [`CreateReservationRequest::into_request`] so that malformed values get a
/// precise message.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateReservationRequest {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub materials: Vec<String>,
    pub reservation_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub notes: Option<String>,
}

impl CreateReservationRequest {
    fn into_request(self) -> Result<ReservationRequest, ValidationError> {
        let materials = self
            .materials
            .iter()
            .map(String::as_str)
            .map(MaterialId::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let reservation_date = self
            .reservation_date
            .as_deref()
            .ok_or(ValidationError::MissingField {
                field: "reservation_date",
            })
            .and_then(parse_date)?;
        let start_time = parse_time("start_time", self.start_time.as_deref())?;
        let end_time = parse_time("end_time", self.end_time.as_deref())?;

        Ok(ReservationRequest {
            full_name: self.full_name,
            email: self.email,
            phone_number: self.phone_number,
            materials,
            reservation_date,
            start_time,
            end_time,
            notes: self.notes,
        })
    }
}

fn parse_time(field: &'static str, raw: Option<&str>) -> Result<ClockTime, ValidationError> {
    raw.ok_or(ValidationError::MissingField { field })?
        .trim()
        .parse()
}

/// Possible responses from the list endpoints.
pub enum ListResponse {
    Ok(Envelope<Vec<ReservationDetails>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(body) => body.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Envelope<ReservationDetails>),
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
    Created(Envelope<ReservationDetails>),
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
            Self::Deleted => Envelope::<()>::empty("Reservation deleted").into_response(),
        }
    }
}

/// `POST /api/laboratories/{id}/reservations`
pub async fn create<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<CreateReservationRequest>,
) -> Result<CreateResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let id = LaboratoryId::parse(&id)?;
    let request = req.into_request()?;
    let created = state
        .reservation_service
        .create_reservation(id, request)
        .await?;
    Ok(CreateResponse::Created(Envelope::new(
        "Reservation created",
        created,
    )))
}

/// `GET /api/laboratories/{id}/reservations`
pub async fn list_for_laboratory<L, M, R, I>(
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
    let reservations = state.reservation_service.list_reservations(Some(id)).await?;
    Ok(ListResponse::Ok(Envelope::new(
        "Reservations retrieved",
        reservations,
    )))
}

/// `GET /api/reservations`
pub async fn list<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
) -> Result<ListResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let reservations = state.reservation_service.list_reservations(None).await?;
    Ok(ListResponse::Ok(Envelope::new(
        "Reservations retrieved",
        reservations,
    )))
}

/// `GET /api/reservations/{id}`
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
    let id = ReservationId::parse(&id)?;
    let reservation = state.reservation_service.get_reservation(id).await?;
    Ok(GetResponse::Ok(Envelope::new(
        "Reservation retrieved",
        reservation,
    )))
}

/// `PATCH /api/reservations/{id}`
pub async fn update<L, M, R, I>(
    State(state): State<AppState<L, M, R, I>>,
    _: Privileged,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<ReservationPatch>,
) -> Result<GetResponse, ApiError>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    let id = ReservationId::parse(&id)?;
    let updated = state
        .reservation_service
        .update_reservation(id, patch)
        .await?;
    Ok(GetResponse::Ok(Envelope::new(
        "Reservation updated",
        updated,
    )))
}

/// `DELETE /api/reservations/{id}`
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
    let id = ReservationId::parse(&id)?;
    state.reservation_service.delete_reservation(id).await?;
    Ok(DeleteResponse::Deleted)
}
