//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod laboratories;
#[allow(clippy::missing_errors_doc)]
pub mod materials;
#[allow(clippy::missing_errors_doc)]
pub mod reservations;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};

use labhub_app::ports::{ImageStore, LaboratoryRepository, MaterialRepository, ReservationRepository};

use crate::state::AppState;

/// Largest accepted image upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Build the `/api` sub-router.
pub fn routes<L, M, R, I>() -> Router<AppState<L, M, R, I>>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    Router::new()
        // Laboratories
        .route(
            "/laboratories",
            get(laboratories::list::<L, M, R, I>).post(laboratories::create::<L, M, R, I>),
        )
        .route(
            "/laboratories/{id}",
            get(laboratories::get::<L, M, R, I>)
                .patch(laboratories::update::<L, M, R, I>)
                .delete(laboratories::delete::<L, M, R, I>),
        )
        .route(
            "/laboratories/{id}/image",
            put(laboratories::upload_image::<L, M, R, I>)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        // Materials
        .route(
            "/laboratories/{id}/materials",
            get(materials::list::<L, M, R, I>).post(materials::create::<L, M, R, I>),
        )
        .route(
            "/laboratories/{id}/materials/{material_id}",
            get(materials::get::<L, M, R, I>)
                .patch(materials::update::<L, M, R, I>)
                .delete(materials::delete::<L, M, R, I>),
        )
        .route(
            "/laboratories/{id}/materials/{material_id}/image",
            put(materials::upload_image::<L, M, R, I>)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        // Reservations
        .route(
            "/laboratories/{id}/reservations",
            get(reservations::list_for_laboratory::<L, M, R, I>)
                .post(reservations::create::<L, M, R, I>),
        )
        .route("/reservations", get(reservations::list::<L, M, R, I>))
        .route(
            "/reservations/{id}",
            get(reservations::get::<L, M, R, I>)
                .patch(reservations::update::<L, M, R, I>)
                .delete(reservations::delete::<L, M, R, I>),
        )
}

/// Read the declared content type of an upload, or an empty string.
fn content_type(headers: &axum::http::HeaderMap) -> &str {
    headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Best-effort removal of an image whose owning record could not be updated.
async fn discard_orphan<I: ImageStore>(images: &I, path: &str) {
    if let Err(err) = images.discard(path).await {
        tracing::warn!(%path, error = %err, "unable to discard orphaned image");
    }
}
