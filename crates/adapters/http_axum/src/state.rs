//! Shared application state for axum handlers.

use std::sync::Arc;

use axum::extract::FromRef;

use labhub_app::ports::{ImageStore, LaboratoryRepository, MaterialRepository, ReservationRepository};
use labhub_app::services::laboratory_service::LaboratoryService;
use labhub_app::services::material_service::MaterialService;
use labhub_app::services::reservation_service::ReservationService;

use crate::auth::AccessGate;

/// Application state shared across all axum handlers.
///
/// Generic over the three repositories and the image store to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<L, M, R, I> {
    /// Laboratory catalog service.
    pub laboratory_service: Arc<LaboratoryService<L, M>>,
    /// Material inventory service.
    pub material_service: Arc<MaterialService<L, M>>,
    /// Reservation engine.
    pub reservation_service: Arc<ReservationService<L, M, R>>,
    /// Where uploaded cover images go.
    pub images: Arc<I>,
    /// Verifies bearer tokens on privileged routes.
    pub access: AccessGate,
}

impl<L, M, R, I> Clone for AppState<L, M, R, I> {
    fn clone(&self) -> Self {
        Self {
            laboratory_service: Arc::clone(&self.laboratory_service),
            material_service: Arc::clone(&self.material_service),
            reservation_service: Arc::clone(&self.reservation_service),
            images: Arc::clone(&self.images),
            access: self.access.clone(),
        }
    }
}

impl<L, M, R, I> AppState<L, M, R, I>
where
    L: LaboratoryRepository + Send + Sync + 'static,
    M: MaterialRepository + Send + Sync + 'static,
    R: ReservationRepository + Send + Sync + 'static,
    I: ImageStore + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        laboratory_service: LaboratoryService<L, M>,
        material_service: MaterialService<L, M>,
        reservation_service: ReservationService<L, M, R>,
        images: I,
        access: AccessGate,
    ) -> Self {
        Self {
            laboratory_service: Arc::new(laboratory_service),
            material_service: Arc::new(material_service),
            reservation_service: Arc::new(reservation_service),
            images: Arc::new(images),
            access,
        }
    }
}

impl<L, M, R, I> FromRef<AppState<L, M, R, I>> for AccessGate {
    fn from_ref(state: &AppState<L, M, R, I>) -> Self {
        state.access.clone()
    }
}
