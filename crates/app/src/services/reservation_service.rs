//! Reservation service: booking, lifecycle updates and listing.
//!
//! The cost of a reservation is computed exactly once, when it is created,
//! from the laboratory rate and the selected materials that belong to that
//! laboratory. Updates never recompute it.

use std::collections::HashMap;

use labhub_domain::error::{LabHubError, NotFoundError};
use labhub_domain::id::{LaboratoryId, ReservationId};
use labhub_domain::laboratory::Laboratory;
use labhub_domain::material::Material;
use labhub_domain::pricing;
use labhub_domain::reservation::{
    Reservation, ReservationDetails, ReservationPatch, ReservationRequest,
};
use labhub_domain::time::now;

use crate::ports::{LaboratoryRepository, MaterialRepository, ReservationRepository};

/// Application service for the reservation engine.
pub struct ReservationService<L, M, R> {
    laboratories: L,
    materials: M,
    reservations: R,
}

impl<L, M, R> ReservationService<L, M, R>
where
    L: LaboratoryRepository,
    M: MaterialRepository,
    R: ReservationRepository,
{
    /// Create a new service backed by the given repositories.
    pub fn new(laboratories: L, materials: M, reservations: R) -> Self {
        Self {
            laboratories,
            materials,
            reservations,
        }
    }

    /// Book a laboratory, pricing the booking from current rates.
    ///
    /// Requested material ids that do not resolve to a material of this
    /// laboratory are dropped from the booking and cost nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] for invalid contact details or a
    /// window whose end is not after its start, [`LabHubError::NotFound`] if
    /// the laboratory does not exist, or a storage error.
    #[tracing::instrument(skip(self, request), fields(date = %request.reservation_date))]
    pub async fn create_reservation(
        &self,
        laboratory_id: LaboratoryId,
        request: ReservationRequest,
    ) -> Result<ReservationDetails, LabHubError> {
        let window = request.validate()?;
        let laboratory = self
            .laboratories
            .get_by_id(laboratory_id)
            .await?
            .ok_or_else(|| NotFoundError::new(LaboratoryId::KIND, laboratory_id))?;

        let mut materials: Vec<Material> = self
            .materials
            .find_by_ids(&request.materials)
            .await?
            .into_iter()
            .filter(|material| material.laboratory_id == laboratory_id)
            .collect();
        materials.sort_by_key(|material| {
            request
                .materials
                .iter()
                .position(|id| *id == material.id)
        });

        let quote = pricing::quote(&laboratory, &materials, window);
        let material_ids = materials.iter().map(|material| material.id).collect();
        let reservation = Reservation::pending(laboratory_id, request, material_ids, quote.total);
        let reservation = self.reservations.create(reservation).await?;
        tracing::info!(
            id = %reservation.id,
            total_cost = reservation.total_cost,
            hours = quote.hours,
            "reservation created"
        );

        Ok(ReservationDetails {
            reservation,
            laboratory: Some(laboratory),
            materials,
        })
    }

    /// List reservations, most recent first, optionally only those of one
    /// laboratory.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn list_reservations(
        &self,
        laboratory_id: Option<LaboratoryId>,
    ) -> Result<Vec<ReservationDetails>, LabHubError> {
        let reservations = self.reservations.list(laboratory_id).await?;
        let mut laboratories: HashMap<LaboratoryId, Option<Laboratory>> = HashMap::new();
        let mut result = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let laboratory = match laboratories.get(&reservation.laboratory_id) {
                Some(cached) => cached.clone(),
                None => {
                    let found = self
                        .laboratories
                        .get_by_id(reservation.laboratory_id)
                        .await?;
                    laboratories.insert(reservation.laboratory_id, found.clone());
                    found
                }
            };
            let materials = self.resolve_materials(&reservation).await?;
            result.push(ReservationDetails {
                reservation,
                laboratory,
                materials,
            });
        }
        Ok(result)
    }

    /// Look up a reservation by id with its references resolved.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when no reservation with `id`
    /// exists, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_reservation(
        &self,
        id: ReservationId,
    ) -> Result<ReservationDetails, LabHubError> {
        let reservation = self.require(id).await?;
        self.resolve(reservation).await
    }

    /// Change the status, notes or cost of a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when no reservation with `id`
    /// exists, [`LabHubError::Validation`] for an invalid cost override, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn update_reservation(
        &self,
        id: ReservationId,
        patch: ReservationPatch,
    ) -> Result<ReservationDetails, LabHubError> {
        let mut reservation = self.require(id).await?;
        reservation.apply(patch, now())?;
        let reservation = self.reservations.update(reservation).await?;
        self.resolve(reservation).await
    }

    /// Delete a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when no reservation with `id`
    /// exists, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_reservation(&self, id: ReservationId) -> Result<(), LabHubError> {
        if !self.reservations.delete(id).await? {
            return Err(NotFoundError::new(ReservationId::KIND, id).into());
        }
        tracing::info!(%id, "reservation deleted");
        Ok(())
    }

    async fn require(&self, id: ReservationId) -> Result<Reservation, LabHubError> {
        self.reservations
            .get_by_id(id)
            .await?
            .ok_or_else(|| NotFoundError::new(ReservationId::KIND, id).into())
    }

    async fn resolve(&self, reservation: Reservation) -> Result<ReservationDetails, LabHubError> {
        let laboratory = self
            .laboratories
            .get_by_id(reservation.laboratory_id)
            .await?;
        let materials = self.resolve_materials(&reservation).await?;
        Ok(ReservationDetails {
            reservation,
            laboratory,
            materials,
        })
    }

    /// Materials still in existence, in booking order.
    async fn resolve_materials(
        &self,
        reservation: &Reservation,
    ) -> Result<Vec<Material>, LabHubError> {
        if reservation.material_ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = self.materials.find_by_ids(&reservation.material_ids).await?;
        Ok(reservation
            .material_ids
            .iter()
            .filter_map(|id| found.iter().find(|material| material.id == *id).cloned())
            .collect())
    }
}
