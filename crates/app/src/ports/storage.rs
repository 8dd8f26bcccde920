//! Storage port: repository traits for persistence.

use std::future::Future;

use labhub_domain::error::LabHubError;
use labhub_domain::id::{LaboratoryId, MaterialId, ReservationId};
use labhub_domain::laboratory::{Laboratory, LaboratoryFilter};
use labhub_domain::material::Material;
use labhub_domain::reservation::Reservation;

/// Repository for persisting and querying [`Laboratory`] records.
pub trait LaboratoryRepository {
    /// Persist a new laboratory.
    fn create(
        &self,
        laboratory: Laboratory,
    ) -> impl Future<Output = Result<Laboratory, LabHubError>> + Send;

    /// Get a laboratory by its unique identifier.
    fn get_by_id(
        &self,
        id: LaboratoryId,
    ) -> impl Future<Output = Result<Option<Laboratory>, LabHubError>> + Send;

    /// Find every laboratory matching `filter`, newest first.
    fn find(
        &self,
        filter: &LaboratoryFilter,
    ) -> impl Future<Output = Result<Vec<Laboratory>, LabHubError>> + Send;

    /// Replace an existing laboratory.
    fn update(
        &self,
        laboratory: Laboratory,
    ) -> impl Future<Output = Result<Laboratory, LabHubError>> + Send;

    /// Delete a laboratory together with every material it owns, atomically.
    ///
    /// Resolves to `false` when no laboratory with `id` existed.
    fn delete(&self, id: LaboratoryId) -> impl Future<Output = Result<bool, LabHubError>> + Send;
}

/// Repository for persisting and querying [`Material`] records.
pub trait MaterialRepository {
    /// Persist a new material.
    fn create(
        &self,
        material: Material,
    ) -> impl Future<Output = Result<Material, LabHubError>> + Send;

    /// Get a material by its unique identifier, regardless of its laboratory.
    fn get_by_id(
        &self,
        id: MaterialId,
    ) -> impl Future<Output = Result<Option<Material>, LabHubError>> + Send;

    /// Every material owned by `laboratory_id`, oldest first.
    fn find_by_laboratory(
        &self,
        laboratory_id: LaboratoryId,
    ) -> impl Future<Output = Result<Vec<Material>, LabHubError>> + Send;

    /// The materials whose id is in `ids`. Unknown ids are skipped and each
    /// material appears at most once.
    fn find_by_ids(
        &self,
        ids: &[MaterialId],
    ) -> impl Future<Output = Result<Vec<Material>, LabHubError>> + Send;

    /// Replace an existing material.
    fn update(
        &self,
        material: Material,
    ) -> impl Future<Output = Result<Material, LabHubError>> + Send;

    /// Delete a material. Resolves to `false` when it did not exist.
    fn delete(&self, id: MaterialId) -> impl Future<Output = Result<bool, LabHubError>> + Send;
}

/// Repository for persisting and querying [`Reservation`] records.
pub trait ReservationRepository {
    /// Persist a new reservation.
    fn create(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, LabHubError>> + Send;

    /// Get a reservation by its unique identifier.
    fn get_by_id(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<Option<Reservation>, LabHubError>> + Send;

    /// All reservations, or only those of `laboratory_id`, most recent first.
    fn list(
        &self,
        laboratory_id: Option<LaboratoryId>,
    ) -> impl Future<Output = Result<Vec<Reservation>, LabHubError>> + Send;

    /// Replace an existing reservation.
    fn update(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, LabHubError>> + Send;

    /// Delete a reservation. Resolves to `false` when it did not exist.
    fn delete(&self, id: ReservationId)
    -> impl Future<Output = Result<bool, LabHubError>> + Send;
}
