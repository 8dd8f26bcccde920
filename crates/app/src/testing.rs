//! In-memory implementations of every storage port, shared by service tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use labhub_domain::error::LabHubError;
use labhub_domain::id::{LaboratoryId, MaterialId, ReservationId};
use labhub_domain::laboratory::{Laboratory, LaboratoryFilter};
use labhub_domain::material::Material;
use labhub_domain::reservation::Reservation;
use labhub_domain::time::Timestamp;

use crate::ports::{LaboratoryRepository, MaterialRepository, ReservationRepository};

#[derive(Default)]
struct State {
    laboratories: Vec<Laboratory>,
    materials: Vec<Material>,
    reservations: Vec<Reservation>,
}

/// A single store implementing all three repositories, so a cascade in one
/// is visible through the others.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn material_count(&self) -> usize {
        self.inner.lock().unwrap().materials.len()
    }
}

/// Most recent first; among equal timestamps the last inserted wins.
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> Timestamp) -> Vec<T> {
    let mut result: Vec<T> = items.iter().rev().cloned().collect();
    result.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    result
}

impl LaboratoryRepository for InMemoryStore {
    fn create(
        &self,
        laboratory: Laboratory,
    ) -> impl Future<Output = Result<Laboratory, LabHubError>> + Send {
        self.inner
            .lock()
            .unwrap()
            .laboratories
            .push(laboratory.clone());
        async { Ok(laboratory) }
    }

    fn get_by_id(
        &self,
        id: LaboratoryId,
    ) -> impl Future<Output = Result<Option<Laboratory>, LabHubError>> + Send {
        let state = self.inner.lock().unwrap();
        let result = state.laboratories.iter().find(|l| l.id == id).cloned();
        async { Ok(result) }
    }

    fn find(
        &self,
        filter: &LaboratoryFilter,
    ) -> impl Future<Output = Result<Vec<Laboratory>, LabHubError>> + Send {
        let state = self.inner.lock().unwrap();
        let result: Vec<Laboratory> = newest_first(&state.laboratories, |l| l.created_at)
            .into_iter()
            .filter(|l| filter.matches(l))
            .collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        laboratory: Laboratory,
    ) -> impl Future<Output = Result<Laboratory, LabHubError>> + Send {
        let mut state = self.inner.lock().unwrap();
        if let Some(slot) = state.laboratories.iter_mut().find(|l| l.id == laboratory.id) {
            *slot = laboratory.clone();
        }
        async { Ok(laboratory) }
    }

    fn delete(&self, id: LaboratoryId) -> impl Future<Output = Result<bool, LabHubError>> + Send {
        let mut state = self.inner.lock().unwrap();
        let before = state.laboratories.len();
        state.laboratories.retain(|l| l.id != id);
        let existed = state.laboratories.len() != before;
        if existed {
            state.materials.retain(|m| m.laboratory_id != id);
        }
        async move { Ok(existed) }
    }
}

impl MaterialRepository for InMemoryStore {
    fn create(
        &self,
        material: Material,
    ) -> impl Future<Output = Result<Material, LabHubError>> + Send {
        self.inner.lock().unwrap().materials.push(material.clone());
        async { Ok(material) }
    }

    fn get_by_id(
        &self,
        id: MaterialId,
    ) -> impl Future<Output = Result<Option<Material>, LabHubError>> + Send {
        let state = self.inner.lock().unwrap();
        let result = state.materials.iter().find(|m| m.id == id).cloned();
        async { Ok(result) }
    }

    fn find_by_laboratory(
        &self,
        laboratory_id: LaboratoryId,
    ) -> impl Future<Output = Result<Vec<Material>, LabHubError>> + Send {
        let state = self.inner.lock().unwrap();
        let result: Vec<Material> = state
            .materials
            .iter()
            .filter(|m| m.laboratory_id == laboratory_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn find_by_ids(
        &self,
        ids: &[MaterialId],
    ) -> impl Future<Output = Result<Vec<Material>, LabHubError>> + Send {
        let state = self.inner.lock().unwrap();
        let result: Vec<Material> = state
            .materials
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        material: Material,
    ) -> impl Future<Output = Result<Material, LabHubError>> + Send {
        let mut state = self.inner.lock().unwrap();
        if let Some(slot) = state.materials.iter_mut().find(|m| m.id == material.id) {
            *slot = material.clone();
        }
        async { Ok(material) }
    }

    fn delete(&self, id: MaterialId) -> impl Future<Output = Result<bool, LabHubError>> + Send {
        let mut state = self.inner.lock().unwrap();
        let before = state.materials.len();
        state.materials.retain(|m| m.id != id);
        let existed = state.materials.len() != before;
        async move { Ok(existed) }
    }
}

impl ReservationRepository for InMemoryStore {
    fn create(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, LabHubError>> + Send {
        self.inner
            .lock()
            .unwrap()
            .reservations
            .push(reservation.clone());
        async { Ok(reservation) }
    }

    fn get_by_id(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<Option<Reservation>, LabHubError>> + Send {
        let state = self.inner.lock().unwrap();
        let result = state.reservations.iter().find(|r| r.id == id).cloned();
        async { Ok(result) }
    }

    fn list(
        &self,
        laboratory_id: Option<LaboratoryId>,
    ) -> impl Future<Output = Result<Vec<Reservation>, LabHubError>> + Send {
        let state = self.inner.lock().unwrap();
        let result: Vec<Reservation> = newest_first(&state.reservations, |r| r.created_at)
            .into_iter()
            .filter(|r| laboratory_id.is_none_or(|id| r.laboratory_id == id))
            .collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, LabHubError>> + Send {
        let mut state = self.inner.lock().unwrap();
        if let Some(slot) = state
            .reservations
            .iter_mut()
            .find(|r| r.id == reservation.id)
        {
            *slot = reservation.clone();
        }
        async { Ok(reservation) }
    }

    fn delete(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<bool, LabHubError>> + Send {
        let mut state = self.inner.lock().unwrap();
        let before = state.reservations.len();
        state.reservations.retain(|r| r.id != id);
        let existed = state.reservations.len() != before;
        async move { Ok(existed) }
    }
}
