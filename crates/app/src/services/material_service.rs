//! Material service: inventory use-cases scoped to a laboratory.
//!
//! Every lookup goes through the `(laboratory_id, material_id)` pair; a
//! material addressed through a laboratory that does not own it is reported
//! as not found.

use labhub_domain::error::{LabHubError, NotFoundError};
use labhub_domain::id::{LaboratoryId, MaterialId};
use labhub_domain::material::{Material, MaterialPatch};
use labhub_domain::time::now;

use crate::ports::{LaboratoryRepository, MaterialRepository};

/// Application service for material CRUD operations.
pub struct MaterialService<L, M> {
    laboratories: L,
    materials: M,
}

impl<L: LaboratoryRepository, M: MaterialRepository> MaterialService<L, M> {
    /// Create a new service backed by the given repositories.
    pub fn new(laboratories: L, materials: M) -> Self {
        Self {
            laboratories,
            materials,
        }
    }

    /// Attach a new material to its laboratory.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] if the owning laboratory does not
    /// exist, [`LabHubError::Validation`] if invariants fail, or a storage
    /// error from the repositories.
    #[tracing::instrument(skip(self, material), fields(name = %material.name, laboratory_id = %material.laboratory_id))]
    pub async fn create_material(&self, mut material: Material) -> Result<Material, LabHubError> {
        self.require_laboratory(material.laboratory_id).await?;
        material.normalize();
        material.validate()?;
        let material = self.materials.create(material).await?;
        tracing::info!(id = %material.id, "material created");
        Ok(material)
    }

    /// List the materials of a laboratory.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] if the laboratory does not exist,
    /// or a storage error from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn list_materials(
        &self,
        laboratory_id: LaboratoryId,
    ) -> Result<Vec<Material>, LabHubError> {
        self.require_laboratory(laboratory_id).await?;
        self.materials.find_by_laboratory(laboratory_id).await
    }

    /// Look up a material through the laboratory that owns it.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when the material does not exist or
    /// belongs to another laboratory, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_material(
        &self,
        laboratory_id: LaboratoryId,
        id: MaterialId,
    ) -> Result<Material, LabHubError> {
        self.materials
            .get_by_id(id)
            .await?
            .filter(|material| material.laboratory_id == laboratory_id)
            .ok_or_else(|| NotFoundError::new(MaterialId::KIND, id).into())
    }

    /// Merge `patch` into a material, keeping free materials unpriced.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when the pair does not match,
    /// [`LabHubError::Validation`] if the merged record is invalid, or a
    /// storage error.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_material(
        &self,
        laboratory_id: LaboratoryId,
        id: MaterialId,
        patch: MaterialPatch,
    ) -> Result<Material, LabHubError> {
        let mut material = self.get_material(laboratory_id, id).await?;
        material.apply(patch, now());
        material.validate()?;
        self.materials.update(material).await
    }

    /// Delete a material of a laboratory.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when the pair does not match, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_material(
        &self,
        laboratory_id: LaboratoryId,
        id: MaterialId,
    ) -> Result<(), LabHubError> {
        self.get_material(laboratory_id, id).await?;
        if !self.materials.delete(id).await? {
            return Err(NotFoundError::new(MaterialId::KIND, id).into());
        }
        tracing::info!(%id, "material deleted");
        Ok(())
    }

    async fn require_laboratory(&self, id: LaboratoryId) -> Result<(), LabHubError> {
        match self.laboratories.get_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(NotFoundError::new(LaboratoryId::KIND, id).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::laboratory_service::LaboratoryService;
    use crate::testing::InMemoryStore;
    use labhub_domain::error::ValidationError;
    use labhub_domain::laboratory::Laboratory;
    use labhub_domain::material::MaterialStatus;

    struct Fixture {
        laboratories: LaboratoryService<InMemoryStore, InMemoryStore>,
        materials: MaterialService<InMemoryStore, InMemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::default();
        Fixture {
            laboratories: LaboratoryService::new(store.clone(), store.clone()),
            materials: MaterialService::new(store.clone(), store),
        }
    }

    async fn seeded_laboratory(fx: &Fixture) -> LaboratoryId {
        let laboratory = Laboratory::builder()
            .title("Prototyping")
            .hourly_rate(50.0)
            .build()
            .unwrap();
        fx.laboratories
            .create_laboratory(laboratory)
            .await
            .unwrap()
            .laboratory
            .id
    }

    fn metered(laboratory_id: LaboratoryId, rate: f64) -> Material {
        Material::builder()
            .laboratory_id(laboratory_id)
            .name("CNC mill")
            .kind("Machining")
            .is_free(false)
            .hourly_rate(rate)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_register_material_in_laboratory_set_when_created() {
        let fx = fixture();
        let lab_id = seeded_laboratory(&fx).await;
        let material = fx
            .materials
            .create_material(metered(lab_id, 25.0))
            .await
            .unwrap();

        let details = fx.laboratories.get_laboratory(lab_id).await.unwrap();
        let ids: Vec<MaterialId> = details.materials.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![material.id]);
    }

    #[tokio::test]
    async fn should_return_not_found_when_creating_under_missing_laboratory() {
        let fx = fixture();
        let result = fx
            .materials
            .create_material(metered(LaboratoryId::new(), 25.0))
            .await;
        assert!(matches!(
            result,
            Err(LabHubError::NotFound(NotFoundError {
                entity: "Laboratory",
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn should_clear_rate_when_creating_free_material() {
        let fx = fixture();
        let lab_id = seeded_laboratory(&fx).await;
        let mut material = metered(lab_id, 25.0);
        material.is_free = true;

        let created = fx.materials.create_material(material).await.unwrap();
        assert!(created.is_free);
        assert_eq!(created.hourly_rate, None);
    }

    #[tokio::test]
    async fn should_return_not_found_when_material_fetched_through_wrong_laboratory() {
        let fx = fixture();
        let owner = seeded_laboratory(&fx).await;
        let other = seeded_laboratory(&fx).await;
        let material = fx
            .materials
            .create_material(metered(owner, 25.0))
            .await
            .unwrap();

        let result = fx.materials.get_material(other, material.id).await;
        assert!(matches!(result, Err(LabHubError::NotFound(_))));

        let result = fx
            .materials
            .update_material(other, material.id, MaterialPatch::default())
            .await;
        assert!(matches!(result, Err(LabHubError::NotFound(_))));

        let result = fx.materials.delete_material(other, material.id).await;
        assert!(matches!(result, Err(LabHubError::NotFound(_))));

        assert!(fx.materials.get_material(owner, material.id).await.is_ok());
    }

    #[tokio::test]
    async fn should_drop_rate_when_update_marks_material_free() {
        let fx = fixture();
        let lab_id = seeded_laboratory(&fx).await;
        let material = fx
            .materials
            .create_material(metered(lab_id, 25.0))
            .await
            .unwrap();

        let updated = fx
            .materials
            .update_material(
                lab_id,
                material.id,
                MaterialPatch {
                    is_free: Some(true),
                    hourly_rate: Some(40.0),
                    status: Some(MaterialStatus::Maintenance),
                    ..MaterialPatch::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.is_free);
        assert_eq!(updated.hourly_rate, None);
        assert_eq!(updated.status, MaterialStatus::Maintenance);
        let stored = fx.materials.get_material(lab_id, material.id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn should_reject_update_making_material_metered_without_rate() {
        let fx = fixture();
        let lab_id = seeded_laboratory(&fx).await;
        let mut free = metered(lab_id, 1.0);
        free.is_free = true;
        let material = fx.materials.create_material(free).await.unwrap();

        let result = fx
            .materials
            .update_material(
                lab_id,
                material.id,
                MaterialPatch {
                    is_free: Some(false),
                    ..MaterialPatch::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(LabHubError::Validation(ValidationError::MissingHourlyRate))
        ));
    }

    #[tokio::test]
    async fn should_remove_material_from_laboratory_set_when_deleted() {
        let fx = fixture();
        let lab_id = seeded_laboratory(&fx).await;
        let material = fx
            .materials
            .create_material(metered(lab_id, 25.0))
            .await
            .unwrap();

        fx.materials
            .delete_material(lab_id, material.id)
            .await
            .unwrap();

        let details = fx.laboratories.get_laboratory(lab_id).await.unwrap();
        assert!(details.materials.is_empty());
        assert!(matches!(
            fx.materials.get_material(lab_id, material.id).await,
            Err(LabHubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_listing_missing_laboratory() {
        let fx = fixture();
        let result = fx.materials.list_materials(LaboratoryId::new()).await;
        assert!(matches!(result, Err(LabHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_make_materials_unreachable_after_laboratory_deletion() {
        let fx = fixture();
        let lab_id = seeded_laboratory(&fx).await;
        let material = fx
            .materials
            .create_material(metered(lab_id, 25.0))
            .await
            .unwrap();

        fx.laboratories.delete_laboratory(lab_id).await.unwrap();

        assert!(matches!(
            fx.materials.get_material(lab_id, material.id).await,
            Err(LabHubError::NotFound(_))
        ));
    }
}
