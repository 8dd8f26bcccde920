//! Laboratory service: catalog use-cases.

use labhub_domain::error::{LabHubError, NotFoundError};
use labhub_domain::id::LaboratoryId;
use labhub_domain::laboratory::{Laboratory, LaboratoryDetails, LaboratoryFilter, LaboratoryPatch};
use labhub_domain::time::now;

use crate::ports::{LaboratoryRepository, MaterialRepository};

/// Application service for laboratory CRUD and search.
pub struct LaboratoryService<L, M> {
    laboratories: L,
    materials: M,
}

impl<L: LaboratoryRepository, M: MaterialRepository> LaboratoryService<L, M> {
    /// Create a new service backed by the given repositories.
    pub fn new(laboratories: L, materials: M) -> Self {
        Self {
            laboratories,
            materials,
        }
    }

    /// Create a new laboratory after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, laboratory), fields(title = %laboratory.title))]
    pub async fn create_laboratory(
        &self,
        laboratory: Laboratory,
    ) -> Result<LaboratoryDetails, LabHubError> {
        laboratory.validate()?;
        let laboratory = self.laboratories.create(laboratory).await?;
        tracing::info!(id = %laboratory.id, "laboratory created");
        Ok(LaboratoryDetails {
            laboratory,
            materials: Vec::new(),
        })
    }

    /// List laboratories matching `filter`, each with its materials.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn list_laboratories(
        &self,
        filter: &LaboratoryFilter,
    ) -> Result<Vec<LaboratoryDetails>, LabHubError> {
        let laboratories = self.laboratories.find(filter).await?;
        let mut result = Vec::with_capacity(laboratories.len());
        for laboratory in laboratories {
            result.push(self.with_materials(laboratory).await?);
        }
        Ok(result)
    }

    /// Look up a laboratory by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] when no laboratory with `id` exists,
    /// or a storage error from the repositories.
    #[tracing::instrument(skip(self))]
    pub async fn get_laboratory(&self, id: LaboratoryId) -> Result<LaboratoryDetails, LabHubError> {
        let laboratory = self.require(id).await?;
        self.with_materials(laboratory).await
    }

    /// Merge `patch` into an existing laboratory.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] if the laboratory does not exist,
    /// [`LabHubError::Validation`] if the merged record is invalid, or a
    /// storage error from the repositories.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_laboratory(
        &self,
        id: LaboratoryId,
        patch: LaboratoryPatch,
    ) -> Result<LaboratoryDetails, LabHubError> {
        let mut laboratory = self.require(id).await?;
        laboratory.apply(patch, now());
        laboratory.validate()?;
        let laboratory = self.laboratories.update(laboratory).await?;
        self.with_materials(laboratory).await
    }

    /// Delete a laboratory and every material it owns.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] if the laboratory does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_laboratory(&self, id: LaboratoryId) -> Result<(), LabHubError> {
        if !self.laboratories.delete(id).await? {
            return Err(NotFoundError::new(LaboratoryId::KIND, id).into());
        }
        tracing::info!(%id, "laboratory deleted");
        Ok(())
    }

    async fn require(&self, id: LaboratoryId) -> Result<Laboratory, LabHubError> {
        self.laboratories
            .get_by_id(id)
            .await?
            .ok_or_else(|| NotFoundError::new(LaboratoryId::KIND, id).into())
    }

    async fn with_materials(
        &self,
        laboratory: Laboratory,
    ) -> Result<LaboratoryDetails, LabHubError> {
        let materials = self.materials.find_by_laboratory(laboratory.id).await?;
        Ok(LaboratoryDetails {
            laboratory,
            materials,
        })
    }
}
