//! Material: equipment owned by a laboratory, either free or metered per hour.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LabHubError, ValidationError};
use crate::id::{LaboratoryId, MaterialId};
use crate::money::ensure_amount;
use crate::time::{Timestamp, now};

/// Operational state of a material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialStatus {
    #[default]
    Available,
    Unavailable,
    Maintenance,
}

impl MaterialStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(ValidationError::InvalidStatus {
                kind: "material",
                value: other.to_string(),
            }),
        }
    }
}

/// A piece of equipment attached to a laboratory.
///
/// Invariant: `is_free` implies `hourly_rate.is_none()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub laboratory_id: LaboratoryId,
    pub name: String,
    pub description: Option<String>,
    /// Free-form category, e.g. "3D printer".
    #[serde(rename = "type")]
    pub kind: String,
    pub hourly_rate: Option<f64>,
    pub is_free: bool,
    pub status: MaterialStatus,
    pub cover_image_path: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Material {
    /// Create a builder for constructing a [`Material`].
    #[must_use]
    pub fn builder() -> MaterialBuilder {
        MaterialBuilder::default()
    }

    /// Drop the rate of a free material.
    pub fn normalize(&mut self) {
        if self.is_free {
            self.hourly_rate = None;
        }
    }

    /// Rate charged per booked hour, zero for free or unpriced materials.
    #[must_use]
    pub fn billable_rate(&self) -> f64 {
        if self.is_free {
            return 0.0;
        }
        self.hourly_rate.unwrap_or(0.0)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] when `name` or `kind` is blank, a
    /// metered material has no rate, or the rate is negative or not finite.
    pub fn validate(&self) -> Result<(), LabHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "name" }.into());
        }
        if self.kind.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "type" }.into());
        }
        match (self.is_free, self.hourly_rate) {
            (false, None) => return Err(ValidationError::MissingHourlyRate.into()),
            (_, Some(rate)) => ensure_amount("hourly_rate", rate)?,
            (true, None) => {}
        }
        Ok(())
    }

    /// Merge the provided fields, re-establish the free/rate invariant and
    /// refresh `updated_at`.
    ///
    /// When the patch marks the material free, any rate in the same patch is
    /// discarded.
    pub fn apply(&mut self, patch: MaterialPatch, at: Timestamp) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(is_free) = patch.is_free {
            self.is_free = is_free;
        }
        if let Some(rate) = patch.hourly_rate.filter(|_| patch.is_free != Some(true)) {
            self.hourly_rate = Some(rate);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(path) = patch.cover_image_path {
            self.cover_image_path = Some(path);
        }
        if let Some(url) = patch.image_url {
            self.image_url = Some(url);
        }
        self.normalize();
        self.updated_at = at;
    }
}

/// Step-by-step builder for [`Material`].
#[derive(Debug, Default)]
pub struct MaterialBuilder {
    id: Option<MaterialId>,
    laboratory_id: Option<LaboratoryId>,
    name: Option<String>,
    description: Option<String>,
    kind: Option<String>,
    hourly_rate: Option<f64>,
    is_free: Option<bool>,
    status: Option<MaterialStatus>,
    cover_image_path: Option<String>,
    image_url: Option<String>,
}

impl MaterialBuilder {
    #[must_use]
    pub fn id(mut self, id: MaterialId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn laboratory_id(mut self, laboratory_id: LaboratoryId) -> Self {
        self.laboratory_id = Some(laboratory_id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn hourly_rate(mut self, rate: f64) -> Self {
        self.hourly_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn is_free(mut self, is_free: bool) -> Self {
        self.is_free = Some(is_free);
        self
    }

    #[must_use]
    pub fn status(mut self, status: MaterialStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn cover_image_path(mut self, path: impl Into<String>) -> Self {
        self.cover_image_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Consume the builder, normalize, validate, and return a [`Material`].
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if `laboratory_id` or `is_free` is
    /// missing, or any invariant checked by [`Material::validate`] fails.
    pub fn build(self) -> Result<Material, LabHubError> {
        let laboratory_id = self.laboratory_id.ok_or(ValidationError::MissingField {
            field: "laboratory_id",
        })?;
        let is_free = self
            .is_free
            .ok_or(ValidationError::MissingField { field: "is_free" })?;
        let ts = now();
        let mut material = Material {
            id: self.id.unwrap_or_default(),
            laboratory_id,
            name: self.name.unwrap_or_default(),
            description: self.description,
            kind: self.kind.unwrap_or_default(),
            hourly_rate: self.hourly_rate,
            is_free,
            status: self.status.unwrap_or_default(),
            cover_image_path: self.cover_image_path,
            image_url: self.image_url,
            created_at: ts,
            updated_at: ts,
        };
        material.normalize();
        material.validate()?;
        Ok(material)
    }
}

/// Partial update for a [`Material`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub hourly_rate: Option<f64>,
    pub is_free: Option<bool>,
    pub status: Option<MaterialStatus>,
    pub cover_image_path: Option<String>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metered(rate: f64) -> Material {
        Material::builder()
            .laboratory_id(LaboratoryId::new())
            .name("Ultimaker S5")
            .kind("3D printer")
            .is_free(false)
            .hourly_rate(rate)
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_metered_material_with_default_status() {
        let material = metered(25.0);
        assert_eq!(material.hourly_rate, Some(25.0));
        assert!(!material.is_free);
        assert_eq!(material.status, MaterialStatus::Available);
    }

    #[test]
    fn should_drop_rate_when_building_free_material() {
        let material = Material::builder()
            .laboratory_id(LaboratoryId::new())
            .name("Safety goggles")
            .kind("PPE")
            .is_free(true)
            .hourly_rate(3.0)
            .build()
            .unwrap();
        assert!(material.is_free);
        assert_eq!(material.hourly_rate, None);
    }

    #[test]
    fn should_reject_metered_material_without_rate() {
        let result = Material::builder()
            .laboratory_id(LaboratoryId::new())
            .name("Oscilloscope")
            .kind("Electronics")
            .is_free(false)
            .build();
        assert!(matches!(
            result,
            Err(LabHubError::Validation(ValidationError::MissingHourlyRate))
        ));
    }

    #[test]
    fn should_reject_material_when_is_free_missing() {
        let result = Material::builder()
            .laboratory_id(LaboratoryId::new())
            .name("Oscilloscope")
            .kind("Electronics")
            .hourly_rate(4.0)
            .build();
        assert!(matches!(
            result,
            Err(LabHubError::Validation(ValidationError::MissingField {
                field: "is_free"
            }))
        ));
    }

    #[test]
    fn should_reject_blank_type() {
        let result = Material::builder()
            .laboratory_id(LaboratoryId::new())
            .name("Drill")
            .kind(" ")
            .is_free(true)
            .build();
        assert!(matches!(
            result,
            Err(LabHubError::Validation(ValidationError::EmptyField {
                field: "type"
            }))
        ));
    }

    #[test]
    fn should_discard_incoming_rate_when_patch_marks_material_free() {
        let mut material = metered(25.0);
        material.apply(
            MaterialPatch {
                is_free: Some(true),
                hourly_rate: Some(99.0),
                ..MaterialPatch::default()
            },
            now(),
        );
        assert!(material.is_free);
        assert_eq!(material.hourly_rate, None);
    }

    #[test]
    fn should_ignore_rate_patch_on_already_free_material() {
        let mut material = metered(25.0);
        material.apply(
            MaterialPatch {
                is_free: Some(true),
                ..MaterialPatch::default()
            },
            now(),
        );
        material.apply(
            MaterialPatch {
                hourly_rate: Some(12.0),
                ..MaterialPatch::default()
            },
            now(),
        );
        assert!(material.is_free);
        assert_eq!(material.hourly_rate, None);
    }

    #[test]
    fn should_bill_zero_for_free_or_unpriced_materials() {
        let mut material = metered(25.0);
        assert!((material.billable_rate() - 25.0).abs() < f64::EPSILON);

        material.hourly_rate = None;
        assert!(material.billable_rate().abs() < f64::EPSILON);

        material.is_free = true;
        material.hourly_rate = Some(10.0);
        assert!(material.billable_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn should_parse_status_from_lowercase_string() {
        assert_eq!(
            "maintenance".parse::<MaterialStatus>(),
            Ok(MaterialStatus::Maintenance)
        );
        assert!("broken".parse::<MaterialStatus>().is_err());
    }

    #[test]
    fn should_serialize_kind_as_type() {
        let json = serde_json::to_value(metered(25.0)).unwrap();
        assert_eq!(json["type"], "3D printer");
        assert_eq!(json["status"], "available");
    }
}
