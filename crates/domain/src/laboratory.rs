//! Laboratory: a bookable facility with an hourly rate.
//!
//! A laboratory exclusively owns its [`Material`]s. The set of owned material
//! ids is not stored on the laboratory row: it is always derived from the
//! materials whose `laboratory_id` points here, so it cannot drift.

use serde::{Deserialize, Serialize};

use crate::error::{LabHubError, ValidationError};
use crate::id::LaboratoryId;
use crate::material::Material;
use crate::money::ensure_amount;
use crate::time::{Timestamp, now};

/// A bookable room or facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laboratory {
    pub id: LaboratoryId,
    pub title: String,
    pub description: Option<String>,
    /// Relative path returned by the image store, e.g. `/uploads/laboratories/x.png`.
    pub cover_image_path: Option<String>,
    pub image_url: Option<String>,
    pub hourly_rate: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Laboratory {
    /// Create a builder for constructing a [`Laboratory`].
    #[must_use]
    pub fn builder() -> LaboratoryBuilder {
        LaboratoryBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] when `title` is blank or
    /// `hourly_rate` is negative or not finite.
    pub fn validate(&self) -> Result<(), LabHubError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "title" }.into());
        }
        ensure_amount("hourly_rate", self.hourly_rate)?;
        Ok(())
    }

    /// Merge the provided fields and refresh `updated_at`.
    ///
    /// The result is not validated; callers run [`Laboratory::validate`].
    pub fn apply(&mut self, patch: LaboratoryPatch, at: Timestamp) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(path) = patch.cover_image_path {
            self.cover_image_path = Some(path);
        }
        if let Some(url) = patch.image_url {
            self.image_url = Some(url);
        }
        if let Some(rate) = patch.hourly_rate {
            self.hourly_rate = rate;
        }
        self.updated_at = at;
    }
}

/// Step-by-step builder for [`Laboratory`].
#[derive(Debug, Default)]
pub struct LaboratoryBuilder {
    id: Option<LaboratoryId>,
    title: Option<String>,
    description: Option<String>,
    cover_image_path: Option<String>,
    image_url: Option<String>,
    hourly_rate: Option<f64>,
}

impl LaboratoryBuilder {
    #[must_use]
    pub fn id(mut self, id: LaboratoryId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
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

    #[must_use]
    pub fn hourly_rate(mut self, rate: f64) -> Self {
        self.hourly_rate = Some(rate);
        self
    }

    /// Consume the builder, validate, and return a [`Laboratory`].
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if `title` is missing or blank, or
    /// `hourly_rate` is missing, negative or not finite.
    pub fn build(self) -> Result<Laboratory, LabHubError> {
        let hourly_rate = self
            .hourly_rate
            .ok_or(ValidationError::MissingField {
                field: "hourly_rate",
            })?;
        let ts = now();
        let laboratory = Laboratory {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            description: self.description,
            cover_image_path: self.cover_image_path,
            image_url: self.image_url,
            hourly_rate,
            created_at: ts,
            updated_at: ts,
        };
        laboratory.validate()?;
        Ok(laboratory)
    }
}

/// Partial update for a [`Laboratory`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LaboratoryPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_image_path: Option<String>,
    pub image_url: Option<String>,
    pub hourly_rate: Option<f64>,
}

/// Typed search criteria for listing laboratories. All criteria compose with AND.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LaboratoryFilter {
    /// Case-insensitive substring matched against title or description.
    pub search: Option<String>,
    /// Inclusive lower bound on `hourly_rate`.
    pub min_rate: Option<f64>,
    /// Inclusive upper bound on `hourly_rate`.
    pub max_rate: Option<f64>,
}

impl LaboratoryFilter {
    /// Whether `laboratory` satisfies every provided criterion.
    #[must_use]
    pub fn matches(&self, laboratory: &Laboratory) -> bool {
        if self.min_rate.is_some_and(|min| laboratory.hourly_rate < min) {
            return false;
        }
        if self.max_rate.is_some_and(|max| laboratory.hourly_rate > max) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                laboratory.title.to_lowercase().contains(&needle)
                    || laboratory
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        }
    }
}

/// A laboratory with its owned materials resolved to full records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaboratoryDetails {
    #[serde(flatten)]
    pub laboratory: Laboratory,
    pub materials: Vec<Material>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab(title: &str, description: Option<&str>, rate: f64) -> Laboratory {
        let mut builder = Laboratory::builder().title(title).hourly_rate(rate);
        if let Some(description) = description {
            builder = builder.description(description);
        }
        builder.build().unwrap()
    }

    #[test]
    fn should_build_valid_laboratory_when_title_and_rate_provided() {
        let laboratory = lab("3D Printing Lab", None, 50.0);
        assert_eq!(laboratory.title, "3D Printing Lab");
        assert!((laboratory.hourly_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(laboratory.created_at, laboratory.updated_at);
    }

    #[test]
    fn should_return_validation_error_when_title_is_blank() {
        let result = Laboratory::builder().title("  ").hourly_rate(10.0).build();
        assert!(matches!(
            result,
            Err(LabHubError::Validation(ValidationError::EmptyField {
                field: "title"
            }))
        ));
    }

    #[test]
    fn should_return_validation_error_when_rate_is_missing() {
        let result = Laboratory::builder().title("Lab").build();
        assert!(matches!(
            result,
            Err(LabHubError::Validation(ValidationError::MissingField {
                field: "hourly_rate"
            }))
        ));
    }

    #[test]
    fn should_return_validation_error_when_rate_is_negative() {
        let result = Laboratory::builder().title("Lab").hourly_rate(-1.0).build();
        assert!(matches!(
            result,
            Err(LabHubError::Validation(ValidationError::InvalidAmount { .. }))
        ));
    }

    #[test]
    fn should_merge_only_provided_fields_when_applying_patch() {
        let mut laboratory = lab("Lab", Some("old"), 20.0);
        let later = laboratory.updated_at + chrono::Duration::seconds(5);

        laboratory.apply(
            LaboratoryPatch {
                hourly_rate: Some(35.0),
                ..LaboratoryPatch::default()
            },
            later,
        );

        assert_eq!(laboratory.title, "Lab");
        assert_eq!(laboratory.description.as_deref(), Some("old"));
        assert!((laboratory.hourly_rate - 35.0).abs() < f64::EPSILON);
        assert_eq!(laboratory.updated_at, later);
        assert!(laboratory.created_at < laboratory.updated_at);
    }

    #[test]
    fn should_match_search_case_insensitively_on_title_or_description() {
        let by_title = lab("Electronics Workshop", None, 10.0);
        let by_description = lab("Room B", Some("Soldering and ELECTRONICS"), 10.0);
        let neither = lab("Wood shop", Some("saws"), 10.0);
        let filter = LaboratoryFilter {
            search: Some("electronics".to_string()),
            ..LaboratoryFilter::default()
        };

        assert!(filter.matches(&by_title));
        assert!(filter.matches(&by_description));
        assert!(!filter.matches(&neither));
    }

    #[test]
    fn should_bound_rate_inclusively() {
        let filter = LaboratoryFilter {
            min_rate: Some(20.0),
            max_rate: Some(40.0),
            ..LaboratoryFilter::default()
        };

        assert!(filter.matches(&lab("a", None, 20.0)));
        assert!(filter.matches(&lab("b", None, 40.0)));
        assert!(!filter.matches(&lab("c", None, 19.99)));
        assert!(!filter.matches(&lab("d", None, 40.01)));
    }

    #[test]
    fn should_compose_search_and_rate_with_and() {
        let filter = LaboratoryFilter {
            search: Some("lab".to_string()),
            max_rate: Some(30.0),
            ..LaboratoryFilter::default()
        };

        assert!(filter.matches(&lab("Cheap lab", None, 10.0)));
        assert!(!filter.matches(&lab("Pricey lab", None, 90.0)));
        assert!(!filter.matches(&lab("Cheap room", None, 10.0)));
    }

    #[test]
    fn should_serialize_details_with_flattened_laboratory_and_materials() {
        let details = LaboratoryDetails {
            laboratory: lab("Lab", None, 50.0),
            materials: Vec::new(),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["title"], "Lab");
        assert_eq!(json["hourly_rate"], 50.0);
        assert!(json["materials"].as_array().unwrap().is_empty());
    }
}
