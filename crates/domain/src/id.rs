//! Typed identifier newtypes backed by UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident, $kind:literal) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Human readable name of the identified record, used in errors.
            pub const KIND: &'static str = $kind;

            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }

            /// Parse an identifier coming from an untrusted boundary.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::InvalidId`] when `raw` is not a UUID.
            pub fn parse(raw: &str) -> Result<Self, ValidationError> {
                Self::from_str(raw).map_err(|_| ValidationError::InvalidId {
                    kind: Self::KIND,
                    value: raw.to_string(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`Laboratory`](crate::laboratory::Laboratory).
    LaboratoryId,
    "Laboratory"
);

define_id!(
    /// Unique identifier for a [`Material`](crate::material::Material).
    MaterialId,
    "Material"
);

define_id!(
    /// Unique identifier for a [`Reservation`](crate::reservation::Reservation).
    ReservationId,
    "Reservation"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = LaboratoryId::new();
        let b = LaboratoryId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = MaterialId::new();
        let text = id.to_string();
        let parsed: MaterialId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let id = ReservationId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ReservationId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_return_validation_error_when_parsing_malformed_id() {
        let result = LaboratoryId::parse("64c9e4e5a88f3f001f7d8a9a");
        assert_eq!(
            result,
            Err(ValidationError::InvalidId {
                kind: "Laboratory",
                value: "64c9e4e5a88f3f001f7d8a9a".to_string(),
            })
        );
    }

    #[test]
    fn should_wrap_existing_uuid_when_using_from_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let id = MaterialId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }
}
