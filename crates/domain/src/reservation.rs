//! Reservation: a booking of a laboratory and some of its materials for a
//! same-day time window on a given date.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LabHubError, ValidationError};
use crate::id::{LaboratoryId, MaterialId, ReservationId};
use crate::laboratory::Laboratory;
use crate::material::Material;
use crate::money::ensure_amount;
use crate::time::{ClockTime, TimeWindow, Timestamp, now};

/// Lifecycle state of a reservation.
///
/// Any status may replace any other; there is no enforced transition table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(ValidationError::InvalidStatus {
                kind: "reservation",
                value: other.to_string(),
            }),
        }
    }
}

/// Contact details and booking window submitted by whoever books a laboratory.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub materials: Vec<MaterialId>,
    pub reservation_date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub notes: Option<String>,
}

impl ReservationRequest {
    /// Check contact fields and return the validated booking window.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] for blank contact fields, an
    /// implausible email, or a window whose end is not after its start.
    pub fn validate(&self) -> Result<TimeWindow, LabHubError> {
        for (field, value) in [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("phone_number", &self.phone_number),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField { field }.into());
            }
        }
        if !is_plausible_email(&self.email) {
            return Err(ValidationError::InvalidEmail(self.email.clone()).into());
        }
        Ok(TimeWindow::new(self.start_time, self.end_time)?)
    }
}

/// `local@domain.tld` with no whitespace.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// A persisted booking.
///
/// `total_cost` is a snapshot taken at creation; later rate changes on the
/// laboratory or its materials do not touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub laboratory_id: LaboratoryId,
    pub material_ids: Vec<MaterialId>,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub reservation_date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub notes: Option<String>,
    pub total_cost: f64,
    pub status: ReservationStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reservation {
    /// Turn a validated request into a new pending reservation.
    ///
    /// `material_ids` are the ids that resolved to materials of the laboratory;
    /// `total_cost` comes from [`crate::pricing::quote`].
    #[must_use]
    pub fn pending(
        laboratory_id: LaboratoryId,
        request: ReservationRequest,
        material_ids: Vec<MaterialId>,
        total_cost: f64,
    ) -> Self {
        let ts = now();
        Self {
            id: ReservationId::new(),
            laboratory_id,
            material_ids,
            full_name: request.full_name,
            email: request.email,
            phone_number: request.phone_number,
            reservation_date: request.reservation_date,
            start_time: request.start_time,
            end_time: request.end_time,
            notes: request.notes,
            total_cost,
            status: ReservationStatus::Pending,
            created_at: ts,
            updated_at: ts,
        }
    }

    /// Merge the provided fields and refresh `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] when an overriding `total_cost` is
    /// negative or not finite; the reservation is left untouched in that case.
    pub fn apply(&mut self, patch: ReservationPatch, at: Timestamp) -> Result<(), LabHubError> {
        if let Some(total_cost) = patch.total_cost {
            ensure_amount("total_cost", total_cost)?;
            self.total_cost = total_cost;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        self.updated_at = at;
        Ok(())
    }
}

/// Partial update for a [`Reservation`]. Cost is never recomputed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReservationPatch {
    pub status: Option<ReservationStatus>,
    pub total_cost: Option<f64>,
    pub notes: Option<String>,
}

/// A reservation with its references resolved to full records.
///
/// `laboratory` is `None` when the laboratory was deleted after booking;
/// materials that no longer exist are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub laboratory: Option<Laboratory>,
    pub materials: Vec<Material>,
}
