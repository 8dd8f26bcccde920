//! # labhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `LaboratoryRepository`: CRUD and filtered search for laboratories,
//!     deletion cascading to owned materials
//!   - `MaterialRepository`: CRUD for materials, lookups by owner and by id set
//!   - `ReservationRepository`: CRUD for reservations, newest-first listing
//!   - `ImageStore`: store an uploaded image and hand back its public path
//! - Define **driving/inbound ports** as use-case structs:
//!   - `LaboratoryService`: catalog CRUD and search
//!   - `MaterialService`: inventory CRUD scoped to a laboratory
//!   - `ReservationService`: booking with cost snapshot, lifecycle updates
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `labhub-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
