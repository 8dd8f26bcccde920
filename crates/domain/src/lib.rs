//! # labhub-domain
//!
//! Pure domain model for the labhub laboratory reservation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps,
//!   `HH:mm` clock times and booking windows, currency rounding
//! - Define **Laboratories** (bookable facilities with an hourly rate)
//! - Define **Materials** (equipment owned by a laboratory, free or metered)
//! - Define **Reservations** (time-boxed bookings with a cost snapshot)
//! - Price reservations from laboratory and material rates
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod money;
pub mod time;

pub mod laboratory;
pub mod material;
pub mod pricing;
pub mod reservation;
