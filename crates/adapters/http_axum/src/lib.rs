//! # labhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **JSON REST API** (`/api/laboratories`, `/api/reservations`, …)
//!   with every payload wrapped in a `{ "message", "data" }` envelope
//! - Gate privileged operations behind an HS256 bearer token
//! - Accept cover image uploads and serve them back under `/uploads`
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `labhub-app` (for port traits and services) and `labhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod router;
pub mod state;
pub mod uploads;
