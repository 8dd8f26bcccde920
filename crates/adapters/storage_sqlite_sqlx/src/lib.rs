//! # labhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `labhub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `labhub-app` (for port traits) and `labhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod laboratory_repo;
pub mod material_repo;
pub mod pool;
pub mod reservation_repo;

mod row;

pub use laboratory_repo::SqliteLaboratoryRepository;
pub use material_repo::SqliteMaterialRepository;
pub use pool::{Config, Database};
pub use reservation_repo::SqliteReservationRepository;
