//! `SQLite` implementation of [`ReservationRepository`].
//!
//! The booked material ids are kept as a JSON array in a single column;
//! reservations have no foreign keys so they survive the deletion of what
//! they reference.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::ReservationRepository;
use labhub_domain::error::LabHubError;
use labhub_domain::id::{LaboratoryId, MaterialId, ReservationId};
use labhub_domain::reservation::Reservation;

use crate::error::StorageError;
use crate::row::{decode, decode_timestamp, encode_timestamp};

/// Wrapper for converting database rows into domain [`Reservation`].
struct Wrapper(Reservation);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Reservation> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let laboratory_id: String = row.try_get("laboratory_id")?;
        let material_ids_json: String = row.try_get("material_ids")?;
        let reservation_date: String = row.try_get("reservation_date")?;
        let start_time: String = row.try_get("start_time")?;
        let end_time: String = row.try_get("end_time")?;
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        let material_ids: Vec<MaterialId> = serde_json::from_str(&material_ids_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Reservation {
            id: decode(&id)?,
            laboratory_id: decode(&laboratory_id)?,
            material_ids,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone_number: row.try_get("phone_number")?,
            reservation_date: decode(&reservation_date)?,
            start_time: decode(&start_time)?,
            end_time: decode(&end_time)?,
            notes: row.try_get("notes")?,
            total_cost: row.try_get("total_cost")?,
            status: decode(&status)?,
            created_at: decode_timestamp(&created_at)?,
            updated_at: decode_timestamp(&updated_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO reservations (id, laboratory_id, material_ids, full_name, email, phone_number,
                              reservation_date, start_time, end_time, notes, total_cost, status,
                              created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM reservations WHERE id = ?";

const SELECT_ALL: &str = "SELECT * FROM reservations ORDER BY created_at DESC, rowid DESC";

const SELECT_BY_LABORATORY: &str = r"
    SELECT * FROM reservations
    WHERE laboratory_id = ?
    ORDER BY created_at DESC, rowid DESC
";

const UPDATE: &str = r"
    UPDATE reservations
    SET material_ids = ?, full_name = ?, email = ?, phone_number = ?, reservation_date = ?,
        start_time = ?, end_time = ?, notes = ?, total_cost = ?, status = ?, updated_at = ?
    WHERE id = ?
";

const DELETE_BY_ID: &str = "DELETE FROM reservations WHERE id = ?";

/// `SQLite`-backed reservation repository.
#[derive(Clone)]
pub struct SqliteReservationRepository {
    pool: SqlitePool,
}

impl SqliteReservationRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReservationRepository for SqliteReservationRepository {
    fn create(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let material_ids =
                serde_json::to_string(&reservation.material_ids).map_err(StorageError::from)?;
            sqlx::query(INSERT)
                .bind(reservation.id.to_string())
                .bind(reservation.laboratory_id.to_string())
                .bind(material_ids)
                .bind(&reservation.full_name)
                .bind(&reservation.email)
                .bind(&reservation.phone_number)
                .bind(reservation.reservation_date.to_string())
                .bind(reservation.start_time.to_string())
                .bind(reservation.end_time.to_string())
                .bind(&reservation.notes)
                .bind(reservation.total_cost)
                .bind(reservation.status.as_str())
                .bind(encode_timestamp(&reservation.created_at))
                .bind(encode_timestamp(&reservation.updated_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(reservation)
        }
    }

    fn get_by_id(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<Option<Reservation>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn list(
        &self,
        laboratory_id: Option<LaboratoryId>,
    ) -> impl Future<Output = Result<Vec<Reservation>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = match laboratory_id {
                Some(laboratory_id) => {
                    sqlx::query_as(SELECT_BY_LABORATORY)
                        .bind(laboratory_id.to_string())
                        .fetch_all(&pool)
                        .await
                }
                None => sqlx::query_as(SELECT_ALL).fetch_all(&pool).await,
            }
            .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        reservation: Reservation,
    ) -> impl Future<Output = Result<Reservation, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let material_ids =
                serde_json::to_string(&reservation.material_ids).map_err(StorageError::from)?;
            sqlx::query(UPDATE)
                .bind(material_ids)
                .bind(&reservation.full_name)
                .bind(&reservation.email)
                .bind(&reservation.phone_number)
                .bind(reservation.reservation_date.to_string())
                .bind(reservation.start_time.to_string())
                .bind(reservation.end_time.to_string())
                .bind(&reservation.notes)
                .bind(reservation.total_cost)
                .bind(reservation.status.as_str())
                .bind(encode_timestamp(&reservation.updated_at))
                .bind(reservation.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(reservation)
        }
    }

    fn delete(
        &self,
        id: ReservationId,
    ) -> impl Future<Output = Result<bool, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}
