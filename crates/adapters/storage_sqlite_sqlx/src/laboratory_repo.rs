//! `SQLite` implementation of [`LaboratoryRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::LaboratoryRepository;
use labhub_domain::error::LabHubError;
use labhub_domain::id::LaboratoryId;
use labhub_domain::laboratory::{Laboratory, LaboratoryFilter};

use crate::error::StorageError;
use crate::row::{decode, decode_timestamp, encode_timestamp};

/// Wrapper for converting database rows into domain [`Laboratory`].
struct Wrapper(Laboratory);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Laboratory> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Laboratory {
            id: decode(&id)?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            cover_image_path: row.try_get("cover_image_path")?,
            image_url: row.try_get("image_url")?,
            hourly_rate: row.try_get("hourly_rate")?,
            created_at: decode_timestamp(&created_at)?,
            updated_at: decode_timestamp(&updated_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO laboratories (id, title, description, cover_image_path, image_url, hourly_rate, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM laboratories WHERE id = ?";

const SELECT_BY_RATE: &str = r"
    SELECT * FROM laboratories
    WHERE (? IS NULL OR hourly_rate >= ?) AND (? IS NULL OR hourly_rate <= ?)
    ORDER BY created_at DESC, rowid DESC
";

const UPDATE: &str = r"
    UPDATE laboratories
    SET title = ?, description = ?, cover_image_path = ?, image_url = ?, hourly_rate = ?, updated_at = ?
    WHERE id = ?
";

const DELETE_MATERIALS: &str = "DELETE FROM materials WHERE laboratory_id = ?";
const DELETE_BY_ID: &str = "DELETE FROM laboratories WHERE id = ?";

/// `SQLite`-backed laboratory repository.
#[derive(Clone)]
pub struct SqliteLaboratoryRepository {
    pool: SqlitePool,
}

impl SqliteLaboratoryRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LaboratoryRepository for SqliteLaboratoryRepository {
    fn create(
        &self,
        laboratory: Laboratory,
    ) -> impl Future<Output = Result<Laboratory, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(laboratory.id.to_string())
                .bind(&laboratory.title)
                .bind(&laboratory.description)
                .bind(&laboratory.cover_image_path)
                .bind(&laboratory.image_url)
                .bind(laboratory.hourly_rate)
                .bind(encode_timestamp(&laboratory.created_at))
                .bind(encode_timestamp(&laboratory.updated_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(laboratory)
        }
    }

    fn get_by_id(
        &self,
        id: LaboratoryId,
    ) -> impl Future<Output = Result<Option<Laboratory>, LabHubError>> + Send {
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

    /// Rate bounds are applied in SQL; the text search runs on the decoded
    /// rows so that case folding covers non-ASCII titles.
    fn find(
        &self,
        filter: &LaboratoryFilter,
    ) -> impl Future<Output = Result<Vec<Laboratory>, LabHubError>> + Send {
        let pool = self.pool.clone();
        let filter = filter.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_RATE)
                .bind(filter.min_rate)
                .bind(filter.min_rate)
                .bind(filter.max_rate)
                .bind(filter.max_rate)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows
                .into_iter()
                .map(|w| w.0)
                .filter(|laboratory| filter.matches(laboratory))
                .collect())
        }
    }

    fn update(
        &self,
        laboratory: Laboratory,
    ) -> impl Future<Output = Result<Laboratory, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&laboratory.title)
                .bind(&laboratory.description)
                .bind(&laboratory.cover_image_path)
                .bind(&laboratory.image_url)
                .bind(laboratory.hourly_rate)
                .bind(encode_timestamp(&laboratory.updated_at))
                .bind(laboratory.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(laboratory)
        }
    }

    /// Materials and the laboratory row go in one transaction. Materials are
    /// deleted explicitly so the cascade holds even without the
    /// `foreign_keys` pragma.
    fn delete(&self, id: LaboratoryId) -> impl Future<Output = Result<bool, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            sqlx::query(DELETE_MATERIALS)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            tx.commit().await.map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}
