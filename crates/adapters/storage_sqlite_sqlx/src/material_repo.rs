//! `SQLite` implementation of [`MaterialRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::MaterialRepository;
use labhub_domain::error::LabHubError;
use labhub_domain::id::{LaboratoryId, MaterialId};
use labhub_domain::material::Material;

use crate::error::StorageError;
use crate::row::{decode, decode_timestamp, encode_timestamp};

/// Wrapper for converting database rows into domain [`Material`].
struct Wrapper(Material);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Material> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let laboratory_id: String = row.try_get("laboratory_id")?;
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Material {
            id: decode(&id)?,
            laboratory_id: decode(&laboratory_id)?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            kind: row.try_get("kind")?,
            hourly_rate: row.try_get("hourly_rate")?,
            is_free: row.try_get("is_free")?,
            status: decode(&status)?,
            cover_image_path: row.try_get("cover_image_path")?,
            image_url: row.try_get("image_url")?,
            created_at: decode_timestamp(&created_at)?,
            updated_at: decode_timestamp(&updated_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO materials (id, laboratory_id, name, description, kind, hourly_rate, is_free, status,
                           cover_image_path, image_url, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM materials WHERE id = ?";

const SELECT_BY_LABORATORY: &str =
    "SELECT * FROM materials WHERE laboratory_id = ? ORDER BY created_at, rowid";

const SELECT_BY_IDS: &str = r"
    SELECT * FROM materials
    WHERE id IN (SELECT value FROM json_each(?))
    ORDER BY created_at, rowid
";

const UPDATE: &str = r"
    UPDATE materials
    SET name = ?, description = ?, kind = ?, hourly_rate = ?, is_free = ?, status = ?,
        cover_image_path = ?, image_url = ?, updated_at = ?
    WHERE id = ?
";

const DELETE_BY_ID: &str = "DELETE FROM materials WHERE id = ?";

/// `SQLite`-backed material repository.
#[derive(Clone)]
pub struct SqliteMaterialRepository {
    pool: SqlitePool,
}

impl SqliteMaterialRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl MaterialRepository for SqliteMaterialRepository {
    fn create(
        &self,
        material: Material,
    ) -> impl Future<Output = Result<Material, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(material.id.to_string())
                .bind(material.laboratory_id.to_string())
                .bind(&material.name)
                .bind(&material.description)
                .bind(&material.kind)
                .bind(material.hourly_rate)
                .bind(material.is_free)
                .bind(material.status.as_str())
                .bind(&material.cover_image_path)
                .bind(&material.image_url)
                .bind(encode_timestamp(&material.created_at))
                .bind(encode_timestamp(&material.updated_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(material)
        }
    }

    fn get_by_id(
        &self,
        id: MaterialId,
    ) -> impl Future<Output = Result<Option<Material>, LabHubError>> + Send {
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

    fn find_by_laboratory(
        &self,
        laboratory_id: LaboratoryId,
    ) -> impl Future<Output = Result<Vec<Material>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_LABORATORY)
                .bind(laboratory_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn find_by_ids(
        &self,
        ids: &[MaterialId],
    ) -> impl Future<Output = Result<Vec<Material>, LabHubError>> + Send {
        let pool = self.pool.clone();
        let ids = serde_json::to_string(ids);
        async move {
            let ids = ids.map_err(StorageError::from)?;
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_IDS)
                .bind(ids)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        material: Material,
    ) -> impl Future<Output = Result<Material, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&material.name)
                .bind(&material.description)
                .bind(&material.kind)
                .bind(material.hourly_rate)
                .bind(material.is_free)
                .bind(material.status.as_str())
                .bind(&material.cover_image_path)
                .bind(&material.image_url)
                .bind(encode_timestamp(&material.updated_at))
                .bind(material.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(material)
        }
    }

    fn delete(&self, id: MaterialId) -> impl Future<Output = Result<bool, LabHubError>> + Send {
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
