//! Image reference maintenance

use serde::Serialize;
use shared::images::absolutize_all;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// Image service
#[derive(Clone)]
pub struct ImageService {
    db: PgPool,
    public_base_url: String,
}

/// Outcome of an image URL migration run
#[derive(Debug, Serialize)]
pub struct ImageMigrationReport {
    pub public_base_url: String,
    pub rows_scanned: usize,
    pub rows_updated: usize,
}

impl ImageService {
    pub fn new(db: PgPool, public_base_url: String) -> Self {
        Self {
            db,
            public_base_url,
        }
    }

    /// Rewrite stored relative image references to absolute URLs.
    ///
    /// Running it again finds nothing left to change.
    pub async fn migrate_relative_urls(&self) -> AppResult<ImageMigrationReport> {
        let mut tx = self.db.begin().await?;

        let rows = sqlx::query_as::<_, (Uuid, Vec<String>)>(
            r#"
            SELECT id, images FROM health_logs
            WHERE EXISTS (
                SELECT 1 FROM unnest(images) AS img WHERE img !~* '^https?://'
            )
            FOR UPDATE
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let rows_scanned = rows.len();
        let mut rows_updated = 0;

        for (id, images) in rows {
            let Some(fixed) = absolutize_all(&self.public_base_url, &images) else {
                continue;
            };
            sqlx::query("UPDATE health_logs SET images = $1 WHERE id = $2")
                .bind(&fixed)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            rows_updated += 1;
        }

        tx.commit().await?;

        tracing::info!(rows_scanned, rows_updated, "image URL migration finished");
        Ok(ImageMigrationReport {
            public_base_url: self.public_base_url.clone(),
            rows_scanned,
            rows_updated,
        })
    }
}
