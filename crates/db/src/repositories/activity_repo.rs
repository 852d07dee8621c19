//! Repository for the `activities` table.

use sqlx::{PgPool, Postgres, Transaction};

use logbook_core::activity::{ActivityUpdate, NewActivity};
use logbook_core::pagination::{clamp_limit, clamp_page, page_offset};
use logbook_core::types::ActivityId;

use crate::models::activity::Activity;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, author, date, title, category, start_time, end_time, \
                        work_mode, location, description, proof, created_at, updated_at";

/// A failed bulk insert, carrying the 0-based index of the failing item.
/// The surrounding transaction is rolled back, so no rows persist.
#[derive(Debug, thiserror::Error)]
#[error("bulk insert failed at item {index}: {source}")]
pub struct BulkInsertError {
    pub index: usize,
    #[source]
    pub source: sqlx::Error,
}

/// Provides CRUD operations for activities.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a single activity, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewActivity) -> Result<Activity, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let activity = Self::insert(&mut tx, input).await?;
        tx.commit().await?;
        Ok(activity)
    }

    /// Insert a batch of activities inside one transaction.
    ///
    /// All-or-nothing: the first failing insert aborts the batch and the
    /// error reports its index. Partial application is not an outcome.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[NewActivity],
    ) -> Result<Vec<Activity>, BulkInsertError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|source| BulkInsertError { index: 0, source })?;

        let mut created = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            match Self::insert(&mut tx, input).await {
                Ok(activity) => created.push(activity),
                Err(source) => return Err(BulkInsertError { index, source }),
            }
        }

        tx.commit()
            .await
            .map_err(|source| BulkInsertError { index: 0, source })?;
        Ok(created)
    }

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        input: &NewActivity,
    ) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities
                (author, date, title, category, start_time, end_time,
                 work_mode, location, description, proof)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(&input.author)
            .bind(input.date)
            .bind(&input.title)
            .bind(input.category.as_str())
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.work_mode.as_str())
            .bind(&input.location)
            .bind(&input.description)
            .bind(&input.proof)
            .fetch_one(&mut **tx)
            .await
    }

    /// Count all activities owned by an author.
    pub async fn count_by_author(pool: &PgPool, author: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE author = $1")
            .bind(author)
            .fetch_one(pool)
            .await
    }

    /// List an author's activities, newest first, for a 1-based page.
    ///
    /// A page beyond the last returns an empty vec, not an error.
    pub async fn list_by_author(
        pool: &PgPool,
        author: &str,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let limit = clamp_limit(limit);
        let page = clamp_page(page);
        let offset = page_offset(page, limit);

        let query = format!(
            "SELECT {COLUMNS} FROM activities
             WHERE author = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(author)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List all of an author's activities, newest first (CSV export).
    pub async fn list_all_by_author(
        pool: &PgPool,
        author: &str,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities
             WHERE author = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(author)
            .fetch_all(pool)
            .await
    }

    /// Find an activity by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: ActivityId,
    ) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update, returning the updated row.
    ///
    /// Unset fields keep their current value (COALESCE). Returns `None`
    /// when no row with the given `id` exists. Last write wins; there is
    /// no optimistic-concurrency check.
    pub async fn update(
        pool: &PgPool,
        id: ActivityId,
        input: &ActivityUpdate,
    ) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!(
            "UPDATE activities SET
                author = COALESCE($2, author),
                date = COALESCE($3, date),
                title = COALESCE($4, title),
                category = COALESCE($5, category),
                start_time = COALESCE($6, start_time),
                end_time = COALESCE($7, end_time),
                work_mode = COALESCE($8, work_mode),
                location = COALESCE($9, location),
                description = COALESCE($10, description),
                proof = COALESCE($11, proof),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .bind(&input.author)
            .bind(input.date)
            .bind(&input.title)
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.work_mode.map(|m| m.as_str()))
            .bind(&input.location)
            .bind(&input.description)
            .bind(&input.proof)
            .fetch_optional(pool)
            .await
    }

    /// Delete an activity, returning its proof reference for file cleanup.
    ///
    /// `None` means no such row; `Some(None)` means the row existed but
    /// had no proof attached.
    pub async fn delete(
        pool: &PgPool,
        id: ActivityId,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        sqlx::query_scalar("DELETE FROM activities WHERE id = $1 RETURNING proof")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
