use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{ClockInRecord, Shift};
use crate::periods::format_duration_label;

/// Row shape for the shift list join.
#[derive(sqlx::FromRow)]
struct ShiftRow {
    shift_id: Uuid,
    clock_in: DateTime<Utc>,
    clock_out: Option<DateTime<Utc>>,
    project_id: Option<Uuid>,
    project_name: Option<String>,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        let duration_secs = row
            .clock_out
            .map(|out| (out - row.clock_in).num_seconds());
        Shift {
            shift_id: row.shift_id,
            clock_in: row.clock_in,
            clock_out: row.clock_out,
            project_id: row.project_id,
            project_name: row.project_name,
            duration_secs,
            duration: duration_secs.map(format_duration_label),
        }
    }
}

/// Serializes ledger writes for one user within the current transaction.
///
/// The open-shift invariant spans two tables, so it cannot be a schema
/// constraint; the advisory lock makes the check-then-insert single-writer.
async fn lock_user_ledger(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Finds the user's open shift, if any: the latest clock-in with no
/// clock-out sharing its shift id.
async fn find_open_shift(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT ci.shift_id
        FROM clock_in_records ci
        LEFT JOIN clock_out_records co ON co.shift_id = ci.shift_id
        WHERE ci.user_id = $1 AND co.id IS NULL
        ORDER BY ci.timestamp DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Opens a new shift for the user.
///
/// Rejects the request when an open shift already exists - at most one open
/// shift per user at a time.
///
/// # Returns
///
/// The freshly generated shift id.
pub async fn clock_in(
    pool: &PgPool,
    user_id: Uuid,
    timestamp: DateTime<Utc>,
) -> Result<Uuid, ApiError> {
    let mut tx = pool.begin().await?;
    lock_user_ledger(&mut tx, user_id).await?;

    if find_open_shift(&mut tx, user_id).await?.is_some() {
        return Err(ApiError::invalid("already clocked in to an open shift"));
    }

    let shift_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO clock_in_records (user_id, shift_id, timestamp) VALUES ($1, $2, $3)",
    )
    .bind(user_id)
    .bind(shift_id)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("User {} clocked in, shift {}", user_id, shift_id);
    Ok(shift_id)
}

/// Closes the given shift.
///
/// Upserts the clock-out leg, copying the clock-in's project tag so the two
/// legs stay consistent. Rejects timestamps at or before the clock-in.
pub async fn clock_out(
    pool: &PgPool,
    user_id: Uuid,
    shift_id: Uuid,
    timestamp: DateTime<Utc>,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    let clock_in = sqlx::query_as::<_, ClockInRecord>(
        r#"
        SELECT id, user_id, shift_id, project_id, timestamp, created_at
        FROM clock_in_records
        WHERE shift_id = $1 AND user_id = $2
        "#,
    )
    .bind(shift_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("shift"))?;

    if timestamp <= clock_in.timestamp {
        return Err(ApiError::invalid("clock-out must be after clock-in"));
    }

    sqlx::query(
        r#"
        INSERT INTO clock_out_records (user_id, shift_id, project_id, timestamp)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (shift_id)
        DO UPDATE SET timestamp = EXCLUDED.timestamp
        "#,
    )
    .bind(user_id)
    .bind(shift_id)
    .bind(clock_in.project_id)
    .bind(timestamp)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("User {} clocked out of shift {}", user_id, shift_id);
    Ok(())
}

/// Current open-shift state for the user.
///
/// Open means a clock-in with no clock-out sharing the same shift id.
pub async fn shift_status(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<ClockInRecord>, ApiError> {
    let open = sqlx::query_as::<_, ClockInRecord>(
        r#"
        SELECT ci.id, ci.user_id, ci.shift_id, ci.project_id, ci.timestamp, ci.created_at
        FROM clock_in_records ci
        LEFT JOIN clock_out_records co ON co.shift_id = ci.shift_id
        WHERE ci.user_id = $1 AND co.id IS NULL
        ORDER BY ci.timestamp DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(open)
}

/// Full shift list for the user, newest first, with project names resolved.
pub async fn list_shifts(pool: &PgPool, user_id: Uuid) -> Result<Vec<Shift>, ApiError> {
    let rows = sqlx::query_as::<_, ShiftRow>(
        r#"
        SELECT
            ci.shift_id,
            ci.timestamp AS clock_in,
            co.timestamp AS clock_out,
            ci.project_id,
            p.name AS project_name
        FROM clock_in_records ci
        LEFT JOIN clock_out_records co ON co.shift_id = ci.shift_id
        LEFT JOIN projects p ON p.id = ci.project_id
        WHERE ci.user_id = $1
        ORDER BY ci.timestamp DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Shift::from).collect())
}

/// Overwrites one or both timestamps of a shift.
///
/// Creates the clock-out leg when the shift was still open. The resulting
/// pair must keep clock-in strictly before clock-out.
pub async fn edit_shift(
    pool: &PgPool,
    user_id: Uuid,
    shift_id: Uuid,
    new_clock_in: Option<DateTime<Utc>>,
    new_clock_out: Option<DateTime<Utc>>,
) -> Result<(), ApiError> {
    if new_clock_in.is_none() && new_clock_out.is_none() {
        return Err(ApiError::invalid(
            "clockInTime or clockOutTime is required",
        ));
    }

    let mut tx = pool.begin().await?;

    let clock_in = sqlx::query_as::<_, ClockInRecord>(
        r#"
        SELECT id, user_id, shift_id, project_id, timestamp, created_at
        FROM clock_in_records
        WHERE shift_id = $1 AND user_id = $2
        "#,
    )
    .bind(shift_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("shift"))?;

    let existing_out = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT timestamp FROM clock_out_records WHERE shift_id = $1 AND user_id = $2",
    )
    .bind(shift_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    // Validate the pair that would result from this edit.
    let effective_in = new_clock_in.unwrap_or(clock_in.timestamp);
    if let Some(effective_out) = new_clock_out.or(existing_out) {
        if effective_in >= effective_out {
            return Err(ApiError::invalid("clock-in must be before clock-out"));
        }
    }

    if let Some(ts) = new_clock_in {
        sqlx::query(
            "UPDATE clock_in_records SET timestamp = $1 WHERE shift_id = $2 AND user_id = $3",
        )
        .bind(ts)
        .bind(shift_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    if let Some(ts) = new_clock_out {
        sqlx::query(
            r#"
            INSERT INTO clock_out_records (user_id, shift_id, project_id, timestamp)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (shift_id)
            DO UPDATE SET timestamp = EXCLUDED.timestamp
            "#,
        )
        .bind(user_id)
        .bind(shift_id)
        .bind(clock_in.project_id)
        .bind(ts)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!("User {} edited shift {}", user_id, shift_id);
    Ok(())
}

/// Removes both legs of a shift.
pub async fn delete_shift(pool: &PgPool, user_id: Uuid, shift_id: Uuid) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM clock_out_records WHERE shift_id = $1 AND user_id = $2")
        .bind(shift_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM clock_in_records WHERE shift_id = $1 AND user_id = $2")
        .bind(shift_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("shift"));
    }

    tx.commit().await?;

    info!("User {} deleted shift {}", user_id, shift_id);
    Ok(())
}

/// Tags (or untags) both legs of a shift with a project.
///
/// The project must belong to the caller; the update hits the clock-in and
/// clock-out rows together so the pair never disagrees.
pub async fn assign_project(
    pool: &PgPool,
    user_id: Uuid,
    shift_id: Uuid,
    project_id: Option<Uuid>,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    let shift_exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM clock_in_records WHERE shift_id = $1 AND user_id = $2",
    )
    .bind(shift_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    if shift_exists == 0 {
        return Err(ApiError::NotFound("shift"));
    }

    if let Some(pid) = project_id {
        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects WHERE id = $1 AND user_id = $2",
        )
        .bind(pid)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if owned == 0 {
            return Err(ApiError::NotFound("project"));
        }
    }

    sqlx::query("UPDATE clock_in_records SET project_id = $1 WHERE shift_id = $2 AND user_id = $3")
        .bind(project_id)
        .bind(shift_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE clock_out_records SET project_id = $1 WHERE shift_id = $2 AND user_id = $3")
        .bind(project_id)
        .bind(shift_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "User {} set project {:?} on shift {}",
        user_id, project_id, shift_id
    );
    Ok(())
}
