use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct ReservationRow {
    pub id: i64,
    pub place_id: String,
    pub user_id: i64,
    pub purpose: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
}

/// True if any non-rejected reservation for `place_id` overlaps
/// `[start, end)`.
pub async fn has_overlap(
    pool: &PgPool,
    place_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query!(
        r#"SELECT EXISTS(
               SELECT 1 FROM reservations
               WHERE place_id = $1 AND status <> 'rejected'
                 AND start_time < $3 AND end_time > $2
           ) AS "overlap!""#,
        place_id,
        start,
        end
    )
    .fetch_one(pool)
    .await?;
    Ok(row.overlap)
}

pub async fn insert(
    pool: &PgPool,
    place_id: &str,
    user_id: i64,
    purpose: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query!(
        r#"INSERT INTO reservations (place_id, user_id, purpose, start_time, end_time, status)
           VALUES ($1, $2, $3, $4, $5, 'pending') RETURNING id"#,
        place_id,
        user_id,
        purpose,
        start,
        end
    )
    .fetch_one(pool)
    .await?;
    Ok(row.id)
}

/// admin sees every reservation; otherwise own plus (for teachers)
/// supervised students' reservations. `place_id = None` means "all places".
pub async fn list_for_viewer(
    pool: &PgPool,
    place_id: Option<&str>,
    viewer_user_id: i64,
    viewer_role: &str,
) -> Result<Vec<ReservationRow>, sqlx::Error> {
    let visible_user_ids: Vec<i64> = if viewer_role == "admin" {
        Vec::new() // empty + is_admin flag below means "no filter"
    } else if viewer_role == "teacher" {
        let mut ids = crate::repo::users::students_of_teacher(pool, viewer_user_id).await?;
        ids.push(viewer_user_id);
        ids
    } else {
        vec![viewer_user_id]
    };

    let rows = sqlx::query_as!(
        ReservationRow,
        r#"SELECT id, place_id, user_id, purpose, start_time, end_time, status
           FROM reservations
           WHERE ($1::text IS NULL OR place_id = $1)
             AND ($2 OR user_id = ANY($3))
           ORDER BY start_time DESC"#,
        place_id,
        viewer_role == "admin",
        &visible_user_ids
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Updates a reservation's status by (id, place_id). Returns `false` if no
/// matching row exists.
pub async fn set_status(
    pool: &PgPool,
    reservation_id: i64,
    place_id: &str,
    status: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query!(
        "UPDATE reservations SET status = $1 WHERE id = $2 AND place_id = $3",
        status,
        reservation_id,
        place_id
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
