use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct AlarmRow {
    pub id: i64,
    pub equipment_id: String,
    pub severity: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

pub async fn insert(
    pool: &PgPool,
    equipment_id: &str,
    severity: &str,
    message: &str,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query!(
        "INSERT INTO alarms (equipment_id, severity, message) VALUES ($1, $2, $3) RETURNING id",
        equipment_id,
        severity,
        message
    )
    .fetch_one(pool)
    .await?;
    Ok(row.id)
}

pub async fn list_unacknowledged(pool: &PgPool) -> Result<Vec<AlarmRow>, sqlx::Error> {
    let rows = sqlx::query_as!(
        AlarmRow,
        r#"SELECT id, equipment_id, severity, message, created_at
           FROM alarms WHERE NOT acknowledged ORDER BY created_at DESC"#
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Marks an alarm acknowledged. Returns `false` if no such alarm exists.
pub async fn acknowledge(pool: &PgPool, alarm_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query!(
        "UPDATE alarms SET acknowledged = true WHERE id = $1",
        alarm_id
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
