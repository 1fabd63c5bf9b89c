use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Row cap for energy aggregation queries.
pub const ENERGY_QUERY_ROW_CAP: i64 = 500;

pub struct EnergyBucket {
    pub equipment_id: String,
    pub bucket_start: DateTime<Utc>,
    pub total_watts: f64,
}

pub async fn insert(pool: &PgPool, equipment_id: &str, watts: f64) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "INSERT INTO power_log (equipment_id, watts) VALUES ($1, $2)",
        equipment_id,
        watts
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Hourly-bucketed wattage totals for one device, most recent first.
pub async fn buckets_for_device(
    pool: &PgPool,
    equipment_id: &str,
) -> Result<Vec<EnergyBucket>, sqlx::Error> {
    let rows = sqlx::query!(
        r#"SELECT equipment_id, date_trunc('hour', recorded_at) AS "bucket_start!", SUM(watts) AS "total_watts!"
           FROM power_log
           WHERE equipment_id = $1
           GROUP BY equipment_id, bucket_start
           ORDER BY bucket_start DESC
           LIMIT $2"#,
        equipment_id,
        ENERGY_QUERY_ROW_CAP
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| EnergyBucket {
            equipment_id: r.equipment_id,
            bucket_start: r.bucket_start,
            total_watts: r.total_watts,
        })
        .collect())
}

/// Hourly-bucketed wattage totals across every device.
pub async fn buckets_all(pool: &PgPool) -> Result<Vec<EnergyBucket>, sqlx::Error> {
    let rows = sqlx::query!(
        r#"SELECT equipment_id, date_trunc('hour', recorded_at) AS "bucket_start!", SUM(watts) AS "total_watts!"
           FROM power_log
           GROUP BY equipment_id, bucket_start
           ORDER BY bucket_start DESC
           LIMIT $1"#,
        ENERGY_QUERY_ROW_CAP
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| EnergyBucket {
            equipment_id: r.equipment_id,
            bucket_start: r.bucket_start,
            total_watts: r.total_watts,
        })
        .collect())
}
