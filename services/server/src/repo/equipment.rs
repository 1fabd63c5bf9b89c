use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct EquipmentRow {
    pub id: String,
    pub name: String,
    pub r#type: String,
    pub location: String,
    pub place_id: Option<String>,
    pub registration_state: String,
    pub status: String,
    pub power_state: String,
    pub threshold_watts: Option<f64>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub energy_total: f64,
}

/// Loads the full roster at startup into the in-memory catalog.
pub async fn load_all(pool: &PgPool) -> Result<Vec<EquipmentRow>, sqlx::Error> {
    let rows = sqlx::query_as!(
        EquipmentRow,
        r#"SELECT id, name, type AS "r#type", location, place_id, registration_state,
                  status, power_state, threshold_watts, last_heartbeat, energy_total
           FROM equipment"#
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn set_status(
    pool: &PgPool,
    id: &str,
    status: &str,
    power_state: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "UPDATE equipment SET status = $1, power_state = $2, last_heartbeat = now() WHERE id = $3",
        status,
        power_state,
        id
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_power_state(pool: &PgPool, id: &str, power_state: &str) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "UPDATE equipment SET power_state = $1 WHERE id = $2",
        power_state,
        id
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn touch_heartbeat(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query!("UPDATE equipment SET last_heartbeat = now() WHERE id = $1", id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_threshold(pool: &PgPool, id: &str, watts: f64) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "UPDATE equipment SET threshold_watts = $1 WHERE id = $2",
        watts,
        id
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn add_energy(pool: &PgPool, id: &str, watts: f64) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "UPDATE equipment SET energy_total = energy_total + $1 WHERE id = $2",
        watts,
        id
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Forces every device offline/off for the startup-cleanup and shutdown
/// reset-all passes.
pub async fn reset_all_offline(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query!("UPDATE equipment SET status = 'offline', power_state = 'off'")
        .execute(pool)
        .await?;
    Ok(())
}
