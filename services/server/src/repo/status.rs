use sqlx::PgPool;

pub async fn insert(
    pool: &PgPool,
    equipment_id: &str,
    status: &str,
    power_state: &str,
    extra: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query!(
        "INSERT INTO status_log (equipment_id, status, power_state, extra) VALUES ($1, $2, $3, $4)",
        equipment_id,
        status,
        power_state,
        extra
    )
    .execute(pool)
    .await?;
    Ok(())
}
