use sqlx::PgPool;

pub struct PlaceRow {
    pub id: String,
    pub name: String,
    pub equipment_ids: Vec<String>,
}

pub async fn list_with_equipment(pool: &PgPool) -> Result<Vec<PlaceRow>, sqlx::Error> {
    let places = sqlx::query!("SELECT id, name FROM places ORDER BY id")
        .fetch_all(pool)
        .await?;

    let mut out = Vec::with_capacity(places.len());
    for place in places {
        let equipment_ids = sqlx::query_scalar!(
            "SELECT equipment_id FROM place_equipment WHERE place_id = $1 ORDER BY equipment_id",
            place.id
        )
        .fetch_all(pool)
        .await?;
        out.push(PlaceRow {
            id: place.id,
            name: place.name,
            equipment_ids,
        });
    }
    Ok(out)
}
