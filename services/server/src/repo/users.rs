use sqlx::PgPool;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query_as!(
        UserRow,
        "SELECT id, username, password_hash, role FROM users WHERE username = $1",
        username
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Resolves a user-id for reservation validation against the DB user table.
pub async fn exists(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let row = sqlx::query!(
        r#"SELECT EXISTS(SELECT 1 FROM users WHERE id = $1) AS "exists!""#,
        user_id
    )
    .fetch_one(pool)
    .await?;
    Ok(row.exists)
}

pub async fn students_of_teacher(pool: &PgPool, teacher_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows = sqlx::query_scalar!(
        "SELECT student_id FROM teacher_student WHERE teacher_id = $1",
        teacher_id
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
