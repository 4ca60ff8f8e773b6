use sqlx::PgPool;
use uuid::Uuid;

/// Like a post. Idempotent: a duplicate like is a no-op.
pub async fn create_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO likes (post_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a like. Idempotent: unliking an unliked post is a no-op.
pub async fn delete_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// (post_id, liker_id) pairs for a batch of posts (feed population).
pub async fn likes_for_posts(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
    sqlx::query_as::<_, (Uuid, Uuid)>(
        "SELECT post_id, user_id FROM likes WHERE post_id = ANY($1) ORDER BY created_at",
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await
}

pub async fn count_by_post(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await
}
