/// Follow graph. A relationship is a single row, so the follower and
/// following views can never disagree.
use sqlx::PgPool;
use uuid::Uuid;

pub async fn is_following(
    pool: &PgPool,
    follower_id: Uuid,
    following_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(pool)
    .await
}

pub async fn follow(pool: &PgPool, follower_id: Uuid, following_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO follows (follower_id, following_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(follower_id)
    .bind(following_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn unfollow(pool: &PgPool, follower_id: Uuid, following_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Users who follow the given user.
pub async fn follower_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>("SELECT follower_id FROM follows WHERE following_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Users the given user follows.
pub async fn following_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>("SELECT following_id FROM follows WHERE follower_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await
}
