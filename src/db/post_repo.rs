use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Post;

pub async fn create_post(
    pool: &PgPool,
    caption: &str,
    image_url: &str,
    author_id: Uuid,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (caption, image_url, author_id)
        VALUES ($1, $2, $3)
        RETURNING id, caption, image_url, author_id, created_at
        "#,
    )
    .bind(caption)
    .bind(image_url)
    .bind(author_id)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "SELECT id, caption, image_url, author_id, created_at FROM posts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Feed: every post, newest first.
pub async fn all_posts(pool: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, caption, image_url, author_id, created_at
        FROM posts
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn posts_by_author(pool: &PgPool, author_id: Uuid) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, caption, image_url, author_id, created_at
        FROM posts
        WHERE author_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(author_id)
    .fetch_all(pool)
    .await
}

pub async fn post_ids_by_author(pool: &PgPool, author_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM posts WHERE author_id = $1 ORDER BY created_at DESC",
    )
    .bind(author_id)
    .fetch_all(pool)
    .await
}

/// Delete a post; comments, likes and bookmarks cascade via FK.
pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
