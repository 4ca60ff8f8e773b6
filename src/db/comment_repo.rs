use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuthorSummary, Comment, CommentView};

pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    author_id: Uuid,
    text: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, author_id, text)
        VALUES ($1, $2, $3)
        RETURNING id, post_id, author_id, text, created_at
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .fetch_one(pool)
    .await
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    text: String,
    created_at: chrono::DateTime<chrono::Utc>,
    author_id: Uuid,
    author_username: String,
    author_profile_picture: String,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        CommentView {
            id: row.id,
            post_id: row.post_id,
            text: row.text,
            author: AuthorSummary {
                id: row.author_id,
                username: row.author_username,
                profile_picture: row.author_profile_picture,
            },
            created_at: row.created_at,
        }
    }
}

/// Comments for one post with their authors populated, newest first.
pub async fn comments_for_post(pool: &PgPool, post_id: Uuid) -> Result<Vec<CommentView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.post_id, c.text, c.created_at,
               u.id AS author_id, u.username AS author_username,
               u.profile_picture AS author_profile_picture
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CommentView::from).collect())
}

/// Comments for a batch of posts (feed population), newest first per post.
pub async fn comments_for_posts(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<Vec<CommentView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.post_id, c.text, c.created_at,
               u.id AS author_id, u.username AS author_username,
               u.profile_picture AS author_profile_picture
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ANY($1)
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CommentView::from).collect())
}
