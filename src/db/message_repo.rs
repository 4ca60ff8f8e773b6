use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Message;

pub async fn create_message(
    pool: &PgPool,
    conversation_id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: &str,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (conversation_id, sender_id, receiver_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, conversation_id, sender_id, receiver_id, content, created_at
        "#,
    )
    .bind(conversation_id)
    .bind(sender_id)
    .bind(receiver_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// Full history of a conversation in insertion order.
pub async fn messages_for_conversation(
    pool: &PgPool,
    conversation_id: Uuid,
) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, sender_id, receiver_id, content, created_at
        FROM messages
        WHERE conversation_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await
}

pub async fn count_for_conversation(pool: &PgPool, conversation_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
        .bind(conversation_id)
        .fetch_one(pool)
        .await
}
