use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Conversation;

/// Normalize an unordered participant pair to (low, high).
pub fn normalize_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Find the conversation for a pair, or create it. The unique constraint on
/// the normalized pair makes this safe under concurrent first messages: both
/// callers converge on the same row.
pub async fn find_or_create(pool: &PgPool, a: Uuid, b: Uuid) -> Result<Conversation, sqlx::Error> {
    let (low, high) = normalize_pair(a, b);

    sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO conversations (participant_low, participant_high)
        VALUES ($1, $2)
        ON CONFLICT (participant_low, participant_high)
            DO UPDATE SET participant_low = conversations.participant_low
        RETURNING id, participant_low, participant_high, created_at
        "#,
    )
    .bind(low)
    .bind(high)
    .fetch_one(pool)
    .await
}

pub async fn find_by_pair(pool: &PgPool, a: Uuid, b: Uuid) -> Result<Option<Conversation>, sqlx::Error> {
    let (low, high) = normalize_pair(a, b);

    sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, participant_low, participant_high, created_at
        FROM conversations
        WHERE participant_low = $1 AND participant_high = $2
        "#,
    )
    .bind(low)
    .bind(high)
    .fetch_optional(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_pair_is_order_insensitive() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(normalize_pair(a, b), normalize_pair(b, a));
    }

    #[test]
    fn normalize_pair_orders_low_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (low, high) = normalize_pair(a, b);
        assert!(low < high);
    }
}
