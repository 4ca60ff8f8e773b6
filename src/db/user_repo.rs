/// User repository - all database operations on the users table
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuthorSummary, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, profile_picture, bio, gender, \
     is_verified, verification_code, verification_expires, created_at, updated_at";

/// Create a new unverified user with a pending verification code.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    verification_code: &str,
    verification_expires: DateTime<Utc>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, email, password_hash, verification_code, verification_expires)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(email.to_lowercase())
    .bind(password_hash)
    .bind(verification_code)
    .bind(verification_expires)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email.to_lowercase())
    .fetch_optional(pool)
    .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Mark a user verified and clear the pending code.
pub async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET is_verified = TRUE, verification_code = NULL, verification_expires = NULL,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove an unverified account (failed or expired verification).
pub async fn delete_unverified(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE email = $1 AND is_verified = FALSE")
        .bind(email.to_lowercase())
        .execute(pool)
        .await?;

    Ok(())
}

/// Store a fresh OTP and expiry (password reset flow).
pub async fn set_verification_code(
    pool: &PgPool,
    id: Uuid,
    code: &str,
    expires: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET verification_code = $2, verification_expires = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(expires)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace the password hash and clear any pending code.
pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2, verification_code = NULL, verification_expires = NULL,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply a profile edit. Untouched fields keep their current values.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    bio: Option<&str>,
    gender: Option<&str>,
    profile_picture: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET bio = COALESCE($2, bio),
            gender = COALESCE($3, gender),
            profile_picture = COALESCE($4, profile_picture),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(bio)
    .bind(gender)
    .bind(profile_picture)
    .fetch_one(pool)
    .await
}

/// Verified users other than the caller, newest first.
pub async fn suggested_users(
    pool: &PgPool,
    caller: Uuid,
    limit: i64,
) -> Result<Vec<AuthorSummary>, sqlx::Error> {
    sqlx::query_as::<_, AuthorSummary>(
        r#"
        SELECT id, username, profile_picture
        FROM users
        WHERE id <> $1 AND is_verified = TRUE
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(caller)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Author projections for a batch of users (post population).
pub async fn author_summaries(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<AuthorSummary>, sqlx::Error> {
    sqlx::query_as::<_, AuthorSummary>(
        "SELECT id, username, profile_picture FROM users WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}

/// Case-insensitive username prefix search.
pub async fn search_by_username_prefix(
    pool: &PgPool,
    prefix: &str,
    limit: i64,
) -> Result<Vec<AuthorSummary>, sqlx::Error> {
    // Escape LIKE metacharacters so the prefix is matched literally.
    let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");

    sqlx::query_as::<_, AuthorSummary>(
        r#"
        SELECT id, username, profile_picture
        FROM users
        WHERE username ILIKE $1 || '%'
        ORDER BY username
        LIMIT $2
        "#,
    )
    .bind(escaped)
    .bind(limit)
    .fetch_all(pool)
    .await
}
