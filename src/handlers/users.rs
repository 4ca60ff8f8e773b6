/// User profiles, profile edits, discovery and the follow graph.
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{bookmark_repo, follow_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::handlers::read_multipart;
use crate::middleware::UserId;
use crate::models::{User, UserProfile};
use crate::services::image;
use crate::validators;
use crate::AppState;

/// Assemble the sanitized projection with its id lists populated.
pub async fn load_profile(pool: &PgPool, user: &User) -> Result<UserProfile> {
    let (followers, following, posts, bookmarks) = tokio::try_join!(
        follow_repo::follower_ids(pool, user.id),
        follow_repo::following_ids(pool, user.id),
        post_repo::post_ids_by_author(pool, user.id),
        bookmark_repo::bookmarked_post_ids(pool, user.id),
    )?;

    Ok(user.profile(followers, following, posts, bookmarks))
}

/// GET /api/v1/user/{id}/profile
pub async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user = user_repo::find_by_id(&state.db, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let profile = load_profile(&state.db, &user).await?;
    let posts = post_repo::posts_by_author(&state.db, user.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": profile,
        "posts": posts,
    })))
}

/// POST /api/v1/user/profile/edit  (multipart: profilePhoto?, bio?, gender?)
pub async fn edit_profile(
    state: web::Data<AppState>,
    user: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_multipart(payload).await?;

    // Edit forms submit every field; empty ones leave the stored value alone.
    let bio = form.non_empty_text("bio");
    let gender = form.non_empty_text("gender");

    if let Some(gender) = gender {
        if !validators::validate_gender(gender) {
            return Err(AppError::Validation("Invalid gender value".to_string()));
        }
    }

    let picture_url = match form.file("profilePhoto") {
        Some(data) => {
            let data = data.to_vec();
            let optimized = tokio::task::spawn_blocking(move || image::optimize(&data))
                .await
                .map_err(|e| AppError::Internal(format!("image task failed: {e}")))?
                .map_err(|e| AppError::Validation(e.to_string()))?;
            Some(state.storage.upload_image("avatars", optimized).await?)
        }
        None => None,
    };

    if user_repo::find_by_id(&state.db, user.0).await?.is_none() {
        return Err(AppError::NotFound("User not found.".to_string()));
    }

    let updated = user_repo::update_profile(
        &state.db,
        user.0,
        bio,
        gender,
        picture_url.as_deref(),
    )
    .await?;

    let profile = load_profile(&state.db, &updated).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated.",
        "user": profile,
    })))
}

/// GET /api/v1/user/suggested
pub async fn suggested_users(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let users = user_repo::suggested_users(&state.db, user.0, 20).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "users": users,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/user/search?q=prefix
pub async fn search_users(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    if query.q.trim().is_empty() {
        return Err(AppError::Validation("Search query is required".to_string()));
    }

    let users = user_repo::search_by_username_prefix(&state.db, query.q.trim(), 20).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "users": users,
    })))
}

/// POST /api/v1/user/followorunfollow/{id}
///
/// Toggles on current membership. The relationship is a single row, so the
/// follower and following views can never diverge.
pub async fn follow_or_unfollow(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let target_id = path.into_inner();

    if target_id == user.0 {
        return Err(AppError::Validation(
            "You cannot follow/unfollow yourself".to_string(),
        ));
    }

    if !user_repo::exists(&state.db, target_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if follow_repo::is_following(&state.db, user.0, target_id).await? {
        follow_repo::unfollow(&state.db, user.0, target_id).await?;
        Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Unfollowed successfully",
        })))
    } else {
        follow_repo::follow(&state.db, user.0, target_id).await?;
        Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Followed successfully",
        })))
    }
}
