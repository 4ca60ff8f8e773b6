/// Post lifecycle: create, feed, likes, comments, bookmarks, delete.
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::{bookmark_repo, comment_repo, like_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::handlers::read_multipart;
use crate::middleware::UserId;
use crate::models::{AuthorSummary, CommentView, Post, PostView};
use crate::realtime::RealtimeEvent;
use crate::services::image;
use crate::AppState;

/// Populate a batch of posts with authors, like lists and comments.
async fn populate_posts(pool: &PgPool, posts: Vec<Post>) -> Result<Vec<PostView>> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let mut author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let (authors, likes, comments) = tokio::try_join!(
        user_repo::author_summaries(pool, &author_ids),
        like_repo::likes_for_posts(pool, &post_ids),
        comment_repo::comments_for_posts(pool, &post_ids),
    )?;

    let authors: HashMap<Uuid, AuthorSummary> =
        authors.into_iter().map(|a| (a.id, a)).collect();

    let mut likes_by_post: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (post_id, user_id) in likes {
        likes_by_post.entry(post_id).or_default().push(user_id);
    }

    let mut comments_by_post: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for comment in comments {
        comments_by_post
            .entry(comment.post_id)
            .or_default()
            .push(comment);
    }

    posts
        .into_iter()
        .map(|post| {
            let author = authors
                .get(&post.author_id)
                .cloned()
                .ok_or_else(|| AppError::Internal("post author missing".to_string()))?;

            Ok(PostView {
                id: post.id,
                caption: post.caption,
                image_url: post.image_url,
                author,
                likes: likes_by_post.remove(&post.id).unwrap_or_default(),
                comments: comments_by_post.remove(&post.id).unwrap_or_default(),
                created_at: post.created_at,
            })
        })
        .collect()
}

/// POST /api/v1/post/addpost  (multipart: image required, caption?)
pub async fn add_post(
    state: web::Data<AppState>,
    user: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_multipart(payload).await?;

    let image_data = form
        .file("image")
        .ok_or_else(|| AppError::Validation("Image required".to_string()))?
        .to_vec();
    let caption = form.text("caption").unwrap_or_default().to_string();

    let optimized = tokio::task::spawn_blocking(move || image::optimize(&image_data))
        .await
        .map_err(|e| AppError::Internal(format!("image task failed: {e}")))?
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let image_url = state.storage.upload_image("posts", optimized).await?;
    let post = post_repo::create_post(&state.db, &caption, &image_url, user.0).await?;

    let view = populate_posts(&state.db, vec![post]).await?.remove(0);

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "New post added successfully",
        "post": view,
    })))
}

/// GET /api/v1/post/all — feed, newest first.
pub async fn get_all_posts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = post_repo::all_posts(&state.db).await?;
    let views = populate_posts(&state.db, posts).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "posts": views,
    })))
}

/// GET /api/v1/post/userpost/all — the caller's posts.
pub async fn get_user_posts(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let posts = post_repo::posts_by_author(&state.db, user.0).await?;
    let views = populate_posts(&state.db, posts).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "posts": views,
    })))
}

async fn require_post(pool: &PgPool, id: Uuid) -> Result<Post> {
    post_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

/// POST /api/v1/post/{id}/like — idempotent.
pub async fn like_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = require_post(&state.db, path.into_inner()).await?;

    like_repo::create_like(&state.db, post.id, user.0).await?;

    // Notify the author in real time, but never about their own likes.
    if post.author_id != user.0 {
        state.registry.push(
            post.author_id,
            &RealtimeEvent::Notification {
                kind: "like".to_string(),
                user_id: user.0,
                post_id: post.id,
            },
        );
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post liked",
    })))
}

/// POST /api/v1/post/{id}/dislike — idempotent unlike.
pub async fn dislike_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = require_post(&state.db, path.into_inner()).await?;

    like_repo::delete_like(&state.db, post.id, user.0).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post disliked",
    })))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/v1/post/{id}/comment
pub async fn add_comment(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    req: web::Json<AddCommentRequest>,
) -> Result<HttpResponse> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Text is required".to_string()));
    }

    let post = require_post(&state.db, path.into_inner()).await?;
    let comment = comment_repo::create_comment(&state.db, post.id, user.0, text).await?;

    let author = user_repo::find_by_id(&state.db, user.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let view = CommentView {
        id: comment.id,
        post_id: comment.post_id,
        text: comment.text,
        author: author.author_summary(),
        created_at: comment.created_at,
    };

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment added",
        "comment": view,
    })))
}

/// GET /api/v1/post/{id}/comment/all
pub async fn get_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = require_post(&state.db, path.into_inner()).await?;
    let comments = comment_repo::comments_for_post(&state.db, post.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "comments": comments,
    })))
}

/// POST /api/v1/post/{id}/bookmark — toggle.
pub async fn toggle_bookmark(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = require_post(&state.db, path.into_inner()).await?;

    if bookmark_repo::is_bookmarked(&state.db, user.0, post.id).await? {
        bookmark_repo::remove_bookmark(&state.db, user.0, post.id).await?;
        Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "type": "unsaved",
            "message": "Post removed from bookmark",
        })))
    } else {
        bookmark_repo::add_bookmark(&state.db, user.0, post.id).await?;
        Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "type": "saved",
            "message": "Post bookmarked",
        })))
    }
}

/// DELETE /api/v1/post/delete/{id} — author only; comments cascade.
pub async fn delete_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = require_post(&state.db, path.into_inner()).await?;

    if post.author_id != user.0 {
        return Err(AppError::Authorization);
    }

    post_repo::delete_post(&state.db, post.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post deleted",
    })))
}
