use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture: String,
    pub bio: String,
    pub gender: Option<String>,
    pub is_verified: bool,
    pub verification_code: Option<String>,
    pub verification_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub caption: String,
    pub image_url: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_low: Uuid,
    pub participant_high: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Sanitized user projection returned by the API (never exposes the hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_picture: String,
    pub bio: String,
    pub gender: Option<String>,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub posts: Vec<Uuid>,
    pub bookmarks: Vec<Uuid>,
}

/// Minimal author projection embedded in posts and comments.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub profile_picture: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub author: AuthorSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub caption: String,
    pub image_url: String,
    pub author: AuthorSummary,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(
        &self,
        followers: Vec<Uuid>,
        following: Vec<Uuid>,
        posts: Vec<Uuid>,
        bookmarks: Vec<Uuid>,
    ) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            profile_picture: self.profile_picture.clone(),
            bio: self.bio.clone(),
            gender: self.gender.clone(),
            followers,
            following,
            posts,
            bookmarks,
        }
    }

    pub fn author_summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            username: self.username.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}
