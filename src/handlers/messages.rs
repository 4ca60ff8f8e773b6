/// Direct messaging: conversation find-or-create, message persistence and
/// fire-and-forget real-time delivery.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::{conversation_repo, message_repo, user_repo};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::realtime::RealtimeEvent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// POST /api/v1/message/send/{receiver_id}
pub async fn send_message(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    req: web::Json<SendMessageRequest>,
) -> Result<HttpResponse> {
    let receiver_id = path.into_inner();

    if receiver_id == user.0 {
        return Err(AppError::Validation(
            "You cannot message yourself".to_string(),
        ));
    }

    let content = req.message.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    if !user_repo::exists(&state.db, receiver_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    // The unique constraint on the normalized pair makes this race-free:
    // two concurrent first messages land in the same conversation.
    let conversation = conversation_repo::find_or_create(&state.db, user.0, receiver_id).await?;

    let message =
        message_repo::create_message(&state.db, conversation.id, user.0, receiver_id, content)
            .await?;

    // Push to the receiver if they are online. Delivery is best-effort; the
    // message is already persisted either way.
    state.registry.push(
        receiver_id,
        &RealtimeEvent::NewMessage {
            message: message.clone(),
        },
    );

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "newMessage": message,
    })))
}

/// GET /api/v1/message/all/{other_id}
pub async fn get_messages(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let other_id = path.into_inner();

    let messages = match conversation_repo::find_by_pair(&state.db, user.0, other_id).await? {
        Some(conversation) => {
            message_repo::messages_for_conversation(&state.db, conversation.id).await?
        }
        None => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "messages": messages,
    })))
}
