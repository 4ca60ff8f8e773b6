/// Registration, email verification, login/logout and password reset.
use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::handlers::users::load_profile;
use crate::security::{hash_password, otp, verify_password};
use crate::validators;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// POST /api/v1/user/register
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Something is missing, please check!".to_string(),
        ));
    }
    if !validators::validate_username(&req.username) {
        return Err(AppError::Validation(
            validators::USERNAME_RULE_MESSAGE.to_string(),
        ));
    }
    if !validators::validate_email(&req.email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if !validators::validate_password(&req.password) {
        return Err(AppError::Validation(
            validators::PASSWORD_RULE_MESSAGE.to_string(),
        ));
    }

    if user_repo::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(AppError::Validation("Try different email".to_string()));
    }
    if user_repo::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Validation("Try different username".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let code = otp::generate_otp();
    let user = user_repo::create_user(
        &state.db,
        &req.username,
        &req.email,
        &password_hash,
        &code,
        otp::expiry_from_now(),
    )
    .await?;

    // Mail delivery must not block or fail the registration; a failed send
    // is logged and the user can re-register after the code expires.
    let email = state.email.clone();
    let to = user.email.clone();
    let username = user.username.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = email.send_verification_code(&to, &username, &code) {
            tracing::warn!(error = %e, "failed to send verification email");
        }
    });

    let profile = load_profile(&state.db, &user).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Account created successfully.",
        "user": profile,
    })))
}

/// POST /api/v1/user/verify-email
pub async fn verify_email(
    state: web::Data<AppState>,
    req: web::Json<VerifyEmailRequest>,
) -> Result<HttpResponse> {
    if req.email.is_empty() || req.otp.is_empty() {
        return Err(AppError::Validation(
            "Email and code are required".to_string(),
        ));
    }

    let user = user_repo::find_by_email(&state.db, &req.email).await?;

    let matched = user.as_ref().is_some_and(|u| {
        !u.is_verified
            && otp::code_matches(
                u.verification_code.as_deref(),
                u.verification_expires,
                &req.otp,
                Utc::now(),
            )
    });

    let Some(user) = user else {
        return Err(AppError::Validation(
            "Invalid or expired code. User removed from database.".to_string(),
        ));
    };

    if !matched {
        // Failed or expired verification removes the unverified account so
        // the email can be registered again.
        user_repo::delete_unverified(&state.db, &req.email).await?;
        return Err(AppError::Validation(
            "Invalid or expired code. User removed from database.".to_string(),
        ));
    }

    user_repo::mark_verified(&state.db, user.id).await?;

    let email = state.email.clone();
    let to = user.email.clone();
    let username = user.username.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = email.send_welcome(&to, &username) {
            tracing::warn!(error = %e, "failed to send welcome email");
        }
    });

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Email verified!",
    })))
}

/// POST /api/v1/user/login
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Something is missing, please check!".to_string(),
        ));
    }

    let user = user_repo::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| AppError::Authentication("Incorrect email or password".to_string()))?;

    if !user.is_verified {
        return Err(AppError::Authentication(
            "Please verify your email before logging in".to_string(),
        ));
    }

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Authentication("Incorrect password".to_string()));
    }

    let token = state.jwt.generate_token(user.id)?;
    let profile = load_profile(&state.db, &user).await?;

    let cookie = Cookie::build(crate::middleware::auth::AUTH_COOKIE, token)
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(state.jwt.ttl_secs()))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": format!("Welcome back {}", profile.username),
        "user": profile,
    })))
}

/// GET /api/v1/user/logout
pub async fn logout() -> Result<HttpResponse> {
    let mut cookie = Cookie::build(crate::middleware::auth::AUTH_COOKIE, "")
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .finish();
    cookie.make_removal();

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "Logged out successfully.",
    })))
}

/// POST /api/v1/user/forgot-password
pub async fn forgot_password(
    state: web::Data<AppState>,
    req: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse> {
    if req.email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    let user = user_repo::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !user.is_verified {
        return Err(AppError::Validation(
            "Account is not verified".to_string(),
        ));
    }

    let code = otp::generate_otp();
    user_repo::set_verification_code(&state.db, user.id, &code, otp::expiry_from_now()).await?;

    let email = state.email.clone();
    let to = user.email.clone();
    let username = user.username.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = email.send_password_reset_code(&to, &username, &code) {
            tracing::warn!(error = %e, "failed to send password reset email");
        }
    });

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "OTP sent to your email",
    })))
}

/// POST /api/v1/user/reset-password
pub async fn reset_password(
    state: web::Data<AppState>,
    req: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    if req.email.is_empty() || req.otp.is_empty() || req.new_password.is_empty() {
        return Err(AppError::Validation(
            "Something is missing, please check!".to_string(),
        ));
    }
    if req.new_password != req.confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    if !validators::validate_password(&req.new_password) {
        return Err(AppError::Validation(
            validators::PASSWORD_RULE_MESSAGE.to_string(),
        ));
    }

    let user = user_repo::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !otp::code_matches(
        user.verification_code.as_deref(),
        user.verification_expires,
        &req.otp,
        Utc::now(),
    ) {
        return Err(AppError::Validation("Invalid or expired code".to_string()));
    }

    let password_hash = hash_password(&req.new_password)?;
    user_repo::update_password(&state.db, user.id, &password_hash).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password reset successfully",
    })))
}
