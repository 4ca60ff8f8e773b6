//! Route configuration
//!
//! Centralized route setup; each domain (user, post, message) manages its
//! own scope.

use actix_web::web;

use crate::handlers;
use crate::middleware::AuthMiddleware;
use crate::realtime::session::ws_connect;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health::health_check))
            .configure(user::configure)
            .configure(post::configure)
            .configure(message::configure),
    )
    // WebSocket endpoint (outside /api/v1)
    .service(
        web::scope("/ws")
            .wrap(AuthMiddleware)
            .route("", web::get().to(ws_connect)),
    );
}

mod user {
    use super::*;

    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/user")
                .route("/register", web::post().to(handlers::auth::register))
                .route("/verify-email", web::post().to(handlers::auth::verify_email))
                .route("/login", web::post().to(handlers::auth::login))
                .route("/logout", web::get().to(handlers::auth::logout))
                .route(
                    "/forgot-password",
                    web::post().to(handlers::auth::forgot_password),
                )
                .route(
                    "/reset-password",
                    web::post().to(handlers::auth::reset_password),
                )
                .route("/search", web::get().to(handlers::users::search_users))
                .service(
                    web::scope("")
                        .wrap(AuthMiddleware)
                        .route("/{id}/profile", web::get().to(handlers::users::get_profile))
                        .route(
                            "/profile/edit",
                            web::post().to(handlers::users::edit_profile),
                        )
                        .route(
                            "/suggested",
                            web::get().to(handlers::users::suggested_users),
                        )
                        .route(
                            "/followorunfollow/{id}",
                            web::post().to(handlers::users::follow_or_unfollow),
                        ),
                ),
        );
    }
}

mod post {
    use super::*;

    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/post")
                .wrap(AuthMiddleware)
                .route("/addpost", web::post().to(handlers::posts::add_post))
                .route("/all", web::get().to(handlers::posts::get_all_posts))
                .route(
                    "/userpost/all",
                    web::get().to(handlers::posts::get_user_posts),
                )
                .route("/{id}/like", web::post().to(handlers::posts::like_post))
                .route(
                    "/{id}/dislike",
                    web::post().to(handlers::posts::dislike_post),
                )
                .route("/{id}/comment", web::post().to(handlers::posts::add_comment))
                .route(
                    "/{id}/comment/all",
                    web::get().to(handlers::posts::get_comments),
                )
                .route(
                    "/{id}/bookmark",
                    web::post().to(handlers::posts::toggle_bookmark),
                )
                .route(
                    "/delete/{id}",
                    web::delete().to(handlers::posts::delete_post),
                ),
        );
    }
}

mod message {
    use super::*;

    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/message")
                .wrap(AuthMiddleware)
                .route(
                    "/send/{id}",
                    web::post().to(handlers::messages::send_message),
                )
                .route("/all/{id}", web::get().to(handlers::messages::get_messages)),
        );
    }
}
