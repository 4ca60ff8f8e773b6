/// Cookie authentication middleware.
/// Validates the signed `token` cookie and adds the caller's id to request
/// extensions.
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

pub const AUTH_COOKIE: &str = "token";

/// Caller's id extracted from the session token
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let token = match req.cookie(AUTH_COOKIE) {
                Some(cookie) => cookie.value().to_string(),
                None => {
                    return Err(AppError::Authentication(
                        "User not authenticated".to_string(),
                    )
                    .into())
                }
            };

            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| {
                    AppError::Internal("application state missing".to_string())
                })?;

            let user_id = match state.jwt.validate_token(&token) {
                Ok(data) => match Uuid::parse_str(&data.claims.sub) {
                    Ok(id) => id,
                    Err(_) => {
                        return Err(AppError::Authentication(
                            "Invalid session token".to_string(),
                        )
                        .into())
                    }
                },
                Err(e) => {
                    tracing::debug!(error = %e, "session token validation failed");
                    return Err(AppError::Authentication(
                        "Invalid or expired session".to_string(),
                    )
                    .into());
                }
            };

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => ready(Err(AppError::Authentication(
                "User not authenticated".to_string(),
            )
            .into())),
        }
    }
}
