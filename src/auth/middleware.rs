use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::session::{SessionKeys, SESSION_COOKIE};
use crate::error::AppError;

/// Gate between anonymous and authenticated requests.
///
/// Requests to anything other than the public entry points must carry a
/// valid session cookie; the verified claims are placed in request
/// extensions for [`crate::auth::CurrentUser`] to pick up. Anonymous or
/// stale-session requests are answered early with the login redirect.
pub struct SessionGuard;

impl<S, B> Transform<S, ServiceRequest> for SessionGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionGuardService { service }))
    }
}

pub struct SessionGuardService<S> {
    service: S,
}

impl<S> SessionGuardService<S> {
    /// Answers the request with the error's response (a redirect for
    /// authorization failures) without calling the inner service.
    fn respond_early<B: 'static>(
        req: ServiceRequest,
        err: AppError,
    ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
        let (req, _payload) = req.into_parts();
        let resp = err.error_response().map_into_right_body();
        Box::pin(async move { Ok(ServiceResponse::new(req, resp)) })
    }
}

impl<S, B> Service<ServiceRequest> for SessionGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Registration and the authentication entry points stay reachable
        // without a session, as does the liveness probe.
        let path = req.path();
        if matches!(path, "/" | "/login" | "/register" | "/health") {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let keys = match req.app_data::<web::Data<SessionKeys>>() {
            Some(keys) => keys.clone(),
            None => {
                return Self::respond_early(
                    req,
                    AppError::Internal("session keys not configured".into()),
                )
            }
        };

        let token = req
            .cookie(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string());

        let token = match token {
            Some(token) => token,
            None => {
                return Self::respond_early(
                    req,
                    AppError::Unauthorized("no session cookie".into()),
                )
            }
        };

        match keys.verify(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(app_err) => Self::respond_early(req, app_err),
        }
    }
}
