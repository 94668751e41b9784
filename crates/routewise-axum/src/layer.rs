//! Tower middleware layer for session authentication.
//!
//! [`AuthLayer`] verifies the caller's session token and stores an
//! [`AuthContext`] in the request extensions. Requests without a valid token
//! pass through anonymously; route extractors decide whether that is allowed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response};
use pin_project_lite::pin_project;
use routewise_auth::TokenService;
use tower::{Layer, Service};
use tracing::debug;

use crate::context::{AuthContext, AuthSource};
use crate::extractors::AuthContextExt;

/// Tower layer that authenticates requests with session tokens.
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenService>,
}

impl AuthLayer {
    /// Create a new auth layer verifying with `tokens`.
    #[must_use]
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            tokens: self.tokens.clone(),
        }
    }
}

/// The session authentication service.
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    tokens: Arc<TokenService>,
}

/// Read the session token from the request.
///
/// A bearer token wins over the cookie when both are present.
pub(crate) fn extract_credentials<B>(
    req: &Request<B>,
    cookie_name: &str,
) -> Option<(String, AuthSource)> {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some((token.trim().to_string(), AuthSource::BearerToken));
            }
        }
    }

    for cookie_header in req.headers().get_all(header::COOKIE) {
        let Ok(cookie_str) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookie_str.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == cookie_name && !value.is_empty() {
                    return Some((value.to_string(), AuthSource::Cookie));
                }
            }
        }
    }

    None
}

/// `Set-Cookie` value that removes the session cookie from the browser
fn expired_cookie(cookie_name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{cookie_name}=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0"
    ))
    .ok()
}

impl<S, ResBody> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = AuthFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let cookie_name = &self.tokens.config().cookie_name;
        let mut clear_cookie = None;

        if let Some((token, source)) = extract_credentials(&req, cookie_name) {
            match self.tokens.verify(&token) {
                Ok(claims) => {
                    let ctx = AuthContext::from_claims(claims, source);
                    req.extensions_mut().insert(AuthContextExt(ctx));
                }
                Err(e) => {
                    debug!(error = %e, source = ?source, "Ignoring invalid session token");
                    // A dead cookie would otherwise be resent on every request
                    if source == AuthSource::Cookie {
                        clear_cookie = expired_cookie(cookie_name);
                    }
                }
            }
        }

        AuthFuture {
            future: self.inner.call(req),
            clear_cookie,
        }
    }
}

pin_project! {
    /// Response future for [`AuthService`].
    pub struct AuthFuture<F> {
        #[pin]
        future: F,
        clear_cookie: Option<HeaderValue>,
    }
}

impl<F, ResBody, E> Future for AuthFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut response = ready!(this.future.poll(cx))?;

        if let Some(value) = this.clear_cookie.take() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }

        Poll::Ready(Ok(response))
    }
}
