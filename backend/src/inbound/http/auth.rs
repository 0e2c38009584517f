//! Bearer-token extractor and caller network details.
//!
//! Protected handlers take a [`Caller`] argument. Extraction resolves the
//! `Authorization: Bearer <token>` header through the accounts port, which
//! re-reads the stored user, so roles always reflect the current record.

use std::ops::Deref;

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use super::state::HttpState;
use crate::domain::{AuthenticatedCaller, Error};

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller of a protected route.
#[derive(Debug, Clone)]
pub struct Caller(pub AuthenticatedCaller);

impl Deref for Caller {
    type Target = AuthenticatedCaller;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::unauthorized("Authentication required"))
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            state.accounts.authenticate(&token).await.map(Caller)
        })
    }
}

/// Client address as reported by actix, honouring `X-Forwarded-For`.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info().realip_remote_addr().map(str::to_owned)
}
