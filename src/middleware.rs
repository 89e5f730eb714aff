// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Hyper service layer that validates HTML responses on their way out.

use crate::context::{MatchedRoute, RequestValidationContext};
use crate::exemption::exemption_reason;
use crate::validator::Validator;
use bytes::Bytes;
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Full};
use hyper::body::Body;
use hyper::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::http::response::Parts;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

pub type ValidatedResponse = Response<UnsyncBoxBody<Bytes, anyhow::Error>>;

type ServiceFuture = Pin<Box<dyn Future<Output = Result<ValidatedResponse, anyhow::Error>> + Send>>;

/// Wraps an HTML-producing service and replaces failing pages with the
/// diagnostic page.
#[derive(Clone)]
pub struct ValidateHtml<S> {
    inner: S,
    validator: Arc<Validator>,
}

impl<S> ValidateHtml<S> {
    pub fn new(inner: S, validator: Arc<Validator>) -> Self {
        Self { inner, validator }
    }

    pub fn validator(&self) -> &Arc<Validator> {
        &self.validator
    }
}

/// Only successful HTML responses are candidates for validation.
pub fn is_html_candidate(parts: &Parts) -> bool {
    parts.status == StatusCode::OK
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"))
}

fn is_encoded(parts: &Parts) -> bool {
    parts
        .headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|enc| !enc.trim().is_empty() && !enc.trim().eq_ignore_ascii_case("identity"))
}

fn passthrough<B>(parts: Parts, body: B) -> ValidatedResponse
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<anyhow::Error>,
{
    Response::from_parts(parts, body.map_err(Into::into).boxed_unsync())
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ValidateHtml<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Into<anyhow::Error>,
    ResBody: Body<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<anyhow::Error>,
{
    type Response = ValidatedResponse;
    type Error = anyhow::Error;
    type Future = ServiceFuture;

    fn call(&self, mut req: Request<ReqBody>) -> Self::Future {
        let ctx = RequestValidationContext::default();
        req.extensions_mut().insert(ctx.clone());

        let request_route = req
            .extensions()
            .get::<MatchedRoute>()
            .map(|r| r.0.clone())
            .unwrap_or_else(|| req.uri().path().to_string());
        let request_headers = req.headers().clone();
        let validator = self.validator.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let resp = fut.await.map_err(Into::into)?;
            let (mut parts, body) = resp.into_parts();

            if !is_html_candidate(&parts) {
                return Ok(passthrough(parts, body));
            }

            let route = parts
                .extensions
                .get::<MatchedRoute>()
                .map(|r| r.0.clone())
                .unwrap_or(request_route);
            let mut model = ctx.take();
            if let Some(reason) = exemption_reason(
                Some(&route),
                &request_headers,
                &parts.headers,
                &mut model,
                validator.exemptions(),
            ) {
                debug!(%route, ?reason, "validation skipped");
                return Ok(passthrough(parts, body));
            }

            if is_encoded(&parts) {
                warn!(%route, "encoded HTML body, validation skipped");
                return Ok(passthrough(parts, body));
            }

            let bytes = body.collect().await.map_err(Into::into)?.to_bytes();
            let page = match std::str::from_utf8(&bytes) {
                Ok(text) => match validator.validate_with_status(text, &mut parts.status)? {
                    Cow::Borrowed(_) => None,
                    Cow::Owned(page) => Some(page),
                },
                Err(e) => {
                    debug!(%route, %e, "non UTF-8 HTML body, validation skipped");
                    None
                }
            };

            let body = match page {
                Some(page) => {
                    warn!(%route, status = %parts.status, "replaced response with diagnostic page");
                    parts.headers.remove(CONTENT_LENGTH);
                    Full::new(Bytes::from(page))
                }
                None => Full::new(bytes),
            };
            Ok(passthrough(parts, body))
        })
    }
}
