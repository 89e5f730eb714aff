// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Validating reverse proxy: forwards every request to one upstream
//! application and validates the HTML it sends back.

use crate::middleware::ValidateHtml;
use crate::validator::Validator;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::Service;
use hyper::{HeaderMap, Request, Response, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as LegacyClient;
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder as AutoConnBuilder;
use std::collections::HashSet;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

type ForwardFuture =
    Pin<Box<dyn Future<Output = Result<Response<Full<Bytes>>, Infallible>> + Send>>;

// RFC 7230 Section 6.1: Hop-by-hop headers must not be forwarded by proxies.
static HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Service that relays requests to a fixed upstream through a pooled client.
#[derive(Clone)]
pub struct Forward {
    client: LegacyClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    upstream: Uri,
}

impl Forward {
    pub fn new(upstream: &str) -> anyhow::Result<Self> {
        let upstream: Uri = upstream
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid upstream '{}': {}", upstream, e))?;
        if upstream.scheme().is_none() || upstream.authority().is_none() {
            return Err(anyhow::anyhow!(
                "Invalid upstream '{}': expected an absolute http(s) URI",
                upstream
            ));
        }

        let https = HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();
        let client = LegacyClient::builder(TokioExecutor::new()).build(https);

        Ok(Self { client, upstream })
    }

    pub fn upstream(&self) -> &Uri {
        &self.upstream
    }

    /// Map an incoming request URI onto the upstream, keeping any upstream
    /// path prefix.
    pub fn upstream_uri(&self, uri: &Uri) -> anyhow::Result<Uri> {
        let prefix = self.upstream.path().trim_end_matches('/');
        let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let mut parts = self.upstream.clone().into_parts();
        parts.path_and_query = Some(format!("{}{}", prefix, path).parse()?);
        Ok(Uri::from_parts(parts)?)
    }

    async fn forward<B>(self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: hyper::body::Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let uri = match self.upstream_uri(req.uri()) {
            Ok(u) => u,
            Err(e) => {
                error!(%e, "failed to build upstream uri");
                return plain_response(500, format!("request build error: {}", e));
            }
        };

        let scoped = connection_scoped_names(req.headers());
        let mut builder = Request::builder().method(req.method()).uri(uri);
        for (name, value) in req.headers().iter() {
            let name_str = name.as_str();
            if name_str == "host" || stays_on_this_hop(name_str, &scoped) {
                continue;
            }
            builder = builder.header(name, value);
        }

        let body_bytes = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                let boxed: Box<dyn std::error::Error + Send + Sync> = e.into();
                error!("failed to collect request body: {}", boxed);
                return plain_response(500, "request body collect error".to_string());
            }
        };

        let upstream_req = match builder.body(Full::new(body_bytes)) {
            Ok(r) => r,
            Err(e) => {
                error!("failed to build upstream request: {}", e);
                return plain_response(500, format!("request build error: {}", e));
            }
        };

        let resp = match self.client.request(upstream_req).await {
            Ok(r) => r,
            Err(e) => {
                warn!(%method, %path, %e, "upstream error");
                return plain_response(502, format!("upstream error: {}", e));
            }
        };

        let status = resp.status();
        let headers = resp.headers().clone();
        let resp_body_bytes = match resp.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(%method, %path, %e, "upstream body error");
                return plain_response(502, format!("upstream body collect error: {}", e));
            }
        };

        debug!(
            %method,
            %path,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "forwarded"
        );

        let mut resp_builder = Response::builder().status(status);
        let scoped = connection_scoped_names(&headers);
        for (name, value) in headers.iter() {
            if stays_on_this_hop(name.as_str(), &scoped) {
                continue;
            }
            resp_builder = resp_builder.header(name, value);
        }
        resp_builder
            .body(Full::new(resp_body_bytes.clone()))
            .unwrap_or_else(|_| Response::new(Full::new(resp_body_bytes)))
    }
}

impl<B> Service<Request<B>> for Forward
where
    B: hyper::body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = ForwardFuture;

    fn call(&self, req: Request<B>) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.forward(req).await) })
    }
}

fn plain_response(status: u16, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body.clone())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from(body))))
}

// Header names listed in `Connection` apply to one hop only. Unreadable
// values name nothing.
fn connection_scoped_names(headers: &HeaderMap) -> HashSet<String> {
    headers
        .get_all(hyper::header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

fn stays_on_this_hop(name: &str, scoped: &HashSet<String>) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name) || scoped.contains(name)
}

pub async fn run_proxy(
    listen: SocketAddr,
    forward: Forward,
    validator: Arc<Validator>,
) -> anyhow::Result<()> {
    run_proxy_accepting(listen, forward, validator, None).await
}

/// Serves the validating proxy, stopping after `accept_limit` client
/// connections when one is given. `Some(0)` returns right after binding.
/// Connections already accepted keep being served on their own tasks.
pub async fn run_proxy_accepting(
    listen: SocketAddr,
    forward: Forward,
    validator: Arc<Validator>,
    accept_limit: Option<usize>,
) -> anyhow::Result<()> {
    let upstream = forward.upstream().to_string();
    let service = ValidateHtml::new(forward, validator);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(%listen, %upstream, "listening");

    let executor = TokioExecutor::new();
    let server_builder = AutoConnBuilder::new(executor);

    let mut remaining = accept_limit;
    loop {
        if let Some(0) = remaining {
            break;
        }

        let (stream, remote_addr) = listener.accept().await?;

        if let Some(ref mut n) = remaining {
            *n -= 1;
        }

        let service = service.clone();
        let builder_clone = server_builder.clone();
        tokio::spawn(async move {
            debug!(%remote_addr, "accepted connection");
            let io = TokioIo::new(stream);
            if let Err(e) = builder_clone.serve_connection(io, service).await {
                error!(%e, %remote_addr, "connection error");
            }
        });
    }

    Ok(())
}
