// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{HeaderMap, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as LegacyClient;
use hyper_util::rt::TokioExecutor;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use html_validator::config::ValidatorOptions;
use html_validator::proxy::{run_proxy, Forward};
use html_validator::validator::Validator;

pub const MARKER: &str = "HTML did not pass validator";

pub const INVALID_HTML: &str = "
    <!DOCTYPE html>
    <html lang='en'>
      <head>
        <meta charset='utf-8'>
      </head>
      <body
        <h1>hello</h1>
      </body>
    </html>";

pub const VALID_HTML: &str = "
    <!DOCTYPE html>
    <html lang='en'>
      <head>
        <meta charset='utf-8'>
        <title>Valid</title>
      </head>
      <body>
        <h1>hello</h1>
      </body>
    </html>";

/// Fresh empty project directory, so no `.htmlValidate.json` is found.
pub fn temp_root() -> anyhow::Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("html-validator_root_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Validator configured like a typical application: `Partial` header and
/// `_disableValidator` model flag, plus the given exempt routes.
pub fn make_validator(routes: &[&str]) -> anyhow::Result<Arc<Validator>> {
    let options: ValidatorOptions = serde_json::from_value(serde_json::json!({
        "exceptions": {
            "routes": routes,
            "header": "Partial",
            "modelValue": "_disableValidator"
        }
    }))?;
    Ok(Arc::new(Validator::from_options(&options, &temp_root()?)?))
}

fn html_route(route: &str, body: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
}

/// Upstream application serving the same pages in several ways.
pub async fn start_test_app() -> MockServer {
    let mock = MockServer::start().await;
    html_route("/invalid", INVALID_HTML).mount(&mock).await;
    html_route("/valid", VALID_HTML).mount(&mock).await;
    html_route("/render-exception-route", INVALID_HTML)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/exception-header"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(INVALID_HTML, "text/html; charset=utf-8")
                .insert_header("partial", "true"),
        )
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "hello": "world" })),
        )
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(INVALID_HTML, "text/html"))
        .mount(&mock)
        .await;
    mock
}

// Start run_proxy in background and wait until it is accepting
pub async fn start_run_proxy_and_wait(
    upstream: &str,
    validator: Arc<Validator>,
) -> anyhow::Result<(tokio::task::JoinHandle<()>, SocketAddr)> {
    // Choose a free port by binding then dropping
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let forward = Forward::new(upstream)?;
    let handle = tokio::spawn(async move {
        let _ = run_proxy(addr, forward, validator).await;
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if Instant::now() > deadline {
            return Err(anyhow::anyhow!("timeout waiting for proxy to start"));
        }
        if let Ok(mut s) = tokio::net::TcpStream::connect(addr).await {
            let _ = s.shutdown().await;
            break;
        }
        sleep(Duration::from_millis(50)).await;
    }

    Ok((handle, addr))
}

pub struct Fetched {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

/// Plain HTTP GET against the proxy.
pub async fn http_get(
    addr: SocketAddr,
    route: &str,
    headers: &[(&str, &str)],
) -> anyhow::Result<Fetched> {
    let client: LegacyClient<HttpConnector, Empty<Bytes>> =
        LegacyClient::builder(TokioExecutor::new()).build_http();
    let mut builder = Request::builder().uri(format!("http://{}{}", addr, route));
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    let resp = client.request(builder.body(Empty::new())?).await?;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await?.to_bytes();
    Ok(Fetched {
        status,
        headers,
        text: String::from_utf8_lossy(&body).into_owned(),
    })
}
