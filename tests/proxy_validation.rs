// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

mod common;

use common::{
    http_get, make_validator, start_run_proxy_and_wait, start_test_app, INVALID_HTML, MARKER,
    VALID_HTML,
};
use hyper::StatusCode;

#[tokio::test]
async fn proxy_replaces_invalid_html_with_diagnostic_page() -> anyhow::Result<()> {
    let app = start_test_app().await;
    let (handle, addr) = start_run_proxy_and_wait(&app.uri(), make_validator(&[])?).await?;

    let res = http_get(addr, "/invalid", &[]).await?;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text.contains(MARKER));
    assert!(res.text.contains("At line 8, column 9"));
    assert!(res.text.contains("class='line-numbers error'"));
    assert!(res
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html")));

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn proxy_passes_valid_html_through() -> anyhow::Result<()> {
    let app = start_test_app().await;
    let (handle, addr) = start_run_proxy_and_wait(&app.uri(), make_validator(&[])?).await?;

    let res = http_get(addr, "/valid", &[]).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text, VALID_HTML);

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn proxy_honors_exemptions() -> anyhow::Result<()> {
    let app = start_test_app().await;
    let validator = make_validator(&["/render-exception-route"])?;
    let (handle, addr) = start_run_proxy_and_wait(&app.uri(), validator).await?;

    for (route, headers) in [
        ("/render-exception-route", &[][..]),
        ("/invalid", &[("partial", "true")][..]),
        ("/exception-header", &[][..]),
    ] {
        let res = http_get(addr, route, headers).await?;
        assert_eq!(res.status, StatusCode::OK, "{}", route);
        assert_eq!(res.text, INVALID_HTML, "{}", route);
    }

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn proxy_ignores_non_html_and_non_200() -> anyhow::Result<()> {
    let app = start_test_app().await;
    let (handle, addr) = start_run_proxy_and_wait(&app.uri(), make_validator(&[])?).await?;

    let res = http_get(addr, "/json", &[]).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!res.text.contains(MARKER));

    let res = http_get(addr, "/missing", &[]).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.text, INVALID_HTML);

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn proxy_answers_502_when_upstream_is_down() -> anyhow::Result<()> {
    // Nothing listens on the discard port
    let (handle, addr) =
        start_run_proxy_and_wait("http://127.0.0.1:9", make_validator(&[])?).await?;

    let res = http_get(addr, "/", &[]).await?;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);

    handle.abort();
    Ok(())
}
