// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Shared test utilities to reduce duplication across test modules.

use crate::exemption::ExemptionConfig;
use crate::highlight::PlainHighlighter;
use crate::lint::{RuleEngine, Severity, ValidationFinding, ValidationReport};
use crate::markup::{Document, Tree};
use crate::rules::{Rule, RuleContext, RuleHit};
use crate::validator::Validator;
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;

/// Document missing its title and with an unterminated `<body` tag.
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

/// Create an error finding with a placeholder rule id
pub fn finding(line: usize, column: usize, message: &str) -> ValidationFinding {
    ValidationFinding {
        rule: "test".to_string(),
        severity: Severity::Error,
        line,
        column,
        message: message.to_string(),
    }
}

/// Run a single rule against `markup`
pub fn check_rule(rule: &dyn Rule, markup: &str) -> Vec<RuleHit> {
    let doc = Document::parse(markup);
    let tree = Tree::build(&doc);
    rule.check(&RuleContext {
        doc: &doc,
        tree: &tree,
    })
}

/// Strip tags from highlighted output and decode entities
pub fn text_content(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&out).into_owned()
}

/// Create a HeaderMap from a list of (name, value) pairs
pub fn make_headers_from_pairs(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (k, v) in pairs {
        let name = HeaderName::from_bytes(k.as_bytes()).expect("valid header name");
        let value = HeaderValue::from_str(v).expect("valid header value");
        headers.append(name, value);
    }
    headers
}

/// Validator with the standard preset, plain highlighting and default
/// exemptions
pub fn make_test_validator() -> Validator {
    let engine = crate::lint::HtmlRuleEngine::new(&crate::ruleset::RulesetConfig::standard())
        .expect("standard preset");
    Validator::new(
        Arc::new(engine),
        Arc::new(PlainHighlighter),
        ExemptionConfig::default(),
    )
    .expect("validator")
}

/// Engine that always reports the same findings
pub struct FixedEngine(pub Vec<ValidationFinding>);

impl RuleEngine for FixedEngine {
    fn validate_string(&self, _markup: &str) -> anyhow::Result<ValidationReport> {
        Ok(ValidationReport::from_findings(self.0.clone()))
    }
}

/// Engine that always fails
pub struct FailingEngine;

impl RuleEngine for FailingEngine {
    fn validate_string(&self, _markup: &str) -> anyhow::Result<ValidationReport> {
        Err(anyhow::anyhow!("engine exploded"))
    }
}
