// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Per-response decision on whether validation applies.

use crate::config::ExceptionsConfig;
use glob::{MatchOptions, Pattern};
use hyper::HeaderMap;
use serde_json::Value;

const ROUTE_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Process-wide exemption settings, immutable once built.
#[derive(Debug, Clone)]
pub struct ExemptionConfig {
    route_patterns: Vec<Pattern>,
    header_name: String,
    model_flag_key: String,
}

impl Default for ExemptionConfig {
    fn default() -> Self {
        let ex = ExceptionsConfig::default();
        Self {
            route_patterns: Vec::new(),
            header_name: ex.header_name(),
            model_flag_key: ex.model_flag_key(),
        }
    }
}

impl ExemptionConfig {
    pub fn from_exceptions(ex: &ExceptionsConfig) -> anyhow::Result<Self> {
        let mut route_patterns = Vec::new();
        for p in &ex.routes {
            for alternative in expand_braces(p) {
                let normalized = normalize_route_pattern(&alternative);
                route_patterns.push(
                    Pattern::new(&normalized)
                        .map_err(|e| anyhow::anyhow!("Invalid route pattern '{}': {}", p, e))?,
                );
            }
        }
        Ok(Self {
            route_patterns,
            header_name: ex.header_name(),
            model_flag_key: ex.model_flag_key(),
        })
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn model_flag_key(&self) -> &str {
        &self.model_flag_key
    }

    pub fn matches_route(&self, route: &str) -> bool {
        self.route_patterns
            .iter()
            .any(|p| p.matches_with(route, ROUTE_MATCH))
    }
}

/// Expand `{a,b}` alternations into one pattern per alternative.
///
/// Nested groups expand recursively. A group without a top-level comma, or an
/// unbalanced brace, stays literal.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let bytes = pattern.as_bytes();
    let mut start = None;
    let mut depth = 0usize;
    let mut commas = Vec::new();

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                    commas.clear();
                }
                depth += 1;
            }
            b',' if depth == 1 => commas.push(i),
            b'}' if depth > 0 => {
                depth -= 1;
                if depth > 0 {
                    continue;
                }
                let Some(open) = start else { continue };
                if commas.is_empty() {
                    continue;
                }
                let prefix = &pattern[..open];
                let suffix = &pattern[i + 1..];
                let mut bounds = vec![open];
                bounds.extend(commas.iter().copied());
                bounds.push(i);

                let mut out = Vec::new();
                for w in bounds.windows(2) {
                    let alternative = &pattern[w[0] + 1..w[1]];
                    let joined = format!("{}{}{}", prefix, alternative, suffix);
                    out.extend(expand_braces(&joined));
                }
                return out;
            }
            _ => {}
        }
    }
    vec![pattern.to_string()]
}

/// Normalize a route glob to forward slashes, collapsing empty and `.`
/// segments and resolving `..`.
pub fn normalize_route_pattern(pattern: &str) -> String {
    let unified = pattern.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let trailing = unified.len() > 1 && unified.ends_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for seg in unified.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(&last) if last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }

    let mut out = String::new();
    if absolute {
        out.push('/');
    }
    out.push_str(&parts.join("/"));
    if trailing && !parts.is_empty() {
        out.push('/');
    }
    if out.is_empty() {
        out.push('.');
    }
    out
}

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Why a response was exempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    Route,
    Model,
    RequestHeader,
    ResponseHeader,
}

fn header_is_set(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .map(|v| !v.as_bytes().is_empty())
        .unwrap_or(false)
}

/// Evaluate the exemption rules in order: route, render model, request
/// header, response header. The first match wins.
///
/// `render_model` is always cleared once the route check has passed, whether
/// or not the model flag was set.
pub fn exemption_reason(
    route_id: Option<&str>,
    request_headers: &HeaderMap,
    response_headers: &HeaderMap,
    render_model: &mut Option<Value>,
    config: &ExemptionConfig,
) -> Option<Exemption> {
    if route_id.is_some_and(|r| config.matches_route(r)) {
        return Some(Exemption::Route);
    }

    if let Some(model) = render_model.take() {
        if model.get(config.model_flag_key()).is_some_and(is_truthy) {
            return Some(Exemption::Model);
        }
    }

    if header_is_set(request_headers, config.header_name()) {
        return Some(Exemption::RequestHeader);
    }
    if header_is_set(response_headers, config.header_name()) {
        return Some(Exemption::ResponseHeader);
    }

    None
}

pub fn is_exempt(
    route_id: Option<&str>,
    request_headers: &HeaderMap,
    response_headers: &HeaderMap,
    render_model: &mut Option<Value>,
    config: &ExemptionConfig,
) -> bool {
    exemption_reason(
        route_id,
        request_headers,
        response_headers,
        render_model,
        config,
    )
    .is_some()
}
