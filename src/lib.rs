// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! HTML validation for web applications.
//!
//! Successful HTML responses are checked against a configurable rule set.
//! Failing pages are replaced with a diagnostic page listing every finding
//! next to the highlighted, line-annotated markup. The library provides the
//! rule engine, the page builder, a hyper service layer and a validating
//! reverse proxy.

pub mod annotate;
pub mod config;
pub mod context;
pub mod exemption;
pub mod highlight;
pub mod lint;
pub mod markup;
pub mod middleware;
pub mod proxy;
pub mod rules;
pub mod ruleset;
pub mod template;
pub mod validator;

#[cfg(test)]
mod test_helpers;

pub use context::{MatchedRoute, RequestValidationContext};
pub use middleware::ValidateHtml;
pub use validator::Validator;
