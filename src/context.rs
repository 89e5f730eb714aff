// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Request-scoped state shared between a handler and the validation layer.

use hyper::Request;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

/// Holds the data model of the last render call made for one request.
///
/// [`crate::middleware::ValidateHtml`] inserts a fresh context into every
/// request's extensions; handlers reach it with [`Self::from_request`]. Clones
/// share the same slot, and no slot outlives its request.
#[derive(Debug, Clone, Default)]
pub struct RequestValidationContext {
    model: Arc<Mutex<Option<Value>>>,
}

impl RequestValidationContext {
    pub fn from_request<B>(req: &Request<B>) -> Option<Self> {
        req.extensions().get::<Self>().cloned()
    }

    /// Record a render model. Only JSON objects are kept; a later capture
    /// replaces an earlier one.
    pub fn capture(&self, model: &Value) {
        if model.is_object() {
            let mut slot = self.model.lock().unwrap_or_else(PoisonError::into_inner);
            *slot = Some(model.clone());
        }
    }

    /// Run a view with `model`, capturing it first.
    pub fn render<R>(&self, model: Option<&Value>, view: impl FnOnce(Option<&Value>) -> R) -> R {
        if let Some(m) = model {
            self.capture(m);
        }
        view(model)
    }

    /// Remove and return the captured model.
    pub fn take(&self) -> Option<Value> {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Route identifier used for route exemptions.
///
/// Applications that match routes by pattern can attach this to the request
/// or response extensions; otherwise the request path is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn capture_keeps_objects_only() {
        let ctx = RequestValidationContext::default();
        ctx.capture(&json!("just a string"));
        assert!(ctx.take().is_none());
        ctx.capture(&json!([1, 2]));
        assert!(ctx.take().is_none());
        ctx.capture(&json!({ "a": 1 }));
        assert_eq!(ctx.take(), Some(json!({ "a": 1 })));
        assert!(ctx.take().is_none());
    }

    #[test]
    fn last_render_wins() {
        let ctx = RequestValidationContext::default();
        let first = ctx.render(Some(&json!({ "n": 1 })), |_| "one");
        let second = ctx.render(Some(&json!({ "n": 2 })), |m| {
            m.and_then(|v| v["n"].as_u64()).unwrap_or(0)
        });
        assert_eq!(first, "one");
        assert_eq!(second, 2);
        assert_eq!(ctx.take(), Some(json!({ "n": 2 })));
    }

    #[test]
    fn render_without_model_captures_nothing() {
        let ctx = RequestValidationContext::default();
        let out = ctx.render(None, |m| m.is_none());
        assert!(out);
        assert!(ctx.take().is_none());
    }

    #[test]
    fn clones_share_a_slot_but_contexts_do_not() {
        let a = RequestValidationContext::default();
        let a2 = a.clone();
        let b = RequestValidationContext::default();
        a2.capture(&json!({ "_disableValidator": true }));
        assert!(b.take().is_none());
        assert!(a.take().is_some());
    }

    #[test]
    fn from_request_reads_extensions() {
        let ctx = RequestValidationContext::default();
        let mut req = Request::new(());
        assert!(RequestValidationContext::from_request(&req).is_none());
        req.extensions_mut().insert(ctx.clone());
        let found = RequestValidationContext::from_request(&req).expect("context");
        found.capture(&json!({ "x": true }));
        assert_eq!(ctx.take(), Some(json!({ "x": true })));
    }
}
