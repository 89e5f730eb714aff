// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::rules::{Rule, RuleContext, RuleHit};

/// Full documents (those with an `<html>` element) must declare a doctype.
/// Fragments are not checked.
pub struct MissingDoctype;

impl Rule for MissingDoctype {
    fn id(&self) -> &'static str {
        "missing-doctype"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit> {
        if ctx.doc.has_doctype() {
            return Vec::new();
        }
        ctx.doc
            .start_tags()
            .find(|t| t.name == "html")
            .map(|html| vec![RuleHit::new(html.pos, "Document is missing doctype")])
            .unwrap_or_default()
    }
}
