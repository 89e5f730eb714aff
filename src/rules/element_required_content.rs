// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::rules::{Rule, RuleContext, RuleHit};

// (element, required child)
const REQUIRED: &[(&str, &str)] = &[("html", "head"), ("html", "body"), ("head", "title")];

pub struct ElementRequiredContent;

impl Rule for ElementRequiredContent {
    fn id(&self) -> &'static str {
        "element-required-content"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit> {
        let mut out = Vec::new();
        for (parent, child) in REQUIRED {
            for el in ctx.tree.find(parent) {
                if !ctx.tree.has_child(el, child) {
                    out.push(RuleHit::new(
                        el.pos,
                        format!("<{}> element must have <{}> as content", parent, child),
                    ));
                }
            }
        }
        out
    }
}
