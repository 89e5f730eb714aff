// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::markup::TreeIssue;
use crate::rules::{Rule, RuleContext, RuleHit};

/// End tags on void elements (`<br></br>`, `<input></input>`).
pub struct VoidContent;

impl Rule for VoidContent {
    fn id(&self) -> &'static str {
        "void-content"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit> {
        ctx.tree
            .issues
            .iter()
            .filter_map(|issue| match issue {
                TreeIssue::VoidEndTag { name, pos } => Some(RuleHit::new(
                    *pos,
                    format!("End tag for <{}> must be omitted", name),
                )),
                _ => None,
            })
            .collect()
    }
}
