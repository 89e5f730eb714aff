// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::markup::TreeIssue;
use crate::rules::{Rule, RuleContext, RuleHit};

pub struct CloseOrder;

impl Rule for CloseOrder {
    fn id(&self) -> &'static str {
        "close-order"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit> {
        ctx.tree
            .issues
            .iter()
            .filter_map(|issue| match issue {
                TreeIssue::Mismatched {
                    expected,
                    found,
                    pos,
                } => Some(RuleHit::new(
                    *pos,
                    format!(
                        "Mismatched close-tag, expected '</{}>' but found '</{}>'.",
                        expected, found
                    ),
                )),
                TreeIssue::Stray { name, pos } => Some(RuleHit::new(
                    *pos,
                    format!("Unexpected close-tag '</{}>', expected opening tag.", name),
                )),
                TreeIssue::Unclosed { name, pos } => Some(RuleHit::new(
                    *pos,
                    format!(
                        "Missing close-tag, expected '</{}>' but document ends here.",
                        name
                    ),
                )),
                TreeIssue::VoidEndTag { .. } => None,
            })
            .collect()
    }
}
