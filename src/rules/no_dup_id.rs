// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::rules::{Rule, RuleContext, RuleHit};
use std::collections::HashSet;

pub struct NoDupId;

impl Rule for NoDupId {
    fn id(&self) -> &'static str {
        "no-dup-id"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for tag in ctx.doc.start_tags() {
            let Some(attr) = tag.attr("id") else {
                continue;
            };
            let Some(value) = attr.value.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            if !seen.insert(value) {
                out.push(RuleHit::new(
                    attr.pos,
                    format!("Duplicate ID \"{}\"", value),
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::check_rule;

    #[test]
    fn flags_repeated_id() {
        let hits = check_rule(&NoDupId, "<p id=a></p>\n<div id=\"a\"></div><i id=b></i>");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pos.line, 2);
        assert_eq!(hits[0].message, "Duplicate ID \"a\"");
    }

    #[test]
    fn empty_ids_are_ignored() {
        assert!(check_rule(&NoDupId, "<p id></p><p id=\"\"></p>").is_empty());
    }
}
