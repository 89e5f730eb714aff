// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::rules::{Rule, RuleContext, RuleHit};
use std::collections::HashSet;

pub struct NoDupAttr;

impl Rule for NoDupAttr {
    fn id(&self) -> &'static str {
        "no-dup-attr"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit> {
        let mut out = Vec::new();
        for tag in ctx.doc.start_tags() {
            let mut seen = HashSet::new();
            for attr in &tag.attrs {
                if !seen.insert(attr.name.as_str()) {
                    out.push(RuleHit::new(
                        attr.pos,
                        format!("Attribute \"{}\" duplicated", attr.name),
                    ));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Position;
    use crate::test_helpers::check_rule;

    #[test]
    fn flags_second_occurrence_case_insensitively() {
        let hits = check_rule(&NoDupAttr, "<div class=a CLASS=b id=x>");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pos, Position { line: 1, column: 14 });
        assert_eq!(hits[0].message, "Attribute \"class\" duplicated");
    }

    #[test]
    fn same_attribute_on_different_elements_is_fine() {
        assert!(check_rule(&NoDupAttr, "<p class=a></p><p class=a></p>").is_empty());
    }
}
