// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::rules::{Rule, RuleContext, RuleHit};

const DEPRECATED_ELEMENTS: &[&str] = &[
    "acronym", "applet", "basefont", "bgsound", "big", "blink", "center", "dir", "font", "frame",
    "frameset", "isindex", "keygen", "listing", "marquee", "nobr", "noembed", "noframes",
    "plaintext", "spacer", "strike", "tt", "xmp",
];

pub struct Deprecated;

impl Rule for Deprecated {
    fn id(&self) -> &'static str {
        "deprecated"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit> {
        ctx.doc
            .start_tags()
            .filter(|t| DEPRECATED_ELEMENTS.contains(&t.name.as_str()))
            .map(|t| RuleHit::new(t.pos, format!("<{}> is deprecated", t.name)))
            .collect()
    }
}
