// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::rules::{Rule, RuleContext, RuleHit};

/// Surfaces tokenizer errors: malformed tags, attributes and comments.
pub struct ParserError;

impl Rule for ParserError {
    fn id(&self) -> &'static str {
        "parser-error"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit> {
        ctx.doc
            .errors
            .iter()
            .map(|e| RuleHit::new(e.pos, e.message.clone()))
            .collect()
    }
}
