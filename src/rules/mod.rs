// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use crate::markup::{Document, Position, Tree};

/// What a rule sees of the document being checked.
pub struct RuleContext<'a> {
    pub doc: &'a Document,
    pub tree: &'a Tree,
}

/// A single rule violation, before a severity is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub message: String,
    pub pos: Position,
}

impl RuleHit {
    pub fn new(pos: Position, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

pub trait Rule: Send + Sync {
    /// Identifier used in `.htmlValidate.json` `rules` entries.
    fn id(&self) -> &'static str;

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<RuleHit>;
}

/// Look up a registered rule by id.
pub fn find_rule(id: &str) -> Option<&'static dyn Rule> {
    RULES.iter().copied().find(|r| r.id() == id)
}

pub mod close_order;
pub mod deprecated;
pub mod element_required_content;
pub mod missing_doctype;
pub mod no_dup_attr;
pub mod no_dup_id;
pub mod parser_error;
pub mod void_content;

pub const RULES: &[&dyn Rule] = &[
    &parser_error::ParserError,
    &close_order::CloseOrder,
    &void_content::VoidContent,
    &no_dup_attr::NoDupAttr,
    &no_dup_id::NoDupId,
    &missing_doctype::MissingDoctype,
    &element_required_content::ElementRequiredContent,
    &deprecated::Deprecated,
];
