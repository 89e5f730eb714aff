// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! HTML markup linting and rule evaluation.

use crate::markup::{Document, Tree};
use crate::rules::RuleContext;
use crate::ruleset::{Ruleset, RulesetConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Severity level for a finding.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warn,
    Error,
}

/// One problem reported against the markup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub rule: String,
    pub severity: Severity,
    /// 1-based line in the markup split on `\n`.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    pub message: String,
}

/// Result of validating one markup string.
///
/// `findings` is always empty when `valid` is true.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    pub fn passed() -> Self {
        Self {
            valid: true,
            findings: Vec::new(),
        }
    }

    /// Build a report from raw findings. Only error-severity findings make the
    /// report invalid; warnings are kept only alongside errors.
    pub fn from_findings(findings: Vec<ValidationFinding>) -> Self {
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        if errors == 0 {
            if !findings.is_empty() {
                debug!(warnings = findings.len(), "markup passed with warnings");
            }
            return Self::passed();
        }
        Self {
            valid: false,
            findings,
        }
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }
}

/// Anything that can check a complete markup string.
pub trait RuleEngine: Send + Sync {
    fn validate_string(&self, markup: &str) -> anyhow::Result<ValidationReport>;
}

/// Built-in rule engine running the rules in [`crate::rules::RULES`].
#[derive(Debug, Clone)]
pub struct HtmlRuleEngine {
    ruleset: Ruleset,
}

impl HtmlRuleEngine {
    pub fn new(config: &RulesetConfig) -> anyhow::Result<Self> {
        Ok(Self {
            ruleset: Ruleset::from_config(config)?,
        })
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }
}

impl RuleEngine for HtmlRuleEngine {
    fn validate_string(&self, markup: &str) -> anyhow::Result<ValidationReport> {
        Ok(ValidationReport::from_findings(lint_markup(
            markup,
            &self.ruleset,
        )))
    }
}

/// Lint a markup string, returning findings ordered by position.
pub fn lint_markup(markup: &str, ruleset: &Ruleset) -> Vec<ValidationFinding> {
    let doc = Document::parse(markup);
    let tree = Tree::build(&doc);
    let ctx = RuleContext {
        doc: &doc,
        tree: &tree,
    };

    let mut out = Vec::new();
    for (rule, severity) in ruleset.enabled() {
        out.extend(rule.check(&ctx).into_iter().map(|hit| ValidationFinding {
            rule: rule.id().to_string(),
            severity,
            line: hit.pos.line,
            column: hit.pos.column,
            message: hit.message,
        }));
    }

    out.sort_by_key(|f| (f.line, f.column));
    out
}
