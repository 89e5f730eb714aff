// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Validation orchestration: run the rule engine and, on failure, render the
//! diagnostic page.

use crate::annotate::{build_diagnostics, gutter_width_px};
use crate::config::ValidatorOptions;
use crate::exemption::ExemptionConfig;
use crate::highlight::{Highlighter, SyntectHighlighter};
use crate::lint::{HtmlRuleEngine, RuleEngine, ValidationFinding, ValidationReport};
use crate::ruleset::resolve_ruleset_config;
use crate::template::{DiagnosticModel, DiagnosticTemplate};
use hyper::StatusCode;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Status forced onto responses whose markup fails validation.
pub const DIAGNOSTIC_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/// Validates markup and builds diagnostic pages. Immutable and shareable
/// across requests.
pub struct Validator {
    engine: Arc<dyn RuleEngine>,
    highlighter: Arc<dyn Highlighter>,
    template: DiagnosticTemplate,
    exemptions: ExemptionConfig,
}

impl Validator {
    /// Assemble a validator with the bundled diagnostic page.
    pub fn new(
        engine: Arc<dyn RuleEngine>,
        highlighter: Arc<dyn Highlighter>,
        exemptions: ExemptionConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            engine,
            highlighter,
            template: DiagnosticTemplate::builtin()?,
            exemptions,
        })
    }

    /// Build the default stack: built-in rule engine configured per
    /// [`resolve_ruleset_config`], syntect highlighting, bundled page.
    pub fn from_options(options: &ValidatorOptions, project_root: &Path) -> anyhow::Result<Self> {
        let ruleset = resolve_ruleset_config(options.validator_config.as_ref(), project_root)?;
        let engine = HtmlRuleEngine::new(&ruleset)?;
        debug!(ruleset = ?engine.ruleset(), "rule engine ready");
        Self::new(
            Arc::new(engine),
            Arc::new(SyntectHighlighter::new()?),
            ExemptionConfig::from_exceptions(&options.exceptions)?,
        )
    }

    pub fn with_template(mut self, template: DiagnosticTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn exemptions(&self) -> &ExemptionConfig {
        &self.exemptions
    }

    /// Run the rule engine only.
    pub fn report(&self, markup: &str) -> anyhow::Result<ValidationReport> {
        self.engine.validate_string(markup)
    }

    /// Return `markup` untouched when it passes, or the diagnostic page.
    pub fn validate<'a>(&self, markup: &'a str) -> anyhow::Result<Cow<'a, str>> {
        let report = self.report(markup)?;
        if report.valid {
            debug!("markup passed validation");
            return Ok(Cow::Borrowed(markup));
        }
        debug!(
            errors = report.error_count(),
            findings = report.findings.len(),
            "markup failed validation"
        );
        Ok(Cow::Owned(self.render_failure(markup, &report.findings)?))
    }

    /// Like [`Self::validate`], also setting `status` to
    /// [`DIAGNOSTIC_STATUS`] on failure.
    pub fn validate_with_status<'a>(
        &self,
        markup: &'a str,
        status: &mut StatusCode,
    ) -> anyhow::Result<Cow<'a, str>> {
        let out = self.validate(markup)?;
        if let Cow::Owned(_) = out {
            *status = DIAGNOSTIC_STATUS;
        }
        Ok(out)
    }

    /// Render the diagnostic page for `markup` and its findings.
    pub fn render_failure(
        &self,
        markup: &str,
        findings: &[ValidationFinding],
    ) -> anyhow::Result<String> {
        let diagnostics = build_diagnostics(markup, findings, self.highlighter.as_ref())?;
        let model = DiagnosticModel {
            prism_style: self.highlighter.stylesheet().to_string(),
            pre_width: gutter_width_px(diagnostics.line_count),
            errors: diagnostics.error_list_html,
            markup: diagnostics.annotated_markup_html,
            raw_markup: html_escape::encode_text(markup).into_owned(),
        };
        Ok(self.template.render(&model))
    }
}
