// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Fixed-placeholder rendering of the diagnostic page.
//!
//! Templates reference fields as `${name}`. The set of names is closed; a
//! template is parsed once into literal and field segments and rendering is
//! plain concatenation. No escaping happens here.

/// Phrase present on every diagnostic page.
pub const FAILURE_MARKER: &str = "HTML did not pass validator";

const BUILTIN_TEMPLATE: &str = include_str!("../templates/errorPage.html");

/// Values substituted into the diagnostic page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticModel {
    pub prism_style: String,
    pub pre_width: usize,
    pub errors: String,
    pub markup: String,
    pub raw_markup: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    PrismStyle,
    PreWidth,
    Errors,
    Markup,
    RawMarkup,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "prismStyle" => Some(Self::PrismStyle),
            "preWidth" => Some(Self::PreWidth),
            "errors" => Some(Self::Errors),
            "markup" => Some(Self::Markup),
            "rawMarkup" => Some(Self::RawMarkup),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone)]
pub struct DiagnosticTemplate {
    segments: Vec<Segment>,
}

impl DiagnosticTemplate {
    /// The page bundled with the crate.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::parse(BUILTIN_TEMPLATE)
    }

    pub fn parse(source: &str) -> anyhow::Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("${") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                anyhow::anyhow!(
                    "Unterminated placeholder at byte {} of template",
                    source.len() - rest.len() + start
                )
            })?;
            let name = after[..end].trim();
            let field = Field::from_name(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown template placeholder '{}', must be one of: prismStyle, preWidth, errors, markup, rawMarkup",
                    name
                )
            })?;
            segments.push(Segment::Field(field));
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, model: &DiagnosticModel) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Field(Field::PrismStyle) => out.push_str(&model.prism_style),
                Segment::Field(Field::PreWidth) => out.push_str(&model.pre_width.to_string()),
                Segment::Field(Field::Errors) => out.push_str(&model.errors),
                Segment::Field(Field::Markup) => out.push_str(&model.markup),
                Segment::Field(Field::RawMarkup) => out.push_str(&model.raw_markup),
            }
        }
        out
    }
}
