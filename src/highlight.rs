// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Syntax highlighting of markup lines for the diagnostic page.

use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;

/// Prefixed so token classes never collide with the page's own classes
/// (`markup`, `error`, `line-numbers`).
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

const THEME: &str = "InspiredGitHub";

/// Turns one line of raw markup into an HTML fragment.
///
/// Implementations must escape the line and must not change its text content:
/// stripping the added tags and decoding entities yields the input line.
pub trait Highlighter: Send + Sync {
    fn highlight_line(&self, line: &str) -> anyhow::Result<String>;

    /// CSS for the classes emitted by `highlight_line`.
    fn stylesheet(&self) -> &str;
}

/// HTML highlighting backed by syntect's bundled syntaxes and themes.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    stylesheet: String,
}

impl SyntectHighlighter {
    pub fn new() -> anyhow::Result<Self> {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .get(THEME)
            .ok_or_else(|| anyhow::anyhow!("bundled theme '{}' not found", THEME))?;
        let stylesheet = css_for_theme_with_class_style(theme, CLASS_STYLE)?;
        Ok(Self {
            syntaxes,
            stylesheet,
        })
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight_line(&self, line: &str) -> anyhow::Result<String> {
        let syntax = self
            .syntaxes
            .find_syntax_by_extension("html")
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        generator.parse_html_for_line_which_includes_newline(&format!("{}\n", line))?;
        let mut html = generator.finalize();
        // Lines never contain '\n', so the only one is the terminator added above.
        html.retain(|c| c != '\n');
        Ok(html)
    }

    fn stylesheet(&self) -> &str {
        &self.stylesheet
    }
}

/// Escape-only highlighter with no stylesheet.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight_line(&self, line: &str) -> anyhow::Result<String> {
        Ok(html_escape::encode_text(line).into_owned())
    }

    fn stylesheet(&self) -> &str {
        ""
    }
}
