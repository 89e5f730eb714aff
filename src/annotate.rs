// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Escaped error list and line-annotated markup block for the diagnostic page.

use crate::highlight::Highlighter;
use crate::lint::ValidationFinding;
use std::collections::HashMap;

/// Width of one gutter digit, in pixels.
pub const GUTTER_PX_PER_DIGIT: usize = 8;

/// HTML fragments describing a failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub error_list_html: String,
    pub annotated_markup_html: String,
    /// Number of physical lines shown, i.e. `markup.split('\n').count()`.
    pub line_count: usize,
}

impl Diagnostics {
    pub fn gutter_width_px(&self) -> usize {
        gutter_width_px(self.line_count)
    }
}

/// Escape `& < > " '` and nothing else.
pub fn escape_html_entities(s: &str) -> String {
    html_escape::encode_quoted_attribute(s).into_owned()
}

pub fn gutter_width_px(line_count: usize) -> usize {
    line_count.to_string().len() * GUTTER_PX_PER_DIGIT
}

/// Build both diagnostic fragments for `markup` and its findings.
///
/// When several findings share a line, the last one in report order supplies
/// that line's tooltip; every finding still appears in the error list.
pub fn build_diagnostics(
    markup: &str,
    findings: &[ValidationFinding],
    highlighter: &dyn Highlighter,
) -> anyhow::Result<Diagnostics> {
    let mut parsed_errors = String::new();
    let mut by_line: HashMap<usize, &str> = HashMap::new();
    for finding in findings {
        parsed_errors.push_str(&escape_html_entities(&finding.message));
        parsed_errors.push('\n');
        parsed_errors.push_str(&format!(
            "At line {}, column {}\n\n",
            finding.line, finding.column
        ));
        by_line.insert(finding.line, &finding.message);
    }
    let error_list_html = format!(
        "<h2>Errors:</h2>\n<code class=\"validatorErrors\">{}</code>",
        parsed_errors
    );

    let mut block = String::from("<pre class='markup'>\n<code class=\"language-html\">\n");
    let mut line_count = 0;
    for (idx, line) in markup.split('\n').enumerate() {
        line_count += 1;
        let highlighted = highlighter.highlight_line(line)?;
        match by_line.get(&(idx + 1)) {
            Some(message) => block.push_str(&format!(
                "<span title='{}' class='line-numbers error'>{}</span>",
                escape_html_entities(message),
                highlighted
            )),
            None => block.push_str(&format!(
                "<span class='line-numbers'>{}</span>",
                highlighted
            )),
        }
    }
    block.push_str("</code>\n</pre>");

    Ok(Diagnostics {
        error_list_html,
        annotated_markup_html: format!("<h2>Markup used:</h2>\n{}", block),
        line_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::PlainHighlighter;
    use crate::test_helpers::finding;
    use rstest::rstest;

    #[test]
    fn escapes_only_the_five_characters() {
        assert_eq!(
            escape_html_entities(r#"<a href="x">Tom & 'Jerry' é</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27; é&lt;/a&gt;"
        );
    }

    #[rstest]
    #[case(1, 8)]
    #[case(9, 8)]
    #[case(10, 16)]
    #[case(999, 24)]
    #[case(1000, 32)]
    fn gutter_width_follows_digit_count(#[case] lines: usize, #[case] px: usize) {
        assert_eq!(gutter_width_px(lines), px);
    }

    #[test]
    fn error_list_is_escaped_and_ordered() -> anyhow::Result<()> {
        let findings = vec![
            finding(2, 5, "Element <p> is \"bad\" & 'worse'"),
            finding(1, 1, "second"),
        ];
        let d = build_diagnostics("a\nb", &findings, &PlainHighlighter)?;
        assert_eq!(
            d.error_list_html,
            "<h2>Errors:</h2>\n<code class=\"validatorErrors\">\
             Element &lt;p&gt; is &quot;bad&quot; &amp; &#x27;worse&#x27;\nAt line 2, column 5\n\n\
             second\nAt line 1, column 1\n\n</code>"
        );
        Ok(())
    }

    #[test]
    fn every_line_gets_exactly_one_wrapper() -> anyhow::Result<()> {
        let markup = "\n<html>\n\n  <body\n</html>\n";
        let findings = vec![finding(4, 3, "broken"), finding(6, 1, "eof")];
        let d = build_diagnostics(markup, &findings, &PlainHighlighter)?;

        assert_eq!(d.line_count, 6);
        assert_eq!(d.annotated_markup_html.matches("class='line-numbers").count(), 6);
        assert_eq!(
            d.annotated_markup_html
                .matches("class='line-numbers error'")
                .count(),
            2
        );
        let wrappers: Vec<&str> = d
            .annotated_markup_html
            .split("<span ")
            .skip(1)
            .collect();
        assert!(wrappers[3].starts_with("title='broken' class='line-numbers error'>  &lt;body"));
        assert!(wrappers[5].starts_with("title='eof' class='line-numbers error'>"));
        assert!(wrappers[0].starts_with("class='line-numbers'></span>"));
        Ok(())
    }

    #[test]
    fn last_finding_on_a_line_wins_the_tooltip() -> anyhow::Result<()> {
        let findings = vec![finding(1, 1, "first"), finding(1, 4, "<last>")];
        let d = build_diagnostics("<p>", &findings, &PlainHighlighter)?;
        assert!(d
            .annotated_markup_html
            .contains("title='&lt;last&gt;' class='line-numbers error'"));
        assert!(!d.annotated_markup_html.contains("title='first'"));
        assert!(d.error_list_html.contains("first\n"));
        Ok(())
    }

    #[test]
    fn block_is_wrapped_for_display() -> anyhow::Result<()> {
        let d = build_diagnostics("x", &[], &PlainHighlighter)?;
        assert_eq!(
            d.annotated_markup_html,
            "<h2>Markup used:</h2>\n<pre class='markup'>\n<code class=\"language-html\">\n\
             <span class='line-numbers'>x</span></code>\n</pre>"
        );
        assert_eq!(d.gutter_width_px(), 8);
        Ok(())
    }
}
