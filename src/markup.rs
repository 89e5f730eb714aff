// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Position-tracking HTML tokenizer and lightweight element tree.
//!
//! The tokenizer never fails: malformed constructs are recorded as
//! [`ParseError`]s and lexing resumes at the next sensible character, so rules
//! always see a complete token stream for the document.

/// 1-based line/column of a character in the original markup.
///
/// Lines are counted on `\n` boundaries, matching `str::split('\n')`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    pub value: Option<String>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub self_closing: bool,
    pub pos: Position,
}

impl StartTag {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype { pos: Position },
    StartTag(StartTag),
    EndTag { name: String, pos: Position },
    Comment { pos: Position },
    Text { pos: Position },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub pos: Position,
}

/// Elements whose end tag must be omitted.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose end tag may be omitted without it being an error.
pub const OPTIONAL_END_ELEMENTS: &[&str] = &[
    "html", "head", "body", "p", "li", "dt", "dd", "option", "optgroup", "tr", "td", "th", "thead",
    "tbody", "tfoot", "colgroup", "caption", "rb", "rt", "rp",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub fn has_optional_end(name: &str) -> bool {
    OPTIONAL_END_ELEMENTS.contains(&name)
}

struct Cursor {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    fn new(markup: &str) -> Self {
        Self {
            chars: markup.chars().collect(),
            idx: 0,
            line: 1,
            column: 1,
        }
    }

    fn pos(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.idx >= self.chars.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Case-insensitive lookahead for an ASCII literal.
    fn starts_with_ci(&self, lit: &str) -> bool {
        lit.chars()
            .enumerate()
            .all(|(i, l)| matches!(self.peek_at(i), Some(c) if c.eq_ignore_ascii_case(&l)))
    }

    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }
}

/// Tokenized document: tokens in source order plus tokenizer errors.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        let mut cur = Cursor::new(markup);
        let mut doc = Document::default();

        while !cur.at_end() {
            if cur.peek() == Some('<') {
                if cur.starts_with_ci("<!--") {
                    lex_comment(&mut cur, &mut doc);
                } else if cur.starts_with_ci("<!doctype") {
                    lex_doctype(&mut cur, &mut doc);
                } else if cur.peek_at(1) == Some('!') || cur.peek_at(1) == Some('?') {
                    lex_bogus_comment(&mut cur, &mut doc);
                } else if cur.peek_at(1) == Some('/') {
                    lex_end_tag(&mut cur, &mut doc);
                } else if matches!(cur.peek_at(1), Some(c) if c.is_ascii_alphabetic()) {
                    if let Some(raw) = lex_start_tag(&mut cur, &mut doc) {
                        lex_raw_text(&mut cur, &mut doc, &raw);
                    }
                } else {
                    lex_text(&mut cur, &mut doc, true);
                }
            } else {
                lex_text(&mut cur, &mut doc, false);
            }
        }

        doc
    }

    pub fn start_tags(&self) -> impl Iterator<Item = &StartTag> {
        self.tokens.iter().filter_map(|t| match t {
            Token::StartTag(tag) => Some(tag),
            _ => None,
        })
    }

    pub fn has_doctype(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Doctype { .. }))
    }
}

fn lex_text(cur: &mut Cursor, doc: &mut Document, leading_lt: bool) {
    let pos = cur.pos();
    if leading_lt {
        cur.bump();
    }
    while let Some(c) = cur.peek() {
        if c == '<' {
            break;
        }
        cur.bump();
    }
    doc.tokens.push(Token::Text { pos });
}

fn lex_comment(cur: &mut Cursor, doc: &mut Document) {
    let pos = cur.pos();
    cur.skip(4);
    loop {
        if cur.at_end() {
            doc.errors.push(ParseError {
                message: "Comment is not terminated, expected \"-->\"".into(),
                pos,
            });
            break;
        }
        if cur.starts_with_ci("-->") {
            cur.skip(3);
            break;
        }
        cur.bump();
    }
    doc.tokens.push(Token::Comment { pos });
}

fn lex_bogus_comment(cur: &mut Cursor, doc: &mut Document) {
    let pos = cur.pos();
    while let Some(c) = cur.bump() {
        if c == '>' {
            break;
        }
    }
    doc.tokens.push(Token::Comment { pos });
}

fn lex_doctype(cur: &mut Cursor, doc: &mut Document) {
    let pos = cur.pos();
    let mut closed = false;
    while let Some(c) = cur.bump() {
        if c == '>' {
            closed = true;
            break;
        }
    }
    if !closed {
        doc.errors.push(ParseError {
            message: "Doctype is not terminated, expected \">\"".into(),
            pos,
        });
    }
    doc.tokens.push(Token::Doctype { pos });
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_' || c == '.'
}

fn lex_name(cur: &mut Cursor) -> String {
    let mut name = String::new();
    while let Some(c) = cur.peek() {
        if !is_name_char(c) {
            break;
        }
        name.push(c.to_ascii_lowercase());
        cur.bump();
    }
    name
}

fn lex_end_tag(cur: &mut Cursor, doc: &mut Document) {
    let pos = cur.pos();
    cur.skip(2);
    let name = lex_name(cur);
    if name.is_empty() {
        doc.errors.push(ParseError {
            message: "End tag is missing a tag name".into(),
            pos,
        });
    }
    cur.skip_whitespace();
    match cur.peek() {
        Some('>') => {
            cur.bump();
        }
        Some('<') | None => doc.errors.push(ParseError {
            message: format!("End tag </{}> is missing \">\"", name),
            pos,
        }),
        Some(_) => {
            doc.errors.push(ParseError {
                message: format!("End tag </{}> must not contain attributes", name),
                pos: cur.pos(),
            });
            while let Some(c) = cur.peek() {
                if c == '<' {
                    break;
                }
                cur.bump();
                if c == '>' {
                    break;
                }
            }
        }
    }
    if !name.is_empty() {
        doc.tokens.push(Token::EndTag { name, pos });
    }
}

/// Lex a start tag; returns the element name when its content is raw text.
fn lex_start_tag(cur: &mut Cursor, doc: &mut Document) -> Option<String> {
    let pos = cur.pos();
    cur.bump();
    let name = lex_name(cur);
    let mut tag = StartTag {
        name,
        attrs: Vec::new(),
        self_closing: false,
        pos,
    };

    loop {
        cur.skip_whitespace();
        match cur.peek() {
            None => {
                doc.errors.push(ParseError {
                    message: format!("Start tag <{}> is not terminated, expected \">\"", tag.name),
                    pos,
                });
                break;
            }
            Some('>') => {
                cur.bump();
                break;
            }
            Some('/') if cur.peek_at(1) == Some('>') => {
                cur.skip(2);
                tag.self_closing = true;
                break;
            }
            Some('/') => {
                cur.bump();
            }
            Some('<') => {
                // Resume lexing at the '<' so the following tag is kept.
                doc.errors.push(ParseError {
                    message: format!(
                        "Start tag <{}> is missing \">\" before \"<\"",
                        tag.name
                    ),
                    pos: cur.pos(),
                });
                break;
            }
            Some(_) => {
                if let Some(attr) = lex_attribute(cur, doc) {
                    tag.attrs.push(attr);
                }
            }
        }
    }

    let raw = (!tag.self_closing && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()))
        .then(|| tag.name.clone());
    doc.tokens.push(Token::StartTag(tag));
    raw
}

fn lex_attribute(cur: &mut Cursor, doc: &mut Document) -> Option<Attribute> {
    let pos = cur.pos();
    let mut name = String::new();
    while let Some(c) = cur.peek() {
        if c.is_whitespace() || matches!(c, '=' | '>' | '<' | '/') {
            break;
        }
        if c == '"' || c == '\'' {
            doc.errors.push(ParseError {
                message: format!("Unexpected {} in attribute name", c),
                pos: cur.pos(),
            });
        }
        name.push(c.to_ascii_lowercase());
        cur.bump();
    }
    if name.is_empty() {
        // A stray '=' with no name; consume it so the tag loop advances.
        doc.errors.push(ParseError {
            message: "Attribute is missing a name".into(),
            pos,
        });
        cur.bump();
        return None;
    }

    let save = (cur.idx, cur.line, cur.column);
    cur.skip_whitespace();
    if cur.peek() != Some('=') {
        (cur.idx, cur.line, cur.column) = save;
        return Some(Attribute {
            name,
            value: None,
            pos,
        });
    }
    cur.bump();
    cur.skip_whitespace();

    let value = match cur.peek() {
        Some(q @ ('"' | '\'')) => {
            cur.bump();
            let mut value = String::new();
            let mut closed = false;
            while let Some(c) = cur.bump() {
                if c == q {
                    closed = true;
                    break;
                }
                value.push(c);
            }
            if !closed {
                doc.errors.push(ParseError {
                    message: format!("Attribute \"{}\" has an unterminated quoted value", name),
                    pos,
                });
            }
            value
        }
        _ => {
            let mut value = String::new();
            while let Some(c) = cur.peek() {
                if c.is_whitespace() || c == '>' || c == '<' {
                    break;
                }
                value.push(c);
                cur.bump();
            }
            value
        }
    };

    Some(Attribute {
        name,
        value: Some(value),
        pos,
    })
}

fn lex_raw_text(cur: &mut Cursor, doc: &mut Document, element: &str) {
    let pos = cur.pos();
    let close = format!("</{}", element);
    let mut consumed = false;
    while !cur.at_end() {
        if cur.starts_with_ci(&close)
            && !matches!(cur.peek_at(close.chars().count()), Some(c) if is_name_char(c))
        {
            break;
        }
        cur.bump();
        consumed = true;
    }
    if consumed {
        doc.tokens.push(Token::Text { pos });
    }
}

/// Structural problem found while building the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeIssue {
    /// End tag found while a different element was still open.
    Mismatched {
        expected: String,
        found: String,
        pos: Position,
    },
    /// End tag with no open element of that name.
    Stray { name: String, pos: Position },
    /// Element still open at the end of the document.
    Unclosed { name: String, pos: Position },
    /// End tag for a void element.
    VoidEndTag { name: String, pos: Position },
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub pos: Position,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Element arena built from a token stream.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub elements: Vec<Element>,
    pub issues: Vec<TreeIssue>,
}

/// Start tags that implicitly close an open element of the listed names.
fn implicitly_closes(open: &str, incoming: &str) -> bool {
    match incoming {
        "li" => open == "li",
        "dt" | "dd" => matches!(open, "dt" | "dd"),
        "td" | "th" => matches!(open, "td" | "th"),
        "tr" => matches!(open, "tr" | "td" | "th"),
        "option" => open == "option",
        "optgroup" => matches!(open, "optgroup" | "option"),
        "tbody" | "tfoot" => matches!(open, "thead" | "tbody" | "tr" | "td" | "th"),
        "p" | "div" | "ul" | "ol" | "dl" | "table" | "section" | "article" | "header"
        | "footer" | "nav" | "aside" | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        | "pre" | "blockquote" | "hr" | "main" | "figure" | "details" | "address" => open == "p",
        "body" => open == "head",
        _ => false,
    }
}

impl Tree {
    pub fn build(doc: &Document) -> Self {
        let mut tree = Tree::default();
        let mut stack: Vec<usize> = Vec::new();

        for token in &doc.tokens {
            match token {
                Token::StartTag(tag) => {
                    while let Some(&top) = stack.last() {
                        if implicitly_closes(&tree.elements[top].name, &tag.name) {
                            stack.pop();
                        } else {
                            break;
                        }
                    }
                    let idx = tree.push(&tag.name, tag.pos, stack.last().copied());
                    if !is_void(&tag.name) && !tag.self_closing {
                        stack.push(idx);
                    }
                }
                Token::EndTag { name, pos } => {
                    if is_void(name) {
                        tree.issues.push(TreeIssue::VoidEndTag {
                            name: name.clone(),
                            pos: *pos,
                        });
                        continue;
                    }
                    let Some(depth) = stack
                        .iter()
                        .rposition(|&i| tree.elements[i].name == *name)
                    else {
                        tree.issues.push(TreeIssue::Stray {
                            name: name.clone(),
                            pos: *pos,
                        });
                        continue;
                    };
                    for &open in &stack[depth + 1..] {
                        let open_name = &tree.elements[open].name;
                        if !has_optional_end(open_name) {
                            tree.issues.push(TreeIssue::Mismatched {
                                expected: open_name.clone(),
                                found: name.clone(),
                                pos: *pos,
                            });
                        }
                    }
                    stack.truncate(depth);
                }
                _ => {}
            }
        }

        for &open in &stack {
            let el = &tree.elements[open];
            if !has_optional_end(&el.name) {
                tree.issues.push(TreeIssue::Unclosed {
                    name: el.name.clone(),
                    pos: el.pos,
                });
            }
        }

        tree
    }

    fn push(&mut self, name: &str, pos: Position, parent: Option<usize>) -> usize {
        let idx = self.elements.len();
        self.elements.push(Element {
            name: name.to_string(),
            pos,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.elements[p].children.push(idx);
        }
        idx
    }

    pub fn find(&self, name: &str) -> impl Iterator<Item = &Element> {
        let name = name.to_string();
        self.elements.iter().filter(move |e| e.name == name)
    }

    pub fn has_child(&self, el: &Element, name: &str) -> bool {
        el.children.iter().any(|&c| self.elements[c].name == name)
    }
}
