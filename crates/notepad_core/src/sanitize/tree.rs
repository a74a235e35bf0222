//! Generic markup tree used by the sanitizer.
//!
//! # Responsibility
//! - Parse a markup fragment into owned element/text nodes.
//! - Serialize a node list back to markup.
//!
//! # Invariants
//! - Parsing never fails: unmatched end tags are dropped, unclosed elements
//!   are closed at end of input, comments and doctypes are ignored.
//! - Adjacent text nodes are merged, so `parse(serialize(nodes))` rebuilds
//!   the same tree for any tree produced by `parse`.
//! - Script and raw-text element bodies are read as text up to their own
//!   end tag, never as markup.
//! - Ordinary elements nest at most [`MAX_NESTING_DEPTH`] deep; deeper start
//!   tags are dropped and their content stays in the innermost open element.
//!   Raw-text elements still open there, since they only hold text.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::cell::RefCell;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Deepest element nesting kept by [`parse_fragment`].
pub const MAX_NESTING_DEPTH: usize = 512;

/// One node of a parsed fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Element node with lowercase name and attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }
}

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[derive(Debug)]
enum RawToken {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End(String),
    Text(String),
}

struct TokenCollector {
    tokens: RefCell<Vec<RawToken>>,
}

impl TokenSink for TokenCollector {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => {
                let name = tag.name.to_string();
                match tag.kind {
                    TagKind::StartTag => {
                        let attrs = tag
                            .attrs
                            .iter()
                            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                            .collect();
                        let raw_kind = raw_content_kind(&name);
                        self.tokens
                            .borrow_mut()
                            .push(RawToken::Start { name, attrs });
                        if let Some(kind) = raw_kind {
                            return TokenSinkResult::RawData(kind);
                        }
                    }
                    TagKind::EndTag => self.tokens.borrow_mut().push(RawToken::End(name)),
                }
            }
            Token::CharacterTokens(text) => {
                self.tokens
                    .borrow_mut()
                    .push(RawToken::Text(text.to_string()));
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Tokenizer state for elements whose body is not markup.
fn raw_content_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "style" | "noscript" | "iframe" | "template" | "xmp" | "noembed" | "noframes" => {
            Some(RawKind::Rawtext)
        }
        "title" | "textarea" => Some(RawKind::Rcdata),
        _ => None,
    }
}

fn tokenize(markup: &str) -> Vec<RawToken> {
    let sink = TokenCollector {
        tokens: RefCell::new(Vec::new()),
    };
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let queue = BufferQueue::default();
    queue.push_back(StrTendril::from(markup));
    let _ = tokenizer.feed(&queue);
    tokenizer.end();
    tokenizer.sink.tokens.into_inner()
}

/// Parses a markup fragment into a node list.
pub fn parse_fragment(markup: &str) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut open: Vec<Element> = Vec::new();

    for token in tokenize(markup) {
        match token {
            RawToken::Start { name, attrs } => {
                let element = Element {
                    name,
                    attrs,
                    children: Vec::new(),
                };
                if element.is_void() {
                    append_node(current_children(&mut root, &mut open), Node::Element(element));
                } else if open.len() < MAX_NESTING_DEPTH
                    || raw_content_kind(&element.name).is_some()
                {
                    open.push(element);
                }
            }
            RawToken::End(name) => {
                let Some(position) = open.iter().rposition(|element| element.name == name) else {
                    continue;
                };
                while open.len() > position {
                    close_innermost(&mut root, &mut open);
                }
            }
            RawToken::Text(text) => {
                append_node(current_children(&mut root, &mut open), Node::Text(text));
            }
        }
    }

    while !open.is_empty() {
        close_innermost(&mut root, &mut open);
    }
    root
}

fn current_children<'a>(root: &'a mut Vec<Node>, open: &'a mut [Element]) -> &'a mut Vec<Node> {
    match open.last_mut() {
        Some(element) => &mut element.children,
        None => root,
    }
}

fn close_innermost(root: &mut Vec<Node>, open: &mut Vec<Element>) {
    if let Some(element) = open.pop() {
        append_node(current_children(root, open), Node::Element(element));
    }
}

/// Appends a node, merging text into a trailing text sibling.
pub fn append_node(children: &mut Vec<Node>, node: Node) {
    match node {
        Node::Text(text) => {
            if text.is_empty() {
                return;
            }
            if let Some(Node::Text(last)) = children.last_mut() {
                last.push_str(&text);
            } else {
                children.push(Node::Text(text));
            }
        }
        element => children.push(element),
    }
}

/// Serializes nodes to markup.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => escape_into(out, text, false),
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(out, value, true);
                out.push('"');
            }
            out.push('>');
            if element.is_void() {
                return;
            }
            for child in &element.children {
                write_node(out, child);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
    }
}

fn escape_into(out: &mut String, value: &str, attribute: bool) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

/// Escapes text for inclusion in markup outside the sanitizer.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    escape_into(&mut out, value, false);
    out
}

/// Concatenates text nodes in document order, skipping subtrees for which
/// `skip` returns true.
pub fn text_content(nodes: &[Node], skip: &dyn Fn(&Element) -> bool) -> String {
    let mut out = String::new();
    collect_text(&mut out, nodes, skip);
    out
}

fn collect_text(out: &mut String, nodes: &[Node], skip: &dyn Fn(&Element) -> bool) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if !skip(element) => {
                collect_text(out, &element.children, skip);
            }
            Node::Element(_) => {}
        }
    }
}
