//! Allow-list sanitization of editor markup.
//!
//! # Responsibility
//! - Reduce arbitrary contenteditable markup to a fixed safe subset.
//! - Provide the plain-text projection used for search and counters.
//!
//! # Invariants
//! - Output is never empty; an empty result becomes [`EMPTY_PARAGRAPH`].
//! - `sanitize_markup(sanitize_markup(x)) == sanitize_markup(x)`.
//! - Malformed markup never errors; it degrades to text.
//! - Disallowed wrappers are unwrapped, except elements whose content is
//!   never document text (`script`, `style`, ...), which are discarded whole.

pub mod tree;

use self::tree::{append_node, parse_fragment, serialize, text_content, Element, Node};

/// Marker inserted whenever sanitized content would be empty.
pub const EMPTY_PARAGRAPH: &str = "<p></p>";

const ALLOWED_TAGS: &[&str] = &[
    "p",
    "br",
    "div",
    "span",
    "b",
    "i",
    "u",
    "s",
    "strong",
    "em",
    "ul",
    "ol",
    "li",
    "blockquote",
    "pre",
    "code",
    "hr",
    "font",
];

const ALLOWED_ATTRS: &[&str] = &["style", "face", "size"];

const DISCARDED_TAGS: &[&str] = &[
    "script", "style", "template", "noscript", "iframe", "object", "embed", "head", "title",
];

/// Returns whether `name` survives sanitization as an element.
pub fn is_allowed_tag(name: &str) -> bool {
    ALLOWED_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Returns whether attribute `name` survives on an allowed element.
pub fn is_allowed_attr(name: &str) -> bool {
    ALLOWED_ATTRS.iter().any(|attr| attr.eq_ignore_ascii_case(name))
}

fn is_discarded_tag(name: &str) -> bool {
    DISCARDED_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Sanitizes markup down to the allow-listed subset.
pub fn sanitize_markup(markup: &str) -> String {
    let mut nodes = parse_fragment(markup);
    clean_children(&mut nodes);
    let html = serialize(&nodes);
    if html.is_empty() {
        EMPTY_PARAGRAPH.to_string()
    } else {
        html
    }
}

/// Cleans a child list in place.
///
/// Works on a snapshot of the list so splicing unwrapped grandchildren into
/// position never disturbs iteration; spliced nodes are cleaned before they
/// are inserted.
fn clean_children(children: &mut Vec<Node>) {
    let snapshot = std::mem::take(children);
    for node in snapshot {
        match node {
            Node::Text(text) => append_node(children, Node::Text(text)),
            Node::Element(element) => clean_element(children, element),
        }
    }
}

fn clean_element(parent: &mut Vec<Node>, mut element: Element) {
    if is_discarded_tag(&element.name) {
        return;
    }

    if !is_allowed_tag(&element.name) {
        let mut grandchildren = std::mem::take(&mut element.children);
        clean_children(&mut grandchildren);
        for child in grandchildren {
            append_node(parent, child);
        }
        return;
    }

    element.attrs.retain(|(name, _)| is_allowed_attr(name));
    clean_children(&mut element.children);
    parent.push(Node::Element(element));
}

/// Returns the text-only projection of markup.
pub fn plain_text(markup: &str) -> String {
    let nodes = parse_fragment(markup);
    text_content(&nodes, &|element: &Element| is_discarded_tag(&element.name))
}

/// Counts whitespace-separated words of the plain-text projection.
pub fn word_count(markup: &str) -> usize {
    plain_text(markup).split_whitespace().count()
}

/// Counts characters of the plain-text projection.
pub fn char_count(markup: &str) -> usize {
    plain_text(markup).chars().count()
}

#[cfg(test)]
mod tests {
    use super::tree::MAX_NESTING_DEPTH;
    use super::{char_count, plain_text, sanitize_markup, word_count, EMPTY_PARAGRAPH};

    #[test]
    fn script_is_dropped_with_its_text() {
        assert_eq!(
            sanitize_markup("<script>bad</script><p>hi <b>there</b></p>"),
            "<p>hi <b>there</b></p>"
        );
    }

    #[test]
    fn angle_brackets_inside_raw_text_do_not_swallow_following_content() {
        assert_eq!(
            sanitize_markup("<script>if (a<b) x</script><p>keep</p>"),
            "<p>keep</p>"
        );
        assert_eq!(
            sanitize_markup("<style>a<b{}</style><p>keep</p>"),
            "<p>keep</p>"
        );
        assert_eq!(
            sanitize_markup("<noscript><p>hidden</noscript><b>shown</b>"),
            "<b>shown</b>"
        );
        assert_eq!(plain_text("<script>1 < 2</script>after"), "after");
    }

    #[test]
    fn textarea_body_is_kept_as_text() {
        assert_eq!(
            sanitize_markup("<textarea><b>not bold</b></textarea>"),
            "&lt;b&gt;not bold&lt;/b&gt;"
        );
    }

    #[test]
    fn deeply_nested_markup_is_flattened_not_fatal() {
        let bold = sanitize_markup(&("<b>".repeat(10_000) + "x"));
        assert_eq!(bold.matches("<b>").count(), MAX_NESTING_DEPTH);
        assert!(bold.contains('x'));
        assert_eq!(sanitize_markup(&bold), bold);

        let divs = "<div>".repeat(200_000) + "deep" + &"</div>".repeat(200_000);
        let clean = sanitize_markup(&divs);
        assert_eq!(plain_text(&clean), "deep");
        assert_eq!(word_count(&divs), 1);
    }

    #[test]
    fn script_past_the_nesting_cap_stays_hidden() {
        let markup = "<span>".repeat(MAX_NESTING_DEPTH + 5) + "<script>evil()</script>ok";
        let clean = sanitize_markup(&markup);
        assert!(!clean.contains("evil"));
        assert!(clean.contains("ok"));
    }

    #[test]
    fn unknown_wrappers_are_unwrapped_in_place() {
        assert_eq!(
            sanitize_markup("<p>a <a href=\"x\">link</a> b</p>"),
            "<p>a link b</p>"
        );
        assert_eq!(
            sanitize_markup("<section><h1>Title</h1><p>body</p></section>"),
            "Title<p>body</p>"
        );
    }

    #[test]
    fn nested_disallowed_content_is_cleaned_after_unwrapping() {
        assert_eq!(
            sanitize_markup("<article><script>x</script><img src=y><i onclick=z>ok</i></article>"),
            "<i>ok</i>"
        );
    }

    #[test]
    fn only_allowed_attributes_survive() {
        assert_eq!(
            sanitize_markup(
                r#"<font face="serif" size="5" color="red"><span style="color: red" class="c" onclick="x()">t</span></font>"#
            ),
            r#"<font face="serif" size="5"><span style="color: red">t</span></font>"#
        );
    }

    #[test]
    fn empty_and_allow_list_free_input_yield_marker() {
        assert_eq!(sanitize_markup(""), EMPTY_PARAGRAPH);
        assert_eq!(sanitize_markup("<img src=x><!-- c -->"), EMPTY_PARAGRAPH);
        assert_eq!(sanitize_markup("<style>p{}</style>"), EMPTY_PARAGRAPH);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "<script>bad</script><p>hi <b>there</b></p>",
            "<div><p>unclosed <em>nested",
            "text &amp; <mark>marked</mark> &lt;tag&gt;&nbsp;",
            r#"<ul><li style="x">a</li><li><a href=y>b</a></li></ul><hr><br/>"#,
            "</p></div>stray",
            "<table><tr><td>cell</td></tr></table>",
            "<pre><code>fn main() {}</code></pre>",
            "",
        ];
        for input in inputs {
            let once = sanitize_markup(input);
            assert_eq!(sanitize_markup(&once), once, "input: {input}");
            assert!(!once.is_empty());
        }
    }

    #[test]
    fn malformed_markup_degrades_to_text() {
        assert_eq!(sanitize_markup("a < b && c"), "a &lt; b &amp;&amp; c");
    }

    #[test]
    fn plain_text_and_counts() {
        let html = "<p>Hello <b>big</b>\n world</p><p>again</p>";
        assert_eq!(plain_text(html), "Hello big\n worldagain");
        assert_eq!(word_count(html), 3);
        assert_eq!(word_count("<p>   </p>"), 0);
        assert_eq!(char_count("<p>héllo</p>"), 5);
        assert_eq!(char_count(EMPTY_PARAGRAPH), 0);
    }
}
