use notepad_core::sanitize::{is_allowed_attr, is_allowed_tag};
use notepad_core::sanitize::tree::{parse_fragment, Node};
use notepad_core::{plain_text, sanitize_markup};

const PASTED_SAMPLES: &[&str] = &[
    "<script>bad</script><p>hi <b>there</b></p>",
    "<div class=\"x\"><a href=\"https://example.com\" onclick=\"steal()\">link <em>text</em></a></div>",
    "<table><tr><td>cell <font face=\"Arial\" color=\"red\">one</font></td></tr></table>",
    "<p>unclosed <b>bold <i>italic",
    "</p>stray end tags</div>",
    "<img src=x onerror=alert(1)>caption",
    "<ul><li>one</li><li>two<ol><li>nested</li></ol></li></ul>",
    "<style>p { color: red }</style><pre><code>let x = 1 &lt; 2;</code></pre>",
    "<svg><circle r=\"4\"/></svg><span style=\"font-weight:bold\" id=\"s\">kept</span>",
    "plain &amp; simple &nbsp; text",
    "",
    "   ",
];

#[test]
fn script_content_is_dropped() {
    assert_eq!(
        sanitize_markup("<script>bad</script><p>hi <b>there</b></p>"),
        "<p>hi <b>there</b></p>"
    );
}

#[test]
fn sanitizing_is_idempotent() {
    for sample in PASTED_SAMPLES {
        let once = sanitize_markup(sample);
        assert_eq!(sanitize_markup(&once), once, "sample {sample:?}");
    }
}

#[test]
fn output_only_contains_allowed_tags_and_attributes() {
    for sample in PASTED_SAMPLES {
        let clean = sanitize_markup(sample);
        assert!(!clean.is_empty(), "sample {sample:?}");
        assert_allowed(&parse_fragment(&clean), sample);
    }
}

#[test]
fn unwrapping_keeps_visible_text() {
    for sample in PASTED_SAMPLES {
        let before = plain_text(sample);
        let after = plain_text(&sanitize_markup(sample));
        assert_eq!(
            before.split_whitespace().collect::<Vec<_>>(),
            after.split_whitespace().collect::<Vec<_>>(),
            "sample {sample:?}"
        );
    }
}

fn assert_allowed(nodes: &[Node], sample: &str) {
    for node in nodes {
        if let Node::Element(element) = node {
            assert!(is_allowed_tag(&element.name), "tag {} from {sample:?}", element.name);
            for (name, _) in &element.attrs {
                assert!(is_allowed_attr(name), "attr {name} from {sample:?}");
            }
            assert_allowed(&element.children, sample);
        }
    }
}
