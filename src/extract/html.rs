use super::{ExtractError, Method};
use scraper::{Html, Node};

pub(crate) const METHODS: &[Method] = &[("html", extract_text)];

/// Elements whose content is never visible text
const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line of text
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    Ok(html_to_text(bytes))
}

/// Visible text of an HTML document, one trimmed single-spaced line per
/// text line, empty lines dropped
///
/// # Examples
///
/// ```
/// use webharvest::extract::html_to_text;
///
/// let text = html_to_text(b"<p>One   two</p><script>x()</script><p>three</p>");
/// assert_eq!(text, "One two\nthree");
/// ```
pub fn html_to_text(bytes: &[u8]) -> String {
    let document = Html::parse_document(&String::from_utf8_lossy(bytes));
    let mut raw = String::new();
    collect_text(&document, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(document: &Html, out: &mut String) {
    // (node, closing): a closing entry ends the line a block element opened
    let mut stack = vec![(*document.root_element(), false)];

    while let Some((node, closing)) = stack.pop() {
        if closing {
            out.push('\n');
            continue;
        }

        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if HIDDEN.contains(&name) {
                    continue;
                }
                if BLOCKS.contains(&name) {
                    out.push('\n');
                    stack.push((node, true));
                }
                let start = stack.len();
                stack.extend(node.children().map(|child| (child, false)));
                stack[start..].reverse();
            }
            _ => {}
        }
    }
}
