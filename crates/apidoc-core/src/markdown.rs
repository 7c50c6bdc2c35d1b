//! Markdown rendering for the fields a plugin flags as Markdown.

use pulldown_cmark::{html, Options, Parser};

/// Renders Markdown source to an HTML fragment.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, text: &str) -> String;
}

/// CommonMark renderer (tables and strikethrough enabled).
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMark;

impl MarkdownRenderer for CommonMark {
    fn render(&self, text: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(text, options);
        let mut out = String::new();
        html::push_html(&mut out, parser);
        out
    }
}

/// Render `text` and normalize the HTML for storage in a block.
///
/// Line breaks outside `<pre>` become spaces and the result is trimmed.
/// With `strip_p`, `<p>`/`</p>` tags are removed (inline fields like `type`).
pub fn render_field(renderer: &dyn MarkdownRenderer, text: &str, strip_p: bool) -> String {
    let html = renderer.render(text);
    let html = collapse_newlines_outside_pre(&html);
    let html = html.trim();
    if strip_p {
        html.replace("<p>", "").replace("</p>", "")
    } else {
        html.to_string()
    }
}

fn collapse_newlines_outside_pre(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find("<pre") {
        out.push_str(&flatten(&rest[..start]));
        let pre = &rest[start..];
        match pre.find("</pre>") {
            Some(end) => {
                let end = end + "</pre>".len();
                out.push_str(&pre[..end]);
                rest = &pre[end..];
            }
            None => {
                out.push_str(pre);
                rest = "";
            }
        }
    }
    out.push_str(&flatten(rest));
    out
}

fn flatten(segment: &str) -> String {
    segment.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
