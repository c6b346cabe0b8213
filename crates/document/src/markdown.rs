//! Markdown to HTML body rendering.
//!
//! Everything is delegated to [`pulldown_cmark`] except fenced diagram blocks,
//! which are intercepted and replaced with a diagram container holding the
//! escaped source text (see [`is_diagram_fence`]).

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

/// The fence language that marks a block as a Mermaid diagram.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";
/// CSS class carried by every diagram container. The bootstrap script selects on it.
pub const DIAGRAM_CLASS: &str = "mermaid";

/// Rendered HTML body and the number of diagram containers within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub html: String,
    pub diagrams: usize,
}

/// Decides whether a fenced code block's info string marks a diagram.
///
/// Only the first whitespace-separated token counts, so attributes after the
/// language (```` ```mermaid title="x" ````) are ignored.
pub fn is_diagram_fence(info: &str) -> bool {
    info.split_whitespace().next().is_some_and(|lang| lang.eq_ignore_ascii_case(DIAGRAM_LANGUAGE))
}

/// Wraps raw diagram source in a container element.
pub fn diagram_container(source: &str) -> String {
    let source = source.strip_suffix('\n').unwrap_or(source);
    let source = source.strip_suffix('\r').unwrap_or(source);
    format!("<pre class=\"{DIAGRAM_CLASS}\">{}</pre>\n", htmlize::escape_text(source))
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Renders Markdown into an HTML fragment.
pub fn render(markdown: &str) -> Body {
    let mut diagrams = 0;
    // Source of the diagram block currently being collected, if any.
    let mut pending: Option<String> = None;
    let events = Parser::new_ext(markdown, options()).filter_map(|event| {
        if let Some(source) = pending.as_mut() {
            match event {
                Event::Text(text) => source.push_str(&text),
                Event::End(TagEnd::CodeBlock) => {
                    diagrams += 1;
                    let source = pending.take().unwrap_or_default();
                    return Some(Event::Html(CowStr::from(diagram_container(&source))));
                },
                _ => {},
            }
            return None;
        }
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info))) if is_diagram_fence(info) => {
                pending = Some(String::new());
                None
            },
            event => Some(event),
        }
    });
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, events);
    tracing::debug!(diagrams, bytes = body.len(), "Markdown rendered to HTML body");
    Body { html: body, diagrams }
}
