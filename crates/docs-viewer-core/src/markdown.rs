//! Markdown to HTML, with diagram blocks handed to their rendering engines.
//!
//! Fenced `mermaid` blocks become `<div class="mermaid">` containers holding
//! the escaped source for the client-side diagram engine. Fenced `plantuml`
//! blocks become an image served by a PlantUML server, using its hex (`~h`)
//! source encoding. Other fenced blocks keep their `language-*` class for the
//! client highlighter. Soft line breaks render as hard breaks.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Public PlantUML rendering service.
pub const DEFAULT_PLANTUML_SERVER: &str = "https://www.plantuml.com/plantuml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Diagram {
    Mermaid,
    PlantUml,
}

impl Diagram {
    fn from_info(info: &str) -> Option<Self> {
        match info.split_whitespace().next()?.to_lowercase().as_str() {
            "mermaid" => Some(Diagram::Mermaid),
            "plantuml" | "puml" => Some(Diagram::PlantUml),
            _ => None,
        }
    }
}

/// Summary of a markdown conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub mermaid_blocks: usize,
    pub plantuml_blocks: usize,
}

/// Convert markdown to HTML.
pub fn render_markdown(source: &str, plantuml_server: &str) -> RenderedMarkdown {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;

    let mut events: Vec<Event> = Vec::new();
    let mut pending: Option<(Diagram, String)> = None;
    let mut mermaid_blocks = 0;
    let mut plantuml_blocks = 0;

    for event in Parser::new_ext(source, options) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info)))
                if Diagram::from_info(info).is_some() =>
            {
                pending = Diagram::from_info(info).map(|d| (d, String::new()));
            }
            Event::Text(text) if pending.is_some() => {
                if let Some((_, code)) = pending.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) if pending.is_some() => {
                if let Some((diagram, code)) = pending.take() {
                    let block = match diagram {
                        Diagram::Mermaid => {
                            mermaid_blocks += 1;
                            mermaid_html(mermaid_blocks - 1, &code)
                        }
                        Diagram::PlantUml => {
                            plantuml_blocks += 1;
                            plantuml_html(plantuml_server, &code)
                        }
                    };
                    events.push(Event::Html(CowStr::from(block)));
                }
            }
            Event::SoftBreak => events.push(Event::HardBreak),
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());

    RenderedMarkdown {
        html: out,
        mermaid_blocks,
        plantuml_blocks,
    }
}

fn mermaid_html(index: usize, code: &str) -> String {
    format!(
        "<div class=\"mermaid\" data-id=\"mermaid-{}\">{}</div>\n",
        index,
        escape_html(code.trim())
    )
}

fn plantuml_html(server: &str, code: &str) -> String {
    format!(
        "<div class=\"plantuml-diagram\"><img src=\"{}\" alt=\"PlantUML Diagram\" /></div>\n",
        escape_html(&plantuml_url(server, code))
    )
}

/// Image URL for a PlantUML source on the given server.
pub fn plantuml_url(server: &str, code: &str) -> String {
    format!(
        "{}/svg/~h{}",
        server.trim_end_matches('/'),
        hex::encode(code.trim().as_bytes())
    )
}

/// HTML-escape text placed in element content or double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Infallible for `String`.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}
