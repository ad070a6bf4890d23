//! HTML rendering of transcript turns
//!
//! Seeker turns and plain guide replies are rendered as Markdown with any
//! raw HTML escaped and link targets limited to web and mail addresses. Styled guide replies go through the formatter and their
//! markup is passed through verbatim.
//!
//! NOTE: the passthrough trusts model output. Anything the model emits
//! inside a styled reply, `<script>` included, reaches the page unescaped.

use crate::format::{format_response, is_styled};
use crate::session::{Role, Turn};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use serde::Serialize;

/// A turn ready for display
#[derive(Debug, Clone, Serialize)]
pub struct RenderedTurn {
    pub role: Role,
    /// Raw turn content as stored in the transcript
    pub content: String,
    pub html: String,
    /// Whether `html` carries trusted markup from the model
    pub styled: bool,
}

pub fn render_turn(turn: &Turn) -> RenderedTurn {
    let styled = turn.role() == Role::Guide && is_styled(turn.content());
    let html = if styled {
        render_markdown(&format_response(turn.content()), true)
    } else {
        render_markdown(turn.content(), false)
    };

    RenderedTurn {
        role: turn.role(),
        content: turn.content().to_string(),
        html,
        styled,
    }
}

pub fn render_turns<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> Vec<RenderedTurn> {
    turns.into_iter().map(render_turn).collect()
}

/// Schemes a rendered link or image may point at. Relative targets have none.
const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Render Markdown to HTML. Unless `allow_html` is set, raw HTML in the
/// source is emitted as escaped text and unsafe link targets are blanked.
fn render_markdown(source: &str, allow_html: bool) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES);
    let mut out = String::with_capacity(source.len() * 3 / 2);

    if allow_html {
        html::push_html(&mut out, parser);
    } else {
        let escaped = parser.map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) if !is_safe_destination(&dest_url) => Event::Start(Tag::Link {
                link_type,
                dest_url: CowStr::Borrowed(""),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) if !is_safe_destination(&dest_url) => Event::Start(Tag::Image {
                link_type,
                dest_url: CowStr::Borrowed(""),
                title,
                id,
            }),
            other => other,
        });
        html::push_html(&mut out, escaped);
    }

    out
}

fn is_safe_destination(dest: &str) -> bool {
    let Some((scheme, _)) = dest.trim_start().split_once(':') else {
        return true;
    };
    // A colon after a path, query or fragment start is not a scheme separator
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    SAFE_SCHEMES
        .iter()
        .any(|safe| scheme.eq_ignore_ascii_case(safe))
}
