//! Markdown to HTML for the live preview pane.
//!
//! Raw HTML in the source is shown as text rather than interpreted, and
//! script URLs in links and images are replaced with `#`.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

pub fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options()).map(sanitize);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) => Event::Html(escape(raw)),
        Event::InlineHtml(raw) => Event::InlineHtml(escape(raw)),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn escape(raw: CowStr<'_>) -> CowStr<'_> {
    CowStr::from(html_escape::encode_text(&*raw).into_owned())
}

fn neutralize(url: CowStr<'_>) -> CowStr<'_> {
    if is_blocked(&url) {
        log::debug!("Dropping script URL from preview: {url}");
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Browsers ignore whitespace and control characters inside the scheme
fn is_blocked(url: &str) -> bool {
    let scheme: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCKED_SCHEMES
        .iter()
        .any(|blocked| scheme.starts_with(blocked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_basic_markdown() {
        assert_eq!(
            render_html("# Title\n\nSome **bold** text"),
            "<h1>Title</h1>\n<p>Some <strong>bold</strong> text</p>\n"
        );
    }

    #[test]
    fn test_extensions_enabled() {
        let html = render_html("~~gone~~\n\n- [x] done\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");

        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("type=\"checkbox\""));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_block_html_is_escaped() {
        let html = render_html("<script>alert(1)</script>\n");

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_inline_html_is_escaped() {
        let html = render_html("hello <img src=x onerror=alert(1)> world");

        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));
    }

    #[rstest]
    #[case("[x](javascript:alert(1))")]
    #[case("[x](JavaScript:alert(1))")]
    #[case("[x](vbscript:msgbox)")]
    #[case("![x](javascript:alert(1))")]
    fn test_script_urls_are_neutralized(#[case] source: &str) {
        let html = render_html(source);

        assert!(!html.to_lowercase().contains("script:"), "{html}");
        assert!(html.contains("\"#\""));
    }

    #[test]
    fn test_regular_links_kept() {
        assert_eq!(
            render_html("[docs](https://example.com)"),
            "<p><a href=\"https://example.com\">docs</a></p>\n"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render_html(""), "");
    }
}
