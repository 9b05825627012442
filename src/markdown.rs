use pulldown_cmark::{html, Event, Options, Parser};

/// Converts markdown to HTML. Tables and footnotes are enabled, and every
/// soft line break is rendered as a hard break (`<br />`) so that single
/// newlines in a draft survive into the page.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TABLES);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut out,
        Parser::new_ext(markdown, options).map(convert_event),
    );
    out
}

fn convert_event(ev: Event) -> Event {
    match ev {
        Event::SoftBreak => Event::HardBreak,
        _ => ev,
    }
}
