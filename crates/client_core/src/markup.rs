//! Lightweight itinerary markup.
//!
//! Itinerary text is rendered by an ordered list of substitutions applied over
//! the whole body, not by a structural parse. Nested or overlapping markers are
//! undefined and may come out mis-tagged. Rendering only accepts an
//! [`ItineraryResult`], so already-rendered output can never be fed back in.

use std::sync::LazyLock;

use regex::Regex;
use shared::domain::ItineraryResult;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

// Order matters: strong before emphasis so `**` is not read as two `*`.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        (r"\*\*\*(.+?)\*\*\*", "<strong><em>${1}</em></strong>"),
        (r"\*\*(.+?)\*\*", "<strong>${1}</strong>"),
        (r"\*(.+?)\*", "<em>${1}</em>"),
        (r"(?m)^###[ \t](.+)$", "<h3>${1}</h3>"),
        (r"(?m)^##[ \t](.+)$", "<h2>${1}</h2>"),
        (r"(?m)^#[ \t](.+)$", "<h1>${1}</h1>"),
        (r"\n", "<br>"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| Rule {
        pattern: Regex::new(pattern).expect("markup rule pattern"),
        replacement,
    })
    .collect()
});

const LINE_BREAK: &str = "<br>";

#[derive(Debug, Clone, Copy)]
enum Tag {
    Strong(bool),
    Emphasis(bool),
    Heading(u8, bool),
}

const TAGS: &[(&str, Tag)] = &[
    ("<strong>", Tag::Strong(true)),
    ("</strong>", Tag::Strong(false)),
    ("<em>", Tag::Emphasis(true)),
    ("</em>", Tag::Emphasis(false)),
    ("<h1>", Tag::Heading(1, true)),
    ("</h1>", Tag::Heading(1, false)),
    ("<h2>", Tag::Heading(2, true)),
    ("</h2>", Tag::Heading(2, false)),
    ("<h3>", Tag::Heading(3, true)),
    ("</h3>", Tag::Heading(3, false)),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub strong: bool,
    pub emphasis: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedLine {
    /// Heading level 1..=3, `None` for body text.
    pub heading: Option<u8>,
    pub spans: Vec<Span>,
}

impl RenderedLine {
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItinerary {
    markup: String,
}

impl RenderedItinerary {
    /// The marked-up string (`<strong>`, `<em>`, `<h1>`..`<h3>`, `<br>`).
    pub fn as_markup(&self) -> &str {
        &self.markup
    }

    pub fn lines(&self) -> Vec<RenderedLine> {
        self.markup.split(LINE_BREAK).map(parse_line).collect()
    }
}

pub fn render(result: &ItineraryResult) -> RenderedItinerary {
    let normalized = result.raw_text.replace("\r\n", "\n");
    let mut markup = escape(&normalized);
    for rule in RULES.iter() {
        markup = rule
            .pattern
            .replace_all(&markup, rule.replacement)
            .into_owned();
    }
    RenderedItinerary { markup }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// Every `<` left in the markup is a tag emitted by a rule; raw ones were escaped.
fn parse_line(segment: &str) -> RenderedLine {
    let mut line = RenderedLine::default();
    let mut strong = false;
    let mut emphasis = false;
    let mut pending = String::new();
    let mut rest = segment;

    while let Some(index) = rest.find('<') {
        pending.push_str(&rest[..index]);
        rest = &rest[index..];

        let Some((literal, tag)) = TAGS.iter().find(|(literal, _)| rest.starts_with(literal))
        else {
            pending.push('<');
            rest = &rest[1..];
            continue;
        };

        flush_span(&mut line, &mut pending, strong, emphasis);
        match *tag {
            Tag::Strong(open) => strong = open,
            Tag::Emphasis(open) => emphasis = open,
            Tag::Heading(level, true) => line.heading = Some(level),
            Tag::Heading(_, false) => {}
        }
        rest = &rest[literal.len()..];
    }
    pending.push_str(rest);
    flush_span(&mut line, &mut pending, strong, emphasis);

    line
}

fn flush_span(line: &mut RenderedLine, pending: &mut String, strong: bool, emphasis: bool) {
    if pending.is_empty() {
        return;
    }
    line.spans.push(Span {
        text: unescape(pending),
        strong,
        emphasis,
    });
    pending.clear();
}
