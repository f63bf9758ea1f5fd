//! The inline markup understood by [`TextFlow`](super::TextFlow).
//!
//! Markup is a small, closed vocabulary of `<name attr='v'>…</name>` tags.
//! Every style registered in the [`StyleRegistry`] is a tag, `p`, `span` and
//! `n` are inert carriers for attributes, and `<br>` forces a line break.
//! Anything else is kept as literal text. Problems with attribute values are
//! reported as diagnostics and the attribute is ignored.
//!
//! Supported attributes on any tag:
//!
//! - `width`: lay the tag's text out in a box this many points wide
//! - `align`: alignment of the text inside a `width` box
//! - `nowrap`: never break the tag's text across lines
//! - `y` / `ypos`: shift the baseline up (positive) or down, in points
//! - `strike`: strike the text through; an empty value uses the default
//!   thickness, a number sets the thickness in points

use super::align::Align;
use crate::error::Error;
use crate::style::{ResolvedStyle, StyleRegistry};
use crate::units::Pt;

const TABSIZE: usize = 4;

/// A strike-through line over a span
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Strike {
    /// Rule thickness; the default depends on the font size
    pub thickness: Option<Pt>,
}

/// Per-span modifiers set through tag attributes
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SpanModifiers {
    /// Baseline shift, positive moves the text up
    pub baseline_shift: Pt,
    pub nowrap: bool,
    pub strike: Option<Strike>,
    /// Draw the span in a box of exactly this width
    pub fixed_width: Option<Pt>,
    /// Alignment of the text inside the fixed width box
    pub align: Align,
}

/// A run of text sharing one resolved style
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: ResolvedStyle,
    pub modifiers: SpanModifiers,
}

/// The output of parsing: styled spans interleaved with hard line breaks
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Text(Span),
    Break,
}

/// What a tag name refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// A registered style
    Style(String),
    /// `p`, `span` or `n`: carries attributes, does not change the style
    Inert,
    /// `br`
    LineBreak,
    /// Any other name; the tag is rendered as literal text
    Unrecognized(String),
}

impl Tag {
    pub fn classify(name: &str, styles: &StyleRegistry) -> Tag {
        if styles.contains(name) {
            return Tag::Style(name.to_string());
        }
        match name {
            "p" | "span" | "n" => Tag::Inert,
            "br" => Tag::LineBreak,
            _ => Tag::Unrecognized(name.to_string()),
        }
    }
}

/// Parsed markup plus every attribute problem found along the way
#[derive(Debug, Default)]
pub struct Markup {
    pub pieces: Vec<Piece>,
    pub diagnostics: Vec<Error>,
}

impl Markup {
    /// The spans in order, without the line breaks
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Text(span) => Some(span),
            Piece::Break => None,
        })
    }
}

#[derive(Debug)]
struct RawTag {
    name: String,
    attributes: Vec<(String, String)>,
    closing: bool,
    self_closing: bool,
}

struct Frame {
    name: String,
    style: ResolvedStyle,
    modifiers: SpanModifiers,
}

/// Parse `text` into spans, starting from the `base` style
pub fn parse(text: &str, styles: &StyleRegistry, base: &ResolvedStyle) -> Markup {
    let text = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', &" ".repeat(TABSIZE));

    let mut parser = Parser {
        styles,
        stack: vec![Frame {
            name: String::new(),
            style: base.clone(),
            modifiers: SpanModifiers::default(),
        }],
        buffer: String::new(),
        markup: Markup::default(),
    };

    let mut rest = text.as_str();
    while let Some(open) = rest.find('<') {
        parser.push_text(&rest[..open]);
        rest = &rest[open..];

        match parse_tag(rest) {
            Some((tag, consumed)) => {
                parser.handle_tag(tag, &rest[..consumed]);
                rest = &rest[consumed..];
            }
            None => {
                parser.push_text("<");
                rest = &rest[1..];
            }
        }
    }
    parser.push_text(rest);
    parser.flush();

    parser.markup
}

struct Parser<'s> {
    styles: &'s StyleRegistry,
    stack: Vec<Frame>,
    buffer: String,
    markup: Markup,
}

impl Parser<'_> {
    fn top(&self) -> &Frame {
        // the base frame is never popped
        &self.stack[self.stack.len() - 1]
    }

    fn push_text(&mut self, text: &str) {
        let decoded = decode_entities(text);
        let mut lines = decoded.split('\n');
        if let Some(first) = lines.next() {
            self.buffer.push_str(first);
        }
        for line in lines {
            self.flush();
            self.markup.pieces.push(Piece::Break);
            self.buffer.push_str(line);
        }
    }

    /// Literal text that must not be entity-decoded a second time
    fn push_literal(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        let frame = self.top();
        let span = Span {
            text,
            style: frame.style.clone(),
            modifiers: frame.modifiers.clone(),
        };
        self.markup.pieces.push(Piece::Text(span));
    }

    fn handle_tag(&mut self, tag: RawTag, raw: &str) {
        let kind = Tag::classify(&tag.name, self.styles);

        if let Tag::Unrecognized(name) = &kind {
            log::trace!("keeping unrecognized tag <{name}> as text");
            self.push_literal(raw);
            return;
        }

        if tag.closing {
            match self.stack.iter().rposition(|frame| frame.name == tag.name) {
                Some(index) if index > 0 => {
                    self.flush();
                    self.stack.truncate(index);
                }
                _ => self.push_literal(raw),
            }
            return;
        }

        match kind {
            Tag::LineBreak => {
                self.flush();
                self.markup.pieces.push(Piece::Break);
            }
            _ if tag.self_closing => {}
            Tag::Style(name) => {
                let over = match self.styles.tag_override(&name) {
                    Ok(over) => over,
                    Err(err) => {
                        log::warn!("style for <{name}> cannot be resolved: {err}");
                        self.markup.diagnostics.push(err);
                        Default::default()
                    }
                };
                let style = self.top().style.apply(&over);
                self.open(tag, style);
            }
            Tag::Inert => {
                let style = self.top().style.clone();
                self.open(tag, style);
            }
            Tag::Unrecognized(_) => {}
        }
    }

    fn open(&mut self, tag: RawTag, style: ResolvedStyle) {
        self.flush();

        let parent = self.top().modifiers.clone();
        let mut modifiers = SpanModifiers {
            baseline_shift: parent.baseline_shift,
            nowrap: parent.nowrap,
            strike: parent.strike,
            fixed_width: None,
            align: Align::Left,
        };

        for (attribute, value) in tag.attributes.iter() {
            let invalid = || Error::InvalidAttribute {
                tag: tag.name.clone(),
                attribute: attribute.clone(),
                value: value.clone(),
            };

            let outcome = match attribute.as_str() {
                "width" => parse_length(value)
                    .filter(|w| *w >= Pt::ZERO)
                    .map(|w| modifiers.fixed_width = Some(w))
                    .ok_or_else(invalid),
                "align" => value
                    .parse::<Align>()
                    .map(|align| modifiers.align = align)
                    .map_err(|_| invalid()),
                "nowrap" => parse_flag(value)
                    .map(|nowrap| modifiers.nowrap = nowrap)
                    .ok_or_else(invalid),
                "y" | "ypos" => parse_length(value)
                    .map(|shift| modifiers.baseline_shift = parent.baseline_shift + shift)
                    .ok_or_else(invalid),
                "strike" if value.trim().is_empty() => {
                    modifiers.strike = Some(Strike::default());
                    Ok(())
                }
                "strike" => {
                    let thickness = parse_length(value).filter(|t| *t >= Pt::ZERO);
                    // a malformed thickness still strikes, at the default width
                    modifiers.strike = Some(Strike { thickness });
                    thickness.map(|_| ()).ok_or_else(invalid)
                }
                other => {
                    log::debug!("ignoring unknown attribute `{other}` on <{}>", tag.name);
                    Ok(())
                }
            };

            if let Err(err) = outcome {
                log::warn!("{err}; using the default instead");
                self.markup.diagnostics.push(err);
            }
        }

        self.stack.push(Frame {
            name: tag.name,
            style,
            modifiers,
        });
    }
}

fn parse_length(value: &str) -> Option<Pt> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Pt)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

/// Try to read a tag at the start of `input` (which begins with `<`), returning
/// it along with the number of bytes it spans
fn parse_tag(input: &str) -> Option<(RawTag, usize)> {
    let mut quote: Option<char> = None;
    let mut end = None;
    for (i, ch) in input.char_indices().skip(1) {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '<' => return None,
                '>' => {
                    end = Some(i);
                    break;
                }
                _ => {}
            },
        }
    }
    let end = end?;

    let inner = input[1..end].trim();
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, inner),
    };
    let (self_closing, inner) = match inner.strip_suffix('/') {
        Some(rest) => (true, rest.trim_end()),
        None => (false, inner),
    };

    let name_len = inner.find(|ch: char| !is_name_char(ch)).unwrap_or(inner.len());
    let (name, rest) = inner.split_at(name_len);
    if !name.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        return None;
    }
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let attributes = parse_attributes(rest)?;
    Some((
        RawTag {
            name: name.to_ascii_lowercase(),
            attributes,
            closing,
            self_closing,
        },
        end + 1,
    ))
}

fn parse_attributes(input: &str) -> Option<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let name_len = rest.find(|ch: char| !is_name_char(ch)).unwrap_or(rest.len());
        if name_len == 0 {
            return None;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let value = if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            match after.chars().next() {
                Some(q @ ('\'' | '"')) => {
                    let close = after[1..].find(q)? + 1;
                    rest = &after[close + 1..];
                    after[1..close].to_string()
                }
                Some(_) => {
                    let len = after.find(char::is_whitespace).unwrap_or(after.len());
                    rest = &after[len..];
                    after[..len].to_string()
                }
                None => return None,
            }
        } else {
            String::new()
        };

        attributes.push((name, value));
        rest = rest.trim_start();
    }

    Some(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use crate::style::{FontStyle, StyleDef};

    fn styles() -> StyleRegistry {
        let mut styles = StyleRegistry::new();
        styles
            .set_style("b", StyleDef::new().font_style(FontStyle::BOLD))
            .unwrap();
        styles
            .set_style("i", StyleDef::new().font_style(FontStyle::ITALIC))
            .unwrap();
        styles
            .set_style(
                "h",
                StyleDef::new()
                    .size(Pt(16.0))
                    .colour(Colour::new_rgb_bytes(203, 0, 48)),
            )
            .unwrap();
        styles
    }

    fn texts(markup: &Markup) -> Vec<&str> {
        markup.spans().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn plain_text_is_a_single_span() {
        let markup = parse("hello world", &styles(), &ResolvedStyle::default());
        assert_eq!(texts(&markup), vec!["hello world"]);
        assert!(markup.diagnostics.is_empty());
    }

    #[test]
    fn nested_tags_compose_styles() {
        let markup = parse(
            "a <h>big <B>bold <i>both</i></b></h> z",
            &styles(),
            &ResolvedStyle::default(),
        );
        let spans: Vec<&Span> = markup.spans().collect();
        assert_eq!(texts(&markup), vec!["a ", "big ", "bold ", "both", " z"]);

        assert_eq!(spans[1].style.size, Pt(16.0));
        assert_eq!(spans[2].style.size, Pt(16.0));
        assert!(spans[2].style.font_style.bold);
        assert_eq!(spans[2].style.colour, Colour::new_rgb_bytes(203, 0, 48));
        assert!(spans[3].style.font_style.bold && spans[3].style.font_style.italic);
        assert_eq!(spans[4].style, ResolvedStyle::default());
    }

    #[test]
    fn unknown_tags_stay_literal() {
        let markup = parse("x <blink a='1'>y</blink> 1 < 2", &styles(), &ResolvedStyle::default());
        let joined: String = texts(&markup).concat();
        assert_eq!(joined, "x <blink a='1'>y</blink> 1 < 2");
        assert!(markup.diagnostics.is_empty());
    }

    #[test]
    fn unmatched_closers_stay_literal_and_open_tags_close_at_the_end() {
        let markup = parse("</b>x<b>y", &styles(), &ResolvedStyle::default());
        let spans: Vec<&Span> = markup.spans().collect();
        assert_eq!(spans[0].text, "</b>x");
        assert!(!spans[0].style.font_style.bold);
        assert_eq!(spans[1].text, "y");
        assert!(spans[1].style.font_style.bold);
    }

    #[test]
    fn newlines_and_br_become_breaks() {
        let markup = parse("one\r\ntwo<br/>three", &styles(), &ResolvedStyle::default());
        assert_eq!(
            markup.pieces.iter().filter(|p| **p == Piece::Break).count(),
            2
        );
        assert_eq!(texts(&markup), vec!["one", "two", "three"]);
    }

    #[test]
    fn attributes_set_modifiers() {
        let markup = parse(
            "<p width='28.5' align=\"center\"> </p><n strike=''>gone</n><b nowrap='1' strike='.5'>USD 5</b><n y='-2'>sub<n ypos=\"1\">back</n></n>",
            &styles(),
            &ResolvedStyle::default(),
        );
        let spans: Vec<&Span> = markup.spans().collect();
        assert_eq!(spans[0].modifiers.fixed_width, Some(Pt(28.5)));
        assert_eq!(spans[0].modifiers.align, Align::Center);
        assert_eq!(spans[1].modifiers.strike, Some(Strike { thickness: None }));
        assert!(spans[2].modifiers.nowrap);
        assert_eq!(spans[2].modifiers.strike, Some(Strike { thickness: Some(Pt(0.5)) }));
        assert_eq!(spans[3].modifiers.baseline_shift, Pt(-2.0));
        assert_eq!(spans[4].modifiers.baseline_shift, Pt(-1.0));
        assert!(markup.diagnostics.is_empty());
    }

    #[test]
    fn malformed_attributes_fall_back_and_report() {
        let markup = parse(
            "<p width='wide' align='sideways'>x</p><n strike='heavy'>y</n>",
            &styles(),
            &ResolvedStyle::default(),
        );
        let spans: Vec<&Span> = markup.spans().collect();
        assert_eq!(spans[0].modifiers.fixed_width, None);
        assert_eq!(spans[0].modifiers.align, Align::Left);
        assert_eq!(spans[1].modifiers.strike, Some(Strike { thickness: None }));
        assert_eq!(markup.diagnostics.len(), 3);
        assert!(markup
            .diagnostics
            .iter()
            .all(|d| matches!(d, Error::InvalidAttribute { .. })));
        match &markup.diagnostics[0] {
            Error::InvalidAttribute {
                tag,
                attribute,
                value,
            } => {
                assert_eq!(tag, "p");
                assert_eq!(attribute, "width");
                assert_eq!(value, "wide");
            }
            other => panic!("unexpected diagnostic {other:?}"),
        }
    }

    #[test]
    fn entities_decode_once() {
        let markup = parse("a &lt;b&gt; &amp;lt;", &styles(), &ResolvedStyle::default());
        assert_eq!(texts(&markup), vec!["a <b> &lt;"]);
    }

    #[test]
    fn tabs_expand() {
        let markup = parse("a\tb", &styles(), &ResolvedStyle::default());
        assert_eq!(texts(&markup), vec!["a    b"]);
    }
}
