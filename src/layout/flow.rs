//! Wrapping, aligning and paginating marked-up text.

use super::align::Align;
use super::margins::Padding;
use super::markup::{self, Markup, Piece, Strike};
use crate::canvas::{Canvas, FontMetrics, Stroke, EPSILON};
use crate::colour::Colour;
use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::style::{ResolvedStyle, StyleOverride, StyleRegistry, DEFAULT_STYLE};
use crate::units::Pt;
use std::str::FromStr;

const DECORATION_THICKNESS: f32 = 0.05;
const UNDERLINE_POSITION: f32 = 0.1;

/// Which sides of a box get a border line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl Border {
    pub const NONE: Border = Border {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };
    pub const ALL: Border = Border {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    pub fn is_none(&self) -> bool {
        *self == Border::NONE
    }

    /// Outline `rect` along the enabled sides
    pub(crate) fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, rect: Rect, stroke: Stroke) {
        if *self == Border::ALL {
            canvas.draw_rect(rect, None, Some(stroke));
            return;
        }
        let Rect { x1, y1, x2, y2 } = rect;
        if self.top {
            canvas.draw_line((x1, y1), (x2, y1), stroke);
        }
        if self.right {
            canvas.draw_line((x2, y1), (x2, y2), stroke);
        }
        if self.bottom {
            canvas.draw_line((x1, y2), (x2, y2), stroke);
        }
        if self.left {
            canvas.draw_line((x1, y1), (x1, y2), stroke);
        }
    }
}

/// `"1"` for every side, `"0"` or `""` for none, or any combination of the
/// letters `L`, `T`, `R`, `B`
impl FromStr for Border {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed {
            "1" => return Ok(Border::ALL),
            "" | "0" => return Ok(Border::NONE),
            _ => {}
        }
        let mut border = Border::NONE;
        for ch in trimmed.chars() {
            match ch.to_ascii_uppercase() {
                'L' => border.left = true,
                'T' => border.top = true,
                'R' => border.right = true,
                'B' => border.bottom = true,
                _ => {
                    return Err(Error::InvalidAttribute {
                        tag: "border".to_string(),
                        attribute: "border".to_string(),
                        value: s.to_string(),
                    })
                }
            }
        }
        Ok(border)
    }
}

/// How a block of flowed text is sized, decorated and placed
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOptions {
    /// Width of the whole box including padding; `None` runs to the right margin
    pub width: Option<Pt>,
    /// Minimum height of every line; lines grow to fit their tallest span
    pub line_height: Pt,
    pub border: Border,
    pub stroke: Stroke,
    pub align: Align,
    pub fill: Option<Colour>,
    pub padding: Padding,
    /// Left edge of the box; `None` starts at the left margin
    pub x: Option<Pt>,
    /// Registered style the text starts out in
    pub style: String,
    /// Adjustments layered over `style` before any markup applies
    pub style_override: StyleOverride,
    /// Height of strike-through lines above the baseline, as a fraction of
    /// the font size
    pub strike_position: f32,
}

impl Default for FlowOptions {
    fn default() -> Self {
        FlowOptions {
            width: None,
            line_height: Pt::ZERO,
            border: Border::NONE,
            stroke: Stroke::default(),
            align: Align::Left,
            fill: None,
            padding: Padding::empty(),
            x: None,
            style: DEFAULT_STYLE.to_string(),
            style_override: StyleOverride::default(),
            strike_position: 0.3,
        }
    }
}

impl FlowOptions {
    pub fn with_width<P: Into<Pt>>(mut self, width: P) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_line_height<P: Into<Pt>>(mut self, line_height: P) -> Self {
        self.line_height = line_height.into();
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_fill<C: Into<Colour>>(mut self, fill: C) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_x<P: Into<Pt>>(mut self, x: P) -> Self {
        self.x = Some(x.into());
        self
    }

    pub fn with_style<S: ToString>(mut self, style: S) -> Self {
        self.style = style.to_string();
        self
    }

    pub fn with_style_override(mut self, style_override: StyleOverride) -> Self {
        self.style_override = style_override;
        self
    }

    pub fn with_strike_position(mut self, strike_position: f32) -> Self {
        self.strike_position = strike_position;
        self
    }
}

/// A positioned piece of a line drawn in a single style
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    /// Left edge relative to the start of the line's content area, with the
    /// alignment offset and any justification already applied
    pub x: Pt,
    /// Horizontal space taken on the line
    pub width: Pt,
    pub style: ResolvedStyle,
    pub baseline_shift: Pt,
    pub strike: Option<Strike>,
    /// Inter-word whitespace. Gaps are not drawn as text, only decorated
    pub is_gap: bool,
    /// Where the text starts inside `width`, for fixed width boxes
    pub text_offset: Pt,
    pub text_width: Pt,
}

/// One laid out line of a flow
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub fragments: Vec<Fragment>,
    /// Natural width of the content, before justification
    pub width: Pt,
    pub height: Pt,
    pub ascent: Pt,
    pub descent: Pt,
    /// Shift of the whole line for center and right alignment
    pub offset: Pt,
    /// Whether a hard break or the end of the text follows this line
    pub ends_paragraph: bool,
}

impl Line {
    /// Distance from the top of the line to its baseline. Any height beyond
    /// what the fonts need is split evenly above and below the text.
    pub fn baseline(&self) -> Pt {
        (self.height + self.ascent + self.descent) / 2.0
    }
}

#[derive(Debug, Clone)]
struct Frag {
    text: String,
    width: Pt,
    text_width: Pt,
    text_offset: Pt,
    style: ResolvedStyle,
    baseline_shift: Pt,
    strike: Option<Strike>,
}

#[derive(Debug, Clone, Default)]
struct Run {
    frags: Vec<Frag>,
    width: Pt,
}

impl Run {
    fn push(&mut self, frag: Frag) {
        self.width += frag.width;
        self.frags.push(frag);
    }

    fn extend(&mut self, other: Run) {
        self.width += other.width;
        self.frags.extend(other.frags);
    }
}

#[derive(Debug)]
enum Unit {
    Word(Run),
    Gap(Run),
    Break,
}

/// Text laid out for a given width, ready to be drawn any number of times
#[derive(Debug, Clone)]
pub struct FlowLayout {
    pub lines: Vec<Line>,
    /// Left edge of the box when rendered through [`FlowLayout::render`]
    pub x: Pt,
    /// Width of the box including padding
    pub width: Pt,
    /// Height of every line plus the top and bottom padding
    pub height: Pt,
    padding: Padding,
    border: Border,
    stroke: Stroke,
    fill: Option<Colour>,
    strike_position: f32,
}

impl FlowLayout {
    /// Draw the whole box with its top left corner at (`x`, `top`) without
    /// paginating or moving the cursor
    pub fn draw_at<C: Canvas + ?Sized>(&self, canvas: &mut C, x: Pt, top: Pt) {
        let rect = Rect::from_xywh(x, top, self.width, self.height);
        self.draw_fill(canvas, rect);
        self.draw_lines(canvas, x + self.padding.left, top + self.padding.top, &self.lines);
        self.border.draw(canvas, rect, self.stroke);
    }

    /// Draw at the canvas cursor, starting new pages whenever the next line
    /// would run past the bottom margin. Returns the height consumed across
    /// all pages, and leaves the cursor below the box.
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C) -> Pt {
        let x = self.x;
        let count = self.lines.len();
        let mut consumed = Pt::ZERO;
        let mut start = 0;

        while start < count {
            let first = start == 0;
            let top = canvas.cursor_y();

            // collect as many lines as fit on this page
            let mut height = if first { self.padding.top } else { Pt::ZERO };
            let mut end = start;
            while end < count {
                let mut needed = self.lines[end].height;
                if end + 1 == count {
                    needed += self.padding.bottom;
                }
                if canvas.would_overflow(height + needed) && (end > start || !canvas.at_page_top()) {
                    break;
                }
                height += needed;
                end += 1;
            }

            if end == start {
                log::debug!("no room for line {start} of the flow, starting a new page");
                canvas.add_page();
                continue;
            }

            let last = end == count;
            let rect = Rect::from_xywh(x, top, self.width, height);
            self.draw_fill(canvas, rect);
            let lines_top = if first { top + self.padding.top } else { top };
            self.draw_lines(canvas, x + self.padding.left, lines_top, &self.lines[start..end]);
            let sides = Border {
                top: self.border.top && first,
                bottom: self.border.bottom && last,
                ..self.border
            };
            sides.draw(canvas, rect, self.stroke);

            canvas.set_cursor_y(top + height);
            consumed += height;
            start = end;

            if !last {
                log::debug!("flow continues on a new page after line {end}");
                canvas.add_page();
            }
        }

        consumed
    }

    fn draw_fill<C: Canvas + ?Sized>(&self, canvas: &mut C, rect: Rect) {
        if let Some(fill) = self.fill {
            canvas.draw_rect(rect, Some(fill), None);
        }
    }

    fn draw_lines<C: Canvas + ?Sized>(&self, canvas: &mut C, left: Pt, top: Pt, lines: &[Line]) {
        let mut y = top;
        for line in lines {
            let baseline = y + line.baseline();
            for fragment in line.fragments.iter() {
                self.draw_fragment(canvas, left, baseline, fragment);
            }
            y += line.height;
        }
    }

    fn draw_fragment<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        left: Pt,
        baseline: Pt,
        fragment: &Fragment,
    ) {
        // top-down coordinates: shifting up means a smaller y
        let baseline = baseline - fragment.baseline_shift;
        let start = left + fragment.x + fragment.text_offset;
        let end = start + fragment.text_width;
        let style = &fragment.style;

        if !fragment.is_gap && !fragment.text.is_empty() {
            canvas.draw_text(start, baseline, &fragment.text, style);
        }

        let thickness = style.size * DECORATION_THICKNESS;
        if style.font_style.underline {
            let y = baseline + style.size * UNDERLINE_POSITION;
            let stroke = Stroke {
                width: thickness,
                colour: style.colour,
            };
            canvas.draw_line((start, y), (end, y), stroke);
        }
        if let Some(strike) = fragment.strike {
            let y = baseline - style.size * self.strike_position;
            let stroke = Stroke {
                width: strike.thickness.unwrap_or(thickness),
                colour: style.colour,
            };
            canvas.draw_line((start, y), (end, y), stroke);
        }
    }
}

/// Lays out and draws marked-up text using the styles of a registry
#[derive(Debug, Clone, Copy)]
pub struct TextFlow<'s> {
    styles: &'s StyleRegistry,
}

impl<'s> TextFlow<'s> {
    pub fn new(styles: &'s StyleRegistry) -> TextFlow<'s> {
        TextFlow { styles }
    }

    /// The style text starts out in before any markup applies
    pub fn base_style(&self, options: &FlowOptions) -> Result<ResolvedStyle> {
        let base = self.styles.resolve(&options.style)?;
        Ok(base.apply(&options.style_override))
    }

    /// Split `text` into styled spans. Attribute problems are logged and
    /// returned alongside the spans; only an unknown base style fails.
    pub fn parse(&self, text: &str, options: &FlowOptions) -> Result<Markup> {
        let base = self.base_style(options)?;
        Ok(markup::parse(text, self.styles, &base))
    }

    /// Break `text` into lines without drawing anything
    pub fn layout<C: Canvas + ?Sized>(
        &self,
        canvas: &C,
        text: &str,
        options: &FlowOptions,
    ) -> Result<FlowLayout> {
        let base = self.base_style(options)?;
        let markup = markup::parse(text, self.styles, &base);

        let (page_width, _) = canvas.page_size();
        let x = options.x.unwrap_or(canvas.margins().left);
        let width = options
            .width
            .unwrap_or(page_width - canvas.margins().right - x)
            .max(Pt::ZERO);
        let available = (width - options.padding.horizontal()).max(Pt::ZERO);

        let units = tokenize(canvas, markup.pieces);
        let base_metrics = canvas.font_metrics(&base);
        let lines = fill_lines(canvas, units, available, base_metrics, options);

        let height = lines.iter().map(|line| line.height).sum::<Pt>() + options.padding.vertical();

        Ok(FlowLayout {
            lines,
            x,
            width,
            height,
            padding: options.padding,
            border: options.border,
            stroke: options.stroke,
            fill: options.fill,
            strike_position: options.strike_position,
        })
    }

    /// Height `text` would take when rendered with `options`
    pub fn measure<C: Canvas + ?Sized>(
        &self,
        canvas: &C,
        text: &str,
        options: &FlowOptions,
    ) -> Result<Pt> {
        Ok(self.layout(canvas, text, options)?.height)
    }

    /// Lay out and draw `text` at the canvas cursor, paginating as needed.
    /// Returns the total height consumed.
    pub fn render<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        text: &str,
        options: &FlowOptions,
    ) -> Result<Pt> {
        let layout = self.layout(&*canvas, text, options)?;
        Ok(layout.render(canvas))
    }
}

fn is_break_space(ch: char) -> bool {
    ch.is_whitespace() && ch != '\u{a0}'
}

fn make_frag<C: Canvas + ?Sized>(canvas: &C, text: &str, span: &markup::Span) -> Frag {
    let text_width = canvas.measure_text_width(text, &span.style);
    Frag {
        text: text.to_string(),
        width: text_width,
        text_width,
        text_offset: Pt::ZERO,
        style: span.style.clone(),
        baseline_shift: span.modifiers.baseline_shift,
        strike: span.modifiers.strike,
    }
}

/// Turn parsed markup into words, gaps and hard breaks
fn tokenize<C: Canvas + ?Sized>(canvas: &C, pieces: Vec<Piece>) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut word: Option<Run> = None;

    fn flush(units: &mut Vec<Unit>, word: &mut Option<Run>) {
        if let Some(run) = word.take() {
            units.push(Unit::Word(run));
        }
    }

    for piece in pieces {
        let span = match piece {
            Piece::Break => {
                flush(&mut units, &mut word);
                units.push(Unit::Break);
                continue;
            }
            Piece::Text(span) => span,
        };

        if let Some(box_width) = span.modifiers.fixed_width {
            // boxed text is a unit of its own
            flush(&mut units, &mut word);
            let mut frag = make_frag(canvas, &span.text, &span);
            let slack = (box_width - frag.text_width).max(Pt::ZERO);
            frag.text_offset = match span.modifiers.align {
                Align::Center => slack / 2.0,
                Align::Right => slack,
                Align::Left | Align::Justify => Pt::ZERO,
            };
            frag.width = box_width;
            let mut run = Run::default();
            run.push(frag);
            units.push(Unit::Word(run));
            continue;
        }

        if span.modifiers.nowrap {
            word.get_or_insert_with(Run::default)
                .push(make_frag(canvas, &span.text, &span));
            continue;
        }

        // alternate runs of breakable whitespace and everything else
        let mut rest = span.text.as_str();
        while !rest.is_empty() {
            let starts_with_space = rest.starts_with(is_break_space);
            let len = rest
                .find(|ch: char| is_break_space(ch) != starts_with_space)
                .unwrap_or(rest.len());
            let (chunk, tail) = rest.split_at(len);
            rest = tail;

            let frag = make_frag(canvas, chunk, &span);
            if starts_with_space {
                flush(&mut units, &mut word);
                match units.last_mut() {
                    Some(Unit::Gap(gap)) => gap.push(frag),
                    _ => {
                        let mut gap = Run::default();
                        gap.push(frag);
                        units.push(Unit::Gap(gap));
                    }
                }
            } else {
                word.get_or_insert_with(Run::default).push(frag);
            }
        }
    }
    flush(&mut units, &mut word);

    units
}

/// Greedily pack units into lines no wider than `available`
fn fill_lines<C: Canvas + ?Sized>(
    canvas: &C,
    units: Vec<Unit>,
    available: Pt,
    base_metrics: FontMetrics,
    options: &FlowOptions,
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Vec<(Run, bool)> = Vec::new();
    let mut width = Pt::ZERO;
    let mut has_words = false;
    let mut pending_gap: Option<Run> = None;

    let mut finish = |current: &mut Vec<(Run, bool)>, width: Pt, ends_paragraph: bool| {
        let line = build_line(
            canvas,
            std::mem::take(current),
            width,
            ends_paragraph,
            available,
            base_metrics,
            options,
        );
        log::trace!(
            "line {}: {} fragments, width {}, height {}",
            lines.len(),
            line.fragments.len(),
            line.width,
            line.height
        );
        lines.push(line);
    };

    for unit in units {
        match unit {
            Unit::Break => {
                // trailing whitespace before a hard break is dropped
                pending_gap = None;
                finish(&mut current, width, true);
                width = Pt::ZERO;
                has_words = false;
            }
            Unit::Gap(run) => match pending_gap.as_mut() {
                Some(gap) => gap.extend(run),
                None => pending_gap = Some(run),
            },
            Unit::Word(run) => {
                let gap_width = pending_gap.as_ref().map(|gap| gap.width).unwrap_or_default();
                if has_words && width + gap_width + run.width > available + EPSILON {
                    // wrap, dropping the gap at the break point
                    pending_gap = None;
                    finish(&mut current, width, false);
                    width = Pt::ZERO;
                } else if let Some(gap) = pending_gap.take() {
                    width += gap.width;
                    current.push((gap, true));
                }
                width += run.width;
                current.push((run, false));
                has_words = true;
            }
        }
    }
    finish(&mut current, width, true);

    lines
}

fn build_line<C: Canvas + ?Sized>(
    canvas: &C,
    runs: Vec<(Run, bool)>,
    width: Pt,
    ends_paragraph: bool,
    available: Pt,
    base_metrics: FontMetrics,
    options: &FlowOptions,
) -> Line {
    let gaps = runs.iter().filter(|(_, is_gap)| *is_gap).count();
    let slack = (available - width).max(Pt::ZERO);
    let (offset, stretch) = match options.align {
        Align::Left => (Pt::ZERO, Pt::ZERO),
        Align::Center => (slack / 2.0, Pt::ZERO),
        Align::Right => (slack, Pt::ZERO),
        Align::Justify if !ends_paragraph && gaps > 0 => (Pt::ZERO, slack / gaps as f32),
        Align::Justify => (Pt::ZERO, Pt::ZERO),
    };

    let mut metrics: Option<FontMetrics> = None;
    let mut fragments = Vec::new();
    let mut x = offset;

    for (run, is_gap) in runs {
        let count = run.frags.len();
        for (i, frag) in run.frags.into_iter().enumerate() {
            let font = canvas.font_metrics(&frag.style);
            let ascent = font.ascent + frag.baseline_shift;
            let descent = font.descent + frag.baseline_shift;
            metrics = Some(match metrics {
                Some(m) => FontMetrics {
                    ascent: m.ascent.max(ascent),
                    descent: m.descent.min(descent),
                },
                None => FontMetrics { ascent, descent },
            });

            let mut width = frag.width;
            if is_gap && i + 1 == count {
                width += stretch;
            }
            fragments.push(Fragment {
                text: frag.text,
                x,
                width,
                style: frag.style,
                baseline_shift: frag.baseline_shift,
                strike: frag.strike,
                is_gap,
                text_offset: frag.text_offset,
                text_width: if is_gap { width } else { frag.text_width },
            });
            x += width;
        }
    }

    let FontMetrics { ascent, descent } = metrics.unwrap_or(base_metrics);
    Line {
        fragments,
        width,
        height: options.line_height.max(ascent - descent),
        ascent,
        descent,
        offset,
        ends_paragraph,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::layout::Margins;
    use crate::style::{FontStyle, StyleDef};

    fn styles() -> StyleRegistry {
        let mut styles = StyleRegistry::new();
        styles
            .set_style("default", StyleDef::new().size(Pt(10.0)))
            .unwrap();
        styles
            .set_style("b", StyleDef::new().font_style(FontStyle::BOLD))
            .unwrap();
        styles
            .set_style("big", StyleDef::new().size(Pt(20.0)))
            .unwrap();
        styles
    }

    /// 5pt per character at the 10pt default size, 200pt of usable width
    fn canvas() -> RecordingCanvas {
        RecordingCanvas::new((Pt(220.0), Pt(300.0)), Margins::all(Pt(10.0)))
    }

    fn line_text(line: &Line) -> String {
        line.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn short_text_is_one_line() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let layout = flow
            .layout(&canvas(), "a few <b>short</b> words", &FlowOptions::default())
            .unwrap();
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.height, Pt(10.0));
        assert_eq!(line_text(&layout.lines[0]), "a few short words");
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let options = FlowOptions::default().with_padding(Margins::all(Pt(2.0)));
        let layout = flow.layout(&canvas(), "", &options).unwrap();
        assert_eq!(layout.lines.len(), 1);
        assert!(layout.lines[0].fragments.is_empty());
        assert_eq!(layout.height, Pt(14.0));
    }

    #[test]
    fn words_wrap_greedily_and_drop_the_gap_at_the_break() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        // 10 characters fit per line
        let options = FlowOptions::default().with_width(Pt(50.0));
        let layout = flow.layout(&canvas(), "aaaa bbbb cccc dd", &options).unwrap();
        let lines: Vec<String> = layout.lines.iter().map(line_text).collect();
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dd"]);
        assert!(!layout.lines[0].ends_paragraph);
        assert!(layout.lines[1].ends_paragraph);
    }

    #[test]
    fn over_wide_nowrap_spans_sit_alone_unsplit() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let options = FlowOptions::default().with_width(Pt(30.0));
        let layout = flow
            .layout(
                &canvas(),
                "<n nowrap='1'>first long</n> <n nowrap='1'>second long</n>",
                &options,
            )
            .unwrap();
        let lines: Vec<String> = layout.lines.iter().map(line_text).collect();
        assert_eq!(lines, vec!["first long", "second long"]);
    }

    #[test]
    fn justified_gaps_fill_the_line() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let options = FlowOptions::default()
            .with_width(Pt(100.0))
            .with_padding(Margins::symmetric(Pt(0.0), Pt(5.0)))
            .with_align(Align::Justify);
        let text = lipsum::lipsum_words(40);
        let layout = flow.layout(&canvas(), &text, &options).unwrap();
        assert!(layout.lines.len() > 2);

        let available = Pt(90.0);
        for line in &layout.lines[..layout.lines.len() - 1] {
            let gaps: Pt = line.fragments.iter().filter(|f| f.is_gap).map(|f| f.width).sum();
            let words: Pt = line.fragments.iter().filter(|f| !f.is_gap).map(|f| f.width).sum();
            if line.fragments.iter().any(|f| f.is_gap) {
                assert!((gaps - (available - words)).abs() < Pt(0.01));
            }
        }

        // the last line keeps its natural spacing
        let last = &layout.lines[layout.lines.len() - 1];
        assert!(last.fragments.iter().filter(|f| f.is_gap).all(|f| f.width == Pt(5.0)));
    }

    #[test]
    fn center_and_right_translate_lines() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let options = FlowOptions::default().with_width(Pt(100.0));
        let centered = flow
            .layout(&canvas(), "abcd", &options.clone().with_align(Align::Center))
            .unwrap();
        assert_eq!(centered.lines[0].offset, Pt(40.0));
        let right = flow
            .layout(&canvas(), "abcd", &options.with_align(Align::Right))
            .unwrap();
        assert_eq!(right.lines[0].fragments[0].x, Pt(80.0));

        // overflowing lines never shift left of the box
        let options = FlowOptions::default()
            .with_width(Pt(10.0))
            .with_align(Align::Right);
        let overflowing = flow.layout(&canvas(), "abcdefgh", &options).unwrap();
        assert_eq!(overflowing.lines[0].offset, Pt::ZERO);
    }

    #[test]
    fn lines_grow_to_fit_their_tallest_span() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let options = FlowOptions::default().with_line_height(Pt(12.0));
        let layout = flow
            .layout(&canvas(), "small\n<big>large</big> and small", &options)
            .unwrap();
        assert_eq!(layout.lines[0].height, Pt(12.0));
        assert_eq!(layout.lines[1].height, Pt(20.0));
        assert_eq!(layout.height, Pt(32.0));
        // the extra line height is split around the text
        assert_eq!(layout.lines[0].baseline(), Pt(9.0));
    }

    #[test]
    fn fixed_width_boxes_align_their_text() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let layout = flow
            .layout(
                &canvas(),
                "<p width='40' align='right'>ab</p>cd",
                &FlowOptions::default(),
            )
            .unwrap();
        let fragments = &layout.lines[0].fragments;
        assert_eq!(fragments[0].width, Pt(40.0));
        assert_eq!(fragments[0].text_offset, Pt(30.0));
        assert_eq!(fragments[1].x, Pt(40.0));
    }

    #[test]
    fn render_draws_decorations_and_advances_the_cursor() {
        let mut styles = styles();
        styles
            .set_style("u", StyleDef::new().font_style(FontStyle::UNDERLINE))
            .unwrap();
        let flow = TextFlow::new(&styles);
        let mut canvas = canvas();
        let options = FlowOptions::default()
            .with_fill(Colour::new_grey(0.9))
            .with_border(Border::ALL)
            .with_padding(Margins::all(Pt(1.0)));
        let height = flow
            .render(&mut canvas, "<u>under</u> <n strike='' y='2'>out</n>", &options)
            .unwrap();
        // the raised span pushes the ascent up to 10pt
        assert_eq!(height, Pt(14.0));
        assert_eq!(canvas.cursor_y(), Pt(24.0));

        // fill comes first so text is drawn over it
        assert!(matches!(canvas.ops[0], DrawOp::Rect { fill: Some(_), .. }));
        let texts: Vec<_> = canvas.texts().collect();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].1, Pt(11.0));
        // shifted up by 2pt
        assert_eq!(texts[1].2, texts[0].2 - Pt(2.0));
        let lines = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count();
        assert_eq!(lines, 2);
        assert!(matches!(
            canvas.ops.last(),
            Some(DrawOp::Rect { fill: None, stroke: Some(_), .. })
        ));
    }

    #[test]
    fn render_paginates_without_losing_lines() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let mut canvas = RecordingCanvas::new((Pt(220.0), Pt(100.0)), Margins::all(Pt(10.0)));
        let text = (0..20).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let options = FlowOptions::default().with_border(Border::ALL);
        let height = flow.render(&mut canvas, &text, &options).unwrap();

        // 8 lines of 10pt per page
        assert_eq!(canvas.page_count(), 3);
        assert_eq!(height, Pt(200.0));
        let texts: Vec<_> = canvas.texts().collect();
        assert_eq!(texts.len(), 20);
        assert_eq!(texts[8].0, 1);
        assert_eq!(texts[8].3, "line8");
        assert_eq!(canvas.cursor_y(), Pt(50.0));

        // only the first segment has a top border and only the last a bottom one
        let tops = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { from, to, .. } if from.1 == to.1))
            .count();
        assert_eq!(tops, 2);
    }

    #[test]
    fn measured_height_renders_without_a_page_break() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let options = FlowOptions::default()
            .with_width(Pt(73.3))
            .with_line_height(Pt(3.7))
            .with_padding(Margins::trbl(Pt(0.3), Pt(1.1), Pt(0.7), Pt(1.3)));
        let text = lipsum::lipsum_words(30);

        let mut canvas = RecordingCanvas::new((Pt(220.0), Pt(1000.0)), Margins::all(Pt(10.0)));
        let height = flow.measure(&canvas, &text, &options).unwrap();
        let remaining = canvas.remaining_height();
        canvas.advance_cursor(remaining - height);
        assert!(!canvas.would_overflow(height));

        flow.render(&mut canvas, &text, &options).unwrap();
        assert_eq!(canvas.page_count(), 1);
    }

    #[test]
    fn unknown_base_styles_fail() {
        let styles = styles();
        let flow = TextFlow::new(&styles);
        let options = FlowOptions::default().with_style("missing");
        assert!(matches!(
            flow.layout(&canvas(), "x", &options),
            Err(Error::UnknownStyle { .. })
        ));
    }

    #[test]
    fn border_codes() {
        assert_eq!("1".parse::<Border>().unwrap(), Border::ALL);
        assert_eq!("".parse::<Border>().unwrap(), Border::NONE);
        let lr: Border = "lr".parse().unwrap();
        assert!(lr.left && lr.right && !lr.top && !lr.bottom);
        assert!("X".parse::<Border>().is_err());
    }
}
