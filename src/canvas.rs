//! The drawing surface the layout engines target.
//!
//! Coordinates on a [`Canvas`] run top-down: `y = 0` is the top edge of the page
//! and the vertical cursor grows towards the bottom margin. Text is positioned
//! by its baseline.

use crate::colour::{colours, Colour};
use crate::error::{Error, Result};
use crate::layout::Margins;
use crate::rect::Rect;
use crate::style::ResolvedStyle;
use crate::units::Pt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Tolerance used when comparing vertical positions, so that a height measured
/// once and drawn later never trips a page break through float rounding
pub const EPSILON: Pt = Pt(0.001);

/// Vertical metrics of a font at a given size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the tallest glyphs
    pub ascent: Pt,
    /// Distance from the baseline to the bottom of the lowest glyphs; usually negative
    pub descent: Pt,
}

impl FontMetrics {
    pub fn height(&self) -> Pt {
        self.ascent - self.descent
    }
}

/// Line width and colour used to outline rectangles and draw rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: Pt,
    pub colour: Colour,
}

impl Default for Stroke {
    fn default() -> Self {
        Stroke {
            width: Pt(0.5),
            colour: colours::BLACK,
        }
    }
}

/// Page and drawing primitives consumed by [`TextFlow`](crate::layout::TextFlow)
/// and [`Table`](crate::layout::Table).
///
/// Implementors own the page and cursor state; the layout engines only ever
/// hold the canvas for the duration of a single call.
pub trait Canvas {
    /// Width and height of the current page
    fn page_size(&self) -> (Pt, Pt);

    fn margins(&self) -> Margins;

    /// Top of the next free vertical position on the current page
    fn cursor_y(&self) -> Pt;

    fn set_cursor_y(&mut self, y: Pt);

    /// Start a new page and move the cursor to its top margin
    fn add_page(&mut self);

    /// Width taken by `text` when drawn in `style`
    fn measure_text_width(&self, text: &str, style: &ResolvedStyle) -> Pt;

    fn font_metrics(&self, style: &ResolvedStyle) -> FontMetrics;

    /// Draw a run of text with its baseline starting at (`x`, `baseline`)
    fn draw_text(&mut self, x: Pt, baseline: Pt, text: &str, style: &ResolvedStyle);

    fn draw_rect(&mut self, rect: Rect, fill: Option<Colour>, stroke: Option<Stroke>);

    fn draw_line(&mut self, from: (Pt, Pt), to: (Pt, Pt), stroke: Stroke);

    /// Intrinsic size of the image at `path`, in points
    fn image_size(&mut self, path: &Path) -> Result<(Pt, Pt)>;

    fn draw_image(&mut self, path: &Path, rect: Rect) -> Result<()>;

    fn advance_cursor(&mut self, dy: Pt) {
        let y = self.cursor_y();
        self.set_cursor_y(y + dy);
    }

    /// Width between the left and right margins
    fn content_width(&self) -> Pt {
        self.page_size().0 - self.margins().horizontal()
    }

    /// Space left between the cursor and the bottom margin
    fn remaining_height(&self) -> Pt {
        self.page_size().1 - self.margins().bottom - self.cursor_y()
    }

    /// Whether the canvas starts new pages when content runs past the bottom
    /// margin. When false the engines draw past the margin instead.
    fn auto_page_break(&self) -> bool {
        true
    }

    fn at_page_top(&self) -> bool {
        (self.cursor_y() - self.margins().top).abs() <= EPSILON
    }

    /// Whether `height` more content would run past the bottom margin
    fn would_overflow(&self, height: Pt) -> bool {
        self.auto_page_break() && height > self.remaining_height() + EPSILON
    }
}

/// A single call made against a [`RecordingCanvas`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        x: Pt,
        baseline: Pt,
        text: String,
        style: ResolvedStyle,
    },
    Rect {
        page: usize,
        rect: Rect,
        fill: Option<Colour>,
        stroke: Option<Stroke>,
    },
    Line {
        page: usize,
        from: (Pt, Pt),
        to: (Pt, Pt),
        stroke: Stroke,
    },
    Image {
        page: usize,
        path: PathBuf,
        rect: Rect,
    },
    PageBreak {
        page: usize,
    },
}

/// An in-memory canvas with fixed-pitch metrics that records every call.
///
/// Every glyph advances by `char_width` times the font size; the ascent and
/// descent are fixed fractions of the size. Useful for measuring content
/// without a real font, and for targeting custom backends by replaying
/// [`DrawOp`]s.
///
/// ```
/// use pdf_flow::{Canvas, RecordingCanvas, Pt, ResolvedStyle};
/// use pdf_flow::layout::Margins;
///
/// let canvas = RecordingCanvas::new((Pt(200.0), Pt(300.0)), Margins::all(Pt(10.0)));
/// let style = ResolvedStyle { size: Pt(10.0), ..Default::default() };
/// assert_eq!(canvas.measure_text_width("abcd", &style), Pt(20.0));
/// assert_eq!(canvas.remaining_height(), Pt(280.0));
/// ```
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    page_size: (Pt, Pt),
    margins: Margins,
    cursor_y: Pt,
    page: usize,
    auto_page_break: bool,
    /// Advance of every character as a fraction of the font size
    pub char_width: f32,
    /// Ascent as a fraction of the font size
    pub ascent: f32,
    /// Descent as a (negative) fraction of the font size
    pub descent: f32,
    images: HashMap<PathBuf, (Pt, Pt)>,
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(page_size: (Pt, Pt), margins: Margins) -> RecordingCanvas {
        RecordingCanvas {
            page_size,
            cursor_y: margins.top,
            margins,
            page: 0,
            auto_page_break: true,
            char_width: 0.5,
            ascent: 0.8,
            descent: -0.2,
            images: HashMap::new(),
            ops: Vec::new(),
        }
    }

    pub fn with_auto_page_break(mut self, enabled: bool) -> Self {
        self.auto_page_break = enabled;
        self
    }

    /// Make an image available under `path` with the given intrinsic size
    pub fn with_image<P: Into<PathBuf>>(mut self, path: P, width: Pt, height: Pt) -> Self {
        self.images.insert(path.into(), (width, height));
        self
    }

    /// Index of the current page, starting from 0
    pub fn page(&self) -> usize {
        self.page
    }

    /// Number of pages started so far, including the first
    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    /// Every text run drawn, in order
    pub fn texts(&self) -> impl Iterator<Item = (usize, Pt, Pt, &str)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text {
                page,
                x,
                baseline,
                text,
                ..
            } => Some((*page, *x, *baseline, text.as_str())),
            _ => None,
        })
    }

    /// Every rectangle drawn, in order
    pub fn rects(&self) -> impl Iterator<Item = (usize, &Rect, Option<Colour>)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Rect {
                page, rect, fill, ..
            } => Some((*page, rect, *fill)),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn page_size(&self) -> (Pt, Pt) {
        self.page_size
    }

    fn margins(&self) -> Margins {
        self.margins
    }

    fn cursor_y(&self) -> Pt {
        self.cursor_y
    }

    fn set_cursor_y(&mut self, y: Pt) {
        self.cursor_y = y;
    }

    fn add_page(&mut self) {
        self.page += 1;
        self.cursor_y = self.margins.top;
        self.ops.push(DrawOp::PageBreak { page: self.page });
    }

    fn measure_text_width(&self, text: &str, style: &ResolvedStyle) -> Pt {
        style.size * (self.char_width * text.chars().count() as f32)
    }

    fn font_metrics(&self, style: &ResolvedStyle) -> FontMetrics {
        FontMetrics {
            ascent: style.size * self.ascent,
            descent: style.size * self.descent,
        }
    }

    fn draw_text(&mut self, x: Pt, baseline: Pt, text: &str, style: &ResolvedStyle) {
        self.ops.push(DrawOp::Text {
            page: self.page,
            x,
            baseline,
            text: text.to_string(),
            style: style.clone(),
        });
    }

    fn draw_rect(&mut self, rect: Rect, fill: Option<Colour>, stroke: Option<Stroke>) {
        self.ops.push(DrawOp::Rect {
            page: self.page,
            rect,
            fill,
            stroke,
        });
    }

    fn draw_line(&mut self, from: (Pt, Pt), to: (Pt, Pt), stroke: Stroke) {
        self.ops.push(DrawOp::Line {
            page: self.page,
            from,
            to,
            stroke,
        });
    }

    fn image_size(&mut self, path: &Path) -> Result<(Pt, Pt)> {
        self.images.get(path).copied().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no image registered at {}", path.display()),
            ))
        })
    }

    fn draw_image(&mut self, path: &Path, rect: Rect) -> Result<()> {
        self.image_size(path)?;
        self.ops.push(DrawOp::Image {
            page: self.page,
            path: path.to_path_buf(),
            rect,
        });
        Ok(())
    }

    fn auto_page_break(&self) -> bool {
        self.auto_page_break
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_respects_the_bottom_margin() {
        let mut canvas = RecordingCanvas::new((Pt(100.0), Pt(100.0)), Margins::all(Pt(10.0)));
        assert!(canvas.at_page_top());
        assert!(!canvas.would_overflow(Pt(80.0)));
        assert!(canvas.would_overflow(Pt(80.1)));

        canvas.advance_cursor(Pt(50.0));
        assert_eq!(canvas.remaining_height(), Pt(30.0));
        assert!(!canvas.at_page_top());

        canvas.add_page();
        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.cursor_y(), Pt(10.0));
    }

    #[test]
    fn disabled_page_breaks_never_overflow() {
        let canvas = RecordingCanvas::new((Pt(100.0), Pt(100.0)), Margins::all(Pt(10.0)))
            .with_auto_page_break(false);
        assert!(!canvas.would_overflow(Pt(1000.0)));
    }

    #[test]
    fn unknown_images_fail() {
        let mut canvas = RecordingCanvas::new((Pt(100.0), Pt(100.0)), Margins::empty())
            .with_image("dice.jpg", Pt(20.0), Pt(10.0));
        assert_eq!(canvas.image_size(Path::new("dice.jpg")).unwrap(), (Pt(20.0), Pt(10.0)));
        assert!(canvas.image_size(Path::new("missing.png")).is_err());
    }
}
