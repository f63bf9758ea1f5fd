//! A [`Canvas`] that draws into a [`Document`].

use crate::canvas::{Canvas, FontMetrics, Stroke};
use crate::colour::Colour;
use crate::document::Document;
use crate::error::Result;
use crate::font::Font;
use crate::image::Image;
use crate::info::Info;
use crate::layout::Margins;
use crate::page::{ImagePlacement, LineShape, Page, PageContents, RectShape, TextRun};
use crate::rect::Rect;
use crate::style::{FontStyle, ResolvedStyle};
use crate::units::Pt;
use id_arena::Id;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

// used for measuring when no font has been registered at all
const FALLBACK_CHAR_WIDTH: f32 = 0.5;
const FALLBACK_ASCENT: f32 = 0.8;
const FALLBACK_DESCENT: f32 = -0.2;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

impl FaceKey {
    fn new(family: &str, bold: bool, italic: bool) -> FaceKey {
        FaceKey {
            family: family.to_lowercase(),
            bold,
            italic,
        }
    }
}

/// Draws layout output onto the pages of a [`Document`], every page sharing
/// one size and set of margins.
///
/// Fonts are looked up by family name and bold / italic flags. A style asking
/// for a face that was never registered falls back to the family's regular
/// face, then to the first font registered. Canvas coordinates run top-down
/// and are flipped into PDF space here.
pub struct PdfCanvas {
    document: Document,
    page_size: (Pt, Pt),
    margins: Margins,
    cursor_y: Pt,
    auto_page_break: bool,
    faces: HashMap<FaceKey, Id<Font>>,
    first_font: Option<Id<Font>>,
    images: HashMap<PathBuf, Id<Image>>,
}

impl PdfCanvas {
    /// A document with a single empty page and the cursor at its top margin
    pub fn new(page_size: (Pt, Pt), margins: Margins) -> PdfCanvas {
        let mut document = Document::default();
        document.add_page(Page::new(page_size));
        PdfCanvas {
            document,
            page_size,
            cursor_y: margins.top,
            margins,
            auto_page_break: true,
            faces: HashMap::new(),
            first_font: None,
            images: HashMap::new(),
        }
    }

    pub fn with_auto_page_break(mut self, enabled: bool) -> Self {
        self.auto_page_break = enabled;
        self
    }

    pub fn with_info(mut self, info: Info) -> Self {
        self.document.set_info(info);
        self
    }

    /// Register a font under the family, weight and slant it declares itself
    pub fn add_font(&mut self, font: Font) -> Id<Font> {
        let family = font.family().unwrap_or_default();
        let font_style = FontStyle {
            bold: font.is_bold(),
            italic: font.is_italic(),
            underline: false,
        };
        self.add_font_as(family, font_style, font)
    }

    /// Register a font under an explicit family and style, replacing any face
    /// registered for the same combination before
    pub fn add_font_as<S: AsRef<str>>(
        &mut self,
        family: S,
        font_style: FontStyle,
        font: Font,
    ) -> Id<Font> {
        let key = FaceKey::new(family.as_ref(), font_style.bold, font_style.italic);
        log::debug!(
            "registering font {:?} as {:?}",
            font.name().unwrap_or_default(),
            key
        );
        let id = self.document.add_font(font);
        self.faces.insert(key, id);
        if self.first_font.is_none() {
            self.first_font = Some(id);
        }
        id
    }

    fn font_id_for(&self, style: &ResolvedStyle) -> Option<Id<Font>> {
        let bold = style.font_style.bold;
        let italic = style.font_style.italic;
        self.faces
            .get(&FaceKey::new(&style.family, bold, italic))
            .or_else(|| self.faces.get(&FaceKey::new(&style.family, false, false)))
            .copied()
            .or(self.first_font)
    }

    fn font_for(&self, style: &ResolvedStyle) -> Option<&Font> {
        self.font_id_for(style)
            .and_then(|id| self.document.fonts.get(id))
    }

    fn load_image(&mut self, path: &Path) -> Result<Id<Image>> {
        if let Some(id) = self.images.get(path) {
            return Ok(*id);
        }
        let image = Image::load(path)?;
        log::debug!(
            "loaded {}x{} image from {}",
            image.width,
            image.height,
            path.display()
        );
        let id = self.document.add_image(image);
        self.images.insert(path.to_path_buf(), id);
        Ok(id)
    }

    fn current_page(&mut self) -> &mut Page {
        if self.document.pages.is_empty() {
            self.document.add_page(Page::new(self.page_size));
        }
        let last = self.document.pages.len() - 1;
        &mut self.document.pages[last]
    }

    fn flip(&self, y: Pt) -> Pt {
        self.page_size.1 - y
    }

    pub fn page_count(&self) -> usize {
        self.document.pages.len()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Serialize everything drawn so far as a PDF
    pub fn write<W: Write>(&self, w: W) -> Result<()> {
        self.document.write(w)
    }
}

impl Canvas for PdfCanvas {
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
        let index = self.document.add_page(Page::new(self.page_size));
        self.cursor_y = self.margins.top;
        log::debug!("started page {}", index + 1);
    }

    fn measure_text_width(&self, text: &str, style: &ResolvedStyle) -> Pt {
        match self.font_for(style) {
            Some(font) => font.width_of_text(text, style.size),
            None => style.size * (FALLBACK_CHAR_WIDTH * text.chars().count() as f32),
        }
    }

    fn font_metrics(&self, style: &ResolvedStyle) -> FontMetrics {
        match self.font_for(style) {
            Some(font) => font.metrics(style.size),
            None => FontMetrics {
                ascent: style.size * FALLBACK_ASCENT,
                descent: style.size * FALLBACK_DESCENT,
            },
        }
    }

    fn draw_text(&mut self, x: Pt, baseline: Pt, text: &str, style: &ResolvedStyle) {
        let Some(font) = self.font_id_for(style) else {
            log::warn!("no font registered, dropping text {text:?}");
            return;
        };
        let origin = (x, self.flip(baseline));
        self.current_page().push(PageContents::Text(TextRun {
            text: text.to_string(),
            font,
            size: style.size,
            colour: style.colour,
            origin,
        }));
    }

    fn draw_rect(&mut self, rect: Rect, fill: Option<Colour>, stroke: Option<Stroke>) {
        let shape = RectShape {
            x: rect.x1,
            y: self.flip(rect.y2),
            width: rect.width(),
            height: rect.height(),
            fill,
            stroke,
        };
        self.current_page().push(PageContents::Rect(shape));
    }

    fn draw_line(&mut self, from: (Pt, Pt), to: (Pt, Pt), stroke: Stroke) {
        let line = LineShape {
            from: (from.0, self.flip(from.1)),
            to: (to.0, self.flip(to.1)),
            stroke,
        };
        self.current_page().push(PageContents::Line(line));
    }

    fn image_size(&mut self, path: &Path) -> Result<(Pt, Pt)> {
        let id = self.load_image(path)?;
        Ok(self
            .document
            .images
            .get(id)
            .map(Image::size)
            .unwrap_or_default())
    }

    fn draw_image(&mut self, path: &Path, rect: Rect) -> Result<()> {
        let image = self.load_image(path)?;
        let placement = ImagePlacement {
            image,
            x: rect.x1,
            y: self.flip(rect.y2),
            width: rect.width(),
            height: rect.height(),
        };
        self.current_page().push(PageContents::Image(placement));
        Ok(())
    }

    fn auto_page_break(&self) -> bool {
        self.auto_page_break
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Cell, Row, Table, TableConfig, TextFlow};
    use crate::style::{StyleDef, StyleRegistry};
    use image::{DynamicImage, RgbaImage};

    fn canvas() -> PdfCanvas {
        PdfCanvas::new((Pt(200.0), Pt(100.0)), Margins::all(Pt(10.0)))
    }

    fn styles() -> StyleRegistry {
        let mut styles = StyleRegistry::new();
        styles
            .set_style("default", StyleDef::new().size(Pt(10.0)))
            .unwrap();
        styles
    }

    #[test]
    fn shapes_are_flipped_into_pdf_space() {
        let mut canvas = canvas();
        canvas.draw_rect(
            Rect::from_xywh(Pt(10.0), Pt(20.0), Pt(30.0), Pt(15.0)),
            Some(Colour::new_grey(0.9)),
            None,
        );
        canvas.draw_line((Pt(0.0), Pt(10.0)), (Pt(50.0), Pt(10.0)), Stroke::default());

        let page = &canvas.document().pages[0];
        assert_eq!(
            page.contents[0],
            PageContents::Rect(RectShape {
                x: Pt(10.0),
                y: Pt(65.0),
                width: Pt(30.0),
                height: Pt(15.0),
                fill: Some(Colour::new_grey(0.9)),
                stroke: None,
            })
        );
        assert_eq!(
            page.contents[1],
            PageContents::Line(LineShape {
                from: (Pt(0.0), Pt(90.0)),
                to: (Pt(50.0), Pt(90.0)),
                stroke: Stroke::default(),
            })
        );
    }

    #[test]
    fn text_without_fonts_is_measured_but_not_drawn() {
        let mut canvas = canvas();
        let style = ResolvedStyle {
            size: Pt(10.0),
            ..Default::default()
        };
        assert_eq!(canvas.measure_text_width("abcd", &style), Pt(20.0));
        assert_eq!(canvas.font_metrics(&style).height(), Pt(10.0));

        canvas.draw_text(Pt(10.0), Pt(20.0), "abcd", &style);
        assert!(canvas.document().pages[0].is_empty());
    }

    #[test]
    fn new_pages_reset_the_cursor() {
        let mut canvas = canvas();
        canvas.advance_cursor(Pt(50.0));
        canvas.add_page();
        assert_eq!(canvas.page_count(), 2);
        assert!(canvas.at_page_top());
    }

    #[test]
    fn images_are_loaded_once_per_path() {
        let path = std::env::temp_dir().join(format!("pdf-flow-{}-dot.png", std::process::id()));
        DynamicImage::ImageRgba8(RgbaImage::new(4, 2))
            .save(&path)
            .unwrap();

        let mut canvas = canvas();
        assert_eq!(canvas.image_size(&path).unwrap(), (Pt(4.0), Pt(2.0)));
        canvas
            .draw_image(&path, Rect::from_xywh(Pt(10.0), Pt(10.0), Pt(8.0), Pt(4.0)))
            .unwrap();
        canvas
            .draw_image(&path, Rect::from_xywh(Pt(10.0), Pt(30.0), Pt(8.0), Pt(4.0)))
            .unwrap();
        assert_eq!(canvas.document().images.len(), 1);

        let mut out = Vec::new();
        canvas.write(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("/SMask"));
        assert!(text.contains("8 0 0 4 10 86 cm"));

        // cached, so gone from disk no longer matters
        std::fs::remove_file(&path).unwrap();
        assert!(canvas.image_size(&path).is_ok());
        assert!(canvas.image_size(Path::new("missing/image.png")).is_err());
        assert!(canvas
            .draw_image(Path::new("missing/other.png"), Rect::default())
            .is_err());
    }

    #[test]
    fn tables_paginate_into_pdf_pages() {
        let styles = styles();
        let mut canvas = canvas();
        let mut table = Table::new(&styles);
        table
            .initialize([Pt(60.0), Pt(60.0)], TableConfig::default())
            .unwrap();
        for i in 0..10 {
            let row = Row::new()
                .cell(Cell::text(format!("row {i}")))
                .cell(Cell::text("x"));
            table.add_row(&mut canvas, row).unwrap();
        }
        table.close(&mut canvas).unwrap();

        // 14pt rows, 80pt of usable height per page
        assert_eq!(canvas.page_count(), 2);

        let flow = TextFlow::new(&styles);
        let height = flow
            .render(&mut canvas, "after the table", &Default::default())
            .unwrap();
        assert_eq!(height, Pt(10.0));

        let mut out = Vec::new();
        canvas.write(&mut out).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("/Count 2"));
    }
}
