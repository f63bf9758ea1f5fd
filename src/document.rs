use crate::error::Result;
use crate::font::Font;
use crate::image::Image;
use crate::info::Info;
use crate::page::{Page, PageResources};
use crate::refs::{ObjectReferences, RefType};
use id_arena::{Arena, Id};
use pdf_writer::{Pdf, Ref};
use std::io::Write;

/// The in-memory PDF: pages in reading order plus the fonts and images they
/// draw with. Fonts and images are embedded once and shared by every page.
#[derive(Default)]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Vec<Page>,
    pub fonts: Arena<Font>,
    pub images: Arena<Image>,
}

impl Document {
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Append a page, returning its index
    pub fn add_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    pub fn add_font(&mut self, font: Font) -> Id<Font> {
        self.fonts.alloc(font)
    }

    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.images.alloc(image)
    }

    /// Serialize the document
    pub fn write<W: Write>(&self, mut w: W) -> Result<()> {
        let mut refs = ObjectReferences::new();
        let catalog_id = refs.alloc(RefType::Catalog);
        let page_tree_id = refs.alloc(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = &self.info {
            info.write(&mut refs, &mut writer);
        }

        let page_refs: Vec<Ref> = (0..self.pages.len())
            .map(|i| refs.alloc(RefType::Page(i)))
            .collect();
        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (id, font) in self.fonts.iter() {
            font.write(&mut refs, id.index(), &mut writer);
        }
        for (id, image) in self.images.iter() {
            image.write(&mut refs, id.index(), &mut writer);
        }

        let resources = PageResources {
            fonts: &self.fonts,
            images: &self.images,
        };
        for (i, page) in self.pages.iter().enumerate() {
            page.write(&mut refs, i, &resources, &mut writer)?;
        }

        writer.catalog(catalog_id).pages(page_tree_id);

        log::debug!(
            "writing PDF with {} page(s), {} font(s), {} image(s)",
            self.pages.len(),
            self.fonts.len(),
            self.images.len()
        );
        w.write_all(writer.finish().as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Stroke;
    use crate::page::{PageContents, RectShape};
    use crate::units::Pt;

    #[test]
    fn writes_every_page() {
        let mut doc = Document::default();
        doc.set_info(Info::new().with_title("Grid"));
        let mut first = Page::new((Pt(200.0), Pt(100.0)));
        first.push(PageContents::Rect(RectShape {
            x: Pt(10.0),
            y: Pt(10.0),
            width: Pt(20.0),
            height: Pt(20.0),
            fill: None,
            stroke: Some(Stroke::default()),
        }));
        doc.add_page(first);
        doc.add_page(Page::new((Pt(200.0), Pt(100.0))));

        let mut out = Vec::new();
        doc.write(&mut out).unwrap();

        let text = String::from_utf8_lossy(&out);
        assert!(text.starts_with("%PDF-"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/Title (Grid)"));
        assert!(text.contains("10 10 20 20 re"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }
}
