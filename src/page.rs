use crate::canvas::Stroke;
use crate::colour::Colour;
use crate::content::render_contents;
use crate::font::Font;
use crate::image::Image;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Name, Pdf};

/// A run of text in a single font, size and colour. `origin` is the start of
/// the baseline in PDF coordinates (y up from the bottom of the page).
#[derive(Clone, PartialEq, Debug)]
pub struct TextRun {
    pub text: String,
    pub font: Id<Font>,
    pub size: Pt,
    pub colour: Colour,
    pub origin: (Pt, Pt),
}

/// An axis-aligned rectangle in PDF coordinates, anchored at its lower left corner
#[derive(Clone, PartialEq, Debug)]
pub struct RectShape {
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
    pub fill: Option<Colour>,
    pub stroke: Option<Stroke>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct LineShape {
    pub from: (Pt, Pt),
    pub to: (Pt, Pt),
    pub stroke: Stroke,
}

/// An image stretched over a rectangle in PDF coordinates
#[derive(Clone, PartialEq, Debug)]
pub struct ImagePlacement {
    pub image: Id<Image>,
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
}

/// Everything that can be drawn on a page, in painting order
#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(TextRun),
    Rect(RectShape),
    Line(LineShape),
    Image(ImagePlacement),
}

/// Object ids a page needs from the rest of the document when it is written
pub(crate) struct PageResources<'a> {
    pub fonts: &'a Arena<Font>,
    pub images: &'a Arena<Image>,
}

pub struct Page {
    /// Width and height of the page
    pub size: (Pt, Pt),
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: (Pt, Pt)) -> Page {
        Page {
            size,
            contents: Vec::new(),
        }
    }

    pub fn push(&mut self, item: PageContents) {
        self.contents.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        index: usize,
        resources: &PageResources<'_>,
        writer: &mut Pdf,
    ) -> std::io::Result<()> {
        let id = refs.alloc(RefType::Page(index));
        let parent = refs.alloc(RefType::PageTree);
        let content_id = refs.alloc(RefType::ContentForPage(index));

        let mut page = writer.page(id);
        page.media_box(pdf_writer::Rect::new(
            0.0,
            0.0,
            self.size.0.into(),
            self.size.1.into(),
        ));
        page.parent(parent);
        page.contents(content_id);

        let mut page_resources = page.resources();
        let mut fonts = page_resources.fonts();
        for (font_id, _) in resources.fonts.iter() {
            let index = font_id.index();
            fonts.pair(
                Name(format!("F{index}").as_bytes()),
                refs.alloc(RefType::Font(index)),
            );
        }
        fonts.finish();
        let mut x_objects = page_resources.x_objects();
        for (image_id, _) in resources.images.iter() {
            let index = image_id.index();
            x_objects.pair(
                Name(format!("I{index}").as_bytes()),
                refs.alloc(RefType::Image(index)),
            );
        }
        x_objects.finish();
        page_resources.finish();
        page.finish();

        let rendered = render_contents(&self.contents, resources.fonts)?;
        writer.stream(content_id, rendered.as_slice());
        Ok(())
    }
}
