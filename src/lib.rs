//! Rich text flow and grid table layout for paginated PDF documents.
//!
//! Text is written in a small tag language (`<b>bold</b>`, `<br>`, named
//! styles from a [`StyleRegistry`]) and laid out by
//! [`TextFlow`](layout::TextFlow); tables with merged cells and repeating
//! headers are laid out by [`Table`](layout::Table). Both draw onto any
//! [`Canvas`]: a [`PdfCanvas`] to produce a PDF with embedded fonts and
//! images, or a [`RecordingCanvas`] to measure and inspect the result.

mod canvas;
pub use canvas::*;

mod colour;
pub use colour::*;

mod content;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

mod info;
pub use info::*;

/// Text flow and table layout
pub mod layout;

mod page;
pub use page::*;

pub mod pagesize;

mod pdf_canvas;
pub use pdf_canvas::*;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod style;
pub use style::*;

mod units;
pub use units::*;

/// Re-export PDF-writer functionality
pub use pdf_writer;
