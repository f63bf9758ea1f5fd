//! Layout engines that position content on a [`Canvas`](crate::Canvas).
//!
//! - [`TextFlow`] breaks tag-annotated rich text into lines, aligns them and
//!   draws them across as many pages as needed.
//! - [`Table`] places rows of (possibly merged) cells on a grid of fixed
//!   column widths, repeating header rows after every page break.
//!
//! Both engines read text attributes from a shared
//! [`StyleRegistry`](crate::StyleRegistry) and never hold on to the canvas
//! between calls.
//!
//! ```
//! use pdf_flow::{Canvas, FontStyle, RecordingCanvas, Pt, StyleDef, StyleRegistry};
//! use pdf_flow::layout::{FlowOptions, Margins, TextFlow};
//!
//! let mut styles = StyleRegistry::new();
//! styles.set_style("b", StyleDef::new().font_style(FontStyle::BOLD)).unwrap();
//! let mut canvas = RecordingCanvas::new((Pt(200.0), Pt(300.0)), Margins::all(Pt(10.0)));
//!
//! let flow = TextFlow::new(&styles);
//! let height = flow
//!     .render(&mut canvas, "Some <b>bold</b> words", &FlowOptions::default())
//!     .unwrap();
//! assert_eq!(canvas.cursor_y(), Pt(10.0) + height);
//! ```

mod align;
mod flow;
mod margins;
pub mod markup;
mod occupancy;
mod table;

pub use align::*;
pub use flow::*;
pub use margins::*;
pub use occupancy::*;
pub use table::*;
