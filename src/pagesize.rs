//! Common paper sizes, as `(width, height)` in points, in portrait orientation.
//!
//! ```
//! use pdf_flow::pagesize::{PageOrientation, A4, LETTER};
//! use pdf_flow::layout::Margins;
//! use pdf_flow::{Pt, PdfCanvas};
//!
//! let portrait = PdfCanvas::new(LETTER, Margins::all(Pt(72.0)));
//! let landscape = PdfCanvas::new(A4.landscape(), Margins::symmetric(Pt(36.0), Pt(54.0)));
//! ```

use crate::units::Pt;

/// Page dimensions as (width, height) in points
pub type PageSize = (Pt, Pt);

// 72 points to the inch, 25.4 millimetres to the inch
pub const LETTER: PageSize = (Pt(8.5 * 72.0), Pt(11.0 * 72.0));
pub const LEGAL: PageSize = (Pt(8.5 * 72.0), Pt(14.0 * 72.0));
pub const TABLOID: PageSize = (Pt(11.0 * 72.0), Pt(17.0 * 72.0));

pub const A3: PageSize = (Pt(297.0 * 72.0 / 25.4), Pt(420.0 * 72.0 / 25.4));
pub const A4: PageSize = (Pt(210.0 * 72.0 / 25.4), Pt(297.0 * 72.0 / 25.4));
pub const A5: PageSize = (Pt(148.0 * 72.0 / 25.4), Pt(210.0 * 72.0 / 25.4));
pub const A6: PageSize = (Pt(105.0 * 72.0 / 25.4), Pt(148.0 * 72.0 / 25.4));

/// Swap a page size between portrait and landscape
pub trait PageOrientation {
    /// The size with width ≤ height
    fn portrait(self) -> Self;
    /// The size with width ≥ height
    fn landscape(self) -> Self;
}

impl PageOrientation for PageSize {
    fn portrait(self) -> PageSize {
        if self.0 <= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }

    fn landscape(self) -> PageSize {
        if self.0 >= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_swaps_once() {
        let landscape = A4.landscape();
        assert!(landscape.0 > landscape.1);
        assert_eq!(landscape.landscape(), landscape);
        assert_eq!(landscape.portrait(), A4);
        assert_eq!(LETTER, (Pt(612.0), Pt(792.0)));
    }
}
