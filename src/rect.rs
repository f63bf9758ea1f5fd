use crate::units::*;

/// A rectangle, specified by two opposite corners.
///
/// The layout engines work top-down: on a [`Canvas`](crate::Canvas), `y1` is
/// the top edge and `y2` the bottom edge. [`PdfCanvas`](crate::PdfCanvas) flips them
/// into PDF's bottom-up space as they are drawn.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    /// The x-coordinate of the first (left) corner.
    pub x1: Pt,
    /// The y-coordinate of the first corner.
    pub y1: Pt,
    /// The x-coordinate of the second (right) corner.
    pub x2: Pt,
    /// The y-coordinate of the second corner.
    pub y2: Pt,
}

impl Rect {
    /// Build a rectangle from its top-left corner and its size
    pub fn from_xywh(x: Pt, y: Pt, width: Pt, height: Pt) -> Rect {
        Rect {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn width(&self) -> Pt {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> Pt {
        (self.y2 - self.y1).abs()
    }

    /// Shrink the rectangle by the given padding on every side
    pub fn inset(&self, padding: &crate::layout::Margins) -> Rect {
        Rect {
            x1: self.x1 + padding.left,
            y1: self.y1 + padding.top,
            x2: self.x2 - padding.right,
            y2: self.y2 - padding.bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Margins;

    #[test]
    fn inset_shrinks_each_side() {
        let r = Rect::from_xywh(Pt(10.0), Pt(20.0), Pt(100.0), Pt(50.0));
        let inner = r.inset(&Margins::trbl(Pt(1.0), Pt(2.0), Pt(3.0), Pt(4.0)));
        assert_eq!(inner.x1, Pt(14.0));
        assert_eq!(inner.y1, Pt(21.0));
        assert_eq!(inner.width(), Pt(94.0));
        assert_eq!(inner.height(), Pt(46.0));
    }
}
