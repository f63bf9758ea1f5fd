//! Grid tables with merged cells, repeated header rows and page breaks.
//!
//! A [`Table`] is fed one [`Row`] at a time. Rows are drawn as soon as their
//! height is known: immediately for plain rows, or once every row-spanning
//! cell above has reached its last row. Consecutive rows joined by row spans
//! form a *row group* which is kept on one page whenever it fits.
//!
//! ```
//! use pdf_flow::{RecordingCanvas, Pt, StyleRegistry};
//! use pdf_flow::layout::{Cell, Margins, Row, Table, TableConfig};
//!
//! let styles = StyleRegistry::new();
//! let mut canvas = RecordingCanvas::new((Pt(300.0), Pt(400.0)), Margins::all(Pt(10.0)));
//!
//! let mut table = Table::new(&styles);
//! let widths = [Pt(35.0), Pt(30.0), Pt(40.0), Pt(40.0), Pt(25.0)];
//! table.initialize(widths, TableConfig::default()).unwrap();
//! table.add_header(Some(Row::from_iter((1..=5).map(|i| Cell::text(format!("Header {i}")))))).unwrap();
//! table.add_row(&mut canvas, Row::new()
//!     .cell(Cell::text("a"))
//!     .cell(Cell::text("b"))
//!     .cell(Cell::text("merged").colspan(2).rowspan(2))
//!     .cell(Cell::text("e"))).unwrap();
//! // columns 2 and 3 are still taken by the merged cell
//! table.add_row(&mut canvas, Row::new()
//!     .cell(Cell::text("f"))
//!     .cell(Cell::text("g"))
//!     .cell(Cell::text("h"))).unwrap();
//! table.close(&mut canvas).unwrap();
//! assert!(canvas.texts().any(|(_, _, _, text)| text == "merged"));
//! ```

use super::align::{Align, CellAlignment, VAlign};
use super::flow::{Border, FlowLayout, FlowOptions, TextFlow};
use super::margins::{Margins, Padding};
use super::occupancy::SpanOccupancy;
use crate::canvas::{Canvas, Stroke, EPSILON};
use crate::colour::Colour;
use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::style::{FontStyle, StyleOverride, StyleRegistry, DEFAULT_STYLE};
use crate::units::Pt;
use std::ops::Range;
use std::path::PathBuf;

/// What a cell shows
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Marked-up text, laid out with [`TextFlow`]
    Text(String),
    /// A raster image. Without an explicit size the image keeps its intrinsic
    /// size, scaled down to the cell's inner width if needed; with one side
    /// given the other keeps the aspect ratio.
    Image {
        path: PathBuf,
        width: Option<Pt>,
        height: Option<Pt>,
    },
}

/// One grid position, possibly merged across several columns and rows.
/// Every `None` falls back to the table's [`CellDefaults`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: CellContent,
    /// Explicit starting column; otherwise the next free column is used
    pub column: Option<usize>,
    pub colspan: usize,
    pub rowspan: usize,
    pub align: Option<Align>,
    pub valign: Option<VAlign>,
    pub background: Option<Colour>,
    pub padding: Option<Padding>,
    /// Registered style the cell's text starts out in
    pub style: Option<String>,
    /// Direct size, colour and font style adjustments
    pub style_override: StyleOverride,
    pub line_height: Option<Pt>,
    pub border: Option<Border>,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            content: CellContent::Text(String::new()),
            column: None,
            colspan: 1,
            rowspan: 1,
            align: None,
            valign: None,
            background: None,
            padding: None,
            style: None,
            style_override: StyleOverride::default(),
            line_height: None,
            border: None,
        }
    }
}

impl Cell {
    pub fn text<S: ToString>(text: S) -> Cell {
        Cell {
            content: CellContent::Text(text.to_string()),
            ..Default::default()
        }
    }

    pub fn image<P: Into<PathBuf>>(path: P) -> Cell {
        Cell {
            content: CellContent::Image {
                path: path.into(),
                width: None,
                height: None,
            },
            ..Default::default()
        }
    }

    pub fn empty() -> Cell {
        Cell::default()
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn colspan(mut self, colspan: usize) -> Self {
        self.colspan = colspan;
        self
    }

    pub fn rowspan(mut self, rowspan: usize) -> Self {
        self.rowspan = rowspan;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.valign = Some(valign);
        self
    }

    /// Apply a combined code such as `"RT"` parsed into a [`CellAlignment`]
    pub fn alignment(mut self, alignment: CellAlignment) -> Self {
        self.align = alignment.horizontal.or(self.align);
        self.valign = alignment.vertical.or(self.valign);
        self
    }

    pub fn background<C: Into<Colour>>(mut self, background: C) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn style<S: ToString>(mut self, style: S) -> Self {
        self.style = Some(style.to_string());
        self
    }

    pub fn text_size<P: Into<Pt>>(mut self, size: P) -> Self {
        self.style_override.size = Some(size.into());
        self
    }

    pub fn text_colour<C: Into<Colour>>(mut self, colour: C) -> Self {
        self.style_override.colour = Some(colour.into());
        self
    }

    pub fn font_style(mut self, font_style: FontStyle) -> Self {
        self.style_override.font_style = Some(font_style);
        self
    }

    pub fn line_height<P: Into<Pt>>(mut self, line_height: P) -> Self {
        self.line_height = Some(line_height.into());
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    /// Draw an image cell this wide; ignored for text cells
    pub fn image_width<P: Into<Pt>>(mut self, image_width: P) -> Self {
        if let CellContent::Image { width, .. } = &mut self.content {
            *width = Some(image_width.into());
        }
        self
    }

    /// Draw an image cell this tall; ignored for text cells
    pub fn image_height<P: Into<Pt>>(mut self, image_height: P) -> Self {
        if let CellContent::Image { height, .. } = &mut self.content {
            *height = Some(image_height.into());
        }
        self
    }
}

/// The cells of one table row, in column order. Columns the cells leave
/// uncovered are filled with empty cells.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new() -> Row {
        Row::default()
    }

    pub fn cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row { cells }
    }
}

impl FromIterator<Cell> for Row {
    fn from_iter<T: IntoIterator<Item = Cell>>(iter: T) -> Self {
        Row {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Horizontal placement of the table between the page margins
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TableAlign {
    /// At the left margin plus [`TableConfig::left_margin`]
    #[default]
    Left,
    Center,
    Right,
}

/// Appearance of cells that don't say otherwise
#[derive(Debug, Clone, PartialEq)]
pub struct CellDefaults {
    pub padding: Padding,
    pub align: Align,
    pub valign: VAlign,
    pub style: String,
    pub style_override: StyleOverride,
    pub line_height: Pt,
    pub background: Option<Colour>,
    pub border: Border,
}

impl Default for CellDefaults {
    fn default() -> Self {
        CellDefaults {
            padding: Margins::all(Pt(2.0)),
            align: Align::Left,
            valign: VAlign::Top,
            style: DEFAULT_STYLE.to_string(),
            style_override: StyleOverride::default(),
            line_height: Pt::ZERO,
            background: None,
            border: Border::ALL,
        }
    }
}

impl CellDefaults {
    /// The defaults for header rows: like body cells, but bold
    pub fn header() -> CellDefaults {
        CellDefaults::default()
            .with_style_override(StyleOverride::default().with_font_style(FontStyle::BOLD))
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
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

    pub fn with_line_height<P: Into<Pt>>(mut self, line_height: P) -> Self {
        self.line_height = line_height.into();
        self
    }

    pub fn with_background<C: Into<Colour>>(mut self, background: C) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }
}

/// Table-wide settings passed to [`Table::initialize`]
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub align: TableAlign,
    /// Extra offset from the left page margin for [`TableAlign::Left`]
    pub left_margin: Pt,
    /// Defaults for body cells
    pub cell: CellDefaults,
    /// Defaults for header cells
    pub header: CellDefaults,
    pub stroke: Stroke,
    /// What [`Table::close`] does with row spans reaching past the last row:
    /// fail with [`Error::DanglingRowSpan`] when set, otherwise cut the spans
    /// short and draw them
    pub strict_row_spans: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            align: TableAlign::Left,
            left_margin: Pt::ZERO,
            cell: CellDefaults::default(),
            header: CellDefaults::header(),
            stroke: Stroke::default(),
            strict_row_spans: true,
        }
    }
}

impl TableConfig {
    pub fn with_align(mut self, align: TableAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_left_margin<P: Into<Pt>>(mut self, left_margin: P) -> Self {
        self.left_margin = left_margin.into();
        self
    }

    pub fn with_cell_defaults(mut self, cell: CellDefaults) -> Self {
        self.cell = cell;
        self
    }

    pub fn with_header_defaults(mut self, header: CellDefaults) -> Self {
        self.header = header;
        self
    }

    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_strict_row_spans(mut self, strict: bool) -> Self {
        self.strict_row_spans = strict;
        self
    }
}

#[derive(Debug, Clone)]
struct PlacedCell {
    cell: Cell,
    column: usize,
    colspan: usize,
    rowspan: usize,
}

#[derive(Debug, Clone, Default)]
struct PlacedRow {
    cells: Vec<PlacedCell>,
    /// Columns taken by spans from rows above
    reserved: usize,
}

/// Assign columns to the cells of `row`. Works on a copy of the occupancy so
/// a rejected row leaves the table untouched.
fn place_row(occupancy: &SpanOccupancy, row: Row, index: usize) -> Result<(PlacedRow, SpanOccupancy)> {
    let columns = occupancy.columns();
    let mut next = occupancy.clone();
    let mut taken = next.begin_row();
    let reserved = taken.iter().filter(|t| **t).count();

    let mut cells = Vec::with_capacity(columns);
    let mut cursor = 0;
    for cell in row.cells {
        let colspan = cell.colspan.max(1);
        let rowspan = cell.rowspan.max(1);
        let column = match cell.column {
            Some(column) => column,
            None => {
                while cursor < columns && taken[cursor] {
                    cursor += 1;
                }
                cursor
            }
        };

        let end = column
            .checked_add(colspan)
            .filter(|end| *end <= columns)
            .ok_or(Error::ColumnOverflow {
                row: index,
                column,
                colspan,
                columns,
            })?;
        if let Some(overlap) = (column..end).find(|c| taken[*c]) {
            return Err(Error::CellOverlap {
                row: index,
                column: overlap,
            });
        }

        taken[column..end].iter_mut().for_each(|t| *t = true);
        cursor = end;
        if rowspan > 1 {
            next.reserve(column, colspan, rowspan - 1);
        }
        cells.push(PlacedCell {
            cell,
            column,
            colspan,
            rowspan,
        });
    }

    for (column, _) in taken.iter().enumerate().filter(|(_, t)| !**t) {
        cells.push(PlacedCell {
            cell: Cell::empty(),
            column,
            colspan: 1,
            rowspan: 1,
        });
    }
    cells.sort_by_key(|placed| placed.column);

    Ok((PlacedRow { cells, reserved }, next))
}

#[derive(Debug)]
enum Content {
    Text(FlowLayout),
    Image { path: PathBuf, width: Pt, height: Pt },
}

/// A cell measured and positioned within its row group
#[derive(Debug)]
struct CellBox {
    row: usize,
    rows: usize,
    /// Offset from the left edge of the table
    x: Pt,
    width: Pt,
    /// Content height including padding
    height: Pt,
    padding: Padding,
    align: Align,
    valign: VAlign,
    background: Option<Colour>,
    border: Border,
    content: Content,
}

#[derive(Debug, Default)]
struct GroupLayout {
    heights: Vec<Pt>,
    cells: Vec<CellBox>,
}

impl GroupLayout {
    fn height(&self, rows: Range<usize>) -> Pt {
        self.heights[rows].iter().copied().sum()
    }

    fn rows(&self) -> usize {
        self.heights.len()
    }
}

/// Scale an image with intrinsic size (`iw`, `ih`) into a cell
fn image_box(iw: Pt, ih: Pt, width: Option<Pt>, height: Option<Pt>, inner: Pt) -> (Pt, Pt) {
    if iw <= Pt::ZERO || ih <= Pt::ZERO {
        return (width.unwrap_or_default(), height.unwrap_or_default());
    }
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, ih * (w / iw)),
        (None, Some(h)) => (iw * (h / ih), h),
        (None, None) if iw > inner => (inner, ih * (inner / iw)),
        (None, None) => (iw, ih),
    }
}

fn valign_offset(valign: VAlign, available: Pt, content: Pt) -> Pt {
    let slack = (available - content).max(Pt::ZERO);
    match valign {
        VAlign::Top => Pt::ZERO,
        VAlign::Middle => slack / 2.0,
        VAlign::Bottom => slack,
    }
}

#[derive(Debug)]
struct Grid {
    columns: Vec<Pt>,
    config: TableConfig,
    headers: Vec<PlacedRow>,
    header_occupancy: SpanOccupancy,
    occupancy: SpanOccupancy,
    /// Rows waiting for their row spans to end
    pending: Vec<PlacedRow>,
    rows_added: usize,
    headers_drawn: bool,
    /// Whether the cursor sits right below the headers of a fresh page, where
    /// breaking again would gain nothing
    fresh_page: bool,
}

impl Grid {
    fn total_width(&self) -> Pt {
        self.columns.iter().copied().sum()
    }

    fn left<C: Canvas + ?Sized>(&self, canvas: &C) -> Pt {
        let margins = canvas.margins();
        let (page_width, _) = canvas.page_size();
        match self.config.align {
            TableAlign::Left => margins.left + self.config.left_margin,
            TableAlign::Center => {
                margins.left + ((canvas.content_width() - self.total_width()) / 2.0).max(Pt::ZERO)
            }
            TableAlign::Right => page_width - margins.right - self.total_width(),
        }
    }

    /// Measure every cell of a row group and work out the row heights
    fn layout_rows<C: Canvas + ?Sized>(
        &self,
        styles: &StyleRegistry,
        canvas: &mut C,
        rows: &[PlacedRow],
        defaults: &CellDefaults,
    ) -> Result<GroupLayout> {
        let flow = TextFlow::new(styles);
        let mut offsets = Vec::with_capacity(self.columns.len() + 1);
        let mut x = Pt::ZERO;
        offsets.push(x);
        for width in self.columns.iter() {
            x += *width;
            offsets.push(x);
        }

        let mut cells = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            for placed in row.cells.iter() {
                let cell = &placed.cell;
                let x = offsets[placed.column];
                let width = offsets[placed.column + placed.colspan] - x;
                let padding = cell.padding.unwrap_or(defaults.padding);
                let align = cell.align.unwrap_or(defaults.align);

                let (content, height) = match &cell.content {
                    CellContent::Text(text) => {
                        let mut style_override = cell.style_override.clone();
                        style_override.inherit_from(&defaults.style_override);
                        let options = FlowOptions::default()
                            .with_width(width)
                            .with_padding(padding)
                            .with_align(align)
                            .with_line_height(cell.line_height.unwrap_or(defaults.line_height))
                            .with_style(cell.style.as_deref().unwrap_or(defaults.style.as_str()))
                            .with_style_override(style_override);
                        let layout = flow.layout(&*canvas, text, &options)?;
                        let height = layout.height;
                        (Content::Text(layout), height)
                    }
                    CellContent::Image {
                        path,
                        width: image_width,
                        height: image_height,
                    } => {
                        let (iw, ih) = canvas.image_size(path)?;
                        let inner = (width - padding.horizontal()).max(Pt::ZERO);
                        let (w, h) = image_box(iw, ih, *image_width, *image_height, inner);
                        let content = Content::Image {
                            path: path.clone(),
                            width: w,
                            height: h,
                        };
                        (content, h + padding.vertical())
                    }
                };

                cells.push(CellBox {
                    row: r,
                    // spans past the end of the group were cut short at close
                    rows: placed.rowspan.min(rows.len() - r),
                    x,
                    width,
                    height,
                    padding,
                    align,
                    valign: cell.valign.unwrap_or(defaults.valign),
                    background: cell.background.or(defaults.background),
                    border: cell.border.unwrap_or(defaults.border),
                    content,
                });
            }
        }

        let mut heights = vec![Pt::ZERO; rows.len()];
        for cell in cells.iter().filter(|cell| cell.rows == 1) {
            heights[cell.row] = heights[cell.row].max(cell.height);
        }

        // spread whatever the spanning cells still need over their rows
        let mut spanning: Vec<&CellBox> = cells.iter().filter(|cell| cell.rows > 1).collect();
        spanning.sort_by_key(|cell| cell.rows);
        for cell in spanning {
            let range = cell.row..cell.row + cell.rows;
            let have: Pt = heights[range.clone()].iter().copied().sum();
            if cell.height > have + EPSILON {
                let extra = (cell.height - have) / cell.rows as f32;
                heights[range].iter_mut().for_each(|height| *height += extra);
            }
        }

        Ok(GroupLayout { heights, cells })
    }

    fn layout_headers<C: Canvas + ?Sized>(
        &self,
        styles: &StyleRegistry,
        canvas: &mut C,
    ) -> Result<Option<GroupLayout>> {
        if self.headers.is_empty() {
            return Ok(None);
        }
        self.layout_rows(styles, canvas, &self.headers, &self.config.header)
            .map(Some)
    }

    fn draw_headers<C: Canvas + ?Sized>(&self, canvas: &mut C, headers: &GroupLayout) -> Result<()> {
        let top = canvas.cursor_y();
        let left = self.left(canvas);
        self.draw_rows(canvas, headers, 0..headers.rows(), left, top)?;
        canvas.set_cursor_y(top + headers.height(0..headers.rows()));
        Ok(())
    }

    /// Draw the headers above the first body rows, on a new page if the
    /// headers and the first group don't fit on this one
    fn begin<C: Canvas + ?Sized>(&mut self, styles: &StyleRegistry, canvas: &mut C, first: Pt) -> Result<()> {
        let headers = self.layout_headers(styles, canvas)?;
        let header_height = headers
            .as_ref()
            .map(|h| h.height(0..h.rows()))
            .unwrap_or_default();
        if canvas.would_overflow(header_height + first) && !canvas.at_page_top() {
            log::debug!("table does not fit below the cursor, starting it on a new page");
            canvas.add_page();
        }
        if let Some(headers) = headers {
            self.draw_headers(canvas, &headers)?;
        }
        self.headers_drawn = true;
        self.fresh_page = true;
        Ok(())
    }

    fn break_page<C: Canvas + ?Sized>(&mut self, styles: &StyleRegistry, canvas: &mut C) -> Result<()> {
        canvas.add_page();
        if let Some(headers) = self.layout_headers(styles, canvas)? {
            log::debug!("replaying {} header row(s)", headers.rows());
            self.draw_headers(canvas, &headers)?;
        }
        self.fresh_page = true;
        Ok(())
    }

    /// Draw a measured row group below the cursor, breaking pages as needed
    fn draw_group<C: Canvas + ?Sized>(
        &mut self,
        styles: &StyleRegistry,
        canvas: &mut C,
        layout: GroupLayout,
    ) -> Result<()> {
        let count = layout.rows();
        let total = layout.height(0..count);
        log::debug!("drawing row group of {count} row(s), {total}pt tall");

        if !self.headers_drawn {
            self.begin(styles, canvas, total)?;
        }
        if canvas.would_overflow(total) && !self.fresh_page {
            self.break_page(styles, canvas)?;
        }

        // groups taller than a page are split between rows
        let left = self.left(canvas);
        let mut start = 0;
        while start < count {
            if canvas.would_overflow(layout.heights[start]) && !self.fresh_page {
                self.break_page(styles, canvas)?;
            }
            let mut end = start + 1;
            let mut height = layout.heights[start];
            while end < count && !canvas.would_overflow(height + layout.heights[end]) {
                height += layout.heights[end];
                end += 1;
            }

            let top = canvas.cursor_y();
            self.draw_rows(canvas, &layout, start..end, left, top)?;
            canvas.set_cursor_y(top + height);
            self.fresh_page = false;
            start = end;
        }

        Ok(())
    }

    /// Draw the given rows of a group with the first one's top edge at `top`.
    /// Cells spanning in from earlier rows or out past the last one get the
    /// part of their box on this page; content is only drawn where a cell starts.
    fn draw_rows<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        layout: &GroupLayout,
        rows: Range<usize>,
        left: Pt,
        top: Pt,
    ) -> Result<()> {
        let segments: Vec<(&CellBox, Rect, bool, bool)> = layout
            .cells
            .iter()
            .filter_map(|cell| {
                let first = cell.row.max(rows.start);
                let last = (cell.row + cell.rows).min(rows.end);
                if first >= last {
                    return None;
                }
                let y = top + layout.height(rows.start..first);
                let rect = Rect::from_xywh(left + cell.x, y, cell.width, layout.height(first..last));
                Some((cell, rect, first == cell.row, last == cell.row + cell.rows))
            })
            .collect();

        for (cell, rect, _, _) in segments.iter() {
            if let Some(background) = cell.background {
                canvas.draw_rect(*rect, Some(background), None);
            }
        }

        for (cell, rect, starts, ends) in segments.iter() {
            let sides = Border {
                top: cell.border.top && *starts,
                bottom: cell.border.bottom && *ends,
                ..cell.border
            };
            sides.draw(canvas, *rect, self.config.stroke);
        }

        for (cell, rect, starts, _) in segments.iter() {
            if !*starts {
                continue;
            }
            match &cell.content {
                Content::Text(flow) => {
                    let offset = valign_offset(cell.valign, rect.height(), flow.height);
                    flow.draw_at(canvas, rect.x1, rect.y1 + offset);
                }
                Content::Image {
                    path,
                    width,
                    height,
                } => {
                    let inner_width = cell.width - cell.padding.horizontal();
                    let slack = (inner_width - *width).max(Pt::ZERO);
                    let dx = match cell.align {
                        Align::Center => slack / 2.0,
                        Align::Right => slack,
                        Align::Left | Align::Justify => Pt::ZERO,
                    };
                    let dy = valign_offset(cell.valign, rect.height(), cell.height);
                    let image = Rect::from_xywh(
                        rect.x1 + cell.padding.left + dx,
                        rect.y1 + cell.padding.top + dy,
                        *width,
                        *height,
                    );
                    canvas.draw_image(path, image)?;
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Ready(Grid),
    Closed,
}

/// A grid table drawn row by row onto a [`Canvas`]
#[derive(Debug)]
pub struct Table<'s> {
    styles: &'s StyleRegistry,
    state: State,
}

impl<'s> Table<'s> {
    pub fn new(styles: &'s StyleRegistry) -> Table<'s> {
        Table {
            styles,
            state: State::Uninitialized,
        }
    }

    /// Set the column widths and table settings. Every column needs a
    /// positive width. Re-initializing starts a fresh table, dropping any rows
    /// still waiting on row spans.
    pub fn initialize<I, P>(&mut self, columns: I, config: TableConfig) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<Pt>,
    {
        let columns: Vec<Pt> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() || columns.iter().any(|width| *width <= Pt::ZERO) {
            return Err(Error::InvalidColumns);
        }
        if let State::Ready(grid) = &self.state {
            if !grid.pending.is_empty() {
                log::warn!(
                    "re-initializing a table with {} undrawn row(s)",
                    grid.pending.len()
                );
            }
        }

        log::debug!("initializing table with columns {columns:?}");
        self.state = State::Ready(Grid {
            header_occupancy: SpanOccupancy::new(columns.len()),
            occupancy: SpanOccupancy::new(columns.len()),
            columns,
            config,
            headers: Vec::new(),
            pending: Vec::new(),
            rows_added: 0,
            headers_drawn: false,
            fresh_page: false,
        });
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    fn grid_mut(&mut self) -> Result<&mut Grid> {
        match &mut self.state {
            State::Ready(grid) => Ok(grid),
            State::Uninitialized => Err(Error::NotInitialized),
            State::Closed => Err(Error::TableClosed),
        }
    }

    /// Register a header row, drawn above the first body row and again at the
    /// top of every following page. `None` adds an empty spacer row.
    pub fn add_header(&mut self, row: Option<Row>) -> Result<()> {
        let grid = self.grid_mut()?;
        let index = grid.headers.len();
        let (placed, occupancy) = place_row(&grid.header_occupancy, row.unwrap_or_default(), index)?;
        grid.header_occupancy = occupancy;
        grid.headers.push(placed);
        if grid.headers_drawn {
            log::debug!("header row {index} added after the table started, showing from the next page");
        }
        Ok(())
    }

    /// Add a body row. It is drawn right away unless a row span from this or
    /// an earlier row still reaches further down, in which case it waits for
    /// the rows that complete the span.
    pub fn add_row<C: Canvas + ?Sized>(&mut self, canvas: &mut C, row: Row) -> Result<()> {
        let styles = self.styles;
        let grid = self.grid_mut()?;
        let index = grid.rows_added;
        let (placed, occupancy) = place_row(&grid.occupancy, row, index)?;
        log::trace!(
            "row {index}: {} cell(s), {} column(s) held by spans",
            placed.cells.len(),
            placed.reserved
        );

        // measure before committing, so a cell that can't be laid out is
        // reported against its own row and leaves the buffered rows alone
        if !grid.headers_drawn {
            grid.layout_headers(styles, canvas)?;
        }
        grid.pending.push(placed);
        let complete = occupancy.is_clear();
        let rows = if complete {
            &grid.pending[..]
        } else {
            &grid.pending[grid.pending.len() - 1..]
        };
        let layout = match grid.layout_rows(styles, canvas, rows, &grid.config.cell) {
            Ok(layout) => layout,
            Err(err) => {
                grid.pending.pop();
                return Err(err);
            }
        };

        grid.occupancy = occupancy;
        grid.rows_added += 1;
        if complete {
            grid.pending.clear();
            grid.draw_group(styles, canvas, layout)?;
        }
        Ok(())
    }

    /// Finish the table, drawing anything still pending. No rows can be added
    /// afterwards.
    pub fn close<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> Result<()> {
        let styles = self.styles;
        let grid = self.grid_mut()?;

        let dangling = grid.occupancy.dangling();
        if let Some((column, remaining)) = dangling {
            if grid.config.strict_row_spans {
                log::warn!(
                    "discarding {} row(s): row span in column {column} is {remaining} row(s) short",
                    grid.pending.len()
                );
                self.state = State::Closed;
                return Err(Error::DanglingRowSpan { column, remaining });
            }
        }

        // on failure the table stays open with its rows
        let layout = if grid.pending.is_empty() {
            None
        } else {
            Some(grid.layout_rows(styles, canvas, &grid.pending, &grid.config.cell)?)
        };

        let mut grid = match std::mem::replace(&mut self.state, State::Closed) {
            State::Ready(grid) => grid,
            State::Uninitialized => return Err(Error::NotInitialized),
            State::Closed => return Err(Error::TableClosed),
        };
        if dangling.is_some() {
            log::debug!("cutting row spans short at the last row");
            grid.occupancy.clear();
        }
        grid.pending.clear();
        if let Some(layout) = layout {
            grid.draw_group(styles, canvas, layout)?;
        }
        if !grid.headers_drawn && !grid.headers.is_empty() {
            grid.begin(styles, canvas, Pt::ZERO)?;
        }
        Ok(())
    }
}
