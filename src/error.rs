use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum Error {
    /// A style name was looked up that was never registered
    #[error("unknown style `{name}`")]
    UnknownStyle { name: String },

    /// Registering the style would make its parent chain loop back onto itself
    #[error("style `{name}` inherits from itself")]
    StyleCycle { name: String },

    /// A markup or cell attribute could not be interpreted. Rich text rendering
    /// recovers from these by using the attribute's default
    #[error("invalid value `{value}` for attribute `{attribute}` on `<{tag}>`")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        value: String,
    },

    /// A table cell was placed on a column already taken in the same row, either
    /// by another cell or by a row span carried over from a previous row
    #[error("cell in row {row} overlaps column {column}")]
    CellOverlap { row: usize, column: usize },

    /// A table cell's column span runs past the last column of the table
    #[error("cell in row {row} at column {column} spans {colspan} columns, but the table only has {columns}")]
    ColumnOverflow {
        row: usize,
        column: usize,
        colspan: usize,
        columns: usize,
    },

    /// The table must be initialized with its column widths first
    #[error("table has not been initialized")]
    NotInitialized,

    /// No rows can be added to a table once it is closed
    #[error("table is already closed")]
    TableClosed,

    /// The table was closed while a cell still claimed rows below the last one
    #[error("row span in column {column} still needs {remaining} more row(s) at close")]
    DanglingRowSpan { column: usize, remaining: usize },

    /// Tables need at least one column, and every column a positive width
    #[error("table columns must be non-empty with positive widths")]
    InvalidColumns,

    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [image] failed to parse the image
    Image(#[from] image::ImageError),
}

/// Shorthand for results carrying the crate's [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;
