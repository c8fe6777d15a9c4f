// src/layout.rs
//
// Column layout: turns one finished table row into one fixed-width line.
//
// cell width = floor(width_percent * max_line_width / 100)
//
// Text is padded to the cell width according to its alignment. Text wider
// than its cell is emitted whole and unpadded. Cells are concatenated with no
// separator and the row is never wrapped. Widths are display columns.

use unicode_width::UnicodeWidthStr;

/// Horizontal alignment of a cell.
///
/// Values outside left/center/right are kept as written in `Other` and laid
/// out like `Left`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Other(String),
}

impl Align {
    pub fn from_attr(value: &str) -> Align {
        match value {
            "left" => Align::Left,
            "center" => Align::Center,
            "right" => Align::Right,
            _ => Align::Other(value.to_string()),
        }
    }
}

/// A finished table cell. Built when its closing tag is seen and consumed
/// when the owning row closes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// 0..=100
    pub width_percent: u8,
    pub align: Align,
}

/// Column count a cell of `width_percent` gets out of `max_line_width`.
pub fn cell_width(width_percent: u8, max_line_width: usize) -> usize {
    let pct = usize::from(width_percent);
    // split so the product never exceeds 100 * 99
    max_line_width / 100 * pct + max_line_width % 100 * pct / 100
}

/// Pad `text` to `width` columns. Center alignment puts the odd column of
/// padding on the right.
pub fn align_text(text: &str, width: usize, align: &Align) -> String {
    let used = text.width();
    if used >= width {
        return text.to_string();
    }
    let pad = width - used;
    let (left, right) = match align {
        Align::Right => (pad, 0),
        Align::Center => (pad / 2, pad - pad / 2),
        Align::Left | Align::Other(_) => (0, pad),
    };

    let mut out = String::with_capacity(text.len() + pad);
    out.extend(std::iter::repeat(' ').take(left));
    out.push_str(text);
    out.extend(std::iter::repeat(' ').take(right));
    out
}

/// Lay out a whole row as a single line (without trailing newline).
pub fn layout_row(cells: &[Cell], max_line_width: usize) -> String {
    let mut line = String::new();
    for cell in cells {
        let width = cell_width(cell.width_percent, max_line_width);
        line.push_str(&align_text(&cell.text, width, &cell.align));
    }
    line
}
