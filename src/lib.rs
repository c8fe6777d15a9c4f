//! pennybook - personal finance ledger with a fixed-width text renderer.
//!
//! The renderer turns a small HTML dialect into plain text suitable for
//! receipts and terminal reports:
//!
//! - `<br>` becomes a newline,
//! - `<table>`/`<tr>`/`<td width="N%" align="...">` become fixed-width lines,
//!   where `N%` of [`RenderOptions::max_line_width`] is the cell's width,
//! - every other tag is dropped, its text kept according to where it sits.
//!
//! ```
//! use pennybook::{html_to_text, RenderOptions};
//!
//! let opts = RenderOptions::new().max_line_width(10);
//! let text = html_to_text(
//!     r#"<table><tr><td width="50%">A</td><td width="50%" align="right">B</td></tr></table>"#,
//!     &opts,
//! )
//! .unwrap();
//! assert_eq!(text, "A        B\n");
//! ```
//!
//! The [`ledger`] module holds the account/category/transaction store, and
//! [`report`] builds renderer markup out of ledger reads.

pub mod error;
pub mod layout;
pub mod ledger;
pub mod options;
pub mod output;
pub mod render;
pub mod report;
pub mod scanner;

pub use error::{Error, Result};
pub use options::{RenderOptions, TagNames};

/// Render markup to fixed-width plain text.
///
/// Fails without partial output on malformed markup, on a `<td>` without a
/// usable `width`, or on invalid options.
pub fn html_to_text(src: &str, opts: &RenderOptions) -> Result<String> {
    render::render(src, opts).map(|fragments| fragments.assemble())
}

/// Like [`html_to_text`] for raw bytes. Input that is not UTF-8 is rejected
/// before anything is scanned.
pub fn bytes_to_text(src: &[u8], opts: &RenderOptions) -> Result<String> {
    let src = std::str::from_utf8(src)?;
    html_to_text(src, opts)
}
