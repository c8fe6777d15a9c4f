// src/options.rs
//
// Per-call render configuration. Nothing here is global; callers build a
// `RenderOptions` and pass it down.

use crate::error::{Error, Result};

/// Line width that 100% maps to when nothing else is configured.
pub const DEFAULT_MAX_LINE_WIDTH: usize = 50;

/// Widest line a render may ask for. Every row is padded out in memory, so
/// this bounds the allocation per line.
pub const MAX_LINE_WIDTH: usize = 10_000;

/// Tag names the renderer gives structural meaning to.
///
/// Names are matched ASCII-case-insensitively against scanned tags, which are
/// already lower-cased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagNames {
    pub table: String,
    pub row: String,
    pub cell: String,
    pub line_break: String,
}

impl Default for TagNames {
    fn default() -> Self {
        TagNames {
            table: "table".to_string(),
            row: "tr".to_string(),
            cell: "td".to_string(),
            line_break: "br".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Character columns a `width="100%"` cell occupies.
    pub max_line_width: usize,
    pub tags: TagNames,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            max_line_width: DEFAULT_MAX_LINE_WIDTH,
            tags: TagNames::default(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_line_width(mut self, width: usize) -> Self {
        self.max_line_width = width;
        self
    }

    pub fn tags(mut self, tags: TagNames) -> Self {
        self.tags = tags;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_line_width == 0 {
            return Err(Error::InvalidOption {
                name: "max_line_width",
                reason: "must be a positive number of characters",
            });
        }
        if self.max_line_width > MAX_LINE_WIDTH {
            return Err(Error::InvalidOption {
                name: "max_line_width",
                reason: "must not exceed 10000 characters",
            });
        }
        let tags = &self.tags;
        if [&tags.table, &tags.row, &tags.cell, &tags.line_break]
            .iter()
            .any(|name| name.is_empty())
        {
            return Err(Error::InvalidOption {
                name: "tags",
                reason: "tag names must not be empty",
            });
        }
        Ok(())
    }
}
