// src/render.rs
//
// Rendering state machine. Consumes scanner events and keeps the table
// context as plain fields:
//
//   TopLevel --<table>--> InTable --<tr>--> InRow --<td>--> InCell
//   TopLevel <--</table>-- InTable <--</tr>-- InRow <--</td>-- InCell
//
// - <br> in any state appends "\n" and changes nothing else.
// - Text at top level is appended as is; text in a cell replaces the cell's
//   text (last run wins); any other text inside a table is dropped.
// - </tr> lays the row out and appends it with a trailing newline.
// - Every other tag, or a known tag in the wrong state, is ignored.
//
// Output is append-only: nothing already pushed is edited or removed.

use std::borrow::Cow;
use std::mem;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::layout::{layout_row, Align, Cell};
use crate::options::RenderOptions;
use crate::output::Fragments;
use crate::scanner::{Attribute, Event, Scanner};

/// Where the renderer is in the table structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    TopLevel,
    InTable,
    InRow,
    InCell,
}

/// Cell being filled between `<td>` and `</td>`.
#[derive(Debug)]
struct PendingCell {
    text: String,
    width_percent: u8,
    align: Align,
}

impl PendingCell {
    fn from_attrs(tag: &str, attrs: &[Attribute]) -> Result<PendingCell> {
        let width = attr(attrs, "width")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::MissingAttribute {
                tag: tag.to_string(),
                attribute: "width",
            })?;
        let width_percent = parse_percent(width).ok_or_else(|| Error::InvalidAttribute {
            tag: tag.to_string(),
            attribute: "width",
            value: width.to_string(),
        })?;

        let align = match attr(attrs, "align").filter(|v| !v.is_empty()) {
            Some(value) => Align::from_attr(value),
            None => Align::Left,
        };
        if let Align::Other(value) = &align {
            warn!("<{tag}> align=\"{value}\" is not left/center/right, laying out as left");
        }

        Ok(PendingCell {
            text: String::new(),
            width_percent,
            align,
        })
    }

    fn finish(self) -> Cell {
        Cell {
            text: self.text,
            width_percent: self.width_percent,
            align: self.align,
        }
    }
}

/// First value of attribute `key`, if present with a value.
fn attr<'t>(attrs: &'t [Attribute], key: &str) -> Option<&'t str> {
    attrs
        .iter()
        .find(|a| a.key == key)
        .and_then(|a| a.value.as_deref())
}

/// `"25%"` or `"25"` -> 25. Anything outside 0..=100 is rejected.
fn parse_percent(value: &str) -> Option<u8> {
    let digits = value.strip_suffix('%').unwrap_or(value).trim_end();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let pct = digits.parse::<u8>().ok()?;
    (pct <= 100).then_some(pct)
}

enum Context {
    TopLevel,
    InTable,
    InRow { row: Vec<Cell> },
    InCell { row: Vec<Cell>, pending: PendingCell },
}

pub struct Renderer<'o, 'a> {
    opts: &'o RenderOptions,
    context: Context,
    fragments: Fragments<'a>,
}

impl<'o, 'a> Renderer<'o, 'a> {
    pub fn new(opts: &'o RenderOptions) -> Self {
        Renderer {
            opts,
            context: Context::TopLevel,
            fragments: Fragments::new(),
        }
    }

    pub fn state(&self) -> State {
        state_of(&self.context)
    }

    pub fn fragments(&self) -> &Fragments<'a> {
        &self.fragments
    }

    pub fn handle(&mut self, event: Event<'a>) -> Result<()> {
        match event {
            Event::StartTag { name, attrs } => self.start_tag(&name, &attrs)?,
            Event::EndTag { name } => self.end_tag(&name),
            Event::Data(text) => self.data(text),
        }
        Ok(())
    }

    fn start_tag(&mut self, name: &str, attrs: &[Attribute]) -> Result<()> {
        let tags = &self.opts.tags;
        if name.eq_ignore_ascii_case(&tags.line_break) {
            self.fragments.push("\n");
            return Ok(());
        }

        let is_table = name.eq_ignore_ascii_case(&tags.table);
        let is_row = name.eq_ignore_ascii_case(&tags.row);
        let is_cell = name.eq_ignore_ascii_case(&tags.cell);

        // a bad cell must leave the open row untouched
        let pending = match self.context {
            Context::InRow { .. } if is_cell => Some(PendingCell::from_attrs(name, attrs)?),
            _ => None,
        };

        self.context = match (mem::replace(&mut self.context, Context::TopLevel), pending) {
            (Context::TopLevel, _) if is_table => Context::InTable,
            (Context::InTable, _) if is_row => Context::InRow { row: Vec::new() },
            (Context::InRow { row }, Some(pending)) => Context::InCell { row, pending },
            (other, _) => {
                debug!("ignoring <{name}> in {:?}", state_of(&other));
                other
            }
        };
        Ok(())
    }

    fn end_tag(&mut self, name: &str) {
        let tags = &self.opts.tags;
        let is_table = name.eq_ignore_ascii_case(&tags.table);
        let is_row = name.eq_ignore_ascii_case(&tags.row);
        let is_cell = name.eq_ignore_ascii_case(&tags.cell);

        self.context = match mem::replace(&mut self.context, Context::TopLevel) {
            Context::InCell { mut row, pending } if is_cell => {
                row.push(pending.finish());
                Context::InRow { row }
            }
            Context::InRow { row } if is_row => {
                let mut line = layout_row(&row, self.opts.max_line_width);
                line.push('\n');
                self.fragments.push(line);
                Context::InTable
            }
            Context::InTable if is_table => Context::TopLevel,
            other => {
                debug!("ignoring </{name}> in {:?}", state_of(&other));
                other
            }
        };
    }

    fn data(&mut self, text: Cow<'a, str>) {
        match &mut self.context {
            Context::TopLevel => self.fragments.push(text),
            Context::InCell { pending, .. } => pending.text = text.into_owned(),
            other => debug!("dropping text {:?} in {:?}", text, state_of(other)),
        }
    }

    /// End the document and hand back the output list. An unfinished row is
    /// dropped; rows already closed stay.
    pub fn finish(self) -> Fragments<'a> {
        match &self.context {
            Context::TopLevel => {}
            Context::InTable => warn!("document ended inside an open table"),
            Context::InRow { row } | Context::InCell { row, .. } => {
                warn!(
                    "document ended inside an open row, dropping {} finished cell(s)",
                    row.len()
                );
            }
        }
        self.fragments
    }
}

fn state_of(context: &Context) -> State {
    match context {
        Context::TopLevel => State::TopLevel,
        Context::InTable => State::InTable,
        Context::InRow { .. } => State::InRow,
        Context::InCell { .. } => State::InCell,
    }
}

/// Scan `src` and run every event through a fresh renderer.
pub fn render<'a>(src: &'a str, opts: &RenderOptions) -> Result<Fragments<'a>> {
    opts.validate()?;
    let mut renderer = Renderer::new(opts);
    for event in Scanner::new(src) {
        renderer.handle(event?)?;
    }
    Ok(renderer.finish())
}
