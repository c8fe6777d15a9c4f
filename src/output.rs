// src/output.rs
//
// Output fragment list and the text assembler that joins it.

use std::borrow::Cow;

/// Append-only list of output pieces: top-level text, newlines from line
/// breaks, and laid-out table rows.
#[derive(Debug, Default)]
pub struct Fragments<'a> {
    parts: Vec<Cow<'a, str>>,
}

impl<'a> Fragments<'a> {
    pub fn new() -> Self {
        Fragments { parts: Vec::new() }
    }

    pub fn push(&mut self, part: impl Into<Cow<'a, str>>) {
        self.parts.push(part.into());
    }

    pub fn as_slice(&self) -> &[Cow<'a, str>] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Join every fragment in order, with nothing in between.
    pub fn assemble(&self) -> String {
        let total = self.parts.iter().map(|p| p.len()).sum();
        let mut out = String::with_capacity(total);
        for part in &self.parts {
            out.push_str(part);
        }
        out
    }
}
