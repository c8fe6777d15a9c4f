// src/scanner.rs
//
// Markup scanner: one forward pass over the document, yielding start-tag,
// end-tag and text events. It does not know what any tag means.
//
// - Tag and attribute names are lower-cased.
// - The '>' search is quote-aware, so `title="a>b"` stays inside the tag.
// - `<x/>` yields StartTag(x) followed by EndTag(x).
// - Comments, <!declarations> and <?instructions?> yield nothing.
// - A '<' that cannot start markup (not followed by a letter, '/', '!' or '?')
//   is literal text.
// - Character references are decoded in text and attribute values; unknown
//   references are kept as written.
// - One Data event per maximal text run.
// - Unterminated markup is an error and ends the scan.

use std::borrow::Cow;

use log::trace;
use memchr::{memchr, memmem};

use crate::error::{Error, Result};

/// One attribute of a start tag, in source order. `value` is `None` for bare
/// attributes such as `<td nowrap>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    StartTag {
        name: Cow<'a, str>,
        attrs: Vec<Attribute>,
    },
    EndTag {
        name: Cow<'a, str>,
    },
    Data(Cow<'a, str>),
}

/// Iterator of [`Event`]s over a borrowed document.
///
/// After the first error the iterator is exhausted.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    pending_end: Option<Cow<'a, str>>,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Scanner {
            src,
            pos: 0,
            pending_end: None,
            done: false,
        }
    }

    fn fail(&mut self, offset: usize, reason: &'static str) -> Option<Result<Event<'a>>> {
        self.done = true;
        Some(Err(Error::MalformedMarkup { offset, reason }))
    }

    fn scan(&mut self) -> Option<Result<Event<'a>>> {
        let src = self.src;
        let s = src.as_bytes();
        let n = s.len();

        while self.pos < n {
            let i = self.pos;

            if !is_markup_start(s, i) {
                let end = next_markup_start(s, i + 1);
                self.pos = end;
                return Some(Ok(Event::Data(decode_entities(&src[i..end]))));
            }

            // Comments
            if s[i..].starts_with(b"<!--") {
                let Some(dash) = find_comment_end(s, i) else {
                    return self.fail(i, "unterminated comment");
                };
                self.pos = dash + 3;
                continue;
            }

            // Declarations and processing instructions
            if s[i + 1] == b'!' || s[i + 1] == b'?' {
                let Some(gt) = memchr(b'>', &s[i..]).map(|off| i + off) else {
                    return self.fail(i, "unterminated declaration");
                };
                self.pos = gt + 1;
                continue;
            }

            // Tags
            let Some(j) = find_tag_end(s, i) else {
                return self.fail(i, "unterminated tag");
            };
            self.pos = j + 1;
            let tag = &src[i..=j];
            let ti = parse_tag_info(tag);

            if ti.name_end == ti.name_start {
                // `</>` and friends carry nothing to report.
                continue;
            }
            let name = lowercase(&tag[ti.name_start..ti.name_end]);

            if ti.is_end {
                return Some(Ok(Event::EndTag { name }));
            }

            let attrs = parse_attributes(&tag[ti.name_end..]);
            if ti.self_closing {
                self.pending_end = Some(name.clone());
            }
            return Some(Ok(Event::StartTag { name, attrs }));
        }

        None
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Event<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.pending_end.take() {
            trace!("scan: </{name}> (self-closing)");
            return Some(Ok(Event::EndTag { name }));
        }
        if self.done {
            return None;
        }
        let event = self.scan();
        match &event {
            Some(Ok(ev)) => trace!("scan: {ev:?}"),
            Some(Err(_)) => {}
            None => self.done = true,
        }
        event
    }
}

/* ============================ Utility predicates ========================= */

#[inline]
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

#[inline]
fn is_attr_name_char(b: u8) -> bool {
    !is_ws(b) && !matches!(b, b'/' | b'>' | b'=' | b'"' | b'\'')
}

#[inline]
fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == b'\x0c'
}

fn is_markup_start(s: &[u8], i: usize) -> bool {
    s[i] == b'<'
        && i + 1 < s.len()
        && (s[i + 1].is_ascii_alphabetic() || matches!(s[i + 1], b'/' | b'!' | b'?'))
}

fn next_markup_start(s: &[u8], mut from: usize) -> usize {
    while let Some(off) = s.get(from..).and_then(|rest| memchr(b'<', rest)) {
        let at = from + off;
        if is_markup_start(s, at) {
            return at;
        }
        from = at + 1;
    }
    s.len()
}

fn lowercase(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/* =============================== Tag parsing ============================= */

#[derive(Clone, Copy, Debug)]
struct TagInfo {
    name_start: usize,
    name_end: usize,
    is_end: bool,
    self_closing: bool,
}

/// Find the '>' for a tag starting at `i` (s[i] == '<'), being quote-aware.
fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Index of the first '-' of the "-->" closing a comment that opens at `i`.
fn find_comment_end(s: &[u8], i: usize) -> Option<usize> {
    memmem::find(&s[i + 4..], b"-->").map(|off| i + 4 + off)
}

/// Locate the tag name and end/self-closing flags in raw `<...>` text.
fn parse_tag_info(tag: &str) -> TagInfo {
    let t = tag.as_bytes();
    let n = t.len();
    let mut i = 1;

    let mut is_end = false;
    if i < n && t[i] == b'/' {
        is_end = true;
        i += 1;
    }
    while i < n && is_ws(t[i]) {
        i += 1;
    }
    let name_start = i;
    while i < n && is_name_char(t[i]) {
        i += 1;
    }
    let name_end = i;

    // self-closing? check before '>'
    let mut j = n - 1;
    while j > name_end && is_ws(t[j - 1]) {
        j -= 1;
    }
    let self_closing = !is_end && j > name_end && t[j - 1] == b'/';

    TagInfo {
        name_start,
        name_end,
        is_end,
        self_closing,
    }
}

/// Collect `name ( '=' value )?` pairs from the part of a start tag after its
/// name. Values may be double-quoted, single-quoted or unquoted.
fn parse_attributes(rest: &str) -> Vec<Attribute> {
    let t = rest.as_bytes();
    let len = t.len();
    let mut attrs = Vec::new();
    let mut i = 0usize;

    while i < len && t[i] != b'>' {
        // skip whitespace and slashes
        while i < len && (is_ws(t[i]) || t[i] == b'/') {
            i += 1;
        }
        if i >= len || t[i] == b'>' {
            break;
        }

        if !is_attr_name_char(t[i]) {
            // Stray quote or '='; step over it so the loop always advances.
            i += 1;
            continue;
        }
        let name_start = i;
        while i < len && is_attr_name_char(t[i]) {
            i += 1;
        }
        let key = rest[name_start..i].to_ascii_lowercase();

        while i < len && is_ws(t[i]) {
            i += 1;
        }

        let mut value = None;
        if i < len && t[i] == b'=' {
            i += 1;
            while i < len && is_ws(t[i]) {
                i += 1;
            }
            if i < len && (t[i] == b'"' || t[i] == b'\'') {
                let q = t[i];
                i += 1;
                let start = i;
                while i < len && t[i] != q {
                    i += 1;
                }
                value = Some(decode_entities(&rest[start..i]).into_owned());
                if i < len {
                    i += 1;
                }
            } else {
                let start = i;
                while i < len && !is_ws(t[i]) && t[i] != b'>' {
                    i += 1;
                }
                value = Some(decode_entities(&rest[start..i]).into_owned());
            }
        }

        attrs.push(Attribute { key, value });
    }

    attrs
}

/* ========================= Character references ========================= */

/// Replace `&name;`, `&#N;` and `&#xH;` references. Borrows when there is
/// nothing to decode.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..first]);
    let mut i = first;
    while i < bytes.len() {
        match decode_reference(&text[i..]) {
            Some((ch, len)) => {
                out.push(ch);
                i += len;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
        match memchr(b'&', &bytes[i..]) {
            Some(off) => {
                out.push_str(&text[i..i + off]);
                i += off;
            }
            None => {
                out.push_str(&text[i..]);
                break;
            }
        }
    }
    Cow::Owned(out)
}

/// Decode one reference at the start of `s` (which begins with '&').
/// Returns the character and the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let window = &s.as_bytes()[..s.len().min(12)];
    let semi = memchr(b';', window)?;
    let body = &s[1..semi];

    let ch = if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()?
        } else if num.bytes().all(|b| b.is_ascii_digit()) {
            num.parse::<u32>().ok()?
        } else {
            return None;
        };
        char::from_u32(code)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            _ => return None,
        }
    };
    Some((ch, semi + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(src: &str) -> Vec<Event<'_>> {
        Scanner::new(src).collect::<Result<Vec<_>>>().unwrap()
    }

    fn start<'a>(name: &'a str, attrs: &[(&str, Option<&str>)]) -> Event<'a> {
        Event::StartTag {
            name: Cow::Borrowed(name),
            attrs: attrs
                .iter()
                .map(|(k, v)| Attribute {
                    key: k.to_string(),
                    value: v.map(str::to_string),
                })
                .collect(),
        }
    }

    fn end(name: &str) -> Event<'_> {
        Event::EndTag {
            name: Cow::Borrowed(name),
        }
    }

    fn data(text: &str) -> Event<'_> {
        Event::Data(Cow::Borrowed(text))
    }

    #[test]
    fn text_and_tags_in_order() {
        assert_eq!(
            events("a<b>c</b>d"),
            vec![data("a"), start("b", &[]), data("c"), end("b"), data("d")]
        );
    }

    #[test]
    fn attributes_keep_order_and_quoting() {
        assert_eq!(
            events(r#"<td width="25%" align='right' nowrap data-x=1>"#),
            vec![start(
                "td",
                &[
                    ("width", Some("25%")),
                    ("align", Some("right")),
                    ("nowrap", None),
                    ("data-x", Some("1")),
                ]
            )]
        );
    }

    #[test]
    fn names_are_lowercased() {
        assert_eq!(
            events(r#"<TD WIDTH="10%"></TD>"#),
            vec![start("td", &[("width", Some("10%"))]), end("td")]
        );
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        assert_eq!(
            events(r#"<td title="a>b">x"#),
            vec![start("td", &[("title", Some("a>b"))]), data("x")]
        );
    }

    #[test]
    fn self_closing_emits_start_and_end() {
        assert_eq!(
            events("a<br/>b<br />c"),
            vec![
                data("a"),
                start("br", &[]),
                end("br"),
                data("b"),
                start("br", &[]),
                end("br"),
                data("c"),
            ]
        );
    }

    #[test]
    fn comments_and_declarations_are_skipped() {
        assert_eq!(
            events("<!DOCTYPE html>a<!-- <td> -->b<?xml x?>c"),
            vec![data("a"), data("b"), data("c")]
        );
    }

    #[test]
    fn lone_lt_is_text() {
        assert_eq!(events("1 < 2 <"), vec![data("1 < 2 <")]);
    }

    #[test]
    fn entities_are_decoded_in_text_and_values() {
        assert_eq!(
            events(r#"<td title="&quot;x&quot;">Tom &amp; Jerry &#65;&#x42; &bogus;"#),
            vec![
                start("td", &[("title", Some("\"x\""))]),
                Event::Data(Cow::Owned("Tom & Jerry AB &bogus;".to_string())),
            ]
        );
    }

    #[test]
    fn unterminated_tag_is_malformed() {
        let result: Result<Vec<_>> = Scanner::new("ok <td width=\"5%\"").collect();
        match result {
            Err(Error::MalformedMarkup { offset, .. }) => assert_eq!(offset, 3),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unterminated_comment_is_malformed() {
        let result: Result<Vec<_>> = Scanner::new("<!-- open").collect();
        assert!(matches!(result, Err(Error::MalformedMarkup { .. })));
    }

    #[test]
    fn scanner_stops_after_error() {
        let mut scanner = Scanner::new("<td");
        assert!(matches!(scanner.next(), Some(Err(_))));
        assert!(scanner.next().is_none());
    }
}
