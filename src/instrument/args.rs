//! Rendering of call arguments into history entries.
//!
//! Inputs are recorded as the literal form of the positional argument tuple:
//! `('foo',)`, `(42,)`, `('a', 1)`, `()`. One-element tuples keep their
//! trailing comma so the arity is visible in the trace.

use crate::store::StoreValue;
use crate::store::value::float_text;
use std::fmt::Write;

/// Literal form of a single argument
pub trait ArgLiteral {
    fn literal(&self) -> String;
}

/// Rendering of a whole positional argument list
///
/// Implemented for tuples of up to three [`ArgLiteral`] values. Instrumented
/// operations use a tuple as their `Input` type.
pub trait CallArgs {
    fn render_args(&self) -> String;
}

fn quote_for(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double { '"' } else { '\'' }
}

/// Whether `c` can appear unescaped in a text literal
///
/// Space is the only printable separator. Control, format, surrogate,
/// private-use and unassigned code points are not printable.
fn is_printable(c: char) -> bool {
    if c.is_ascii() {
        return c == ' ' || c.is_ascii_graphic();
    }
    // `str::escape_debug` escapes grapheme extenders only in first position,
    // so after a leading letter it escapes exactly the non-printable set.
    let pair = format!("a{c}");
    pair.escape_debug().eq(pair.chars())
}

/// Quoted text literal with escapes for the quote, backslash and non-printable characters
///
/// Non-printable code points render as `\xNN`, `\uNNNN` or `\UNNNNNNNN`.
pub fn text_literal(text: &str) -> String {
    let quote = quote_for(text.contains('\''), text.contains('"'));
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => {
                let _ = match c as u32 {
                    code @ 0..=0xff => write!(out, "\\x{code:02x}"),
                    code @ 0x100..=0xffff => write!(out, "\\u{code:04x}"),
                    code => write!(out, "\\U{code:08x}"),
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// `b'..'` literal; bytes outside printable ASCII become `\xNN`
pub fn bytes_literal(bytes: &[u8]) -> String {
    let quote = quote_for(bytes.contains(&b'\''), bytes.contains(&b'"'));
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &byte in bytes {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b as char == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\x{byte:02x}");
            }
        }
    }
    out.push(quote);
    out
}

impl ArgLiteral for str {
    fn literal(&self) -> String {
        text_literal(self)
    }
}

impl ArgLiteral for String {
    fn literal(&self) -> String {
        text_literal(self)
    }
}

impl<T: ArgLiteral + ?Sized> ArgLiteral for &T {
    fn literal(&self) -> String {
        (**self).literal()
    }
}

impl ArgLiteral for f64 {
    fn literal(&self) -> String {
        float_text(*self)
    }
}

macro_rules! integer_literal {
    ($($ty:ty),*) => {
        $(
            impl ArgLiteral for $ty {
                fn literal(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_literal!(i32, i64, u32, u64, usize);

impl ArgLiteral for StoreValue {
    fn literal(&self) -> String {
        match self {
            StoreValue::Text(text) => text_literal(text),
            StoreValue::Bytes(bytes) => bytes_literal(bytes),
            StoreValue::Integer(value) => value.to_string(),
            StoreValue::Float(value) => float_text(*value),
        }
    }
}

impl CallArgs for () {
    fn render_args(&self) -> String {
        "()".to_string()
    }
}

impl<A: ArgLiteral> CallArgs for (A,) {
    fn render_args(&self) -> String {
        format!("({},)", self.0.literal())
    }
}

impl<A: ArgLiteral, B: ArgLiteral> CallArgs for (A, B) {
    fn render_args(&self) -> String {
        format!("({}, {})", self.0.literal(), self.1.literal())
    }
}

impl<A: ArgLiteral, B: ArgLiteral, C: ArgLiteral> CallArgs for (A, B, C) {
    fn render_args(&self) -> String {
        format!(
            "({}, {}, {})",
            self.0.literal(),
            self.1.literal(),
            self.2.literal()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_argument_tuples() {
        assert_eq!((StoreValue::from("foo"),).render_args(), "('foo',)");
        assert_eq!((StoreValue::from(42),).render_args(), "(42,)");
        assert_eq!((StoreValue::from(2.5),).render_args(), "(2.5,)");
        assert_eq!((StoreValue::from(1.0),).render_args(), "(1.0,)");
        assert_eq!(
            (StoreValue::from(b"bin".to_vec()),).render_args(),
            "(b'bin',)"
        );
    }

    #[test]
    fn test_multi_argument_tuples() {
        assert_eq!(().render_args(), "()");
        assert_eq!(("a", 1i64).render_args(), "('a', 1)");
        assert_eq!(("x", "y", 3u32).render_args(), "('x', 'y', 3)");
    }

    #[test]
    fn test_text_quoting() {
        assert_eq!(text_literal("plain"), "'plain'");
        assert_eq!(text_literal("it's"), "\"it's\"");
        assert_eq!(text_literal("both ' and \""), "'both \\' and \"'");
        assert_eq!(text_literal("a\\b"), "'a\\\\b'");
        assert_eq!(text_literal("line\nbreak"), "'line\\nbreak'");
        assert_eq!(text_literal("\u{1}"), "'\\x01'");
    }

    #[test]
    fn test_non_printable_escapes() {
        assert_eq!(text_literal("a\u{200b}b"), "'a\\u200bb'");
        assert_eq!(text_literal("\u{7f}\u{a0}"), "'\\x7f\\xa0'");
        assert_eq!(text_literal("\u{e000}"), "'\\ue000'");
        assert_eq!(text_literal("\u{10ffff}"), "'\\U0010ffff'");
    }

    #[test]
    fn test_printable_text_kept() {
        assert_eq!(text_literal("café"), "'café'");
        assert_eq!(text_literal("e\u{301}"), "'e\u{301}'");
        assert_eq!(text_literal("日本"), "'日本'");
        assert_eq!(text_literal("a b"), "'a b'");
    }

    #[test]
    fn test_float_arguments_use_signed_exponents() {
        assert_eq!((StoreValue::from(1e16),).render_args(), "(1e+16,)");
        assert_eq!((StoreValue::from(1e-5),).render_args(), "(1e-05,)");
        assert_eq!((0.5f64, 2e20f64).render_args(), "(0.5, 2e+20)");
    }

    #[test]
    fn test_bytes_escaping() {
        assert_eq!(bytes_literal(&[0x00, 0xff, b'a']), "b'\\x00\\xffa'");
        assert_eq!(bytes_literal(b"it's"), "b\"it's\"");
        assert_eq!(bytes_literal(b""), "b''");
    }
}
