//! Human-readable and debug renderings of values.
//!
//! The readable form is what a host shows to a user; the debug form is what the reader would
//! need to get the same tree back (quoted strings, annotated symbols, bracketed containers).

use std::fmt::{self, Write};

use crate::{
    future::Future,
    types::value::{Symbol, Value},
};

/// Print out a value, escaping strings and annotating symbols when `print_readably` is set
pub fn pr_str(value: &Value, print_readably: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_value(&mut out, value, print_readably);
    out
}

fn write_value(out: &mut impl Write, value: &Value, print_readably: bool) -> fmt::Result {
    match value {
        Value::Null => out.write_str("null"),
        Value::Boolean(b) => write!(out, "{b}"),
        Value::Number(n) => write!(out, "{n}"),
        Value::String(s) if print_readably => write_quoted(out, s),
        Value::String(s) => out.write_str(s),
        Value::Symbol(sym) if print_readably => write!(out, "{sym:?}"),
        Value::Symbol(sym) => out.write_str(&sym.name),
        // containers always show their elements readably
        Value::Array(items) => write_seq(out, "[", items.iter(), "]"),
        Value::Expr(items) => write_seq(out, "(", items.iter(), ")"),
        Value::Map(entries) => {
            out.write_char('{')?;
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.write_char(' ')?;
                }
                write_quoted(out, key)?;
                out.write_char(':')?;
                write_value(out, item, true)?;
            }
            out.write_char('}')
        }
        Value::Operator(op) => out.write_str(op),
        Value::Func(func) => write!(out, "{func:?}"),
        Value::Future(future) => write!(out, "{future:?}"),
    }
}

fn write_seq<'v>(
    out: &mut impl Write,
    open: &str,
    items: impl Iterator<Item = &'v Value>,
    close: &str,
) -> fmt::Result {
    out.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.write_char(' ')?;
        }
        write_value(out, item, true)?;
    }
    out.write_str(close)
}

/// Double-quoted, with the escapes the reader understands
fn write_quoted(out: &mut impl Write, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            c if c.is_control() => write!(out, "\\u{:04x}", u32::from(c))?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, false)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, true)
    }
}

/// `name<row,col;offset>`, or `name<?>` when the position is unknown
impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(pos) => write!(f, "{}{}", self.name, pos),
            None => write!(f, "{}<?>", self.name),
        }
    }
}

impl fmt::Debug for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("???")
    }
}
