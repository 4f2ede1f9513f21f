//! JSON text output.
//!
//! Floats always carry a fractional part so they read back as floats;
//! non-finite floats, which JSON cannot express, are written as `null`.

use std::collections::btree_map;
use std::fmt::{self, Write};
use std::mem;
use std::slice;

use super::{Element, Value};

impl Element {
    /// Compact JSON text.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = write_element(&mut out, self, None);
        out
    }

    /// JSON text with one member per line, each nesting level prefixed by
    /// one more copy of `indent` (`"\t"`, `"  "` and so on).
    pub fn pretty_serialize(&self, indent: &str) -> String {
        let mut out = String::new();
        let _ = write_element(&mut out, self, Some(indent));
        out
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_element(f, self, None)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self)
    }
}

/// Children of an open container still to be written.
enum Members<'a> {
    Array(slice::Iter<'a, Element>),
    Object(btree_map::Iter<'a, String, Element>),
}

impl<'a> Members<'a> {
    fn next(&mut self) -> Option<(Option<&'a str>, &'a Element)> {
        match self {
            Members::Array(items) => items.next().map(|item| (None, item)),
            Members::Object(entries) => entries
                .next()
                .map(|(key, value)| (Some(key.as_str()), value)),
        }
    }

    fn closer(&self) -> char {
        match self {
            Members::Array(_) => ']',
            Members::Object(_) => '}',
        }
    }
}

struct Level<'a> {
    members: Members<'a>,
    first: bool,
}

fn write_element<W: Write>(out: &mut W, root: &Element, indent: Option<&str>) -> fmt::Result {
    let mut open: Vec<Level<'_>> = Vec::new();
    let mut next = Some(root);
    loop {
        if let Some(element) = next.take() {
            let members = match element {
                Element::Value(v) => {
                    write_value(out, v)?;
                    None
                }
                Element::Array(a) if a.is_empty() => {
                    out.write_str("[]")?;
                    None
                }
                Element::Object(o) if o.is_empty() => {
                    out.write_str("{}")?;
                    None
                }
                Element::Array(a) => {
                    out.write_char('[')?;
                    Some(Members::Array(a.iter()))
                }
                Element::Object(o) => {
                    out.write_char('{')?;
                    Some(Members::Object(o.iter()))
                }
            };
            if let Some(members) = members {
                open.push(Level {
                    members,
                    first: true,
                });
            }
        }

        let depth = open.len();
        let Some(level) = open.last_mut() else {
            return Ok(());
        };
        match level.members.next() {
            Some((key, child)) => {
                if !mem::replace(&mut level.first, false) {
                    out.write_char(',')?;
                }
                newline(out, indent, depth)?;
                if let Some(key) = key {
                    write_string(out, key)?;
                    out.write_str(if indent.is_some() { ": " } else { ":" })?;
                }
                next = Some(child);
            }
            None => {
                let closer = level.members.closer();
                open.pop();
                newline(out, indent, depth - 1)?;
                out.write_char(closer)?;
            }
        }
    }
}

fn newline<W: Write>(out: &mut W, indent: Option<&str>, depth: usize) -> fmt::Result {
    if let Some(unit) = indent {
        out.write_char('\n')?;
        for _ in 0..depth {
            out.write_str(unit)?;
        }
    }
    Ok(())
}

fn write_value<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Null => out.write_str("null"),
        Value::Bool(b) => write!(out, "{b}"),
        Value::Int(i) => write!(out, "{i}"),
        Value::Float(f) if !f.is_finite() => out.write_str("null"),
        Value::Float(f) => {
            let text = f.to_string();
            out.write_str(&text)?;
            if !text.contains('.') {
                out.write_str(".0")?;
            }
            Ok(())
        }
        Value::Str(s) => write_string(out, s),
    }
}

fn write_string<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\u{08}' => out.write_str("\\b")?,
            '\u{0c}' => out.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

#[cfg(test)]
mod tests {
    use crate::model::{Array, NodePools};
    use arbor_core::alloc::StrategyKind;

    fn sample(pools: &NodePools) -> crate::Element {
        let mut root = pools.object();
        let obj = root.as_object_mut().unwrap();
        obj.insert_value(pools, "s", "a\"b\\c\n\u{1}");
        obj.insert_value(pools, "f", 2.0f32);
        obj.insert_value(pools, "g", 0.5f32);
        obj.insert_value(pools, "n", ());
        let list: Array = [pools.value(1), pools.value(false), pools.array()]
            .into_iter()
            .collect();
        obj.insert("list", pools.array_from(list));
        obj.insert("empty", pools.object());
        root
    }

    #[test]
    fn compact_output() {
        let pools = NodePools::new(StrategyKind::Direct).unwrap();
        assert_eq!(
            sample(&pools).serialize(),
            r#"{"empty":{},"f":2.0,"g":0.5,"list":[1,false,[]],"n":null,"s":"a\"b\\c\n\u0001"}"#
        );
    }

    #[test]
    fn display_matches_compact() {
        let pools = NodePools::new(StrategyKind::Direct).unwrap();
        let root = sample(&pools);
        assert_eq!(root.to_string(), root.serialize());
        assert_eq!(pools.value(f32::NAN).serialize(), "null");
    }

    #[test]
    fn pretty_output() {
        let pools = NodePools::new(StrategyKind::Direct).unwrap();
        let mut root = pools.object();
        let obj = root.as_object_mut().unwrap();
        obj.insert_value(&pools, "a", 1);
        let list: Array = [pools.value(true), pools.object()].into_iter().collect();
        obj.insert("b", pools.array_from(list));
        assert_eq!(
            root.pretty_serialize("  "),
            "{\n  \"a\": 1,\n  \"b\": [\n    true,\n    {}\n  ]\n}"
        );
    }

    #[test]
    fn pretty_output_with_tabs() {
        let pools = NodePools::new(StrategyKind::Direct).unwrap();
        let mut root = pools.array();
        let mut inner = pools.object();
        inner.as_object_mut().unwrap().insert_value(&pools, "k", "v");
        root.as_array_mut().unwrap().push(inner);
        root.as_array_mut().unwrap().push_value(&pools, 3);
        assert_eq!(
            root.pretty_serialize("\t"),
            "[\n\t{\n\t\t\"k\": \"v\"\n\t},\n\t3\n]"
        );
        assert_eq!(pools.value(7).pretty_serialize("\t"), "7");
    }

    #[test]
    fn deep_tree_serializes_iteratively() {
        const DEPTH: usize = 100_000;
        let pools = NodePools::new(StrategyKind::FreeList).unwrap();
        let mut root = pools.object();
        root.as_object_mut().unwrap().insert_value(&pools, "leaf", 1);
        for _ in 0..DEPTH {
            let mut outer = pools.array();
            outer.as_array_mut().unwrap().push(root);
            root = outer;
        }

        let text = root.serialize();
        let expected = format!("{}{{\"leaf\":1}}{}", "[".repeat(DEPTH), "]".repeat(DEPTH));
        assert_eq!(text, expected);
        assert_eq!(root.to_string().len(), expected.len());
    }
}
