//! JSON text in the layout Python's `json.dumps` produces
//!
//! Separators are `", "` and `": "`, every character outside printable ASCII is
//! written as a `\uXXXX` escape and floats use Python's `repr` spelling.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io;

use crate::raster::format_float;

/// Formatter emitting `json.dumps` default output
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_f32<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f32) -> io::Result<()> {
        self.write_f64(writer, value as f64)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if (' '..='~').contains(&c) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize a value to a `json.dumps`-compatible string
pub fn to_python_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PythonFormatter);
    value.serialize(&mut serializer)?;
    // Only ASCII is ever written
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_separators_and_floats() {
        let doc = json!({ "a": [1.0, 2.5, null], "b": 3 });
        assert_eq!(to_python_json(&doc).unwrap(), r#"{"a": [1.0, 2.5, null], "b": 3}"#);
        assert_eq!(to_python_json(&json!(1e16)).unwrap(), "1e+16");
        assert_eq!(to_python_json(&json!(0.00001)).unwrap(), "1e-05");
    }

    #[test]
    fn test_non_ascii_escapes() {
        assert_eq!(to_python_json("Zürich").unwrap(), r#""Z\u00fcrich""#);
        assert_eq!(to_python_json("tab\there").unwrap(), r#""tab\there""#);
        assert_eq!(to_python_json("del\u{7f}").unwrap(), r#""del\u007f""#);
        assert_eq!(to_python_json("🌍").unwrap(), r#""\ud83c\udf0d""#);
        assert_eq!(to_python_json("say \"hi\"").unwrap(), r#""say \"hi\"""#);
    }
}
