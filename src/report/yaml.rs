//! Fixed-precision YAML writer

use std::io;

use serde_norway::{Mapping, Value};

use super::ReportError;

const INDENT: usize = 2;

/// Write `value` as block YAML, floats with exactly three decimals.
pub(super) fn write(out: &mut impl io::Write, value: &Value) -> Result<(), ReportError> {
    match value {
        Value::Mapping(mapping) => write_mapping(out, mapping, 0),
        other => Ok(writeln!(out, "{}", scalar(other)?)?),
    }
}

fn write_mapping(
    out: &mut impl io::Write,
    mapping: &Mapping,
    indent: usize,
) -> Result<(), ReportError> {
    for (key, value) in mapping {
        write!(out, "{:indent$}{}:", "", scalar(key)?)?;

        match value {
            Value::Mapping(nested) if nested.is_empty() => writeln!(out, " {{}}")?,
            Value::Mapping(nested) => {
                writeln!(out)?;
                write_mapping(out, nested, indent + INDENT)?;
            }
            other => writeln!(out, " {}", scalar(other)?)?,
        }
    }

    Ok(())
}

fn scalar(value: &Value) -> Result<String, ReportError> {
    Ok(match value {
        Value::Number(number) if number.is_f64() => {
            format!("{:.3}", number.as_f64().unwrap_or_default())
        }
        Value::Number(number) => number.to_string(),
        other => serde_norway::to_string(other)?.trim_end().to_string(),
    })
}
