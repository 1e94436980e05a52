//! Primitive conversion from request text.
//!
//! # Responsibilities
//! - Parse a textual value into one of a fixed set of primitive kinds
//! - Re-render a parsed value as its canonical text
//!
//! # Design Decisions
//! - Every kind uses the parse rule matching its own signedness and width
//! - Numeric kinds ignore surrounding whitespace; text is taken verbatim
//! - Date/time is locale-independent (ISO 8601 without offset)

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_RENDER: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// The primitive kinds an action parameter can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Text,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    DateTime,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Text => "text",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// A converted primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Value::Text(_) => PrimitiveKind::Text,
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Char(_) => PrimitiveKind::Char,
            Value::I8(_) => PrimitiveKind::I8,
            Value::I16(_) => PrimitiveKind::I16,
            Value::I32(_) => PrimitiveKind::I32,
            Value::I64(_) => PrimitiveKind::I64,
            Value::U8(_) => PrimitiveKind::U8,
            Value::U16(_) => PrimitiveKind::U16,
            Value::U32(_) => PrimitiveKind::U32,
            Value::U64(_) => PrimitiveKind::U64,
            Value::F32(_) => PrimitiveKind::F32,
            Value::F64(_) => PrimitiveKind::F64,
            Value::Decimal(_) => PrimitiveKind::Decimal,
            Value::DateTime(_) => PrimitiveKind::DateTime,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.format(DATETIME_RENDER)),
        }
    }
}

/// Text that does not parse as the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert \"{value}\" to {kind}")]
pub struct ConvertError {
    pub kind: PrimitiveKind,
    pub value: String,
}

/// Convert `text` into a value of the given kind.
pub fn convert(text: &str, kind: PrimitiveKind) -> Result<Value, ConvertError> {
    let invalid = || ConvertError {
        kind,
        value: text.to_string(),
    };
    let trimmed = text.trim();

    let value = match kind {
        PrimitiveKind::Text => Value::Text(text.to_string()),
        PrimitiveKind::Bool => Value::Bool(parse_bool(trimmed).ok_or_else(invalid)?),
        PrimitiveKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return Err(invalid()),
            }
        }
        PrimitiveKind::I8 => Value::I8(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::I16 => Value::I16(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::I32 => Value::I32(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::I64 => Value::I64(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::U8 => Value::U8(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::U16 => Value::U16(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::U32 => Value::U32(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::U64 => Value::U64(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::F32 => Value::F32(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::F64 => Value::F64(trimmed.parse().map_err(|_| invalid())?),
        PrimitiveKind::Decimal => Value::Decimal(Decimal::from_str(trimmed).map_err(|_| invalid())?),
        PrimitiveKind::DateTime => Value::DateTime(parse_datetime(trimmed).ok_or_else(invalid)?),
    };

    Ok(value)
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// A Rust type that binds from a single primitive value.
pub trait Primitive: Sized {
    const KIND: PrimitiveKind;

    /// Extract `Self` from a value of the matching kind.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$kind(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

primitive! {
    String => Text,
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    NaiveDateTime => DateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str, kind: PrimitiveKind) -> String {
        convert(text, kind).unwrap().to_string()
    }

    #[test]
    fn test_round_trip_canonical_text() {
        assert_eq!(round_trip("true", PrimitiveKind::Bool), "true");
        assert_eq!(round_trip("false", PrimitiveKind::Bool), "false");
        assert_eq!(round_trip("42", PrimitiveKind::I32), "42");
        assert_eq!(round_trip("-7", PrimitiveKind::I64), "-7");
        assert_eq!(round_trip("255", PrimitiveKind::U8), "255");
        assert_eq!(round_trip("hello world", PrimitiveKind::Text), "hello world");
        assert_eq!(round_trip("x", PrimitiveKind::Char), "x");
        assert_eq!(round_trip("1.5", PrimitiveKind::F64), "1.5");
        assert_eq!(round_trip("19.90", PrimitiveKind::Decimal), "19.90");
        assert_eq!(round_trip("2024-03-01T10:15:30", PrimitiveKind::DateTime), "2024-03-01T10:15:30");
    }

    #[test]
    fn test_signed_i32_accepts_negative() {
        assert_eq!(convert("-5", PrimitiveKind::I32).unwrap(), Value::I32(-5));
        assert_eq!(convert("2147483647", PrimitiveKind::I32).unwrap(), Value::I32(i32::MAX));
        assert!(convert("4294967295", PrimitiveKind::I32).is_err());
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        let err = convert("-1", PrimitiveKind::U32).unwrap_err();
        assert_eq!(err.kind, PrimitiveKind::U32);
        assert_eq!(err.value, "-1");
        assert!(convert("256", PrimitiveKind::U8).is_err());
    }

    #[test]
    fn test_bool_is_case_insensitive() {
        assert_eq!(convert("TRUE", PrimitiveKind::Bool).unwrap(), Value::Bool(true));
        assert_eq!(convert(" False ", PrimitiveKind::Bool).unwrap(), Value::Bool(false));
        assert!(convert("yes", PrimitiveKind::Bool).is_err());
        assert!(convert("1", PrimitiveKind::Bool).is_err());
    }

    #[test]
    fn test_char_requires_single_character() {
        assert!(convert("", PrimitiveKind::Char).is_err());
        assert!(convert("ab", PrimitiveKind::Char).is_err());
        assert_eq!(convert("é", PrimitiveKind::Char).unwrap(), Value::Char('é'));
    }

    #[test]
    fn test_numeric_whitespace_is_trimmed_text_is_not() {
        assert_eq!(convert(" 12 ", PrimitiveKind::U16).unwrap(), Value::U16(12));
        assert_eq!(convert(" a ", PrimitiveKind::Text).unwrap(), Value::Text(" a ".into()));
    }

    #[test]
    fn test_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 15, 30)
            .unwrap();
        assert_eq!(
            convert("2024-03-01 10:15:30", PrimitiveKind::DateTime).unwrap(),
            Value::DateTime(expected)
        );

        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(convert("2024-03-01", PrimitiveKind::DateTime).unwrap(), Value::DateTime(midnight));

        assert!(convert("01/03/2024", PrimitiveKind::DateTime).is_err());
    }

    #[test]
    fn test_primitive_from_value() {
        assert_eq!(i32::from_value(Value::I32(3)), Some(3));
        assert_eq!(i32::from_value(Value::I64(3)), None);
        assert_eq!(String::from_value(Value::Text("a".into())), Some("a".to_string()));
        assert_eq!(<u64 as Primitive>::KIND, PrimitiveKind::U64);
    }
}
