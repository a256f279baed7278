//! Lexically sortable attribute encoding
//!
//! The store only compares strings byte-wise, so numbers are zero-padded to a
//! fixed width and timestamps use ISO-8601. Decoding is best-effort pattern
//! inference; callers that need the exact wire bytes read the before-cast
//! string kept by [`AttributeMultimap`](crate::sdb::multimap::AttributeMultimap).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default zero-padding width for numbers
pub const DEFAULT_NUMBER_PADDING: usize = 32;

/// Default number of digits after the decimal point
pub const DEFAULT_FLOAT_PRECISION: usize = 8;

/// Encoding failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Zero padding has no lexically ordered form for negative numbers
    #[error("negative number cannot be zero-padded: {0}")]
    NegativeNumber(String),

    #[error("non-finite float cannot be encoded: {0}")]
    NonFinite(f64),
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<FixedOffset>),
    Text(String),
    Boolean(bool),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            AttributeValue::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(n) => write!(f, "{}", n),
            AttributeValue::Float(x) => write!(f, "{}", x),
            AttributeValue::Timestamp(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Integer(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        AttributeValue::Integer(n as i64)
    }
}

impl From<u32> for AttributeValue {
    fn from(n: u32) -> Self {
        AttributeValue::Integer(n as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(x: f64) -> Self {
        AttributeValue::Float(x)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

impl From<DateTime<FixedOffset>> for AttributeValue {
    fn from(t: DateTime<FixedOffset>) -> Self {
        AttributeValue::Timestamp(t)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(t: DateTime<Utc>) -> Self {
        AttributeValue::Timestamp(t.fixed_offset())
    }
}

/// Padding width and float precision used for encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default = "default_number_padding")]
    pub number_padding: usize,

    #[serde(default = "default_float_precision")]
    pub float_precision: usize,
}

fn default_number_padding() -> usize {
    DEFAULT_NUMBER_PADDING
}

fn default_float_precision() -> usize {
    DEFAULT_FLOAT_PRECISION
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            number_padding: DEFAULT_NUMBER_PADDING,
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

/// Encoder/decoder for attribute values.
///
/// Carries its configuration explicitly; two codecs with different settings
/// can be used side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl From<CodecConfig> for Codec {
    fn from(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl Codec {
    pub fn new(number_padding: usize, float_precision: usize) -> Self {
        Self {
            config: CodecConfig {
                number_padding,
                float_precision,
            },
        }
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    pub fn number_padding(&self) -> usize {
        self.config.number_padding
    }

    pub fn float_precision(&self) -> usize {
        self.config.float_precision
    }

    /// Encode a typed value into its wire string
    pub fn encode(&self, value: &AttributeValue) -> Result<String, CodecError> {
        match value {
            AttributeValue::Integer(n) => {
                if *n < 0 {
                    return Err(CodecError::NegativeNumber(n.to_string()));
                }
                Ok(format!("{:0width$}", n, width = self.config.number_padding))
            }
            AttributeValue::Float(x) => {
                Self::numeric(*x, self.config.number_padding, self.config.float_precision)
            }
            // Sub-second digits only appear when the value has them
            AttributeValue::Timestamp(t) => Ok(t.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            AttributeValue::Text(s) => Ok(escape(s)),
            AttributeValue::Boolean(b) => Ok(if *b { "true" } else { "false" }.to_string()),
        }
    }

    /// Format a float with an explicit total width and precision.
    ///
    /// Storing the result as text sidesteps rounding surprises from automatic
    /// float conversion; it still decodes as a float when read back.
    pub fn numeric(value: f64, width: usize, precision: usize) -> Result<String, CodecError> {
        if !value.is_finite() {
            return Err(CodecError::NonFinite(value));
        }
        if value.is_sign_negative() && value != 0.0 {
            return Err(CodecError::NegativeNumber(value.to_string()));
        }
        Ok(format!("{:0width$.prec$}", value.abs(), width = width, prec = precision))
    }

    /// Infer a typed value from a wire string.
    ///
    /// Precedence: zero-padded integer, zero-padded decimal, ISO-8601
    /// date/time, then the string itself. A number that fills the whole
    /// padding width carries no leading zero and is still taken as padded.
    pub fn decode(&self, raw: &str) -> AttributeValue {
        let width = self.config.number_padding;
        if is_padded_integer(raw, width) {
            if let Ok(n) = raw.parse::<i64>() {
                return AttributeValue::Integer(n);
            }
        } else if is_padded_decimal(raw, width) {
            if let Ok(x) = raw.parse::<f64>() {
                return AttributeValue::Float(x);
            }
        } else if let Some(t) = parse_iso8601(raw) {
            return AttributeValue::Timestamp(t);
        }
        AttributeValue::Text(raw.to_string())
    }
}

/// Escape backslash and single quote for the query language
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out
}

/// `^0+\d+$`, or all digits at exactly the padding width
fn is_padded_integer(s: &str, width: usize) -> bool {
    let b = s.as_bytes();
    let padded = b.len() >= 2 && b[0] == b'0';
    !b.is_empty() && (padded || b.len() == width) && b.iter().all(u8::is_ascii_digit)
}

/// `^0+\d*\.\d+$`, or `\d+\.\d+` at exactly the padding width
fn is_padded_decimal(s: &str, width: usize) -> bool {
    let Some((int_part, frac_part)) = s.split_once('.') else {
        return false;
    };
    (int_part.starts_with('0') || (!int_part.is_empty() && s.len() == width))
        && int_part.bytes().all(|c| c.is_ascii_digit())
        && !frac_part.is_empty()
        && frac_part.bytes().all(|c| c.is_ascii_digit())
}

/// `^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}(\.\d+)?([+-]\d{2}:\d{2})?)?$`
///
/// Date-only and offset-less forms are taken as UTC.
fn parse_iso8601(s: &str) -> Option<DateTime<FixedOffset>> {
    let b = s.as_bytes();
    let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);

    if b.len() == 10 {
        if !(digits(0..4) && b[4] == b'-' && digits(5..7) && b[7] == b'-' && digits(8..10)) {
            return None;
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight).fixed_offset());
    }

    if b.len() < 19
        || !(digits(0..4)
            && b[4] == b'-'
            && digits(5..7)
            && b[7] == b'-'
            && digits(8..10)
            && b[10] == b'T'
            && digits(11..13)
            && b[13] == b':'
            && digits(14..16)
            && b[16] == b':'
            && digits(17..19))
    {
        return None;
    }

    let mut end = 19;
    if b.get(end) == Some(&b'.') {
        let frac_digits = b[end + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
        if frac_digits == 0 {
            return None;
        }
        end += 1 + frac_digits;
    }

    match b.len() - end {
        0 => {
            let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
            Some(Utc.from_utc_datetime(&naive).fixed_offset())
        }
        6 => {
            if !(matches!(b[end], b'+' | b'-')
                && digits(end + 1..end + 3)
                && b[end + 3] == b':'
                && digits(end + 4..end + 6))
            {
                return None;
            }
            DateTime::parse_from_rfc3339(s).ok()
        }
        _ => None,
    }
}
