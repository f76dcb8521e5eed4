//! Tolerant command parser.
//!
//! Payloads look like `{"motor":1,"direction":"forward","speed":200}` but are
//! not required to be valid JSON. Each field is located by its marker and
//! scanned on its own; anything that cannot be read falls back to the field's
//! default. Parsing never fails.

use crate::config::DIRECTION_BUFFER_SIZE;
use crate::messages::{Command, Direction};

const MOTOR_MARKER: &[u8] = b"\"motor\":";
const SPEED_MARKER: &[u8] = b"\"speed\":";
const DIRECTION_MARKER: &[u8] = b"\"direction\":\"";

/// Outcome of scanning one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Marker not found
    Absent,
    /// Marker found but no usable value followed it
    Malformed,
    Present(T),
}

impl<T> Field<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// Per-field scan results for one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    pub motor: Field<i32>,
    pub direction: Field<String>,
    pub speed: Field<i32>,
}

impl ParsedFields {
    /// Collapse into a command, defaulting anything not present
    pub fn into_command(self) -> Command {
        Command {
            motor: self.motor.value().unwrap_or_default(),
            direction: self
                .direction
                .value()
                .map(|token| Direction::from_token(&token))
                .unwrap_or_default(),
            speed: self.speed.value().unwrap_or_default(),
        }
    }
}

/// Scan every field of a payload
pub fn parse_fields(payload: &[u8]) -> ParsedFields {
    // The payload ends at the first NUL, like a C string
    let text = match payload.iter().position(|&b| b == 0) {
        Some(end) => &payload[..end],
        None => payload,
    };

    ParsedFields {
        motor: int_field(text, MOTOR_MARKER),
        direction: direction_field(text),
        speed: int_field(text, SPEED_MARKER),
    }
}

/// Parse a payload into a best-effort command
pub fn parse_command(payload: &[u8]) -> Command {
    parse_fields(payload).into_command()
}

fn int_field(text: &[u8], marker: &[u8]) -> Field<i32> {
    match after_marker(text, marker) {
        None => Field::Absent,
        Some(rest) => scan_int(rest).map_or(Field::Malformed, Field::Present),
    }
}

fn direction_field(text: &[u8]) -> Field<String> {
    let Some(rest) = after_marker(text, DIRECTION_MARKER) else {
        return Field::Absent;
    };
    match rest.iter().position(|&b| b == b'"') {
        // Token plus terminator has to fit the direction buffer
        Some(len) if len < DIRECTION_BUFFER_SIZE => {
            Field::Present(String::from_utf8_lossy(&rest[..len]).into_owned())
        }
        _ => Field::Malformed,
    }
}

/// Bytes following the first occurrence of `marker`
fn after_marker<'a>(text: &'a [u8], marker: &[u8]) -> Option<&'a [u8]> {
    text.windows(marker.len())
        .position(|w| w == marker)
        .map(|start| &text[start + marker.len()..])
}

/// `atoi`-style integer scan: leading whitespace, optional sign, then as many
/// digits as available. Saturates at the i32 range.
fn scan_int(bytes: &[u8]) -> Option<i32> {
    let mut iter = bytes
        .iter()
        .copied()
        .skip_while(|&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))
        .peekable();

    let negative = match iter.peek() {
        Some(b'-') => {
            iter.next();
            true
        }
        Some(b'+') => {
            iter.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    let mut digits = 0usize;
    while let Some(b) = iter.next_if(u8::is_ascii_digit) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
        digits += 1;
    }
    if digits == 0 {
        return None;
    }

    let signed = if negative { -value } else { value };
    Some(signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}
