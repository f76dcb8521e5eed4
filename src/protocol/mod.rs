//! Text command protocol: tolerant parsing and dispatch to motors.

pub mod dispatch;
pub mod parser;

pub use dispatch::dispatch;
pub use parser::{parse_command, parse_fields, Field, ParsedFields};
