//! Debug-only helpers for writing readable `tracing` output.
//!
//! None of these types appear in any public return value; they exist
//! purely to make `debug!`/`warn!` spans readable when a consumer sets
//! `RUST_LOG=debug` while diagnosing a tokenizer or winnow issue.

use std::fmt;

/// Renders a byte slice for logging: valid UTF-8 is shown as-is with
/// control characters escaped; invalid UTF-8 falls back to a lossy
/// decode, still escaped.
pub trait ToDisplayEscaped {
    /// Wrap `self` in a [`fmt::Display`] implementation suitable for
    /// `tracing` field values.
    fn display_escaped(&self) -> DisplayEscaped<'_>;
}

impl ToDisplayEscaped for [u8] {
    fn display_escaped(&self) -> DisplayEscaped<'_> {
        DisplayEscaped(self)
    }
}

/// See [`ToDisplayEscaped`].
pub struct DisplayEscaped<'a>(&'a [u8]);

impl fmt::Display for DisplayEscaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = String::from_utf8_lossy(self.0);
        for ch in text.chars() {
            match ch {
                '\n' => write!(f, "\\n")?,
                '\r' => write!(f, "\\r")?,
                '\t' => write!(f, "\\t")?,
                c if c.is_control() => write!(f, "\\u{{{:04x}}}", c as u32)?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}
