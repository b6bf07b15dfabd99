//! Storage-safe file stems for series names.
//!
//! Names such as `^GSPC`, `EURUSD=X` or `DX-Y.NYB` are mapped to file stems by
//! percent-escaping every byte outside `[A-Za-z0-9_-]` (a `.` is kept unless it
//! leads the name). The mapping is injective: [`unsanitize_name`] recovers the
//! original, so two distinct names can never share a file.

use std::fmt::Write;

fn is_plain(byte: u8, position: usize) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || (byte == b'.' && position > 0)
}

/// File stem for a series name. Applied identically on write and read.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, byte) in name.bytes().enumerate() {
        if is_plain(byte, i) {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Inverse of [`sanitize_name`]. `None` if `stem` is not a valid escape.
pub fn unsanitize_name(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
