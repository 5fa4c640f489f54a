//! Centralized normalization adapter for text entering the buffer.
//!
//! Contract:
//! - Input: &str raw input (keystrokes, IME commits, paste).
//! - Output: NFC-normalized text with LF-only line breaks.
//! - Does not log content; callers should avoid logging raw text.

use crate::normalize_line_endings;
use unicode_normalization::{IsNormalized, UnicodeNormalization, is_nfc_quick};

/// Normalize user input to NFC with LF line endings.
pub fn normalize_input(input: &str) -> String {
    let lf = normalize_line_endings(input).text;
    if is_nfc_quick(lf.chars()) == IsNormalized::Yes {
        lf
    } else {
        lf.nfc().collect()
    }
}
