// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text decoding for exported documents
//!
//! Exports arrive either as UTF-8 or in the legacy Windows-1251 Cyrillic code
//! page. Detection is a heuristic, not a guarantee: bytes are decoded as UTF-8
//! first and re-decoded as Windows-1251 when the UTF-8 result looks mis-decoded:
//!
//! - it contains U+FFFD (invalid UTF-8 sequences were replaced), or
//! - it contains a run of [`SUSPICIOUS_RUN`] or more consecutive non-ASCII
//!   characters while not a single Cyrillic letter is present.
//!
//! Documents with neither Cyrillic nor other non-ASCII text can be classified
//! either way; both decodings agree on pure ASCII so this is harmless there.

use crate::document::TextEncoding;
use encoding_rs::{UTF_8, WINDOWS_1251};

/// Minimum run of consecutive non-ASCII characters that counts as mojibake
pub const SUSPICIOUS_RUN: usize = 3;

/// Decoded document text
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Decode raw document bytes, falling back to Windows-1251 when UTF-8 looks wrong
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    let (utf8, _had_errors) = UTF_8.decode_with_bom_removal(bytes);

    if looks_misdecoded(&utf8) {
        let (legacy, _) = WINDOWS_1251.decode_without_bom_handling(bytes);
        tracing::warn!(
            bytes = bytes.len(),
            "Document is not valid UTF-8 text, re-decoded as Windows-1251"
        );
        return DecodedText {
            text: legacy.into_owned(),
            encoding: TextEncoding::Windows1251,
        };
    }

    DecodedText {
        text: utf8.into_owned(),
        encoding: TextEncoding::Utf8,
    }
}

/// Heuristic check for a UTF-8 decode of non-UTF-8 bytes
pub fn looks_misdecoded(text: &str) -> bool {
    if text.contains('\u{FFFD}') {
        return true;
    }

    let mut has_cyrillic = false;
    let mut run = 0usize;
    let mut longest_run = 0usize;

    for ch in text.chars() {
        if is_cyrillic_letter(ch) {
            has_cyrillic = true;
        }
        if ch.is_ascii() {
            run = 0;
        } else {
            run += 1;
            longest_run = longest_run.max(run);
        }
    }

    !has_cyrillic && longest_run >= SUSPICIOUS_RUN
}

#[inline]
fn is_cyrillic_letter(ch: char) -> bool {
    matches!(ch, '\u{0400}'..='\u{04FF}') && ch.is_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_cyrillic_kept() {
        let decoded = decode_text("ЛДСП Белый".as_bytes());
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert_eq!(decoded.text, "ЛДСП Белый");
    }

    #[test]
    fn test_windows_1251_redecoded() {
        // "Дуб" in Windows-1251
        let bytes = [0xC4, 0xF3, 0xE1];
        let decoded = decode_text(&bytes);
        assert_eq!(decoded.encoding, TextEncoding::Windows1251);
        assert_eq!(decoded.text, "Дуб");
    }

    #[test]
    fn test_bom_removed() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"{\"panels\":[]}");
        let decoded = decode_text(&bytes);
        assert_eq!(decoded.text, "{\"panels\":[]}");
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_non_ascii_run_without_cyrillic_is_suspicious() {
        assert!(looks_misdecoded("ÐÑÐ"));
        assert!(!looks_misdecoded("Café"));
        assert!(!looks_misdecoded("Дуб ÐÑÐ"));
        assert!(!looks_misdecoded("plain ascii"));
    }
}
