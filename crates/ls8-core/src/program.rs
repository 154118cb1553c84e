//! Program image parsing.
//!
//! Images are text, one instruction byte per line written as base-2 digits.
//! Anything after `#` is a comment. Blank and comment-only lines are
//! skipped; every other line becomes the next byte starting at address 0.

use thiserror::Error;

use crate::memory::MEMORY_BYTES;

/// Comment delimiter in program images.
pub const COMMENT_DELIMITER: char = '#';

/// Failures while turning image text into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// Line contains something other than binary digits.
    #[error("line {line}: expected binary digits, found `{text}`")]
    InvalidDigit {
        /// 1-indexed line number in the image text.
        line: usize,
        /// Offending text with the comment stripped.
        text: String,
    },
    /// Binary literal does not fit in a byte.
    #[error("line {line}: `{text}` does not fit in 8 bits")]
    ValueOutOfRange {
        /// 1-indexed line number in the image text.
        line: usize,
        /// Offending text with the comment stripped.
        text: String,
    },
    /// Image holds more bytes than the address space.
    #[error("program is {len} bytes, memory holds 256")]
    ProgramTooLarge {
        /// Number of bytes in the image.
        len: usize,
    },
}

/// Strips the comment and surrounding whitespace from one image line.
///
/// Returns `None` for blank and comment-only lines.
#[must_use]
pub fn strip_line(line: &str) -> Option<&str> {
    let code = line
        .split_once(COMMENT_DELIMITER)
        .map_or(line, |(code, _)| code)
        .trim();
    (!code.is_empty()).then_some(code)
}

/// Parses one non-empty, comment-free image line.
///
/// # Errors
///
/// Returns [`ProgramError::InvalidDigit`] for non-binary text and
/// [`ProgramError::ValueOutOfRange`] for literals wider than eight bits.
pub fn parse_line(line: usize, code: &str) -> Result<u8, ProgramError> {
    if code.is_empty() || !code.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(ProgramError::InvalidDigit {
            line,
            text: code.to_string(),
        });
    }

    // Only overflow can fail once the digits are known to be binary.
    u8::from_str_radix(code, 2).map_err(|_| ProgramError::ValueOutOfRange {
        line,
        text: code.to_string(),
    })
}

/// Parses a whole image into bytes in load order.
///
/// # Errors
///
/// Returns the first line-level error, or [`ProgramError::ProgramTooLarge`]
/// when the image has more than [`MEMORY_BYTES`] instruction lines.
pub fn parse_program(text: &str) -> Result<Vec<u8>, ProgramError> {
    let mut image = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let Some(code) = strip_line(raw) else {
            continue;
        };
        image.push(parse_line(idx + 1, code)?);
    }

    if image.len() > MEMORY_BYTES {
        return Err(ProgramError::ProgramTooLarge { len: image.len() });
    }

    Ok(image)
}
