// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS API word encoding
//!
//! Every word is prefixed with a 1-5 byte length; a zero-length word ends a
//! sentence.

use tokio::io::{AsyncRead, AsyncReadExt};

// Intentional truncation is part of the wire format
#[allow(clippy::cast_possible_truncation)]
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        vec![len as u8]
    } else if len < 0x4000 {
        vec![((len >> 8) as u8) | 0x80, len as u8]
    } else if len < 0x0020_0000 {
        vec![((len >> 16) as u8) | 0xC0, (len >> 8) as u8, len as u8]
    } else if len < 0x1000_0000 {
        vec![
            ((len >> 24) as u8) | 0xE0,
            (len >> 16) as u8,
            (len >> 8) as u8,
            len as u8,
        ]
    } else {
        vec![
            0xF0,
            (len >> 24) as u8,
            (len >> 16) as u8,
            (len >> 8) as u8,
            len as u8,
        ]
    }
}

/// Encodes one word with its length prefix
pub fn encode_word(word: &str) -> Vec<u8> {
    let mut out = encode_length(word.len());
    out.extend_from_slice(word.as_bytes());
    out
}

/// Reads a length prefix
///
/// # Errors
///
/// Returns the underlying IO error, e.g. `UnexpectedEof` on a closed stream.
pub async fn read_length<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<usize> {
    let first = reader.read_u8().await?;
    let (mut len, extra) = if first & 0x80 == 0 {
        (usize::from(first), 0)
    } else if first & 0xC0 == 0x80 {
        (usize::from(first & 0x3F), 1)
    } else if first & 0xE0 == 0xC0 {
        (usize::from(first & 0x1F), 2)
    } else if first & 0xF0 == 0xE0 {
        (usize::from(first & 0x0F), 3)
    } else {
        (0, 4)
    };
    for _ in 0..extra {
        len = (len << 8) | usize::from(reader.read_u8().await?);
    }
    Ok(len)
}
