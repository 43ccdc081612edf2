/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Framing: the fixed header and length-prefixed chunks.
//!
//! ```text
//! +----------------+------------+---------+-----------+-------+-----------+-----
//! | magic (8)      | version u32| kind u32| len u32   | bytes | len u32   | ...
//! | "\x01AugTree"  | LE         | LE      | LE        | UTF-8 | LE        |
//! +----------------+------------+---------+-----------+-------+-----------+-----
//! ```

use crate::error::{DescriptionError, DescriptionKind, Result};

/// Leading bytes of every description.
pub const MAGIC: [u8; 8] = *b"\x01AugTree";

/// The format version read and written by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// Size of the fixed header.
pub const HEADER_LEN: usize = 16;

/// Forward-only reader over a description.
pub(crate) struct Reader<'a> {
    rest: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Check the header of `bytes` and position the reader at the payload.
    pub(crate) fn open(bytes: &'a [u8], expected: DescriptionKind) -> Result<Self> {
        let truncated = DescriptionError::TruncatedHeader { len: bytes.len() };
        let Some((header, payload)) = bytes.split_first_chunk::<HEADER_LEN>() else {
            return Err(truncated);
        };

        let mut fields = Reader { rest: header };
        let found = *fields.array::<8>().ok_or_else(|| truncated.clone())?;
        if found != MAGIC {
            return Err(DescriptionError::BadMagic { found });
        }
        let version = fields.u32_le().ok_or_else(|| truncated.clone())?;
        if version != FORMAT_VERSION {
            return Err(DescriptionError::UnsupportedVersion {
                version,
                supported: FORMAT_VERSION,
            });
        }
        let kind = fields.u32_le().ok_or(truncated)?;
        if kind != expected.code() {
            return Err(DescriptionError::UnexpectedKind {
                expected,
                found: kind,
            });
        }

        Ok(Reader { rest: payload })
    }

    /// Read the next length-prefixed chunk as a UTF-8 name.
    pub(crate) fn name(&mut self) -> Result<&'a str> {
        let available = self.rest.len();
        let len = self.u32_le().ok_or(DescriptionError::TruncatedChunk {
            needed: 4,
            available,
        })? as usize;
        if len > self.rest.len() {
            return Err(DescriptionError::TruncatedChunk {
                needed: len,
                available: self.rest.len(),
            });
        }
        let (chunk, rest) = self.rest.split_at(len);
        self.rest = rest;
        Ok(std::str::from_utf8(chunk)?)
    }

    /// Succeed only if the whole input was consumed.
    pub(crate) const fn finish(self) -> Result<()> {
        match self.rest.len() {
            0 => Ok(()),
            trailing => Err(DescriptionError::TrailingBytes(trailing)),
        }
    }

    fn array<const N: usize>(&mut self) -> Option<&'a [u8; N]> {
        let (head, rest) = self.rest.split_first_chunk::<N>()?;
        self.rest = rest;
        Some(head)
    }

    fn u32_le(&mut self) -> Option<u32> {
        self.array::<4>().map(|bytes| u32::from_le_bytes(*bytes))
    }
}

/// Start a description of `kind`.
pub(crate) fn write_header(kind: DescriptionKind) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + 16);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&kind.code().to_le_bytes());
    out
}

/// Append a length-prefixed chunk.
///
/// # Panics
///
/// Panics if `name` is longer than `u32::MAX` bytes.
pub(crate) fn write_name(out: &mut Vec<u8>, name: &str) {
    let len = u32::try_from(name.len()).expect("chunk length must fit in u32");
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(name.as_bytes());
}
