/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/


//! Error types for decoding tree and augmentation descriptions.

use std::fmt;

/// A specialized Result type for description decoding.
pub type Result<T> = std::result::Result<T, DescriptionError>;

/// What a description defines, as stored in the header's kind field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptionKind {
    /// A tree: its key order.
    Tree,
    /// An augmentation to register on an existing tree.
    Augmentation,
}

impl DescriptionKind {
    pub(crate) const fn code(self) -> u32 {
        match self {
            Self::Tree => 0,
            Self::Augmentation => 1,
        }
    }
}

impl fmt::Display for DescriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tree => "tree",
            Self::Augmentation => "augmentation",
        })
    }
}

/// Errors that can occur when decoding a description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptionError {
    /// Fewer bytes than the fixed-size header.
    #[error("description is {len} bytes, shorter than the 16-byte header")]
    TruncatedHeader {
        /// Length of the whole input.
        len: usize,
    },

    /// The input does not start with the format's magic bytes.
    #[error("bad magic bytes {found:02x?}")]
    BadMagic {
        /// The first eight bytes of the input.
        found: [u8; 8],
    },

    /// The header names a format version this crate cannot read.
    #[error("unsupported description version {version} (supported: {supported})")]
    UnsupportedVersion {
        /// The version found in the header.
        version: u32,
        /// The version this crate reads and writes.
        supported: u32,
    },

    /// The header describes something other than what was asked for.
    #[error("expected {expected} description, found kind {found}")]
    UnexpectedKind {
        /// The kind the caller asked to decode.
        expected: DescriptionKind,
        /// The raw kind field of the header.
        found: u32,
    },

    /// A chunk, or its length prefix, runs past the end of the input.
    #[error("truncated chunk: needs {needed} bytes, {available} available")]
    TruncatedChunk {
        /// Bytes the chunk (or its length prefix) needs.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },

    /// A chunk holding a name is not valid UTF-8.
    #[error("chunk is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The comparator name is not one of the built-ins.
    #[error("unknown comparator {0:?}")]
    UnknownComparator(String),

    /// The augmentation name is not one of the built-ins.
    #[error("unknown augmentation {0:?}")]
    UnknownAugmentation(String),

    /// Bytes left over after the last expected chunk.
    #[error("{0} trailing bytes after the description")]
    TrailingBytes(usize),
}
