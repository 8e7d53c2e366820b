//! Byte decoding with an ordered encoding fallback chain.
//!
//! Exports come from spreadsheet tools on different platforms: UTF-8 (often
//! with a BOM), Windows-1252 or plain Latin-1. Each candidate is tried in
//! order; a candidate that cannot represent the input fails instead of
//! producing replacement characters.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use encoding_rs::{UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::error::{IngestError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes that Windows-1252 leaves unassigned
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Windows1252,
    Latin1,
}

impl SourceEncoding {
    /// Default chain: UTF-8, then CP1252, then ISO-8859-1.
    pub const DEFAULT_CHAIN: [SourceEncoding; 3] = [
        SourceEncoding::Utf8,
        SourceEncoding::Windows1252,
        SourceEncoding::Latin1,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Windows1252 => "windows-1252",
            SourceEncoding::Latin1 => "iso-8859-1",
        }
    }

    fn try_decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            SourceEncoding::Utf8 => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .map(|s| s.into_owned())
            }
            SourceEncoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
                Some(text.into_owned())
            }
            // Every byte is its own code point
            SourceEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl FromStr for SourceEncoding {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" | "utf-8-sig" => Ok(SourceEncoding::Utf8),
            "windows-1252" | "cp1252" => Ok(SourceEncoding::Windows1252),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(SourceEncoding::Latin1),
            _ => Err(IngestError::UnknownEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decoded file contents and the encoding that succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: SourceEncoding,
}

/// Decode `bytes` with the first encoding in `chain` that accepts them.
pub fn decode(bytes: &[u8], chain: &[SourceEncoding]) -> Result<Decoded> {
    for encoding in chain {
        match encoding.try_decode(bytes) {
            Some(text) => {
                debug!(encoding = encoding.label(), bytes = bytes.len(), "decoded input");
                return Ok(Decoded {
                    text,
                    encoding: *encoding,
                });
            }
            None => debug!(encoding = encoding.label(), "decode attempt failed"),
        }
    }

    Err(IngestError::FileDecode {
        attempted: chain.iter().map(|e| e.label().to_string()).collect(),
    })
}

/// Read a file fully and decode it.
pub fn read_and_decode(path: impl AsRef<Path>, chain: &[SourceEncoding]) -> Result<Decoded> {
    let bytes = std::fs::read(path.as_ref())?;
    decode(&bytes, chain)
}
