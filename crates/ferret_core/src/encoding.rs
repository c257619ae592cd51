//! Encoding detection and decoding for scanned files.
//!
//! Detection is heuristic and best-effort: a BOM wins outright, otherwise
//! the first kilobyte is trial-decoded against a fixed candidate list. The
//! returned encoding is advisory - all real decoding replaces invalid
//! sequences with U+FFFD rather than failing.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use encoding_rs::{BIG5, Encoding, GB18030, GBK, UTF_8, UTF_16BE, UTF_16LE};

/// Bytes sniffed from the head of a file for encoding detection.
const PROBE_SIZE: usize = 1024;

/// Trial-decode candidates, in priority order. `gb2312` is subsumed by GBK
/// (the WHATWG decoder treats them as one encoding).
const CANDIDATES: [&Encoding; 4] = [UTF_8, GBK, GB18030, BIG5];

/// Size and detected encoding of a file, gathered before scanning.
#[derive(Debug, Clone, Copy)]
pub struct FileInfo {
    /// File size in bytes.
    pub size: u64,
    /// Detected (advisory) encoding.
    pub encoding: &'static Encoding,
}

impl FileInfo {
    /// Stats `path` and sniffs its encoding from the first kilobyte.
    pub fn probe(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();

        let mut probe = [0_u8; PROBE_SIZE];
        let mut filled = 0;
        loop {
            let n = file.read(&mut probe[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
            if filled == PROBE_SIZE {
                break;
            }
        }

        Ok(Self {
            size,
            encoding: detect(&probe[..filled]),
        })
    }
}

/// Detects the encoding of `probe`: BOM first, then trial decoding, then
/// UTF-8 as the default.
#[must_use]
pub fn detect(probe: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(probe) {
        return encoding;
    }

    for candidate in CANDIDATES {
        // A probe cut mid-sequence can reject its true encoding; that only
        // demotes the file to the UTF-8 default, which decodes lossily.
        if candidate
            .decode_without_bom_handling_and_without_replacement(probe)
            .is_some()
        {
            return candidate;
        }
    }

    UTF_8
}

/// Decodes `bytes`, replacing invalid sequences with U+FFFD. A BOM is
/// stripped only when `strip_bom` is set (the first chunk of a file).
#[must_use]
pub fn decode(bytes: &[u8], encoding: &'static Encoding, strip_bom: bool) -> String {
    let (decoded, _had_errors) = if strip_bom {
        encoding.decode_with_bom_removal(bytes)
    } else {
        encoding.decode_without_bom_handling(bytes)
    };
    decoded.into_owned()
}

/// Reads a whole file and decodes it with U+FFFD replacement.
pub fn read_to_string(path: &Path, encoding: &'static Encoding) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode(&bytes, encoding, true))
}
