//! Chunked file reading with line-aligned windows.
//!
//! A [`ChunkedReader`] streams a file as a lazy, finite, single-pass
//! sequence of [`ChunkFrame`]s. Raw bytes accumulate until the pending
//! buffer reaches the chunk size; the chunk is then cut just past the next
//! newline, so no line ever straddles two chunks and per-chunk newline
//! counting stays exact. Each frame carries the absolute byte offset and
//! 1-based line number of its first byte, measured in the file's own
//! encoding, so consumers can report absolute positions statelessly.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use memchr::{memchr, memchr_iter};

use crate::encoding::decode;

/// Bytes pulled from the file per read call while filling a chunk.
const READ_BLOCK: usize = 64 * 1024;

/// One line-aligned window of a file's decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFrame {
    /// Decoded chunk text (U+FFFD for undecodable sequences).
    pub content: String,
    /// Absolute byte offset of the chunk's first byte in the source file,
    /// in the source encoding.
    pub start_offset: u64,
    /// 1-based line number of the chunk's first byte.
    pub start_line: u32,
}

/// Streams a file as consecutive [`ChunkFrame`]s. Not restartable.
#[derive(Debug)]
pub struct ChunkedReader {
    reader: BufReader<File>,
    encoding: &'static Encoding,
    chunk_size: usize,
    pending: Vec<u8>,
    offset: u64,
    line: u32,
    first: bool,
    eof: bool,
    done: bool,
}

impl ChunkedReader {
    /// Opens `path` for chunked reading with the given decode encoding and
    /// chunk size in raw bytes.
    pub fn open(path: &Path, encoding: &'static Encoding, chunk_size: usize) -> io::Result<Self> {
        let file = File::open(path)?;

        Ok(Self {
            reader: BufReader::new(file),
            encoding,
            chunk_size: chunk_size.max(1),
            pending: Vec::new(),
            offset: 0,
            line: 1,
            first: true,
            eof: false,
            done: false,
        })
    }

    /// Byte width of a newline in the source encoding.
    fn newline_width(&self) -> usize {
        if self.encoding == UTF_16LE || self.encoding == UTF_16BE {
            2
        } else {
            1
        }
    }

    /// Finds the cut position for the next chunk: one past the first
    /// newline whose end lands at or beyond the chunk size. `None` means
    /// more input is needed (the buffer is short, or a line overruns it).
    fn find_cut(&self) -> Option<usize> {
        let width = self.newline_width();
        if self.pending.len() < self.chunk_size {
            return None;
        }

        let from = self.chunk_size.saturating_sub(width);
        match self.encoding {
            e if e == UTF_16LE => find_utf16_newline(&self.pending, from, true).map(|i| i + 2),
            e if e == UTF_16BE => find_utf16_newline(&self.pending, from, false).map(|i| i + 2),
            _ => memchr(b'\n', &self.pending[from..]).map(|i| from + i + 1),
        }
    }

    fn count_newlines(&self, raw: &[u8]) -> usize {
        match self.encoding {
            e if e == UTF_16LE => count_utf16_newlines(raw, true),
            e if e == UTF_16BE => count_utf16_newlines(raw, false),
            _ => memchr_iter(b'\n', raw).count(),
        }
    }

    fn emit(&mut self, cut: usize) -> ChunkFrame {
        let raw: Vec<u8> = self.pending.drain(..cut).collect();
        let frame = ChunkFrame {
            content: decode(&raw, self.encoding, self.first),
            start_offset: self.offset,
            start_line: self.line,
        };

        self.offset += raw.len() as u64;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "newline counts within one chunk fit in u32"
        )]
        {
            self.line += self.count_newlines(&raw) as u32;
        }
        self.first = false;

        frame
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut block = [0_u8; READ_BLOCK];
        let n = self.reader.read(&mut block)?;
        if n == 0 {
            self.eof = true;
        } else {
            self.pending.extend_from_slice(&block[..n]);
        }
        Ok(())
    }
}

impl Iterator for ChunkedReader {
    type Item = io::Result<ChunkFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if let Some(cut) = self.find_cut() {
                return Some(Ok(self.emit(cut)));
            }

            if self.eof {
                if self.pending.is_empty() {
                    self.done = true;
                    return None;
                }
                let cut = self.pending.len();
                return Some(Ok(self.emit(cut)));
            }

            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

/// Scans two-byte code units for a newline, starting at the unit containing
/// `from`. Returns the byte index of the unit.
fn find_utf16_newline(bytes: &[u8], from: usize, little_endian: bool) -> Option<usize> {
    let mut i = from - (from % 2);
    while i + 1 < bytes.len() {
        let is_newline = if little_endian {
            bytes[i] == 0x0A && bytes[i + 1] == 0x00
        } else {
            bytes[i] == 0x00 && bytes[i + 1] == 0x0A
        };
        if is_newline {
            return Some(i);
        }
        i += 2;
    }
    None
}

fn count_utf16_newlines(bytes: &[u8], little_endian: bool) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        let is_newline = if little_endian {
            bytes[i] == 0x0A && bytes[i + 1] == 0x00
        } else {
            bytes[i] == 0x00 && bytes[i + 1] == 0x0A
        };
        if is_newline {
            count += 1;
        }
        i += 2;
    }
    count
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use encoding_rs::{GBK, UTF_8};
    use tempfile::NamedTempFile;

    use super::*;

    fn temp_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    fn collect_frames(path: &Path, encoding: &'static Encoding, chunk_size: usize) -> Vec<ChunkFrame> {
        ChunkedReader::open(path, encoding, chunk_size)
            .unwrap()
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn small_file_yields_single_frame() {
        let file = temp_file(b"one\ntwo\nthree");
        let frames = collect_frames(file.path(), UTF_8, 1024);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].content, "one\ntwo\nthree");
        assert_eq!(frames[0].start_offset, 0);
        assert_eq!(frames[0].start_line, 1);
    }

    #[test]
    fn empty_file_yields_no_frames() {
        let file = temp_file(b"");
        let frames = collect_frames(file.path(), UTF_8, 1024);

        assert!(frames.is_empty());
    }

    #[test]
    fn chunks_cut_on_line_boundaries() {
        let file = temp_file(b"aaaa\nbbbb\ncccc\ndddd\neeee");
        let frames = collect_frames(file.path(), UTF_8, 8);

        assert!(frames.len() > 1);
        for frame in &frames[..frames.len() - 1] {
            assert!(frame.content.ends_with('\n'), "frame {frame:?} does not end on a line");
        }
    }

    #[test]
    fn frames_reassemble_to_full_content() {
        let content = "line one\nline two\nline three\nline four\ntail";
        let file = temp_file(content.as_bytes());
        let frames = collect_frames(file.path(), UTF_8, 10);

        let joined: String = frames.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(joined, content);
    }

    #[test]
    fn frame_offsets_are_contiguous_in_raw_bytes() {
        let content = "alpha\nbravo\ncharlie\ndelta\necho\n";
        let file = temp_file(content.as_bytes());
        let frames = collect_frames(file.path(), UTF_8, 7);

        let mut expected_offset = 0;
        for frame in &frames {
            assert_eq!(frame.start_offset, expected_offset);
            expected_offset += frame.content.len() as u64;
        }
        assert_eq!(expected_offset, content.len() as u64);
    }

    #[test]
    fn start_lines_track_newlines_in_prior_frames() {
        let content = "a\nb\nc\nd\ne\nf\ng\nh\n";
        let file = temp_file(content.as_bytes());
        let frames = collect_frames(file.path(), UTF_8, 4);

        let mut expected_line = 1;
        for frame in &frames {
            assert_eq!(frame.start_line, expected_line);
            expected_line += u32::try_from(frame.content.matches('\n').count()).unwrap();
        }
    }

    #[test]
    fn line_longer_than_chunk_size_stays_whole() {
        let long_line = "x".repeat(100);
        let content = format!("{long_line}\nshort\n");
        let file = temp_file(content.as_bytes());
        let frames = collect_frames(file.path(), UTF_8, 10);

        assert_eq!(frames[0].content, format!("{long_line}\n"));
        assert_eq!(frames[1].content, "short\n");
        assert_eq!(frames[1].start_line, 2);
    }

    #[test]
    fn chunk_accumulates_lines_until_watermark() {
        // Three 4-byte lines per 8-byte chunk watermark: the second line
        // crosses the watermark, so each chunk holds two lines.
        let file = temp_file(b"aaa\nbbb\nccc\nddd\n");
        let frames = collect_frames(file.path(), UTF_8, 8);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].content, "aaa\nbbb\n");
        assert_eq!(frames[1].content, "ccc\nddd\n");
        assert_eq!(frames[1].start_offset, 8);
        assert_eq!(frames[1].start_line, 3);
    }

    #[test]
    fn utf16le_frames_report_raw_byte_offsets() {
        // "ab\ncd\nef" in UTF-16 LE with BOM.
        let mut bytes = vec![0xFF, 0xFE];
        for ch in "ab\ncd\nef".encode_utf16() {
            bytes.extend_from_slice(&ch.to_le_bytes());
        }
        let file = temp_file(&bytes);
        let frames = collect_frames(file.path(), UTF_16LE, 8);

        let joined: String = frames.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(joined, "ab\ncd\nef");
        assert!(frames.len() > 1);

        // Offsets advance by raw (two-byte-per-char) counts, BOM included.
        assert_eq!(frames[0].start_offset, 0);
        assert_eq!(frames[1].start_offset, 8);
        assert_eq!(frames[1].start_line, 2);
    }

    #[test]
    fn utf16le_newlines_are_not_confused_by_low_bytes() {
        // U+010A has 0x0A as its low byte; it must not be treated as a
        // newline when scanning code units.
        let mut bytes = vec![0xFF, 0xFE];
        for ch in "\u{010A}\u{010A}\u{010A}x\ny".encode_utf16() {
            bytes.extend_from_slice(&ch.to_le_bytes());
        }
        let file = temp_file(&bytes);
        let frames = collect_frames(file.path(), UTF_16LE, 4);

        let joined: String = frames.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(joined, "\u{010A}\u{010A}\u{010A}x\ny");
        assert_eq!(frames.last().unwrap().content, "y");
        assert_eq!(frames.last().unwrap().start_line, 2);
    }

    #[test]
    fn gbk_chunks_decode_to_utf8_text() {
        // Two lines of GBK-encoded Chinese.
        let file = temp_file(b"\xC4\xE3\xBA\xC3\n\xC4\xE3\xBA\xC3\n");
        let frames = collect_frames(file.path(), GBK, 5);

        let joined: String = frames.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(joined, "\u{4f60}\u{597d}\n\u{4f60}\u{597d}\n");

        // Raw offsets count GBK bytes, not decoded UTF-8 bytes.
        assert_eq!(frames[1].start_offset, 5);
    }

    #[test]
    fn bom_is_stripped_from_first_frame_only() {
        let file = temp_file(b"\xEF\xBB\xBFfirst\nsecond\n");
        let frames = collect_frames(file.path(), UTF_8, 6);

        assert!(frames[0].content.starts_with("first"));
        // The BOM still occupies raw offsets 0..3.
        assert_eq!(frames[0].start_offset, 0);
        assert_eq!(frames[1].start_offset, frames[0].content.len() as u64 + 3);
    }

    #[test]
    fn missing_file_fails_to_open() {
        assert!(ChunkedReader::open(Path::new("/nonexistent/file"), UTF_8, 1024).is_err());
    }
}
