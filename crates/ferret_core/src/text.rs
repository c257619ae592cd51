//! Byte-offset helpers for context windows and line arithmetic.

use memchr::memchr_iter;

/// Counts newline bytes in `content` before `offset`.
#[must_use]
pub fn newlines_before(content: &str, offset: usize) -> usize {
    memchr_iter(b'\n', &content.as_bytes()[..offset]).count()
}

/// Moves `offset` left to the nearest `char` boundary.
#[must_use]
pub fn snap_left(content: &str, mut offset: usize) -> usize {
    while offset > 0 && !content.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Moves `offset` right to the nearest `char` boundary, clipped to the end
/// of `content`.
#[must_use]
pub fn snap_right(content: &str, mut offset: usize) -> usize {
    if offset >= content.len() {
        return content.len();
    }
    while !content.is_char_boundary(offset) {
        offset += 1;
    }
    offset
}

/// Returns the context window around `[start, end)`, widened by `left` and
/// `right` bytes and clipped to the buffer.
///
/// Window edges are snapped outward so the slice never splits a multi-byte
/// code point: leftward for the window start, rightward for the window end.
#[must_use]
pub fn context_window(content: &str, start: usize, end: usize, left: usize, right: usize) -> &str {
    let window_start = snap_left(content, start.saturating_sub(left));
    let window_end = snap_right(content, end.saturating_add(right).min(content.len()));
    &content[window_start..window_end]
}
