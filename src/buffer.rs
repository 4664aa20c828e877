//! Bounded render buffer.
//!
//! Every module renders into a [`RenderBuffer`] with a fixed byte capacity.
//! The capacity counts one byte for a terminator, so the rendered text is
//! always at most `capacity - 1` bytes long, the way a C consumer of the
//! same buffer would need it.
//!
//! Writes are fragment-atomic: a fragment (a placeholder value, a literal
//! character, a color bracket) is either written completely or not at all.
//! The first fragment that does not fit marks the buffer as truncated and
//! appends [`TRUNCATION_MARKER`]; every later write is refused. Room for the
//! marker is kept free at all times, so appending it can never overflow.

use std::fmt;
use thiserror::Error;

/// Default capacity of a module's render buffer, terminator included.
pub const BUFFER_CAPACITY: usize = 4096;

/// Appended once to text cut short by an overflow.
pub const TRUNCATION_MARKER: &str = "…";

/// Bytes kept free for the terminator.
const TERMINATOR: usize = 1;

/// A write that did not fit into the remaining capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("render buffer overflow: {needed} bytes needed, {remaining} available")]
pub struct Overflow {
    pub needed: usize,
    pub remaining: usize,
}

/// Fixed-capacity, append-only text buffer.
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    text: String,
    capacity: usize,
    /// Bytes promised to a pending closing fragment (see [`RenderBuffer::reserve`]).
    reserved: usize,
    truncated: bool,
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBuffer {
    /// Smallest capacity that can still hold the terminator and the marker.
    pub const MIN_CAPACITY: usize = TERMINATOR + TRUNCATION_MARKER.len();

    pub fn new() -> Self {
        Self::with_capacity(BUFFER_CAPACITY)
    }

    /// Create a buffer holding at most `capacity - 1` bytes of text.
    ///
    /// Capacities below [`RenderBuffer::MIN_CAPACITY`] are raised to it.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(Self::MIN_CAPACITY);
        Self {
            text: String::with_capacity(capacity.min(BUFFER_CAPACITY)),
            capacity,
            reserved: 0,
            truncated: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Bytes that can still be written as content.
    pub fn remaining(&self) -> usize {
        if self.truncated {
            return 0;
        }
        self.capacity
            .saturating_sub(TERMINATOR)
            .saturating_sub(TRUNCATION_MARKER.len())
            .saturating_sub(self.reserved)
            .saturating_sub(self.text.len())
    }

    /// Append a fragment, or truncate the buffer if it does not fit.
    pub fn try_push_str(&mut self, fragment: &str) -> Result<(), Overflow> {
        let remaining = self.remaining();
        if self.truncated || fragment.len() > remaining {
            self.truncate();
            return Err(Overflow {
                needed: fragment.len(),
                remaining,
            });
        }
        self.text.push_str(fragment);
        Ok(())
    }

    /// Append a fragment; returns `false` when it was cut off.
    pub fn push_str(&mut self, fragment: &str) -> bool {
        self.try_push_str(fragment).is_ok()
    }

    pub fn push_char(&mut self, c: char) -> bool {
        let mut utf8 = [0u8; 4];
        self.push_str(c.encode_utf8(&mut utf8))
    }

    /// Keep `len` bytes free for a closing fragment written later with
    /// [`RenderBuffer::push_reserved`]. Fails without side effects when the
    /// bytes are not available.
    pub fn reserve(&mut self, len: usize) -> Result<(), Overflow> {
        let remaining = self.remaining();
        if self.truncated || len > remaining {
            return Err(Overflow {
                needed: len,
                remaining,
            });
        }
        self.reserved += len;
        Ok(())
    }

    /// Release a reservation and write its closing fragment.
    ///
    /// Succeeds even after truncation, because the bytes were set aside
    /// before any later content was accepted.
    pub fn push_reserved(&mut self, fragment: &str) {
        let len = fragment.len().min(self.reserved);
        self.reserved -= len;
        if len == fragment.len() {
            self.text.push_str(fragment);
        }
    }

    /// Strip surrounding whitespace from the text written since byte offset
    /// `from`. A truncated buffer is left alone so the marker stays last.
    pub fn trim_since(&mut self, from: usize) {
        if self.truncated || from > self.text.len() || !self.text.is_char_boundary(from) {
            return;
        }
        let end = from + self.text[from..].trim_end().len();
        self.text.truncate(end);
        let tail = &self.text[from..];
        let leading = tail.len() - tail.trim_start().len();
        self.text.drain(from..from + leading);
    }

    fn truncate(&mut self) {
        if !self.truncated {
            self.truncated = true;
            self.text.push_str(TRUNCATION_MARKER);
        }
    }

    /// Consume the buffer and return the rendered text.
    pub fn finish(self) -> String {
        debug_assert!(self.text.len() < self.capacity);
        self.text
    }
}

impl fmt::Write for RenderBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.try_push_str(s).map_err(|_| fmt::Error)
    }
}

impl fmt::Display for RenderBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_push_within_capacity() {
        let mut buf = RenderBuffer::with_capacity(32);
        assert!(buf.push_str("hello"));
        assert!(buf.push_char(' '));
        assert!(buf.push_str("world"));
        assert_eq!(buf.as_str(), "hello world");
        assert!(!buf.is_truncated());
    }

    #[test]
    fn test_fragment_that_does_not_fit_is_dropped_whole() {
        // 16 - terminator - marker(3) = 12 usable bytes
        let mut buf = RenderBuffer::with_capacity(16);
        assert_eq!(buf.remaining(), 12);
        assert!(buf.push_str("0123456789"));
        let err = buf.try_push_str("abc").unwrap_err();
        assert_eq!(err, Overflow { needed: 3, remaining: 2 });
        assert_eq!(buf.finish(), "0123456789…");
    }

    #[test]
    fn test_writes_after_truncation_are_refused() {
        let mut buf = RenderBuffer::with_capacity(8);
        assert!(!buf.push_str("way too long for this"));
        assert!(!buf.push_str("x"));
        assert_eq!(buf.remaining(), 0);
        assert_eq!(buf.as_str(), TRUNCATION_MARKER);
    }

    #[test]
    fn test_never_exceeds_capacity_minus_terminator() {
        let mut buf = RenderBuffer::with_capacity(10);
        for _ in 0..100 {
            buf.push_char('é');
        }
        assert!(buf.is_truncated());
        assert!(buf.len() <= buf.capacity() - 1);
    }

    #[test]
    fn test_reservation_survives_truncation() {
        let mut buf = RenderBuffer::with_capacity(20);
        buf.reserve(4).unwrap();
        assert!(buf.push_str("<a>"));
        assert!(!buf.push_str("0123456789abcdef"));
        buf.push_reserved("</a>");
        let text = buf.finish();
        assert_eq!(text, "<a>…</a>");
        assert!(text.len() <= 19);
    }

    #[test]
    fn test_reserve_fails_without_side_effects() {
        let mut buf = RenderBuffer::with_capacity(8);
        assert!(buf.reserve(100).is_err());
        assert!(!buf.is_truncated());
        assert!(buf.push_str("ok"));
    }

    #[test]
    fn test_fmt_write_goes_through_bounds() {
        let mut buf = RenderBuffer::with_capacity(8);
        assert!(write!(buf, "{:.2}", 1.5f64).is_ok());
        assert!(write!(buf, "{}", 123456789).is_err());
        assert_eq!(buf.finish(), "1.50…");
    }

    #[test]
    fn test_trim_since_keeps_prefix() {
        let mut buf = RenderBuffer::with_capacity(64);
        buf.push_str("<a>");
        let start = buf.len();
        buf.push_str("  BAT 50%   ");
        buf.trim_since(start);
        assert_eq!(buf.as_str(), "<a>BAT 50%");
    }

    #[test]
    fn test_tiny_capacity_is_raised() {
        let buf = RenderBuffer::with_capacity(0);
        assert_eq!(buf.capacity(), RenderBuffer::MIN_CAPACITY);
        assert_eq!(buf.remaining(), 0);
    }
}
