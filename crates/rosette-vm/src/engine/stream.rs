//! View of the bytes around the current scan position.

/// The buffer being scanned plus the history preceding it.
///
/// Offsets are absolute stream offsets; `buffer[0]` sits at `buf_offset`
/// and `history` holds the bytes immediately before it.
#[derive(Clone, Copy, Debug)]
pub struct Stream<'b> {
    pub buf_offset: u64,
    pub buffer: &'b [u8],
    pub history: &'b [u8],
    /// Whether `buffer` is the final buffer of the stream.
    pub last: bool,
}

/// Result of looking up an absolute offset.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ByteAt {
    /// Before the retained history.
    Unavailable,
    Byte(u8),
    /// At or past the end of the current buffer.
    Future,
}

impl<'b> Stream<'b> {
    /// A complete block: one buffer with no history.
    pub fn block(buffer: &'b [u8]) -> Self {
        Self {
            buf_offset: 0,
            buffer,
            history: &[],
            last: true,
        }
    }

    pub fn new(buf_offset: u64, buffer: &'b [u8], history: &'b [u8], last: bool) -> Self {
        Self {
            buf_offset,
            buffer,
            history,
            last,
        }
    }

    /// Absolute offset one past the last byte of the buffer.
    pub fn buffer_end(&self) -> u64 {
        self.buf_offset + self.buffer.len() as u64
    }

    /// Whether a match ending at `end` ends the data.
    pub fn is_eod(&self, end: u64) -> bool {
        self.last && end == self.buffer_end()
    }

    /// Look up the byte at absolute offset `pos`.
    pub fn byte_at(&self, pos: i64) -> ByteAt {
        if pos < 0 {
            return ByteAt::Unavailable;
        }
        let pos = pos as u64;
        if pos >= self.buffer_end() {
            return ByteAt::Future;
        }
        if pos >= self.buf_offset {
            return ByteAt::Byte(self.buffer[(pos - self.buf_offset) as usize]);
        }
        let back = (self.buf_offset - pos) as usize;
        match self.history.len().checked_sub(back) {
            Some(idx) => ByteAt::Byte(self.history[idx]),
            None => ByteAt::Unavailable,
        }
    }
}
