/// Size of the line buffer, one slot is reserved for the terminator.
pub const LINE_BUFFER_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Incomplete,
    LineComplete(Vec<u8>),
    Overflow,
}

/// Reassembles device lines from single bytes.
///
/// The device terminates every line with CR LF. When the LF arrives the
/// line is complete and both the LF and the byte before it are stripped.
/// A line that does not fit into [`LINE_BUFFER_CAPACITY`] - 1 bytes is
/// reported once as [`LineEvent::Overflow`]; the rest of it is dropped up
/// to and including the next LF. That LF does not produce a
/// [`LineEvent::LineComplete`], every other LF produces exactly one.
///
/// Lines are handed out as raw bytes, the device gives no guarantee that
/// they are valid UTF-8.
#[derive(Debug)]
pub struct LineAssembler {
    buf: [u8; LINE_BUFFER_CAPACITY],
    len: usize,
    overflowed: bool,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_BUFFER_CAPACITY],
            len: 0,
            overflowed: false,
        }
    }

    pub fn feed(&mut self, byte: u8) -> LineEvent {
        if self.overflowed {
            if byte == b'\n' {
                self.overflowed = false;
            }
            return LineEvent::Incomplete;
        }

        if byte == b'\n' {
            let end = self.len.saturating_sub(1);
            let line = self.buf[..end].to_vec();
            self.len = 0;
            return LineEvent::LineComplete(line);
        }

        if self.len >= LINE_BUFFER_CAPACITY - 1 {
            self.len = 0;
            self.overflowed = true;
            return LineEvent::Overflow;
        }

        self.buf[self.len] = byte;
        self.len += 1;
        LineEvent::Incomplete
    }

    /// Drop any partially assembled line.
    pub fn reset(&mut self) {
        self.len = 0;
        self.overflowed = false;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}
