/// Capacity of a single inbound read.
pub const CAPACITY: usize = 1024;

const NUL: u8 = b'\0';

/// A fixed single-chunk input buffer holding exactly one network read.
///
/// It is not a growable stream: a protocol value whose encoding exceeds [`CAPACITY`] bytes, or
/// that spans two reads, is not supported. Reads past the end yield truncated or NUL-derived
/// data instead of an error.
pub struct ReadBuffer {
    buf: [u8; CAPACITY],
    cursor: usize,
}

impl ReadBuffer {
    pub fn new() -> ReadBuffer {
        ReadBuffer {
            buf: [NUL; CAPACITY],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Hands out the whole chunk to be filled by one read call and rewinds the cursor.
    ///
    /// Leftovers from the previous read are cleared so that bytes past the end of a short read
    /// decode as NUL.
    pub fn write_into(&mut self) -> &mut [u8] {
        self.cursor = 0;
        self.buf.fill(NUL);
        &mut self.buf[..]
    }

    #[cfg(test)]
    fn position(&self) -> usize {
        self.cursor
    }

    /// Whether the cursor reached the end of the chunk. Every further read yields NUL.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= CAPACITY
    }

    /// Returns the next byte, or NUL once the cursor reached the end of the chunk.
    pub fn read_char(&mut self) -> u8 {
        if self.cursor < CAPACITY {
            let byte = self.buf[self.cursor];
            self.cursor += 1;
            byte
        } else {
            NUL
        }
    }

    /// Reads up to the next line feed, NUL byte or the end of the chunk, whichever comes first.
    /// The terminator is consumed but not returned, and carriage returns are dropped.
    pub fn read_line(&mut self) -> Vec<u8> {
        let mut line = Vec::new();

        while self.cursor < CAPACITY {
            let byte = self.buf[self.cursor];
            self.cursor += 1;

            match byte {
                NUL | b'\n' => break,
                b'\r' => {}
                byte => line.push(byte),
            }
        }

        line
    }

    /// Reads `n` bytes, clamped to the end of the chunk.
    pub fn read_exact(&mut self, n: usize) -> Vec<u8> {
        let start = self.cursor.min(CAPACITY);
        let end = start.saturating_add(n).min(CAPACITY);
        self.cursor = end;

        self.buf[start..end].to_vec()
    }

    pub fn skip(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_add(n);
    }
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&[u8]> for ReadBuffer {
    /// Builds a buffer as if `data` had been received by a single read. Anything beyond
    /// [`CAPACITY`] is dropped, like it would be by the socket read.
    fn from(data: &[u8]) -> Self {
        let mut buffer = ReadBuffer::new();
        let len = data.len().min(CAPACITY);
        buffer.write_into()[..len].copy_from_slice(&data[..len]);
        buffer
    }
}
