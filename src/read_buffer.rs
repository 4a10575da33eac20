use std::io::Read;

use crate::errors::CaptureError;

/// Number of bytes pulled from the source per refill.
const CHUNK_SIZE: usize = 64 * 1024;

/// Buffers a [`Read`] source so that slice parsers can be retried until
/// enough bytes are available.
#[derive(Debug)]
pub(crate) struct ReadBuffer<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    pos: usize,
}

impl<R: Read> ReadBuffer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(CHUNK_SIZE),
            pos: 0,
        }
    }

    /// Pulls one more chunk from the source into the buffer.
    ///
    /// Returns the number of bytes read, 0 meaning end of stream.
    fn fill_buf(&mut self) -> Result<usize, std::io::Error> {
        // Drop the already consumed front of the buffer
        self.buffer.drain(..self.pos);
        self.pos = 0;

        let old_len = self.buffer.len();
        self.buffer.resize(old_len + CHUNK_SIZE, 0);

        match self.reader.read(&mut self.buffer[old_len..]) {
            Ok(nb_read) => {
                self.buffer.truncate(old_len + nb_read);
                Ok(nb_read)
            },
            Err(e) => {
                self.buffer.truncate(old_len);
                Err(e)
            },
        }
    }

    fn buffer(&self) -> &[u8] {
        &self.buffer[self.pos..]
    }

    /// Runs a slice parser over the buffered bytes, refilling the buffer as
    /// long as the parser reports [`CaptureError::IncompleteBuffer`].
    ///
    /// The parser returns the number of bytes it consumed together with its
    /// output; the buffer is only advanced on success. An end of stream while
    /// the parser still wants more bytes becomes [`CaptureError::Truncated`].
    pub fn parse_with<O, F>(&mut self, mut parser: F) -> Result<O, CaptureError>
    where
        F: FnMut(&[u8]) -> Result<(usize, O), CaptureError>,
    {
        loop {
            match parser(&self.buffer[self.pos..]) {
                Ok((consumed, value)) => {
                    debug_assert!(self.pos + consumed <= self.buffer.len());
                    self.pos += consumed;
                    return Ok(value);
                },

                Err(CaptureError::IncompleteBuffer(needed)) => {
                    let nb_read = self.fill_buf().map_err(CaptureError::ReadFailed)?;
                    if nb_read == 0 {
                        return Err(CaptureError::Truncated(needed));
                    }
                },

                Err(e) => return Err(e),
            }
        }
    }

    /// Returns false once the buffer and the underlying source are both exhausted.
    pub fn has_data_left(&mut self) -> Result<bool, std::io::Error> {
        // The buffer can be empty while the reader still has data
        if self.buffer().is_empty() {
            let nb_read = self.fill_buf()?;
            if nb_read == 0 {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Consumes the buffer, returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Gets a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }
}
