use log::warn;

use crate::{FramingError, Result, IFIT_LOG_PREFIX};

/// Marker byte opening the header chunk of every message.
pub const HEADER_MARKER: u8 = 0xfe;
/// Fixed tag in the second byte of the header chunk.
pub const HEADER_TAG: u8 = 0x02;
/// Index marking the final payload chunk of a message.
pub const EOF_INDEX: u8 = 0xff;
/// Maximum bytes per GATT write.
///
/// The protocol always chunks at the legacy 20-byte MTU, whatever the BLE
/// stack negotiated.
pub const MAX_CHUNK: usize = 20;
/// Data bytes carried per payload chunk.
pub const CHUNK_DATA: usize = MAX_CHUNK - 2;
/// Longest frame representable in the header's one-byte length field.
pub const MAX_FRAME: usize = u8::MAX as usize;

/// Split an encoded frame into GATT-sized writes.
///
/// Emits a 4-byte header chunk `FE 02 LL NN` (`LL` the total frame length,
/// `NN` the chunk count including the header) followed by payload chunks
/// `II LL <data>`. Payload chunks are indexed from zero, except the final one
/// which always carries the [EOF_INDEX] marker, whatever its ordinal.
pub fn chunk(frame: &[u8]) -> Result<Vec<Vec<u8>>> {
    if frame.is_empty() {
        return Err(FramingError::ChunkTooShort(0).into());
    }
    if frame.len() > MAX_FRAME {
        return Err(FramingError::EnvelopeTooLong(frame.len()).into());
    }

    let data_chunks = (frame.len() + CHUNK_DATA - 1) / CHUNK_DATA;
    let mut chunks = Vec::with_capacity(data_chunks + 1);

    chunks.push(vec![
        HEADER_MARKER,
        HEADER_TAG,
        frame.len() as u8,
        (data_chunks + 1) as u8,
    ]);

    for (ordinal, data) in frame.chunks(CHUNK_DATA).enumerate() {
        let index = if ordinal == data_chunks - 1 {
            EOF_INDEX
        } else {
            ordinal as u8
        };

        let mut c = Vec::with_capacity(2 + data.len());
        c.push(index);
        c.push(data.len() as u8);
        c.extend_from_slice(data);
        chunks.push(c);
    }

    Ok(chunks)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Header {
    frame_len: usize,
    data_chunks: u8,
}

/// Reassembles inbound notifications into complete frames.
///
/// One buffer exists per direction; the session owns it exclusively. A new
/// header arriving mid-reassembly resets the buffer, tolerating device-side
/// retries. Every framing violation also resets the buffer so the next header
/// starts clean.
#[derive(Debug, Default)]
pub struct Reassembler {
    header: Option<Header>,
    ordinal: u8,
    buf: Vec<u8>,
}

impl Reassembler {
    /// Creates an empty [Reassembler].
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets whether a message is partially reassembled.
    pub fn in_progress(&self) -> bool {
        self.header.is_some()
    }

    /// Discards any partially reassembled message.
    pub fn reset(&mut self) {
        self.header = None;
        self.ordinal = 0;
        self.buf.clear();
    }

    /// Consume one inbound chunk.
    ///
    /// Returns the complete frame once the announced length is reached,
    /// `None` while more chunks are expected.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<Vec<u8>>> {
        if chunk.first() == Some(&HEADER_MARKER) {
            return self.start(chunk);
        }

        let Some(header) = self.header else {
            return Err(FramingError::UnexpectedChunk(chunk.first().copied().unwrap_or(0)).into());
        };

        if chunk.len() < 2 {
            self.reset();
            return Err(FramingError::ChunkTooShort(chunk.len()).into());
        }

        let expected = if self.ordinal == header.data_chunks.saturating_sub(1) {
            EOF_INDEX
        } else {
            self.ordinal
        };
        let got = chunk[0];
        if got != expected {
            self.reset();
            return Err(FramingError::ChunkOrderViolation { expected, got }.into());
        }

        let announced = chunk[1];
        if announced == 0 || announced as usize > CHUNK_DATA {
            self.reset();
            return Err(FramingError::ChunkLength(announced).into());
        }
        if chunk.len() - 2 != announced as usize {
            let got = chunk.len() - 2;
            self.reset();
            return Err(FramingError::TruncatedChunk { announced, got }.into());
        }

        self.buf.extend_from_slice(&chunk[2..]);
        self.ordinal = self.ordinal.saturating_add(1);

        if self.buf.len() > header.frame_len {
            let got = self.buf.len();
            self.reset();
            return Err(FramingError::Overflow {
                expected: header.frame_len,
                got,
            }
            .into());
        }

        if got == EOF_INDEX {
            if self.buf.len() < header.frame_len {
                let got = self.buf.len();
                self.reset();
                return Err(FramingError::Incomplete {
                    expected: header.frame_len,
                    got,
                }
                .into());
            }

            let frame = std::mem::take(&mut self.buf);
            self.reset();
            return Ok(Some(frame));
        }

        Ok(None)
    }

    fn start(&mut self, chunk: &[u8]) -> Result<Option<Vec<u8>>> {
        if self.in_progress() {
            warn!(
                "{IFIT_LOG_PREFIX}: new header after {} buffered byte(s), restarting reassembly",
                self.buf.len()
            );
        }
        self.reset();

        if chunk.len() < 4 {
            return Err(FramingError::ChunkTooShort(chunk.len()).into());
        }

        self.header = Some(Header {
            frame_len: chunk[2] as usize,
            data_chunks: chunk[3].saturating_sub(1),
        });

        Ok(None)
    }
}
