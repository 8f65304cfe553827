use super::{
    parse_channel_message, parse_meta, vlq_push, ChannelMessageTag, DecodeError,
    DecodeErrorKind, EventKind, META_STATUS,
};
use std::io::{self, Read};
use thiserror::*;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("device stream closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("MIDI decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Longest meta payload accepted from a live stream.
pub const MAX_STREAM_META_LEN: u64 = 1 << 16;

fn is_realtime(status: u8) -> bool {
    (0xF8..=0xFE).contains(&status)
}

/// Decodes events from a live byte stream, where messages arrive without
/// delta times.
pub struct StreamDecoder<R> {
    reader: R,
    consumed: usize,
}

impl<R: Read> StreamDecoder<R> {
    pub fn new(reader: R) -> Self {
        StreamDecoder {
            reader,
            consumed: 0,
        }
    }

    /// Number of bytes read from the stream so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    fn read_byte(&mut self) -> Result<u8, StreamError> {
        let mut buf = [0u8; 1];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => {
                self.consumed += 1;
                Ok(buf[0])
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(StreamError::Closed),
            Err(e) => Err(StreamError::Io(e)),
        }
    }

    /// Data bytes may be interleaved with real-time bytes.
    fn read_data(&mut self, count: usize) -> Result<Vec<u8>, StreamError> {
        let mut data = Vec::with_capacity(count);
        while data.len() < count {
            let b = self.read_byte()?;
            if !is_realtime(b) {
                data.push(b);
            }
        }
        Ok(data)
    }

    fn read_vlq(&mut self) -> Result<u64, StreamError> {
        let mut value = 0u64;
        loop {
            let b = self.read_byte()?;
            value = vlq_push(value, b).map_err(|kind| self.error(kind))?;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
    }

    fn error(&self, kind: DecodeErrorKind) -> StreamError {
        StreamError::Decode(DecodeError::new(self.consumed.saturating_sub(1), kind))
    }

    /// Reads the next message. `Ok(None)` means a message was consumed that
    /// produces no event.
    pub fn next_event(&mut self) -> Result<Option<EventKind>, StreamError> {
        let status = self.read_byte()?;
        if is_realtime(status) {
            return Ok(None);
        }
        if status == META_STATUS {
            let meta_type = self.read_byte()?;
            let len = self.read_vlq()?;
            if len > MAX_STREAM_META_LEN {
                return Err(self.error(DecodeErrorKind::OversizedMeta(len)));
            }
            let mut payload = Vec::new();
            let read = (&mut self.reader).take(len).read_to_end(&mut payload)?;
            self.consumed += read;
            if payload.len() as u64 != len {
                return Err(StreamError::Closed);
            }
            return Ok(parse_meta(meta_type, &payload));
        }
        let tag = ChannelMessageTag::from_status(status)
            .ok_or_else(|| self.error(DecodeErrorKind::InvalidStatus(status)))?;
        let data = self.read_data(tag.data_len())?;
        parse_channel_message(status, &data).map_err(|kind| self.error(kind))
    }
}
