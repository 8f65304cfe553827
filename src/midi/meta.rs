use super::EventKind;
use log::{debug, warn};

pub const META_STATUS: u8 = 0xFF;

const SEQUENCE_NUMBER: u8 = 0x00;
const END_OF_TRACK: u8 = 0x2F;
const SET_TEMPO: u8 = 0x51;
const TIME_SIGNATURE: u8 = 0x58;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextKind {
    Text,
    Copyright,
    TrackName,
    InstrumentName,
    Lyric,
    Marker,
    CuePoint,
}

impl TextKind {
    pub const fn from_meta_type(meta_type: u8) -> Option<Self> {
        match meta_type {
            0x01 => Some(TextKind::Text),
            0x02 => Some(TextKind::Copyright),
            0x03 => Some(TextKind::TrackName),
            0x04 => Some(TextKind::InstrumentName),
            0x05 => Some(TextKind::Lyric),
            0x06 => Some(TextKind::Marker),
            0x07 => Some(TextKind::CuePoint),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TimeSignature {
    pub numerator: u8,
    /// The denominator as a power of 2, so `3` means eighth notes.
    pub denominator_pow2: u8,
    pub clocks_per_click: u8,
    pub thirty_seconds_per_quarter: u8,
}

impl TimeSignature {
    pub fn denominator(&self) -> u32 {
        1u32.checked_shl(u32::from(self.denominator_pow2)).unwrap_or(0)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature {
            numerator: 4,
            denominator_pow2: 2,
            clocks_per_click: 24,
            thirty_seconds_per_quarter: 8,
        }
    }
}

fn expect_len(meta_type: u8, payload: &[u8], len: usize) -> bool {
    if payload.len() == len {
        true
    } else {
        warn!(
            "Ignoring meta event {:#04x}: expected {} payload bytes, found {}",
            meta_type,
            len,
            payload.len()
        );
        false
    }
}

/// Interprets a meta event whose payload has already been framed.
pub fn parse_meta(meta_type: u8, payload: &[u8]) -> Option<EventKind> {
    match meta_type {
        SEQUENCE_NUMBER => None,
        END_OF_TRACK => {
            if !payload.is_empty() {
                warn!(
                    "End of track carries {} unexpected payload bytes",
                    payload.len()
                );
            }
            Some(EventKind::EndOfTrack)
        }
        SET_TEMPO => {
            if !expect_len(meta_type, payload, 3) {
                return None;
            }
            let micros_per_quarter =
                u32::from_be_bytes([0, payload[0], payload[1], payload[2]]);
            Some(EventKind::SetTempo { micros_per_quarter })
        }
        TIME_SIGNATURE => {
            if !expect_len(meta_type, payload, 4) {
                return None;
            }
            Some(EventKind::TimeSignature(TimeSignature {
                numerator: payload[0],
                denominator_pow2: payload[1],
                clocks_per_click: payload[2],
                thirty_seconds_per_quarter: payload[3],
            }))
        }
        other => match TextKind::from_meta_type(other) {
            Some(kind) => Some(EventKind::Text {
                kind,
                bytes: payload.to_vec(),
            }),
            None => {
                debug!(
                    "Skipping meta event {:#04x} ({} bytes)",
                    other,
                    payload.len()
                );
                None
            }
        },
    }
}
