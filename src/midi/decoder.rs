use super::{
    parse_channel_message, parse_meta, vlq, ChannelMessageTag, DecodeError, DecodeErrorKind,
    Event, EventKind, META_STATUS,
};
use crate::track::{Division, Track};

use log::{debug, warn};
use nom::bytes::complete::take;
use nom::error::{ErrorKind, ParseError};
use nom::number::complete::{be_u16, be_u32, be_u8};
use std::num::NonZeroU16;

/// nom error carrying the position and reason of a decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmfError<'a> {
    pub input: &'a [u8],
    pub kind: DecodeErrorKind,
}

impl<'a> SmfError<'a> {
    pub const fn new(input: &'a [u8], kind: DecodeErrorKind) -> Self {
        Self { input, kind }
    }
}

impl<'a> ParseError<&'a [u8]> for SmfError<'a> {
    fn from_error_kind(input: &'a [u8], _kind: ErrorKind) -> Self {
        // The byte-level combinators only fail when they run out of data.
        SmfError::new(input, DecodeErrorKind::UnexpectedEof)
    }
    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

pub type SmfResult<'a, T> = nom::IResult<&'a [u8], T, SmfError<'a>>;

fn fail<T>(input: &[u8], kind: DecodeErrorKind) -> SmfResult<'_, T> {
    Err(nom::Err::Failure(SmfError::new(input, kind)))
}

fn byte(input: &[u8]) -> SmfResult<'_, u8> {
    be_u8(input)
}

fn word(input: &[u8]) -> SmfResult<'_, u16> {
    be_u16(input)
}

fn dword(input: &[u8]) -> SmfResult<'_, u32> {
    be_u32(input)
}

fn bytes(input: &[u8], count: usize) -> SmfResult<'_, &[u8]> {
    take(count)(input)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Format {
    /// Format 0: a single multi-channel track.
    SingleTrack,
    /// Format 1: simultaneous tracks sharing one tempo map.
    Parallel,
    /// Format 2: independent sequences.
    Sequential,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Header {
    pub format: Format,
    pub track_count: u16,
    pub division: Division,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MidiFile {
    pub header: Header,
    pub tracks: Vec<Track>,
}

fn chunk(input: &[u8]) -> SmfResult<'_, ([u8; 4], &[u8])> {
    let (input, tag) = bytes(input, 4)?;
    let (input, len) = dword(input)?;
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    let (input, body) = bytes(input, len)?;
    let mut id = [0u8; 4];
    id.copy_from_slice(tag);
    Ok((input, (id, body)))
}

fn parse_header(body: &[u8]) -> SmfResult<'_, Header> {
    if body.len() < 6 {
        return fail(body, DecodeErrorKind::ShortHeader(body.len()));
    }
    let (rest, raw_format) = word(body)?;
    let format = match raw_format {
        0 => Format::SingleTrack,
        1 => Format::Parallel,
        2 => Format::Sequential,
        other => return fail(body, DecodeErrorKind::InvalidFormat(other)),
    };
    let (rest, track_count) = word(rest)?;
    if format == Format::SingleTrack && track_count > 1 {
        return fail(body, DecodeErrorKind::MultiTrackFormat0(track_count));
    }
    let division_start = rest;
    let (rest, raw_division) = word(rest)?;
    let division = if raw_division & 0x8000 != 0 {
        // SMPTE: the high byte is the negated frame rate.
        let frames_per_second = ((raw_division >> 8) as u8 as i8).wrapping_neg() as u8;
        let ticks_per_frame = (raw_division & 0xFF) as u8;
        match frames_per_second {
            24 | 25 | 29 | 30 if ticks_per_frame > 0 => Division::Timecode {
                frames_per_second,
                ticks_per_frame,
            },
            _ => return fail(division_start, DecodeErrorKind::InvalidDivision(raw_division)),
        }
    } else {
        match NonZeroU16::new(raw_division) {
            Some(ticks_per_quarter) => Division::Metrical { ticks_per_quarter },
            None => return fail(division_start, DecodeErrorKind::InvalidDivision(raw_division)),
        }
    };
    if !rest.is_empty() {
        debug!("Skipping {} extra header bytes", rest.len());
    }
    Ok((
        &rest[rest.len()..],
        Header {
            format,
            track_count,
            division,
        },
    ))
}

fn track_event(input: &[u8]) -> SmfResult<'_, Option<EventKind>> {
    let (rest, status) = byte(input)?;
    if status == META_STATUS {
        let (rest, meta_type) = byte(rest)?;
        let (rest, len) = vlq(rest)?;
        let (rest, payload) = bytes(rest, usize::try_from(len).unwrap_or(usize::MAX))?;
        return Ok((rest, parse_meta(meta_type, payload)));
    }
    let tag = match ChannelMessageTag::from_status(status) {
        Some(tag) => tag,
        None => return fail(input, DecodeErrorKind::InvalidStatus(status)),
    };
    let (rest, data) = bytes(rest, tag.data_len())?;
    match parse_channel_message(status, data) {
        Ok(kind) => Ok((rest, kind)),
        Err(kind) => fail(data, kind),
    }
}

fn parse_track(body: &[u8]) -> SmfResult<'_, Track> {
    let mut track = Track::new();
    let mut tick = 0u64;
    let mut input = body;
    while !input.is_empty() {
        let (rest, delta) = vlq(input)?;
        tick = match tick.checked_add(delta) {
            Some(tick) => tick,
            None => return fail(input, DecodeErrorKind::VlqOverflow),
        };
        let (rest, kind) = track_event(rest)?;
        input = rest;
        if let Some(kind) = kind {
            let finished = kind == EventKind::EndOfTrack;
            track.add_event(Event::new(tick, kind));
            if finished {
                break;
            }
        }
    }
    if !input.is_empty() {
        debug!("Ignoring {} bytes after end of track", input.len());
    }
    Ok((&input[input.len()..], track))
}

fn offset_of(data: &[u8], at: &[u8]) -> usize {
    (at.as_ptr() as usize).saturating_sub(data.as_ptr() as usize)
}

fn owned_error(data: &[u8], err: nom::Err<SmfError<'_>>) -> DecodeError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            DecodeError::new(offset_of(data, e.input), e.kind)
        }
        nom::Err::Incomplete(_) => DecodeError::new(data.len(), DecodeErrorKind::UnexpectedEof),
    }
}

/// Decodes a complete Standard MIDI File.
pub fn decode(data: &[u8]) -> Result<MidiFile, DecodeError> {
    let mut header: Option<Header> = None;
    let mut tracks = Vec::new();
    let mut input = data;
    while !input.is_empty() {
        let chunk_start = offset_of(data, input);
        let (rest, (tag, body)) = chunk(input).map_err(|e| owned_error(data, e))?;
        match &tag {
            b"MThd" => {
                if header.is_some() {
                    return Err(DecodeError::new(
                        chunk_start,
                        DecodeErrorKind::DuplicateHeader,
                    ));
                }
                let (_, parsed) = parse_header(body).map_err(|e| owned_error(data, e))?;
                header = Some(parsed);
            }
            b"MTrk" => {
                let format = match &header {
                    Some(h) => h.format,
                    None => {
                        return Err(DecodeError::new(
                            chunk_start,
                            DecodeErrorKind::TrackBeforeHeader,
                        ))
                    }
                };
                if format == Format::SingleTrack && !tracks.is_empty() {
                    let found = u16::try_from(tracks.len() + 1).unwrap_or(u16::MAX);
                    return Err(DecodeError::new(
                        chunk_start,
                        DecodeErrorKind::MultiTrackFormat0(found),
                    ));
                }
                let (_, track) = parse_track(body).map_err(|e| owned_error(data, e))?;
                tracks.push(track);
            }
            other => debug!(
                "Skipping unknown chunk {:?} ({} bytes)",
                String::from_utf8_lossy(other),
                body.len()
            ),
        }
        input = rest;
    }
    let header = header.ok_or(DecodeError::new(0, DecodeErrorKind::MissingHeader))?;
    if usize::from(header.track_count) != tracks.len() {
        warn!(
            "Header declares {} tracks but {} were found",
            header.track_count,
            tracks.len()
        );
    }
    Ok(MidiFile { header, tracks })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::midi::encode_vlq;

    pub(crate) fn header_chunk(format: u16, tracks: u16, division: u16) -> Vec<u8> {
        let mut out = b"MThd".to_vec();
        out.extend_from_slice(&6u32.to_be_bytes());
        out.extend_from_slice(&format.to_be_bytes());
        out.extend_from_slice(&tracks.to_be_bytes());
        out.extend_from_slice(&division.to_be_bytes());
        out
    }

    /// Builds an MTrk chunk from `(delta, raw event bytes)` pairs.
    pub(crate) fn track_chunk(events: &[(u64, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (delta, raw) in events {
            body.extend(encode_vlq(*delta));
            body.extend_from_slice(raw);
        }
        let mut out = b"MTrk".to_vec();
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend(body);
        out
    }

    pub(crate) fn two_track_file() -> Vec<u8> {
        let mut data = header_chunk(1, 2, 480);
        data.extend(track_chunk(&[
            (0, &[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]),
            (0, &[0xFF, 0x2F, 0x00]),
        ]));
        data.extend(track_chunk(&[
            (0, &[0x90, 60, 100]),
            (480, &[0x80, 60, 0]),
            (0, &[0xFF, 0x2F, 0x00]),
        ]));
        data
    }

    #[test]
    fn test_decode_two_tracks() {
        let file = decode(&two_track_file()).unwrap();
        assert_eq!(Format::Parallel, file.header.format);
        assert_eq!(2, file.header.track_count);
        assert_eq!(
            Division::Metrical {
                ticks_per_quarter: NonZeroU16::new(480).unwrap()
            },
            file.header.division
        );
        assert_eq!(2, file.tracks.len());
        let notes: Vec<_> = file.tracks[1].iter().map(|e| e.tick).collect();
        assert_eq!(vec![0, 480, 480], notes);
        assert_eq!(Some(480), file.tracks[1].last_tick());
    }

    #[test]
    fn test_smpte_division() {
        // -25 fps, 40 ticks per frame.
        let mut data = header_chunk(0, 1, 0xE728);
        data.extend(track_chunk(&[(0, &[0xFF, 0x2F, 0x00])]));
        let file = decode(&data).unwrap();
        assert_eq!(
            Division::Timecode {
                frames_per_second: 25,
                ticks_per_frame: 40
            },
            file.header.division
        );
    }

    #[test]
    fn test_unknown_chunks_and_events_skipped() {
        let mut data = header_chunk(0, 1, 96);
        data.extend_from_slice(b"XFIH");
        data.extend_from_slice(&3u32.to_be_bytes());
        data.extend_from_slice(&[1, 2, 3]);
        data.extend(track_chunk(&[
            (0, &[0xA0, 60, 10]),
            (0, &[0xFF, 0x7F, 0x02, 0xAA, 0xBB]),
            (10, &[0x90, 61, 0]),
            (0, &[0xFF, 0x2F, 0x00]),
            (0, &[0x90, 62, 1]),
        ]));
        let file = decode(&data).unwrap();
        let kinds: Vec<_> = file.tracks[0].iter().map(|e| e.kind.clone()).collect();
        assert_eq!(2, kinds.len());
        assert!(matches!(kinds[0], EventKind::NoteOff(_)));
        assert_eq!(EventKind::EndOfTrack, kinds[1]);
    }

    #[test]
    fn test_structural_errors() {
        let err = decode(&track_chunk(&[])).unwrap_err();
        assert_eq!(DecodeErrorKind::TrackBeforeHeader, err.kind);
        assert_eq!(0, err.offset);

        let err = decode(&header_chunk(3, 1, 96)).unwrap_err();
        assert_eq!(DecodeErrorKind::InvalidFormat(3), err.kind);
        assert_eq!(8, err.offset);

        let err = decode(&header_chunk(0, 2, 96)).unwrap_err();
        assert_eq!(DecodeErrorKind::MultiTrackFormat0(2), err.kind);

        // The header claims one track, but a second chunk follows.
        let eot: &[u8] = &[0xFF, 0x2F, 0x00];
        let mut extra = header_chunk(0, 1, 96);
        let first = track_chunk(&[(0, eot)]);
        let second_at = extra.len() + first.len();
        extra.extend(first);
        extra.extend(track_chunk(&[(0, eot)]));
        let err = decode(&extra).unwrap_err();
        assert_eq!(DecodeErrorKind::MultiTrackFormat0(2), err.kind);
        assert_eq!(second_at, err.offset);

        let mut twice = header_chunk(0, 1, 96);
        twice.extend(header_chunk(0, 1, 96));
        let err = decode(&twice).unwrap_err();
        assert_eq!(DecodeErrorKind::DuplicateHeader, err.kind);
        assert_eq!(14, err.offset);

        let err = decode(&[]).unwrap_err();
        assert_eq!(DecodeErrorKind::MissingHeader, err.kind);

        let mut short = b"MThd".to_vec();
        short.extend_from_slice(&4u32.to_be_bytes());
        short.extend_from_slice(&[0, 0, 0, 1]);
        assert_eq!(DecodeErrorKind::ShortHeader(4), decode(&short).unwrap_err().kind);
    }

    #[test]
    fn test_truncated_chunk() {
        let mut data = header_chunk(0, 1, 96);
        data.extend_from_slice(b"MTrk");
        data.extend_from_slice(&100u32.to_be_bytes());
        data.extend_from_slice(&[0, 0x90, 60, 100]);
        let err = decode(&data).unwrap_err();
        assert_eq!(DecodeErrorKind::UnexpectedEof, err.kind);
    }

    #[test]
    fn test_bad_status_is_fatal() {
        let mut data = header_chunk(0, 1, 96);
        // A running-status data byte where a status byte is required.
        data.extend(track_chunk(&[(0, &[0x90, 60, 100]), (0, &[61, 100])]));
        let err = decode(&data).unwrap_err();
        assert_eq!(DecodeErrorKind::InvalidStatus(61), err.kind);
        assert_eq!(14 + 8 + 4 + 1, err.offset);

        let mut data = header_chunk(0, 1, 96);
        data.extend(track_chunk(&[(0, &[0x90, 0x80, 100])]));
        let err = decode(&data).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::OutOfRange { .. }));
    }
}
