use super::{DecodeErrorKind, SmfError, SmfResult};
use nom::number::complete::be_u8;

/// Shifts one VLQ byte into `value`, failing once the result no longer fits.
pub(crate) fn vlq_push(value: u64, byte: u8) -> Result<u64, DecodeErrorKind> {
    if value.leading_zeros() < 7 {
        return Err(DecodeErrorKind::VlqOverflow);
    }
    Ok((value << 7) | u64::from(byte & 0x7F))
}

fn byte(input: &[u8]) -> SmfResult<'_, u8> {
    be_u8(input)
}

/// Reads a variable-length quantity: 7 bits per byte, most significant group
/// first, high bit set on every byte but the last.
pub fn vlq(input: &[u8]) -> SmfResult<'_, u64> {
    let mut value = 0u64;
    let mut rest = input;
    loop {
        let (next, b) = byte(rest)?;
        value = vlq_push(value, b).map_err(|kind| nom::Err::Failure(SmfError::new(rest, kind)))?;
        rest = next;
        if b & 0x80 == 0 {
            return Ok((rest, value));
        }
    }
}

pub fn encode_vlq(value: u64) -> Vec<u8> {
    let mut groups = Vec::with_capacity(10);
    let mut remaining = value;
    groups.push((remaining & 0x7F) as u8);
    remaining >>= 7;
    while remaining > 0 {
        groups.push(0x80 | (remaining & 0x7F) as u8);
        remaining >>= 7;
    }
    groups.reverse();
    groups
}
