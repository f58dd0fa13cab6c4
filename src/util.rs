use embedded_can::{Frame, Id, StandardId};

use crate::error::ErrorCode;
use crate::prelude::Debug;

/// X31 string hash, the handle of a task configuration.
///
/// Bytes are widened as signed chars, so configurations containing non-ASCII
/// text hash to the same value the drive tooling has always reported.
pub fn config_hash(config: &str) -> i32 {
    let mut bytes = config.bytes().map(|b| b as i8 as u32);
    let mut h = match bytes.next() {
        Some(first) => first,
        None => return 0,
    };
    if h != 0 {
        for b in bytes {
            h = (h << 5).wrapping_sub(h).wrapping_add(b);
        }
    }
    h as i32
}

/// Reads a node id the way `strtoul(s, NULL, 0)` does: optional sign, `0x`
/// for hex, a leading `0` for octal, decimal otherwise. Parsing stops at the
/// first character that is not a digit of the detected radix; no digits at
/// all gives 0.
pub fn parse_node_id(s: &str) -> u32 {
    let s = s.trim_start_matches(|c: char| c == ' ' || ('\t'..='\r').contains(&c));
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let bytes = s.as_bytes();
    let (radix, digits) = if bytes.len() > 2
        && bytes[0] == b'0'
        && (bytes[1] == b'x' || bytes[1] == b'X')
        && (bytes[2] as char).is_ascii_hexdigit()
    {
        (16, &s[2..])
    } else if bytes.first() == Some(&b'0') {
        (8, s)
    } else {
        (10, s)
    };

    let value = digits
        .chars()
        .map_while(|c| c.to_digit(radix))
        .fold(0u32, |acc, d| acc.saturating_mul(radix).saturating_add(d));

    if negative { value.wrapping_neg() } else { value }
}

pub fn get_cob_id<F: Frame>(frame: &F) -> Option<u16> {
    if let Id::Standard(sid) = frame.id() {
        return Some(sid.as_raw());
    }
    // No standard id. We only support CAN 2.0a in current version.
    None
}

pub fn create_frame<F: Frame + Debug>(cob_id: u16, data: &[u8]) -> Result<F, ErrorCode> {
    F::new(StandardId::new(cob_id).ok_or(ErrorCode::InvalidStandardId { cob_id })?, data)
        .ok_or(ErrorCode::FrameCreationFailed { data: data.to_vec() })
}

/// Copies up to 8 bytes of `data`, zero padding the rest.
pub fn to_payload(data: &[u8]) -> [u8; 8] {
    let mut payload = [0u8; 8];
    let len = data.len().min(8);
    payload[..len].copy_from_slice(&data[..len]);
    payload
}
