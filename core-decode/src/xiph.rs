//! # Xiph Extradata Framing
//!
//! Xiph codecs ship their header packets concatenated into one
//! extradata blob with length lacing: the first byte is the header
//! count minus one, followed by the laced lengths of every header but
//! the last (each length is a run of `0xFF` bytes plus one terminator
//! byte below `0xFF`, summed), followed by the header payloads. The
//! last header takes whatever bytes remain.

/// Split a Xiph-laced extradata blob into its header packets.
///
/// Returns `None` if the lacing is truncated or the declared lengths
/// overrun the payload.
pub fn extradata_to_headers(extradata: &[u8]) -> Option<Vec<&[u8]>> {
    let (&count_minus_one, mut rest) = extradata.split_first()?;
    let header_count = count_minus_one as usize + 1;

    let mut lengths = Vec::with_capacity(header_count);
    let mut laced_total = 0usize;
    for _ in 0..header_count - 1 {
        let mut length = 0usize;
        loop {
            let (&byte, tail) = rest.split_first()?;
            rest = tail;
            length += byte as usize;
            if byte != 0xFF {
                break;
            }
        }
        laced_total += length;
        lengths.push(length);
    }

    if laced_total > rest.len() {
        return None;
    }
    lengths.push(rest.len() - laced_total);

    let mut headers = Vec::with_capacity(header_count);
    for length in lengths {
        let (header, tail) = rest.split_at(length);
        headers.push(header);
        rest = tail;
    }
    Some(headers)
}

/// Concatenate header packets into a Xiph-laced extradata blob.
///
/// Returns `None` for zero headers, more than 256 headers, or when a
/// non-final header is too long for its lacing to stay addressable.
pub fn headers_to_extradata(headers: &[&[u8]]) -> Option<Vec<u8>> {
    if headers.is_empty() || headers.len() > 256 {
        return None;
    }

    let mut blob = vec![(headers.len() - 1) as u8];
    for header in &headers[..headers.len() - 1] {
        let full_laces = header.len() / 0xFF;
        // Each laced length must terminate; cap keeps the blob sane.
        if full_laces > u16::MAX as usize {
            return None;
        }
        blob.extend(std::iter::repeat(0xFF).take(full_laces));
        blob.push((header.len() % 0xFF) as u8);
    }
    for header in headers {
        blob.extend_from_slice(header);
    }
    Some(blob)
}
