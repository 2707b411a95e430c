//! CBOR output record
//!
//! Each completed retrieval sequence is serialised as a three-element
//! CBOR array `[alert_level, title, message]` with the text attributes
//! as byte strings, and handed to a [`RecordSink`].

use crate::config::sequencer::MAX_RECORD_SIZE;
use heapless::Vec;
use minicbor::encode::write::{Cursor, EndOfSlice};
use minicbor::Encoder;

/// A serialised output record
pub type RecordBuffer = Vec<u8, MAX_RECORD_SIZE>;

/// Errors raised while serialising a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// The record does not fit the output buffer
    Overflow,
}

/// Consumer of completed records.
///
/// Delivery is synchronous; implementations queue or forward the bytes
/// and must not block.
pub trait RecordSink {
    fn deliver(&mut self, record: &[u8]);
}

/// Serialise one output record.
pub fn encode_record(
    alert_level: u8,
    title: &[u8],
    message: &[u8],
) -> Result<RecordBuffer, RecordError> {
    let mut scratch = [0u8; MAX_RECORD_SIZE];
    let written = serialise(&mut scratch, alert_level, title, message)
        .map_err(|_| RecordError::Overflow)?;

    let mut record = RecordBuffer::new();
    record
        .extend_from_slice(&scratch[..written])
        .map_err(|_| RecordError::Overflow)?;
    Ok(record)
}

fn serialise(
    buffer: &mut [u8],
    alert_level: u8,
    title: &[u8],
    message: &[u8],
) -> Result<usize, minicbor::encode::Error<EndOfSlice>> {
    let mut encoder = Encoder::new(Cursor::new(buffer));
    encoder
        .array(3)?
        .u8(alert_level)?
        .bytes(title)?
        .bytes(message)?;
    Ok(encoder.writer().position())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_short_record() {
        let record = encode_record(1, b"Hi", b"Yo").unwrap();

        // array(3), unsigned 1, bytes(2) x2
        assert_eq!(
            record.as_slice(),
            &[0x83, 0x01, 0x42, b'H', b'i', 0x42, b'Y', b'o']
        );
    }

    #[test]
    fn test_encode_empty_attributes() {
        let record = encode_record(1, b"", b"").unwrap();
        assert_eq!(record.as_slice(), &[0x83, 0x01, 0x40, 0x40]);
    }

    #[test]
    fn test_encode_long_attributes_use_extended_length() {
        let title = [b'a'; 110];
        let message = [b'b'; 110];

        let record = encode_record(1, &title, &message).unwrap();

        // bytes(110) takes the one-byte extended length form
        assert_eq!(record[0], 0x83);
        assert_eq!(record[1], 0x01);
        assert_eq!(record[2], 0x58);
        assert_eq!(record[3], 110);
        assert_eq!(&record[4..114], &title);
        assert_eq!(record[114], 0x58);
        assert_eq!(record[115], 110);
        assert_eq!(&record[116..226], &message);
        assert_eq!(record.len(), 226);
    }

    #[test]
    fn test_oversized_record_rejected() {
        let title = [b'a'; 200];
        let message = [b'b'; 200];

        assert_eq!(encode_record(1, &title, &message), Err(RecordError::Overflow));
    }
}
