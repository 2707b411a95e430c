//! Fragment reassembly for data source responses
//!
//! GATT notifications are capped in payload size, so an attribute value
//! is delivered as a first fragment carrying a header with the total
//! length, followed by raw continuation fragments. The reassembler
//! accumulates them into one owned buffer which is handed off by move on
//! completion.

use crate::config::protocol::MAX_ATTRIBUTE_SIZE;
use heapless::Vec;

/// A fully reassembled attribute value
pub type AttributeBuffer = Vec<u8, MAX_ATTRIBUTE_SIZE>;

/// Errors raised by the reassembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyError {
    /// No transfer is pending; the operation is a sequencing bug in the
    /// caller, not a transport condition
    NoTransfer,
    /// The value does not fit the reassembly buffer
    Overflow,
}

/// Accumulates data source fragments into one attribute value.
///
/// At most one transfer is live at a time. The owner arms the
/// reassembler when it issues an attribute request, begins the transfer
/// on the first fragment and appends continuation fragments until
/// [`FragmentReassembler::is_complete`] reports true, then moves the
/// buffer out with [`FragmentReassembler::take`].
pub struct FragmentReassembler {
    buffer: AttributeBuffer,
    /// Total value length learned from the first fragment header;
    /// `None` until `begin` is called
    expected: Option<usize>,
    armed: bool,
}

impl FragmentReassembler {
    /// Create an idle reassembler with no pending transfer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            expected: None,
            armed: false,
        }
    }

    /// Arm the reassembler for the response to an attribute request.
    ///
    /// `max_length` is the length limit the request carried; values the
    /// buffer could never hold are rejected up front.
    pub fn arm(&mut self, max_length: u16) -> Result<(), ReassemblyError> {
        if max_length as usize > MAX_ATTRIBUTE_SIZE {
            return Err(ReassemblyError::Overflow);
        }

        self.buffer.clear();
        self.expected = None;
        self.armed = true;
        Ok(())
    }

    /// Start a transfer from the first fragment.
    ///
    /// Fails if no request armed the reassembler, or if the announced
    /// length exceeds the buffer capacity. A `begin` while a transfer is
    /// armed but not yet complete replaces the pending transfer.
    pub fn begin(&mut self, expected_length: u16, initial_chunk: &[u8]) -> Result<(), ReassemblyError> {
        if !self.armed {
            return Err(ReassemblyError::NoTransfer);
        }
        if expected_length as usize > MAX_ATTRIBUTE_SIZE {
            return Err(ReassemblyError::Overflow);
        }

        self.buffer.clear();
        self.buffer
            .extend_from_slice(initial_chunk)
            .map_err(|_| ReassemblyError::Overflow)?;
        self.expected = Some(expected_length as usize);
        Ok(())
    }

    /// Append a continuation fragment at the running offset.
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), ReassemblyError> {
        if self.expected.is_none() {
            return Err(ReassemblyError::NoTransfer);
        }

        self.buffer
            .extend_from_slice(chunk)
            .map_err(|_| ReassemblyError::Overflow)
    }

    /// Whether a transfer has started and all announced bytes arrived.
    ///
    /// Uses `>=` on purpose: an over-long final fragment is tolerated
    /// and the surplus discarded by [`FragmentReassembler::take`].
    pub fn is_complete(&self) -> bool {
        match self.expected {
            Some(expected) => self.buffer.len() >= expected,
            None => false,
        }
    }

    /// Whether a first fragment has been consumed and the transfer is
    /// still accumulating.
    pub fn is_pending(&self) -> bool {
        self.expected.is_some()
    }

    /// Move the reassembled value out, truncated to the announced
    /// length, and reset to idle.
    pub fn take(&mut self) -> Result<AttributeBuffer, ReassemblyError> {
        let expected = self.expected.ok_or(ReassemblyError::NoTransfer)?;

        let mut buffer = core::mem::take(&mut self.buffer);
        buffer.truncate(expected);

        self.expected = None;
        self.armed = false;
        Ok(buffer)
    }

    /// Discard any pending transfer (disconnect path).
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.expected = None;
        self.armed = false;
    }
}

impl Default for FragmentReassembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_fragment_transfer() {
        let mut reassembler = FragmentReassembler::new();

        reassembler.arm(110).unwrap();
        reassembler.begin(5, b"Hello").unwrap();
        assert!(reassembler.is_complete());

        let value = reassembler.take().unwrap();
        assert_eq!(value.as_slice(), b"Hello");

        // reassembler is idle again
        assert!(!reassembler.is_pending());
        assert_eq!(reassembler.take(), Err(ReassemblyError::NoTransfer));
    }

    #[test]
    fn test_multi_fragment_transfer() {
        let mut reassembler = FragmentReassembler::new();

        reassembler.arm(110).unwrap();
        reassembler.begin(10, b"Hell").unwrap();
        assert!(!reassembler.is_complete());

        reassembler.append(b"o Wo").unwrap();
        assert!(!reassembler.is_complete());

        reassembler.append(b"rld").unwrap();
        assert!(reassembler.is_complete());

        // over-long final fragment: truncated to the announced length
        let value = reassembler.take().unwrap();
        assert_eq!(value.as_slice(), b"Hello Worl");
    }

    #[test]
    fn test_exact_length_partitions() {
        let payload: [u8; 23] = *b"the quick brown fox jum";

        // every split point of the payload into two chunks
        for split in 0..payload.len() {
            let mut reassembler = FragmentReassembler::new();
            reassembler.arm(110).unwrap();
            reassembler
                .begin(payload.len() as u16, &payload[..split])
                .unwrap();
            reassembler.append(&payload[split..]).unwrap();

            assert!(reassembler.is_complete());
            assert_eq!(reassembler.take().unwrap().as_slice(), &payload);
        }
    }

    #[test]
    fn test_append_without_begin_fails() {
        let mut reassembler = FragmentReassembler::new();
        assert_eq!(reassembler.append(b"abc"), Err(ReassemblyError::NoTransfer));

        // armed but no first fragment yet
        reassembler.arm(110).unwrap();
        assert_eq!(reassembler.append(b"abc"), Err(ReassemblyError::NoTransfer));
    }

    #[test]
    fn test_begin_without_arm_fails() {
        let mut reassembler = FragmentReassembler::new();
        assert_eq!(
            reassembler.begin(4, b"abcd"),
            Err(ReassemblyError::NoTransfer)
        );
    }

    #[test]
    fn test_oversized_value_rejected() {
        let mut reassembler = FragmentReassembler::new();

        assert_eq!(
            reassembler.arm(MAX_ATTRIBUTE_SIZE as u16 + 1),
            Err(ReassemblyError::Overflow)
        );

        reassembler.arm(110).unwrap();
        assert_eq!(
            reassembler.begin(MAX_ATTRIBUTE_SIZE as u16 + 1, b""),
            Err(ReassemblyError::Overflow)
        );
    }

    #[test]
    fn test_new_transfer_replaces_pending() {
        let mut reassembler = FragmentReassembler::new();

        reassembler.arm(110).unwrap();
        reassembler.begin(20, b"partial").unwrap();

        // a fresh request replaces the unfinished transfer
        reassembler.arm(110).unwrap();
        reassembler.begin(3, b"new").unwrap();

        assert!(reassembler.is_complete());
        assert_eq!(reassembler.take().unwrap().as_slice(), b"new");
    }

    #[test]
    fn test_reset_discards_transfer() {
        let mut reassembler = FragmentReassembler::new();

        reassembler.arm(110).unwrap();
        reassembler.begin(20, b"partial").unwrap();
        reassembler.reset();

        assert!(!reassembler.is_pending());
        assert_eq!(reassembler.append(b"more"), Err(ReassemblyError::NoTransfer));
    }
}
