//! Wire codecs for notification source events and control point commands
//!
//! Pure functions; all multi-byte fields are little-endian on the wire.

use crate::config::protocol::{FRAGMENT_HEADER_SIZE, MAX_COMMAND_SIZE, NOTIFICATION_EVENT_SIZE};
use crate::protocol::types::{
    ActionId, AttributeId, CategoryId, CommandId, EventFlags, EventId, Notification,
};
use heapless::Vec;

/// Errors raised while decoding transport payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Payload is shorter than the fixed minimum for its kind
    Truncated,
    /// Unknown event id discriminant
    UnknownEventId(u8),
    /// Unknown category id discriminant
    UnknownCategoryId(u8),
    /// Unknown attribute id discriminant
    UnknownAttributeId(u8),
}

/// Header of the first fragment of an attribute response
///
/// Continuation fragments carry raw payload with no header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentHeader<'a> {
    /// Notification the attribute belongs to
    pub uid: u32,
    /// Attribute being delivered
    pub attribute: AttributeId,
    /// Total length of the attribute value across all fragments
    pub expected_length: u16,
    /// Payload bytes carried by this first fragment
    pub first_chunk: &'a [u8],
}

/// Decode an 8-byte notification source event.
///
/// Rejects undersized payloads and unknown discriminants; extra trailing
/// bytes are not expected from the transport and are ignored.
pub fn decode_notification(data: &[u8]) -> Result<Notification, CodecError> {
    if data.len() < NOTIFICATION_EVENT_SIZE {
        return Err(CodecError::Truncated);
    }

    let event_id = EventId::from_byte(data[0]).ok_or(CodecError::UnknownEventId(data[0]))?;
    let flags = EventFlags::from_bits_truncate(data[1]);
    let category_id =
        CategoryId::from_byte(data[2]).ok_or(CodecError::UnknownCategoryId(data[2]))?;
    let category_count = data[3];
    let uid = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    Ok(Notification {
        event_id,
        flags,
        category_id,
        category_count,
        uid,
    })
}

/// Encode a notification source event.
///
/// Counterpart of [`decode_notification`], used to synthesise transport
/// payloads in tests and host simulators.
pub fn encode_notification(notification: &Notification) -> [u8; NOTIFICATION_EVENT_SIZE] {
    let mut data = [0u8; NOTIFICATION_EVENT_SIZE];
    data[0] = notification.event_id as u8;
    data[1] = notification.flags.bits();
    data[2] = notification.category_id as u8;
    data[3] = notification.category_count;
    data[4..8].copy_from_slice(&notification.uid.to_le_bytes());
    data
}

/// Decode the header of a first data source fragment.
///
/// Layout: `[command_id: u8][uid: u32 LE][attribute_id: u8][length: u16 LE][payload...]`.
/// The command id byte is echoed by the phone and not interpreted here.
pub fn decode_fragment_header(data: &[u8]) -> Result<FragmentHeader<'_>, CodecError> {
    if data.len() < FRAGMENT_HEADER_SIZE {
        return Err(CodecError::Truncated);
    }

    let uid = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
    let attribute =
        AttributeId::from_byte(data[5]).ok_or(CodecError::UnknownAttributeId(data[5]))?;
    let expected_length = u16::from_le_bytes([data[6], data[7]]);

    Ok(FragmentHeader {
        uid,
        attribute,
        expected_length,
        first_chunk: &data[FRAGMENT_HEADER_SIZE..],
    })
}

/// Encode an attribute request command for the control point.
///
/// Variable-length attributes (Title, Subtitle, Message) always carry the
/// 2-byte max length parameter, producing an 8-byte payload; every other
/// attribute id always produces the 6-byte form. `max_length` is ignored
/// for the fixed-length attributes.
pub fn encode_attribute_request(
    command: CommandId,
    uid: u32,
    attribute: AttributeId,
    max_length: Option<u16>,
) -> Vec<u8, MAX_COMMAND_SIZE> {
    let mut payload: Vec<u8, MAX_COMMAND_SIZE> = Vec::new();

    let _ = payload.push(command as u8);
    let _ = payload.extend_from_slice(&uid.to_le_bytes());
    let _ = payload.push(attribute as u8);

    if attribute.takes_max_length() {
        let length = max_length.unwrap_or(0);
        let _ = payload.extend_from_slice(&length.to_le_bytes());
    }

    payload
}

/// Encode a perform-notification-action command for the control point.
///
/// Layout: `[command_id=2: u8][uid: u32 LE][action_id: u8]`, always the
/// 6-byte form.
pub fn encode_notification_action(uid: u32, action: ActionId) -> Vec<u8, MAX_COMMAND_SIZE> {
    let mut payload: Vec<u8, MAX_COMMAND_SIZE> = Vec::new();

    let _ = payload.push(CommandId::PerformNotificationAction as u8);
    let _ = payload.extend_from_slice(&uid.to_le_bytes());
    let _ = payload.push(action as u8);

    payload
}
