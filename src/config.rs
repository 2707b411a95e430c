//! Protocol and client configuration constants

/// ANCS service and characteristic identifiers
pub mod uuids {
    /// ANCS service UUID 7905F431-B5CE-4E99-A40F-4B1E122D00D0
    pub const ANCS_SERVICE: [u8; 16] = [
        0x79, 0x05, 0xF4, 0x31, 0xB5, 0xCE, 0x4E, 0x99, 0xA4, 0x0F, 0x4B, 0x1E, 0x12, 0x2D, 0x00,
        0xD0,
    ];

    /// Notification Source characteristic (16-bit short form)
    pub const NOTIFICATION_SOURCE: u16 = 0x120D;

    /// Control Point characteristic (16-bit short form)
    pub const CONTROL_POINT: u16 = 0xD8F3;

    /// Data Source characteristic (16-bit short form)
    pub const DATA_SOURCE: u16 = 0xC6E9;
}

/// Discovery retry policy
///
/// A concurrent discovery session on the shared transport can pre-empt
/// ours, so a session that terminates without a match is re-attempted
/// after a delay, up to a fixed budget per phase.
pub mod discovery {
    /// Attempts allowed per discovery phase before giving up
    pub const RETRY_BUDGET: u8 = 3;

    /// Delay before re-launching a pre-empted discovery session
    pub const RETRY_DELAY_MS: u32 = 1000;
}

/// GATT layout and subscription constants
pub mod gatt {
    /// CCCD value enabling notifications, little-endian on the wire
    pub const CCCD_ENABLE_NOTIFICATIONS: u16 = 0x0001;

    /// The CCCD descriptor is assumed to sit immediately after the
    /// characteristic value attribute. Protocol contract with the peer
    /// stack, not a heuristic.
    pub const CCCD_HANDLE_OFFSET: u16 = 1;
}

/// Wire protocol sizes
pub mod protocol {
    /// Fixed size of a notification source event
    pub const NOTIFICATION_EVENT_SIZE: usize = 8;

    /// Minimum size of a first data source fragment (header only)
    pub const FRAGMENT_HEADER_SIZE: usize = 8;

    /// Largest control point command payload (variable-length form)
    pub const MAX_COMMAND_SIZE: usize = 8;

    /// Upper bound for a reassembled attribute value
    pub const MAX_ATTRIBUTE_SIZE: usize = 256;

    /// Maximum bytes requested per attribute; the phone truncates the
    /// attribute value to this length rather than erroring
    pub const MAX_RETRIEVE_LENGTH: u16 = 110;
}

/// Attribute sequencer and output record settings
pub mod sequencer {
    /// Notification uids queued while a retrieval sequence is in flight
    pub const QUEUE_DEPTH: usize = 8;

    /// Alert level constant placed first in every output record
    pub const ALERT_LEVEL: u8 = 1;

    /// Capacity of the serialised CBOR record buffer
    pub const MAX_RECORD_SIZE: usize = 256;
}
