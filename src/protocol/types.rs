//! ANCS value types
//!
//! # Notification source events
//!
//! Every event on the Notification Source characteristic is exactly 8
//! bytes:
//! ```text
//! [event_id: u8][flags: u8][category_id: u8][category_count: u8][uid: u32 LE]
//! ```
//!
//! # Control point commands
//!
//! Commands written to the Control Point characteristic start with a
//! command id byte followed by the notification uid:
//! ```text
//! [command_id: u8][uid: u32 LE][attribute_id: u8]([max_length: u16 LE])
//! ```
//! The trailing max length parameter is present only for the
//! variable-length attributes (Title, Subtitle, Message).

use bitflags::bitflags;

/// Lifecycle of a notification on the phone
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventId {
    /// Notification was added (0x00)
    Added = 0x00,
    /// Notification was modified (0x01)
    Modified = 0x01,
    /// Notification was removed (0x02)
    Removed = 0x02,
}

impl EventId {
    /// Try to convert a byte to an EventId
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Added),
            0x01 => Some(Self::Modified),
            0x02 => Some(Self::Removed),
            _ => None,
        }
    }
}

bitflags! {
    /// Modifier bits carried in a notification source event
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventFlags: u8 {
        const SILENT          = 1 << 0;
        const IMPORTANT       = 1 << 1;
        const PRE_EXISTING    = 1 << 2;
        const POSITIVE_ACTION = 1 << 3;
        const NEGATIVE_ACTION = 1 << 4;
    }
}

/// Notification category assigned by the phone
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryId {
    Other = 0,
    IncomingCall = 1,
    MissedCall = 2,
    Voicemail = 3,
    Social = 4,
    Schedule = 5,
    Email = 6,
    News = 7,
    HealthAndFitness = 8,
    BusinessAndFinance = 9,
    Location = 10,
    Entertainment = 11,
}

impl CategoryId {
    /// Try to convert a byte to a CategoryId
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Other),
            1 => Some(Self::IncomingCall),
            2 => Some(Self::MissedCall),
            3 => Some(Self::Voicemail),
            4 => Some(Self::Social),
            5 => Some(Self::Schedule),
            6 => Some(Self::Email),
            7 => Some(Self::News),
            8 => Some(Self::HealthAndFitness),
            9 => Some(Self::BusinessAndFinance),
            10 => Some(Self::Location),
            11 => Some(Self::Entertainment),
            _ => None,
        }
    }
}

/// Control point command ids
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    /// Request notification attributes (0x00)
    GetNotificationAttributes = 0x00,
    /// Request app attributes (0x01)
    GetAppAttributes = 0x01,
    /// Trigger a notification action (0x02)
    PerformNotificationAction = 0x02,
}

/// Notification attribute ids
///
/// Title, Subtitle and Message are variable-length and must be followed
/// by a 2-byte max length parameter in the request; all other ids use
/// the short request form.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeId {
    AppIdentifier = 0,
    Title = 1,
    Subtitle = 2,
    Message = 3,
    MessageSize = 4,
    Date = 5,
    PositiveActionLabel = 6,
    NegativeActionLabel = 7,
}

impl AttributeId {
    /// Try to convert a byte to an AttributeId
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::AppIdentifier),
            1 => Some(Self::Title),
            2 => Some(Self::Subtitle),
            3 => Some(Self::Message),
            4 => Some(Self::MessageSize),
            5 => Some(Self::Date),
            6 => Some(Self::PositiveActionLabel),
            7 => Some(Self::NegativeActionLabel),
            _ => None,
        }
    }

    /// Whether a request for this attribute carries the max length
    /// parameter. Protocol rule, not a tuning knob.
    pub fn takes_max_length(self) -> bool {
        matches!(self, Self::Title | Self::Subtitle | Self::Message)
    }
}

/// Actions a peripheral may trigger on a notification
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionId {
    Positive = 0,
    Negative = 1,
}

/// A decoded notification source event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub event_id: EventId,
    pub flags: EventFlags,
    pub category_id: CategoryId,
    /// Number of active notifications in this category
    pub category_count: u8,
    /// Opaque identifier used for attribute requests and actions
    pub uid: u32,
}

impl Notification {
    /// Whether this event should trigger attribute retrieval: only
    /// newly added, non-silent notifications qualify.
    pub fn qualifies(&self) -> bool {
        self.event_id == EventId::Added && !self.flags.contains(EventFlags::SILENT)
    }
}
