//! Discovery and subscription state for one ANCS connection
//!
//! The original bitmask that mixed discovered characteristics,
//! encryption and subscription flags into one byte is split into named
//! sets with an explicit ready-to-subscribe predicate.

use crate::client::traits::ConnectionHandle;
use crate::config::discovery::RETRY_BUDGET;
use crate::config::uuids;

/// Phase of the discovery state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No connection
    Idle,
    /// Service discovery session for the ANCS UUID in progress
    FindingService,
    /// Waiting for the link to be encrypted
    Securing,
    /// Characteristic discovery pass in progress
    FindingCharacteristics,
    /// CCCD writes being issued
    Subscribing,
    /// Both subscriptions active; commands may be sent
    Ready,
    /// A retry budget ran out; no further progress on this connection
    Failed,
}

/// Value handles of the three required characteristics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacteristicSet {
    pub notification_source: Option<u16>,
    pub control_point: Option<u16>,
    pub data_source: Option<u16>,
}

impl CharacteristicSet {
    /// Record a discovered characteristic by its 16-bit UUID.
    ///
    /// Returns true when the UUID is one of the three ANCS
    /// characteristics.
    pub fn record(&mut self, uuid: u16, value_handle: u16) -> bool {
        match uuid {
            uuids::NOTIFICATION_SOURCE => {
                self.notification_source = Some(value_handle);
                true
            }
            uuids::CONTROL_POINT => {
                self.control_point = Some(value_handle);
                true
            }
            uuids::DATA_SOURCE => {
                self.data_source = Some(value_handle);
                true
            }
            _ => false,
        }
    }

    /// Whether all three characteristics have been found.
    pub fn all(&self) -> bool {
        self.notification_source.is_some()
            && self.control_point.is_some()
            && self.data_source.is_some()
    }
}

/// Mutable discovery record, one per active connection
#[derive(Debug)]
pub struct DiscoveryState {
    pub phase: Phase,
    /// Current link; `None` when disconnected
    pub connection: Option<ConnectionHandle>,
    pub found: CharacteristicSet,
    /// Set once the security collaborator reports the link encrypted
    pub encrypted: bool,
    pub notification_subscribed: bool,
    pub data_subscribed: bool,
    pub service_retries: u8,
    pub characteristic_retries: u8,
}

impl DiscoveryState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            connection: None,
            found: CharacteristicSet::default(),
            encrypted: false,
            notification_subscribed: false,
            data_subscribed: false,
            service_retries: RETRY_BUDGET,
            characteristic_retries: RETRY_BUDGET,
        }
    }

    /// Restore the initial state, including retry budgets. Called on
    /// disconnect from any phase.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Subscription writes are gated on all three characteristics being
    /// found and the link being encrypted, in any completion order.
    pub fn ready_to_subscribe(&self) -> bool {
        self.found.all() && self.encrypted
    }

    /// Whether both CCCD writes have been accepted.
    pub fn fully_subscribed(&self) -> bool {
        self.notification_subscribed && self.data_subscribed
    }
}

impl Default for DiscoveryState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_characteristics() {
        let mut set = CharacteristicSet::default();
        assert!(!set.all());

        assert!(set.record(uuids::NOTIFICATION_SOURCE, 0x10));
        assert!(set.record(uuids::CONTROL_POINT, 0x12));
        assert!(!set.all());

        assert!(set.record(uuids::DATA_SOURCE, 0x14));
        assert!(set.all());

        assert_eq!(set.notification_source, Some(0x10));
        assert_eq!(set.control_point, Some(0x12));
        assert_eq!(set.data_source, Some(0x14));
    }

    #[test]
    fn test_unknown_uuid_ignored() {
        let mut set = CharacteristicSet::default();
        assert!(!set.record(0x2A37, 0x20));
        assert_eq!(set, CharacteristicSet::default());
    }

    #[test]
    fn test_ready_to_subscribe_requires_both() {
        let mut state = DiscoveryState::new();
        assert!(!state.ready_to_subscribe());

        state.found.record(uuids::NOTIFICATION_SOURCE, 1);
        state.found.record(uuids::CONTROL_POINT, 3);
        state.found.record(uuids::DATA_SOURCE, 5);
        assert!(!state.ready_to_subscribe());

        state.encrypted = true;
        assert!(state.ready_to_subscribe());

        // encryption alone is not enough either
        let mut state = DiscoveryState::new();
        state.encrypted = true;
        assert!(!state.ready_to_subscribe());
    }

    #[test]
    fn test_reset_restores_budgets() {
        let mut state = DiscoveryState::new();
        state.phase = Phase::FindingCharacteristics;
        state.connection = Some(7);
        state.encrypted = true;
        state.service_retries = 0;
        state.characteristic_retries = 1;
        state.data_subscribed = true;

        state.reset();

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.connection, None);
        assert!(!state.encrypted);
        assert!(!state.data_subscribed);
        assert_eq!(state.service_retries, RETRY_BUDGET);
        assert_eq!(state.characteristic_retries, RETRY_BUDGET);
    }
}
