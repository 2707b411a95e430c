//! Attribute retrieval sequencing
//!
//! One retrieval sequence is in flight at a time: for each qualifying
//! notification the sequencer walks its attribute script, emitting one
//! fetch request per step and consuming the reassembled value before the
//! next. Notifications arriving mid-sequence wait in a bounded queue.

use crate::config::protocol::MAX_RETRIEVE_LENGTH;
use crate::config::sequencer::{ALERT_LEVEL, QUEUE_DEPTH};
use crate::protocol::reassembly::AttributeBuffer;
use crate::protocol::types::{AttributeId, Notification};
use crate::sequencer::record::{encode_record, RecordBuffer};
use heapless::Deque;
use log::{debug, warn};

/// Attributes fetched per notification, in order
pub const DEFAULT_SCRIPT: &[AttributeId] = &[AttributeId::Title, AttributeId::Message];

/// Script variant that also fetches the subtitle
pub const FULL_SCRIPT: &[AttributeId] = &[
    AttributeId::Title,
    AttributeId::Subtitle,
    AttributeId::Message,
];

/// One attribute request the owner should issue on the control point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub uid: u32,
    pub attribute: AttributeId,
    /// Length limit for variable-length attributes, `None` otherwise
    pub max_length: Option<u16>,
}

/// Result of feeding one attribute value to the sequencer
#[derive(Debug, PartialEq)]
pub enum SequencerOutput {
    /// The next attribute of the running sequence should be fetched
    Fetch(FetchRequest),
    /// The sequence finished; deliver this record, then call
    /// [`NotificationSequencer::resume`]
    Record(RecordBuffer),
    /// Nothing to do
    Idle,
}

struct ActiveSequence {
    uid: u32,
    /// Index into the script of the attribute currently in flight
    step: usize,
    title: Option<AttributeBuffer>,
    message: Option<AttributeBuffer>,
}

/// Walks the attribute script for each qualifying notification.
///
/// The uid of a notification that arrives while a sequence is running is
/// queued; when the queue is full the notification is dropped with a
/// warning rather than displacing older entries.
pub struct NotificationSequencer {
    queue: Deque<u32, QUEUE_DEPTH>,
    script: &'static [AttributeId],
    active: Option<ActiveSequence>,
}

impl NotificationSequencer {
    pub fn new() -> Self {
        Self::with_script(DEFAULT_SCRIPT)
    }

    pub fn with_script(script: &'static [AttributeId]) -> Self {
        Self {
            queue: Deque::new(),
            script,
            active: None,
        }
    }

    /// Whether a retrieval sequence is currently in flight.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of notifications waiting behind the running sequence.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Feed one decoded notification source event.
    ///
    /// Returns the first fetch of a new sequence when the notification
    /// qualifies and no sequence is running.
    pub fn on_notification(&mut self, notification: &Notification) -> Option<FetchRequest> {
        if !notification.qualifies() {
            debug!(
                "sequencer: ignoring {:?} event for {}",
                notification.event_id, notification.uid
            );
            return None;
        }

        if self.active.is_some() {
            if self.queue.push_back(notification.uid).is_err() {
                warn!("sequencer: queue full, dropping {}", notification.uid);
            }
            return None;
        }

        self.start(notification.uid)
    }

    /// Feed the reassembled value of the attribute currently in flight.
    pub fn on_attribute(&mut self, value: AttributeBuffer) -> SequencerOutput {
        let Some(active) = &mut self.active else {
            warn!("sequencer: attribute value with no sequence running");
            return SequencerOutput::Idle;
        };

        match self.script[active.step] {
            AttributeId::Title => active.title = Some(value),
            AttributeId::Message => active.message = Some(value),
            other => debug!("sequencer: discarding {:?} value", other),
        }

        active.step += 1;
        if active.step < self.script.len() {
            return SequencerOutput::Fetch(Self::fetch(active.uid, self.script[active.step]));
        }

        let title = active.title.take().unwrap_or_default();
        let message = active.message.take().unwrap_or_default();
        let uid = active.uid;
        self.active = None;

        match encode_record(ALERT_LEVEL, &title, &message) {
            Ok(record) => SequencerOutput::Record(record),
            Err(error) => {
                warn!("sequencer: record for {} not serialised: {:?}", uid, error);
                match self.resume() {
                    Some(fetch) => SequencerOutput::Fetch(fetch),
                    None => SequencerOutput::Idle,
                }
            }
        }
    }

    /// Start the next queued sequence, called after a record was
    /// delivered.
    pub fn resume(&mut self) -> Option<FetchRequest> {
        if self.active.is_some() {
            return None;
        }
        let uid = self.queue.pop_front()?;
        self.start(uid)
    }

    /// Drop the running sequence and the queue (disconnect path).
    pub fn reset(&mut self) {
        self.active = None;
        self.queue.clear();
    }

    fn start(&mut self, uid: u32) -> Option<FetchRequest> {
        let first = *self.script.first()?;

        debug!("sequencer: fetching attributes of {}", uid);
        self.active = Some(ActiveSequence {
            uid,
            step: 0,
            title: None,
            message: None,
        });
        Some(Self::fetch(uid, first))
    }

    fn fetch(uid: u32, attribute: AttributeId) -> FetchRequest {
        FetchRequest {
            uid,
            attribute,
            max_length: attribute
                .takes_max_length()
                .then_some(MAX_RETRIEVE_LENGTH),
        }
    }
}

impl Default for NotificationSequencer {
    fn default() -> Self {
        Self::new()
    }
}
