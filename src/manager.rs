//! Top-level glue between the GATT client and the attribute sequencer
//!
//! The manager owns both and routes client output into the sequencer:
//! decoded notifications start retrieval sequences, reassembled
//! attribute values advance them, and finished records go to the sink.
//! The owner feeds every transport event through
//! [`AncsManager::handle_event`].

use crate::client::discovery::Phase;
use crate::client::driver::{AncsClient, ClientError, ClientEvent, LinkEvent};
use crate::client::traits::{GattTransport, RetryScheduler, SecurityManager};
use crate::protocol::types::AttributeId;
use crate::sequencer::handler::{FetchRequest, NotificationSequencer, SequencerOutput};
use crate::sequencer::record::RecordSink;
use log::{debug, warn};

/// ANCS client with attribute retrieval and record delivery.
pub struct AncsManager<T, S, R, K>
where
    T: GattTransport,
    S: SecurityManager,
    R: RetryScheduler,
    K: RecordSink,
{
    client: AncsClient<T, S, R>,
    sequencer: NotificationSequencer,
    sink: K,
}

impl<T, S, R, K> AncsManager<T, S, R, K>
where
    T: GattTransport,
    S: SecurityManager,
    R: RetryScheduler,
    K: RecordSink,
{
    pub fn new(transport: T, security: S, scheduler: R, sink: K) -> Self {
        Self {
            client: AncsClient::new(transport, security, scheduler),
            sequencer: NotificationSequencer::new(),
            sink,
        }
    }

    /// Like [`AncsManager::new`] with a non-default attribute script.
    pub fn with_script(
        transport: T,
        security: S,
        scheduler: R,
        sink: K,
        script: &'static [AttributeId],
    ) -> Self {
        Self {
            client: AncsClient::new(transport, security, scheduler),
            sequencer: NotificationSequencer::with_script(script),
            sink,
        }
    }

    /// Access the underlying client.
    pub fn client(&self) -> &AncsClient<T, S, R> {
        &self.client
    }

    /// Mutable access to the underlying client, for issuing actions.
    pub fn client_mut(&mut self) -> &mut AncsClient<T, S, R> {
        &mut self.client
    }

    /// Handle one transport event and any retrieval work it triggers.
    pub fn handle_event(&mut self, event: LinkEvent<'_>) -> Result<(), ClientError> {
        let outcome = self.client.handle_event(event)?;

        if matches!(event, LinkEvent::Disconnected { .. }) && self.client.phase() == Phase::Idle {
            self.sequencer.reset();
        }

        match outcome {
            Some(ClientEvent::Notification(notification)) => {
                if let Some(fetch) = self.sequencer.on_notification(&notification) {
                    self.issue(fetch)?;
                }
            }
            Some(ClientEvent::Attribute(value)) => match self.sequencer.on_attribute(value) {
                SequencerOutput::Fetch(fetch) => self.issue(fetch)?,
                SequencerOutput::Record(record) => {
                    self.sink.deliver(&record);
                    if let Some(fetch) = self.sequencer.resume() {
                        self.issue(fetch)?;
                    }
                }
                SequencerOutput::Idle => {}
            },
            Some(ClientEvent::ServiceFound) => debug!("ancs: service found"),
            Some(ClientEvent::Ready) => debug!("ancs: ready for notifications"),
            Some(ClientEvent::DiscoveryFailed(phase)) => {
                warn!("ancs: gave up discovery in {:?}", phase)
            }
            None => {}
        }
        Ok(())
    }

    fn issue(&mut self, fetch: FetchRequest) -> Result<(), ClientError> {
        self.client
            .get_notification_attribute(fetch.uid, fetch.attribute, fetch.max_length)
    }
}
