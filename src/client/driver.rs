//! ANCS client event handling
//!
//! The client is single-threaded and event-driven: the host stack
//! delivers every transport callback as a [`LinkEvent`] through
//! [`AncsClient::handle_event`], and each event is handled to completion
//! before the next. Outbound actions go through the collaborator traits
//! owned by the client, so no global state is needed to route callbacks.

use crate::client::discovery::{DiscoveryState, Phase};
use crate::client::traits::{
    ConnectionHandle, GattTransport, LinkSecurity, RetryScheduler, SecurityError, SecurityManager,
    TransportError,
};
use crate::config::protocol::MAX_ATTRIBUTE_SIZE;
use crate::config::{discovery, gatt, uuids};
use crate::protocol::codec::{self, CodecError};
use crate::protocol::reassembly::{AttributeBuffer, FragmentReassembler, ReassemblyError};
use crate::protocol::types::{ActionId, AttributeId, CommandId, Notification};
use log::{debug, warn};

/// A transport or security event delivered by the host stack.
///
/// Events carrying a connection handle are ignored unless the handle
/// matches the client's active connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent<'a> {
    /// A link to a peer was established
    Connected { connection: ConnectionHandle },
    /// The link was torn down; all client state resets
    Disconnected { connection: ConnectionHandle },
    /// The discovery session matched the requested service UUID
    ServiceDiscovered { connection: ConnectionHandle },
    /// A characteristic inside the requested service was enumerated
    CharacteristicDiscovered {
        connection: ConnectionHandle,
        /// 16-bit short form of the characteristic UUID
        uuid: u16,
        value_handle: u16,
    },
    /// The discovery session ended, with or without results
    DiscoveryTerminated { connection: ConnectionHandle },
    /// The security collaborator finished encrypting the link
    LinkSecured { connection: ConnectionHandle },
    /// A notification arrived on a subscribed characteristic
    ValueNotification {
        connection: ConnectionHandle,
        handle: u16,
        data: &'a [u8],
    },
    /// A previously queued GATT write finished sending
    WriteCompleted,
    /// A delay requested through [`RetryScheduler`] elapsed
    RetryTimer,
}

/// Output of one handled event, surfaced to the layer above
#[derive(Debug, PartialEq)]
pub enum ClientEvent {
    /// All three characteristics found on an encrypted link;
    /// subscription writes are being issued
    ServiceFound,
    /// Both subscriptions are active; attribute commands may be sent
    Ready,
    /// A discovery retry budget ran out in the given phase
    DiscoveryFailed(Phase),
    /// A decoded notification source event
    Notification(Notification),
    /// A fully reassembled attribute value
    Attribute(AttributeBuffer),
}

/// Errors surfaced by [`AncsClient::handle_event`] and the command API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientError {
    Codec(CodecError),
    Reassembly(ReassemblyError),
    Transport(TransportError),
    Security(SecurityError),
    /// A command was issued before discovery and subscription finished
    NotReady,
}

impl From<CodecError> for ClientError {
    fn from(error: CodecError) -> Self {
        Self::Codec(error)
    }
}

impl From<ReassemblyError> for ClientError {
    fn from(error: ReassemblyError) -> Self {
        Self::Reassembly(error)
    }
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}

impl From<SecurityError> for ClientError {
    fn from(error: SecurityError) -> Self {
        Self::Security(error)
    }
}

/// ANCS GATT client for a single connection.
///
/// Drives service and characteristic discovery, gates progress on link
/// encryption, subscribes to the two source characteristics and decodes
/// their notifications. Attribute requests are issued with
/// [`AncsClient::get_notification_attribute`]; the reassembled response
/// is returned as [`ClientEvent::Attribute`].
pub struct AncsClient<T, S, R>
where
    T: GattTransport,
    S: SecurityManager,
    R: RetryScheduler,
{
    transport: T,
    security: S,
    scheduler: R,
    state: DiscoveryState,
    reassembler: FragmentReassembler,
}

impl<T, S, R> AncsClient<T, S, R>
where
    T: GattTransport,
    S: SecurityManager,
    R: RetryScheduler,
{
    pub fn new(transport: T, security: S, scheduler: R) -> Self {
        Self {
            transport,
            security,
            scheduler,
            state: DiscoveryState::new(),
            reassembler: FragmentReassembler::new(),
        }
    }

    /// Current discovery phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Whether attribute commands may currently be sent.
    pub fn is_ready(&self) -> bool {
        self.state.phase == Phase::Ready
    }

    /// Access the transport collaborator.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Access the security collaborator.
    pub fn security(&self) -> &S {
        &self.security
    }

    /// Access the scheduler collaborator.
    pub fn scheduler(&self) -> &R {
        &self.scheduler
    }

    /// Handle one transport event to completion.
    pub fn handle_event(&mut self, event: LinkEvent<'_>) -> Result<Option<ClientEvent>, ClientError> {
        match event {
            LinkEvent::Connected { connection } => self.on_connected(connection),
            LinkEvent::Disconnected { connection } => self.on_disconnected(connection),
            LinkEvent::ServiceDiscovered { connection } => self.on_service_discovered(connection),
            LinkEvent::CharacteristicDiscovered {
                connection,
                uuid,
                value_handle,
            } => self.on_characteristic_discovered(connection, uuid, value_handle),
            LinkEvent::DiscoveryTerminated { connection } => {
                self.on_discovery_terminated(connection)
            }
            LinkEvent::LinkSecured { connection } => self.on_link_secured(connection),
            LinkEvent::ValueNotification {
                connection,
                handle,
                data,
            } => self.on_value_notification(connection, handle, data),
            LinkEvent::WriteCompleted => self.on_write_completed(),
            LinkEvent::RetryTimer => self.on_retry_timer(),
        }
    }

    /// Request one attribute of a notification.
    ///
    /// Only valid once the client is [`Phase::Ready`]. Arms the
    /// reassembler for the response; the reassembled value arrives later
    /// as [`ClientEvent::Attribute`]. The phone truncates variable
    /// attributes to `max_length` rather than erroring.
    pub fn get_notification_attribute(
        &mut self,
        uid: u32,
        attribute: AttributeId,
        max_length: Option<u16>,
    ) -> Result<(), ClientError> {
        let (connection, control_point) = self.command_route()?;

        self.reassembler
            .arm(max_length.unwrap_or(MAX_ATTRIBUTE_SIZE as u16))?;

        let payload = codec::encode_attribute_request(
            CommandId::GetNotificationAttributes,
            uid,
            attribute,
            max_length,
        );
        self.transport
            .write_request(connection, control_point, &payload)?;

        debug!("ancs: requested attribute {:?} of {}", attribute, uid);
        Ok(())
    }

    /// Trigger a positive or negative action on a notification.
    pub fn perform_notification_action(
        &mut self,
        uid: u32,
        action: ActionId,
    ) -> Result<(), ClientError> {
        let (connection, control_point) = self.command_route()?;

        let payload = codec::encode_notification_action(uid, action);
        self.transport
            .write_request(connection, control_point, &payload)?;

        debug!("ancs: action {:?} on {}", action, uid);
        Ok(())
    }

    fn command_route(&self) -> Result<(ConnectionHandle, u16), ClientError> {
        if self.state.phase != Phase::Ready {
            return Err(ClientError::NotReady);
        }
        match (self.state.connection, self.state.found.control_point) {
            (Some(connection), Some(control_point)) => Ok((connection, control_point)),
            _ => Err(ClientError::NotReady),
        }
    }

    fn matches(&self, connection: ConnectionHandle) -> bool {
        self.state.connection == Some(connection)
    }

    fn on_connected(&mut self, connection: ConnectionHandle) -> Result<Option<ClientEvent>, ClientError> {
        if self.state.connection.is_some() {
            warn!("ancs: already connected, ignoring connection {}", connection);
            return Ok(None);
        }

        self.state.reset();
        self.state.connection = Some(connection);
        self.state.phase = Phase::FindingService;

        debug!("ancs: connected on {}, finding service", connection);
        self.transport
            .launch_service_discovery(connection, &uuids::ANCS_SERVICE)?;
        Ok(None)
    }

    fn on_disconnected(&mut self, connection: ConnectionHandle) -> Result<Option<ClientEvent>, ClientError> {
        if !self.matches(connection) {
            return Ok(None);
        }

        debug!("ancs: disconnected, reset");
        self.state.reset();
        self.reassembler.reset();
        Ok(None)
    }

    fn on_service_discovered(&mut self, connection: ConnectionHandle) -> Result<Option<ClientEvent>, ClientError> {
        if !self.matches(connection) || self.state.phase != Phase::FindingService {
            return Ok(None);
        }

        self.state.phase = Phase::Securing;

        match self.security.link_security(connection) {
            LinkSecurity::Encrypted => {
                debug!("ancs: link already encrypted");
                self.state.encrypted = true;
                self.start_characteristic_discovery()?;
            }
            LinkSecurity::NotEncrypted => {
                debug!("ancs: requesting encryption");
                self.security.request_encryption(connection)?;
            }
        }
        Ok(None)
    }

    fn on_link_secured(&mut self, connection: ConnectionHandle) -> Result<Option<ClientEvent>, ClientError> {
        if !self.matches(connection) {
            return Ok(None);
        }

        self.state.encrypted = true;
        debug!("ancs: link secured");

        match self.state.phase {
            Phase::Securing => {
                self.start_characteristic_discovery()?;
                Ok(None)
            }
            Phase::FindingCharacteristics if self.state.ready_to_subscribe() => {
                self.enter_subscribing().map(Some)
            }
            _ => Ok(None),
        }
    }

    fn on_characteristic_discovered(
        &mut self,
        connection: ConnectionHandle,
        uuid: u16,
        value_handle: u16,
    ) -> Result<Option<ClientEvent>, ClientError> {
        if !self.matches(connection) || self.state.phase != Phase::FindingCharacteristics {
            return Ok(None);
        }

        if self.state.found.record(uuid, value_handle) {
            debug!("ancs: characteristic {:04X} at handle {}", uuid, value_handle);
        }

        if self.state.ready_to_subscribe() {
            return self.enter_subscribing().map(Some);
        }
        Ok(None)
    }

    fn on_discovery_terminated(&mut self, connection: ConnectionHandle) -> Result<Option<ClientEvent>, ClientError> {
        if !self.matches(connection) {
            return Ok(None);
        }

        match self.state.phase {
            Phase::FindingService => self.retry_discovery(Phase::FindingService),
            Phase::FindingCharacteristics if !self.state.found.all() => {
                self.retry_discovery(Phase::FindingCharacteristics)
            }
            // a session that already produced what we needed terminates
            // normally; nothing to do
            _ => Ok(None),
        }
    }

    fn on_value_notification(
        &mut self,
        connection: ConnectionHandle,
        handle: u16,
        data: &[u8],
    ) -> Result<Option<ClientEvent>, ClientError> {
        if !self.matches(connection) {
            return Ok(None);
        }

        if self.state.found.notification_source == Some(handle) {
            let notification = codec::decode_notification(data)?;
            Ok(Some(ClientEvent::Notification(notification)))
        } else if self.state.found.data_source == Some(handle) {
            if self.reassembler.is_pending() {
                self.reassembler.append(data)?;
            } else {
                let header = codec::decode_fragment_header(data)?;
                self.reassembler
                    .begin(header.expected_length, header.first_chunk)?;
            }

            if self.reassembler.is_complete() {
                let value = self.reassembler.take()?;
                Ok(Some(ClientEvent::Attribute(value)))
            } else {
                Ok(None)
            }
        } else {
            Ok(None)
        }
    }

    fn on_write_completed(&mut self) -> Result<Option<ClientEvent>, ClientError> {
        if self.state.phase != Phase::Subscribing {
            return Ok(None);
        }

        if !self.state.fully_subscribed() {
            self.drive_subscription();
        }

        if self.state.fully_subscribed() {
            self.state.phase = Phase::Ready;
            debug!("ancs: subscriptions active, ready");
            return Ok(Some(ClientEvent::Ready));
        }
        Ok(None)
    }

    fn on_retry_timer(&mut self) -> Result<Option<ClientEvent>, ClientError> {
        let Some(connection) = self.state.connection else {
            return Ok(None);
        };

        match self.state.phase {
            Phase::FindingService | Phase::FindingCharacteristics => {
                debug!("ancs: retrying discovery in {:?}", self.state.phase);
                self.transport
                    .launch_service_discovery(connection, &uuids::ANCS_SERVICE)?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn start_characteristic_discovery(&mut self) -> Result<(), ClientError> {
        let Some(connection) = self.state.connection else {
            return Ok(());
        };

        self.state.phase = Phase::FindingCharacteristics;
        self.transport
            .launch_service_discovery(connection, &uuids::ANCS_SERVICE)?;
        Ok(())
    }

    fn enter_subscribing(&mut self) -> Result<ClientEvent, ClientError> {
        self.state.phase = Phase::Subscribing;
        debug!("ancs: service found, subscribing");
        self.drive_subscription();
        Ok(ClientEvent::ServiceFound)
    }

    /// Issue the outstanding CCCD writes.
    ///
    /// Each write is guarded by its own flag and only flagged done when
    /// the transport accepts it; a rejected write is attempted again on
    /// the next write-completed signal.
    fn drive_subscription(&mut self) {
        let Some(connection) = self.state.connection else {
            return;
        };
        let value = gatt::CCCD_ENABLE_NOTIFICATIONS.to_le_bytes();

        // data source first, then notification source; CCCD sits at
        // value handle + 1
        if !self.state.data_subscribed {
            if let Some(handle) = self.state.found.data_source {
                match self.transport.write_command(
                    connection,
                    handle + gatt::CCCD_HANDLE_OFFSET,
                    &value,
                ) {
                    Ok(()) => self.state.data_subscribed = true,
                    Err(error) => warn!("ancs: data source subscribe rejected: {:?}", error),
                }
            }
        }

        if !self.state.notification_subscribed {
            if let Some(handle) = self.state.found.notification_source {
                match self.transport.write_command(
                    connection,
                    handle + gatt::CCCD_HANDLE_OFFSET,
                    &value,
                ) {
                    Ok(()) => self.state.notification_subscribed = true,
                    Err(error) => {
                        warn!("ancs: notification source subscribe rejected: {:?}", error)
                    }
                }
            }
        }
    }

    fn retry_discovery(&mut self, failed: Phase) -> Result<Option<ClientEvent>, ClientError> {
        let budget = match failed {
            Phase::FindingService => &mut self.state.service_retries,
            _ => &mut self.state.characteristic_retries,
        };

        if *budget > 0 {
            *budget -= 1;
        }

        if *budget == 0 {
            warn!("ancs: discovery abandoned in {:?}", failed);
            self.state.phase = Phase::Failed;
            return Ok(Some(ClientEvent::DiscoveryFailed(failed)));
        }

        debug!(
            "ancs: discovery pre-empted in {:?}, {} retries left",
            failed, *budget
        );
        self.scheduler.schedule_retry(discovery::RETRY_DELAY_MS);
        Ok(None)
    }
}
