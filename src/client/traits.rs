//! Collaborator traits for the host BLE stack
//!
//! The client never talks to hardware directly: discovery, GATT writes,
//! link security and timed retries all go through these traits, so the
//! host stack can be swapped with mocks for testing. Implementations are
//! expected to run on the same logical thread that delivers events to
//! the client; none of the calls may block.

/// Opaque link identifier assigned by the host stack
pub type ConnectionHandle = u16;

/// Errors reported by the GATT transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The write could not be queued; retried on the next write-completed
    /// or discovery-retry cycle
    WriteRejected,
    /// A discovery session could not be started
    DiscoveryRejected,
}

/// Errors reported by the security collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityError {
    /// The authentication request was not accepted
    AuthenticationRejected,
}

/// Encryption status of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSecurity {
    NotEncrypted,
    Encrypted,
}

/// GATT client operations consumed by the ANCS client
pub trait GattTransport {
    /// Launch a service discovery session filtered to one 128-bit
    /// service UUID. Results arrive as service/characteristic discovery
    /// events followed by a termination event.
    fn launch_service_discovery(
        &mut self,
        connection: ConnectionHandle,
        service: &[u8; 16],
    ) -> Result<(), TransportError>;

    /// Confirmed write (write request) to a characteristic value handle.
    fn write_request(
        &mut self,
        connection: ConnectionHandle,
        handle: u16,
        payload: &[u8],
    ) -> Result<(), TransportError>;

    /// Unconfirmed write (write command) to an attribute handle.
    fn write_command(
        &mut self,
        connection: ConnectionHandle,
        handle: u16,
        payload: &[u8],
    ) -> Result<(), TransportError>;
}

/// Link security operations consumed by the ANCS client
pub trait SecurityManager {
    /// Current encryption status of the link.
    fn link_security(&self, connection: ConnectionHandle) -> LinkSecurity;

    /// Ask the security collaborator to authenticate and encrypt the
    /// link. Completion is signalled asynchronously with a link-secured
    /// event.
    fn request_encryption(&mut self, connection: ConnectionHandle) -> Result<(), SecurityError>;
}

/// Timed retry scheduling
pub trait RetryScheduler {
    /// Arrange for a retry-timer event to be delivered to the client
    /// after `delay_ms`, on the same logical thread as all other events.
    fn schedule_retry(&mut self, delay_ms: u32);
}

#[cfg(test)]
pub mod mock {
    //! Recording mocks for the collaborator traits

    use super::*;
    use core::cell::RefCell;
    use heapless::Vec;

    /// Largest payload a test write carries (attribute request or CCCD)
    const MOCK_PAYLOAD_SIZE: usize = 16;
    const MOCK_HISTORY_DEPTH: usize = 16;

    /// One recorded GATT write
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct WriteRecord {
        pub handle: u16,
        pub payload: Vec<u8, MOCK_PAYLOAD_SIZE>,
    }

    impl WriteRecord {
        fn new(handle: u16, payload: &[u8]) -> Self {
            let mut record = Self {
                handle,
                payload: Vec::new(),
            };
            let _ = record.payload.extend_from_slice(payload);
            record
        }
    }

    /// Mock GATT transport recording every outbound call
    pub struct MockTransport {
        discovery_launches: RefCell<Vec<ConnectionHandle, MOCK_HISTORY_DEPTH>>,
        write_requests: RefCell<Vec<WriteRecord, MOCK_HISTORY_DEPTH>>,
        write_commands: RefCell<Vec<WriteRecord, MOCK_HISTORY_DEPTH>>,
        next_write_error: RefCell<Option<TransportError>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                discovery_launches: RefCell::new(Vec::new()),
                write_requests: RefCell::new(Vec::new()),
                write_commands: RefCell::new(Vec::new()),
                next_write_error: RefCell::new(None),
            }
        }

        /// Number of discovery sessions launched so far
        pub fn discovery_count(&self) -> usize {
            self.discovery_launches.borrow().len()
        }

        /// All confirmed writes issued so far
        pub fn write_requests(&self) -> Vec<WriteRecord, MOCK_HISTORY_DEPTH> {
            self.write_requests.borrow().clone()
        }

        /// All unconfirmed writes issued so far
        pub fn write_commands(&self) -> Vec<WriteRecord, MOCK_HISTORY_DEPTH> {
            self.write_commands.borrow().clone()
        }

        /// Fail the next write (request or command) with `error`
        pub fn set_next_write_error(&self, error: TransportError) {
            *self.next_write_error.borrow_mut() = Some(error);
        }
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl GattTransport for MockTransport {
        fn launch_service_discovery(
            &mut self,
            connection: ConnectionHandle,
            _service: &[u8; 16],
        ) -> Result<(), TransportError> {
            let _ = self.discovery_launches.borrow_mut().push(connection);
            Ok(())
        }

        fn write_request(
            &mut self,
            _connection: ConnectionHandle,
            handle: u16,
            payload: &[u8],
        ) -> Result<(), TransportError> {
            if let Some(error) = self.next_write_error.borrow_mut().take() {
                return Err(error);
            }
            let _ = self
                .write_requests
                .borrow_mut()
                .push(WriteRecord::new(handle, payload));
            Ok(())
        }

        fn write_command(
            &mut self,
            _connection: ConnectionHandle,
            handle: u16,
            payload: &[u8],
        ) -> Result<(), TransportError> {
            if let Some(error) = self.next_write_error.borrow_mut().take() {
                return Err(error);
            }
            let _ = self
                .write_commands
                .borrow_mut()
                .push(WriteRecord::new(handle, payload));
            Ok(())
        }
    }

    /// Mock security manager with a settable link status
    pub struct MockSecurity {
        status: RefCell<LinkSecurity>,
        encryption_requests: RefCell<usize>,
    }

    impl MockSecurity {
        /// Create a mock reporting an unencrypted link
        pub fn new() -> Self {
            Self {
                status: RefCell::new(LinkSecurity::NotEncrypted),
                encryption_requests: RefCell::new(0),
            }
        }

        /// Create a mock reporting an already encrypted link
        pub fn encrypted() -> Self {
            Self {
                status: RefCell::new(LinkSecurity::Encrypted),
                encryption_requests: RefCell::new(0),
            }
        }

        /// Number of encryption requests received
        pub fn encryption_requests(&self) -> usize {
            *self.encryption_requests.borrow()
        }
    }

    impl Default for MockSecurity {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SecurityManager for MockSecurity {
        fn link_security(&self, _connection: ConnectionHandle) -> LinkSecurity {
            *self.status.borrow()
        }

        fn request_encryption(
            &mut self,
            _connection: ConnectionHandle,
        ) -> Result<(), SecurityError> {
            *self.encryption_requests.borrow_mut() += 1;
            Ok(())
        }
    }

    /// Mock scheduler recording requested delays
    pub struct MockScheduler {
        delays: RefCell<Vec<u32, MOCK_HISTORY_DEPTH>>,
    }

    impl MockScheduler {
        pub fn new() -> Self {
            Self {
                delays: RefCell::new(Vec::new()),
            }
        }

        /// All delays requested so far, in order
        pub fn delays(&self) -> Vec<u32, MOCK_HISTORY_DEPTH> {
            self.delays.borrow().clone()
        }
    }

    impl Default for MockScheduler {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RetryScheduler for MockScheduler {
        fn schedule_retry(&mut self, delay_ms: u32) {
            let _ = self.delays.borrow_mut().push(delay_ms);
        }
    }
}
