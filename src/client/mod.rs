pub mod discovery;
pub mod driver;
pub mod traits;

pub use discovery::{DiscoveryState, Phase};
pub use driver::{AncsClient, ClientError, ClientEvent, LinkEvent};
pub use traits::{
    ConnectionHandle, GattTransport, LinkSecurity, RetryScheduler, SecurityError, SecurityManager,
    TransportError,
};
