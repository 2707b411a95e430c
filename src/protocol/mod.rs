pub mod codec;
pub mod reassembly;
pub mod types;

pub use codec::{
    decode_fragment_header, decode_notification, encode_attribute_request,
    encode_notification_action, CodecError, FragmentHeader,
};
pub use reassembly::{AttributeBuffer, FragmentReassembler, ReassemblyError};
pub use types::{ActionId, AttributeId, CategoryId, CommandId, EventFlags, EventId, Notification};
