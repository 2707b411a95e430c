pub mod handler;
pub mod record;

pub use handler::{
    FetchRequest, NotificationSequencer, SequencerOutput, DEFAULT_SCRIPT, FULL_SCRIPT,
};
pub use record::{encode_record, RecordBuffer, RecordError, RecordSink};
