//! Dead-letter sink: where messages land when their destination has no
//! registered cell.
//!
//! There is no broader pub-sub channel system here, but the default
//! behavior — log and drop — sits behind a pluggable trait so a test can
//! swap in a collector instead of asserting against logs.

use tracing::warn;

use crate::identity::Identity;
use crate::message::Message;

pub trait DeadLetterSink: Send + Sync {
    fn deliver(&self, dest: Option<Identity>, msg: Message);
}

/// Default sink: structured-log and drop.
pub struct LoggingDeadLetterSink;

impl DeadLetterSink for LoggingDeadLetterSink {
    fn deliver(&self, dest: Option<Identity>, msg: Message) {
        warn!(?dest, tag = msg.tag, source = ?msg.source, "dead letter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_sink_does_not_panic() {
        let sink = LoggingDeadLetterSink;
        sink.deliver(Some(Identity::new()), Message::new(1u8, 0));
        sink.deliver(None, Message::new(1u8, 0));
    }
}
