use log::trace;
use tokio::sync::mpsc::UnboundedSender;

/// Destination for an execution's standard output.
pub trait OutputSink {
    fn write(&mut self, text: &str);
}

/// Collects all output into one string.
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: String,
}

impl BufferSink {
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_output(self) -> String {
        self.buffer
    }
}

impl OutputSink for BufferSink {
    fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Forwards each non-blank line to a connection as soon as it is written.
///
/// Sending never blocks the host thread: the channel is unbounded and the
/// connection drains it on its own task. Once the connection is gone the
/// lines are dropped.
#[derive(Debug)]
pub struct StreamSink {
    chunks: UnboundedSender<String>,
    sent: usize,
}

impl StreamSink {
    pub fn new(chunks: UnboundedSender<String>) -> Self {
        Self { chunks, sent: 0 }
    }

    /// Lines handed to the channel so far.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl OutputSink for StreamSink {
    fn write(&mut self, text: &str) {
        for line in text.split('\n') {
            if line.trim().is_empty() {
                continue;
            }
            if self.chunks.send(line.to_string()).is_err() {
                trace!("Dropping streamed line: connection closed");
                continue;
            }
            self.sent += 1;
        }
    }
}
