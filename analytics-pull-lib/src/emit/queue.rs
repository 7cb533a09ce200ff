use crate::report::ReportError;
use std::io::Write;
use tokio::sync::mpsc;

/// The host-facing shape of an emitted record: a flat JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Destination for emitted records.
///
/// Backpressure is the queue's business; a queue that can never accept more records
/// must fail with [`ReportError::SinkRejected`].
pub trait OutputQueue: Send {
    fn push(&mut self, record: Record) -> impl Future<Output = Result<(), ReportError>> + Send;
}

impl OutputQueue for Vec<Record> {
    async fn push(&mut self, record: Record) -> Result<(), ReportError> {
        Vec::push(self, record);
        Ok(())
    }
}

/// Queue that forwards records over a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelQueue {
    sender: mpsc::Sender<Record>,
}

impl ChannelQueue {
    #[must_use]
    pub const fn new(sender: mpsc::Sender<Record>) -> Self {
        Self { sender }
    }

    /// Create a queue together with the receiving half of its channel.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Record>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

impl OutputQueue for ChannelQueue {
    async fn push(&mut self, record: Record) -> Result<(), ReportError> {
        self.sender
            .send(record)
            .await
            .map_err(|_closed| ReportError::SinkRejected("output channel is closed".into()))
    }
}

/// Writes each record as one line of JSON.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn write(&mut self, record: &Record) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.writer, record).map_err(|e| ReportError::SinkRejected(e.to_string()))?;
        self.writer.write_all(b"\n").map_err(|e| ReportError::SinkRejected(e.to_string()))?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.writer.flush().map_err(|e| ReportError::SinkRejected(e.to_string()))
    }

    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> OutputQueue for JsonLinesSink<W> {
    async fn push(&mut self, record: Record) -> Result<(), ReportError> {
        self.write(&record)
    }
}
