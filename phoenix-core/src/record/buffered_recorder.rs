use super::{Record, RecordStorage, Recorder};

/// Buffered recorder.
///
/// Keeps every record in memory, e.g. the per-episode statistics of an
/// evaluation run.
#[derive(Debug, Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Aggregates the buffered records, see [`RecordStorage::aggregate`].
    pub fn aggregate(&self) -> Record {
        let mut storage = RecordStorage::new();
        for record in self.buf.iter() {
            storage.store(record.clone());
        }
        storage.aggregate()
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}
