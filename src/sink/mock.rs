//! Recording sink for tests.

use std::sync::{Arc, Mutex};

use super::{Line, LineSink, SinkError};

type WriteLog = Arc<Mutex<Vec<(Line, bool)>>>;

/// Records every line write; optionally fails each write after recording it
/// to exercise the best-effort error path.
pub struct RecordingSink {
    writes: WriteLog,
    fail_writes: bool,
}

impl RecordingSink {
    pub fn new() -> (Self, WriteLog) {
        let writes: WriteLog = Arc::default();
        let sink = Self {
            writes: writes.clone(),
            fail_writes: false,
        };
        (sink, writes)
    }

    pub fn failing() -> (Self, WriteLog) {
        let (mut sink, writes) = Self::new();
        sink.fail_writes = true;
        (sink, writes)
    }
}

impl LineSink for RecordingSink {
    fn set_line(&mut self, line: Line, high: bool) -> Result<(), SinkError> {
        self.writes.lock().unwrap().push((line, high));
        if self.fail_writes {
            return Err(SinkError::WriteError(line, "injected failure".to_string()));
        }
        Ok(())
    }
}
