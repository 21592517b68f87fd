//! Streaming access to session log files.

use crate::{LogRecord, TrawlResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A lazy sequence of decoded records.
///
/// Blank and undecodable lines are skipped. An I/O error ends the sequence
/// as if the file had been truncated there. Reopen the file to restart.
pub struct RecordReader<R> {
    reader: R,
    line_num: usize,
    buf: Vec<u8>,
}

impl RecordReader<BufReader<File>> {
    /// Open a session log for streaming.
    pub fn open<P: AsRef<Path>>(path: P) -> TrawlResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_num: 0,
            buf: Vec::new(),
        }
    }

    /// 1-indexed number of the last line read.
    pub fn line_num(&self) -> usize {
        self.line_num
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = LogRecord;

    fn next(&mut self) -> Option<LogRecord> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(line = self.line_num + 1, error = %e, "stopping at unreadable line");
                    return None;
                }
            }
            self.line_num += 1;

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<LogRecord>(&self.buf) {
                Ok(record) => return Some(record),
                Err(e) => {
                    tracing::debug!(line = self.line_num, error = %e, "skipping undecodable line");
                }
            }
        }
    }
}

/// Read every decodable record of a file into memory.
pub fn read_records<P: AsRef<Path>>(path: P) -> TrawlResult<Vec<LogRecord>> {
    Ok(RecordReader::open(path)?.collect())
}
