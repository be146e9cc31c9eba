use crate::consts::PROGRESS_FLUSH_INTERVAL;
use crate::error::MsaResult;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// One row of the per-iteration trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressRecord {
    pub iteration: usize,
    pub max_length: usize,
    pub temperature: f64,
    pub current_score: f64,
    pub iteration_score: f64,
    pub new_score: f64,
    pub score_change: f64,
    pub score_change_pct: f64,
    pub best_score: f64,
    pub historical_improvement: f64,
    pub historical_improvement_pct: f64,
    pub total_accepted: usize,
    pub total_rejected: usize,
    pub accepted: bool,
    pub no_changes: usize,
    pub acceptance: f64,
    pub alignment_calls: u64,
    pub alignment_hits: u64,
    pub column_calls: u64,
    pub column_hits: u64,
}

/// Destination of progress records. Runs on the logging worker thread.
pub trait ProgressSink: Send + 'static {
    fn write_record(&mut self, record: &ProgressRecord) -> MsaResult<()>;

    fn flush(&mut self) -> MsaResult<()> {
        Ok(())
    }
}

/// Tab-delimited writer with a header row.
pub struct CsvSink<W: Write + Send + 'static> {
    writer: csv::Writer<W>,
}

impl<W: Write + Send + 'static> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_writer(inner);
        Self { writer }
    }
}

impl CsvSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> MsaResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send + 'static> ProgressSink for CsvSink<W> {
    fn write_record(&mut self, record: &ProgressRecord) -> MsaResult<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    fn flush(&mut self) -> MsaResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Outcome of the logging worker once drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogReport {
    pub submitted: usize,
    pub written: usize,
    pub failed: usize,
}

/// Handle to the single background writer of progress records.
///
/// Records are written in submission order over an unbounded channel, so
/// none are dropped. `finish` (or dropping the handle) closes the channel
/// and waits for the worker to write everything already submitted. Write
/// and flush errors are counted and never reach the annealing loop.
pub struct ProgressLog {
    sender: Option<Sender<ProgressRecord>>,
    worker: Option<JoinHandle<LogReport>>,
    submitted: usize,
}

impl ProgressLog {
    pub fn spawn<S: ProgressSink>(mut sink: S) -> MsaResult<Self> {
        let (tx, rx) = mpsc::channel::<ProgressRecord>();

        let worker = thread::Builder::new()
            .name("msasa-progress".into())
            .spawn(move || {
                let mut report = LogReport::default();
                let mut pending = 0;
                for record in rx {
                    match sink.write_record(&record) {
                        Ok(()) => pending += 1,
                        Err(e) => {
                            if report.failed == 0 {
                                warn!("Progress record {} not written: {}", record.iteration, e);
                            }
                            report.failed += 1;
                        }
                    }
                    if pending >= PROGRESS_FLUSH_INTERVAL {
                        settle(&mut sink, &mut report, &mut pending);
                    }
                }
                settle(&mut sink, &mut report, &mut pending);
                report
            })?;

        Ok(Self {
            sender: Some(tx),
            worker: Some(worker),
            submitted: 0,
        })
    }

    /// A log that discards every record.
    pub fn disabled() -> Self {
        Self {
            sender: None,
            worker: None,
            submitted: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Hands a record to the worker without blocking on I/O.
    pub fn submit(&mut self, record: ProgressRecord) {
        let Some(tx) = &self.sender else {
            return;
        };
        self.submitted += 1;
        if tx.send(record).is_err() {
            // The worker is gone (it panicked); the loop keeps going.
            debug!("Progress worker unavailable, record discarded");
        }
    }

    /// Waits for every submitted record to be handled.
    pub fn finish(mut self) -> LogReport {
        self.drain()
    }

    fn drain(&mut self) -> LogReport {
        drop(self.sender.take());
        let Some(worker) = self.worker.take() else {
            return LogReport {
                submitted: self.submitted,
                ..LogReport::default()
            };
        };

        match worker.join() {
            Ok(mut report) => {
                report.submitted = self.submitted;
                report.failed = self.submitted - report.written;
                report
            }
            Err(_) => {
                warn!("Progress worker panicked; trailing records lost");
                LogReport {
                    submitted: self.submitted,
                    written: 0,
                    failed: self.submitted,
                }
            }
        }
    }
}

/// Buffered records only count as written once a flush succeeds.
fn settle<S: ProgressSink>(sink: &mut S, report: &mut LogReport, pending: &mut usize) {
    match sink.flush() {
        Ok(()) => report.written += *pending,
        Err(e) => {
            warn!("Progress log flush failed, {} records lost: {}", pending, e);
            report.failed += *pending;
        }
    }
    *pending = 0;
}

impl Drop for ProgressLog {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.drain();
        }
    }
}
