//! # Targzip Decode Pipe (`common::archive::pipe`)
//!
//! File: cli/src/common/archive/pipe.rs
//!
//! ## Overview
//!
//! Reading a `.tar.gz` splits into two stages that run on different threads: a
//! background worker inflates the gzip stream, and the calling thread parses tar
//! entries from the inflated bytes. The two are joined by a channel of byte chunks.
//!
//! ## Architecture
//!
//! - **Worker**: Owns the compressed source wrapped in a `flate2` `GzDecoder`. Reads
//!   `chunk_size` bytes at a time and sends each chunk down the channel. A decode error
//!   is sent as the last message and also becomes the worker's return value. When the
//!   receiving side is gone the worker stops quietly.
//! - **`PipeReader`**: The read end. Implements `std::io::Read` over the channel, so the
//!   `tar` reader consumes it like any file. A closed channel reads as end-of-stream.
//! - **`DecodePipe`**: Ties the two together and owns the worker's `JoinHandle`.
//!   `finish` drains whatever the tar reader left unread (end-of-archive padding) so the
//!   gzip trailer is verified, then joins the worker. `abandon` closes the read end first
//!   so a worker blocked on a full channel can exit, then joins it.
//!
//! The handoff mode (see `Handoff`) decides the channel:
//!
//! - `Overlapped`: bounded to `pipe_capacity` chunks. Decoding and parsing overlap and
//!   memory stays bounded; a full channel blocks the worker until the reader catches up.
//! - `DrainFirst`: unbounded, and `spawn` joins the worker before returning. The whole
//!   decoded container is held in memory, and a corrupt stream fails before the first
//!   entry is read.
//!
//! Every failure of the worker reaches the caller: decode errors as
//! `TargzipError::MalformedArchive` (or `Io`), a panic as `TargzipError::WorkerFailed`.
//!
use super::{ArchiveSettings, Handoff};
use crate::common::fs::io as fsio;
use crate::core::error::{Result, TargzipError};
use crossbeam_channel::{Receiver, Sender};
use flate2::read::GzDecoder;
use std::any::Any;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

type Chunk = io::Result<Vec<u8>>;

/// How the decode worker stopped without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerExit {
    /// Reached the end of the gzip stream; carries the decoded byte count.
    Finished(u64),
    /// The read end was dropped before the stream ended.
    ConsumerGone,
}

/// Read end of the decode pipe.
pub struct PipeReader {
    rx: Receiver<Chunk>,
    current: Vec<u8>,
    offset: usize,
}

impl PipeReader {
    fn new(rx: Receiver<Chunk>) -> Self {
        Self {
            rx,
            current: Vec::new(),
            offset: 0,
        }
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.offset >= self.current.len() {
            match self.rx.recv() {
                Ok(Ok(chunk)) => {
                    self.current = chunk;
                    self.offset = 0;
                }
                Ok(Err(e)) => return Err(e),
                // Worker is done and every chunk has been consumed.
                Err(_) => return Ok(0),
            }
        }
        let available = &self.current[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

fn pump<R: Read>(mut decoder: R, tx: Sender<Chunk>, chunk_size: usize) -> io::Result<WorkerExit> {
    let mut total = 0u64;
    loop {
        let mut chunk = vec![0u8; chunk_size];
        let n = match decoder.read(&mut chunk) {
            Ok(0) => return Ok(WorkerExit::Finished(total)),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                // The reader gets a copy; the original is the worker's result.
                let _ = tx.send(Err(io::Error::new(e.kind(), e.to_string())));
                return Err(e);
            }
        };
        chunk.truncate(n);
        total += n as u64;
        if tx.send(Ok(chunk)).is_err() {
            return Ok(WorkerExit::ConsumerGone);
        }
    }
}

/// A background gzip decoder feeding a `PipeReader`.
pub struct DecodePipe {
    reader: PipeReader,
    worker: Option<JoinHandle<io::Result<WorkerExit>>>,
    decoded: Option<u64>,
}

impl DecodePipe {
    /// Starts decoding `compressed` on a background thread.
    ///
    /// With `Handoff::DrainFirst` this returns only after the whole stream has been
    /// decoded, and fails if decoding failed.
    pub fn spawn<R>(compressed: R, settings: &ArchiveSettings) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = match settings.handoff {
            Handoff::Overlapped => crossbeam_channel::bounded(settings.pipe_capacity.max(1)),
            Handoff::DrainFirst => crossbeam_channel::unbounded(),
        };
        let chunk_size = settings.chunk_size.max(1);
        let handle = thread::Builder::new()
            .name("targzip-gunzip".to_string())
            .spawn(move || pump(GzDecoder::new(compressed), tx, chunk_size))
            .map_err(|e| TargzipError::io("spawning the gzip decode worker", e))?;
        debug!("Started decode worker ({:?} handoff)", settings.handoff);

        let mut pipe = Self {
            reader: PipeReader::new(rx),
            worker: Some(handle),
            decoded: None,
        };
        if settings.handoff == Handoff::DrainFirst {
            if let Some(handle) = pipe.worker.take() {
                pipe.decoded = join_worker(handle)?;
            }
        }
        Ok(pipe)
    }

    pub fn reader(&mut self) -> &mut PipeReader {
        &mut self.reader
    }

    /// Consumes what is left in the pipe and waits for the worker.
    ///
    /// Returns the total number of decoded bytes.
    pub fn finish(self) -> Result<u64> {
        let DecodePipe {
            mut reader,
            worker,
            decoded,
        } = self;
        let drained = io::copy(&mut reader, &mut io::sink());
        drop(reader);
        let joined = match worker {
            Some(handle) => join_worker(handle)?,
            None => None,
        };
        let drained = drained
            .map_err(|e| TargzipError::from_archive_read("draining the decoded stream", e))?;
        if drained > 0 {
            debug!("Drained {} trailing bytes after the last entry", drained);
        }
        Ok(joined.or(decoded).unwrap_or_default())
    }

    /// Stops reading early and waits for the worker to notice.
    ///
    /// Fails only if the worker itself failed.
    pub fn abandon(self) -> Result<()> {
        let DecodePipe { reader, worker, .. } = self;
        drop(reader);
        if let Some(handle) = worker {
            join_worker(handle)?;
        }
        Ok(())
    }
}

/// Joins the worker; `Ok(None)` means it stopped because the reader went away.
fn join_worker(handle: JoinHandle<io::Result<WorkerExit>>) -> Result<Option<u64>> {
    match handle.join() {
        Ok(Ok(WorkerExit::Finished(total))) => {
            debug!("Decode worker finished after {} bytes", total);
            Ok(Some(total))
        }
        Ok(Ok(WorkerExit::ConsumerGone)) => {
            debug!("Decode worker stopped: reader closed");
            Ok(None)
        }
        Ok(Err(e)) => Err(TargzipError::from_archive_read("decoding gzip stream", e).into()),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("Decode worker panicked: {}", message);
            Err(TargzipError::WorkerFailed(message).into())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker thread panicked".to_string()
    }
}

/// Opens the `.tar.gz` at `path`, decodes it in the background and hands the decoded
/// stream to `consume`.
///
/// On success the rest of the stream is drained and verified. When `consume` fails the
/// worker is stopped; if the worker had failed too, its error is reported instead since
/// it is the root cause.
pub fn with_decoded<T, F>(path: &Path, settings: &ArchiveSettings, consume: F) -> Result<T>
where
    F: FnOnce(&mut PipeReader) -> Result<T>,
{
    let file = fsio::open_file(path)?;
    let mut pipe = DecodePipe::spawn(BufReader::new(file), settings)?;
    match consume(pipe.reader()) {
        Ok(value) => {
            pipe.finish()?;
            Ok(value)
        }
        Err(consumer_err) => match pipe.abandon() {
            Err(worker_err) => Err(worker_err),
            Ok(()) => Err(consumer_err),
        },
    }
}
