//! Request queue and per-request processing.
//! The host delivers sector-addressed requests one at a time; the
//! processor validates each, drives the transfer, and pushes a
//! completion back for every request it fetched.

use crate::device::block::BlockDevice;
use crate::errors::DiskError;
use crate::geometry::Geometry;
use crate::logger;
use alloc::collections::VecDeque;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

/// Transfer direction of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// How the host classified the request.
/// Filesystem I/O arrives normalized into a sector range; anything else
/// reaches the device unshaped and is rejected whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Fs,
    Special,
}

/// One unit of I/O work, alive from delivery until its completion
#[derive(Debug)]
pub struct IoRequest {
    pub id: u64,
    pub class: RequestClass,
    pub direction: Direction,
    pub sector: u64,
    pub nr_sectors: u32,
    /// Transfer buffer, owned by the request while it is in flight.
    /// Source for writes, destination for reads; handed back in the
    /// completion.
    pub buffer: Vec<u8>,
}

/// Resolution status reported back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStatus {
    Ok,
    IoError,
}

/// Resolution of one request, including its buffer
#[derive(Debug)]
pub struct Completion {
    pub request_id: u64,
    pub status: IoStatus,
    pub bytes_transferred: usize,
    pub buffer: Vec<u8>,
}

/// The delivery/completion channel between the host and the processor.
/// Delivery may happen from any number of producers; requests are
/// fetched and completed strictly in delivery order.
pub struct RequestQueue {
    pending: Mutex<VecDeque<IoRequest>>,
    completed: Mutex<VecDeque<Completion>>,
    next_id: AtomicU64,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            completed: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Push one request onto the queue and return its ID
    pub fn deliver(
        &self,
        class: RequestClass,
        direction: Direction,
        sector: u64,
        nr_sectors: u32,
        buffer: Vec<u8>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = IoRequest {
            id,
            class,
            direction,
            sector,
            nr_sectors,
            buffer,
        };
        self.pending.lock().push_back(request);
        id
    }

    /// Take the oldest pending request, if any
    pub fn fetch(&self) -> Option<IoRequest> {
        self.pending.lock().pop_front()
    }

    /// Record the resolution of a fetched request
    pub fn complete(&self, completion: Completion) {
        self.completed.lock().push_back(completion);
    }

    /// Take the oldest completion, if any
    pub fn take_completion(&self) -> Option<Completion> {
        self.completed.lock().pop_front()
    }

    /// Number of requests waiting to be processed
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Number of completions waiting to be collected
    pub fn completed_len(&self) -> usize {
        self.completed.lock().len()
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains a request queue against one block device.
///
/// Every fetched request is resolved with a completion, success or
/// failure; no rejection ever halts the processor or the device.
pub struct RequestProcessor {
    device: Arc<dyn BlockDevice>,
    queue: Arc<RequestQueue>,
}

impl RequestProcessor {
    pub fn new(device: Arc<dyn BlockDevice>, queue: Arc<RequestQueue>) -> Self {
        Self { device, queue }
    }

    /// Geometry of the device this processor serves
    pub fn geometry(&self) -> Geometry {
        self.device.geometry()
    }

    /// Process one pending request.
    /// Returns `false` when the queue was empty, `true` otherwise.
    pub fn process_next(&self) -> bool {
        let mut request = match self.queue.fetch() {
            Some(request) => request,
            None => return false,
        };

        if request.class != RequestClass::Fs {
            self.reject(request, DiskError::UnsupportedRequest);
            return true;
        }

        let result = match request.direction {
            Direction::Read => {
                self.device
                    .read_sectors(request.sector, request.nr_sectors, &mut request.buffer)
            }
            Direction::Write => {
                self.device
                    .write_sectors(request.sector, request.nr_sectors, &request.buffer)
            }
        };

        match result {
            Ok(()) => {
                let bytes = request.buffer.len();
                logger::debug(
                    "request",
                    &format!(
                        "request {}: {:?} of {} sectors at {} done",
                        request.id, request.direction, request.nr_sectors, request.sector
                    ),
                );
                self.finish(request, IoStatus::Ok, bytes);
            }
            Err(error) => self.reject(request, error),
        }

        true
    }

    /// Process requests until the queue is idle; returns how many ran
    pub fn drain(&self) -> usize {
        let mut processed = 0;
        while self.process_next() {
            processed += 1;
        }
        processed
    }

    /// Log a rejection and resolve the request as a whole-request error.
    /// A rejected request must still complete, or it would sit in the
    /// host's queue forever.
    fn reject(&self, request: IoRequest, error: DiskError) {
        logger::error(
            "request",
            &format!(
                "request {}: {} (sector {}, {} sectors)",
                request.id, error, request.sector, request.nr_sectors
            ),
        );
        self.finish(request, IoStatus::IoError, 0);
    }

    fn finish(&self, request: IoRequest, status: IoStatus, bytes_transferred: usize) {
        self.queue.complete(Completion {
            request_id: request.id,
            status,
            bytes_transferred,
            buffer: request.buffer,
        });
    }
}
