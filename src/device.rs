//! The device: obfuscated bounded storage plus usage accounting.
//!
//! Composes the buffer, the byte transform and the statistics tracker to
//! answer open/read/write/release and to render the usage report.
//!
//! # Concurrency
//!
//! A `Device` is shared between callers (typically as `Arc<Device>`); every
//! operation takes `&self`.
//! - Buffer access is serialized by a mutex, so concurrent writes to
//!   overlapping ranges never interleave within one call
//! - Counters are atomic
//! - Each session has its own timer, so overlapping sessions are timed
//!   independently

use std::collections::TryReserveError;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::buffer::{BoundedBuffer, SpaceExhausted};
use crate::clock::{Clock, SystemClock};
use crate::config::DeviceConfig;
use crate::stats::{SessionId, StatsSnapshot, StatsTracker, UnknownSession};
use crate::transfer::{TransferFault, UserSink, UserSource};
use crate::transform;

const ENOMEM: i32 = 12;
const EBADF: i32 = 9;
const EFAULT: i32 = 14;
const EINVAL: i32 = 22;
const ENOSPC: i32 = 28;

/// Error types for device operations
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to allocate {capacity} byte buffer: {source}")]
    AllocationFailure {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },
    #[error(transparent)]
    SpaceExhausted(#[from] SpaceExhausted),
    #[error(transparent)]
    TransferFault(#[from] TransferFault),
    #[error(transparent)]
    UnknownSession(#[from] UnknownSession),
    #[error("Invalid seek to position {0}")]
    InvalidSeek(i128),
}

impl DeviceError {
    /// Conventional negative errno for hosts that report errors that way
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            DeviceError::AllocationFailure { .. } => -ENOMEM,
            DeviceError::SpaceExhausted(_) => -ENOSPC,
            DeviceError::TransferFault(_) => -EFAULT,
            DeviceError::UnknownSession(_) => -EBADF,
            DeviceError::InvalidSeek(_) => -EINVAL,
        }
    }
}

/// Obfuscating fixed-capacity device
pub struct Device {
    config: DeviceConfig,
    /// Only ever holds transformed bytes
    buffer: Mutex<BoundedBuffer>,
    stats: StatsTracker,
}

impl Device {
    /// Allocate the buffer and start with zeroed statistics
    pub fn init(config: DeviceConfig) -> Result<Self, DeviceError> {
        Self::init_with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`Device::init`], timing sessions with a custom clock
    pub fn init_with_clock(
        config: DeviceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DeviceError> {
        let capacity = config.capacity();
        let buffer = BoundedBuffer::try_new(capacity).map_err(|source| {
            tracing::error!(capacity, "failed to allocate device buffer");
            DeviceError::AllocationFailure { capacity, source }
        })?;

        tracing::info!(capacity, "device initialised");

        Ok(Self {
            config,
            buffer: Mutex::new(buffer),
            stats: StatsTracker::with_clock(clock),
        })
    }

    /// Buffer capacity in bytes
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Open a session
    ///
    /// Always succeeds; the buffer already exists.
    pub fn open(&self) -> SessionId {
        self.stats.record_open();
        let id = self.stats.begin_session();
        tracing::debug!(session = %id, "session opened");
        id
    }

    /// Close a session, adding its elapsed time to the lifetime total
    pub fn release(&self, id: SessionId) -> Result<Duration, DeviceError> {
        match self.stats.end_session(id) {
            Ok(elapsed) => {
                tracing::debug!(session = %id, ?elapsed, "session released");
                Ok(elapsed)
            }
            Err(e) => {
                tracing::warn!(session = %id, "release of unknown session");
                Err(e.into())
            }
        }
    }

    /// Fetch and decrypt up to `len` bytes at `offset`
    fn fetch(&self, offset: u64, len: usize) -> Vec<u8> {
        let mut plain = self.buffer.lock().read(offset, len).to_vec();
        transform::apply_in_place(&mut plain);
        if plain.len() < len {
            tracing::debug!(offset, requested = len, returned = plain.len(), "read clamped");
        }
        plain
    }

    /// Read up to `len` plaintext bytes at `offset`
    ///
    /// Returns an empty vector when `offset` is at or past capacity.
    #[must_use]
    pub fn read(&self, offset: u64, len: usize) -> Vec<u8> {
        let plain = self.fetch(offset, len);
        if !plain.is_empty() {
            self.stats.record_read_success();
        }
        plain
    }

    /// Read up to `len` plaintext bytes at `offset` into caller memory
    ///
    /// Returns the number of bytes delivered. A failed copy-out is not
    /// counted as a read.
    pub fn read_into<S>(&self, offset: u64, len: usize, sink: &mut S) -> Result<usize, DeviceError>
    where
        S: UserSink + ?Sized,
    {
        let plain = self.fetch(offset, len);
        if plain.is_empty() {
            return Ok(0);
        }

        if let Err(fault) = sink.copy_out(&plain) {
            tracing::warn!(offset, len = plain.len(), "copy to caller failed");
            return Err(fault.into());
        }

        self.stats.record_read_success();
        Ok(plain.len())
    }

    /// Write plaintext `data` at `offset`
    ///
    /// Returns the number of bytes stored, which is less than `data.len()`
    /// when the write runs past capacity.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<usize, DeviceError> {
        self.write_from(offset, data.len(), data)
    }

    /// Write `len` plaintext bytes from caller memory at `offset`
    ///
    /// The caller's bytes are copied into scratch space before anything is
    /// stored, so a failed copy-in leaves the buffer and counters untouched.
    /// A source shorter than the (clamped) length faults without being read.
    pub fn write_from<S>(&self, offset: u64, len: usize, source: &S) -> Result<usize, DeviceError>
    where
        S: UserSource + ?Sized,
    {
        let capacity = self.capacity();
        let start = match usize::try_from(offset) {
            Ok(start) if start < capacity => start,
            _ => {
                tracing::debug!(offset, capacity, "write past end of device");
                return Err(SpaceExhausted { offset, capacity }.into());
            }
        };

        let len = len.min(capacity - start);
        if source.len() < len {
            tracing::warn!(offset, len, available = source.len(), "caller source too short");
            return Err(TransferFault { len }.into());
        }
        let mut scratch = vec![0u8; len];
        if let Err(fault) = source.copy_in(&mut scratch) {
            tracing::warn!(offset, len, "copy from caller failed");
            return Err(fault.into());
        }
        transform::apply_in_place(&mut scratch);

        let written = self.buffer.lock().write(offset, &scratch)?;
        if written > 0 {
            self.stats.record_write_success();
        }
        Ok(written)
    }

    /// Current statistics
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Four-line usage report
    #[must_use]
    pub fn report(&self) -> String {
        self.snapshot().to_string()
    }

    /// Number of sessions currently open
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.stats.active_sessions()
    }

    /// Copy of the stored (transformed) bytes
    #[must_use]
    pub fn stored_bytes(&self) -> Vec<u8> {
        self.buffer.lock().as_bytes().to_vec()
    }

    /// Free the buffer
    ///
    /// The buffer is zeroized on drop, so dropping a `Device` without
    /// calling this releases it as well.
    pub fn teardown(self) {
        let snap = self.snapshot();
        let active = self.active_sessions();
        if active > 0 {
            tracing::warn!(active, "teardown with sessions still open");
        }
        tracing::info!(
            opens = snap.open_count,
            writes = snap.write_count,
            reads = snap.read_count,
            "device torn down"
        );
    }
}
