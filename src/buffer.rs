//! Fixed-capacity byte store with offset-clamped reads and writes.
//!
//! The buffer knows nothing about obfuscation or accounting; it holds
//! whatever bytes it is given. Callers serialize access (the device keeps
//! it behind a mutex).
//!
//! # Bounds
//!
//! - Reads starting at or past capacity return an empty result
//! - Writes starting at or past capacity fail with [`SpaceExhausted`]
//! - Any other request is clamped to `capacity - offset`

use std::collections::TryReserveError;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Write offset at or past the end of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No space left at offset {offset} (capacity {capacity})")]
pub struct SpaceExhausted {
    pub offset: u64,
    pub capacity: usize,
}

/// Fixed-capacity buffer, zeroized on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BoundedBuffer {
    data: Vec<u8>,
}

impl BoundedBuffer {
    /// Allocate a zero-filled buffer of exactly `capacity` bytes
    pub fn try_new(capacity: usize) -> Result<Self, TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)?;
        data.resize(capacity, 0);
        Ok(Self { data })
    }

    /// Buffer capacity in bytes
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Raw stored bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Clamp `[offset, offset + len)` to the buffer, or `None` if `offset`
    /// is at or past capacity
    fn clamp(&self, offset: u64, len: usize) -> Option<(usize, usize)> {
        let start = usize::try_from(offset).ok().filter(|&s| s < self.data.len())?;
        let len = len.min(self.data.len() - start);
        Some((start, start + len))
    }

    /// Read up to `len` bytes starting at `offset`
    #[must_use]
    pub fn read(&self, offset: u64, len: usize) -> &[u8] {
        match self.clamp(offset, len) {
            Some((start, end)) => &self.data[start..end],
            None => &[],
        }
    }

    /// Write as much of `data` as fits starting at `offset`
    ///
    /// Returns the number of bytes stored.
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<usize, SpaceExhausted> {
        let (start, end) = self.clamp(offset, data.len()).ok_or(SpaceExhausted {
            offset,
            capacity: self.data.len(),
        })?;
        let written = end - start;
        self.data[start..end].copy_from_slice(&data[..written]);
        Ok(written)
    }
}
