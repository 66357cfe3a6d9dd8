//! Sequential-access handle over a shared device.
//!
//! A `Handle` owns one session and a file position. Reads and writes happen
//! at the position and advance it by the number of bytes transferred.
//! Dropping a handle releases its session.

use std::io::SeekFrom;
use std::sync::Arc;
use std::time::Duration;

use crate::device::{Device, DeviceError};
use crate::stats::SessionId;

/// Open file handle on a [`Device`]
pub struct Handle {
    device: Arc<Device>,
    session: SessionId,
    position: u64,
    /// Cleared once the session has been released
    open: bool,
}

impl Handle {
    /// Open a new session on `device`, positioned at offset 0
    pub fn open(device: Arc<Device>) -> Self {
        let session = device.open();
        Self {
            device,
            session,
            position: 0,
            open: true,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// Current file position
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read up to `len` bytes at the current position
    pub fn read(&mut self, len: usize) -> Vec<u8> {
        let data = self.device.read(self.position, len);
        self.position += data.len() as u64;
        data
    }

    /// Write `data` at the current position
    ///
    /// Returns the number of bytes stored.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, DeviceError> {
        let written = self.device.write(self.position, data)?;
        self.position += written as u64;
        Ok(written)
    }

    /// Move the file position
    ///
    /// `SeekFrom::End` is relative to the device capacity. Positions past
    /// the end are allowed; negative positions are not.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, DeviceError> {
        let (base, delta) = match pos {
            SeekFrom::Start(offset) => {
                self.position = offset;
                return Ok(offset);
            }
            SeekFrom::Current(delta) => (self.position, delta),
            SeekFrom::End(delta) => (self.device.capacity() as u64, delta),
        };

        let target = i128::from(base) + i128::from(delta);
        let position = u64::try_from(target).map_err(|_| DeviceError::InvalidSeek(target))?;
        self.position = position;
        Ok(position)
    }

    /// Release the session explicitly
    ///
    /// Returns how long the session was open.
    pub fn close(mut self) -> Result<Duration, DeviceError> {
        self.open = false;
        self.device.release(self.session)
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.device.release(self.session) {
                tracing::debug!(session = %self.session, error = %e, "release on drop failed");
            }
        }
    }
}
