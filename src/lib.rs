//! chardev - obfuscating in-memory character device
//!
//! This crate is the I/O and accounting engine of a byte-addressable
//! storage device. Callers open a session, read and write at explicit
//! offsets, and release the session; a separate path renders cumulative
//! usage statistics. It provides:
//! - Fixed-capacity buffer with offset-clamped reads and writes
//! - Single-byte XOR obfuscation of everything at rest
//! - Operation counters and per-session open-time accounting
//! - Thread-safe sharing of one device between many sessions
//!
//! ## Architecture
//!
//! ```text
//! Host (device node, routing, report rendering)
//!     ↓ open / read / write / release / report
//! Device ──── StatsTracker (counters, per-session timers, Clock)
//!     ↓ plaintext ↔ transform (XOR 0x41)
//! BoundedBuffer (capacity bytes, zeroized on drop)
//! ```
//!
//! Device registration and path routing live in the host, not here.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod buffer;
pub mod clock;
pub mod config;
pub mod device;
pub mod handle;
pub mod stats;
pub mod transfer;
pub mod transform;

pub use buffer::{BoundedBuffer, SpaceExhausted};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DeviceConfig, DEFAULT_CAPACITY};
pub use device::{Device, DeviceError};
pub use handle::Handle;
pub use stats::{SessionId, StatsSnapshot, StatsTracker, UnknownSession};
pub use transfer::{TransferFault, UserSink, UserSource};
pub use transform::{apply_in_place, transform, transform_byte, KEY};
