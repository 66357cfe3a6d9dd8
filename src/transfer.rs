//! Copying bytes across the caller boundary.
//!
//! The host routes caller memory into the device through these traits.
//! Plain slices and vectors never fault; hosts whose caller memory can
//! disappear mid-call implement them and report [`TransferFault`].

/// Copy across the caller boundary failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Bad address: transfer of {len} bytes failed")]
pub struct TransferFault {
    pub len: usize,
}

/// Caller memory the device copies plaintext in from
pub trait UserSource {
    /// Fill `dst` from the first `dst.len()` bytes of caller memory
    fn copy_in(&self, dst: &mut [u8]) -> Result<(), TransferFault>;

    /// Bytes available from the caller
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Caller memory the device copies plaintext out to
pub trait UserSink {
    /// Hand `src` to the caller
    fn copy_out(&mut self, src: &[u8]) -> Result<(), TransferFault>;
}

impl UserSource for [u8] {
    fn copy_in(&self, dst: &mut [u8]) -> Result<(), TransferFault> {
        let src = self.get(..dst.len()).ok_or(TransferFault { len: dst.len() })?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn len(&self) -> usize {
        <[u8]>::len(self)
    }
}

impl UserSource for Vec<u8> {
    fn copy_in(&self, dst: &mut [u8]) -> Result<(), TransferFault> {
        self.as_slice().copy_in(dst)
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl UserSink for Vec<u8> {
    fn copy_out(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        self.extend_from_slice(src);
        Ok(())
    }
}

impl UserSink for [u8] {
    fn copy_out(&mut self, src: &[u8]) -> Result<(), TransferFault> {
        let dst = self.get_mut(..src.len()).ok_or(TransferFault { len: src.len() })?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_copies_prefix() {
        let src: &[u8] = b"abcdef";
        let mut dst = [0u8; 3];
        src.copy_in(&mut dst).unwrap();
        assert_eq!(&dst, b"abc");
    }

    #[test]
    fn test_short_source_faults() {
        let src: &[u8] = b"ab";
        let mut dst = [0u8; 3];
        assert_eq!(src.copy_in(&mut dst), Err(TransferFault { len: 3 }));
    }

    #[test]
    fn test_vec_sink_appends() {
        let mut sink = Vec::new();
        sink.copy_out(b"xy").unwrap();
        sink.copy_out(b"z").unwrap();
        assert_eq!(sink, b"xyz");
    }

    #[test]
    fn test_small_slice_sink_faults() {
        let mut dst = [0u8; 2];
        let sink: &mut [u8] = &mut dst;
        assert_eq!(sink.copy_out(b"abc"), Err(TransferFault { len: 3 }));
    }
}
