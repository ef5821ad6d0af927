// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frame codec of the variable service.
//!
//! A call stages a request frame at the start of the arena and lets the
//! secure application write its response frame right behind it:
//!
//! ```text
//! +----------------+------+-------+------+-----------------+------------+
//! | request header | name | guid  | data | response header | out fields |
//! +----------------+------+-------+------+-----------------+------------+
//! ^ aligned(0)                           ^ aligned(request length)
//! ```
//!
//! Every variable-length field starts at the next [`DMA_ALIGNMENT`] boundary
//! after the previous one. Request frames are laid out with a
//! [`FrameBuilder`]; the arena is sized beforehand with [`size_bound`].
//! Responses are untrusted until [`read_response`] and [`response_field`]
//! have checked them.

#[allow(missing_docs)]
pub mod wire;
pub use self::wire::Response;

use crate::mem::{align_up, DMA_ALIGNMENT};
use crate::{Result, Status};
use core::marker::PhantomData;
use core::mem::size_of;
use log::warn;
use zerocopy::{Immutable, IntoBytes};

newtype_enum! {
    /// Operation tag carried in the `command_id` field of every frame.
    pub enum CommandId: u32 => {
        /// Read a variable.
        GET_VARIABLE = 0x8000,
        /// Write or delete a variable.
        SET_VARIABLE = 0x8001,
        /// Advance a variable enumeration.
        GET_NEXT_VARIABLE = 0x8002,
        /// Query storage statistics.
        QUERY_VARIABLE_INFO = 0x8003,
    }
}

/// Position of a variable-length field within a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Field {
    /// Offset from the start of the frame.
    pub offset: u32,
    /// Size in bytes.
    pub size: u32,
}

/// Upper bound on the arena size needed by one call.
///
/// `request` and `response` list the header size followed by the size of
/// every variable-length field of the respective frame. Each entry is an
/// independently aligned piece and gets `DMA_ALIGNMENT - 1` bytes of slack,
/// so the bound holds no matter where the arena itself starts.
///
/// Returns `None` if the bound does not fit the 32-bit sizes used on the
/// wire.
#[must_use]
pub fn size_bound(request: &[usize], response: &[usize]) -> Option<usize> {
    let mut total: usize = 0;
    for &size in request.iter().chain(response) {
        total = total.checked_add(size)?.checked_add(DMA_ALIGNMENT - 1)?;
    }

    if u32::try_from(total).is_err() {
        return None;
    }
    Some(total)
}

/// Lays out a request frame with header `H`.
///
/// Room for the header is reserved up front; fields are appended after it
/// and the header is written last, once all offsets are known.
///
/// The buffer must be large enough for everything appended. Running out of
/// room means the arena was sized with a wrong bound and is treated as a
/// bug.
#[derive(Debug)]
pub struct FrameBuilder<'a, H> {
    buf: &'a mut [u8],
    len: usize,
    _header: PhantomData<H>,
}

impl<'a, H: IntoBytes + Immutable> FrameBuilder<'a, H> {
    /// Start a frame at the beginning of `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` cannot hold the header, or is larger than what
    /// 32-bit offsets can address.
    pub fn new(buf: &'a mut [u8]) -> Self {
        assert!(buf.len() >= size_of::<H>(), "frame header exceeds arena");
        let limit = buf.len().min(u32::MAX as usize);
        Self {
            buf: &mut buf[..limit],
            len: size_of::<H>(),
            _header: PhantomData,
        }
    }

    /// Number of bytes laid out so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Append a field holding `bytes` at the next aligned offset.
    ///
    /// # Panics
    ///
    /// Panics if the field does not fit the buffer.
    pub fn append(&mut self, bytes: &[u8]) -> Field {
        let field = self.reserve(bytes.len());
        let start = field.offset as usize;
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
        field
    }

    /// Append a zeroed field of `size` bytes at the next aligned offset and
    /// return it along with its bytes.
    ///
    /// # Panics
    ///
    /// Panics if the field does not fit the buffer.
    pub fn append_zeroed(&mut self, size: usize) -> (Field, &mut [u8]) {
        let field = self.reserve(size);
        let start = field.offset as usize;
        let bytes = &mut self.buf[start..start + size];
        bytes.fill(0);
        (field, bytes)
    }

    fn reserve(&mut self, size: usize) -> Field {
        let offset = align_up(self.len, DMA_ALIGNMENT).expect("frame offset overflow");
        let end = offset.checked_add(size).expect("frame size overflow");
        assert!(end <= self.buf.len(), "frame field exceeds arena");

        self.len = end;
        // `end` fits the buffer, whose length fits 32 bits.
        Field {
            offset: offset as u32,
            size: size as u32,
        }
    }

    /// Write `header` and return the length of the frame.
    pub fn finish(self, header: &H) -> usize {
        self.buf[..size_of::<H>()].copy_from_slice(header.as_bytes());
        self.len
    }
}

/// Read and validate the header of a response frame.
///
/// `frame` covers the response area offered to the secure side. The
/// envelope must echo `command`, and its `length` must cover at least the
/// header without exceeding `frame`.
///
/// # Errors
///
/// [`Status::DEVICE_ERROR`] if any check fails.
pub fn read_response<R: Response>(frame: &[u8], command: CommandId) -> Result<R> {
    let Ok((header, _)) = R::read_from_prefix(frame) else {
        warn!("response area of {} bytes cannot hold a header", frame.len());
        return Err(Status::DEVICE_ERROR.into());
    };

    if header.command_id() != command.0 {
        warn!(
            "response command id {:#x} does not match request {:?}",
            header.command_id(),
            command
        );
        return Err(Status::DEVICE_ERROR.into());
    }

    let length = header.length() as usize;
    if length < size_of::<R>() || length > frame.len() {
        warn!(
            "response length {length} out of bounds ({}..={})",
            size_of::<R>(),
            frame.len()
        );
        return Err(Status::DEVICE_ERROR.into());
    }

    Ok(header)
}

/// Get the bytes of a field declared by a validated response header.
///
/// # Errors
///
/// [`Status::DEVICE_ERROR`] if the field reaches beyond `length`.
pub fn response_field(frame: &[u8], length: u32, offset: u32, size: u32) -> Result<&[u8]> {
    let end = offset.checked_add(size).filter(|&end| end <= length);
    match end {
        Some(end) if end as usize <= frame.len() => Ok(&frame[offset as usize..end as usize]),
        _ => {
            warn!("response field {offset:#x}+{size:#x} exceeds frame length {length:#x}");
            Err(Status::DEVICE_ERROR.into())
        }
    }
}
