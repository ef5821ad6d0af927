// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data types used by the variable service: GUIDs and UCS-2 strings.

#[macro_use]
mod enums;

mod chars;
pub use self::chars::{Char16, NUL_16};

mod strs;
pub use self::strs::{CStr16, FromSliceWithNulError, FromStrWithBufError};

#[cfg(feature = "alloc")]
mod owned_strs;
#[cfg(feature = "alloc")]
pub use self::owned_strs::{CString16, FromStrError};

pub use uguid::Guid;

/// Size in bytes of a [`Guid`] on the wire.
pub const GUID_SIZE: usize = core::mem::size_of::<Guid>();
