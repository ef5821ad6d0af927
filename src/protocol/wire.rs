// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frame headers exchanged with the variable service.
//!
//! Every frame starts with a command id and the total number of valid bytes
//! in the frame. Variable-length fields follow the header at the offsets the
//! header records. All integers are in native byte order.

use self::packed_nums::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

#[allow(non_camel_case_types)]
mod packed_nums {
    pub type u64_ne = zerocopy::U64<zerocopy::NativeEndian>;
}

/// GetVariable request header.
#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct GetVariableRequest {
    pub command_id: u32,
    pub length: u32,
    pub name_offset: u32,
    /// Size in bytes, including the terminator.
    pub name_size: u32,
    pub guid_offset: u32,
    pub guid_size: u32,
    /// Capacity of the caller's output buffer.
    pub data_size: u32,
}

/// GetVariable response header.
#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct GetVariableResponse {
    pub command_id: u32,
    pub length: u32,
    pub status: u32,
    pub attributes: u32,
    pub data_offset: u32,
    /// Size of the data, or the size required on `BUFFER_TOO_SMALL`.
    pub data_size: u32,
}

/// SetVariable request header.
#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct SetVariableRequest {
    pub command_id: u32,
    pub length: u32,
    pub name_offset: u32,
    /// Size in bytes, including the terminator.
    pub name_size: u32,
    pub guid_offset: u32,
    pub guid_size: u32,
    pub attributes: u32,
    pub data_offset: u32,
    pub data_size: u32,
}

/// SetVariable response header.
#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct SetVariableResponse {
    pub command_id: u32,
    pub length: u32,
    pub status: u32,
    pub _unknown1: u32,
    pub _unknown2: u32,
}

/// GetNextVariable request header.
#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct GetNextVariableRequest {
    pub command_id: u32,
    pub length: u32,
    pub guid_offset: u32,
    pub guid_size: u32,
    pub name_offset: u32,
    /// Size of the whole name buffer in bytes. The current name is
    /// terminated somewhere inside it.
    pub name_size: u32,
}

/// GetNextVariable response header.
#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct GetNextVariableResponse {
    pub command_id: u32,
    pub length: u32,
    pub status: u32,
    pub guid_offset: u32,
    pub guid_size: u32,
    pub name_offset: u32,
    /// Size in bytes, including the terminator. On `BUFFER_TOO_SMALL`, the
    /// size required.
    pub name_size: u32,
}

/// QueryVariableInfo request header.
#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryVariableInfoRequest {
    pub command_id: u32,
    pub length: u32,
    pub attributes: u32,
}

/// QueryVariableInfo response header.
#[repr(C)]
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct QueryVariableInfoResponse {
    pub command_id: u32,
    pub length: u32,
    pub status: u32,
    pub _pad: u32,
    pub storage_space: u64_ne,
    pub remaining_space: u64_ne,
    pub max_variable_size: u64_ne,
}

/// Envelope shared by every response header.
pub trait Response: FromBytes + KnownLayout + Immutable + Sized {
    fn command_id(&self) -> u32;
    fn length(&self) -> u32;
    fn status(&self) -> u32;
}

macro_rules! impl_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Response for $ty {
                fn command_id(&self) -> u32 {
                    self.command_id
                }

                fn length(&self) -> u32 {
                    self.length
                }

                fn status(&self) -> u32 {
                    self.status
                }
            }
        )*
    };
}

impl_response!(
    GetVariableResponse,
    SetVariableResponse,
    GetNextVariableResponse,
    QueryVariableInfoResponse,
);

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{align_of, size_of};

    #[test]
    fn test_header_sizes() {
        assert_eq!(size_of::<GetVariableRequest>(), 28);
        assert_eq!(size_of::<GetVariableResponse>(), 24);
        assert_eq!(size_of::<SetVariableRequest>(), 36);
        assert_eq!(size_of::<SetVariableResponse>(), 20);
        assert_eq!(size_of::<GetNextVariableRequest>(), 24);
        assert_eq!(size_of::<GetNextVariableResponse>(), 28);
        assert_eq!(size_of::<QueryVariableInfoRequest>(), 12);
        assert_eq!(size_of::<QueryVariableInfoResponse>(), 40);
        assert_eq!(align_of::<QueryVariableInfoResponse>(), 4);
    }
}
