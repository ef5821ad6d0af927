// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facilities for dealing with operation results.
//!
//! Three status vocabularies meet in this crate:
//!
//! - [`SecureStatus`], the 32-bit code the secure application writes into
//!   a response frame;
//! - [`Status`], the native-width UEFI status handed to callers;
//! - [`Errno`], a small generic error vocabulary for callers that do not
//!   speak UEFI statuses.

/// The error type that we use, essentially a status code + optional additional data
mod error;
pub use self::error::Error;

/// Definition of UEFI's standard status codes
mod status;
pub use self::status::{Status, StatusExt};

mod secure;
pub use self::secure::SecureStatus;

mod errno;
pub use self::errno::Errno;

/// Return type of most operations. Both success and error payloads are optional.
///
/// This type alias maps [`Status::SUCCESS`] to the `Ok` variant (with optional
/// `Output` data), and maps both warning and error statuses to the `Err`
/// variant (with optional `ErrData`).
pub type Result<Output = (), ErrData = ()> = core::result::Result<Output, Error<ErrData>>;
