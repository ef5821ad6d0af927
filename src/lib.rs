// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the UEFI variable service of a TrustZone secure application.
//!
//! Some platforms keep their UEFI variables inside a secure application
//! running in the trusted execution environment. The normal world cannot
//! touch that storage directly: it writes a request frame into a shared DMA
//! buffer, traps into the secure monitor, and reads back the response frame
//! the secure side left in the same buffer.
//!
//! # Crate organisation
//!
//! - [`result`]: status codes, the [`Error`] type and the translation of the
//!   secure application's 32-bit status codes into [`Status`].
//! - [`mem`]: the [`Arena`], a single growable DMA buffer that stages one
//!   request/response pair at a time.
//! - [`tee`]: the secure-monitor call descriptor and the two secure OS
//!   services this crate needs (resolving an application id and sending a
//!   request to an application).
//! - [`protocol`]: wire layouts of the variable service frames.
//! - [`UefiSecApp`]: the client implementing the four variable operations.
//! - [`Registry`]: owner of the one active client, serializing every call.
//! - [`VariableStore`] / [`VariableStoreExt`]: the callback interface a
//!   variable framework consumes, plus convenience wrappers.
//!
//! Two collaborators are supplied by the embedder: an implementation of
//! [`ScmCall`] performing the actual secure-monitor call, and a
//! [`DmaAllocator`] handing out memory visible to the secure side.
//!
//! ## Optional crate features
//!
//! - `alloc` (enabled by default): helpers returning owned buffers, such as
//!   [`VariableStoreExt::variable_keys`] and [`CString16`].
//!
//! [`Arena`]: mem::Arena
//! [`DmaAllocator`]: mem::DmaAllocator
//! [`ScmCall`]: tee::ScmCall

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![no_std]
// Enable some additional warnings and lints.
#![warn(clippy::ptr_as_ptr, missing_docs, unused)]
#![deny(clippy::all)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[macro_use]
mod macros;

#[macro_use]
pub mod data_types;
#[cfg(feature = "alloc")]
pub use self::data_types::CString16;
pub use self::data_types::{CStr16, Char16, Guid};
pub use uguid::guid;

#[doc(hidden)]
pub use ucs2::ucs2_cstr;

pub mod result;
pub use self::result::{Errno, Error, Result, SecureStatus, Status, StatusExt};

pub mod client;
pub mod config;
pub mod mem;
pub mod protocol;
pub mod registry;
pub mod store;
pub mod tee;
pub mod variable;

#[cfg(test)]
mod testing;

pub use self::client::UefiSecApp;
pub use self::config::Config;
pub use self::registry::{AlreadyRegistered, ClientGuard, Registry};
pub use self::store::{VariableStore, VariableStoreExt};
#[cfg(feature = "alloc")]
pub use self::variable::VariableKey;
pub use self::variable::{VariableAttributes, VariableStorageInfo, VariableVendor};
