// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secure OS call interface.
//!
//! Everything the normal world asks of the secure OS goes through a
//! secure-monitor call: a trap carrying an owner/service/command triple, an
//! argument-type descriptor and a handful of register-sized arguments. The
//! call blocks until the secure side is done and yields three result words.
//!
//! The trap itself is platform code and is supplied through [`ScmCall`].
//! This module builds the descriptors for the two secure OS services the
//! variable client needs, see [`app_get_id`] and [`app_send`].

mod app;
pub use self::app::{app_get_id, app_send, FrameBuffer, MAX_APP_NAME_SIZE};

mod scm;
pub use self::scm::{
    os_scm_call, ArgInfo, ArgType, OsResponse, OsResult, Owner, ResponseType, ScmCall, ScmDesc,
    ScmError, ScmResult, Service, MAX_ARGS,
};
