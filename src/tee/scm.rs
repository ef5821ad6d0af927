// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;
use log::{debug, error, warn};

/// Maximum number of arguments a single call can carry.
pub const MAX_ARGS: usize = 10;

newtype_enum! {
    /// Secure-side entity addressed by a call.
    pub enum Owner: u32 => {
        /// Secure applications.
        TZ_APPS = 48,
        /// The secure OS itself.
        QSEE_OS = 50,
    }
}

newtype_enum! {
    /// Service within an [`Owner`].
    pub enum Service: u32 => {
        /// Applications are addressed through their id argument, not the
        /// service number.
        APP_ID_PLACEHOLDER = 0,
        /// Application manager of the secure OS.
        APP_MGR = 1,
        /// Listener services of the secure OS.
        LISTENER = 2,
    }
}

/// How a single call argument is to be interpreted by the secure monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ArgType {
    /// Plain value.
    Val = 0,
    /// Physical address of a read-only buffer.
    Ro = 1,
    /// Physical address of a read-write buffer.
    Rw = 2,
    /// Buffer passed by value.
    BufVal = 3,
}

/// Packed argument descriptor: the number of arguments in the low nibble,
/// followed by two bits of [`ArgType`] per argument.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct ArgInfo(pub u32);

impl ArgInfo {
    /// Build the descriptor for the given argument types.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_ARGS`] types are given.
    #[must_use]
    pub const fn new(types: &[ArgType]) -> Self {
        assert!(types.len() <= MAX_ARGS);
        let mut info = types.len() as u32;
        let mut i = 0;
        while i < types.len() {
            info |= (types[i] as u32) << (4 + 2 * i);
            i += 1;
        }
        Self(info)
    }

    /// Number of arguments described.
    #[must_use]
    pub const fn count(self) -> usize {
        (self.0 & 0xf) as usize
    }
}

impl fmt::Debug for ArgInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgInfo({:#x})", self.0)
    }
}

/// Descriptor of one secure-monitor call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScmDesc {
    /// Addressed entity.
    pub owner: u32,
    /// Service within the owner.
    pub svc: u32,
    /// Command within the service.
    pub cmd: u32,
    /// Argument types.
    pub arginfo: ArgInfo,
    /// Arguments; only the first `arginfo.count()` are meaningful.
    pub args: [u64; MAX_ARGS],
}

/// Result words of a completed secure-monitor call.
pub type ScmResult = [u64; 3];

/// The secure-monitor call could not be completed.
///
/// Carries the error number reported by the platform implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScmError(pub i32);

impl fmt::Display for ScmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "secure monitor call failed with error {}", self.0)
    }
}

impl core::error::Error for ScmError {}

/// The platform's secure-monitor call primitive.
///
/// Implementations trap into the secure monitor and block until the call
/// returns. There is no cancellation: if the secure side hangs, so does the
/// caller.
pub trait ScmCall {
    /// Perform the call described by `desc`.
    fn call(&self, desc: &ScmDesc) -> Result<ScmResult, ScmError>;
}

impl<T: ScmCall + ?Sized> ScmCall for &T {
    fn call(&self, desc: &ScmDesc) -> Result<ScmResult, ScmError> {
        (**self).call(desc)
    }
}

newtype_enum! {
    /// Outcome of a call as reported by the secure OS in the first result
    /// word.
    pub enum OsResult: u64 => {
        /// The call completed.
        SUCCESS = 0,
        /// The call needs to be re-entered to make progress.
        INCOMPLETE = 1,
        /// The call is waiting for a normal-world listener.
        BLOCKED_ON_LISTENER = 2,
        /// The call failed.
        FAILURE = 0xFFFF_FFFF,
    }
}

newtype_enum! {
    /// Meaning of the data word of a response.
    pub enum ResponseType: u64 => {
        /// The data word is an application id.
        APP_ID = 0xEE01,
        /// The data word is a listener id.
        LISTENER_ID = 0xEE02,
    }
}

/// Secure OS view of the three result words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OsResponse {
    /// Outcome of the call.
    pub status: OsResult,
    /// Meaning of `data`.
    pub resp_type: ResponseType,
    /// Call-specific payload.
    pub data: u64,
}

impl From<ScmResult> for OsResponse {
    fn from(res: ScmResult) -> Self {
        Self {
            status: OsResult(res[0]),
            resp_type: ResponseType(res[1]),
            data: res[2],
        }
    }
}

/// Perform a call into the secure OS.
///
/// Re-entrant calls are not supported: an [`OsResult::INCOMPLETE`] or
/// [`OsResult::BLOCKED_ON_LISTENER`] outcome is returned to the caller as
/// is, with a warning, and callers treat it as a failure.
pub fn os_scm_call<S: ScmCall + ?Sized>(scm: &S, desc: &ScmDesc) -> Result<OsResponse, ScmError> {
    let res = scm.call(desc).map(OsResponse::from);

    match &res {
        Ok(rsp) => debug!(
            "scm call: owner={:#x}, svc={:#x}, cmd={:#x}, status={:?}, type={:?}, data={:#x}",
            desc.owner, desc.svc, desc.cmd, rsp.status, rsp.resp_type, rsp.data
        ),
        Err(err) => error!(
            "scm call: owner={:#x}, svc={:#x}, cmd={:#x} failed: {}",
            desc.owner, desc.svc, desc.cmd, err
        ),
    }

    let rsp = res?;
    if rsp.status == OsResult::INCOMPLETE || rsp.status == OsResult::BLOCKED_ON_LISTENER {
        warn!(
            "scm call: owner={:#x}, svc={:#x}, cmd={:#x} needs re-entry ({:?}), which is not supported",
            desc.owner, desc.svc, desc.cmd, rsp.status
        );
    }

    Ok(rsp)
}
