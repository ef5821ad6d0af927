// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{os_scm_call, ArgInfo, ArgType, OsResult, Owner, ScmCall, ScmDesc, Service};
use crate::mem::{Arena, DmaAllocator};
use crate::{Result, Status};
use core::sync::atomic::{fence, Ordering};

/// Size of the buffer holding an application name during id lookup. Names
/// must leave room for a terminating nul.
pub const MAX_APP_NAME_SIZE: usize = 64;

const APP_MGR_CMD_GET_ID: u32 = 3;
const APP_CMD_SEND: u32 = 1;

/// Resolve the id of the secure application called `name`.
///
/// The name is staged in `arena`, which is grown to hold it if needed.
///
/// # Errors
///
/// * [`Status::INVALID_PARAMETER`] if the name does not fit
///   [`MAX_APP_NAME_SIZE`] with its terminator, or if the secure OS does not
///   know the application
/// * [`Status::OUT_OF_RESOURCES`] if the arena could not be grown
/// * [`Status::DEVICE_ERROR`] if the call itself failed
pub fn app_get_id<S, A>(scm: &S, arena: &mut Arena<A>, name: &str) -> Result<u32>
where
    S: ScmCall + ?Sized,
    A: DmaAllocator,
{
    if name.len() >= MAX_APP_NAME_SIZE {
        return Err(Status::INVALID_PARAMETER.into());
    }

    arena
        .ensure_capacity(MAX_APP_NAME_SIZE)
        .map_err(|_| Status::OUT_OF_RESOURCES)?;

    let region = arena.aligned(0);
    let buf = &mut arena.bytes_mut(&region)[..MAX_APP_NAME_SIZE];
    buf.fill(0);
    buf[..name.len()].copy_from_slice(name.as_bytes());

    let mut desc = ScmDesc {
        owner: Owner::QSEE_OS.0,
        svc: Service::APP_MGR.0,
        cmd: APP_MGR_CMD_GET_ID,
        arginfo: ArgInfo::new(&[ArgType::Rw, ArgType::Val]),
        ..Default::default()
    };
    desc.args[0] = region.phys();
    desc.args[1] = name.len() as u64;

    fence(Ordering::Release);
    let rsp = os_scm_call(scm, &desc).map_err(|_| Status::DEVICE_ERROR)?;

    if rsp.status != OsResult::SUCCESS {
        return Err(Status::INVALID_PARAMETER.into());
    }

    Ok(rsp.data as u32)
}

/// A frame handed to the secure side: its physical address and its size in
/// bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Address of the frame as seen by the secure side.
    pub phys: u64,
    /// Valid bytes for a request, usable bytes for a response.
    pub size: usize,
}

/// Send the request in `req` to application `app_id`, which writes its
/// response into `rsp`.
///
/// All writes to the request are made visible before the call, and no read
/// of the response is performed before the call returns.
///
/// # Errors
///
/// [`Status::DEVICE_ERROR`] if the call failed or the secure OS reported
/// anything other than completion. Re-entrant completion is not supported.
pub fn app_send<S>(scm: &S, app_id: u32, req: FrameBuffer, rsp: FrameBuffer) -> Result
where
    S: ScmCall + ?Sized,
{
    let mut desc = ScmDesc {
        owner: Owner::TZ_APPS.0,
        svc: Service::APP_ID_PLACEHOLDER.0,
        cmd: APP_CMD_SEND,
        arginfo: ArgInfo::new(&[
            ArgType::Val,
            ArgType::Rw,
            ArgType::Val,
            ArgType::Rw,
            ArgType::Val,
        ]),
        ..Default::default()
    };
    desc.args[0] = u64::from(app_id);
    desc.args[1] = req.phys;
    desc.args[2] = req.size as u64;
    desc.args[3] = rsp.phys;
    desc.args[4] = rsp.size as u64;

    fence(Ordering::Release);
    let res = os_scm_call(scm, &desc);
    fence(Ordering::Acquire);

    match res {
        Ok(rsp) if rsp.status == OsResult::SUCCESS => Ok(()),
        _ => Err(Status::DEVICE_ERROR.into()),
    }
}
