// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles: an identity-mapped DMA allocator and an in-memory secure
//! application speaking the variable service protocol.

#![allow(dead_code)]

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uefisecapp::mem::{AllocError, DmaAllocator, DmaBuffer, PAGE_SIZE};
use uefisecapp::protocol::wire::{
    GetNextVariableRequest, GetNextVariableResponse, GetVariableRequest, GetVariableResponse,
    QueryVariableInfoRequest, QueryVariableInfoResponse, SetVariableRequest, SetVariableResponse,
};
use uefisecapp::protocol::CommandId;
use uefisecapp::tee::{OsResult, Owner, ResponseType, ScmCall, ScmDesc, ScmError, ScmResult};
use uefisecapp::{Config, Registry, Status, UefiSecApp, VariableAttributes};
use zerocopy::{FromBytes, Immutable, IntoBytes, U64};

pub const APP_ID: u32 = 0x1234;

pub const STORAGE_SIZE: u64 = 0x10000;
pub const MAX_VARIABLE_SIZE: u64 = 0x4000;

/// Heap memory handed out with physical address equal to virtual address.
#[derive(Debug, Default)]
pub struct HeapDma {
    allocations: AtomicUsize,
    frees: AtomicUsize,
}

impl HeapDma {
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }
}

impl DmaAllocator for HeapDma {
    fn alloc(&self, size: usize) -> Result<DmaBuffer, AllocError> {
        let layout = Layout::from_size_align(size, PAGE_SIZE).map_err(|_| AllocError)?;
        let virt = NonNull::new(unsafe { alloc_zeroed(layout) }).ok_or(AllocError)?;
        self.allocations.fetch_add(1, Ordering::SeqCst);
        Ok(unsafe { DmaBuffer::from_raw_parts(virt, virt.as_ptr() as u64, size) })
    }

    fn free(&self, buffer: DmaBuffer) {
        let layout = Layout::from_size_align(buffer.size(), PAGE_SIZE).unwrap();
        unsafe { dealloc(buffer.virt().as_ptr(), layout) };
        self.frees.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug)]
struct Variable {
    attributes: u32,
    data: Vec<u8>,
}

type Key = ([u8; 16], Vec<u16>);

#[derive(Default)]
struct State {
    variables: BTreeMap<Key, Variable>,
    forced_status: Option<u32>,
    tamper: Option<fn(&mut [u8])>,
}

/// In-memory variable service behind a fake secure monitor.
#[derive(Default)]
pub struct FakeSecureApp {
    state: Mutex<State>,
    fail_transport: AtomicBool,
    sends: AtomicUsize,
}

impl FakeSecureApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests delivered to the application.
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    /// Make every following secure monitor call fail.
    pub fn fail_transport(&self, fail: bool) {
        self.fail_transport.store(fail, Ordering::SeqCst);
    }

    /// Answer the next request with `status` instead of handling it.
    pub fn force_status(&self, status: u32) {
        self.state.lock().unwrap().forced_status = Some(status);
    }

    /// Corrupt the next response frame with `tamper`.
    pub fn tamper_next(&self, tamper: fn(&mut [u8])) {
        self.state.lock().unwrap().tamper = Some(tamper);
    }

    fn get_app_id(&self, desc: &ScmDesc) -> ScmResult {
        // SAFETY: the name buffer lives in the client's arena.
        let name = unsafe { phys_bytes(desc.args[0], desc.args[1]) };
        if name == Config::DEFAULT_APP_NAME.as_bytes() {
            [OsResult::SUCCESS.0, ResponseType::APP_ID.0, u64::from(APP_ID)]
        } else {
            [OsResult::FAILURE.0, 0, 0]
        }
    }

    fn send(&self, desc: &ScmDesc) -> ScmResult {
        if desc.args[0] != u64::from(APP_ID) {
            return [OsResult::FAILURE.0, 0, 0];
        }
        self.sends.fetch_add(1, Ordering::SeqCst);

        // SAFETY: both frames live in the client's arena and do not overlap.
        let (req, rsp) = unsafe {
            (
                phys_bytes(desc.args[1], desc.args[2]),
                phys_bytes(desc.args[3], desc.args[4]),
            )
        };

        let mut state = self.state.lock().unwrap();
        let command = CommandId(u32::read_from_prefix(req).unwrap().0);
        assert_eq!(
            u32::read_from_prefix(&req[4..]).unwrap().0 as usize,
            req.len(),
            "request length"
        );

        if let Some(status) = state.forced_status.take() {
            // Every response header starts with command, length and status.
            rsp[..40].fill(0);
            put(rsp, 0, &[command.0, 40, status]);
        } else {
            match command {
                CommandId::GET_VARIABLE => state.get_variable(req, rsp),
                CommandId::SET_VARIABLE => state.set_variable(req, rsp),
                CommandId::GET_NEXT_VARIABLE => state.get_next_variable(req, rsp),
                CommandId::QUERY_VARIABLE_INFO => state.query_variable_info(req, rsp),
                _ => panic!("unknown command {command:?}"),
            }
        }

        if let Some(tamper) = state.tamper.take() {
            tamper(rsp);
        }

        [OsResult::SUCCESS.0, 0, 0]
    }
}

impl ScmCall for FakeSecureApp {
    fn call(&self, desc: &ScmDesc) -> Result<ScmResult, ScmError> {
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(ScmError(-5));
        }

        match Owner(desc.owner) {
            Owner::QSEE_OS => Ok(self.get_app_id(desc)),
            Owner::TZ_APPS => Ok(self.send(desc)),
            owner => panic!("unexpected owner {owner:?}"),
        }
    }
}

const BUFFER_TOO_SMALL: u32 = 0x8000_0005;
const INVALID_PARAMETER: u32 = 0x8000_0002;
const OUT_OF_RESOURCES: u32 = 0x8000_0009;
const NOT_FOUND: u32 = 0x8000_000e;

impl State {
    fn used(&self) -> u64 {
        self.variables
            .iter()
            .map(|((_, name), var)| (name.len() * 2 + var.data.len()) as u64)
            .sum()
    }

    fn get_variable(&mut self, req: &[u8], rsp: &mut [u8]) {
        let header = GetVariableRequest::read_from_prefix(req).unwrap().0;
        let key = (
            guid_at(req, header.guid_offset, header.guid_size),
            name_at(req, header.name_offset, header.name_size),
        );

        let mut out = GetVariableResponse {
            command_id: header.command_id,
            length: 24,
            status: 0,
            attributes: 0,
            data_offset: 0,
            data_size: 0,
        };

        match self.variables.get(&key) {
            None => out.status = NOT_FOUND,
            Some(var) => {
                out.attributes = var.attributes;
                out.data_size = var.data.len() as u32;
                if var.data.len() > header.data_size as usize || 24 + var.data.len() > rsp.len() {
                    out.status = BUFFER_TOO_SMALL;
                } else {
                    out.data_offset = 24;
                    out.length = 24 + var.data.len() as u32;
                    put(rsp, 24, var.data.as_slice());
                }
            }
        }

        put(rsp, 0, &out);
    }

    fn set_variable(&mut self, req: &[u8], rsp: &mut [u8]) {
        let header = SetVariableRequest::read_from_prefix(req).unwrap().0;
        let key = (
            guid_at(req, header.guid_offset, header.guid_size),
            name_at(req, header.name_offset, header.name_size),
        );
        let data = field(req, header.data_offset, header.data_size).to_vec();
        let append = VariableAttributes::APPEND_WRITE.bits();

        let delete = (data.is_empty() && header.attributes & append == 0) || header.attributes == 0;
        let status = if delete {
            match self.variables.remove(&key) {
                Some(_) => 0,
                None => NOT_FOUND,
            }
        } else if self.used() + (key.1.len() * 2 + data.len()) as u64 > STORAGE_SIZE
            || data.len() as u64 > MAX_VARIABLE_SIZE
        {
            OUT_OF_RESOURCES
        } else if header.attributes & append != 0 {
            let var = self.variables.entry(key).or_insert_with(|| Variable {
                attributes: header.attributes & !append,
                data: Vec::new(),
            });
            var.data.extend_from_slice(&data);
            0
        } else {
            self.variables.insert(
                key,
                Variable {
                    attributes: header.attributes,
                    data,
                },
            );
            0
        };

        put(
            rsp,
            0,
            &SetVariableResponse {
                command_id: header.command_id,
                length: 20,
                status,
                _unknown1: 0,
                _unknown2: 0,
            },
        );
    }

    fn get_next_variable(&mut self, req: &[u8], rsp: &mut [u8]) {
        let header = GetNextVariableRequest::read_from_prefix(req).unwrap().0;
        let guid = guid_at(req, header.guid_offset, header.guid_size);
        let name = name_at(req, header.name_offset, header.name_size);

        let mut out = GetNextVariableResponse {
            command_id: header.command_id,
            length: 28,
            status: 0,
            guid_offset: 0,
            guid_size: 0,
            name_offset: 0,
            name_size: 0,
        };

        let next = if name.len() == 1 {
            Ok(self.variables.keys().next())
        } else {
            let key = (guid, name);
            if self.variables.contains_key(&key) {
                Ok(self
                    .variables
                    .range((Bound::Excluded(key), Bound::Unbounded))
                    .next()
                    .map(|(key, _)| key))
            } else {
                Err(INVALID_PARAMETER)
            }
        };

        match next {
            Err(status) => out.status = status,
            Ok(None) => out.status = NOT_FOUND,
            Ok(Some((guid, name))) => {
                let name_size = (name.len() * 2) as u32;
                out.name_size = name_size;
                if name_size > header.name_size {
                    out.status = BUFFER_TOO_SMALL;
                } else {
                    out.guid_offset = 32;
                    out.guid_size = 16;
                    out.name_offset = 48;
                    out.length = 48 + name_size;
                    put(rsp, 32, guid);
                    put(rsp, 48, name.as_slice());
                }
            }
        }

        put(rsp, 0, &out);
    }

    fn query_variable_info(&mut self, req: &[u8], rsp: &mut [u8]) {
        let header = QueryVariableInfoRequest::read_from_prefix(req).unwrap().0;
        put(
            rsp,
            0,
            &QueryVariableInfoResponse {
                command_id: header.command_id,
                length: 40,
                status: 0,
                _pad: 0,
                storage_space: U64::new(STORAGE_SIZE),
                remaining_space: U64::new(STORAGE_SIZE - self.used()),
                max_variable_size: U64::new(MAX_VARIABLE_SIZE),
            },
        );
    }
}

/// SAFETY: the range must lie in memory handed out by [`HeapDma`].
unsafe fn phys_bytes<'a>(phys: u64, len: u64) -> &'a mut [u8] {
    unsafe { std::slice::from_raw_parts_mut(phys as *mut u8, len as usize) }
}

fn field(frame: &[u8], offset: u32, size: u32) -> &[u8] {
    let end = offset as usize + size as usize;
    assert!(end <= frame.len(), "field {offset}+{size} outside frame");
    assert_eq!(offset % 8, 0, "unaligned field");
    &frame[offset as usize..end]
}

fn guid_at(frame: &[u8], offset: u32, size: u32) -> [u8; 16] {
    assert_eq!(size, 16);
    field(frame, offset, size).try_into().unwrap()
}

/// Read a name, including its terminator.
fn name_at(frame: &[u8], offset: u32, size: u32) -> Vec<u16> {
    let units = <[u16]>::ref_from_bytes(field(frame, offset, size)).unwrap();
    let end = units.iter().position(|&c| c == 0).expect("unterminated name");
    units[..=end].to_vec()
}

fn put<T: IntoBytes + Immutable + ?Sized>(frame: &mut [u8], offset: usize, value: &T) {
    let bytes = value.as_bytes();
    frame[offset..offset + bytes.len()].copy_from_slice(bytes);
}

pub type Client<'a> = UefiSecApp<&'a FakeSecureApp, &'a HeapDma>;

/// Create a client for `app` and install it in a fresh registry.
pub fn registry<'a>(app: &'a FakeSecureApp, dma: &'a HeapDma) -> Registry<Client<'a>> {
    let client = UefiSecApp::new(app, dma, &Config::default()).unwrap();
    let registry = Registry::new();
    registry.register(client).unwrap();
    registry
}

/// Map a status to the raw 32-bit code the secure side would report.
pub fn secure_code(status: Status) -> u32 {
    let category = (status.0 >> (usize::BITS - 32)) as u32 & 0xf000_0000;
    category | (status.0 as u32 & 0x0fff_ffff)
}
