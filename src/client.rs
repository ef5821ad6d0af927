// SPDX-License-Identifier: MIT OR Apache-2.0

//! The variable service client.

use crate::data_types::GUID_SIZE;
use crate::mem::{Arena, DmaAllocator, Region};
use crate::protocol::wire::{
    GetNextVariableRequest, GetNextVariableResponse, GetVariableRequest, GetVariableResponse,
    QueryVariableInfoRequest, QueryVariableInfoResponse, SetVariableRequest, SetVariableResponse,
};
use crate::protocol::{read_response, response_field, size_bound, CommandId, FrameBuilder, Response};
use crate::tee::{self, FrameBuffer, ScmCall};
use crate::{
    CStr16, Config, Guid, Result, SecureStatus, Status, StatusExt, VariableAttributes,
    VariableStorageInfo,
};
use core::fmt;
use core::mem::size_of;
use log::{debug, warn};
use zerocopy::{Immutable, IntoBytes};

/// Client of the UEFI variable service secure application.
///
/// The client owns the [`Arena`] all frames are staged in and the id of the
/// secure application. Each operation lays out its request, performs one
/// blocking call and decodes the response in place, so operations take
/// `&mut self`: a client can only serve one call at a time. Share it through
/// a [`Registry`](crate::Registry).
///
/// The raw operations mirror the UEFI runtime variable services: they
/// return a [`Status`] and report sizes through in/out parameters, so a
/// [`Status::BUFFER_TOO_SMALL`] result can still tell the caller how much
/// room is needed.
pub struct UefiSecApp<T: ScmCall, A: DmaAllocator> {
    scm: T,
    arena: Arena<A>,
    app_id: u32,
}

impl<T: ScmCall, A: DmaAllocator> UefiSecApp<T, A> {
    /// Set up the arena and look up the variable service application.
    ///
    /// # Errors
    ///
    /// * [`Status::INVALID_PARAMETER`] if `config` is invalid or the secure OS
    ///   does not know the application
    /// * [`Status::OUT_OF_RESOURCES`] if the arena could not be allocated
    /// * [`Status::DEVICE_ERROR`] if the secure monitor call failed
    pub fn new(scm: T, allocator: A, config: &Config) -> Result<Self> {
        if !config.page_size.is_power_of_two() {
            return Err(Status::INVALID_PARAMETER.into());
        }

        let mut arena = Arena::new(allocator, config.initial_arena_size, config.page_size)
            .map_err(|_| Status::OUT_OF_RESOURCES)?;
        let app_id = tee::app_get_id(&scm, &mut arena, config.app_name)?;
        debug!("secure application {:?} has id {app_id:#x}", config.app_name);

        Ok(Self { scm, arena, app_id })
    }

    /// Id of the secure application this client talks to.
    #[must_use]
    pub const fn app_id(&self) -> u32 {
        self.app_id
    }

    /// Current size of the arena in bytes.
    #[must_use]
    pub fn arena_capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Read a variable.
    ///
    /// `data_size` holds the capacity of `data` on entry. On success it is
    /// set to the size of the variable, whose value has been copied to the
    /// start of `data`. If `data` is too small, [`Status::BUFFER_TOO_SMALL`]
    /// is returned and `data_size` set to the size required.
    ///
    /// Calling with a `data_size` of zero and no buffer only queries the size
    /// and attributes of the variable, and succeeds if it exists.
    ///
    /// `attributes`, if present, receives the attributes of the variable
    /// whenever `data_size` is updated.
    pub fn get_variable(
        &mut self,
        name: Option<&CStr16>,
        vendor: Option<&Guid>,
        attributes: Option<&mut VariableAttributes>,
        data_size: &mut usize,
        data: Option<&mut [u8]>,
    ) -> Status {
        let (Some(name), Some(vendor)) = (name, vendor) else {
            return Status::INVALID_PARAMETER;
        };
        if name.is_empty() {
            return Status::INVALID_PARAMETER;
        }

        let buffer_size = *data_size;
        match &data {
            None if buffer_size != 0 => return Status::INVALID_PARAMETER,
            Some(buf) if buf.len() < buffer_size => return Status::INVALID_PARAMETER,
            _ => {}
        }
        let size_query = buffer_size == 0 && data.is_none();

        let name = name.to_u16_slice_with_nul().as_bytes();
        let guid = vendor.to_bytes();
        let Some(bound) = size_bound(
            &[size_of::<GetVariableRequest>(), name.len(), GUID_SIZE],
            &[size_of::<GetVariableResponse>(), buffer_size],
        ) else {
            return Status::INVALID_PARAMETER;
        };

        let res = self.transact::<GetVariableRequest, GetVariableResponse, _>(
            CommandId::GET_VARIABLE,
            bound,
            |mut frame| {
                let name = frame.append(name);
                let guid = frame.append(&guid);
                let length = frame.len() as u32;
                frame.finish(&GetVariableRequest {
                    command_id: CommandId::GET_VARIABLE.0,
                    length,
                    name_offset: name.offset,
                    name_size: name.size,
                    guid_offset: guid.offset,
                    guid_size: guid.size,
                    data_size: buffer_size as u32,
                })
            },
        );
        let (header, response) = match res {
            Ok(res) => res,
            Err(err) => return err.status(),
        };

        let status = secure_status(CommandId::GET_VARIABLE, &header);
        if status == Status::BUFFER_TOO_SMALL {
            *data_size = header.data_size as usize;
            if let Some(attributes) = attributes {
                *attributes = VariableAttributes::from_bits_retain(header.attributes);
            }
            return if size_query { Status::SUCCESS } else { status };
        }
        if !status.is_success() {
            return status;
        }

        let frame = self.arena.bytes(&response);
        let value = match response_field(frame, header.length, header.data_offset, header.data_size)
        {
            Ok(value) => value,
            Err(err) => return err.status(),
        };

        *data_size = value.len();
        if let Some(attributes) = attributes {
            *attributes = VariableAttributes::from_bits_retain(header.attributes);
        }

        if size_query {
            return Status::SUCCESS;
        }
        match data {
            Some(data) if value.len() <= buffer_size => {
                data[..value.len()].copy_from_slice(value);
                Status::SUCCESS
            }
            _ => Status::BUFFER_TOO_SMALL,
        }
    }

    /// Create, update or delete a variable.
    ///
    /// The first `data_size` bytes of `data` become the new value. A
    /// `data_size` of zero, or empty `attributes`, deletes the variable.
    pub fn set_variable(
        &mut self,
        name: Option<&CStr16>,
        vendor: Option<&Guid>,
        attributes: VariableAttributes,
        data_size: usize,
        data: Option<&[u8]>,
    ) -> Status {
        let (Some(name), Some(vendor)) = (name, vendor) else {
            return Status::INVALID_PARAMETER;
        };
        if name.is_empty() {
            return Status::INVALID_PARAMETER;
        }

        let data = match data {
            Some(data) if data.len() >= data_size => &data[..data_size],
            None if data_size == 0 => &[],
            _ => return Status::INVALID_PARAMETER,
        };

        let name = name.to_u16_slice_with_nul().as_bytes();
        let guid = vendor.to_bytes();
        let Some(bound) = size_bound(
            &[size_of::<SetVariableRequest>(), name.len(), GUID_SIZE, data.len()],
            &[size_of::<SetVariableResponse>()],
        ) else {
            return Status::INVALID_PARAMETER;
        };

        let res = self.transact::<SetVariableRequest, SetVariableResponse, _>(
            CommandId::SET_VARIABLE,
            bound,
            |mut frame| {
                let name = frame.append(name);
                let guid = frame.append(&guid);
                let data = frame.append(data);
                let length = frame.len() as u32;
                frame.finish(&SetVariableRequest {
                    command_id: CommandId::SET_VARIABLE.0,
                    length,
                    name_offset: name.offset,
                    name_size: name.size,
                    guid_offset: guid.offset,
                    guid_size: guid.size,
                    attributes: attributes.bits(),
                    data_offset: data.offset,
                    data_size: data.size,
                })
            },
        );

        match res {
            Ok((header, _)) => secure_status(CommandId::SET_VARIABLE, &header),
            Err(err) => err.status(),
        }
    }

    /// Advance a variable enumeration.
    ///
    /// `name` holds the name returned by the previous call, or an empty
    /// string to start over, and `vendor` the matching vendor. `name_size`
    /// is the capacity of `name` in bytes on entry. On success both are
    /// replaced by the next variable and `name_size` is set to the size of
    /// its name, including the terminator.
    ///
    /// [`Status::NOT_FOUND`] marks the end of the enumeration. On
    /// [`Status::BUFFER_TOO_SMALL`], `name_size` is set to the size required
    /// and `name` and `vendor` are left alone, so the caller can retry from
    /// the same position with a larger buffer.
    pub fn get_next_variable(
        &mut self,
        name_size: &mut usize,
        name: Option<&mut [u16]>,
        vendor: Option<&mut Guid>,
    ) -> Status {
        let capacity = *name_size;
        let (Some(name), Some(vendor)) = (name, vendor) else {
            return Status::INVALID_PARAMETER;
        };
        if capacity < size_of::<u16>() || name.len() * size_of::<u16>() < capacity {
            return Status::INVALID_PARAMETER;
        }
        let Some(current) = name[..capacity / 2].iter().position(|&c| c == 0) else {
            return Status::INVALID_PARAMETER;
        };

        let Some(bound) = size_bound(
            &[size_of::<GetNextVariableRequest>(), GUID_SIZE, capacity],
            &[size_of::<GetNextVariableResponse>(), GUID_SIZE, capacity],
        ) else {
            return Status::INVALID_PARAMETER;
        };

        let current = name[..current].as_bytes();
        let guid = vendor.to_bytes();
        let res = self.transact::<GetNextVariableRequest, GetNextVariableResponse, _>(
            CommandId::GET_NEXT_VARIABLE,
            bound,
            |mut frame| {
                let guid = frame.append(&guid);
                let (name, bytes) = frame.append_zeroed(capacity);
                bytes[..current.len()].copy_from_slice(current);
                let length = frame.len() as u32;
                frame.finish(&GetNextVariableRequest {
                    command_id: CommandId::GET_NEXT_VARIABLE.0,
                    length,
                    guid_offset: guid.offset,
                    guid_size: guid.size,
                    name_offset: name.offset,
                    name_size: name.size,
                })
            },
        );
        let (header, response) = match res {
            Ok(res) => res,
            Err(err) => return err.status(),
        };

        let status = secure_status(CommandId::GET_NEXT_VARIABLE, &header);
        if status == Status::BUFFER_TOO_SMALL {
            let required = header.name_size as usize;
            if required <= capacity {
                warn!("secure side wants {required} bytes for a name, {capacity} were offered");
                return Status::DEVICE_ERROR;
            }
            *name_size = required;
            return status;
        }
        if !status.is_success() {
            return status;
        }

        let frame = self.arena.bytes(&response);
        let fields = response_field(frame, header.length, header.guid_offset, header.guid_size)
            .and_then(|guid| {
                response_field(frame, header.length, header.name_offset, header.name_size)
                    .map(|next| (guid, next))
            });
        let (next_guid, next_name) = match fields {
            Ok(fields) => fields,
            Err(err) => return err.status(),
        };

        if next_name.len() % size_of::<u16>() != 0 {
            warn!("next variable has an odd {} byte name", next_name.len());
            return Status::DEVICE_ERROR;
        }
        if next_name.len() > capacity {
            *name_size = next_name.len();
            return Status::BUFFER_TOO_SMALL;
        }
        let Ok(next_guid) = <[u8; GUID_SIZE]>::try_from(next_guid) else {
            warn!("next variable has a {} byte vendor GUID", next_guid.len());
            return Status::DEVICE_ERROR;
        };
        if next_name.len() < size_of::<u16>() {
            warn!("next variable has a {} byte name", next_name.len());
            return Status::DEVICE_ERROR;
        }

        *vendor = Guid::from_bytes(next_guid);

        let units = next_name.len() / size_of::<u16>();
        let mut end = 0;
        for unit in next_name.chunks_exact(2).take(units - 1) {
            let unit = u16::from_ne_bytes([unit[0], unit[1]]);
            if unit == 0 {
                break;
            }
            name[end] = unit;
            end += 1;
        }
        name[end] = 0;
        *name_size = next_name.len();

        Status::SUCCESS
    }

    /// Query storage statistics for variables with the given `attributes`.
    ///
    /// # Errors
    ///
    /// The translated status reported by the secure application, or
    /// [`Status::DEVICE_ERROR`] if it could not be reached or answered with a
    /// malformed frame.
    pub fn query_variable_info(
        &mut self,
        attributes: VariableAttributes,
    ) -> Result<VariableStorageInfo> {
        let bound = size_bound(
            &[size_of::<QueryVariableInfoRequest>()],
            &[size_of::<QueryVariableInfoResponse>()],
        )
        .ok_or(Status::INVALID_PARAMETER)?;

        let (header, _) = self.transact::<QueryVariableInfoRequest, QueryVariableInfoResponse, _>(
            CommandId::QUERY_VARIABLE_INFO,
            bound,
            |frame| {
                let length = frame.len() as u32;
                frame.finish(&QueryVariableInfoRequest {
                    command_id: CommandId::QUERY_VARIABLE_INFO.0,
                    length,
                    attributes: attributes.bits(),
                })
            },
        )?;

        secure_status(CommandId::QUERY_VARIABLE_INFO, &header).to_result_with_val(|| {
            VariableStorageInfo {
                maximum_variable_storage_size: header.storage_space.get(),
                remaining_variable_storage_size: header.remaining_space.get(),
                maximum_variable_size: header.max_variable_size.get(),
            }
        })
    }

    /// Run one request/response exchange.
    ///
    /// Grows the arena to `bound`, lets `build` lay out the request at the
    /// start of the arena, sends it and validates the envelope of the
    /// response placed right behind the request.
    fn transact<Req, Rsp, F>(
        &mut self,
        command: CommandId,
        bound: usize,
        build: F,
    ) -> Result<(Rsp, Region)>
    where
        Req: IntoBytes + Immutable,
        Rsp: Response,
        F: FnOnce(FrameBuilder<'_, Req>) -> usize,
    {
        self.arena
            .ensure_capacity(bound)
            .map_err(|_| Status::OUT_OF_RESOURCES)?;

        let request = self.arena.aligned(0);
        let length = build(FrameBuilder::new(self.arena.bytes_mut(&request)));

        let response = self.arena.aligned(request.offset() + length);
        assert!(
            response.size() >= size_of::<Rsp>(),
            "response header exceeds arena"
        );

        tee::app_send(
            &self.scm,
            self.app_id,
            FrameBuffer {
                phys: request.phys(),
                size: length,
            },
            FrameBuffer {
                phys: response.phys(),
                size: response.size(),
            },
        )?;

        let header = read_response(self.arena.bytes(&response), command)?;
        Ok((header, response))
    }
}

impl<T: ScmCall, A: DmaAllocator> fmt::Debug for UefiSecApp<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UefiSecApp")
            .field("app_id", &self.app_id)
            .field("arena_capacity", &self.arena.capacity())
            .finish_non_exhaustive()
    }
}

fn secure_status<R: Response>(command: CommandId, header: &R) -> Status {
    let status = SecureStatus(header.status());
    if !status.is_success() {
        debug!("{command:?} failed with {status:?}");
    }
    status.to_status()
}
