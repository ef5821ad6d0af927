// SPDX-License-Identifier: MIT OR Apache-2.0

//! The variable store interface consumed by a variable framework.
//!
//! [`VariableStore`] is the set of callbacks a framework drives: the four
//! raw operations in the shape of the UEFI runtime variable services. It is
//! implemented by [`Registry`], which serializes every call onto the active
//! [`UefiSecApp`]. [`VariableStoreExt`] layers typed helpers on top.

use crate::mem::DmaAllocator;
use crate::tee::ScmCall;
use crate::{
    CStr16, Error, Guid, Registry, Result, Status, StatusExt, UefiSecApp, VariableAttributes,
    VariableStorageInfo, VariableVendor,
};

#[cfg(feature = "alloc")]
use {
    crate::VariableKey,
    alloc::boxed::Box,
    alloc::{vec, vec::Vec},
    core::mem::size_of,
};

/// Raw UEFI variable services.
///
/// See [`UefiSecApp`] for the meaning of each parameter.
pub trait VariableStore {
    /// Read a variable. See [`UefiSecApp::get_variable`].
    fn get_variable(
        &self,
        name: Option<&CStr16>,
        vendor: Option<&Guid>,
        attributes: Option<&mut VariableAttributes>,
        data_size: &mut usize,
        data: Option<&mut [u8]>,
    ) -> Status;

    /// Write or delete a variable. See [`UefiSecApp::set_variable`].
    fn set_variable(
        &self,
        name: Option<&CStr16>,
        vendor: Option<&Guid>,
        attributes: VariableAttributes,
        data_size: usize,
        data: Option<&[u8]>,
    ) -> Status;

    /// Advance a variable enumeration. See [`UefiSecApp::get_next_variable`].
    fn get_next_variable(
        &self,
        name_size: &mut usize,
        name: Option<&mut [u16]>,
        vendor: Option<&mut Guid>,
    ) -> Status;

    /// Query storage statistics. See [`UefiSecApp::query_variable_info`].
    fn query_variable_info(&self, attributes: VariableAttributes) -> Result<VariableStorageInfo>;
}

impl<T: ScmCall, A: DmaAllocator> VariableStore for Registry<UefiSecApp<T, A>> {
    fn get_variable(
        &self,
        name: Option<&CStr16>,
        vendor: Option<&Guid>,
        attributes: Option<&mut VariableAttributes>,
        data_size: &mut usize,
        data: Option<&mut [u8]>,
    ) -> Status {
        match self.acquire() {
            Ok(mut client) => client.get_variable(name, vendor, attributes, data_size, data),
            Err(err) => err.status(),
        }
    }

    fn set_variable(
        &self,
        name: Option<&CStr16>,
        vendor: Option<&Guid>,
        attributes: VariableAttributes,
        data_size: usize,
        data: Option<&[u8]>,
    ) -> Status {
        match self.acquire() {
            Ok(mut client) => client.set_variable(name, vendor, attributes, data_size, data),
            Err(err) => err.status(),
        }
    }

    fn get_next_variable(
        &self,
        name_size: &mut usize,
        name: Option<&mut [u16]>,
        vendor: Option<&mut Guid>,
    ) -> Status {
        match self.acquire() {
            Ok(mut client) => client.get_next_variable(name_size, name, vendor),
            Err(err) => err.status(),
        }
    }

    fn query_variable_info(&self, attributes: VariableAttributes) -> Result<VariableStorageInfo> {
        self.acquire()?.query_variable_info(attributes)
    }
}

/// Typed helpers over any [`VariableStore`].
///
/// Several helpers share their name with the raw operation they wrap. Bring
/// only this trait into scope to call them with method syntax, or use the
/// fully qualified form.
pub trait VariableStoreExt: VariableStore {
    /// Get the size (in bytes) of a variable. This can be used to find out how
    /// big of a buffer should be passed in to `get_variable`.
    fn get_variable_size(&self, name: &CStr16, vendor: &VariableVendor) -> Result<usize> {
        let mut data_size = 0;
        let status = VariableStore::get_variable(
            self,
            Some(name),
            Some(&vendor.0),
            None,
            &mut data_size,
            None,
        );

        if status.is_success() || status == Status::BUFFER_TOO_SMALL {
            Ok(data_size)
        } else {
            Err(Error::from(status))
        }
    }

    /// Get the contents and attributes of a variable. The size of `buf` must
    /// be at least as big as the variable's size, although it can be
    /// larger. If it is too small, `BUFFER_TOO_SMALL` is returned along with
    /// the size required.
    ///
    /// On success, a tuple containing the variable's value (a slice of `buf`)
    /// and the variable's attributes is returned.
    fn get_variable<'buf>(
        &self,
        name: &CStr16,
        vendor: &VariableVendor,
        buf: &'buf mut [u8],
    ) -> Result<(&'buf [u8], VariableAttributes), Option<usize>> {
        let mut attributes = VariableAttributes::empty();
        let mut data_size = buf.len();
        let status = VariableStore::get_variable(
            self,
            Some(name),
            Some(&vendor.0),
            Some(&mut attributes),
            &mut data_size,
            Some(&mut *buf),
        );

        match status {
            Status::SUCCESS => Ok((&buf[..data_size], attributes)),
            Status::BUFFER_TOO_SMALL => Err(Error::new(status, Some(data_size))),
            _ => Err(Error::new(status, None)),
        }
    }

    /// Get the contents and attributes of a variable.
    #[cfg(feature = "alloc")]
    fn get_variable_boxed(
        &self,
        name: &CStr16,
        vendor: &VariableVendor,
    ) -> Result<(Box<[u8]>, VariableAttributes)> {
        let mut data = vec![0; self.get_variable_size(name, vendor)?];
        loop {
            match VariableStoreExt::get_variable(self, name, vendor, &mut data) {
                Ok((value, attributes)) => {
                    let len = value.len();
                    data.truncate(len);
                    return Ok((data.into_boxed_slice(), attributes));
                }
                // The variable grew since its size was queried.
                Err(err) if err.status() == Status::BUFFER_TOO_SMALL => match *err.data() {
                    Some(size) if size > data.len() => data.resize(size, 0),
                    _ => return Err(err.to_err_without_payload()),
                },
                Err(err) => return Err(err.to_err_without_payload()),
            }
        }
    }

    /// Get the names and vendor GUIDs of all currently-set variables.
    #[cfg(feature = "alloc")]
    fn variable_keys(&self) -> Result<Vec<VariableKey>> {
        let mut all_variables = Vec::new();

        // The initial value of name must start with a null character. Start
        // out with a reasonable size that likely won't need to be increased.
        let mut name = vec![0u16; 32];
        // The initial value of vendor is ignored.
        let mut vendor = Guid::default();

        let mut status;
        loop {
            let mut name_size_in_bytes = name.len() * size_of::<u16>();
            status = self.get_next_variable(
                &mut name_size_in_bytes,
                Some(name.as_mut_slice()),
                Some(&mut vendor),
            );

            match status {
                Status::SUCCESS => {
                    // CStr16::from_u16_with_nul does not allow interior nulls,
                    // so make the copy exactly the right size.
                    let Some(nul_pos) = name.iter().position(|c| *c == 0) else {
                        status = Status::ABORTED;
                        break;
                    };

                    all_variables.push(VariableKey {
                        name: name[..=nul_pos].to_vec(),
                        vendor: VariableVendor(vendor),
                    });
                }
                Status::BUFFER_TOO_SMALL => {
                    // The name buffer passed in was too small, resize it to be
                    // big enough for the next variable name. A size that does
                    // not grow the buffer would repeat the same call forever.
                    if name_size_in_bytes <= name.len() * size_of::<u16>() {
                        status = Status::DEVICE_ERROR;
                        break;
                    }
                    name.resize(name_size_in_bytes.div_ceil(2), 0);
                }
                Status::NOT_FOUND => {
                    // This status indicates the end of the list. The final
                    // variable has already been received at this point, so
                    // no new variable should be added to the output.
                    status = Status::SUCCESS;
                    break;
                }
                _ => {
                    // For anything else, an error has occurred so break out of
                    // the loop and return it.
                    break;
                }
            }
        }

        status.to_result_with_val(|| all_variables)
    }

    /// Set the value of a variable. This can be used to create a new variable,
    /// update an existing variable, or (when the size of `data` is zero)
    /// delete a variable.
    fn set_variable(
        &self,
        name: &CStr16,
        vendor: &VariableVendor,
        attributes: VariableAttributes,
        data: &[u8],
    ) -> Result {
        VariableStore::set_variable(
            self,
            Some(name),
            Some(&vendor.0),
            attributes,
            data.len(),
            Some(data),
        )
        .to_result()
    }

    /// Deletes a variable.
    fn delete_variable(&self, name: &CStr16, vendor: &VariableVendor) -> Result {
        VariableStoreExt::set_variable(self, name, vendor, VariableAttributes::empty(), &[])
    }

    /// Get information about variable storage space for the type of variable
    /// specified in `attributes`.
    ///
    /// See [`VariableStorageInfo`] for details of the information returned.
    fn query_variable_info(&self, attributes: VariableAttributes) -> Result<VariableStorageInfo> {
        VariableStore::query_variable_info(self, attributes)
    }
}

impl<S: VariableStore + ?Sized> VariableStoreExt for S {}
