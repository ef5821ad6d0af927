// SPDX-License-Identifier: MIT OR Apache-2.0

use super::chars::Char16;
use super::strs::{CStr16, FromSliceWithNulError};
use alloc::vec::Vec;
use core::fmt;
use core::ops;

/// Error returned by [`CString16::try_from::<&str>`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FromStrError {
    /// Character conversion error.
    InvalidChar,
    /// Nul character found in the input.
    InteriorNul,
}

impl fmt::Display for FromStrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UCS-2 Conversion Error: {}",
            match self {
                Self::InvalidChar => "Invalid character",
                Self::InteriorNul => "Interior null terminator",
            }
        )
    }
}

impl core::error::Error for FromStrError {}

/// An owned UCS-2 null-terminated string.
///
/// For convenience, a [`CString16`] is comparable with `&str` through
/// [`CStr16::eq_str`].
///
/// # Examples
///
/// Round-trip conversion from a [`&str`] to a `CString16` and back:
///
/// ```
/// use uefisecapp::CString16;
///
/// let s = CString16::try_from("BootOrder").unwrap();
/// assert!(s.eq_str("BootOrder"));
/// ```
#[derive(Clone, Eq, PartialEq)]
pub struct CString16(Vec<u16>);

impl CString16 {
    /// Creates a new empty string with a terminating null character.
    #[must_use]
    pub fn new() -> Self {
        Self(alloc::vec![0])
    }
}

impl Default for CString16 {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<&str> for CString16 {
    type Error = FromStrError;

    fn try_from(input: &str) -> Result<Self, Self::Error> {
        // Initially allocate one Char16 for each byte of the input, plus
        // one for the null character. This should be a good guess for ASCII-ish
        // input.
        let mut output = Vec::with_capacity(input.len() + 1);

        // Convert to UCS-2.
        ucs2::encode_with(input, |ch| {
            output.push(ch);
            Ok(())
        })
        .map_err(|_| FromStrError::InvalidChar)?;

        // Check for interior nulls.
        if output.contains(&0) {
            return Err(FromStrError::InteriorNul);
        }

        // Add trailing null.
        output.push(0);

        Ok(Self(output))
    }
}

impl TryFrom<Vec<u16>> for CString16 {
    type Error = FromSliceWithNulError;

    fn try_from(input: Vec<u16>) -> Result<Self, Self::Error> {
        // Try creating a CStr16 to check for errors.
        CStr16::from_u16_with_nul(&input)?;
        Ok(Self(input))
    }
}

impl From<&CStr16> for CString16 {
    fn from(value: &CStr16) -> Self {
        Self(value.to_u16_slice_with_nul().to_vec())
    }
}

impl ops::Deref for CString16 {
    type Target = CStr16;

    fn deref(&self) -> &CStr16 {
        unsafe { CStr16::from_u16_with_nul_unchecked(&self.0) }
    }
}

impl AsRef<CStr16> for CString16 {
    fn as_ref(&self) -> &CStr16 {
        self
    }
}

impl core::borrow::Borrow<CStr16> for CString16 {
    fn borrow(&self) -> &CStr16 {
        self
    }
}

impl PartialEq<CStr16> for CString16 {
    fn eq(&self, other: &CStr16) -> bool {
        **self == *other
    }
}

impl fmt::Debug for CString16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <CStr16 as fmt::Debug>::fmt(self, f)
    }
}

impl fmt::Display for CString16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <CStr16 as fmt::Display>::fmt(self, f)
    }
}

impl From<CString16> for Vec<Char16> {
    fn from(value: CString16) -> Self {
        value.as_slice().to_vec()
    }
}
