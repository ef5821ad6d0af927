// SPDX-License-Identifier: MIT OR Apache-2.0

use super::chars::{Char16, NUL_16};
use core::fmt;

/// Errors which can occur during checked `[u16]` -> [`CStr16`] conversions
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FromSliceWithNulError {
    /// An invalid character was encountered before the end of the slice
    InvalidChar(usize),

    /// A null character was encountered before the end of the slice
    InteriorNul(usize),

    /// The slice was not null-terminated
    NotNulTerminated,
}

/// Error returned by [`CStr16::from_str_with_buf`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FromStrWithBufError {
    /// An invalid character was encountered before the end of the string
    InvalidChar(usize),

    /// A null character was encountered in the string
    InteriorNul(usize),

    /// The buffer is not big enough to hold the entire string and
    /// trailing null character
    BufferTooSmall,
}

/// An UCS-2 null-terminated string.
///
/// Variable names travel over the wire in this encoding, terminator
/// included. The type is largely inspired by [`core::ffi::CStr`] with the
/// exception that all characters are guaranteed to be 16 bit long.
#[derive(Eq, PartialEq)]
#[repr(transparent)]
pub struct CStr16([Char16]);

impl CStr16 {
    /// Creates a C string wrapper from a u16 slice
    ///
    /// Since not every u16 value is a valid UCS-2 code point, this function
    /// must do a bit more validity checking than CStr::from_bytes_with_nul
    pub fn from_u16_with_nul(codes: &[u16]) -> Result<&Self, FromSliceWithNulError> {
        for (pos, &code) in codes.iter().enumerate() {
            match code.try_into() {
                Ok(NUL_16) => {
                    if pos != codes.len() - 1 {
                        return Err(FromSliceWithNulError::InteriorNul(pos));
                    } else {
                        return Ok(unsafe { Self::from_u16_with_nul_unchecked(codes) });
                    }
                }
                Err(_) => {
                    return Err(FromSliceWithNulError::InvalidChar(pos));
                }
                _ => {}
            }
        }
        Err(FromSliceWithNulError::NotNulTerminated)
    }

    /// Creates a C string wrapper from the start of a u16 slice, stopping at
    /// the first null character. Anything after the terminator is ignored,
    /// which is what a name buffer filled by the secure side looks like.
    pub fn from_u16_until_nul(codes: &[u16]) -> Result<&Self, FromSliceWithNulError> {
        let nul_pos = codes
            .iter()
            .position(|&c| c == 0)
            .ok_or(FromSliceWithNulError::NotNulTerminated)?;
        Self::from_u16_with_nul(&codes[..=nul_pos])
    }

    /// Unsafely creates a C string wrapper from a u16 slice.
    ///
    /// # Safety
    ///
    /// It's the callers responsibility to ensure chars is a valid UCS-2
    /// null-terminated string, with no interior null characters.
    #[must_use]
    pub const unsafe fn from_u16_with_nul_unchecked(codes: &[u16]) -> &Self {
        &*(codes as *const [u16] as *const Self)
    }

    /// Convert a [`&str`] to a `&CStr16`, backed by a buffer.
    ///
    /// The input string must contain only characters representable with
    /// UCS-2, and must not contain any null characters (even at the end of
    /// the input).
    ///
    /// The backing buffer must be big enough to hold the converted string as
    /// well as a trailing null character.
    ///
    /// # Examples
    ///
    /// ```
    /// use uefisecapp::CStr16;
    ///
    /// let mut buf = [0; 9];
    /// let name = CStr16::from_str_with_buf("BootOrder", &mut buf);
    /// assert!(name.is_err());
    ///
    /// let mut buf = [0; 10];
    /// let name = CStr16::from_str_with_buf("BootOrder", &mut buf).unwrap();
    /// assert_eq!(name.num_bytes(), 20);
    /// ```
    pub fn from_str_with_buf<'a>(
        input: &str,
        buf: &'a mut [u16],
    ) -> Result<&'a Self, FromStrWithBufError> {
        // Leave room for the trailing null character.
        let (terminator, chars) = buf
            .split_last_mut()
            .ok_or(FromStrWithBufError::BufferTooSmall)?;
        *terminator = 0;

        let index = ucs2::encode(input, chars).map_err(|err| match err {
            ucs2::Error::BufferOverflow => FromStrWithBufError::BufferTooSmall,
            ucs2::Error::MultiByte => {
                let pos = input.chars().take_while(|&c| u32::from(c) <= 0xFFFF).count();
                FromStrWithBufError::InvalidChar(pos)
            }
        })?;
        buf[index] = 0;

        // Checks for interior nulls. The NotNulTerminated case is unreachable
        // because we just added a trailing null character.
        Self::from_u16_with_nul(&buf[..index + 1]).map_err(|err| match err {
            FromSliceWithNulError::InvalidChar(p) => FromStrWithBufError::InvalidChar(p),
            FromSliceWithNulError::InteriorNul(p) => FromStrWithBufError::InteriorNul(p),
            FromSliceWithNulError::NotNulTerminated => unreachable!(),
        })
    }

    /// Get the underlying [`Char16`]s as slice without the trailing null.
    #[must_use]
    pub fn as_slice(&self) -> &[Char16] {
        &self.0[..self.num_chars()]
    }

    /// Converts this C string to a u16 slice without the trailing null.
    #[must_use]
    pub fn to_u16_slice(&self) -> &[u16] {
        let chars = self.to_u16_slice_with_nul();
        &chars[..chars.len() - 1]
    }

    /// Converts this C string to a u16 slice containing the trailing null.
    #[must_use]
    pub const fn to_u16_slice_with_nul(&self) -> &[u16] {
        unsafe { &*(&self.0 as *const [Char16] as *const [u16]) }
    }

    /// Returns the number of characters without the trailing null. character
    #[must_use]
    pub const fn num_chars(&self) -> usize {
        self.0.len() - 1
    }

    /// Returns if the string is empty. This ignores the null character.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.num_chars() == 0
    }

    /// Get the number of bytes in the string (including the trailing null).
    #[must_use]
    pub const fn num_bytes(&self) -> usize {
        self.0.len() * 2
    }

    /// Iterate over the characters of the string, excluding the trailing null.
    pub fn chars(&self) -> impl Iterator<Item = Char16> + '_ {
        self.as_slice().iter().copied()
    }

    /// Compare the string with a Rust string slice, character by character.
    #[must_use]
    pub fn eq_str(&self, other: &str) -> bool {
        self.chars().map(char::from).eq(other.chars())
    }
}

impl fmt::Debug for CStr16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CStr16({:?})", &self.0)
    }
}

impl fmt::Display for CStr16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            <Char16 as fmt::Display>::fmt(&c, f)?;
        }
        Ok(())
    }
}

impl AsRef<CStr16> for CStr16 {
    fn as_ref(&self) -> &CStr16 {
        self
    }
}
