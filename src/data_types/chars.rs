// SPDX-License-Identifier: MIT OR Apache-2.0

//! UCS-2 character handling.

use core::fmt;

/// Character conversion error
#[derive(Clone, Copy, Debug)]
pub struct CharConversionError;

impl fmt::Display for CharConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl core::error::Error for CharConversionError {}

/// An UCS-2 code point
#[derive(Clone, Copy, Default, Eq, PartialEq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Char16(u16);

impl Char16 {
    /// Creates a UCS-2 character from a Rust character without checks.
    ///
    /// # Safety
    /// The caller must be sure that the character is valid.
    #[must_use]
    pub const unsafe fn from_u16_unchecked(val: u16) -> Self {
        Self(val)
    }
}

impl TryFrom<char> for Char16 {
    type Error = CharConversionError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let code_point = u32::from(value);
        u16::try_from(code_point)
            .map(Char16)
            .map_err(|_| CharConversionError)
    }
}

impl From<Char16> for char {
    fn from(char: Char16) -> Self {
        u32::from(char.0)
            .try_into()
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

impl TryFrom<u16> for Char16 {
    type Error = CharConversionError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        // Surrogate halves are not UCS-2 characters.
        if (0xD800..=0xDFFF).contains(&value) {
            Err(CharConversionError)
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Char16> for u16 {
    fn from(char: Char16) -> Self {
        char.0
    }
}

impl fmt::Debug for Char16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <char as fmt::Debug>::fmt(&From::from(*self), f)
    }
}

impl fmt::Display for Char16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <char as fmt::Display>::fmt(&From::from(*self), f)
    }
}

/// UCS-2 version of the NUL character
pub const NUL_16: Char16 = Char16(0);
