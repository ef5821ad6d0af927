// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Status;
use core::fmt;

/// Status code as reported by the secure application in a response frame.
///
/// The secure application speaks a 32-bit flavor of the UEFI status
/// vocabulary: the top nibble carries the category (error, warning, OEM
/// ranges) and the remaining 28 bits the code. Widening into [`Status`]
/// moves the category nibble to the top of a `usize`, keeping the code in
/// place, so categories survive bit-for-bit instead of going through a
/// lookup table.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct SecureStatus(pub u32);

impl SecureStatus {
    /// The success status.
    pub const SUCCESS: Self = Self(0);

    const CATEGORY_MASK: u32 = 0xf000_0000;
    const CODE_MASK: u32 = 0x0fff_ffff;

    /// Returns true if the secure side reported success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// The category nibble, still in its 32-bit position.
    #[must_use]
    pub const fn category(self) -> u32 {
        self.0 & Self::CATEGORY_MASK
    }

    /// The code without its category.
    #[must_use]
    pub const fn code(self) -> u32 {
        self.0 & Self::CODE_MASK
    }

    /// Widen into a native [`Status`].
    pub const fn to_status(self) -> Status {
        let category = self.category() as usize;
        let code = self.code() as usize;
        Status(category << (usize::BITS - u32::BITS) | code)
    }
}

impl From<SecureStatus> for Status {
    fn from(status: SecureStatus) -> Self {
        status.to_status()
    }
}

impl fmt::Debug for SecureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureStatus({:#010x})", self.0)
    }
}
