// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Status;

newtype_enum! {
/// Generic error numbers, for callers that do not speak UEFI statuses.
///
/// Values follow the Linux numbering.
pub enum Errno: i32 => {
    /// No such file or directory.
    ENOENT    =  2,
    /// Interrupted system call.
    EINTR     =  4,
    /// I/O error.
    EIO       =  5,
    /// Try again.
    EAGAIN    = 11,
    /// Permission denied.
    EACCES    = 13,
    /// File exists.
    EEXIST    = 17,
    /// Invalid argument.
    EINVAL    = 22,
    /// No space left on device.
    ENOSPC    = 28,
    /// Read-only file system.
    EROFS     = 30,
    /// Result too large.
    ERANGE    = 34,
}}

impl Errno {
    /// The value as a negative return code, as returned by kernel-style
    /// interfaces.
    #[must_use]
    pub const fn as_neg(self) -> i32 {
        -self.0
    }
}

impl Status {
    /// Project this status onto the generic error vocabulary.
    ///
    /// Success maps to `Ok(())`. Statuses without a dedicated error number
    /// map to [`Errno::EINVAL`].
    pub const fn to_errno(self) -> Result<(), Errno> {
        let errno = match self {
            Self::SUCCESS => return Ok(()),
            Self::INVALID_PARAMETER => Errno::EINVAL,
            Self::OUT_OF_RESOURCES => Errno::ENOSPC,
            Self::DEVICE_ERROR => Errno::EIO,
            Self::WRITE_PROTECTED => Errno::EROFS,
            Self::SECURITY_VIOLATION => Errno::EACCES,
            Self::NOT_FOUND => Errno::ENOENT,
            Self::ABORTED => Errno::EINTR,
            Self::BUFFER_TOO_SMALL => Errno::ERANGE,
            Self::NOT_READY => Errno::EAGAIN,
            _ => Errno::EINVAL,
        };
        Err(errno)
    }
}

impl From<Status> for Errno {
    /// Like [`Status::to_errno`], with success folded into [`Errno::EINVAL`]
    /// since there is no error number for it.
    fn from(status: Status) -> Self {
        status.to_errno().err().unwrap_or(Self::EINVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_to_errno() {
        assert_eq!(Status::SUCCESS.to_errno(), Ok(()));
        assert_eq!(Status::INVALID_PARAMETER.to_errno(), Err(Errno::EINVAL));
        assert_eq!(Status::OUT_OF_RESOURCES.to_errno(), Err(Errno::ENOSPC));
        assert_eq!(Status::DEVICE_ERROR.to_errno(), Err(Errno::EIO));
        assert_eq!(Status::WRITE_PROTECTED.to_errno(), Err(Errno::EROFS));
        assert_eq!(Status::SECURITY_VIOLATION.to_errno(), Err(Errno::EACCES));
        assert_eq!(Status::NOT_FOUND.to_errno(), Err(Errno::ENOENT));
        assert_eq!(Status::ABORTED.to_errno(), Err(Errno::EINTR));
        assert_eq!(Status::BUFFER_TOO_SMALL.to_errno(), Err(Errno::ERANGE));
        assert_eq!(Status::NOT_READY.to_errno(), Err(Errno::EAGAIN));
    }

    #[test]
    fn test_unmapped_status_is_invalid() {
        assert_eq!(Status::CRC_ERROR.to_errno(), Err(Errno::EINVAL));
        assert_eq!(Status(Status::ERROR_BIT | 0x7777).to_errno(), Err(Errno::EINVAL));
        assert_eq!(Errno::from(Status::NOT_FOUND).as_neg(), -2);
    }
}
