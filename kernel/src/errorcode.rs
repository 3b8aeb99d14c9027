// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Standard error enum for invoking operations

/// Standard errors in the boot kernel.
///
/// Every HIL operation that can fail reports one of these. Drivers that need
/// a richer error keep their own type and convert into `ErrorCode` at the HIL
/// boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 0,
    /// Underlying system is busy; retry
    BUSY = 1,
    /// The state requested is already set
    ALREADY = 2,
    /// The component is powered down
    OFF = 3,
    /// An invalid parameter was passed
    INVAL = 5,
    /// Operation or command is unsupported
    NOSUPPORT = 9,
    /// Device does not exist
    NODEVICE = 10,
    /// Hardware did not acknowledge a request
    NOACK = 12,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl TryFrom<usize> for ErrorCode {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::FAIL),
            1 => Ok(ErrorCode::BUSY),
            2 => Ok(ErrorCode::ALREADY),
            3 => Ok(ErrorCode::OFF),
            5 => Ok(ErrorCode::INVAL),
            9 => Ok(ErrorCode::NOSUPPORT),
            10 => Ok(ErrorCode::NODEVICE),
            12 => Ok(ErrorCode::NOACK),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;

    #[test]
    fn codes_survive_the_usize_boundary() {
        for code in [
            ErrorCode::FAIL,
            ErrorCode::BUSY,
            ErrorCode::ALREADY,
            ErrorCode::OFF,
            ErrorCode::INVAL,
            ErrorCode::NOSUPPORT,
            ErrorCode::NODEVICE,
            ErrorCode::NOACK,
        ] {
            assert_eq!(ErrorCode::try_from(usize::from(code)), Ok(code));
        }
    }

    #[test]
    fn codes_match_the_kernel_numbering() {
        assert_eq!(usize::from(ErrorCode::FAIL), 0);
        assert_eq!(usize::from(ErrorCode::NODEVICE), 10);
        assert_eq!(usize::from(ErrorCode::NOACK), 12);
    }

    #[test]
    fn unused_numbers_are_rejected() {
        assert_eq!(ErrorCode::try_from(4), Err(()));
        assert_eq!(ErrorCode::try_from(13), Err(()));
    }
}
