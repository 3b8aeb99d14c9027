// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interface between SoC USB host controller glue and the generic host stack.
//!
//! A chip implements [`HostController`] to bring its controller up far enough
//! for a generic EHCI driver to take over. The generic driver calls
//! `hcd_init` once at boot and uses the returned register blocks for all
//! further work; `hcd_stop` is its teardown counterpart.
//!
//! Boards customize bring-up (VBUS switches, hub resets, ...) through
//! [`BoardHook`], which runs after the controller clock is on and before the
//! PHY is touched.

use crate::ErrorCode;

/// Host controller lifecycle expected by the generic host stack.
pub trait HostController {
    /// Register blocks handed to the generic driver on success.
    type Registers;

    /// Power, reset and configure controller `index` for host mode.
    fn hcd_init(&self, index: usize) -> Result<Self::Registers, ErrorCode>;

    /// Counterpart of `hcd_init`.
    fn hcd_stop(&self, index: usize) -> Result<(), ErrorCode>;
}

/// Board specific step of host controller bring-up.
///
/// The default implementation does nothing, so a board only implements the
/// trait when it has something to do.
pub trait BoardHook {
    fn board_ehci_hcd_init(&self, _port: usize) -> Result<(), ErrorCode> {
        Ok(())
    }
}

/// Hook for boards with no USB power sequencing of their own.
#[derive(Debug, Default)]
pub struct NoBoardHook;

impl BoardHook for NoBoardHook {}

/// The controller handshake that did not complete.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResetStep {
    /// Waiting for the run/stop bit to read back clear.
    Stop,
    /// Waiting for the self-clearing controller reset bit.
    Reset,
}

/// Errors of host controller bring-up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// No controller with a usable PHY sits behind this port index.
    UnsupportedPort(usize),
    /// The controller did not acknowledge a stop or reset request in time.
    HardwareTimeout(ResetStep),
    /// The board hook refused to continue.
    Board(ErrorCode),
    /// The time source used for delays and deadlines is not counting.
    ClockStopped,
}

impl From<Error> for ErrorCode {
    fn from(val: Error) -> Self {
        match val {
            Error::UnsupportedPort(_) => ErrorCode::NODEVICE,
            Error::HardwareTimeout(_) => ErrorCode::NOACK,
            Error::Board(code) => code,
            Error::ClockStopped => ErrorCode::OFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardHook, Error, NoBoardHook, ResetStep};
    use crate::ErrorCode;

    #[test]
    fn default_hook_succeeds_for_any_port() {
        assert_eq!(NoBoardHook.board_ehci_hcd_init(0), Ok(()));
        assert_eq!(NoBoardHook.board_ehci_hcd_init(3), Ok(()));
    }

    #[test]
    fn errors_map_onto_error_codes() {
        assert_eq!(
            ErrorCode::from(Error::UnsupportedPort(2)),
            ErrorCode::NODEVICE
        );
        assert_eq!(
            ErrorCode::from(Error::HardwareTimeout(ResetStep::Reset)),
            ErrorCode::NOACK
        );
        assert_eq!(ErrorCode::from(Error::Board(ErrorCode::OFF)), ErrorCode::OFF);
        assert_eq!(ErrorCode::from(Error::ClockStopped), ErrorCode::OFF);
    }
}
