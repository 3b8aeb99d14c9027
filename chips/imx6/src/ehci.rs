// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! EHCI host controller bring-up for the i.MX6 USBOH3.
//!
//! Brings one controller and its PHY from reset to "EHCI register blocks
//! valid, controller in host mode" and hands the capability and operational
//! blocks to the generic EHCI stack through [`HostController`].
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let config = EhciConfig::from_build_config()?;
//! let ehci = unsafe { Imx6Ehci::new(&IMX6_USB_BASES, &gpt, NoBoardHook, config) };
//! let registers = ehci.hcd_init(0)?;
//! ```

use ehci::EhciRegisters;
use kernel::debug;
use kernel::hil::time::Time;
use kernel::hil::usb_host::{BoardHook, Error, HostController, NoBoardHook};
use kernel::utilities::delay;
use kernel::ErrorCode;

use crate::anatop::{Anatop, ANATOP_BASE};
use crate::ccm::{Ccm, CCM_BASE};
use crate::config::CONFIG;
use crate::usboh3::{OvercurrentPolarity, UsbPort, Usboh3, USBOH3_BASE};
use crate::usbphy::{UsbPhy, USBPHY_BASES};

const DEBUG: bool = false;

/// Counter reads allowed before the time source is declared stopped. A
/// 1 MHz counter moves within a few hundred reads on any i.MX6 core clock.
const CLOCK_CHECK_READS: u32 = 100_000;

macro_rules! ehci_debug {
    [ $( $arg:expr ),+ ] => {
        if DEBUG {
            kernel::debug_verbose!($( $arg ),+);
        }
    };
}

/// DIGPROG major revision of the i.MX6 Dual/Quad.
const MX6DQ_MAJOR: u8 = 0x63;
/// DIGPROG minor revision of i.MX6Q silicon 1.1.
const MX6Q_LAST_EARLY_MINOR: u8 = 0x01;

/// Board wiring that changes how the controller is set up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoardVariant {
    Default,
    /// MX6Q ARM2 development board, overcurrent input is active high.
    Mx6qArm2,
}

impl BoardVariant {
    pub fn overcurrent_polarity(self) -> OvercurrentPolarity {
        match self {
            BoardVariant::Default => OvercurrentPolarity::ActiveLow,
            BoardVariant::Mx6qArm2 => OvercurrentPolarity::ActiveHigh,
        }
    }
}

/// Validated bring-up parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EhciConfig {
    port: UsbPort,
    board: BoardVariant,
    usb_swfix: bool,
    portsc: u32,
    timeout_us: u32,
}

impl EhciConfig {
    /// How long a stop or reset handshake may take.
    pub const DEFAULT_TIMEOUT_US: u32 = 100_000;

    /// Bring up controller `port` with the build-time defaults.
    ///
    /// Only the OTG (0) and Host1 (1) controllers have an on-chip UTMI PHY;
    /// any other index is rejected.
    pub fn new(port: usize) -> Result<EhciConfig, Error> {
        let port = UsbPort::try_from(port)?;
        if port.phy_index().is_none() {
            return Err(Error::UnsupportedPort(port.index()));
        }
        Ok(EhciConfig {
            port,
            board: CONFIG.board,
            usb_swfix: CONFIG.usb_swfix,
            portsc: CONFIG.usb_portsc,
            timeout_us: Self::DEFAULT_TIMEOUT_US,
        })
    }

    /// The configuration selected by the crate's Cargo features.
    pub fn from_build_config() -> Result<EhciConfig, Error> {
        EhciConfig::new(CONFIG.usb_port)
    }

    pub fn with_board(mut self, board: BoardVariant) -> EhciConfig {
        self.board = board;
        self
    }

    /// Leave out the PHY analog fix, for silicon that must not get it.
    pub fn with_usb_swfix(mut self, usb_swfix: bool) -> EhciConfig {
        self.usb_swfix = usb_swfix;
        self
    }

    /// PORTSC1 value written before the port is enabled.
    pub fn with_portsc(mut self, portsc: u32) -> EhciConfig {
        self.portsc = portsc;
        self
    }

    /// Pick the software-fix flag from the `(major, minor)` silicon revision
    /// read from DIGPROG, see [`Anatop::silicon_revision`].
    ///
    /// i.MX6Q up to 1.1 and i.MX6D up to 1.0 must not get the PHY analog
    /// fix. Both report major 0x63 and DIGPROG does not tell them apart, so
    /// every 0x63 part before 1.2 is treated as early silicon.
    ///
    /// [`Anatop::silicon_revision`]: crate::anatop::Anatop::silicon_revision
    pub fn with_silicon_revision(mut self, (major, minor): (u8, u8)) -> EhciConfig {
        self.usb_swfix = major == MX6DQ_MAJOR && minor <= MX6Q_LAST_EARLY_MINOR;
        self
    }

    pub fn with_timeout_us(mut self, timeout_us: u32) -> EhciConfig {
        self.timeout_us = timeout_us;
        self
    }

    pub fn port(&self) -> UsbPort {
        self.port
    }

    pub fn board(&self) -> BoardVariant {
        self.board
    }

    pub fn usb_swfix(&self) -> bool {
        self.usb_swfix
    }

    pub fn portsc(&self) -> u32 {
        self.portsc
    }

    pub fn timeout_us(&self) -> u32 {
        self.timeout_us
    }
}

/// Register block addresses used by USB bring-up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UsbBaseAddresses {
    pub ccm: usize,
    pub anatop: usize,
    pub usbphy: [usize; 2],
    pub usboh3: usize,
}

pub const IMX6_USB_BASES: UsbBaseAddresses = UsbBaseAddresses {
    ccm: CCM_BASE,
    anatop: ANATOP_BASE,
    usbphy: USBPHY_BASES,
    usboh3: USBOH3_BASE,
};

pub struct Imx6Ehci<'a, T: Time, B: BoardHook = NoBoardHook> {
    ccm: Ccm,
    anatop: Anatop,
    phys: [UsbPhy; 2],
    usboh3: Usboh3,
    time: &'a T,
    board: B,
    config: EhciConfig,
}

impl<'a, T: Time, B: BoardHook> Imx6Ehci<'a, T, B> {
    /// # Safety
    ///
    /// Every address in `bases` must point at the matching register block
    /// and nothing else may drive those blocks while the driver is used.
    pub unsafe fn new(
        bases: &UsbBaseAddresses,
        time: &'a T,
        board: B,
        config: EhciConfig,
    ) -> Imx6Ehci<'a, T, B> {
        // Safety: forwarded to the caller.
        unsafe {
            Imx6Ehci {
                ccm: Ccm::new(bases.ccm),
                anatop: Anatop::new(bases.anatop),
                phys: [UsbPhy::new(bases.usbphy[0]), UsbPhy::new(bases.usbphy[1])],
                usboh3: Usboh3::new(bases.usboh3),
                time,
                board,
                config,
            }
        }
    }

    pub fn config(&self) -> &EhciConfig {
        &self.config
    }

    fn phy(&self, port: UsbPort) -> Option<&UsbPhy> {
        port.phy_index().map(|index| &self.phys[index])
    }

    /// Ungate (`enabled`) or gate the UTMI clocks of `port`'s PHY.
    pub fn set_phy_clock_gate(&self, port: UsbPort, enabled: bool) {
        if let Some(phy) = self.phy(port) {
            phy.set_clock_enabled(enabled);
        }
    }

    /// Power the PLL of `port`'s PHY and disable charger detection.
    pub fn configure_usb_power(&self, port: UsbPort) {
        self.anatop.configure_usb_power(port);
    }

    /// Stop and reset the controller, then reset and power up its PHY.
    pub fn enable_phy(&self, port: UsbPort) -> Result<(), Error> {
        let phy = self.phy(port).ok_or(Error::UnsupportedPort(port.index()))?;
        let timeout_us = self.config.timeout_us;

        self.usboh3.stop_controller(port, self.time, timeout_us)?;
        self.usboh3.reset_controller(port, self.time, timeout_us)?;
        ehci_debug!("usb{}: controller reset", port.index());

        phy.soft_reset(self.time);
        phy.power_up();
        phy.enable_utmi_levels();
        if !self.config.usb_swfix {
            phy.apply_analog_fix();
        }
        Ok(())
    }

    pub fn configure_overcurrent(&self, port: UsbPort) {
        self.usboh3
            .configure_overcurrent(port, self.config.board.overcurrent_polarity());
    }

    /// Bring the configured controller up in host mode.
    ///
    /// Every delay and deadline is measured on the time source given to
    /// [`Imx6Ehci::new`], so it must already be counting; for [`Gpt`] that
    /// means its CCM gate is on and [`Gpt::start`] has run.
    ///
    /// # Errors
    ///
    /// `ClockStopped` if the time source does not advance, `Board` if the
    /// board hook fails, `HardwareTimeout` if the controller does not stop
    /// or leave reset within the configured timeout.
    ///
    /// [`Gpt`]: crate::gpt::Gpt
    /// [`Gpt::start`]: crate::gpt::Gpt::start
    pub fn init(&self) -> Result<EhciRegisters, Error> {
        let port = self.config.port;

        delay::wait_for_tick(self.time, CLOCK_CHECK_READS)
            .map_err(|_| Error::ClockStopped)?;

        self.ccm.enable_usboh3_clock();
        delay::busy_wait_ms(self.time, 1);

        self.board
            .board_ehci_hcd_init(port.index())
            .map_err(Error::Board)?;

        self.configure_usb_power(port);
        self.configure_overcurrent(port);
        self.set_phy_clock_gate(port, true);
        self.enable_phy(port)?;

        let registers = self.usboh3.ehci_registers(port);
        ehci_debug!(
            "usb{}: hccr {:#x} hcor {:#x}",
            port.index(),
            registers.hccr.address(),
            registers.hcor.address()
        );

        self.usboh3.set_host_mode(port);
        self.usboh3.enable_port(port, self.config.portsc);

        delay::busy_wait_ms(self.time, 10);
        Ok(registers)
    }
}

impl<T: Time, B: BoardHook> HostController for Imx6Ehci<'_, T, B> {
    type Registers = EhciRegisters;

    // The configured port decides which controller comes up.
    fn hcd_init(&self, _index: usize) -> Result<EhciRegisters, ErrorCode> {
        self.init().map_err(|err| {
            debug!("usb{}: EHCI init failed: {:?}", self.config.port.index(), err);
            ErrorCode::from(err)
        })
    }

    fn hcd_stop(&self, _index: usize) -> Result<(), ErrorCode> {
        Ok(())
    }
}
