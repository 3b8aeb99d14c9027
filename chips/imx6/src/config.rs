// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Build-time defaults for USB host bring-up.
//!
//! Boards pick these through Cargo features of the `imx6` crate. Keeping them
//! in a typed `const` means every variant is still type-checked when its
//! feature is off, and the compiler folds the unused branches away. This is
//! the only place in the crate where `cfg!(feature = ...)` is read.
//!
//! The values only seed [`crate::ehci::EhciConfig::from_build_config`];
//! boards that need something else construct an `EhciConfig` directly.

use crate::ehci::BoardVariant;
use crate::usboh3::PORTSC1;

/// Compile-time USB configuration.
pub struct Config {
    /// Controller index to bring up, 0 (OTG) or 1 (Host1).
    pub usb_port: usize,

    /// Board wiring variant, selects the overcurrent polarity.
    pub board: BoardVariant,

    /// Whether the silicon needs the PHY IP register write left out.
    pub usb_swfix: bool,

    /// Value written to PORTSC1 before the port is enabled.
    pub usb_portsc: u32,
}

/// UTMI transceiver with a 16-bit data bus.
const UTMI_WIDE: u32 = PORTSC1::PTS::Utmi.value | PORTSC1::PTW::SET.value;

pub const CONFIG: Config = Config {
    usb_port: if cfg!(feature = "usb_host1") { 1 } else { 0 },
    board: if cfg!(feature = "mx6q_arm2") {
        BoardVariant::Mx6qArm2
    } else {
        BoardVariant::Default
    },
    usb_swfix: cfg!(feature = "usb_swfix"),
    usb_portsc: UTMI_WIDE,
};
