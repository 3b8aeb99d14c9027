// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Peripheral implementations for the i.MX6 SoC family, as needed during
//! boot to bring up the USB host controller.
//!
//! - <https://www.nxp.com/docs/en/reference-manual/IMX6DQRM.pdf>

#![no_std]

#[cfg(test)]
extern crate std;

pub mod anatop;
pub mod ccm;
pub mod config;
pub mod ehci;
pub mod gpt;
pub mod usboh3;
pub mod usbphy;

#[cfg(test)]
mod sim;
