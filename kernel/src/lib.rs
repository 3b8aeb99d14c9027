// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Core boot kernel.
//!
//! The kernel crate holds the code shared by the chip crates: the Hardware
//! Interface Layer (HIL) traits the boot firmware programs against, the
//! standard error type, the debug output path and the register utilities.
//!
//! Most `unsafe` code is in this kernel crate.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod debug;
pub mod errorcode;
pub mod hil;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
