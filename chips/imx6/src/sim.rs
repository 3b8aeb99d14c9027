// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register file of the USB related i.MX6 blocks, backed by host memory.
//!
//! Drivers under test get the addresses of these blocks instead of the SoC
//! ones. The little hardware behaviour boot code depends on is applied by
//! [`SimulatedSoc::step`], which also runs on every read of the simulated
//! 1 MHz counter:
//!
//! - writes to SET, CLR and TOG aliases are folded into their register,
//! - `USBCMD.RST` clears itself, unless the controller is held in reset,
//! - `USBCMD.RS` stays set while the controller is held running.

use core::cell::Cell;
use std::boxed::Box;
use std::vec;

use kernel::hil::time::{Freq1MHz, Time};

use crate::anatop::{Anatop, AnatopRegisters};
use crate::ccm::{Ccm, CcmRegisters};
use crate::ehci::UsbBaseAddresses;
use crate::gpt::{Gpt, GptRegisters};
use crate::usboh3::{UsbCoreRegisters, UsbNonCoreRegisters, Usboh3, Usboh3Registers};
use crate::usbphy::{UsbPhy, UsbPhyRegisters};

/// Registers with SET/CLR/TOG aliases at +4/+8/+0xC.
const ANATOP_ALIASED: [usize; 8] = [0x010, 0x020, 0x1A0, 0x1B0, 0x1F0, 0x200, 0x210, 0x250];
const USBPHY_ALIASED: [usize; 5] = [0x00, 0x10, 0x20, 0x30, 0x90];

const CORE_SIZE: usize = 0x200;
const CAPLENGTH_OFFSET: usize = 0x100;
const HCSPARAMS_OFFSET: usize = 0x104;
const USBCMD_OFFSET: usize = 0x140;
const USBCMD_RS: u32 = 1 << 0;
const USBCMD_RST: u32 = 1 << 1;

/// i.MX6 reset values: EHCI 1.0, operational block at +0x40, one port.
const CAPLENGTH_RESET: u32 = 0x0100_0040;
const HCSPARAMS_RESET: u32 = 0x0000_0001;

fn block(bytes: usize) -> usize {
    Box::leak(vec![0u32; bytes.div_ceil(4)].into_boxed_slice()).as_mut_ptr() as usize
}

pub struct SimulatedSoc {
    bases: UsbBaseAddresses,
    gpt: usize,
    ticks: Cell<u32>,
    held_in_reset: Cell<bool>,
    held_running: Cell<bool>,
    resets: Cell<usize>,
}

impl SimulatedSoc {
    pub fn new() -> SimulatedSoc {
        let soc = SimulatedSoc {
            bases: UsbBaseAddresses {
                ccm: block(core::mem::size_of::<CcmRegisters>()),
                anatop: block(core::mem::size_of::<AnatopRegisters>()),
                usbphy: [
                    block(core::mem::size_of::<UsbPhyRegisters>()),
                    block(core::mem::size_of::<UsbPhyRegisters>()),
                ],
                usboh3: block(core::mem::size_of::<Usboh3Registers>()),
            },
            gpt: block(core::mem::size_of::<GptRegisters>()),
            ticks: Cell::new(0),
            held_in_reset: Cell::new(false),
            held_running: Cell::new(false),
            resets: Cell::new(0),
        };
        for port in 0..4 {
            let core = soc.bases.usboh3 + CORE_SIZE * port;
            soc.poke(core + CAPLENGTH_OFFSET, CAPLENGTH_RESET);
            soc.poke(core + HCSPARAMS_OFFSET, HCSPARAMS_RESET);
        }
        soc
    }

    pub fn bases(&self) -> UsbBaseAddresses {
        self.bases
    }

    pub fn gpt_base(&self) -> usize {
        self.gpt
    }

    pub fn peek(&self, address: usize) -> u32 {
        unsafe { (address as *const u32).read_volatile() }
    }

    pub fn poke(&self, address: usize, value: u32) {
        unsafe { (address as *mut u32).write_volatile(value) }
    }

    /// Ticks of the simulated counter read so far.
    pub fn elapsed(&self) -> u32 {
        self.ticks.get()
    }

    pub fn set_capability_length(&self, port: usize, length: u8) {
        let address = self.bases.usboh3 + CORE_SIZE * port + CAPLENGTH_OFFSET;
        self.poke(address, (self.peek(address) & !0xFF) | length as u32);
    }

    pub fn set_digprog(&self, value: u32) {
        self.poke(self.bases.anatop + 0x260, value);
    }

    /// Keep `USBCMD.RST` set once software sets it.
    pub fn hold_in_reset(&self, held: bool) {
        self.held_in_reset.set(held);
    }

    /// Ignore requests to stop: `USBCMD.RS` reads back set.
    pub fn hold_running(&self, held: bool) {
        self.held_running.set(held);
    }

    /// Controller resets that completed.
    pub fn controller_resets(&self) -> usize {
        self.resets.get()
    }

    pub fn step(&self) {
        for offset in ANATOP_ALIASED {
            self.fold_aliases(self.bases.anatop + offset);
        }
        for phy in self.bases.usbphy {
            for offset in USBPHY_ALIASED {
                self.fold_aliases(phy + offset);
            }
        }

        for port in 0..4 {
            let usbcmd = self.bases.usboh3 + CORE_SIZE * port + USBCMD_OFFSET;
            let value = self.peek(usbcmd);
            if self.held_running.get() {
                self.poke(usbcmd, value | USBCMD_RS);
            } else if value & USBCMD_RST != 0 && !self.held_in_reset.get() {
                self.poke(usbcmd, value & !USBCMD_RST);
                self.resets.set(self.resets.get() + 1);
            }
        }
    }

    fn fold_aliases(&self, register: usize) {
        let set = self.peek(register + 0x4);
        let clr = self.peek(register + 0x8);
        let tog = self.peek(register + 0xC);
        if set | clr | tog == 0 {
            return;
        }
        let value = ((self.peek(register) | set) & !clr) ^ tog;
        self.poke(register, value);
        for alias in [0x4, 0x8, 0xC] {
            self.poke(register + alias, 0);
        }
    }

    pub fn ccm(&self) -> Ccm {
        unsafe { Ccm::new(self.bases.ccm) }
    }

    pub fn anatop(&self) -> Anatop {
        unsafe { Anatop::new(self.bases.anatop) }
    }

    pub fn phy(&self, index: usize) -> UsbPhy {
        unsafe { UsbPhy::new(self.bases.usbphy[index]) }
    }

    pub fn usboh3(&self) -> Usboh3 {
        unsafe { Usboh3::new(self.bases.usboh3) }
    }

    pub fn gpt(&self) -> Gpt {
        unsafe { Gpt::new(self.gpt) }
    }

    pub fn ccm_registers(&self) -> &CcmRegisters {
        unsafe { &*(self.bases.ccm as *const CcmRegisters) }
    }

    pub fn anatop_registers(&self) -> &AnatopRegisters {
        unsafe { &*(self.bases.anatop as *const AnatopRegisters) }
    }

    pub fn phy_registers(&self, index: usize) -> &UsbPhyRegisters {
        unsafe { &*(self.bases.usbphy[index] as *const UsbPhyRegisters) }
    }

    pub fn core_registers(&self, port: usize) -> &UsbCoreRegisters {
        unsafe { &(*(self.bases.usboh3 as *const Usboh3Registers)).core[port] }
    }

    pub fn noncore_registers(&self) -> &UsbNonCoreRegisters {
        unsafe { &(*(self.bases.usboh3 as *const Usboh3Registers)).noncore }
    }

    pub fn gpt_registers(&self) -> &GptRegisters {
        unsafe { &*(self.gpt as *const GptRegisters) }
    }
}

impl Time for SimulatedSoc {
    type Frequency = Freq1MHz;

    fn now(&self) -> u32 {
        let now = self.ticks.get();
        self.ticks.set(now.wrapping_add(1));
        self.step();
        now
    }
}

#[cfg(test)]
mod tests {
    use super::SimulatedSoc;
    use kernel::hil::time::Time;

    #[test]
    fn aliases_fold_on_step() {
        let soc = SimulatedSoc::new();
        let ctrl = soc.bases().usbphy[0] + 0x30;
        soc.poke(ctrl, 0b0011);
        soc.poke(ctrl + 0x4, 0b0100);
        soc.poke(ctrl + 0x8, 0b0001);
        soc.poke(ctrl + 0xC, 0b1000);

        soc.step();
        assert_eq!(soc.peek(ctrl), 0b1110);
        assert_eq!(soc.peek(ctrl + 0x4), 0);
    }

    #[test]
    fn reset_clears_itself_unless_held() {
        let soc = SimulatedSoc::new();
        let usbcmd = soc.bases().usboh3 + 0x140;

        soc.hold_in_reset(true);
        soc.poke(usbcmd, 0b11);
        soc.now();
        assert_eq!(soc.peek(usbcmd), 0b11);

        soc.hold_in_reset(false);
        assert_eq!(soc.now(), 1);
        assert_eq!(soc.peek(usbcmd), 0b01);
        assert_eq!(soc.controller_resets(), 1);
    }

    #[test]
    fn run_bit_sticks_while_held_running() {
        let soc = SimulatedSoc::new();
        let usbcmd = soc.bases().usboh3 + 0x200 + 0x140;

        soc.hold_running(true);
        soc.poke(usbcmd, 0);
        soc.now();
        assert_eq!(soc.peek(usbcmd), 0b01);

        soc.hold_running(false);
        soc.poke(usbcmd, 0);
        soc.now();
        assert_eq!(soc.peek(usbcmd), 0);
    }
}
