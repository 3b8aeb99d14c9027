// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Clock Controller Module (CCM)
//!
//! Only the clock gates used during boot are exposed.

use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    /// Clock Controller Module
    pub CcmRegisters {
        /// CCM Control Register
        (0x000 => pub ccr: ReadWrite<u32>),
        /// CCM Control Divider Register
        (0x004 => pub ccdr: ReadWrite<u32>),
        /// CCM Status Register
        (0x008 => pub csr: ReadOnly<u32>),
        (0x00C => _reserved0),
        /// CCM Clock Gating Registers 0 to 6
        (0x068 => pub ccgr: [ReadWrite<u32, CCGR::Register>; 7]),
        (0x084 => _reserved1),
        /// CCM Module Enable Override Register
        (0x088 => pub cmeor: ReadWrite<u32>),
        (0x08C => @END),
    }
}

register_bitfields![u32,
    // Every clock gating register is sixteen 2-bit gates:
    // 0b00 off, 0b01 on in run mode only, 0b11 on in all modes but stop.
    pub CCGR [
        CG15 OFFSET(30) NUMBITS(2) [],
        CG14 OFFSET(28) NUMBITS(2) [],
        CG13 OFFSET(26) NUMBITS(2) [],
        CG12 OFFSET(24) NUMBITS(2) [],
        CG11 OFFSET(22) NUMBITS(2) [],
        CG10 OFFSET(20) NUMBITS(2) [],
        CG9 OFFSET(18) NUMBITS(2) [],
        CG8 OFFSET(16) NUMBITS(2) [],
        CG7 OFFSET(14) NUMBITS(2) [],
        CG6 OFFSET(12) NUMBITS(2) [],
        CG5 OFFSET(10) NUMBITS(2) [],
        CG4 OFFSET(8) NUMBITS(2) [],
        CG3 OFFSET(6) NUMBITS(2) [],
        CG2 OFFSET(4) NUMBITS(2) [],
        CG1 OFFSET(2) NUMBITS(2) [],
        CG0 OFFSET(0) NUMBITS(2) []
    ]
];

pub const CCM_BASE: usize = 0x020C_4000;

pub struct Ccm {
    registers: StaticRef<CcmRegisters>,
}

impl Ccm {
    /// # Safety
    ///
    /// `base` must be the address of a CCM register block.
    pub unsafe fn new(base: usize) -> Ccm {
        Ccm {
            registers: unsafe { StaticRef::new(base as *const CcmRegisters) },
        }
    }

    // USBOH3 clock, shared by all four USB controllers
    pub fn is_enabled_usboh3_clock(&self) -> bool {
        self.registers.ccgr[6].read(CCGR::CG0) == 0b11
    }

    pub fn enable_usboh3_clock(&self) {
        self.registers.ccgr[6].modify(CCGR::CG0.val(0b11));
    }

    pub fn disable_usboh3_clock(&self) {
        self.registers.ccgr[6].modify(CCGR::CG0::CLEAR);
    }

    /// GPT clock, bus and serial gates
    pub fn is_enabled_gpt_clock(&self) -> bool {
        self.registers.ccgr[1].read(CCGR::CG10) == 0b11
            && self.registers.ccgr[1].read(CCGR::CG11) == 0b11
    }

    pub fn enable_gpt_clock(&self) {
        self.registers.ccgr[1].modify(CCGR::CG10.val(0b11) + CCGR::CG11.val(0b11));
    }

    pub fn disable_gpt_clock(&self) {
        self.registers.ccgr[1].modify(CCGR::CG10::CLEAR + CCGR::CG11::CLEAR);
    }
}

#[cfg(test)]
mod tests {
    use super::CCGR;
    use crate::sim::SimulatedSoc;
    use kernel::utilities::registers::interfaces::{Readable, Writeable};

    #[test]
    fn usboh3_gate_leaves_neighbours_alone() {
        let soc = SimulatedSoc::new();
        soc.ccm_registers().ccgr[6].set(0xFFFF_FFFC);

        let ccm = soc.ccm();
        assert!(!ccm.is_enabled_usboh3_clock());
        ccm.enable_usboh3_clock();
        assert!(ccm.is_enabled_usboh3_clock());
        assert_eq!(soc.ccm_registers().ccgr[6].get(), 0xFFFF_FFFF);

        ccm.disable_usboh3_clock();
        assert_eq!(soc.ccm_registers().ccgr[6].read(CCGR::CG0), 0);
        assert_eq!(soc.ccm_registers().ccgr[6].get(), 0xFFFF_FFFC);
    }

    #[test]
    fn gpt_gate_needs_both_halves() {
        let soc = SimulatedSoc::new();
        let ccm = soc.ccm();

        soc.ccm_registers().ccgr[1].write(CCGR::CG10.val(0b11));
        assert!(!ccm.is_enabled_gpt_clock());

        ccm.enable_gpt_clock();
        assert!(ccm.is_enabled_gpt_clock());

        ccm.disable_gpt_clock();
        assert_eq!(soc.ccm_registers().ccgr[1].get(), 0);
    }
}
