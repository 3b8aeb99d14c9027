// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Analog power and PLL control (ANATOP), USB part.
//!
//! Each of the two on-chip USB PHYs is fed by its own 480 MHz PLL and has its
//! own charger detection block. Every register here has SET, CLR and TOG
//! aliases at +4, +8 and +0xC; a write to an alias ORs, AND-NOTs or XORs
//! the written bits into the register without a read-modify-write.

use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly,
};
use kernel::utilities::StaticRef;

use crate::usboh3::UsbPort;

register_structs! {
    /// 480 MHz USB PLL control with its alias registers
    pub PllUsbRegisters {
        (0x0 => pub ctrl: ReadWrite<u32, PLL_USB::Register>),
        (0x4 => pub ctrl_set: WriteOnly<u32, PLL_USB::Register>),
        (0x8 => pub ctrl_clr: WriteOnly<u32, PLL_USB::Register>),
        (0xC => pub ctrl_tog: WriteOnly<u32, PLL_USB::Register>),
        (0x10 => @END),
    }
}

register_structs! {
    /// Per-PHY USB analog block
    pub UsbAnalogRegisters {
        /// VBUS detect
        (0x00 => pub vbus_detect: ReadWrite<u32>),
        (0x04 => pub vbus_detect_set: WriteOnly<u32>),
        (0x08 => pub vbus_detect_clr: WriteOnly<u32>),
        (0x0C => pub vbus_detect_tog: WriteOnly<u32>),
        /// Charger detect
        (0x10 => pub chrg_detect: ReadWrite<u32, CHRG_DETECT::Register>),
        (0x14 => pub chrg_detect_set: WriteOnly<u32, CHRG_DETECT::Register>),
        (0x18 => pub chrg_detect_clr: WriteOnly<u32, CHRG_DETECT::Register>),
        (0x1C => pub chrg_detect_tog: WriteOnly<u32, CHRG_DETECT::Register>),
        /// VBUS detect status
        (0x20 => pub vbus_detect_stat: ReadOnly<u32>),
        (0x24 => _reserved0),
        /// Charger detect status
        (0x30 => pub chrg_detect_stat: ReadOnly<u32>),
        (0x34 => _reserved1),
        /// Miscellaneous USB analog control
        (0x50 => pub misc: ReadWrite<u32>),
        (0x54 => pub misc_set: WriteOnly<u32>),
        (0x58 => pub misc_clr: WriteOnly<u32>),
        (0x5C => pub misc_tog: WriteOnly<u32>),
        (0x60 => @END),
    }
}

register_structs! {
    pub AnatopRegisters {
        (0x000 => _reserved0),
        /// PLL_USB1 and PLL_USB2
        (0x010 => pub pll_usb: [PllUsbRegisters; 2]),
        (0x030 => _reserved1),
        /// USB1 and USB2 analog blocks
        (0x1A0 => pub usb_analog: [UsbAnalogRegisters; 2]),
        /// Chip silicon version
        (0x260 => pub digprog: ReadOnly<u32, DIGPROG::Register>),
        (0x264 => @END),
    }
}

register_bitfields![u32,
    pub PLL_USB [
        /// PLL is locked
        LOCK OFFSET(31) NUMBITS(1) [],
        /// Bypass the PLL, output the reference clock
        BYPASS OFFSET(16) NUMBITS(1) [],
        /// Enable the PLL clock output
        ENABLE OFFSET(13) NUMBITS(1) [],
        /// Power up the PLL
        POWER OFFSET(12) NUMBITS(1) [],
        /// Gate the 480 MHz clock to the USB PHY
        EN_USB_CLKS OFFSET(6) NUMBITS(1) [],
        /// 0: 480 MHz, 1: 528 MHz
        DIV_SELECT OFFSET(0) NUMBITS(2) []
    ],

    pub CHRG_DETECT [
        /// Active low enable of the charger detector
        EN_B OFFSET(20) NUMBITS(1) [],
        /// Active low check of the charger connection
        CHK_CHRG_B OFFSET(19) NUMBITS(1) [],
        /// Check the contact of the USB plug
        CHK_CONTACT OFFSET(18) NUMBITS(1) []
    ],

    pub DIGPROG [
        MAJOR_UPPER OFFSET(16) NUMBITS(8) [],
        MAJOR_LOWER OFFSET(8) NUMBITS(8) [],
        MINOR OFFSET(0) NUMBITS(8) []
    ]
];

pub const ANATOP_BASE: usize = 0x020C_8000;

pub struct Anatop {
    registers: StaticRef<AnatopRegisters>,
}

impl Anatop {
    /// # Safety
    ///
    /// `base` must be the address of the ANATOP register block.
    pub unsafe fn new(base: usize) -> Anatop {
        Anatop {
            registers: unsafe { StaticRef::new(base as *const AnatopRegisters) },
        }
    }

    /// Power the PLL feeding `port`'s PHY and turn its charger detector off.
    ///
    /// With charger detection left on the port would present itself as a
    /// charger instead of a plain host port. Ports without an on-chip PHY
    /// (the HSIC controllers) have neither block and are left alone.
    pub fn configure_usb_power(&self, port: UsbPort) {
        let Some(index) = port.phy_index() else {
            return;
        };

        self.registers.usb_analog[index]
            .chrg_detect
            .write(CHRG_DETECT::EN_B::SET + CHRG_DETECT::CHK_CHRG_B::SET);

        let pll = &self.registers.pll_usb[index];
        pll.ctrl_clr.write(PLL_USB::BYPASS::SET);
        pll.ctrl_set
            .write(PLL_USB::ENABLE::SET + PLL_USB::POWER::SET + PLL_USB::EN_USB_CLKS::SET);
    }

    pub fn is_pll_locked(&self, port: UsbPort) -> bool {
        port.phy_index()
            .is_some_and(|index| self.registers.pll_usb[index].ctrl.is_set(PLL_USB::LOCK))
    }

    /// Silicon revision as `(major, minor)`, e.g. `(0x63, 0x02)` for an
    /// i.MX6Q at revision 1.2.
    pub fn silicon_revision(&self) -> (u8, u8) {
        let digprog = self.registers.digprog.extract();
        (
            digprog.read(DIGPROG::MAJOR_UPPER) as u8,
            digprog.read(DIGPROG::MINOR) as u8,
        )
    }
}
