// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! On-chip USB 2.0 UTMI PHYs.
//!
//! USBPHY1 serves the OTG controller and USBPHY2 the Host1 controller. The
//! HSIC controllers have no PHY here.

use kernel::hil::time::Time;
use kernel::utilities::delay;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly,
};
use kernel::utilities::StaticRef;

register_structs! {
    pub UsbPhyRegisters {
        /// Power-down
        (0x00 => pub pwd: ReadWrite<u32, PWD::Register>),
        (0x04 => pub pwd_set: WriteOnly<u32, PWD::Register>),
        (0x08 => pub pwd_clr: WriteOnly<u32, PWD::Register>),
        (0x0C => pub pwd_tog: WriteOnly<u32, PWD::Register>),
        /// Transmitter trimming
        (0x10 => pub tx: ReadWrite<u32>),
        (0x14 => pub tx_set: WriteOnly<u32>),
        (0x18 => pub tx_clr: WriteOnly<u32>),
        (0x1C => pub tx_tog: WriteOnly<u32>),
        /// Receiver trimming
        (0x20 => pub rx: ReadWrite<u32>),
        (0x24 => pub rx_set: WriteOnly<u32>),
        (0x28 => pub rx_clr: WriteOnly<u32>),
        (0x2C => pub rx_tog: WriteOnly<u32>),
        /// General control
        (0x30 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x34 => pub ctrl_set: WriteOnly<u32, CTRL::Register>),
        (0x38 => pub ctrl_clr: WriteOnly<u32, CTRL::Register>),
        (0x3C => pub ctrl_tog: WriteOnly<u32, CTRL::Register>),
        /// Status
        (0x40 => pub status: ReadOnly<u32>),
        (0x44 => _reserved0),
        /// Version
        (0x80 => pub version: ReadOnly<u32>),
        (0x84 => _reserved1),
        /// Undocumented analog control, only written through its SET alias
        (0x90 => pub ip: ReadWrite<u32, IP::Register>),
        (0x94 => pub ip_set: WriteOnly<u32, IP::Register>),
        (0x98 => pub ip_clr: WriteOnly<u32, IP::Register>),
        (0x9C => pub ip_tog: WriteOnly<u32, IP::Register>),
        (0xA0 => @END),
    }
}

register_bitfields![u32,
    pub PWD [
        RXPWDRX OFFSET(20) NUMBITS(1) [],
        RXPWDDIFF OFFSET(19) NUMBITS(1) [],
        RXPWD1PT1 OFFSET(18) NUMBITS(1) [],
        RXPWDENV OFFSET(17) NUMBITS(1) [],
        TXPWDV2I OFFSET(12) NUMBITS(1) [],
        TXPWDIBIAS OFFSET(11) NUMBITS(1) [],
        TXPWDFS OFFSET(10) NUMBITS(1) []
    ],

    pub CTRL [
        /// Soft reset of the PHY digital logic
        SFTRST OFFSET(31) NUMBITS(1) [],
        /// Gate the UTMI clocks
        CLKGATE OFFSET(30) NUMBITS(1) [],
        UTMI_SUSPENDM OFFSET(29) NUMBITS(1) [],
        HOST_FORCE_LS_SE0 OFFSET(28) NUMBITS(1) [],
        ENAUTOSET_USBCLKS OFFSET(26) NUMBITS(1) [],
        ENAUTOCLR_USBCLKGATE OFFSET(25) NUMBITS(1) [],
        FSDLL_RST_EN OFFSET(24) NUMBITS(1) [],
        ENVBUSCHG_WKUP OFFSET(23) NUMBITS(1) [],
        ENIDCHG_WKUP OFFSET(22) NUMBITS(1) [],
        ENDPDMCHG_WKUP OFFSET(21) NUMBITS(1) [],
        ENAUTOCLR_PHY_PWD OFFSET(20) NUMBITS(1) [],
        ENAUTOCLR_CLKGATE OFFSET(19) NUMBITS(1) [],
        ENAUTO_PWRON_PLL OFFSET(18) NUMBITS(1) [],
        WAKEUP_IRQ OFFSET(17) NUMBITS(1) [],
        ENIRQWAKEUP OFFSET(16) NUMBITS(1) [],
        /// Pass low speed traffic through a full speed hub
        ENUTMILEVEL3 OFFSET(15) NUMBITS(1) [],
        /// Pass low speed traffic to a directly attached device
        ENUTMILEVEL2 OFFSET(14) NUMBITS(1) [],
        DATA_ON_LRADC OFFSET(13) NUMBITS(1) [],
        DEVPLUGIN_IRQ OFFSET(12) NUMBITS(1) [],
        ENIRQDEVPLUGIN OFFSET(11) NUMBITS(1) [],
        RESUME_IRQ OFFSET(10) NUMBITS(1) [],
        ENIRQRESUMEDETECT OFFSET(9) NUMBITS(1) [],
        RESUMEIRQSTICKY OFFSET(8) NUMBITS(1) [],
        ENOTGIDDETECT OFFSET(7) NUMBITS(1) [],
        OTG_ID_CHG_IRQ OFFSET(6) NUMBITS(1) [],
        DEVPLUGIN_POLARITY OFFSET(5) NUMBITS(1) [],
        ENDEVPLUGINDETECT OFFSET(4) NUMBITS(1) [],
        HOSTDISCONDETECT_IRQ OFFSET(3) NUMBITS(1) [],
        ENIRQHOSTDISCON OFFSET(2) NUMBITS(1) [],
        ENHOSTDISCONDETECT OFFSET(1) NUMBITS(1) [],
        ENOTG_ID_CHG_IRQ OFFSET(0) NUMBITS(1) []
    ],

    pub IP [
        /// Analog trim needed by production silicon, must not be set on the
        /// earliest revisions
        ANALOG_FIX OFFSET(17) NUMBITS(1) []
    ]
];

pub const USBPHY_BASES: [usize; 2] = [0x020C_9000, 0x020C_A000];

/// Settling time after asserting and releasing the PHY soft reset.
const RESET_SETTLE_US: u32 = 10;

pub struct UsbPhy {
    registers: StaticRef<UsbPhyRegisters>,
}

impl UsbPhy {
    /// # Safety
    ///
    /// `base` must be the address of a USBPHY register block.
    pub unsafe fn new(base: usize) -> UsbPhy {
        UsbPhy {
            registers: unsafe { StaticRef::new(base as *const UsbPhyRegisters) },
        }
    }

    /// Gate or ungate the UTMI clocks through the alias registers.
    pub fn set_clock_enabled(&self, enabled: bool) {
        if enabled {
            self.registers.ctrl_clr.write(CTRL::CLKGATE::SET);
        } else {
            self.registers.ctrl_set.write(CTRL::CLKGATE::SET);
        }
    }

    pub fn is_clock_gated(&self) -> bool {
        self.registers.ctrl.is_set(CTRL::CLKGATE)
    }

    /// Pulse the PHY soft reset and leave the clocks running.
    pub fn soft_reset<T: Time>(&self, time: &T) {
        self.registers.ctrl.modify(CTRL::SFTRST::SET);
        delay::busy_wait_us(time, RESET_SETTLE_US);

        self.registers
            .ctrl
            .modify(CTRL::SFTRST::CLEAR + CTRL::CLKGATE::CLEAR);
        delay::busy_wait_us(time, RESET_SETTLE_US);
    }

    /// Clear every power-down bit.
    pub fn power_up(&self) {
        self.registers.pwd.set(0);
    }

    /// Let low speed traffic through, directly attached or behind a hub.
    pub fn enable_utmi_levels(&self) {
        self.registers
            .ctrl
            .modify(CTRL::ENUTMILEVEL2::SET + CTRL::ENUTMILEVEL3::SET);
    }

    pub fn apply_analog_fix(&self) {
        self.registers.ip_set.write(IP::ANALOG_FIX::SET);
    }
}
