// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! USBOH3: one OTG and three host-only USB 2.0 controllers.
//!
//! Each controller has a 0x200 byte core block. Its capability and
//! operational registers are EHCI compatible with a few vendor additions
//! (`USBMODE`, the PHY selection bits of `PORTSC1`). The non-core block after
//! the four cores holds the glue logic: overcurrent and power pin setup,
//! wake-up control and the HSIC interfaces.

use ehci::{EhciRegisters, CAPLENGTH, HCCPARAMS, HCSPARAMS, USBCMD, USBINTR, USBSTS};
use kernel::hil::time::Time;
use kernel::hil::usb_host::{Error, ResetStep};
use kernel::utilities::delay;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    /// Core registers of one controller
    pub UsbCoreRegisters {
        /// Identification
        (0x000 => pub id: ReadOnly<u32>),
        /// Hardware general
        (0x004 => pub hwgeneral: ReadOnly<u32>),
        /// Host hardware parameters
        (0x008 => pub hwhost: ReadOnly<u32>),
        /// Device hardware parameters
        (0x00C => pub hwdevice: ReadOnly<u32>),
        /// TX buffer hardware parameters
        (0x010 => pub hwtxbuf: ReadOnly<u32>),
        /// RX buffer hardware parameters
        (0x014 => pub hwrxbuf: ReadOnly<u32>),
        (0x018 => _reserved0),
        /// General purpose timers
        (0x080 => pub gptimer0ld: ReadWrite<u32>),
        (0x084 => pub gptimer0ctrl: ReadWrite<u32>),
        (0x088 => pub gptimer1ld: ReadWrite<u32>),
        (0x08C => pub gptimer1ctrl: ReadWrite<u32>),
        /// System bus configuration
        (0x090 => pub sbuscfg: ReadWrite<u32>),
        (0x094 => _reserved1),
        /// Capability length and host interface version, start of the EHCI
        /// capability block
        (0x100 => pub caplength: ReadOnly<u32, CAPLENGTH::Register>),
        (0x104 => pub hcsparams: ReadOnly<u32, HCSPARAMS::Register>),
        (0x108 => pub hccparams: ReadOnly<u32, HCCPARAMS::Register>),
        (0x10C => _reserved2),
        /// Device interface version
        (0x120 => pub dciversion: ReadOnly<u32>),
        (0x124 => pub dccparams: ReadOnly<u32>),
        (0x128 => _reserved3),
        /// USB command, start of the EHCI operational block
        (0x140 => pub usbcmd: ReadWrite<u32, USBCMD::Register>),
        (0x144 => pub usbsts: ReadWrite<u32, USBSTS::Register>),
        (0x148 => pub usbintr: ReadWrite<u32, USBINTR::Register>),
        (0x14C => pub frindex: ReadWrite<u32>),
        (0x150 => _reserved4),
        (0x154 => pub periodiclistbase: ReadWrite<u32>),
        (0x158 => pub asynclistaddr: ReadWrite<u32>),
        (0x15C => _reserved5),
        /// Programmable burst size
        (0x160 => pub burstsize: ReadWrite<u32>),
        /// TX FIFO fill tuning
        (0x164 => pub txfilltuning: ReadWrite<u32>),
        (0x168 => _reserved6),
        /// Endpoint NAK
        (0x178 => pub endptnak: ReadWrite<u32>),
        (0x17C => pub endptnaken: ReadWrite<u32>),
        (0x180 => pub configflag: ReadOnly<u32>),
        /// Port status and control
        (0x184 => pub portsc1: ReadWrite<u32, PORTSC1::Register>),
        (0x188 => _reserved7),
        /// On-the-go status and control
        (0x1A4 => pub otgsc: ReadWrite<u32>),
        /// Controller mode
        (0x1A8 => pub usbmode: ReadWrite<u32, USBMODE::Register>),
        (0x1AC => _reserved8),
        (0x200 => @END),
    }
}

register_structs! {
    /// Glue logic shared by the four controllers
    pub UsbNonCoreRegisters {
        /// OTG, Host1, Host2 and Host3 control
        (0x00 => pub ctrl: [ReadWrite<u32, USB_CTRL::Register>; 4]),
        (0x10 => pub uh2_hsic_ctrl: ReadWrite<u32>),
        (0x14 => pub uh3_hsic_ctrl: ReadWrite<u32>),
        (0x18 => pub otg_phy_ctrl_0: ReadWrite<u32>),
        (0x1C => pub uh1_phy_ctrl_0: ReadWrite<u32>),
        (0x20 => @END),
    }
}

register_structs! {
    pub Usboh3Registers {
        (0x000 => pub core: [UsbCoreRegisters; 4]),
        (0x800 => pub noncore: UsbNonCoreRegisters),
        (0x820 => @END),
    }
}

register_bitfields![u32,
    pub PORTSC1 [
        /// Parallel transceiver select
        PTS OFFSET(30) NUMBITS(2) [
            Utmi = 0,
            Phil = 1,
            Ulpi = 2,
            Serial = 3
        ],
        /// Serial transceiver select
        STS OFFSET(29) NUMBITS(1) [],
        /// Parallel transceiver width, set for 16 bits
        PTW OFFSET(28) NUMBITS(1) [],
        /// Port speed
        PSPD OFFSET(26) NUMBITS(2) [
            Full = 0,
            Low = 1,
            High = 2
        ],
        /// Port force full speed connect
        PFSC OFFSET(24) NUMBITS(1) [],
        /// PHY low power suspend
        PHCD OFFSET(23) NUMBITS(1) [],
        WKOC OFFSET(22) NUMBITS(1) [],
        WKDC OFFSET(21) NUMBITS(1) [],
        WKCN OFFSET(20) NUMBITS(1) [],
        PTC OFFSET(16) NUMBITS(4) [],
        PIC OFFSET(14) NUMBITS(2) [],
        PO OFFSET(13) NUMBITS(1) [],
        PP OFFSET(12) NUMBITS(1) [],
        LS OFFSET(10) NUMBITS(2) [],
        /// High speed port
        HSP OFFSET(9) NUMBITS(1) [],
        PR OFFSET(8) NUMBITS(1) [],
        SUSP OFFSET(7) NUMBITS(1) [],
        FPR OFFSET(6) NUMBITS(1) [],
        OCC OFFSET(5) NUMBITS(1) [],
        OCA OFFSET(4) NUMBITS(1) [],
        PEC OFFSET(3) NUMBITS(1) [],
        PE OFFSET(2) NUMBITS(1) [],
        CSC OFFSET(1) NUMBITS(1) [],
        CCS OFFSET(0) NUMBITS(1) []
    ],

    pub USBMODE [
        /// Stream disable
        SDIS OFFSET(4) NUMBITS(1) [],
        /// Setup lockout off
        SLOM OFFSET(3) NUMBITS(1) [],
        /// Big endian data buffers
        ES OFFSET(2) NUMBITS(1) [],
        /// Controller mode
        CM OFFSET(0) NUMBITS(2) [
            Idle = 0,
            Device = 2,
            Host = 3
        ]
    ],

    pub USB_CTRL [
        /// Wake-up interrupt request
        WIR OFFSET(31) NUMBITS(1) [],
        WKUP_VBUS_EN OFFSET(17) NUMBITS(1) [],
        WKUP_ID_EN OFFSET(16) NUMBITS(1) [],
        WKUP_SW OFFSET(15) NUMBITS(1) [],
        WKUP_SW_EN OFFSET(14) NUMBITS(1) [],
        /// Wake-up interrupt enable
        WIE OFFSET(10) NUMBITS(1) [],
        /// Power pin polarity, set for active high
        PWR_POL OFFSET(9) NUMBITS(1) [],
        /// Overcurrent pin polarity, set for active low
        OVER_CUR_POL OFFSET(8) NUMBITS(1) [],
        /// Ignore the overcurrent pin
        OVER_CUR_DIS OFFSET(7) NUMBITS(1) []
    ]
];

pub const USBOH3_BASE: usize = 0x0218_4000;

/// The four USBOH3 controllers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UsbPort {
    /// OTG controller on USBPHY1
    Otg = 0,
    /// Host1 controller on USBPHY2
    Host1 = 1,
    /// HSIC host controller
    Host2 = 2,
    /// HSIC host controller
    Host3 = 3,
}

impl UsbPort {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Index of the on-chip PHY serving this controller, if any.
    pub fn phy_index(self) -> Option<usize> {
        match self {
            UsbPort::Otg => Some(0),
            UsbPort::Host1 => Some(1),
            UsbPort::Host2 | UsbPort::Host3 => None,
        }
    }
}

impl TryFrom<usize> for UsbPort {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(UsbPort::Otg),
            1 => Ok(UsbPort::Host1),
            2 => Ok(UsbPort::Host2),
            3 => Ok(UsbPort::Host3),
            _ => Err(Error::UnsupportedPort(index)),
        }
    }
}

/// Level of the overcurrent input that signals a fault.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OvercurrentPolarity {
    ActiveHigh,
    ActiveLow,
}

pub struct Usboh3 {
    registers: StaticRef<Usboh3Registers>,
}

impl Usboh3 {
    /// # Safety
    ///
    /// `base` must be the address of the USBOH3 register block.
    pub unsafe fn new(base: usize) -> Usboh3 {
        Usboh3 {
            registers: unsafe { StaticRef::new(base as *const Usboh3Registers) },
        }
    }

    fn core(&self, port: UsbPort) -> &UsbCoreRegisters {
        &self.registers.core[port.index()]
    }

    /// Clear run/stop and wait for the controller to acknowledge.
    pub fn stop_controller<T: Time>(
        &self,
        port: UsbPort,
        time: &T,
        timeout_us: u32,
    ) -> Result<(), Error> {
        let core = self.core(port);
        core.usbcmd.modify(USBCMD::RS::CLEAR);
        delay::poll_until(time, timeout_us, || !core.usbcmd.is_set(USBCMD::RS))
            .map_err(|_| Error::HardwareTimeout(ResetStep::Stop))
    }

    /// Reset the controller and wait for the reset bit to self-clear.
    pub fn reset_controller<T: Time>(
        &self,
        port: UsbPort,
        time: &T,
        timeout_us: u32,
    ) -> Result<(), Error> {
        let core = self.core(port);
        core.usbcmd.modify(USBCMD::RST::SET);
        delay::poll_until(time, timeout_us, || !core.usbcmd.is_set(USBCMD::RST))
            .map_err(|_| Error::HardwareTimeout(ResetStep::Reset))
    }

    /// Set the overcurrent pin polarity, then disable overcurrent detection.
    pub fn configure_overcurrent(&self, port: UsbPort, polarity: OvercurrentPolarity) {
        let ctrl = &self.registers.noncore.ctrl[port.index()];
        match polarity {
            OvercurrentPolarity::ActiveLow => ctrl.modify(USB_CTRL::OVER_CUR_POL::SET),
            OvercurrentPolarity::ActiveHigh => ctrl.modify(USB_CTRL::OVER_CUR_POL::CLEAR),
        }
        ctrl.modify(USB_CTRL::OVER_CUR_DIS::SET);
    }

    pub fn set_host_mode(&self, port: UsbPort) {
        self.core(port).usbmode.modify(USBMODE::CM::Host);
    }

    /// Select the transceiver with `portsc`, then enable the port.
    pub fn enable_port(&self, port: UsbPort, portsc: u32) {
        let portsc1 = &self.core(port).portsc1;
        portsc1.set(portsc);
        portsc1.modify(PORTSC1::PE::SET);
    }

    /// The EHCI view of controller `port`.
    pub fn ehci_registers(&self, port: UsbPort) -> EhciRegisters {
        let hccr = core::ptr::from_ref(&self.core(port).caplength) as usize;
        // Safety: `hccr` is the capability block of a controller inside the
        // register block this driver was created with.
        unsafe { EhciRegisters::from_capability_base(hccr) }
    }
}
