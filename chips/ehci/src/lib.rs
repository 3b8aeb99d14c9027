// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Generic EHCI register blocks.
//!
//! An EHCI controller exposes a read-only capability block followed, at an
//! offset the capability block itself reports, by the operational block.
//! SoC crates bring their controller up and hand an [`EhciRegisters`] to the
//! generic host stack, which only ever touches these two blocks.
//!
//! - Enhanced Host Controller Interface Specification for USB, revision 1.0,
//!   sections 2.2 and 2.3.

#![no_std]

#[cfg(test)]
extern crate std;

use kernel::utilities::registers::interfaces::Readable;
use kernel::utilities::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;

/// Number of port status registers defined by the EHCI register map.
pub const MAX_PORTS: usize = 15;

register_structs! {
    /// Host Controller Capability Registers
    pub CapabilityRegisters {
        /// Capability register length and interface version
        (0x00 => pub caplength: ReadOnly<u32, CAPLENGTH::Register>),
        /// Structural parameters
        (0x04 => pub hcsparams: ReadOnly<u32, HCSPARAMS::Register>),
        /// Capability parameters
        (0x08 => pub hccparams: ReadOnly<u32, HCCPARAMS::Register>),
        /// Companion port route description
        (0x0C => pub hcsp_portroute: [ReadOnly<u32>; 2]),
        (0x14 => @END),
    }
}

register_structs! {
    /// Host Controller Operational Registers
    pub OperationalRegisters {
        /// USB command
        (0x00 => pub usbcmd: ReadWrite<u32, USBCMD::Register>),
        /// USB status
        (0x04 => pub usbsts: ReadWrite<u32, USBSTS::Register>),
        /// USB interrupt enable
        (0x08 => pub usbintr: ReadWrite<u32, USBINTR::Register>),
        /// USB frame index
        (0x0C => pub frindex: ReadWrite<u32>),
        /// 4G segment selector
        (0x10 => pub ctrldssegment: ReadWrite<u32>),
        /// Frame list base address
        (0x14 => pub periodiclistbase: ReadWrite<u32>),
        /// Next asynchronous list address
        (0x18 => pub asynclistaddr: ReadWrite<u32>),
        (0x1C => _reserved0),
        /// Configure flag
        (0x40 => pub configflag: ReadWrite<u32>),
        /// Port status and control, valid up to `HCSPARAMS.N_PORTS`
        (0x44 => pub portsc: [ReadWrite<u32, PORTSC::Register>; MAX_PORTS]),
        (0x80 => @END),
    }
}

register_bitfields![u32,
    pub CAPLENGTH [
        /// Offset of the operational registers from the capability base
        CAPLENGTH OFFSET(0) NUMBITS(8) [],
        /// BCD encoded interface version
        HCIVERSION OFFSET(16) NUMBITS(16) []
    ],

    pub HCSPARAMS [
        /// Debug port number
        DEBUG_N OFFSET(20) NUMBITS(4) [],
        /// Port indicators
        P_INDICATOR OFFSET(16) NUMBITS(1) [],
        /// Number of companion controllers
        N_CC OFFSET(12) NUMBITS(4) [],
        /// Ports per companion controller
        N_PCC OFFSET(8) NUMBITS(4) [],
        /// Port routing rules
        PRR OFFSET(7) NUMBITS(1) [],
        /// Port power control
        PPC OFFSET(4) NUMBITS(1) [],
        /// Number of downstream ports
        N_PORTS OFFSET(0) NUMBITS(4) []
    ],

    pub HCCPARAMS [
        /// EHCI extended capabilities pointer
        EECP OFFSET(8) NUMBITS(8) [],
        /// Isochronous scheduling threshold
        IST OFFSET(4) NUMBITS(4) [],
        /// Asynchronous schedule park capability
        ASPC OFFSET(2) NUMBITS(1) [],
        /// Programmable frame list flag
        PFLF OFFSET(1) NUMBITS(1) [],
        /// 64-bit addressing capability
        AC64 OFFSET(0) NUMBITS(1) []
    ],

    pub USBCMD [
        /// Interrupt threshold control, in micro-frames
        ITC OFFSET(16) NUMBITS(8) [],
        /// Asynchronous schedule park mode enable
        ASPE OFFSET(11) NUMBITS(1) [],
        /// Asynchronous schedule park mode count
        ASP OFFSET(8) NUMBITS(2) [],
        /// Light host controller reset
        LR OFFSET(7) NUMBITS(1) [],
        /// Interrupt on async advance doorbell
        IAA OFFSET(6) NUMBITS(1) [],
        /// Asynchronous schedule enable
        ASE OFFSET(5) NUMBITS(1) [],
        /// Periodic schedule enable
        PSE OFFSET(4) NUMBITS(1) [],
        /// Frame list size
        FS OFFSET(2) NUMBITS(2) [
            Elements1024 = 0,
            Elements512 = 1,
            Elements256 = 2
        ],
        /// Host controller reset, cleared by hardware when done
        RST OFFSET(1) NUMBITS(1) [],
        /// Run/Stop
        RS OFFSET(0) NUMBITS(1) []
    ],

    pub USBSTS [
        /// Asynchronous schedule status
        AS OFFSET(15) NUMBITS(1) [],
        /// Periodic schedule status
        PS OFFSET(14) NUMBITS(1) [],
        /// Reclamation
        RCL OFFSET(13) NUMBITS(1) [],
        /// Host controller halted
        HCH OFFSET(12) NUMBITS(1) [],
        /// Interrupt on async advance
        AAI OFFSET(5) NUMBITS(1) [],
        /// Host system error
        SEI OFFSET(4) NUMBITS(1) [],
        /// Frame list rollover
        FRI OFFSET(3) NUMBITS(1) [],
        /// Port change detect
        PCI OFFSET(2) NUMBITS(1) [],
        /// USB error interrupt
        UEI OFFSET(1) NUMBITS(1) [],
        /// USB interrupt
        UI OFFSET(0) NUMBITS(1) []
    ],

    pub USBINTR [
        AAE OFFSET(5) NUMBITS(1) [],
        SEE OFFSET(4) NUMBITS(1) [],
        FRE OFFSET(3) NUMBITS(1) [],
        PCE OFFSET(2) NUMBITS(1) [],
        UEE OFFSET(1) NUMBITS(1) [],
        UE OFFSET(0) NUMBITS(1) []
    ],

    pub PORTSC [
        /// Wake on over-current enable
        WKOC OFFSET(22) NUMBITS(1) [],
        /// Wake on disconnect enable
        WKDC OFFSET(21) NUMBITS(1) [],
        /// Wake on connect enable
        WKCN OFFSET(20) NUMBITS(1) [],
        /// Port test control
        PTC OFFSET(16) NUMBITS(4) [],
        /// Port indicator control
        PIC OFFSET(14) NUMBITS(2) [],
        /// Port owner
        PO OFFSET(13) NUMBITS(1) [],
        /// Port power
        PP OFFSET(12) NUMBITS(1) [],
        /// Line status
        LS OFFSET(10) NUMBITS(2) [],
        /// Port reset
        PR OFFSET(8) NUMBITS(1) [],
        /// Suspend
        SUSP OFFSET(7) NUMBITS(1) [],
        /// Force port resume
        FPR OFFSET(6) NUMBITS(1) [],
        /// Over-current change
        OCC OFFSET(5) NUMBITS(1) [],
        /// Over-current active
        OCA OFFSET(4) NUMBITS(1) [],
        /// Port enable change
        PEC OFFSET(3) NUMBITS(1) [],
        /// Port enabled
        PE OFFSET(2) NUMBITS(1) [],
        /// Connect status change
        CSC OFFSET(1) NUMBITS(1) [],
        /// Current connect status
        CCS OFFSET(0) NUMBITS(1) []
    ]
];

/// The register blocks a generic EHCI driver works with.
#[derive(Clone, Copy)]
pub struct EhciRegisters {
    /// Capability block.
    pub hccr: StaticRef<CapabilityRegisters>,
    /// Operational block, `CAPLENGTH` bytes after `hccr`.
    pub hcor: StaticRef<OperationalRegisters>,
}

impl EhciRegisters {
    /// Locate both register blocks from the capability block address.
    ///
    /// The operational block does not sit at a fixed offset; its distance
    /// from the capability block is read from `CAPLENGTH`.
    ///
    /// # Safety
    ///
    /// `hccr` must be the address of a mapped EHCI capability block that
    /// lives for the rest of the program.
    pub unsafe fn from_capability_base(hccr: usize) -> EhciRegisters {
        // Safety: forwarded to the caller.
        let caps = unsafe { StaticRef::new(hccr as *const CapabilityRegisters) };
        let len = caps.caplength.read(CAPLENGTH::CAPLENGTH) as usize;
        EhciRegisters {
            hccr: caps,
            // Safety: the operational block follows the capability block of
            // the same controller.
            hcor: unsafe { StaticRef::new((hccr + len) as *const OperationalRegisters) },
        }
    }

    /// Length of the capability block in bytes.
    pub fn capability_length(&self) -> usize {
        self.hccr.caplength.read(CAPLENGTH::CAPLENGTH) as usize
    }

    /// BCD encoded interface version, 0x0100 for EHCI 1.0.
    pub fn hci_version(&self) -> u16 {
        self.hccr.caplength.read(CAPLENGTH::HCIVERSION) as u16
    }

    /// Number of root hub ports.
    pub fn port_count(&self) -> usize {
        (self.hccr.hcsparams.read(HCSPARAMS::N_PORTS) as usize).min(MAX_PORTS)
    }
}
