// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! General Purpose Timer (GPT), run as a free-running 1 MHz counter.
//!
//! Boot code only needs a monotonic time base for delays and timeouts, so
//! the compare and capture channels stay disconnected and no interrupt is
//! ever enabled.

use kernel::hil::time::{Freq1MHz, Time};
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    pub GptRegisters {
        /// GPT Control Register
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// GPT Prescaler Register
        (0x04 => pub pr: ReadWrite<u32, PR::Register>),
        /// GPT Status Register
        (0x08 => pub sr: ReadWrite<u32, SR::Register>),
        /// GPT Interrupt Register
        (0x0C => pub ir: ReadWrite<u32, IR::Register>),
        /// GPT Output Compare Registers 1 to 3
        (0x10 => pub ocr: [ReadWrite<u32>; 3]),
        /// GPT Input Capture Registers 1 and 2
        (0x1C => pub icr: [ReadOnly<u32>; 2]),
        /// GPT Counter Register
        (0x24 => pub cnt: ReadOnly<u32>),
        (0x28 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// Force Output Compare Channel 3
        FO3 OFFSET(31) NUMBITS(1) [],
        /// Force Output Compare Channel 2
        FO2 OFFSET(30) NUMBITS(1) [],
        /// Force Output Compare Channel 1
        FO1 OFFSET(29) NUMBITS(1) [],
        /// Output Compare Channel 3 operating mode
        OM3 OFFSET(26) NUMBITS(3) [],
        /// Output Compare Channel 2 operating mode
        OM2 OFFSET(23) NUMBITS(3) [],
        /// Output Compare Channel 1 operating mode
        OM1 OFFSET(20) NUMBITS(3) [],
        /// Input Capture Channel 2 operating mode
        IM2 OFFSET(18) NUMBITS(2) [],
        /// Input Capture Channel 1 operating mode
        IM1 OFFSET(16) NUMBITS(2) [],
        /// Software reset
        SWR OFFSET(15) NUMBITS(1) [],
        /// Enable the 24 MHz crystal input
        EN_24M OFFSET(10) NUMBITS(1) [],
        /// Free run or Restart mode
        FRR OFFSET(9) NUMBITS(1) [],
        /// Clock source select
        CLKSRC OFFSET(6) NUMBITS(3) [
            NoClock = 0,
            PeripheralClock = 1,
            HighFrequencyReferenceClock = 2,
            ExternalClock = 3,
            LowFrequencyReferenceClock = 4,
            CrystalOscillator = 5
        ],
        /// Run in stop mode
        STOPEN OFFSET(5) NUMBITS(1) [],
        /// Run in doze mode
        DOZEEN OFFSET(4) NUMBITS(1) [],
        /// Run in wait mode
        WAITEN OFFSET(3) NUMBITS(1) [],
        /// Run in debug mode
        DBGEN OFFSET(2) NUMBITS(1) [],
        /// Reset the counter when enabled
        ENMOD OFFSET(1) NUMBITS(1) [],
        /// GPT Enable
        EN OFFSET(0) NUMBITS(1) []
    ],

    pub PR [
        /// Prescaler for the 24 MHz crystal clock, divides by value + 1
        PRESCALER24M OFFSET(12) NUMBITS(4) [],
        /// Prescaler, divides by value + 1
        PRESCALER OFFSET(0) NUMBITS(12) []
    ],

    pub SR [
        ROV OFFSET(5) NUMBITS(1) [],
        IF2 OFFSET(4) NUMBITS(1) [],
        IF1 OFFSET(3) NUMBITS(1) [],
        OF3 OFFSET(2) NUMBITS(1) [],
        OF2 OFFSET(1) NUMBITS(1) [],
        OF1 OFFSET(0) NUMBITS(1) []
    ],

    pub IR [
        ROVIE OFFSET(5) NUMBITS(1) [],
        IF2IE OFFSET(4) NUMBITS(1) [],
        IF1IE OFFSET(3) NUMBITS(1) [],
        OF3IE OFFSET(2) NUMBITS(1) [],
        OF2IE OFFSET(1) NUMBITS(1) [],
        OF1IE OFFSET(0) NUMBITS(1) []
    ]
];

pub const GPT_BASE: usize = 0x0209_8000;

// 24 MHz / 3 / 8. The 24 MHz prescaler has to be non-zero or the counter
// does not count, and large values there do not work either.
const CRYSTAL_PRESCALER: u32 = 3;
const PRESCALER: u32 = 8;

pub struct Gpt {
    registers: StaticRef<GptRegisters>,
}

impl Gpt {
    /// # Safety
    ///
    /// `base` must be the address of a GPT register block.
    pub unsafe fn new(base: usize) -> Gpt {
        Gpt {
            registers: unsafe { StaticRef::new(base as *const GptRegisters) },
        }
    }

    /// Start counting up from zero at 1 MHz.
    ///
    /// The GPT clock gate in the CCM must already be on.
    pub fn start(&self) {
        self.registers.cr.modify(CR::EN::CLEAR);
        self.registers.ir.set(0);

        self.registers.sr.write(
            SR::ROV::SET + SR::IF2::SET + SR::IF1::SET + SR::OF3::SET + SR::OF2::SET + SR::OF1::SET,
        );

        self.registers.pr.write(
            PR::PRESCALER24M.val(CRYSTAL_PRESCALER - 1) + PR::PRESCALER.val(PRESCALER - 1),
        );

        // Compare and capture channels stay disconnected.
        self.registers.cr.write(
            CR::EN_24M::SET
                + CR::CLKSRC::CrystalOscillator
                + CR::FRR::SET
                + CR::WAITEN::SET
                + CR::STOPEN::SET
                + CR::ENMOD::SET,
        );
        self.registers.cr.modify(CR::EN::SET);
    }

    pub fn is_running(&self) -> bool {
        self.registers.cr.is_set(CR::EN)
    }
}

impl Time for Gpt {
    type Frequency = Freq1MHz;

    fn now(&self) -> u32 {
        self.registers.cnt.get()
    }
}
