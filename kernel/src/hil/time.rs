// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Hardware agnostic interfaces for counter-like resources.
//!
//! Boot code has no scheduler and no interrupts, so the only time interface
//! is a free-running counter that callers spin on. See
//! `kernel::utilities::delay` for the busy-wait helpers built on it.

/// Tick rate of a counter, carried as the `Time::Frequency` type so delays
/// can be given in microseconds whatever the counter runs at.
pub trait Frequency {
    /// Returns frequency in Hz.
    fn frequency() -> u32;
}

/// 1MHz `Frequency`
#[derive(Debug)]
pub struct Freq1MHz;
impl Frequency for Freq1MHz {
    fn frequency() -> u32 {
        1_000_000
    }
}

/// 24MHz `Frequency`, the i.MX crystal oscillator.
#[derive(Debug)]
pub struct Freq24MHz;
impl Frequency for Freq24MHz {
    fn frequency() -> u32 {
        24_000_000
    }
}

/// A free-running 32-bit counter.
///
/// `now` wraps at `u32::MAX`; callers compare timestamps with
/// `wrapping_sub`.
pub trait Time {
    type Frequency: Frequency;

    /// Returns the current time in hardware clock units.
    fn now(&self) -> u32;

    /// Converts microseconds to ticks, saturating at `u32::MAX`.
    fn ticks_from_us(&self, us: u32) -> u32 {
        let ticks = (us as u64 * Self::Frequency::frequency() as u64) / 1_000_000;
        ticks.min(u32::MAX as u64) as u32
    }

    /// Converts milliseconds to ticks, saturating at `u32::MAX`.
    fn ticks_from_ms(&self, ms: u32) -> u32 {
        let ticks = (ms as u64 * Self::Frequency::frequency() as u64) / 1_000;
        ticks.min(u32::MAX as u64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::{Freq1MHz, Freq24MHz, Time};

    struct Stopped<F>(core::marker::PhantomData<F>);

    impl<F: super::Frequency> Time for Stopped<F> {
        type Frequency = F;

        fn now(&self) -> u32 {
            0
        }
    }

    #[test]
    fn conversions_scale_with_frequency() {
        let slow = Stopped::<Freq1MHz>(core::marker::PhantomData);
        assert_eq!(slow.ticks_from_us(10), 10);
        assert_eq!(slow.ticks_from_ms(10), 10_000);

        let fast = Stopped::<Freq24MHz>(core::marker::PhantomData);
        assert_eq!(fast.ticks_from_us(10), 240);
        assert_eq!(fast.ticks_from_ms(1), 24_000);
    }

    #[test]
    fn conversions_saturate() {
        let fast = Stopped::<Freq24MHz>(core::marker::PhantomData);
        assert_eq!(fast.ticks_from_ms(u32::MAX), u32::MAX);
    }
}
