// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Busy-wait helpers for code that runs before any scheduler exists.

use crate::hil::time::Time;
use crate::ErrorCode;

/// Spin for at least `us` microseconds.
pub fn busy_wait_us<T: Time>(time: &T, us: u32) {
    let start = time.now();
    let ticks = time.ticks_from_us(us);
    while time.now().wrapping_sub(start) < ticks {
        core::hint::spin_loop();
    }
}

/// Spin for at least `ms` milliseconds.
///
/// Waits one millisecond at a time so long delays never exceed the counter
/// wrap period.
pub fn busy_wait_ms<T: Time>(time: &T, ms: u32) {
    for _ in 0..ms {
        busy_wait_us(time, 1_000);
    }
}

/// Spin until `done` returns true or `timeout_us` microseconds pass.
///
/// `done` is evaluated once more after the deadline, so a condition that
/// became true while the caller was descheduled is not reported as a
/// timeout. Returns `BUSY` when the condition never held.
pub fn poll_until<T: Time, F: FnMut() -> bool>(
    time: &T,
    timeout_us: u32,
    mut done: F,
) -> Result<(), ErrorCode> {
    let start = time.now();
    let ticks = time.ticks_from_us(timeout_us);
    loop {
        if done() {
            return Ok(());
        }
        if time.now().wrapping_sub(start) >= ticks {
            return if done() { Ok(()) } else { Err(ErrorCode::BUSY) };
        }
        core::hint::spin_loop();
    }
}

/// Check that `time` is counting before relying on it for a deadline.
///
/// Reads the counter up to `reads` times and returns `OFF` if it never
/// moved, e.g. a timer whose clock gate is still off.
pub fn wait_for_tick<T: Time>(time: &T, reads: u32) -> Result<(), ErrorCode> {
    let start = time.now();
    for _ in 0..reads {
        if time.now() != start {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(ErrorCode::OFF)
}
