//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Monotonic tick time and wrap-safe comparisons.
//!
//! The cache never reads a wall clock itself; every tick value it sees
//! comes from the embedder's [`Clock`](crate::switch::Clock) or is
//! computed by adding a timeout to one. Raw `u32` comparison is unsafe
//! once the counter wraps, so every comparison in this crate goes
//! through [`time_before`]/[`time_after`]/[`time_after_eq`].

use std::ops::Add;

/// A monotonic tick count, as produced by the embedder's timer wheel.
///
/// Ticks wrap around at `u32::MAX`; comparisons must always go through
/// [`time_before`]/[`time_after`]/[`time_after_eq`], never `<`/`>`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Tick(pub u32);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub fn checked_add(self, ticks: u32) -> Tick {
        Tick(self.0.wrapping_add(ticks))
    }
}

impl Add<u32> for Tick {
    type Output = Tick;

    fn add(self, ticks: u32) -> Tick {
        self.checked_add(ticks)
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(int)(a - b) < 0`, i.e. `a` is strictly before `b` under wraparound.
pub fn time_before(a: Tick, b: Tick) -> bool {
    (a.0.wrapping_sub(b.0) as i32) < 0
}

/// `(int)(a - b) > 0`, i.e. `a` is strictly after `b` under wraparound.
pub fn time_after(a: Tick, b: Tick) -> bool {
    (a.0.wrapping_sub(b.0) as i32) > 0
}

/// `!time_before(a, b)`, i.e. `a` is at or after `b` under wraparound.
pub fn time_after_eq(a: Tick, b: Tick) -> bool {
    !time_before(a, b)
}

/// Returns whichever of `a` and `b` is earlier under wraparound.
pub fn earliest(a: Tick, b: Tick) -> Tick {
    if time_before(a, b) { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn before_after_agree() {
        let a = Tick(10);
        let b = Tick(20);
        assert!(time_before(a, b));
        assert!(time_after(b, a));
        assert!(time_after_eq(b, a));
        assert!(!time_after_eq(a, b));
    }

    #[test]
    fn wraparound_is_handled() {
        let a = Tick(u32::MAX - 2);
        let b = Tick(3);
        // b is "after" a once the counter has wrapped around.
        assert!(time_before(a, b));
        assert!(time_after(b, a));
    }

    #[test]
    fn earliest_picks_wrap_safe_minimum() {
        let a = Tick(u32::MAX - 1);
        let b = Tick(1);
        assert_eq!(earliest(a, b), a);
    }
}
