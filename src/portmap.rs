//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Switch port identifiers and the per-MAC forwarding bitmap.
//!
//! Unlike `holo_utils::southbound::InterfaceFlags` (a fixed, named set
//! of bits defined with the `bitflags!` macro), a portmap's width is a
//! runtime property of the switch (`port_max`), so it is modeled as a
//! plain bitset newtype over `u64` rather than a `bitflags!` type.

use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A switch port number, `0..=PORT_MAX`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct PortId(pub u16);

impl PortId {
    /// `0 <= self <= port_max`, the range check spec.md §4.1 requires
    /// before touching any port list.
    pub fn is_valid(self, port_max: PortId) -> bool {
        self.0 <= port_max.0
    }
}

impl std::fmt::Display for PortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bitmap over switch ports: bit `p` set means port `p` is in the
/// forwarding set for some multicast MAC.
///
/// Bounded to 64 ports. A switch with more physical ports than that is
/// out of scope for this core (`port_max` is platform supplied and
/// assumed to fit).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Portmap(u64);

impl Portmap {
    pub const EMPTY: Portmap = Portmap(0);

    pub fn bit(port: PortId) -> Portmap {
        Portmap(1u64 << port.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, port: PortId) -> bool {
        self.0 & (1u64 << port.0) != 0
    }

    pub fn set(&mut self, port: PortId) {
        self.0 |= 1u64 << port.0;
    }

    pub fn clear(&mut self, port: PortId) {
        self.0 &= !(1u64 << port.0);
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for Portmap {
    fn from(bits: u64) -> Self {
        Portmap(bits)
    }
}

impl BitOr for Portmap {
    type Output = Portmap;

    fn bitor(self, rhs: Portmap) -> Portmap {
        Portmap(self.0 | rhs.0)
    }
}

impl BitAnd for Portmap {
    type Output = Portmap;

    fn bitand(self, rhs: Portmap) -> Portmap {
        Portmap(self.0 & rhs.0)
    }
}

impl BitXor for Portmap {
    type Output = Portmap;

    fn bitxor(self, rhs: Portmap) -> Portmap {
        Portmap(self.0 ^ rhs.0)
    }
}

impl Not for Portmap {
    type Output = Portmap;

    fn not(self) -> Portmap {
        Portmap(!self.0)
    }
}

impl std::fmt::Display for Portmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Bits that turned on going from `old` to `new`: `(old ^ new) & new`.
pub fn bits_turned_on(old: Portmap, new: Portmap) -> Portmap {
    (old ^ new) & new
}

/// Bits that turned off going from `old` to `new`: `(old ^ new) & old`.
pub fn bits_turned_off(old: Portmap, new: Portmap) -> Portmap {
    (old ^ new) & old
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turned_on_and_off_are_symmetric_difference_halves() {
        let old = Portmap::bit(PortId(1)) | Portmap::bit(PortId(2));
        let new = Portmap::bit(PortId(2)) | Portmap::bit(PortId(3));

        let on = bits_turned_on(old, new);
        let off = bits_turned_off(old, new);

        assert_eq!(on, Portmap::bit(PortId(3)));
        assert_eq!(off, Portmap::bit(PortId(1)));
    }

    #[test]
    fn set_and_clear_round_trip() {
        let mut pm = Portmap::EMPTY;
        pm.set(PortId(5));
        assert!(pm.contains(PortId(5)));
        pm.clear(PortId(5));
        assert!(pm.is_empty());
    }
}
