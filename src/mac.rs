//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! 48-bit Ethernet address, adapted from `holo_utils::mac_addr::MacAddr`.

use serde::{Deserialize, Serialize};

/// A 48-bit MAC address (IEEE EUI-48 format).
///
/// Multicast group keys (`01:00:5e:xx:xx:xx`) and source addresses
/// cached by [`crate::host::HostCache`] are both instances of this
/// type.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const LENGTH: usize = 6;

    pub fn as_bytes(&self) -> [u8; 6] {
        self.0
    }

    /// Hashes the address the way the driver's `ether_hash()` would,
    /// folding all six bytes down to a single `usize`.
    pub fn fold_hash(&self) -> usize {
        self.0
            .iter()
            .fold(0usize, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as usize))
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_colon_separated_hex() {
        let mac = MacAddr::from([0x01, 0x00, 0x5e, 0x00, 0x00, 0x01]);
        assert_eq!(mac.to_string(), "01:00:5e:00:00:01");
    }

    #[test]
    fn distinct_addresses_usually_hash_differently() {
        let a = MacAddr::from([0x01, 0x00, 0x5e, 0x00, 0x00, 0x01]);
        let b = MacAddr::from([0x01, 0x00, 0x5e, 0x00, 0x00, 0x02]);
        assert_ne!(a.fold_hash(), b.fold_hash());
    }
}
