//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Capability interfaces for the switch driver and wall clock.
//!
//! The cache never talks to hardware or a wall clock directly; it
//! calls through these traits, injected at construction. This is the
//! same shape as `holo-rip`'s `InstanceChannelsTx` or `holo-bfd`'s
//! southbound channel — a capability the protocol state holds and
//! calls through, rather than a free function it reaches for.

use crate::mac::MacAddr;
use crate::portmap::{PortId, Portmap};
use crate::time::Tick;

/// The switch ASIC/driver, as seen by the cache.
///
/// All four methods are synchronous and must return promptly: the
/// cache calls them inline from hot paths and blocks on their return.
/// Failures are not signalled back to the cache — the driver is
/// trusted to log its own I/O errors.
pub trait SwitchDriver {
    /// `switch_get_port(ea)`. Returns `None` if the MAC is not
    /// currently reachable through any port.
    fn get_port(&mut self, ea: MacAddr) -> Option<PortId>;

    /// `switch_add_portmap(ea, mask)`: add `mask` to `ea`'s forwarding
    /// set. Never called with an empty mask.
    fn add_portmap(&mut self, ea: MacAddr, mask: Portmap);

    /// `switch_del_portmap(ea, mask)`: remove `mask` from `ea`'s
    /// forwarding set. Never called with an empty mask.
    fn del_portmap(&mut self, ea: MacAddr, mask: Portmap);

    /// `switch_clr_portmap(ea)`: clear `ea`'s forwarding set entirely.
    fn clr_portmap(&mut self, ea: MacAddr);
}

/// The monotonic wall clock, i.e. `now()`.
pub trait Clock {
    fn now(&self) -> Tick;
}
