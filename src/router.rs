//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
//
// Router-port table.
//
// The router group is a singleton: there is exactly one, and unlike
// `GroupTable` it is not keyed by MAC at all — its "members" are
// (IP, port) pairs identifying detected IGMP routers. Its ports are
// unioned into the hardware portmap of every multicast MAC, which is
// why both `add_router` and its expiry timer walk the entire group
// directory.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::debug::Debug;
use crate::group::GroupTable;
use crate::member::{MemberIndex, MemberPool};
use crate::portmap::{bits_turned_off, bits_turned_on, PortId, Portmap};
use crate::switch::SwitchDriver;
use crate::time::{earliest, time_after, Tick};
use crate::timer::{TimerDriver, TimerId};

/// The singleton table of detected IGMP routers.
pub struct RouterTable {
    pub portmap: Portmap,
    pub expires_at: Tick,
    ports: BTreeMap<PortId, Vec<MemberIndex>>,
}

impl Default for RouterTable {
    fn default() -> Self {
        RouterTable {
            portmap: Portmap::EMPTY,
            expires_at: Tick::ZERO,
            ports: BTreeMap::new(),
        }
    }
}

impl RouterTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_member(&self, port: PortId, addr: Ipv4Addr, pool: &MemberPool) -> Option<MemberIndex> {
        self.ports
            .get(&port)?
            .iter()
            .copied()
            .find(|&idx| pool.get(idx).addr == addr)
    }

    fn recompute_portmap(&mut self) {
        let mut portmap = Portmap::EMPTY;
        for (&port, members) in &self.ports {
            if !members.is_empty() {
                portmap.set(port);
            }
        }
        self.portmap = portmap;
    }

    /// Records or refreshes a detected router at `(ip, port)`. There is
    /// no public `del_router`: routers are removed only by
    /// [`RouterTable::on_router_timer_tick`].
    pub fn add_router(
        &mut self,
        pool: &mut MemberPool,
        switch: &mut impl SwitchDriver,
        timer: &mut impl TimerDriver,
        groups: &mut GroupTable,
        ip: Ipv4Addr,
        port: PortId,
        port_max: PortId,
        now: Tick,
        timeout_ticks: u32,
    ) -> Result<Portmap, crate::error::CacheError> {
        if !port.is_valid(port_max) {
            return Err(crate::error::CacheError::InvalidPort { port, port_max });
        }

        self.expires_at = now + timeout_ticks;

        if let Some(existing) = self.find_member(port, ip, pool) {
            pool.get_mut(existing).expires_at = self.expires_at;
        } else if let Some(member_idx) = pool.alloc(ip, port, self.expires_at) {
            self.ports.entry(port).or_default().push(member_idx);
        }
        // Else: member pool exhausted, the router's deadline was still
        // refreshed.

        let old_portmap = self.portmap;
        self.recompute_portmap();
        let new_bits = bits_turned_on(old_portmap, self.portmap);

        if !new_bits.is_empty() {
            for &idx in groups.indices() {
                let group = groups.get_mut(idx);
                let add = new_bits & !group.portmap;
                if !add.is_empty() {
                    switch.add_portmap(group.ea, add);
                }
            }
            Debug::RouterPortsAdded(new_bits).log();
        }

        let should_arm = match timer.pending(TimerId::RouterExpiry) {
            Some(pending) => time_after(pending, self.expires_at),
            None => true,
        };
        if should_arm {
            timer.schedule(TimerId::RouterExpiry, self.expires_at);
        }

        Ok(new_bits)
    }

    /// The router-expiry timer tick. Unlike the group timer this
    /// expires individual members, because the router table must
    /// revoke per-member state to avoid leaking forwarding to a port
    /// whose router has gone stale.
    pub fn on_router_timer_tick(
        &mut self,
        pool: &mut MemberPool,
        switch: &mut impl SwitchDriver,
        timer: &mut impl TimerDriver,
        groups: &mut GroupTable,
        now: Tick,
    ) {
        let mut next_wake: Option<Tick> = None;

        for members in self.ports.values_mut() {
            members.retain(|&idx| {
                let expires_at = pool.get(idx).expires_at;
                if time_after(expires_at, now) {
                    next_wake = Some(match next_wake {
                        Some(w) => earliest(w, expires_at),
                        None => expires_at,
                    });
                    true
                } else {
                    pool.consume(idx);
                    false
                }
            });
        }

        let old_portmap = self.portmap;
        self.recompute_portmap();
        let removed = bits_turned_off(old_portmap, self.portmap);

        if !removed.is_empty() {
            for &idx in groups.indices() {
                let group = groups.get_mut(idx);
                let revoke = removed & !group.portmap;
                if !revoke.is_empty() {
                    switch.del_portmap(group.ea, revoke);
                }
            }
            Debug::RouterPortsRevoked(removed).log();
        }

        match next_wake {
            Some(deadline) => timer.schedule(TimerId::RouterExpiry, deadline),
            None => timer.cancel(TimerId::RouterExpiry),
        }
    }

    /// Resets the router table to empty, as `purge_cache` requires.
    pub fn purge(&mut self, pool: &mut MemberPool) {
        for members in self.ports.values_mut() {
            for idx in members.drain(..) {
                pool.consume(idx);
            }
        }
        self.ports.clear();
        self.portmap = Portmap::EMPTY;
        self.expires_at = Tick::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSwitch;
    impl SwitchDriver for NullSwitch {
        fn get_port(&mut self, _ea: crate::mac::MacAddr) -> Option<PortId> {
            None
        }
        fn add_portmap(&mut self, _ea: crate::mac::MacAddr, _mask: Portmap) {}
        fn del_portmap(&mut self, _ea: crate::mac::MacAddr, _mask: Portmap) {}
        fn clr_portmap(&mut self, _ea: crate::mac::MacAddr) {}
    }

    #[derive(Default)]
    struct NullTimer;
    impl TimerDriver for NullTimer {
        fn schedule(&mut self, _timer: TimerId, _at: Tick) {}
        fn cancel(&mut self, _timer: TimerId) {}
        fn pending(&self, _timer: TimerId) -> Option<Tick> {
            None
        }
    }

    #[test]
    fn add_router_sets_portmap_bit() {
        let mut pool = MemberPool::new(16);
        let mut routers = RouterTable::new();
        let mut groups = GroupTable::new(4);
        let mut switch = NullSwitch;
        let mut timer = NullTimer;

        let delta = routers
            .add_router(
                &mut pool,
                &mut switch,
                &mut timer,
                &mut groups,
                Ipv4Addr::new(10, 0, 0, 1),
                PortId(1),
                PortId(8),
                Tick(0),
                260,
            )
            .unwrap();

        assert_eq!(delta, Portmap::bit(PortId(1)));
        assert_eq!(routers.portmap, Portmap::bit(PortId(1)));
    }
}
