//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
//
// Multicast group directory.
//
// A `Group` is a multicast MAC's port-membership set: per-port lists
// of live IP listeners, and a `portmap` that is always the union over
// ports of "this port's listener list is non-empty". The directory
// that owns all groups is a `HASH_SIZE`-bucket hash table (linear-chain
// buckets) over a `generational_arena::Arena`, the same pool shape
// `holo-bfd::session::Sessions` uses for its sessions — except groups
// are never removed from the arena once allocated; a "reclaimed" slot
// is reset in place and re-keyed, so its `Index` (and its position in
// `order`) never changes across reclaim cycles.

use std::collections::BTreeMap;

use generational_arena::{Arena, Index};

use crate::debug::Debug;
use crate::mac::MacAddr;
use crate::member::{MemberIndex, MemberPool};
use crate::portmap::{bits_turned_off, bits_turned_on, PortId, Portmap};
use crate::switch::SwitchDriver;
use crate::time::{time_after, Tick};
use crate::timer::{TimerDriver, TimerId};

pub type GroupIndex = Index;

const HASH_SIZE: usize = crate::config::HASH_SIZE;

/// One multicast MAC's forwarding state.
#[derive(Debug)]
pub struct Group {
    pub ea: MacAddr,
    pub portmap: Portmap,
    pub expires_at: Tick,
    ports: BTreeMap<PortId, Vec<MemberIndex>>,
}

impl Group {
    fn new(ea: MacAddr, expires_at: Tick) -> Self {
        Group {
            ea,
            portmap: Portmap::EMPTY,
            expires_at,
            ports: BTreeMap::new(),
        }
    }

    /// Resets an existing slot for reuse with a new MAC. Callers must
    /// have already drained `ports` (via [`GroupTable::consume`])
    /// before calling this.
    fn reset(&mut self, ea: MacAddr, expires_at: Tick) {
        debug_assert!(self.ports.values().all(Vec::is_empty));
        self.ea = ea;
        self.portmap = Portmap::EMPTY;
        self.expires_at = expires_at;
        self.ports.clear();
    }

    fn find_member(&self, port: PortId, addr: std::net::Ipv4Addr, pool: &MemberPool) -> Option<MemberIndex> {
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

    /// Drains every member into the free-list and zeroes the portmap,
    /// without unlinking from the group directory's hash bucket.
    fn consume(&mut self, pool: &mut MemberPool) {
        for members in self.ports.values_mut() {
            for idx in members.drain(..) {
                pool.consume(idx);
            }
        }
        self.portmap = Portmap::EMPTY;
    }
}

/// The group directory: hash table + bounded arena + insertion order.
pub struct GroupTable {
    arena: Arena<Group>,
    order: Vec<GroupIndex>,
    buckets: Vec<Vec<GroupIndex>>,
    capacity: usize,
}

impl GroupTable {
    pub fn new(capacity: usize) -> Self {
        GroupTable {
            arena: Arena::with_capacity(capacity),
            order: Vec::new(),
            buckets: vec![Vec::new(); HASH_SIZE],
            capacity,
        }
    }

    fn bucket_of(ea: MacAddr) -> usize {
        ea.fold_hash() % HASH_SIZE
    }

    pub fn find(&self, ea: MacAddr) -> Option<GroupIndex> {
        self.buckets[Self::bucket_of(ea)]
            .iter()
            .copied()
            .find(|&idx| self.arena[idx].ea == ea)
    }

    pub fn get(&self, idx: GroupIndex) -> &Group {
        &self.arena[idx]
    }

    pub fn get_mut(&mut self, idx: GroupIndex) -> &mut Group {
        &mut self.arena[idx]
    }

    /// Every pooled group slot's index, in insertion order. Callers
    /// that need to mutate each group in turn (e.g. router port
    /// fan-out) index back in with [`GroupTable::get_mut`] one at a
    /// time rather than holding an iterator of `&mut Group`.
    pub fn indices(&self) -> &[GroupIndex] {
        &self.order
    }

    fn link(&mut self, idx: GroupIndex, ea: MacAddr) {
        self.buckets[Self::bucket_of(ea)].push(idx);
    }

    fn unlink(&mut self, idx: GroupIndex, ea: MacAddr) {
        let bucket = &mut self.buckets[Self::bucket_of(ea)];
        if let Some(pos) = bucket.iter().position(|&i| i == idx) {
            bucket.swap_remove(pos);
        }
    }

    /// Finds the group for `ea`, allocating a fresh or reclaimed slot
    /// if necessary. Returns `None` only when the pool is full and no
    /// slot has an empty portmap; the caller then drops the event
    /// silently.
    fn find_or_alloc(&mut self, switch: &mut impl SwitchDriver, ea: MacAddr, now: Tick) -> Option<GroupIndex> {
        if let Some(idx) = self.find(ea) {
            return Some(idx);
        }

        if self.arena.len() < self.capacity {
            let idx = self.arena.insert(Group::new(ea, now));
            self.order.push(idx);
            self.link(idx, ea);
            Debug::GroupAllocated(&ea).log();
            return Some(idx);
        }

        let reclaim = self
            .order
            .iter()
            .copied()
            .find(|&idx| self.arena[idx].portmap.is_empty())?;

        let old_ea = self.arena[reclaim].ea;
        switch.clr_portmap(old_ea);
        self.unlink(reclaim, old_ea);
        self.arena[reclaim].reset(ea, now);
        self.link(reclaim, ea);
        Debug::GroupReclaimed(&old_ea, &ea).log();
        Some(reclaim)
    }

    fn arm_timer_for(&self, timer: &mut impl TimerDriver, deadline: Tick) {
        let should_arm = match timer.pending(TimerId::GroupExpiry) {
            Some(pending) => time_after(pending, deadline),
            None => true,
        };
        if should_arm {
            timer.schedule(TimerId::GroupExpiry, deadline);
            Debug::GroupTimerArmed(deadline).log();
        }
    }

    /// Records or refreshes a listener at `(port, addr)` for group
    /// `maddr`, allocating the group if this is its first listener.
    pub fn add_member(
        &mut self,
        pool: &mut MemberPool,
        switch: &mut impl SwitchDriver,
        timer: &mut impl TimerDriver,
        routers_portmap: Portmap,
        maddr: MacAddr,
        addr: std::net::Ipv4Addr,
        port: PortId,
        port_max: PortId,
        now: Tick,
        timeout_ticks: u32,
    ) -> Result<Portmap, crate::error::CacheError> {
        if !port.is_valid(port_max) {
            return Err(crate::error::CacheError::InvalidPort { port, port_max });
        }

        let Some(idx) = self.find_or_alloc(switch, maddr, now) else {
            Debug::GroupPoolExhausted.log();
            return Ok(Portmap::EMPTY);
        };

        let expires_at = now + timeout_ticks;
        let group = self.get_mut(idx);
        group.expires_at = expires_at;

        if let Some(existing) = group.find_member(port, addr, pool) {
            pool.get_mut(existing).expires_at = expires_at;
        } else if let Some(member_idx) = pool.alloc(addr, port, expires_at) {
            group.ports.entry(port).or_default().push(member_idx);
        }
        // Else: the member pool is exhausted. The group's deadline was
        // still refreshed above, which is harmless — IGMP will
        // re-learn the listener on the next report.

        let old_portmap = group.portmap;
        group.recompute_portmap();
        let new_portmap = group.portmap;
        let new_bits = bits_turned_on(old_portmap, new_portmap);

        self.arm_timer_for(timer, expires_at);

        if !new_bits.is_empty() {
            switch.add_portmap(maddr, new_bits | routers_portmap);
        }

        Ok(new_bits)
    }

    /// Removes a listener at `(port, addr)` from group `maddr`,
    /// reclaiming the group's slot once its last listener is gone.
    pub fn del_member(
        &mut self,
        pool: &mut MemberPool,
        switch: &mut impl SwitchDriver,
        routers_portmap: Portmap,
        maddr: MacAddr,
        addr: std::net::Ipv4Addr,
        port: PortId,
        port_max: PortId,
    ) -> Result<Portmap, crate::error::CacheError> {
        if !port.is_valid(port_max) {
            return Err(crate::error::CacheError::InvalidPort { port, port_max });
        }

        let Some(idx) = self.find(maddr) else {
            return Ok(Portmap::EMPTY);
        };

        let group = self.get_mut(idx);
        if let Some(member_idx) = group.find_member(port, addr, pool) {
            if let Some(list) = group.ports.get_mut(&port) {
                list.retain(|&i| i != member_idx);
            }
            pool.consume(member_idx);
        }

        let old_portmap = group.portmap;
        group.recompute_portmap();
        let new_portmap = group.portmap;
        let removed = bits_turned_off(old_portmap, new_portmap);

        if new_portmap.is_empty() && !old_portmap.is_empty() {
            group.consume(pool);
            Debug::GroupConsumed(&maddr).log();
        }

        let removed_masked = removed & !routers_portmap;
        if !removed_masked.is_empty() {
            switch.del_portmap(maddr, removed_masked);
        }

        Ok(removed_masked)
    }

    /// Pushes out the expiry deadline for one group, or every group
    /// when `maddr` is `None`.
    pub fn expire_members(
        &mut self,
        timer: &mut impl TimerDriver,
        maddr: Option<MacAddr>,
        now: Tick,
        timeout_ticks: u32,
    ) -> Result<(), crate::error::CacheError> {
        let deadline = now + timeout_ticks;

        match maddr {
            Some(addr) => {
                let idx = self
                    .find(addr)
                    .ok_or(crate::error::CacheError::UnknownGroup { addr })?;
                self.get_mut(idx).expires_at = deadline;
            }
            None => {
                for &idx in &self.order {
                    self.arena[idx].expires_at = deadline;
                }
            }
        }

        self.arm_timer_for(timer, deadline);
        Ok(())
    }

    /// The group-expiry timer tick: drains every group whose deadline
    /// has passed and re-arms for the next one still pending.
    pub fn on_group_timer_tick(
        &mut self,
        pool: &mut MemberPool,
        switch: &mut impl SwitchDriver,
        timer: &mut impl TimerDriver,
        routers_portmap: Portmap,
        now: Tick,
    ) {
        let mut next_wake: Option<Tick> = None;

        for &idx in &self.order {
            let group = &mut self.arena[idx];
            if group.portmap.is_empty() {
                continue;
            }

            if time_after(group.expires_at, now) {
                next_wake = Some(match next_wake {
                    Some(w) => crate::time::earliest(w, group.expires_at),
                    None => group.expires_at,
                });
                continue;
            }

            let pre_consume = group.portmap;
            let ea = group.ea;
            group.consume(pool);

            let masked = pre_consume & !routers_portmap;
            if !masked.is_empty() {
                switch.del_portmap(ea, masked);
            }
            Debug::GroupConsumed(&ea).log();
        }

        if let Some(deadline) = next_wake {
            timer.schedule(TimerId::GroupExpiry, deadline);
            Debug::GroupTimerArmed(deadline).log();
        }
    }

    /// `purge_cache`'s group-side half: drains every group, clears
    /// hardware state, and resets the directory empty.
    pub fn purge(&mut self, pool: &mut MemberPool, switch: &mut impl SwitchDriver) {
        for &idx in &self.order {
            let group = &mut self.arena[idx];
            if !group.portmap.is_empty() {
                switch.clr_portmap(group.ea);
            }
            group.consume(pool);
        }
        self.arena.clear();
        self.order.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Live group count, bounded by `GROUP_POOL_SIZE`.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Currently scheduled group-timer deadline, i.e. the minimum
    /// `expires_at` over all groups with a non-empty portmap.
    pub fn min_active_deadline(&self) -> Option<Tick> {
        self.order
            .iter()
            .map(|&idx| &self.arena[idx])
            .filter(|g| !g.portmap.is_empty())
            .map(|g| g.expires_at)
            .reduce(crate::time::earliest)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum SwitchCall {
        Add(MacAddr, Portmap),
        Del(MacAddr, Portmap),
        Clr(MacAddr),
    }

    #[derive(Default)]
    struct RecordingSwitch {
        calls: Vec<SwitchCall>,
    }

    impl SwitchDriver for RecordingSwitch {
        fn get_port(&mut self, _ea: MacAddr) -> Option<PortId> {
            None
        }
        fn add_portmap(&mut self, ea: MacAddr, mask: Portmap) {
            self.calls.push(SwitchCall::Add(ea, mask));
        }
        fn del_portmap(&mut self, ea: MacAddr, mask: Portmap) {
            self.calls.push(SwitchCall::Del(ea, mask));
        }
        fn clr_portmap(&mut self, ea: MacAddr) {
            self.calls.push(SwitchCall::Clr(ea));
        }
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

    fn mac(last: u8) -> MacAddr {
        MacAddr::from([0x01, 0x00, 0x5e, 0x00, 0x00, last])
    }

    #[test]
    fn exhausted_pool_with_no_reclaimable_slot_drops_the_event() {
        let mut pool = MemberPool::new(16);
        let mut groups = GroupTable::new(1);
        let mut switch = RecordingSwitch::default();
        let mut timer = NullTimer;

        groups
            .add_member(
                &mut pool,
                &mut switch,
                &mut timer,
                Portmap::EMPTY,
                mac(1),
                Ipv4Addr::new(239, 0, 0, 1),
                PortId(2),
                PortId(8),
                Tick(0),
                260,
            )
            .unwrap();
        switch.calls.clear();

        let delta = groups
            .add_member(
                &mut pool,
                &mut switch,
                &mut timer,
                Portmap::EMPTY,
                mac(2),
                Ipv4Addr::new(239, 0, 0, 2),
                PortId(3),
                PortId(8),
                Tick(0),
                260,
            )
            .unwrap();

        assert!(delta.is_empty());
        assert!(switch.calls.is_empty());
        assert_eq!(groups.len(), 1);
    }

    /// spec.md §8 S6: a full pool refuses a brand-new MAC until an
    /// existing group empties, at which point its slot is reclaimed —
    /// the driver observing `clr_portmap` for the evicted MAC followed
    /// by `add_portmap` for the new one.
    #[test]
    fn emptied_slot_is_reclaimed_for_a_new_mac() {
        let mut pool = MemberPool::new(16);
        let mut groups = GroupTable::new(1);
        let mut switch = RecordingSwitch::default();
        let mut timer = NullTimer;
        let old_ea = mac(1);
        let new_ea = mac(2);
        let listener = Ipv4Addr::new(239, 0, 0, 1);

        groups
            .add_member(
                &mut pool,
                &mut switch,
                &mut timer,
                Portmap::EMPTY,
                old_ea,
                listener,
                PortId(2),
                PortId(8),
                Tick(0),
                260,
            )
            .unwrap();

        let dropped = groups
            .add_member(
                &mut pool,
                &mut switch,
                &mut timer,
                Portmap::EMPTY,
                new_ea,
                Ipv4Addr::new(239, 0, 0, 2),
                PortId(3),
                PortId(8),
                Tick(0),
                260,
            )
            .unwrap();
        assert!(dropped.is_empty(), "the one slot is still occupied by old_ea");

        groups
            .del_member(&mut pool, &mut switch, Portmap::EMPTY, old_ea, listener, PortId(2), PortId(8))
            .unwrap();
        switch.calls.clear();

        let delta = groups
            .add_member(
                &mut pool,
                &mut switch,
                &mut timer,
                Portmap::EMPTY,
                new_ea,
                Ipv4Addr::new(239, 0, 0, 2),
                PortId(3),
                PortId(8),
                Tick(0),
                260,
            )
            .unwrap();

        assert_eq!(delta, Portmap::bit(PortId(3)));
        assert_eq!(
            switch.calls,
            vec![SwitchCall::Clr(old_ea), SwitchCall::Add(new_ea, Portmap::bit(PortId(3)))]
        );
        assert!(groups.find(new_ea).is_some());
        assert_eq!(groups.find(old_ea), None);
    }
}
