//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
//
// The top-level cache object: rather than `hosts`/`members`/`groups`/
// `routers` being process-wide state, they are fields of an explicit
// `Cache` that the embedder
// owns and drives. `Cache` is generic over its three injected
// capabilities (switch driver, timer driver, clock) the same way
// `holo-rip`'s `InterfaceCommon<V: Version, State>` is generic over
// its protocol version — monomorphization gives every embedder a
// zero-cost binding to its own driver implementations, with mocks
// substituted freely in tests.

use std::net::Ipv4Addr;

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::group::GroupTable;
use crate::host::HostCache;
use crate::mac::MacAddr;
use crate::member::MemberPool;
use crate::portmap::{PortId, Portmap};
use crate::router::RouterTable;
use crate::switch::{Clock, SwitchDriver};
use crate::timer::{TimerDriver, TimerId};

/// The IGMP snooping cache core.
///
/// See the module docs on [`crate::group`], [`crate::router`], and
/// [`crate::host`] for the per-table algorithms each public method
/// here delegates to.
pub struct Cache<S, T, C> {
    config: CacheConfig,
    switch: S,
    timer: T,
    clock: C,
    members: MemberPool,
    groups: GroupTable,
    routers: RouterTable,
    hosts: HostCache,
}

impl<S, T, C> Cache<S, T, C>
where
    S: SwitchDriver,
    T: TimerDriver,
    C: Clock,
{
    /// `init_cache`: builds an empty cache bound to the given
    /// capability implementations.
    pub fn init_cache(config: CacheConfig, switch: S, timer: T, clock: C) -> Self {
        Cache {
            members: MemberPool::new(config.member_pool_size),
            groups: GroupTable::new(config.group_pool_size),
            routers: RouterTable::new(),
            hosts: HostCache::new(config.host_pool_size),
            config,
            switch,
            timer,
            clock,
        }
    }

    /// `purge_cache`: cancels both timers and drains every table back
    /// to empty.
    pub fn purge_cache(&mut self) {
        self.timer.cancel(TimerId::GroupExpiry);
        self.timer.cancel(TimerId::RouterExpiry);
        self.groups.purge(&mut self.members, &mut self.switch);
        self.routers.purge(&mut self.members);
        self.members.purge();
        self.hosts.purge();
    }

    /// `get_port`: the MAC-to-port lookup, memoized by the host cache.
    pub fn get_port(&mut self, ea: MacAddr) -> Option<PortId> {
        let now = self.clock.now();
        self.hosts
            .get_port(&mut self.switch, ea, now, self.config.host_ttl_ticks())
    }

    /// Records a listener for `maddr` on `port` and returns the set of
    /// ports newly added to hardware forwarding, if any.
    pub fn add_member(
        &mut self,
        maddr: MacAddr,
        addr: Ipv4Addr,
        port: PortId,
        timeout_ticks: u32,
    ) -> Result<Portmap, CacheError> {
        let now = self.clock.now();
        self.groups.add_member(
            &mut self.members,
            &mut self.switch,
            &mut self.timer,
            self.routers.portmap,
            maddr,
            addr,
            port,
            self.config.port_max,
            now,
            timeout_ticks,
        )
    }

    /// Removes a listener for `maddr` on `port` and returns the set of
    /// ports newly revoked from hardware forwarding, if any.
    pub fn del_member(
        &mut self,
        maddr: MacAddr,
        addr: Ipv4Addr,
        port: PortId,
    ) -> Result<Portmap, CacheError> {
        self.groups.del_member(
            &mut self.members,
            &mut self.switch,
            self.routers.portmap,
            maddr,
            addr,
            port,
            self.config.port_max,
        )
    }

    /// Pushes out the expiry deadline for `maddr`'s listeners, or every
    /// group's when `maddr` is `None`.
    pub fn expire_members(
        &mut self,
        maddr: Option<MacAddr>,
        timeout_ticks: u32,
    ) -> Result<(), CacheError> {
        let now = self.clock.now();
        self.groups.expire_members(&mut self.timer, maddr, now, timeout_ticks)
    }

    /// Records or refreshes a detected router at `(ip, port)`.
    pub fn add_router(
        &mut self,
        ip: Ipv4Addr,
        port: PortId,
        timeout_ticks: u32,
    ) -> Result<Portmap, CacheError> {
        let now = self.clock.now();
        self.routers.add_router(
            &mut self.members,
            &mut self.switch,
            &mut self.timer,
            &mut self.groups,
            ip,
            port,
            self.config.port_max,
            now,
            timeout_ticks,
        )
    }

    /// The group-expiry timer's tick callback. The embedder calls this
    /// when its real timer wheel fires the deadline it was last asked
    /// to arm via
    /// [`crate::timer::TimerDriver::schedule`] with
    /// [`TimerId::GroupExpiry`].
    pub fn on_group_timer_tick(&mut self) {
        let now = self.clock.now();
        self.groups.on_group_timer_tick(
            &mut self.members,
            &mut self.switch,
            &mut self.timer,
            self.routers.portmap,
            now,
        );
    }

    /// The router-expiry timer's tick callback.
    pub fn on_router_timer_tick(&mut self) {
        let now = self.clock.now();
        self.routers.on_router_timer_tick(
            &mut self.members,
            &mut self.switch,
            &mut self.timer,
            &mut self.groups,
            now,
        );
    }

    /// Live group count.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Live member count across groups and the router table combined.
    pub fn member_count(&self) -> usize {
        self.members.live_count()
    }

    /// Cached host count.
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// The current router portmap.
    pub fn router_portmap(&self) -> Portmap {
        self.routers.portmap
    }

    /// A group's current portmap, if it has a live entry.
    pub fn group_portmap(&self, maddr: MacAddr) -> Option<Portmap> {
        self.groups.find(maddr).map(|idx| self.groups.get(idx).portmap)
    }

    /// The currently scheduled group-timer deadline, if any.
    pub fn group_timer_deadline(&self) -> Option<crate::time::Tick> {
        self.timer.pending(TimerId::GroupExpiry)
    }

    /// The currently scheduled router-timer deadline, if any.
    pub fn router_timer_deadline(&self) -> Option<crate::time::Tick> {
        self.timer.pending(TimerId::RouterExpiry)
    }

    /// Gives back the switch driver, consuming the cache. Useful for
    /// tests that want to inspect a mock driver's recorded calls after
    /// a scenario runs.
    pub fn into_switch(self) -> S {
        self.switch
    }
}
