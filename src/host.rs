//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
//
// Host (MAC -> port) lookup cache.
//
// Memoizes the expensive `switch_get_port` probe. Bounded by
// `HOST_POOL_SIZE` (32 by default) — small enough that eviction just
// scans the whole arena for the smallest `expires_at`, rather than
// keeping a separate LRU structure.

use generational_arena::{Arena, Index};

use crate::debug::Debug;
use crate::mac::MacAddr;
use crate::portmap::PortId;
use crate::switch::SwitchDriver;
use crate::time::{time_after_eq, Tick};

pub type HostIndex = Index;

const HASH_SIZE: usize = crate::config::HASH_SIZE;

#[derive(Clone, Copy, Debug)]
struct Host {
    ea: MacAddr,
    port: PortId,
    expires_at: Tick,
}

pub struct HostCache {
    arena: Arena<Host>,
    buckets: Vec<Vec<HostIndex>>,
    capacity: usize,
}

impl HostCache {
    pub fn new(capacity: usize) -> Self {
        HostCache {
            arena: Arena::with_capacity(capacity),
            buckets: vec![Vec::new(); HASH_SIZE],
            capacity,
        }
    }

    fn bucket_of(ea: MacAddr) -> usize {
        ea.fold_hash() % HASH_SIZE
    }

    fn find(&self, ea: MacAddr) -> Option<HostIndex> {
        self.buckets[Self::bucket_of(ea)]
            .iter()
            .copied()
            .find(|&idx| self.arena[idx].ea == ea)
    }

    fn link(&mut self, idx: HostIndex, ea: MacAddr) {
        self.buckets[Self::bucket_of(ea)].push(idx);
    }

    fn unlink(&mut self, idx: HostIndex, ea: MacAddr) {
        let bucket = &mut self.buckets[Self::bucket_of(ea)];
        if let Some(pos) = bucket.iter().position(|&i| i == idx) {
            bucket.swap_remove(pos);
        }
    }

    /// The entry with the smallest `expires_at`, i.e. the
    /// least-recently-refreshed one.
    fn oldest(&self) -> Option<HostIndex> {
        self.arena
            .iter()
            .min_by_key(|(_, host)| host.expires_at.0)
            .map(|(idx, _)| idx)
    }

    /// Looks up the port for `ea`, reusing a live entry within its TTL
    /// or probing the switch driver and caching the result otherwise.
    pub fn get_port(
        &mut self,
        switch: &mut impl SwitchDriver,
        ea: MacAddr,
        now: Tick,
        ttl_ticks: u32,
    ) -> Option<PortId> {
        if let Some(idx) = self.find(ea) {
            let host = &self.arena[idx];
            if time_after_eq(host.expires_at, now) {
                return Some(host.port);
            }
        }

        Debug::HostMiss(&ea).log();
        let port = switch.get_port(ea);
        let Some(port) = port else {
            return None;
        };

        let expires_at = now + ttl_ticks;
        if let Some(idx) = self.find(ea) {
            let host = &mut self.arena[idx];
            host.port = port;
            host.expires_at = expires_at;
        } else if self.arena.len() < self.capacity {
            let idx = self.arena.insert(Host { ea, port, expires_at });
            self.link(idx, ea);
        } else if let Some(idx) = self.oldest() {
            let old_ea = self.arena[idx].ea;
            Debug::HostEvicted(&old_ea).log();
            self.unlink(idx, old_ea);
            self.arena[idx] = Host { ea, port, expires_at };
            self.link(idx, ea);
        }
        // Else: `capacity` is zero, so there is nothing to evict and no
        // slot to insert into. The lookup result is still returned, it
        // just isn't memoized.

        Some(port)
    }

    /// Cached host count, bounded by `HOST_POOL_SIZE`.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Resets the host cache to empty, as `purge_cache` requires.
    pub fn purge(&mut self) {
        self.arena.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }
}
