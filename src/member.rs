//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! The global member pool, shared by the group directory and the
//! router table.
//!
//! A free-list on top of a `generational_arena::Arena` gives amortized
//! O(1) churn without ever freeing the backing storage until
//! `purge_cache` — the same bounded-pool discipline
//! `holo-bfd::session::Sessions` and `holo-rip::interface::Interfaces`
//! use for their own arenas, minus their secondary lookup trees
//! (membership lookup here is a per-group, per-port linear scan, since
//! per-port lists are expected to be short).

use std::net::Ipv4Addr;

use generational_arena::{Arena, Index};

use crate::portmap::PortId;
use crate::time::Tick;

pub type MemberIndex = Index;

/// One live IP listener (or detected router) on a (group-or-router,
/// port).
#[derive(Clone, Copy, Debug)]
pub struct Member {
    pub addr: Ipv4Addr,
    pub port: PortId,
    pub expires_at: Tick,
}

pub struct MemberPool {
    arena: Arena<Member>,
    free: Vec<Index>,
    capacity: usize,
}

impl MemberPool {
    pub fn new(capacity: usize) -> Self {
        MemberPool {
            arena: Arena::with_capacity(capacity),
            free: Vec::new(),
            capacity,
        }
    }

    /// Allocates (or reuses) a member entry. Returns `None` if the
    /// pool is at capacity and nothing is free — the caller is
    /// expected to drop the learning event silently.
    pub fn alloc(
        &mut self,
        addr: Ipv4Addr,
        port: PortId,
        expires_at: Tick,
    ) -> Option<MemberIndex> {
        if let Some(idx) = self.free.pop() {
            let member = &mut self.arena[idx];
            member.addr = addr;
            member.port = port;
            member.expires_at = expires_at;
            return Some(idx);
        }

        if self.arena.len() < self.capacity {
            return Some(self.arena.insert(Member {
                addr,
                port,
                expires_at,
            }));
        }

        None
    }

    /// Unlinks a member from its caller-owned list and returns it to
    /// the free-list. The backing slot is not freed until
    /// `purge_cache`.
    pub fn consume(&mut self, idx: MemberIndex) {
        self.free.push(idx);
    }

    pub fn get(&self, idx: MemberIndex) -> &Member {
        &self.arena[idx]
    }

    pub fn get_mut(&mut self, idx: MemberIndex) -> &mut Member {
        &mut self.arena[idx]
    }

    /// Live (non-free) member count, bounded by `MEMBER_POOL_SIZE`.
    pub fn live_count(&self) -> usize {
        self.arena.len() - self.free.len()
    }

    /// Resets the pool to empty, as `purge_cache` requires.
    pub fn purge(&mut self) {
        self.arena.clear();
        self.free.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_reuses_free_slots_before_growing() {
        let mut pool = MemberPool::new(2);
        let a = pool.alloc(Ipv4Addr::new(10, 0, 0, 1), PortId(1), Tick(10)).unwrap();
        let _b = pool.alloc(Ipv4Addr::new(10, 0, 0, 2), PortId(1), Tick(10)).unwrap();
        assert!(pool.alloc(Ipv4Addr::new(10, 0, 0, 3), PortId(1), Tick(10)).is_none());

        pool.consume(a);
        let c = pool
            .alloc(Ipv4Addr::new(10, 0, 0, 3), PortId(2), Tick(20))
            .unwrap();
        assert_eq!(c, a);
        assert_eq!(pool.get(c).addr, Ipv4Addr::new(10, 0, 0, 3));
    }

    #[test]
    fn live_count_excludes_free_entries() {
        let mut pool = MemberPool::new(4);
        let a = pool.alloc(Ipv4Addr::new(10, 0, 0, 1), PortId(1), Tick(1)).unwrap();
        pool.alloc(Ipv4Addr::new(10, 0, 0, 2), PortId(1), Tick(1)).unwrap();
        assert_eq!(pool.live_count(), 2);
        pool.consume(a);
        assert_eq!(pool.live_count(), 1);
    }
}
