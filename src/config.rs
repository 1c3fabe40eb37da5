//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Cache-wide tunables, expressed as a runtime configuration struct
//! in the style of `holo_igmp::northbound::configuration::InterfaceCfg`
//! rather than as compile-time constants.

use crate::portmap::PortId;

/// Fixed bucket count for both the group directory and the host
/// cache's hash tables.
pub const HASH_SIZE: usize = 64;

/// Cache-wide tunables. All fields default to sensible values except
/// `port_max`, which has no sane platform-independent default and
/// must be supplied.
#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    /// Highest valid port number; ports are `0..=port_max`.
    pub port_max: PortId,
    /// Maximum number of live group entries.
    pub group_pool_size: usize,
    /// Maximum number of live member entries, shared by groups and
    /// the router table.
    pub member_pool_size: usize,
    /// Maximum number of cached MAC-to-port host entries.
    pub host_pool_size: usize,
    /// Ticks per second, used to convert `HOST_TTL` into a tick count.
    pub timer_hz: u32,
    /// Host cache entry lifetime, in seconds.
    pub host_ttl_secs: u32,
}

impl CacheConfig {
    /// Builds a config with default pool sizes and TTL for a switch
    /// with `port_max` the platform reports as its highest port
    /// number.
    pub fn new(port_max: PortId, timer_hz: u32) -> Self {
        CacheConfig {
            port_max,
            timer_hz,
            ..Self::defaults_without_port_max()
        }
    }

    /// Ticks a fresh host cache entry remains valid for, i.e.
    /// `HOST_TTL * TIMER_HZ`.
    pub fn host_ttl_ticks(&self) -> u32 {
        self.host_ttl_secs * self.timer_hz
    }

    fn defaults_without_port_max() -> Self {
        CacheConfig {
            port_max: PortId(0),
            group_pool_size: 512,
            member_pool_size: 1024,
            host_pool_size: 32,
            timer_hz: 1,
            host_ttl_secs: 3,
        }
    }
}
