//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Core of an IGMP snooping cache for an Ethernet switch control
//! agent: a content-addressed group directory keyed by multicast MAC,
//! per-port member sets with individual expiry, a router-port table
//! unioned into every group's forwarding set, bounded pools with
//! LRU-style reclamation, and timer-driven expiry that minimizes
//! hardware writes.
//!
//! This crate is I/O-free by design. The IGMP packet parser, the
//! switch driver, the timer wheel, and the wall clock are external
//! collaborators, expressed here as the [`switch::SwitchDriver`],
//! [`timer::TimerDriver`], and [`switch::Clock`] traits an embedder
//! implements and passes to [`cache::Cache::init_cache`].

pub mod cache;
pub mod config;
pub mod debug;
pub mod error;
pub mod group;
pub mod host;
pub mod mac;
pub mod member;
pub mod portmap;
pub mod router;
pub mod switch;
pub mod time;
pub mod timer;

pub use cache::Cache;
pub use config::CacheConfig;
pub use error::CacheError;
pub use mac::MacAddr;
pub use portmap::{PortId, Portmap};
pub use switch::{Clock, SwitchDriver};
pub use time::Tick;
pub use timer::{TimerDriver, TimerId};
