//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Structured debug logging, adapted from `holo_igmp::debug` /
//! `holo_bfd::debug`. This is `tracing` output for a human watching
//! the agent, not a northbound counter tree.

use tracing::{debug, debug_span, trace};

use crate::mac::MacAddr;
use crate::portmap::Portmap;
use crate::time::Tick;

/// Noteworthy internal cache events.
#[derive(Debug)]
pub enum Debug<'a> {
    GroupAllocated(&'a MacAddr),
    GroupReclaimed(&'a MacAddr, &'a MacAddr),
    GroupPoolExhausted,
    GroupConsumed(&'a MacAddr),
    GroupTimerArmed(Tick),
    RouterPortsAdded(Portmap),
    RouterPortsRevoked(Portmap),
    HostEvicted(&'a MacAddr),
    HostMiss(&'a MacAddr),
}

impl Debug<'_> {
    pub(crate) fn log(&self) {
        debug_span!("igmp-snoop-cache").in_scope(|| match self {
            Debug::GroupAllocated(addr) => {
                debug!(%addr, "{self}");
            }
            Debug::GroupReclaimed(old, new) => {
                debug!(%old, %new, "{self}");
            }
            Debug::GroupPoolExhausted => {
                debug!("{self}");
            }
            Debug::GroupConsumed(addr) => {
                trace!(%addr, "{self}");
            }
            Debug::GroupTimerArmed(at) => {
                trace!(%at, "{self}");
            }
            Debug::RouterPortsAdded(mask) => {
                debug!(%mask, "{self}");
            }
            Debug::RouterPortsRevoked(mask) => {
                debug!(%mask, "{self}");
            }
            Debug::HostEvicted(addr) => {
                trace!(%addr, "{self}");
            }
            Debug::HostMiss(addr) => {
                trace!(%addr, "{self}");
            }
        })
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::GroupAllocated(..) => write!(f, "group allocated"),
            Debug::GroupReclaimed(..) => write!(f, "group slot reclaimed"),
            Debug::GroupPoolExhausted => {
                write!(f, "group pool exhausted, dropping membership event")
            }
            Debug::GroupConsumed(..) => write!(f, "group drained"),
            Debug::GroupTimerArmed(..) => write!(f, "group timer armed"),
            Debug::RouterPortsAdded(..) => {
                write!(f, "router ports fanned out to all groups")
            }
            Debug::RouterPortsRevoked(..) => {
                write!(f, "router ports revoked from groups without listeners")
            }
            Debug::HostEvicted(..) => write!(f, "host cache entry evicted"),
            Debug::HostMiss(..) => write!(f, "host cache miss, probing switch"),
        }
    }
}
