//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! The timer wheel capability, standing in for `set_timer`/`mod_timer`/
//! `del_timer`/`timer_pending`. There are exactly two timers — one for
//! ordinary groups, one for routers — so `TimerId` is a two-variant
//! enum rather than an opaque handle type.
//!
//! Firing a timer is the embedder's job: when its real timer wheel
//! fires one of these, it calls
//! [`Cache::on_group_timer_tick`](crate::cache::Cache::on_group_timer_tick)
//! or
//! [`Cache::on_router_timer_tick`](crate::cache::Cache::on_router_timer_tick).

use crate::time::Tick;

/// Identifies which of the cache's two timers an operation concerns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerId {
    GroupExpiry,
    RouterExpiry,
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerId::GroupExpiry => write!(f, "group-expiry"),
            TimerId::RouterExpiry => write!(f, "router-expiry"),
        }
    }
}

/// A single-shot timer wheel with exactly two named timers.
pub trait TimerDriver {
    /// `set_timer`/`mod_timer`: arms (or re-arms) `timer` to fire at
    /// `at`, replacing any previously scheduled deadline.
    fn schedule(&mut self, timer: TimerId, at: Tick);

    /// `del_timer`: cancels `timer` if armed.
    fn cancel(&mut self, timer: TimerId);

    /// `timer_pending`/`t.expires`: the deadline `timer` is currently
    /// armed for, if any.
    fn pending(&self, timer: TimerId) -> Option<Tick>;
}
