//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::warn;

use crate::mac::MacAddr;
use crate::portmap::PortId;

/// Cache errors, adapted from `holo_igmp::error::Error`.
///
/// The cache never errors out for pool exhaustion — that case is
/// absorbed silently and surfaces only as a zero hardware delta.
/// `CacheError` covers only genuine caller mistakes: an out-of-range
/// port, or a keyed `expire_members`/`del_member` against a MAC the
/// group directory has never seen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CacheError {
    /// `port` is outside `0..=port_max`.
    InvalidPort { port: PortId, port_max: PortId },
    /// `expire_members` was given a MAC with no group entry.
    UnknownGroup { addr: MacAddr },
}

impl CacheError {
    pub(crate) fn log(&self) {
        warn!(error = %self, "cache operation rejected");
    }
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::InvalidPort { port, port_max } => {
                write!(f, "port {port} is out of range (max {port_max})")
            }
            CacheError::UnknownGroup { addr } => {
                write!(f, "no group entry for {addr}")
            }
        }
    }
}

impl std::error::Error for CacheError {}
