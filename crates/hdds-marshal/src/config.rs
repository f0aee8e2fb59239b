// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshalling configuration - single source of truth for constants.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (token prefixes, default limits)
//! - **Level 2 (Dynamic)**: [`BridgeConfig`] handed to the registry and marshaller
//!
//! # Example
//!
//! ```
//! use hdds_marshal::config::{BridgeConfig, CachePolicy};
//!
//! let config = BridgeConfig::default()
//!     .with_cache_policy(CachePolicy::Invalidate)
//!     .with_max_marshal_depth(32);
//! assert_eq!(config.max_marshal_depth, 32);
//! ```

// =======================================================================
// Boundary-reference tokens
// =======================================================================

/// Reserved prefix of boundary-reference tokens.
///
/// Any string starting with this prefix is treated as a reference during
/// unmarshalling, never as ordinary text.
pub const REFERENCE_PREFIX: &str = "ipc://";

/// Prefix of the ids synthesized for exported objects (`ipc://resolve/<uuid>`).
pub const RESOLVE_PREFIX: &str = "ipc://resolve/";

// =======================================================================
// Recursion limits
// =======================================================================

/// Maximum nesting of canonical fallback hops within one `convert` call.
///
/// Two checks already stop the common cases (target is `Canonical`, canonical
/// value is the input itself). This bound stops canonical cycles between
/// distinct values.
pub const DEFAULT_MAX_FALLBACK_DEPTH: usize = 8;

/// Maximum container nesting walked by marshal/unmarshal.
pub const DEFAULT_MAX_MARSHAL_DEPTH: usize = 64;

/// True when `text` is a boundary-reference token.
#[inline]
#[must_use]
pub fn is_reference_token(text: &str) -> bool {
    text.starts_with(REFERENCE_PREFIX)
}

// =======================================================================
// Runtime Configuration
// =======================================================================

/// How a converter aggregator treats its resolved-list cache when the
/// converter set changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CachePolicy {
    /// Drop every cached list that the (un)registered converter could appear in.
    #[default]
    Invalidate,
    /// Never invalidate: lists resolved before a late registration stay stale.
    /// Kept for callers relying on the historical behaviour.
    Historical,
}

/// Runtime configuration shared by the registry and the marshaller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConfig {
    pub cache_policy: CachePolicy,
    pub max_fallback_depth: usize,
    pub max_marshal_depth: usize,
}

impl BridgeConfig {
    #[must_use]
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Values below 1 are raised to 1 so that a single hop stays possible.
    #[must_use]
    pub fn with_max_fallback_depth(mut self, depth: usize) -> Self {
        if depth == 0 {
            log::warn!("[config] max_fallback_depth=0 disables canonical fallback, using 1");
        }
        self.max_fallback_depth = depth.max(1);
        self
    }

    /// Values below 1 are raised to 1 so that top-level leaves can be marshaled.
    #[must_use]
    pub fn with_max_marshal_depth(mut self, depth: usize) -> Self {
        if depth == 0 {
            log::warn!("[config] max_marshal_depth=0 rejects every value, using 1");
        }
        self.max_marshal_depth = depth.max(1);
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            cache_policy: CachePolicy::default(),
            max_fallback_depth: DEFAULT_MAX_FALLBACK_DEPTH,
            max_marshal_depth: DEFAULT_MAX_MARSHAL_DEPTH,
        }
    }
}
