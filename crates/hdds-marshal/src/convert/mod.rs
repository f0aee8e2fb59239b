// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-directed value conversion.
//!
//! # Dispatch
//!
//! `registry.convert(value, T)`:
//!
//! 1. `Null` -> `Null`; values already satisfying `T` are returned as-is
//! 2. The aggregator for `T` resolves the candidates for the value's runtime
//!    type (exact type, capabilities, parent chain, `AnyType`), sorted by
//!    ascending priority, and caches the list
//! 3. Candidates run in order; the first one that does not decline wins
//! 4. If all decline: `value -> Canonical -> T`, failing fast when `T` is
//!    `Canonical` or when the canonical form is the value itself
//!
//! # Example
//!
//! ```
//! use hdds_marshal::convert::{ConversionRegistry, FnConverter};
//! use hdds_marshal::types::TypeKey;
//! use hdds_marshal::Value;
//!
//! let registry = ConversionRegistry::new();
//! registry.register(FnConverter::new(
//!     TypeKey::of::<i64>(),
//!     TypeKey::of::<str>(),
//!     0,
//!     |value, _| Ok(value.as_int().map(|n| Value::from(n.to_string()))),
//! ));
//!
//! let text = registry.convert_to::<str>(&Value::from(42)).unwrap();
//! assert_eq!(text.as_str(), Some("42"));
//! ```

mod aggregator;
mod converter;
mod registry;

pub use aggregator::{AggregatorStats, ConversionAggregator};
pub use converter::{ConvertResult, Converter, ConverterRef, FnConverter};
pub use registry::ConversionRegistry;

#[cfg(test)]
mod tests;
