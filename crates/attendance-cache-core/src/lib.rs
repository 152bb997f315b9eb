//! Core building blocks for the attendance two-tier cache.
//!
//! This crate carries everything that is independent of the cache tiers
//! themselves: the error taxonomy, the category/TTL tables, deterministic
//! key construction, and the clock abstraction used for testable expiry.

pub mod category;
pub mod clock;
pub mod error;
pub mod key;

pub use category::{CacheCategory, TtlPolicy};
pub use clock::{Clock, ManualClock, SystemClock, current_date};
pub use error::{CacheError, Result};
pub use key::{KeyBuilder, RuleScope};
