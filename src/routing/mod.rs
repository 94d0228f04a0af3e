//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (segment-boundary prefix check)
//!     → Return: matched Route or Unmatched
//!     → rewrite.rs (strip prefix, substitute replacement root)
//!
//! Route Compilation (at startup):
//!     RouteRule[]
//!     → Parse upstream base URLs
//!     → Sort by prefix length (longest first)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - Longest prefix wins; registration order only breaks exact ties

pub mod matcher;
pub mod rewrite;
pub mod router;

pub use router::{Route, RouteMatch, RouteTable, Upstream};
