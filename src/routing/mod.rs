//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → router.rs (strip leading slash, cut at first slash)
//!     → Return: Index or Repository(name)
//! ```
//!
//! # Design Decisions
//! - Pure function of the path, no allocation
//! - No validation or normalization of the repository segment
//! - Deterministic: same path always yields the same route

pub mod router;

pub use router::Route;
