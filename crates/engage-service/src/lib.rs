//! # engage-service
//!
//! Application layer for the engagement engine: reaction toggles and count caching,
//! point awarding and leaderboards, view accumulation, trending, and rate-gated
//! content creation.
//!
//! Side effects (points, notifications) run on a bounded [`runtime::TaskQueue`] and
//! never fail the request that triggered them.

pub mod dto;
pub mod runtime;
pub mod services;

pub use dto::*;
pub use runtime::{SingleFlight, TaskQueue};
pub use services::*;
