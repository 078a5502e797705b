//! Model to entity mappers
//!
//! `From<Model> for Entity` converts database rows into domain objects. Rows holding
//! enum-like text columns use `TryFrom` so a bad value surfaces as a `DomainError`.

mod content;
mod gamification;
mod reaction;
mod user;

pub use reaction::counts_by_emoji;
