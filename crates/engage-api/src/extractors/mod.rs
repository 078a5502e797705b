//! Axum extractors for request handling
//!
//! Custom extractors for caller identity, validation, and typed path/query parsing.

mod auth;
mod path;
mod query;
mod validated;

pub use auth::{AuthUser, OptionalAuthUser, USER_ID_HEADER};
pub use path::{ParsedPath, ReactionTargetPath, ThreadIdPath, UserIdPath};
pub use query::QueryParams;
pub use validated::ValidatedJson;
